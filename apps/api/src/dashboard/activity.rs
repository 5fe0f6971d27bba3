//! Recent-progress feed: goal updates, learning activity and achievements
//! merged into one newest-first list.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::goals::status::{PersistedStatus, UiStatus};
use crate::models::activity::{Achievement, LearningActivity};
use crate::models::goal::CareerGoal;

const FEED_LEN: usize = 5;
const GOALS_IN_FEED: usize = 3;
const LEARNING_IN_FEED: usize = 2;
const ACHIEVEMENTS_IN_FEED: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Goal,
    Learning,
    Achievement,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub title: String,
    pub status: String,
    pub updated_at: DateTime<Utc>,
    pub time_ago: String,
    pub icon: &'static str,
}

/// Status a goal shows in the feed. Unlike the goals page, the feed counts
/// every `active` goal as in progress.
pub fn feed_status(status: PersistedStatus) -> UiStatus {
    match status {
        PersistedStatus::Active => UiStatus::InProgress,
        other => other.to_ui(),
    }
}

pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds().max(0);
    match secs {
        s if s < 60 => "Just now".to_string(),
        s if s < 3_600 => format!("{} minutes ago", s / 60),
        s if s < 86_400 => format!("{} hours ago", s / 3_600),
        s if s < 2_592_000 => format!("{} days ago", s / 86_400),
        s if s < 31_536_000 => format!("{} months ago", s / 2_592_000),
        s => format!("{} years ago", s / 31_536_000),
    }
}

/// Single feed entry shown instead of real activity.
pub fn placeholder_activity(id: &str, title: &str, now: DateTime<Utc>) -> ActivityItem {
    ActivityItem {
        id: id.to_string(),
        kind: ActivityKind::Goal,
        title: title.to_string(),
        status: UiStatus::NotStarted.as_str().to_string(),
        updated_at: now,
        time_ago: time_ago(now, now),
        icon: "Target",
    }
}

pub fn recent_activity(
    goals: &[CareerGoal],
    learning: &[LearningActivity],
    achievements: &[Achievement],
    now: DateTime<Utc>,
) -> Vec<ActivityItem> {
    let mut items: Vec<ActivityItem> = Vec::new();

    let mut goal_updates: Vec<(&CareerGoal, UiStatus)> = goals
        .iter()
        .map(|g| (g, feed_status(g.status)))
        .filter(|(_, s)| matches!(s, UiStatus::Completed | UiStatus::InProgress))
        .collect();
    goal_updates.sort_by(|a, b| b.0.updated_at.cmp(&a.0.updated_at));
    items.extend(goal_updates.into_iter().take(GOALS_IN_FEED).map(|(g, s)| {
        let completed = s == UiStatus::Completed;
        ActivityItem {
            id: g.id.to_string(),
            kind: ActivityKind::Goal,
            title: if completed {
                format!("Completed Goal: {}", g.title)
            } else {
                format!("Updated Goal: {}", g.title)
            },
            status: s.as_str().to_string(),
            updated_at: g.updated_at,
            time_ago: time_ago(g.updated_at, now),
            icon: if completed { "CheckCircle" } else { "Target" },
        }
    }));

    let mut courses: Vec<&LearningActivity> = learning
        .iter()
        .filter(|a| a.status == "completed" || a.status == "in_progress")
        .collect();
    courses.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    items.extend(courses.into_iter().take(LEARNING_IN_FEED).map(|a| ActivityItem {
        id: a.id.to_string(),
        kind: ActivityKind::Learning,
        title: if a.status == "completed" {
            format!("Completed Course: {}", a.title)
        } else {
            format!("Learning: {}", a.title)
        },
        status: a.status.clone(),
        updated_at: a.updated_at,
        time_ago: time_ago(a.updated_at, now),
        icon: "BookOpen",
    }));

    let mut earned: Vec<&Achievement> = achievements.iter().collect();
    earned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    items.extend(earned.into_iter().take(ACHIEVEMENTS_IN_FEED).map(|a| ActivityItem {
        id: a.id.to_string(),
        kind: ActivityKind::Achievement,
        title: format!("Earned Achievement: {}", a.title),
        status: UiStatus::Completed.as_str().to_string(),
        updated_at: a.created_at,
        time_ago: time_ago(a.created_at, now),
        icon: "Award",
    }));

    items.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    items.truncate(FEED_LEN);

    if items.is_empty() {
        items.push(placeholder_activity("fallback-1", "No recent activity yet", now));
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap()
    }

    fn goal(title: &str, status: PersistedStatus, hours_ago: i64) -> CareerGoal {
        let at = now() - Duration::hours(hours_ago);
        CareerGoal {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            title: title.into(),
            description: None,
            category: Default::default(),
            priority: Default::default(),
            status,
            progress_percentage: 0,
            target_date: None,
            created_at: at,
            updated_at: at,
        }
    }

    fn achievement(title: &str, hours_ago: i64) -> Achievement {
        Achievement {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            title: title.into(),
            created_at: now() - Duration::hours(hours_ago),
        }
    }

    #[test]
    fn test_time_ago_labels() {
        let n = now();
        assert_eq!(time_ago(n - Duration::seconds(30), n), "Just now");
        assert_eq!(time_ago(n - Duration::minutes(5), n), "5 minutes ago");
        assert_eq!(time_ago(n - Duration::hours(3), n), "3 hours ago");
        assert_eq!(time_ago(n - Duration::days(2), n), "2 days ago");
        assert_eq!(time_ago(n - Duration::days(65), n), "2 months ago");
        assert_eq!(time_ago(n - Duration::days(800), n), "2 years ago");
    }

    #[test]
    fn test_feed_skips_paused_goals_and_caps_per_source() {
        let goals = vec![
            goal("A", PersistedStatus::Active, 1),
            goal("B", PersistedStatus::Completed, 2),
            goal("C", PersistedStatus::Paused, 0),
            goal("D", PersistedStatus::Active, 3),
            goal("E", PersistedStatus::Active, 4),
        ];
        let achievements = vec![
            achievement("X", 10),
            achievement("Y", 11),
            achievement("Z", 12),
        ];
        let feed = recent_activity(&goals, &[], &achievements, now());
        let titles: Vec<&str> = feed.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Updated Goal: A",
                "Completed Goal: B",
                "Updated Goal: D",
                "Earned Achievement: X",
                "Earned Achievement: Y",
            ]
        );
        assert_eq!(feed[1].icon, "CheckCircle");
    }

    #[test]
    fn test_empty_feed_has_placeholder() {
        let feed = recent_activity(&[], &[], &[], now());
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].title, "No recent activity yet");
        assert_eq!(feed[0].status, "not_started");
    }
}
