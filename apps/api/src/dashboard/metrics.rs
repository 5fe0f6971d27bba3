//! Dashboard and progress-page aggregates: counts, percentages, averages,
//! salary parsing, and the placeholder datasets shown when data is missing.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::goals::status::{PersistedStatus, UiStatus};
use crate::models::activity::LearningActivity;
use crate::models::assessment::SkillAssessment;
use crate::models::goal::CareerGoal;
use crate::models::profile::UserProfile;

/// Shown on the dashboard radar chart when the user has no assessments.
pub const DASHBOARD_PLACEHOLDER_SKILLS: [(&str, u32); 6] = [
    ("Technical Skills", 85),
    ("Project Management", 72),
    ("Leadership", 68),
    ("Business Acumen", 58),
    ("Communication", 75),
    ("Innovation", 80),
];

/// The progress page uses the first four of the dashboard set.
pub const PROGRESS_PLACEHOLDER_SKILLS: [(&str, u32); 4] = [
    ("Technical Skills", 85),
    ("Project Management", 72),
    ("Leadership", 68),
    ("Business Acumen", 58),
];

pub const DEFAULT_ASSESSMENT_SCORE: u32 = 75;
pub const GOAL_PROGRESS_TARGET: u32 = 80;
pub const SKILL_TARGET: u32 = 80;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillLevel {
    pub category: String,
    pub level: u32,
}

/// Bar-chart row on the progress page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillProgress {
    pub category: String,
    pub value: u32,
    pub target: u32,
    pub max_value: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueFormat {
    Percentage,
    Currency,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCard {
    pub title: &'static str,
    pub value: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<ValueFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_text: Option<&'static str>,
    pub trend: Trend,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressStats {
    pub overall_progress: u32,
    pub skills_progress: u32,
    pub goals_completed: usize,
    pub total_goals: usize,
    pub learning_hours: u64,
    pub achievements: usize,
}

impl ProgressStats {
    /// Stats shown when the progress page cannot load its data.
    pub fn placeholder() -> Self {
        Self {
            overall_progress: 72,
            skills_progress: 85,
            goals_completed: 12,
            total_goals: 18,
            learning_hours: 156,
            achievements: 8,
        }
    }
}

/// `round(completed / total * 100)`, 0 for an empty set.
pub fn completion_rate(total: usize, completed: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (completed as f64 / total as f64 * 100.0).round() as u32
}

/// Completed goals whose last update falls in the trailing seven days.
pub fn completed_this_week(goals: &[CareerGoal], now: DateTime<Utc>) -> usize {
    let week_ago = now - Duration::days(7);
    goals
        .iter()
        .filter(|g| g.status.to_ui() == UiStatus::Completed && g.updated_at >= week_ago)
        .count()
}

pub fn count_completed(goals: &[CareerGoal]) -> usize {
    goals
        .iter()
        .filter(|g| g.status == PersistedStatus::Completed)
        .count()
}

/// Mean display level per category, in first-seen category order.
/// Empty when there are no assessments; callers pick their placeholder set.
pub fn skill_levels(assessments: &[SkillAssessment]) -> Vec<SkillLevel> {
    let mut groups: Vec<(String, f64, u32)> = Vec::new();
    for a in assessments {
        let key = a.group_key();
        match groups.iter_mut().find(|(c, _, _)| c == key) {
            Some((_, total, count)) => {
                *total += a.display_level();
                *count += 1;
            }
            None => groups.push((key.to_string(), a.display_level(), 1)),
        }
    }
    groups
        .into_iter()
        .map(|(category, total, count)| SkillLevel {
            category,
            level: (total / count as f64).round() as u32,
        })
        .collect()
}

pub fn placeholder_skills(set: &[(&str, u32)]) -> Vec<SkillLevel> {
    set.iter()
        .map(|(category, level)| SkillLevel {
            category: category.to_string(),
            level: *level,
        })
        .collect()
}

pub fn skill_progress(skills: &[SkillLevel]) -> Vec<SkillProgress> {
    skills
        .iter()
        .map(|s| SkillProgress {
            category: s.category.clone(),
            value: s.level,
            target: SKILL_TARGET,
            max_value: 100,
        })
        .collect()
}

/// Mean of the per-category levels, or 85 when there are none.
pub fn skills_progress(skills: &[SkillLevel]) -> u32 {
    if skills.is_empty() {
        return 85;
    }
    let sum: u32 = skills.iter().map(|s| s.level).sum();
    (sum as f64 / skills.len() as f64).round() as u32
}

/// Mean of `current_level × 10`, rounded; 75 when there are no assessments.
pub fn average_assessment_score(assessments: &[SkillAssessment]) -> u32 {
    if assessments.is_empty() {
        return DEFAULT_ASSESSMENT_SCORE;
    }
    let total: f64 = assessments.iter().map(SkillAssessment::display_level).sum();
    (total / assessments.len() as f64).round() as u32
}

fn first_digit_run(text: &str) -> Option<u64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Extracts an annual salary from free text.
///
/// `万` multiplies the first number by 10 000, `k` by 1 000; a bare number
/// below 1 000 is read as thousands. Only the first matching rule is tried.
pub fn parse_salary(text: &str) -> Option<u64> {
    let lower = text.to_lowercase();
    let n = first_digit_run(&lower)?;
    if lower.contains('万') {
        n.checked_mul(10_000)
    } else if lower.contains('k') {
        n.checked_mul(1_000)
    } else if n < 1_000 {
        Some(n * 1_000)
    } else {
        Some(n)
    }
}

/// Numeric `target_salary` when set, else the parsed `expected_salary`, else 0.
pub fn target_salary(profile: Option<&UserProfile>) -> u64 {
    let Some(profile) = profile else {
        return 0;
    };
    match profile.target_salary {
        Some(n) if n > 0 => n as u64,
        _ => profile
            .expected_salary
            .as_deref()
            .and_then(parse_salary)
            .unwrap_or(0),
    }
}

/// Total activity minutes converted to hours, rounded.
pub fn learning_hours(activities: &[LearningActivity]) -> u64 {
    let minutes: i64 = activities
        .iter()
        .filter_map(|a| a.duration_minutes)
        .filter(|m| *m > 0)
        .sum();
    (minutes as f64 / 60.0).round() as u64
}

pub fn metric_cards(
    goal_progress: u32,
    avg_score: u32,
    salary: u64,
    recommendations: usize,
) -> Vec<MetricCard> {
    let salary_set = salary > 0;
    vec![
        MetricCard {
            title: "Goal Progress",
            value: goal_progress as u64,
            target: Some(GOAL_PROGRESS_TARGET),
            format: Some(ValueFormat::Percentage),
            prefix: None,
            suffix: None,
            display_text: None,
            trend: if goal_progress > 50 { Trend::Up } else { Trend::Neutral },
        },
        MetricCard {
            title: "Overall Score",
            value: avg_score as u64,
            target: None,
            format: None,
            prefix: None,
            suffix: Some("/100"),
            display_text: None,
            trend: if avg_score > 70 { Trend::Up } else { Trend::Neutral },
        },
        MetricCard {
            title: "Target Salary",
            value: salary,
            target: None,
            format: Some(if salary_set {
                ValueFormat::Currency
            } else {
                ValueFormat::None
            }),
            prefix: Some(if salary_set { "$" } else { "" }),
            suffix: None,
            display_text: (!salary_set).then_some("Not Set"),
            trend: Trend::Neutral,
        },
        MetricCard {
            title: "AI Recommendations",
            value: recommendations as u64,
            target: None,
            format: None,
            prefix: None,
            suffix: Some(" items"),
            display_text: None,
            trend: Trend::Neutral,
        },
    ]
}

/// Metric cards shown when the dashboard cannot load its data.
pub fn placeholder_metric_cards() -> Vec<MetricCard> {
    let mut cards = metric_cards(72, 85, 0, 8);
    cards[0].trend = Trend::Up;
    cards
}
