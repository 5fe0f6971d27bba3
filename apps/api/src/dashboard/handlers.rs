//! Dashboard and progress-page view models.
//!
//! Both endpoints fetch their rows concurrently. A failed fetch never fails the
//! request: it is logged and the placeholder dataset is returned with
//! `fallback: true`.

use axum::{extract::State, Json};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::dashboard::activity::{placeholder_activity, recent_activity, ActivityItem};
use crate::dashboard::metrics::{
    average_assessment_score, completed_this_week, completion_rate, count_completed,
    learning_hours, metric_cards, placeholder_metric_cards, placeholder_skills, skill_levels,
    skill_progress, skills_progress, target_salary, MetricCard, ProgressStats, SkillLevel,
    SkillProgress, DASHBOARD_PLACEHOLDER_SKILLS, PROGRESS_PLACEHOLDER_SKILLS,
};
use crate::dashboard::repo;
use crate::errors::AppError;
use crate::goals::repo::list_goals;
use crate::profile::repo::get_profile;
use crate::recommendations::repo::list_active;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::store::{RowStore, StoreError};

const LEARNING_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_goals: usize,
    pub completed_goals: usize,
    pub avg_assessment_score: u32,
    pub active_recommendations: usize,
    pub target_salary: u64,
    pub current_progress: u32,
    pub goals_completed_this_week: usize,
    pub current_role: String,
}

#[derive(Debug, Serialize)]
pub struct DashboardView {
    /// Absent when the view is a placeholder.
    pub stats: Option<DashboardStats>,
    pub metrics: Vec<MetricCard>,
    pub skills: Vec<SkillLevel>,
    pub recent_progress: Vec<ActivityItem>,
    pub fallback: bool,
}

impl DashboardView {
    pub fn placeholder(now: DateTime<Utc>) -> Self {
        Self {
            stats: None,
            metrics: placeholder_metric_cards(),
            skills: placeholder_skills(&DASHBOARD_PLACEHOLDER_SKILLS),
            recent_progress: vec![placeholder_activity(
                "error-fallback",
                "Unable to load recent progress",
                now,
            )],
            fallback: true,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProgressView {
    pub stats: ProgressStats,
    pub skills: Vec<SkillLevel>,
    pub progress: Vec<SkillProgress>,
    pub fallback: bool,
}

impl ProgressView {
    pub fn placeholder() -> Self {
        let skills = placeholder_skills(&PROGRESS_PLACEHOLDER_SKILLS);
        Self {
            stats: ProgressStats::placeholder(),
            progress: skill_progress(&skills),
            skills,
            fallback: true,
        }
    }
}

async fn load_dashboard(
    store: &dyn RowStore,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<DashboardView, StoreError> {
    let (goals, assessments, recommendations, profile, learning, achievements) = tokio::try_join!(
        list_goals(store, user_id),
        repo::list_assessments(store, user_id),
        list_active(store, user_id),
        get_profile(store, user_id),
        repo::list_learning_activities(store, user_id, None),
        repo::list_achievements(store, user_id),
    )?;

    let total_goals = goals.len();
    let completed_goals = count_completed(&goals);
    let current_progress = completion_rate(total_goals, completed_goals);
    let avg_score = average_assessment_score(&assessments);
    let salary = target_salary(profile.as_ref());

    let mut skills = skill_levels(&assessments);
    if skills.is_empty() {
        skills = placeholder_skills(&DASHBOARD_PLACEHOLDER_SKILLS);
    }

    let stats = DashboardStats {
        total_goals,
        completed_goals,
        avg_assessment_score: avg_score,
        active_recommendations: recommendations.len(),
        target_salary: salary,
        current_progress,
        goals_completed_this_week: completed_this_week(&goals, now),
        current_role: profile
            .and_then(|p| p.current_role)
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| "Not Set".to_string()),
    };

    Ok(DashboardView {
        metrics: metric_cards(current_progress, avg_score, salary, recommendations.len()),
        stats: Some(stats),
        skills,
        recent_progress: recent_activity(&goals, &learning, &achievements, now),
        fallback: false,
    })
}

async fn load_progress(
    store: &dyn RowStore,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<ProgressView, StoreError> {
    let since = now - Duration::days(LEARNING_WINDOW_DAYS);
    let (goals, assessments, achievements, learning) = tokio::try_join!(
        list_goals(store, user_id),
        repo::list_assessments(store, user_id),
        repo::list_achievements(store, user_id),
        repo::list_learning_activities(store, user_id, Some(since)),
    )?;

    let completed = count_completed(&goals);
    let measured = skill_levels(&assessments);
    let stats = ProgressStats {
        overall_progress: completion_rate(goals.len(), completed),
        skills_progress: skills_progress(&measured),
        goals_completed: completed,
        total_goals: goals.len(),
        learning_hours: learning_hours(&learning),
        achievements: achievements.len(),
    };

    let skills = if measured.is_empty() {
        placeholder_skills(&PROGRESS_PLACEHOLDER_SKILLS)
    } else {
        measured
    };

    Ok(ProgressView {
        stats,
        progress: skill_progress(&skills),
        skills,
        fallback: false,
    })
}

/// GET /api/v1/dashboard
pub async fn handle_dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<DataResponse<DashboardView>>, AppError> {
    let now = Utc::now();
    let view = match load_dashboard(state.store.as_ref(), user.id(), now).await {
        Ok(view) => view,
        Err(e) => {
            warn!("Dashboard data unavailable for user {}, using placeholders: {e}", user.id());
            DashboardView::placeholder(now)
        }
    };
    Ok(DataResponse::json(view))
}

/// GET /api/v1/progress
pub async fn handle_progress(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<DataResponse<ProgressView>>, AppError> {
    let view = match load_progress(state.store.as_ref(), user.id(), Utc::now()).await {
        Ok(view) => view,
        Err(e) => {
            warn!("Progress data unavailable for user {}, using placeholders: {e}", user.id());
            ProgressView::placeholder()
        }
    };
    Ok(DataResponse::json(view))
}
