use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{Duration, Utc};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::goals::handlers::GoalView;
use crate::goals::repo::insert_goal;
use crate::goals::status::PersistedStatus;
use crate::models::goal::{GoalCategory, GoalPriority};
use crate::models::recommendation::Recommendation;
use crate::recommendations::repo;
use crate::response::DataResponse;
use crate::state::AppState;

/// Goal category a recommendation turns into.
pub fn goal_category(recommendation_type: &str) -> GoalCategory {
    match recommendation_type {
        "career_opportunity" | "career_path" => GoalCategory::Position,
        "networking" => GoalCategory::Business,
        _ => GoalCategory::Skills,
    }
}

/// Goal priority from a 0–10 priority score.
pub fn goal_priority(priority_score: f64) -> GoalPriority {
    if priority_score >= 9.0 {
        GoalPriority::High
    } else if priority_score >= 7.0 {
        GoalPriority::Medium
    } else {
        GoalPriority::Low
    }
}

/// GET /api/v1/recommendations
pub async fn handle_list_recommendations(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<DataResponse<Vec<Recommendation>>>, AppError> {
    let now = Utc::now();
    let recommendations = repo::list_active(state.store.as_ref(), user.id())
        .await?
        .into_iter()
        .filter(|r| r.expires_at.map_or(true, |at| at > now))
        .collect();
    Ok(DataResponse::json(recommendations))
}

/// POST /api/v1/recommendations/:id/goal
///
/// Copies a recommendation into a new `active` goal at 0% progress.
pub async fn handle_add_as_goal(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<DataResponse<GoalView>>), AppError> {
    let store = state.store.as_ref();
    let recommendation = repo::get_recommendation(store, user.id(), id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Recommendation {id} not found")))?;

    let now = Utc::now();
    let title = recommendation
        .title
        .clone()
        .unwrap_or_else(|| recommendation.recommendation_type.replace('_', " "));
    let row = json!({
        "id": Uuid::new_v4(),
        "user_id": user.id(),
        "title": title,
        "description": recommendation.description,
        "category": goal_category(&recommendation.recommendation_type),
        "priority": goal_priority(recommendation.priority_score),
        "status": PersistedStatus::Active,
        "progress_percentage": 0,
        "target_date": (now + Duration::days(90)).date_naive(),
        "created_at": now,
        "updated_at": now,
    });
    let goal = insert_goal(store, row).await?;
    info!("Added recommendation {id} as goal {}", goal.id);

    Ok((StatusCode::CREATED, DataResponse::json(GoalView::from_row(goal))))
}
