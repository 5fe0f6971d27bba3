//! Axum route handlers for the Goals API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::dashboard::metrics::completion_rate;
use crate::errors::AppError;
use crate::goals::repo;
use crate::goals::status::{
    clamp_progress, map_status_to_database, progress_for_status_change, PersistedStatus, UiStatus,
};
use crate::models::goal::{CareerGoal, GoalCategory, GoalPriority};
use crate::response::{DataResponse, JsonBody};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// A goal as the dashboard shows it: persisted status translated to the UI
/// vocabulary, progress on 0–100.
#[derive(Debug, Clone, Serialize)]
pub struct GoalView {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: GoalCategory,
    pub priority: GoalPriority,
    pub status: UiStatus,
    pub progress_percentage: u8,
    pub target_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GoalView {
    /// View built from storage alone. `active` rows read back as `not_started`.
    pub fn from_row(goal: CareerGoal) -> Self {
        let status = goal.status.to_ui();
        Self::with_status(goal, status)
    }

    /// View that keeps the UI status the caller just set.
    pub fn with_status(goal: CareerGoal, status: UiStatus) -> Self {
        Self {
            id: goal.id,
            title: goal.title,
            description: goal.description,
            category: goal.category,
            priority: goal.priority,
            status,
            progress_percentage: clamp_progress(goal.progress_percentage),
            target_date: goal.target_date,
            created_at: goal.created_at,
            updated_at: goal.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GoalSummary {
    pub total: usize,
    pub not_started: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub on_hold: usize,
    pub completion_rate: u32,
}

impl GoalSummary {
    pub fn from_views(goals: &[GoalView]) -> Self {
        let count = |s: UiStatus| goals.iter().filter(|g| g.status == s).count();
        let completed = count(UiStatus::Completed);
        Self {
            total: goals.len(),
            not_started: count(UiStatus::NotStarted),
            in_progress: count(UiStatus::InProgress),
            completed,
            on_hold: count(UiStatus::OnHold),
            completion_rate: completion_rate(goals.len(), completed),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GoalListResponse {
    pub goals: Vec<GoalView>,
    pub summary: GoalSummary,
}

#[derive(Debug, Deserialize)]
pub struct GoalForm {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub category: GoalCategory,
    #[serde(default)]
    pub priority: GoalPriority,
    pub target_date: Option<NaiveDate>,
    /// UI status string; unrecognized values persist as `active`.
    pub status: Option<String>,
    /// Only honoured on edit; new goals always start at 0.
    pub progress_percentage: Option<i64>,
}

impl GoalForm {
    fn validate(&self) -> Result<NaiveDate, AppError> {
        if self.title.trim().is_empty() {
            return Err(AppError::Validation("Please enter a goal title".to_string()));
        }
        self.target_date
            .ok_or_else(|| AppError::Validation("Please select a target date".to_string()))
    }

    /// The submitted UI status, kept as sent. Unrecognized or missing values
    /// read as `not_started`.
    fn ui_status(&self) -> UiStatus {
        self.status
            .as_deref()
            .and_then(UiStatus::parse)
            .unwrap_or(UiStatus::NotStarted)
    }

    fn persisted_status(&self) -> PersistedStatus {
        map_status_to_database(self.status.as_deref().unwrap_or_default())
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: UiStatus,
}

#[derive(Debug, Deserialize)]
pub struct ProgressEdit {
    pub progress_percentage: i64,
}

#[derive(Debug, Serialize)]
pub struct ProgressUpdated {
    pub id: Uuid,
    pub progress_percentage: u8,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/goals
pub async fn handle_list_goals(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<DataResponse<GoalListResponse>>, AppError> {
    let goals: Vec<GoalView> = repo::list_goals(state.store.as_ref(), user.id())
        .await?
        .into_iter()
        .map(GoalView::from_row)
        .collect();
    let summary = GoalSummary::from_views(&goals);
    Ok(DataResponse::json(GoalListResponse { goals, summary }))
}

/// POST /api/v1/goals
///
/// The returned view is re-read from storage, so a goal created as
/// `in_progress` comes back as `not_started`.
pub async fn handle_create_goal(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(form): JsonBody<GoalForm>,
) -> Result<(StatusCode, Json<DataResponse<GoalView>>), AppError> {
    let target_date = form.validate()?;
    let now = Utc::now();

    let row = json!({
        "id": Uuid::new_v4(),
        "user_id": user.id(),
        "title": form.title.trim(),
        "description": form.description,
        "category": form.category,
        "priority": form.priority,
        "target_date": target_date,
        "status": form.persisted_status(),
        "progress_percentage": 0,
        "created_at": now,
        "updated_at": now,
    });
    let goal = repo::insert_goal(state.store.as_ref(), row).await?;
    info!("Created goal {} for user {}", goal.id, user.id());

    Ok((StatusCode::CREATED, DataResponse::json(GoalView::from_row(goal))))
}

/// PUT /api/v1/goals/:id
///
/// Full edit form. Progress is stored as entered (clamped); the status-change
/// progress heuristic does not apply here.
pub async fn handle_update_goal(
    State(state): State<AppState>,
    user: AuthUser,
    Path(goal_id): Path<Uuid>,
    JsonBody(form): JsonBody<GoalForm>,
) -> Result<Json<DataResponse<GoalView>>, AppError> {
    let target_date = form.validate()?;
    let ui_status = form.ui_status();

    let mut patch = json!({
        "title": form.title.trim(),
        "description": form.description,
        "category": form.category,
        "priority": form.priority,
        "target_date": target_date,
        "status": form.persisted_status(),
        "updated_at": Utc::now(),
    });
    if let Some(progress) = form.progress_percentage {
        patch["progress_percentage"] = json!(clamp_progress(progress));
    }

    let goal = repo::update_goal(state.store.as_ref(), user.id(), goal_id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Goal {goal_id} not found")))?;

    Ok(DataResponse::json(GoalView::with_status(goal, ui_status)))
}

/// PATCH /api/v1/goals/:id/status
///
/// Applies the status-change progress heuristic: `completed` forces 100,
/// `in_progress` raises progress to at least 10.
pub async fn handle_change_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(goal_id): Path<Uuid>,
    JsonBody(change): JsonBody<StatusChange>,
) -> Result<Json<DataResponse<GoalView>>, AppError> {
    let store = state.store.as_ref();
    let current = repo::get_goal(store, user.id(), goal_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Goal {goal_id} not found")))?;

    let progress = progress_for_status_change(change.status, current.progress_percentage);
    let patch = json!({
        "status": change.status.to_persisted(),
        "progress_percentage": progress,
        "updated_at": Utc::now(),
    });
    let goal = repo::update_goal(store, user.id(), goal_id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Goal {goal_id} not found")))?;

    info!(
        "Goal {goal_id} status -> {} ({}%)",
        change.status, progress
    );
    Ok(DataResponse::json(GoalView::with_status(goal, change.status)))
}

/// PATCH /api/v1/goals/:id/progress
///
/// Direct percentage/slider edit: clamps to [0, 100], never touches status.
pub async fn handle_set_progress(
    State(state): State<AppState>,
    user: AuthUser,
    Path(goal_id): Path<Uuid>,
    JsonBody(edit): JsonBody<ProgressEdit>,
) -> Result<Json<DataResponse<ProgressUpdated>>, AppError> {
    let progress = clamp_progress(edit.progress_percentage);
    let patch = json!({
        "progress_percentage": progress,
        "updated_at": Utc::now(),
    });
    repo::update_goal(state.store.as_ref(), user.id(), goal_id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Goal {goal_id} not found")))?;

    Ok(DataResponse::json(ProgressUpdated {
        id: goal_id,
        progress_percentage: progress,
    }))
}

/// DELETE /api/v1/goals/:id
pub async fn handle_delete_goal(
    State(state): State<AppState>,
    user: AuthUser,
    Path(goal_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    repo::delete_goal(state.store.as_ref(), user.id(), goal_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::http::Method;
    use serde_json::{json, Value};

    use crate::models::tables::CAREER_GOALS;
    use crate::test_support::{goal_row, send, TestApp, TOKEN};

    #[tokio::test]
    async fn test_list_maps_persisted_statuses() {
        let app = TestApp::new();
        app.store.seed(
            CAREER_GOALS,
            vec![
                goal_row(app.user_id, "active", 30),
                goal_row(app.user_id, "completed", 100),
                goal_row(app.user_id, "cancelled", 5),
            ],
        );

        let (status, body) = send(app.router(), Method::GET, "/api/v1/goals", Some(TOKEN), None).await;
        assert_eq!(status, 200);
        let statuses: Vec<&str> = body["data"]["goals"]
            .as_array()
            .unwrap()
            .iter()
            .map(|g| g["status"].as_str().unwrap())
            .collect();
        assert!(statuses.contains(&"not_started"));
        assert!(statuses.contains(&"completed"));
        assert!(statuses.contains(&"on_hold"));
        assert_eq!(body["data"]["summary"]["completion_rate"], 33);
    }

    #[tokio::test]
    async fn test_create_in_progress_reads_back_not_started() {
        let app = TestApp::new();
        let (status, body) = send(
            app.router(),
            Method::POST,
            "/api/v1/goals",
            Some(TOKEN),
            Some(json!({
                "title": "Learn Rust",
                "category": "skills",
                "priority": "high",
                "target_date": "2026-12-31",
                "status": "in_progress"
            })),
        )
        .await;
        assert_eq!(status, 201);
        assert_eq!(body["data"]["status"], "not_started");
        assert_eq!(body["data"]["progress_percentage"], 0);
        assert_eq!(app.store.rows(CAREER_GOALS)[0]["status"], "active");
    }

    #[tokio::test]
    async fn test_create_requires_title_before_any_write() {
        let app = TestApp::new();
        let (status, body) = send(
            app.router(),
            Method::POST,
            "/api/v1/goals",
            Some(TOKEN),
            Some(json!({"title": "  ", "target_date": "2026-12-31"})),
        )
        .await;
        assert_eq!(status, 400);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(app.store.rows(CAREER_GOALS).is_empty());
    }

    #[tokio::test]
    async fn test_status_completed_forces_full_progress() {
        let app = TestApp::new();
        let row = goal_row(app.user_id, "active", 40);
        let id = row["id"].as_str().unwrap().to_string();
        app.store.seed(CAREER_GOALS, vec![row]);

        let (status, body) = send(
            app.router(),
            Method::PATCH,
            &format!("/api/v1/goals/{id}/status"),
            Some(TOKEN),
            Some(json!({"status": "completed"})),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["data"]["progress_percentage"], 100);
        assert_eq!(app.store.rows(CAREER_GOALS)[0]["status"], "completed");
    }

    #[tokio::test]
    async fn test_status_in_progress_echoes_caller_value() {
        let app = TestApp::new();
        let row = goal_row(app.user_id, "active", 0);
        let id = row["id"].as_str().unwrap().to_string();
        app.store.seed(CAREER_GOALS, vec![row]);

        let (_, body) = send(
            app.router(),
            Method::PATCH,
            &format!("/api/v1/goals/{id}/status"),
            Some(TOKEN),
            Some(json!({"status": "in_progress"})),
        )
        .await;
        assert_eq!(body["data"]["status"], "in_progress");
        assert_eq!(body["data"]["progress_percentage"], 10);

        // Storage only knows "active"; a fresh read loses the distinction.
        let (_, listed) = send(app.router(), Method::GET, "/api/v1/goals", Some(TOKEN), None).await;
        assert_eq!(listed["data"]["goals"][0]["status"], "not_started");
    }

    #[tokio::test]
    async fn test_progress_edit_clamps_without_heuristic() {
        let app = TestApp::new();
        let row = goal_row(app.user_id, "active", 50);
        let id = row["id"].as_str().unwrap().to_string();
        app.store.seed(CAREER_GOALS, vec![row]);

        let (status, body) = send(
            app.router(),
            Method::PATCH,
            &format!("/api/v1/goals/{id}/progress"),
            Some(TOKEN),
            Some(json!({"progress_percentage": 150})),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["data"]["progress_percentage"], 100);
        let stored: Value = app.store.rows(CAREER_GOALS)[0].clone();
        assert_eq!(stored["progress_percentage"], 100);
        assert_eq!(stored["status"], "active");

        let (_, body) = send(
            app.router(),
            Method::PATCH,
            &format!("/api/v1/goals/{id}/progress"),
            Some(TOKEN),
            Some(json!({"progress_percentage": -5})),
        )
        .await;
        assert_eq!(body["data"]["progress_percentage"], 0);
    }

    #[tokio::test]
    async fn test_edit_form_echoes_in_progress_and_stores_progress_as_entered() {
        let app = TestApp::new();
        let row = goal_row(app.user_id, "active", 10);
        let id = row["id"].as_str().unwrap().to_string();
        app.store.seed(CAREER_GOALS, vec![row]);

        let (status, body) = send(
            app.router(),
            Method::PUT,
            &format!("/api/v1/goals/{id}"),
            Some(TOKEN),
            Some(json!({
                "title": "Learn Rust",
                "target_date": "2026-12-31",
                "status": "in_progress",
                "progress_percentage": 30
            })),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["data"]["status"], "in_progress");
        assert_eq!(body["data"]["progress_percentage"], 30);
        let stored = app.store.rows(CAREER_GOALS)[0].clone();
        assert_eq!(stored["status"], "active");
        assert_eq!(stored["progress_percentage"], 30);
        assert_eq!(stored["title"], "Learn Rust");
    }

    #[tokio::test]
    async fn test_edit_form_completed_keeps_entered_progress() {
        let app = TestApp::new();
        let row = goal_row(app.user_id, "active", 10);
        let id = row["id"].as_str().unwrap().to_string();
        app.store.seed(CAREER_GOALS, vec![row]);

        let (status, body) = send(
            app.router(),
            Method::PUT,
            &format!("/api/v1/goals/{id}"),
            Some(TOKEN),
            Some(json!({
                "title": "Ship it",
                "target_date": "2026-12-31",
                "status": "completed",
                "progress_percentage": 140
            })),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["data"]["status"], "completed");
        let stored = app.store.rows(CAREER_GOALS)[0].clone();
        assert_eq!(stored["status"], "completed");
        assert_eq!(stored["progress_percentage"], 100);

        let (_, body) = send(
            app.router(),
            Method::PUT,
            &format!("/api/v1/goals/{id}"),
            Some(TOKEN),
            Some(json!({
                "title": "Ship it",
                "target_date": "2026-12-31",
                "status": "completed",
                "progress_percentage": 60
            })),
        )
        .await;
        assert_eq!(body["data"]["progress_percentage"], 60);
        assert_eq!(app.store.rows(CAREER_GOALS)[0]["progress_percentage"], 60);
    }

    #[tokio::test]
    async fn test_update_unknown_goal_is_not_found() {
        let app = TestApp::new();
        let (status, body) = send(
            app.router(),
            Method::PATCH,
            &format!("/api/v1/goals/{}/progress", uuid::Uuid::new_v4()),
            Some(TOKEN),
            Some(json!({"progress_percentage": 20})),
        )
        .await;
        assert_eq!(status, 404);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_goals_require_token() {
        let app = TestApp::new();
        let (status, body) = send(app.router(), Method::GET, "/api/v1/goals", None, None).await;
        assert_eq!(status, 401);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }
}
