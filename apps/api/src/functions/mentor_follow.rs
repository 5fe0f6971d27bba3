use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::mentors::repo;
use crate::models::mentor::MentorFollow;
use crate::response::{DataResponse, JsonBody};
use crate::state::AppState;

pub const ERROR_CODE: &str = "MENTOR_FOLLOW_ERROR";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowAction {
    Follow,
    Unfollow,
}

impl FollowAction {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "follow" => Some(FollowAction::Follow),
            "unfollow" => Some(FollowAction::Unfollow),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowRequest {
    pub mentor_id: Option<Uuid>,
    pub action: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowResponse {
    pub success: bool,
    pub action: FollowAction,
    pub mentor_id: Uuid,
    /// The inserted join row; null after an unfollow.
    pub follow: Option<MentorFollow>,
}

/// POST /functions/v1/mentor-follow
pub async fn handle_mentor_follow(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(request): JsonBody<FollowRequest>,
) -> Result<Json<DataResponse<FollowResponse>>, AppError> {
    let (Some(mentor_id), Some(action)) = (request.mentor_id, request.action.as_deref()) else {
        return Err(AppError::Validation(
            "mentorId and action are required".to_string(),
        ));
    };
    let action = FollowAction::parse(action).ok_or_else(|| {
        AppError::Validation(r#"action must be "follow" or "unfollow""#.to_string())
    })?;

    let store = state.store.as_ref();
    let follow = match action {
        FollowAction::Follow => Some(
            repo::follow(store, user.id(), mentor_id)
                .await
                .map_err(|e| AppError::from(e).in_handler(ERROR_CODE))?,
        ),
        FollowAction::Unfollow => {
            repo::unfollow(store, user.id(), mentor_id)
                .await
                .map_err(|e| AppError::from(e).in_handler(ERROR_CODE))?;
            None
        }
    };
    info!("User {} {:?} mentor {mentor_id}", user.id(), action);

    Ok(DataResponse::json(FollowResponse {
        success: true,
        action,
        mentor_id,
        follow,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::Method;
    use serde_json::json;
    use uuid::Uuid;

    use crate::models::tables::USER_MENTOR_FOLLOWS;
    use crate::store::memory::MemoryStore;
    use crate::test_support::{send, TestApp, TOKEN};

    const PATH: &str = "/functions/v1/mentor-follow";

    #[tokio::test]
    async fn test_follow_then_unfollow() {
        let app = TestApp::new();
        let mentor_id = Uuid::new_v4();

        let (status, body) = send(
            app.router(),
            Method::POST,
            PATH,
            Some(TOKEN),
            Some(json!({"mentorId": mentor_id, "action": "follow"})),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["data"]["success"], true);
        assert_eq!(body["data"]["action"], "follow");
        assert_eq!(body["data"]["follow"]["mentor_id"], mentor_id.to_string());
        assert_eq!(app.store.rows(USER_MENTOR_FOLLOWS).len(), 1);

        let (status, body) = send(
            app.router(),
            Method::POST,
            PATH,
            Some(TOKEN),
            Some(json!({"mentorId": mentor_id, "action": "unfollow"})),
        )
        .await;
        assert_eq!(status, 200);
        assert!(body["data"]["follow"].is_null());
        assert!(app.store.rows(USER_MENTOR_FOLLOWS).is_empty());
    }

    #[tokio::test]
    async fn test_rejects_unknown_action() {
        let app = TestApp::new();
        let (status, body) = send(
            app.router(),
            Method::POST,
            PATH,
            Some(TOKEN),
            Some(json!({"mentorId": Uuid::new_v4(), "action": "block"})),
        )
        .await;
        assert_eq!(status, 400);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_store_failure_uses_handler_code() {
        let app = TestApp::with_store(MemoryStore::failing());
        let (status, body) = send(
            app.router(),
            Method::POST,
            PATH,
            Some(TOKEN),
            Some(json!({"mentorId": Uuid::new_v4(), "action": "follow"})),
        )
        .await;
        assert_eq!(status, 500);
        assert_eq!(body["error"]["code"], "MENTOR_FOLLOW_ERROR");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("backend unavailable"));
    }

    #[tokio::test]
    async fn test_requires_token() {
        let app = TestApp::new();
        let (status, body) = send(
            app.router(),
            Method::POST,
            PATH,
            None,
            Some(json!({"mentorId": Uuid::new_v4(), "action": "follow"})),
        )
        .await;
        assert_eq!(status, 401);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }
}
