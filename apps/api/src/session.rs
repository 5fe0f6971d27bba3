//! Per-user session context: who is signed in and whether onboarding is done.
//!
//! A `SessionContext` is created on login, refreshed against the profile row,
//! and cleared on logout. Nothing here is global; handlers build one per request.

use axum::{
    extract::State,
    http::{header, HeaderMap},
    Json,
};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::{bearer_token, AuthUser, Identity};
use crate::errors::AppError;
use crate::profile::repo::get_profile;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::store::RowStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SetupStatus {
    /// Not checked yet, or nobody is signed in.
    #[default]
    Unknown,
    Incomplete,
    Completed,
}

#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    identity: Option<Identity>,
    setup: SetupStatus,
}

impl SessionContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Starts a session for `identity`. Setup state stays unknown until refreshed.
    pub fn login(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
            setup: SetupStatus::Unknown,
        }
    }

    pub fn logout(&mut self) {
        self.identity = None;
        self.setup = SetupStatus::Unknown;
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub fn setup(&self) -> SetupStatus {
        self.setup
    }

    /// Re-reads `setup_completed` from the profile row. A missing row or a
    /// failed read both count as incomplete.
    pub async fn refresh_setup(&mut self, store: &dyn RowStore) -> SetupStatus {
        let Some(identity) = &self.identity else {
            self.setup = SetupStatus::Unknown;
            return self.setup;
        };
        self.setup = match get_profile(store, identity.id).await {
            Ok(Some(profile)) if profile.is_setup_completed() => SetupStatus::Completed,
            Ok(_) => SetupStatus::Incomplete,
            Err(e) => {
                warn!("Setup status check failed for user {}: {e}", identity.id);
                SetupStatus::Incomplete
            }
        };
        debug!("User {} setup status: {:?}", identity.id, self.setup);
        self.setup
    }
}

#[derive(Debug, Serialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: SessionUser,
    pub setup_status: SetupStatus,
}

/// GET /api/v1/session
pub async fn handle_session(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<DataResponse<SessionResponse>>, AppError> {
    let mut session = SessionContext::login(identity.clone());
    let setup_status = session.refresh_setup(state.store.as_ref()).await;
    Ok(DataResponse::json(SessionResponse {
        user: SessionUser {
            id: identity.id,
            display_name: identity.display_name(),
            email: identity.email,
        },
        setup_status,
    }))
}

#[derive(Debug, Serialize)]
pub struct SignedOut {
    pub authenticated: bool,
    pub setup_status: SetupStatus,
}

/// DELETE /api/v1/session
///
/// Revokes the caller's token with the auth service and tears the session down.
pub async fn handle_sign_out(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    headers: HeaderMap,
) -> Result<Json<DataResponse<SignedOut>>, AppError> {
    let token = bearer_token(
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok()),
    )?;
    let user_id = identity.id;
    let mut session = SessionContext::login(identity);
    state.identity.revoke(token).await?;
    session.logout();
    info!("User {user_id} signed out");

    Ok(DataResponse::json(SignedOut {
        authenticated: session.is_authenticated(),
        setup_status: session.setup(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;
    use serde_json::json;

    use crate::models::tables::USER_PROFILES;
    use crate::store::memory::MemoryStore;
    use crate::test_support::{send, test_identity, TestApp, TOKEN};

    #[tokio::test]
    async fn test_refresh_setup_lifecycle() {
        let store = MemoryStore::new();
        let identity = test_identity();
        let mut session = SessionContext::login(identity.clone());
        assert_eq!(session.setup(), SetupStatus::Unknown);

        assert_eq!(session.refresh_setup(&store).await, SetupStatus::Incomplete);

        store.seed(
            USER_PROFILES,
            vec![json!({"user_id": identity.id, "setup_completed": true})],
        );
        assert_eq!(session.refresh_setup(&store).await, SetupStatus::Completed);

        session.logout();
        assert!(!session.is_authenticated());
        assert_eq!(session.setup(), SetupStatus::Unknown);
        assert_eq!(session.refresh_setup(&store).await, SetupStatus::Unknown);
    }

    #[tokio::test]
    async fn test_refresh_setup_failure_counts_as_incomplete() {
        let mut session = SessionContext::login(test_identity());
        let status = session.refresh_setup(&MemoryStore::failing()).await;
        assert_eq!(status, SetupStatus::Incomplete);
    }

    #[tokio::test]
    async fn test_session_endpoint() {
        let app = TestApp::new();
        let (status, body) =
            send(app.router(), Method::GET, "/api/v1/session", Some(TOKEN), None).await;
        assert_eq!(status, 200);
        assert_eq!(body["data"]["setup_status"], "incomplete");
        assert_eq!(body["data"]["user"]["display_name"], "Ada Lovelace");
    }

    #[tokio::test]
    async fn test_sign_out_revokes_token() {
        let app = TestApp::new();
        let router = app.router();

        let (status, body) = send(
            router.clone(),
            Method::DELETE,
            "/api/v1/session",
            Some(TOKEN),
            None,
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["data"]["authenticated"], false);
        assert_eq!(body["data"]["setup_status"], "unknown");

        let (status, body) =
            send(router, Method::GET, "/api/v1/session", Some(TOKEN), None).await;
        assert_eq!(status, 401);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_sign_out_requires_token() {
        let app = TestApp::new();
        let (status, _) =
            send(app.router(), Method::DELETE, "/api/v1/session", None, None).await;
        assert_eq!(status, 401);
    }
}
