//! Client route gate.
//!
//! Decides, for a browser path and the caller's session, whether the page may
//! render, must redirect, or has to wait for the setup check to finish.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::response::DataResponse;
use crate::session::{SessionContext, SetupStatus};
use crate::state::AppState;

pub const LOGIN: &str = "/login";
pub const SETUP: &str = "/setup";
pub const HOME: &str = "/dashboard";

const PUBLIC_ROUTES: [&str; 2] = ["/login", "/register"];

/// Pages behind both sign-in and completed onboarding.
const APP_ROUTES: [&str; 7] = [
    "/dashboard",
    "/profile",
    "/assessment",
    "/goals",
    "/recommendations",
    "/progress",
    "/mentors",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum RouteDecision {
    Render { path: String },
    Redirect { to: String },
    /// Signed in, but the setup check has not resolved yet.
    Pending,
}

fn redirect(to: &str) -> RouteDecision {
    RouteDecision::Redirect { to: to.to_string() }
}

/// Gate for pages that need sign-in and completed onboarding.
fn configured_only(session: &SessionContext, then: RouteDecision) -> RouteDecision {
    if !session.is_authenticated() {
        return redirect(LOGIN);
    }
    match session.setup() {
        SetupStatus::Completed => then,
        SetupStatus::Incomplete => redirect(SETUP),
        SetupStatus::Unknown => RouteDecision::Pending,
    }
}

pub fn resolve_route(path: &str, session: &SessionContext) -> RouteDecision {
    let path = match path.trim_end_matches('/') {
        "" => "/",
        p => p,
    };

    if PUBLIC_ROUTES.contains(&path) {
        return RouteDecision::Render {
            path: path.to_string(),
        };
    }
    if path == SETUP {
        return if session.is_authenticated() {
            RouteDecision::Render {
                path: SETUP.to_string(),
            }
        } else {
            redirect(LOGIN)
        };
    }
    if path == "/" {
        return configured_only(session, redirect(HOME));
    }
    if APP_ROUTES.contains(&path) {
        return configured_only(
            session,
            RouteDecision::Render {
                path: path.to_string(),
            },
        );
    }
    redirect(HOME)
}

#[derive(Debug, Deserialize)]
pub struct NavigationQuery {
    pub path: String,
}

/// GET /api/v1/navigation?path=
///
/// Works without a token: an anonymous caller gets the unauthenticated decision.
pub async fn handle_navigation(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Query(query): Query<NavigationQuery>,
) -> Result<Json<DataResponse<RouteDecision>>, AppError> {
    let session = match user {
        Some(AuthUser(identity)) => {
            let mut session = SessionContext::login(identity);
            session.refresh_setup(state.store.as_ref()).await;
            session
        }
        None => SessionContext::anonymous(),
    };
    Ok(DataResponse::json(resolve_route(&query.path, &session)))
}
