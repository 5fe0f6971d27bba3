//! Shared fixtures for handler tests: an in-memory app and row builders.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use crate::auth::{Identity, StaticIdentity};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::memory::MemoryStore;

pub const TOKEN: &str = "test-token";

pub fn test_identity() -> Identity {
    Identity {
        id: Uuid::new_v4(),
        email: Some("ada@example.com".to_string()),
        user_metadata: Some(json!({"full_name": "Ada Lovelace"})),
    }
}

/// Router over a [`MemoryStore`] with one signed-in user behind [`TOKEN`].
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub user_id: Uuid,
    identity: Identity,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }

    pub fn with_store(store: MemoryStore) -> Self {
        let identity = test_identity();
        Self {
            store: Arc::new(store),
            user_id: identity.id,
            identity,
        }
    }

    pub fn router(&self) -> Router {
        let tokens = HashMap::from([(TOKEN.to_string(), self.identity.clone())]);
        build_router(AppState {
            store: self.store.clone(),
            identity: Arc::new(StaticIdentity::new(tokens)),
        })
    }
}

/// Sends one request and returns the status and the JSON body (`Null` when
/// the body is empty).
pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

pub fn goal_row(user_id: Uuid, status: &str, progress: i64) -> Value {
    json!({
        "id": Uuid::new_v4().to_string(),
        "user_id": user_id,
        "title": format!("Goal ({status})"),
        "description": null,
        "category": "skills",
        "priority": "medium",
        "status": status,
        "progress_percentage": progress,
        "target_date": "2099-12-31",
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-02T00:00:00Z",
    })
}

pub fn mentor_row(name: &str, category: &str, created_at: &str) -> Value {
    let handle = name.to_lowercase().replace(' ', "");
    json!({
        "id": Uuid::new_v4().to_string(),
        "name": name,
        "title": "Founder",
        "bio": format!("{name} on building things"),
        "twitter_handle": handle,
        "avatar_url": null,
        "category": category,
        "created_at": created_at,
    })
}
