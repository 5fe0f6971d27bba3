//! Bearer-token authentication against the hosted auth service.
//!
//! Every protected handler takes an [`AuthUser`] extractor, which resolves the
//! token through the [`IdentityProvider`] in `AppState` before any row is read.

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

/// Caller identity returned by the auth service's user endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub email: Option<String>,
    pub user_metadata: Option<Value>,
}

impl Identity {
    /// `user_metadata.full_name`, else the local part of the email address.
    pub fn display_name(&self) -> Option<String> {
        self.user_metadata
            .as_ref()
            .and_then(|m| m.get("full_name"))
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
            .or_else(|| {
                self.email
                    .as_deref()
                    .and_then(|e| e.split('@').next())
                    .map(str::to_string)
            })
    }
}

/// Resolves a bearer token to an identity. Carried in `AppState` as
/// `Arc<dyn IdentityProvider>`.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn resolve(&self, token: &str) -> Result<Identity, AppError>;

    /// Ends the session behind `token`; later `resolve` calls reject it.
    async fn revoke(&self, token: &str) -> Result<(), AppError>;
}

/// Token introspection over HTTP: `GET {base}/auth/v1/user`.
#[derive(Clone)]
pub struct AuthClient {
    client: Client,
    base_url: String,
    service_key: String,
}

impl AuthClient {
    pub fn new(client: Client, base_url: &str, service_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
        }
    }
}

#[async_trait]
impl IdentityProvider for AuthClient {
    async fn resolve(&self, token: &str) -> Result<Identity, AppError> {
        let response = self
            .client
            .get(format!("{}/auth/v1/user", self.base_url))
            .bearer_auth(token)
            .header("apikey", &self.service_key)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Auth service unreachable: {e}")))?;

        if !response.status().is_success() {
            warn!("Token rejected by auth service ({})", response.status());
            return Err(AppError::Unauthorized("Invalid token".to_string()));
        }

        response
            .json::<Identity>()
            .await
            .map_err(|e| AppError::Upstream(format!("Malformed identity response: {e}")))
    }

    async fn revoke(&self, token: &str) -> Result<(), AppError> {
        let response = self
            .client
            .post(format!("{}/auth/v1/logout", self.base_url))
            .bearer_auth(token)
            .header("apikey", &self.service_key)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Auth service unreachable: {e}")))?;

        match response.status() {
            s if s.is_success() => Ok(()),
            s if s.as_u16() == 401 || s.as_u16() == 403 => {
                Err(AppError::Unauthorized("Invalid token".to_string()))
            }
            s => Err(AppError::Upstream(format!("Sign-out failed ({s})"))),
        }
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AppError> {
    let header =
        header.ok_or_else(|| AppError::Unauthorized("No authorization header".to_string()))?;
    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or_else(|| {
            AppError::Unauthorized("Invalid authorization format. Expected: Bearer <token>".into())
        })?;
    if token.is_empty() {
        return Err(AppError::Unauthorized("Empty bearer token".to_string()));
    }
    Ok(token)
}

/// Authenticated caller, resolved per request.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

impl AuthUser {
    pub fn id(&self) -> Uuid {
        self.0.id
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok());
        let token = bearer_token(header)?;
        let identity = state.identity.resolve(token).await?;
        Ok(AuthUser(identity))
    }
}

/// Identity provider with a fixed token table, for handler tests. Revoked
/// tokens are dropped from the table.
#[cfg(test)]
pub struct StaticIdentity(std::sync::Mutex<std::collections::HashMap<String, Identity>>);

#[cfg(test)]
impl StaticIdentity {
    pub fn new(tokens: std::collections::HashMap<String, Identity>) -> Self {
        Self(std::sync::Mutex::new(tokens))
    }
}

#[cfg(test)]
#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn resolve(&self, token: &str) -> Result<Identity, AppError> {
        self.0
            .lock()
            .unwrap()
            .get(token)
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Invalid token".to_string()))
    }

    async fn revoke(&self, token: &str) -> Result<(), AppError> {
        self.0
            .lock()
            .unwrap()
            .remove(token)
            .map(|_| ())
            .ok_or_else(|| AppError::Unauthorized("Invalid token".to_string()))
    }
}
