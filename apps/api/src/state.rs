use std::sync::Arc;

use crate::auth::IdentityProvider;
use crate::store::RowStore;

/// Shared application state injected into all route handlers via Axum extractors.
/// Immutable after startup; nothing here is mutated per request.
#[derive(Clone)]
pub struct AppState {
    /// Row store: REST row API by default, direct Postgres when `DATABASE_URL` is set.
    pub store: Arc<dyn RowStore>,
    /// Resolves bearer tokens to user identities.
    pub identity: Arc<dyn IdentityProvider>,
}
