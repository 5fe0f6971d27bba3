use serde_json::Value;
use uuid::Uuid;

use crate::models::profile::UserProfile;
use crate::models::tables::USER_PROFILES;
use crate::store::{decode, fetch_optional, Query, RowStore, StoreError};

pub async fn get_profile(
    store: &dyn RowStore,
    user_id: Uuid,
) -> Result<Option<UserProfile>, StoreError> {
    fetch_optional(store, USER_PROFILES, Query::new().eq("user_id", user_id)).await
}

/// Creates the user's profile row or merges `row` into the existing one.
pub async fn upsert_profile(store: &dyn RowStore, row: Value) -> Result<UserProfile, StoreError> {
    decode(store.upsert(USER_PROFILES, row, "user_id").await?)
}

/// Patches an existing profile. Returns `None` when the user has no row yet.
pub async fn patch_profile(
    store: &dyn RowStore,
    user_id: Uuid,
    patch: Value,
) -> Result<Option<UserProfile>, StoreError> {
    let rows = store
        .update(USER_PROFILES, &Query::new().eq("user_id", user_id), patch)
        .await?;
    rows.into_iter().next().map(decode).transpose()
}
