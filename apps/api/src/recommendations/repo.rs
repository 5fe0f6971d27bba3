use serde_json::Value;
use uuid::Uuid;

use crate::models::recommendation::Recommendation;
use crate::models::tables::RECOMMENDATIONS;
use crate::store::{decode, fetch_all, fetch_optional, Direction, Query, RowStore, StoreError};

/// Active recommendations, highest priority first.
pub async fn list_active(
    store: &dyn RowStore,
    user_id: Uuid,
) -> Result<Vec<Recommendation>, StoreError> {
    fetch_all(
        store,
        RECOMMENDATIONS,
        &Query::new()
            .eq("user_id", user_id)
            .eq("is_active", true)
            .order_by("priority_score", Direction::Desc),
    )
    .await
}

pub async fn get_recommendation(
    store: &dyn RowStore,
    user_id: Uuid,
    id: Uuid,
) -> Result<Option<Recommendation>, StoreError> {
    fetch_optional(
        store,
        RECOMMENDATIONS,
        Query::new().eq("id", id).eq("user_id", user_id),
    )
    .await
}

pub async fn insert_recommendation(
    store: &dyn RowStore,
    row: Value,
) -> Result<Recommendation, StoreError> {
    decode(store.insert(RECOMMENDATIONS, row).await?)
}
