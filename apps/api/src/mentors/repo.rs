use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::models::mentor::{Mentor, MentorFollow};
use crate::models::tables::{MENTORS, USER_MENTOR_FOLLOWS};
use crate::store::{decode, fetch_all, Direction, Query, RowStore, StoreError};

/// The full mentor catalogue, oldest entry first.
pub async fn list_mentors(store: &dyn RowStore) -> Result<Vec<Mentor>, StoreError> {
    fetch_all(
        store,
        MENTORS,
        &Query::new().order_by("created_at", Direction::Asc),
    )
    .await
}

pub async fn list_mentors_by_id(
    store: &dyn RowStore,
    ids: &[Uuid],
) -> Result<Vec<Mentor>, StoreError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    fetch_all(store, MENTORS, &Query::new().in_list("id", ids)).await
}

pub async fn list_follows(
    store: &dyn RowStore,
    user_id: Uuid,
) -> Result<Vec<MentorFollow>, StoreError> {
    fetch_all(store, USER_MENTOR_FOLLOWS, &Query::new().eq("user_id", user_id)).await
}

pub async fn follow(
    store: &dyn RowStore,
    user_id: Uuid,
    mentor_id: Uuid,
) -> Result<MentorFollow, StoreError> {
    let row = json!({
        "user_id": user_id,
        "mentor_id": mentor_id,
        "created_at": Utc::now(),
    });
    decode(store.insert(USER_MENTOR_FOLLOWS, row).await?)
}

pub async fn unfollow(store: &dyn RowStore, user_id: Uuid, mentor_id: Uuid) -> Result<(), StoreError> {
    store
        .delete(
            USER_MENTOR_FOLLOWS,
            &Query::new().eq("user_id", user_id).eq("mentor_id", mentor_id),
        )
        .await
}
