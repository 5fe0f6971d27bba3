use serde_json::Value;
use uuid::Uuid;

use crate::goals::status::PersistedStatus;
use crate::models::goal::CareerGoal;
use crate::models::tables::CAREER_GOALS;
use crate::store::{decode, fetch_all, fetch_optional, Direction, Query, RowStore, StoreError};

/// All goals for a user, newest first.
pub async fn list_goals(store: &dyn RowStore, user_id: Uuid) -> Result<Vec<CareerGoal>, StoreError> {
    fetch_all(
        store,
        CAREER_GOALS,
        &Query::new()
            .eq("user_id", user_id)
            .order_by("created_at", Direction::Desc),
    )
    .await
}

/// Goals in one persisted status, newest first.
pub async fn list_goals_with_status(
    store: &dyn RowStore,
    user_id: Uuid,
    status: PersistedStatus,
) -> Result<Vec<CareerGoal>, StoreError> {
    fetch_all(
        store,
        CAREER_GOALS,
        &Query::new()
            .eq("user_id", user_id)
            .eq("status", status)
            .order_by("created_at", Direction::Desc),
    )
    .await
}

pub async fn get_goal(
    store: &dyn RowStore,
    user_id: Uuid,
    goal_id: Uuid,
) -> Result<Option<CareerGoal>, StoreError> {
    fetch_optional(
        store,
        CAREER_GOALS,
        Query::new().eq("id", goal_id).eq("user_id", user_id),
    )
    .await
}

pub async fn insert_goal(store: &dyn RowStore, row: Value) -> Result<CareerGoal, StoreError> {
    decode(store.insert(CAREER_GOALS, row).await?)
}

/// Patches one goal. Returns `None` when no row matched.
pub async fn update_goal(
    store: &dyn RowStore,
    user_id: Uuid,
    goal_id: Uuid,
    patch: Value,
) -> Result<Option<CareerGoal>, StoreError> {
    let rows = store
        .update(
            CAREER_GOALS,
            &Query::new().eq("id", goal_id).eq("user_id", user_id),
            patch,
        )
        .await?;
    rows.into_iter().next().map(decode).transpose()
}

pub async fn delete_goal(store: &dyn RowStore, user_id: Uuid, goal_id: Uuid) -> Result<(), StoreError> {
    store
        .delete(
            CAREER_GOALS,
            &Query::new().eq("id", goal_id).eq("user_id", user_id),
        )
        .await
}
