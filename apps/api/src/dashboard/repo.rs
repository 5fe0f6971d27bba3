use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::models::activity::{Achievement, LearningActivity, ProgressRecord};
use crate::models::assessment::SkillAssessment;
use crate::models::tables::{ACHIEVEMENTS, LEARNING_ACTIVITIES, PROGRESS_RECORDS, SKILL_ASSESSMENTS};
use crate::store::{fetch_all, Direction, Query, RowStore, StoreError};

/// Skill assessments, most recent first.
pub async fn list_assessments(
    store: &dyn RowStore,
    user_id: Uuid,
) -> Result<Vec<SkillAssessment>, StoreError> {
    let query = Query::new()
        .eq("user_id", user_id)
        .order_by("assessment_date", Direction::Desc);
    fetch_all(store, SKILL_ASSESSMENTS, &query).await
}

/// Learning activities, optionally only those created at or after `since`.
pub async fn list_learning_activities(
    store: &dyn RowStore,
    user_id: Uuid,
    since: Option<DateTime<Utc>>,
) -> Result<Vec<LearningActivity>, StoreError> {
    let mut query = Query::new().eq("user_id", user_id);
    if let Some(since) = since {
        query = query.gte("created_at", since.to_rfc3339_opts(SecondsFormat::Secs, true));
    }
    fetch_all(store, LEARNING_ACTIVITIES, &query).await
}

pub async fn list_achievements(
    store: &dyn RowStore,
    user_id: Uuid,
) -> Result<Vec<Achievement>, StoreError> {
    fetch_all(store, ACHIEVEMENTS, &Query::new().eq("user_id", user_id)).await
}

/// Progress records ordered by `record_date`, optionally bounded below by `since`.
pub async fn list_progress_records(
    store: &dyn RowStore,
    user_id: Uuid,
    since: Option<DateTime<Utc>>,
    order: Direction,
    limit: Option<usize>,
) -> Result<Vec<ProgressRecord>, StoreError> {
    let mut query = Query::new().eq("user_id", user_id);
    if let Some(since) = since {
        query = query.gte("record_date", since.date_naive());
    }
    query = query.order_by("record_date", order);
    if let Some(n) = limit {
        query = query.limit(n);
    }
    fetch_all(store, PROGRESS_RECORDS, &query).await
}
