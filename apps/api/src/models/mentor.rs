use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mentor {
    pub id: Uuid,
    pub name: String,
    pub title: Option<String>,
    pub bio: Option<String>,
    pub twitter_handle: Option<String>,
    pub avatar_url: Option<String>,
    /// "quotes" or "journey".
    pub category: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Join row: `user_id` follows `mentor_id`. Inserted or deleted, never updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentorFollow {
    pub id: Option<Uuid>,
    pub user_id: Uuid,
    pub mentor_id: Uuid,
    pub created_at: Option<DateTime<Utc>>,
}
