use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// A generated recommendation. Never edited by the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub recommendation_type: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority_score: f64,
    pub content: Option<Value>,
    pub status: Option<String>,
    pub is_active: Option<bool>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}
