use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// One row per user, created on the first profile write or on onboarding.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Option<Uuid>,
    pub user_id: Uuid,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub current_role: Option<String>,
    pub experience_years: Option<i32>,
    /// Annual target in currency units.
    pub target_salary: Option<i64>,
    /// Free-text salary answer from onboarding, e.g. "50万" or "$100K-200K".
    pub expected_salary: Option<String>,
    pub industry: Option<String>,
    pub industry_preference: Option<String>,
    pub professional_background: Option<String>,
    pub position_level: Option<String>,
    pub career_goal: Option<String>,
    pub target_position: Option<String>,
    pub career_journey: Option<String>,
    pub education_certifications: Option<String>,
    pub mbti_type: Option<String>,
    pub personality_traits: Option<Value>,
    pub social_preferences: Option<Value>,
    pub learning_preferences: Option<Value>,
    pub risk_tolerance: Option<Value>,
    pub setup_completed: Option<bool>,
    pub setup_completed_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    pub fn is_setup_completed(&self) -> bool {
        self.setup_completed.unwrap_or(false)
    }
}
