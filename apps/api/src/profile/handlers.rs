//! Profile and onboarding (setup) endpoints.

use axum::{extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::profile::UserProfile;
use crate::profile::repo;
use crate::response::{DataResponse, JsonBody};
use crate::state::AppState;
use crate::store::StoreError;

pub const INDUSTRIES: [&str; 10] = [
    "AI/Artificial Intelligence",
    "Internet/Technology",
    "Finance/Investment",
    "Consulting/Management",
    "Startup/Entrepreneurship",
    "Education/Training",
    "Healthcare/Biotechnology",
    "Manufacturing/Engineering",
    "Media/Entertainment",
    "Other",
];

pub const POSITION_LEVELS: [&str; 6] = [
    "Junior (0-2 years)",
    "Mid-level (3-5 years)",
    "Senior (6-8 years)",
    "Expert (9+ years)",
    "Management",
    "Executive/Founder",
];

pub const CAREER_GOALS: [&str; 6] = [
    "Technical Expert Path",
    "Management Development Path",
    "Entrepreneurship Direction",
    "Cross-Industry Development",
    "Freelancing",
    "Still Exploring",
];

pub const SALARY_RANGES: [&str; 8] = [
    "Under $100K",
    "$100K-200K",
    "$200K-500K",
    "$500K-1M",
    "$1M-2M",
    "$2M-5M",
    "$5M-10M",
    "Over $10M (Aim for the top!)",
];

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile: UserProfile,
    /// False when no row exists yet and `profile` is a draft built from the identity.
    pub exists: bool,
}

/// Editable profile fields. Absent fields are left untouched on save.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ProfileForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_years: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_salary: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub career_journey: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education_certifications: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mbti_type: Option<String>,
}

/// Onboarding questionnaire. All five answers are required.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SetupForm {
    #[serde(alias = "expectedSalary")]
    pub expected_salary: String,
    pub industry: String,
    #[serde(alias = "professionalBackground")]
    pub professional_background: String,
    #[serde(alias = "positionLevel")]
    pub position_level: String,
    #[serde(alias = "careerGoal")]
    pub career_goal: String,
}

impl SetupForm {
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("expected_salary", &self.expected_salary),
            ("industry", &self.industry),
            ("professional_background", &self.professional_background),
            ("position_level", &self.position_level),
            ("career_goal", &self.career_goal),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

#[derive(Debug, Serialize)]
pub struct SetupCompleted {
    pub id: Option<Uuid>,
    pub setup_completed: bool,
}

/// GET /api/v1/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<DataResponse<ProfileResponse>>, AppError> {
    let response = match repo::get_profile(state.store.as_ref(), user.id()).await? {
        Some(profile) => ProfileResponse {
            profile,
            exists: true,
        },
        None => ProfileResponse {
            profile: UserProfile {
                user_id: user.id(),
                email: user.0.email.clone(),
                full_name: user.0.display_name(),
                ..UserProfile::default()
            },
            exists: false,
        },
    };
    Ok(DataResponse::json(response))
}

/// PUT /api/v1/profile
///
/// Creates the row on first save (upsert on `user_id`).
pub async fn handle_save_profile(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(form): JsonBody<ProfileForm>,
) -> Result<Json<DataResponse<UserProfile>>, AppError> {
    let mut row = serde_json::to_value(&form).map_err(StoreError::from)?;
    row["user_id"] = json!(user.id());
    row["updated_at"] = json!(Utc::now());
    if let Some(email) = &user.0.email {
        row["email"] = json!(email);
    }

    let profile = repo::upsert_profile(state.store.as_ref(), row).await?;
    info!("Saved profile for user {}", user.id());
    Ok(DataResponse::json(profile))
}

/// POST /api/v1/setup
pub async fn handle_complete_setup(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(form): JsonBody<SetupForm>,
) -> Result<Json<DataResponse<SetupCompleted>>, AppError> {
    let missing = form.missing_fields();
    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    let now = Utc::now();
    let row = json!({
        "user_id": user.id(),
        "expected_salary": form.expected_salary.trim(),
        "industry": form.industry.trim(),
        "professional_background": form.professional_background.trim(),
        "position_level": form.position_level.trim(),
        "career_goal": form.career_goal.trim(),
        "setup_completed": true,
        "setup_completed_at": now,
        "full_name": user.0.display_name(),
        "email": user.0.email,
        "updated_at": now,
    });
    let profile = repo::upsert_profile(state.store.as_ref(), row).await?;
    info!("User {} completed setup", user.id());

    Ok(DataResponse::json(SetupCompleted {
        id: profile.id,
        setup_completed: profile.is_setup_completed(),
    }))
}

/// GET /api/v1/setup/options
pub async fn handle_setup_options() -> Json<DataResponse<Value>> {
    DataResponse::json(json!({
        "salary_ranges": SALARY_RANGES,
        "industries": INDUSTRIES,
        "position_levels": POSITION_LEVELS,
        "career_goals": CAREER_GOALS,
    }))
}
