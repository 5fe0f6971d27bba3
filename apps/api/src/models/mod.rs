pub mod activity;
pub mod assessment;
pub mod goal;
pub mod mentor;
pub mod profile;
pub mod recommendation;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{de, Deserialize, Deserializer};

/// Reads an explicit `null` as the type's default, like a missing key.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts either a full RFC 3339 timestamp or a bare `YYYY-MM-DD` date
/// (midnight UTC), since `date` and `timestamptz` columns both appear.
pub fn date_or_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(text) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Ok(ts) = DateTime::parse_from_rfc3339(&text) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }
    NaiveDate::parse_from_str(&text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| Some(dt.and_utc()))
        .ok_or_else(|| de::Error::custom(format!("invalid date: {text}")))
}

/// Backend table names, one per entity.
pub mod tables {
    pub const USER_PROFILES: &str = "user_profiles";
    pub const CAREER_GOALS: &str = "career_goals";
    pub const SKILL_ASSESSMENTS: &str = "skill_assessments";
    pub const RECOMMENDATIONS: &str = "recommendations";
    pub const MENTORS: &str = "mentors";
    pub const USER_MENTOR_FOLLOWS: &str = "user_mentor_follows";
    pub const PROGRESS_RECORDS: &str = "progress_records";
    pub const ACHIEVEMENTS: &str = "achievements";
    pub const LEARNING_ACTIVITIES: &str = "learning_activities";
}
