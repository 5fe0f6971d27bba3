use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::date_or_timestamp;

/// A self-assessed skill level on a 0–10 scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillAssessment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub skill_name: Option<String>,
    pub category: Option<String>,
    pub dimension: Option<String>,
    pub current_level: f64,
    pub target_level: Option<f64>,
    pub confidence_score: Option<f64>,
    #[serde(default, deserialize_with = "date_or_timestamp")]
    pub assessment_date: Option<DateTime<Utc>>,
}

impl SkillAssessment {
    /// Grouping key for per-category aggregates: category, else dimension.
    pub fn group_key(&self) -> &str {
        self.category
            .as_deref()
            .or(self.dimension.as_deref())
            .unwrap_or("General")
    }

    /// `current_level` on the 0–100 display scale.
    pub fn display_level(&self) -> f64 {
        self.current_level * 10.0
    }

    pub fn gap(&self) -> f64 {
        self.target_level.map(|t| t - self.current_level).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(date: serde_json::Value) -> serde_json::Value {
        json!({
            "id": Uuid::new_v4(),
            "user_id": Uuid::new_v4(),
            "skill_name": "python",
            "current_level": 6.0,
            "assessment_date": date
        })
    }

    #[test]
    fn test_assessment_date_accepts_date_or_timestamp() {
        let from_date: SkillAssessment = serde_json::from_value(row(json!("2024-03-01"))).unwrap();
        let from_ts: SkillAssessment =
            serde_json::from_value(row(json!("2024-03-01T00:00:00+00:00"))).unwrap();
        assert!(from_date.assessment_date.is_some());
        assert_eq!(from_date.assessment_date, from_ts.assessment_date);

        let undated: SkillAssessment = serde_json::from_value(row(json!(null))).unwrap();
        assert_eq!(undated.assessment_date, None);
        assert!(serde_json::from_value::<SkillAssessment>(row(json!("March"))).is_err());
    }
}
