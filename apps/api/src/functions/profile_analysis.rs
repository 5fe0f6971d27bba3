//! Personality, skill, learning-style and risk analysis of onboarding answers.
//!
//! `analyze` scores the submitted assessment, matches it against a fixed set of
//! career paths, and writes the derived traits back onto the profile. The
//! write-back is best-effort. `update` merges `profileData` into the profile.

use std::collections::BTreeMap;

use axum::{extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{info, warn};
use uuid::Uuid;

use super::mean;
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::profile::repo::{patch_profile, upsert_profile};
use crate::response::{DataResponse, JsonBody};
use crate::state::AppState;
use crate::store::StoreError;

pub const ERROR_CODE: &str = "PROFILE_ANALYSIS_FAILED";

/// Neutral answer for unanswered 1–10 questions.
const NEUTRAL: f64 = 5.0;

#[derive(Debug, Default, Deserialize)]
pub struct MbtiAnswers {
    #[serde(default)]
    pub responses: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillAnswers {
    #[serde(default)]
    pub technical: Map<String, Value>,
    #[serde(default)]
    pub project_management: Map<String, Value>,
    #[serde(default)]
    pub leadership: Map<String, Value>,
    #[serde(default)]
    pub business: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AssessmentAnswers {
    #[serde(default)]
    pub mbti: MbtiAnswers,
    #[serde(default)]
    pub skills: SkillAnswers,
    #[serde(default)]
    pub learning: Map<String, Value>,
    #[serde(default)]
    pub risk: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileAnalysisRequest {
    #[serde(default)]
    pub profile_data: Map<String, Value>,
    #[serde(default)]
    pub assessment_data: AssessmentAnswers,
    #[serde(default = "default_action")]
    pub action: String,
}

fn default_action() -> String {
    "analyze".to_string()
}

/// Numeric answer for `key`. Missing, non-numeric and zero answers all read
/// as `default`.
fn answer(map: &Map<String, Value>, key: &str, default: f64) -> f64 {
    map.get(key)
        .and_then(Value::as_f64)
        .filter(|v| *v != 0.0)
        .unwrap_or(default)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionLean {
    pub preference: &'static str,
    pub strength: f64,
}

/// Picks the stronger of two poles. Ties and empty answers go to the first.
fn lean(responses: &Map<String, Value>, poles: [&'static str; 2]) -> DimensionLean {
    let scores = poles.map(|p| answer(responses, p, 0.0));
    let total: f64 = scores.iter().sum();
    if total == 0.0 {
        return DimensionLean {
            preference: poles[0],
            strength: 0.5,
        };
    }
    let (preference, max) = if scores[1] > scores[0] {
        (poles[1], scores[1])
    } else {
        (poles[0], scores[0])
    };
    DimensionLean {
        preference,
        strength: max / total,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Traits {
    pub strengths: Vec<&'static str>,
    pub weaknesses: Vec<&'static str>,
}

fn traits_for(mbti: &str) -> Traits {
    let (strengths, weaknesses): (&[&str], &[&str]) = match mbti {
        "INTJ" => (
            &["Strategic thinking", "Independent work", "Innovation"],
            &["Teamwork", "Emotional expression"],
        ),
        "ENTJ" => (
            &["Leadership", "Goal orientation", "Decisiveness"],
            &["Patient listening", "Attention to detail"],
        ),
        "INFP" => (
            &["Creative thinking", "Values-driven", "Adaptability"],
            &["Time management", "Conflict handling"],
        ),
        "ENFP" => (
            &["Innovative thinking", "Interpersonal skills", "Embracing change"],
            &["Detailed execution", "Long-term planning"],
        ),
        _ => (&[], &[]),
    };
    Traits {
        strengths: strengths.to_vec(),
        weaknesses: weaknesses.to_vec(),
    }
}

fn communication_style(mbti: &str) -> &'static str {
    match mbti {
        "INTJ" => "direct_analytical",
        "ENTJ" => "assertive_goal_oriented",
        "INFP" => "empathetic_values_based",
        "ENFP" => "enthusiastic_collaborative",
        _ => "balanced",
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MbtiAnalysis {
    #[serde(rename = "type")]
    pub mbti_type: String,
    pub dimensions: BTreeMap<&'static str, DimensionLean>,
    pub traits: Traits,
    pub communication_style: &'static str,
    pub confidence: f64,
}

const MBTI_AXES: [(&str, [&str; 2], [char; 2]); 4] = [
    ("EI", ["extraversion", "introversion"], ['E', 'I']),
    ("SN", ["sensing", "intuition"], ['S', 'N']),
    ("TF", ["thinking", "feeling"], ['T', 'F']),
    ("JP", ["judging", "perceiving"], ['J', 'P']),
];

pub fn analyze_mbti(answers: &MbtiAnswers) -> MbtiAnalysis {
    let mut mbti_type = String::with_capacity(4);
    let mut dimensions = BTreeMap::new();
    for (axis, poles, letters) in MBTI_AXES {
        let dim = lean(&answers.responses, poles);
        mbti_type.push(if dim.preference == poles[0] {
            letters[0]
        } else {
            letters[1]
        });
        dimensions.insert(axis, dim);
    }
    let strengths: Vec<f64> = dimensions.values().map(|d| d.strength).collect();
    MbtiAnalysis {
        traits: traits_for(&mbti_type),
        communication_style: communication_style(&mbti_type),
        confidence: mean(&strengths),
        dimensions,
        mbti_type,
    }
}

pub fn strength_level(score: f64) -> &'static str {
    if score >= 8.0 {
        "expert"
    } else if score >= 6.0 {
        "proficient"
    } else if score >= 4.0 {
        "intermediate"
    } else {
        "beginner"
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScore {
    pub average_score: f64,
    pub max_score: f64,
    pub skill_count: usize,
    pub strength_level: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillAnalysis {
    pub categories: BTreeMap<&'static str, CategoryScore>,
    pub strengths: Vec<&'static str>,
    pub improvement_areas: Vec<&'static str>,
    pub overall_score: f64,
}

impl SkillAnalysis {
    fn average(&self, category: &str) -> f64 {
        self.categories
            .get(category)
            .map(|c| c.average_score)
            .unwrap_or(0.0)
    }
}

pub fn analyze_skills(answers: &SkillAnswers) -> SkillAnalysis {
    let groups: [(&'static str, &Map<String, Value>); 4] = [
        ("technical", &answers.technical),
        ("projectManagement", &answers.project_management),
        ("leadership", &answers.leadership),
        ("business", &answers.business),
    ];

    let mut categories = BTreeMap::new();
    let mut strengths = Vec::new();
    let mut improvement_areas = Vec::new();
    for (name, skills) in groups {
        let scores: Vec<f64> = skills.values().filter_map(Value::as_f64).collect();
        let average = mean(&scores);
        if average >= 7.0 {
            strengths.push(name);
        }
        if average < 6.0 {
            improvement_areas.push(name);
        }
        categories.insert(
            name,
            CategoryScore {
                average_score: average,
                max_score: scores.iter().copied().fold(0.0, f64::max),
                skill_count: scores.len(),
                strength_level: strength_level(average),
            },
        );
    }
    let averages: Vec<f64> = categories.values().map(|c| c.average_score).collect();
    SkillAnalysis {
        overall_score: mean(&averages),
        categories,
        strengths,
        improvement_areas,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SocialPreferences {
    pub teamwork: f64,
    pub independence: f64,
    pub mentorship: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContentPreferences {
    pub theoretical: f64,
    pub practical: f64,
    pub visual: f64,
    pub interactive: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningAnalysis {
    pub learning_style: &'static str,
    pub social_preferences: SocialPreferences,
    pub content_preferences: ContentPreferences,
}

/// Highest-scoring style; a tie goes to the later style, so no answers at
/// all means "reading".
pub fn learning_style(learning: &Map<String, Value>) -> &'static str {
    ["visual", "auditory", "kinesthetic", "reading"]
        .into_iter()
        .map(|style| (style, answer(learning, style, 0.0)))
        .reduce(|best, next| if best.1 > next.1 { best } else { next })
        .map(|(style, _)| style)
        .unwrap_or("reading")
}

pub fn analyze_learning(learning: &Map<String, Value>) -> LearningAnalysis {
    LearningAnalysis {
        learning_style: learning_style(learning),
        social_preferences: SocialPreferences {
            teamwork: answer(learning, "teamwork", NEUTRAL),
            independence: answer(learning, "independence", NEUTRAL),
            mentorship: answer(learning, "mentorship", NEUTRAL),
        },
        content_preferences: ContentPreferences {
            theoretical: answer(learning, "theoretical", NEUTRAL),
            practical: answer(learning, "practical", NEUTRAL),
            visual: answer(learning, "visual", NEUTRAL),
            interactive: answer(learning, "interactive", NEUTRAL),
        },
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RiskAnalysis {
    pub overall_score: f64,
    pub level: &'static str,
    pub career_risk: f64,
    pub financial_risk: f64,
    pub learning_risk: f64,
    pub innovation_risk: f64,
}

pub fn risk_level(score: f64) -> &'static str {
    if score >= 8.0 {
        "high"
    } else if score >= 6.0 {
        "medium_high"
    } else if score >= 4.0 {
        "medium"
    } else {
        "low"
    }
}

pub fn analyze_risk(risk: &Map<String, Value>) -> RiskAnalysis {
    let career = answer(risk, "career", NEUTRAL);
    let financial = answer(risk, "financial", NEUTRAL);
    let learning = answer(risk, "learning", NEUTRAL);
    let innovation = answer(risk, "innovation", NEUTRAL);
    let overall = mean(&[career, financial, learning, innovation]);
    RiskAnalysis {
        overall_score: overall,
        level: risk_level(overall),
        career_risk: career,
        financial_risk: financial,
        learning_risk: learning,
        innovation_risk: innovation,
    }
}

struct CareerPath {
    key: &'static str,
    mbti_match: f64,
    weights: &'static [(&'static str, f64)],
}

const CAREER_PATHS: [CareerPath; 5] = [
    CareerPath {
        key: "senior_engineer",
        mbti_match: 0.8,
        weights: &[("technical", 0.6), ("projectManagement", 0.3), ("leadership", 0.1)],
    },
    CareerPath {
        key: "tech_lead",
        mbti_match: 0.7,
        weights: &[("technical", 0.4), ("projectManagement", 0.3), ("leadership", 0.3)],
    },
    CareerPath {
        key: "product_manager",
        mbti_match: 0.6,
        weights: &[("business", 0.4), ("projectManagement", 0.3), ("leadership", 0.3)],
    },
    CareerPath {
        key: "engineering_manager",
        mbti_match: 0.7,
        weights: &[("technical", 0.3), ("projectManagement", 0.3), ("leadership", 0.4)],
    },
    CareerPath {
        key: "entrepreneur",
        mbti_match: 0.9,
        weights: &[("business", 0.4), ("leadership", 0.4), ("technical", 0.2)],
    },
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CareerMatch {
    pub overall_score: f64,
    pub skills_match: f64,
    pub personality_match: f64,
}

/// Per-path match in path order.
pub fn career_matches(skills: &SkillAnalysis) -> Vec<(&'static str, CareerMatch)> {
    CAREER_PATHS
        .iter()
        .map(|path| {
            let skills_match: f64 = path
                .weights
                .iter()
                .map(|(category, weight)| skills.average(category) * weight)
                .sum();
            let matched = CareerMatch {
                overall_score: (skills_match * 0.7 + path.mbti_match * 10.0 * 0.3) / 10.0,
                skills_match: skills_match / 10.0,
                personality_match: path.mbti_match,
            };
            (path.key, matched)
        })
        .collect()
}

/// Highest overall score; the earlier path wins a tie.
fn top_career<'a>(matches: &'a [(&'static str, CareerMatch)]) -> Option<&'a str> {
    matches
        .iter()
        .reduce(|best, next| {
            if next.1.overall_score > best.1.overall_score {
                next
            } else {
                best
            }
        })
        .map(|(key, _)| *key)
}

#[derive(Debug, Clone, Serialize)]
pub struct DevelopmentAdvice {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub priority: &'static str,
    pub title: String,
    pub description: String,
    pub actions: Vec<String>,
}

fn mbti_advice(mbti: &str) -> Option<(&'static str, [&'static str; 3])> {
    match mbti {
        "INTJ" => Some((
            "Lean on your strategic thinking while building up teamwork",
            [
                "Join a cross-team project",
                "Practice public speaking",
                "Build a professional network",
            ],
        )),
        "ENTJ" => Some((
            "Use your leadership strengths and make room to hear the team",
            [
                "Learn emotional intelligence techniques",
                "Collect regular feedback from reports",
                "Practice patient coaching",
            ],
        )),
        _ => None,
    }
}

pub fn development_advice(
    mbti: &MbtiAnalysis,
    skills: &SkillAnalysis,
    matches: &[(&'static str, CareerMatch)],
) -> Vec<DevelopmentAdvice> {
    let mut advice = Vec::new();

    if !skills.improvement_areas.is_empty() {
        advice.push(DevelopmentAdvice {
            kind: "skill_development",
            priority: "high",
            title: "Skill development".to_string(),
            description: format!("Focus on improving {}", skills.improvement_areas.join(", ")),
            actions: skills
                .improvement_areas
                .iter()
                .map(|area| format!("Take a training course in {area}"))
                .collect(),
        });
    }

    if let Some((description, actions)) = mbti_advice(&mbti.mbti_type) {
        advice.push(DevelopmentAdvice {
            kind: "personality_development",
            priority: "medium",
            title: "Play to your personality strengths".to_string(),
            description: description.to_string(),
            actions: actions.iter().map(|a| a.to_string()).collect(),
        });
    }

    if let Some(career) = top_career(matches) {
        advice.push(DevelopmentAdvice {
            kind: "career_direction",
            priority: "high",
            title: "Career direction".to_string(),
            description: format!("Based on your overall assessment, {career} is your best fit"),
            actions: vec![
                format!("Draft a development plan toward {career}"),
                "Look for related project opportunities".to_string(),
            ],
        });
    }
    advice
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInsights {
    pub mbti: MbtiAnalysis,
    pub skills: SkillAnalysis,
    pub learning: LearningAnalysis,
    pub risk: RiskAnalysis,
    pub career_match: BTreeMap<&'static str, CareerMatch>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub user_id: Uuid,
    pub analysis: ProfileInsights,
    pub recommendations: Vec<DevelopmentAdvice>,
    pub profile_updated: bool,
}

#[derive(Debug, Serialize)]
pub struct UpdateResult {
    pub success: bool,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ProfileAnalysisResponse {
    Analysis(Box<AnalysisResult>),
    Update(UpdateResult),
}

pub fn analyze_answers(answers: &AssessmentAnswers) -> (ProfileInsights, Vec<DevelopmentAdvice>) {
    let mbti = analyze_mbti(&answers.mbti);
    let skills = analyze_skills(&answers.skills);
    let matches = career_matches(&skills);
    let recommendations = development_advice(&mbti, &skills, &matches);
    let insights = ProfileInsights {
        learning: analyze_learning(&answers.learning),
        risk: analyze_risk(&answers.risk),
        career_match: matches.into_iter().collect(),
        mbti,
        skills,
    };
    (insights, recommendations)
}

/// Profile columns derived from an analysis.
fn derived_columns(insights: &ProfileInsights) -> Result<Value, StoreError> {
    let mut social = serde_json::to_value(&insights.learning.social_preferences)?;
    if let Value::Object(fields) = &mut social {
        fields.insert(
            "communication_style".into(),
            Value::from(insights.mbti.communication_style),
        );
    }
    Ok(json!({
        "mbti_type": insights.mbti.mbti_type,
        "personality_traits": serde_json::to_value(&insights.mbti.traits)?,
        "social_preferences": social,
        "learning_preferences": serde_json::to_value(&insights.learning)?,
        "risk_tolerance": serde_json::to_value(&insights.risk)?,
        "updated_at": Utc::now(),
    }))
}

async fn analyze(
    state: &AppState,
    user_id: Uuid,
    answers: &AssessmentAnswers,
) -> Result<AnalysisResult, AppError> {
    let (insights, recommendations) = analyze_answers(answers);
    let patch = derived_columns(&insights).map_err(|e| AppError::from(e).in_handler(ERROR_CODE))?;

    let profile_updated = match patch_profile(state.store.as_ref(), user_id, patch).await {
        Ok(Some(_)) => true,
        Ok(None) => {
            warn!("No profile row to update for user {user_id}");
            false
        }
        Err(e) => {
            warn!("Failed to update profile for user {user_id}: {e}");
            false
        }
    };
    info!(
        "Profile analysis for user {user_id}: type {}, updated {profile_updated}",
        insights.mbti.mbti_type
    );

    Ok(AnalysisResult {
        user_id,
        analysis: insights,
        recommendations,
        profile_updated,
    })
}

async fn update(
    state: &AppState,
    user_id: Uuid,
    mut fields: Map<String, Value>,
) -> Result<UpdateResult, AppError> {
    fields.remove("id");
    fields.insert("user_id".into(), json!(user_id));
    fields.insert("updated_at".into(), json!(Utc::now()));
    upsert_profile(state.store.as_ref(), Value::Object(fields))
        .await
        .map_err(|e| AppError::from(e).in_handler(ERROR_CODE))?;
    Ok(UpdateResult {
        success: true,
        message: "Profile updated successfully",
    })
}

/// POST /functions/v1/user-profile-analysis
pub async fn handle_profile_analysis(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(request): JsonBody<ProfileAnalysisRequest>,
) -> Result<Json<DataResponse<ProfileAnalysisResponse>>, AppError> {
    let user_id = user.id();
    let response = match request.action.as_str() {
        "analyze" => ProfileAnalysisResponse::Analysis(Box::new(
            analyze(&state, user_id, &request.assessment_data).await?,
        )),
        "update" => {
            ProfileAnalysisResponse::Update(update(&state, user_id, request.profile_data).await?)
        }
        other => {
            return Err(AppError::Validation(format!(
                r#"action must be "analyze" or "update", got "{other}""#
            )))
        }
    };
    Ok(DataResponse::json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;

    use crate::models::tables::USER_PROFILES;
    use crate::store::memory::MemoryStore;
    use crate::test_support::{send, TestApp, TOKEN};

    const PATH: &str = "/functions/v1/user-profile-analysis";

    fn answers(value: Value) -> AssessmentAnswers {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_mbti_from_responses() {
        let a = answers(json!({"mbti": {"responses": {
            "introversion": 8, "extraversion": 2,
            "intuition": 6, "sensing": 4,
            "thinking": 7, "feeling": 3,
            "judging": 9, "perceiving": 1
        }}}));
        let mbti = analyze_mbti(&a.mbti);
        assert_eq!(mbti.mbti_type, "INTJ");
        assert_eq!(mbti.communication_style, "direct_analytical");
        assert_eq!(mbti.dimensions["EI"].strength, 0.8);
        assert!((mbti.confidence - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_mbti_ties_and_blanks_take_first_pole() {
        let a = answers(json!({"mbti": {"responses": {"thinking": 5, "feeling": 5}}}));
        let mbti = analyze_mbti(&a.mbti);
        assert_eq!(mbti.mbti_type, "ESTJ");
        assert_eq!(mbti.dimensions["SN"].strength, 0.5);
        assert_eq!(mbti.dimensions["TF"].strength, 0.5);
        assert_eq!(mbti.communication_style, "balanced");
        assert!(mbti.traits.strengths.is_empty());
    }

    #[test]
    fn test_skill_categories() {
        let a = answers(json!({"skills": {
            "technical": {"rust": 9, "sql": 7, "note": "n/a"},
            "leadership": {"mentoring": 6}
        }}));
        let skills = analyze_skills(&a.skills);
        let tech = &skills.categories["technical"];
        assert_eq!(tech.average_score, 8.0);
        assert_eq!(tech.max_score, 9.0);
        assert_eq!(tech.skill_count, 2);
        assert_eq!(tech.strength_level, "expert");
        assert_eq!(skills.strengths, ["technical"]);
        assert_eq!(skills.improvement_areas, ["projectManagement", "business"]);
        assert_eq!(skills.overall_score, 3.5);
    }

    #[test]
    fn test_learning_and_risk_defaults() {
        assert_eq!(learning_style(&Map::new()), "reading");
        let mut learning = Map::new();
        learning.insert("visual".into(), json!(7));
        learning.insert("kinesthetic".into(), json!(7));
        assert_eq!(learning_style(&learning), "kinesthetic");

        let analysis = analyze_learning(&learning);
        assert_eq!(analysis.social_preferences.teamwork, 5.0);
        assert_eq!(analysis.content_preferences.visual, 7.0);

        let risk = analyze_risk(&Map::new());
        assert_eq!(risk.overall_score, 5.0);
        assert_eq!(risk.level, "medium");
    }

    #[test]
    fn test_career_match_formula() {
        let a = answers(json!({"skills": {"technical": {"rust": 10}}}));
        let skills = analyze_skills(&a.skills);
        let matches = career_matches(&skills);
        let (key, senior) = &matches[0];
        assert_eq!(*key, "senior_engineer");
        assert!((senior.skills_match - 0.6).abs() < 1e-9);
        assert!((senior.overall_score - (6.0 * 0.7 + 8.0 * 0.3) / 10.0).abs() < 1e-9);
        assert_eq!(top_career(&matches), Some("senior_engineer"));
    }

    #[tokio::test]
    async fn test_analyze_patches_existing_profile() {
        let app = TestApp::new();
        app.store
            .seed(USER_PROFILES, vec![json!({"user_id": app.user_id})]);

        let (status, body) = send(
            app.router(),
            Method::POST,
            PATH,
            Some(TOKEN),
            Some(json!({"assessmentData": {"mbti": {"responses": {"extraversion": 9, "introversion": 1}}}})),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["data"]["profileUpdated"], true);
        assert_eq!(body["data"]["analysis"]["mbti"]["type"], "ESTJ");

        let rows = app.store.rows(USER_PROFILES);
        assert_eq!(rows[0]["mbti_type"], "ESTJ");
        assert_eq!(rows[0]["social_preferences"]["communication_style"], "balanced");
    }

    #[tokio::test]
    async fn test_analyze_survives_failed_write_back() {
        let app = TestApp::new();
        let (status, body) =
            send(app.router(), Method::POST, PATH, Some(TOKEN), Some(json!({}))).await;
        assert_eq!(status, 200);
        assert_eq!(body["data"]["profileUpdated"], false);

        let app = TestApp::with_store(MemoryStore::failing());
        let (status, body) =
            send(app.router(), Method::POST, PATH, Some(TOKEN), Some(json!({}))).await;
        assert_eq!(status, 200);
        assert_eq!(body["data"]["profileUpdated"], false);
    }

    #[tokio::test]
    async fn test_update_action() {
        let app = TestApp::new();
        let (status, body) = send(
            app.router(),
            Method::POST,
            PATH,
            Some(TOKEN),
            Some(json!({"action": "update", "profileData": {"current_role": "Engineer"}})),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["data"]["message"], "Profile updated successfully");
        assert_eq!(app.store.rows(USER_PROFILES)[0]["current_role"], "Engineer");

        let (status, _) = send(
            app.router(),
            Method::POST,
            PATH,
            Some(TOKEN),
            Some(json!({"action": "delete"})),
        )
        .await;
        assert_eq!(status, 400);
    }
}
