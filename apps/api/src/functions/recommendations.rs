//! Personalized recommendation generation.
//!
//! Five generators run over the caller's profile, assessments, recent progress
//! and active goals. Their output is ranked by `priority_score`, capped at
//! twenty, and every item is saved as a pending recommendation that expires in
//! thirty days.

use axum::{extract::State, Json};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use super::skill_gap::{
    analyze_skill_gaps, improvement_plan, learning_resources, normalize_position,
    IMPORTANCE_THRESHOLD,
};
use crate::auth::AuthUser;
use crate::dashboard::repo::{list_assessments, list_progress_records};
use crate::errors::AppError;
use crate::goals::repo::list_goals_with_status;
use crate::goals::status::PersistedStatus;
use crate::models::activity::ProgressRecord;
use crate::models::assessment::SkillAssessment;
use crate::models::goal::CareerGoal;
use crate::models::profile::UserProfile;
use crate::profile::repo::get_profile;
use crate::recommendations::repo::insert_recommendation;
use crate::response::{DataResponse, JsonBody};
use crate::state::AppState;
use crate::store::{Direction, StoreError};

pub const ERROR_CODE: &str = "RECOMMENDATION_FAILED";

const MAX_RECOMMENDATIONS: usize = 20;
const EXPIRY_DAYS: i64 = 30;
const PROGRESS_WINDOW: usize = 50;
const DEFAULT_MBTI: &str = "INTJ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendationScope {
    All,
    Skills,
    Learning,
    Career,
    Networking,
    Goals,
}

impl RecommendationScope {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "all" => Some(Self::All),
            "skills" => Some(Self::Skills),
            "learning" => Some(Self::Learning),
            "career" => Some(Self::Career),
            "networking" => Some(Self::Networking),
            "goals" => Some(Self::Goals),
            _ => None,
        }
    }

    fn includes(self, other: Self) -> bool {
        self == Self::All || self == other
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    #[serde(default = "default_scope")]
    pub recommendation_type: String,
    #[serde(default)]
    pub user_preferences: Value,
    #[serde(default)]
    pub context: Value,
}

fn default_scope() -> String {
    "all".to_string()
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedRecommendation {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub priority_score: f64,
    pub title: String,
    pub description: String,
    pub content: Value,
}

/// Everything the generators read.
pub struct UserSnapshot<'a> {
    pub profile: Option<&'a UserProfile>,
    pub assessments: &'a [SkillAssessment],
    pub progress: &'a [ProgressRecord],
    pub goals: &'a [CareerGoal],
}

impl UserSnapshot<'_> {
    fn target_position(&self) -> &'static str {
        normalize_position(self.profile.and_then(|p| p.target_position.as_deref()))
    }

    fn mbti_type(&self) -> String {
        self.profile
            .and_then(|p| p.mbti_type.as_deref())
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(DEFAULT_MBTI)
            .to_uppercase()
    }

    fn learning_style(&self) -> String {
        self.profile
            .and_then(|p| p.learning_preferences.as_ref())
            .and_then(|prefs| prefs.get("learningStyle"))
            .and_then(Value::as_str)
            .unwrap_or("mixed")
            .to_string()
    }
}

pub fn skill_recommendations(user: &UserSnapshot) -> Vec<GeneratedRecommendation> {
    let position = user.target_position();
    analyze_skill_gaps(user.assessments, position)
        .into_iter()
        .filter(|gap| gap.importance > IMPORTANCE_THRESHOLD)
        .map(|gap| GeneratedRecommendation {
            kind: "skill_development",
            priority_score: gap.importance * 10.0,
            title: format!("Improve your {} skills", gap.skill_name),
            description: format!(
                "For your target position {position}, {} should rise from {} to {}",
                gap.skill_name, gap.current_level, gap.target_level
            ),
            content: json!({
                "skill_name": gap.skill_name,
                "current_level": gap.current_level,
                "target_level": gap.target_level,
                "improvement_plan": improvement_plan(&gap),
                "estimated_timeline": gap.estimated_weeks,
                "resources": learning_resources(&gap.skill_name),
            }),
        })
        .collect()
}

/// Learning phases tuned to a personality type. Only INTJ and ENFP have one.
fn mbti_learning_path(mbti: &str) -> Option<Value> {
    match mbti {
        "INTJ" => Some(json!({
            "phases": [
                {"name": "Deep theory", "duration": "4 weeks", "focus": "Systematic study of core concepts"},
                {"name": "Strategic application", "duration": "6 weeks", "focus": "Apply the material in real projects"},
                {"name": "Breakthrough", "duration": "4 weeks", "focus": "Explore new methods and original solutions"}
            ],
            "timeline": "14 weeks",
            "resources": ["In-depth theory courses", "Research papers", "Personal projects"],
            "milestones": ["Theory exam passed", "Project prototype finished", "Original solution published"]
        })),
        "ENFP" => Some(json!({
            "phases": [
                {"name": "Broad exploration", "duration": "3 weeks", "focus": "Sample several different fields"},
                {"name": "Collaborative learning", "duration": "8 weeks", "focus": "Team projects and peer learning"},
                {"name": "Creative application", "duration": "3 weeks", "focus": "Put what you learned to creative use"}
            ],
            "timeline": "14 weeks",
            "resources": ["Community courses", "Team projects", "Creative workshops"],
            "milestones": ["Foundations across fields", "Team project delivered", "Creative work showcased"]
        })),
        _ => None,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillStep {
    pub skill: &'static str,
    pub estimated_weeks: u32,
    pub prerequisites: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Checkpoint {
    pub week: u32,
    pub milestone: String,
    pub assessment: String,
}

pub fn skill_tree_path() -> Vec<SkillStep> {
    vec![
        SkillStep {
            skill: "python",
            estimated_weeks: 6,
            prerequisites: vec![],
        },
        SkillStep {
            skill: "machine_learning",
            estimated_weeks: 8,
            prerequisites: vec!["python"],
        },
        SkillStep {
            skill: "deep_learning",
            estimated_weeks: 10,
            prerequisites: vec!["machine_learning"],
        },
    ]
}

/// One checkpoint per step at the cumulative week it finishes.
pub fn checkpoints(path: &[SkillStep]) -> Vec<Checkpoint> {
    path.iter()
        .scan(0, |week, step| {
            *week += step.estimated_weeks;
            Some(Checkpoint {
                week: *week,
                milestone: format!("Finish learning {}", step.skill),
                assessment: format!("{} skill assessment", step.skill),
            })
        })
        .collect()
}

pub fn learning_recommendations(user: &UserSnapshot) -> Vec<GeneratedRecommendation> {
    let mut recommendations = Vec::new();
    let mbti = user.mbti_type();

    if let Some(Value::Object(mut path)) = mbti_learning_path(&mbti) {
        path.insert("learning_style".into(), Value::from(user.learning_style()));
        recommendations.push(GeneratedRecommendation {
            kind: "learning_path",
            priority_score: 8.5,
            title: format!("Personal learning path ({mbti} style)"),
            description: format!("A learning path suited to your {mbti} personality type"),
            content: Value::Object(path),
        });
    }

    let path = skill_tree_path();
    if !path.is_empty() {
        let total: u32 = path.iter().map(|s| s.estimated_weeks).sum();
        recommendations.push(GeneratedRecommendation {
            kind: "learning_path",
            priority_score: 8.0,
            title: "Skill tree learning path".to_string(),
            description: "Learn skills in dependency order to build a complete foundation"
                .to_string(),
            content: json!({
                "skill_path": path,
                "total_duration": total,
                "checkpoints": checkpoints(&path),
            }),
        });
    }
    recommendations
}

struct Opportunity {
    role_title: &'static str,
    match_score: f64,
    salary_range: &'static str,
    required_skills: [&'static str; 3],
    missing_skills: &'static [&'static str],
    preparation_plan: &'static str,
    market_demand: &'static str,
}

const OPPORTUNITIES: [Opportunity; 2] = [
    Opportunity {
        role_title: "Senior AI Engineer",
        match_score: 0.85,
        salary_range: "500K-800K",
        required_skills: ["python", "machine_learning", "deep_learning"],
        missing_skills: &["system_design"],
        preparation_plan: "Strengthen system design",
        market_demand: "very_high",
    },
    Opportunity {
        role_title: "AI Product Manager",
        match_score: 0.78,
        salary_range: "400K-700K",
        required_skills: ["product_management", "ai_understanding", "user_research"],
        missing_skills: &["product_management", "user_research"],
        preparation_plan: "Study product management and user research",
        market_demand: "high",
    },
];

const OPPORTUNITY_THRESHOLD: f64 = 0.75;

pub fn career_recommendations() -> Vec<GeneratedRecommendation> {
    OPPORTUNITIES
        .iter()
        .filter(|o| o.match_score > OPPORTUNITY_THRESHOLD)
        .map(|o| GeneratedRecommendation {
            kind: "career_opportunity",
            priority_score: o.match_score * 10.0,
            title: format!("{} opportunity", o.role_title),
            description: format!(
                "Your skills match the {} role at {}%",
                o.role_title,
                (o.match_score * 100.0).round()
            ),
            content: json!({
                "role_title": o.role_title,
                "match_score": o.match_score,
                "salary_range": o.salary_range,
                "growth_potential": "high",
                "required_skills": o.required_skills,
                "missing_skills": o.missing_skills,
                "preparation_plan": o.preparation_plan,
                "market_demand": o.market_demand,
            }),
        })
        .collect()
}

pub fn networking_recommendation() -> GeneratedRecommendation {
    GeneratedRecommendation {
        kind: "networking",
        priority_score: 7.5,
        title: "Professional networking plan".to_string(),
        description: "Build a professional network that supports your career goals".to_string(),
        content: json!({
            "target_connections": [
                {"type": "Peer experts", "count": 20, "priority": "high"},
                {"type": "Industry leaders", "count": 5, "priority": "high"},
                {"type": "Potential partners", "count": 15, "priority": "medium"}
            ],
            "networking_events": ["AI conferences", "Tech meetups", "Industry summits"],
            "online_communities": ["GitHub open source", "LinkedIn groups", "Developer forums"],
            "mentorship_opportunities": {
                "find_mentor": "Find a mentor with experience in AI",
                "become_mentor": "Coach junior developers to build your reputation"
            },
            "action_plan": [
                "Attend at least one industry event per month",
                "Share one technical article per week",
                "Connect with five new people each quarter"
            ]
        }),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalAnalysis {
    pub total_goals: usize,
    pub active_goals: usize,
    /// Fraction in [0, 1].
    pub completion_rate: f64,
    pub average_progress: f64,
    pub overdue_goals: usize,
}

pub fn analyze_goals(goals: &[CareerGoal], today: NaiveDate) -> GoalAnalysis {
    let total = goals.len();
    let count = |status: PersistedStatus| goals.iter().filter(|g| g.status == status).count();
    let (completion_rate, average_progress) = if total == 0 {
        (0.0, 0.0)
    } else {
        let progress: i64 = goals.iter().map(|g| g.progress_percentage).sum();
        (
            count(PersistedStatus::Completed) as f64 / total as f64,
            progress as f64 / total as f64,
        )
    };
    GoalAnalysis {
        total_goals: total,
        active_goals: count(PersistedStatus::Active),
        completion_rate,
        average_progress,
        overdue_goals: goals
            .iter()
            .filter(|g| g.status != PersistedStatus::Completed)
            .filter(|g| g.target_date.is_some_and(|d| d < today))
            .count(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SuggestedGoal {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub target_value: u32,
    pub timeline_months: u32,
    pub priority: &'static str,
}

fn priority_rank(priority: &str) -> u8 {
    match priority {
        "high" => 3,
        "medium" => 2,
        _ => 1,
    }
}

/// Suggestions ordered high priority first.
pub fn suggested_goals() -> Vec<SuggestedGoal> {
    let mut goals = vec![
        SuggestedGoal {
            kind: "networking",
            title: "Grow your professional network",
            description: "Make 50 new professional connections in the next 3 months",
            target_value: 50,
            timeline_months: 3,
            priority: "medium",
        },
        SuggestedGoal {
            kind: "skill_improvement",
            title: "Raise core skills to an advanced level",
            description: "Lift your core skill scores above 8 within 6 months",
            target_value: 8,
            timeline_months: 6,
            priority: "high",
        },
        SuggestedGoal {
            kind: "career_advancement",
            title: "Land interviews for your target role",
            description: "Get interviews at three or more target companies within 12 months",
            target_value: 3,
            timeline_months: 12,
            priority: "high",
        },
    ];
    goals.sort_by_key(|g| std::cmp::Reverse(priority_rank(g.priority)));
    goals
}

fn goal_timeline(goals: &[SuggestedGoal]) -> Value {
    goals
        .iter()
        .map(|g| {
            json!({
                "goal": g.title,
                "start_month": 1,
                "duration_months": g.timeline_months,
                "milestones": (1..=g.timeline_months)
                    .map(|m| format!("Month {m} checkpoint"))
                    .collect::<Vec<_>>(),
            })
        })
        .collect()
}

pub fn goal_recommendation(user: &UserSnapshot, today: NaiveDate) -> GeneratedRecommendation {
    let analysis = analyze_goals(user.goals, today);
    let suggestions = suggested_goals();
    GeneratedRecommendation {
        kind: "goal_setting",
        priority_score: 8.0,
        title: "SMART goal suggestions".to_string(),
        description: format!(
            "New actionable goals based on your progress across {} recent records",
            user.progress.len()
        ),
        content: json!({
            "current_goal_analysis": analysis,
            "goal_prioritization": suggestions,
            "timeline_recommendations": goal_timeline(&suggestions),
            "suggested_goals": suggestions,
        }),
    }
}

/// Runs the generators selected by `scope`, best first, capped at twenty.
pub fn generate(
    user: &UserSnapshot,
    scope: RecommendationScope,
    today: NaiveDate,
) -> Vec<GeneratedRecommendation> {
    use RecommendationScope::*;

    let mut recommendations = Vec::new();
    if scope.includes(Skills) {
        recommendations.extend(skill_recommendations(user));
    }
    if scope.includes(Learning) {
        recommendations.extend(learning_recommendations(user));
    }
    if scope.includes(Career) {
        recommendations.extend(career_recommendations());
    }
    if scope.includes(Networking) {
        recommendations.push(networking_recommendation());
    }
    if scope.includes(Goals) {
        recommendations.push(goal_recommendation(user, today));
    }
    recommendations.sort_by(|a, b| b.priority_score.total_cmp(&a.priority_score));
    recommendations.truncate(MAX_RECOMMENDATIONS);
    recommendations
}

fn saved_row(
    rec: &GeneratedRecommendation,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Value, StoreError> {
    Ok(json!({
        "user_id": user_id,
        "recommendation_type": rec.kind,
        "title": rec.title,
        "description": rec.description,
        "content": serde_json::to_value(rec)?,
        "priority_score": rec.priority_score,
        "status": "pending",
        "is_active": true,
        "expires_at": now + Duration::days(EXPIRY_DAYS),
    }))
}

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<GeneratedRecommendation>,
    pub user_id: Uuid,
    pub generated_at: DateTime<Utc>,
}

/// POST /functions/v1/personalized-recommendations
pub async fn handle_personalized_recommendations(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(request): JsonBody<RecommendationRequest>,
) -> Result<Json<DataResponse<RecommendationsResponse>>, AppError> {
    let scope = RecommendationScope::parse(&request.recommendation_type).ok_or_else(|| {
        AppError::Validation(format!(
            "Unknown recommendationType: {}",
            request.recommendation_type
        ))
    })?;
    let user_id = user.id();
    let store = state.store.as_ref();

    let (profile, assessments, progress, goals) = tokio::try_join!(
        get_profile(store, user_id),
        list_assessments(store, user_id),
        list_progress_records(store, user_id, None, Direction::Desc, Some(PROGRESS_WINDOW)),
        list_goals_with_status(store, user_id, PersistedStatus::Active),
    )
    .map_err(|e| AppError::from(e).in_handler(ERROR_CODE))?;

    let now = Utc::now();
    let snapshot = UserSnapshot {
        profile: profile.as_ref(),
        assessments: &assessments,
        progress: &progress,
        goals: &goals,
    };
    let recommendations = generate(&snapshot, scope, now.date_naive());

    for rec in &recommendations {
        let row =
            saved_row(rec, user_id, now).map_err(|e| AppError::from(e).in_handler(ERROR_CODE))?;
        insert_recommendation(store, row)
            .await
            .map_err(|e| AppError::from(e).in_handler(ERROR_CODE))?;
    }
    info!(
        "Generated {} recommendations for user {user_id} (preferences: {}, context: {})",
        recommendations.len(),
        !request.user_preferences.is_null(),
        !request.context.is_null()
    );

    Ok(DataResponse::json(RecommendationsResponse {
        recommendations,
        user_id,
        generated_at: now,
    }))
}
