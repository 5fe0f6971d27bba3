//! Skill gaps between a user's assessed levels and a target position.

use serde::Serialize;

use crate::models::assessment::SkillAssessment;

pub const DEFAULT_POSITION: &str = "Senior Engineer";

/// Gaps at or below this importance are not worth recommending.
pub const IMPORTANCE_THRESHOLD: f64 = 0.7;

const SENIOR_ENGINEER: &[(&str, f64)] = &[
    ("python", 8.0),
    ("machine_learning", 7.0),
    ("system_design", 7.0),
    ("leadership", 5.0),
];

const TECHNICAL_MANAGER: &[(&str, f64)] = &[
    ("python", 6.0),
    ("machine_learning", 6.0),
    ("leadership", 8.0),
    ("project_management", 8.0),
];

const PRODUCT_MANAGER: &[(&str, f64)] = &[
    ("business_analysis", 8.0),
    ("user_research", 7.0),
    ("project_management", 7.0),
    ("communication", 8.0),
];

/// Canonical position name. Profiles written by older clients store the
/// Chinese titles.
pub fn normalize_position(position: Option<&str>) -> &'static str {
    match position.map(str::trim) {
        Some("Technical Manager") | Some("技术经理") => "Technical Manager",
        Some("Product Manager") | Some("产品经理") => "Product Manager",
        _ => DEFAULT_POSITION,
    }
}

/// Required skill levels for a position; unknown positions fall back to
/// Senior Engineer.
pub fn position_requirements(position: &str) -> &'static [(&'static str, f64)] {
    match normalize_position(Some(position)) {
        "Technical Manager" => TECHNICAL_MANAGER,
        "Product Manager" => PRODUCT_MANAGER,
        _ => SENIOR_ENGINEER,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillGap {
    pub skill_name: String,
    pub current_level: f64,
    pub target_level: f64,
    pub gap: f64,
    pub importance: f64,
    pub estimated_weeks: u32,
}

/// Level from the most recent assessment of `skill`. Undated rows lose to dated
/// ones; on a tie the earlier row in the slice wins.
pub fn latest_level(assessments: &[SkillAssessment], skill: &str) -> Option<f64> {
    assessments
        .iter()
        .filter(|a| a.skill_name.as_deref() == Some(skill))
        .reduce(|best, a| {
            if a.assessment_date > best.assessment_date {
                a
            } else {
                best
            }
        })
        .map(|a| a.current_level)
}

/// Every required skill the user is below, most important first. A skill with
/// no assessment counts as level 0.
pub fn analyze_skill_gaps(assessments: &[SkillAssessment], position: &str) -> Vec<SkillGap> {
    let mut gaps: Vec<SkillGap> = position_requirements(position)
        .iter()
        .filter_map(|&(skill, required)| {
            let current = latest_level(assessments, skill).unwrap_or(0.0);
            (current < required).then(|| SkillGap {
                skill_name: skill.to_string(),
                current_level: current,
                target_level: required,
                gap: required - current,
                importance: required / 10.0,
                estimated_weeks: ((required - current) * 4.0).ceil() as u32,
            })
        })
        .collect();
    gaps.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    gaps
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanPhase {
    pub duration_weeks: u32,
    pub focus: &'static str,
    pub activities: [&'static str; 3],
}

#[derive(Debug, Clone, Serialize)]
pub struct ImprovementPlan {
    pub phase1: PlanPhase,
    pub phase2: PlanPhase,
    pub phase3: PlanPhase,
}

fn share(weeks: u32, fraction: f64) -> u32 {
    (weeks as f64 * fraction).ceil() as u32
}

/// Splits the estimate 30/50/20 across foundation, practice and mastery.
pub fn improvement_plan(gap: &SkillGap) -> ImprovementPlan {
    let weeks = gap.estimated_weeks;
    ImprovementPlan {
        phase1: PlanPhase {
            duration_weeks: share(weeks, 0.3),
            focus: "Foundations",
            activities: ["Theory study", "Online courses", "Documentation reading"],
        },
        phase2: PlanPhase {
            duration_weeks: share(weeks, 0.5),
            focus: "Hands-on practice",
            activities: ["Project work", "Coding exercises", "Case studies"],
        },
        phase3: PlanPhase {
            duration_weeks: share(weeks, 0.2),
            focus: "Advanced mastery",
            activities: ["Best practices", "Performance tuning", "Knowledge sharing"],
        },
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LearningResource {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<&'static str>,
}

fn resource(
    kind: &'static str,
    name: &str,
    provider: Option<&'static str>,
    detail: Option<&'static str>,
) -> LearningResource {
    LearningResource {
        kind,
        name: name.to_string(),
        provider,
        detail,
    }
}

pub fn learning_resources(skill: &str) -> Vec<LearningResource> {
    match skill {
        "python" => vec![
            resource("course", "Advanced Python Programming", Some("Coursera"), Some("8 weeks")),
            resource("book", "Fluent Python", None, Some("Luciano Ramalho")),
            resource("practice", "LeetCode Python problems", None, Some("intermediate")),
        ],
        "machine_learning" => vec![
            resource("course", "Applied Machine Learning", Some("Coursera"), Some("12 weeks")),
            resource("project", "Kaggle competitions", None, Some("beginner to intermediate")),
            resource("certification", "TensorFlow Developer", Some("Google"), None),
        ],
        other => vec![resource(
            "search",
            &format!("Search for {other} learning resources"),
            Some("multiple platforms"),
            None,
        )],
    }
}
