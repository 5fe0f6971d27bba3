//! Progress analysis over a trailing time window.
//!
//! Scores are on the 0–10 scale used by progress records and assessments.
//! Everything here is a pure function of the rows read by the handler.

use std::collections::BTreeMap;

use axum::{extract::State, Json};
use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use super::mean;
use crate::auth::AuthUser;
use crate::dashboard::repo::{list_achievements, list_assessments, list_progress_records};
use crate::errors::AppError;
use crate::goals::repo::list_goals;
use crate::goals::status::PersistedStatus;
use crate::models::activity::{Achievement, ProgressRecord};
use crate::models::assessment::SkillAssessment;
use crate::models::goal::CareerGoal;
use crate::response::{DataResponse, JsonBody};
use crate::state::AppState;
use crate::store::Direction;

pub const ERROR_CODE: &str = "PROGRESS_ANALYSIS_FAILED";

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Relative change that counts as a real move rather than noise.
const TREND_THRESHOLD: f64 = 0.1;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    #[serde(default = "default_analysis_type")]
    pub analysis_type: String,
    #[serde(default = "default_time_range")]
    pub time_range: String,
    #[serde(default = "default_true")]
    pub include_projections: bool,
}

fn default_analysis_type() -> String {
    "comprehensive".to_string()
}

fn default_time_range() -> String {
    "6months".to_string()
}

fn default_true() -> bool {
    true
}

/// Start of the window for `time_range`; unknown ranges mean six months.
pub fn window_start(time_range: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    let months = match time_range {
        "1month" => 1,
        "3months" => 3,
        "1year" => 12,
        _ => 6,
    };
    now.checked_sub_months(Months::new(months)).unwrap_or(now)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Stable,
    Declining,
}

/// Relative change from first to last score. `None` with fewer than two
/// scores or a zero baseline.
fn relative_change(scores: &[f64]) -> Option<f64> {
    match (scores.first(), scores.last()) {
        (Some(&first), Some(&last)) if scores.len() >= 2 && first != 0.0 => {
            Some((last - first) / first)
        }
        _ => None,
    }
}

pub fn trend(scores: &[f64]) -> Trend {
    match relative_change(scores) {
        Some(c) if c > TREND_THRESHOLD => Trend::Improving,
        Some(c) if c < -TREND_THRESHOLD => Trend::Declining,
        _ => Trend::Stable,
    }
}

fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    (values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64).sqrt()
}

pub fn performance_level(score: f64) -> &'static str {
    if score >= 8.0 {
        "excellent"
    } else if score >= 6.0 {
        "good"
    } else if score >= 4.0 {
        "average"
    } else {
        "needs_improvement"
    }
}

pub fn performance_grade(score: f64) -> &'static str {
    const GRADES: [(f64, &str); 6] = [
        (8.5, "A+"),
        (8.0, "A"),
        (7.5, "A-"),
        (7.0, "B+"),
        (6.5, "B"),
        (6.0, "B-"),
    ];
    GRADES
        .iter()
        .find(|(floor, _)| score >= *floor)
        .map(|(_, grade)| *grade)
        .unwrap_or("C")
}

/// Percentage change between the first and last record, 0 when undefined.
pub fn improvement_rate(records: &[ProgressRecord]) -> f64 {
    let scores: Vec<f64> = records.iter().map(|r| r.score).collect();
    relative_change(&scores).map(|c| c * 100.0).unwrap_or(0.0)
}

/// Scores per dimension in record order (records arrive oldest first).
fn scores_by_dimension(records: &[ProgressRecord]) -> BTreeMap<&str, Vec<f64>> {
    let mut by_dimension: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for record in records {
        by_dimension
            .entry(record.dimension.as_str())
            .or_default()
            .push(record.score);
    }
    by_dimension
}

#[derive(Debug, Clone, Serialize)]
pub struct DimensionScore {
    pub current_score: f64,
    pub average_score: f64,
    pub trend: Trend,
    pub data_points: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverallProgress {
    pub overall_score: f64,
    pub goal_completion_rate: f64,
    pub dimension_scores: BTreeMap<String, DimensionScore>,
    pub performance_level: &'static str,
    pub improvement_rate: f64,
}

fn completed_fraction(goals: &[CareerGoal]) -> f64 {
    if goals.is_empty() {
        return 0.0;
    }
    let completed = goals
        .iter()
        .filter(|g| g.status == PersistedStatus::Completed)
        .count();
    completed as f64 / goals.len() as f64
}

pub fn overall_progress(records: &[ProgressRecord], goals: &[CareerGoal]) -> OverallProgress {
    let dimension_scores: BTreeMap<String, DimensionScore> = scores_by_dimension(records)
        .into_iter()
        .map(|(dimension, scores)| {
            let score = DimensionScore {
                current_score: scores.last().copied().unwrap_or(0.0),
                average_score: mean(&scores),
                trend: trend(&scores),
                data_points: scores.len(),
            };
            (dimension.to_string(), score)
        })
        .collect();

    let current: Vec<f64> = dimension_scores.values().map(|d| d.current_score).collect();
    let overall_score = mean(&current);
    OverallProgress {
        overall_score,
        goal_completion_rate: completed_fraction(goals),
        dimension_scores,
        performance_level: performance_level(overall_score),
        improvement_rate: improvement_rate(records),
    }
}

struct DimensionConfig {
    key: &'static str,
    name: &'static str,
    weight: f64,
    indicators: [&'static str; 3],
    benchmark: f64,
}

const DIMENSIONS: [DimensionConfig; 4] = [
    DimensionConfig {
        key: "technical_skills",
        name: "Technical skills",
        weight: 0.3,
        indicators: ["programming", "algorithms", "system_design"],
        benchmark: 7.2,
    },
    DimensionConfig {
        key: "project_management",
        name: "Project management",
        weight: 0.25,
        indicators: ["planning", "execution", "risk_management"],
        benchmark: 6.8,
    },
    DimensionConfig {
        key: "leadership",
        name: "Leadership",
        weight: 0.25,
        indicators: ["team_building", "communication", "decision_making"],
        benchmark: 6.5,
    },
    DimensionConfig {
        key: "business_acumen",
        name: "Business acumen",
        weight: 0.2,
        indicators: ["market_understanding", "strategy", "customer_focus"],
        benchmark: 6.0,
    },
];

#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkComparison {
    pub user_score: f64,
    pub benchmark_score: f64,
    /// "above" or "below".
    pub comparison: &'static str,
    pub gap: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DimensionAnalysis {
    pub name: &'static str,
    pub weight: f64,
    pub current_level: f64,
    pub progress_trend: Trend,
    pub strength_areas: Vec<&'static str>,
    pub improvement_areas: Vec<&'static str>,
    pub benchmark_comparison: BenchmarkComparison,
}

fn indicator_average(records: &[&ProgressRecord], indicator: &str) -> f64 {
    let scores: Vec<f64> = records
        .iter()
        .filter(|r| r.indicator.as_deref() == Some(indicator))
        .map(|r| r.score)
        .collect();
    mean(&scores)
}

pub fn dimension_analysis(
    records: &[ProgressRecord],
    assessments: &[SkillAssessment],
) -> BTreeMap<&'static str, DimensionAnalysis> {
    DIMENSIONS
        .iter()
        .map(|config| {
            let dim_records: Vec<&ProgressRecord> = records
                .iter()
                .filter(|r| r.dimension == config.key)
                .collect();
            let record_scores: Vec<f64> = dim_records.iter().map(|r| r.score).collect();
            let level_inputs: Vec<f64> = record_scores
                .iter()
                .copied()
                .chain(
                    assessments
                        .iter()
                        .filter(|a| a.dimension.as_deref() == Some(config.key))
                        .map(|a| a.current_level),
                )
                .collect();

            let indicator_scores: Vec<(&'static str, f64)> = config
                .indicators
                .iter()
                .map(|&i| (i, indicator_average(&dim_records, i)))
                .collect();
            let user_score = mean(&record_scores);

            let analysis = DimensionAnalysis {
                name: config.name,
                weight: config.weight,
                current_level: mean(&level_inputs),
                progress_trend: trend(&record_scores),
                strength_areas: indicator_scores
                    .iter()
                    .filter(|(_, avg)| *avg >= 7.0)
                    .map(|(i, _)| *i)
                    .collect(),
                improvement_areas: indicator_scores
                    .iter()
                    .filter(|(_, avg)| *avg < 6.0)
                    .map(|(i, _)| *i)
                    .collect(),
                benchmark_comparison: BenchmarkComparison {
                    user_score,
                    benchmark_score: config.benchmark,
                    comparison: if user_score >= config.benchmark {
                        "above"
                    } else {
                        "below"
                    },
                    gap: (user_score - config.benchmark).abs(),
                },
            };
            (config.key, analysis)
        })
        .collect()
}

fn target_instant(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Whole days until `target`, rounded up. Negative once the date has passed.
pub fn days_remaining(target: NaiveDate, now: DateTime<Utc>) -> i64 {
    let seconds = (target_instant(target) - now).num_seconds() as f64;
    (seconds / SECONDS_PER_DAY).ceil() as i64
}

/// On track when progress is at least 80% of the share of time elapsed.
/// Goals without a target date are always on track.
pub fn is_on_track(goal: &CareerGoal, now: DateTime<Utc>) -> bool {
    let Some(target) = goal.target_date else {
        return true;
    };
    let remaining = days_remaining(target, now) as f64;
    let elapsed = ((now - goal.created_at).num_seconds() as f64 / SECONDS_PER_DAY).ceil();
    let total = elapsed + remaining;
    let expected = if total > 0.0 {
        elapsed / total * 100.0
    } else {
        0.0
    };
    goal.progress_percentage as f64 >= expected * 0.8
}

fn is_overdue(goal: &CareerGoal, today: NaiveDate) -> bool {
    goal.status != PersistedStatus::Completed && goal.target_date.is_some_and(|d| d < today)
}

#[derive(Debug, Clone, Serialize)]
pub struct GoalDetail {
    pub id: Uuid,
    pub title: String,
    pub progress_percentage: i64,
    pub status: PersistedStatus,
    pub target_date: Option<NaiveDate>,
    pub days_remaining: Option<i64>,
    pub is_on_track: bool,
    /// Latest progress records tagged with this goal in `metadata.goal_id`.
    pub recent_activity: Vec<ProgressRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoalAchievement {
    pub total_goals: usize,
    pub completed_goals: usize,
    pub active_goals: usize,
    pub overdue_goals: usize,
    pub goal_details: Vec<GoalDetail>,
}

fn linked_goal(record: &ProgressRecord) -> Option<&str> {
    record
        .metadata
        .as_ref()
        .and_then(|m| m.get("goal_id"))
        .and_then(Value::as_str)
}

pub fn goal_achievement(
    goals: &[CareerGoal],
    records: &[ProgressRecord],
    now: DateTime<Utc>,
) -> GoalAchievement {
    let today = now.date_naive();
    let status_count = |s: PersistedStatus| goals.iter().filter(|g| g.status == s).count();
    let goal_details = goals
        .iter()
        .map(|goal| {
            let id = goal.id.to_string();
            let linked: Vec<ProgressRecord> = records
                .iter()
                .filter(|r| linked_goal(r) == Some(id.as_str()))
                .cloned()
                .collect();
            let skip = linked.len().saturating_sub(5);
            GoalDetail {
                id: goal.id,
                title: goal.title.clone(),
                progress_percentage: goal.progress_percentage.min(100),
                status: goal.status,
                target_date: goal.target_date,
                days_remaining: goal.target_date.map(|d| days_remaining(d, now)),
                is_on_track: is_on_track(goal, now),
                recent_activity: linked.into_iter().skip(skip).collect(),
            }
        })
        .collect();

    GoalAchievement {
        total_goals: goals.len(),
        completed_goals: status_count(PersistedStatus::Completed),
        active_goals: status_count(PersistedStatus::Active),
        overdue_goals: goals.iter().filter(|g| is_overdue(g, today)).count(),
        goal_details,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryOverview {
    pub name: &'static str,
    pub average_level: f64,
    pub max_level: f64,
    pub skill_count: usize,
    pub improvement_needed_count: usize,
    pub confidence_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopSkill {
    pub name: Option<String>,
    pub level: f64,
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillToImprove {
    pub name: Option<String>,
    pub current_level: f64,
    pub target_level: f64,
    pub gap: f64,
    pub priority: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillDevelopment {
    pub skill_overview: BTreeMap<&'static str, CategoryOverview>,
    pub top_skills: Vec<TopSkill>,
    pub improvement_needed: Vec<SkillToImprove>,
}

const SKILL_CATEGORIES: [(&str, &str); 4] = [
    ("technical", "Technical skills"),
    ("management", "Management skills"),
    ("communication", "Communication skills"),
    ("leadership", "Leadership skills"),
];

pub fn skill_priority(gap: f64) -> &'static str {
    if gap >= 3.0 {
        "high"
    } else if gap >= 2.0 {
        "medium"
    } else {
        "low"
    }
}

pub fn skill_development(assessments: &[SkillAssessment]) -> SkillDevelopment {
    let skill_overview = SKILL_CATEGORIES
        .iter()
        .filter_map(|&(category, name)| {
            let skills: Vec<&SkillAssessment> = assessments
                .iter()
                .filter(|a| a.category.as_deref() == Some(category))
                .collect();
            if skills.is_empty() {
                return None;
            }
            let levels: Vec<f64> = skills.iter().map(|s| s.current_level).collect();
            let confidence: Vec<f64> = skills
                .iter()
                .map(|s| s.confidence_score.unwrap_or(0.5))
                .collect();
            Some((
                category,
                CategoryOverview {
                    name,
                    average_level: mean(&levels),
                    max_level: levels.iter().copied().fold(f64::MIN, f64::max),
                    skill_count: skills.len(),
                    improvement_needed_count: skills.iter().filter(|s| s.gap() > 0.0).count(),
                    confidence_score: mean(&confidence),
                },
            ))
        })
        .collect();

    let mut top: Vec<&SkillAssessment> =
        assessments.iter().filter(|a| a.current_level >= 8.0).collect();
    top.sort_by(|a, b| b.current_level.total_cmp(&a.current_level));

    let mut behind: Vec<&SkillAssessment> = assessments.iter().filter(|a| a.gap() > 0.0).collect();
    behind.sort_by(|a, b| b.gap().total_cmp(&a.gap()));

    SkillDevelopment {
        skill_overview,
        top_skills: top
            .into_iter()
            .take(5)
            .map(|a| TopSkill {
                name: a.skill_name.clone(),
                level: a.current_level,
                confidence: a.confidence_score,
            })
            .collect(),
        improvement_needed: behind
            .into_iter()
            .take(5)
            .map(|a| SkillToImprove {
                name: a.skill_name.clone(),
                current_level: a.current_level,
                target_level: a.target_level.unwrap_or(a.current_level),
                gap: a.gap(),
                priority: skill_priority(a.gap()),
            })
            .collect(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DimensionTrend {
    pub trend_direction: Trend,
    pub growth_rate: f64,
    pub volatility: f64,
    pub peak_score: f64,
    pub recent_performance: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendAnalysis {
    pub time_range: String,
    pub dimension_trends: BTreeMap<String, DimensionTrend>,
    /// "positive", "negative" or "flat" by overall improvement rate.
    pub overall_trajectory: &'static str,
}

pub fn trend_analysis(records: &[ProgressRecord], time_range: &str) -> TrendAnalysis {
    let dimension_trends = scores_by_dimension(records)
        .into_iter()
        .map(|(dimension, scores)| {
            let skip = scores.len().saturating_sub(10);
            let dim = DimensionTrend {
                trend_direction: trend(&scores),
                growth_rate: relative_change(&scores).map(|c| c * 100.0).unwrap_or(0.0),
                volatility: std_dev(&scores),
                peak_score: scores.iter().copied().fold(0.0, f64::max),
                recent_performance: scores[skip..].to_vec(),
            };
            (dimension.to_string(), dim)
        })
        .collect();

    let rate = improvement_rate(records);
    TrendAnalysis {
        time_range: time_range.to_string(),
        dimension_trends,
        overall_trajectory: if rate > 0.0 {
            "positive"
        } else if rate < 0.0 {
            "negative"
        } else {
            "flat"
        },
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceMetrics {
    pub productivity_index: f64,
    pub consistency_score: f64,
    pub achievement_rate: f64,
    pub improvement_velocity: f64,
    pub goal_alignment: f64,
    pub overall_performance: f64,
    pub performance_grade: &'static str,
    pub percentile: f64,
}

/// Five 0–10 indices derived from the window's records:
/// mean score, inverse spread, achievement count, improvement rate, and the
/// share of records tied to a goal.
pub fn performance_metrics(
    records: &[ProgressRecord],
    achievements: &[Achievement],
) -> PerformanceMetrics {
    let scores: Vec<f64> = records.iter().map(|r| r.score).collect();
    let productivity_index = mean(&scores);
    let consistency_score = if scores.is_empty() {
        0.0
    } else {
        (10.0 - std_dev(&scores) * 2.0).clamp(0.0, 10.0)
    };
    let achievement_rate = (achievements.len() as f64).min(10.0);
    let improvement_velocity = (5.0 + improvement_rate(records) / 10.0).clamp(0.0, 10.0);
    let goal_alignment = if records.is_empty() {
        0.0
    } else {
        let linked = records.iter().filter(|r| linked_goal(r).is_some()).count();
        linked as f64 / records.len() as f64 * 10.0
    };

    let overall = mean(&[
        productivity_index,
        consistency_score,
        achievement_rate,
        improvement_velocity,
        goal_alignment,
    ]);
    PerformanceMetrics {
        productivity_index,
        consistency_score,
        achievement_rate,
        improvement_velocity,
        goal_alignment,
        overall_performance: overall,
        performance_grade: performance_grade(overall),
        percentile: (overall * 10.0).clamp(0.0, 100.0),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressAdvice {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub priority: &'static str,
    pub title: String,
    pub description: String,
    pub actions: Vec<String>,
}

/// Dimensions with at least two records whose score has not moved.
fn stagnant_dimensions(records: &[ProgressRecord]) -> Vec<String> {
    scores_by_dimension(records)
        .into_iter()
        .filter(|(_, scores)| scores.len() >= 2 && trend(scores) == Trend::Stable)
        .map(|(d, _)| d.to_string())
        .collect()
}

pub fn progress_advice(
    records: &[ProgressRecord],
    goals: &[CareerGoal],
    assessments: &[SkillAssessment],
    today: NaiveDate,
) -> Vec<ProgressAdvice> {
    let mut advice = Vec::new();

    let stagnant = stagnant_dimensions(records);
    if !stagnant.is_empty() {
        advice.push(ProgressAdvice {
            kind: "improvement",
            priority: "high",
            title: "Push stalled areas forward".to_string(),
            description: format!("Progress has stalled in {}", stagnant.join(", ")),
            actions: stagnant
                .iter()
                .map(|d| format!("Write a concrete improvement plan for {d}"))
                .collect(),
        });
    }

    let overdue = goals.iter().filter(|g| is_overdue(g, today)).count();
    if overdue > 0 {
        advice.push(ProgressAdvice {
            kind: "goal_management",
            priority: "high",
            title: "Deal with overdue goals".to_string(),
            description: format!("{overdue} goal(s) are past their target date and need a fresh look"),
            actions: vec![
                "Reassess whether each goal is still feasible".to_string(),
                "Adjust the timeline".to_string(),
                "Split large goals into smaller steps".to_string(),
            ],
        });
    }

    let critical: Vec<&SkillAssessment> = assessments
        .iter()
        .filter(|a| a.gap() >= 3.0 && a.target_level.is_some_and(|t| t >= 7.0))
        .collect();
    if !critical.is_empty() {
        advice.push(ProgressAdvice {
            kind: "skill_development",
            priority: "medium",
            title: "Close critical skill gaps".to_string(),
            description: "Some key skills are far below their targets".to_string(),
            actions: critical
                .iter()
                .map(|a| {
                    format!(
                        "Plan how to improve {}",
                        a.skill_name.as_deref().unwrap_or(a.group_key())
                    )
                })
                .collect(),
        });
    }
    advice
}

#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub severity: &'static str,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

pub fn alerts(records: &[ProgressRecord], goals: &[CareerGoal], now: DateTime<Utc>) -> Vec<Alert> {
    let month_ago = window_start("1month", now).date_naive();
    let recent: Vec<ProgressRecord> = records
        .iter()
        .filter(|r| r.record_date >= month_ago)
        .cloned()
        .collect();

    let mut alerts: Vec<Alert> = scores_by_dimension(&recent)
        .into_iter()
        .filter_map(|(dimension, scores)| {
            let change = relative_change(&scores)?;
            (change < -TREND_THRESHOLD).then(|| Alert {
                kind: "performance_decline",
                severity: "medium",
                title: format!("{dimension} is declining"),
                description: format!(
                    "Recent {dimension} scores dropped {}%",
                    (change.abs() * 100.0).round()
                ),
                created_at: now,
            })
        })
        .collect();

    for goal in goals.iter().filter(|g| g.status == PersistedStatus::Active) {
        let Some(target) = goal.target_date else {
            continue;
        };
        let days = days_remaining(target, now);
        if days > 0 && days <= 30 && goal.progress_percentage < 70 {
            alerts.push(Alert {
                kind: "goal_at_risk",
                severity: "high",
                title: format!("Goal \"{}\" is behind schedule", goal.title),
                description: format!(
                    "{days} day(s) left but only {}% done",
                    goal.progress_percentage
                ),
                created_at: now,
            });
        }
    }
    alerts
}

#[derive(Debug, Clone, Serialize)]
pub struct Projections {
    /// Expected score change over the next four weeks at the current pace.
    pub short_term_improvement: f64,
    /// Share of open goals currently on track.
    pub goal_completion_probability: f64,
    pub career_advancement_probability: f64,
    pub confidence_interval: (f64, f64),
}

/// Score change per week between the first and last record.
fn weekly_pace(records: &[ProgressRecord]) -> f64 {
    match (records.first(), records.last()) {
        (Some(first), Some(last)) => {
            let days = (last.record_date - first.record_date).num_days();
            if days > 0 {
                (last.score - first.score) / days as f64 * 7.0
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}

pub fn projections(
    records: &[ProgressRecord],
    goals: &[CareerGoal],
    overall_score: f64,
    now: DateTime<Utc>,
) -> Projections {
    let open: Vec<&CareerGoal> = goals
        .iter()
        .filter(|g| g.status == PersistedStatus::Active)
        .collect();
    let goal_completion_probability = if open.is_empty() {
        0.0
    } else {
        open.iter().filter(|g| is_on_track(g, now)).count() as f64 / open.len() as f64
    };
    let scores: Vec<f64> = records.iter().map(|r| r.score).collect();
    let center = (overall_score / 10.0).clamp(0.0, 1.0);
    let spread = std_dev(&scores) / 10.0;

    Projections {
        short_term_improvement: weekly_pace(records) * 4.0,
        goal_completion_probability,
        career_advancement_probability: center,
        confidence_interval: (
            (center - spread).clamp(0.0, 1.0),
            (center + spread).clamp(0.0, 1.0),
        ),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressAnalysis {
    pub overall_progress: OverallProgress,
    pub dimension_analysis: BTreeMap<&'static str, DimensionAnalysis>,
    pub goal_achievement: GoalAchievement,
    pub skill_development: SkillDevelopment,
    pub trend_analysis: TrendAnalysis,
    pub performance_metrics: PerformanceMetrics,
    pub recommendations: Vec<ProgressAdvice>,
    pub alerts: Vec<Alert>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projections: Option<Projections>,
}

pub struct AnalysisInput<'a> {
    pub records: &'a [ProgressRecord],
    pub assessments: &'a [SkillAssessment],
    pub goals: &'a [CareerGoal],
    pub achievements: &'a [Achievement],
}

pub fn analyze(
    input: &AnalysisInput,
    time_range: &str,
    include_projections: bool,
    now: DateTime<Utc>,
) -> ProgressAnalysis {
    let overall = overall_progress(input.records, input.goals);
    let projections = include_projections
        .then(|| projections(input.records, input.goals, overall.overall_score, now));
    ProgressAnalysis {
        dimension_analysis: dimension_analysis(input.records, input.assessments),
        goal_achievement: goal_achievement(input.goals, input.records, now),
        skill_development: skill_development(input.assessments),
        trend_analysis: trend_analysis(input.records, time_range),
        performance_metrics: performance_metrics(input.records, input.achievements),
        recommendations: progress_advice(
            input.records,
            input.goals,
            input.assessments,
            now.date_naive(),
        ),
        alerts: alerts(input.records, input.goals, now),
        overall_progress: overall,
        projections,
    }
}

#[derive(Debug, Serialize)]
pub struct AnalysisMetadata {
    pub user_id: Uuid,
    pub analysis_type: String,
    pub time_range: String,
    pub generated_at: DateTime<Utc>,
    pub data_points: usize,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub analysis: ProgressAnalysis,
    pub metadata: AnalysisMetadata,
}

/// POST /functions/v1/progress-analysis
pub async fn handle_progress_analysis(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(request): JsonBody<AnalysisRequest>,
) -> Result<Json<DataResponse<AnalysisResponse>>, AppError> {
    let user_id = user.id();
    let store = state.store.as_ref();
    let now = Utc::now();
    let since = window_start(&request.time_range, now);

    let (records, assessments, goals, achievements) = tokio::try_join!(
        list_progress_records(store, user_id, Some(since), Direction::Asc, None),
        list_assessments(store, user_id),
        list_goals(store, user_id),
        list_achievements(store, user_id),
    )
    .map_err(|e| AppError::from(e).in_handler(ERROR_CODE))?;

    let input = AnalysisInput {
        records: &records,
        assessments: &assessments,
        goals: &goals,
        achievements: &achievements,
    };
    let analysis = analyze(&input, &request.time_range, request.include_projections, now);
    info!(
        "Progress analysis for user {user_id}: {} records over {}",
        records.len(),
        request.time_range
    );

    Ok(DataResponse::json(AnalysisResponse {
        analysis,
        metadata: AnalysisMetadata {
            user_id,
            analysis_type: request.analysis_type,
            time_range: request.time_range,
            generated_at: now,
            data_points: records.len(),
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    use crate::models::goal::{GoalCategory, GoalPriority};
    use crate::models::tables::{CAREER_GOALS, PROGRESS_RECORDS};
    use crate::store::memory::MemoryStore;
    use crate::test_support::{goal_row, send, TestApp, TOKEN};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn record(dimension: &str, indicator: Option<&str>, score: f64, days_ago: i64) -> ProgressRecord {
        ProgressRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            dimension: dimension.to_string(),
            indicator: indicator.map(str::to_string),
            score,
            record_date: (now() - Duration::days(days_ago)).date_naive(),
            metadata: None,
        }
    }

    fn goal(status: PersistedStatus, progress: i64, target_in_days: i64, age_days: i64) -> CareerGoal {
        CareerGoal {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            title: "Ship it".to_string(),
            description: None,
            category: GoalCategory::Skills,
            priority: GoalPriority::Medium,
            status,
            progress_percentage: progress,
            target_date: Some((now() + Duration::days(target_in_days)).date_naive()),
            created_at: now() - Duration::days(age_days),
            updated_at: now(),
        }
    }

    fn assessment(name: &str, category: &str, current: f64, target: f64) -> SkillAssessment {
        SkillAssessment {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            skill_name: Some(name.to_string()),
            category: Some(category.to_string()),
            dimension: None,
            current_level: current,
            target_level: Some(target),
            confidence_score: None,
            assessment_date: None,
        }
    }

    #[test]
    fn test_trend_thresholds() {
        assert_eq!(trend(&[5.0]), Trend::Stable);
        assert_eq!(trend(&[5.0, 6.0]), Trend::Improving);
        assert_eq!(trend(&[5.0, 5.4]), Trend::Stable);
        assert_eq!(trend(&[5.0, 4.0]), Trend::Declining);
        assert_eq!(trend(&[0.0, 4.0]), Trend::Stable);
    }

    #[test]
    fn test_grades_and_levels() {
        assert_eq!(performance_grade(8.7), "A+");
        assert_eq!(performance_grade(7.5), "A-");
        assert_eq!(performance_grade(6.0), "B-");
        assert_eq!(performance_grade(5.9), "C");
        assert_eq!(performance_level(8.0), "excellent");
        assert_eq!(performance_level(3.9), "needs_improvement");
    }

    #[test]
    fn test_window_start() {
        let start = window_start("3months", now());
        assert_eq!(start.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(window_start("bogus", now()), window_start("6months", now()));
    }

    #[test]
    fn test_overall_progress() {
        let records = vec![
            record("leadership", None, 4.0, 30),
            record("technical_skills", None, 6.0, 20),
            record("leadership", None, 6.0, 10),
            record("technical_skills", None, 8.0, 5),
        ];
        let goals = vec![
            goal(PersistedStatus::Completed, 100, -5, 60),
            goal(PersistedStatus::Active, 10, 50, 10),
        ];
        let overall = overall_progress(&records, &goals);
        assert_eq!(overall.overall_score, 7.0);
        assert_eq!(overall.performance_level, "good");
        assert_eq!(overall.goal_completion_rate, 0.5);
        assert_eq!(overall.dimension_scores["leadership"].trend, Trend::Improving);
        assert_eq!(overall.dimension_scores["leadership"].average_score, 5.0);
        assert_eq!(overall.improvement_rate, 100.0);
    }

    #[test]
    fn test_dimension_benchmarks_and_indicators() {
        let records = vec![
            record("technical_skills", Some("programming"), 8.0, 10),
            record("technical_skills", Some("algorithms"), 5.0, 5),
        ];
        let analysis = dimension_analysis(&records, &[]);
        let tech = &analysis["technical_skills"];
        assert_eq!(tech.strength_areas, ["programming"]);
        assert_eq!(tech.improvement_areas, ["algorithms", "system_design"]);
        assert_eq!(tech.benchmark_comparison.comparison, "below");
        assert!((tech.benchmark_comparison.gap - 0.7).abs() < 1e-9);
        assert_eq!(analysis["business_acumen"].benchmark_comparison.user_score, 0.0);
    }

    #[test]
    fn test_goal_on_track() {
        // Halfway through the window with 50% done.
        assert!(is_on_track(&goal(PersistedStatus::Active, 50, 30, 30), now()));
        // Halfway through with 10% done.
        assert!(!is_on_track(&goal(PersistedStatus::Active, 10, 30, 30), now()));
    }

    #[test]
    fn test_skill_development() {
        let skills = vec![
            assessment("rust", "technical", 9.0, 9.0),
            assessment("sql", "technical", 4.0, 8.0),
            assessment("public_speaking", "communication", 5.0, 7.0),
        ];
        let dev = skill_development(&skills);
        assert_eq!(dev.skill_overview["technical"].skill_count, 2);
        assert_eq!(dev.skill_overview["technical"].max_level, 9.0);
        assert_eq!(dev.skill_overview["technical"].confidence_score, 0.5);
        assert_eq!(dev.top_skills.len(), 1);
        assert_eq!(dev.improvement_needed[0].name.as_deref(), Some("sql"));
        assert_eq!(dev.improvement_needed[0].priority, "high");
        assert_eq!(dev.improvement_needed[1].priority, "medium");
    }

    #[test]
    fn test_alerts() {
        let records = vec![
            record("leadership", None, 8.0, 20),
            record("leadership", None, 6.0, 2),
            record("strategy", None, 4.0, 90),
            record("strategy", None, 2.0, 2),
        ];
        let goals = vec![
            goal(PersistedStatus::Active, 40, 10, 60),
            goal(PersistedStatus::Active, 90, 10, 60),
            goal(PersistedStatus::Paused, 0, 10, 60),
        ];
        let alerts = alerts(&records, &goals, now());
        let kinds: Vec<_> = alerts.iter().map(|a| a.kind).collect();
        assert_eq!(kinds, ["performance_decline", "goal_at_risk"]);
        assert!(alerts[0].title.starts_with("leadership"));
    }

    #[test]
    fn test_advice_covers_overdue_and_gaps() {
        let goals = vec![goal(PersistedStatus::Active, 20, -3, 60)];
        let skills = vec![assessment("sql", "technical", 3.0, 8.0)];
        let advice = progress_advice(&[], &goals, &skills, now().date_naive());
        let kinds: Vec<_> = advice.iter().map(|a| a.kind).collect();
        assert_eq!(kinds, ["goal_management", "skill_development"]);
    }

    #[tokio::test]
    async fn test_endpoint_filters_window_and_omits_projections() {
        let app = TestApp::new();
        let today = Utc::now().date_naive();
        app.store.seed(
            PROGRESS_RECORDS,
            vec![
                json!({"id": Uuid::new_v4(), "user_id": app.user_id, "dimension": "leadership",
                       "score": 6.0, "record_date": today - Duration::days(10)}),
                json!({"id": Uuid::new_v4(), "user_id": app.user_id, "dimension": "leadership",
                       "score": 2.0, "record_date": today - Duration::days(400)}),
            ],
        );
        app.store
            .seed(CAREER_GOALS, vec![goal_row(app.user_id, "completed", 100)]);

        let (status, body) = send(
            app.router(),
            Method::POST,
            "/functions/v1/progress-analysis",
            Some(TOKEN),
            Some(json!({"timeRange": "1month", "includeProjections": false})),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["data"]["metadata"]["data_points"], 1);
        assert_eq!(body["data"]["metadata"]["analysis_type"], "comprehensive");
        let analysis = &body["data"]["analysis"];
        assert_eq!(analysis["overall_progress"]["overall_score"], 6.0);
        assert_eq!(analysis["goal_achievement"]["completed_goals"], 1);
        assert!(analysis.get("projections").is_none());
    }

    #[tokio::test]
    async fn test_endpoint_store_failure() {
        let app = TestApp::with_store(MemoryStore::failing());
        let (status, body) = send(
            app.router(),
            Method::POST,
            "/functions/v1/progress-analysis",
            Some(TOKEN),
            Some(json!({})),
        )
        .await;
        assert_eq!(status, 500);
        assert_eq!(body["error"]["code"], ERROR_CODE);
    }
}
