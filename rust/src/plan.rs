//! Plan output types.
//!
//! Field names serialize in camelCase to match the plan JSON consumed by the
//! web client.

use serde::Serialize;

use crate::gaps::GapAnalysis;
use crate::models::{DifficultyProfile, Schedule};
use crate::resources::{LearningStrategy, ResourceGroup};

/// A complete study plan.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub plan_id: String,
    pub duration_weeks: u32,
    /// Weekly budget times weeks; the schedule may use less.
    pub total_study_hours: u32,
    pub weekly_schedule: Vec<WeeklyPlan>,
    pub topic_distribution: Schedule,
    pub study_focus: StudyFocus,
    pub resources: Vec<ResourceGroup>,
    pub milestones: Vec<Milestone>,
    pub analytics: PlanAnalytics,
    pub total_topics: usize,
    pub average_hours_per_week: u32,
    pub estimated_score_progress: Vec<ScorePoint>,
    pub recommendations: Vec<String>,
    /// Same as `analytics.success_probability`.
    pub confidence: f64,
    pub generated_by: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyFocus {
    /// First five critical gaps.
    pub priority_topics: Vec<String>,
    pub strong_areas: Vec<String>,
    pub learning_gaps: GapAnalysis,
    pub recommended_approach: String,
    pub learning_strategy: &'static LearningStrategy,
    /// Study-mode parameters for the preferred difficulty.
    pub difficulty_profile: DifficultyProfile,
    pub plan_type: &'static str,
    pub student_level: &'static str,
}

/// One week of the schedule.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyPlan {
    pub week_number: u32,
    pub focus_topics: Vec<FocusTopic>,
    pub total_hours: u32,
    pub learning_activities: Vec<Activity>,
    pub goals: Vec<String>,
    pub practice_tests: Vec<PracticeTest>,
    pub resources: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intensity: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusTopic {
    pub name: String,
    pub hours: u32,
    pub category: String,
    pub priority: f64,
    pub complexity: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Theory,
    Practice,
    AdvancedTheory,
    ChallengingPractice,
}

/// A theory or practice block for one topic in one week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Activity {
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    /// Hours.
    pub duration: u32,
    pub methods: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exercises: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PracticeTestKind {
    Diagnostic,
    FinalReview,
    AdvancedDiagnostic,
    ExamSimulation,
}

impl PracticeTestKind {
    /// Fixed coverage for whole-course tests; `None` means this week's topics.
    pub fn scope(&self) -> Option<&'static str> {
        match self {
            Self::FinalReview => Some("all_covered"),
            Self::ExamSimulation => Some("full_exam"),
            Self::Diagnostic | Self::AdvancedDiagnostic => None,
        }
    }
}

/// What a practice test covers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TestCoverage {
    Topics(Vec<String>),
    /// Everything covered so far (`"all_covered"`) or the full exam (`"full_exam"`).
    Scope(&'static str),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PracticeTest {
    #[serde(rename = "type")]
    pub kind: PracticeTestKind,
    pub topics: TestCoverage,
    /// Hours.
    pub duration: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneKind {
    Foundation,
    Progress,
    Mastery,
    Excellence,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub week: u32,
    pub target_score: f64,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: MilestoneKind,
    pub key_topics: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScorePoint {
    pub week: u32,
    pub estimated_score: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanAnalytics {
    pub plan_efficiency: f64,
    pub coverage_metrics: CoverageMetrics,
    pub difficulty_distribution: DifficultyDistribution,
    pub risk_assessment: Vec<String>,
    pub success_probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageMetrics {
    /// `"covered/total"` critical gaps that got hours.
    pub critical_gaps_covered: String,
    pub total_topics_covered: usize,
    pub total_hours_allocated: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DifficultyDistribution {
    pub easy: usize,
    pub medium: usize,
    pub hard: usize,
}
