//! Study planner: runs the full pipeline for one learner.
//!
//! gap analysis -> priorities and estimates -> tier filter -> allocation
//! -> weekly distribution -> milestones and analytics.

use chrono::{DateTime, TimeZone};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Normal;
use thiserror::Error;

use crate::allocator::{total_allocated, Allocator};
use crate::analytics::{
    milestones, plan_analytics, recommendations, recommended_approach, score_progression,
    student_level,
};
use crate::catalog::{CatalogError, TopicCatalog};
use crate::config::PlannerConfig;
use crate::estimate::estimate_hours;
use crate::gaps::{GapAnalysis, GapRules};
use crate::graph::DependencyGraph;
use crate::models::{LearnerProfile, ProfileError, Schedule, TopicAnalysis, TopicMap};
use crate::plan::{Plan, StudyFocus};
use crate::priority::PriorityFactors;
use crate::resources::{personalized_resources, LearningStrategy};
use crate::tier::{apply_tier_filter, LearnerTier};
use crate::weekly::WeeklyDistributor;
use crate::{log_changes, log_debug};

pub const GENERATED_BY: &str = "advanced_ml_system_v2";
/// Critical gaps listed as priority topics in the study focus.
const PRIORITY_TOPICS: usize = 5;
const SECONDS_PER_DAY: i64 = 86_400;

/// Errors that stop a plan from being generated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Planning engine over an immutable catalog and prerequisite graph.
#[derive(Clone, Debug)]
pub struct StudyPlanner {
    catalog: TopicCatalog,
    graph: DependencyGraph,
    gap_rules: GapRules,
    config: PlannerConfig,
}

impl Default for StudyPlanner {
    /// The built-in EGE mathematics catalog with default settings.
    fn default() -> Self {
        // Acyclicity of the built-in graph is covered by test_builtin_graph_is_acyclic
        Self {
            catalog: TopicCatalog::ege_mathematics(),
            graph: DependencyGraph::ege_mathematics(),
            gap_rules: GapRules::default(),
            config: PlannerConfig::default(),
        }
    }
}

impl StudyPlanner {
    /// Create a planner, rejecting prerequisite cycles among catalog topics.
    pub fn new(
        catalog: TopicCatalog,
        graph: DependencyGraph,
        config: PlannerConfig,
    ) -> Result<Self, CatalogError> {
        graph.validate(&catalog)?;
        Ok(Self {
            catalog,
            graph,
            gap_rules: GapRules::default(),
            config,
        })
    }

    pub fn with_config(mut self, config: PlannerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_gap_rules(mut self, gap_rules: GapRules) -> Self {
        self.gap_rules = gap_rules;
        self
    }

    pub fn catalog(&self) -> &TopicCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn analyze_gaps(&self, profile: &LearnerProfile) -> GapAnalysis {
        self.gap_rules.analyze(&profile.weak_areas)
    }

    /// Priority, estimate and prerequisites for every catalog topic, in
    /// catalog order.
    pub fn analyze_topics(
        &self,
        profile: &LearnerProfile,
        gaps: &GapAnalysis,
    ) -> TopicMap<TopicAnalysis> {
        let verbosity = self.config.verbosity;

        self.catalog
            .iter()
            .map(|topic| {
                let factors = PriorityFactors::compute(&topic.name, topic.base_time_hours, profile, gaps);
                let analysis = TopicAnalysis {
                    priority: factors.priority(topic.weight),
                    estimated_hours: estimate_hours(topic.base_time_hours, profile),
                    category: topic.category.clone(),
                    base_time_hours: topic.base_time_hours,
                    weight: topic.weight,
                    complexity: topic.complexity,
                    dependencies: self.graph.prerequisites(&topic.name),
                };
                log_debug!(
                    verbosity,
                    "  {}: priority={:.1} (gap={}, level={}, target={:.2}, motivation={:.2}, pref={}), {}h",
                    topic.name,
                    analysis.priority,
                    factors.gap_boost,
                    factors.level_factor,
                    factors.target_factor,
                    factors.motivation_factor,
                    factors.preference_factor,
                    analysis.estimated_hours
                );
                (topic.name.clone(), analysis)
            })
            .collect()
    }

    /// Catalog analysis after tier pruning and injection.
    pub fn filtered_analysis(
        &self,
        profile: &LearnerProfile,
        gaps: &GapAnalysis,
    ) -> TopicMap<TopicAnalysis> {
        apply_tier_filter(
            self.analyze_topics(profile, gaps),
            profile,
            gaps,
            self.config.verbosity,
        )
    }

    /// Allocate `total_hours` across the filtered topics.
    pub fn build_schedule(
        &self,
        profile: &LearnerProfile,
        gaps: &GapAnalysis,
        total_hours: u32,
    ) -> Schedule {
        let tier = LearnerTier::for_profile(profile);
        let analysis = self.filtered_analysis(profile, gaps);
        Allocator::new(tier, gaps, self.config.verbosity).allocate(&analysis, total_hours)
    }

    /// Generate a plan, drawing score noise from the configured seed or the
    /// thread RNG.
    pub fn generate_plan<Tz: TimeZone>(
        &self,
        profile: &LearnerProfile,
        now: &DateTime<Tz>,
    ) -> Result<Plan, PlanError> {
        match self.config.seed {
            Some(seed) => {
                self.generate_plan_with_rng(profile, now, &mut StdRng::seed_from_u64(seed))
            }
            None => self.generate_plan_with_rng(profile, now, &mut rand::rng()),
        }
    }

    /// Generate a plan with an explicit noise source.
    ///
    /// `now` is the wall clock used for exam-date arithmetic and the plan id.
    pub fn generate_plan_with_rng<Tz: TimeZone, R: Rng + ?Sized>(
        &self,
        profile: &LearnerProfile,
        now: &DateTime<Tz>,
        rng: &mut R,
    ) -> Result<Plan, PlanError> {
        let noise = self.noise()?;
        let exam_date = profile.validate(&now.timezone())?;
        let verbosity = self.config.verbosity;

        let days_until_exam =
            (exam_date.timestamp() - now.timestamp()).div_euclid(SECONDS_PER_DAY);
        let total_weeks = u32::try_from(days_until_exam.div_euclid(7).max(0))
            .unwrap_or(u32::MAX)
            .max(self.config.min_plan_weeks);
        let total_hours = total_weeks.saturating_mul(profile.available_hours_per_week);

        let tier = LearnerTier::for_profile(profile);
        let strategy = tier.strategy();
        log_changes!(
            verbosity,
            "Generating {} plan for {}: score {} -> {}, {} weeks, {}h",
            strategy.plan_type,
            profile.user_id,
            profile.current_score,
            profile.target_score,
            total_weeks,
            total_hours
        );

        let gaps = self.analyze_gaps(profile);
        let schedule = self.build_schedule(profile, &gaps, total_hours);
        let weekly_schedule =
            WeeklyDistributor::new(profile, tier, total_weeks, verbosity).distribute(&schedule);
        let analytics = plan_analytics(&schedule, profile, &gaps, days_until_exam);

        log_changes!(
            verbosity,
            "Plan ready: {} topics, {}h allocated over {} weeks, success probability {:.2}",
            schedule.len(),
            total_allocated(&schedule),
            weekly_schedule.len(),
            analytics.success_probability
        );

        let study_focus = StudyFocus {
            priority_topics: gaps.critical.iter().take(PRIORITY_TOPICS).cloned().collect(),
            strong_areas: profile.strong_areas.clone(),
            learning_gaps: gaps,
            recommended_approach: recommended_approach(profile),
            learning_strategy: LearningStrategy::for_style(profile.learning_style),
            difficulty_profile: profile.preferred_difficulty.profile(),
            plan_type: strategy.plan_type,
            student_level: student_level(profile.current_score),
        };

        Ok(Plan {
            plan_id: format!("plan_{}_{}", profile.user_id, now.timestamp()),
            duration_weeks: total_weeks,
            total_study_hours: total_hours,
            weekly_schedule,
            total_topics: schedule.len(),
            topic_distribution: schedule,
            study_focus,
            resources: personalized_resources(profile, tier),
            milestones: milestones(profile, total_weeks),
            confidence: analytics.success_probability,
            analytics,
            average_hours_per_week: profile.available_hours_per_week,
            estimated_score_progress: score_progression(profile, total_weeks, &noise, rng),
            recommendations: recommendations(profile),
            generated_by: GENERATED_BY,
        })
    }

    fn noise(&self) -> Result<Normal<f64>, PlanError> {
        if self.config.min_plan_weeks == 0 {
            return Err(PlanError::InvalidConfig(
                "min_plan_weeks must be at least 1".to_string(),
            ));
        }
        let std_dev = self.config.score_noise_std_dev;
        // Normal::new only rejects non-finite values
        if !(std_dev >= 0.0 && std_dev.is_finite()) {
            return Err(PlanError::InvalidConfig(format!(
                "score_noise_std_dev must be finite and non-negative, got {}",
                std_dev
            )));
        }
        Normal::new(0.0, std_dev).map_err(|e| {
            PlanError::InvalidConfig(format!("score_noise_std_dev {}: {}", std_dev, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Topic;
    use crate::models::{Difficulty, Importance, LearningStyle};
    use chrono::{FixedOffset, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 5, 0, 0, 0).unwrap()
    }

    /// 2026-01-05 + 16 weeks.
    const EXAM_IN_16_WEEKS: &str = "2026-04-27";

    fn profile(current: f64, target: f64, weak: &[&str]) -> LearnerProfile {
        LearnerProfile {
            user_id: "u1".to_string(),
            current_score: current,
            target_score: target,
            exam_date: EXAM_IN_16_WEEKS.to_string(),
            available_hours_per_week: 10,
            weak_areas: weak.iter().map(|w| w.to_string()).collect(),
            strong_areas: vec!["Проценты".to_string()],
            focus_areas: vec![],
            learning_style: LearningStyle::Visual,
            preferred_difficulty: Difficulty::Intermediate,
            motivation_level: 7,
        }
    }

    fn seeded(seed: u64) -> StudyPlanner {
        StudyPlanner::default().with_config(PlannerConfig {
            seed: Some(seed),
            ..PlannerConfig::default()
        })
    }

    #[test]
    fn test_low_score_high_target_scenario() {
        let p = profile(30.0, 90.0, &["Линейные уравнения", "Геометрия"]);
        let planner = seeded(1);
        let plan = planner.generate_plan(&p, &now()).unwrap();

        assert_eq!(plan.duration_weeks, 16);
        assert_eq!(plan.total_study_hours, 160);
        assert!(!plan.topic_distribution.is_empty());
        assert!(plan.topic_distribution.contains("Линейные уравнения"));
        assert!(total_allocated(&plan.topic_distribution) <= 160);
        assert_eq!(plan.total_topics, plan.topic_distribution.len());

        let gaps = planner.analyze_gaps(&p);
        let analysis = planner.filtered_analysis(&p, &gaps);
        assert!(analysis.contains("Арифметика"));
        assert!(analysis.contains("Олимпиадные задачи"));

        assert_eq!(plan.study_focus.plan_type, "personalized");
        assert_eq!(plan.study_focus.student_level, "начальный");
        assert_eq!(plan.study_focus.priority_topics, vec!["Линейные уравнения"]);
        assert_eq!(plan.study_focus.learning_gaps.significant, vec!["Геометрия"]);
        assert!(!plan.weekly_schedule.is_empty());
        assert!(plan.weekly_schedule.len() <= 16);
        assert_eq!(plan.milestones.len(), 4);
        assert_eq!(plan.estimated_score_progress.len(), 17);
        assert_eq!(plan.confidence, plan.analytics.success_probability);
        assert_eq!(plan.plan_id, format!("plan_u1_{}", now().timestamp()));
    }

    #[test]
    fn test_high_score_scenario() {
        let p = profile(88.0, 95.0, &[]);
        let plan = seeded(2).generate_plan(&p, &now()).unwrap();

        assert!(!plan.topic_distribution.contains("Арифметика"));
        assert!(!plan.topic_distribution.contains("Статистика"));
        assert_eq!(plan.study_focus.plan_type, "advanced_focused");
        assert_eq!(plan.study_focus.student_level, "продвинутый");
        for week in &plan.weekly_schedule {
            assert!(week.focus_topics.len() <= 2);
            assert_eq!(week.intensity, Some("high"));
        }
    }

    #[test]
    fn test_schedule_invariants_across_profiles() {
        let planner = StudyPlanner::default();
        for current in [20.0, 45.0, 65.0, 75.0, 90.0] {
            for target in [60.0, 85.0, 100.0] {
                for hours in [3, 10, 25] {
                    let mut p = profile(current, target, &["Квадратные уравнения"]);
                    p.available_hours_per_week = hours;
                    let gaps = planner.analyze_gaps(&p);
                    let budget = 16 * hours;
                    let schedule = planner.build_schedule(&p, &gaps, budget);

                    assert!(total_allocated(&schedule) <= budget);
                    for entry in schedule.values() {
                        assert!(entry.allocated_hours >= 2);
                        assert!(entry.allocated_hours <= 16);
                        if entry.complexity < 4 || current <= 70.0 {
                            assert!(entry.allocated_hours <= 12);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_no_gaps_means_neutral_boosts() {
        let planner = StudyPlanner::default();
        let p = profile(50.0, 80.0, &[]);
        let gaps = planner.analyze_gaps(&p);
        assert!(gaps.is_empty());

        for topic in planner.catalog().iter() {
            let factors = PriorityFactors::compute(&topic.name, topic.base_time_hours, &p, &gaps);
            assert_eq!(factors.gap_boost, 1.0);
            assert_eq!(factors.preference_factor, 1.0);
        }
    }

    #[test]
    fn test_analysis_is_idempotent() {
        let planner = StudyPlanner::default();
        let p = profile(75.0, 90.0, &["Производная функции"]);
        let gaps = planner.analyze_gaps(&p);
        assert_eq!(
            planner.filtered_analysis(&p, &gaps),
            planner.filtered_analysis(&p, &gaps)
        );
        assert_eq!(
            planner.build_schedule(&p, &gaps, 160),
            planner.build_schedule(&p, &gaps, 160)
        );
    }

    #[test]
    fn test_analysis_follows_catalog_order() {
        let planner = StudyPlanner::default();
        let p = profile(50.0, 80.0, &[]);
        let analysis = planner.analyze_topics(&p, &GapAnalysis::default());
        assert_eq!(analysis.len(), planner.catalog().len());
        assert_eq!(analysis.keys().next(), Some("Арифметика"));
        assert_eq!(
            analysis.get("Квадратные уравнения").unwrap().dependencies,
            vec!["Линейные уравнения", "Алгебраические преобразования"]
        );
    }

    #[test]
    fn test_seeded_plans_are_identical() {
        let p = profile(55.0, 85.0, &["Тригонометрия"]);
        let a = seeded(9).generate_plan(&p, &now()).unwrap();
        let b = seeded(9).generate_plan(&p, &now()).unwrap();
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_past_exam_uses_minimum_weeks() {
        let mut p = profile(50.0, 70.0, &[]);
        p.exam_date = "2025-12-01".to_string();
        let plan = seeded(3).generate_plan(&p, &now()).unwrap();
        assert_eq!(plan.duration_weeks, 4);
        assert_eq!(plan.total_study_hours, 40);
    }

    #[test]
    fn test_partial_week_rounds_down() {
        let mut p = profile(50.0, 70.0, &[]);
        p.exam_date = "2026-03-20T12:00:00Z".to_string();
        // 74.5 days -> 74 -> 10 weeks
        let plan = seeded(3).generate_plan(&p, &now()).unwrap();
        assert_eq!(plan.duration_weeks, 10);
    }

    #[test]
    fn test_exam_offset_counted_as_instant() {
        // 2026-01-04T23:00Z; exam is 90 days and one hour later
        let moscow = FixedOffset::east_opt(3 * 3600).unwrap();
        let now = moscow.with_ymd_and_hms(2026, 1, 5, 2, 0, 0).unwrap();
        let mut p = profile(50.0, 70.0, &[]);
        p.exam_date = "2026-04-05T00:00:00Z".to_string();

        let plan = seeded(5).generate_plan(&p, &now).unwrap();
        assert_eq!(plan.duration_weeks, 12);
        assert!((plan.analytics.success_probability - 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_bare_exam_date_in_caller_zone() {
        // Local midnight to local midnight: exactly 16 weeks in any zone
        let moscow = FixedOffset::east_opt(3 * 3600).unwrap();
        let now = moscow.with_ymd_and_hms(2026, 1, 5, 0, 0, 0).unwrap();
        let plan = seeded(5)
            .generate_plan(&profile(50.0, 70.0, &[]), &now)
            .unwrap();
        assert_eq!(plan.duration_weeks, 16);
    }

    #[test]
    fn test_profile_errors() {
        let planner = seeded(1);
        let mut p = profile(50.0, 70.0, &[]);
        p.exam_date = "soon".to_string();
        assert_eq!(
            planner.generate_plan(&p, &now()).unwrap_err(),
            PlanError::Profile(ProfileError::InvalidExamDate("soon".to_string()))
        );

        let mut p = profile(50.0, 70.0, &[]);
        p.available_hours_per_week = 0;
        let err = planner.generate_plan(&p, &now()).unwrap_err();
        assert_eq!(err, PlanError::Profile(ProfileError::NonPositiveWeeklyHours));
        assert_eq!(err.to_string(), "Available hours per week must be positive");
    }

    #[test]
    fn test_config_errors() {
        let p = profile(50.0, 70.0, &[]);
        let noisy = StudyPlanner::default().with_config(PlannerConfig {
            score_noise_std_dev: -1.0,
            ..PlannerConfig::default()
        });
        assert!(matches!(
            noisy.generate_plan(&p, &now()),
            Err(PlanError::InvalidConfig(_))
        ));

        for bad in [f64::NAN, f64::INFINITY, -0.5] {
            let planner = StudyPlanner::default().with_config(PlannerConfig {
                score_noise_std_dev: bad,
                ..PlannerConfig::default()
            });
            assert!(matches!(
                planner.generate_plan(&p, &now()),
                Err(PlanError::InvalidConfig(_))
            ));
        }

        // Zero noise is a valid deterministic projection
        let quiet = StudyPlanner::default().with_config(PlannerConfig {
            score_noise_std_dev: 0.0,
            ..PlannerConfig::default()
        });
        assert!(quiet.generate_plan(&p, &now()).is_ok());

        let no_weeks = StudyPlanner::default().with_config(PlannerConfig {
            min_plan_weeks: 0,
            ..PlannerConfig::default()
        });
        assert!(matches!(
            no_weeks.generate_plan(&p, &now()),
            Err(PlanError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_custom_catalog() {
        let catalog = TopicCatalog::new(vec![
            Topic::new("Основы", "База", 0.8, 4, 1, Importance::High),
            Topic::new("Продолжение", "База", 0.9, 6, 3, Importance::High),
        ])
        .unwrap();
        let graph = DependencyGraph::new(vec![("Продолжение", vec!["Основы"])]);
        let planner = StudyPlanner::new(catalog, graph, PlannerConfig::default()).unwrap();

        let p = profile(50.0, 70.0, &[]);
        let plan = planner
            .generate_plan_with_rng(&p, &now(), &mut StdRng::seed_from_u64(5))
            .unwrap();
        assert_eq!(
            plan.topic_distribution.keys().collect::<Vec<_>>(),
            vec!["Основы", "Продолжение"]
        );
        assert_eq!(plan.weekly_schedule[0].focus_topics[0].name, "Основы");
    }

    #[test]
    fn test_cyclic_catalog_rejected() {
        let catalog = TopicCatalog::new(vec![
            Topic::new("a", "c", 0.5, 4, 2, Importance::Low),
            Topic::new("b", "c", 0.5, 4, 2, Importance::Low),
        ])
        .unwrap();
        let graph = DependencyGraph::new(vec![("a", vec!["b"]), ("b", vec!["a"])]);
        assert!(matches!(
            StudyPlanner::new(catalog, graph, PlannerConfig::default()),
            Err(CatalogError::CircularDependency(_))
        ));
    }

    #[test]
    fn test_fully_pruned_catalog_is_not_an_error() {
        let catalog = TopicCatalog::new(vec![
            Topic::new("Арифметика", "Базовые навыки", 0.8, 4, 2, Importance::High),
            Topic::new("Проценты", "Базовые навыки", 0.7, 5, 2, Importance::Medium),
        ])
        .unwrap();
        let planner =
            StudyPlanner::new(catalog, DependencyGraph::default(), PlannerConfig::default()).unwrap();

        let p = profile(85.0, 80.0, &[]);
        let plan = planner
            .generate_plan_with_rng(&p, &now(), &mut StdRng::seed_from_u64(5))
            .unwrap();
        assert!(plan.topic_distribution.is_empty());
        assert!(plan.weekly_schedule.is_empty());
        assert_eq!(plan.analytics.plan_efficiency, 0.0);
        assert_eq!(plan.analytics.coverage_metrics.critical_gaps_covered, "0/0");
        assert_eq!(plan.milestones.len(), 4);
    }

    #[test]
    fn test_plan_json_shape() {
        let p = profile(60.0, 85.0, &["Тригонометрические уравнения"]);
        let plan = seeded(4).generate_plan(&p, &now()).unwrap();
        let json = serde_json::to_value(&plan).unwrap();

        assert_eq!(json["generatedBy"], "advanced_ml_system_v2");
        assert_eq!(json["durationWeeks"], 16);
        assert!(json["weeklySchedule"][0]["focusTopics"].is_array());
        assert_eq!(json["studyFocus"]["learningStrategy"]["resources"][0], "видеоуроки");
        assert_eq!(json["studyFocus"]["difficultyProfile"]["reviewFrequency"], "medium");
        assert_eq!(json["studyFocus"]["difficultyProfile"]["stepByStepGuidance"], false);
        assert_eq!(json["studyFocus"]["difficultyProfile"]["maxTopicDuration"], 6);
        assert_eq!(json["resources"][0]["category"], "official");
        assert_eq!(json["milestones"][0]["type"], "foundation");
        assert!(json["analytics"]["coverageMetrics"]["criticalGapsCovered"].is_string());
        assert!(json["weeklySchedule"][0].get("intensity").is_none());
    }
}
