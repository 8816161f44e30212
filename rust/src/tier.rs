//! Learner tiers and tier-driven catalog adjustments.
//!
//! Every stage that treats standard and advanced learners differently reads
//! its parameters from [`TierStrategy`] instead of branching on scores.

use serde::Serialize;

use crate::estimate::estimate_hours;
use crate::gaps::GapAnalysis;
use crate::log_changes;
use crate::models::{LearnerProfile, TopicAnalysis, TopicMap};
use crate::plan::{ActivityKind, PracticeTestKind};
use crate::priority::topic_priority;

/// Scores strictly above this take the advanced path.
pub const ADVANCED_SCORE_THRESHOLD: f64 = 70.0;
/// Targets at or above this get the hardest topics injected.
pub const HIGH_TARGET_THRESHOLD: f64 = 85.0;
/// Share of the estimate kept for a reduced topic.
pub const REDUCED_TIME_SHARE: f64 = 0.3;
/// Complexity at which a topic counts as hard.
pub const COMPLEX_TOPIC: u8 = 4;

/// Standard vs advanced treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LearnerTier {
    Standard,
    Advanced,
}

impl LearnerTier {
    pub fn for_profile(profile: &LearnerProfile) -> Self {
        if profile.current_score > ADVANCED_SCORE_THRESHOLD {
            Self::Advanced
        } else {
            Self::Standard
        }
    }

    pub fn strategy(&self) -> &'static TierStrategy {
        match self {
            Self::Standard => &STANDARD,
            Self::Advanced => &ADVANCED,
        }
    }

    /// Topic cap per week. Standard weeks are limited by hours only.
    pub fn max_topics_per_week(&self, current_score: f64) -> Option<usize> {
        match self {
            Self::Standard => None,
            Self::Advanced if current_score > 80.0 => Some(2),
            Self::Advanced => Some(3),
        }
    }

    pub fn intensity(&self, current_score: f64) -> Option<&'static str> {
        match self {
            Self::Standard => None,
            Self::Advanced if current_score > 80.0 => Some("high"),
            Self::Advanced => Some("medium"),
        }
    }
}

/// A recurring or one-off practice test slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestSlot {
    pub kind: PracticeTestKind,
    pub duration_hours: u32,
    pub difficulty: Option<&'static str>,
}

/// Per-tier parameters consumed by the allocator and weekly distributor.
#[derive(Debug, Clone, PartialEq)]
pub struct TierStrategy {
    pub plan_type: &'static str,
    /// Restrict the first allocation pass to hard topics and critical gaps.
    pub focus_first_pass: bool,
    pub topic_hour_cap: u32,
    pub complex_topic_hour_cap: u32,
    /// Per-week hours for one topic.
    pub weekly_chunk: u32,
    pub complex_weekly_chunk: u32,
    /// A topic gets no time this week if it would get less than this.
    pub min_weekly_chunk: u32,
    /// Overrides the difficulty profile's theory share.
    pub fixed_theory_ratio: Option<f64>,
    pub theory_activity: ActivityKind,
    pub practice_activity: ActivityKind,
    pub diagnostic_every_weeks: u32,
    pub diagnostic: TestSlot,
    /// Capstone test lands this many weeks before the last week.
    pub capstone_weeks_before_end: u32,
    pub capstone: TestSlot,
}

impl TierStrategy {
    pub fn topic_hour_cap(&self, complexity: u8) -> u32 {
        if complexity >= COMPLEX_TOPIC {
            self.complex_topic_hour_cap
        } else {
            self.topic_hour_cap
        }
    }

    pub fn weekly_chunk(&self, complexity: u8) -> u32 {
        if complexity >= COMPLEX_TOPIC {
            self.complex_weekly_chunk
        } else {
            self.weekly_chunk
        }
    }
}

static STANDARD: TierStrategy = TierStrategy {
    plan_type: "personalized",
    focus_first_pass: false,
    topic_hour_cap: 12,
    complex_topic_hour_cap: 12,
    weekly_chunk: 8,
    complex_weekly_chunk: 8,
    min_weekly_chunk: 2,
    fixed_theory_ratio: None,
    theory_activity: ActivityKind::Theory,
    practice_activity: ActivityKind::Practice,
    diagnostic_every_weeks: 3,
    diagnostic: TestSlot {
        kind: PracticeTestKind::Diagnostic,
        duration_hours: 2,
        difficulty: None,
    },
    capstone_weeks_before_end: 1,
    capstone: TestSlot {
        kind: PracticeTestKind::FinalReview,
        duration_hours: 3,
        difficulty: None,
    },
};

static ADVANCED: TierStrategy = TierStrategy {
    plan_type: "advanced_focused",
    focus_first_pass: true,
    topic_hour_cap: 12,
    complex_topic_hour_cap: 16,
    weekly_chunk: 6,
    complex_weekly_chunk: 10,
    min_weekly_chunk: 3,
    fixed_theory_ratio: Some(0.15),
    theory_activity: ActivityKind::AdvancedTheory,
    practice_activity: ActivityKind::ChallengingPractice,
    diagnostic_every_weeks: 2,
    diagnostic: TestSlot {
        kind: PracticeTestKind::AdvancedDiagnostic,
        duration_hours: 3,
        difficulty: Some("high"),
    },
    capstone_weeks_before_end: 2,
    capstone: TestSlot {
        kind: PracticeTestKind::ExamSimulation,
        duration_hours: 4,
        difficulty: Some("exam_level"),
    },
};

/// Which basic topics an already strong learner skips or skims.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruningStrategy {
    HighScore,
    MediumScore,
}

impl PruningStrategy {
    pub fn for_score(current_score: f64) -> Option<Self> {
        if current_score >= 80.0 {
            Some(Self::HighScore)
        } else if current_score >= 70.0 {
            Some(Self::MediumScore)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HighScore => "high_score",
            Self::MediumScore => "medium_score",
        }
    }

    pub fn exclude_completely(&self) -> &'static [&'static str] {
        match self {
            Self::HighScore => &[
                "Арифметика",
                "Проценты",
                "Дроби",
                "Линейные уравнения",
                "Линейные неравенства",
                "Числовые множества",
                "Статистика",
            ],
            Self::MediumScore => &["Арифметика", "Проценты"],
        }
    }

    pub fn reduce_time(&self) -> &'static [&'static str] {
        match self {
            Self::HighScore => &[
                "Алгебраические преобразования",
                "Степени и корни",
                "Линейные функции",
                "Графики функций",
            ],
            Self::MediumScore => &["Дроби", "Линейные уравнения", "Линейные неравенства"],
        }
    }
}

const ADVANCED_CATEGORY: &str = "Продвинутые темы";
const ADVANCED_DEPENDENCIES: &[&str] = &["Квадратные уравнения", "Неравенства", "Функции"];
/// (name, weight, base time, complexity)
const ADVANCED_TOPICS: &[(&str, f64, u32, u8)] = &[
    ("Задачи с параметрами", 0.9, 18, 5),
    ("Исследование уравнений с параметрами", 0.8, 15, 5),
    ("Сложные стереометрические задачи", 0.8, 14, 5),
    ("Олимпиадные задачи", 0.7, 12, 5),
];

/// Remove or shrink basic topics for learners scoring 70 and above.
pub fn prune_basic_topics(
    mut analysis: TopicMap<TopicAnalysis>,
    profile: &LearnerProfile,
    verbosity: u8,
) -> TopicMap<TopicAnalysis> {
    let Some(strategy) = PruningStrategy::for_score(profile.current_score) else {
        return analysis;
    };

    for &name in strategy.exclude_completely() {
        if analysis.remove(name).is_some() {
            log_changes!(
                verbosity,
                "Pruned basic topic {} ({})",
                name,
                strategy.as_str()
            );
        }
    }

    for &name in strategy.reduce_time() {
        if let Some(topic) = analysis.get_mut(name) {
            let original = topic.estimated_hours;
            let reduced = ((f64::from(original) * REDUCED_TIME_SHARE).floor() as u32).max(2);
            topic.estimated_hours = reduced;
            log_changes!(
                verbosity,
                "Reduced topic {}: {}h -> {}h",
                name,
                original,
                reduced
            );
        }
    }

    analysis
}

/// Add the hardest topics for learners targeting 85 and above.
///
/// Topics already present are left untouched.
pub fn inject_advanced_topics(
    mut analysis: TopicMap<TopicAnalysis>,
    profile: &LearnerProfile,
    gaps: &GapAnalysis,
    verbosity: u8,
) -> TopicMap<TopicAnalysis> {
    if profile.target_score < HIGH_TARGET_THRESHOLD {
        return analysis;
    }

    for &(name, weight, base_time_hours, complexity) in ADVANCED_TOPICS {
        if analysis.contains(name) {
            continue;
        }
        let topic = TopicAnalysis {
            priority: topic_priority(name, weight, base_time_hours, profile, gaps),
            estimated_hours: estimate_hours(base_time_hours, profile),
            category: ADVANCED_CATEGORY.to_string(),
            base_time_hours,
            weight,
            complexity,
            dependencies: ADVANCED_DEPENDENCIES.iter().map(|d| d.to_string()).collect(),
        };
        log_changes!(
            verbosity,
            "Injected advanced topic {} (priority={:.1}, {}h)",
            name,
            topic.priority,
            topic.estimated_hours
        );
        analysis.insert(name.to_string(), topic);
    }

    analysis
}

/// Pruning, then injection. Injected topics are never pruned.
pub fn apply_tier_filter(
    analysis: TopicMap<TopicAnalysis>,
    profile: &LearnerProfile,
    gaps: &GapAnalysis,
    verbosity: u8,
) -> TopicMap<TopicAnalysis> {
    let pruned = prune_basic_topics(analysis, profile, verbosity);
    inject_advanced_topics(pruned, profile, gaps, verbosity)
}
