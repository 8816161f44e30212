//! Weekly distributor: splits the allocated schedule into week-by-week
//! study blocks with activities, resources, goals and practice tests.

use crate::graph::blocking_prerequisite;
use crate::models::{LearnerProfile, Schedule, ScheduleEntry};
use crate::plan::{Activity, ActivityKind, FocusTopic, PracticeTest, TestCoverage, WeeklyPlan};
use crate::resources::{topic_resources, LearningStrategy};
use crate::tier::{LearnerTier, TestSlot};
use crate::{log_changes, log_checks};

/// Progress bands and goal lists for one tier.
///
/// Bands are upper bounds on `week / total_weeks`. The second band's goal
/// list opens with the expected score at that point.
struct GoalTable {
    bands: [f64; 3],
    early: [&'static str; 3],
    expected_score_suffix: &'static str,
    middle: [&'static str; 2],
    late: [&'static str; 3],
    final_stretch: [&'static str; 3],
}

static STANDARD_GOALS: GoalTable = GoalTable {
    bands: [0.2, 0.5, 0.8],
    early: [
        "Освоение фундаментальных понятий",
        "Развитие базовых навыков решения",
        "Понимание основных методов и подходов",
    ],
    expected_score_suffix: "",
    middle: [
        "Систематизация знаний по ключевым темам",
        "Развитие скорости решения типовых задач",
    ],
    late: [
        "Решение задач повышенной сложности",
        "Оптимизация стратегии решения",
        "Улучшение точности и внимательности",
    ],
    final_stretch: [
        "Экзаменационная тренировка",
        "Тайм-менеджмент на экзамене",
        "Психологическая подготовка",
    ],
};

static ADVANCED_GOALS: GoalTable = GoalTable {
    bands: [0.3, 0.6, 0.8],
    early: [
        "Углубление знаний по ключевым темам",
        "Освоение продвинутых методов решения",
        "Развитие математической интуиции",
    ],
    expected_score_suffix: "+",
    middle: [
        "Решение задач олимпиадного уровня",
        "Совершенствование техники доказательств",
    ],
    late: [
        "Стабильное решение сложных задач",
        "Оптимизация стратегии экзамена",
        "Развитие креативного мышления",
    ],
    final_stretch: [
        "Экспертная подготовка к ЕГЭ",
        "Тактика решения нестандартных задач",
        "Психологическая устойчивость на экзамене",
    ],
};

impl GoalTable {
    fn for_tier(tier: LearnerTier) -> &'static Self {
        match tier {
            LearnerTier::Standard => &STANDARD_GOALS,
            LearnerTier::Advanced => &ADVANCED_GOALS,
        }
    }
}

const ADVANCED_THEORY_METHODS: &[&str] = &["глубокий анализ", "сравнение методов", "доказательства"];
const ADVANCED_THEORY_RESOURCES: &[&str] = &[
    "научные статьи",
    "олимпиадные материалы",
    "углубленные учебники",
];
const CHALLENGING_PRACTICE_METHODS: &[&str] = &[
    "нестандартные задачи",
    "доказательства",
    "оптимизация решений",
];
const CHALLENGING_PRACTICE_SOURCES: &[&str] = &[
    "олимпиадные задачи",
    "задачи с параметрами",
    "комбинированные задания",
];
/// Theory methods and resources taken from the learner's style.
const STYLE_THEORY_ITEMS: usize = 2;

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// A topic picked for the current week.
struct WeekSlot {
    name: String,
    hours: u32,
    entry: ScheduleEntry,
}

/// Distributes a schedule over the weeks before the exam.
pub struct WeeklyDistributor<'a> {
    profile: &'a LearnerProfile,
    tier: LearnerTier,
    total_weeks: u32,
    verbosity: u8,
}

impl<'a> WeeklyDistributor<'a> {
    pub fn new(profile: &'a LearnerProfile, tier: LearnerTier, total_weeks: u32, verbosity: u8) -> Self {
        Self {
            profile,
            tier,
            total_weeks,
            verbosity,
        }
    }

    /// Build the weekly plan.
    ///
    /// Works on a private copy of `schedule`. Stops once every topic's hours
    /// are used up or the last week is reached; leftover hours are dropped.
    pub fn distribute(&self, schedule: &Schedule) -> Vec<WeeklyPlan> {
        let strategy = self.tier.strategy();
        let budget = self.profile.available_hours_per_week;
        let max_topics = self.tier.max_topics_per_week(self.profile.current_score);

        let mut remaining = schedule.clone();
        let mut weeks = Vec::new();
        let mut week = 1;

        while !remaining.is_empty() && week <= self.total_weeks {
            let mut used = 0u32;
            let mut slots: Vec<WeekSlot> = Vec::new();

            // Snapshot of names; hours and removals are read live
            let names: Vec<String> = remaining.keys().map(str::to_string).collect();
            for name in names {
                if used >= budget || max_topics.is_some_and(|max| slots.len() >= max) {
                    break;
                }
                let Some(entry) = remaining.get(&name) else {
                    continue;
                };
                // Blocked while a prerequisite still has hours left
                if let Some(blocking) =
                    blocking_prerequisite(&entry.dependencies, |d| remaining.contains(d), |_| false)
                {
                    log_checks!(
                        self.verbosity,
                        "  Week {}: {} waits for {}",
                        week,
                        name,
                        blocking
                    );
                    continue;
                }

                let hours = entry
                    .allocated_hours
                    .min(strategy.weekly_chunk(entry.complexity))
                    .min(budget - used);
                if hours < strategy.min_weekly_chunk {
                    continue;
                }

                let entry = entry.clone();
                let left = entry.allocated_hours - hours;
                if left > 0 {
                    if let Some(live) = remaining.get_mut(&name) {
                        live.allocated_hours = left;
                    }
                } else {
                    remaining.remove(&name);
                }
                used += hours;
                slots.push(WeekSlot { name, hours, entry });
            }

            log_changes!(
                self.verbosity,
                "Week {}: {} topics, {}h",
                week,
                slots.len(),
                used
            );
            weeks.push(self.week_plan(week, used, &slots));
            week += 1;
        }

        weeks
    }

    fn week_plan(&self, week: u32, total_hours: u32, slots: &[WeekSlot]) -> WeeklyPlan {
        let style = self.profile.learning_style;

        WeeklyPlan {
            week_number: week,
            focus_topics: slots
                .iter()
                .map(|s| FocusTopic {
                    name: s.name.clone(),
                    hours: s.hours,
                    category: s.entry.category.clone(),
                    priority: s.entry.priority,
                    complexity: s.entry.complexity,
                })
                .collect(),
            total_hours,
            learning_activities: slots
                .iter()
                .flat_map(|s| self.topic_activities(&s.name, s.hours))
                .collect(),
            goals: self.weekly_goals(week),
            practice_tests: self.practice_tests(week, slots),
            resources: slots
                .iter()
                .flat_map(|s| topic_resources(&s.name, style, self.tier))
                .collect(),
            intensity: self.tier.intensity(self.profile.current_score),
        }
    }

    /// Theory block followed by a practice block for one topic's weekly hours.
    pub fn topic_activities(&self, topic: &str, hours: u32) -> [Activity; 2] {
        let strategy = self.tier.strategy();
        let ratio = strategy.fixed_theory_ratio.unwrap_or_else(|| {
            self.profile
                .preferred_difficulty
                .profile()
                .theory_practice_ratio
        });
        let theory_hours = ((f64::from(hours) * ratio).floor() as u32).max(1);
        let practice_hours = hours.saturating_sub(theory_hours);

        [
            self.theory_activity(strategy.theory_activity, topic, theory_hours),
            self.practice_activity(strategy.practice_activity, topic, practice_hours),
        ]
    }

    fn theory_activity(&self, kind: ActivityKind, topic: &str, duration: u32) -> Activity {
        let style = LearningStrategy::for_style(self.profile.learning_style);
        let (methods, resources, description) = match kind {
            ActivityKind::AdvancedTheory => (
                owned(ADVANCED_THEORY_METHODS),
                owned(ADVANCED_THEORY_RESOURCES),
                format!("Углубленное изучение: {}", topic),
            ),
            _ => (
                owned(&style.methods[..STYLE_THEORY_ITEMS.min(style.methods.len())]),
                owned(&style.resources[..STYLE_THEORY_ITEMS.min(style.resources.len())]),
                format!("Изучение теории: {}", topic),
            ),
        };
        Activity {
            kind,
            duration,
            methods,
            resources,
            description: Some(description),
            exercises: None,
            difficulty: None,
            sources: Vec::new(),
        }
    }

    fn practice_activity(&self, kind: ActivityKind, topic: &str, duration: u32) -> Activity {
        match kind {
            ActivityKind::ChallengingPractice => Activity {
                kind,
                duration,
                methods: owned(CHALLENGING_PRACTICE_METHODS),
                resources: Vec::new(),
                description: None,
                exercises: Some(format!("Сложные задания по {}", topic)),
                difficulty: Some("high".to_string()),
                sources: owned(CHALLENGING_PRACTICE_SOURCES),
            },
            _ => Activity {
                kind,
                duration,
                methods: owned(LearningStrategy::for_style(self.profile.learning_style).practice),
                resources: Vec::new(),
                description: None,
                exercises: Some(format!("Практические задания по {}", topic)),
                difficulty: Some(self.profile.preferred_difficulty.as_str().to_string()),
                sources: Vec::new(),
            },
        }
    }

    /// Three goals for the week, keyed on progress through the plan.
    pub fn weekly_goals(&self, week: u32) -> Vec<String> {
        let table = GoalTable::for_tier(self.tier);
        let progress = f64::from(week) / f64::from(self.total_weeks);

        if progress <= table.bands[0] {
            owned(&table.early)
        } else if progress <= table.bands[1] {
            let current = self.profile.current_score;
            let expected = current + (self.profile.target_score - current) * progress;
            let mut goals = vec![format!(
                "Достижение уровня {}{} баллов",
                expected.trunc() as i64,
                table.expected_score_suffix
            )];
            goals.extend(owned(&table.middle));
            goals
        } else if progress <= table.bands[2] {
            owned(&table.late)
        } else {
            owned(&table.final_stretch)
        }
    }

    fn practice_tests(&self, week: u32, slots: &[WeekSlot]) -> Vec<PracticeTest> {
        let strategy = self.tier.strategy();
        let mut tests = Vec::new();

        if strategy.diagnostic_every_weeks > 0 && week % strategy.diagnostic_every_weeks == 0 {
            tests.push(self.practice_test(&strategy.diagnostic, slots));
        }
        if week + strategy.capstone_weeks_before_end == self.total_weeks {
            tests.push(self.practice_test(&strategy.capstone, slots));
        }

        tests
    }

    fn practice_test(&self, slot: &TestSlot, slots: &[WeekSlot]) -> PracticeTest {
        let topics = match slot.kind.scope() {
            Some(scope) => TestCoverage::Scope(scope),
            None => TestCoverage::Topics(slots.iter().map(|s| s.name.clone()).collect()),
        };
        PracticeTest {
            kind: slot.kind,
            topics,
            duration: slot.duration_hours,
            difficulty: slot.difficulty,
        }
    }
}
