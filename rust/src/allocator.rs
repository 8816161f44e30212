//! Multi-pass, dependency-aware hour allocator.
//!
//! A priority-weighted greedy split of the hour budget. Each pass ranks the
//! ready topics by priority and hands each one its proportional share of
//! the remaining hours, bounded by its estimate and the tier's caps. Topics
//! that never fit are simply absent from the schedule.

use std::cmp::Ordering;

use crate::gaps::GapAnalysis;
use crate::graph::prerequisites_met;
use crate::models::{Schedule, ScheduleEntry, TopicAnalysis, TopicMap};
use crate::tier::{LearnerTier, COMPLEX_TOPIC};
use crate::{log_changes, log_checks};

/// Number of sweeps over the unscheduled topics.
pub const ALLOCATION_PASSES: usize = 3;
/// Smallest block of hours worth scheduling.
pub const MIN_ALLOCATION_HOURS: u32 = 2;

/// Compare priorities descending, treating NaN as equal.
fn cmp_priority_desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Allocator for one learner.
pub struct Allocator<'a> {
    tier: LearnerTier,
    gaps: &'a GapAnalysis,
    verbosity: u8,
}

impl<'a> Allocator<'a> {
    pub fn new(tier: LearnerTier, gaps: &'a GapAnalysis, verbosity: u8) -> Self {
        Self {
            tier,
            gaps,
            verbosity,
        }
    }

    /// Split `total_hours` across the analyzed topics.
    ///
    /// The returned schedule is in commit order, and its hours never exceed
    /// `total_hours`.
    pub fn allocate(&self, analysis: &TopicMap<TopicAnalysis>, total_hours: u32) -> Schedule {
        let strategy = self.tier.strategy();
        let verbosity = self.verbosity;
        let mut schedule = Schedule::new();
        let mut remaining = total_hours;

        for pass in 0..ALLOCATION_PASSES {
            if remaining == 0 {
                break;
            }

            let mut candidates = self.candidates(analysis, &schedule, pass);
            // Stable: equal priorities keep catalog order
            candidates.sort_by(|a, b| cmp_priority_desc(a.1.priority, b.1.priority));

            log_changes!(
                verbosity,
                "Allocation pass {}: {} candidates, {}h remaining",
                pass,
                candidates.len(),
                remaining
            );

            for &(name, topic) in &candidates {
                if remaining == 0 {
                    break;
                }

                // Sum over this pass's candidates still unscheduled, recomputed after every commit
                let total_priority: f64 = candidates
                    .iter()
                    .filter(|(n, _)| !schedule.contains(n))
                    .map(|(_, t)| t.priority)
                    .sum();

                let share = if total_priority > 0.0 {
                    let proportional =
                        (f64::from(remaining) * (topic.priority / total_priority)).floor();
                    topic.estimated_hours.min(proportional as u32)
                } else {
                    topic.estimated_hours
                };

                let cap = strategy.topic_hour_cap(topic.complexity);
                let allocated = share.min(cap).max(MIN_ALLOCATION_HOURS);

                log_checks!(
                    verbosity,
                    "  Considering {} (priority={:.1}, estimate={}h, share={}h, cap={}h)",
                    name,
                    topic.priority,
                    topic.estimated_hours,
                    share,
                    cap
                );

                if remaining < allocated {
                    log_checks!(
                        verbosity,
                        "    Skipping {}: needs {}h, {}h left",
                        name,
                        allocated,
                        remaining
                    );
                    continue;
                }

                schedule.insert(
                    name.to_string(),
                    ScheduleEntry {
                        allocated_hours: allocated,
                        priority: topic.priority,
                        category: topic.category.clone(),
                        complexity: topic.complexity,
                        dependencies: topic.dependencies.clone(),
                    },
                );
                remaining -= allocated;
                log_changes!(
                    verbosity,
                    "  Allocated {}h to {} ({}h left)",
                    allocated,
                    name,
                    remaining
                );
            }
        }

        schedule
    }

    /// Topics eligible in this pass, in analysis order.
    fn candidates<'t>(
        &self,
        analysis: &'t TopicMap<TopicAnalysis>,
        schedule: &Schedule,
        pass: usize,
    ) -> Vec<(&'t str, &'t TopicAnalysis)> {
        let unscheduled = || analysis.iter().filter(|(name, _)| !schedule.contains(name));

        if pass > 0 {
            return unscheduled().collect();
        }

        let focus = self.tier.strategy().focus_first_pass;
        let ready: Vec<(&str, &TopicAnalysis)> = unscheduled()
            .filter(|(_, topic)| {
                prerequisites_met(
                    &topic.dependencies,
                    |dep| analysis.contains(dep),
                    |dep| schedule.contains(dep),
                )
            })
            .filter(|(name, topic)| {
                !focus || topic.complexity >= COMPLEX_TOPIC || self.gaps.is_critical(name)
            })
            .collect();

        if !ready.is_empty() {
            return ready;
        }

        log_checks!(
            self.verbosity,
            "  No ready topics in first pass; falling back to topics without prerequisites"
        );
        unscheduled()
            .filter(|(_, topic)| topic.dependencies.is_empty())
            .collect()
    }
}

/// Total hours handed out by a schedule.
pub fn total_allocated(schedule: &Schedule) -> u32 {
    schedule.values().map(|e| e.allocated_hours).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(priority: f64, hours: u32, complexity: u8, deps: &[&str]) -> TopicAnalysis {
        TopicAnalysis {
            priority,
            estimated_hours: hours,
            category: "c".to_string(),
            base_time_hours: hours,
            weight: 0.5,
            complexity,
            dependencies: deps.iter().map(|d| d.to_string()).collect(),
        }
    }

    fn analysis(topics: Vec<(&str, TopicAnalysis)>) -> TopicMap<TopicAnalysis> {
        topics
            .into_iter()
            .map(|(name, t)| (name.to_string(), t))
            .collect()
    }

    fn standard(gaps: &GapAnalysis) -> Allocator<'_> {
        Allocator::new(LearnerTier::Standard, gaps, 0)
    }

    #[test]
    fn test_prerequisite_scheduled_first() {
        let gaps = GapAnalysis::default();
        let topics = analysis(vec![
            ("b", topic(90.0, 6, 3, &["a"])),
            ("a", topic(10.0, 6, 2, &[])),
        ]);
        let schedule = standard(&gaps).allocate(&topics, 100);

        assert_eq!(schedule.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(schedule.get("a").unwrap().allocated_hours, 6);
        assert_eq!(schedule.get("b").unwrap().dependencies, vec!["a"]);
    }

    #[test]
    fn test_dangling_prerequisite_does_not_block() {
        let gaps = GapAnalysis::default();
        let topics = analysis(vec![
            ("blocked", topic(10.0, 4, 2, &["first"])),
            ("dangling", topic(50.0, 4, 2, &["not in catalog"])),
            ("first", topic(5.0, 4, 2, &[])),
        ]);
        let schedule = standard(&gaps).allocate(&topics, 100);

        // Pass 0 takes dangling and first; blocked waits for pass 1
        assert_eq!(
            schedule.keys().collect::<Vec<_>>(),
            vec!["dangling", "first", "blocked"]
        );
    }

    #[test]
    fn test_proportional_split_under_tight_budget() {
        let gaps = GapAnalysis::default();
        let topics = analysis(vec![
            ("x", topic(30.0, 12, 3, &[])),
            ("y", topic(10.0, 12, 3, &[])),
        ]);
        let schedule = standard(&gaps).allocate(&topics, 8);

        // x: floor(8 * 30/40) = 6; y: floor(2 * 10/10) = 2
        assert_eq!(schedule.get("x").unwrap().allocated_hours, 6);
        assert_eq!(schedule.get("y").unwrap().allocated_hours, 2);
        assert_eq!(total_allocated(&schedule), 8);
    }

    #[test]
    fn test_budget_and_bounds_hold() {
        let gaps = GapAnalysis::default();
        let names: Vec<String> = (0..30).map(|i| format!("t{}", i)).collect();
        let topics: TopicMap<TopicAnalysis> = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), topic(10.0 + i as f64, 6 + (i % 10) as u32, 3, &[])))
            .collect();

        for budget in [0, 1, 2, 5, 20, 47, 160, 1000] {
            let schedule = standard(&gaps).allocate(&topics, budget);
            assert!(total_allocated(&schedule) <= budget);
            for entry in schedule.values() {
                assert!(entry.allocated_hours >= MIN_ALLOCATION_HOURS);
                assert!(entry.allocated_hours <= 12);
            }
        }
    }

    #[test]
    fn test_zero_priority_sum_falls_back_to_estimate() {
        let gaps = GapAnalysis::default();
        let topics = analysis(vec![("x", topic(0.0, 5, 2, &[])), ("y", topic(0.0, 5, 2, &[]))]);
        let schedule = standard(&gaps).allocate(&topics, 100);
        assert_eq!(schedule.get("x").unwrap().allocated_hours, 5);
        assert_eq!(schedule.get("y").unwrap().allocated_hours, 5);
    }

    #[test]
    fn test_hour_caps_by_tier() {
        let gaps = GapAnalysis::default();
        let topics = analysis(vec![("hard", topic(50.0, 20, 5, &[]))]);

        let standard_schedule = standard(&gaps).allocate(&topics, 100);
        assert_eq!(standard_schedule.get("hard").unwrap().allocated_hours, 12);

        let advanced_schedule = Allocator::new(LearnerTier::Advanced, &gaps, 0).allocate(&topics, 100);
        assert_eq!(advanced_schedule.get("hard").unwrap().allocated_hours, 16);
    }

    #[test]
    fn test_advanced_first_pass_focuses_hard_topics() {
        let gaps = GapAnalysis::default();
        let topics = analysis(vec![
            ("easy", topic(90.0, 6, 2, &[])),
            ("hard", topic(10.0, 6, 5, &[])),
        ]);
        let schedule = Allocator::new(LearnerTier::Advanced, &gaps, 0).allocate(&topics, 100);
        assert_eq!(schedule.keys().collect::<Vec<_>>(), vec!["hard", "easy"]);
    }

    #[test]
    fn test_advanced_first_pass_includes_critical_gaps() {
        let gaps = GapAnalysis {
            critical: vec!["gap".to_string()],
            ..Default::default()
        };
        let topics = analysis(vec![
            ("easy", topic(90.0, 6, 2, &[])),
            ("gap", topic(20.0, 6, 2, &[])),
        ]);
        let schedule = Allocator::new(LearnerTier::Advanced, &gaps, 0).allocate(&topics, 100);
        assert_eq!(schedule.keys().next(), Some("gap"));
    }

    #[test]
    fn test_first_pass_fallback_to_independent_topics() {
        // Nothing qualifies for the advanced focus, so pass 0 takes
        // topics without prerequisites
        let gaps = GapAnalysis::default();
        let topics = analysis(vec![
            ("dependent", topic(90.0, 6, 2, &["root"])),
            ("root", topic(10.0, 6, 2, &[])),
        ]);
        let schedule = Allocator::new(LearnerTier::Advanced, &gaps, 0).allocate(&topics, 100);
        assert_eq!(schedule.keys().collect::<Vec<_>>(), vec!["root", "dependent"]);
    }

    #[test]
    fn test_stable_ties_keep_input_order() {
        let gaps = GapAnalysis::default();
        let topics = analysis(vec![
            ("first", topic(40.0, 4, 2, &[])),
            ("second", topic(40.0, 4, 2, &[])),
            ("third", topic(40.0, 4, 2, &[])),
        ]);
        let schedule = standard(&gaps).allocate(&topics, 100);
        assert_eq!(
            schedule.keys().collect::<Vec<_>>(),
            vec!["first", "second", "third"]
        );
    }

    #[test]
    fn test_empty_analysis() {
        let gaps = GapAnalysis::default();
        let schedule = standard(&gaps).allocate(&TopicMap::new(), 100);
        assert!(schedule.is_empty());
    }
}
