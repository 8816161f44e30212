//! Priority model: a relative ranking score per topic.
//!
//! The score is unbounded and only meaningful for ordering topics and
//! splitting hours proportionally.

use crate::gaps::GapAnalysis;
use crate::models::LearnerProfile;

/// Individual multipliers behind a topic's priority.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriorityFactors {
    pub gap_boost: f64,
    pub level_factor: f64,
    pub target_factor: f64,
    pub motivation_factor: f64,
    pub preference_factor: f64,
}

impl PriorityFactors {
    /// Compute the factors for a topic by name and base time.
    pub fn compute(
        name: &str,
        base_time_hours: u32,
        profile: &LearnerProfile,
        gaps: &GapAnalysis,
    ) -> Self {
        let gap_boost = if gaps.is_critical(name) {
            3.0
        } else if gaps.is_significant(name) {
            2.0
        } else if profile.is_weak_area(name) {
            1.5
        } else {
            1.0
        };

        Self {
            gap_boost,
            level_factor: level_factor(profile.current_score, base_time_hours),
            target_factor: 1.0 + (profile.target_score - 50.0) / 100.0,
            motivation_factor: 0.8 + f64::from(profile.motivation_level) * 0.02,
            preference_factor: if profile.is_focus_area(name) { 1.2 } else { 1.0 },
        }
    }

    /// Combine with the catalog weight into the final score.
    pub fn priority(&self, weight: f64) -> f64 {
        weight
            * self.gap_boost
            * self.level_factor
            * self.target_factor
            * self.motivation_factor
            * self.preference_factor
            * 100.0
    }
}

/// Multiplier by current level and topic length.
///
/// Weak learners get short topics first; strong learners get long ones.
pub fn level_factor(current_score: f64, base_time_hours: u32) -> f64 {
    if current_score < 40.0 {
        if base_time_hours <= 5 {
            1.6
        } else {
            0.6
        }
    } else if current_score < 60.0 {
        if base_time_hours <= 7 {
            1.3
        } else {
            0.8
        }
    } else if current_score < 80.0 {
        1.1
    } else if base_time_hours >= 8 {
        1.0
    } else {
        0.9
    }
}

/// Priority of a topic for this learner.
pub fn topic_priority(
    name: &str,
    weight: f64,
    base_time_hours: u32,
    profile: &LearnerProfile,
    gaps: &GapAnalysis,
) -> f64 {
    PriorityFactors::compute(name, base_time_hours, profile, gaps).priority(weight)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gaps::GapRules;
    use crate::models::{Difficulty, LearningStyle};

    fn profile(current: f64, target: f64, weak: &[&str], focus: &[&str]) -> LearnerProfile {
        LearnerProfile {
            user_id: "u1".to_string(),
            current_score: current,
            target_score: target,
            exam_date: "2027-06-01".to_string(),
            available_hours_per_week: 10,
            weak_areas: weak.iter().map(|s| s.to_string()).collect(),
            strong_areas: vec![],
            focus_areas: focus.iter().map(|s| s.to_string()).collect(),
            learning_style: LearningStyle::ReadingWriting,
            preferred_difficulty: Difficulty::Intermediate,
            motivation_level: 5,
        }
    }

    #[test]
    fn test_level_factor_bands() {
        assert_eq!(level_factor(30.0, 5), 1.6);
        assert_eq!(level_factor(30.0, 6), 0.6);
        assert_eq!(level_factor(50.0, 7), 1.3);
        assert_eq!(level_factor(50.0, 8), 0.8);
        assert_eq!(level_factor(70.0, 2), 1.1);
        assert_eq!(level_factor(70.0, 20), 1.1);
        assert_eq!(level_factor(85.0, 8), 1.0);
        assert_eq!(level_factor(85.0, 7), 0.9);
    }

    #[test]
    fn test_neutral_profile_priority() {
        // target 50 -> 1.0, motivation 5 -> 0.9, score 70 -> 1.1
        let p = profile(70.0, 50.0, &[], &[]);
        let gaps = GapRules::default().analyze(&p.weak_areas);
        let priority = topic_priority("Дроби", 0.7, 4, &p, &gaps);
        assert!((priority - 0.7 * 1.1 * 0.9 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_gap_boosts() {
        let p = profile(70.0, 50.0, &["Квадратные уравнения", "Тригонометрия", "Дроби"], &[]);
        let gaps = GapRules::default().analyze(&p.weak_areas);

        let critical = PriorityFactors::compute("Квадратные уравнения", 7, &p, &gaps);
        let significant = PriorityFactors::compute("Тригонометрия", 7, &p, &gaps);
        let minor = PriorityFactors::compute("Дроби", 4, &p, &gaps);
        let none = PriorityFactors::compute("Арифметика", 4, &p, &gaps);

        assert_eq!(critical.gap_boost, 3.0);
        assert_eq!(significant.gap_boost, 2.0);
        assert_eq!(minor.gap_boost, 1.5);
        assert_eq!(none.gap_boost, 1.0);
    }

    #[test]
    fn test_focus_preference() {
        let p = profile(70.0, 50.0, &[], &["Окружность"]);
        let gaps = GapRules::default().analyze(&p.weak_areas);
        let focused = PriorityFactors::compute("Окружность", 9, &p, &gaps);
        let other = PriorityFactors::compute("Треугольники", 8, &p, &gaps);
        assert_eq!(focused.preference_factor, 1.2);
        assert_eq!(other.preference_factor, 1.0);
    }

    #[test]
    fn test_empty_areas_are_neutral() {
        let p = profile(55.0, 80.0, &[], &[]);
        let gaps = GapRules::default().analyze(&p.weak_areas);
        for name in ["Арифметика", "Многогранники", "Олимпиадные задачи"] {
            let f = PriorityFactors::compute(name, 6, &p, &gaps);
            assert_eq!(f.gap_boost, 1.0);
            assert_eq!(f.preference_factor, 1.0);
        }
    }

    #[test]
    fn test_priority_positive() {
        let p = profile(10.0, 10.0, &[], &[]);
        let gaps = GapRules::default().analyze(&p.weak_areas);
        assert!(topic_priority("x", 0.1, 30, &p, &gaps) > 0.0);
    }
}
