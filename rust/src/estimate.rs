//! Personalized study-time estimates.

use crate::models::{Difficulty, LearnerProfile, LearningStyle};

/// Pace multiplier for the preferred difficulty tier.
pub fn level_multiplier(difficulty: Difficulty) -> f64 {
    match difficulty {
        Difficulty::Beginner => 1.5,
        Difficulty::Intermediate => 1.2,
        Difficulty::Advanced => 0.9,
    }
}

pub fn style_multiplier(style: LearningStyle) -> f64 {
    match style {
        LearningStyle::Visual => 0.9,
        LearningStyle::Auditory => 1.1,
        LearningStyle::Kinesthetic | LearningStyle::ReadingWriting => 1.0,
    }
}

/// Estimated hours for a topic of `base_time_hours`.
///
/// Always in `[2, max_topic_duration]` for the learner's preferred
/// difficulty. Halves round to even.
pub fn estimate_hours(base_time_hours: u32, profile: &LearnerProfile) -> u32 {
    let target_multiplier = 1.0 + (profile.target_score - 60.0) / 80.0;
    let raw = f64::from(base_time_hours)
        * level_multiplier(profile.preferred_difficulty)
        * target_multiplier
        * style_multiplier(profile.learning_style);

    let max_hours = profile.preferred_difficulty.profile().max_topic_duration;
    let rounded = raw.round_ties_even();
    if rounded <= 2.0 {
        2
    } else if rounded >= f64::from(max_hours) {
        max_hours
    } else {
        rounded as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(target: f64, difficulty: Difficulty, style: LearningStyle) -> LearnerProfile {
        LearnerProfile {
            user_id: "u1".to_string(),
            current_score: 50.0,
            target_score: target,
            exam_date: "2027-06-01".to_string(),
            available_hours_per_week: 10,
            weak_areas: vec![],
            strong_areas: vec![],
            focus_areas: vec![],
            learning_style: style,
            preferred_difficulty: difficulty,
            motivation_level: 7,
        }
    }

    #[test]
    fn test_estimate_basic() {
        // 4 * 1.2 * 1.0 * 1.0 = 4.8 -> 5
        let p = profile(60.0, Difficulty::Intermediate, LearningStyle::ReadingWriting);
        assert_eq!(estimate_hours(4, &p), 5);
    }

    #[test]
    fn test_estimate_clamped_to_tier_ceiling() {
        let p = profile(90.0, Difficulty::Beginner, LearningStyle::Auditory);
        assert_eq!(estimate_hours(12, &p), 4);

        let p = profile(90.0, Difficulty::Advanced, LearningStyle::Auditory);
        assert_eq!(estimate_hours(12, &p), 8);
    }

    #[test]
    fn test_estimate_floor_of_two() {
        let p = profile(0.0, Difficulty::Advanced, LearningStyle::Visual);
        assert_eq!(estimate_hours(1, &p), 2);
    }

    #[test]
    fn test_ties_round_to_even() {
        // 5 * 0.9 = 4.5 -> 4
        let p = profile(60.0, Difficulty::Advanced, LearningStyle::ReadingWriting);
        assert_eq!(estimate_hours(5, &p), 4);
    }

    #[test]
    fn test_monotone_in_base_time_and_bounded() {
        for difficulty in [Difficulty::Beginner, Difficulty::Intermediate, Difficulty::Advanced] {
            for style in [
                LearningStyle::Visual,
                LearningStyle::Auditory,
                LearningStyle::Kinesthetic,
                LearningStyle::ReadingWriting,
            ] {
                for target in [20.0, 60.0, 100.0] {
                    let p = profile(target, difficulty, style);
                    let max = difficulty.profile().max_topic_duration;
                    let mut previous = 0;
                    for base in 1..=20 {
                        let hours = estimate_hours(base, &p);
                        assert!(hours >= previous);
                        assert!((2..=max).contains(&hours));
                        previous = hours;
                    }
                }
            }
        }
    }
}
