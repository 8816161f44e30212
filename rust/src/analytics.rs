//! Milestones, score projection and plan analytics.
//!
//! Everything here is derived from the profile, the schedule and the gap
//! analysis. Only the score projection is stochastic; it takes the RNG and
//! noise distribution from the caller.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::gaps::GapAnalysis;
use crate::models::{LearnerProfile, LearningStyle, Schedule};
use crate::plan::{
    CoverageMetrics, DifficultyDistribution, Milestone, MilestoneKind, PlanAnalytics, ScorePoint,
};

/// Progress fractions of the four milestones, with their kind and key topics.
const CHECKPOINTS: [(f64, MilestoneKind, [&str; 3]); 4] = [
    (
        0.25,
        MilestoneKind::Foundation,
        ["Базовые навыки", "Простые уравнения", "Геометрия начального уровня"],
    ),
    (
        0.5,
        MilestoneKind::Progress,
        ["Функции", "Тригонометрия", "Текстовые задачи"],
    ),
    (
        0.75,
        MilestoneKind::Mastery,
        ["Производная", "Стереометрия", "Теория вероятностей"],
    ),
    (
        0.9,
        MilestoneKind::Excellence,
        ["Задачи с параметрами", "Сложные уравнения", "Оптимизационные задачи"],
    ),
];

fn milestone_description(kind: MilestoneKind, target_score: f64) -> String {
    let score = target_score.trunc() as i64;
    match kind {
        MilestoneKind::Foundation => {
            format!("Освоение базовых тем и достижение уровня {} баллов", score)
        }
        MilestoneKind::Progress => format!(
            "Уверенное решение задач средней сложности на {} баллов",
            score
        ),
        MilestoneKind::Mastery => format!(
            "Решение сложных задач и стабильный результат {} баллов",
            score
        ),
        MilestoneKind::Excellence => {
            format!("Экзаменационная готовность на уровне {} баллов", score)
        }
    }
}

/// Four checkpoints at fixed fractions of the plan.
///
/// Checkpoint `i` never lands before week `i + 2`, so short plans still get
/// increasing milestone weeks.
pub fn milestones(profile: &LearnerProfile, total_weeks: u32) -> Vec<Milestone> {
    let gap = profile.target_score - profile.current_score;

    CHECKPOINTS
        .iter()
        .enumerate()
        .map(|(i, &(fraction, kind, key_topics))| {
            let scheduled = (f64::from(total_weeks) * fraction).round() as u32;
            let target_score = profile.current_score + gap * fraction;
            Milestone {
                week: scheduled.max(i as u32 + 2),
                target_score,
                description: milestone_description(kind, target_score),
                kind,
                key_topics: key_topics.iter().map(|t| t.to_string()).collect(),
            }
        })
        .collect()
}

/// Projected score for weeks `0..=total_weeks`.
///
/// Linear interpolation from current to target score plus independent noise
/// per week, clamped to the span between the two scores and rounded to one
/// decimal. Confidence decays by 0.02 a week down to 0.5.
pub fn score_progression<R: Rng + ?Sized>(
    profile: &LearnerProfile,
    total_weeks: u32,
    noise: &Normal<f64>,
    rng: &mut R,
) -> Vec<ScorePoint> {
    let current = profile.current_score;
    let target = profile.target_score;
    let (low, high) = (current.min(target), current.max(target));
    let weekly_improvement = if total_weeks > 0 {
        (target - current) / f64::from(total_weeks)
    } else {
        0.0
    };

    (0..=total_weeks)
        .map(|week| {
            let trend = current + weekly_improvement * f64::from(week);
            let estimated = (trend + noise.sample(rng)).clamp(low, high);
            ScorePoint {
                week,
                estimated_score: (estimated * 10.0).round() / 10.0,
                confidence: (0.8 - f64::from(week) * 0.02).max(0.5),
            }
        })
        .collect()
}

/// Estimated chance of reaching the target, in `[0.3, 0.95]`.
pub fn success_probability(profile: &LearnerProfile, days_until_exam: i64) -> f64 {
    let gap = profile.target_score - profile.current_score;
    let gap_bonus = if gap <= 10.0 {
        0.3
    } else if gap <= 20.0 {
        0.2
    } else if gap <= 30.0 {
        0.1
    } else {
        0.0
    };
    let time_bonus = if days_until_exam >= 90 {
        0.2
    } else if days_until_exam >= 60 {
        0.1
    } else {
        0.0
    };
    let motivation = (f64::from(profile.motivation_level) - 5.0) * 0.03;

    (0.5 + gap_bonus + time_bonus + motivation).clamp(0.3, 0.95)
}

/// Advisory warnings about the plan's feasibility.
pub fn risk_assessment(schedule: &Schedule, profile: &LearnerProfile) -> Vec<String> {
    let mut risks = Vec::new();

    if schedule.len() > 20 {
        risks.push("Высокая нагрузка: много тем для изучения".to_string());
    }
    if profile.available_hours_per_week < 8 {
        risks.push("Недостаточно времени для качественной подготовки".to_string());
    }
    if profile.current_score < 50.0 && schedule.values().any(|e| e.complexity >= 4) {
        risks.push("Сложные темы могут быть трудны для освоения".to_string());
    }

    risks
}

/// Mean scheduled priority relative to a nominal ceiling of 300, scaled by
/// 1.2 and capped at 1.
pub fn plan_efficiency(schedule: &Schedule) -> f64 {
    if schedule.is_empty() {
        return 0.0;
    }
    let total_priority: f64 = schedule.values().map(|e| e.priority).sum();
    let ceiling = schedule.len() as f64 * 300.0;
    (total_priority / ceiling * 1.2).min(1.0)
}

pub fn difficulty_distribution(schedule: &Schedule) -> DifficultyDistribution {
    let mut distribution = DifficultyDistribution::default();
    for entry in schedule.values() {
        match entry.complexity {
            0..=2 => distribution.easy += 1,
            3..=4 => distribution.medium += 1,
            _ => distribution.hard += 1,
        }
    }
    distribution
}

pub fn coverage_metrics(schedule: &Schedule, gaps: &GapAnalysis) -> CoverageMetrics {
    let covered = gaps
        .critical
        .iter()
        .filter(|name| schedule.contains(name))
        .count();
    CoverageMetrics {
        critical_gaps_covered: format!("{}/{}", covered, gaps.critical.len()),
        total_topics_covered: schedule.len(),
        total_hours_allocated: schedule.values().map(|e| e.allocated_hours).sum(),
    }
}

/// The analytics block of a plan.
pub fn plan_analytics(
    schedule: &Schedule,
    profile: &LearnerProfile,
    gaps: &GapAnalysis,
    days_until_exam: i64,
) -> PlanAnalytics {
    PlanAnalytics {
        plan_efficiency: plan_efficiency(schedule),
        coverage_metrics: coverage_metrics(schedule, gaps),
        difficulty_distribution: difficulty_distribution(schedule),
        risk_assessment: risk_assessment(schedule, profile),
        success_probability: success_probability(profile, days_until_exam),
    }
}

/// One-paragraph study approach: score gap, then weekly time, then style.
pub fn recommended_approach(profile: &LearnerProfile) -> String {
    let gap = profile.target_score - profile.current_score;
    let mut parts = vec![if gap > 30.0 {
        "Интенсивная фокусировка на критических пробелах"
    } else if gap > 15.0 {
        "Сбалансированное развитие с акцентом на слабые области"
    } else {
        "Совершенствование и углубление знаний"
    }];

    let hours = profile.available_hours_per_week;
    if hours < 8 {
        parts.push("Максимально эффективное использование ограниченного времени");
    } else if hours > 15 {
        parts.push("Глубокое погружение с расширенной практикой");
    }

    match profile.learning_style {
        LearningStyle::Visual => parts.push("Визуальное обучение с графиками и диаграммами"),
        LearningStyle::Kinesthetic => {
            parts.push("Практико-ориентированный подход с интерактивными заданиями")
        }
        LearningStyle::Auditory | LearningStyle::ReadingWriting => {}
    }

    parts.join(". ")
}

pub fn student_level(current_score: f64) -> &'static str {
    if current_score >= 80.0 {
        "продвинутый"
    } else if current_score >= 60.0 {
        "средний"
    } else if current_score >= 40.0 {
        "начинающий"
    } else {
        "начальный"
    }
}

const MAX_RECOMMENDATIONS: usize = 5;
const GENERAL_RECOMMENDATIONS: [&str; 3] = [
    "Регулярно повторяйте пройденный материал",
    "Практикуйтесь в решении задач на время",
    "Анализируйте ошибки после каждого теста",
];

/// Up to five study tips, most specific first.
pub fn recommendations(profile: &LearnerProfile) -> Vec<String> {
    let mut tips = Vec::new();

    if profile.available_hours_per_week < 10 {
        tips.push("Увеличьте время занятий до 10+ часов в неделю для лучших результатов");
    }
    if profile.weak_areas.len() > 5 {
        tips.push("Сфокусируйтесь на 3-5 самых критичных темах сначала");
    }
    match profile.learning_style {
        LearningStyle::ReadingWriting => {
            tips.push("Используйте ведение конспектов для лучшего запоминания")
        }
        LearningStyle::Visual => {
            tips.push("Создавайте графики и диаграммы для визуализации сложных концепций")
        }
        LearningStyle::Auditory | LearningStyle::Kinesthetic => {}
    }
    tips.extend(GENERAL_RECOMMENDATIONS);

    tips.into_iter()
        .take(MAX_RECOMMENDATIONS)
        .map(str::to_string)
        .collect()
}
