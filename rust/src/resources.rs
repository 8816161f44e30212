//! Study resources: per-style learning strategies, per-topic resource lists
//! and the plan-level resource bundle.

use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::models::{LearnerProfile, LearningStyle};
use crate::tier::LearnerTier;

/// How a learning style prefers to study: what to read or watch, how to
/// work through it, and what to practice on.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct LearningStrategy {
    pub resources: &'static [&'static str],
    pub methods: &'static [&'static str],
    pub practice: &'static [&'static str],
}

impl LearningStrategy {
    pub fn for_style(style: LearningStyle) -> &'static Self {
        match style {
            LearningStyle::Visual => &VISUAL_STRATEGY,
            LearningStyle::Auditory => &AUDITORY_STRATEGY,
            LearningStyle::Kinesthetic => &KINESTHETIC_STRATEGY,
            LearningStyle::ReadingWriting => &READING_WRITING_STRATEGY,
        }
    }
}

static VISUAL_STRATEGY: LearningStrategy = LearningStrategy {
    resources: &["видеоуроки", "инфографика", "диаграммы", "3D-модели"],
    methods: &["визуализация", "рисование схем", "цветовое кодирование"],
    practice: &["графические задачи", "геометрические построения"],
};

static AUDITORY_STRATEGY: LearningStrategy = LearningStrategy {
    resources: &["аудиолекции", "подкасты", "обсуждения"],
    methods: &["объяснение вслух", "запись на диктофон", "групповые обсуждения"],
    practice: &["устные задачи", "объяснение решений"],
};

static KINESTHETIC_STRATEGY: LearningStrategy = LearningStrategy {
    resources: &[
        "интерактивные симуляции",
        "физические модели",
        "практические эксперименты",
    ],
    methods: &["решение на доске", "физические манипуляции", "ролевые игры"],
    practice: &["практические задачи", "реальные примеры"],
};

static READING_WRITING_STRATEGY: LearningStrategy = LearningStrategy {
    resources: &["учебники", "конспекты", "статьи", "письменные задания"],
    methods: &["ведение тетради", "составление планов", "письменные упражнения"],
    practice: &["письменные решения", "эссе", "анализ текстов"],
};

type KeywordResources = (&'static str, &'static [&'static str]);

/// Resource lists for one tier: shared items, style items, and extras for
/// topics whose name contains a keyword.
struct ResourceTable {
    common: &'static [&'static str],
    visual: &'static [&'static str],
    auditory: &'static [&'static str],
    kinesthetic: &'static [&'static str],
    reading_writing: &'static [&'static str],
    by_keyword: &'static [KeywordResources],
}

impl ResourceTable {
    fn for_tier(tier: LearnerTier) -> &'static Self {
        match tier {
            LearnerTier::Standard => &STANDARD_RESOURCES,
            LearnerTier::Advanced => &ADVANCED_RESOURCES,
        }
    }

    fn style(&self, style: LearningStyle) -> &'static [&'static str] {
        match style {
            LearningStyle::Visual => self.visual,
            LearningStyle::Auditory => self.auditory,
            LearningStyle::Kinesthetic => self.kinesthetic,
            LearningStyle::ReadingWriting => self.reading_writing,
        }
    }
}

static STANDARD_RESOURCES: ResourceTable = ResourceTable {
    common: &[
        "Сборник ФИПИ 2024",
        "Типовые экзаменационные варианты",
        "EGE Trainer - онлайн тренажер",
    ],
    visual: &[
        "Интерактивные видеоуроки",
        "Анимированные объяснения",
        "Графические схемы и диаграммы",
    ],
    auditory: &[
        "Аудиолекции по теме",
        "Подкасты с разбором задач",
        "Обсуждения в учебных группах",
    ],
    kinesthetic: &[
        "Интерактивные симуляции",
        "Практические эксперименты",
        "Физические модели и макеты",
    ],
    reading_writing: &[
        "Детальные конспекты",
        "Письменные упражнения",
        "Аналитические задания",
    ],
    by_keyword: &[
        ("Геометрия", &["3D-визуализатор", "Геометрический конструктор"]),
        ("Тригонометрия", &["Тригонометрический круг", "Анимированные графики"]),
        ("Производная", &["Графический анализатор", "Интерактивные пределы"]),
        (
            "Вероятность",
            &["Вероятностные симуляции", "Статистические визуализации"],
        ),
    ],
};

static ADVANCED_RESOURCES: ResourceTable = ResourceTable {
    common: &[
        "Сборник олимпиадных задач",
        "Углубленный курс математики",
        "Задачи с параметрами (продвинутый уровень)",
        "Методы доказательств в математике",
    ],
    visual: &[
        "Продвинутые визуализации",
        "Интерактивные 3D-модели сложных концепций",
        "Анимации доказательств",
    ],
    auditory: &[
        "Лекции ведущих математиков",
        "Обсуждения сложных задач",
        "Подкасты о математических методах",
    ],
    kinesthetic: &[
        "Сложные интерактивные симуляции",
        "Практика доказательств на доске",
        "Решение нестандартных задач",
    ],
    reading_writing: &[
        "Научные статьи по теме",
        "Ведение математического дневника",
        "Анализ сложных решений",
    ],
    by_keyword: &[
        (
            "Параметры",
            &[
                "Методы исследования функций с параметрами",
                "Графические методы решения параметрических задач",
            ],
        ),
        (
            "Стереометрия",
            &[
                "Сложные пространственные конструкции",
                "Методы координат в пространстве",
            ],
        ),
        (
            "Производная",
            &[
                "Приложения производной в физике",
                "Оптимизационные задачи повышенной сложности",
            ],
        ),
    ],
};

/// Resources for studying one topic.
///
/// Keyword extras match case-insensitively anywhere in the topic name.
pub fn topic_resources(topic: &str, style: LearningStyle, tier: LearnerTier) -> Vec<String> {
    let table = ResourceTable::for_tier(tier);
    let topic = topic.to_lowercase();

    let keyword_extras = table
        .by_keyword
        .iter()
        .filter(|(keyword, _)| topic.contains(&keyword.to_lowercase()))
        .flat_map(|(_, extras)| extras.iter());

    table
        .common
        .iter()
        .chain(table.style(style))
        .chain(keyword_extras)
        .map(|r| r.to_string())
        .collect()
}

/// A named group in the plan's resource bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceGroup {
    pub category: &'static str,
    pub items: Vec<String>,
}

const OFFICIAL_RESOURCES: &[&str] = &[
    "Сборник ФИПИ 2024",
    "Типовые экзаменационные варианты",
    "Демоверсия ЕГЭ",
];
const ADDITIONAL_RESOURCES: &[&str] = &[
    "EGE Trainer - онлайн тренажер",
    "Мобильное приложение для повторения",
];
const OLYMPIAD_RESOURCE: &str = "Задачи олимпиадного уровня";
/// Targets above this get olympiad material in the bundle.
const OLYMPIAD_TARGET: f64 = 80.0;

/// Weak areas drawn on for the bundle, and resources taken from each.
const WEAK_AREAS_SAMPLED: usize = 3;
const RESOURCES_PER_WEAK_AREA: usize = 2;

/// The plan-level resource bundle: official material, style material,
/// top picks for the first weak areas, and extras.
pub fn personalized_resources(profile: &LearnerProfile, tier: LearnerTier) -> Vec<ResourceGroup> {
    let strategy = LearningStrategy::for_style(profile.learning_style);

    let mut seen = FxHashSet::default();
    let weak_area_items: Vec<String> = profile
        .weak_areas
        .iter()
        .take(WEAK_AREAS_SAMPLED)
        .flat_map(|area| {
            topic_resources(area, profile.learning_style, tier)
                .into_iter()
                .take(RESOURCES_PER_WEAK_AREA)
        })
        .filter(|item| seen.insert(item.clone()))
        .collect();

    let mut additional: Vec<String> = ADDITIONAL_RESOURCES.iter().map(|r| r.to_string()).collect();
    if profile.target_score > OLYMPIAD_TARGET {
        additional.push(OLYMPIAD_RESOURCE.to_string());
    }

    vec![
        ResourceGroup {
            category: "official",
            items: OFFICIAL_RESOURCES.iter().map(|r| r.to_string()).collect(),
        },
        ResourceGroup {
            category: "learning_style",
            items: strategy.resources.iter().map(|r| r.to_string()).collect(),
        },
        ResourceGroup {
            category: "weak_areas_focus",
            items: weak_area_items,
        },
        ResourceGroup {
            category: "additional",
            items: additional,
        },
    ]
}
