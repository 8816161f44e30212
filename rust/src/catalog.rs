//! Topic catalog: static, versioned reference data.
//!
//! The catalog is an injected value rather than process-wide state, so
//! tests can plan against synthetic catalogs.

use rustc_hash::FxHashMap;
use serde::Serialize;
use thiserror::Error;

use crate::models::Importance;
use crate::models::Importance::{High, Low, Medium};

/// Errors for reference data the planner refuses to load.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("Invalid topic {name:?}: {reason}")]
    InvalidTopic { name: String, reason: String },
    #[error("Circular dependency detected among topics: {0:?}")]
    CircularDependency(Vec<String>),
}

/// A catalog entry.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub name: String,
    pub category: String,
    /// Exam-frequency importance in (0, 1].
    pub weight: f64,
    pub base_time_hours: u32,
    /// 1 (routine) to 5 (hardest).
    pub complexity: u8,
    pub importance: Importance,
}

impl Topic {
    pub fn new(
        name: &str,
        category: &str,
        weight: f64,
        base_time_hours: u32,
        complexity: u8,
        importance: Importance,
    ) -> Self {
        Self {
            name: name.to_string(),
            category: category.to_string(),
            weight,
            base_time_hours,
            complexity,
            importance,
        }
    }

    fn check(&self) -> Result<(), CatalogError> {
        let reason = if !(self.weight > 0.0 && self.weight <= 1.0) {
            Some(format!("weight {} outside (0, 1]", self.weight))
        } else if self.base_time_hours == 0 {
            Some("base time must be positive".to_string())
        } else if !(1..=5).contains(&self.complexity) {
            Some(format!("complexity {} outside 1..=5", self.complexity))
        } else {
            None
        };
        match reason {
            Some(reason) => Err(CatalogError::InvalidTopic {
                name: self.name.clone(),
                reason,
            }),
            None => Ok(()),
        }
    }
}

/// Immutable, ordered topic catalog.
#[derive(Clone, Debug)]
pub struct TopicCatalog {
    topics: Vec<Topic>,
    index: FxHashMap<String, usize>,
}

impl TopicCatalog {
    /// Build a catalog from topics in presentation order.
    ///
    /// A name listed twice keeps its first position and takes the last
    /// definition.
    pub fn new(topics: Vec<Topic>) -> Result<Self, CatalogError> {
        for topic in &topics {
            topic.check()?;
        }
        Ok(Self::from_checked(topics))
    }

    fn from_checked(topics: Vec<Topic>) -> Self {
        let mut ordered: Vec<Topic> = Vec::with_capacity(topics.len());
        let mut index: FxHashMap<String, usize> = FxHashMap::default();

        for topic in topics {
            match index.get(&topic.name) {
                Some(&pos) => ordered[pos] = topic,
                None => {
                    index.insert(topic.name.clone(), ordered.len());
                    ordered.push(topic);
                }
            }
        }

        Self {
            topics: ordered,
            index,
        }
    }

    /// The built-in EGE (profile level) mathematics catalog.
    pub fn ege_mathematics() -> Self {
        let topics = EGE_MATH_TOPICS
            .iter()
            .flat_map(|(category, topics)| {
                topics.iter().map(move |&(name, weight, base, complexity, importance)| {
                    Topic::new(name, category, weight, base, complexity, importance)
                })
            })
            .collect();
        // Table validity is covered by test_builtin_catalog_is_valid
        Self::from_checked(topics)
    }

    pub fn get(&self, name: &str) -> Option<&Topic> {
        self.index.get(name).map(|&pos| &self.topics[pos])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Topic> {
        self.topics.iter()
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// Category names in first-appearance order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for topic in &self.topics {
            if !seen.contains(&topic.category.as_str()) {
                seen.push(topic.category.as_str());
            }
        }
        seen
    }

    /// Catalog grouped by category, for listing to clients.
    pub fn listing(&self) -> CatalogListing<'_> {
        let categories: Vec<CategoryListing<'_>> = self
            .categories()
            .into_iter()
            .map(|name| CategoryListing {
                name,
                topics: self.topics.iter().filter(|t| t.category == name).collect(),
            })
            .collect();
        CatalogListing {
            total_categories: categories.len(),
            total_topics: self.topics.len(),
            categories,
        }
    }
}

/// Serializable view of the catalog.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogListing<'a> {
    pub categories: Vec<CategoryListing<'a>>,
    pub total_categories: usize,
    pub total_topics: usize,
}

#[derive(Debug, Serialize)]
pub struct CategoryListing<'a> {
    pub name: &'a str,
    pub topics: Vec<&'a Topic>,
}

type TopicRow = (&'static str, f64, u32, u8, Importance);

const EGE_MATH_TOPICS: &[(&str, &[TopicRow])] = &[
    (
        "Базовые навыки",
        &[
            ("Арифметика", 0.8, 4, 2, High),
            ("Алгебраические преобразования", 0.9, 6, 3, High),
            ("Проценты", 0.7, 5, 2, Medium),
            ("Дроби", 0.7, 4, 2, Medium),
            ("Степени и корни", 0.8, 5, 3, High),
        ],
    ),
    (
        "Уравнения",
        &[
            ("Линейные уравнения", 0.8, 5, 2, High),
            ("Квадратные уравнения", 0.9, 7, 3, High),
            ("Рациональные уравнения", 0.8, 6, 3, Medium),
            ("Иррациональные уравнения", 0.7, 8, 4, Medium),
            ("Показательные уравнения", 0.8, 7, 4, Medium),
            ("Логарифмические уравнения", 0.8, 7, 4, Medium),
        ],
    ),
    (
        "Неравенства",
        &[
            ("Линейные неравенства", 0.7, 4, 2, Medium),
            ("Квадратные неравенства", 0.8, 6, 3, High),
            ("Рациональные неравенства", 0.7, 7, 4, Medium),
            ("Показательные неравенства", 0.6, 8, 4, Low),
            ("Логарифмические неравенства", 0.6, 8, 4, Low),
        ],
    ),
    (
        "Функции",
        &[
            ("Линейные функции", 0.8, 5, 2, High),
            ("Квадратичные функции", 0.9, 7, 3, High),
            ("Показательные функции", 0.8, 8, 4, Medium),
            ("Логарифмические функции", 0.8, 8, 4, Medium),
            ("Тригонометрические функции", 0.9, 9, 4, High),
            ("Графики функций", 0.7, 6, 3, Medium),
        ],
    ),
    (
        "Тригонометрия",
        &[
            ("Тригонометрические функции", 0.9, 8, 4, High),
            ("Тригонометрические уравнения", 0.9, 10, 4, High),
            ("Тригонометрические тождества", 0.7, 6, 3, Medium),
            ("Обратные тригонометрические функции", 0.6, 7, 4, Low),
            ("Тригонометрические неравенства", 0.5, 9, 5, Low),
        ],
    ),
    (
        "Производная",
        &[
            ("Производная функции", 0.9, 10, 4, High),
            ("Исследование функций", 0.9, 12, 5, High),
            ("Наибольшие и наименьшие значения", 0.8, 8, 4, Medium),
            ("Касательная к графику", 0.7, 6, 3, Medium),
            ("Приложения производной", 0.6, 7, 4, Low),
        ],
    ),
    (
        "Первообразная",
        &[
            ("Первообразная", 0.8, 8, 4, Medium),
            ("Определенный интеграл", 0.8, 10, 4, Medium),
            ("Площадь фигур", 0.7, 6, 3, Medium),
            ("Приложения интеграла", 0.5, 7, 4, Low),
        ],
    ),
    (
        "Планиметрия",
        &[
            ("Треугольники", 0.9, 8, 3, High),
            ("Четырехугольники", 0.8, 7, 3, Medium),
            ("Окружность", 0.9, 9, 4, High),
            ("Векторы на плоскости", 0.7, 6, 3, Medium),
            ("Координаты на плоскости", 0.7, 5, 2, Medium),
            ("Геометрические преобразования", 0.6, 7, 4, Low),
        ],
    ),
    (
        "Стереометрия",
        &[
            ("Многогранники", 0.9, 12, 5, High),
            ("Тела вращения", 0.8, 10, 4, Medium),
            ("Векторы в пространстве", 0.7, 8, 4, Medium),
            ("Координаты в пространстве", 0.7, 7, 3, Medium),
            ("Сечения фигур", 0.6, 9, 5, Low),
        ],
    ),
    (
        "Теория вероятностей",
        &[
            ("Комбинаторика", 0.8, 8, 3, Medium),
            ("Вероятности событий", 0.9, 10, 4, High),
            ("Статистика", 0.6, 5, 2, Low),
            ("Случайные величины", 0.5, 7, 4, Low),
        ],
    ),
    (
        "Текстовые задачи",
        &[
            ("Задачи на движение", 0.8, 6, 3, Medium),
            ("Задачи на работу", 0.7, 5, 3, Medium),
            ("Задачи на проценты", 0.7, 4, 2, Medium),
            ("Задачи на смеси", 0.6, 5, 3, Low),
            ("Задачи на прогрессии", 0.7, 6, 3, Medium),
        ],
    ),
    (
        "Параметры",
        &[
            ("Задачи с параметрами", 0.6, 15, 5, Low),
            ("Исследование уравнений с параметрами", 0.5, 12, 5, Low),
        ],
    ),
    (
        "Числа и последовательности",
        &[
            ("Прогрессии", 0.8, 7, 3, Medium),
            ("Числовые множества", 0.6, 4, 2, Low),
            ("Делимость чисел", 0.5, 5, 3, Low),
        ],
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_valid() {
        let rows: usize = EGE_MATH_TOPICS.iter().map(|(_, t)| t.len()).sum();
        let topics = EGE_MATH_TOPICS
            .iter()
            .flat_map(|(category, topics)| {
                topics.iter().map(move |&(name, weight, base, complexity, importance)| {
                    Topic::new(name, category, weight, base, complexity, importance)
                })
            })
            .collect();
        let catalog = TopicCatalog::new(topics).unwrap();

        // One duplicated name collapses
        assert_eq!(catalog.len(), rows - 1);
        assert_eq!(catalog.categories().len(), 13);
        assert_eq!(TopicCatalog::ege_mathematics().len(), catalog.len());
    }

    #[test]
    fn test_duplicate_keeps_first_position_last_definition() {
        let catalog = TopicCatalog::ege_mathematics();
        let trig = catalog.get("Тригонометрические функции").unwrap();
        assert_eq!(trig.category, "Тригонометрия");
        assert_eq!(trig.base_time_hours, 8);

        let names: Vec<&str> = catalog.iter().map(|t| t.name.as_str()).collect();
        let trig_pos = names
            .iter()
            .position(|&n| n == "Тригонометрические функции")
            .unwrap();
        let graphs_pos = names.iter().position(|&n| n == "Графики функций").unwrap();
        assert!(trig_pos < graphs_pos);
    }

    #[test]
    fn test_rejects_invalid_topics() {
        let bad_weight = vec![Topic::new("x", "c", 0.0, 4, 2, Importance::Low)];
        assert!(matches!(
            TopicCatalog::new(bad_weight),
            Err(CatalogError::InvalidTopic { .. })
        ));

        let bad_complexity = vec![Topic::new("x", "c", 0.5, 4, 6, Importance::Low)];
        assert!(TopicCatalog::new(bad_complexity).is_err());

        let bad_time = vec![Topic::new("x", "c", 0.5, 0, 3, Importance::Low)];
        assert!(TopicCatalog::new(bad_time).is_err());
    }

    #[test]
    fn test_listing_groups_by_category() {
        let catalog = TopicCatalog::ege_mathematics();
        let listing = catalog.listing();
        assert_eq!(listing.total_categories, 13);
        assert_eq!(listing.total_topics, catalog.len());
        assert_eq!(listing.categories[0].name, "Базовые навыки");
        assert_eq!(listing.categories[0].topics.len(), 5);

        let json = serde_json::to_value(&listing).unwrap();
        assert_eq!(json["totalCategories"], 13);
    }
}
