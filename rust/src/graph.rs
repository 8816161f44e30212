//! Prerequisite graph between topics.
//!
//! Edges are keyed by name and may point at names the catalog does not
//! contain (category names, topics from other syllabi). Such dangling
//! prerequisites never block anything.

use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;

use crate::catalog::{CatalogError, TopicCatalog};

/// Directed prerequisite graph: topic -> topics it depends on.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    prerequisites: FxHashMap<String, Vec<String>>,
}

impl DependencyGraph {
    /// Build from `(topic, prerequisites)` pairs. Repeated topics append.
    pub fn new<I, S>(edges: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<S>)>,
        S: AsRef<str>,
    {
        let mut prerequisites: FxHashMap<String, Vec<String>> = FxHashMap::default();
        for (topic, prereqs) in edges {
            prerequisites
                .entry(topic.as_ref().to_string())
                .or_default()
                .extend(prereqs.iter().map(|p| p.as_ref().to_string()));
        }
        Self { prerequisites }
    }

    /// The built-in EGE mathematics prerequisite map.
    pub fn ege_mathematics() -> Self {
        Self::new(
            EGE_MATH_DEPENDENCIES
                .iter()
                .map(|(topic, prereqs)| (*topic, prereqs.to_vec())),
        )
    }

    /// Prerequisite names of a topic, in listed order. Empty if none.
    pub fn prerequisites(&self, topic: &str) -> Vec<String> {
        self.prerequisites.get(topic).cloned().unwrap_or_default()
    }

    /// Number of topics with at least one prerequisite.
    pub fn len(&self) -> usize {
        self.prerequisites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prerequisites.is_empty()
    }

    /// Check that prerequisites among catalog topics form a DAG.
    ///
    /// Uses Kahn's algorithm over the catalog-known subgraph; unknown
    /// prerequisites are ignored.
    pub fn validate(&self, catalog: &TopicCatalog) -> Result<(), CatalogError> {
        let known: FxHashSet<&str> = catalog.iter().map(|t| t.name.as_str()).collect();

        // in_degree = number of known prerequisites still pending
        let mut in_degree: FxHashMap<&str, usize> = known.iter().map(|&name| (name, 0)).collect();
        let mut dependents: FxHashMap<&str, Vec<&str>> = FxHashMap::default();
        for (topic, prereqs) in &self.prerequisites {
            let topic = topic.as_str();
            if !known.contains(topic) {
                continue;
            }
            for p in prereqs.iter().map(String::as_str).filter(|p| known.contains(p)) {
                *in_degree.entry(topic).or_default() += 1;
                dependents.entry(p).or_default().push(topic);
            }
        }

        let mut queue: VecDeque<&str> = in_degree
            .iter()
            .filter(|(_, &degree)| degree == 0)
            .map(|(&name, _)| name)
            .collect();
        let mut visited = 0usize;

        while let Some(name) = queue.pop_front() {
            visited += 1;
            if let Some(next) = dependents.get(name) {
                for &dependent in next {
                    if let Some(degree) = in_degree.get_mut(dependent) {
                        *degree -= 1;
                        if *degree == 0 {
                            queue.push_back(dependent);
                        }
                    }
                }
            }
        }

        if visited != in_degree.len() {
            let mut stuck: Vec<String> = in_degree
                .iter()
                .filter(|(_, &degree)| degree > 0)
                .map(|(&name, _)| name.to_string())
                .collect();
            stuck.sort();
            return Err(CatalogError::CircularDependency(stuck));
        }

        Ok(())
    }
}

/// First prerequisite still holding a topic back, if any.
///
/// A prerequisite blocks only while it is part of the plan (`in_plan`) and
/// not yet `done`. Prerequisites outside the plan, whether pruned or never
/// in the catalog, are satisfied.
pub fn blocking_prerequisite<'p, P, D>(
    prerequisites: &'p [String],
    in_plan: P,
    done: D,
) -> Option<&'p str>
where
    P: Fn(&str) -> bool,
    D: Fn(&str) -> bool,
{
    prerequisites
        .iter()
        .map(String::as_str)
        .find(|&p| in_plan(p) && !done(p))
}

/// Whether a topic's prerequisites allow it to proceed.
pub fn prerequisites_met<P, D>(prerequisites: &[String], in_plan: P, done: D) -> bool
where
    P: Fn(&str) -> bool,
    D: Fn(&str) -> bool,
{
    blocking_prerequisite(prerequisites, in_plan, done).is_none()
}

const EGE_MATH_DEPENDENCIES: &[(&str, &[&str])] = &[
    (
        "Квадратные уравнения",
        &["Линейные уравнения", "Алгебраические преобразования"],
    ),
    ("Рациональные уравнения", &["Квадратные уравнения", "Дроби"]),
    ("Иррациональные уравнения", &["Рациональные уравнения", "Корни"]),
    (
        "Квадратные неравенства",
        &["Квадратные уравнения", "Линейные неравенства"],
    ),
    (
        "Тригонометрические уравнения",
        &["Тригонометрические функции", "Основные тождества"],
    ),
    ("Производная функции", &["Пределы функций", "Графики функций"]),
    ("Исследование функций", &["Производная функции", "Графики функций"]),
    ("Первообразная", &["Производная функции", "Интегралы"]),
    ("Стереометрия", &["Планиметрия", "Векторы в пространстве"]),
    (
        "Задачи с параметрами",
        &["Квадратные уравнения", "Неравенства", "Графики функций"],
    ),
    ("Теория вероятностей", &["Комбинаторика", "Дроби"]),
    ("Текстовые задачи", &["Проценты", "Уравнения"]),
];
