//! Core data types for the planning engine.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use pyo3::prelude::*;
use rustc_hash::FxHashMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::str::FromStr;
use thiserror::Error;

/// Errors for a profile the engine refuses to plan for.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProfileError {
    #[error("Invalid exam date: {0:?}")]
    InvalidExamDate(String),
    #[error("Available hours per week must be positive")]
    NonPositiveWeeklyHours,
    #[error("Unknown learning style: {0:?}")]
    UnknownLearningStyle(String),
    #[error("Unknown difficulty level: {0:?}")]
    UnknownDifficulty(String),
    #[error("Score is not a finite number: {0}")]
    NonFiniteScore(&'static str),
}

/// How the learner prefers to take in material.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningStyle {
    Visual,
    Auditory,
    Kinesthetic,
    ReadingWriting,
}

impl LearningStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Visual => "visual",
            Self::Auditory => "auditory",
            Self::Kinesthetic => "kinesthetic",
            Self::ReadingWriting => "reading_writing",
        }
    }
}

impl FromStr for LearningStyle {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "visual" => Ok(Self::Visual),
            "auditory" => Ok(Self::Auditory),
            "kinesthetic" => Ok(Self::Kinesthetic),
            "reading_writing" => Ok(Self::ReadingWriting),
            other => Err(ProfileError::UnknownLearningStyle(other.to_string())),
        }
    }
}

/// Preferred difficulty tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }

    /// Study-mode parameters for this tier.
    pub fn profile(&self) -> DifficultyProfile {
        match self {
            Self::Beginner => DifficultyProfile {
                theory_practice_ratio: 0.6,
                step_by_step_guidance: true,
                review_frequency: "high",
                max_topic_duration: 4,
            },
            Self::Intermediate => DifficultyProfile {
                theory_practice_ratio: 0.4,
                step_by_step_guidance: false,
                review_frequency: "medium",
                max_topic_duration: 6,
            },
            Self::Advanced => DifficultyProfile {
                theory_practice_ratio: 0.2,
                step_by_step_guidance: false,
                review_frequency: "low",
                max_topic_duration: 8,
            },
        }
    }
}

impl FromStr for Difficulty {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            other => Err(ProfileError::UnknownDifficulty(other.to_string())),
        }
    }
}

/// Per-difficulty study parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyProfile {
    /// Share of each topic's weekly hours spent on theory.
    pub theory_practice_ratio: f64,
    pub step_by_step_guidance: bool,
    pub review_frequency: &'static str,
    /// Ceiling on a topic's estimated duration, in hours.
    pub max_topic_duration: u32,
}

/// Exam-frequency importance label carried by catalog topics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    Low,
    Medium,
    High,
}

/// The learner a plan is built for.
///
/// Range checks are the caller's job; the engine only rejects profiles it
/// cannot compute with at all (see [`LearnerProfile::validate`]).
#[pyclass]
#[derive(Clone, Debug)]
pub struct LearnerProfile {
    #[pyo3(get, set)]
    pub user_id: String,
    #[pyo3(get, set)]
    pub current_score: f64,
    #[pyo3(get, set)]
    pub target_score: f64,
    /// ISO-8601 date or datetime, optionally with `Z` or an offset.
    #[pyo3(get, set)]
    pub exam_date: String,
    #[pyo3(get, set)]
    pub available_hours_per_week: u32,
    #[pyo3(get, set)]
    pub weak_areas: Vec<String>,
    #[pyo3(get, set)]
    pub strong_areas: Vec<String>,
    #[pyo3(get, set)]
    pub focus_areas: Vec<String>,
    pub learning_style: LearningStyle,
    pub preferred_difficulty: Difficulty,
    /// Self-reported motivation, 1-10.
    #[pyo3(get, set)]
    pub motivation_level: u8,
}

#[pymethods]
impl LearnerProfile {
    #[new]
    #[pyo3(signature = (
        user_id,
        current_score,
        target_score,
        exam_date,
        available_hours_per_week,
        weak_areas=Vec::new(),
        strong_areas=Vec::new(),
        focus_areas=Vec::new(),
        learning_style="reading_writing",
        preferred_difficulty="intermediate",
        motivation_level=7
    ))]
    #[allow(clippy::too_many_arguments)]
    fn py_new(
        user_id: String,
        current_score: f64,
        target_score: f64,
        exam_date: String,
        available_hours_per_week: u32,
        weak_areas: Vec<String>,
        strong_areas: Vec<String>,
        focus_areas: Vec<String>,
        learning_style: &str,
        preferred_difficulty: &str,
        motivation_level: u8,
    ) -> PyResult<Self> {
        let learning_style = learning_style
            .parse()
            .map_err(|e: ProfileError| pyo3::exceptions::PyValueError::new_err(e.to_string()))?;
        let preferred_difficulty = preferred_difficulty
            .parse()
            .map_err(|e: ProfileError| pyo3::exceptions::PyValueError::new_err(e.to_string()))?;
        Ok(Self {
            user_id,
            current_score,
            target_score,
            exam_date,
            available_hours_per_week,
            weak_areas,
            strong_areas,
            focus_areas,
            learning_style,
            preferred_difficulty,
            motivation_level,
        })
    }

    #[getter(learning_style)]
    fn py_learning_style(&self) -> &'static str {
        self.learning_style.as_str()
    }

    #[getter(preferred_difficulty)]
    fn py_preferred_difficulty(&self) -> &'static str {
        self.preferred_difficulty.as_str()
    }

    fn __repr__(&self) -> String {
        format!(
            "LearnerProfile(user_id={:?}, current_score={}, target_score={}, exam_date={:?}, hours={})",
            self.user_id,
            self.current_score,
            self.target_score,
            self.exam_date,
            self.available_hours_per_week
        )
    }
}

impl LearnerProfile {
    /// Reject profiles the engine cannot plan for, returning the exam instant.
    ///
    /// Exam dates without an offset are read as wall-clock time in `tz`.
    pub fn validate<Tz: TimeZone>(&self, tz: &Tz) -> Result<DateTime<Tz>, ProfileError> {
        if !self.current_score.is_finite() {
            return Err(ProfileError::NonFiniteScore("current_score"));
        }
        if !self.target_score.is_finite() {
            return Err(ProfileError::NonFiniteScore("target_score"));
        }
        if self.available_hours_per_week == 0 {
            return Err(ProfileError::NonPositiveWeeklyHours);
        }
        parse_exam_date(&self.exam_date, tz)
    }

    pub fn is_weak_area(&self, name: &str) -> bool {
        self.weak_areas.iter().any(|a| a == name)
    }

    pub fn is_focus_area(&self, name: &str) -> bool {
        self.focus_areas.iter().any(|a| a == name)
    }
}

/// Parse an exam date given as `YYYY-MM-DD`, a naive ISO datetime, or RFC 3339.
///
/// Dates carrying an offset are absolute instants. Naive dates and
/// datetimes are wall-clock time in `tz`; a bare date means midnight.
pub fn parse_exam_date<Tz: TimeZone>(raw: &str, tz: &Tz) -> Result<DateTime<Tz>, ProfileError> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(tz));
    }
    parse_naive_exam_date(s)
        .map(|naive| {
            // A wall-clock time skipped by a DST jump is read as UTC
            tz.from_local_datetime(&naive)
                .earliest()
                .unwrap_or_else(|| tz.from_utc_datetime(&naive))
        })
        .ok_or_else(|| ProfileError::InvalidExamDate(raw.to_string()))
}

fn parse_naive_exam_date(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(chrono::NaiveTime::MIN))
        })
}

/// Insertion-ordered map keyed by topic name.
///
/// Allocation ties and weekly distribution both depend on catalog order, so
/// every topic-keyed collection in the pipeline preserves it. Replacing an
/// existing key keeps its original position.
#[derive(Clone, Debug, PartialEq)]
pub struct TopicMap<V> {
    index: FxHashMap<String, usize>,
    entries: Vec<(String, V)>,
}

impl<V> TopicMap<V> {
    pub fn new() -> Self {
        Self {
            index: FxHashMap::default(),
            entries: Vec::new(),
        }
    }

    /// Insert or replace. Returns the previous value if the key existed.
    pub fn insert(&mut self, name: String, value: V) -> Option<V> {
        if let Some(&pos) = self.index.get(&name) {
            return Some(std::mem::replace(&mut self.entries[pos].1, value));
        }
        self.index.insert(name.clone(), self.entries.len());
        self.entries.push((name, value));
        None
    }

    /// Remove a key, keeping the relative order of the rest. O(n): later
    /// entries are reindexed.
    pub fn remove(&mut self, name: &str) -> Option<V> {
        let pos = self.index.remove(name)?;
        let (_, value) = self.entries.remove(pos);
        for slot in self.index.values_mut() {
            if *slot > pos {
                *slot -= 1;
            }
        }
        Some(value)
    }

    pub fn get(&self, name: &str) -> Option<&V> {
        self.index.get(name).map(|&pos| &self.entries[pos].1)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut V> {
        match self.index.get(name) {
            Some(&pos) => Some(&mut self.entries[pos].1),
            None => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl<V> Default for TopicMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> FromIterator<(String, V)> for TopicMap<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<V: Serialize> Serialize for TopicMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Derived per-topic planning data: one per catalog or injected topic.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicAnalysis {
    pub priority: f64,
    pub estimated_hours: u32,
    pub category: String,
    pub base_time_hours: u32,
    pub weight: f64,
    pub complexity: u8,
    pub dependencies: Vec<String>,
}

/// Hours granted to one topic by the allocator.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub allocated_hours: u32,
    pub priority: f64,
    pub category: String,
    pub complexity: u8,
    pub dependencies: Vec<String>,
}

/// Allocator output, in allocation order.
pub type Schedule = TopicMap<ScheduleEntry>;
