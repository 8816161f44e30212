//! EGE study-plan engine.
//!
//! Allocates a learner's study-hour budget across a catalog of
//! interdependent exam topics and lays the result out week by week, with
//! milestones and analytics. Usable as a Rust library and as a Python
//! extension module.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use chrono::Local;
use pyo3::prelude::*;

pub mod allocator;
pub mod analytics;
pub mod catalog;
mod config;
pub mod estimate;
pub mod gaps;
pub mod graph;
pub mod logging;
mod models;
pub mod plan;
pub mod planner;
pub mod priority;
pub mod resources;
pub mod tier;
pub mod weekly;

pub use allocator::Allocator;
pub use catalog::{CatalogError, Topic, TopicCatalog};
pub use config::PlannerConfig;
pub use gaps::{GapAnalysis, GapRules, GapTier};
pub use graph::DependencyGraph;
pub use models::{
    Difficulty, DifficultyProfile, Importance, LearnerProfile, LearningStyle, ProfileError,
    Schedule, ScheduleEntry, TopicAnalysis, TopicMap,
};
pub use plan::Plan;
pub use planner::{PlanError, StudyPlanner};
pub use tier::LearnerTier;
pub use weekly::WeeklyDistributor;

fn to_py_err(e: impl std::fmt::Display) -> PyErr {
    pyo3::exceptions::PyValueError::new_err(e.to_string())
}

/// Generate a study plan for the built-in EGE mathematics catalog.
///
/// # Arguments
/// * `profile` - The learner to plan for
/// * `config` - Planner settings; defaults when omitted
///
/// # Returns
/// * The plan as a JSON string with camelCase keys
///
/// # Raises
/// * ValueError for an unparseable exam date, zero weekly hours, or invalid config
#[pyfunction]
#[pyo3(signature = (profile, config=None))]
fn generate_plan(profile: &LearnerProfile, config: Option<PlannerConfig>) -> PyResult<String> {
    let planner = StudyPlanner::default().with_config(config.unwrap_or_default());
    let plan = planner
        .generate_plan(profile, &Local::now())
        .map_err(to_py_err)?;
    serde_json::to_string(&plan).map_err(to_py_err)
}

/// The built-in catalog grouped by category, as a JSON string.
#[pyfunction]
fn list_topics() -> PyResult<String> {
    let catalog = TopicCatalog::ege_mathematics();
    serde_json::to_string(&catalog.listing()).map_err(to_py_err)
}

/// The ege_planner.rust Python module.
#[pymodule]
fn rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Data types
    m.add_class::<LearnerProfile>()?;

    // Config types
    m.add_class::<PlannerConfig>()?;

    // Entry points
    m.add_function(wrap_pyfunction!(generate_plan, m)?)?;
    m.add_function(wrap_pyfunction!(list_topics, m)?)?;

    Ok(())
}
