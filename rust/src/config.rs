//! Configuration for the planning engine.

use pyo3::prelude::*;

/// Planner configuration.
///
/// Controls diagnostics and the stochastic score-progression stage. The
/// allocation heuristics themselves are fixed.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct PlannerConfig {
    /// Verbosity level: 0=silent, 1=changes, 2=checks, 3=debug.
    #[pyo3(get, set)]
    pub verbosity: u8,
    /// Seed for the score-progression noise. `None` draws from the thread RNG.
    #[pyo3(get, set)]
    pub seed: Option<u64>,
    /// Standard deviation of the weekly score noise, in exam points.
    #[pyo3(get, set)]
    pub score_noise_std_dev: f64,
    /// Lower bound on the plan length in weeks.
    #[pyo3(get, set)]
    pub min_plan_weeks: u32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            verbosity: 0,
            seed: None,
            score_noise_std_dev: 2.0,
            min_plan_weeks: 4,
        }
    }
}

#[pymethods]
impl PlannerConfig {
    #[new]
    #[pyo3(signature = (verbosity=None, seed=None, score_noise_std_dev=None, min_plan_weeks=None))]
    fn new(
        verbosity: Option<u8>,
        seed: Option<u64>,
        score_noise_std_dev: Option<f64>,
        min_plan_weeks: Option<u32>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            verbosity: verbosity.unwrap_or(defaults.verbosity),
            seed,
            score_noise_std_dev: score_noise_std_dev.unwrap_or(defaults.score_noise_std_dev),
            min_plan_weeks: min_plan_weeks.unwrap_or(defaults.min_plan_weeks),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "PlannerConfig(verbosity={}, seed={:?}, score_noise_std_dev={}, min_plan_weeks={})",
            self.verbosity, self.seed, self.score_noise_std_dev, self.min_plan_weeks
        )
    }
}
