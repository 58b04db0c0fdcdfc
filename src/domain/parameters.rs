// Solver configuration handed to an engine together with the program

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::error::{ModelError, Result};
use super::value_objects::SolverBackend;

/// Configuration for a solver run
///
/// Every limit is optional; engines ignore the ones they cannot express.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SolverParameters {
    pub backend: SolverBackend,
    /// Wall-clock limit in seconds
    pub time_limit: Option<f64>,
    /// Relative MIP gap at which the engine may stop
    pub gap_tolerance: Option<f64>,
    pub iteration_limit: Option<u64>,
    pub node_limit: Option<u64>,
    pub solution_limit: Option<u64>,
    /// Objective value beyond which solutions are of no interest
    pub objective_cutoff: Option<f64>,
    pub threads: Option<u32>,
    pub verbose: bool,
}

impl Default for SolverParameters {
    fn default() -> Self {
        Self {
            backend: SolverBackend::Auto,
            time_limit: None,
            gap_tolerance: None,
            iteration_limit: None,
            node_limit: None,
            solution_limit: None,
            objective_cutoff: None,
            threads: None,
            verbose: false,
        }
    }
}

impl SolverParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backend(mut self, backend: SolverBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit = Some(seconds);
        self
    }

    pub fn with_gap_tolerance(mut self, gap: f64) -> Self {
        self.gap_tolerance = Some(gap);
        self
    }

    pub fn with_iteration_limit(mut self, limit: u64) -> Self {
        self.iteration_limit = Some(limit);
        self
    }

    pub fn with_node_limit(mut self, limit: u64) -> Self {
        self.node_limit = Some(limit);
        self
    }

    pub fn with_solution_limit(mut self, limit: u64) -> Self {
        self.solution_limit = Some(limit);
        self
    }

    pub fn with_objective_cutoff(mut self, cutoff: f64) -> Self {
        self.objective_cutoff = Some(cutoff);
        self
    }

    pub fn with_threads(mut self, threads: u32) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if let Some(limit) = self.time_limit {
            if limit.is_nan() || limit < 0.0 {
                errors.push(format!("Time limit must be non-negative, got {}", limit));
            }
        }

        if let Some(gap) = self.gap_tolerance {
            if gap.is_nan() || gap < 0.0 {
                errors.push(format!("Gap tolerance must be non-negative, got {}", gap));
            }
        }

        if self.objective_cutoff.is_some_and(f64::is_nan) {
            errors.push("Objective cutoff may not be NaN".to_string());
        }

        if self.threads == Some(0) {
            errors.push("Thread count must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ModelError::InvalidArgument(errors.join("; ")))
        }
    }
}
