// Scripted Engine Test Double
// ScriptedEngine answers every engine query from values configured up front,
// so result classification and extraction run without a native solver

use crate::domain::engine::{EngineError, EngineErrorKind, EngineResult, SolvingEngine};
use crate::domain::models::{ProgramId, VariableId};
use crate::domain::parameters::SolverParameters;
use crate::domain::program::Program;
use crate::domain::value_objects::{EngineStatus, ValueSource};

/// Engine that reports a scripted status and solution pool
///
/// Solutions are value vectors indexed by variable insertion order; missing
/// entries read as 0.0. Once a program was optimized, ids of any other
/// program are rejected with `NotInModel`.
#[derive(Debug, Clone)]
pub struct ScriptedEngine {
    status: EngineStatus,
    supports_mip: bool,
    is_mip: bool,
    solutions: Vec<Vec<f64>>,
    objective_bound: f64,
    objective_value: f64,
    runtime_seconds: f64,
    optimize_error: Option<EngineError>,
    query_error: Option<EngineError>,
    loaded: Option<ProgramId>,
    selected: usize,
}

impl ScriptedEngine {
    pub fn new(status: EngineStatus) -> Self {
        Self {
            status,
            supports_mip: true,
            is_mip: false,
            solutions: Vec::new(),
            objective_bound: 0.0,
            objective_value: 0.0,
            runtime_seconds: 0.0,
            optimize_error: None,
            query_error: None,
            loaded: None,
            selected: 0,
        }
    }

    pub fn with_mip(mut self, is_mip: bool) -> Self {
        self.is_mip = is_mip;
        self
    }

    pub fn without_mip_support(mut self) -> Self {
        self.supports_mip = false;
        self
    }

    /// Appends a solution to the pool
    pub fn with_solution(mut self, values: Vec<f64>) -> Self {
        self.solutions.push(values);
        self
    }

    pub fn with_objective_bound(mut self, bound: f64) -> Self {
        self.objective_bound = bound;
        self
    }

    pub fn with_objective_value(mut self, value: f64) -> Self {
        self.objective_value = value;
        self
    }

    pub fn with_runtime(mut self, seconds: f64) -> Self {
        self.runtime_seconds = seconds;
        self
    }

    /// `optimize` fails with `error`
    pub fn failing_optimize(mut self, error: EngineError) -> Self {
        self.optimize_error = Some(error);
        self
    }

    /// Every query after `optimize` fails with `error`
    pub fn failing_queries(mut self, error: EngineError) -> Self {
        self.query_error = Some(error);
        self
    }

    pub fn selected_solution(&self) -> usize {
        self.selected
    }

    fn query<T>(&self, value: T) -> EngineResult<T> {
        match &self.query_error {
            Some(error) => Err(error.clone()),
            None => Ok(value),
        }
    }
}

impl SolvingEngine for ScriptedEngine {
    fn name(&self) -> &str {
        "scripted"
    }

    fn supports_mip(&self) -> bool {
        self.supports_mip
    }

    fn optimize(
        &mut self,
        program: &Program,
        _parameters: &SolverParameters,
    ) -> EngineResult<EngineStatus> {
        self.loaded = Some(program.id());
        self.selected = 0;
        match &self.optimize_error {
            Some(error) => Err(error.clone()),
            None => Ok(self.status),
        }
    }

    fn status(&self) -> EngineResult<EngineStatus> {
        self.query(self.status)
    }

    fn solution_count(&self) -> EngineResult<usize> {
        self.query(self.solutions.len())
    }

    fn is_mip(&self) -> EngineResult<bool> {
        self.query(self.is_mip)
    }

    fn objective_bound(&self) -> EngineResult<f64> {
        self.query(self.objective_bound)
    }

    fn objective_value(&self) -> EngineResult<f64> {
        self.query(self.objective_value)
    }

    fn runtime_seconds(&self) -> EngineResult<f64> {
        self.query(self.runtime_seconds)
    }

    fn select_solution(&mut self, index: usize) -> EngineResult<()> {
        self.query(())?;
        if index >= self.solutions.len() {
            return Err(EngineError::new(
                EngineErrorKind::IndexOutOfRange,
                format!("Solution {} requested, pool holds {}", index, self.solutions.len()),
            ));
        }
        self.selected = index;
        Ok(())
    }

    fn variable_value(&self, variable: VariableId, source: ValueSource) -> EngineResult<f64> {
        self.query(())?;
        if self.loaded.is_some_and(|program| program != variable.program()) {
            return Err(EngineError::new(
                EngineErrorKind::NotInModel,
                format!("Variable #{} is not part of the loaded program", variable.index()),
            ));
        }

        let index = match source {
            ValueSource::Primary => 0,
            ValueSource::Pool => self.selected,
        };
        Ok(self
            .solutions
            .get(index)
            .and_then(|values| values.get(variable.index()))
            .copied()
            .unwrap_or(0.0))
    }
}
