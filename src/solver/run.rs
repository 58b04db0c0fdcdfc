// State a native backend leaves behind after one solve, answering the
// SolvingEngine queries the same way for every adapter

use crate::domain::{
    engine::{EngineError, EngineErrorKind, EngineResult},
    models::{ProgramId, VariableId},
    program::Program,
    value_objects::{EngineStatus, ObjectiveSense, Operator, VariableType},
};

const FEASIBILITY_TOLERANCE: f64 = 1e-6;

/// Outcome of the last `optimize` call of a backend
#[derive(Debug, Clone)]
pub(crate) struct SolvedRun {
    program: ProgramId,
    status: EngineStatus,
    is_mip: bool,
    sense: ObjectiveSense,
    has_solution: bool,
    /// Column values by variable index; empty when the backend produced none
    values: Vec<f64>,
    objective_value: f64,
    runtime_seconds: f64,
}

impl SolvedRun {
    /// Builds the run from the backend's column values
    ///
    /// Under a limit status the values only count as a solution when they
    /// satisfy every bound and constraint of `program`.
    pub(crate) fn new(
        program: &Program,
        status: EngineStatus,
        values: Vec<f64>,
        runtime_seconds: f64,
    ) -> EngineResult<Self> {
        let sense = program
            .determine_program_objective_sense()
            .map_err(|err| EngineError::new(EngineErrorKind::InvalidArgument, err.to_string()))?;

        let has_solution = match status {
            EngineStatus::Optimal => values.len() == program.variables_count(),
            EngineStatus::Suboptimal
            | EngineStatus::TimeLimit
            | EngineStatus::IterationLimit
            | EngineStatus::NodeLimit
            | EngineStatus::SolutionLimit
            | EngineStatus::Interrupted => is_feasible(program, &values),
            _ => false,
        };
        let values = if has_solution { values } else { Vec::new() };

        let objective_value = if has_solution {
            program.combined_objective_constant().unwrap_or(0.0)
                + program
                    .variables()
                    .iter()
                    .zip(&values)
                    .map(|(variable, value)| {
                        program
                            .combined_objective_coefficient(variable.id())
                            .unwrap_or(0.0)
                            * value
                    })
                    .sum::<f64>()
        } else {
            f64::NAN
        };

        Ok(Self {
            program: program.id(),
            status,
            is_mip: program.is_mixed_integer(),
            sense,
            has_solution,
            values,
            objective_value,
            runtime_seconds,
        })
    }

    pub(crate) fn status(&self) -> EngineStatus {
        self.status
    }

    pub(crate) fn solution_count(&self) -> usize {
        usize::from(self.has_solution)
    }

    pub(crate) fn is_mip(&self) -> bool {
        self.is_mip
    }

    /// Proven bound: the optimum itself, otherwise the trivial bound of the sense
    pub(crate) fn objective_bound(&self) -> f64 {
        match (self.status, self.sense) {
            (EngineStatus::Optimal, _) => self.objective_value,
            (_, ObjectiveSense::Minimize) => f64::NEG_INFINITY,
            (_, ObjectiveSense::Maximize) => f64::INFINITY,
        }
    }

    pub(crate) fn objective_value(&self) -> EngineResult<f64> {
        if !self.has_solution {
            return Err(EngineError::new(
                EngineErrorKind::DataNotAvailable,
                format!("No objective value available for status {}", self.status),
            ));
        }
        Ok(self.objective_value)
    }

    pub(crate) fn runtime_seconds(&self) -> f64 {
        self.runtime_seconds
    }

    /// Backends keep a single solution, so only index 0 can be selected
    pub(crate) fn select_solution(&self, index: usize) -> EngineResult<()> {
        if index >= self.solution_count() {
            return Err(EngineError::new(
                EngineErrorKind::IndexOutOfRange,
                format!(
                    "Solution {} requested, {} available",
                    index,
                    self.solution_count()
                ),
            ));
        }
        Ok(())
    }

    pub(crate) fn variable_value(&self, variable: VariableId) -> EngineResult<f64> {
        if variable.program() != self.program {
            return Err(EngineError::new(
                EngineErrorKind::NotInModel,
                format!(
                    "Variable #{} of program {} is not in the loaded model",
                    variable.index(),
                    variable.program()
                ),
            ));
        }

        self.values.get(variable.index()).copied().ok_or_else(|| {
            EngineError::new(
                EngineErrorKind::DataNotAvailable,
                format!("No value available for variable #{}", variable.index()),
            )
        })
    }
}

/// Rejects variable types the native backends cannot model
pub(crate) fn check_supported(program: &Program) -> EngineResult<()> {
    match program.variables().iter().find(|variable| {
        matches!(
            variable.variable_type(),
            VariableType::SemiContinuous | VariableType::SemiInteger
        )
    }) {
        Some(variable) => Err(EngineError::new(
            EngineErrorKind::NotSupported,
            format!(
                "Variable '{}' has type {}, which this engine cannot model",
                variable.name(),
                variable.variable_type()
            ),
        )),
        None => Ok(()),
    }
}

/// Native handle of `variable`, looked up by its index in `program`
///
/// A variable issued by another program yields `NotInModel` instead of
/// reaching into the handle list.
pub(crate) fn column<T: Copy>(
    program: &Program,
    handles: &[T],
    variable: VariableId,
) -> EngineResult<T> {
    if variable.program() != program.id() {
        return Err(not_in_model(program, variable));
    }
    handles
        .get(variable.index())
        .copied()
        .ok_or_else(|| not_in_model(program, variable))
}

fn not_in_model(program: &Program, variable: VariableId) -> EngineError {
    EngineError::new(
        EngineErrorKind::NotInModel,
        format!(
            "Variable #{} of program {} is not in program '{}'",
            variable.index(),
            variable.program(),
            program.name()
        ),
    )
}

/// Warm start for every column, or `None` when no variable has an initial value
///
/// Variables without one start at the bound closest to zero.
pub(crate) fn start_values(program: &Program) -> Option<Vec<f64>> {
    if !program.variables().iter().any(|variable| variable.has_initial_value()) {
        return None;
    }

    Some(
        program
            .variables()
            .iter()
            .map(|variable| match variable.initial_value() {
                Ok(value) => value,
                Err(_) if variable.lower_bound() > 0.0 => variable.lower_bound(),
                Err(_) if variable.upper_bound() < 0.0 => variable.upper_bound(),
                Err(_) => 0.0,
            })
            .collect(),
    )
}

fn is_feasible(program: &Program, values: &[f64]) -> bool {
    if values.len() != program.variables_count() {
        return false;
    }

    let bounds_hold = program.variables().iter().zip(values).all(|(variable, &value)| {
        value >= variable.lower_bound() - FEASIBILITY_TOLERANCE
            && value <= variable.upper_bound() + FEASIBILITY_TOLERANCE
    });

    bounds_hold
        && program.constraints().iter().all(|constraint| {
            let (terms, bound) = constraint.normalized();
            // A variable outside the program makes the activity NaN, which fails every test
            let activity = terms.evaluate(|variable| {
                column(program, values, variable).unwrap_or(f64::NAN)
            });
            match constraint.operator() {
                Operator::LessEquals => activity <= bound + FEASIBILITY_TOLERANCE,
                Operator::GreaterEquals => activity >= bound - FEASIBILITY_TOLERANCE,
                Operator::Equals => (activity - bound).abs() <= FEASIBILITY_TOLERANCE,
            }
        })
}
