use tracing::debug;

use super::engine::{EngineError, SolvingEngine};
use super::error::{ModelError, Result};
use super::program::Program;
use super::solution::Solution;
use super::value_objects::{EngineStatus, ObjectiveSense, TerminationReason, ValueSource};

const MILLIS_PER_SECOND: f64 = 1000.0;

/// Outcome of a solver run over a program
///
/// Built from the engine right after `optimize` returned; the engine is not
/// needed afterwards. Solutions are ranked best first under the program sense.
#[derive(Debug)]
pub struct ExecutionResult<'p> {
    program: &'p Program,
    solutions: Vec<Solution<'p>>,
    infeasible: bool,
    unbounded: bool,
    termination_reason: TerminationReason,
    execution_time_millis: u64,
}

impl<'p> ExecutionResult<'p> {
    /// Classifies the engine status and extracts all available solutions
    pub fn from_engine(program: &'p Program, engine: &mut dyn SolvingEngine) -> Result<Self> {
        let mut result = Self {
            program,
            solutions: Vec::new(),
            infeasible: false,
            unbounded: false,
            termination_reason: TerminationReason::None,
            execution_time_millis: 0,
        };

        result.determine_execution_result(engine)?;
        Ok(result)
    }

    fn determine_execution_result(&mut self, engine: &mut dyn SolvingEngine) -> Result<()> {
        let status = engine.status().map_err(unable_to_determine)?;

        if status != EngineStatus::Loaded {
            let runtime = engine.runtime_seconds().map_err(unable_to_determine)?;
            self.execution_time_millis = (MILLIS_PER_SECOND * runtime).round().max(0.0) as u64;
        }

        match status {
            EngineStatus::Loaded | EngineStatus::InProgress => {
                return Err(ModelError::state(
                    "Solver run must be completed before creating execution result",
                ));
            }
            EngineStatus::Cutoff => {
                self.termination_reason = TerminationReason::ObjectiveCutoffReached;
            }
            EngineStatus::InfeasibleOrUnbounded => {
                self.infeasible = true;
                self.unbounded = true;
            }
            EngineStatus::Infeasible => self.infeasible = true,
            EngineStatus::Unbounded => self.unbounded = true,
            EngineStatus::Interrupted => {
                self.termination_reason = TerminationReason::InterruptedByUser;
                self.determine_solutions(engine, status)?;
            }
            EngineStatus::TimeLimit => {
                self.termination_reason = TerminationReason::TimeLimitReached;
                self.determine_solutions(engine, status)?;
            }
            EngineStatus::IterationLimit => {
                self.termination_reason = TerminationReason::IterationLimitReached;
                self.determine_solutions(engine, status)?;
            }
            EngineStatus::NodeLimit => {
                self.termination_reason = TerminationReason::NodeLimitReached;
                self.determine_solutions(engine, status)?;
            }
            EngineStatus::SolutionLimit => {
                self.termination_reason = TerminationReason::SolutionLimitReached;
                self.determine_solutions(engine, status)?;
            }
            EngineStatus::Numeric => {
                self.termination_reason = TerminationReason::NumericalInstable;
                self.determine_solutions(engine, status)?;
            }
            EngineStatus::Optimal | EngineStatus::Suboptimal => {
                self.determine_solutions(engine, status)?;
            }
            EngineStatus::Other(code) => {
                debug!(code, "Unrecognized engine status, result stays empty");
            }
        }

        Ok(())
    }

    fn determine_solutions(
        &mut self,
        engine: &mut dyn SolvingEngine,
        status: EngineStatus,
    ) -> Result<()> {
        let solution_count = engine.solution_count().map_err(unable_to_determine)?;
        let is_optimal = status == EngineStatus::Optimal;
        let is_mip = engine.is_mip().map_err(unable_to_determine)?;

        let best_bound = if is_mip {
            engine.objective_bound()
        } else {
            engine.objective_value()
        }
        .map_err(unable_to_determine)?;

        let source = if is_mip {
            ValueSource::Pool
        } else {
            ValueSource::Primary
        };

        debug!(
            program = self.program.name(),
            solution_count, is_mip, best_bound, "Extracting solutions"
        );

        let mut ranked = Vec::with_capacity(solution_count);
        for index in 0..solution_count {
            engine.select_solution(index).map_err(unable_to_determine)?;

            let mut solution = Solution::new(self.program, index == 0 && is_optimal);
            solution.set_best_objective_bound(best_bound);

            for variable in self.program.variables() {
                let value = engine
                    .variable_value(variable.id(), source)
                    .map_err(unable_to_determine)?;
                solution.set_variable_value(variable.id(), value);
            }

            let objective_value = solution.objective_value()?;
            ranked.push((objective_value, solution));
        }

        ranked.sort_by(|(a, _), (b, _)| a.total_cmp(b));
        if self.program.determine_program_objective_sense()? == ObjectiveSense::Maximize {
            ranked.reverse();
        }

        self.solutions = ranked.into_iter().map(|(_, solution)| solution).collect();
        Ok(())
    }

    pub fn program(&self) -> &'p Program {
        self.program
    }

    pub fn is_problem_infeasible(&self) -> bool {
        self.infeasible
    }

    pub fn is_problem_unbounded(&self) -> bool {
        self.unbounded
    }

    pub fn has_execution_terminated(&self) -> bool {
        self.termination_reason != TerminationReason::None
    }

    pub fn termination_reason(&self) -> TerminationReason {
        self.termination_reason
    }

    pub fn has_solution(&self) -> bool {
        !self.solutions.is_empty()
    }

    pub fn has_optimal_solution(&self) -> bool {
        self.solutions.first().is_some_and(Solution::is_optimal)
    }

    pub fn solutions_count(&self) -> usize {
        self.solutions.len()
    }

    pub fn best_solution(&self) -> Result<&Solution<'p>> {
        self.solutions
            .first()
            .ok_or_else(|| ModelError::state("There is no best solution available"))
    }

    pub fn solution(&self, index: usize) -> Result<&Solution<'p>> {
        self.solutions.get(index).ok_or_else(|| {
            ModelError::InvalidArgument(format!(
                "There is no solution with index {} available",
                index
            ))
        })
    }

    /// Solutions ranked best first
    pub fn solutions(&self) -> &[Solution<'p>] {
        &self.solutions
    }

    pub fn execution_time_millis(&self) -> u64 {
        self.execution_time_millis
    }
}

fn unable_to_determine(err: EngineError) -> ModelError {
    ModelError::engine_state("Unable to determine execution result from program", err)
}
