// Solve orchestration: validates a program, hands it to an engine and turns
// the engine's state into an ExecutionResult

use tracing::{info, warn};

use super::engine::SolvingEngine;
use super::error::{ModelError, Result};
use super::execution_result::ExecutionResult;
use super::parameters::SolverParameters;
use super::program::Program;

/// Drives one engine through validate, optimize and result extraction
///
/// A failing `optimize` does not abort the run: whatever the engine can still
/// report is extracted, and only when that fails as well is the optimize
/// failure returned.
pub struct Solver {
    engine: Box<dyn SolvingEngine>,
    parameters: SolverParameters,
}

impl Solver {
    pub fn new(engine: Box<dyn SolvingEngine>) -> Self {
        Self {
            engine,
            parameters: SolverParameters::default(),
        }
    }

    pub fn with_parameters(mut self, parameters: SolverParameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn parameters(&self) -> &SolverParameters {
        &self.parameters
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Solve `program` and classify the outcome
    pub fn solve<'p>(&mut self, program: &'p Program) -> Result<ExecutionResult<'p>> {
        self.parameters.validate()?;
        self.engine.validate(program)?;

        info!(
            program = program.name(),
            engine = self.engine.name(),
            variables = program.variables_count(),
            constraints = program.constraints_count(),
            "Solving program"
        );

        let optimize_error = match self.engine.optimize(program, &self.parameters) {
            Ok(status) => {
                info!(program = program.name(), %status, "Engine finished");
                None
            }
            Err(err) => {
                warn!(
                    program = program.name(),
                    engine = self.engine.name(),
                    error = %err,
                    "Optimization failed, extracting what the engine reports"
                );
                Some(err)
            }
        };

        match ExecutionResult::from_engine(program, self.engine.as_mut()) {
            Ok(result) => {
                info!(
                    program = program.name(),
                    solutions = result.solutions_count(),
                    infeasible = result.is_problem_infeasible(),
                    unbounded = result.is_problem_unbounded(),
                    termination = %result.termination_reason(),
                    millis = result.execution_time_millis(),
                    "Execution result ready"
                );
                Ok(result)
            }
            Err(err) => match optimize_error {
                Some(source) => Err(ModelError::SolveFailed {
                    message: format!(
                        "Unable to solve program '{}' with {}: {}",
                        program.name(),
                        self.engine.name(),
                        source
                    ),
                    source: Some(source),
                }),
                None => Err(err),
            },
        }
    }
}

impl std::fmt::Debug for Solver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Solver")
            .field("engine", &self.engine.name())
            .field("parameters", &self.parameters)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::engine::{EngineError, EngineErrorKind};
    use crate::domain::models::VariableSpec;
    use crate::domain::value_objects::{EngineStatus, ObjectiveSense};
    use crate::testkit::ScriptedEngine;

    fn program() -> Program {
        let mut program = Program::new("solver").unwrap();
        let x = program.add_variable(VariableSpec::integer("x")).unwrap();
        program
            .add_objective("obj", ObjectiveSense::Maximize)
            .unwrap()
            .expression_mut()
            .add_term(3.0, x)
            .unwrap();
        program
    }

    #[test]
    fn test_solve_returns_result() {
        let program = program();
        let engine = ScriptedEngine::new(EngineStatus::Optimal)
            .with_mip(true)
            .with_objective_bound(6.0)
            .with_solution(vec![2.0]);
        let mut solver = Solver::new(Box::new(engine));

        let result = solver.solve(&program).unwrap();
        assert!(result.has_optimal_solution());
        let best = result.best_solution().unwrap();
        assert!((best.objective_value().unwrap() - 6.0).abs() < 1e-9);
        assert!(best.relative_optimality_gap().abs() < 1e-9);
    }

    #[test]
    fn test_program_without_objective_rejected() {
        let mut program = Program::new("empty").unwrap();
        program.add_variable(VariableSpec::continuous("x")).unwrap();
        let mut solver = Solver::new(Box::new(ScriptedEngine::new(EngineStatus::Optimal)));

        assert!(matches!(
            solver.solve(&program),
            Err(ModelError::IllegalState { .. })
        ));
    }

    #[test]
    fn test_foreign_objective_rejected_before_optimize() {
        let mut program = program();
        let mut other = Program::new("solver").unwrap();
        other.add_variable(VariableSpec::integer("x")).unwrap();
        let y = other.add_variable(VariableSpec::integer("y")).unwrap();
        let foreign = other.add_objective("obj", ObjectiveSense::Maximize).unwrap();
        foreign.expression_mut().add_term(5.0, y).unwrap();
        let foreign = foreign.expression().clone();
        *program.objective_mut(0).unwrap().expression_mut() = foreign;

        let engine = ScriptedEngine::new(EngineStatus::Optimal)
            .with_mip(true)
            .with_solution(vec![2.0]);
        let mut solver = Solver::new(Box::new(engine));

        assert!(matches!(
            solver.solve(&program),
            Err(ModelError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let program = program();
        let mut solver = Solver::new(Box::new(ScriptedEngine::new(EngineStatus::Optimal)))
            .with_parameters(SolverParameters::new().with_time_limit(-5.0));

        assert!(matches!(
            solver.solve(&program),
            Err(ModelError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_mip_rejected_by_lp_only_engine() {
        let program = program();
        let engine = ScriptedEngine::new(EngineStatus::Optimal).without_mip_support();
        let mut solver = Solver::new(Box::new(engine));

        assert!(matches!(
            solver.solve(&program),
            Err(ModelError::SolverNotAvailable(_))
        ));
    }

    #[test]
    fn test_optimize_failure_with_readable_state() {
        let program = program();
        let engine = ScriptedEngine::new(EngineStatus::TimeLimit)
            .with_mip(true)
            .with_solution(vec![1.0])
            .failing_optimize(EngineError::new(EngineErrorKind::Callback, "callback aborted"));
        let mut solver = Solver::new(Box::new(engine));

        let result = solver.solve(&program).unwrap();
        assert!(result.has_execution_terminated());
        assert_eq!(result.solutions_count(), 1);
    }

    #[test]
    fn test_optimize_failure_surfaces_when_nothing_readable() {
        let program = program();
        let engine = ScriptedEngine::new(EngineStatus::Optimal)
            .failing_optimize(EngineError::new(EngineErrorKind::NoLicense, "no license"))
            .failing_queries(EngineError::new(
                EngineErrorKind::DataNotAvailable,
                "nothing loaded",
            ));
        let mut solver = Solver::new(Box::new(engine));

        match solver.solve(&program) {
            Err(ModelError::SolveFailed {
                source: Some(source),
                ..
            }) => assert_eq!(source.kind(), EngineErrorKind::NoLicense),
            other => panic!("expected solve failure, got {:?}", other),
        }
    }

    #[test]
    fn test_parameters_and_name() {
        let solver = Solver::new(Box::new(ScriptedEngine::new(EngineStatus::Optimal)))
            .with_parameters(SolverParameters::new().with_threads(2));
        assert_eq!(solver.parameters().threads, Some(2));
        assert_eq!(solver.engine_name(), "scripted");
    }
}
