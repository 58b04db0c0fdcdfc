// Domain layer: programs, expressions, results and the engine contract
pub mod domain;

// Solver adapters: concrete engines behind SolvingEngine
pub mod solver;

// Scripted engine for tests
#[cfg(any(test, feature = "testkit"))]
pub mod testkit;

// Re-export commonly used types
pub use domain::{
    Constraint, EngineError, EngineErrorKind, EngineStatus, ExecutionResult, LinearExpression,
    LinearTerm, ModelError, Objective, ObjectiveSense, Operator, Program, ProgramId, Result,
    Solution, Solver, SolverBackend, SolverParameters, SolvingEngine, TerminationReason,
    ValueSource, Variable, VariableId, VariableSpec, VariableType,
};

pub use solver::SolverFactory;

#[cfg(feature = "highs")]
pub use solver::HighsEngine;

#[cfg(feature = "coin_cbc")]
pub use solver::CoinCbcEngine;
