use crate::domain::{
    engine::SolvingEngine,
    error::{ModelError, Result},
    parameters::SolverParameters,
    program::Program,
    solver_service::Solver,
    value_objects::SolverBackend,
};
#[cfg(feature = "coin_cbc")]
use crate::solver::CoinCbcEngine;
#[cfg(feature = "highs")]
use crate::solver::HighsEngine;
use tracing::debug;

/// Factory for creating engines and solvers based on configuration
pub struct SolverFactory;

impl SolverFactory {
    /// Create a solver for the backend named in `parameters`
    pub fn create_solver(parameters: SolverParameters) -> Result<Solver> {
        let engine = Self::create_engine(parameters.backend)?;
        Ok(Solver::new(engine).with_parameters(parameters))
    }

    /// Create an engine for a specific backend
    ///
    /// `Auto` prefers HiGHS and falls back to CBC.
    pub fn create_engine(backend: SolverBackend) -> Result<Box<dyn SolvingEngine>> {
        let engine = match backend {
            SolverBackend::Auto => Self::highs().or_else(|_| Self::coin_cbc()),
            SolverBackend::Highs => Self::highs(),
            SolverBackend::CoinCbc => Self::coin_cbc(),
        }?;

        debug!(%backend, engine = engine.name(), "Engine created");
        Ok(engine)
    }

    /// Create an empty program, named `program<N>` when no name is given
    pub fn create_program(name: Option<&str>) -> Result<Program> {
        match name {
            Some(name) => Program::new(name),
            None => Ok(Program::unnamed()),
        }
    }

    /// Backends compiled into this build
    pub fn available_backends() -> Vec<SolverBackend> {
        let mut backends = Vec::new();
        if cfg!(feature = "highs") {
            backends.push(SolverBackend::Highs);
        }
        if cfg!(feature = "coin_cbc") {
            backends.push(SolverBackend::CoinCbc);
        }
        backends
    }

    #[cfg(feature = "highs")]
    fn highs() -> Result<Box<dyn SolvingEngine>> {
        Ok(Box::new(HighsEngine::new()))
    }

    #[cfg(not(feature = "highs"))]
    fn highs() -> Result<Box<dyn SolvingEngine>> {
        Err(ModelError::SolverNotAvailable(
            "HiGHS support is not enabled (feature `highs`)".to_string(),
        ))
    }

    #[cfg(feature = "coin_cbc")]
    fn coin_cbc() -> Result<Box<dyn SolvingEngine>> {
        Ok(Box::new(CoinCbcEngine::new()))
    }

    #[cfg(not(feature = "coin_cbc"))]
    fn coin_cbc() -> Result<Box<dyn SolvingEngine>> {
        Err(ModelError::SolverNotAvailable(
            "COIN-OR CBC support is not enabled (feature `coin_cbc`)".to_string(),
        ))
    }
}
