// Engine collaborator contract
// Defines what the modeling layer needs from a native solving engine, so a
// backend can be swapped without touching the model or result extraction.

use super::error::{ModelError, Result};
use super::models::VariableId;
use super::parameters::SolverParameters;
use super::program::Program;
use super::value_objects::{EngineStatus, ValueSource};

/// Classified engine failure codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineErrorKind {
    OutOfMemory,
    NullArgument,
    InvalidArgument,
    UnknownAttribute,
    DataNotAvailable,
    IndexOutOfRange,
    UnknownParameter,
    ValueOutOfRange,
    NoLicense,
    SizeLimitExceeded,
    Callback,
    Numeric,
    NotForMip,
    OptimizationInProgress,
    Duplicates,
    Network,
    NotSupported,
    NotInModel,
    FailedToCreateModel,
    Internal,
}

impl EngineErrorKind {
    pub const ALL: [EngineErrorKind; 20] = [
        EngineErrorKind::OutOfMemory,
        EngineErrorKind::NullArgument,
        EngineErrorKind::InvalidArgument,
        EngineErrorKind::UnknownAttribute,
        EngineErrorKind::DataNotAvailable,
        EngineErrorKind::IndexOutOfRange,
        EngineErrorKind::UnknownParameter,
        EngineErrorKind::ValueOutOfRange,
        EngineErrorKind::NoLicense,
        EngineErrorKind::SizeLimitExceeded,
        EngineErrorKind::Callback,
        EngineErrorKind::Numeric,
        EngineErrorKind::NotForMip,
        EngineErrorKind::OptimizationInProgress,
        EngineErrorKind::Duplicates,
        EngineErrorKind::Network,
        EngineErrorKind::NotSupported,
        EngineErrorKind::NotInModel,
        EngineErrorKind::FailedToCreateModel,
        EngineErrorKind::Internal,
    ];

    /// Numeric code, in the 10001.. range native engines commonly use
    pub fn code(&self) -> i32 {
        match self {
            EngineErrorKind::OutOfMemory => 10001,
            EngineErrorKind::NullArgument => 10002,
            EngineErrorKind::InvalidArgument => 10003,
            EngineErrorKind::UnknownAttribute => 10004,
            EngineErrorKind::DataNotAvailable => 10005,
            EngineErrorKind::IndexOutOfRange => 10006,
            EngineErrorKind::UnknownParameter => 10007,
            EngineErrorKind::ValueOutOfRange => 10008,
            EngineErrorKind::NoLicense => 10009,
            EngineErrorKind::SizeLimitExceeded => 10010,
            EngineErrorKind::Callback => 10011,
            EngineErrorKind::Numeric => 10014,
            EngineErrorKind::NotForMip => 10016,
            EngineErrorKind::OptimizationInProgress => 10017,
            EngineErrorKind::Duplicates => 10018,
            EngineErrorKind::Network => 10022,
            EngineErrorKind::NotSupported => 10024,
            EngineErrorKind::NotInModel => 20001,
            EngineErrorKind::FailedToCreateModel => 20002,
            EngineErrorKind::Internal => 20003,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.code() == code)
    }

    pub fn section(&self) -> &'static str {
        match self {
            EngineErrorKind::OutOfMemory => "OUT_OF_MEMORY",
            EngineErrorKind::NullArgument => "NULL_ARGUMENT",
            EngineErrorKind::InvalidArgument => "INVALID_ARGUMENT",
            EngineErrorKind::UnknownAttribute => "UNKNOWN_ATTRIBUTE",
            EngineErrorKind::DataNotAvailable => "DATA_NOT_AVAILABLE",
            EngineErrorKind::IndexOutOfRange => "INDEX_OUT_OF_RANGE",
            EngineErrorKind::UnknownParameter => "UNKNOWN_PARAMETER",
            EngineErrorKind::ValueOutOfRange => "VALUE_OUT_OF_RANGE",
            EngineErrorKind::NoLicense => "NO_LICENSE",
            EngineErrorKind::SizeLimitExceeded => "SIZE_LIMIT_EXCEEDED",
            EngineErrorKind::Callback => "CALLBACK",
            EngineErrorKind::Numeric => "NUMERIC",
            EngineErrorKind::NotForMip => "NOT_FOR_MIP",
            EngineErrorKind::OptimizationInProgress => "OPTIMIZATION_IN_PROGRESS",
            EngineErrorKind::Duplicates => "DUPLICATES",
            EngineErrorKind::Network => "NETWORK",
            EngineErrorKind::NotSupported => "NOT_SUPPORTED",
            EngineErrorKind::NotInModel => "NOT_IN_MODEL",
            EngineErrorKind::FailedToCreateModel => "FAILED_TO_CREATE_MODEL",
            EngineErrorKind::Internal => "INTERNAL",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            EngineErrorKind::OutOfMemory => "Available memory was exhausted",
            EngineErrorKind::NullArgument => "Missing input value provided for a required argument",
            EngineErrorKind::InvalidArgument => "An invalid value was provided for a routine argument",
            EngineErrorKind::UnknownAttribute => "Tried to query or set an unknown attribute",
            EngineErrorKind::DataNotAvailable => {
                "Attempted to query or set an attribute that could not be accessed at that time"
            }
            EngineErrorKind::IndexOutOfRange => {
                "One or more of the provided indices was outside the range of valid values"
            }
            EngineErrorKind::UnknownParameter => "Tried to query or set an unknown parameter",
            EngineErrorKind::ValueOutOfRange => {
                "Tried to set a parameter to a value outside its valid range"
            }
            EngineErrorKind::NoLicense => "Failed to obtain a valid license",
            EngineErrorKind::SizeLimitExceeded => {
                "Attempted to solve a model larger than the engine allows"
            }
            EngineErrorKind::Callback => "Problem in callback",
            EngineErrorKind::Numeric => "Numerical error during requested operation",
            EngineErrorKind::NotForMip => "Requested operation not valid for a MIP model",
            EngineErrorKind::OptimizationInProgress => {
                "Tried to query or modify a model while optimization was in progress"
            }
            EngineErrorKind::Duplicates => "Constraint or variable contained duplicated indices",
            EngineErrorKind::Network => "Problem communicating with a remote engine",
            EngineErrorKind::NotSupported => "Feature is not supported by this engine",
            EngineErrorKind::NotInModel => {
                "Tried to use a variable or constraint that is not in the loaded model"
            }
            EngineErrorKind::FailedToCreateModel => "Failed to create the requested model",
            EngineErrorKind::Internal => "Internal engine error",
        }
    }
}

/// Failure reported by a solving engine
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message} ({}, {}, {})", .kind.section(), .kind.code(), .kind.description())]
pub struct EngineError {
    kind: EngineErrorKind,
    message: String,
}

impl EngineError {
    pub fn new(kind: EngineErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> EngineErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Contract of a native solving engine
///
/// An engine loads a program in `optimize` and afterwards answers queries
/// about that run. Variables are addressed by the ids the program issued;
/// ids from any other program must be rejected with `NotInModel`.
pub trait SolvingEngine {
    /// Get the name of this engine backend
    fn name(&self) -> &str;

    /// Check if this engine supports mixed-integer programming
    fn supports_mip(&self) -> bool;

    /// Validate a program before it is loaded
    fn validate(&self, program: &Program) -> Result<()> {
        program.validate()?;

        if program.is_mixed_integer() && !self.supports_mip() {
            return Err(ModelError::SolverNotAvailable(format!(
                "{} cannot solve mixed-integer program '{}'",
                self.name(),
                program.name()
            )));
        }

        Ok(())
    }

    /// Load `program` and run the solve; blocks until the engine stops
    fn optimize(&mut self, program: &Program, parameters: &SolverParameters)
        -> EngineResult<EngineStatus>;

    fn status(&self) -> EngineResult<EngineStatus>;

    fn solution_count(&self) -> EngineResult<usize>;

    fn is_mip(&self) -> EngineResult<bool>;

    /// Best proven bound on the objective (MIP)
    fn objective_bound(&self) -> EngineResult<f64>;

    /// Objective value of the primary solution
    fn objective_value(&self) -> EngineResult<f64>;

    fn runtime_seconds(&self) -> EngineResult<f64>;

    /// Selects the pool solution subsequent `Pool` reads refer to
    fn select_solution(&mut self, index: usize) -> EngineResult<()>;

    fn variable_value(&self, variable: VariableId, source: ValueSource) -> EngineResult<f64>;
}
