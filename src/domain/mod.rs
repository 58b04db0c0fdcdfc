// Domain module: modeling types, results and the engine contract

pub mod engine;
pub mod error;
pub mod execution_result;
pub mod expression;
pub mod models;
pub mod parameters;
pub mod program;
pub mod solution;
pub mod solver_service;
pub mod value_objects;

pub use engine::*;
pub use error::*;
pub use execution_result::*;
pub use expression::*;
pub use models::*;
pub use parameters::*;
pub use program::*;
pub use solution::*;
pub use solver_service::*;
pub use value_objects::*;
