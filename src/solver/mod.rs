// Solver adapters module

#[cfg(feature = "coin_cbc")]
pub mod coin_cbc_engine;
pub mod factory;
#[cfg(feature = "highs")]
pub mod highs_engine;
#[cfg(any(feature = "coin_cbc", feature = "highs"))]
mod run;

#[cfg(feature = "coin_cbc")]
pub use coin_cbc_engine::CoinCbcEngine;
pub use factory::SolverFactory;
#[cfg(feature = "highs")]
pub use highs_engine::HighsEngine;
