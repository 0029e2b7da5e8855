//! Simulation runners.
//!
//! - `SimulationRunner`: plays one game between two validated decks
//! - `BatchRunner`: plays N seeded games on a rayon pool and aggregates
//! - `CancellationToken`: cooperative stop signal for both

mod batch;
mod cancel;
mod runner;

pub use batch::{BatchConfig, BatchResult, BatchRunner, GameFailure};
pub use cancel::CancellationToken;
pub use runner::{GameRun, PlayerSeat, SimulationResult, SimulationRunner};
