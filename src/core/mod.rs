//! Core engine types: entities, players, state, actions, RNG, configuration.

pub mod action;
pub mod config;
pub mod entity;
pub mod player;
pub mod rng;
pub mod state;

pub use action::{Action, ActionKind, ActionRecord};
pub use config::{FirstPlayer, Phase, SimConfig};
pub use entity::{EntityAllocator, EntityId};
pub use player::{PlayerId, PlayerMap};
pub use rng::GameRng;
pub use state::{EndReason, GameLog, GameOutcome, GameState, Player};
