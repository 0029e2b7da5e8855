//! Game rules: legality, mana, combat, state-based actions and the turn
//! engine that ties them together.
//!
//! - `legality`: which actions a player may take right now
//! - `mana`: pools, sources and cost payment
//! - `ops`: zone changes, damage, draws and discards
//! - `sba`: state-based actions
//! - `combat`: attackers, blockers and damage assignment
//! - `engine`: `GameEngine`, the turn and priority loop

pub mod combat;
pub mod engine;
pub mod legality;
pub mod mana;
pub mod ops;
pub mod sba;

pub use combat::{Block, CombatState};
pub use engine::{GameEngine, RunStatus};
pub use legality::legal_actions;
pub use mana::ManaPool;
