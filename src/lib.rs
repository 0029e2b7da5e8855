//! # duel-sim
//!
//! A deterministic two-player card game simulator for estimating deck
//! matchups.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: every shuffle and coin flip comes from one seeded
//!    RNG per game. Same seed, same decks, same handlers: same game log.
//!
//! 2. **Fail Loudly**: a handler that answers outside the legal set fails
//!    the game with an error instead of being quietly replaced by a pass.
//!
//! 3. **One Mutator**: inside a game only the engine changes state. Decision
//!    handlers get a read-only view and return a choice.
//!
//! ## Architecture
//!
//! - **Turn engine** (`rules`): phases, priority, the stack, combat and
//!   state-based actions.
//!
//! - **Triggers & effects** (`triggers`, `effects`): events fire triggered
//!   abilities, which resolve immediately with a bounded nesting depth.
//!
//! - **Runners** (`sim`): one game, or a parallel batch with aggregate
//!   statistics.
//!
//! ## Modules
//!
//! - `core`: ids, players, state, actions, RNG, configuration
//! - `zones`: per-player library, hand, battlefield, graveyard and exile
//! - `cards`: definitions, instances, decklists and a small card catalog
//! - `rules`: legality, mana, combat, state-based actions, the game engine
//! - `effects`: the effect set and its resolver
//! - `triggers`: events, trigger conditions and the trigger registry
//! - `stack`: the priority stack
//! - `decision`: decision handlers and the heuristic bot
//! - `sim`: single-game and batch runners
//!
//! ## Example
//!
//! ```no_run
//! use duel_sim::cards::catalog;
//! use duel_sim::sim::{CancellationToken, PlayerSeat, SimulationRunner};
//! use duel_sim::SimConfig;
//!
//! let runner = SimulationRunner::new(
//!     PlayerSeat::new("Burn", catalog::red_burn()),
//!     PlayerSeat::new("Stompy", catalog::green_stompy()),
//!     SimConfig::default().with_seed(7),
//! )
//! .unwrap();
//!
//! let run = runner.run(&CancellationToken::new()).unwrap();
//! ```

pub mod cards;
pub mod core;
pub mod decision;
pub mod effects;
pub mod error;
pub mod rules;
pub mod sim;
pub mod stack;
pub mod triggers;
pub mod zones;

// Re-export commonly used types
pub use crate::core::{
    Action, ActionKind, EndReason, EntityId, GameOutcome, GameState, Phase, PlayerId, PlayerMap, SimConfig,
};

pub use crate::cards::{CardDefinition, CardInstance, Decklist, Keyword, ManaColor, ManaCost};

pub use crate::decision::{BotConfig, DecisionHandler, Handlers, HeuristicBot};

pub use crate::effects::{Effect, Target, TargetSpec};

pub use crate::error::{BatchError, DeckError, SimError, SimResult};

pub use crate::rules::{GameEngine, RunStatus};

pub use crate::sim::{
    BatchConfig, BatchResult, BatchRunner, CancellationToken, GameRun, PlayerSeat, SimulationResult, SimulationRunner,
};

pub use crate::triggers::{GameEvent, Trigger};

pub use crate::zones::Zone;
