//! Decision handlers: the policies that play each seat.
//!
//! The engine asks a `DecisionHandler` whenever a player must choose:
//! a priority action, a target, attackers, blockers, discards, mulligans,
//! library searches. Every answer is checked against the legal options,
//! and an answer outside them fails the game.
//!
//! ## Handlers
//!
//! - `HeuristicBot`: the automated policy used by the runners
//! - `ScriptedHandler`: replays a fixed action list (tests)
//! - `PassiveHandler`: always passes, never attacks or blocks

mod config;
mod heuristic;
mod role;
mod scripted;

pub use config::BotConfig;
pub use heuristic::HeuristicBot;
pub use role::SpellRole;
pub use scripted::{PassiveHandler, ScriptedHandler};

pub use crate::rules::Block;

use crate::core::{Action, EntityId, GameState, PlayerId, PlayerMap};
use crate::effects::{Target, TargetRequest};

/// A policy that answers every choice the engine asks a player to make.
///
/// Only `choose_action` is required. The other methods default to the
/// smallest legal answer: first target, no attackers, no blockers,
/// last cards of the hand, keep the opening hand, first search result.
pub trait DecisionHandler: Send {
    /// Pick one action from `legal`. `PassPriority` is always present.
    fn choose_action(&mut self, state: &GameState, player: PlayerId, legal: &[Action]) -> Action;

    /// Pick a target for an effect that needs one at resolution.
    /// `options` is never empty.
    fn choose_target(
        &mut self,
        _state: &GameState,
        _player: PlayerId,
        _request: &TargetRequest,
        options: &[Target],
    ) -> Target {
        options[0]
    }

    fn choose_attackers(&mut self, _state: &GameState, _player: PlayerId, _candidates: &[EntityId]) -> Vec<EntityId> {
        Vec::new()
    }

    fn choose_blockers(
        &mut self,
        _state: &GameState,
        _player: PlayerId,
        _attackers: &[EntityId],
        _candidates: &[EntityId],
    ) -> Vec<Block> {
        Vec::new()
    }

    /// Pick exactly `count` cards from hand to discard.
    fn choose_discard(&mut self, state: &GameState, player: PlayerId, count: usize) -> Vec<EntityId> {
        last_cards_in_hand(state, player, count)
    }

    /// Whether to shuffle this opening hand away and draw a new one.
    fn choose_mulligan(&mut self, _state: &GameState, _player: PlayerId) -> bool {
        false
    }

    /// Pick `count` cards to put on the bottom after a mulligan.
    fn choose_bottom(&mut self, state: &GameState, player: PlayerId, count: usize) -> Vec<EntityId> {
        last_cards_in_hand(state, player, count)
    }

    /// Pick a card found by a library search, or `None` to fail to find.
    fn choose_search(&mut self, _state: &GameState, _player: PlayerId, candidates: &[EntityId]) -> Option<EntityId> {
        candidates.first().copied()
    }
}

/// One boxed handler per seat.
pub type Handlers = PlayerMap<Box<dyn DecisionHandler>>;

/// Box two handlers into a `Handlers` map.
pub fn handler_pair(one: impl DecisionHandler + 'static, two: impl DecisionHandler + 'static) -> Handlers {
    let one: Box<dyn DecisionHandler> = Box::new(one);
    let two: Box<dyn DecisionHandler> = Box::new(two);
    PlayerMap::from_pair(one, two)
}

fn last_cards_in_hand(state: &GameState, player: PlayerId, count: usize) -> Vec<EntityId> {
    let hand = state.hand(player);
    hand[hand.len().saturating_sub(count)..]
        .iter()
        .map(|card| card.id)
        .collect()
}
