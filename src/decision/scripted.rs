//! Fixed-behaviour handlers for tests and baselines.

use std::collections::VecDeque;

use crate::core::{Action, EntityId, GameState, PlayerId};

use super::DecisionHandler;

/// Plays a fixed list of actions in order, then passes forever.
///
/// The next scripted action is taken as soon as it appears in the legal
/// set; until then the handler passes. Other decisions use the trait
/// defaults unless overridden with the builder methods.
#[derive(Clone, Debug, Default)]
pub struct ScriptedHandler {
    actions: VecDeque<Action>,
    discards: Option<Vec<EntityId>>,
    mulligan: bool,
}

impl ScriptedHandler {
    pub fn new(actions: Vec<Action>) -> Self {
        Self {
            actions: actions.into(),
            discards: None,
            mulligan: false,
        }
    }

    /// Answer every discard request with exactly these cards.
    #[must_use]
    pub fn with_discards(mut self, cards: Vec<EntityId>) -> Self {
        self.discards = Some(cards);
        self
    }

    /// Take a mulligan whenever offered.
    #[must_use]
    pub fn with_mulligan(mut self, mulligan: bool) -> Self {
        self.mulligan = mulligan;
        self
    }

    /// Scripted actions not yet played.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.actions.len()
    }
}

impl DecisionHandler for ScriptedHandler {
    fn choose_action(&mut self, _state: &GameState, _player: PlayerId, legal: &[Action]) -> Action {
        match self.actions.front() {
            Some(next) if legal.contains(next) => self.actions.pop_front().unwrap_or(Action::PassPriority),
            _ => Action::PassPriority,
        }
    }

    fn choose_discard(&mut self, state: &GameState, player: PlayerId, count: usize) -> Vec<EntityId> {
        match &self.discards {
            Some(cards) => cards.clone(),
            None => {
                let hand = state.hand(player);
                hand[hand.len().saturating_sub(count)..].iter().map(|card| card.id).collect()
            }
        }
    }

    fn choose_mulligan(&mut self, _state: &GameState, _player: PlayerId) -> bool {
        self.mulligan
    }
}

/// Always passes, never attacks, never blocks.
#[derive(Clone, Copy, Debug, Default)]
pub struct PassiveHandler;

impl DecisionHandler for PassiveHandler {
    fn choose_action(&mut self, _state: &GameState, _player: PlayerId, _legal: &[Action]) -> Action {
        Action::PassPriority
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SimConfig;

    #[test]
    fn test_scripted_waits_until_legal() {
        let state = GameState::new(["Ann", "Bo"], &SimConfig::default());
        let land = Action::PlayLand { card: EntityId(3) };
        let mut handler = ScriptedHandler::new(vec![land.clone()]);

        assert_eq!(
            handler.choose_action(&state, PlayerId::ONE, &[Action::PassPriority]),
            Action::PassPriority
        );
        assert_eq!(handler.remaining(), 1);

        let legal = [Action::PassPriority, land.clone()];
        assert_eq!(handler.choose_action(&state, PlayerId::ONE, &legal), land);
        assert_eq!(handler.remaining(), 0);
        assert_eq!(handler.choose_action(&state, PlayerId::ONE, &legal), Action::PassPriority);
    }

    #[test]
    fn test_passive_defaults() {
        let state = GameState::new(["Ann", "Bo"], &SimConfig::default());
        let mut handler = PassiveHandler;

        assert!(handler.choose_attackers(&state, PlayerId::ONE, &[EntityId(1)]).is_empty());
        assert!(!handler.choose_mulligan(&state, PlayerId::ONE));
        assert_eq!(handler.choose_search(&state, PlayerId::ONE, &[EntityId(5), EntityId(6)]), Some(EntityId(5)));
    }
}
