//! Error types.
//!
//! Two families:
//!
//! - `DeckError`: a decklist is malformed. Raised before any game starts.
//! - `SimError`: a game could not complete. Raised mid-game when a decision
//!   handler misbehaves or a trigger cascade exceeds the nesting cap.
//! - `BatchError`: a batch could not start its worker pool.
//!
//! Cancellation and the turn ceiling are ordinary outcomes, not errors.

use thiserror::Error;

use crate::core::{Action, PlayerId};

/// A decklist that cannot be simulated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeckError {
    #[error("deck '{0}' has no cards")]
    Empty(String),

    #[error("creature '{0}' is missing power or toughness")]
    MissingStats(String),

    #[error("invalid mana cost '{0}'")]
    InvalidManaCost(String),

    #[error("'{card}' has a free ability that can be activated without limit")]
    UnboundedAbility { card: String },

    #[error("planeswalker '{0}' has no starting loyalty")]
    MissingLoyalty(String),
}

/// A game that failed before reaching a natural end.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// A handler returned an action outside the legal set.
    #[error("{player} chose illegal action {action:?}")]
    IllegalAction { player: PlayerId, action: Action },

    /// A handler answered a sub-decision (targets, attackers, discards...) illegally.
    #[error("{player} made an illegal {decision} choice: {detail}")]
    IllegalChoice {
        player: PlayerId,
        decision: &'static str,
        detail: String,
    },

    /// Nested trigger resolution passed the configured cap.
    #[error("trigger chain exceeded depth {depth}: {}", .chain.join(" -> "))]
    UnboundedRecursion { depth: u32, chain: Vec<String> },

    #[error(transparent)]
    InvalidDeck(#[from] DeckError),
}

impl SimError {
    /// Whether this failure came from a runaway trigger cascade.
    #[must_use]
    pub fn is_recursion(&self) -> bool {
        matches!(self, SimError::UnboundedRecursion { .. })
    }
}

/// A batch that could not start.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("could not build the worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

/// Result alias for fallible game operations.
pub type SimResult<T> = Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recursion_message_lists_chain() {
        let err = SimError::UnboundedRecursion {
            depth: 3,
            chain: vec!["Ember Twin".into(), "Frost Twin".into()],
        };
        assert_eq!(
            err.to_string(),
            "trigger chain exceeded depth 3: Ember Twin -> Frost Twin"
        );
        assert!(err.is_recursion());
    }

    #[test]
    fn test_deck_error_converts() {
        let err: SimError = DeckError::Empty("Mono Red".into()).into();
        assert_eq!(err.to_string(), "deck 'Mono Red' has no cards");
        assert!(!err.is_recursion());
    }
}
