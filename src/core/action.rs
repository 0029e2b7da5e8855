//! Player actions offered at a priority window.
//!
//! An `Action` is the "verb" plus the entity pointers it needs (the card,
//! its target, an ability index). `ActionKind` is the bare verb, used by the
//! timing table and by decision policies.

use serde::{Deserialize, Serialize};

use super::entity::EntityId;
use super::player::PlayerId;
use crate::cards::ManaColor;
use crate::effects::Target;

/// A complete player action.
///
/// ## Example
///
/// ```
/// use duel_sim::core::{Action, ActionKind, EntityId};
///
/// let play = Action::PlayLand { card: EntityId(5) };
/// assert_eq!(play.kind(), ActionKind::PlayLand);
/// assert_eq!(play.card(), Some(EntityId(5)));
/// assert!(Action::PassPriority.is_pass());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    PassPriority,

    PlayLand { card: EntityId },

    /// Tap a mana source and add one mana of `color` to the pool.
    TapForMana { card: EntityId, color: ManaColor },

    /// Undo an unspent `TapForMana`.
    UntapForMana { card: EntityId },

    /// Cast a spell from hand (or from exile, for a card on an adventure).
    CastSpell { card: EntityId, target: Option<Target> },

    /// Tap, pay life and sacrifice a fetch land.
    ActivateFetch { card: EntityId },

    /// Activate the `index`th activated ability of a permanent.
    ActivateAbility {
        card: EntityId,
        index: usize,
        target: Option<Target>,
    },

    /// Pay the cycling cost and discard the card to draw one.
    Cycle { card: EntityId },

    /// Cast a spell from the graveyard for its flashback cost.
    Flashback { card: EntityId, target: Option<Target> },

    ActivateLoyalty {
        card: EntityId,
        index: usize,
        target: Option<Target>,
    },

    /// Return an unblocked attacker to hand and put `card` onto the
    /// battlefield attacking in its place.
    Ninjutsu { card: EntityId, attacker: EntityId },

    /// Cast the adventure half of a card.
    CastAdventure { card: EntityId, target: Option<Target> },
}

/// The verb of an action, without its pointers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    PassPriority,
    PlayLand,
    TapForMana,
    UntapForMana,
    CastSpell,
    ActivateFetch,
    ActivateAbility,
    Cycle,
    Flashback,
    ActivateLoyalty,
    Ninjutsu,
    CastAdventure,
}

impl ActionKind {
    /// Every kind, in the order actions are listed at a priority window.
    pub const ALL: [ActionKind; 12] = [
        ActionKind::PassPriority,
        ActionKind::PlayLand,
        ActionKind::CastSpell,
        ActionKind::Flashback,
        ActionKind::CastAdventure,
        ActionKind::ActivateFetch,
        ActionKind::ActivateAbility,
        ActionKind::ActivateLoyalty,
        ActionKind::Cycle,
        ActionKind::Ninjutsu,
        ActionKind::TapForMana,
        ActionKind::UntapForMana,
    ];

    /// Spells go on the stack and fire `SpellCast`.
    #[must_use]
    pub const fn is_cast(self) -> bool {
        matches!(
            self,
            ActionKind::CastSpell | ActionKind::Flashback | ActionKind::CastAdventure
        )
    }
}

impl Action {
    #[must_use]
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::PassPriority => ActionKind::PassPriority,
            Action::PlayLand { .. } => ActionKind::PlayLand,
            Action::TapForMana { .. } => ActionKind::TapForMana,
            Action::UntapForMana { .. } => ActionKind::UntapForMana,
            Action::CastSpell { .. } => ActionKind::CastSpell,
            Action::ActivateFetch { .. } => ActionKind::ActivateFetch,
            Action::ActivateAbility { .. } => ActionKind::ActivateAbility,
            Action::Cycle { .. } => ActionKind::Cycle,
            Action::Flashback { .. } => ActionKind::Flashback,
            Action::ActivateLoyalty { .. } => ActionKind::ActivateLoyalty,
            Action::Ninjutsu { .. } => ActionKind::Ninjutsu,
            Action::CastAdventure { .. } => ActionKind::CastAdventure,
        }
    }

    #[must_use]
    pub fn is_pass(&self) -> bool {
        matches!(self, Action::PassPriority)
    }

    /// The card the action is about.
    #[must_use]
    pub fn card(&self) -> Option<EntityId> {
        match self {
            Action::PassPriority => None,
            Action::PlayLand { card }
            | Action::TapForMana { card, .. }
            | Action::UntapForMana { card }
            | Action::CastSpell { card, .. }
            | Action::ActivateFetch { card }
            | Action::ActivateAbility { card, .. }
            | Action::Cycle { card }
            | Action::Flashback { card, .. }
            | Action::ActivateLoyalty { card, .. }
            | Action::Ninjutsu { card, .. }
            | Action::CastAdventure { card, .. } => Some(*card),
        }
    }

    /// The target chosen for the action, if any.
    #[must_use]
    pub fn target(&self) -> Option<Target> {
        match self {
            Action::CastSpell { target, .. }
            | Action::ActivateAbility { target, .. }
            | Action::Flashback { target, .. }
            | Action::ActivateLoyalty { target, .. }
            | Action::CastAdventure { target, .. } => *target,
            _ => None,
        }
    }
}

/// A recorded action with metadata for history tracking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// Turn number when the action was taken.
    pub turn: u32,

    /// The player who took this action.
    pub player: PlayerId,

    pub action: Action,
}

impl ActionRecord {
    #[must_use]
    pub fn new(turn: u32, player: PlayerId, action: Action) -> Self {
        Self { turn, player, action }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        let cast = Action::CastSpell {
            card: EntityId(3),
            target: Some(Target::Player(PlayerId::TWO)),
        };
        assert_eq!(cast.kind(), ActionKind::CastSpell);
        assert!(cast.kind().is_cast());
        assert_eq!(cast.target(), Some(Target::Player(PlayerId::TWO)));
        assert!(!ActionKind::PlayLand.is_cast());
    }

    #[test]
    fn test_card_pointer() {
        assert_eq!(Action::PassPriority.card(), None);
        let ninja = Action::Ninjutsu {
            card: EntityId(8),
            attacker: EntityId(2),
        };
        assert_eq!(ninja.card(), Some(EntityId(8)));
        assert_eq!(ninja.target(), None);
    }

    #[test]
    fn test_all_kinds_listed_once() {
        let mut kinds = ActionKind::ALL.to_vec();
        kinds.dedup();
        assert_eq!(kinds.len(), 12);
        assert_eq!(kinds[0], ActionKind::PassPriority);
    }

    #[test]
    fn test_action_hash_equality() {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let hash = |a: &Action| {
            let mut h = DefaultHasher::new();
            a.hash(&mut h);
            h.finish()
        };

        let a1 = Action::PlayLand { card: EntityId(5) };
        let a2 = Action::PlayLand { card: EntityId(5) };
        let a3 = Action::PlayLand { card: EntityId(6) };

        assert_eq!(hash(&a1), hash(&a2));
        assert_ne!(hash(&a1), hash(&a3));
    }

    #[test]
    fn test_action_record() {
        let record = ActionRecord::new(3, PlayerId::ONE, Action::PassPriority);
        assert_eq!(record.turn, 3);
        assert_eq!(record.player, PlayerId::ONE);

        let json = serde_json::to_string(&record).unwrap();
        let back: ActionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }
}
