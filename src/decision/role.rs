//! Spell roles: when the bot is willing to cast something.

use serde::{Deserialize, Serialize};

use crate::core::{GameState, Phase, PlayerId};
use crate::effects::{Effect, TargetSpec};

/// How the bot thinks about a spell or ability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpellRole {
    /// Creatures, sorceries and other main-phase plays.
    Proactive,
    /// Answers an opponent's spell on the stack.
    Counterspell,
    /// Harmful or combat tricks, used during combat or end steps.
    InstantRemoval,
    /// Everything else at instant speed; held for the opponent's end step.
    InstantUtility,
}

impl SpellRole {
    /// Classify by speed and resolution effect (`None` for permanents).
    #[must_use]
    pub fn classify(instant_speed: bool, effect: Option<&Effect>) -> Self {
        if !instant_speed {
            return SpellRole::Proactive;
        }
        match effect {
            Some(effect) if matches!(effect.target_spec(), TargetSpec::Spell(_)) => SpellRole::Counterspell,
            Some(effect) if effect.is_hostile() || matches!(effect, Effect::Pump { .. }) => SpellRole::InstantRemoval,
            _ => SpellRole::InstantUtility,
        }
    }

    /// Whether `player` should consider this role right now.
    #[must_use]
    pub fn is_eligible(self, state: &GameState, player: PlayerId) -> bool {
        let own_turn = state.active_player == player;
        match self {
            SpellRole::Proactive => own_turn && state.phase.is_main() && state.stack.is_empty(),
            SpellRole::Counterspell => state
                .stack
                .entries()
                .iter()
                .any(|entry| entry.is_spell() && entry.controller != player),
            SpellRole::InstantRemoval => state.phase.is_combat() || state.phase == Phase::End,
            SpellRole::InstantUtility => !own_turn && state.phase == Phase::End,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{catalog, CardInstance};
    use crate::core::SimConfig;
    use crate::stack::{CastMode, StackItem};

    fn role_of(def: &crate::cards::CardDefinition) -> SpellRole {
        SpellRole::classify(def.is_instant_speed(), def.spell.as_ref().map(|spell| &spell.effect))
    }

    #[test]
    fn test_classify_catalog() {
        assert_eq!(role_of(&catalog::grizzly_bears()), SpellRole::Proactive);
        assert_eq!(role_of(&catalog::lava_spike()), SpellRole::Proactive);
        assert_eq!(role_of(&catalog::counterspell()), SpellRole::Counterspell);
        assert_eq!(role_of(&catalog::lightning_bolt()), SpellRole::InstantRemoval);
        assert_eq!(role_of(&catalog::giant_growth()), SpellRole::InstantRemoval);
        assert_eq!(role_of(&catalog::think_twice()), SpellRole::InstantUtility);
    }

    #[test]
    fn test_eligibility_windows() {
        let mut state = GameState::new(["Ann", "Bo"], &SimConfig::default());
        let me = PlayerId::ONE;

        state.phase = Phase::Main1;
        assert!(SpellRole::Proactive.is_eligible(&state, me));
        assert!(!SpellRole::Proactive.is_eligible(&state, me.opponent()));
        assert!(!SpellRole::InstantRemoval.is_eligible(&state, me));

        state.phase = Phase::DeclareBlockers;
        assert!(SpellRole::InstantRemoval.is_eligible(&state, me));

        state.phase = Phase::End;
        assert!(SpellRole::InstantUtility.is_eligible(&state, me.opponent()));
        assert!(!SpellRole::InstantUtility.is_eligible(&state, me));
    }

    #[test]
    fn test_counterspell_needs_opposing_spell() {
        let mut state = GameState::new(["Ann", "Bo"], &SimConfig::default());
        assert!(!SpellRole::Counterspell.is_eligible(&state, PlayerId::TWO));

        let id = state.allocate_id();
        let bears = CardInstance::new(id, PlayerId::ONE, &catalog::grizzly_bears());
        state.stack.push(
            PlayerId::ONE,
            StackItem::Spell {
                card: bears,
                mode: CastMode::Normal,
            },
            None,
        );

        assert!(SpellRole::Counterspell.is_eligible(&state, PlayerId::TWO));
        assert!(!SpellRole::Counterspell.is_eligible(&state, PlayerId::ONE));
    }
}
