//! Effect definitions.
//!
//! Effects are the atomic game actions that spells, activated abilities,
//! loyalty abilities and triggers perform. The set is closed: every card the
//! simulator can run is expressed by composing these variants.

use serde::{Deserialize, Serialize};

use super::targeting::{Controller, TargetSpec};
use crate::cards::{CardDefinition, ManaColor};
use crate::core::PlayerId;
use crate::zones::Zone;

static NO_TARGET: TargetSpec = TargetSpec::None;

/// Which players an untargeted player effect applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerSelector {
    /// The effect's controller.
    You,
    /// The controller's opponent.
    Opponent,
    /// Both players, controller first.
    Each,
}

impl PlayerSelector {
    /// The affected players, controller first.
    #[must_use]
    pub fn players(self, controller: PlayerId) -> Vec<PlayerId> {
        match self {
            PlayerSelector::You => vec![controller],
            PlayerSelector::Opponent => vec![controller.opponent()],
            PlayerSelector::Each => vec![controller, controller.opponent()],
        }
    }
}

/// An atomic game effect.
///
/// ## Targeted Effects
///
/// Variants carrying a `TargetSpec` take their target from the spell's
/// cast-time choice, or ask the controller's handler at resolution (triggered
/// abilities). With no legal target the effect does nothing.
///
/// ## Composite Effects
///
/// - `Sequence`: run each effect in order; only the first targeted child
///   receives a cast-time target
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    // === Damage & Life ===

    /// Deal damage to a creature, planeswalker or player.
    DealDamage { amount: i32, target: TargetSpec },

    /// The controller gains life.
    GainLife { amount: i32 },

    /// Players lose life (not damage; lifelink and deathtouch do not apply).
    LoseLife { amount: i32, who: PlayerSelector },

    // === Cards ===

    /// The controller draws cards.
    DrawCards { count: u32 },

    /// Players discard cards of their choice.
    Discard { count: u32, who: PlayerSelector },

    /// Players put the top cards of their library into the graveyard.
    Mill { count: u32, who: PlayerSelector },

    /// Search the controller's library for a land with one of the subtypes
    /// (any land when empty), then shuffle.
    SearchLibrary {
        land_types: Vec<String>,
        to: Zone,
        tapped: bool,
    },

    // === Permanents ===

    /// Destroy a permanent.
    Destroy { target: TargetSpec },

    /// Return a permanent to its owner's hand.
    ReturnToHand { target: TargetSpec },

    /// Counter a spell on the stack.
    CounterSpell { target: TargetSpec },

    /// Create token copies of a definition under the controller.
    CreateToken { token: Box<CardDefinition>, count: u32 },

    /// Until end of turn modifier.
    Pump {
        power: i32,
        toughness: i32,
        target: TargetSpec,
    },

    /// Put +1/+1 counters on a creature (negative removes).
    AddCounters { count: i32, target: TargetSpec },

    TapTarget { target: TargetSpec },

    UntapTarget { target: TargetSpec },

    // === Mana ===

    /// Add mana to the controller's pool.
    AddMana { color: ManaColor, amount: u32 },

    // === Source ===

    /// Sacrifice the permanent this effect came from.
    SacrificeSource,

    /// Return the source from its owner's graveyard to the battlefield.
    ReturnSourceToBattlefield,

    // === Composite ===

    Sequence(Vec<Effect>),
}

impl Effect {
    // === Convenience Constructors ===

    #[must_use]
    pub fn damage(amount: i32, target: TargetSpec) -> Self {
        Effect::DealDamage { amount, target }
    }

    /// Damage to any target.
    #[must_use]
    pub fn burn(amount: i32) -> Self {
        Effect::DealDamage {
            amount,
            target: TargetSpec::Any,
        }
    }

    #[must_use]
    pub fn draw(count: u32) -> Self {
        Effect::DrawCards { count }
    }

    #[must_use]
    pub fn gain_life(amount: i32) -> Self {
        Effect::GainLife { amount }
    }

    /// Destroy target creature an opponent controls.
    #[must_use]
    pub fn kill_opposing_creature() -> Self {
        Effect::Destroy {
            target: TargetSpec::Creature(Controller::Opponent),
        }
    }

    /// Chain another effect after this one.
    #[must_use]
    pub fn then(self, next: Effect) -> Self {
        match self {
            Effect::Sequence(mut effects) => {
                effects.push(next);
                Effect::Sequence(effects)
            }
            first => Effect::Sequence(vec![first, next]),
        }
    }

    // === Queries ===

    /// The target the effect needs when it is put on the stack.
    ///
    /// For a sequence this is the first targeted child.
    #[must_use]
    pub fn target_spec(&self) -> &TargetSpec {
        match self {
            Effect::DealDamage { target, .. }
            | Effect::Destroy { target }
            | Effect::ReturnToHand { target }
            | Effect::CounterSpell { target }
            | Effect::Pump { target, .. }
            | Effect::AddCounters { target, .. }
            | Effect::TapTarget { target }
            | Effect::UntapTarget { target } => target,
            Effect::Sequence(effects) => effects
                .iter()
                .map(Effect::target_spec)
                .find(|spec| spec.is_targeted())
                .unwrap_or(&NO_TARGET),
            _ => &NO_TARGET,
        }
    }

    /// Whether the targeted part of the effect harms what it targets.
    #[must_use]
    pub fn is_hostile(&self) -> bool {
        match self {
            Effect::DealDamage { .. }
            | Effect::Destroy { .. }
            | Effect::ReturnToHand { .. }
            | Effect::CounterSpell { .. }
            | Effect::TapTarget { .. } => true,
            Effect::Pump { power, toughness, .. } => power + toughness < 0,
            Effect::AddCounters { count, .. } => *count < 0,
            Effect::LoseLife { who, .. } | Effect::Discard { who, .. } | Effect::Mill { who, .. } => {
                *who != PlayerSelector::You
            }
            Effect::Sequence(effects) => effects
                .iter()
                .find(|e| e.target_spec().is_targeted())
                .or_else(|| effects.first())
                .is_some_and(Effect::is_hostile),
            _ => false,
        }
    }

    /// Total damage this effect deals (for burn planning).
    #[must_use]
    pub fn damage_amount(&self) -> i32 {
        match self {
            Effect::DealDamage { amount, .. } => *amount,
            Effect::Sequence(effects) => effects.iter().map(Effect::damage_amount).sum(),
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_spec_of_simple_effects() {
        assert_eq!(Effect::burn(3).target_spec(), &TargetSpec::Any);
        assert_eq!(Effect::draw(2).target_spec(), &TargetSpec::None);
        assert!(Effect::kill_opposing_creature().target_spec().is_targeted());
    }

    #[test]
    fn test_sequence_uses_first_targeted_child() {
        let effect = Effect::draw(1)
            .then(Effect::Pump {
                power: 2,
                toughness: 2,
                target: TargetSpec::Creature(Controller::You),
            })
            .then(Effect::burn(1));

        assert_eq!(effect.target_spec(), &TargetSpec::Creature(Controller::You));
        assert!(!effect.is_hostile());
        assert_eq!(effect.damage_amount(), 1);
    }

    #[test]
    fn test_then_flattens() {
        let effect = Effect::draw(1).then(Effect::draw(2)).then(Effect::gain_life(3));
        match effect {
            Effect::Sequence(effects) => assert_eq!(effects.len(), 3),
            other => panic!("expected sequence, got {other:?}"),
        }
    }

    #[test]
    fn test_hostility() {
        assert!(Effect::burn(2).is_hostile());
        assert!(Effect::LoseLife { amount: 2, who: PlayerSelector::Opponent }.is_hostile());
        assert!(!Effect::gain_life(2).is_hostile());
        assert!(Effect::Pump { power: -3, toughness: -3, target: TargetSpec::Creature(Controller::Any) }.is_hostile());
    }

    #[test]
    fn test_serialization() {
        let effect = Effect::CreateToken {
            token: Box::new(CardDefinition::token("Goblin", 1, 1)),
            count: 2,
        }
        .then(Effect::SearchLibrary {
            land_types: vec!["Forest".into()],
            to: Zone::Battlefield,
            tapped: true,
        });

        let json = serde_json::to_string(&effect).unwrap();
        let back: Effect = serde_json::from_str(&json).unwrap();
        assert_eq!(effect, back);
    }
}
