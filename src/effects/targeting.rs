//! Effect targeting.
//!
//! - `TargetSpec`: what an effect may target, relative to its controller
//! - `Target`: a concrete chosen target
//! - `TargetRequest`: what a decision handler is told when asked to choose
//! - `TargetSelector`: enumerates and re-checks legal targets

use serde::{Deserialize, Serialize};

use crate::cards::{CardInstance, Keyword};
use crate::core::{EntityId, GameState, PlayerId};
use crate::stack::StackEntryId;

/// Whose objects a target spec accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Controller {
    Any,
    You,
    Opponent,
}

impl Controller {
    /// Does `owner` satisfy this filter from `chooser`'s point of view?
    #[must_use]
    pub fn accepts(self, chooser: PlayerId, owner: PlayerId) -> bool {
        match self {
            Controller::Any => true,
            Controller::You => owner == chooser,
            Controller::Opponent => owner != chooser,
        }
    }
}

/// Specification for effect targeting.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetSpec {
    /// The effect does not target.
    #[default]
    None,
    /// Any creature, planeswalker or player.
    Any,
    /// A creature.
    Creature(Controller),
    /// A nonland permanent.
    Permanent(Controller),
    /// A player.
    Player(Controller),
    /// A spell on the stack.
    Spell(Controller),
}

impl TargetSpec {
    #[must_use]
    pub fn is_targeted(&self) -> bool {
        !matches!(self, TargetSpec::None)
    }
}

/// A chosen target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    Player(PlayerId),
    Card(EntityId),
    Spell(StackEntryId),
}

impl Target {
    #[must_use]
    pub fn card(self) -> Option<EntityId> {
        match self {
            Target::Card(id) => Some(id),
            _ => None,
        }
    }

    #[must_use]
    pub fn player(self) -> Option<PlayerId> {
        match self {
            Target::Player(p) => Some(p),
            _ => None,
        }
    }
}

/// A request to choose a target, passed to decision handlers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRequest {
    /// The card whose effect needs a target.
    pub source: EntityId,
    pub spec: TargetSpec,
    /// Harmful to whatever it targets (damage, destroy, counter...).
    pub hostile: bool,
}

/// Enumerates legal targets.
pub struct TargetSelector;

impl TargetSelector {
    /// Every legal target for `spec` when chosen by `chooser`, in a stable
    /// order: players (opponent first), then permanents (opponent's
    /// battlefield first, in battlefield order), then spells (top first).
    pub fn legal_targets(state: &GameState, chooser: PlayerId, spec: &TargetSpec) -> Vec<Target> {
        let mut out = Vec::new();
        let seats = [chooser.opponent(), chooser];

        match spec {
            TargetSpec::None => {}
            TargetSpec::Any => {
                out.extend(seats.iter().map(|p| Target::Player(*p)));
                Self::push_permanents(state, chooser, Controller::Any, &mut out, |card| {
                    card.is_creature() || card.definition.is_planeswalker()
                });
            }
            TargetSpec::Creature(filter) => {
                Self::push_permanents(state, chooser, *filter, &mut out, CardInstance::is_creature);
            }
            TargetSpec::Permanent(filter) => {
                Self::push_permanents(state, chooser, *filter, &mut out, |card| !card.is_land());
            }
            TargetSpec::Player(filter) => {
                out.extend(
                    seats
                        .iter()
                        .filter(|p| filter.accepts(chooser, **p))
                        .map(|p| Target::Player(*p)),
                );
            }
            TargetSpec::Spell(filter) => {
                out.extend(
                    state
                        .stack
                        .entries()
                        .iter()
                        .rev()
                        .filter(|e| e.is_spell() && filter.accepts(chooser, e.controller))
                        .map(|e| Target::Spell(e.id)),
                );
            }
        }

        out
    }

    /// Is `target` still legal for `spec`?
    #[must_use]
    pub fn is_legal(state: &GameState, chooser: PlayerId, spec: &TargetSpec, target: Target) -> bool {
        Self::legal_targets(state, chooser, spec).contains(&target)
    }

    fn push_permanents(
        state: &GameState,
        chooser: PlayerId,
        filter: Controller,
        out: &mut Vec<Target>,
        accept: impl Fn(&CardInstance) -> bool,
    ) {
        for seat in [chooser.opponent(), chooser] {
            if !filter.accepts(chooser, seat) {
                continue;
            }
            for card in state.battlefield(seat) {
                let shielded = seat != chooser && state.has_keyword(card.id, Keyword::Hexproof);
                if accept(card) && !shielded {
                    out.push(Target::Card(card.id));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardDefinition, ManaCost};
    use crate::core::SimConfig;
    use crate::zones::{Zone, ZonePosition};

    fn put(state: &mut GameState, owner: PlayerId, def: CardDefinition) -> EntityId {
        let id = state.allocate_id();
        state.players[owner]
            .zones
            .put(Zone::Battlefield, CardInstance::new(id, owner, &def), ZonePosition::Bottom);
        id
    }

    #[test]
    fn test_creature_filters() {
        let mut state = GameState::new(["A", "B"], &SimConfig::default());
        let mine = put(&mut state, PlayerId::ONE, CardDefinition::creature("Bear", ManaCost::generic(2), 2, 2));
        let theirs = put(&mut state, PlayerId::TWO, CardDefinition::creature("Ogre", ManaCost::generic(3), 3, 3));
        put(&mut state, PlayerId::TWO, CardDefinition::basic_land("Swamp"));

        let opp = TargetSelector::legal_targets(&state, PlayerId::ONE, &TargetSpec::Creature(Controller::Opponent));
        assert_eq!(opp, vec![Target::Card(theirs)]);

        let any = TargetSelector::legal_targets(&state, PlayerId::ONE, &TargetSpec::Creature(Controller::Any));
        assert_eq!(any, vec![Target::Card(theirs), Target::Card(mine)]);
    }

    #[test]
    fn test_any_target_includes_players_first() {
        let mut state = GameState::new(["A", "B"], &SimConfig::default());
        let ogre = put(&mut state, PlayerId::TWO, CardDefinition::creature("Ogre", ManaCost::generic(3), 3, 3));

        let targets = TargetSelector::legal_targets(&state, PlayerId::ONE, &TargetSpec::Any);
        assert_eq!(
            targets,
            vec![Target::Player(PlayerId::TWO), Target::Player(PlayerId::ONE), Target::Card(ogre)]
        );
    }

    #[test]
    fn test_hexproof_blocks_opponents_only() {
        let mut state = GameState::new(["A", "B"], &SimConfig::default());
        let shy = CardDefinition::creature("Slippery Bogle", ManaCost::generic(1), 1, 1).with_keyword(Keyword::Hexproof);
        let id = put(&mut state, PlayerId::TWO, shy);

        let spec = TargetSpec::Creature(Controller::Any);
        assert!(!TargetSelector::is_legal(&state, PlayerId::ONE, &spec, Target::Card(id)));
        assert!(TargetSelector::is_legal(&state, PlayerId::TWO, &spec, Target::Card(id)));
    }

    #[test]
    fn test_untargeted_spec_is_empty() {
        let state = GameState::new(["A", "B"], &SimConfig::default());
        assert!(TargetSelector::legal_targets(&state, PlayerId::ONE, &TargetSpec::None).is_empty());
        assert!(!TargetSpec::None.is_targeted());
    }
}
