//! Trigger conditions.
//!
//! A condition refines which occurrences of an event a trigger cares
//! about. Conditions are written relative to the card carrying the trigger
//! ("this card", "you", "an opponent") because they are declared on card
//! definitions before any game exists.

use serde::{Deserialize, Serialize};

use crate::cards::CardTypes;
use crate::core::{EntityId, GameState, PlayerId};
use crate::zones::Zone;

use super::event::{EventTarget, GameEvent};

/// A condition that must be met for a trigger to fire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerCondition {
    // === Source Filters ===

    /// The event's source is the card carrying the trigger.
    SourceIsSelf,

    /// The event's source is some other card.
    SourceIsOther,

    /// The event's source has all of these card types.
    SourceHasTypes(CardTypes),

    /// The event's source is a token.
    SourceIsToken,

    /// The event's source is controlled by the trigger's controller.
    SourceControlledByYou,

    /// The event's source is controlled by the opponent.
    SourceControlledByOpponent,

    // === Target Filters ===

    /// The event targeted the card carrying the trigger.
    TargetIsSelf,

    /// The event targeted the trigger's controller.
    TargetIsYou,

    /// The event targeted the opponent.
    TargetIsOpponent,

    // === Player Filters ===

    /// The event's player is the trigger's controller.
    PlayerIsYou,

    /// The event's player is the opponent.
    PlayerIsOpponent,

    // === Value Filters ===

    /// The event amount is at least N.
    AmountAtLeast(i32),

    /// A zone-change event moved the card to this zone.
    ToZone(Zone),

    // === Combinators ===

    /// All conditions must be true.
    All(Vec<TriggerCondition>),

    /// At least one condition must be true.
    Any(Vec<TriggerCondition>),

    /// Condition must be false.
    Not(Box<TriggerCondition>),

    // === Special ===

    /// Always matches (no filter).
    Always,

    /// Never matches (disabled trigger).
    Never,
}

impl TriggerCondition {
    /// Create an AND condition.
    pub fn all(conditions: impl IntoIterator<Item = TriggerCondition>) -> Self {
        Self::All(conditions.into_iter().collect())
    }

    /// Create an OR condition.
    pub fn any(conditions: impl IntoIterator<Item = TriggerCondition>) -> Self {
        Self::Any(conditions.into_iter().collect())
    }

    /// Negate this condition.
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Add another condition with AND.
    pub fn and(self, other: TriggerCondition) -> Self {
        match self {
            Self::All(mut conditions) => {
                conditions.push(other);
                Self::All(conditions)
            }
            Self::Always => other,
            _ => Self::All(vec![self, other]),
        }
    }

    /// Add another condition with OR.
    pub fn or(self, other: TriggerCondition) -> Self {
        match self {
            Self::Any(mut conditions) => {
                conditions.push(other);
                Self::Any(conditions)
            }
            _ => Self::Any(vec![self, other]),
        }
    }
}

/// Context for evaluating trigger conditions.
pub struct ConditionContext<'a> {
    /// The event being checked.
    pub event: &'a GameEvent,
    /// Current game state.
    pub state: &'a GameState,
    /// The card carrying the trigger.
    pub host: EntityId,
    /// Who would control the triggered ability.
    pub controller: PlayerId,
}

impl<'a> ConditionContext<'a> {
    /// Create a new context.
    pub fn new(event: &'a GameEvent, state: &'a GameState, host: EntityId, controller: PlayerId) -> Self {
        Self {
            event,
            state,
            host,
            controller,
        }
    }

    fn source_controller(&self) -> Option<PlayerId> {
        let source = self.event.source?;
        self.state.card(source).map(|card| card.controller)
    }
}

/// Evaluator for trigger conditions.
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// Check if a condition is satisfied.
    pub fn evaluate(condition: &TriggerCondition, ctx: &ConditionContext) -> bool {
        let opponent = ctx.controller.opponent();

        match condition {
            TriggerCondition::SourceIsSelf => ctx.event.source == Some(ctx.host),

            TriggerCondition::SourceIsOther => {
                ctx.event.source.is_some_and(|source| source != ctx.host)
            }

            TriggerCondition::SourceHasTypes(types) => ctx
                .event
                .source
                .and_then(|source| ctx.state.card(source))
                .is_some_and(|card| card.definition.types.contains(*types)),

            TriggerCondition::SourceIsToken => ctx
                .event
                .source
                .and_then(|source| ctx.state.card(source))
                .is_some_and(|card| card.definition.is_token),

            TriggerCondition::SourceControlledByYou => ctx.source_controller() == Some(ctx.controller),

            TriggerCondition::SourceControlledByOpponent => ctx.source_controller() == Some(opponent),

            TriggerCondition::TargetIsSelf => ctx.event.target == Some(EventTarget::Card(ctx.host)),

            TriggerCondition::TargetIsYou => {
                ctx.event.target == Some(EventTarget::Player(ctx.controller))
            }

            TriggerCondition::TargetIsOpponent => {
                ctx.event.target == Some(EventTarget::Player(opponent))
            }

            TriggerCondition::PlayerIsYou => ctx.event.player == Some(ctx.controller),

            TriggerCondition::PlayerIsOpponent => ctx.event.player == Some(opponent),

            TriggerCondition::AmountAtLeast(min) => ctx.event.amount >= *min,

            TriggerCondition::ToZone(zone) => ctx.event.to == Some(*zone),

            TriggerCondition::All(conditions) => {
                conditions.iter().all(|c| Self::evaluate(c, ctx))
            }

            TriggerCondition::Any(conditions) => {
                conditions.iter().any(|c| Self::evaluate(c, ctx))
            }

            TriggerCondition::Not(inner) => !Self::evaluate(inner, ctx),

            TriggerCondition::Always => true,

            TriggerCondition::Never => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardDefinition, CardInstance};
    use crate::core::SimConfig;
    use crate::zones::ZonePosition;

    fn state_with_bear() -> (GameState, EntityId) {
        let mut state = GameState::new(["Ann", "Bo"], &SimConfig::default());
        let bear = CardDefinition::creature("Grizzly Bears", "{1}{G}".parse().unwrap(), 2, 2);
        let id = state.allocate_id();
        state.players[PlayerId::ONE].zones.put(
            Zone::Battlefield,
            CardInstance::new(id, PlayerId::ONE, &bear),
            ZonePosition::Bottom,
        );
        (state, id)
    }

    #[test]
    fn test_self_conditions() {
        let (state, bear) = state_with_bear();
        let event = GameEvent::dies(bear, PlayerId::ONE);

        let ctx = ConditionContext::new(&event, &state, bear, PlayerId::ONE);
        assert!(ConditionEvaluator::evaluate(&TriggerCondition::SourceIsSelf, &ctx));
        assert!(!ConditionEvaluator::evaluate(&TriggerCondition::SourceIsOther, &ctx));

        let other = ConditionContext::new(&event, &state, EntityId(999), PlayerId::ONE);
        assert!(ConditionEvaluator::evaluate(&TriggerCondition::SourceIsOther, &other));
    }

    #[test]
    fn test_control_conditions() {
        let (state, bear) = state_with_bear();
        let event = GameEvent::enters_battlefield(bear, PlayerId::ONE);

        let mine = ConditionContext::new(&event, &state, EntityId(50), PlayerId::ONE);
        assert!(ConditionEvaluator::evaluate(&TriggerCondition::SourceControlledByYou, &mine));
        assert!(ConditionEvaluator::evaluate(&TriggerCondition::PlayerIsYou, &mine));

        let theirs = ConditionContext::new(&event, &state, EntityId(51), PlayerId::TWO);
        assert!(ConditionEvaluator::evaluate(&TriggerCondition::SourceControlledByOpponent, &theirs));
        assert!(ConditionEvaluator::evaluate(&TriggerCondition::PlayerIsOpponent, &theirs));
    }

    #[test]
    fn test_type_and_amount_conditions() {
        let (state, bear) = state_with_bear();
        let event = GameEvent::combat_damage(bear, EventTarget::Player(PlayerId::TWO), PlayerId::ONE, 2);
        let ctx = ConditionContext::new(&event, &state, bear, PlayerId::ONE);

        assert!(ConditionEvaluator::evaluate(&TriggerCondition::SourceHasTypes(CardTypes::CREATURE), &ctx));
        assert!(!ConditionEvaluator::evaluate(&TriggerCondition::SourceHasTypes(CardTypes::LAND), &ctx));
        assert!(ConditionEvaluator::evaluate(&TriggerCondition::AmountAtLeast(2), &ctx));
        assert!(!ConditionEvaluator::evaluate(&TriggerCondition::AmountAtLeast(3), &ctx));
        assert!(ConditionEvaluator::evaluate(&TriggerCondition::TargetIsOpponent, &ctx));
    }

    #[test]
    fn test_combinators() {
        let (state, bear) = state_with_bear();
        let event = GameEvent::dies(bear, PlayerId::ONE);
        let ctx = ConditionContext::new(&event, &state, bear, PlayerId::ONE);

        let both = TriggerCondition::SourceIsSelf.and(TriggerCondition::ToZone(Zone::Graveyard));
        assert!(ConditionEvaluator::evaluate(&both, &ctx));

        let either = TriggerCondition::Never.or(TriggerCondition::Always);
        assert!(ConditionEvaluator::evaluate(&either, &ctx));

        let negated = TriggerCondition::SourceIsSelf.negate();
        assert!(!ConditionEvaluator::evaluate(&negated, &ctx));

        assert_eq!(TriggerCondition::Always.and(TriggerCondition::Never), TriggerCondition::Never);
    }

    #[test]
    fn test_condition_serialization() {
        let cond = TriggerCondition::all([
            TriggerCondition::SourceIsOther,
            TriggerCondition::SourceHasTypes(CardTypes::CREATURE),
        ]);
        let json = serde_json::to_string(&cond).unwrap();
        let back: TriggerCondition = serde_json::from_str(&json).unwrap();
        assert_eq!(cond, back);
    }
}
