//! Trigger definitions, collection and resolution.
//!
//! Triggers are stored on card definitions, so there is no separate
//! registry to keep in sync: the scan walks the battlefields (and, for
//! graveyard triggers, the graveyards) each time an event fires.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::core::{EntityId, GameState, PlayerId};
use crate::decision::Handlers;
use crate::effects::{Effect, EffectContext, EffectResolver};
use crate::error::{SimError, SimResult};
use crate::zones::Zone;

use super::condition::{ConditionContext, ConditionEvaluator, TriggerCondition};
use super::event::{GameEvent, GameEventKind};

/// Where a trigger is live.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerZone {
    #[default]
    Battlefield,
    /// Live while the card is in its owner's graveyard. Self death and
    /// leave-the-battlefield triggers use this, since the card has already
    /// moved when the event is scanned.
    Graveyard,
}

/// A trigger definition: event kind, condition and effect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    pub event: GameEventKind,
    pub condition: TriggerCondition,
    pub effect: Effect,
    pub zone: TriggerZone,
}

impl Trigger {
    /// Create a battlefield trigger with no condition.
    pub fn new(event: GameEventKind, effect: Effect) -> Self {
        Self {
            event,
            condition: TriggerCondition::Always,
            effect,
            zone: TriggerZone::Battlefield,
        }
    }

    /// Set the condition (builder pattern).
    #[must_use]
    pub fn with_condition(mut self, condition: TriggerCondition) -> Self {
        self.condition = condition;
        self
    }

    /// Set the live zone (builder pattern).
    #[must_use]
    pub fn in_zone(mut self, zone: TriggerZone) -> Self {
        self.zone = zone;
        self
    }

    // === Common Shapes ===

    /// "When this enters the battlefield, ..."
    pub fn on_enter(effect: Effect) -> Self {
        Self::new(GameEventKind::EntersBattlefield, effect).with_condition(TriggerCondition::SourceIsSelf)
    }

    /// "When this dies, ..."
    pub fn on_death(effect: Effect) -> Self {
        Self::new(GameEventKind::Dies, effect)
            .with_condition(TriggerCondition::SourceIsSelf)
            .in_zone(TriggerZone::Graveyard)
    }

    /// "At the beginning of your upkeep, ..."
    pub fn on_upkeep(effect: Effect) -> Self {
        Self::new(GameEventKind::Upkeep, effect).with_condition(TriggerCondition::PlayerIsYou)
    }

    /// "Whenever this attacks, ..."
    pub fn on_attack(effect: Effect) -> Self {
        Self::new(GameEventKind::Attacks, effect).with_condition(TriggerCondition::SourceIsSelf)
    }

    /// "Whenever this deals combat damage to a player, ..."
    pub fn on_combat_damage_to_player(effect: Effect) -> Self {
        Self::new(GameEventKind::CombatDamage, effect).with_condition(
            TriggerCondition::SourceIsSelf.and(TriggerCondition::TargetIsOpponent),
        )
    }

    /// "Whenever you cast another spell, ..."
    pub fn on_cast(effect: Effect) -> Self {
        Self::new(GameEventKind::SpellCast, effect)
            .with_condition(TriggerCondition::PlayerIsYou.and(TriggerCondition::SourceIsOther))
    }
}

/// A trigger bound to the permanent that fired it.
///
/// Built by `collect_triggers`, resolved once and dropped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggeredAbility {
    pub trigger: Trigger,
    pub source: EntityId,
    pub source_name: String,
    pub controller: PlayerId,
}

/// Find every trigger that fires for `event`.
///
/// Order is APNAP: all of the active player's abilities, then the
/// non-active player's. Within one player, battlefield order comes first,
/// then graveyard order.
pub fn collect_triggers(state: &GameState, event: &GameEvent) -> Vec<TriggeredAbility> {
    let mut queue = Vec::new();

    for player in PlayerId::apnap(state.active_player) {
        let zones = &state.players[player].zones;
        for (zone, live) in [
            (Zone::Battlefield, TriggerZone::Battlefield),
            (Zone::Graveyard, TriggerZone::Graveyard),
        ] {
            for card in zones.cards(zone) {
                for trigger in &card.definition.triggers {
                    if trigger.zone != live || trigger.event != event.kind {
                        continue;
                    }
                    let ctx = ConditionContext::new(event, state, card.id, card.controller);
                    if !ConditionEvaluator::evaluate(&trigger.condition, &ctx) {
                        continue;
                    }
                    queue.push(TriggeredAbility {
                        trigger: trigger.clone(),
                        source: card.id,
                        source_name: card.name().to_string(),
                        controller: card.controller,
                    });
                }
            }
        }
    }

    queue
}

/// Nesting depth of the trigger cascade currently resolving.
///
/// Threaded through every resolution so that a trigger fired by another
/// trigger's effect resolves one level deeper.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TriggerChain {
    depth: u32,
    names: Vec<String>,
}

impl TriggerChain {
    /// The chain outside of any trigger.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Card names along the cascade, outermost first.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// One level deeper, or `UnboundedRecursion` past `max`.
    pub fn descend(&self, name: &str, max: u32) -> SimResult<Self> {
        let mut names = self.names.clone();
        names.push(name.to_string());
        let depth = self.depth + 1;

        if depth > max {
            return Err(SimError::UnboundedRecursion { depth, chain: names });
        }
        Ok(Self { depth, names })
    }
}

/// Collect and resolve every trigger for `event`, one after another.
///
/// Each ability resolves fully (including anything it fires in turn) before
/// the next one starts.
pub fn fire(state: &mut GameState, handlers: &mut Handlers, event: &GameEvent, chain: &TriggerChain) -> SimResult<()> {
    if state.is_game_over() {
        return Ok(());
    }

    let queue = collect_triggers(state, event);

    for ability in queue {
        if state.is_game_over() {
            break;
        }

        let nested = chain.descend(&ability.source_name, state.max_trigger_depth)?;
        debug!(
            "{} triggers on {} (depth {})",
            ability.source_name,
            event.kind.name(),
            nested.depth()
        );
        state
            .log
            .push(format!("{}'s ability triggers ({})", ability.source_name, event.kind.name()));

        let mut ctx = EffectContext::new(
            state,
            handlers,
            ability.controller,
            ability.source,
            ability.source_name.clone(),
            nested,
        );
        EffectResolver::resolve(&ability.trigger.effect, &mut ctx)?;
    }

    Ok(())
}
