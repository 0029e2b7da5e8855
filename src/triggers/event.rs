//! Game event types.
//!
//! Events describe something that just happened. The engine raises them
//! at fixed points (zone changes, casts, draws, combat damage, upkeep) and
//! the trigger scan matches them against every live `Trigger`.

use serde::{Deserialize, Serialize};

use crate::core::{EntityId, PlayerId};
use crate::zones::Zone;

/// The kinds of events triggers can listen for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameEventKind {
    /// A permanent entered the battlefield. Source: the permanent.
    EntersBattlefield,
    /// A permanent left the battlefield. Source: the card, `to`: its new zone.
    LeavesBattlefield,
    /// A creature went from the battlefield to a graveyard.
    Dies,
    /// A spell was cast. Source: the spell card, player: its caster.
    SpellCast,
    /// Combat damage was dealt. Source: the creature, target: what it hit.
    CombatDamage,
    /// A card was drawn. Player: who drew it.
    CardDrawn,
    /// The upkeep step began. Player: the active player.
    Upkeep,
    /// A creature was declared as an attacker.
    Attacks,
    /// The end step began. Player: the active player.
    EndStep,
}

impl GameEventKind {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            GameEventKind::EntersBattlefield => "enters the battlefield",
            GameEventKind::LeavesBattlefield => "leaves the battlefield",
            GameEventKind::Dies => "dies",
            GameEventKind::SpellCast => "spell cast",
            GameEventKind::CombatDamage => "combat damage",
            GameEventKind::CardDrawn => "card drawn",
            GameEventKind::Upkeep => "upkeep",
            GameEventKind::Attacks => "attacks",
            GameEventKind::EndStep => "end step",
        }
    }
}

/// What an event was aimed at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventTarget {
    Card(EntityId),
    Player(PlayerId),
}

/// A game event with contextual data.
///
/// ## Event Data
///
/// - `kind`: what happened
/// - `source`: the card that did it or that it happened to
/// - `target`: the card or player affected, if any
/// - `player`: the player associated with the event
/// - `amount`: damage dealt, cards drawn, and so on
/// - `to`: destination zone for zone-change events
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    pub kind: GameEventKind,
    pub source: Option<EntityId>,
    pub target: Option<EventTarget>,
    pub player: Option<PlayerId>,
    pub amount: i32,
    pub to: Option<Zone>,
}

impl GameEvent {
    /// Create a new event with just a kind.
    pub fn new(kind: GameEventKind) -> Self {
        Self {
            kind,
            source: None,
            target: None,
            player: None,
            amount: 0,
            to: None,
        }
    }

    /// Set the source card (builder pattern).
    #[must_use]
    pub fn with_source(mut self, source: EntityId) -> Self {
        self.source = Some(source);
        self
    }

    /// Set the target (builder pattern).
    #[must_use]
    pub fn with_target(mut self, target: EventTarget) -> Self {
        self.target = Some(target);
        self
    }

    /// Set the associated player (builder pattern).
    #[must_use]
    pub fn with_player(mut self, player: PlayerId) -> Self {
        self.player = Some(player);
        self
    }

    /// Set the amount (builder pattern).
    #[must_use]
    pub fn with_amount(mut self, amount: i32) -> Self {
        self.amount = amount;
        self
    }

    /// Set the destination zone (builder pattern).
    #[must_use]
    pub fn with_destination(mut self, to: Zone) -> Self {
        self.to = Some(to);
        self
    }
}

/// Builders for the events the engine raises.
impl GameEvent {
    pub fn enters_battlefield(card: EntityId, controller: PlayerId) -> Self {
        Self::new(GameEventKind::EntersBattlefield)
            .with_source(card)
            .with_player(controller)
    }

    pub fn leaves_battlefield(card: EntityId, controller: PlayerId, to: Zone) -> Self {
        Self::new(GameEventKind::LeavesBattlefield)
            .with_source(card)
            .with_player(controller)
            .with_destination(to)
    }

    pub fn dies(card: EntityId, controller: PlayerId) -> Self {
        Self::new(GameEventKind::Dies)
            .with_source(card)
            .with_player(controller)
            .with_destination(Zone::Graveyard)
    }

    pub fn spell_cast(card: EntityId, caster: PlayerId) -> Self {
        Self::new(GameEventKind::SpellCast)
            .with_source(card)
            .with_player(caster)
    }

    pub fn combat_damage(source: EntityId, target: EventTarget, controller: PlayerId, amount: i32) -> Self {
        Self::new(GameEventKind::CombatDamage)
            .with_source(source)
            .with_target(target)
            .with_player(controller)
            .with_amount(amount)
    }

    pub fn card_drawn(player: PlayerId, card: EntityId) -> Self {
        Self::new(GameEventKind::CardDrawn)
            .with_source(card)
            .with_player(player)
            .with_amount(1)
    }

    pub fn upkeep(active: PlayerId) -> Self {
        Self::new(GameEventKind::Upkeep).with_player(active)
    }

    pub fn attacks(attacker: EntityId, controller: PlayerId) -> Self {
        Self::new(GameEventKind::Attacks)
            .with_source(attacker)
            .with_player(controller)
    }

    pub fn end_step(active: PlayerId) -> Self {
        Self::new(GameEventKind::EndStep).with_player(active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_builder() {
        let event = GameEvent::new(GameEventKind::CombatDamage)
            .with_source(EntityId(5))
            .with_target(EventTarget::Player(PlayerId::TWO))
            .with_player(PlayerId::ONE)
            .with_amount(3);

        assert_eq!(event.source, Some(EntityId(5)));
        assert_eq!(event.target, Some(EventTarget::Player(PlayerId::TWO)));
        assert_eq!(event.amount, 3);
        assert_eq!(event.to, None);
    }

    #[test]
    fn test_zone_change_builders() {
        let died = GameEvent::dies(EntityId(9), PlayerId::TWO);
        assert_eq!(died.kind, GameEventKind::Dies);
        assert_eq!(died.to, Some(Zone::Graveyard));

        let bounced = GameEvent::leaves_battlefield(EntityId(9), PlayerId::TWO, Zone::Hand);
        assert_eq!(bounced.to, Some(Zone::Hand));
    }

    #[test]
    fn test_serialization() {
        let event = GameEvent::card_drawn(PlayerId::ONE, EntityId(12));
        let json = serde_json::to_string(&event).unwrap();
        let back: GameEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }
}
