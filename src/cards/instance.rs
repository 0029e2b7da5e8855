//! Card instances - runtime card state.
//!
//! A `CardInstance` is one concrete copy of a card in one game. It owns a
//! clone of its definition (decklists are never shared into a live game)
//! plus the mutable status the rules track: tapped, summoning sickness,
//! marked damage, counters, temporary pumps and loyalty.
//!
//! Instances live in exactly one zone (or on the stack) and are referenced
//! from elsewhere only by `EntityId`.

use serde::{Deserialize, Serialize};

use super::attributes::Keyword;
use super::definition::CardDefinition;
use crate::core::entity::EntityId;
use crate::core::player::PlayerId;

/// A card instance in a game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInstance {
    /// Unique entity ID for this instance.
    pub id: EntityId,

    /// Who started the game with this card (or created the token).
    pub owner: PlayerId,

    /// Who currently controls it.
    pub controller: PlayerId,

    /// Cloned definitional fields.
    pub definition: CardDefinition,

    pub tapped: bool,

    /// Entered the battlefield this turn.
    pub summoning_sick: bool,

    /// Damage marked this turn.
    pub damage: i32,

    /// Some of the marked damage came from a deathtouch source.
    pub deathtouch_damage: bool,

    /// Net +1/+1 counters.
    pub counters: i32,

    /// Until-end-of-turn modifiers.
    pub temp_power: i32,
    pub temp_toughness: i32,

    /// Current loyalty (planeswalkers).
    pub loyalty: i32,

    /// A loyalty ability was activated this turn.
    pub loyalty_used: bool,

    /// Indices of once-per-turn abilities used this turn.
    pub abilities_used: Vec<usize>,

    /// Exiled "on an adventure"; castable from exile.
    pub on_adventure: bool,
}

impl CardInstance {
    /// Create an instance with fresh identity from a definition.
    #[must_use]
    pub fn new(id: EntityId, owner: PlayerId, definition: &CardDefinition) -> Self {
        Self {
            id,
            owner,
            controller: owner,
            definition: definition.clone(),
            tapped: false,
            summoning_sick: false,
            damage: 0,
            deathtouch_damage: false,
            counters: 0,
            temp_power: 0,
            temp_toughness: 0,
            loyalty: definition.loyalty.unwrap_or(0),
            loyalty_used: false,
            abilities_used: Vec::new(),
            on_adventure: false,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    #[must_use]
    pub fn is_creature(&self) -> bool {
        self.definition.is_creature()
    }

    #[must_use]
    pub fn is_land(&self) -> bool {
        self.definition.is_land()
    }

    /// Printed keyword check (static grants are applied by `GameState`).
    #[must_use]
    pub fn has_keyword(&self, keyword: Keyword) -> bool {
        self.definition.has_keyword(keyword)
    }

    /// Power before static abilities from other permanents.
    #[must_use]
    pub fn base_power(&self) -> i32 {
        self.definition.power.unwrap_or(0) + self.counters + self.temp_power
    }

    /// Toughness before static abilities from other permanents.
    #[must_use]
    pub fn base_toughness(&self) -> i32 {
        self.definition.toughness.unwrap_or(0) + self.counters + self.temp_toughness
    }

    /// Clear everything that does not survive a zone change.
    pub fn reset_status(&mut self) {
        self.controller = self.owner;
        self.tapped = false;
        self.summoning_sick = false;
        self.damage = 0;
        self.deathtouch_damage = false;
        self.counters = 0;
        self.temp_power = 0;
        self.temp_toughness = 0;
        self.loyalty = self.definition.loyalty.unwrap_or(0);
        self.loyalty_used = false;
        self.abilities_used.clear();
        self.on_adventure = false;
    }

    /// Clear end-of-turn state (cleanup step).
    pub fn end_turn(&mut self) {
        self.damage = 0;
        self.deathtouch_damage = false;
        self.temp_power = 0;
        self.temp_toughness = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::ManaCost;

    fn bear() -> CardDefinition {
        CardDefinition::creature("Grizzly Bears", ManaCost::generic(2), 2, 2)
    }

    #[test]
    fn test_fresh_identity() {
        let def = bear();
        let a = CardInstance::new(EntityId(1), PlayerId::ONE, &def);
        let b = CardInstance::new(EntityId(2), PlayerId::TWO, &def);

        assert_ne!(a.id, b.id);
        assert_eq!(a.definition, b.definition);
        assert_eq!(b.controller, PlayerId::TWO);
    }

    #[test]
    fn test_stats_include_modifiers() {
        let mut card = CardInstance::new(EntityId(1), PlayerId::ONE, &bear());
        card.counters = 1;
        card.temp_power = 2;

        assert_eq!(card.base_power(), 5);
        assert_eq!(card.base_toughness(), 3);

        card.end_turn();
        assert_eq!(card.base_power(), 3);
    }

    #[test]
    fn test_reset_status_on_zone_change() {
        let mut card = CardInstance::new(EntityId(1), PlayerId::ONE, &bear());
        card.controller = PlayerId::TWO;
        card.tapped = true;
        card.damage = 1;
        card.counters = 2;

        card.reset_status();

        assert_eq!(card.controller, PlayerId::ONE);
        assert!(!card.tapped);
        assert_eq!(card.damage, 0);
        assert_eq!(card.counters, 0);
    }

    #[test]
    fn test_loyalty_from_definition() {
        let walker = CardDefinition::new("Teferi", crate::cards::CardTypes::PLANESWALKER).with_loyalty(4);
        let card = CardInstance::new(EntityId(3), PlayerId::ONE, &walker);
        assert_eq!(card.loyalty, 4);
    }
}
