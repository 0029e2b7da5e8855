//! Per-player zones that own card instances.
//!
//! Each zone is an ordered `Vec<CardInstance>`. A card lives in exactly one
//! zone; moving it is a `take` followed by a `put`, which transfers
//! ownership of the instance rather than copying it.
//!
//! Library order is significant: index 0 is the top card.

use serde::{Deserialize, Serialize};

use crate::cards::CardInstance;
use crate::core::{EntityId, GameRng};

/// A named location holding cards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    Library,
    Hand,
    Battlefield,
    Graveyard,
    Exile,
}

impl Zone {
    pub const ALL: [Zone; 5] = [
        Zone::Library,
        Zone::Hand,
        Zone::Battlefield,
        Zone::Graveyard,
        Zone::Exile,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Zone::Library => "library",
            Zone::Hand => "hand",
            Zone::Battlefield => "battlefield",
            Zone::Graveyard => "graveyard",
            Zone::Exile => "exile",
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Position for inserting a card into an ordered zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZonePosition {
    /// Index 0 (top of library).
    Top,
    /// End of the zone (bottom of library, newest permanent).
    Bottom,
}

/// The zones of one player.
///
/// ## Usage
///
/// ```
/// use duel_sim::cards::{CardDefinition, CardInstance};
/// use duel_sim::core::{EntityId, PlayerId};
/// use duel_sim::zones::{PlayerZones, Zone, ZonePosition};
///
/// let forest = CardDefinition::basic_land("Forest");
/// let mut zones = PlayerZones::default();
/// zones.put(Zone::Library, CardInstance::new(EntityId(1), PlayerId::ONE, &forest), ZonePosition::Bottom);
/// zones.put(Zone::Library, CardInstance::new(EntityId(2), PlayerId::ONE, &forest), ZonePosition::Bottom);
///
/// let top = zones.take_top(Zone::Library).unwrap();
/// assert_eq!(top.id, EntityId(1));
/// assert_eq!(zones.len(Zone::Library), 1);
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PlayerZones {
    pub library: Vec<CardInstance>,
    pub hand: Vec<CardInstance>,
    pub battlefield: Vec<CardInstance>,
    pub graveyard: Vec<CardInstance>,
    pub exile: Vec<CardInstance>,
}

impl PlayerZones {
    /// Cards in a zone, in order.
    #[must_use]
    pub fn cards(&self, zone: Zone) -> &[CardInstance] {
        match zone {
            Zone::Library => &self.library,
            Zone::Hand => &self.hand,
            Zone::Battlefield => &self.battlefield,
            Zone::Graveyard => &self.graveyard,
            Zone::Exile => &self.exile,
        }
    }

    fn cards_mut(&mut self, zone: Zone) -> &mut Vec<CardInstance> {
        match zone {
            Zone::Library => &mut self.library,
            Zone::Hand => &mut self.hand,
            Zone::Battlefield => &mut self.battlefield,
            Zone::Graveyard => &mut self.graveyard,
            Zone::Exile => &mut self.exile,
        }
    }

    #[must_use]
    pub fn len(&self, zone: Zone) -> usize {
        self.cards(zone).len()
    }

    /// Total cards across every zone.
    #[must_use]
    pub fn total(&self) -> usize {
        Zone::ALL.iter().map(|z| self.len(*z)).sum()
    }

    /// Non-token cards across every zone.
    #[must_use]
    pub fn total_nontoken(&self) -> usize {
        Zone::ALL
            .iter()
            .flat_map(|z| self.cards(*z))
            .filter(|c| !c.definition.is_token)
            .count()
    }

    /// Which zone holds `id`, if any.
    #[must_use]
    pub fn locate(&self, id: EntityId) -> Option<Zone> {
        Zone::ALL
            .into_iter()
            .find(|zone| self.cards(*zone).iter().any(|c| c.id == id))
    }

    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&CardInstance> {
        Zone::ALL
            .iter()
            .find_map(|zone| self.cards(*zone).iter().find(|c| c.id == id))
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut CardInstance> {
        let zone = self.locate(id)?;
        self.cards_mut(zone).iter_mut().find(|c| c.id == id)
    }

    /// Look up a card only if it is in `zone`.
    #[must_use]
    pub fn get_in(&self, zone: Zone, id: EntityId) -> Option<&CardInstance> {
        self.cards(zone).iter().find(|c| c.id == id)
    }

    pub fn get_in_mut(&mut self, zone: Zone, id: EntityId) -> Option<&mut CardInstance> {
        self.cards_mut(zone).iter_mut().find(|c| c.id == id)
    }

    /// Remove a card from whichever zone holds it, keeping the rest in order.
    pub fn take(&mut self, id: EntityId) -> Option<(Zone, CardInstance)> {
        let zone = self.locate(id)?;
        let cards = self.cards_mut(zone);
        let idx = cards.iter().position(|c| c.id == id)?;
        Some((zone, cards.remove(idx)))
    }

    /// Remove a card only if it is in `zone`.
    pub fn take_from(&mut self, zone: Zone, id: EntityId) -> Option<CardInstance> {
        let cards = self.cards_mut(zone);
        let idx = cards.iter().position(|c| c.id == id)?;
        Some(cards.remove(idx))
    }

    /// Remove the top card of a zone.
    pub fn take_top(&mut self, zone: Zone) -> Option<CardInstance> {
        let cards = self.cards_mut(zone);
        if cards.is_empty() {
            None
        } else {
            Some(cards.remove(0))
        }
    }

    /// Insert a card into a zone.
    pub fn put(&mut self, zone: Zone, card: CardInstance, position: ZonePosition) {
        let cards = self.cards_mut(zone);
        match position {
            ZonePosition::Top => cards.insert(0, card),
            ZonePosition::Bottom => cards.push(card),
        }
    }

    /// Drain every card of a zone, in order.
    pub fn drain(&mut self, zone: Zone) -> Vec<CardInstance> {
        std::mem::take(self.cards_mut(zone))
    }

    /// Permanents on the battlefield, mutable.
    pub fn battlefield_mut(&mut self) -> impl Iterator<Item = &mut CardInstance> {
        self.battlefield.iter_mut()
    }

    /// Shuffle the library.
    pub fn shuffle_library(&mut self, rng: &mut GameRng) {
        rng.shuffle(&mut self.library);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardDefinition;
    use crate::core::PlayerId;

    fn card(id: u32) -> CardInstance {
        CardInstance::new(EntityId(id), PlayerId::ONE, &CardDefinition::basic_land("Island"))
    }

    #[test]
    fn test_put_positions() {
        let mut zones = PlayerZones::default();
        zones.put(Zone::Library, card(1), ZonePosition::Bottom);
        zones.put(Zone::Library, card(2), ZonePosition::Top);
        zones.put(Zone::Library, card(3), ZonePosition::Bottom);

        let order: Vec<_> = zones.cards(Zone::Library).iter().map(|c| c.id.raw()).collect();
        assert_eq!(order, vec![2, 1, 3]);
    }

    #[test]
    fn test_move_transfers_ownership() {
        let mut zones = PlayerZones::default();
        zones.put(Zone::Hand, card(7), ZonePosition::Bottom);

        let (from, moved) = zones.take(EntityId(7)).unwrap();
        assert_eq!(from, Zone::Hand);
        zones.put(Zone::Battlefield, moved, ZonePosition::Bottom);

        assert_eq!(zones.locate(EntityId(7)), Some(Zone::Battlefield));
        assert_eq!(zones.len(Zone::Hand), 0);
        assert_eq!(zones.total(), 1);
    }

    #[test]
    fn test_take_from_wrong_zone() {
        let mut zones = PlayerZones::default();
        zones.put(Zone::Graveyard, card(4), ZonePosition::Bottom);

        assert!(zones.take_from(Zone::Hand, EntityId(4)).is_none());
        assert!(zones.take_from(Zone::Graveyard, EntityId(4)).is_some());
    }

    #[test]
    fn test_take_top_empty() {
        let mut zones = PlayerZones::default();
        assert!(zones.take_top(Zone::Library).is_none());
    }

    #[test]
    fn test_shuffle_keeps_cards() {
        let mut zones = PlayerZones::default();
        for id in 1..=20 {
            zones.put(Zone::Library, card(id), ZonePosition::Bottom);
        }
        zones.shuffle_library(&mut GameRng::new(5));

        let mut ids: Vec<_> = zones.library.iter().map(|c| c.id.raw()).collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=20).collect::<Vec<_>>());
    }
}
