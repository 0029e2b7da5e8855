//! Decklists: ordered card definitions supplied by collaborators.
//!
//! A `Decklist` is a read-only template. Runners clone each definition
//! into a fresh `CardInstance` per game, so one decklist can feed any
//! number of concurrent games.

use serde::{Deserialize, Serialize};

use super::definition::CardDefinition;
use crate::error::DeckError;

/// An ordered list of card definitions, one entry per copy.
///
/// ```
/// use duel_sim::cards::{CardDefinition, Decklist};
///
/// let deck = Decklist::new("Mono Green")
///     .with_copies(CardDefinition::basic_land("Forest"), 20);
///
/// assert_eq!(deck.len(), 20);
/// assert!(deck.validate().is_ok());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decklist {
    pub name: String,
    pub cards: Vec<CardDefinition>,
}

impl Decklist {
    /// Create an empty decklist.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cards: Vec::new(),
        }
    }

    /// Add one copy (builder pattern).
    #[must_use]
    pub fn with_card(mut self, card: CardDefinition) -> Self {
        self.cards.push(card);
        self
    }

    /// Add `count` copies (builder pattern).
    #[must_use]
    pub fn with_copies(mut self, card: CardDefinition, count: usize) -> Self {
        self.cards.extend(std::iter::repeat(card).take(count));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Reject decklists the engine cannot simulate.
    pub fn validate(&self) -> Result<(), DeckError> {
        if self.cards.is_empty() {
            return Err(DeckError::Empty(self.name.clone()));
        }
        for card in &self.cards {
            validate_card(card)?;
        }
        Ok(())
    }
}

fn validate_card(card: &CardDefinition) -> Result<(), DeckError> {
    if card.is_creature() && (card.power.is_none() || card.toughness.is_none()) {
        return Err(DeckError::MissingStats(card.name.clone()));
    }
    if card.is_planeswalker() && card.loyalty.is_none() {
        return Err(DeckError::MissingLoyalty(card.name.clone()));
    }
    if card.activated.iter().any(|a| a.is_unbounded()) {
        return Err(DeckError::UnboundedAbility {
            card: card.name.clone(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{ActivatedAbility, CardTypes, ManaCost};
    use crate::effects::Effect;

    #[test]
    fn test_empty_deck_rejected() {
        let deck = Decklist::new("Nothing");
        assert_eq!(deck.validate(), Err(DeckError::Empty("Nothing".into())));
    }

    #[test]
    fn test_statless_creature_rejected() {
        let broken = CardDefinition::new("Mystery Beast", CardTypes::CREATURE);
        let deck = Decklist::new("Broken").with_card(broken);
        assert_eq!(deck.validate(), Err(DeckError::MissingStats("Mystery Beast".into())));
    }

    #[test]
    fn test_free_repeatable_ability_rejected() {
        let engine = CardDefinition::new("Perpetual Engine", CardTypes::ARTIFACT).with_activated(
            ActivatedAbility::new("Draw", ManaCost::FREE, Effect::DrawCards { count: 1 }),
        );
        let deck = Decklist::new("Loop").with_card(engine);
        assert!(matches!(deck.validate(), Err(DeckError::UnboundedAbility { .. })));
    }

    #[test]
    fn test_copies_preserve_order() {
        let deck = Decklist::new("Mixed")
            .with_copies(CardDefinition::basic_land("Island"), 2)
            .with_card(CardDefinition::basic_land("Swamp"));

        let names: Vec<_> = deck.cards.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Island", "Island", "Swamp"]);
    }
}
