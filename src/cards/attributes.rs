//! Card characteristics: type flags, colors, mana costs, keywords.
//!
//! ## Key Types
//!
//! - `CardTypes`: bit-set of card types; a card may combine several
//!   (an Artifact Creature has both bits set)
//! - `ManaColor`: the five colors plus colorless mana
//! - `ManaCost`: generic plus per-color requirements, parsed from `{2}{U}{U}`
//! - `ManaAbility`: what a permanent adds when tapped for mana
//! - `Keyword`: evasion and combat abilities the engine understands

use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

use crate::error::DeckError;

/// Bit-set of card types.
///
/// ```
/// use duel_sim::cards::CardTypes;
///
/// let golem = CardTypes::ARTIFACT | CardTypes::CREATURE;
/// assert!(golem.contains(CardTypes::CREATURE));
/// assert!(golem.is_permanent());
/// assert!(!golem.contains(CardTypes::LAND));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardTypes(u8);

impl CardTypes {
    pub const NONE: CardTypes = CardTypes(0);
    pub const LAND: CardTypes = CardTypes(1 << 0);
    pub const CREATURE: CardTypes = CardTypes(1 << 1);
    pub const ENCHANTMENT: CardTypes = CardTypes(1 << 2);
    pub const INSTANT: CardTypes = CardTypes(1 << 3);
    pub const SORCERY: CardTypes = CardTypes(1 << 4);
    pub const ARTIFACT: CardTypes = CardTypes(1 << 5);
    pub const PLANESWALKER: CardTypes = CardTypes(1 << 6);

    const NAMES: [(CardTypes, &'static str); 7] = [
        (CardTypes::ARTIFACT, "Artifact"),
        (CardTypes::ENCHANTMENT, "Enchantment"),
        (CardTypes::LAND, "Land"),
        (CardTypes::PLANESWALKER, "Planeswalker"),
        (CardTypes::CREATURE, "Creature"),
        (CardTypes::INSTANT, "Instant"),
        (CardTypes::SORCERY, "Sorcery"),
    ];

    /// Check whether every bit of `other` is set.
    #[must_use]
    pub const fn contains(self, other: CardTypes) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    /// Check whether any bit of `other` is set.
    #[must_use]
    pub const fn intersects(self, other: CardTypes) -> bool {
        self.0 & other.0 != 0
    }

    /// Cards with these types stay on the battlefield after resolving.
    #[must_use]
    pub const fn is_permanent(self) -> bool {
        !self.intersects(CardTypes(CardTypes::INSTANT.0 | CardTypes::SORCERY.0)) && self.0 != 0
    }

    /// Type names in conventional type-line order.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        Self::NAMES
            .into_iter()
            .filter(move |(bit, _)| self.contains(*bit))
            .map(|(_, name)| name)
    }
}

impl BitOr for CardTypes {
    type Output = CardTypes;

    fn bitor(self, rhs: CardTypes) -> CardTypes {
        CardTypes(self.0 | rhs.0)
    }
}

impl BitOrAssign for CardTypes {
    fn bitor_assign(&mut self, rhs: CardTypes) {
        self.0 |= rhs.0;
    }
}

/// A kind of mana.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ManaColor {
    White,
    Blue,
    Black,
    Red,
    Green,
    Colorless,
}

impl ManaColor {
    /// The five colors, in WUBRG order.
    pub const COLORS: [ManaColor; 5] = [
        ManaColor::White,
        ManaColor::Blue,
        ManaColor::Black,
        ManaColor::Red,
        ManaColor::Green,
    ];

    /// Index into per-kind arrays (colorless last).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            ManaColor::White => 0,
            ManaColor::Blue => 1,
            ManaColor::Black => 2,
            ManaColor::Red => 3,
            ManaColor::Green => 4,
            ManaColor::Colorless => 5,
        }
    }

    /// Mana symbol letter.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            ManaColor::White => 'W',
            ManaColor::Blue => 'U',
            ManaColor::Black => 'B',
            ManaColor::Red => 'R',
            ManaColor::Green => 'G',
            ManaColor::Colorless => 'C',
        }
    }

    fn from_symbol(symbol: &str) -> Option<ManaColor> {
        match symbol {
            "W" => Some(ManaColor::White),
            "U" => Some(ManaColor::Blue),
            "B" => Some(ManaColor::Black),
            "R" => Some(ManaColor::Red),
            "G" => Some(ManaColor::Green),
            "C" => Some(ManaColor::Colorless),
            _ => None,
        }
    }
}

/// A mana cost: generic mana plus specific requirements per kind.
///
/// ```
/// use duel_sim::cards::{ManaColor, ManaCost};
///
/// let cost: ManaCost = "{2}{U}{U}".parse().unwrap();
/// assert_eq!(cost.generic, 2);
/// assert_eq!(cost.required(ManaColor::Blue), 2);
/// assert_eq!(cost.mana_value(), 4);
/// assert_eq!(cost.to_string(), "{2}{U}{U}");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManaCost {
    /// Payable with any kind of mana.
    pub generic: u32,
    /// Requirements indexed by `ManaColor::index`.
    pub specific: [u32; 6],
}

impl ManaCost {
    /// A cost of nothing.
    pub const FREE: ManaCost = ManaCost {
        generic: 0,
        specific: [0; 6],
    };

    /// A purely generic cost.
    #[must_use]
    pub const fn generic(amount: u32) -> Self {
        Self {
            generic: amount,
            specific: [0; 6],
        }
    }

    /// Add `amount` of a specific kind (builder pattern).
    #[must_use]
    pub fn plus(mut self, color: ManaColor, amount: u32) -> Self {
        self.specific[color.index()] += amount;
        self
    }

    /// How much of `color` this cost demands.
    #[must_use]
    pub const fn required(&self, color: ManaColor) -> u32 {
        self.specific[color.index()]
    }

    /// Total mana needed.
    #[must_use]
    pub fn mana_value(&self) -> u32 {
        self.generic + self.specific.iter().sum::<u32>()
    }

    #[must_use]
    pub fn is_free(&self) -> bool {
        self.mana_value() == 0
    }

    /// Colors that appear in this cost.
    pub fn colors(&self) -> impl Iterator<Item = ManaColor> + '_ {
        ManaColor::COLORS
            .into_iter()
            .filter(move |c| self.required(*c) > 0)
    }
}

impl FromStr for ManaCost {
    type Err = DeckError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = || DeckError::InvalidManaCost(text.to_string());
        let mut cost = ManaCost::FREE;
        let mut rest = text.trim();

        while !rest.is_empty() {
            let body = rest.strip_prefix('{').ok_or_else(invalid)?;
            let end = body.find('}').ok_or_else(invalid)?;
            let symbol = &body[..end];

            if let Ok(amount) = symbol.parse::<u32>() {
                cost.generic += amount;
            } else {
                let color = ManaColor::from_symbol(symbol).ok_or_else(invalid)?;
                cost.specific[color.index()] += 1;
            }
            rest = &body[end + 1..];
        }

        Ok(cost)
    }
}

impl std::fmt::Display for ManaCost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.generic > 0 || self.is_free() {
            write!(f, "{{{}}}", self.generic)?;
        }
        let kinds = ManaColor::COLORS.into_iter().chain([ManaColor::Colorless]);
        for color in kinds {
            for _ in 0..self.required(color) {
                write!(f, "{{{}}}", color.symbol())?;
            }
        }
        Ok(())
    }
}

/// A mana ability: tap to add `amount` mana of one of `produces`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManaAbility {
    pub produces: SmallVec<[ManaColor; 2]>,
    pub amount: u32,
}

impl ManaAbility {
    /// Tap for one mana of a single kind.
    #[must_use]
    pub fn single(color: ManaColor) -> Self {
        Self {
            produces: smallvec![color],
            amount: 1,
        }
    }

    /// Tap for one mana of any listed kind.
    #[must_use]
    pub fn choice(colors: &[ManaColor]) -> Self {
        Self {
            produces: colors.iter().copied().collect(),
            amount: 1,
        }
    }

    #[must_use]
    pub fn can_produce(&self, color: ManaColor) -> bool {
        self.produces.contains(&color)
    }
}

/// Keyword abilities the engine implements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Keyword {
    Flying,
    Reach,
    Haste,
    Vigilance,
    Trample,
    Lifelink,
    Deathtouch,
    FirstStrike,
    Defender,
    Menace,
    Hexproof,
    Unblockable,
    /// May be cast any time its controller has priority.
    Flash,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_types_combine() {
        let mut types = CardTypes::ARTIFACT;
        types |= CardTypes::CREATURE;

        assert!(types.contains(CardTypes::ARTIFACT));
        assert!(types.contains(CardTypes::CREATURE));
        assert!(!types.contains(CardTypes::INSTANT));
        assert_eq!(types.names().collect::<Vec<_>>(), vec!["Artifact", "Creature"]);
    }

    #[test]
    fn test_permanence() {
        assert!(CardTypes::LAND.is_permanent());
        assert!(CardTypes::PLANESWALKER.is_permanent());
        assert!(!CardTypes::INSTANT.is_permanent());
        assert!(!CardTypes::SORCERY.is_permanent());
        assert!(!CardTypes::NONE.is_permanent());
    }

    #[test]
    fn test_parse_mana_cost() {
        let cost: ManaCost = "{3}{B}{G}".parse().unwrap();
        assert_eq!(cost.generic, 3);
        assert_eq!(cost.required(ManaColor::Black), 1);
        assert_eq!(cost.required(ManaColor::Green), 1);
        assert_eq!(cost.mana_value(), 5);
        assert_eq!(cost.colors().collect::<Vec<_>>(), vec![ManaColor::Black, ManaColor::Green]);
    }

    #[test]
    fn test_parse_empty_cost_is_free() {
        let cost: ManaCost = "".parse().unwrap();
        assert!(cost.is_free());
        assert_eq!(cost.to_string(), "{0}");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(
            "{2}{Q}".parse::<ManaCost>(),
            Err(DeckError::InvalidManaCost("{2}{Q}".into()))
        );
        assert!("2U".parse::<ManaCost>().is_err());
        assert!("{2".parse::<ManaCost>().is_err());
    }

    #[test]
    fn test_builder_matches_parse() {
        let built = ManaCost::generic(1).plus(ManaColor::Red, 1);
        let parsed: ManaCost = "{1}{R}".parse().unwrap();
        assert_eq!(built, parsed);
    }

    #[test]
    fn test_mana_ability_choice() {
        let dual = ManaAbility::choice(&[ManaColor::Blue, ManaColor::Red]);
        assert!(dual.can_produce(ManaColor::Red));
        assert!(!dual.can_produce(ManaColor::Green));
    }
}
