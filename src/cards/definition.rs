//! Card definitions - static card data supplied by decklists.
//!
//! `CardDefinition` holds everything a collaborator declares about a card:
//! name, types, cost, stats, keywords, triggers and the optional abilities
//! the engine knows how to run (spells, activated abilities, cycling,
//! flashback, loyalty, ninjutsu, adventures, fetching).
//!
//! Instance-specific data (tapped, damage, counters) lives in
//! `CardInstance`.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::attributes::{CardTypes, Keyword, ManaAbility, ManaColor, ManaCost};
use crate::effects::{Effect, TargetSpec};
use crate::triggers::Trigger;

/// The effect an instant or sorcery (or an adventure half) performs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellAbility {
    pub effect: Effect,
}

impl SpellAbility {
    pub fn new(effect: Effect) -> Self {
        Self { effect }
    }

    /// What the spell targets when cast.
    #[must_use]
    pub fn target(&self) -> &TargetSpec {
        self.effect.target_spec()
    }
}

/// An activated ability with a mana and/or tap cost.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivatedAbility {
    pub label: String,
    pub cost: ManaCost,
    /// Requires tapping the source.
    pub tap: bool,
    /// Requires sacrificing the source.
    pub sacrifice: bool,
    /// Usable only once each turn.
    pub once_per_turn: bool,
    /// Usable only at sorcery speed.
    pub sorcery_speed: bool,
    pub effect: Effect,
}

impl ActivatedAbility {
    pub fn new(label: impl Into<String>, cost: ManaCost, effect: Effect) -> Self {
        Self {
            label: label.into(),
            cost,
            tap: false,
            sacrifice: false,
            once_per_turn: false,
            sorcery_speed: false,
            effect,
        }
    }

    #[must_use]
    pub fn with_tap(mut self) -> Self {
        self.tap = true;
        self
    }

    #[must_use]
    pub fn with_sacrifice(mut self) -> Self {
        self.sacrifice = true;
        self
    }

    #[must_use]
    pub fn once_per_turn(mut self) -> Self {
        self.once_per_turn = true;
        self
    }

    #[must_use]
    pub fn sorcery_speed(mut self) -> Self {
        self.sorcery_speed = true;
        self
    }

    /// Could be activated any number of times for free.
    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        self.cost.is_free() && !self.tap && !self.sacrifice && !self.once_per_turn
    }
}

/// A planeswalker loyalty ability.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoyaltyAbility {
    /// Loyalty added (positive) or removed (negative) as the cost.
    pub loyalty: i32,
    pub effect: Effect,
}

/// Tap, pay life, sacrifice: search for a land with one of the subtypes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchAbility {
    pub life_cost: i32,
    pub land_types: Vec<String>,
    /// The fetched land enters tapped.
    pub tapped: bool,
}

/// The adventure half of a card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adventure {
    pub name: String,
    pub mana_cost: ManaCost,
    /// Instant-speed adventure; sorcery speed otherwise.
    pub instant: bool,
    pub spell: SpellAbility,
}

/// Continuous effects a permanent applies while on the battlefield.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StaticAbility {
    /// Other creatures you control (optionally of one subtype) get +P/+T.
    Anthem {
        power: i32,
        toughness: i32,
        subtype: Option<String>,
    },
    /// Creatures you control have a keyword.
    GrantKeyword(Keyword),
}

/// Static card definition.
///
/// ## Example
///
/// ```
/// use duel_sim::cards::{CardDefinition, CardTypes, Keyword};
///
/// let drake = CardDefinition::creature("Wind Drake", "{2}{U}".parse().unwrap(), 2, 2)
///     .with_subtypes(["Drake"])
///     .with_keyword(Keyword::Flying);
///
/// assert!(drake.types.contains(CardTypes::CREATURE));
/// assert_eq!(drake.type_line, "Creature - Drake");
/// assert!(drake.has_keyword(Keyword::Flying));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDefinition {
    pub name: String,
    pub type_line: String,
    pub types: CardTypes,
    pub subtypes: Vec<String>,
    pub mana_cost: ManaCost,
    pub mana_ability: Option<ManaAbility>,
    pub power: Option<i32>,
    pub toughness: Option<i32>,
    pub keywords: SmallVec<[Keyword; 4]>,
    pub triggers: Vec<Trigger>,
    pub statics: Vec<StaticAbility>,
    pub is_token: bool,
    pub is_legendary: bool,
    pub fetch: Option<FetchAbility>,

    /// Effect of an instant or sorcery.
    pub spell: Option<SpellAbility>,
    pub activated: Vec<ActivatedAbility>,
    pub cycling: Option<ManaCost>,
    pub flashback: Option<ManaCost>,
    /// Starting loyalty for planeswalkers.
    pub loyalty: Option<i32>,
    pub loyalty_abilities: Vec<LoyaltyAbility>,
    pub ninjutsu: Option<ManaCost>,
    pub adventure: Option<Adventure>,
}

impl CardDefinition {
    /// Create a bare definition of the given types.
    #[must_use]
    pub fn new(name: impl Into<String>, types: CardTypes) -> Self {
        let mut card = Self {
            name: name.into(),
            type_line: String::new(),
            types,
            subtypes: Vec::new(),
            mana_cost: ManaCost::FREE,
            mana_ability: None,
            power: None,
            toughness: None,
            keywords: SmallVec::new(),
            triggers: Vec::new(),
            statics: Vec::new(),
            is_token: false,
            is_legendary: false,
            fetch: None,
            spell: None,
            activated: Vec::new(),
            cycling: None,
            flashback: None,
            loyalty: None,
            loyalty_abilities: Vec::new(),
            ninjutsu: None,
            adventure: None,
        };
        card.refresh_type_line();
        card
    }

    /// A basic land; the mana it taps for follows its name.
    #[must_use]
    pub fn basic_land(name: &str) -> Self {
        let color = match name {
            "Plains" => ManaColor::White,
            "Island" => ManaColor::Blue,
            "Swamp" => ManaColor::Black,
            "Mountain" => ManaColor::Red,
            "Forest" => ManaColor::Green,
            _ => ManaColor::Colorless,
        };
        Self::new(name, CardTypes::LAND)
            .with_subtypes([name])
            .with_mana_ability(ManaAbility::single(color))
    }

    /// A vanilla creature.
    #[must_use]
    pub fn creature(name: &str, cost: ManaCost, power: i32, toughness: i32) -> Self {
        Self::new(name, CardTypes::CREATURE)
            .with_cost(cost)
            .with_stats(power, toughness)
    }

    /// An instant with an effect.
    #[must_use]
    pub fn instant(name: &str, cost: ManaCost, effect: Effect) -> Self {
        Self::new(name, CardTypes::INSTANT)
            .with_cost(cost)
            .with_spell(effect)
    }

    /// A sorcery with an effect.
    #[must_use]
    pub fn sorcery(name: &str, cost: ManaCost, effect: Effect) -> Self {
        Self::new(name, CardTypes::SORCERY)
            .with_cost(cost)
            .with_spell(effect)
    }

    /// A creature token.
    #[must_use]
    pub fn token(name: &str, power: i32, toughness: i32) -> Self {
        let mut token = Self::new(name, CardTypes::CREATURE).with_stats(power, toughness);
        token.is_token = true;
        token
    }

    fn refresh_type_line(&mut self) {
        let mut line = String::new();
        if self.is_legendary {
            line.push_str("Legendary ");
        }
        if self.is_token {
            line.push_str("Token ");
        }
        line.push_str(&self.types.names().collect::<Vec<_>>().join(" "));
        if !self.subtypes.is_empty() {
            line.push_str(" - ");
            line.push_str(&self.subtypes.join(" "));
        }
        self.type_line = line;
    }

    // === Builders ===

    #[must_use]
    pub fn with_cost(mut self, cost: ManaCost) -> Self {
        self.mana_cost = cost;
        self
    }

    #[must_use]
    pub fn with_stats(mut self, power: i32, toughness: i32) -> Self {
        self.power = Some(power);
        self.toughness = Some(toughness);
        self
    }

    #[must_use]
    pub fn with_subtypes<S: Into<String>>(mut self, subtypes: impl IntoIterator<Item = S>) -> Self {
        self.subtypes.extend(subtypes.into_iter().map(Into::into));
        self.refresh_type_line();
        self
    }

    #[must_use]
    pub fn with_keyword(mut self, keyword: Keyword) -> Self {
        if !self.keywords.contains(&keyword) {
            self.keywords.push(keyword);
        }
        self
    }

    #[must_use]
    pub fn with_mana_ability(mut self, ability: ManaAbility) -> Self {
        self.mana_ability = Some(ability);
        self
    }

    #[must_use]
    pub fn with_trigger(mut self, trigger: Trigger) -> Self {
        self.triggers.push(trigger);
        self
    }

    #[must_use]
    pub fn with_static(mut self, ability: StaticAbility) -> Self {
        self.statics.push(ability);
        self
    }

    #[must_use]
    pub fn legendary(mut self) -> Self {
        self.is_legendary = true;
        self.refresh_type_line();
        self
    }

    #[must_use]
    pub fn with_spell(mut self, effect: Effect) -> Self {
        self.spell = Some(SpellAbility::new(effect));
        self
    }

    #[must_use]
    pub fn with_activated(mut self, ability: ActivatedAbility) -> Self {
        self.activated.push(ability);
        self
    }

    #[must_use]
    pub fn with_cycling(mut self, cost: ManaCost) -> Self {
        self.cycling = Some(cost);
        self
    }

    #[must_use]
    pub fn with_flashback(mut self, cost: ManaCost) -> Self {
        self.flashback = Some(cost);
        self
    }

    #[must_use]
    pub fn with_loyalty(mut self, loyalty: i32) -> Self {
        self.loyalty = Some(loyalty);
        self
    }

    #[must_use]
    pub fn with_loyalty_ability(mut self, loyalty: i32, effect: Effect) -> Self {
        self.loyalty_abilities.push(LoyaltyAbility { loyalty, effect });
        self
    }

    #[must_use]
    pub fn with_ninjutsu(mut self, cost: ManaCost) -> Self {
        self.ninjutsu = Some(cost);
        self
    }

    #[must_use]
    pub fn with_adventure(mut self, adventure: Adventure) -> Self {
        self.adventure = Some(adventure);
        self
    }

    #[must_use]
    pub fn with_fetch(mut self, fetch: FetchAbility) -> Self {
        self.fetch = Some(fetch);
        self
    }

    // === Queries ===

    #[must_use]
    pub fn is_land(&self) -> bool {
        self.types.contains(CardTypes::LAND)
    }

    #[must_use]
    pub fn is_creature(&self) -> bool {
        self.types.contains(CardTypes::CREATURE)
    }

    #[must_use]
    pub fn is_planeswalker(&self) -> bool {
        self.types.contains(CardTypes::PLANESWALKER)
    }

    /// Castable whenever its controller has priority.
    #[must_use]
    pub fn is_instant_speed(&self) -> bool {
        self.types.contains(CardTypes::INSTANT) || self.has_keyword(Keyword::Flash)
    }

    #[must_use]
    pub fn has_keyword(&self, keyword: Keyword) -> bool {
        self.keywords.contains(&keyword)
    }

    #[must_use]
    pub fn has_subtype(&self, subtype: &str) -> bool {
        self.subtypes.iter().any(|s| s == subtype)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::TargetSpec;

    #[test]
    fn test_basic_land_mana() {
        let island = CardDefinition::basic_land("Island");
        assert!(island.is_land());
        assert_eq!(island.type_line, "Land - Island");
        assert!(island.mana_ability.unwrap().can_produce(ManaColor::Blue));
    }

    #[test]
    fn test_legendary_type_line() {
        let captain = CardDefinition::creature("Ria, Sky Captain", ManaCost::generic(3), 3, 3)
            .with_subtypes(["Human", "Pirate"])
            .legendary();
        assert_eq!(captain.type_line, "Legendary Creature - Human Pirate");
        assert!(captain.is_legendary);
    }

    #[test]
    fn test_token_definition() {
        let goblin = CardDefinition::token("Goblin", 1, 1);
        assert!(goblin.is_token);
        assert_eq!(goblin.power, Some(1));
        assert!(goblin.type_line.starts_with("Token Creature"));
    }

    #[test]
    fn test_instant_speed() {
        let bolt = CardDefinition::instant(
            "Lightning Bolt",
            ManaCost::FREE.plus(ManaColor::Red, 1),
            Effect::DealDamage { amount: 3, target: TargetSpec::Any },
        );
        assert!(bolt.is_instant_speed());
        assert_eq!(bolt.spell.as_ref().unwrap().target(), &TargetSpec::Any);

        let flasher = CardDefinition::creature("Ambush Viper", ManaCost::generic(2), 2, 1)
            .with_keyword(Keyword::Flash);
        assert!(flasher.is_instant_speed());
    }

    #[test]
    fn test_unbounded_ability_detection() {
        let free = ActivatedAbility::new("Draw", ManaCost::FREE, Effect::DrawCards { count: 1 });
        assert!(free.is_unbounded());
        assert!(!free.clone().with_tap().is_unbounded());
        assert!(!free.once_per_turn().is_unbounded());
    }

    #[test]
    fn test_serialization() {
        let card = CardDefinition::creature("Grizzly Bears", ManaCost::generic(1).plus(ManaColor::Green, 1), 2, 2);
        let json = serde_json::to_string(&card).unwrap();
        let back: CardDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(card, back);
    }
}
