//! A small catalog of ready-made cards and decks.
//!
//! Real card data comes from collaborators; these exist so the engine can be
//! exercised end to end (doc examples, integration tests, benchmarks
//! against known matchups).

use super::attributes::{CardTypes, Keyword, ManaAbility, ManaColor, ManaCost};
use super::decklist::Decklist;
use super::definition::{ActivatedAbility, Adventure, CardDefinition, FetchAbility, SpellAbility, StaticAbility};
use crate::effects::{Controller, Effect, PlayerSelector, TargetSpec};
use crate::triggers::Trigger;
use crate::zones::Zone;

fn cost(generic: u32, color: ManaColor, amount: u32) -> ManaCost {
    ManaCost::generic(generic).plus(color, amount)
}

// === Lands ===

pub fn basic(name: &str) -> CardDefinition {
    CardDefinition::basic_land(name)
}

/// Pay 1 life, sacrifice: fetch a land with either subtype.
pub fn fetch_land(name: &str, first: &str, second: &str) -> CardDefinition {
    CardDefinition::new(name, CardTypes::LAND).with_fetch(FetchAbility {
        life_cost: 1,
        land_types: vec![first.to_string(), second.to_string()],
        tapped: false,
    })
}

/// Taps for either of two colors.
pub fn dual_land(name: &str, first: ManaColor, second: ManaColor) -> CardDefinition {
    CardDefinition::new(name, CardTypes::LAND).with_mana_ability(ManaAbility::choice(&[first, second]))
}

// === Creatures ===

pub fn grizzly_bears() -> CardDefinition {
    CardDefinition::creature("Grizzly Bears", cost(1, ManaColor::Green, 1), 2, 2).with_subtypes(["Bear"])
}

pub fn llanowar_elves() -> CardDefinition {
    CardDefinition::creature("Llanowar Elves", cost(0, ManaColor::Green, 1), 1, 1)
        .with_subtypes(["Elf", "Druid"])
        .with_mana_ability(ManaAbility::single(ManaColor::Green))
}

pub fn goblin_guide() -> CardDefinition {
    CardDefinition::creature("Goblin Guide", cost(0, ManaColor::Red, 1), 2, 2)
        .with_subtypes(["Goblin", "Scout"])
        .with_keyword(Keyword::Haste)
}

pub fn serra_angel() -> CardDefinition {
    CardDefinition::creature("Serra Angel", cost(3, ManaColor::White, 2), 4, 4)
        .with_subtypes(["Angel"])
        .with_keyword(Keyword::Flying)
        .with_keyword(Keyword::Vigilance)
}

pub fn giant_spider() -> CardDefinition {
    CardDefinition::creature("Giant Spider", cost(3, ManaColor::Green, 1), 2, 4)
        .with_subtypes(["Spider"])
        .with_keyword(Keyword::Reach)
}

pub fn typhoid_rats() -> CardDefinition {
    CardDefinition::creature("Typhoid Rats", cost(0, ManaColor::Black, 1), 1, 1)
        .with_subtypes(["Rat"])
        .with_keyword(Keyword::Deathtouch)
}

/// ETB: draw a card.
pub fn elvish_visionary() -> CardDefinition {
    CardDefinition::creature("Elvish Visionary", cost(1, ManaColor::Green, 1), 1, 1)
        .with_subtypes(["Elf", "Shaman"])
        .with_trigger(Trigger::on_enter(Effect::draw(1)))
}

/// ETB: a 1/1 Goblin token.
pub fn goblin_instigator() -> CardDefinition {
    CardDefinition::creature("Goblin Instigator", cost(1, ManaColor::Red, 1), 1, 1)
        .with_subtypes(["Goblin", "Rogue"])
        .with_trigger(Trigger::on_enter(Effect::CreateToken {
            token: Box::new(goblin_token()),
            count: 1,
        }))
}

pub fn goblin_token() -> CardDefinition {
    CardDefinition::token("Goblin", 1, 1).with_subtypes(["Goblin"])
}

/// Other Goblins you control get +1/+1.
pub fn goblin_king() -> CardDefinition {
    CardDefinition::creature("Goblin King", cost(1, ManaColor::Red, 2), 2, 2)
        .with_subtypes(["Goblin"])
        .with_static(StaticAbility::Anthem {
            power: 1,
            toughness: 1,
            subtype: Some("Goblin".into()),
        })
}

/// Ninjutsu {1}{U}; draws a card when it connects.
pub fn ninja_of_the_deep_hours() -> CardDefinition {
    CardDefinition::creature("Ninja of the Deep Hours", cost(3, ManaColor::Blue, 1), 2, 2)
        .with_subtypes(["Human", "Ninja"])
        .with_ninjutsu(cost(1, ManaColor::Blue, 1))
        .with_trigger(Trigger::on_combat_damage_to_player(Effect::draw(1)))
}

/// Stomp (adventure): 2 damage to any target.
pub fn bonecrusher_giant() -> CardDefinition {
    CardDefinition::creature("Bonecrusher Giant", cost(2, ManaColor::Red, 1), 4, 3)
        .with_subtypes(["Giant"])
        .with_adventure(Adventure {
            name: "Stomp".into(),
            mana_cost: cost(1, ManaColor::Red, 1),
            instant: true,
            spell: SpellAbility::new(Effect::burn(2)),
        })
}

/// Cycling {2}.
pub fn desert_cerodon() -> CardDefinition {
    CardDefinition::creature("Desert Cerodon", cost(5, ManaColor::Red, 1), 6, 4)
        .with_subtypes(["Beast"])
        .with_cycling(ManaCost::generic(2))
}

/// {T}: deal 1 damage to any target.
pub fn prodigal_pyromancer() -> CardDefinition {
    CardDefinition::creature("Prodigal Pyromancer", cost(2, ManaColor::Red, 1), 1, 1)
        .with_subtypes(["Human", "Wizard"])
        .with_activated(ActivatedAbility::new("Ping", ManaCost::FREE, Effect::burn(1)).with_tap())
}

pub fn ria_sky_captain() -> CardDefinition {
    CardDefinition::creature("Ria, Sky Captain", cost(2, ManaColor::Blue, 1), 3, 3)
        .with_subtypes(["Human", "Pirate"])
        .with_keyword(Keyword::Flying)
        .legendary()
}

// === Planeswalkers ===

/// +1: 2 damage to any target. -3: destroy target creature.
pub fn chandra_pyromaster() -> CardDefinition {
    CardDefinition::new("Chandra, Pyromaster", CardTypes::PLANESWALKER)
        .with_cost(cost(2, ManaColor::Red, 2))
        .legendary()
        .with_loyalty(4)
        .with_loyalty_ability(1, Effect::burn(2))
        .with_loyalty_ability(
            -3,
            Effect::Destroy {
                target: TargetSpec::Creature(Controller::Opponent),
            },
        )
}

// === Instants & Sorceries ===

pub fn lightning_bolt() -> CardDefinition {
    CardDefinition::instant("Lightning Bolt", cost(0, ManaColor::Red, 1), Effect::burn(3))
}

pub fn lava_spike() -> CardDefinition {
    CardDefinition::sorcery(
        "Lava Spike",
        cost(0, ManaColor::Red, 1),
        Effect::damage(3, TargetSpec::Player(Controller::Opponent)),
    )
}

pub fn counterspell() -> CardDefinition {
    CardDefinition::instant(
        "Counterspell",
        cost(0, ManaColor::Blue, 2),
        Effect::CounterSpell {
            target: TargetSpec::Spell(Controller::Opponent),
        },
    )
}

pub fn murder() -> CardDefinition {
    CardDefinition::instant(
        "Murder",
        cost(1, ManaColor::Black, 2),
        Effect::Destroy {
            target: TargetSpec::Creature(Controller::Any),
        },
    )
}

pub fn giant_growth() -> CardDefinition {
    CardDefinition::instant(
        "Giant Growth",
        cost(0, ManaColor::Green, 1),
        Effect::Pump {
            power: 3,
            toughness: 3,
            target: TargetSpec::Creature(Controller::You),
        },
    )
}

pub fn divination() -> CardDefinition {
    CardDefinition::sorcery("Divination", cost(2, ManaColor::Blue, 1), Effect::draw(2))
}

/// Draw a card; flashback {2}{U}.
pub fn think_twice() -> CardDefinition {
    CardDefinition::instant("Think Twice", cost(1, ManaColor::Blue, 1), Effect::draw(1))
        .with_flashback(cost(2, ManaColor::Blue, 1))
}

pub fn mind_rot() -> CardDefinition {
    CardDefinition::sorcery(
        "Mind Rot",
        cost(2, ManaColor::Black, 1),
        Effect::Discard {
            count: 2,
            who: PlayerSelector::Opponent,
        },
    )
}

pub fn rampant_growth() -> CardDefinition {
    CardDefinition::sorcery(
        "Rampant Growth",
        cost(1, ManaColor::Green, 1),
        Effect::SearchLibrary {
            land_types: Vec::new(),
            to: Zone::Battlefield,
            tapped: true,
        },
    )
}

// === Decks ===

/// Nothing but basic lands; games end at the turn ceiling.
pub fn lands_only(name: &str, land: &str) -> Decklist {
    Decklist::new(name).with_copies(basic(land), 60)
}

/// Mountains, burn spells and hasty creatures.
pub fn red_burn() -> Decklist {
    Decklist::new("Red Burn")
        .with_copies(basic("Mountain"), 20)
        .with_copies(lightning_bolt(), 16)
        .with_copies(lava_spike(), 16)
        .with_copies(goblin_guide(), 8)
}

pub fn green_stompy() -> Decklist {
    Decklist::new("Green Stompy")
        .with_copies(basic("Forest"), 22)
        .with_copies(llanowar_elves(), 8)
        .with_copies(grizzly_bears(), 12)
        .with_copies(giant_spider(), 8)
        .with_copies(giant_growth(), 6)
        .with_copies(elvish_visionary(), 4)
}

pub fn blue_tempo() -> Decklist {
    Decklist::new("Blue Tempo")
        .with_copies(basic("Island"), 20)
        .with_copies(basic("Swamp"), 4)
        .with_copies(counterspell(), 8)
        .with_copies(ria_sky_captain(), 4)
        .with_copies(ninja_of_the_deep_hours(), 8)
        .with_copies(think_twice(), 8)
        .with_copies(divination(), 4)
        .with_copies(murder(), 4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_decks_validate() {
        for deck in [red_burn(), green_stompy(), blue_tempo(), lands_only("Plains", "Plains")] {
            assert!(deck.validate().is_ok(), "{} should be valid", deck.name);
            assert_eq!(deck.len(), 60, "{} should have 60 cards", deck.name);
        }
    }

    #[test]
    fn test_catalog_cards_are_well_formed() {
        assert!(bonecrusher_giant().adventure.is_some());
        assert_eq!(chandra_pyromaster().loyalty, Some(4));
        assert_eq!(chandra_pyromaster().type_line, "Legendary Planeswalker");
        assert!(fetch_land("Wooded Foothills", "Mountain", "Forest").fetch.is_some());
        assert!(think_twice().is_instant_speed());
        assert!(goblin_token().is_token);
    }
}
