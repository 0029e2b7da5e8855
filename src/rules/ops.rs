//! Primitive game operations shared by the engine, effects and combat.
//!
//! Every zone change that other cards can observe goes through here so the
//! matching events fire exactly once, at the right chain depth.

use crate::cards::{CardDefinition, CardInstance, Keyword};
use crate::core::{EntityId, GameState, PlayerId};
use crate::decision::Handlers;
use crate::effects::Target;
use crate::error::{SimError, SimResult};
use crate::stack::{CastMode, StackEntryId, StackItem};
use crate::triggers::{self, EventTarget, GameEvent, TriggerChain};
use crate::zones::{Zone, ZonePosition};

/// Draw `count` cards from the top of the library.
///
/// Drawing from an empty library marks the player and stops; the terminal
/// check decides the game.
pub fn draw_cards(
    state: &mut GameState,
    handlers: &mut Handlers,
    chain: &TriggerChain,
    player: PlayerId,
    count: u32,
) -> SimResult<()> {
    for _ in 0..count {
        if state.is_game_over() {
            break;
        }

        let Some(card) = state.players[player].zones.take_top(Zone::Library) else {
            state.players[player].drew_from_empty = true;
            state
                .log
                .push(format!("{} cannot draw from an empty library", state.player_name(player)));
            state.check_terminal();
            break;
        };

        let id = card.id;
        state.players[player].zones.put(Zone::Hand, card, ZonePosition::Bottom);
        state.log.push(format!("{} draws a card", state.player_name(player)));
        triggers::fire(state, handlers, &GameEvent::card_drawn(player, id), chain)?;
    }
    Ok(())
}

/// Put a card onto the battlefield under `controller`'s control.
pub fn put_onto_battlefield(
    state: &mut GameState,
    handlers: &mut Handlers,
    chain: &TriggerChain,
    mut card: CardInstance,
    controller: PlayerId,
    tapped: bool,
) -> SimResult<()> {
    card.reset_status();
    card.controller = controller;
    card.tapped = tapped;
    card.summoning_sick = true;

    let id = card.id;
    state.log.push(format!(
        "{} enters the battlefield{}",
        card.name(),
        if tapped { " tapped" } else { "" }
    ));
    state.players[controller]
        .zones
        .put(Zone::Battlefield, card, ZonePosition::Bottom);

    triggers::fire(state, handlers, &GameEvent::enters_battlefield(id, controller), chain)
}

/// Move a permanent from the battlefield to its owner's `to` zone.
///
/// Returns false if the card was not on the battlefield.
pub fn remove_from_battlefield(
    state: &mut GameState,
    handlers: &mut Handlers,
    chain: &TriggerChain,
    id: EntityId,
    to: Zone,
) -> SimResult<bool> {
    let Some((holder, Zone::Battlefield)) = state.locate(id) else {
        return Ok(false);
    };
    let Some(mut card) = state.players[holder].zones.take_from(Zone::Battlefield, id) else {
        return Ok(false);
    };

    let controller = card.controller;
    let owner = card.owner;
    let dies = card.is_creature() && to == Zone::Graveyard;
    card.reset_status();
    state.combat.remove(id);

    let verb = match to {
        Zone::Graveyard if dies => "dies",
        Zone::Graveyard => "is put into the graveyard",
        Zone::Hand => "returns to its owner's hand",
        Zone::Exile => "is exiled",
        Zone::Library => "is put into its owner's library",
        Zone::Battlefield => "flickers",
    };
    state.log.push(format!("{} {}", card.name(), verb));
    state.players[owner].zones.put(to, card, ZonePosition::Bottom);

    triggers::fire(state, handlers, &GameEvent::leaves_battlefield(id, controller, to), chain)?;
    if dies {
        triggers::fire(state, handlers, &GameEvent::dies(id, controller), chain)?;
    }
    Ok(true)
}

/// Deal damage from `source` to a player or permanent.
///
/// Lifelink and deathtouch are read from the source; combat damage also
/// fires `CombatDamage`.
pub fn deal_damage(
    state: &mut GameState,
    handlers: &mut Handlers,
    chain: &TriggerChain,
    source: EntityId,
    target: Target,
    amount: i32,
    combat: bool,
) -> SimResult<()> {
    if amount <= 0 || state.is_game_over() {
        return Ok(());
    }

    let (source_name, controller) = match state.card(source) {
        Some(card) => (card.name().to_string(), card.controller),
        None => ("An effect".to_string(), state.active_player),
    };
    let lifelink = state.has_keyword(source, Keyword::Lifelink);
    let deathtouch = state.has_keyword(source, Keyword::Deathtouch);

    let hit = match target {
        Target::Player(player) => {
            state.log.push(format!(
                "{} deals {} damage to {}",
                source_name,
                amount,
                state.player_name(player)
            ));
            state.adjust_life(player, -amount);
            EventTarget::Player(player)
        }
        Target::Card(id) => {
            if !matches!(state.locate(id), Some((_, Zone::Battlefield))) {
                return Ok(());
            }
            let Some(card) = state.card_mut(id) else {
                return Ok(());
            };
            if card.is_creature() {
                card.damage += amount;
                card.deathtouch_damage |= deathtouch;
            } else if card.definition.is_planeswalker() {
                card.loyalty -= amount;
            }
            let line = format!("{} deals {} damage to {}", source_name, amount, card.name());
            state.log.push(line);
            EventTarget::Card(id)
        }
        Target::Spell(_) => return Ok(()),
    };

    if lifelink {
        state.log.push(format!(
            "{} gains {} life (lifelink)",
            state.player_name(controller),
            amount
        ));
        state.adjust_life(controller, amount);
    }

    if combat {
        triggers::fire(
            state,
            handlers,
            &GameEvent::combat_damage(source, hit, controller, amount),
            chain,
        )?;
    }
    Ok(())
}

/// Create `count` copies of a token.
pub fn create_tokens(
    state: &mut GameState,
    handlers: &mut Handlers,
    chain: &TriggerChain,
    controller: PlayerId,
    token: &CardDefinition,
    count: u32,
) -> SimResult<()> {
    for _ in 0..count {
        let id = state.allocate_id();
        let mut card = CardInstance::new(id, controller, token);
        card.definition.is_token = true;
        state.log.push(format!(
            "{} creates a {} token",
            state.player_name(controller),
            token.name
        ));
        put_onto_battlefield(state, handlers, chain, card, controller, false)?;
    }
    Ok(())
}

/// Discard `count` cards, chosen by the discarding player's handler.
///
/// With `count` or fewer cards in hand the whole hand goes without asking.
pub fn discard(state: &mut GameState, handlers: &mut Handlers, player: PlayerId, count: usize) -> SimResult<()> {
    let hand: Vec<EntityId> = state.hand(player).iter().map(|card| card.id).collect();
    if count == 0 || hand.is_empty() {
        return Ok(());
    }

    let chosen = if hand.len() <= count {
        hand
    } else {
        let choice = handlers[player].choose_discard(state, player, count);
        validate_discard(player, &hand, &choice, count)?;
        choice
    };

    for id in chosen {
        if let Some(card) = state.players[player].zones.take_from(Zone::Hand, id) {
            state
                .log
                .push(format!("{} discards {}", state.player_name(player), card.name()));
            state.players[player].zones.put(Zone::Graveyard, card, ZonePosition::Bottom);
        }
    }
    Ok(())
}

fn validate_discard(player: PlayerId, hand: &[EntityId], choice: &[EntityId], count: usize) -> SimResult<()> {
    let illegal = |detail: String| SimError::IllegalChoice {
        player,
        decision: "discard",
        detail,
    };

    if choice.len() != count {
        return Err(illegal(format!("expected {count} cards, got {}", choice.len())));
    }
    for (i, id) in choice.iter().enumerate() {
        if !hand.contains(id) {
            return Err(illegal(format!("{id} is not in hand")));
        }
        if choice[..i].contains(id) {
            return Err(illegal(format!("{id} chosen twice")));
        }
    }
    Ok(())
}

/// Put the top `count` cards of a library into the graveyard.
pub fn mill(state: &mut GameState, player: PlayerId, count: u32) {
    for _ in 0..count {
        let Some(card) = state.players[player].zones.take_top(Zone::Library) else {
            break;
        };
        state
            .log
            .push(format!("{} mills {}", state.player_name(player), card.name()));
        state.players[player].zones.put(Zone::Graveyard, card, ZonePosition::Bottom);
    }
}

/// Remove a spell from the stack without resolving it.
///
/// Returns false if the entry is already gone.
pub fn counter_spell(state: &mut GameState, entry: StackEntryId) -> bool {
    let Some(entry) = state.stack.remove(entry) else {
        return false;
    };
    state.log.push(format!("{} is countered", entry.name()));

    if let StackItem::Spell { mut card, mode } = entry.item {
        let to = if mode == CastMode::Flashback {
            Zone::Exile
        } else {
            Zone::Graveyard
        };
        card.reset_status();
        let owner = card.owner;
        state.players[owner].zones.put(to, card, ZonePosition::Bottom);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{catalog, ManaCost};
    use crate::core::SimConfig;
    use crate::decision::{handler_pair, PassiveHandler, ScriptedHandler};
    use crate::effects::Effect;
    use crate::triggers::Trigger;

    fn setup() -> (GameState, Handlers) {
        (
            GameState::new(["Ann", "Bo"], &SimConfig::default()),
            handler_pair(PassiveHandler, PassiveHandler),
        )
    }

    fn place(state: &mut GameState, owner: PlayerId, zone: Zone, def: &CardDefinition) -> EntityId {
        let id = state.allocate_id();
        state.players[owner]
            .zones
            .put(zone, CardInstance::new(id, owner, def), ZonePosition::Bottom);
        id
    }

    #[test]
    fn test_draw_from_empty_library_loses() {
        let (mut state, mut handlers) = setup();
        place(&mut state, PlayerId::ONE, Zone::Library, &catalog::basic("Island"));

        draw_cards(&mut state, &mut handlers, &TriggerChain::root(), PlayerId::ONE, 2).unwrap();

        assert_eq!(state.hand(PlayerId::ONE).len(), 1);
        assert!(state.players[PlayerId::ONE].drew_from_empty);
        assert_eq!(state.winner(), Some(PlayerId::TWO));
    }

    #[test]
    fn test_enter_trigger_fires() {
        let (mut state, mut handlers) = setup();
        place(&mut state, PlayerId::ONE, Zone::Library, &catalog::basic("Forest"));
        let id = state.allocate_id();
        let visionary = CardInstance::new(id, PlayerId::ONE, &catalog::elvish_visionary());

        put_onto_battlefield(&mut state, &mut handlers, &TriggerChain::root(), visionary, PlayerId::ONE, false)
            .unwrap();

        assert!(state.card(id).unwrap().summoning_sick);
        assert_eq!(state.hand(PlayerId::ONE).len(), 1);
    }

    #[test]
    fn test_death_trigger_from_graveyard() {
        let (mut state, mut handlers) = setup();
        let martyr = CardDefinition::creature("Doomed Traveler", ManaCost::generic(1), 1, 1)
            .with_trigger(Trigger::on_death(Effect::gain_life(3)));
        let id = place(&mut state, PlayerId::ONE, Zone::Battlefield, &martyr);

        let moved = remove_from_battlefield(&mut state, &mut handlers, &TriggerChain::root(), id, Zone::Graveyard)
            .unwrap();

        assert!(moved);
        assert_eq!(state.locate(id), Some((PlayerId::ONE, Zone::Graveyard)));
        assert_eq!(state.players[PlayerId::ONE].life, 23);

        // Second removal is a no-op.
        assert!(!remove_from_battlefield(&mut state, &mut handlers, &TriggerChain::root(), id, Zone::Exile).unwrap());
    }

    #[test]
    fn test_lifelink_and_deathtouch() {
        let (mut state, mut handlers) = setup();
        let vampire = CardDefinition::creature("Vampire Nighthawk", ManaCost::generic(3), 2, 3)
            .with_keyword(Keyword::Lifelink)
            .with_keyword(Keyword::Deathtouch);
        let source = place(&mut state, PlayerId::ONE, Zone::Battlefield, &vampire);
        let victim = place(&mut state, PlayerId::TWO, Zone::Battlefield, &catalog::serra_angel());

        deal_damage(&mut state, &mut handlers, &TriggerChain::root(), source, Target::Card(victim), 2, true).unwrap();

        let angel = state.card(victim).unwrap();
        assert_eq!(angel.damage, 2);
        assert!(angel.deathtouch_damage);
        assert_eq!(state.players[PlayerId::ONE].life, 22);
    }

    #[test]
    fn test_damage_to_planeswalker_removes_loyalty() {
        let (mut state, mut handlers) = setup();
        let bolt = place(&mut state, PlayerId::ONE, Zone::Graveyard, &catalog::lightning_bolt());
        let walker = place(&mut state, PlayerId::TWO, Zone::Battlefield, &catalog::chandra_pyromaster());

        deal_damage(&mut state, &mut handlers, &TriggerChain::root(), bolt, Target::Card(walker), 3, false).unwrap();
        assert_eq!(state.card(walker).unwrap().loyalty, 1);
    }

    #[test]
    fn test_discard_whole_hand_without_asking() {
        let (mut state, mut handlers) = setup();
        place(&mut state, PlayerId::TWO, Zone::Hand, &catalog::basic("Swamp"));

        discard(&mut state, &mut handlers, PlayerId::TWO, 2).unwrap();
        assert!(state.hand(PlayerId::TWO).is_empty());
        assert_eq!(state.players[PlayerId::TWO].zones.len(Zone::Graveyard), 1);
    }

    #[test]
    fn test_bad_discard_choice_fails() {
        let mut state = GameState::new(["Ann", "Bo"], &SimConfig::default());
        let mut handlers = handler_pair(PassiveHandler, ScriptedHandler::new(Vec::new()).with_discards(vec![EntityId(777)]));
        for _ in 0..3 {
            place(&mut state, PlayerId::TWO, Zone::Hand, &catalog::basic("Swamp"));
        }

        let err = discard(&mut state, &mut handlers, PlayerId::TWO, 1).unwrap_err();
        assert!(matches!(err, SimError::IllegalChoice { decision: "discard", .. }));
    }

    #[test]
    fn test_tokens_are_marked() {
        let (mut state, mut handlers) = setup();
        create_tokens(
            &mut state,
            &mut handlers,
            &TriggerChain::root(),
            PlayerId::ONE,
            &CardDefinition::creature("Soldier", ManaCost::FREE, 1, 1),
            2,
        )
        .unwrap();

        let field = state.battlefield(PlayerId::ONE);
        assert_eq!(field.len(), 2);
        assert!(field.iter().all(|card| card.definition.is_token));
    }

    #[test]
    fn test_counter_flashback_spell_exiles() {
        let (mut state, _) = setup();
        let id = state.allocate_id();
        let card = CardInstance::new(id, PlayerId::ONE, &catalog::think_twice());
        let entry = state.stack.push(
            PlayerId::ONE,
            StackItem::Spell {
                card,
                mode: CastMode::Flashback,
            },
            None,
        );

        assert!(counter_spell(&mut state, entry));
        assert!(state.stack.is_empty());
        assert_eq!(state.locate(id), Some((PlayerId::ONE, Zone::Exile)));
        assert!(!counter_spell(&mut state, entry));
    }

    #[test]
    fn test_mill_stops_at_empty_library() {
        let (mut state, _) = setup();
        place(&mut state, PlayerId::TWO, Zone::Library, &catalog::basic("Island"));
        mill(&mut state, PlayerId::TWO, 3);
        assert_eq!(state.players[PlayerId::TWO].zones.len(Zone::Graveyard), 1);
        assert!(!state.players[PlayerId::TWO].drew_from_empty);
    }
}
