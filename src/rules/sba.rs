//! State-based actions.
//!
//! Checked after every action, every stack resolution and each combat
//! damage pass. Repeats until a pass changes nothing, since a death can
//! create a token or shrink another creature.

use crate::core::{EntityId, GameState, PlayerId};
use crate::decision::Handlers;
use crate::error::SimResult;
use crate::triggers::TriggerChain;
use crate::zones::Zone;

use super::ops;

/// Apply state-based actions until the board is stable.
pub fn check_state_based_actions(state: &mut GameState, handlers: &mut Handlers) -> SimResult<()> {
    let mut chain = TriggerChain::root();
    loop {
        if state.is_game_over() || !apply_once(state, handlers, &chain)? {
            return Ok(());
        }
        chain = chain.descend("state-based actions", state.max_trigger_depth)?;
    }
}

/// Permanents that should go to the graveyard right now.
#[must_use]
pub fn doomed_permanents(state: &GameState) -> Vec<EntityId> {
    let mut doomed = Vec::new();

    for player in PlayerId::apnap(state.active_player) {
        let field = state.battlefield(player);

        for card in field {
            let dead = if card.is_creature() {
                let toughness = state.effective_toughness(card.id);
                toughness <= 0 || card.damage >= toughness || (card.damage > 0 && card.deathtouch_damage)
            } else {
                card.definition.is_planeswalker() && card.loyalty <= 0
            };
            if dead {
                doomed.push(card.id);
            }
        }

        // Legend rule: the newest copy stays.
        for (i, card) in field.iter().enumerate() {
            if !card.definition.is_legendary || doomed.contains(&card.id) {
                continue;
            }
            let newer = field[i + 1..].iter().any(|other| other.name() == card.name());
            if newer {
                doomed.push(card.id);
            }
        }
    }

    doomed
}

fn apply_once(state: &mut GameState, handlers: &mut Handlers, chain: &TriggerChain) -> SimResult<bool> {
    let mut changed = false;

    for id in doomed_permanents(state) {
        changed |= ops::remove_from_battlefield(state, handlers, chain, id, Zone::Graveyard)?;
    }

    for player in PlayerId::both() {
        for zone in [Zone::Hand, Zone::Library, Zone::Graveyard, Zone::Exile] {
            let tokens: Vec<EntityId> = state.players[player]
                .zones
                .cards(zone)
                .iter()
                .filter(|card| card.definition.is_token)
                .map(|card| card.id)
                .collect();
            for id in tokens {
                changed |= state.players[player].zones.take_from(zone, id).is_some();
            }
        }
    }

    Ok(changed)
}
