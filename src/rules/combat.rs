//! Combat: attacker and blocker declaration, then damage.
//!
//! Attack and block declarations come from the decision handlers and are
//! validated here. Damage is computed for every combatant first and then
//! applied, so creatures trade simultaneously. First strikers deal their
//! damage in an earlier pass, followed by state-based actions.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cards::Keyword;
use crate::core::{EntityId, GameState, PlayerId};
use crate::decision::Handlers;
use crate::effects::Target;
use crate::error::{SimError, SimResult};
use crate::triggers::{self, GameEvent, TriggerChain};
use crate::zones::Zone;

use super::{ops, sba};

/// One blocker assigned to one attacker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block {
    pub blocker: EntityId,
    pub attacker: EntityId,
}

/// Attackers and blocks for the current combat.
#[derive(Clone, Debug, Default)]
pub struct CombatState {
    /// Attacking creatures in declaration order.
    pub attackers: Vec<EntityId>,
    /// Blockers per blocked attacker, in damage assignment order. An
    /// attacker stays blocked even if all of its blockers leave.
    blocks: FxHashMap<EntityId, Vec<EntityId>>,
}

impl CombatState {
    pub fn clear(&mut self) {
        self.attackers.clear();
        self.blocks.clear();
    }

    /// Drop a creature that left the battlefield from combat.
    pub fn remove(&mut self, id: EntityId) {
        self.attackers.retain(|a| *a != id);
        self.blocks.remove(&id);
        for blockers in self.blocks.values_mut() {
            blockers.retain(|b| *b != id);
        }
    }

    #[must_use]
    pub fn is_attacking(&self, id: EntityId) -> bool {
        self.attackers.contains(&id)
    }

    #[must_use]
    pub fn is_blocked(&self, attacker: EntityId) -> bool {
        self.blocks.contains_key(&attacker)
    }

    #[must_use]
    pub fn blockers_of(&self, attacker: EntityId) -> &[EntityId] {
        self.blocks.get(&attacker).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Attackers no creature blocked.
    pub fn unblocked(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.attackers.iter().copied().filter(|a| !self.is_blocked(*a))
    }

    fn add_block(&mut self, block: Block) {
        self.blocks.entry(block.attacker).or_default().push(block.blocker);
    }
}

/// Creatures `player` could attack with.
#[must_use]
pub fn attack_candidates(state: &GameState, player: PlayerId) -> Vec<EntityId> {
    state
        .battlefield(player)
        .iter()
        .filter(|card| {
            card.is_creature()
                && !card.tapped
                && !state.has_keyword(card.id, Keyword::Defender)
                && (!card.summoning_sick || state.has_keyword(card.id, Keyword::Haste))
        })
        .map(|card| card.id)
        .collect()
}

/// Untapped creatures `player` could block with.
#[must_use]
pub fn block_candidates(state: &GameState, player: PlayerId) -> Vec<EntityId> {
    state
        .battlefield(player)
        .iter()
        .filter(|card| card.is_creature() && !card.tapped)
        .map(|card| card.id)
        .collect()
}

/// Whether `blocker` may block `attacker`, considering evasion.
#[must_use]
pub fn can_block(state: &GameState, blocker: EntityId, attacker: EntityId) -> bool {
    let Some(card) = state.card(blocker) else {
        return false;
    };
    if !card.is_creature() || card.tapped || !state.combat.is_attacking(attacker) {
        return false;
    }
    if state.has_keyword(attacker, Keyword::Unblockable) {
        return false;
    }
    if state.has_keyword(attacker, Keyword::Flying) {
        return state.has_keyword(blocker, Keyword::Flying) || state.has_keyword(blocker, Keyword::Reach);
    }
    true
}

/// Check a full block declaration. Returns a description of the first
/// problem found.
pub fn validate_blocks(state: &GameState, candidates: &[EntityId], blocks: &[Block]) -> Result<(), String> {
    for (i, block) in blocks.iter().enumerate() {
        if !candidates.contains(&block.blocker) {
            return Err(format!("{} cannot block", block.blocker));
        }
        if blocks[..i].iter().any(|b| b.blocker == block.blocker) {
            return Err(format!("{} blocks twice", block.blocker));
        }
        if !can_block(state, block.blocker, block.attacker) {
            return Err(format!("{} cannot block {}", block.blocker, block.attacker));
        }
    }

    for attacker in &state.combat.attackers {
        let count = blocks.iter().filter(|b| b.attacker == *attacker).count();
        if count == 1 && state.has_keyword(*attacker, Keyword::Menace) {
            return Err(format!("{attacker} has menace and needs two or more blockers"));
        }
    }
    Ok(())
}

/// Ask the active player for attackers, then tap them and fire `Attacks`.
pub fn declare_attackers(state: &mut GameState, handlers: &mut Handlers) -> SimResult<()> {
    state.combat.clear();
    let player = state.active_player;
    let candidates = attack_candidates(state, player);
    if candidates.is_empty() {
        return Ok(());
    }

    let chosen = handlers[player].choose_attackers(state, player, &candidates);
    for (i, id) in chosen.iter().enumerate() {
        if !candidates.contains(id) || chosen[..i].contains(id) {
            return Err(SimError::IllegalChoice {
                player,
                decision: "attackers",
                detail: format!("{id} cannot attack"),
            });
        }
    }

    for id in &chosen {
        let vigilance = state.has_keyword(*id, Keyword::Vigilance);
        if let Some(card) = state.card_mut(*id) {
            card.tapped |= !vigilance;
            let line = format!("{} attacks", card.name());
            state.log.push(line);
        }
        state.combat.attackers.push(*id);
    }

    for id in chosen {
        triggers::fire(state, handlers, &GameEvent::attacks(id, player), &TriggerChain::root())?;
    }
    Ok(())
}

/// Ask the defending player for blocks.
pub fn declare_blockers(state: &mut GameState, handlers: &mut Handlers) -> SimResult<()> {
    let player = state.non_active_player();
    let attackers = state.combat.attackers.clone();
    let candidates = block_candidates(state, player);
    if attackers.is_empty() || candidates.is_empty() {
        return Ok(());
    }

    let blocks = handlers[player].choose_blockers(state, player, &attackers, &candidates);
    validate_blocks(state, &candidates, &blocks).map_err(|detail| SimError::IllegalChoice {
        player,
        decision: "blockers",
        detail,
    })?;

    for block in blocks {
        let names = (state.card(block.blocker), state.card(block.attacker));
        if let (Some(blocker), Some(attacker)) = names {
            let line = format!("{} blocks {}", blocker.name(), attacker.name());
            state.log.push(line);
        }
        state.combat.add_block(block);
    }
    Ok(())
}

/// Both damage passes with state-based actions in between.
pub fn resolve_combat_damage(state: &mut GameState, handlers: &mut Handlers) -> SimResult<()> {
    let first_strike = state
        .combat
        .attackers
        .iter()
        .chain(state.combat.blocks.values().flatten())
        .any(|id| state.has_keyword(*id, Keyword::FirstStrike));

    if first_strike {
        damage_pass(state, handlers, true)?;
        sba::check_state_based_actions(state, handlers)?;
    }
    damage_pass(state, handlers, false)
}

fn on_battlefield(state: &GameState, id: EntityId) -> bool {
    matches!(state.locate(id), Some((_, Zone::Battlefield)))
}

/// Work out every combat damage assignment of one pass.
fn assign_damage(state: &GameState, first_strike: bool) -> Vec<(EntityId, Target, i32)> {
    let defender = state.non_active_player();
    let strikes_now = |id: EntityId| state.has_keyword(id, Keyword::FirstStrike) == first_strike;
    let mut assignments = Vec::new();

    for &attacker in &state.combat.attackers {
        if !on_battlefield(state, attacker) {
            continue;
        }
        let blockers: Vec<EntityId> = state
            .combat
            .blockers_of(attacker)
            .iter()
            .copied()
            .filter(|b| on_battlefield(state, *b))
            .collect();

        for &blocker in &blockers {
            let power = state.effective_power(blocker);
            if strikes_now(blocker) && power > 0 {
                assignments.push((blocker, Target::Card(attacker), power));
            }
        }

        let power = state.effective_power(attacker);
        if !strikes_now(attacker) || power <= 0 {
            continue;
        }

        let trample = state.has_keyword(attacker, Keyword::Trample);
        if !state.combat.is_blocked(attacker) {
            assignments.push((attacker, Target::Player(defender), power));
            continue;
        }

        let deathtouch = state.has_keyword(attacker, Keyword::Deathtouch);
        let mut remaining = power;
        for (i, &blocker) in blockers.iter().enumerate() {
            if remaining == 0 {
                break;
            }
            let lethal = if deathtouch {
                1
            } else {
                let marked = state.card(blocker).map_or(0, |card| card.damage);
                (state.effective_toughness(blocker) - marked).max(1)
            };
            let last = i + 1 == blockers.len();
            let amount = if last && !trample { remaining } else { lethal.min(remaining) };
            assignments.push((attacker, Target::Card(blocker), amount));
            remaining -= amount;
        }
        if remaining > 0 && trample {
            assignments.push((attacker, Target::Player(defender), remaining));
        }
    }

    assignments
}

fn damage_pass(state: &mut GameState, handlers: &mut Handlers, first_strike: bool) -> SimResult<()> {
    let chain = TriggerChain::root();
    for (source, target, amount) in assign_damage(state, first_strike) {
        if state.is_game_over() {
            break;
        }
        ops::deal_damage(state, handlers, &chain, source, target, amount, true)?;
    }
    Ok(())
}
