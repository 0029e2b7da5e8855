//! Mana pools and automatic cost payment.
//!
//! Players never tap lands one by one to pay for a spell: when an action
//! with a mana cost is taken, `pay` spends floating mana first and then taps
//! untapped sources. Colored requirements are covered before generic, using
//! the sources with the fewest color options first so flexible sources stay
//! available for later requirements.

use serde::{Deserialize, Serialize};

use crate::cards::{CardInstance, Keyword, ManaColor, ManaCost};
use crate::core::{EntityId, GameState, PlayerId};

/// Floating mana, per kind.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManaPool {
    amounts: [u32; 6],
    /// Sources tapped by hand whose mana is still floating.
    tapped_sources: Vec<(EntityId, ManaColor)>,
}

impl ManaPool {
    pub fn add(&mut self, color: ManaColor, amount: u32) {
        self.amounts[color.index()] += amount;
    }

    #[must_use]
    pub fn amount(&self, color: ManaColor) -> u32 {
        self.amounts[color.index()]
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.amounts.iter().sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Empty the pool (between steps).
    pub fn clear(&mut self) {
        self.amounts = [0; 6];
        self.tapped_sources.clear();
    }

    /// Add mana produced by tapping `source` by hand.
    pub fn record_tap(&mut self, source: EntityId, color: ManaColor, amount: u32) {
        self.add(color, amount);
        for _ in 0..amount {
            self.tapped_sources.push((source, color));
        }
    }

    /// Can `source`'s tap still be undone?
    #[must_use]
    pub fn can_undo(&self, source: EntityId) -> bool {
        self.tapped_sources
            .iter()
            .any(|(id, color)| *id == source && self.amount(*color) > 0)
    }

    /// Remove the mana `source` produced. Returns false if it was spent.
    pub fn undo_tap(&mut self, source: EntityId) -> bool {
        if !self.can_undo(source) {
            return false;
        }
        let mut remaining = Vec::with_capacity(self.tapped_sources.len());
        for (id, color) in std::mem::take(&mut self.tapped_sources) {
            if id == source && self.amounts[color.index()] > 0 {
                self.amounts[color.index()] -= 1;
            } else {
                remaining.push((id, color));
            }
        }
        self.tapped_sources = remaining;
        true
    }

    /// Sources whose tap can still be undone, in tap order.
    pub fn undoable_sources(&self) -> impl Iterator<Item = EntityId> + '_ {
        let mut seen = Vec::new();
        self.tapped_sources.iter().filter_map(move |(id, _)| {
            if seen.contains(id) || !self.can_undo(*id) {
                None
            } else {
                seen.push(*id);
                Some(*id)
            }
        })
    }
}

/// Sources to tap and the pool left over after paying a cost.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentPlan {
    pub taps: Vec<(EntityId, ManaColor)>,
    pool_after: [u32; 6],
}

/// Can this permanent tap for mana right now?
#[must_use]
pub fn can_tap_for_mana(state: &GameState, card: &CardInstance) -> bool {
    card.definition.mana_ability.is_some()
        && !card.tapped
        && !(card.is_creature() && card.summoning_sick && !state.has_keyword(card.id, Keyword::Haste))
}

fn sources<'a>(state: &'a GameState, player: PlayerId, exclude: Option<EntityId>) -> Vec<&'a CardInstance> {
    let mut found: Vec<&CardInstance> = state
        .battlefield(player)
        .iter()
        .filter(|card| Some(card.id) != exclude && can_tap_for_mana(state, card))
        .collect();
    found.sort_by_key(|card| card.definition.mana_ability.as_ref().map_or(0, |a| a.produces.len()));
    found
}

/// Work out how to pay `cost`, without changing anything.
///
/// `exclude` keeps a permanent out of the plan (one that taps as part of
/// the same cost).
#[must_use]
pub fn plan_payment(state: &GameState, player: PlayerId, cost: &ManaCost, exclude: Option<EntityId>) -> Option<PaymentPlan> {
    let mut pool = state.players[player].mana_pool.amounts;
    let sources = sources(state, player, exclude);
    let mut used = vec![false; sources.len()];
    let mut taps = Vec::new();

    for color in ManaColor::COLORS.into_iter().chain([ManaColor::Colorless]) {
        let mut need = cost.required(color);
        let floating = need.min(pool[color.index()]);
        pool[color.index()] -= floating;
        need -= floating;

        for (i, source) in sources.iter().enumerate() {
            if need == 0 {
                break;
            }
            let Some(ability) = &source.definition.mana_ability else {
                continue;
            };
            if used[i] || !ability.can_produce(color) {
                continue;
            }
            used[i] = true;
            taps.push((source.id, color));
            let spent = ability.amount.min(need);
            need -= spent;
            pool[color.index()] += ability.amount - spent;
        }

        if need > 0 {
            return None;
        }
    }

    let mut generic = cost.generic;
    for slot in pool.iter_mut().rev() {
        let spent = generic.min(*slot);
        *slot -= spent;
        generic -= spent;
    }

    for (i, source) in sources.iter().enumerate() {
        if generic == 0 {
            break;
        }
        let Some(ability) = &source.definition.mana_ability else {
            continue;
        };
        let Some(color) = ability.produces.first().copied() else {
            continue;
        };
        if used[i] {
            continue;
        }
        used[i] = true;
        taps.push((source.id, color));
        let spent = ability.amount.min(generic);
        generic -= spent;
        pool[color.index()] += ability.amount - spent;
    }

    if generic > 0 {
        return None;
    }
    Some(PaymentPlan { taps, pool_after: pool })
}

#[must_use]
pub fn can_pay(state: &GameState, player: PlayerId, cost: &ManaCost, exclude: Option<EntityId>) -> bool {
    cost.is_free() || plan_payment(state, player, cost, exclude).is_some()
}

/// Pay `cost`, tapping sources as needed. Returns false (and changes
/// nothing) if it cannot be paid.
pub fn pay(state: &mut GameState, player: PlayerId, cost: &ManaCost, exclude: Option<EntityId>) -> bool {
    if cost.is_free() {
        return true;
    }
    let Some(plan) = plan_payment(state, player, cost, exclude) else {
        return false;
    };

    for (id, _) in &plan.taps {
        if let Some(card) = state.card_mut(*id) {
            card.tapped = true;
        }
    }
    let pool = &mut state.players[player].mana_pool;
    pool.amounts = plan.pool_after;
    pool.tapped_sources.clear();
    true
}
