//! The heuristic bot.
//!
//! Scores every legal non-pass action and takes the best one above the
//! pass threshold. Scores combine mana efficiency (mana value spent) with
//! an estimate of board impact. Spells are only considered in the windows
//! their `SpellRole` allows. Ties keep the earlier action in the legal list.

use std::thread;

use log::trace;

use crate::cards::{CardDefinition, CardInstance, Keyword, ManaCost};
use crate::core::{Action, EntityId, GameState, PlayerId};
use crate::effects::{Effect, PlayerSelector, Target, TargetRequest};
use crate::rules::combat::{block_candidates, can_block};
use crate::stack::StackItem;
use crate::zones::Zone;

use super::{Block, BotConfig, DecisionHandler, SpellRole};

/// Added to face damage that kills the opponent outright.
const LETHAL_BONUS: f64 = 1000.0;

/// The automated player.
#[derive(Clone, Debug, Default)]
pub struct HeuristicBot {
    config: BotConfig,
}

impl HeuristicBot {
    pub fn new(config: BotConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// Score of `action`, or `None` when the bot would never take it now.
    #[must_use]
    pub fn score_action(&self, state: &GameState, player: PlayerId, action: &Action) -> Option<f64> {
        let config = &self.config;

        match *action {
            Action::PassPriority | Action::TapForMana { .. } | Action::UntapForMana { .. } => None,

            Action::PlayLand { .. } => Some(config.land_drop_score),

            Action::ActivateFetch { card } => {
                let fetch = state.card(card)?.definition.fetch.as_ref()?;
                let comfortable = state.players[player].life > fetch.life_cost + 5;
                (comfortable && state.stack.is_empty()).then_some(config.fetch_score)
            }

            Action::CastSpell { card, target } => {
                let def = &state.card(card)?.definition;
                let effect = def.spell.as_ref().map(|spell| &spell.effect);
                self.score_spell(state, player, def, effect, def.is_instant_speed(), &def.mana_cost, target)
            }

            Action::Flashback { card, target } => {
                let def = &state.card(card)?.definition;
                let effect = def.spell.as_ref().map(|spell| &spell.effect);
                let cost = def.flashback.as_ref()?;
                self.score_spell(state, player, def, effect, def.is_instant_speed(), cost, target)
            }

            Action::CastAdventure { card, target } => {
                let def = &state.card(card)?.definition;
                let adventure = def.adventure.as_ref()?;
                self.score_spell(
                    state,
                    player,
                    def,
                    Some(&adventure.spell.effect),
                    adventure.instant,
                    &adventure.mana_cost,
                    target,
                )
            }

            Action::ActivateAbility { card, index, target } => {
                let ability = state.card(card)?.definition.activated.get(index)?;
                let role = SpellRole::classify(!ability.sorcery_speed, Some(&ability.effect));
                if !role.is_eligible(state, player) {
                    return None;
                }
                let value = self.effect_value(state, player, &ability.effect, target)
                    - f64::from(ability.cost.mana_value()) * 0.5;
                (value > 0.0).then_some(value)
            }

            Action::ActivateLoyalty { card, index, target } => {
                if state.active_player != player || !state.stack.is_empty() {
                    return None;
                }
                let ability = state.card(card)?.definition.loyalty_abilities.get(index)?;
                let value = self.effect_value(state, player, &ability.effect, target) + f64::from(ability.loyalty);
                (value > 0.0).then_some(value)
            }

            Action::Cycle { card } => {
                let def = &state.card(card)?.definition;
                let lands = state.battlefield(player).iter().filter(|c| c.is_land()).count();
                let stuck = def.mana_cost.mana_value() as usize > lands + 2;
                (stuck && state.stack.is_empty()).then_some(config.card_draw_weight)
            }

            Action::Ninjutsu { card, attacker } => {
                let ninja = state.card(card)?;
                let upgrade = ninja.base_power() - state.effective_power(attacker);
                let value = f64::from(upgrade) * config.board_impact_weight + config.card_draw_weight;
                (value > 0.0).then_some(value)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn score_spell(
        &self,
        state: &GameState,
        player: PlayerId,
        def: &CardDefinition,
        effect: Option<&Effect>,
        instant_speed: bool,
        cost: &ManaCost,
        target: Option<Target>,
    ) -> Option<f64> {
        let role = SpellRole::classify(instant_speed, effect);
        if !role.is_eligible(state, player) {
            return None;
        }

        let impact = match effect {
            Some(effect) => self.effect_value(state, player, effect, target),
            None => self.permanent_value(def),
        };
        if impact <= 0.0 {
            return None;
        }
        Some(impact + f64::from(cost.mana_value()) * self.config.mana_efficiency_weight)
    }

    fn permanent_value(&self, def: &CardDefinition) -> f64 {
        if def.is_creature() {
            let body = def.power.unwrap_or(0) + def.toughness.unwrap_or(0);
            f64::from(body) * self.config.board_impact_weight + def.keywords.len() as f64
        } else if def.is_planeswalker() {
            f64::from(def.loyalty.unwrap_or(0)) * self.config.board_impact_weight
        } else {
            1.0
        }
    }

    /// What a permanent on the battlefield is worth to its controller.
    fn card_value(&self, state: &GameState, card: &CardInstance) -> f64 {
        let raw = if card.is_creature() {
            state.effective_power(card.id) + state.effective_toughness(card.id)
        } else if card.definition.is_planeswalker() {
            card.loyalty
        } else {
            1
        };
        f64::from(raw.max(1)) * self.config.board_impact_weight
    }

    /// Positive when `target` belongs to the other side.
    fn signed_value(&self, state: &GameState, player: PlayerId, id: EntityId) -> f64 {
        match state.card(id) {
            Some(card) if card.controller != player => self.card_value(state, card),
            Some(card) => -self.card_value(state, card),
            None => 0.0,
        }
    }

    /// Estimated gain for `player` if `effect` resolves against `target`.
    fn effect_value(&self, state: &GameState, player: PlayerId, effect: &Effect, target: Option<Target>) -> f64 {
        let config = &self.config;
        let opponent = player.opponent();

        match effect {
            Effect::DealDamage { amount, .. } => match target {
                Some(Target::Player(p)) if p == opponent => {
                    let lethal = *amount >= state.players[opponent].life;
                    f64::from(*amount) * config.face_damage_weight + if lethal { LETHAL_BONUS } else { 0.0 }
                }
                Some(Target::Player(_)) => -f64::from(*amount) * config.face_damage_weight,
                Some(Target::Card(id)) => {
                    let Some(card) = state.card(id) else {
                        return 0.0;
                    };
                    let remaining = if card.is_creature() {
                        state.effective_toughness(id) - card.damage
                    } else {
                        card.loyalty
                    };
                    if *amount >= remaining {
                        self.signed_value(state, player, id)
                    } else {
                        self.signed_value(state, player, id) * 0.1
                    }
                }
                Some(Target::Spell(_)) => 0.0,
                None => f64::from(*amount) * config.face_damage_weight,
            },

            Effect::Destroy { .. } => target.and_then(Target::card).map_or(0.0, |id| self.signed_value(state, player, id)),

            Effect::ReturnToHand { .. } => target
                .and_then(Target::card)
                .map_or(0.0, |id| self.signed_value(state, player, id) * 0.5),

            Effect::TapTarget { .. } => target
                .and_then(Target::card)
                .map_or(0.0, |id| self.signed_value(state, player, id) * 0.2),

            Effect::CounterSpell { .. } => match target {
                Some(Target::Spell(id)) => state.stack.get(id).map_or(0.0, |entry| {
                    let worth = match &entry.item {
                        StackItem::Spell { card, .. } => {
                            f64::from(card.definition.mana_cost.mana_value()) * config.board_impact_weight + 2.0
                        }
                        StackItem::Ability { .. } => 1.0,
                    };
                    if entry.controller == player {
                        -worth
                    } else {
                        worth
                    }
                }),
                _ => 0.0,
            },

            Effect::Pump { power, toughness, .. } => match target.and_then(Target::card) {
                Some(id) if in_combat(state, id) => {
                    let swing = f64::from(power + toughness) * config.board_impact_weight;
                    match state.card(id) {
                        Some(card) if card.controller == player => swing,
                        Some(_) => -swing,
                        None => 0.0,
                    }
                }
                _ => 0.0,
            },

            Effect::AddCounters { count, .. } => match target.and_then(Target::card).and_then(|id| state.card(id)) {
                Some(card) if card.controller == player => f64::from(*count) * 2.0 * config.board_impact_weight,
                Some(_) => -f64::from(*count) * 2.0 * config.board_impact_weight,
                None => 0.0,
            },

            Effect::UntapTarget { .. } | Effect::AddMana { .. } => 0.0,

            Effect::GainLife { amount } => f64::from(*amount) * 0.5,

            Effect::LoseLife { amount, who } => {
                let face = f64::from(*amount) * config.face_damage_weight;
                match who {
                    PlayerSelector::Opponent => face,
                    PlayerSelector::You => -face,
                    PlayerSelector::Each => 0.0,
                }
            }

            Effect::DrawCards { count } => f64::from(*count) * config.card_draw_weight,

            Effect::Discard { count, who } => {
                let cards = f64::from(*count) * config.card_draw_weight * 0.75;
                match who {
                    PlayerSelector::Opponent if !state.hand(opponent).is_empty() => cards,
                    PlayerSelector::You => -cards,
                    _ => 0.0,
                }
            }

            Effect::Mill { count, who } => match who {
                PlayerSelector::Opponent => f64::from(*count) * 0.25,
                _ => 0.0,
            },

            Effect::SearchLibrary { .. } => {
                let has_land = state.players[player]
                    .zones
                    .cards(Zone::Library)
                    .iter()
                    .any(CardInstance::is_land);
                if has_land {
                    config.card_draw_weight
                } else {
                    0.0
                }
            }

            Effect::CreateToken { token, count } => self.permanent_value(token) * f64::from(*count),

            Effect::SacrificeSource => -1.0,

            Effect::ReturnSourceToBattlefield => 1.0,

            Effect::Sequence(effects) => {
                let mut target = target;
                effects
                    .iter()
                    .map(|child| {
                        let aimed = if child.target_spec().is_targeted() { target.take() } else { None };
                        self.effect_value(state, player, child, aimed)
                    })
                    .sum()
            }
        }
    }

    /// Rank hand cards from least to most worth keeping.
    fn rank_hand(&self, state: &GameState, player: PlayerId) -> Vec<EntityId> {
        let lands_in_play = state.battlefield(player).iter().filter(|c| c.is_land()).count();
        let lands_in_hand = state.hand(player).iter().filter(|c| c.is_land()).count();

        let mut ranked: Vec<(f64, EntityId)> = state
            .hand(player)
            .iter()
            .map(|card| {
                let keep = if card.is_land() {
                    if lands_in_play + lands_in_hand <= 5 {
                        10.0
                    } else {
                        1.0
                    }
                } else {
                    let mv = card.definition.mana_cost.mana_value() as usize;
                    if mv > lands_in_play + lands_in_hand {
                        2.0
                    } else {
                        5.0 + mv as f64
                    }
                };
                (keep, card.id)
            })
            .collect();
        ranked.sort_by(|a, b| a.0.total_cmp(&b.0));
        ranked.into_iter().map(|(_, id)| id).collect()
    }
}

fn in_combat(state: &GameState, id: EntityId) -> bool {
    state.combat.is_attacking(id)
        || state
            .combat
            .attackers
            .iter()
            .any(|attacker| state.combat.blockers_of(*attacker).contains(&id))
}

/// Could `blocker` block `attacker` if it attacked? Ignores menace.
fn could_block(state: &GameState, blocker: EntityId, attacker: EntityId) -> bool {
    if state.has_keyword(attacker, Keyword::Unblockable) {
        return false;
    }
    if state.has_keyword(attacker, Keyword::Flying) {
        return state.has_keyword(blocker, Keyword::Flying) || state.has_keyword(blocker, Keyword::Reach);
    }
    true
}

/// Would `attacker` survive combat with `blocker`?
fn survives(state: &GameState, attacker: EntityId, blocker: EntityId) -> bool {
    !state.has_keyword(blocker, Keyword::Deathtouch) && state.effective_power(blocker) < state.effective_toughness(attacker)
}

impl DecisionHandler for HeuristicBot {
    fn choose_action(&mut self, state: &GameState, player: PlayerId, legal: &[Action]) -> Action {
        if !self.config.decision_delay.is_zero() {
            thread::sleep(self.config.decision_delay);
        }

        let mut best: Option<(&Action, f64)> = None;
        for action in legal {
            let Some(score) = self.score_action(state, player, action) else {
                continue;
            };
            let better = best.map_or(true, |(_, top)| score > top);
            if score > self.config.pass_threshold && better {
                best = Some((action, score));
            }
        }

        match best {
            Some((action, score)) => {
                trace!("{} scores {:?} at {:.2}", player, action, score);
                action.clone()
            }
            None => Action::PassPriority,
        }
    }

    fn choose_target(
        &mut self,
        state: &GameState,
        player: PlayerId,
        request: &TargetRequest,
        options: &[Target],
    ) -> Target {
        let opponent = player.opponent();

        // Harmful effects go at the best opposing permanent, then the
        // opponent. Helpful ones at our best creature, then ourselves.
        let (side, face) = if request.hostile {
            (opponent, Target::Player(opponent))
        } else {
            (player, Target::Player(player))
        };

        let best_card = options
            .iter()
            .filter_map(|option| {
                let card = state.card(option.card()?)?;
                (card.controller == side).then(|| (self.card_value(state, card), *option))
            })
            .fold(None, |best: Option<(f64, Target)>, (value, option)| match best {
                Some((top, _)) if top >= value => best,
                _ => Some((value, option)),
            });

        if let Some((_, target)) = best_card {
            return target;
        }
        if options.contains(&face) {
            return face;
        }
        options
            .iter()
            .copied()
            .find(|option| match option {
                Target::Player(p) => *p == side,
                Target::Card(id) => state.card(*id).is_some_and(|card| card.controller == side),
                Target::Spell(id) => state.stack.get(*id).is_some_and(|entry| entry.controller == side),
            })
            .unwrap_or(options[0])
    }

    fn choose_attackers(&mut self, state: &GameState, player: PlayerId, candidates: &[EntityId]) -> Vec<EntityId> {
        let opponent = player.opponent();
        let blockers = block_candidates(state, opponent);

        // Alpha strike when the damage that gets through is lethal even if
        // every blocker stops one of our biggest attackers.
        let mut powers: Vec<i32> = candidates.iter().map(|id| state.effective_power(*id)).collect();
        powers.sort_unstable_by(|a, b| b.cmp(a));
        let through: i32 = powers.iter().skip(blockers.len()).sum();
        if through >= state.players[opponent].life {
            return candidates.to_vec();
        }

        candidates
            .iter()
            .copied()
            .filter(|&attacker| {
                if state.effective_power(attacker) <= 0 {
                    return false;
                }
                let able: Vec<EntityId> = blockers
                    .iter()
                    .copied()
                    .filter(|&blocker| could_block(state, blocker, attacker))
                    .collect();
                let menace_safe = state.has_keyword(attacker, Keyword::Menace) && able.len() < 2;
                menace_safe || able.iter().all(|&blocker| survives(state, attacker, blocker))
            })
            .collect()
    }

    fn choose_blockers(
        &mut self,
        state: &GameState,
        player: PlayerId,
        attackers: &[EntityId],
        candidates: &[EntityId],
    ) -> Vec<Block> {
        let mut order: Vec<EntityId> = attackers
            .iter()
            .copied()
            .filter(|&attacker| !state.has_keyword(attacker, Keyword::Menace))
            .collect();
        order.sort_by_key(|&attacker| std::cmp::Reverse(state.effective_power(attacker)));

        let mut free: Vec<EntityId> = candidates.to_vec();
        let mut blocks = Vec::new();

        // Value blocks: the blocker survives, or trades with something at
        // least as valuable.
        for &attacker in &order {
            let pick = free.iter().copied().find(|&blocker| {
                if !can_block(state, blocker, attacker) {
                    return false;
                }
                let blocker_lives = survives(state, blocker, attacker);
                let attacker_dies = !survives(state, attacker, blocker);
                let even_trade = attacker_dies
                    && state.card(blocker).zip(state.card(attacker)).is_some_and(|(b, a)| {
                        self.card_value(state, b) <= self.card_value(state, a)
                    });
                blocker_lives || even_trade
            });
            if let Some(blocker) = pick {
                free.retain(|&id| id != blocker);
                blocks.push(Block { blocker, attacker });
            }
        }

        // Chump blocks when the unblocked damage would be lethal.
        let life = state.players[player].life;
        let mut incoming: i32 = attackers
            .iter()
            .filter(|&&attacker| !blocks.iter().any(|b| b.attacker == attacker))
            .map(|&attacker| state.effective_power(attacker))
            .sum();

        for &attacker in &order {
            if incoming < life {
                break;
            }
            if blocks.iter().any(|b| b.attacker == attacker) {
                continue;
            }
            let Some(blocker) = free.iter().copied().find(|&blocker| can_block(state, blocker, attacker)) else {
                continue;
            };
            free.retain(|&id| id != blocker);
            blocks.push(Block { blocker, attacker });
            incoming -= state.effective_power(attacker);
        }

        blocks
    }

    fn choose_discard(&mut self, state: &GameState, player: PlayerId, count: usize) -> Vec<EntityId> {
        self.rank_hand(state, player).into_iter().take(count).collect()
    }

    fn choose_mulligan(&mut self, state: &GameState, player: PlayerId) -> bool {
        let lands = state.hand(player).iter().filter(|card| card.is_land()).count();
        !(2..=5).contains(&lands)
    }

    fn choose_bottom(&mut self, state: &GameState, player: PlayerId, count: usize) -> Vec<EntityId> {
        self.rank_hand(state, player).into_iter().take(count).collect()
    }

    fn choose_search(&mut self, state: &GameState, player: PlayerId, candidates: &[EntityId]) -> Option<EntityId> {
        // Prefer a land that adds a colour we cannot make yet.
        let produces = |id: EntityId| {
            state
                .card(id)
                .and_then(|card| card.definition.mana_ability.as_ref())
                .map(|ability| ability.produces.clone())
                .unwrap_or_default()
        };
        let have: Vec<_> = state
            .battlefield(player)
            .iter()
            .flat_map(|card| produces(card.id))
            .collect();

        candidates
            .iter()
            .copied()
            .find(|&id| produces(id).iter().any(|color| !have.contains(color)))
            .or_else(|| candidates.first().copied())
    }
}
