//! Effect resolution - executing effects on game state.
//!
//! An `EffectContext` is built fresh for every resolution (a spell, an
//! activated ability, one triggered ability). It bundles the state, the
//! decision handlers, who controls the effect and the trigger chain the
//! resolution belongs to.

use crate::core::{EntityId, GameState, PlayerId};
use crate::decision::Handlers;
use crate::error::{SimError, SimResult};
use crate::rules::ops;
use crate::triggers::{self, GameEvent, TriggerChain};
use crate::zones::Zone;

use super::effect::Effect;
use super::targeting::{Target, TargetRequest, TargetSelector, TargetSpec};

/// Everything an effect needs while it resolves.
pub struct EffectContext<'a> {
    pub state: &'a mut GameState,
    pub handlers: &'a mut Handlers,
    /// Who controls the effect and makes its choices.
    pub controller: PlayerId,
    /// The card the effect came from.
    pub source: EntityId,
    pub source_name: String,
    /// Target chosen when the effect was put on the stack. Consumed by the
    /// first targeted effect.
    pub target: Option<Target>,
    pub chain: TriggerChain,
}

impl<'a> EffectContext<'a> {
    /// Create a context with no pre-chosen target.
    pub fn new(
        state: &'a mut GameState,
        handlers: &'a mut Handlers,
        controller: PlayerId,
        source: EntityId,
        source_name: String,
        chain: TriggerChain,
    ) -> Self {
        Self {
            state,
            handlers,
            controller,
            source,
            source_name,
            target: None,
            chain,
        }
    }

    /// Set the cast-time target (builder pattern).
    #[must_use]
    pub fn with_target(mut self, target: Option<Target>) -> Self {
        self.target = target;
        self
    }

    /// The pre-chosen target, if it is a card.
    #[must_use]
    pub fn target_card(&self) -> Option<EntityId> {
        self.target.and_then(Target::card)
    }

    /// The pre-chosen target, if it is a player.
    #[must_use]
    pub fn target_player(&self) -> Option<PlayerId> {
        self.target.and_then(Target::player)
    }

    /// Move a permanent off the battlefield, firing leave and death
    /// triggers one level down this context's chain.
    pub fn leave_battlefield(&mut self, card: EntityId, to: Zone) -> SimResult<bool> {
        ops::remove_from_battlefield(self.state, self.handlers, &self.chain, card, to)
    }

    /// Raise an event through the trigger system.
    pub fn emit(&mut self, event: &GameEvent) -> SimResult<()> {
        triggers::fire(self.state, self.handlers, event, &self.chain)
    }
}

/// Resolves effects on game state.
pub struct EffectResolver;

impl EffectResolver {
    /// Resolve an effect.
    ///
    /// Targeted effects with no legal target are skipped. A handler answer
    /// outside the legal set fails the game.
    pub fn resolve(effect: &Effect, ctx: &mut EffectContext) -> SimResult<()> {
        if ctx.state.is_game_over() {
            return Ok(());
        }

        let controller = ctx.controller;

        match effect {
            Effect::DealDamage { amount, target } => {
                if let Some(target) = Self::acquire_target(effect, target, ctx)? {
                    ops::deal_damage(ctx.state, ctx.handlers, &ctx.chain, ctx.source, target, *amount, false)?;
                }
            }

            Effect::GainLife { amount } => {
                ctx.state.log.push(format!(
                    "{} gains {} life",
                    ctx.state.player_name(controller),
                    amount
                ));
                ctx.state.adjust_life(controller, *amount);
            }

            Effect::LoseLife { amount, who } => {
                let players = who.players(controller);
                for &player in &players {
                    ctx.state
                        .log
                        .push(format!("{} loses {} life", ctx.state.player_name(player), amount));
                }
                let changes: Vec<(PlayerId, i32)> = players.into_iter().map(|player| (player, -amount)).collect();
                ctx.state.adjust_life_many(&changes);
            }

            Effect::DrawCards { count } => {
                ops::draw_cards(ctx.state, ctx.handlers, &ctx.chain, controller, *count)?;
            }

            Effect::Discard { count, who } => {
                for player in who.players(controller) {
                    ops::discard(ctx.state, ctx.handlers, player, *count as usize)?;
                }
            }

            Effect::Mill { count, who } => {
                for player in who.players(controller) {
                    ops::mill(ctx.state, player, *count);
                }
            }

            Effect::SearchLibrary { land_types, to, tapped } => {
                Self::search_library(ctx, land_types, *to, *tapped)?;
            }

            Effect::Destroy { target } => {
                if let Some(card) = Self::acquire_target(effect, target, ctx)?.and_then(Target::card) {
                    ctx.leave_battlefield(card, Zone::Graveyard)?;
                }
            }

            Effect::ReturnToHand { target } => {
                if let Some(card) = Self::acquire_target(effect, target, ctx)?.and_then(Target::card) {
                    ctx.leave_battlefield(card, Zone::Hand)?;
                }
            }

            Effect::CounterSpell { target } => {
                if let Some(Target::Spell(entry)) = Self::acquire_target(effect, target, ctx)? {
                    ops::counter_spell(ctx.state, entry);
                }
            }

            Effect::CreateToken { token, count } => {
                ops::create_tokens(ctx.state, ctx.handlers, &ctx.chain, controller, token, *count)?;
            }

            Effect::Pump { power, toughness, target } => {
                if let Some(id) = Self::acquire_target(effect, target, ctx)?.and_then(Target::card) {
                    if let Some(card) = ctx.state.card_mut(id) {
                        card.temp_power += power;
                        card.temp_toughness += toughness;
                        let line = format!("{} gets {:+}/{:+} until end of turn", card.name(), power, toughness);
                        ctx.state.log.push(line);
                    }
                }
            }

            Effect::AddCounters { count, target } => {
                if let Some(id) = Self::acquire_target(effect, target, ctx)?.and_then(Target::card) {
                    if let Some(card) = ctx.state.card_mut(id) {
                        card.counters += count;
                        let line = format!("{} gets {} +1/+1 counter(s)", card.name(), count);
                        ctx.state.log.push(line);
                    }
                }
            }

            Effect::TapTarget { target } => {
                if let Some(id) = Self::acquire_target(effect, target, ctx)?.and_then(Target::card) {
                    if let Some(card) = ctx.state.card_mut(id) {
                        card.tapped = true;
                    }
                }
            }

            Effect::UntapTarget { target } => {
                if let Some(id) = Self::acquire_target(effect, target, ctx)?.and_then(Target::card) {
                    if let Some(card) = ctx.state.card_mut(id) {
                        card.tapped = false;
                    }
                }
            }

            Effect::AddMana { color, amount } => {
                ctx.state.players[controller].mana_pool.add(*color, *amount);
            }

            Effect::SacrificeSource => {
                if matches!(ctx.state.locate(ctx.source), Some((_, Zone::Battlefield))) {
                    ctx.state
                        .log
                        .push(format!("{} is sacrificed", ctx.source_name));
                    ctx.leave_battlefield(ctx.source, Zone::Graveyard)?;
                }
            }

            Effect::ReturnSourceToBattlefield => {
                if let Some((owner, Zone::Graveyard)) = ctx.state.locate(ctx.source) {
                    if let Some(card) = ctx.state.players[owner].zones.take_from(Zone::Graveyard, ctx.source) {
                        ctx.state
                            .log
                            .push(format!("{} returns to the battlefield", card.name()));
                        ops::put_onto_battlefield(ctx.state, ctx.handlers, &ctx.chain, card, owner, false)?;
                    }
                }
            }

            Effect::Sequence(effects) => {
                for inner in effects {
                    if ctx.state.is_game_over() {
                        break;
                    }
                    Self::resolve(inner, ctx)?;
                }
            }
        }

        Ok(())
    }

    /// Take the cast-time target, or ask the controller's handler.
    fn acquire_target(effect: &Effect, spec: &TargetSpec, ctx: &mut EffectContext) -> SimResult<Option<Target>> {
        if let Some(target) = ctx.target.take() {
            return Ok(Some(target));
        }

        let controller = ctx.controller;
        let options = TargetSelector::legal_targets(ctx.state, controller, spec);
        if options.is_empty() {
            return Ok(None);
        }

        let request = TargetRequest {
            source: ctx.source,
            spec: spec.clone(),
            hostile: effect.is_hostile(),
        };
        let choice = ctx.handlers[controller].choose_target(ctx.state, controller, &request, &options);

        if !options.contains(&choice) {
            return Err(SimError::IllegalChoice {
                player: controller,
                decision: "target",
                detail: format!("{choice:?} is not a legal target for {}", ctx.source_name),
            });
        }
        Ok(Some(choice))
    }

    fn search_library(ctx: &mut EffectContext, land_types: &[String], to: Zone, tapped: bool) -> SimResult<()> {
        let controller = ctx.controller;
        let candidates: Vec<EntityId> = ctx.state.players[controller]
            .zones
            .cards(Zone::Library)
            .iter()
            .filter(|card| {
                card.is_land()
                    && (land_types.is_empty() || land_types.iter().any(|t| card.definition.has_subtype(t)))
            })
            .map(|card| card.id)
            .collect();

        let choice = if candidates.is_empty() {
            None
        } else {
            ctx.handlers[controller].choose_search(ctx.state, controller, &candidates)
        };

        let found = match choice {
            Some(id) if !candidates.contains(&id) => {
                return Err(SimError::IllegalChoice {
                    player: controller,
                    decision: "search",
                    detail: format!("{id} is not a matching card in the library"),
                });
            }
            Some(id) => ctx.state.players[controller].zones.take_from(Zone::Library, id),
            None => None,
        };

        ctx.state.shuffle_library(controller);

        let Some(card) = found else {
            ctx.state
                .log
                .push(format!("{} finds nothing", ctx.state.player_name(controller)));
            return Ok(());
        };

        ctx.state.log.push(format!(
            "{} searches for {}",
            ctx.state.player_name(controller),
            card.name()
        ));

        if to == Zone::Battlefield {
            let id = card.id;
            ops::put_onto_battlefield(ctx.state, ctx.handlers, &ctx.chain, card, controller, tapped)?;
            if let Some(land) = ctx.state.card_mut(id) {
                land.tapped = land.tapped || tapped;
            }
        } else {
            ctx.state.players[controller]
                .zones
                .put(to, card, crate::zones::ZonePosition::Bottom);
        }
        Ok(())
    }
}
