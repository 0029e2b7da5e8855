//! The game engine: turn structure, priority and stack resolution.
//!
//! `GameEngine` owns one `GameState` and the two decision handlers playing
//! it. Each turn walks `Phase::ORDER`; every step runs its turn-based
//! actions, checks state-based actions and then (except Untap and Cleanup)
//! opens a priority round.
//!
//! ## Priority
//!
//! The active player is asked first. A non-pass action is applied at once
//! (or pushed onto the stack) and priority returns to the active player.
//! Two passes in a row resolve the top of the stack, or end the step when
//! the stack is empty.

use log::{debug, trace};

use crate::cards::{CardInstance, Decklist, ManaCost};
use crate::core::{Action, EndReason, EntityId, GameState, Phase, PlayerId, SimConfig};
use crate::decision::Handlers;
use crate::effects::{Effect, EffectContext, EffectResolver, Target, TargetSelector};
use crate::error::{SimError, SimResult};
use crate::sim::CancellationToken;
use crate::stack::{CastMode, StackEntryId, StackItem};
use crate::triggers::{self, GameEvent, TriggerChain};
use crate::zones::{Zone, ZonePosition};

use super::{combat, legality, mana, ops, sba};

/// How a call to `GameEngine::run` ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunStatus {
    /// The game reached a terminal state (win, loss, draw or turn ceiling).
    Finished,
    /// The cancellation token was set between turns.
    Cancelled,
}

/// Drives one game from opening hands to a terminal state.
pub struct GameEngine {
    state: GameState,
    handlers: Handlers,
    config: SimConfig,
    started: bool,
}

impl GameEngine {
    pub fn new(state: GameState, handlers: Handlers, config: SimConfig) -> Self {
        Self {
            state,
            handlers,
            config,
            started: false,
        }
    }

    /// Build a game from two named decklists. Every definition becomes a
    /// fresh instance in its owner's library, then both libraries are
    /// shuffled.
    pub fn from_decks(seats: [(&str, &Decklist); 2], handlers: Handlers, config: SimConfig) -> Self {
        let mut state = GameState::new([seats[0].0, seats[1].0], &config);

        for (player, (_, deck)) in PlayerId::both().zip(seats) {
            for definition in &deck.cards {
                let id = state.allocate_id();
                state.players[player].zones.put(
                    Zone::Library,
                    CardInstance::new(id, player, definition),
                    ZonePosition::Bottom,
                );
            }
            state.shuffle_library(player);
        }

        Self::new(state, handlers, config)
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    #[must_use]
    pub fn into_state(self) -> GameState {
        self.state
    }

    /// Play until the game ends or `cancel` is set.
    pub fn run(&mut self, cancel: &CancellationToken) -> SimResult<RunStatus> {
        self.open_hands()?;

        while !self.state.is_game_over() {
            if cancel.is_cancelled() {
                debug!("game cancelled before turn {}", self.state.turn);
                return Ok(RunStatus::Cancelled);
            }
            self.play_turn()?;
        }
        Ok(RunStatus::Finished)
    }

    // === Setup ===

    /// Draw opening hands and offer mulligans, starting player first.
    /// Does nothing after the first call.
    pub fn open_hands(&mut self) -> SimResult<()> {
        if self.started {
            return Ok(());
        }
        self.started = true;

        let first = self.state.active_player;
        self.state
            .log
            .push(format!("{} plays first", self.state.player_name(first)));

        for player in PlayerId::apnap(first) {
            self.draw_opening_hand(player);

            let mut taken = 0;
            while taken < self.config.max_mulligans && self.handlers[player].choose_mulligan(&self.state, player) {
                taken += 1;
                for card in self.state.players[player].zones.drain(Zone::Hand) {
                    self.state.players[player]
                        .zones
                        .put(Zone::Library, card, ZonePosition::Bottom);
                }
                self.state.shuffle_library(player);
                self.draw_opening_hand(player);
                self.bottom_cards(player, taken as usize)?;
                self.state.log.push(format!(
                    "{} mulligans, keeping {} cards",
                    self.state.player_name(player),
                    self.state.hand(player).len()
                ));
            }
            self.state.players[player].mulligans = taken;
        }
        Ok(())
    }

    fn draw_opening_hand(&mut self, player: PlayerId) {
        let zones = &mut self.state.players[player].zones;
        for _ in 0..self.config.opening_hand {
            let Some(card) = zones.take_top(Zone::Library) else {
                break;
            };
            zones.put(Zone::Hand, card, ZonePosition::Bottom);
        }
    }

    fn bottom_cards(&mut self, player: PlayerId, count: usize) -> SimResult<()> {
        let hand: Vec<EntityId> = self.state.hand(player).iter().map(|card| card.id).collect();
        let count = count.min(hand.len());
        let chosen = self.handlers[player].choose_bottom(&self.state, player, count);

        let illegal = |detail: String| SimError::IllegalChoice {
            player,
            decision: "bottom",
            detail,
        };
        if chosen.len() != count {
            return Err(illegal(format!("expected {count} cards, got {}", chosen.len())));
        }
        for (i, id) in chosen.iter().enumerate() {
            if !hand.contains(id) || chosen[..i].contains(id) {
                return Err(illegal(format!("{id} cannot go to the bottom")));
            }
        }

        let zones = &mut self.state.players[player].zones;
        for id in chosen {
            if let Some(card) = zones.take_from(Zone::Hand, id) {
                zones.put(Zone::Library, card, ZonePosition::Bottom);
            }
        }
        Ok(())
    }

    // === Turn Structure ===

    /// Play one full turn, then pass the turn or end the game at the
    /// turn ceiling.
    pub fn play_turn(&mut self) -> SimResult<()> {
        let active = self.state.active_player;
        debug!("turn {} begins for {}", self.state.turn, active);
        self.state.log.push(format!(
            "Turn {}: {}",
            self.state.turn,
            self.state.player_name(active)
        ));

        for step in Phase::ORDER {
            if self.state.is_game_over() {
                return Ok(());
            }
            let no_combat = matches!(step, Phase::DeclareBlockers | Phase::CombatDamage)
                && self.state.combat.attackers.is_empty();
            if no_combat {
                continue;
            }
            self.run_step(step)?;
        }

        if self.state.is_game_over() {
            return Ok(());
        }
        if self.state.turn >= self.config.turn_limit {
            self.state.end_in_draw(EndReason::TurnLimit);
            return Ok(());
        }

        self.state.turn += 1;
        self.state.active_player = active.opponent();
        self.state.is_first_turn = false;
        self.state.stack.set_priority(self.state.active_player);
        Ok(())
    }

    fn run_step(&mut self, step: Phase) -> SimResult<()> {
        self.state.phase = step;
        debug!("{} step", step);

        self.turn_based_actions(step)?;
        sba::check_state_based_actions(&mut self.state, &mut self.handlers)?;

        if step.opens_priority() {
            self.priority_round()?;
        }

        for (_, player) in self.state.players.iter_mut() {
            player.mana_pool.clear();
        }
        Ok(())
    }

    fn turn_based_actions(&mut self, step: Phase) -> SimResult<()> {
        let active = self.state.active_player;
        let chain = TriggerChain::root();

        match step {
            Phase::Untap => {
                let player = &mut self.state.players[active];
                player.lands_played = 0;
                for card in player.zones.battlefield_mut() {
                    card.tapped = false;
                    card.summoning_sick = false;
                    card.loyalty_used = false;
                    card.abilities_used.clear();
                }
            }
            Phase::Upkeep => {
                triggers::fire(&mut self.state, &mut self.handlers, &GameEvent::upkeep(active), &chain)?;
            }
            Phase::Draw => {
                if self.state.is_first_turn {
                    self.state
                        .log
                        .push(format!("{} skips the first draw", self.state.player_name(active)));
                } else {
                    ops::draw_cards(&mut self.state, &mut self.handlers, &chain, active, 1)?;
                }
            }
            Phase::BeginCombat | Phase::EndCombat => self.state.combat.clear(),
            Phase::DeclareAttackers => combat::declare_attackers(&mut self.state, &mut self.handlers)?,
            Phase::DeclareBlockers => combat::declare_blockers(&mut self.state, &mut self.handlers)?,
            Phase::CombatDamage => combat::resolve_combat_damage(&mut self.state, &mut self.handlers)?,
            Phase::Main1 | Phase::Main2 => {}
            Phase::End => {
                triggers::fire(&mut self.state, &mut self.handlers, &GameEvent::end_step(active), &chain)?;
            }
            Phase::Cleanup => {
                let excess = self.state.hand(active).len().saturating_sub(self.state.max_hand_size);
                if excess > 0 {
                    ops::discard(&mut self.state, &mut self.handlers, active, excess)?;
                }
                for (_, player) in self.state.players.iter_mut() {
                    for card in player.zones.battlefield_mut() {
                        card.end_turn();
                    }
                }
                self.state.combat.clear();
            }
        }
        Ok(())
    }

    // === Priority ===

    /// Exchange priority until both players pass with an empty stack.
    pub fn priority_round(&mut self) -> SimResult<()> {
        let active = self.state.active_player;
        self.state.stack.set_priority(active);

        loop {
            if self.state.is_game_over() {
                return Ok(());
            }

            let player = self.state.priority_player();
            let legal = legality::legal_actions(&self.state, player);
            let action = self.handlers[player].choose_action(&self.state, player, &legal);
            trace!("{} chooses {:?} in {}", player, action, self.state.phase);

            if !legal.contains(&action) {
                return Err(SimError::IllegalAction { player, action });
            }

            if action.is_pass() {
                if !self.state.stack.pass(player) {
                    continue;
                }
                if self.state.stack.is_empty() {
                    return Ok(());
                }
                self.resolve_top()?;
            } else {
                self.apply_action(player, &action)?;
            }

            sba::check_state_based_actions(&mut self.state, &mut self.handlers)?;
            self.state.stack.set_priority(active);
        }
    }

    /// Apply a legal non-pass action.
    ///
    /// Steps after one that ends the game are skipped.
    pub fn apply_action(&mut self, player: PlayerId, action: &Action) -> SimResult<()> {
        if self.state.is_game_over() {
            return Ok(());
        }
        self.state.record(player, action.clone());
        let illegal = || SimError::IllegalAction {
            player,
            action: action.clone(),
        };
        let chain = TriggerChain::root();

        match *action {
            Action::PassPriority => {}

            Action::PlayLand { card } => {
                let land = self.state.players[player]
                    .zones
                    .take_from(Zone::Hand, card)
                    .ok_or_else(illegal)?;
                self.state.players[player].lands_played += 1;
                self.state
                    .log
                    .push(format!("{} plays {}", self.state.player_name(player), land.name()));
                ops::put_onto_battlefield(&mut self.state, &mut self.handlers, &chain, land, player, false)?;
            }

            Action::TapForMana { card, color } => {
                let source = self.state.card_mut(card).ok_or_else(illegal)?;
                let amount = source.definition.mana_ability.as_ref().map_or(0, |ability| ability.amount);
                source.tapped = true;
                self.state.players[player].mana_pool.record_tap(card, color, amount);
            }

            Action::UntapForMana { card } => {
                if self.state.players[player].mana_pool.undo_tap(card) {
                    if let Some(source) = self.state.card_mut(card) {
                        source.tapped = false;
                    }
                }
            }

            Action::CastSpell { card, target } => {
                let cost = self.state.card(card).ok_or_else(illegal)?.definition.mana_cost;
                self.cast(player, card, target, CastMode::Normal, cost, action)?;
            }

            Action::Flashback { card, target } => {
                let cost = self
                    .state
                    .card(card)
                    .and_then(|c| c.definition.flashback)
                    .ok_or_else(illegal)?;
                self.cast(player, card, target, CastMode::Flashback, cost, action)?;
            }

            Action::CastAdventure { card, target } => {
                let cost = self
                    .state
                    .card(card)
                    .and_then(|c| c.definition.adventure.as_ref().map(|a| a.mana_cost))
                    .ok_or_else(illegal)?;
                self.cast(player, card, target, CastMode::Adventure, cost, action)?;
            }

            Action::ActivateFetch { card } => {
                let source = self.state.card(card).ok_or_else(illegal)?;
                let name = source.name().to_string();
                let fetch = source.definition.fetch.clone().ok_or_else(illegal)?;

                self.state.log.push(format!(
                    "{} sacrifices {} and pays {} life",
                    self.state.player_name(player),
                    name,
                    fetch.life_cost
                ));
                self.state.adjust_life(player, -fetch.life_cost);
                if self.state.is_game_over() {
                    return Ok(());
                }
                ops::remove_from_battlefield(&mut self.state, &mut self.handlers, &chain, card, Zone::Graveyard)?;
                if self.state.is_game_over() {
                    return Ok(());
                }

                let effect = Effect::SearchLibrary {
                    land_types: fetch.land_types,
                    to: Zone::Battlefield,
                    tapped: fetch.tapped,
                };
                self.push_ability(player, card, name, "search".into(), effect, None);
            }

            Action::ActivateAbility { card, index, target } => {
                let source = self.state.card(card).ok_or_else(illegal)?;
                let name = source.name().to_string();
                let ability = source.definition.activated.get(index).cloned().ok_or_else(illegal)?;

                self.pay(player, &ability.cost, ability.tap.then_some(card), action)?;
                if let Some(source) = self.state.card_mut(card) {
                    source.tapped |= ability.tap;
                    if ability.once_per_turn {
                        source.abilities_used.push(index);
                    }
                }
                if ability.sacrifice {
                    ops::remove_from_battlefield(&mut self.state, &mut self.handlers, &chain, card, Zone::Graveyard)?;
                    if self.state.is_game_over() {
                        return Ok(());
                    }
                }
                self.push_ability(player, card, name, ability.label, ability.effect, target);
            }

            Action::ActivateLoyalty { card, index, target } => {
                let source = self.state.card_mut(card).ok_or_else(illegal)?;
                let ability = source.definition.loyalty_abilities.get(index).cloned().ok_or_else(illegal)?;
                source.loyalty += ability.loyalty;
                source.loyalty_used = true;
                let name = source.name().to_string();

                let label = format!("{:+}", ability.loyalty);
                self.push_ability(player, card, name, label, ability.effect, target);
            }

            Action::Cycle { card } => {
                let cost = self
                    .state
                    .card(card)
                    .and_then(|c| c.definition.cycling)
                    .ok_or_else(illegal)?;
                self.pay(player, &cost, None, action)?;

                let cycled = self.state.players[player]
                    .zones
                    .take_from(Zone::Hand, card)
                    .ok_or_else(illegal)?;
                let name = cycled.name().to_string();
                self.state
                    .log
                    .push(format!("{} cycles {}", self.state.player_name(player), name));
                self.state.players[player]
                    .zones
                    .put(Zone::Graveyard, cycled, ZonePosition::Bottom);
                self.push_ability(player, card, name, "cycling".into(), Effect::draw(1), None);
            }

            Action::Ninjutsu { card, attacker } => {
                let cost = self
                    .state
                    .card(card)
                    .and_then(|c| c.definition.ninjutsu)
                    .ok_or_else(illegal)?;
                self.pay(player, &cost, None, action)?;

                let ninja = self.state.players[player]
                    .zones
                    .take_from(Zone::Hand, card)
                    .ok_or_else(illegal)?;
                self.state.log.push(format!(
                    "{} uses ninjutsu on {}",
                    self.state.player_name(player),
                    ninja.name()
                ));
                ops::remove_from_battlefield(&mut self.state, &mut self.handlers, &chain, attacker, Zone::Hand)?;
                ops::put_onto_battlefield(&mut self.state, &mut self.handlers, &chain, ninja, player, true)?;
                if !self.state.is_game_over() {
                    self.state.combat.attackers.push(card);
                }
            }
        }
        Ok(())
    }

    fn pay(&mut self, player: PlayerId, cost: &ManaCost, exclude: Option<EntityId>, action: &Action) -> SimResult<()> {
        if mana::pay(&mut self.state, player, cost, exclude) {
            Ok(())
        } else {
            Err(SimError::IllegalAction {
                player,
                action: action.clone(),
            })
        }
    }

    fn cast(
        &mut self,
        player: PlayerId,
        card: EntityId,
        target: Option<Target>,
        mode: CastMode,
        cost: ManaCost,
        action: &Action,
    ) -> SimResult<()> {
        let illegal = || SimError::IllegalAction {
            player,
            action: action.clone(),
        };
        let (holder, zone) = self.state.locate(card).ok_or_else(illegal)?;

        self.pay(player, &cost, None, action)?;
        let spell = self.state.players[holder]
            .zones
            .take_from(zone, card)
            .ok_or_else(illegal)?;

        let entry = self.state.stack.push(player, StackItem::Spell { card: spell, mode }, target);
        let name = self
            .state
            .stack
            .get(entry)
            .map_or_else(String::new, |e| e.name().to_string());
        let aim = target.map_or_else(String::new, |t| format!(" targeting {}", self.describe(t)));
        self.state
            .log
            .push(format!("{} casts {}{}", self.state.player_name(player), name, aim));

        triggers::fire(
            &mut self.state,
            &mut self.handlers,
            &GameEvent::spell_cast(card, player),
            &TriggerChain::root(),
        )
    }

    fn push_ability(
        &mut self,
        player: PlayerId,
        source: EntityId,
        source_name: String,
        label: String,
        effect: Effect,
        target: Option<Target>,
    ) {
        let label = format!("{source_name} ({label})");
        let aim = target.map_or_else(String::new, |t| format!(" targeting {}", self.describe(t)));
        self.state
            .log
            .push(format!("{} activates {}{}", self.state.player_name(player), label, aim));
        self.state.stack.push(
            player,
            StackItem::Ability {
                source,
                source_name,
                label,
                effect,
            },
            target,
        );
    }

    fn describe(&self, target: Target) -> String {
        match target {
            Target::Player(player) => self.state.player_name(player).to_string(),
            Target::Card(id) => self
                .state
                .card(id)
                .map_or_else(|| id.to_string(), |card| card.name().to_string()),
            Target::Spell(id) => self
                .state
                .stack
                .get(id)
                .map_or_else(|| id.to_string(), |entry| entry.name().to_string()),
        }
    }

    // === Resolution ===

    /// Resolve the top of the stack.
    ///
    /// A cast-time target that is no longer legal fizzles the entry.
    pub fn resolve_top(&mut self) -> SimResult<()> {
        let Some(entry) = self.state.stack.peek_top().cloned() else {
            return Ok(());
        };
        let name = entry.name().to_string();
        debug!("resolving {}", name);

        if let Some(target) = entry.target {
            let spec = entry.effect().map(|effect| effect.target_spec().clone()).unwrap_or_default();
            if !TargetSelector::is_legal(&self.state, entry.controller, &spec, target) {
                self.state.log.push(format!("{name} fizzles"));
                self.finish_entry(entry.id, false);
                return Ok(());
            }
        }

        self.state.log.push(format!("{name} resolves"));

        let permanent = matches!(
            &entry.item,
            StackItem::Spell { card, mode: CastMode::Normal } if card.definition.types.is_permanent()
        );
        if permanent {
            if let Some(resolved) = self.state.stack.remove(entry.id) {
                if let StackItem::Spell { card, .. } = resolved.item {
                    ops::put_onto_battlefield(
                        &mut self.state,
                        &mut self.handlers,
                        &TriggerChain::root(),
                        card,
                        resolved.controller,
                        false,
                    )?;
                }
            }
            return Ok(());
        }

        if let Some(effect) = entry.effect() {
            let mut ctx = EffectContext::new(
                &mut self.state,
                &mut self.handlers,
                entry.controller,
                entry.source(),
                name,
                TriggerChain::root(),
            )
            .with_target(entry.target);
            EffectResolver::resolve(effect, &mut ctx)?;
        }
        self.finish_entry(entry.id, true);
        Ok(())
    }

    /// Take a finished entry off the stack and put its card where it goes.
    fn finish_entry(&mut self, id: StackEntryId, resolved: bool) {
        let Some(entry) = self.state.stack.remove(id) else {
            return;
        };
        let StackItem::Spell { mut card, mode } = entry.item else {
            return;
        };

        card.reset_status();
        let to = match mode {
            CastMode::Flashback => Zone::Exile,
            CastMode::Adventure if resolved => {
                card.on_adventure = true;
                Zone::Exile
            }
            CastMode::Normal | CastMode::Adventure => Zone::Graveyard,
        };
        let owner = card.owner;
        self.state.players[owner].zones.put(to, card, ZonePosition::Bottom);
    }
}
