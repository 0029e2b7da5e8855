//! Game state.
//!
//! `GameState` is the single source of truth for one game: both players and
//! their zones, the turn/phase position, the stack, combat, the narrated
//! log and the terminal outcome. It is driven by `rules::GameEngine`; the
//! trigger and effect systems mutate it through an `EffectContext`.
//!
//! ## Terminal State
//!
//! Exactly one of these holds: the game is in progress, it is over with a
//! winner, or it is over as a draw. Once over, `adjust_life` and the engine's
//! loop stop changing anything.

use im::Vector;
use serde::{Deserialize, Serialize};

use super::action::{Action, ActionRecord};
use super::config::{Phase, SimConfig};
use super::entity::{EntityAllocator, EntityId};
use super::player::{PlayerId, PlayerMap};
use super::rng::GameRng;
use crate::cards::{CardInstance, Keyword, StaticAbility};
use crate::rules::{CombatState, ManaPool};
use crate::stack::PriorityStack;
use crate::zones::{PlayerZones, Zone};

/// One seat at the table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// No floor: damage past zero still counts.
    pub life: i32,
    pub zones: PlayerZones,
    pub mana_pool: ManaPool,
    /// Lands played this turn.
    pub lands_played: u32,
    /// Tried to draw from an empty library.
    pub drew_from_empty: bool,
    /// Mulligans taken before the game began.
    pub mulligans: u32,
}

impl Player {
    #[must_use]
    pub fn new(id: PlayerId, name: impl Into<String>, life: i32) -> Self {
        Self {
            id,
            name: name.into(),
            life,
            zones: PlayerZones::default(),
            mana_pool: ManaPool::default(),
            lands_played: 0,
            drew_from_empty: false,
            mulligans: 0,
        }
    }
}

/// Append-only narration of the game.
///
/// Persistent vector, so cloning a state (or a result) shares the lines.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GameLog {
    lines: Vector<String>,
}

impl GameLog {
    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push_back(line.into());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<&String> {
        self.lines.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.lines.iter()
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        self.lines.iter().cloned().collect()
    }
}

/// How the game stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    InProgress,
    Won(PlayerId),
    Draw,
}

/// Why the game ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// The loser's life reached zero or less.
    LifeTotal,
    /// The loser drew from an empty library.
    Decking,
    /// Both players lost at the same time.
    SimultaneousLoss,
    /// The turn ceiling was reached.
    TurnLimit,
}

/// Complete game state.
#[derive(Clone, Debug)]
pub struct GameState {
    pub players: PlayerMap<Player>,

    /// Turn number, starting at 1.
    pub turn: u32,

    pub active_player: PlayerId,

    pub phase: Phase,

    /// Spells and abilities waiting to resolve, plus who holds priority.
    pub stack: PriorityStack,

    pub log: GameLog,

    /// Every non-pass action taken, in order.
    pub history: Vector<ActionRecord>,

    /// Still the first turn of the game (no draw for the starting player).
    pub is_first_turn: bool,

    pub combat: CombatState,

    pub rng: GameRng,

    pub max_hand_size: usize,

    pub max_trigger_depth: u32,

    ids: EntityAllocator,

    outcome: GameOutcome,

    end_reason: Option<EndReason>,
}

impl GameState {
    /// Create an empty game: no cards yet, starting life, the first
    /// player chosen per `config`.
    pub fn new<S: Into<String>>(names: [S; 2], config: &SimConfig) -> Self {
        let [one, two] = names;
        let mut rng = GameRng::new(config.seed);
        let active_player = config.starting_seat(&mut rng);

        Self {
            players: PlayerMap::from_pair(
                Player::new(PlayerId::ONE, one, config.starting_life),
                Player::new(PlayerId::TWO, two, config.starting_life),
            ),
            turn: 1,
            active_player,
            phase: Phase::Untap,
            stack: PriorityStack::new(active_player),
            log: GameLog::default(),
            history: Vector::new(),
            is_first_turn: true,
            combat: CombatState::default(),
            rng,
            max_hand_size: config.max_hand_size,
            max_trigger_depth: config.max_trigger_depth,
            ids: EntityAllocator::default(),
            outcome: GameOutcome::InProgress,
            end_reason: None,
        }
    }

    /// Mint a fresh entity id.
    pub fn allocate_id(&mut self) -> EntityId {
        self.ids.allocate()
    }

    // === Players ===

    #[must_use]
    pub fn player_name(&self, player: PlayerId) -> &str {
        &self.players[player].name
    }

    #[must_use]
    pub fn priority_player(&self) -> PlayerId {
        self.stack.priority_player()
    }

    #[must_use]
    pub fn non_active_player(&self) -> PlayerId {
        self.active_player.opponent()
    }

    // === Cards ===

    #[must_use]
    pub fn battlefield(&self, player: PlayerId) -> &[CardInstance] {
        self.players[player].zones.cards(Zone::Battlefield)
    }

    #[must_use]
    pub fn hand(&self, player: PlayerId) -> &[CardInstance] {
        self.players[player].zones.cards(Zone::Hand)
    }

    /// Find a card in any zone or on the stack.
    #[must_use]
    pub fn card(&self, id: EntityId) -> Option<&CardInstance> {
        self.players
            .iter()
            .find_map(|(_, player)| player.zones.get(id))
            .or_else(|| self.stack.find_card(id))
    }

    /// Find a card in any zone (cards on the stack are not mutable here).
    pub fn card_mut(&mut self, id: EntityId) -> Option<&mut CardInstance> {
        let (owner, _) = self.locate(id)?;
        self.players[owner].zones.get_mut(id)
    }

    /// Which player's zone holds a card.
    #[must_use]
    pub fn locate(&self, id: EntityId) -> Option<(PlayerId, Zone)> {
        self.players
            .iter()
            .find_map(|(pid, player)| player.zones.locate(id).map(|zone| (pid, zone)))
    }

    pub fn shuffle_library(&mut self, player: PlayerId) {
        self.players[player].zones.shuffle_library(&mut self.rng);
    }

    // === Static Abilities ===

    /// Power after anthems from other permanents.
    #[must_use]
    pub fn effective_power(&self, id: EntityId) -> i32 {
        self.card(id)
            .map_or(0, |card| card.base_power() + self.anthem_bonus(card).0)
    }

    /// Toughness after anthems from other permanents.
    #[must_use]
    pub fn effective_toughness(&self, id: EntityId) -> i32 {
        self.card(id)
            .map_or(0, |card| card.base_toughness() + self.anthem_bonus(card).1)
    }

    /// Printed keywords plus those granted by permanents its controller
    /// controls.
    #[must_use]
    pub fn has_keyword(&self, id: EntityId, keyword: Keyword) -> bool {
        let Some(card) = self.card(id) else {
            return false;
        };
        if card.has_keyword(keyword) {
            return true;
        }
        if !card.is_creature() || self.locate(id).map(|(_, zone)| zone) != Some(Zone::Battlefield) {
            return false;
        }
        self.battlefield(card.controller).iter().any(|other| {
            other
                .definition
                .statics
                .iter()
                .any(|s| matches!(s, StaticAbility::GrantKeyword(k) if *k == keyword))
        })
    }

    fn anthem_bonus(&self, card: &CardInstance) -> (i32, i32) {
        if !card.is_creature() || self.locate(card.id).map(|(_, zone)| zone) != Some(Zone::Battlefield) {
            return (0, 0);
        }

        let mut bonus = (0, 0);
        for other in self.battlefield(card.controller) {
            if other.id == card.id {
                continue;
            }
            for ability in &other.definition.statics {
                if let StaticAbility::Anthem { power, toughness, subtype } = ability {
                    let applies = subtype.as_ref().map_or(true, |s| card.definition.has_subtype(s));
                    if applies {
                        bonus.0 += power;
                        bonus.1 += toughness;
                    }
                }
            }
        }
        bonus
    }

    // === Life & Terminal State ===

    /// Change a player's life total and re-check for a loss.
    pub fn adjust_life(&mut self, player: PlayerId, delta: i32) {
        if self.is_game_over() {
            return;
        }
        self.players[player].life += delta;
        self.check_terminal();
    }

    /// Apply several life changes as one event, then re-check once, so
    /// players dropping to zero together draw.
    pub fn adjust_life_many(&mut self, changes: &[(PlayerId, i32)]) {
        if self.is_game_over() {
            return;
        }
        for &(player, delta) in changes {
            self.players[player].life += delta;
        }
        self.check_terminal();
    }

    /// Decide the game if either player has lost.
    ///
    /// A player loses at life ≤ 0 or after drawing from an empty library.
    /// Both losing at once is a draw.
    pub fn check_terminal(&mut self) {
        if self.is_game_over() {
            return;
        }

        let lost = self
            .players
            .map(|_, p| p.life <= 0 || p.drew_from_empty);

        match (lost[PlayerId::ONE], lost[PlayerId::TWO]) {
            (false, false) => {}
            (true, true) => self.end_in_draw(EndReason::SimultaneousLoss),
            (one_lost, _) => {
                let loser = if one_lost { PlayerId::ONE } else { PlayerId::TWO };
                let reason = if self.players[loser].life <= 0 {
                    EndReason::LifeTotal
                } else {
                    EndReason::Decking
                };
                let winner = loser.opponent();
                self.outcome = GameOutcome::Won(winner);
                self.end_reason = Some(reason);
                self.log.push(format!(
                    "{} wins ({} {})",
                    self.players[winner].name,
                    self.players[loser].name,
                    match reason {
                        EndReason::Decking => "drew from an empty library",
                        _ => "has no life left",
                    }
                ));
            }
        }
    }

    /// End the game with no winner.
    pub fn end_in_draw(&mut self, reason: EndReason) {
        if self.is_game_over() {
            return;
        }
        self.outcome = GameOutcome::Draw;
        self.end_reason = Some(reason);
        self.log.push(format!("The game is a draw ({reason:?})"));
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.outcome != GameOutcome::InProgress
    }

    #[must_use]
    pub fn outcome(&self) -> GameOutcome {
        self.outcome
    }

    #[must_use]
    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    #[must_use]
    pub fn winner(&self) -> Option<PlayerId> {
        match self.outcome {
            GameOutcome::Won(player) => Some(player),
            _ => None,
        }
    }

    /// The winner's display name; `None` while in progress or for a draw.
    #[must_use]
    pub fn winner_name(&self) -> Option<&str> {
        self.winner().map(|p| self.player_name(p))
    }

    // === History ===

    /// Record a non-pass action.
    pub fn record(&mut self, player: PlayerId, action: Action) {
        self.history.push_back(ActionRecord::new(self.turn, player, action));
    }
}
