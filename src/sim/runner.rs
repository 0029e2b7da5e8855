//! Single-game runner.

use std::time::{Duration, Instant};

use log::info;
use serde::{Deserialize, Serialize};

use crate::cards::Decklist;
use crate::core::{EndReason, GameState, PlayerId, SimConfig};
use crate::decision::{handler_pair, Handlers, HeuristicBot};
use crate::error::{DeckError, SimResult};
use crate::rules::{GameEngine, RunStatus};

use super::CancellationToken;

/// A named seat and the deck it plays.
#[derive(Clone, Debug)]
pub struct PlayerSeat {
    pub name: String,
    pub deck: Decklist,
}

impl PlayerSeat {
    pub fn new(name: impl Into<String>, deck: Decklist) -> Self {
        Self {
            name: name.into(),
            deck,
        }
    }
}

/// How a single game run ended.
#[derive(Clone, Debug)]
pub enum GameRun {
    Completed(SimulationResult),
    /// Cancelled between turns; the partial game is discarded.
    Cancelled,
}

impl GameRun {
    /// The result, if the game completed.
    #[must_use]
    pub fn completed(self) -> Option<SimulationResult> {
        match self {
            GameRun::Completed(result) => Some(result),
            GameRun::Cancelled => None,
        }
    }
}

/// Summary of one finished game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Winner's name; `None` for a draw.
    pub winner: Option<String>,
    pub loser: Option<String>,
    /// Seat of the winner, so batches can count wins per seat even when
    /// both seats share a name.
    pub winning_seat: Option<PlayerId>,
    pub turns: u32,
    pub player_one_life: i32,
    pub player_two_life: i32,
    pub end_reason: EndReason,
    pub log: Vec<String>,
    pub duration: Duration,
    pub seed: u64,
}

impl SimulationResult {
    fn from_state(state: &GameState, seed: u64, duration: Duration) -> Self {
        let winning_seat = state.winner();
        Self {
            winner: winning_seat.map(|seat| state.player_name(seat).to_string()),
            loser: winning_seat.map(|seat| state.player_name(seat.opponent()).to_string()),
            winning_seat,
            turns: state.turn,
            player_one_life: state.players[PlayerId::ONE].life,
            player_two_life: state.players[PlayerId::TWO].life,
            end_reason: state.end_reason().unwrap_or(EndReason::TurnLimit),
            log: state.log.to_vec(),
            duration,
            seed,
        }
    }

    #[must_use]
    pub fn is_draw(&self) -> bool {
        self.winner.is_none()
    }

    /// Absolute difference between the final life totals.
    #[must_use]
    pub fn life_differential(&self) -> i32 {
        (self.player_one_life - self.player_two_life).abs()
    }
}

/// Runs games between two validated decks.
#[derive(Clone, Debug)]
pub struct SimulationRunner {
    seats: [PlayerSeat; 2],
    config: SimConfig,
}

impl SimulationRunner {
    /// Validate both decks and build a runner.
    pub fn new(one: PlayerSeat, two: PlayerSeat, config: SimConfig) -> Result<Self, DeckError> {
        one.deck.validate()?;
        two.deck.validate()?;
        Ok(Self {
            seats: [one, two],
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    #[must_use]
    pub fn seats(&self) -> &[PlayerSeat; 2] {
        &self.seats
    }

    /// Play one game with heuristic bots on both seats.
    pub fn run(&self, cancel: &CancellationToken) -> SimResult<GameRun> {
        self.run_seeded(self.config.seed, cancel)
    }

    /// Play one game with heuristic bots, overriding the seed.
    pub fn run_seeded(&self, seed: u64, cancel: &CancellationToken) -> SimResult<GameRun> {
        let handlers = handler_pair(
            HeuristicBot::new(self.config.bot.clone()),
            HeuristicBot::new(self.config.bot.clone()),
        );
        self.run_with(handlers, seed, cancel)
    }

    /// Play one game with caller-supplied handlers.
    pub fn run_with(&self, handlers: Handlers, seed: u64, cancel: &CancellationToken) -> SimResult<GameRun> {
        let started = Instant::now();
        let config = self.config.clone().with_seed(seed);
        let [one, two] = &self.seats;

        let mut engine = GameEngine::from_decks(
            [(one.name.as_str(), &one.deck), (two.name.as_str(), &two.deck)],
            handlers,
            config,
        );
        if engine.run(cancel)? == RunStatus::Cancelled {
            return Ok(GameRun::Cancelled);
        }

        let result = SimulationResult::from_state(engine.state(), seed, started.elapsed());
        info!(
            "seed {}: {} after {} turns ({} - {})",
            seed,
            result.winner.as_deref().unwrap_or("draw"),
            result.turns,
            result.player_one_life,
            result.player_two_life
        );
        Ok(GameRun::Completed(result))
    }
}
