//! Batch runner: many seeded games in parallel, then aggregate statistics.

use std::time::Duration;

use log::{info, warn};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};

use crate::core::{PlayerId, SimConfig};
use crate::decision::{handler_pair, Handlers, HeuristicBot};
use crate::error::{BatchError, DeckError};

use super::{CancellationToken, GameRun, PlayerSeat, SimulationResult, SimulationRunner};

/// Configuration for a batch of games.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of games to play.
    pub games: usize,

    /// Worker threads (0 = one per core).
    pub workers: usize,

    /// Settings for every game. Game `i` uses seed `sim.seed + i`.
    pub sim: SimConfig,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            games: 100,
            workers: 0,
            sim: SimConfig::default(),
        }
    }
}

impl BatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_games(mut self, games: usize) -> Self {
        self.games = games;
        self
    }

    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    #[must_use]
    pub fn with_sim(mut self, sim: SimConfig) -> Self {
        self.sim = sim;
        self
    }
}

/// A game that failed instead of finishing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameFailure {
    pub index: usize,
    pub seed: u64,
    pub message: String,
    /// Failed on the trigger depth cap rather than a bad handler answer.
    pub recursion: bool,
}

/// Aggregate statistics over a batch.
///
/// Failed games are listed in `failures` and excluded from every count
/// and mean. `results` is in game-index order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub total_games: usize,
    pub player_one_wins: usize,
    pub player_two_wins: usize,
    pub draws: usize,
    /// `player_one_wins / total_games`, or 0 with no games.
    pub player_one_win_rate: f64,
    pub average_game_length: f64,
    pub average_life_differential: f64,
    pub results: Vec<SimulationResult>,
    pub failures: Vec<GameFailure>,
    /// The token was set before every game could run.
    pub cancelled: bool,
}

impl BatchResult {
    /// Aggregate completed results.
    #[must_use]
    pub fn from_results(results: Vec<SimulationResult>, failures: Vec<GameFailure>, cancelled: bool) -> Self {
        let wins = |seat: PlayerId| {
            results
                .iter()
                .filter(|result| result.winning_seat == Some(seat))
                .count()
        };
        let total_games = results.len();
        let player_one_wins = wins(PlayerId::ONE);
        let player_two_wins = wins(PlayerId::TWO);
        let draws = results.iter().filter(|result| result.is_draw()).count();

        let mean = |sum: f64| {
            if total_games == 0 {
                0.0
            } else {
                sum / total_games as f64
            }
        };
        let player_one_win_rate = mean(player_one_wins as f64);
        let average_game_length = mean(results.iter().map(|r| f64::from(r.turns)).sum());
        let average_life_differential = mean(results.iter().map(|r| f64::from(r.life_differential())).sum());

        Self {
            total_games,
            player_one_wins,
            player_two_wins,
            draws,
            player_one_win_rate,
            average_game_length,
            average_life_differential,
            results,
            failures,
            cancelled,
        }
    }
}

enum Outcome {
    Finished(SimulationResult),
    Failed(GameFailure),
    Skipped,
}

/// Runs a batch of games between two decks.
#[derive(Clone, Debug)]
pub struct BatchRunner {
    runner: SimulationRunner,
    config: BatchConfig,
}

impl BatchRunner {
    /// Validate both decks and build a batch runner.
    ///
    /// Bot pacing is for watched games only; batch games never sleep.
    pub fn new(one: PlayerSeat, two: PlayerSeat, mut config: BatchConfig) -> Result<Self, DeckError> {
        config.sim.bot.decision_delay = Duration::ZERO;
        let runner = SimulationRunner::new(one, two, config.sim.clone())?;
        Ok(Self { runner, config })
    }

    #[must_use]
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Play every game with heuristic bots and aggregate. Games not yet
    /// started when `cancel` is set are skipped; finished results are kept.
    pub fn run(&self, cancel: &CancellationToken) -> Result<BatchResult, BatchError> {
        let bot = &self.config.sim.bot;
        self.run_with(|_| handler_pair(HeuristicBot::new(bot.clone()), HeuristicBot::new(bot.clone())), cancel)
    }

    /// Play every game with handlers built by `handlers` for each game
    /// index, then aggregate.
    pub fn run_with<F>(&self, handlers: F, cancel: &CancellationToken) -> Result<BatchResult, BatchError>
    where
        F: Fn(usize) -> Handlers + Sync,
    {
        if cancel.is_cancelled() {
            info!("batch cancelled before the first game");
            return Ok(BatchResult::from_results(Vec::new(), Vec::new(), true));
        }

        let pool = ThreadPoolBuilder::new().num_threads(self.config.workers).build()?;
        let base_seed = self.config.sim.seed;

        let outcomes: Vec<Outcome> = pool.install(|| {
            (0..self.config.games)
                .into_par_iter()
                .map(|index| self.play(index, base_seed.wrapping_add(index as u64), &handlers, cancel))
                .collect()
        });

        let mut results = Vec::new();
        let mut failures = Vec::new();
        let mut skipped = false;
        for outcome in outcomes {
            match outcome {
                Outcome::Finished(result) => results.push(result),
                Outcome::Failed(failure) => failures.push(failure),
                Outcome::Skipped => skipped = true,
            }
        }

        let batch = BatchResult::from_results(results, failures, skipped);
        info!(
            "batch of {} games: {} / {} / {} draws, {} failed{}",
            batch.total_games,
            batch.player_one_wins,
            batch.player_two_wins,
            batch.draws,
            batch.failures.len(),
            if batch.cancelled { ", cancelled" } else { "" }
        );
        Ok(batch)
    }

    fn play<F>(&self, index: usize, seed: u64, handlers: &F, cancel: &CancellationToken) -> Outcome
    where
        F: Fn(usize) -> Handlers + Sync,
    {
        if cancel.is_cancelled() {
            return Outcome::Skipped;
        }
        match self.runner.run_with(handlers(index), seed, cancel) {
            Ok(GameRun::Completed(result)) => Outcome::Finished(result),
            Ok(GameRun::Cancelled) => Outcome::Skipped,
            Err(err) => {
                warn!("game {} (seed {}) failed: {}", index, seed, err);
                Outcome::Failed(GameFailure {
                    index,
                    seed,
                    message: err.to_string(),
                    recursion: err.is_recursion(),
                })
            }
        }
    }
}
