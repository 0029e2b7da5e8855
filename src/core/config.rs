//! Game configuration types.
//!
//! - `Phase`: the fixed turn structure, Untap through Cleanup
//! - `FirstPlayer`: who takes the first turn
//! - `SimConfig`: every tunable a single game reads
//!
//! Configuration is plain data with builder methods, so collaborators can
//! load it from JSON and tests can tweak one field at a time.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::PlayerId;
use crate::decision::BotConfig;

/// A step of the turn.
///
/// The engine walks these in declaration order once per turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Untap,
    Upkeep,
    Draw,
    Main1,
    BeginCombat,
    DeclareAttackers,
    DeclareBlockers,
    CombatDamage,
    EndCombat,
    Main2,
    End,
    Cleanup,
}

impl Phase {
    /// Every step in turn order.
    pub const ORDER: [Phase; 12] = [
        Phase::Untap,
        Phase::Upkeep,
        Phase::Draw,
        Phase::Main1,
        Phase::BeginCombat,
        Phase::DeclareAttackers,
        Phase::DeclareBlockers,
        Phase::CombatDamage,
        Phase::EndCombat,
        Phase::Main2,
        Phase::End,
        Phase::Cleanup,
    ];

    /// The following step, or `None` after Cleanup.
    #[must_use]
    pub fn next(self) -> Option<Phase> {
        let idx = Self::ORDER.iter().position(|p| *p == self)?;
        Self::ORDER.get(idx + 1).copied()
    }

    /// Main phases allow sorcery-speed actions.
    #[must_use]
    pub const fn is_main(self) -> bool {
        matches!(self, Phase::Main1 | Phase::Main2)
    }

    /// Steps of the combat phase.
    #[must_use]
    pub const fn is_combat(self) -> bool {
        matches!(
            self,
            Phase::BeginCombat
                | Phase::DeclareAttackers
                | Phase::DeclareBlockers
                | Phase::CombatDamage
                | Phase::EndCombat
        )
    }

    /// Whether players receive priority during this step.
    ///
    /// Nobody gets priority during Untap or Cleanup.
    #[must_use]
    pub const fn opens_priority(self) -> bool {
        !matches!(self, Phase::Untap | Phase::Cleanup)
    }

    /// Short human-readable name used in the game log.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Phase::Untap => "untap",
            Phase::Upkeep => "upkeep",
            Phase::Draw => "draw",
            Phase::Main1 => "first main",
            Phase::BeginCombat => "beginning of combat",
            Phase::DeclareAttackers => "declare attackers",
            Phase::DeclareBlockers => "declare blockers",
            Phase::CombatDamage => "combat damage",
            Phase::EndCombat => "end of combat",
            Phase::Main2 => "second main",
            Phase::End => "end",
            Phase::Cleanup => "cleanup",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Who takes the first turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FirstPlayer {
    /// The first seat always starts.
    #[default]
    PlayerOne,
    /// The second seat always starts.
    PlayerTwo,
    /// A seeded coin flip decides.
    CoinFlip,
}

/// Configuration for one simulated game.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimConfig {
    /// Life total each player starts with.
    pub starting_life: i32,

    /// Cards drawn for the opening hand.
    pub opening_hand: usize,

    /// Hand size enforced during cleanup.
    pub max_hand_size: usize,

    /// Turn ceiling; reaching it ends the game in a draw.
    pub turn_limit: u32,

    /// Maximum nesting of trigger resolution before the game fails.
    pub max_trigger_depth: u32,

    /// How many mulligans each player may take.
    pub max_mulligans: u32,

    /// Seed for shuffles and coin flips.
    pub seed: u64,

    /// Who takes the first turn.
    pub first_player: FirstPlayer,

    /// Policy knobs for the heuristic bots the runners create.
    pub bot: BotConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            starting_life: 20,
            opening_hand: 7,
            max_hand_size: 7,
            turn_limit: 100,
            max_trigger_depth: 64,
            max_mulligans: 1,
            seed: 0,
            first_player: FirstPlayer::PlayerOne,
            bot: BotConfig::default(),
        }
    }
}

impl SimConfig {
    /// Set the shuffle seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Override the turn ceiling.
    #[must_use]
    pub fn with_turn_limit(mut self, turns: u32) -> Self {
        self.turn_limit = turns;
        self
    }

    /// Override the trigger nesting cap.
    #[must_use]
    pub fn with_max_trigger_depth(mut self, depth: u32) -> Self {
        self.max_trigger_depth = depth;
        self
    }

    /// Set the starting life total.
    #[must_use]
    pub fn with_starting_life(mut self, life: i32) -> Self {
        self.starting_life = life;
        self
    }

    /// Set how many mulligans are allowed (0 disables them).
    #[must_use]
    pub fn with_max_mulligans(mut self, count: u32) -> Self {
        self.max_mulligans = count;
        self
    }

    /// Choose who plays first.
    #[must_use]
    pub fn with_first_player(mut self, first: FirstPlayer) -> Self {
        self.first_player = first;
        self
    }

    /// Set the per-decision pacing delay of the heuristic bots.
    #[must_use]
    pub fn with_decision_delay(mut self, delay: Duration) -> Self {
        self.bot.decision_delay = delay;
        self
    }

    /// Replace the bot configuration.
    #[must_use]
    pub fn with_bot(mut self, bot: BotConfig) -> Self {
        self.bot = bot;
        self
    }

    /// Resolve `first_player` into a seat, flipping the coin if needed.
    pub fn starting_seat(&self, rng: &mut super::GameRng) -> PlayerId {
        match self.first_player {
            FirstPlayer::PlayerOne => PlayerId::ONE,
            FirstPlayer::PlayerTwo => PlayerId::TWO,
            FirstPlayer::CoinFlip => {
                if rng.gen_bool(0.5) {
                    PlayerId::ONE
                } else {
                    PlayerId::TWO
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_order() {
        assert_eq!(Phase::Untap.next(), Some(Phase::Upkeep));
        assert_eq!(Phase::CombatDamage.next(), Some(Phase::EndCombat));
        assert_eq!(Phase::End.next(), Some(Phase::Cleanup));
        assert_eq!(Phase::Cleanup.next(), None);
    }

    #[test]
    fn test_phase_predicates() {
        assert!(Phase::Main1.is_main());
        assert!(Phase::Main2.is_main());
        assert!(!Phase::End.is_main());
        assert!(Phase::DeclareBlockers.is_combat());
        assert!(!Phase::Main2.is_combat());
        assert!(!Phase::Untap.opens_priority());
        assert!(!Phase::Cleanup.opens_priority());
        assert!(Phase::Upkeep.opens_priority());
    }

    #[test]
    fn test_default_config() {
        let config = SimConfig::default();
        assert_eq!(config.starting_life, 20);
        assert_eq!(config.turn_limit, 100);
        assert_eq!(config.opening_hand, 7);
        assert_eq!(config.first_player, FirstPlayer::PlayerOne);
    }

    #[test]
    fn test_builder_pattern() {
        let config = SimConfig::default()
            .with_seed(9)
            .with_turn_limit(30)
            .with_max_trigger_depth(8)
            .with_max_mulligans(0);

        assert_eq!(config.seed, 9);
        assert_eq!(config.turn_limit, 30);
        assert_eq!(config.max_trigger_depth, 8);
        assert_eq!(config.max_mulligans, 0);
    }

    #[test]
    fn test_coin_flip_is_seeded() {
        let config = SimConfig::default().with_first_player(FirstPlayer::CoinFlip);
        let a = config.starting_seat(&mut crate::core::GameRng::new(3));
        let b = config.starting_seat(&mut crate::core::GameRng::new(3));
        assert_eq!(a, b);
    }

    #[test]
    fn test_serialization() {
        let config = SimConfig::default().with_seed(77);
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: SimConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.seed, 77);
        assert_eq!(deserialized.turn_limit, config.turn_limit);
    }
}
