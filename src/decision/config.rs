//! Heuristic bot configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Scoring weights and pacing for `HeuristicBot`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BotConfig {
    /// Minimum score an action needs to be taken over passing.
    pub pass_threshold: f64,

    /// Synthetic pause before each priority decision.
    /// Zero for batch runs; never changes the chosen action.
    pub decision_delay: Duration,

    /// Score per point of mana value spent.
    pub mana_efficiency_weight: f64,

    /// Score per point of power and toughness added or removed.
    pub board_impact_weight: f64,

    /// Score per point of damage to the opponent's face.
    pub face_damage_weight: f64,

    /// Score per card drawn.
    pub card_draw_weight: f64,

    /// Flat score for making the turn's land drop.
    pub land_drop_score: f64,

    /// Flat score for cracking a fetch land.
    pub fetch_score: f64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            pass_threshold: 0.0,
            decision_delay: Duration::ZERO,
            mana_efficiency_weight: 1.0,
            board_impact_weight: 1.5,
            face_damage_weight: 1.0,
            card_draw_weight: 2.0,
            land_drop_score: 100.0,
            fetch_score: 50.0,
        }
    }
}

impl BotConfig {
    /// Set the pass threshold.
    #[must_use]
    pub fn with_pass_threshold(mut self, threshold: f64) -> Self {
        self.pass_threshold = threshold;
        self
    }

    /// Set the per-decision delay.
    #[must_use]
    pub fn with_decision_delay(mut self, delay: Duration) -> Self {
        self.decision_delay = delay;
        self
    }

    #[must_use]
    pub fn with_face_damage_weight(mut self, weight: f64) -> Self {
        self.face_damage_weight = weight;
        self
    }

    #[must_use]
    pub fn with_board_impact_weight(mut self, weight: f64) -> Self {
        self.board_impact_weight = weight;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BotConfig::default();
        assert_eq!(config.decision_delay, Duration::ZERO);
        assert!(config.land_drop_score > config.fetch_score);
    }

    #[test]
    fn test_builder_pattern() {
        let config = BotConfig::default()
            .with_pass_threshold(3.0)
            .with_decision_delay(Duration::from_millis(5))
            .with_face_damage_weight(2.5);

        assert_eq!(config.pass_threshold, 3.0);
        assert_eq!(config.decision_delay, Duration::from_millis(5));
        assert_eq!(config.face_damage_weight, 2.5);
    }

    #[test]
    fn test_serialization() {
        let config = BotConfig::default().with_board_impact_weight(4.0);
        let json = serde_json::to_string(&config).unwrap();
        let restored: BotConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config, restored);
    }
}
