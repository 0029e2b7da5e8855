//! Property tests over seeds.
//!
//! Each case plays real games, so case counts are kept small.

use proptest::prelude::*;

use duel_sim::cards::{catalog, Decklist};
use duel_sim::core::{GameState, PlayerId, SimConfig};
use duel_sim::decision::{handler_pair, ScriptedHandler};
use duel_sim::rules::GameEngine;
use duel_sim::sim::{BatchConfig, BatchRunner, CancellationToken, PlayerSeat};
use duel_sim::zones::Zone;

fn sorted_names(deck: &Decklist) -> Vec<String> {
    let mut names: Vec<String> = deck.cards.iter().map(|card| card.name.clone()).collect();
    names.sort();
    names
}

fn hand_and_library(state: &GameState, player: PlayerId) -> Vec<String> {
    let zones = &state.players[player].zones;
    let mut names: Vec<String> = zones
        .cards(Zone::Hand)
        .iter()
        .chain(zones.cards(Zone::Library))
        .map(|card| card.name().to_string())
        .collect();
    names.sort();
    names
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    /// Counts add up and every finished game ends inside the turn ceiling.
    #[test]
    fn batch_counts_are_consistent(seed in 0u64..10_000) {
        let config = BatchConfig::new()
            .with_games(3)
            .with_sim(SimConfig::default().with_seed(seed));
        let batch = BatchRunner::new(
            PlayerSeat::new("Ann", catalog::red_burn()),
            PlayerSeat::new("Bo", catalog::green_stompy()),
            config,
        )
        .unwrap()
        .run(&CancellationToken::new())
        .unwrap();

        prop_assert_eq!(batch.player_one_wins + batch.player_two_wins + batch.draws, batch.total_games);
        prop_assert_eq!(batch.total_games + batch.failures.len(), 3);
        prop_assert!((0.0..=1.0).contains(&batch.player_one_win_rate));
        for result in &batch.results {
            prop_assert!((1..=100).contains(&result.turns));
            prop_assert_eq!(result.winner.is_some(), result.winning_seat.is_some());
        }
    }

    /// A mulligan reshuffles and bottoms cards without losing or adding any.
    #[test]
    fn mulligan_keeps_the_deck(seed in any::<u64>()) {
        let deck = catalog::green_stompy();
        let handlers = handler_pair(
            ScriptedHandler::new(Vec::new()).with_mulligan(true),
            ScriptedHandler::new(Vec::new()).with_mulligan(true),
        );
        let config = SimConfig::default().with_seed(seed);
        let mut engine = GameEngine::from_decks([("Ann", &deck), ("Bo", &deck)], handlers, config);

        engine.open_hands().unwrap();

        let expected = sorted_names(&deck);
        for player in PlayerId::both() {
            let state = engine.state();
            prop_assert_eq!(state.players[player].mulligans, 1);
            prop_assert_eq!(state.hand(player).len(), 6);
            prop_assert_eq!(hand_and_library(state, player), expected.clone());
        }
    }
}
