//! Game engine integration tests.
//!
//! Whole games and multi-step scenarios driven through `GameEngine`:
//! turn structure, trigger ordering, the trigger depth cap and the
//! terminal conditions.

use duel_sim::cards::{catalog, CardDefinition, CardInstance, Decklist, ManaCost};
use duel_sim::core::{Action, EndReason, EntityId, GameOutcome, GameState, Phase, PlayerId, SimConfig};
use duel_sim::decision::{handler_pair, DecisionHandler, HeuristicBot, PassiveHandler};
use duel_sim::effects::{Effect, Target};
use duel_sim::error::SimError;
use duel_sim::rules::{GameEngine, RunStatus};
use duel_sim::sim::CancellationToken;
use duel_sim::stack::{CastMode, StackItem};
use duel_sim::triggers::{GameEventKind, Trigger};
use duel_sim::zones::{Zone, ZonePosition};

fn place(state: &mut GameState, owner: PlayerId, zone: Zone, def: &CardDefinition) -> EntityId {
    let id = state.allocate_id();
    state.players[owner]
        .zones
        .put(zone, CardInstance::new(id, owner, def), ZonePosition::Bottom);
    id
}

/// When this dies, it comes back and destroys an opposing creature.
fn twin(name: &str) -> CardDefinition {
    CardDefinition::creature(name, ManaCost::generic(2), 2, 2).with_trigger(Trigger::on_death(
        Effect::ReturnSourceToBattlefield.then(Effect::kill_opposing_creature()),
    ))
}

/// Gains its controller 1 life at every upkeep.
fn watcher(name: &str) -> CardDefinition {
    CardDefinition::creature(name, ManaCost::generic(1), 0, 3)
        .with_trigger(Trigger::new(GameEventKind::Upkeep, Effect::gain_life(1)))
}

// =============================================================================
// Turn Limit
// =============================================================================

/// Test that two decks of basic lands play out to a draw at turn 100.
#[test]
fn test_basic_lands_draw_at_turn_limit() {
    let deck = catalog::lands_only("Plains", "Plains");
    let handlers = handler_pair(HeuristicBot::default(), HeuristicBot::default());
    let mut engine = GameEngine::from_decks([("Ann", &deck), ("Bo", &deck)], handlers, SimConfig::default());

    let status = engine.run(&CancellationToken::new()).unwrap();
    let state = engine.state();

    assert_eq!(status, RunStatus::Finished);
    assert_eq!(state.outcome(), GameOutcome::Draw);
    assert_eq!(state.end_reason(), Some(EndReason::TurnLimit));
    assert_eq!(state.turn, 100);
    assert_eq!(state.players[PlayerId::ONE].life, 20);
    assert_eq!(state.players[PlayerId::TWO].life, 20);
}

// =============================================================================
// Terminal Conditions
// =============================================================================

/// Test that the first player to draw from an empty library loses.
#[test]
fn test_decking_loses() {
    let deck = Decklist::new("Tiny").with_copies(catalog::basic("Island"), 10);
    let handlers = handler_pair(PassiveHandler, PassiveHandler);
    let mut engine = GameEngine::from_decks([("Ann", &deck), ("Bo", &deck)], handlers, SimConfig::default());

    engine.run(&CancellationToken::new()).unwrap();
    let state = engine.state();

    // Bo draws on turns 2, 4 and 6, then finds nothing on turn 8.
    assert_eq!(state.winner(), Some(PlayerId::ONE));
    assert_eq!(state.end_reason(), Some(EndReason::Decking));
    assert_eq!(state.turn, 8);
    assert!(state.players[PlayerId::TWO].drew_from_empty);
}

/// Test that a burn deck kills a player who never interacts.
#[test]
fn test_burn_kills_idle_opponent() {
    let burn = catalog::red_burn();
    let lands = catalog::lands_only("Forests", "Forest");
    let handlers = handler_pair(HeuristicBot::default(), PassiveHandler);
    let config = SimConfig::default().with_seed(11);
    let mut engine = GameEngine::from_decks([("Burn", &burn), ("Idle", &lands)], handlers, config);

    engine.run(&CancellationToken::new()).unwrap();
    let state = engine.state();

    assert_eq!(state.winner_name(), Some("Burn"));
    assert_eq!(state.end_reason(), Some(EndReason::LifeTotal));
    assert!(state.players[PlayerId::TWO].life <= 0);
    assert!(state.turn < 100);
}

// =============================================================================
// Triggers
// =============================================================================

/// Test that two creatures whose death triggers kill each other hit the
/// trigger depth cap instead of looping forever.
#[test]
fn test_mutual_death_triggers_fail_game() {
    let config = SimConfig::default();
    let mut state = GameState::new(["Ann", "Bo"], &config);
    state.phase = Phase::Main1;
    let ember = place(&mut state, PlayerId::ONE, Zone::Battlefield, &twin("Ember Twin"));
    place(&mut state, PlayerId::TWO, Zone::Battlefield, &twin("Frost Twin"));

    let id = state.allocate_id();
    let murder = CardInstance::new(id, PlayerId::TWO, &catalog::murder());
    state.stack.push(
        PlayerId::TWO,
        StackItem::Spell {
            card: murder,
            mode: CastMode::Normal,
        },
        Some(Target::Card(ember)),
    );

    let mut engine = GameEngine::new(state, handler_pair(PassiveHandler, PassiveHandler), config);
    let err = engine.resolve_top().unwrap_err();

    match err {
        SimError::UnboundedRecursion { depth, chain } => {
            assert_eq!(depth, 65);
            assert_eq!(chain.len(), 65);
            assert_eq!(chain[0], "Ember Twin");
            assert_eq!(chain[1], "Frost Twin");
        }
        other => panic!("expected UnboundedRecursion, got {other:?}"),
    }
}

/// Test that simultaneous triggers resolve active player first.
#[test]
fn test_upkeep_triggers_in_apnap_order() {
    let config = SimConfig::default();
    let mut state = GameState::new(["Ann", "Bo"], &config);
    state.turn = 2;
    state.is_first_turn = false;
    place(&mut state, PlayerId::TWO, Zone::Battlefield, &watcher("Dusk Watcher"));
    place(&mut state, PlayerId::ONE, Zone::Battlefield, &watcher("Dawn Watcher"));
    for player in PlayerId::both() {
        for _ in 0..5 {
            place(&mut state, player, Zone::Library, &catalog::basic("Plains"));
        }
    }

    let mut engine = GameEngine::new(state, handler_pair(PassiveHandler, PassiveHandler), config);
    engine.play_turn().unwrap();
    engine.play_turn().unwrap();

    let order: Vec<&str> = engine
        .state()
        .log
        .iter()
        .filter(|line| line.contains("ability triggers"))
        .map(|line| if line.starts_with("Dawn") { "dawn" } else { "dusk" })
        .collect();

    assert_eq!(order, vec!["dawn", "dusk", "dusk", "dawn"]);
    assert_eq!(engine.state().players[PlayerId::ONE].life, 22);
    assert_eq!(engine.state().players[PlayerId::TWO].life, 22);
}

// =============================================================================
// Handler Errors
// =============================================================================

struct Cheater;

impl DecisionHandler for Cheater {
    fn choose_action(&mut self, _state: &GameState, _player: PlayerId, _legal: &[Action]) -> Action {
        Action::PlayLand { card: EntityId(9999) }
    }
}

/// Test that an answer outside the legal set fails the game.
#[test]
fn test_illegal_handler_answer_fails_game() {
    let deck = catalog::green_stompy();
    let handlers = handler_pair(Cheater, PassiveHandler);
    let mut engine = GameEngine::from_decks([("Ann", &deck), ("Bo", &deck)], handlers, SimConfig::default());

    let err = engine.run(&CancellationToken::new()).unwrap_err();

    assert_eq!(
        err,
        SimError::IllegalAction {
            player: PlayerId::ONE,
            action: Action::PlayLand { card: EntityId(9999) },
        }
    );
}

// =============================================================================
// Bot Games
// =============================================================================

/// Test that bot-vs-bot games between real decks finish inside the ceiling.
#[test]
fn test_bot_games_finish() {
    for seed in 0..4 {
        let (one, two) = (catalog::green_stompy(), catalog::blue_tempo());
        let handlers = handler_pair(HeuristicBot::default(), HeuristicBot::default());
        let config = SimConfig::default().with_seed(seed);
        let mut engine = GameEngine::from_decks([("Stompy", &one), ("Tempo", &two)], handlers, config);

        let status = engine.run(&CancellationToken::new()).unwrap();

        assert_eq!(status, RunStatus::Finished);
        let state = engine.state();
        assert!(state.is_game_over());
        assert!((1..=100).contains(&state.turn));
    }
}
