//! Legal action enumeration.
//!
//! When does each action kind apply? One row per kind in `TIMING_TABLE`;
//! `legal_actions` then adds the per-card requirements (costs, zones,
//! targets) on top.
//!
//! ## Timing
//!
//! | Kind              | Timing                                   |
//! |-------------------|------------------------------------------|
//! | `PassPriority`    | any priority window                      |
//! | `PlayLand`        | sorcery speed, one per turn              |
//! | `CastSpell`       | the card's own speed                     |
//! | `Flashback`       | the card's own speed                     |
//! | `CastAdventure`   | the adventure's own speed                |
//! | `ActivateFetch`   | any priority window                      |
//! | `ActivateAbility` | any window, unless marked sorcery speed  |
//! | `ActivateLoyalty` | sorcery speed, once per turn             |
//! | `Cycle`           | any priority window                      |
//! | `Ninjutsu`        | own declare blockers step                |
//! | `TapForMana`      | any priority window                      |
//! | `UntapForMana`    | any priority window                      |

use crate::cards::CardInstance;
use crate::core::{Action, ActionKind, GameState, Phase, PlayerId};
use crate::effects::{Target, TargetSelector, TargetSpec};
use crate::zones::Zone;

use super::mana::{can_pay, can_tap_for_mana};

/// When an action kind may be taken.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Timing {
    /// Whenever the player holds priority.
    Anytime,
    /// Own main phase with an empty stack.
    SorcerySpeed,
    /// Instant speed for instant-speed cards, sorcery speed otherwise.
    CardSpeed,
    /// Own declare blockers step.
    NinjutsuWindow,
}

pub const TIMING_TABLE: [(ActionKind, Timing); 12] = [
    (ActionKind::PassPriority, Timing::Anytime),
    (ActionKind::PlayLand, Timing::SorcerySpeed),
    (ActionKind::CastSpell, Timing::CardSpeed),
    (ActionKind::Flashback, Timing::CardSpeed),
    (ActionKind::CastAdventure, Timing::CardSpeed),
    (ActionKind::ActivateFetch, Timing::Anytime),
    (ActionKind::ActivateAbility, Timing::Anytime),
    (ActionKind::ActivateLoyalty, Timing::SorcerySpeed),
    (ActionKind::Cycle, Timing::Anytime),
    (ActionKind::Ninjutsu, Timing::NinjutsuWindow),
    (ActionKind::TapForMana, Timing::Anytime),
    (ActionKind::UntapForMana, Timing::Anytime),
];

#[must_use]
pub fn timing(kind: ActionKind) -> Timing {
    TIMING_TABLE
        .iter()
        .find(|(k, _)| *k == kind)
        .map_or(Timing::SorcerySpeed, |(_, timing)| *timing)
}

/// Own main phase, empty stack.
#[must_use]
pub fn is_sorcery_window(state: &GameState, player: PlayerId) -> bool {
    state.active_player == player && state.phase.is_main() && state.stack.is_empty()
}

/// Whether the timing table allows `kind` for `player` right now.
/// `instant_speed` is the speed of the card involved, used by `CardSpeed`.
#[must_use]
pub fn timing_allows(state: &GameState, player: PlayerId, kind: ActionKind, instant_speed: bool) -> bool {
    match timing(kind) {
        Timing::Anytime => true,
        Timing::SorcerySpeed => is_sorcery_window(state, player),
        Timing::CardSpeed => instant_speed || is_sorcery_window(state, player),
        Timing::NinjutsuWindow => state.active_player == player && state.phase == Phase::DeclareBlockers,
    }
}

/// Every legal action for `player`, pass first, then grouped by kind in
/// `ActionKind::ALL` order. Targeted actions appear once per legal target
/// and not at all without one.
#[must_use]
pub fn legal_actions(state: &GameState, player: PlayerId) -> Vec<Action> {
    let mut actions = vec![Action::PassPriority];
    if state.is_game_over() {
        return actions;
    }

    for kind in ActionKind::ALL {
        match kind {
            ActionKind::PassPriority => {}
            ActionKind::PlayLand => play_land(state, player, &mut actions),
            ActionKind::CastSpell => cast_spell(state, player, &mut actions),
            ActionKind::Flashback => flashback(state, player, &mut actions),
            ActionKind::CastAdventure => cast_adventure(state, player, &mut actions),
            ActionKind::ActivateFetch => activate_fetch(state, player, &mut actions),
            ActionKind::ActivateAbility => activate_ability(state, player, &mut actions),
            ActionKind::ActivateLoyalty => activate_loyalty(state, player, &mut actions),
            ActionKind::Cycle => cycle(state, player, &mut actions),
            ActionKind::Ninjutsu => ninjutsu(state, player, &mut actions),
            ActionKind::TapForMana => tap_for_mana(state, player, &mut actions),
            ActionKind::UntapForMana => {
                for card in state.players[player].mana_pool.undoable_sources() {
                    actions.push(Action::UntapForMana { card });
                }
            }
        }
    }

    actions
}

fn with_targets(
    state: &GameState,
    player: PlayerId,
    spec: &TargetSpec,
    build: impl Fn(Option<Target>) -> Action,
    out: &mut Vec<Action>,
) {
    if !spec.is_targeted() {
        out.push(build(None));
        return;
    }
    for target in TargetSelector::legal_targets(state, player, spec) {
        out.push(build(Some(target)));
    }
}

fn spell_target(card: &CardInstance) -> &TargetSpec {
    static NONE: TargetSpec = TargetSpec::None;
    card.definition.spell.as_ref().map_or(&NONE, |spell| spell.target())
}

fn can_activate_tap(state: &GameState, card: &CardInstance) -> bool {
    !card.tapped
        && !(card.is_creature()
            && card.summoning_sick
            && !state.has_keyword(card.id, crate::cards::Keyword::Haste))
}

fn play_land(state: &GameState, player: PlayerId, out: &mut Vec<Action>) {
    if !timing_allows(state, player, ActionKind::PlayLand, false) || state.players[player].lands_played > 0 {
        return;
    }
    for card in state.hand(player).iter().filter(|card| card.is_land()) {
        out.push(Action::PlayLand { card: card.id });
    }
}

fn cast_spell(state: &GameState, player: PlayerId, out: &mut Vec<Action>) {
    let zones = &state.players[player].zones;
    let from_hand = zones.cards(Zone::Hand).iter().filter(|card| !card.is_land());
    let from_exile = zones.cards(Zone::Exile).iter().filter(|card| card.on_adventure);

    for card in from_hand.chain(from_exile) {
        let instant = card.definition.is_instant_speed();
        if !timing_allows(state, player, ActionKind::CastSpell, instant)
            || !can_pay(state, player, &card.definition.mana_cost, None)
        {
            continue;
        }
        let id = card.id;
        with_targets(
            state,
            player,
            spell_target(card),
            |target| Action::CastSpell { card: id, target },
            out,
        );
    }
}

fn flashback(state: &GameState, player: PlayerId, out: &mut Vec<Action>) {
    for card in state.players[player].zones.cards(Zone::Graveyard) {
        let Some(cost) = &card.definition.flashback else {
            continue;
        };
        let instant = card.definition.is_instant_speed();
        if !timing_allows(state, player, ActionKind::Flashback, instant) || !can_pay(state, player, cost, None) {
            continue;
        }
        let id = card.id;
        with_targets(
            state,
            player,
            spell_target(card),
            |target| Action::Flashback { card: id, target },
            out,
        );
    }
}

fn cast_adventure(state: &GameState, player: PlayerId, out: &mut Vec<Action>) {
    for card in state.hand(player) {
        let Some(adventure) = &card.definition.adventure else {
            continue;
        };
        if !timing_allows(state, player, ActionKind::CastAdventure, adventure.instant)
            || !can_pay(state, player, &adventure.mana_cost, None)
        {
            continue;
        }
        let id = card.id;
        with_targets(
            state,
            player,
            adventure.spell.target(),
            |target| Action::CastAdventure { card: id, target },
            out,
        );
    }
}

fn activate_fetch(state: &GameState, player: PlayerId, out: &mut Vec<Action>) {
    if !timing_allows(state, player, ActionKind::ActivateFetch, true) {
        return;
    }
    let life = state.players[player].life;
    for card in state.battlefield(player) {
        if let Some(fetch) = &card.definition.fetch {
            if !card.tapped && life >= fetch.life_cost {
                out.push(Action::ActivateFetch { card: card.id });
            }
        }
    }
}

fn activate_ability(state: &GameState, player: PlayerId, out: &mut Vec<Action>) {
    for card in state.battlefield(player) {
        for (index, ability) in card.definition.activated.iter().enumerate() {
            let speed_ok = if ability.sorcery_speed {
                is_sorcery_window(state, player)
            } else {
                timing_allows(state, player, ActionKind::ActivateAbility, true)
            };
            if !speed_ok
                || (ability.tap && !can_activate_tap(state, card))
                || (ability.once_per_turn && card.abilities_used.contains(&index))
            {
                continue;
            }
            let exclude = ability.tap.then_some(card.id);
            if !can_pay(state, player, &ability.cost, exclude) {
                continue;
            }
            let id = card.id;
            with_targets(
                state,
                player,
                ability.effect.target_spec(),
                |target| Action::ActivateAbility { card: id, index, target },
                out,
            );
        }
    }
}

fn activate_loyalty(state: &GameState, player: PlayerId, out: &mut Vec<Action>) {
    if !timing_allows(state, player, ActionKind::ActivateLoyalty, false) {
        return;
    }
    for card in state.battlefield(player) {
        if card.loyalty_used {
            continue;
        }
        for (index, ability) in card.definition.loyalty_abilities.iter().enumerate() {
            if card.loyalty + ability.loyalty < 0 {
                continue;
            }
            let id = card.id;
            with_targets(
                state,
                player,
                ability.effect.target_spec(),
                |target| Action::ActivateLoyalty { card: id, index, target },
                out,
            );
        }
    }
}

fn cycle(state: &GameState, player: PlayerId, out: &mut Vec<Action>) {
    if !timing_allows(state, player, ActionKind::Cycle, true) {
        return;
    }
    for card in state.hand(player) {
        if let Some(cost) = &card.definition.cycling {
            if can_pay(state, player, cost, None) {
                out.push(Action::Cycle { card: card.id });
            }
        }
    }
}

fn ninjutsu(state: &GameState, player: PlayerId, out: &mut Vec<Action>) {
    if !timing_allows(state, player, ActionKind::Ninjutsu, false) {
        return;
    }
    let unblocked: Vec<_> = state
        .combat
        .unblocked()
        .filter(|id| state.battlefield(player).iter().any(|card| card.id == *id))
        .collect();
    if unblocked.is_empty() {
        return;
    }

    for card in state.hand(player) {
        let Some(cost) = &card.definition.ninjutsu else {
            continue;
        };
        if !can_pay(state, player, cost, None) {
            continue;
        }
        for attacker in &unblocked {
            out.push(Action::Ninjutsu {
                card: card.id,
                attacker: *attacker,
            });
        }
    }
}

fn tap_for_mana(state: &GameState, player: PlayerId, out: &mut Vec<Action>) {
    for card in state.battlefield(player) {
        if !can_tap_for_mana(state, card) {
            continue;
        }
        if let Some(ability) = &card.definition.mana_ability {
            for color in &ability.produces {
                out.push(Action::TapForMana {
                    card: card.id,
                    color: *color,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{catalog, CardDefinition};
    use crate::core::{EntityId, SimConfig};
    use crate::zones::ZonePosition;

    fn state_in(phase: Phase) -> GameState {
        let mut state = GameState::new(["Ann", "Bo"], &SimConfig::default());
        state.phase = phase;
        state
    }

    fn place(state: &mut GameState, owner: PlayerId, zone: Zone, def: &CardDefinition) -> EntityId {
        let id = state.allocate_id();
        state.players[owner]
            .zones
            .put(zone, crate::cards::CardInstance::new(id, owner, def), ZonePosition::Bottom);
        id
    }

    fn kinds(actions: &[Action]) -> Vec<ActionKind> {
        actions.iter().map(Action::kind).collect()
    }

    #[test]
    fn test_timing_table_covers_every_kind() {
        for kind in ActionKind::ALL {
            assert!(TIMING_TABLE.iter().any(|(k, _)| *k == kind), "{kind:?} missing");
        }
    }

    #[test]
    fn test_pass_always_first() {
        let state = state_in(Phase::Upkeep);
        assert_eq!(legal_actions(&state, PlayerId::TWO), vec![Action::PassPriority]);
    }

    #[test]
    fn test_land_drop_once_per_turn_in_main() {
        let mut state = state_in(Phase::Main1);
        let forest = place(&mut state, PlayerId::ONE, Zone::Hand, &catalog::basic("Forest"));

        assert!(legal_actions(&state, PlayerId::ONE).contains(&Action::PlayLand { card: forest }));
        assert!(!legal_actions(&state, PlayerId::TWO).contains(&Action::PlayLand { card: forest }));

        state.players[PlayerId::ONE].lands_played = 1;
        assert!(!legal_actions(&state, PlayerId::ONE).contains(&Action::PlayLand { card: forest }));

        state.players[PlayerId::ONE].lands_played = 0;
        state.phase = Phase::BeginCombat;
        assert!(!legal_actions(&state, PlayerId::ONE).contains(&Action::PlayLand { card: forest }));
    }

    #[test]
    fn test_instant_expands_per_target() {
        let mut state = state_in(Phase::Upkeep);
        place(&mut state, PlayerId::TWO, Zone::Battlefield, &catalog::basic("Mountain"));
        let bolt = place(&mut state, PlayerId::TWO, Zone::Hand, &catalog::lightning_bolt());
        let bear = place(&mut state, PlayerId::ONE, Zone::Battlefield, &catalog::grizzly_bears());

        let actions = legal_actions(&state, PlayerId::TWO);
        let casts: Vec<_> = actions
            .iter()
            .filter_map(|a| match a {
                Action::CastSpell { card, target } if *card == bolt => *target,
                _ => None,
            })
            .collect();

        assert_eq!(
            casts,
            vec![
                Target::Player(PlayerId::ONE),
                Target::Player(PlayerId::TWO),
                Target::Card(bear)
            ]
        );
    }

    #[test]
    fn test_sorcery_needs_own_main_and_empty_stack() {
        let mut state = state_in(Phase::Main1);
        place(&mut state, PlayerId::ONE, Zone::Battlefield, &catalog::basic("Mountain"));
        let spike = place(&mut state, PlayerId::ONE, Zone::Hand, &catalog::lava_spike());
        let cast = Action::CastSpell {
            card: spike,
            target: Some(Target::Player(PlayerId::TWO)),
        };

        assert!(legal_actions(&state, PlayerId::ONE).contains(&cast));
        state.phase = Phase::End;
        assert!(!legal_actions(&state, PlayerId::ONE).contains(&cast));
    }

    #[test]
    fn test_unpayable_spell_not_offered() {
        let mut state = state_in(Phase::Main1);
        place(&mut state, PlayerId::ONE, Zone::Hand, &catalog::serra_angel());
        place(&mut state, PlayerId::ONE, Zone::Battlefield, &catalog::basic("Plains"));

        let actions = legal_actions(&state, PlayerId::ONE);
        assert!(!kinds(&actions).contains(&ActionKind::CastSpell));
        assert!(kinds(&actions).contains(&ActionKind::TapForMana));
    }

    #[test]
    fn test_no_target_no_action() {
        let mut state = state_in(Phase::Main1);
        place(&mut state, PlayerId::ONE, Zone::Battlefield, &catalog::basic("Swamp"));
        place(&mut state, PlayerId::ONE, Zone::Battlefield, &catalog::basic("Swamp"));
        place(&mut state, PlayerId::ONE, Zone::Battlefield, &catalog::basic("Swamp"));
        place(&mut state, PlayerId::ONE, Zone::Hand, &catalog::murder());

        assert!(!kinds(&legal_actions(&state, PlayerId::ONE)).contains(&ActionKind::CastSpell));
    }

    #[test]
    fn test_cycling_and_flashback_offered() {
        let mut state = state_in(Phase::End);
        for _ in 0..3 {
            place(&mut state, PlayerId::TWO, Zone::Battlefield, &catalog::basic("Island"));
        }
        place(&mut state, PlayerId::TWO, Zone::Hand, &catalog::desert_cerodon());
        place(&mut state, PlayerId::TWO, Zone::Graveyard, &catalog::think_twice());

        let found = kinds(&legal_actions(&state, PlayerId::TWO));
        assert!(found.contains(&ActionKind::Cycle));
        assert!(found.contains(&ActionKind::Flashback));
    }

    #[test]
    fn test_loyalty_respects_cost_and_once_per_turn() {
        let mut state = state_in(Phase::Main2);
        let chandra = place(&mut state, PlayerId::ONE, Zone::Battlefield, &catalog::chandra_pyromaster());
        place(&mut state, PlayerId::TWO, Zone::Battlefield, &catalog::grizzly_bears());

        let minus = |actions: &[Action]| {
            actions
                .iter()
                .any(|a| matches!(a, Action::ActivateLoyalty { index: 1, .. }))
        };
        assert!(minus(&legal_actions(&state, PlayerId::ONE)));

        state.card_mut(chandra).unwrap().loyalty = 2;
        assert!(!minus(&legal_actions(&state, PlayerId::ONE)));

        state.card_mut(chandra).unwrap().loyalty_used = true;
        assert!(!kinds(&legal_actions(&state, PlayerId::ONE)).contains(&ActionKind::ActivateLoyalty));
    }

    #[test]
    fn test_ninjutsu_needs_unblocked_attacker() {
        let mut state = state_in(Phase::DeclareBlockers);
        for _ in 0..2 {
            place(&mut state, PlayerId::ONE, Zone::Battlefield, &catalog::basic("Island"));
        }
        let ninja = place(&mut state, PlayerId::ONE, Zone::Hand, &catalog::ninja_of_the_deep_hours());
        let rats = place(&mut state, PlayerId::ONE, Zone::Battlefield, &catalog::typhoid_rats());

        assert!(!kinds(&legal_actions(&state, PlayerId::ONE)).contains(&ActionKind::Ninjutsu));

        state.combat.attackers.push(rats);
        assert!(legal_actions(&state, PlayerId::ONE).contains(&Action::Ninjutsu {
            card: ninja,
            attacker: rats
        }));
    }

    #[test]
    fn test_fetch_needs_life() {
        let mut state = state_in(Phase::Upkeep);
        let fetch = place(
            &mut state,
            PlayerId::TWO,
            Zone::Battlefield,
            &catalog::fetch_land("Wooded Foothills", "Mountain", "Forest"),
        );
        assert!(legal_actions(&state, PlayerId::TWO).contains(&Action::ActivateFetch { card: fetch }));

        state.players[PlayerId::TWO].life = 0;
        assert!(!legal_actions(&state, PlayerId::TWO).contains(&Action::ActivateFetch { card: fetch }));
    }

    #[test]
    fn test_untap_offered_for_floating_mana() {
        let mut state = state_in(Phase::Main1);
        let island = place(&mut state, PlayerId::ONE, Zone::Battlefield, &catalog::basic("Island"));
        state.card_mut(island).unwrap().tapped = true;
        state.players[PlayerId::ONE]
            .mana_pool
            .record_tap(island, crate::cards::ManaColor::Blue, 1);

        assert!(legal_actions(&state, PlayerId::ONE).contains(&Action::UntapForMana { card: island }));
    }
}
