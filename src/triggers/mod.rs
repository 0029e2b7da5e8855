//! Trigger system for event-driven abilities.
//!
//! Cards carry `Trigger`s on their definitions. Whenever the engine raises a
//! `GameEvent`, `fire` scans the live triggers, queues the matching ones in
//! APNAP order and resolves them one at a time.
//!
//! ## Key Components
//!
//! - [`GameEvent`]: something that just happened
//! - [`TriggerCondition`]: extra filters beyond the event kind
//! - [`Trigger`]: event kind + condition + effect + live zone
//! - [`TriggeredAbility`]: a trigger bound to the permanent that fired it
//! - [`TriggerChain`]: nesting depth of the cascade, capped per game
//!
//! ## Example Usage
//!
//! ```
//! use duel_sim::cards::{CardDefinition, CardInstance, ManaCost};
//! use duel_sim::core::{GameState, PlayerId, SimConfig};
//! use duel_sim::effects::Effect;
//! use duel_sim::triggers::{collect_triggers, GameEvent, Trigger};
//! use duel_sim::zones::{Zone, ZonePosition};
//!
//! let elder = CardDefinition::creature("Wise Elder", ManaCost::generic(2), 1, 1)
//!     .with_trigger(Trigger::on_upkeep(Effect::draw(1)));
//!
//! let mut state = GameState::new(["Ann", "Bo"], &SimConfig::default());
//! let id = state.allocate_id();
//! state.players[PlayerId::ONE].zones.put(
//!     Zone::Battlefield,
//!     CardInstance::new(id, PlayerId::ONE, &elder),
//!     ZonePosition::Bottom,
//! );
//!
//! let queued = collect_triggers(&state, &GameEvent::upkeep(PlayerId::ONE));
//! assert_eq!(queued.len(), 1);
//! assert_eq!(queued[0].source, id);
//! ```

mod condition;
mod event;
mod registry;

pub use condition::{ConditionContext, ConditionEvaluator, TriggerCondition};
pub use event::{EventTarget, GameEvent, GameEventKind};
pub use registry::{collect_triggers, fire, Trigger, TriggerChain, TriggerZone, TriggeredAbility};
