//! Stack and priority.
//!
//! Spells and activated abilities wait on a LIFO stack until both players
//! pass priority in succession. Mana abilities, land drops and taps never
//! use the stack; triggered abilities resolve as soon as their event is
//! processed (see `triggers`).

mod priority;

pub use priority::{CastMode, PriorityStack, StackEntry, StackEntryId, StackItem};
