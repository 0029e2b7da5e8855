//! Effect system for card abilities.
//!
//! - `Effect`: the closed set of things abilities can do
//! - `TargetSpec` / `Target`: what an effect may target and what was chosen
//! - `EffectResolver`: executes effects through an `EffectContext`
//!
//! Effects never touch the stack or priority directly. Anything they cause
//! that triggers abilities goes back through `triggers::fire` one level
//! deeper in the chain.

mod effect;
mod resolver;
mod targeting;

pub use effect::{Effect, PlayerSelector};
pub use resolver::{EffectContext, EffectResolver};
pub use targeting::{Controller, Target, TargetRequest, TargetSelector, TargetSpec};
