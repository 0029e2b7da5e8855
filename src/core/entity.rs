//! Entity identification for card instances.
//!
//! Every card instance in a game, including tokens, gets a unique `EntityId`
//! when it is created. Ids are never reused within a game, so a stale id held
//! by a trigger or a stack entry simply fails to resolve instead of aliasing
//! another card.
//!
//! ## Usage
//!
//! ```
//! use duel_sim::core::{EntityAllocator, EntityId};
//!
//! let mut ids = EntityAllocator::default();
//! let first = ids.allocate();
//! let second = ids.allocate();
//!
//! assert_eq!(first, EntityId(1));
//! assert_ne!(first, second);
//! ```

use serde::{Deserialize, Serialize};

/// Unique identifier for a card instance within one game.
///
/// Zero is never allocated; it is free for "no entity" sentinels in
/// serialized data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Create an entity ID from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Monotonic id source for one game.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EntityAllocator {
    last: u32,
}

impl EntityAllocator {
    /// Hand out the next unused id.
    pub fn allocate(&mut self) -> EntityId {
        self.last += 1;
        EntityId(self.last)
    }

    /// Number of ids handed out so far.
    #[must_use]
    pub fn allocated(&self) -> u32 {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocator_is_monotonic() {
        let mut ids = EntityAllocator::default();
        let a = ids.allocate();
        let b = ids.allocate();
        let c = ids.allocate();

        assert!(a < b && b < c);
        assert_eq!(ids.allocated(), 3);
    }

    #[test]
    fn test_zero_never_allocated() {
        let mut ids = EntityAllocator::default();
        assert_ne!(ids.allocate(), EntityId(0));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", EntityId(42)), "Entity(42)");
    }

    #[test]
    fn test_serialization() {
        let id = EntityId(123);
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: EntityId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
