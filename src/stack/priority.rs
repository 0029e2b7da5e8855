//! Priority-based stack (LIFO) with pass tracking.
//!
//! Spells and activated abilities are pushed onto the stack and resolve in
//! LIFO order. Players pass priority in APNAP order; two consecutive passes
//! either resolve the top entry or, with an empty stack, end the step.

use serde::{Deserialize, Serialize};

use crate::cards::CardInstance;
use crate::core::{EntityId, PlayerId};
use crate::effects::{Effect, Target};

/// Unique identifier for a stack entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StackEntryId(pub u32);

impl StackEntryId {
    /// Create a new stack entry ID.
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

impl std::fmt::Display for StackEntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StackEntry({})", self.0)
    }
}

/// How a spell was cast; decides where the card goes after resolving.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CastMode {
    /// Cast normally from hand (or from exile after an adventure).
    Normal,
    /// Cast from the graveyard; exiled afterwards.
    Flashback,
    /// The adventure half; the card waits in exile afterwards.
    Adventure,
}

/// What sits on the stack.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum StackItem {
    /// A spell. The stack owns the card while it is pending.
    Spell { card: CardInstance, mode: CastMode },

    /// An activated ability (fetch, cycling, loyalty, ...). The source card
    /// stays where it is and is referenced by id only.
    Ability {
        source: EntityId,
        source_name: String,
        label: String,
        effect: Effect,
    },
}

/// An entry on the stack.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StackEntry {
    /// Unique identifier for this entry.
    pub id: StackEntryId,

    /// Who controls this entry (makes choices when it resolves).
    pub controller: PlayerId,

    /// Target chosen when the entry was put on the stack.
    pub target: Option<Target>,

    pub item: StackItem,
}

impl StackEntry {
    /// Name shown in the game log.
    #[must_use]
    pub fn name(&self) -> &str {
        match &self.item {
            StackItem::Spell { card, mode: CastMode::Adventure } => card
                .definition
                .adventure
                .as_ref()
                .map_or(card.name(), |adventure| adventure.name.as_str()),
            StackItem::Spell { card, .. } => card.name(),
            StackItem::Ability { label, .. } => label,
        }
    }

    /// The card that put this entry on the stack.
    #[must_use]
    pub fn source(&self) -> EntityId {
        match &self.item {
            StackItem::Spell { card, .. } => card.id,
            StackItem::Ability { source, .. } => *source,
        }
    }

    #[must_use]
    pub fn is_spell(&self) -> bool {
        matches!(self.item, StackItem::Spell { .. })
    }

    /// The effect that runs on resolution, if any. Permanent spells have
    /// none; they simply enter the battlefield.
    #[must_use]
    pub fn effect(&self) -> Option<&Effect> {
        match &self.item {
            StackItem::Spell { card, mode: CastMode::Adventure } => card
                .definition
                .adventure
                .as_ref()
                .map(|adventure| &adventure.spell.effect),
            StackItem::Spell { card, .. } => card.definition.spell.as_ref().map(|spell| &spell.effect),
            StackItem::Ability { effect, .. } => Some(effect),
        }
    }
}

/// Priority-based stack.
///
/// 1. The active player receives priority.
/// 2. A player either acts (pushing onto the stack, or acting immediately)
///    or passes.
/// 3. Any action resets the pass counter and returns priority to the active
///    player.
/// 4. After two consecutive passes the caller resolves the top entry, or
///    ends the step if the stack is empty.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PriorityStack {
    /// The stack (index 0 = bottom, last = top).
    entries: Vec<StackEntry>,

    /// Player who currently has priority.
    current_priority: PlayerId,

    /// Passes since the last action or resolution.
    consecutive_passes: usize,

    /// Next stack entry ID.
    next_id: u32,
}

impl Default for PriorityStack {
    fn default() -> Self {
        Self::new(PlayerId::ONE)
    }
}

impl PriorityStack {
    /// Create an empty stack with `active` holding priority.
    #[must_use]
    pub fn new(active: PlayerId) -> Self {
        Self {
            entries: Vec::new(),
            current_priority: active,
            consecutive_passes: 0,
            next_id: 0,
        }
    }

    /// Number of entries on the stack.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Peek at the top of the stack without removing it.
    #[must_use]
    pub fn peek_top(&self) -> Option<&StackEntry> {
        self.entries.last()
    }

    /// All entries on the stack (bottom to top).
    #[must_use]
    pub fn entries(&self) -> &[StackEntry] {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, id: StackEntryId) -> Option<&StackEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Find a spell card on the stack by entity id.
    #[must_use]
    pub fn find_card(&self, id: EntityId) -> Option<&CardInstance> {
        self.entries.iter().find_map(|e| match &e.item {
            StackItem::Spell { card, .. } if card.id == id => Some(card),
            _ => None,
        })
    }

    /// Player who currently has priority.
    #[must_use]
    pub fn priority_player(&self) -> PlayerId {
        self.current_priority
    }

    /// Push a spell or ability. Returns its id.
    ///
    /// Resets the pass counter; the caller hands priority back to the
    /// active player.
    pub fn push(&mut self, controller: PlayerId, item: StackItem, target: Option<Target>) -> StackEntryId {
        let id = StackEntryId::new(self.next_id);
        self.next_id += 1;

        self.entries.push(StackEntry {
            id,
            controller,
            target,
            item,
        });
        self.consecutive_passes = 0;
        id
    }

    /// Player passes priority.
    ///
    /// Returns `true` once both players have passed in succession.
    pub fn pass(&mut self, player: PlayerId) -> bool {
        if player != self.current_priority {
            return false;
        }

        self.consecutive_passes += 1;

        if self.consecutive_passes >= 2 {
            true
        } else {
            self.current_priority = player.opponent();
            false
        }
    }

    /// Remove a specific entry (a countered spell).
    pub fn remove(&mut self, id: StackEntryId) -> Option<StackEntry> {
        let idx = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(idx))
    }

    /// Give priority to a player and clear the pass counter.
    pub fn set_priority(&mut self, player: PlayerId) {
        self.current_priority = player;
        self.consecutive_passes = 0;
    }
}
