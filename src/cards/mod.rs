//! Card system: definitions, instances and decklists.
//!
//! ## Key Types
//!
//! - `CardDefinition`: static card data supplied by collaborators
//! - `CardInstance`: one copy of a card in one game, with runtime status
//! - `Decklist`: an ordered list of definitions, validated before a game
//! - `ManaCost` / `ManaAbility` / `Keyword` / `CardTypes`: card attributes

pub mod attributes;
pub mod catalog;
pub mod decklist;
pub mod definition;
pub mod instance;

pub use attributes::{CardTypes, Keyword, ManaAbility, ManaColor, ManaCost};
pub use decklist::Decklist;
pub use definition::{
    ActivatedAbility, Adventure, CardDefinition, FetchAbility, LoyaltyAbility, SpellAbility, StaticAbility,
};
pub use instance::CardInstance;
