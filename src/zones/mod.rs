//! Zone system for card locations.
//!
//! ## Key Types
//!
//! - `Zone`: library, hand, battlefield, graveyard, exile
//! - `PlayerZones`: the ordered zones owned by one player
//! - `ZonePosition`: where an inserted card lands

pub mod manager;

pub use manager::{PlayerZones, Zone, ZonePosition};
