//! Data structures for unit blueprints and battle setup.
//!
//! All structs are designed to be deserialized from RON files.
//!
//! **Note:** This module contains no IO - it only defines data types and
//! parses strings. File loading is handled by `fleet_headless`.

mod blueprints;
mod unit_data;

pub use blueprints::{standard_skirmish, BlueprintRegistry, BlueprintSource};
pub use unit_data::{UnitBlueprint, UnitSpec};
