//! # Fleet Core
//!
//! Deterministic real-time battle simulation for Fleet Tactics.
//!
//! This crate contains **only** simulation logic:
//! - No rendering
//! - No IO
//! - No randomness
//!
//! Two opposing fleets of autonomous units move, scan for enemies and trade
//! directional damage under a continuous-time update loop, with a simple
//! reactive AI on one side. The host drives everything through
//! [`battle::Battle`]: it feeds elapsed time to `tick`, forwards player
//! intents, and receives [`events::BattleEvent`]s through a presenter.
//!
//! This separation enables:
//! - Headless batch runs and balance sweeps
//! - Any front end (3D, 2D, terminal) over the same rules
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`math`] - Plane geometry and angle helpers
//! - [`formation`] - Formation multiplier table
//! - [`combat`] - Directional damage resolution
//! - [`unit`] - Per-unit state machine
//! - [`roster`] - Ordered unit collection
//! - [`ai`] - Computer opponent
//! - [`battle`] - Coordinator and tick loop
//! - [`input`] - Player intents
//! - [`events`] - Outbound notifications
//! - [`data`] - Blueprints and spawn specs

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod ai;
pub mod battle;
pub mod combat;
pub mod components;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod factions;
pub mod formation;
pub mod input;
pub mod math;
pub mod roster;
pub mod unit;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::battle::{Battle, BattleSetup};
    pub use crate::combat::{compute_damage, resolve_attack, DamageReport, Facing};
    pub use crate::components::*;
    pub use crate::config::{BattleConfig, UnitTuning};
    pub use crate::data::{BlueprintRegistry, BlueprintSource, UnitBlueprint, UnitSpec};
    pub use crate::error::{BattleError, Result};
    pub use crate::events::{BattleEvent, BattleOutcome, EventLog, NullPresenter, Presenter};
    pub use crate::factions::FactionId;
    pub use crate::formation::Formation;
    pub use crate::input::PlayerIntent;
    pub use crate::math::Vec2;
    pub use crate::roster::Roster;
    pub use crate::unit::{StateKind, Unit, UnitReadout, UnitState};
}
