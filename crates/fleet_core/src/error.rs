//! Error types for the battle simulation.
//!
//! Only configuration and data problems are errors. Ordinary simulation
//! outcomes (no target found, out of range, order rejected) are plain
//! branches and never surface here.

use thiserror::Error;

use crate::components::UnitId;

/// Result type alias using [`BattleError`].
pub type Result<T> = std::result::Result<T, BattleError>;

/// Top-level error type for battle setup and data loading.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BattleError {
    /// A unit spec referenced a blueprint that the source does not provide.
    #[error("Blueprint not found for unit {unit_id}: '{blueprint}'")]
    BlueprintNotFound {
        /// Id from the unit spec.
        unit_id: UnitId,
        /// Blueprint name that failed to resolve.
        blueprint: String,
    },

    /// Two unit specs share the same id.
    #[error("Duplicate unit ID: {0}")]
    DuplicateUnitId(UnitId),

    /// A blueprint record violates a data invariant.
    #[error("Invalid blueprint '{name}': {reason}")]
    InvalidBlueprint {
        /// Blueprint name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A configuration value is out of its allowed range.
    #[error("Invalid battle config: {0}")]
    InvalidConfig(String),

    /// Data file parsing error.
    #[error("Failed to parse data '{source_name}': {message}")]
    DataParseError {
        /// File path or other label for the data that failed to parse.
        source_name: String,
        /// Error message.
        message: String,
    },
}
