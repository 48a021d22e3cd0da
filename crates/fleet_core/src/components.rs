//! Plain data pieces a unit is built from.
//!
//! These types carry no behaviour beyond small invariant-keeping helpers;
//! the state machine in [`crate::unit`] composes them.

use serde::{Deserialize, Serialize};

use crate::config::BattleConfig;
use crate::data::UnitBlueprint;

/// Unique identifier for units within one battle.
pub type UnitId = u32;

// ============================================================================
// Health
// ============================================================================

/// Hit points of a unit.
///
/// Health only ever goes down. Zero is death, and it is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Health {
    /// Current health points.
    pub current: u32,
    /// Maximum health points.
    pub max: u32,
}

impl Health {
    /// Create new health at full.
    #[must_use]
    pub const fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Check if the unit is dead (health == 0).
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.current == 0
    }

    /// Check if the unit is alive.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.current > 0
    }

    /// Apply damage, returning actual damage dealt.
    /// Uses saturating subtraction to prevent underflow.
    pub fn apply_damage(&mut self, amount: u32) -> u32 {
        let actual = amount.min(self.current);
        self.current = self.current.saturating_sub(actual);
        actual
    }

    /// Fraction of health remaining (0..=1).
    ///
    /// Blueprints guarantee `max > 0`; a zero max reads as empty.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        if self.max == 0 {
            0.0
        } else {
            f64::from(self.current) / f64::from(self.max)
        }
    }
}

// ============================================================================
// Static stats
// ============================================================================

/// Stats fixed at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitStats {
    /// Base attack.
    pub attack: u32,
    /// Base defense.
    pub defense: u32,
    /// Base movement speed (world units per second).
    pub move_speed: u32,
    /// Attack range.
    pub range: f64,
    /// Sight range, derived from attack range.
    pub sight_range: f64,
    /// Turn rate in radians per second.
    pub turn_rate: f64,
    /// Time between attacks (ms).
    pub attack_interval_ms: f64,
}

impl UnitStats {
    /// Derive a unit's static stats from its blueprint.
    #[must_use]
    pub fn from_blueprint(blueprint: &UnitBlueprint, config: &BattleConfig) -> Self {
        Self {
            attack: blueprint.atk,
            defense: blueprint.def,
            move_speed: blueprint.move_speed,
            range: blueprint.range,
            sight_range: blueprint.range * config.sight_multiplier,
            turn_rate: blueprint.turn_rate.unwrap_or(config.default_turn_rate),
            attack_interval_ms: blueprint
                .attack_interval_ms
                .unwrap_or(config.default_attack_interval_ms),
        }
    }
}

/// Attack, defense and movement after formation multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectiveStats {
    /// Effective attack.
    pub attack: u32,
    /// Effective defense.
    pub defense: u32,
    /// Effective movement speed.
    pub move_speed: u32,
}

// ============================================================================
// Formation transition
// ============================================================================

/// Progress of the visual regrouping that follows a formation change.
///
/// Purely presentational: stats switch the moment the formation changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FormationTransition {
    /// Time spent so far (ms).
    pub elapsed_ms: f64,
    /// Total duration (ms).
    pub duration_ms: f64,
}

impl FormationTransition {
    /// Start a new transition.
    #[must_use]
    pub const fn new(duration_ms: f64) -> Self {
        Self {
            elapsed_ms: 0.0,
            duration_ms,
        }
    }

    /// Advance by `dt_ms`.
    pub fn advance(&mut self, dt_ms: f64) {
        self.elapsed_ms += dt_ms;
    }

    /// Linear progress (0..=1).
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        (self.elapsed_ms / self.duration_ms).clamp(0.0, 1.0)
    }

    /// Cubic ease-out of [`progress`](Self::progress).
    #[must_use]
    pub fn eased_progress(&self) -> f64 {
        1.0 - (1.0 - self.progress()).powi(3)
    }

    /// Whether the transition has finished.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.progress() >= 1.0
    }
}
