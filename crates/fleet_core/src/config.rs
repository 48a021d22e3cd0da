//! Battle tuning configuration.
//!
//! Every constant the simulation depends on lives here so scenarios can
//! override them from RON. Missing fields fall back to [`Default`].
//!
//! # Example RON
//!
//! ```ron
//! BattleConfig(
//!     ai_interval_ms: 1000.0,
//!     max_time_scale: 10,
//!     unit: UnitTuning(
//!         arrival_threshold: 5.0,
//!     ),
//! )
//! ```

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::{BattleError, Result};
use crate::factions::FactionId;
use crate::formation;

/// Per-unit behaviour thresholds shared by every unit in a battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitTuning {
    /// Distance under which a moving unit snaps onto its destination.
    pub arrival_threshold: f64,
    /// Distance under which the near movement cone applies.
    pub close_approach_distance: f64,
    /// Movement cone (radians) used within `close_approach_distance`.
    pub near_move_cone: f64,
    /// Movement cone (radians) used further out.
    pub far_move_cone: f64,
    /// Maximum facing error (radians) at which a unit may fire.
    pub fire_cone: f64,
}

impl Default for UnitTuning {
    fn default() -> Self {
        Self {
            arrival_threshold: 5.0,
            close_approach_distance: 50.0,
            near_move_cone: PI,
            far_move_cone: PI / 2.0,
            fire_cone: PI / 6.0,
        }
    }
}

impl UnitTuning {
    /// Movement cone for a unit `distance` away from its destination.
    #[must_use]
    pub fn move_cone(&self, distance: f64) -> f64 {
        if distance < self.close_approach_distance {
            self.near_move_cone
        } else {
            self.far_move_cone
        }
    }
}

/// Battle-wide configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Wall-clock interval between AI passes (ms, unscaled).
    pub ai_interval_ms: f64,
    /// Faction driven by the built-in AI.
    pub ai_faction: FactionId,
    /// Faction the local player commands.
    pub player_faction: FactionId,
    /// Smallest allowed time scale.
    pub min_time_scale: u32,
    /// Largest allowed time scale.
    pub max_time_scale: u32,
    /// Sight range as a multiple of attack range.
    pub sight_multiplier: f64,
    /// Turn rate (rad/s) for blueprints that do not set one.
    pub default_turn_rate: f64,
    /// Attack interval (ms) for blueprints that do not set one.
    pub default_attack_interval_ms: f64,
    /// Formation every unit starts in.
    pub initial_formation: String,
    /// Duration of the visual formation change (ms).
    pub formation_transition_ms: f64,
    /// Collision/pick radius of a unit.
    pub unit_radius: f64,
    /// Extra pointer tolerance when picking a unit.
    pub pick_margin: f64,
    /// Per-unit thresholds.
    pub unit: UnitTuning,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            ai_interval_ms: 1000.0,
            ai_faction: FactionId::Player2,
            player_faction: FactionId::Player1,
            min_time_scale: 1,
            max_time_scale: 10,
            sight_multiplier: 3.0,
            default_turn_rate: PI / 6.0,
            default_attack_interval_ms: 3000.0,
            initial_formation: formation::LINE.key.to_string(),
            formation_transition_ms: 4000.0,
            unit_radius: 20.0,
            pick_margin: 50.0,
            unit: UnitTuning::default(),
        }
    }
}

impl BattleConfig {
    /// Parse a configuration from RON.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        let config: Self = ron::from_str(ron).map_err(|e| BattleError::DataParseError {
            source_name: "battle config".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Clamp a requested time scale into the configured range.
    #[must_use]
    pub fn clamp_time_scale(&self, scale: u32) -> u32 {
        scale.max(self.min_time_scale).min(self.max_time_scale)
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("ai_interval_ms", self.ai_interval_ms),
            ("sight_multiplier", self.sight_multiplier),
            ("default_turn_rate", self.default_turn_rate),
            ("default_attack_interval_ms", self.default_attack_interval_ms),
            ("formation_transition_ms", self.formation_transition_ms),
            ("arrival_threshold", self.unit.arrival_threshold),
            ("fire_cone", self.unit.fire_cone),
            ("near_move_cone", self.unit.near_move_cone),
            ("far_move_cone", self.unit.far_move_cone),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(BattleError::InvalidConfig(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }

        if self.min_time_scale == 0 || self.min_time_scale > self.max_time_scale {
            return Err(BattleError::InvalidConfig(format!(
                "time scale range {}..={} is empty or includes zero",
                self.min_time_scale, self.max_time_scale
            )));
        }

        if self.ai_faction == self.player_faction {
            tracing::warn!(
                faction = %self.ai_faction,
                "AI and player control the same faction"
            );
        }

        Ok(())
    }
}
