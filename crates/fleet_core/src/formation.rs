//! Formation table.
//!
//! Formations are fixed, named multiplier sets applied to a unit's base
//! attack, defense and movement. Lookups never fail: an unknown key resolves
//! to [`DEFAULT_FORMATION`].

use serde::Serialize;

/// An immutable formation record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Formation {
    /// Lookup key (e.g. `"line"`).
    pub key: &'static str,
    /// Human-readable name.
    pub display_name: &'static str,
    /// Attack multiplier.
    pub attack: f64,
    /// Defense multiplier.
    pub defense: f64,
    /// Movement speed multiplier.
    pub movement: f64,
}

impl Formation {
    /// Apply the attack multiplier, flooring to an integer stat.
    #[must_use]
    pub fn apply_attack(&self, base: u32) -> u32 {
        scale(base, self.attack)
    }

    /// Apply the defense multiplier, flooring to an integer stat.
    #[must_use]
    pub fn apply_defense(&self, base: u32) -> u32 {
        scale(base, self.defense)
    }

    /// Apply the movement multiplier, flooring to an integer stat.
    #[must_use]
    pub fn apply_movement(&self, base: u32) -> u32 {
        scale(base, self.movement)
    }
}

// Clamped to non-negative before the cast.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scale(base: u32, multiplier: f64) -> u32 {
    (f64::from(base) * multiplier).floor().max(0.0) as u32
}

/// Narrow wedge: sharper attack, no other change.
pub const SPINDLE: Formation = Formation {
    key: "spindle",
    display_name: "Spindle",
    attack: 1.1,
    defense: 1.0,
    movement: 1.0,
};

/// Broad line: maximum firepower at the cost of defense and speed.
pub const LINE: Formation = Formation {
    key: "line",
    display_name: "Line",
    attack: 1.2,
    defense: 0.9,
    movement: 0.9,
};

/// Defensive ring: strongest defense, slowest movement.
pub const RING: Formation = Formation {
    key: "ring",
    display_name: "Ring",
    attack: 0.95,
    defense: 1.2,
    movement: 0.85,
};

/// All formations in the table.
pub const FORMATIONS: [Formation; 3] = [SPINDLE, LINE, RING];

/// Fallback for unknown keys.
pub const DEFAULT_FORMATION: Formation = SPINDLE;

/// Look up a formation by key, falling back to [`DEFAULT_FORMATION`].
#[must_use]
pub fn lookup(key: &str) -> &'static Formation {
    find(key).unwrap_or(&DEFAULT_FORMATION)
}

/// Look up a formation by key without a fallback.
#[must_use]
pub fn find(key: &str) -> Option<&'static Formation> {
    FORMATIONS.iter().find(|f| f.key == key)
}
