//! Directional combat resolution.
//!
//! Damage depends on four inputs only:
//! - the attacker's effective attack, scaled by its remaining health fraction
//! - the defender's effective defense, which mitigates at half weight
//! - a chip-damage floor so every hit lands
//! - the side of the defender that was hit (front, side or rear)
//!
//! Everything here is a pure function of its arguments.

use serde::{Deserialize, Serialize};

/// Minimum damage before the directional multiplier (chip damage).
pub const MIN_DAMAGE: i64 = 10;

/// Fraction of effective defense subtracted from incoming attack.
pub const DEFENSE_WEIGHT: f64 = 0.5;

/// Upper bound (degrees, inclusive) of a frontal hit.
pub const FRONT_ARC_DEGREES: f64 = 60.0;

/// Upper bound (degrees, inclusive) of a broadside hit.
pub const SIDE_ARC_DEGREES: f64 = 120.0;

/// Which side of the defender an attack lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    /// Within 60° of the defender's heading.
    Front,
    /// Between 60° and 120°.
    Side,
    /// Beyond 120°.
    Rear,
}

impl Facing {
    /// Classify an absolute facing angle (radians, 0..=π).
    #[must_use]
    pub fn from_angle(facing_angle: f64) -> Self {
        let degrees = facing_angle.abs().to_degrees();
        if degrees <= FRONT_ARC_DEGREES {
            Self::Front
        } else if degrees <= SIDE_ARC_DEGREES {
            Self::Side
        } else {
            Self::Rear
        }
    }

    /// Damage multiplier for hits landing on this side.
    #[must_use]
    pub const fn multiplier(self) -> f64 {
        match self {
            Self::Front => 1.0,
            Self::Side => 1.25,
            Self::Rear => 1.5,
        }
    }

    /// Whether this side grants bonus damage.
    #[must_use]
    pub const fn is_flank(self) -> bool {
        !matches!(self, Self::Front)
    }
}

/// Outcome of a single attack calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageReport {
    /// Final damage to apply.
    pub damage: u32,
    /// Side of the defender that was hit.
    pub facing: Facing,
}

/// Calculate damage and report which side was hit.
///
/// Formula:
/// ```text
/// base  = floor(atk × hp_ratio − def × 0.5), at least 10
/// final = floor(base × facing multiplier)
/// ```
///
/// # Arguments
/// * `attacker_atk` - Attacker's effective attack
/// * `attacker_hp_ratio` - Attacker's `hp / max_hp` (0..=1)
/// * `defender_def` - Defender's effective defense
/// * `facing_angle` - Angle between the defender's heading and the bearing
///   to the attacker, radians in 0..=π
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
pub fn resolve_attack(
    attacker_atk: u32,
    attacker_hp_ratio: f64,
    defender_def: u32,
    facing_angle: f64,
) -> DamageReport {
    let raw = f64::from(attacker_atk) * attacker_hp_ratio - f64::from(defender_def) * DEFENSE_WEIGHT;
    let base = (raw.floor() as i64).max(MIN_DAMAGE);

    let facing = Facing::from_angle(facing_angle);
    let damage = (base as f64 * facing.multiplier()).floor() as u32;

    DamageReport { damage, facing }
}

/// Calculate damage for one attack.
///
/// See [`resolve_attack`] for the formula.
#[must_use]
pub fn compute_damage(
    attacker_atk: u32,
    attacker_hp_ratio: f64,
    defender_def: u32,
    facing_angle: f64,
) -> u32 {
    resolve_attack(attacker_atk, attacker_hp_ratio, defender_def, facing_angle).damage
}
