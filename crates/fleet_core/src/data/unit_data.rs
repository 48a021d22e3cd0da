//! Unit blueprint and spawn spec data structures.

use serde::{Deserialize, Serialize};

use crate::components::UnitId;
use crate::factions::FactionId;
use crate::math::Vec2;

/// Static stats for one unit type.
///
/// # Example RON
///
/// ```ron
/// UnitBlueprint(
///     name: "First Fleet",
///     hp: 2500,
///     atk: 480,
///     def: 80,
///     move_speed: 100,
///     range: 600.0,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitBlueprint {
    /// Blueprint name, referenced by [`UnitSpec::blueprint`].
    pub name: String,

    /// Maximum hit points.
    pub hp: u32,

    /// Base attack.
    pub atk: u32,

    /// Base defense.
    pub def: u32,

    /// Base movement speed in world units per second.
    pub move_speed: u32,

    /// Attack range in world units.
    pub range: f64,

    /// Turn rate override (rad/s).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn_rate: Option<f64>,

    /// Attack interval override (ms).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attack_interval_ms: Option<f64>,
}

impl UnitBlueprint {
    /// Create a blueprint with default turn rate and attack interval.
    #[must_use]
    pub fn new(name: impl Into<String>, hp: u32, atk: u32, def: u32, move_speed: u32, range: f64) -> Self {
        Self {
            name: name.into(),
            hp,
            atk,
            def,
            move_speed,
            range,
            turn_rate: None,
            attack_interval_ms: None,
        }
    }

    /// Check the record's data invariants.
    ///
    /// Returns a description of the first problem found.
    pub fn problem(&self) -> Option<String> {
        if self.name.trim().is_empty() {
            return Some("name is empty".to_string());
        }
        if self.hp == 0 {
            return Some("hp must be greater than zero".to_string());
        }
        if !(self.range.is_finite() && self.range > 0.0) {
            return Some(format!("range must be positive, got {}", self.range));
        }
        if let Some(rate) = self.turn_rate {
            if !(rate.is_finite() && rate > 0.0) {
                return Some(format!("turn_rate must be positive, got {rate}"));
            }
        }
        if let Some(interval) = self.attack_interval_ms {
            if !(interval.is_finite() && interval > 0.0) {
                return Some(format!("attack_interval_ms must be positive, got {interval}"));
            }
        }
        None
    }
}

/// One entry of a battle's starting roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSpec {
    /// Unit id, unique within the battle.
    pub id: UnitId,
    /// Blueprint name; also used as the unit's display name.
    pub blueprint: String,
    /// Starting position.
    pub position: Vec2,
    /// Owning faction.
    pub owner: FactionId,
}

impl UnitSpec {
    /// Create a new spec.
    #[must_use]
    pub fn new(id: UnitId, blueprint: impl Into<String>, x: f64, y: f64, owner: FactionId) -> Self {
        Self {
            id,
            blueprint: blueprint.into(),
            position: Vec2::new(x, y),
            owner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_blueprint_has_no_problem() {
        let bp = UnitBlueprint::new("Test Fleet", 1000, 300, 50, 90, 500.0);
        assert!(bp.problem().is_none());
    }

    #[test]
    fn test_zero_hp_is_rejected() {
        let bp = UnitBlueprint::new("Broken", 0, 300, 50, 90, 500.0);
        assert!(bp.problem().unwrap().contains("hp"));
    }

    #[test]
    fn test_bad_overrides_are_rejected() {
        let mut bp = UnitBlueprint::new("Broken", 10, 1, 1, 1, 1.0);
        bp.turn_rate = Some(-1.0);
        assert!(bp.problem().unwrap().contains("turn_rate"));

        bp.turn_rate = None;
        bp.attack_interval_ms = Some(f64::NAN);
        assert!(bp.problem().unwrap().contains("attack_interval_ms"));
    }

    #[test]
    fn test_ron_overrides_are_optional() {
        let bp: UnitBlueprint = ron::from_str(
            r#"UnitBlueprint(name: "Scout", hp: 600, atk: 150, def: 15, move_speed: 130, range: 300.0)"#,
        )
        .unwrap();
        assert_eq!(bp.turn_rate, None);
        assert_eq!(bp.attack_interval_ms, None);
        assert_eq!(bp.range, 300.0);
    }
}
