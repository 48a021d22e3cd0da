//! Geometry utilities for the battle plane.
//!
//! Positions live on a flat 2D plane; headings are radians measured from the
//! +X axis and always kept in (-π, π]. All functions here are pure.

use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

/// Euclidean distance between two points.
#[must_use]
pub fn distance(ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    (bx - ax).hypot(by - ay)
}

/// Whether two circles overlap.
///
/// Touching circles (distance exactly `ra + rb`) do not overlap.
#[must_use]
pub fn overlaps(ax: f64, ay: f64, ra: f64, bx: f64, by: f64, rb: f64) -> bool {
    distance(ax, ay, bx, by) < ra + rb
}

/// Wrap an angle into (-π, π].
#[must_use]
pub fn normalize_angle(angle: f64) -> f64 {
    debug_assert!(angle.is_finite(), "non-finite angle: {angle}");
    if !angle.is_finite() {
        return angle;
    }

    let mut wrapped = angle % TAU;
    if wrapped > PI {
        wrapped -= TAU;
    } else if wrapped <= -PI {
        wrapped += TAU;
    }
    wrapped
}

/// Shortest signed rotation that takes `from` onto `to`, in (-π, π].
#[must_use]
pub fn angle_delta(from: f64, to: f64) -> f64 {
    normalize_angle(to - from)
}

/// A point (or offset) on the battle plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl Vec2 {
    /// Origin.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Distance to another point.
    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        distance(self.x, self.y, other.x, other.y)
    }

    /// Bearing (radians) from this point toward `other`.
    #[must_use]
    pub fn bearing_to(self, other: Self) -> f64 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    /// The point `dist` units away along `heading`.
    #[must_use]
    pub fn advanced(self, heading: f64, dist: f64) -> Self {
        Self {
            x: self.x + heading.cos() * dist,
            y: self.y + heading.sin() * dist,
        }
    }

    /// Both coordinates are finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}
