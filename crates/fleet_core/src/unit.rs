//! Per-unit state machine.
//!
//! A [`Unit`] owns its own mutable combat state and nothing else. Each tick
//! the coordinator hands it a read-only [`Neighbors`] view of every other
//! unit; the unit turns, counts down its cooldown and runs the handler for
//! its current [`UnitState`]. Damage is never applied here: firing returns a
//! [`Strike`] that the coordinator applies to the target.
//!
//! References to other units are plain ids, resolved through the view on
//! every use. A target that has died or vanished sends the unit back to idle.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::combat::{self, DamageReport};
use crate::components::{EffectiveStats, FormationTransition, Health, UnitId, UnitStats};
use crate::config::{BattleConfig, UnitTuning};
use crate::data::{UnitBlueprint, UnitSpec};
use crate::factions::FactionId;
use crate::formation::{self, Formation};
use crate::math::{angle_delta, normalize_angle, Vec2};
use crate::roster::Neighbors;

// ============================================================================
// State
// ============================================================================

/// What a unit is doing.
///
/// Each variant carries exactly the data that state needs, so a destination
/// can never exist without movement and a target never without a reason.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum UnitState {
    /// Waiting. `reengage` is a target kept after arriving at a pursuit point.
    Idle {
        /// Target to resume attacking on the next update.
        reengage: Option<UnitId>,
    },
    /// Travelling toward a point.
    Moving {
        /// Where the unit is heading.
        destination: Vec2,
        /// Target being chased, if this move is a pursuit.
        pursuit: Option<UnitId>,
    },
    /// Engaging a target.
    Attacking {
        /// The unit being attacked.
        target: UnitId,
    },
}

impl UnitState {
    /// Plain idle with nothing remembered.
    pub const IDLE: Self = Self::Idle { reengage: None };

    /// The variant without its data.
    #[must_use]
    pub const fn kind(&self) -> StateKind {
        match self {
            Self::Idle { .. } => StateKind::Idle,
            Self::Moving { .. } => StateKind::Moving,
            Self::Attacking { .. } => StateKind::Attacking,
        }
    }

    /// The unit this state refers to, if any.
    #[must_use]
    pub const fn target(&self) -> Option<UnitId> {
        match *self {
            Self::Idle { reengage } => reengage,
            Self::Moving { pursuit, .. } => pursuit,
            Self::Attacking { target } => Some(target),
        }
    }

    /// Movement destination, if moving.
    #[must_use]
    pub const fn destination(&self) -> Option<Vec2> {
        match *self {
            Self::Moving { destination, .. } => Some(destination),
            _ => None,
        }
    }
}

impl Default for UnitState {
    fn default() -> Self {
        Self::IDLE
    }
}

/// Data-free view of [`UnitState`], used for display and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateKind {
    /// Waiting.
    Idle,
    /// Travelling.
    Moving,
    /// Engaging.
    Attacking,
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Moving => "moving",
            Self::Attacking => "attacking",
        })
    }
}

/// A shot fired during an update, waiting to be applied to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strike {
    /// Firing unit.
    pub attacker: UnitId,
    /// Unit hit.
    pub target: UnitId,
    /// Damage and the side that was hit.
    pub report: DamageReport,
}

// ============================================================================
// Unit
// ============================================================================

/// A single fleet on the battle plane.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    id: UnitId,
    name: String,
    owner: FactionId,
    position: Vec2,
    health: Health,
    heading: f64,
    target_heading: f64,
    state: UnitState,
    cooldown_ms: f64,
    formation: String,
    transition: Option<FormationTransition>,
    stats: UnitStats,
}

impl Unit {
    /// Build a unit from its spawn spec and blueprint.
    ///
    /// The unit starts idle, facing +X, at full health and in the
    /// configured initial formation.
    #[must_use]
    pub fn new(spec: &UnitSpec, blueprint: &UnitBlueprint, config: &BattleConfig) -> Self {
        Self {
            id: spec.id,
            name: blueprint.name.clone(),
            owner: spec.owner,
            position: spec.position,
            health: Health::new(blueprint.hp),
            heading: 0.0,
            target_heading: 0.0,
            state: UnitState::IDLE,
            cooldown_ms: 0.0,
            formation: config.initial_formation.clone(),
            transition: None,
            stats: UnitStats::from_blueprint(blueprint, config),
        }
    }

    /// Set the starting heading (and stop any pending turn).
    #[must_use]
    pub fn facing(mut self, heading: f64) -> Self {
        self.heading = normalize_angle(heading);
        self.target_heading = self.heading;
        self
    }

    /// Unit id.
    #[must_use]
    pub const fn id(&self) -> UnitId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning faction.
    #[must_use]
    pub const fn owner(&self) -> FactionId {
        self.owner
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Hit points.
    #[must_use]
    pub const fn health(&self) -> Health {
        self.health
    }

    /// Current heading in (-π, π].
    #[must_use]
    pub const fn heading(&self) -> f64 {
        self.heading
    }

    /// Heading the unit is turning toward.
    #[must_use]
    pub const fn target_heading(&self) -> f64 {
        self.target_heading
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> UnitState {
        self.state
    }

    /// Remaining attack cooldown (ms).
    #[must_use]
    pub const fn cooldown_ms(&self) -> f64 {
        self.cooldown_ms
    }

    /// Current formation key.
    #[must_use]
    pub fn formation_key(&self) -> &str {
        &self.formation
    }

    /// Current formation record (falls back to the default for unknown keys).
    #[must_use]
    pub fn formation(&self) -> &'static Formation {
        formation::lookup(&self.formation)
    }

    /// Running formation transition, if any.
    #[must_use]
    pub const fn transition(&self) -> Option<FormationTransition> {
        self.transition
    }

    /// Static stats.
    #[must_use]
    pub const fn stats(&self) -> &UnitStats {
        &self.stats
    }

    /// Whether the unit still has hit points.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.health.is_alive()
    }

    /// Whether the unit has been destroyed.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.health.is_dead()
    }

    /// Attack, defense and speed under the current formation.
    ///
    /// Always computed from base stats, never cached.
    #[must_use]
    pub fn effective_stats(&self) -> EffectiveStats {
        let formation = self.formation();
        EffectiveStats {
            attack: formation.apply_attack(self.stats.attack),
            defense: formation.apply_defense(self.stats.defense),
            move_speed: formation.apply_movement(self.stats.move_speed),
        }
    }

    /// Absolute angle (0..=π) between this unit's heading and the bearing
    /// to `from`. Small values mean the hit comes from the front.
    #[must_use]
    pub fn facing_angle_to(&self, from: Vec2) -> f64 {
        angle_delta(self.heading, self.position.bearing_to(from)).abs()
    }

    // ------------------------------------------------------------------------
    // Orders
    // ------------------------------------------------------------------------

    /// Head for a point, dropping any target.
    pub fn move_to(&mut self, destination: Vec2) {
        self.state = UnitState::Moving {
            destination,
            pursuit: None,
        };
    }

    /// Engage `target`. Ignored if the target is dead.
    ///
    /// Returns whether the order was taken.
    pub fn attack(&mut self, target: &Unit) -> bool {
        if target.is_dead() {
            return false;
        }
        self.state = UnitState::Attacking { target: target.id };
        true
    }

    /// Switch formation.
    ///
    /// Stats change immediately; a fresh visual transition starts. Asking for
    /// the current formation while no transition is running does nothing.
    /// Returns whether anything changed.
    pub fn set_formation(&mut self, key: &str, transition_ms: f64) -> bool {
        if self.formation == key && self.transition.is_none() {
            return false;
        }
        self.formation = key.to_string();
        self.transition = Some(FormationTransition::new(transition_ms));
        true
    }

    /// Take a hit. Returns the damage actually absorbed.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        self.health.apply_damage(amount)
    }

    /// Fire at `target` if the weapon is ready.
    ///
    /// Resets the cooldown and returns the resulting strike; the caller
    /// applies the damage. A cooling-down weapon does nothing.
    pub fn strike(&mut self, target: &Unit) -> Option<Strike> {
        if self.cooldown_ms > 0.0 {
            return None;
        }

        let report = combat::resolve_attack(
            self.effective_stats().attack,
            self.health.ratio(),
            target.effective_stats().defense,
            target.facing_angle_to(self.position),
        );
        self.cooldown_ms = self.stats.attack_interval_ms;

        Some(Strike {
            attacker: self.id,
            target: target.id,
            report,
        })
    }

    // ------------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------------

    /// Advance this unit by `dt_ms` of simulation time.
    ///
    /// # Arguments
    /// * `dt_ms` - Scaled simulation delta in milliseconds (non-negative)
    /// * `others` - Every other unit in the battle, in roster order
    /// * `tuning` - Shared behaviour thresholds
    ///
    /// Returns the strike fired this update, if any.
    pub fn update(&mut self, dt_ms: f64, others: &Neighbors<'_>, tuning: &UnitTuning) -> Option<Strike> {
        if self.is_dead() {
            return None;
        }
        debug_assert!(dt_ms >= 0.0, "negative delta: {dt_ms}");

        self.turn(dt_ms);
        self.advance_transition(dt_ms);
        self.cooldown_ms = (self.cooldown_ms - dt_ms).max(0.0);

        let (next, strike) = match self.state {
            UnitState::Idle { reengage } => (self.idle(reengage, others), None),
            UnitState::Moving {
                destination,
                pursuit,
            } => (self.moving(dt_ms, destination, pursuit, tuning), None),
            UnitState::Attacking { target } => self.attacking(target, others, tuning),
        };
        self.state = next;

        debug_assert!(self.heading.is_finite());
        debug_assert!(self.cooldown_ms >= 0.0);
        strike
    }

    fn turn(&mut self, dt_ms: f64) {
        let diff = angle_delta(self.heading, self.target_heading);
        let max_turn = self.stats.turn_rate * dt_ms / 1000.0;
        if diff.abs() <= max_turn {
            self.heading = self.target_heading;
        } else {
            self.heading += diff.signum() * max_turn;
        }
        self.heading = normalize_angle(self.heading);
    }

    fn advance_transition(&mut self, dt_ms: f64) {
        if let Some(transition) = self.transition.as_mut() {
            transition.advance(dt_ms);
            if transition.is_complete() {
                self.transition = None;
            }
        }
    }

    fn idle(&self, reengage: Option<UnitId>, others: &Neighbors<'_>) -> UnitState {
        if let Some(target) = reengage {
            return UnitState::Attacking { target };
        }
        if self.cooldown_ms > 0.0 {
            return UnitState::IDLE;
        }
        self.engage_scan(others).unwrap_or(UnitState::IDLE)
    }

    /// Look for something to fight: first within weapon range, then within
    /// sight of any living ally (this unit included).
    fn engage_scan(&self, others: &Neighbors<'_>) -> Option<UnitState> {
        let enemies = || others.iter().filter(|u| u.is_alive() && u.owner != self.owner);

        let in_range = nearest(
            self.position,
            enemies().filter(|e| self.position.distance_to(e.position) <= self.stats.range),
        );
        if let Some(enemy) = in_range {
            return Some(UnitState::Attacking { target: enemy.id });
        }

        let spotted = nearest(
            self.position,
            enemies().filter(|e| {
                self.sees(e.position)
                    || others
                        .iter()
                        .any(|a| a.is_alive() && a.owner == self.owner && a.sees(e.position))
            }),
        );
        spotted.map(|enemy| UnitState::Moving {
            destination: enemy.position,
            pursuit: Some(enemy.id),
        })
    }

    fn sees(&self, point: Vec2) -> bool {
        self.position.distance_to(point) <= self.stats.sight_range
    }

    fn moving(
        &mut self,
        dt_ms: f64,
        destination: Vec2,
        pursuit: Option<UnitId>,
        tuning: &UnitTuning,
    ) -> UnitState {
        let remaining = self.position.distance_to(destination);
        if remaining < tuning.arrival_threshold {
            self.position = destination;
            return UnitState::Idle { reengage: pursuit };
        }

        self.target_heading = self.position.bearing_to(destination);
        let error = angle_delta(self.heading, self.target_heading).abs();
        if error < tuning.move_cone(remaining) {
            let speed = f64::from(self.effective_stats().move_speed);
            let step = remaining.min(speed * dt_ms / 1000.0);
            self.position = self.position.advanced(self.heading, step);
        }

        UnitState::Moving {
            destination,
            pursuit,
        }
    }

    fn attacking(
        &mut self,
        target_id: UnitId,
        others: &Neighbors<'_>,
        tuning: &UnitTuning,
    ) -> (UnitState, Option<Strike>) {
        let Some(target) = others.get(target_id).filter(|t| t.is_alive()) else {
            return (UnitState::IDLE, None);
        };

        self.target_heading = self.position.bearing_to(target.position);
        if self.position.distance_to(target.position) > self.stats.range {
            let chase = UnitState::Moving {
                destination: target.position,
                pursuit: Some(target_id),
            };
            return (chase, None);
        }

        let error = angle_delta(self.heading, self.target_heading).abs();
        let strike = if self.cooldown_ms <= 0.0 && error < tuning.fire_cone {
            self.strike(target)
        } else {
            None
        };
        (UnitState::Attacking { target: target_id }, strike)
    }

    /// Read-only summary for UI panels and logs.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn readout(&self) -> UnitReadout {
        let effective = self.effective_stats();
        UnitReadout {
            id: self.id,
            name: self.name.clone(),
            owner: self.owner,
            x: self.position.x.round(),
            y: self.position.y.round(),
            hp: self.health.current,
            max_hp: self.health.max,
            attack: self.stats.attack,
            defense: self.stats.defense,
            move_speed: self.stats.move_speed,
            effective_attack: effective.attack,
            effective_defense: effective.defense,
            effective_move: effective.move_speed,
            range: self.stats.range,
            sight_range: self.stats.sight_range,
            state: self.state.kind(),
            target: self.state.target(),
            formation: formation::find(&self.formation)
                .map_or("Unknown", |f| f.display_name)
                .to_string(),
            heading_degrees: self.heading.to_degrees().round() as i32,
        }
    }
}

/// The nearest candidate to `origin`; ties go to the earliest candidate.
fn nearest<'a>(origin: Vec2, candidates: impl Iterator<Item = &'a Unit>) -> Option<&'a Unit> {
    let mut best: Option<(&Unit, f64)> = None;
    for candidate in candidates {
        let d = origin.distance_to(candidate.position);
        if best.map_or(true, |(_, best_d)| d < best_d) {
            best = Some((candidate, d));
        }
    }
    best.map(|(unit, _)| unit)
}

/// Snapshot of a unit for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitReadout {
    /// Unit id.
    pub id: UnitId,
    /// Display name.
    pub name: String,
    /// Owning faction.
    pub owner: FactionId,
    /// X position, rounded.
    pub x: f64,
    /// Y position, rounded.
    pub y: f64,
    /// Current hit points.
    pub hp: u32,
    /// Maximum hit points.
    pub max_hp: u32,
    /// Base attack.
    pub attack: u32,
    /// Base defense.
    pub defense: u32,
    /// Base speed.
    pub move_speed: u32,
    /// Attack after formation.
    pub effective_attack: u32,
    /// Defense after formation.
    pub effective_defense: u32,
    /// Speed after formation.
    pub effective_move: u32,
    /// Attack range.
    pub range: f64,
    /// Sight range.
    pub sight_range: f64,
    /// Current state.
    pub state: StateKind,
    /// Current target, if any.
    pub target: Option<UnitId>,
    /// Formation display name.
    pub formation: String,
    /// Heading in whole degrees.
    pub heading_degrees: i32,
}
