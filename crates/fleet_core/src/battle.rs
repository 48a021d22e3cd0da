//! Battle coordinator.
//!
//! [`Battle`] owns the roster and drives everything: unit updates, the AI
//! cadence, the win condition, player commands and the outbound event queue.
//!
//! # Tick order
//!
//! Each [`tick`](Battle::tick):
//! 1. **Guard** - paused or decided battles do not advance
//! 2. **Clock** - simulation time advances by `dt × time_scale`
//! 3. **AI** - runs when the unscaled accumulator reaches the AI interval
//! 4. **Units** - every living unit updates in roster order; strikes land
//!    immediately, so a unit destroyed early in the tick is invisible to
//!    units updated after it
//! 5. **Win condition** - checked once all units have moved
//! 6. **Flush** - queued events go to the presenter
//!
//! # Example
//!
//! ```
//! use fleet_core::prelude::*;
//!
//! let registry = BlueprintRegistry::standard();
//! let mut battle = Battle::new(BattleConfig::default());
//! battle.start_battle(
//!     &[
//!         UnitSpec::new(1, "First Fleet", 0.0, 0.0, FactionId::Player1),
//!         UnitSpec::new(2, "Athena Fleet", 500.0, 0.0, FactionId::Player2),
//!     ],
//!     &registry,
//! );
//!
//! battle.tick(16.0);
//! assert_eq!(battle.units().len(), 2);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use crate::ai;
use crate::components::UnitId;
use crate::config::BattleConfig;
use crate::data::{BlueprintSource, UnitSpec};
use crate::error::BattleError;
use crate::events::{BattleEvent, BattleOutcome, NullPresenter, Presenter};
use crate::factions::FactionId;
use crate::math::Vec2;
use crate::roster::Roster;
use crate::unit::{StateKind, Strike, Unit, UnitReadout, UnitState};

/// Result of [`Battle::start_battle`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BattleSetup {
    /// Ids of the units that were spawned, in roster order.
    pub spawned: Vec<UnitId>,
    /// Specs that were skipped, with the reason.
    pub skipped: Vec<BattleError>,
}

impl BattleSetup {
    /// Whether every spec produced a unit.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// A running battle.
///
/// Generic over its [`Presenter`] so hosts can plug in rendering, logging or
/// recording without the simulation knowing which.
#[derive(Debug)]
pub struct Battle<P: Presenter = NullPresenter> {
    config: BattleConfig,
    roster: Roster,
    presenter: P,
    pending: Vec<BattleEvent>,
    selected: Option<UnitId>,
    outcome: Option<BattleOutcome>,
    paused: bool,
    time_scale: u32,
    ai_accumulator_ms: f64,
    elapsed_ms: f64,
    ticks: u64,
}

impl Battle<NullPresenter> {
    /// Create an empty battle that discards its events.
    #[must_use]
    pub fn new(config: BattleConfig) -> Self {
        Self::with_presenter(config, NullPresenter)
    }
}

impl<P: Presenter> Battle<P> {
    /// Create an empty battle reporting to `presenter`.
    #[must_use]
    pub fn with_presenter(config: BattleConfig, presenter: P) -> Self {
        let time_scale = config.clamp_time_scale(1);
        Self {
            config,
            roster: Roster::new(),
            presenter,
            pending: Vec::new(),
            selected: None,
            outcome: None,
            paused: false,
            time_scale,
            ai_accumulator_ms: 0.0,
            elapsed_ms: 0.0,
            ticks: 0,
        }
    }

    // ------------------------------------------------------------------------
    // Setup
    // ------------------------------------------------------------------------

    /// Start a new battle, replacing any previous one.
    ///
    /// Specs whose blueprint is missing or invalid, and specs repeating an
    /// earlier id, are logged and skipped; the battle goes ahead with the
    /// rest.
    /// Selection, outcome, pause, time scale and clocks are reset.
    pub fn start_battle(&mut self, specs: &[UnitSpec], blueprints: &dyn BlueprintSource) -> BattleSetup {
        let mut setup = BattleSetup::default();
        let mut seen = HashSet::with_capacity(specs.len());
        let mut units = Vec::with_capacity(specs.len());

        for spec in specs {
            if !seen.insert(spec.id) {
                tracing::warn!(unit_id = spec.id, "Duplicate unit id; spec skipped");
                setup.skipped.push(BattleError::DuplicateUnitId(spec.id));
                continue;
            }
            let Some(blueprint) = blueprints.blueprint(&spec.blueprint) else {
                tracing::error!(
                    unit_id = spec.id,
                    blueprint = %spec.blueprint,
                    "Blueprint not found; unit skipped"
                );
                setup.skipped.push(BattleError::BlueprintNotFound {
                    unit_id: spec.id,
                    blueprint: spec.blueprint.clone(),
                });
                continue;
            };
            if let Some(reason) = blueprint.problem() {
                tracing::error!(unit_id = spec.id, blueprint = %spec.blueprint, %reason, "Invalid blueprint; unit skipped");
                setup.skipped.push(BattleError::InvalidBlueprint {
                    name: spec.blueprint.clone(),
                    reason,
                });
                continue;
            }
            units.push(Unit::new(spec, blueprint, &self.config));
            setup.spawned.push(spec.id);
        }

        self.roster = Roster::from_units(units);
        self.pending.clear();
        if self.selected.take().is_some() {
            self.pending.push(BattleEvent::SelectionChanged { unit: None });
        }
        self.outcome = None;
        self.paused = false;
        self.time_scale = self.config.clamp_time_scale(1);
        self.ai_accumulator_ms = 0.0;
        self.elapsed_ms = 0.0;
        self.ticks = 0;

        tracing::info!(
            units = setup.spawned.len(),
            skipped = setup.skipped.len(),
            "Battle started"
        );
        self.pending.push(BattleEvent::BattleStarted {
            units: setup.spawned.clone(),
        });
        self.flush();
        setup
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Battle configuration.
    #[must_use]
    pub const fn config(&self) -> &BattleConfig {
        &self.config
    }

    /// Read-only roster.
    #[must_use]
    pub const fn units(&self) -> &Roster {
        &self.roster
    }

    /// Look up a unit.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.roster.get(id)
    }

    /// Display summary of a unit.
    #[must_use]
    pub fn readout(&self, id: UnitId) -> Option<UnitReadout> {
        self.roster.get(id).map(Unit::readout)
    }

    /// The presenter.
    #[must_use]
    pub const fn presenter(&self) -> &P {
        &self.presenter
    }

    /// The presenter, mutably.
    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    /// Consume the battle, returning its presenter.
    #[must_use]
    pub fn into_presenter(self) -> P {
        self.presenter
    }

    /// Currently selected unit.
    #[must_use]
    pub const fn selected(&self) -> Option<UnitId> {
        self.selected
    }

    /// Currently selected unit, resolved.
    #[must_use]
    pub fn selected_unit(&self) -> Option<&Unit> {
        self.selected.and_then(|id| self.roster.get(id))
    }

    /// Result, once decided.
    #[must_use]
    pub const fn outcome(&self) -> Option<BattleOutcome> {
        self.outcome
    }

    /// Whether the battle has been decided.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Whether the battle is paused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Current time scale.
    #[must_use]
    pub const fn time_scale(&self) -> u32 {
        self.time_scale
    }

    /// Simulation time elapsed (ms, scaled).
    #[must_use]
    pub const fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    /// Number of ticks that advanced the battle.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.ticks
    }

    // ------------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------------

    /// Advance the battle by `dt_ms` of real time.
    ///
    /// Does nothing while paused, once decided, or for a negative or
    /// non-finite delta.
    pub fn tick(&mut self, dt_ms: f64) {
        if self.paused || self.outcome.is_some() {
            return;
        }
        if !(dt_ms.is_finite() && dt_ms >= 0.0) {
            tracing::warn!(dt_ms, "Ignoring invalid tick delta");
            return;
        }

        let selected_before = self.selected_state();
        let scaled = dt_ms * f64::from(self.time_scale);
        self.elapsed_ms += scaled;
        self.ticks += 1;

        // AI cadence is wall-clock: speeding up the battle does not make the
        // AI think faster.
        self.ai_accumulator_ms += dt_ms;
        if self.ai_accumulator_ms >= self.config.ai_interval_ms {
            self.run_ai();
            self.ai_accumulator_ms = 0.0;
        }

        self.update_units(scaled);
        self.note_selected_state(selected_before);
        self.evaluate_win_condition();

        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            tracing::debug!(tick = self.ticks, state_hash = hash, "Battle state hash");
        }

        self.flush();
    }

    fn run_ai(&mut self) {
        let faction = self.config.ai_faction;
        for order in ai::plan_orders(&self.roster, faction) {
            tracing::debug!(unit = order.unit, target = order.target, "AI attack order");
            self.order_attack(order.unit, order.target);
        }
    }

    fn update_units(&mut self, dt_ms: f64) {
        for position in 0..self.roster.len() {
            let strike = {
                let Some((unit, others)) = self.roster.split_at(position) else {
                    continue;
                };
                if unit.is_dead() {
                    continue;
                }
                unit.update(dt_ms, &others, &self.config.unit)
            };
            if let Some(strike) = strike {
                self.apply_strike(strike);
            }
        }
    }

    fn apply_strike(&mut self, strike: Strike) {
        let Some(target) = self.roster.get_mut(strike.target) else {
            return;
        };
        target.take_damage(strike.report.damage);
        let destroyed = target.is_dead();
        let owner = target.owner();

        tracing::trace!(
            attacker = strike.attacker,
            defender = strike.target,
            damage = strike.report.damage,
            facing = ?strike.report.facing,
            "Attack"
        );
        self.pending.push(BattleEvent::Attack {
            attacker: strike.attacker,
            defender: strike.target,
            damage: strike.report.damage,
            facing: strike.report.facing,
        });

        if destroyed {
            tracing::info!(unit = strike.target, %owner, "Unit destroyed");
            self.pending.push(BattleEvent::UnitDestroyed {
                unit: strike.target,
                owner,
            });
            if self.selected == Some(strike.target) {
                self.clear_selection();
            }
        }
    }

    // ------------------------------------------------------------------------
    // Win condition
    // ------------------------------------------------------------------------

    /// Evaluate the win condition and report the outcome, if any.
    ///
    /// Idempotent: once decided, the same outcome is returned and nothing
    /// else happens. An empty roster (no battle started) is never decided.
    pub fn check_win_condition(&mut self) -> Option<BattleOutcome> {
        let outcome = self.evaluate_win_condition();
        self.flush();
        outcome
    }

    fn evaluate_win_condition(&mut self) -> Option<BattleOutcome> {
        if self.outcome.is_some() || self.roster.is_empty() {
            return self.outcome;
        }

        let p1_alive = self.roster.living_count(FactionId::Player1) > 0;
        let p2_alive = self.roster.living_count(FactionId::Player2) > 0;
        let outcome = match (p1_alive, p2_alive) {
            (false, false) => BattleOutcome::Draw,
            (false, true) => BattleOutcome::Victory(FactionId::Player2),
            (true, false) => BattleOutcome::Victory(FactionId::Player1),
            (true, true) => return None,
        };

        self.outcome = Some(outcome);
        tracing::info!(%outcome, elapsed_ms = self.elapsed_ms, "Battle ended");
        self.pending.push(BattleEvent::BattleEnded { outcome });
        self.clear_selection();
        Some(outcome)
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    /// Order a unit to move to a point.
    ///
    /// Ignored for dead or unknown units and once the battle is decided.
    pub fn issue_move_order(&mut self, unit: UnitId, x: f64, y: f64) -> bool {
        let destination = Vec2::new(x, y);
        if self.outcome.is_some() || !destination.is_finite() {
            return false;
        }
        let before = self.selected_state();
        let Some(mover) = self.roster.get_mut(unit).filter(|u| u.is_alive()) else {
            return false;
        };
        mover.move_to(destination);
        self.pending.push(BattleEvent::MoveOrdered { unit, destination });
        self.note_selected_state(before);
        self.flush();
        true
    }

    /// Order a unit to attack another.
    ///
    /// Ignored when either unit is dead or unknown, when both belong to the
    /// same faction, and once the battle is decided.
    pub fn issue_attack_order(&mut self, unit: UnitId, target: UnitId) -> bool {
        if self.outcome.is_some() {
            return false;
        }
        let before = self.selected_state();
        let accepted = self.order_attack(unit, target);
        if accepted {
            self.note_selected_state(before);
            self.flush();
        }
        accepted
    }

    fn order_attack(&mut self, unit: UnitId, target: UnitId) -> bool {
        let Some(defender) = self.roster.living_unit(target).cloned() else {
            return false;
        };
        let Some(attacker) = self.roster.get_mut(unit).filter(|u| u.is_alive()) else {
            return false;
        };
        if attacker.owner() == defender.owner() || !attacker.attack(&defender) {
            return false;
        }
        self.pending.push(BattleEvent::AttackOrdered { unit, target });
        true
    }

    /// Change a unit's formation.
    ///
    /// Unknown keys are accepted and behave like the default formation.
    /// Ignored once the battle is decided.
    pub fn set_formation(&mut self, unit: UnitId, key: &str) -> bool {
        if self.outcome.is_some() {
            return false;
        }
        let duration = self.config.formation_transition_ms;
        let Some(target) = self.roster.get_mut(unit).filter(|u| u.is_alive()) else {
            return false;
        };
        if crate::formation::find(key).is_none() {
            tracing::warn!(unit, formation = key, "Unknown formation; default stats apply");
        }
        if !target.set_formation(key, duration) {
            return false;
        }
        self.pending.push(BattleEvent::FormationChanged {
            unit,
            formation: key.to_string(),
        });
        self.flush();
        true
    }

    /// Select a unit, or clear the selection with `None`.
    ///
    /// Dead and unknown units cannot be selected; asking for one leaves the
    /// current selection alone. Returns whether the selection changed.
    pub fn select(&mut self, unit: Option<UnitId>) -> bool {
        if unit.is_some_and(|id| self.roster.living_unit(id).is_none()) {
            return false;
        }
        if unit == self.selected {
            return false;
        }
        self.selected = unit;
        self.pending.push(BattleEvent::SelectionChanged { unit });
        self.flush();
        true
    }

    fn clear_selection(&mut self) {
        if self.selected.take().is_some() {
            self.pending.push(BattleEvent::SelectionChanged { unit: None });
        }
    }

    /// Pause or resume. Returns the new pause state.
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        tracing::info!(paused = self.paused, "Pause toggled");
        self.pending.push(BattleEvent::PauseToggled {
            paused: self.paused,
        });
        self.flush();
        self.paused
    }

    /// Set the time scale, clamped to the configured range.
    ///
    /// Returns the scale actually applied.
    pub fn set_time_scale(&mut self, scale: u32) -> u32 {
        let scale = self.config.clamp_time_scale(scale);
        if scale != self.time_scale {
            self.time_scale = scale;
            self.pending.push(BattleEvent::TimeScaleChanged { scale });
            self.flush();
        }
        self.time_scale
    }

    /// Raise the time scale by one step.
    pub fn increase_time_scale(&mut self) -> u32 {
        self.set_time_scale(self.time_scale.saturating_add(1))
    }

    /// Lower the time scale by one step.
    pub fn decrease_time_scale(&mut self) -> u32 {
        self.set_time_scale(self.time_scale.saturating_sub(1))
    }

    // ------------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------------

    fn selected_state(&self) -> Option<(UnitId, StateKind)> {
        self.selected_unit().map(|u| (u.id(), u.state().kind()))
    }

    fn note_selected_state(&mut self, before: Option<(UnitId, StateKind)>) {
        let now = self.selected_state();
        if let Some((unit, state)) = now {
            if before != now {
                self.pending
                    .push(BattleEvent::SelectedStateChanged { unit, state });
            }
        }
    }

    fn flush(&mut self) {
        if !self.pending.is_empty() {
            self.presenter.present(&self.pending);
            self.pending.clear();
        }
    }

    // ------------------------------------------------------------------------
    // Determinism
    // ------------------------------------------------------------------------

    /// Hash of everything that affects how the battle evolves.
    ///
    /// Two battles built from the same specs and fed the same deltas and
    /// commands produce the same hash after every tick.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.ticks.hash(&mut hasher);
        self.elapsed_ms.to_bits().hash(&mut hasher);
        self.ai_accumulator_ms.to_bits().hash(&mut hasher);
        self.time_scale.hash(&mut hasher);
        self.paused.hash(&mut hasher);
        self.outcome.hash(&mut hasher);

        self.roster.len().hash(&mut hasher);
        for unit in &self.roster {
            unit.id().hash(&mut hasher);
            unit.owner().hash(&mut hasher);
            unit.position().x.to_bits().hash(&mut hasher);
            unit.position().y.to_bits().hash(&mut hasher);
            unit.health().hash(&mut hasher);
            unit.heading().to_bits().hash(&mut hasher);
            unit.target_heading().to_bits().hash(&mut hasher);
            unit.cooldown_ms().to_bits().hash(&mut hasher);
            unit.formation_key().hash(&mut hasher);
            hash_state(&unit.state(), &mut hasher);
        }

        hasher.finish()
    }
}

fn hash_state(state: &UnitState, hasher: &mut DefaultHasher) {
    state.kind().hash(hasher);
    state.target().hash(hasher);
    if let Some(destination) = state.destination() {
        destination.x.to_bits().hash(hasher);
        destination.y.to_bits().hash(hasher);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{BlueprintRegistry, UnitBlueprint};
    use crate::events::EventLog;

    fn registry() -> BlueprintRegistry {
        let mut registry = BlueprintRegistry::new();
        registry.insert(UnitBlueprint::new("Heavy", 1000, 400, 100, 100, 500.0));
        registry.insert(UnitBlueprint::new("Glass", 10, 400, 0, 100, 500.0));
        registry
    }

    fn logged() -> Battle<EventLog> {
        Battle::with_presenter(BattleConfig::default(), EventLog::new())
    }

    #[test]
    fn test_start_skips_missing_blueprints_and_duplicates() {
        let mut battle = logged();
        let setup = battle.start_battle(
            &[
                UnitSpec::new(1, "Heavy", 0.0, 0.0, FactionId::Player1),
                UnitSpec::new(2, "Phantom", 0.0, 0.0, FactionId::Player1),
                UnitSpec::new(1, "Heavy", 10.0, 0.0, FactionId::Player2),
                UnitSpec::new(3, "Heavy", 900.0, 0.0, FactionId::Player2),
            ],
            &registry(),
        );
        assert_eq!(setup.spawned, vec![1, 3]);
        assert_eq!(setup.skipped.len(), 2);
        assert!(!setup.is_complete());
        assert_eq!(battle.units().len(), 2);
        assert_eq!(
            battle.presenter().events().last(),
            Some(&BattleEvent::BattleStarted { units: vec![1, 3] })
        );
    }

    #[test]
    fn test_start_resets_session_state() {
        let mut battle = logged();
        let specs = [
            UnitSpec::new(1, "Heavy", 0.0, 0.0, FactionId::Player1),
            UnitSpec::new(2, "Heavy", 3000.0, 0.0, FactionId::Player2),
        ];
        battle.start_battle(&specs, &registry());
        battle.select(Some(1));
        battle.set_time_scale(5);
        battle.tick(100.0);
        battle.toggle_pause();

        battle.start_battle(&specs, &registry());
        assert_eq!(battle.selected(), None);
        assert_eq!(battle.time_scale(), 1);
        assert!(!battle.is_paused());
        assert_eq!(battle.elapsed_ms(), 0.0);
        assert_eq!(battle.tick_count(), 0);
    }

    #[test]
    fn test_tick_scales_simulation_time() {
        let mut battle = Battle::new(BattleConfig::default());
        battle.start_battle(
            &[
                UnitSpec::new(1, "Heavy", 0.0, 0.0, FactionId::Player1),
                UnitSpec::new(2, "Heavy", 9000.0, 0.0, FactionId::Player2),
            ],
            &registry(),
        );
        battle.set_time_scale(4);
        battle.tick(10.0);
        assert_eq!(battle.elapsed_ms(), 40.0);
    }

    #[test]
    fn test_pause_freezes_battle() {
        let mut battle = Battle::new(BattleConfig::default());
        battle.start_battle(
            &[
                UnitSpec::new(1, "Heavy", 0.0, 0.0, FactionId::Player1),
                UnitSpec::new(2, "Heavy", 9000.0, 0.0, FactionId::Player2),
            ],
            &registry(),
        );
        battle.issue_move_order(1, 1000.0, 0.0);
        assert!(battle.toggle_pause());
        let hash = battle.state_hash();
        battle.tick(500.0);
        assert_eq!(battle.state_hash(), hash);
        assert!(!battle.toggle_pause());
        battle.tick(500.0);
        assert_ne!(battle.state_hash(), hash);
    }

    #[test]
    fn test_invalid_delta_is_ignored() {
        let mut battle = Battle::new(BattleConfig::default());
        battle.start_battle(
            &[
                UnitSpec::new(1, "Heavy", 0.0, 0.0, FactionId::Player1),
                UnitSpec::new(2, "Heavy", 9000.0, 0.0, FactionId::Player2),
            ],
            &registry(),
        );
        battle.tick(-5.0);
        battle.tick(f64::NAN);
        assert_eq!(battle.tick_count(), 0);
    }

    #[test]
    fn test_time_scale_is_clamped() {
        let mut battle = Battle::new(BattleConfig::default());
        assert_eq!(battle.set_time_scale(0), 1);
        assert_eq!(battle.set_time_scale(42), 10);
        assert_eq!(battle.increase_time_scale(), 10);
        assert_eq!(battle.decrease_time_scale(), 9);
    }

    #[test]
    fn test_attack_order_validation() {
        let mut battle = logged();
        battle.start_battle(
            &[
                UnitSpec::new(1, "Heavy", 0.0, 0.0, FactionId::Player1),
                UnitSpec::new(2, "Heavy", 100.0, 0.0, FactionId::Player1),
                UnitSpec::new(3, "Heavy", 900.0, 0.0, FactionId::Player2),
            ],
            &registry(),
        );
        assert!(!battle.issue_attack_order(1, 2), "friendly fire");
        assert!(!battle.issue_attack_order(1, 99), "unknown target");
        assert!(battle.issue_attack_order(1, 3));
        assert_eq!(
            battle.unit(1).map(|u| u.state()),
            Some(UnitState::Attacking { target: 3 })
        );
    }

    #[test]
    fn test_ai_orders_idle_units_on_cadence() {
        let mut battle = Battle::new(BattleConfig::default());
        battle.start_battle(
            &[
                UnitSpec::new(1, "Heavy", 0.0, 0.0, FactionId::Player1),
                UnitSpec::new(2, "Heavy", 9000.0, 0.0, FactionId::Player2),
            ],
            &registry(),
        );
        // Far apart and out of sight: nobody engages on their own.
        battle.tick(500.0);
        assert_eq!(battle.unit(2).map(|u| u.state().kind()), Some(StateKind::Idle));

        // The AI interval is measured in unscaled time.
        battle.set_time_scale(10);
        battle.tick(499.0);
        assert_eq!(battle.unit(2).map(|u| u.state().kind()), Some(StateKind::Idle));
        battle.tick(1.0);
        assert_eq!(battle.unit(2).and_then(|u| u.state().target()), Some(1));
    }

    fn duel(battle: &mut Battle<EventLog>) {
        battle.start_battle(
            &[
                UnitSpec::new(1, "Heavy", 0.0, 0.0, FactionId::Player1),
                UnitSpec::new(2, "Glass", 300.0, 0.0, FactionId::Player2),
            ],
            &registry(),
        );
    }

    #[test]
    fn test_strike_destroys_and_wins() {
        let mut battle = logged();
        duel(&mut battle);

        // First tick: both sides lock on. Second tick: unit 1 fires.
        battle.tick(16.0);
        assert!(battle.outcome().is_none());
        battle.tick(16.0);

        assert!(battle.unit(2).is_some_and(Unit::is_dead));
        assert_eq!(
            battle.outcome(),
            Some(BattleOutcome::Victory(FactionId::Player1))
        );

        let events = battle.presenter().events();
        assert!(events.iter().any(|e| matches!(
            e,
            BattleEvent::Attack {
                attacker: 1,
                defender: 2,
                ..
            }
        )));
        assert!(events
            .iter()
            .any(|e| matches!(e, BattleEvent::UnitDestroyed { unit: 2, .. })));
        assert_eq!(
            events.last(),
            Some(&BattleEvent::BattleEnded {
                outcome: BattleOutcome::Victory(FactionId::Player1)
            })
        );
    }

    #[test]
    fn test_killed_unit_is_skipped_later_in_tick() {
        let mut battle = logged();
        battle.start_battle(
            &[
                UnitSpec::new(1, "Heavy", 0.0, 0.0, FactionId::Player1),
                UnitSpec::new(2, "Glass", 300.0, 0.0, FactionId::Player2),
                UnitSpec::new(4, "Heavy", 100.0, 0.0, FactionId::Player1),
            ],
            &registry(),
        );
        battle.tick(16.0);
        assert_eq!(battle.unit(4).and_then(|u| u.state().target()), Some(2));

        // Unit 1 kills 2 first; unit 4 then finds its target dead and stands down.
        battle.tick(16.0);
        assert_eq!(battle.presenter().attacks().count(), 1);
        assert_eq!(battle.unit(4).map(|u| u.state()), Some(UnitState::IDLE));
        assert_eq!(battle.unit(4).map(|u| u.cooldown_ms()), Some(0.0));
    }

    #[test]
    fn test_both_sides_eliminated_is_draw() {
        let mut battle = logged();
        battle.start_battle(
            &[
                UnitSpec::new(1, "Heavy", 0.0, 0.0, FactionId::Player1),
                UnitSpec::new(2, "Heavy", 9000.0, 0.0, FactionId::Player2),
            ],
            &registry(),
        );
        for id in [1, 2] {
            if let Some(unit) = battle.roster.get_mut(id) {
                unit.take_damage(u32::MAX);
            }
        }
        assert_eq!(battle.check_win_condition(), Some(BattleOutcome::Draw));
    }

    #[test]
    fn test_one_sided_roster_is_decided_immediately() {
        let mut battle = Battle::new(BattleConfig::default());
        battle.start_battle(
            &[UnitSpec::new(1, "Heavy", 0.0, 0.0, FactionId::Player2)],
            &registry(),
        );
        assert_eq!(
            battle.check_win_condition(),
            Some(BattleOutcome::Victory(FactionId::Player2))
        );
    }

    #[test]
    fn test_win_condition_is_idempotent() {
        let mut battle = logged();
        duel(&mut battle);
        battle.tick(16.0);
        battle.tick(16.0);

        let ended = |battle: &Battle<EventLog>| {
            battle
                .presenter()
                .events()
                .iter()
                .filter(|e| matches!(e, BattleEvent::BattleEnded { .. }))
                .count()
        };
        let first = battle.check_win_condition();
        assert!(first.is_some());
        assert_eq!(battle.check_win_condition(), first);
        assert_eq!(ended(&battle), 1);
    }

    #[test]
    fn test_empty_battle_is_undecided() {
        let mut battle = Battle::new(BattleConfig::default());
        assert_eq!(battle.check_win_condition(), None);
    }

    #[test]
    fn test_decided_battle_rejects_commands_and_ticks() {
        let mut battle = logged();
        duel(&mut battle);
        battle.select(Some(1));
        battle.tick(16.0);
        battle.tick(16.0);
        assert!(battle.is_over());
        assert_eq!(battle.selected(), None);

        let ticks = battle.tick_count();
        battle.tick(16.0);
        assert_eq!(battle.tick_count(), ticks);
        assert!(!battle.issue_move_order(1, 100.0, 100.0));
    }

    #[test]
    fn test_selected_unit_state_change_is_reported() {
        let mut battle = logged();
        battle.start_battle(
            &[
                UnitSpec::new(1, "Heavy", 0.0, 0.0, FactionId::Player1),
                UnitSpec::new(2, "Heavy", 9000.0, 0.0, FactionId::Player2),
            ],
            &registry(),
        );
        battle.select(Some(1));
        battle.issue_move_order(1, 0.0, 3.0);
        assert!(battle.presenter().events().contains(&BattleEvent::SelectedStateChanged {
            unit: 1,
            state: StateKind::Moving
        }));

        battle.tick(16.0);
        assert_eq!(
            battle.presenter().events().last(),
            Some(&BattleEvent::SelectedStateChanged {
                unit: 1,
                state: StateKind::Idle
            })
        );
    }

    #[test]
    fn test_select_rejects_dead_units() {
        let mut battle = logged();
        battle.start_battle(
            &[
                UnitSpec::new(1, "Heavy", 0.0, 0.0, FactionId::Player1),
                UnitSpec::new(2, "Glass", 300.0, 0.0, FactionId::Player2),
                UnitSpec::new(3, "Heavy", 0.0, 9000.0, FactionId::Player2),
            ],
            &registry(),
        );
        battle.tick(16.0);
        battle.tick(16.0);
        assert!(battle.unit(2).is_some_and(Unit::is_dead));
        assert!(!battle.select(Some(2)));
        assert_eq!(battle.selected(), None);
    }

    #[test]
    fn test_invalid_selection_keeps_current() {
        let mut battle = logged();
        duel(&mut battle);
        assert!(battle.select(Some(1)));
        let events = battle.presenter().events().len();

        assert!(!battle.select(Some(99)));
        assert_eq!(battle.selected(), Some(1));
        assert_eq!(battle.presenter().events().len(), events);

        assert!(battle.select(None));
        assert_eq!(battle.selected(), None);
    }

    #[test]
    fn test_selection_cleared_when_selected_unit_dies() {
        let mut battle = logged();
        battle.start_battle(
            &[
                UnitSpec::new(1, "Glass", 0.0, 0.0, FactionId::Player1),
                UnitSpec::new(2, "Heavy", -300.0, 0.0, FactionId::Player2),
                UnitSpec::new(3, "Heavy", 0.0, 9000.0, FactionId::Player1),
            ],
            &registry(),
        );
        battle.select(Some(1));

        // Unit 2 has unit 1 dead ahead; unit 1 still has to turn round.
        for _ in 0..3 {
            battle.tick(16.0);
        }
        assert!(battle.unit(1).is_some_and(Unit::is_dead));
        assert!(!battle.is_over());
        assert_eq!(battle.selected(), None);
        assert!(battle
            .presenter()
            .events()
            .contains(&BattleEvent::SelectionChanged { unit: None }));
    }

    #[test]
    fn test_formation_change_emits_event() {
        let mut battle = logged();
        battle.start_battle(
            &[
                UnitSpec::new(1, "Heavy", 0.0, 0.0, FactionId::Player1),
                UnitSpec::new(2, "Heavy", 9000.0, 0.0, FactionId::Player2),
            ],
            &registry(),
        );
        assert!(battle.set_formation(1, "ring"));
        assert!(!battle.set_formation(99, "ring"));
        assert!(!battle.set_formation(99, "wedge"));
        assert_eq!(
            battle.presenter().events().last(),
            Some(&BattleEvent::FormationChanged {
                unit: 1,
                formation: "ring".to_string()
            })
        );
        assert_eq!(battle.readout(1).map(|r| r.formation), Some("Ring".to_string()));
    }

    #[test]
    fn test_identical_battles_hash_identically() {
        let specs = [
            UnitSpec::new(1, "Heavy", 0.0, 0.0, FactionId::Player1),
            UnitSpec::new(2, "Heavy", 1200.0, 300.0, FactionId::Player2),
        ];
        let mut a = Battle::new(BattleConfig::default());
        let mut b = Battle::new(BattleConfig::default());
        a.start_battle(&specs, &registry());
        b.start_battle(&specs, &registry());
        for _ in 0..200 {
            a.tick(33.0);
            b.tick(33.0);
            assert_eq!(a.state_hash(), b.state_hash());
        }
    }

    #[test]
    fn test_unit_facing_away_takes_rear_hit() {
        let mut battle = logged();
        battle.start_battle(
            &[
                UnitSpec::new(1, "Heavy", 0.0, 0.0, FactionId::Player1),
                UnitSpec::new(2, "Heavy", -300.0, 0.0, FactionId::Player2),
            ],
            &registry(),
        );
        // Both start facing +X: unit 2 has unit 1 dead ahead, unit 1 has to
        // turn all the way round.
        for _ in 0..3 {
            battle.tick(16.0);
        }
        let attacks: Vec<&BattleEvent> = battle.presenter().attacks().collect();
        assert_eq!(
            attacks,
            vec![&BattleEvent::Attack {
                attacker: 2,
                defender: 1,
                damage: 652,
                facing: crate::combat::Facing::Rear,
            }]
        );
    }
}
