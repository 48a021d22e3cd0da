//! Battle metrics collection.
//!
//! [`MetricsPresenter`] sits where a renderer would and turns the event
//! stream into per-faction tallies for reports and balance sweeps.

use std::collections::{BTreeMap, HashMap};

use fleet_core::combat::Facing;
use fleet_core::components::UnitId;
use fleet_core::data::UnitSpec;
use fleet_core::events::{BattleEvent, BattleOutcome, Presenter};
use fleet_core::factions::FactionId;
use serde::{Deserialize, Serialize};

/// Combat tallies for one faction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactionMetrics {
    /// Attacks fired.
    pub attacks: u32,
    /// Total damage dealt.
    pub damage_dealt: u64,
    /// Total damage taken.
    pub damage_taken: u64,
    /// Attacks that landed on an enemy's side arc.
    pub side_hits: u32,
    /// Attacks that landed on an enemy's rear arc.
    pub rear_hits: u32,
    /// Enemy units destroyed.
    pub kills: u32,
    /// Own units destroyed.
    pub losses: u32,
}

impl FactionMetrics {
    /// Hits that landed on a side or rear arc.
    #[must_use]
    pub fn flank_hits(&self) -> u32 {
        self.side_hits + self.rear_hits
    }
}

/// Everything observed during one battle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BattleMetrics {
    /// Units spawned.
    pub units_spawned: usize,
    /// Per-faction tallies.
    pub factions: BTreeMap<FactionId, FactionMetrics>,
    /// Player and AI orders accepted.
    pub orders: u32,
    /// Formation changes.
    pub formation_changes: u32,
    /// Final result, if the battle was decided.
    pub outcome: Option<BattleOutcome>,
    /// Total events received.
    pub events: usize,
}

impl BattleMetrics {
    /// Tallies for one faction, empty if it never acted.
    #[must_use]
    pub fn faction(&self, faction: FactionId) -> FactionMetrics {
        self.factions.get(&faction).cloned().unwrap_or_default()
    }

    fn faction_mut(&mut self, faction: FactionId) -> &mut FactionMetrics {
        self.factions.entry(faction).or_default()
    }
}

/// Presenter that logs events and accumulates [`BattleMetrics`].
#[derive(Debug, Clone, Default)]
pub struct MetricsPresenter {
    owners: HashMap<UnitId, FactionId>,
    metrics: BattleMetrics,
}

impl MetricsPresenter {
    /// Create a presenter that knows who owns each unit in `specs`.
    #[must_use]
    pub fn new(specs: &[UnitSpec]) -> Self {
        Self {
            owners: specs.iter().map(|s| (s.id, s.owner)).collect(),
            metrics: BattleMetrics::default(),
        }
    }

    /// Metrics collected so far.
    #[must_use]
    pub fn metrics(&self) -> &BattleMetrics {
        &self.metrics
    }

    /// Consume the presenter, returning its metrics.
    #[must_use]
    pub fn into_metrics(self) -> BattleMetrics {
        self.metrics
    }

    fn record(&mut self, event: &BattleEvent) {
        self.metrics.events += 1;
        match event {
            BattleEvent::BattleStarted { units } => {
                tracing::info!(units = units.len(), "Battle started");
                self.metrics.units_spawned = units.len();
            }
            BattleEvent::Attack {
                attacker,
                defender,
                damage,
                facing,
            } => {
                tracing::trace!(attacker, defender, damage, ?facing, "Attack");
                if let Some(&owner) = self.owners.get(attacker) {
                    let tally = self.metrics.faction_mut(owner);
                    tally.attacks += 1;
                    tally.damage_dealt += u64::from(*damage);
                    match facing {
                        Facing::Side => tally.side_hits += 1,
                        Facing::Rear => tally.rear_hits += 1,
                        Facing::Front => {}
                    }
                }
                if let Some(&owner) = self.owners.get(defender) {
                    self.metrics.faction_mut(owner).damage_taken += u64::from(*damage);
                }
            }
            BattleEvent::UnitDestroyed { unit, owner } => {
                tracing::debug!(unit, %owner, "Unit destroyed");
                self.metrics.faction_mut(*owner).losses += 1;
                self.metrics.faction_mut(owner.opponent()).kills += 1;
            }
            BattleEvent::BattleEnded { outcome } => {
                tracing::info!(%outcome, "Battle ended");
                self.metrics.outcome = Some(*outcome);
            }
            BattleEvent::MoveOrdered { unit, destination } => {
                tracing::debug!(unit, x = destination.x, y = destination.y, "Move ordered");
                self.metrics.orders += 1;
            }
            BattleEvent::AttackOrdered { unit, target } => {
                tracing::debug!(unit, target, "Attack ordered");
                self.metrics.orders += 1;
            }
            BattleEvent::FormationChanged { unit, formation } => {
                tracing::debug!(unit, formation = %formation, "Formation changed");
                self.metrics.formation_changes += 1;
            }
            other => tracing::trace!(event = ?other, "Battle event"),
        }
    }
}

impl Presenter for MetricsPresenter {
    fn present(&mut self, events: &[BattleEvent]) {
        for event in events {
            self.record(event);
        }
    }
}
