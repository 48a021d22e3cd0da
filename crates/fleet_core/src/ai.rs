//! Reactive AI for the computer-controlled fleet.
//!
//! The AI only ever gives one kind of order: an idle unit with nothing to do
//! is sent after the closest living enemy on the whole map. Sight does not
//! limit it, and opportunistic fights are left to the units' own engage
//! scan.

use crate::components::UnitId;
use crate::factions::FactionId;
use crate::roster::Roster;
use crate::unit::{Unit, UnitState};

/// An attack order chosen by the AI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AiOrder {
    /// Unit receiving the order.
    pub unit: UnitId,
    /// Enemy it should attack.
    pub target: UnitId,
}

/// Choose orders for every idle, untargeted unit of `faction`.
///
/// Returns nothing when the enemy has no living units.
#[must_use]
pub fn plan_orders(roster: &Roster, faction: FactionId) -> Vec<AiOrder> {
    let enemies: Vec<&Unit> = roster.living().filter(|u| u.owner() != faction).collect();
    if enemies.is_empty() {
        return Vec::new();
    }

    roster
        .living_of(faction)
        .filter(|u| u.state() == UnitState::IDLE)
        .filter_map(|unit| {
            closest(unit, &enemies).map(|target| AiOrder {
                unit: unit.id(),
                target: target.id(),
            })
        })
        .collect()
}

fn closest<'a>(from: &Unit, enemies: &[&'a Unit]) -> Option<&'a Unit> {
    let origin = from.position();
    let mut best: Option<(&Unit, f64)> = None;
    for &enemy in enemies {
        let d = origin.distance_to(enemy.position());
        if best.map_or(true, |(_, best_d)| d < best_d) {
            best = Some((enemy, d));
        }
    }
    best.map(|(unit, _)| unit)
}
