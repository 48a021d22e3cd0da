//! Battle roster.
//!
//! All units of a battle in creation order. The roster is filled once when
//! the battle starts and never grows or shrinks afterwards: destroyed units
//! stay in place with zero health and are skipped by the `living` queries.

use std::collections::HashMap;

use crate::components::UnitId;
use crate::factions::FactionId;
use crate::unit::Unit;

/// Ordered, fixed-size unit collection with an id index.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    units: Vec<Unit>,
    index: HashMap<UnitId, usize>,
}

impl Roster {
    /// Create an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a roster from units with distinct ids.
    ///
    /// Callers are expected to have rejected duplicates already; a repeated
    /// id keeps its first position in the index.
    #[must_use]
    pub(crate) fn from_units(units: Vec<Unit>) -> Self {
        let mut index = HashMap::with_capacity(units.len());
        for (i, unit) in units.iter().enumerate() {
            index.entry(unit.id()).or_insert(i);
        }
        debug_assert_eq!(index.len(), units.len(), "duplicate unit ids in roster");
        Self { units, index }
    }

    /// Look up a unit by id.
    #[must_use]
    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.index.get(&id).map(|&i| &self.units[i])
    }

    pub(crate) fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.index.get(&id).map(|&i| &mut self.units[i])
    }

    /// Look up a unit by id, only if it is alive.
    #[must_use]
    pub fn living_unit(&self, id: UnitId) -> Option<&Unit> {
        self.get(id).filter(|u| u.is_alive())
    }

    /// Whether a unit with this id exists (alive or not).
    #[must_use]
    pub fn contains(&self, id: UnitId) -> bool {
        self.index.contains_key(&id)
    }

    /// All units in roster order.
    pub fn iter(&self) -> std::slice::Iter<'_, Unit> {
        self.units.iter()
    }

    /// Living units in roster order.
    pub fn living(&self) -> impl DoubleEndedIterator<Item = &Unit> + '_ {
        self.units.iter().filter(|u| u.is_alive())
    }

    /// Living units of one faction in roster order.
    pub fn living_of(&self, faction: FactionId) -> impl Iterator<Item = &Unit> + '_ {
        self.living().filter(move |u| u.owner() == faction)
    }

    /// Number of living units in `faction`.
    #[must_use]
    pub fn living_count(&self, faction: FactionId) -> usize {
        self.living_of(faction).count()
    }

    /// All units as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Unit] {
        &self.units
    }

    /// Total number of units, dead ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the roster has no units at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Split out the unit at `position` for mutation, with a read-only view
    /// of everyone else.
    pub(crate) fn split_at(&mut self, position: usize) -> Option<(&mut Unit, Neighbors<'_>)> {
        if position >= self.units.len() {
            return None;
        }
        let (before, rest) = self.units.split_at_mut(position);
        let (unit, after) = rest.split_first_mut()?;
        Some((unit, Neighbors::new(before, after)))
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a Unit;
    type IntoIter = std::slice::Iter<'a, Unit>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.iter()
    }
}

/// Read-only view of every unit except the one being updated.
///
/// Iteration follows roster order, skipping the excluded unit.
#[derive(Debug, Clone, Copy)]
pub struct Neighbors<'a> {
    before: &'a [Unit],
    after: &'a [Unit],
}

impl<'a> Neighbors<'a> {
    /// View made of the units before and after the excluded one.
    #[must_use]
    pub fn new(before: &'a [Unit], after: &'a [Unit]) -> Self {
        Self { before, after }
    }

    /// A view with nobody in it.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            before: &[],
            after: &[],
        }
    }

    /// Units in roster order.
    pub fn iter(&self) -> impl Iterator<Item = &'a Unit> {
        self.before.iter().chain(self.after.iter())
    }

    /// Find a unit by id.
    #[must_use]
    pub fn get(&self, id: UnitId) -> Option<&'a Unit> {
        self.iter().find(|u| u.id() == id)
    }

    /// Number of units in view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.before.len() + self.after.len()
    }

    /// Whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
