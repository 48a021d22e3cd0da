//! Blueprint lookup.
//!
//! Blueprints are an external, read-only data source. The simulation only
//! sees them through [`BlueprintSource`]; [`BlueprintRegistry`] is the
//! in-memory implementation used by hosts and tests.

use std::collections::HashMap;

use crate::error::{BattleError, Result};

use crate::factions::FactionId;

use super::{UnitBlueprint, UnitSpec};

/// Read-only access to unit blueprints by name.
pub trait BlueprintSource {
    /// Look up a blueprint by name.
    fn blueprint(&self, name: &str) -> Option<&UnitBlueprint>;
}

/// In-memory blueprint table.
#[derive(Debug, Clone, Default)]
pub struct BlueprintRegistry {
    blueprints: HashMap<String, UnitBlueprint>,
}

impl BlueprintRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The eight stock fleets, four per side.
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for blueprint in [
            UnitBlueprint::new("First Fleet", 2500, 480, 80, 100, 600.0),
            UnitBlueprint::new("Third Fleet", 1800, 280, 60, 80, 550.0),
            UnitBlueprint::new("Sixth Fleet", 1800, 280, 140, 80, 550.0),
            UnitBlueprint::new("Eighth Fleet", 800, 100, 20, 150, 400.0),
            UnitBlueprint::new("Athena Fleet", 2200, 320, 70, 90, 600.0),
            UnitBlueprint::new("Zeus Fleet", 1900, 270, 60, 85, 550.0),
            UnitBlueprint::new("Neptune Fleet", 1700, 260, 55, 85, 550.0),
            UnitBlueprint::new("Hermes Fleet", 600, 150, 15, 130, 300.0),
        ] {
            registry.insert(blueprint);
        }
        registry
    }

    /// Parse a RON list of blueprints.
    ///
    /// Every record is validated; the first invalid one fails the load.
    pub fn from_ron_str(source_name: &str, ron: &str) -> Result<Self> {
        let list: Vec<UnitBlueprint> =
            ron::from_str(ron).map_err(|e| BattleError::DataParseError {
                source_name: source_name.to_string(),
                message: e.to_string(),
            })?;

        let mut registry = Self::new();
        for blueprint in list {
            if let Some(reason) = blueprint.problem() {
                return Err(BattleError::InvalidBlueprint {
                    name: blueprint.name,
                    reason,
                });
            }
            if let Some(previous) = registry.insert(blueprint) {
                tracing::warn!(name = %previous.name, source = source_name, "Blueprint defined twice; later entry wins");
            }
        }
        Ok(registry)
    }

    /// Add or replace a blueprint, returning the one it replaced.
    pub fn insert(&mut self, blueprint: UnitBlueprint) -> Option<UnitBlueprint> {
        self.blueprints.insert(blueprint.name.clone(), blueprint)
    }

    /// Check every record, collecting all problems.
    pub fn validate(&self) -> Vec<BattleError> {
        let mut names: Vec<&String> = self.blueprints.keys().collect();
        names.sort();
        names
            .into_iter()
            .filter_map(|name| {
                let blueprint = &self.blueprints[name];
                blueprint
                    .problem()
                    .map(|reason| BattleError::InvalidBlueprint {
                        name: name.clone(),
                        reason,
                    })
            })
            .collect()
    }

    /// Blueprint names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.blueprints.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of blueprints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blueprints.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blueprints.is_empty()
    }
}

/// The stock opening: four fleets per side facing each other across the map.
///
/// Every spec names a blueprint from [`BlueprintRegistry::standard`].
#[must_use]
pub fn standard_skirmish() -> Vec<UnitSpec> {
    vec![
        UnitSpec::new(1, "First Fleet", 500.0, 2000.0, FactionId::Player1),
        UnitSpec::new(2, "Third Fleet", 500.0, 1500.0, FactionId::Player1),
        UnitSpec::new(3, "Sixth Fleet", 500.0, 2500.0, FactionId::Player1),
        UnitSpec::new(4, "Eighth Fleet", 800.0, 2000.0, FactionId::Player1),
        UnitSpec::new(5, "Athena Fleet", 3500.0, 2000.0, FactionId::Player2),
        UnitSpec::new(6, "Zeus Fleet", 3500.0, 1500.0, FactionId::Player2),
        UnitSpec::new(7, "Neptune Fleet", 3500.0, 2500.0, FactionId::Player2),
        UnitSpec::new(8, "Hermes Fleet", 3200.0, 2000.0, FactionId::Player2),
    ]
}

impl BlueprintSource for BlueprintRegistry {
    fn blueprint(&self, name: &str) -> Option<&UnitBlueprint> {
        self.blueprints.get(name)
    }
}
