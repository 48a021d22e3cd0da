//! Scenario loading.
//!
//! A scenario fixes everything a headless battle needs: the starting roster,
//! the blueprint table, configuration overrides, and a script of player
//! intents keyed by frame number that stands in for a mouse and keyboard.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use fleet_core::config::BattleConfig;
use fleet_core::data::{standard_skirmish, BlueprintRegistry, UnitSpec};
use fleet_core::error::BattleError;
use fleet_core::input::PlayerIntent;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// Blueprint or config data was rejected.
    #[error(transparent)]
    Data(#[from] BattleError),
    /// Failed to encode a report.
    #[error("Failed to write report: {0}")]
    Report(#[from] serde_json::Error),
}

/// A complete scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Blueprint file, relative to the scenario file. Stock fleets when absent.
    #[serde(default)]
    pub blueprints: Option<PathBuf>,
    /// Starting roster.
    pub units: Vec<UnitSpec>,
    /// Battle configuration.
    #[serde(default)]
    pub config: BattleConfig,
    /// Player intents to replay, keyed by the frame they fire on.
    #[serde(default)]
    pub intents: BTreeMap<u64, Vec<PlayerIntent>>,
    /// Directory the scenario was loaded from.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self::skirmish()
    }
}

impl Scenario {
    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let mut scenario = Self::from_ron_str(&contents)?;
        scenario.base_dir = path.parent().map(Path::to_path_buf);
        tracing::debug!(path = %path.display(), name = %scenario.name, "Loaded scenario");
        Ok(scenario)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        scenario.config.validate()?;
        Ok(scenario)
    }

    /// The stock eight-fleet skirmish with default settings.
    #[must_use]
    pub fn skirmish() -> Self {
        Self {
            name: "Standard Skirmish".to_string(),
            description: "Four fleets a side across open space".to_string(),
            blueprints: None,
            units: standard_skirmish(),
            config: BattleConfig::default(),
            intents: BTreeMap::new(),
            base_dir: None,
        }
    }

    /// Resolve the blueprint file path, if the scenario names one.
    #[must_use]
    pub fn blueprint_path(&self) -> Option<PathBuf> {
        let path = self.blueprints.as_ref()?;
        Some(match &self.base_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.clone(),
        })
    }

    /// Load the blueprint table this scenario runs with.
    pub fn load_blueprints(&self) -> Result<BlueprintRegistry, ScenarioError> {
        match self.blueprint_path() {
            Some(path) => load_blueprints(&path),
            None => Ok(BlueprintRegistry::standard()),
        }
    }

    /// Number of scripted intents.
    #[must_use]
    pub fn intent_count(&self) -> usize {
        self.intents.values().map(Vec::len).sum()
    }
}

/// Load and validate a RON blueprint list.
pub fn load_blueprints(path: &Path) -> Result<BlueprintRegistry, ScenarioError> {
    if !path.exists() {
        return Err(ScenarioError::FileNotFound(path.display().to_string()));
    }
    let contents = std::fs::read_to_string(path)?;
    let registry = BlueprintRegistry::from_ron_str(&path.display().to_string(), &contents)?;
    tracing::debug!(path = %path.display(), count = registry.len(), "Loaded blueprints");
    Ok(registry)
}
