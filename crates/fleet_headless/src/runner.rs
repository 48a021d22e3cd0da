//! Headless battle runner.
//!
//! Drives a [`Battle`] frame by frame with a fixed frame length, replays the
//! scenario's scripted intents, and summarises the result. Independent runs
//! are spread across threads with rayon.

use fleet_core::battle::Battle;
use fleet_core::data::BlueprintRegistry;
use fleet_core::events::BattleOutcome;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::metrics::{BattleMetrics, MetricsPresenter};
use crate::scenario::{Scenario, ScenarioError};

/// Ten minutes of frames at ~60 fps.
pub const DEFAULT_MAX_FRAMES: u64 = 36_000;

/// How a headless run is clocked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Real time per frame (ms).
    pub frame_ms: f64,
    /// Frames to run before giving up on a result.
    pub max_frames: u64,
    /// Time scale to start at; the scenario's minimum when unset.
    pub time_scale: Option<u32>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            frame_ms: 16.0,
            max_frames: DEFAULT_MAX_FRAMES,
            time_scale: None,
        }
    }
}

/// Summary of one headless run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Scenario name.
    pub scenario: String,
    /// Final result; `None` if the frame budget ran out first.
    pub outcome: Option<BattleOutcome>,
    /// Frames run.
    pub frames: u64,
    /// Simulated battle time (ms).
    pub elapsed_ms: f64,
    /// Time scale at the end of the run.
    pub time_scale: u32,
    /// Unit specs that could not be spawned.
    pub skipped_units: usize,
    /// Scripted intents that changed something.
    pub intents_applied: usize,
    /// Final simulation state hash (for determinism validation).
    pub final_state_hash: u64,
    /// Event tallies.
    pub metrics: BattleMetrics,
}

/// Result of repeating one run several times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyReport {
    /// Number of runs.
    pub runs: usize,
    /// Final state hash from each run.
    pub hashes: Vec<u64>,
    /// Whether every run produced the same hash.
    pub deterministic: bool,
}

/// Runs a scenario without any front end.
#[derive(Debug, Clone)]
pub struct HeadlessRunner {
    scenario: Scenario,
    blueprints: BlueprintRegistry,
    config: RunConfig,
}

impl HeadlessRunner {
    /// Create a runner with an explicit blueprint table.
    #[must_use]
    pub fn new(scenario: Scenario, blueprints: BlueprintRegistry, config: RunConfig) -> Self {
        Self {
            scenario,
            blueprints,
            config,
        }
    }

    /// Create a runner, loading the scenario's own blueprints.
    pub fn from_scenario(scenario: Scenario, config: RunConfig) -> Result<Self, ScenarioError> {
        let blueprints = scenario.load_blueprints()?;
        Ok(Self::new(scenario, blueprints, config))
    }

    /// The scenario being run.
    #[must_use]
    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    /// The run clock.
    #[must_use]
    pub fn config(&self) -> RunConfig {
        self.config
    }

    /// Run the scenario once.
    pub fn run(&self) -> RunReport {
        self.run_with(self.config)
    }

    fn run_with(&self, config: RunConfig) -> RunReport {
        let scenario = &self.scenario;
        let mut battle = Battle::with_presenter(
            scenario.config.clone(),
            MetricsPresenter::new(&scenario.units),
        );
        let setup = battle.start_battle(&scenario.units, &self.blueprints);
        for error in &setup.skipped {
            tracing::warn!(scenario = %scenario.name, %error, "Unit skipped");
        }
        if let Some(scale) = config.time_scale {
            battle.set_time_scale(scale);
        }

        let mut frames = 0;
        let mut intents_applied = 0;
        while frames < config.max_frames && !battle.is_over() {
            if let Some(intents) = scenario.intents.get(&frames) {
                for intent in intents {
                    if battle.handle_intent(intent) {
                        intents_applied += 1;
                    } else {
                        tracing::debug!(frame = frames, ?intent, "Scripted intent had no effect");
                    }
                }
            }
            battle.tick(config.frame_ms);
            frames += 1;
        }

        if battle.outcome().is_none() {
            tracing::warn!(
                scenario = %scenario.name,
                frames,
                "Frame budget exhausted before a result"
            );
        }

        let final_state_hash = battle.state_hash();
        let outcome = battle.outcome();
        let elapsed_ms = battle.elapsed_ms();
        let time_scale = battle.time_scale();
        RunReport {
            scenario: scenario.name.clone(),
            outcome,
            frames,
            elapsed_ms,
            time_scale,
            skipped_units: setup.skipped.len(),
            intents_applied,
            final_state_hash,
            metrics: battle.into_presenter().into_metrics(),
        }
    }

    /// Run the scenario `runs` times in parallel and compare final hashes.
    pub fn verify(&self, runs: usize) -> VerifyReport {
        let hashes: Vec<u64> = (0..runs)
            .into_par_iter()
            .map(|_| self.run().final_state_hash)
            .collect();
        let deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
        if !deterministic {
            tracing::error!(?hashes, "Runs diverged");
        }
        VerifyReport {
            runs,
            hashes,
            deterministic,
        }
    }

    /// Run once per time scale in the scenario's allowed range, in parallel.
    ///
    /// Reports come back ordered by time scale.
    pub fn sweep(&self) -> Vec<RunReport> {
        let range = self.scenario.config.min_time_scale..=self.scenario.config.max_time_scale;
        range
            .into_par_iter()
            .map(|scale| {
                self.run_with(RunConfig {
                    time_scale: Some(scale),
                    ..self.config
                })
            })
            .collect()
    }
}
