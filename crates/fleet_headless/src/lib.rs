//! Headless battle runner for scripted scenarios and CI verification.
//!
//! This crate runs [`fleet_core`] battles without any front end. A scenario
//! file supplies the roster, the blueprints and a script of player intents;
//! the runner advances the battle with a fixed frame length and collects
//! metrics from the event stream. This enables:
//!
//! - **Balance sweeps**: the same battle at every time scale
//! - **CI verification**: repeated parallel runs must end on the same hash
//! - **Data validation**: blueprint files are checked before use
//!
//! # Output
//!
//! - **stdout**: JSON reports (when requested)
//! - **stderr**: logs (human-readable)
//!
//! # Example
//!
//! ```bash
//! # Run a scenario and print a JSON summary
//! cargo run -p fleet_headless -- run --scenario crates/fleet_headless/scenarios/skirmish.ron --json
//!
//! # Verify determinism
//! cargo run -p fleet_headless -- verify --runs 8
//! ```

pub mod metrics;
pub mod runner;
pub mod scenario;

pub use metrics::{BattleMetrics, FactionMetrics, MetricsPresenter};
pub use runner::{HeadlessRunner, RunConfig, RunReport, VerifyReport};
pub use scenario::{load_blueprints, Scenario, ScenarioError};
