//! The scenario and blueprint files shipped with the crate load and run.

use std::path::PathBuf;

use fleet_core::data::BlueprintRegistry;
use fleet_core::events::BattleOutcome;
use fleet_core::factions::FactionId;
use fleet_headless::{load_blueprints, HeadlessRunner, RunConfig, Scenario, ScenarioError};

fn crate_file(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(relative)
}

#[test]
fn test_shipped_blueprints_match_stock_table() {
    let loaded = load_blueprints(&crate_file("data/blueprints.ron")).unwrap();
    let stock = BlueprintRegistry::standard();
    assert_eq!(loaded.names(), stock.names());
    assert!(loaded.validate().is_empty());
}

#[test]
fn test_skirmish_scenario_runs_to_completion() {
    let scenario = Scenario::load(crate_file("scenarios/skirmish.ron")).unwrap();
    assert_eq!(scenario.units.len(), 8);

    let runner = HeadlessRunner::from_scenario(
        scenario,
        RunConfig {
            frame_ms: 50.0,
            max_frames: 12_000,
            time_scale: None,
        },
    )
    .unwrap();
    let report = runner.run();

    assert!(report.outcome.is_some(), "skirmish undecided after {} frames", report.frames);
    assert_eq!(report.skipped_units, 0);
    // Select, formation change and attack order all land.
    assert_eq!(report.intents_applied, 3);

    let losses: u32 = report.metrics.factions.values().map(|f| f.losses).sum();
    assert!(losses >= 4);
}

#[test]
fn test_flank_scenario_runs() {
    let scenario = Scenario::load(crate_file("scenarios/flank.ron")).unwrap();
    let runner = HeadlessRunner::from_scenario(scenario, RunConfig::default()).unwrap();
    let report = runner.run();

    assert_ne!(report.outcome, Some(BattleOutcome::Draw));
    let p1 = report.metrics.faction(FactionId::Player1);
    assert!(p1.attacks > 0);
}

#[test]
fn test_scenario_with_missing_blueprint_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.ron");
    std::fs::write(&path, r#"(name: "Broken", blueprints: Some("nope.ron"), units: [])"#).unwrap();

    let scenario = Scenario::load(&path).unwrap();
    let err = HeadlessRunner::from_scenario(scenario, RunConfig::default()).unwrap_err();
    assert!(matches!(err, ScenarioError::FileNotFound(_)));
}

#[test]
fn test_invalid_blueprint_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.ron");
    std::fs::write(
        &path,
        r#"[(name: "Hollow", hp: 0, atk: 10, def: 0, move_speed: 10, range: 100.0)]"#,
    )
    .unwrap();

    let err = load_blueprints(&path).unwrap_err();
    assert!(err.to_string().contains("Hollow"), "{err}");
}
