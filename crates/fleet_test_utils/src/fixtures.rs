//! Test fixtures and helpers.
//!
//! Pre-built battles and unit configurations for consistent testing.

use fleet_core::battle::Battle;
use fleet_core::config::BattleConfig;
use fleet_core::data::{standard_skirmish, BlueprintRegistry, UnitBlueprint, UnitSpec};
use fleet_core::events::{BattleOutcome, EventLog, Presenter};
use fleet_core::factions::FactionId;

/// Frame length used by most tests (~60 fps).
pub const FRAME_MS: f64 = 16.0;

/// Name of the sturdy fixture blueprint.
pub const HEAVY: &str = "Heavy";

/// Name of the one-shot fixture blueprint.
pub const GLASS: &str = "Glass";

/// Name of the fast fixture blueprint.
pub const SCOUT: &str = "Scout";

/// Small blueprint table with round numbers.
///
/// | name | hp | atk | def | move | range |
/// |---|---|---|---|---|---|
/// | Heavy | 1000 | 400 | 100 | 100 | 500 |
/// | Glass | 10 | 400 | 0 | 100 | 500 |
/// | Scout | 300 | 50 | 10 | 300 | 200 |
#[must_use]
pub fn test_registry() -> BlueprintRegistry {
    let mut registry = BlueprintRegistry::new();
    registry.insert(UnitBlueprint::new(HEAVY, 1000, 400, 100, 100, 500.0));
    registry.insert(UnitBlueprint::new(GLASS, 10, 400, 0, 100, 500.0));
    registry.insert(UnitBlueprint::new(SCOUT, 300, 50, 10, 300, 200.0));
    registry
}

/// Spec shorthand.
#[must_use]
pub fn spec(id: u32, blueprint: &str, x: f64, y: f64, owner: FactionId) -> UnitSpec {
    UnitSpec::new(id, blueprint, x, y, owner)
}

/// The stock eight-fleet skirmish with a recording presenter.
#[must_use]
pub fn skirmish() -> Battle<EventLog> {
    let mut battle = Battle::with_presenter(BattleConfig::default(), EventLog::new());
    battle.start_battle(&standard_skirmish(), &BlueprintRegistry::standard());
    battle
}

/// The stock skirmish without event recording.
#[must_use]
pub fn quiet_skirmish() -> Battle {
    let mut battle = Battle::new(BattleConfig::default());
    battle.start_battle(&standard_skirmish(), &BlueprintRegistry::standard());
    battle
}

/// A battle over [`test_registry`] blueprints with a recording presenter.
#[must_use]
pub fn battle_with(specs: &[UnitSpec]) -> Battle<EventLog> {
    let mut battle = Battle::with_presenter(BattleConfig::default(), EventLog::new());
    battle.start_battle(specs, &test_registry());
    battle
}

/// One heavy unit per side, `distance` apart along the X axis.
#[must_use]
pub fn heavy_duel(distance: f64) -> Battle<EventLog> {
    battle_with(&[
        spec(1, HEAVY, 0.0, 0.0, FactionId::Player1),
        spec(2, HEAVY, distance, 0.0, FactionId::Player2),
    ])
}

/// Tick until the battle is decided or `max_ticks` have passed.
///
/// Returns the outcome, if any, and the number of ticks run.
pub fn run_until_decided<P: Presenter>(
    battle: &mut Battle<P>,
    dt_ms: f64,
    max_ticks: u64,
) -> (Option<BattleOutcome>, u64) {
    let mut ticks = 0;
    while ticks < max_ticks && !battle.is_over() {
        battle.tick(dt_ms);
        ticks += 1;
    }
    (battle.outcome(), ticks)
}
