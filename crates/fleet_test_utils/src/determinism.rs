//! Determinism testing utilities.
//!
//! Provides a harness for verifying that a battle produces identical results
//! given identical inputs.
//!
//! # Testing Strategy
//!
//! The simulation is driven entirely by the deltas and commands it is fed.
//! Sources of non-determinism to guard against:
//!
//! - **Iteration order**: units always update in roster order; the id index
//!   is only ever used for lookups, never iterated.
//!
//! - **Randomness**: the simulation has none. Any "random" test input comes
//!   from proptest, which is seeded and replayable.
//!
//! - **Floating-point**: positions and headings are `f64`. Results are
//!   bit-identical for identical inputs on the same platform; the state hash
//!   compares raw bits, so any drift shows up immediately.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: individual behaviours (turning, firing, arrival)
//! 2. **Property tests**: random inputs must still produce deterministic outputs
//! 3. **Integration tests**: full skirmishes are reproducible
//! 4. **Parallel tests**: N battles on N threads all match

use std::thread;

use fleet_core::battle::Battle;
use fleet_core::events::Presenter;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic battle).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the battle was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Battle is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Result of parallel battle runs.
#[derive(Debug, Clone)]
pub struct ParallelSimResult {
    /// Final state hash from each battle.
    pub hashes: Vec<u64>,
    /// Number of ticks each battle ran.
    pub ticks: u64,
    /// Number of battles run.
    pub num_sims: usize,
}

impl ParallelSimResult {
    /// Check if all battles produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all battles matched.
    ///
    /// # Panics
    ///
    /// Panics if the battles produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            let mut unique: Vec<u64> = self.hashes.clone();
            unique.sort_unstable();
            unique.dedup();
            panic!(
                "Parallel battles diverged!\n\
                 Battles: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {}\n\
                 All hashes: {:?}",
                self.num_sims,
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a state machine multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `ticks` - Number of steps per run
/// * `setup` - Function to create the initial state
/// * `step` - Function to advance the state by one step
/// * `hash` - Function to compute the state hash
///
/// # Example
///
/// ```
/// use fleet_test_utils::determinism::verify_determinism;
/// use fleet_test_utils::fixtures::quiet_skirmish;
///
/// let result = verify_determinism(
///     3,
///     100,
///     quiet_skirmish,
///     |battle| battle.tick(16.0),
///     |battle| battle.state_hash(),
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..ticks {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Run a battle twice from the same setup with the same fixed delta and
/// compare the final hashes.
///
/// # Arguments
///
/// * `setup_fn` - Function that creates and starts a battle
/// * `num_ticks` - Number of ticks to run
/// * `dt_ms` - Delta fed to every tick
pub fn verify_battle_determinism<P, F>(setup_fn: F, num_ticks: u64, dt_ms: f64) -> bool
where
    P: Presenter,
    F: Fn() -> Battle<P>,
{
    let result = verify_determinism(
        2,
        num_ticks,
        &setup_fn,
        |battle| battle.tick(dt_ms),
        |battle| battle.state_hash(),
    );
    result.is_deterministic
}

/// Run N battles on scoped threads and collect final hashes.
///
/// Catches non-determinism that only shows up under thread scheduling or
/// memory layout differences.
///
/// # Panics
///
/// Panics if a battle thread panics.
pub fn run_parallel_battles_scoped<P, F>(
    setup_fn: F,
    num_sims: usize,
    num_ticks: u64,
    dt_ms: f64,
) -> ParallelSimResult
where
    P: Presenter,
    F: Fn() -> Battle<P> + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_sims)
            .map(|_| {
                s.spawn(|| {
                    let mut battle = setup_fn();
                    for _ in 0..num_ticks {
                        battle.tick(dt_ms);
                    }
                    battle.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("battle thread panicked"))
            .collect()
    });

    ParallelSimResult {
        hashes,
        ticks: num_ticks,
        num_sims,
    }
}

/// Compare two battles delta by delta, finding the first divergence.
///
/// # Returns
///
/// `None` if the battles stay identical, `Some(tick)` if they diverge at
/// that tick (0 means they differed before the first tick).
pub fn find_first_divergence<P, F>(setup_fn: F, deltas: &[f64]) -> Option<u64>
where
    P: Presenter,
    F: Fn() -> Battle<P>,
{
    let mut a = setup_fn();
    let mut b = setup_fn();

    if a.state_hash() != b.state_hash() {
        return Some(0);
    }

    for (tick, &dt) in (1..).zip(deltas) {
        a.tick(dt);
        b.tick(dt);

        if a.state_hash() != b.state_hash() {
            tracing::debug!(tick, "Battles diverged");
            return Some(tick);
        }
    }

    None
}

/// Proptest strategies for battle testing.
///
/// These strategies generate random but reproducible inputs for
/// property-based testing.
pub mod strategies {
    use proptest::prelude::*;

    use fleet_core::data::UnitSpec;
    use fleet_core::factions::FactionId;
    use fleet_core::math::Vec2;

    use crate::fixtures::{GLASS, HEAVY, SCOUT};

    /// Generate a coordinate on a 4000 × 4000 map.
    pub fn arb_coordinate() -> impl Strategy<Value = f64> {
        0.0f64..4000.0
    }

    /// Generate a point on the map.
    pub fn arb_position() -> impl Strategy<Value = Vec2> {
        (arb_coordinate(), arb_coordinate()).prop_map(|(x, y)| Vec2::new(x, y))
    }

    /// Generate any finite angle, including many full turns.
    pub fn arb_angle() -> impl Strategy<Value = f64> {
        -100.0f64..100.0
    }

    /// Generate a frame delta (ms), including zero.
    pub fn arb_delta() -> impl Strategy<Value = f64> {
        prop_oneof![Just(0.0), 0.0f64..250.0]
    }

    /// Generate a sequence of frame deltas.
    pub fn arb_delta_sequence(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
        proptest::collection::vec(arb_delta(), 1..max_len)
    }

    /// Generate a faction.
    pub fn arb_faction() -> impl Strategy<Value = FactionId> {
        prop_oneof![Just(FactionId::Player1), Just(FactionId::Player2)]
    }

    /// Generate a fixture blueprint name.
    pub fn arb_blueprint() -> impl Strategy<Value = &'static str> {
        prop_oneof![Just(HEAVY), Just(GLASS), Just(SCOUT)]
    }

    /// Generate a formation key, sometimes an unknown one.
    pub fn arb_formation_key() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("spindle".to_string()),
            Just("line".to_string()),
            Just("ring".to_string()),
            "[a-z]{1,8}",
        ]
    }

    /// Generate a roster of specs with unique ids and both factions present.
    pub fn arb_roster(max_units: usize) -> impl Strategy<Value = Vec<UnitSpec>> {
        proptest::collection::vec((arb_blueprint(), arb_position(), arb_faction()), 2..max_units.max(3))
            .prop_map(|entries| {
                entries
                    .into_iter()
                    .enumerate()
                    .map(|(i, (blueprint, position, faction))| {
                        // The first two units always oppose each other.
                        let owner = match i {
                            0 => FactionId::Player1,
                            1 => FactionId::Player2,
                            _ => faction,
                        };
                        let id = u32::try_from(i + 1).unwrap_or(u32::MAX);
                        UnitSpec::new(id, blueprint, position.x, position.y, owner)
                    })
                    .collect()
            })
    }
}
