//! Battle behaviour tests for fleet_core.
//!
//! These tests drive whole battles through the public API and check the
//! observable rules: movement, engagement, cooldowns, formations and the
//! win condition.

use fleet_core::prelude::*;
use fleet_test_utils::fixtures::{
    battle_with, heavy_duel, run_until_decided, skirmish, spec, FRAME_MS, GLASS, HEAVY, SCOUT,
};

// =============================================================================
// Movement
// =============================================================================

mod movement {
    use super::*;

    /// A moving unit closes on its destination every tick until it arrives.
    #[test]
    fn test_distance_strictly_decreases_until_arrival() {
        let mut battle = heavy_duel(9000.0);
        let destination = Vec2::new(1000.0, 0.0);
        assert!(battle.issue_move_order(1, destination.x, destination.y));

        let mut last = f64::INFINITY;
        let mut ticks = 0;
        loop {
            let unit = battle.unit(1).expect("unit 1 exists");
            if unit.state().kind() != StateKind::Moving {
                break;
            }
            let d = unit.position().distance_to(destination);
            assert!(d < last, "distance did not shrink at tick {ticks}: {d} >= {last}");
            last = d;

            battle.tick(FRAME_MS);
            ticks += 1;
            assert!(ticks < 10_000, "unit never arrived");
        }

        let unit = battle.unit(1).expect("unit 1 exists");
        assert!(matches!(
            unit.state().kind(),
            StateKind::Idle | StateKind::Attacking
        ));
        assert_eq!(unit.position(), destination);
    }

    /// Speed is the formation-adjusted move stat, in units per second.
    #[test]
    fn test_speed_follows_formation() {
        let mut line = heavy_duel(9000.0);
        let mut ring = heavy_duel(9000.0);
        assert!(ring.set_formation(1, "ring"));

        for battle in [&mut line, &mut ring] {
            battle.issue_move_order(1, 5000.0, 0.0);
            battle.tick(1000.0);
        }

        // Units start in line (100 x 0.9); ring is 100 x 0.85.
        let x = |b: &Battle<EventLog>| b.unit(1).map(|u| u.position().x);
        assert_eq!(x(&line), Some(90.0));
        assert_eq!(x(&ring), Some(85.0));
    }

    /// A move order replaces an attack order.
    #[test]
    fn test_move_order_drops_target() {
        let mut battle = heavy_duel(400.0);
        battle.issue_attack_order(1, 2);
        battle.issue_move_order(1, -500.0, 0.0);
        let state = battle.unit(1).map(Unit::state);
        assert_eq!(
            state,
            Some(UnitState::Moving {
                destination: Vec2::new(-500.0, 0.0),
                pursuit: None
            })
        );
    }
}

// =============================================================================
// Engagement
// =============================================================================

mod engagement {
    use super::*;

    /// An idle unit out of range but within an ally's sight moves to engage.
    #[test]
    fn test_shared_sight_triggers_pursuit() {
        let mut battle = battle_with(&[
            spec(1, SCOUT, 0.0, 0.0, FactionId::Player1),
            spec(2, HEAVY, 2000.0, 0.0, FactionId::Player1),
            spec(3, HEAVY, 3200.0, 0.0, FactionId::Player2),
        ]);
        battle.tick(FRAME_MS);

        // Scout sees 600; the heavy ally sees 1500 and spots unit 3 at 1200.
        assert_eq!(
            battle.unit(1).map(Unit::state),
            Some(UnitState::Moving {
                destination: Vec2::new(3200.0, 0.0),
                pursuit: Some(3)
            })
        );
    }

    /// An attacker whose target moves out of range gives chase.
    #[test]
    fn test_out_of_range_target_is_chased() {
        let mut battle = battle_with(&[
            spec(1, SCOUT, 0.0, 0.0, FactionId::Player1),
            spec(2, HEAVY, 1000.0, 0.0, FactionId::Player2),
        ]);
        assert!(battle.issue_attack_order(1, 2));
        battle.tick(FRAME_MS);
        assert_eq!(
            battle.unit(1).map(|u| u.state().kind()),
            Some(StateKind::Moving)
        );
        assert_eq!(battle.unit(1).and_then(|u| u.state().target()), Some(2));
    }

    /// Orders against friends, the dead, or from the dead are ignored.
    #[test]
    fn test_invalid_attack_orders_are_ignored() {
        let mut battle = battle_with(&[
            spec(1, HEAVY, 0.0, 0.0, FactionId::Player1),
            spec(2, GLASS, 300.0, 0.0, FactionId::Player2),
            spec(3, HEAVY, 0.0, 300.0, FactionId::Player1),
            spec(4, HEAVY, 0.0, 9000.0, FactionId::Player2),
        ]);
        assert!(!battle.issue_attack_order(1, 3));

        battle.tick(FRAME_MS);
        battle.tick(FRAME_MS);
        assert!(battle.unit(2).is_some_and(Unit::is_dead));
        assert!(!battle.issue_attack_order(3, 2));
        assert!(!battle.issue_attack_order(2, 1));
    }
}

// =============================================================================
// Combat timing
// =============================================================================

mod combat_timing {
    use super::*;

    /// Consecutive shots from one unit are at least one attack interval apart.
    #[test]
    fn test_cooldown_gates_attacks() {
        let mut battle = heavy_duel(300.0);
        let mut shots: Vec<(u32, f64)> = Vec::new();

        for _ in 0..2000 {
            battle.tick(FRAME_MS);
            let now = battle.elapsed_ms();
            for event in battle.presenter_mut().take() {
                if let BattleEvent::Attack { attacker, .. } = event {
                    shots.push((attacker, now));
                }
            }
            if battle.is_over() {
                break;
            }
        }

        assert!(shots.len() >= 2, "expected several shots, got {}", shots.len());
        for attacker in [1, 2] {
            let times: Vec<f64> = shots
                .iter()
                .filter(|(a, _)| *a == attacker)
                .map(|(_, t)| *t)
                .collect();
            for pair in times.windows(2) {
                assert!(pair[1] - pair[0] >= 3000.0, "unit {attacker} fired too soon");
            }
        }
    }

    /// Time scale speeds up cooldowns along with everything else.
    #[test]
    fn test_time_scale_shortens_real_time_between_shots() {
        let shots_in_40_frames = |scale: u32| {
            let mut battle = heavy_duel(300.0);
            battle.set_time_scale(scale);
            for _ in 0..40 {
                battle.tick(FRAME_MS);
            }
            battle
                .presenter()
                .attacks()
                .filter(|e| matches!(e, BattleEvent::Attack { attacker: 1, .. }))
                .count()
        };

        // 640 ms of real time: one shot at 1x, a reload fits at 10x.
        assert_eq!(shots_in_40_frames(1), 1);
        assert!(shots_in_40_frames(10) >= 2);
    }
}

// =============================================================================
// Formations
// =============================================================================

mod formations {
    use super::*;

    /// Stats switch the moment the formation changes, even mid-transition.
    #[test]
    fn test_formation_change_is_immediate() {
        let mut battle = heavy_duel(9000.0);
        assert!(battle.set_formation(1, "ring"));
        assert_eq!(battle.readout(1).map(|r| r.effective_defense), Some(120));

        battle.tick(1000.0);
        let transition = battle.unit(1).and_then(Unit::transition);
        assert!(transition.is_some_and(|t| t.progress() > 0.0 && !t.is_complete()));

        assert!(battle.set_formation(1, "spindle"));
        let readout = battle.readout(1).expect("unit 1 exists");
        assert_eq!(readout.effective_attack, 440);
        assert_eq!(readout.effective_defense, 100);
        assert_eq!(readout.formation, "Spindle");
    }

    /// The visual transition finishes after its configured duration.
    #[test]
    fn test_transition_completes() {
        let mut battle = heavy_duel(9000.0);
        battle.set_formation(1, "ring");
        for _ in 0..5 {
            battle.tick(1000.0);
        }
        assert!(battle.unit(1).and_then(Unit::transition).is_none());
        assert!(!battle.set_formation(1, "ring"));
    }
}

// =============================================================================
// Victory
// =============================================================================

mod victory {
    use super::*;

    /// Destroying the last enemy wins the battle for the other side.
    #[test]
    fn test_elimination_decides_winner() {
        let mut battle = battle_with(&[
            spec(1, GLASS, 300.0, 0.0, FactionId::Player1),
            spec(2, HEAVY, 0.0, 0.0, FactionId::Player2),
        ]);
        // Unit 1 faces away from its attacker; unit 2 has it dead ahead.
        let (outcome, ticks) = run_until_decided(&mut battle, FRAME_MS, 10);
        assert_eq!(outcome, Some(BattleOutcome::Victory(FactionId::Player2)));
        assert_eq!(ticks, 2);
        assert_eq!(battle.check_win_condition(), outcome);
    }

    /// The stock skirmish always reaches a result.
    #[test]
    fn test_skirmish_is_decided() {
        let mut battle = skirmish();
        let (outcome, _) = run_until_decided(&mut battle, 50.0, 12_000);
        let outcome = outcome.expect("skirmish should be decided");

        let ended: Vec<&BattleEvent> = battle
            .presenter()
            .events()
            .iter()
            .filter(|e| matches!(e, BattleEvent::BattleEnded { .. }))
            .collect();
        assert_eq!(ended, vec![&BattleEvent::BattleEnded { outcome }]);

        let destroyed = battle
            .presenter()
            .events()
            .iter()
            .filter(|e| matches!(e, BattleEvent::UnitDestroyed { .. }))
            .count();
        assert!(destroyed >= 4);
    }
}
