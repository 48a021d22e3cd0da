//! Outbound notifications for presentation layers.
//!
//! The simulation never calls into rendering or UI code directly. Everything
//! observable is pushed into an event queue while a tick runs, and the
//! coordinator hands the queue to its [`Presenter`] once the tick is done.
//! Commands issued between ticks flush their events immediately.

use serde::{Deserialize, Serialize};

use crate::combat::Facing;
use crate::components::UnitId;
use crate::factions::FactionId;
use crate::math::Vec2;
use crate::unit::StateKind;

/// Final result of a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BattleOutcome {
    /// One faction has units left and the other has none.
    Victory(FactionId),
    /// Both factions were wiped out in the same tick.
    Draw,
}

impl BattleOutcome {
    /// The winning faction, if any.
    #[must_use]
    pub const fn winner(self) -> Option<FactionId> {
        match self {
            Self::Victory(faction) => Some(faction),
            Self::Draw => None,
        }
    }
}

impl std::fmt::Display for BattleOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Victory(faction) => write!(f, "{faction} wins"),
            Self::Draw => f.write_str("draw"),
        }
    }
}

/// Something the presentation layer may want to show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BattleEvent {
    /// A new battle began with these units.
    BattleStarted {
        /// Ids of the spawned units, in roster order.
        units: Vec<UnitId>,
    },
    /// A unit fired on another.
    Attack {
        /// Firing unit.
        attacker: UnitId,
        /// Unit hit.
        defender: UnitId,
        /// Damage applied.
        damage: u32,
        /// Side of the defender that was hit.
        facing: Facing,
    },
    /// A unit's hit points reached zero.
    UnitDestroyed {
        /// The destroyed unit.
        unit: UnitId,
        /// Its owner.
        owner: FactionId,
    },
    /// The battle has a result.
    BattleEnded {
        /// The result.
        outcome: BattleOutcome,
    },
    /// The player's selection changed.
    SelectionChanged {
        /// Newly selected unit, or `None` when cleared.
        unit: Option<UnitId>,
    },
    /// The selected unit changed state; its info panel should refresh.
    SelectedStateChanged {
        /// The selected unit.
        unit: UnitId,
        /// Its new state.
        state: StateKind,
    },
    /// A unit switched formation.
    FormationChanged {
        /// The unit.
        unit: UnitId,
        /// New formation key.
        formation: String,
    },
    /// A unit was ordered to move.
    MoveOrdered {
        /// The unit.
        unit: UnitId,
        /// Destination.
        destination: Vec2,
    },
    /// A unit was ordered to attack.
    AttackOrdered {
        /// The unit.
        unit: UnitId,
        /// Its new target.
        target: UnitId,
    },
    /// Pause was toggled.
    PauseToggled {
        /// Whether the battle is now paused.
        paused: bool,
    },
    /// The time scale changed.
    TimeScaleChanged {
        /// New scale.
        scale: u32,
    },
}

impl BattleEvent {
    /// Whether this attack landed on a flank or the rear.
    #[must_use]
    pub fn is_flank_attack(&self) -> bool {
        matches!(self, Self::Attack { facing, .. } if facing.is_flank())
    }
}

/// Consumer of battle events.
///
/// Implemented by rendering, UI and logging adapters. Receives each tick's
/// events in the order they occurred.
pub trait Presenter {
    /// Present a batch of events.
    fn present(&mut self, events: &[BattleEvent]);
}

/// Presenter that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn present(&mut self, _events: &[BattleEvent]) {}
}

/// Presenter that keeps every event it receives.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<BattleEvent>,
}

impl EventLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded events.
    #[must_use]
    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    /// Remove and return all recorded events.
    pub fn take(&mut self) -> Vec<BattleEvent> {
        std::mem::take(&mut self.events)
    }

    /// Recorded attack events.
    pub fn attacks(&self) -> impl Iterator<Item = &BattleEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, BattleEvent::Attack { .. }))
    }
}

impl Presenter for EventLog {
    fn present(&mut self, events: &[BattleEvent]) {
        self.events.extend_from_slice(events);
    }
}

impl<P: Presenter + ?Sized> Presenter for Box<P> {
    fn present(&mut self, events: &[BattleEvent]) {
        (**self).present(events);
    }
}
