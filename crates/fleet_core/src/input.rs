//! Player intents.
//!
//! Input devices are outside the simulation. A host turns clicks and key
//! presses into [`PlayerIntent`] values (a world point plus, when the host
//! can ray-cast, the unit under the pointer) and feeds them to
//! [`Battle::handle_intent`].

use serde::{Deserialize, Serialize};

use crate::battle::Battle;
use crate::components::UnitId;
use crate::events::Presenter;
use crate::math::Vec2;
use crate::roster::Roster;

/// Something the player asked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlayerIntent {
    /// Primary click: select a friendly unit or clear the selection.
    Select {
        /// Pointer position on the battle plane.
        point: Vec2,
        /// Unit directly under the pointer, if the host resolved one.
        #[serde(default)]
        hit: Option<UnitId>,
    },
    /// Secondary click: order the selected unit to attack or move.
    Command {
        /// Pointer position on the battle plane.
        point: Vec2,
        /// Unit directly under the pointer, if the host resolved one.
        #[serde(default)]
        hit: Option<UnitId>,
    },
    /// Pause or resume.
    TogglePause,
    /// One step faster.
    SpeedUp,
    /// One step slower.
    SlowDown,
    /// Put the selected unit into a formation.
    ChangeFormation(String),
}

/// The living unit whose pick circle contains `point`.
///
/// Later units win when circles overlap (the roster is searched back to
/// front).
#[must_use]
pub fn pick_unit(roster: &Roster, point: Vec2, radius: f64, margin: f64) -> Option<UnitId> {
    roster
        .living()
        .rev()
        .find(|u| u.position().distance_to(point) <= radius + margin)
        .map(|u| u.id())
}

impl<P: Presenter> Battle<P> {
    /// Apply a player intent.
    ///
    /// Returns whether the intent changed anything. Intents are ignored once
    /// the battle is decided, except pause and speed changes.
    pub fn handle_intent(&mut self, intent: &PlayerIntent) -> bool {
        match intent {
            PlayerIntent::Select { point, hit } => {
                if self.outcome().is_some() {
                    return false;
                }
                let picked = self.resolve_pointer(*point, *hit);
                let own = picked.filter(|&id| {
                    self.units()
                        .living_unit(id)
                        .is_some_and(|u| u.owner() == self.config().player_faction)
                });
                self.select(own)
            }
            PlayerIntent::Command { point, hit } => self.command_selected(*point, *hit),
            PlayerIntent::TogglePause => {
                self.toggle_pause();
                true
            }
            PlayerIntent::SpeedUp => {
                let before = self.time_scale();
                self.increase_time_scale() != before
            }
            PlayerIntent::SlowDown => {
                let before = self.time_scale();
                self.decrease_time_scale() != before
            }
            PlayerIntent::ChangeFormation(key) => match self.selected() {
                Some(unit) if self.outcome().is_none() => self.set_formation(unit, key),
                _ => false,
            },
        }
    }

    fn resolve_pointer(&self, point: Vec2, hit: Option<UnitId>) -> Option<UnitId> {
        hit.filter(|&id| self.units().living_unit(id).is_some())
            .or_else(|| {
                pick_unit(
                    self.units(),
                    point,
                    self.config().unit_radius,
                    self.config().pick_margin,
                )
            })
    }

    fn command_selected(&mut self, point: Vec2, hit: Option<UnitId>) -> bool {
        if self.outcome().is_some() {
            return false;
        }
        let Some(selected) = self.selected() else {
            return false;
        };
        let Some(owner) = self.units().living_unit(selected).map(|u| u.owner()) else {
            return false;
        };

        match self.resolve_pointer(point, hit) {
            Some(target) => {
                let hostile = self
                    .units()
                    .get(target)
                    .is_some_and(|t| t.owner() != owner);
                hostile && self.issue_attack_order(selected, target)
            }
            None => self.issue_move_order(selected, point.x, point.y),
        }
    }
}
