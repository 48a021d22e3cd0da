//! Faction identifiers.
//!
//! A battle always has exactly two sides.

use serde::{Deserialize, Serialize};

/// The two sides of a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FactionId {
    /// First player, normally the human commander.
    Player1,
    /// Second player, normally the AI.
    Player2,
}

impl FactionId {
    /// Both factions in a fixed order.
    pub const ALL: [Self; 2] = [Self::Player1, Self::Player2];

    /// The opposing faction.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Player1 => Self::Player2,
            Self::Player2 => Self::Player1,
        }
    }

    /// Get the display name for this faction.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Player1 => "Player 1",
            Self::Player2 => "Player 2",
        }
    }

    /// Numeric player id (1 or 2).
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Player1 => 1,
            Self::Player2 => 2,
        }
    }
}

impl std::fmt::Display for FactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opponent_is_involution() {
        for faction in FactionId::ALL {
            assert_ne!(faction, faction.opponent());
            assert_eq!(faction, faction.opponent().opponent());
        }
    }
}
