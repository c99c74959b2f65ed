//! GameRules - pile size, move limit and match length

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Smallest pile a match may start with
pub const MIN_ITEMS: u32 = 8;

/// Bounds on how many items a single move may remove
pub const MIN_REMOVABLE: u32 = 2;
pub const MAX_REMOVABLE: u32 = 5;

/// Rules shared by both seats for a whole match
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRules {
    /// Items on the pile at the start of every round
    pub items_in_play: u32,
    /// Largest number of items a move may remove
    pub max_removable: u32,
    /// Rounds in the match
    pub round_count: u32,
}

impl GameRules {
    /// Build and validate rules
    pub fn new(items_in_play: u32, max_removable: u32, round_count: u32) -> Result<Self, ConfigError> {
        let rules = Self {
            items_in_play,
            max_removable,
            round_count,
        };
        rules.validate()?;
        Ok(rules)
    }

    /// Check every bound; used again after deserializing
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.items_in_play < MIN_ITEMS {
            return Err(ConfigError::TooFewItems {
                min: MIN_ITEMS,
                got: self.items_in_play,
            });
        }
        if !(MIN_REMOVABLE..=MAX_REMOVABLE).contains(&self.max_removable) {
            return Err(ConfigError::MaxRemovableOutOfRange {
                min: MIN_REMOVABLE,
                max: MAX_REMOVABLE,
                got: self.max_removable,
            });
        }
        if self.max_removable >= self.items_in_play {
            return Err(ConfigError::MaxRemovableNotBelowItems {
                max_removable: self.max_removable,
                items: self.items_in_play,
            });
        }
        if self.round_count == 0 {
            return Err(ConfigError::NoRounds);
        }
        Ok(())
    }

    /// Modulus of the winning strategy: positions divisible by it are lost
    /// for the player to move
    pub fn cycle(&self) -> u32 {
        self.max_removable + 1
    }

    /// Largest legal move with `remaining` items on the pile
    pub fn max_take(&self, remaining: u32) -> u32 {
        self.max_removable.min(remaining)
    }
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            items_in_play: 12,
            max_removable: 3,
            round_count: 1000,
        }
    }
}
