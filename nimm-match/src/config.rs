//! Configuration types for match play
//!
//! Level 4 - Utilities and configuration

use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use nimm_core::{ConfigError, GameRules, Seat, Strategy};
use nimm_learn::ExplorationParams;
use serde::{Deserialize, Serialize};

/// Learning algorithm of a learning player
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum LearningMode {
    /// Urn counters per (position, move)
    Reinforcement,
    /// Value per position with TD backups
    ValueFunction {
        #[serde(default)]
        exploration: ExplorationParams,
    },
}

/// How one seat decides its moves
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlayerConfig {
    /// Moves come from the caller's human input
    Human,
    /// Uniform over legal moves
    Random,
    /// Winning move whenever one exists
    Optimal,
    /// Random baseline, optimal half of the time
    Mixed,
    /// Learns from round outcomes
    Learning { mode: LearningMode },
}

impl PlayerConfig {
    pub fn reinforcement() -> Self {
        PlayerConfig::Learning {
            mode: LearningMode::Reinforcement,
        }
    }

    pub fn value_function(exploration: ExplorationParams) -> Self {
        PlayerConfig::Learning {
            mode: LearningMode::ValueFunction { exploration },
        }
    }

    pub fn is_human(&self) -> bool {
        matches!(self, PlayerConfig::Human)
    }

    pub fn is_learning(&self) -> bool {
        matches!(self, PlayerConfig::Learning { .. })
    }

    /// Fixed strategy, for the non-learning computer players
    pub fn strategy(&self) -> Option<Strategy> {
        match self {
            PlayerConfig::Random => Some(Strategy::Random),
            PlayerConfig::Optimal => Some(Strategy::Optimal),
            PlayerConfig::Mixed => Some(Strategy::Mixed),
            PlayerConfig::Human | PlayerConfig::Learning { .. } => None,
        }
    }

    /// Exploration parameters of a value-function player
    pub fn exploration(&self) -> Option<&ExplorationParams> {
        match self {
            PlayerConfig::Learning {
                mode: LearningMode::ValueFunction { exploration },
            } => Some(exploration),
            _ => None,
        }
    }

    /// Replace the exploration parameters of a value-function player;
    /// other players are returned unchanged
    pub fn with_exploration(self, params: ExplorationParams) -> Self {
        match self {
            PlayerConfig::Learning {
                mode: LearningMode::ValueFunction { .. },
            } => PlayerConfig::value_function(params),
            other => other,
        }
    }

    /// Short name for logs and reports
    pub fn label(&self) -> &'static str {
        match self {
            PlayerConfig::Human => "human",
            PlayerConfig::Random => "random",
            PlayerConfig::Optimal => "optimal",
            PlayerConfig::Mixed => "mixed",
            PlayerConfig::Learning {
                mode: LearningMode::Reinforcement,
            } => "reinforcement",
            PlayerConfig::Learning {
                mode: LearningMode::ValueFunction { .. },
            } => "value",
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.exploration() {
            Some(params) => params.validate(),
            None => Ok(()),
        }
    }
}

impl FromStr for PlayerConfig {
    type Err = ConfigError;

    /// Parse a player kind; value-function players get default exploration
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "human" => Ok(PlayerConfig::Human),
            "random" => Ok(PlayerConfig::Random),
            "optimal" => Ok(PlayerConfig::Optimal),
            "mixed" => Ok(PlayerConfig::Mixed),
            "reinforcement" | "urn" => Ok(PlayerConfig::reinforcement()),
            "value" | "value-function" | "value_function" => {
                Ok(PlayerConfig::value_function(ExplorationParams::default()))
            }
            other => Err(ConfigError::UnknownPlayerKind(other.to_string())),
        }
    }
}

/// Who starts each round
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirstMove {
    /// Coin toss before round 1, then alternate
    #[default]
    CoinToss,
    /// Given seat starts round 1, then alternate
    Alternate(Seat),
    /// Given seat starts every round
    Fixed(Seat),
}

/// Full description of a match
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    pub rules: GameRules,
    pub players: [PlayerConfig; 2],
    #[serde(default)]
    pub first_move: FirstMove,
    /// Random seed for reproducibility (None = random)
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Names accepted by [`MatchConfig::preset`]
pub const PRESETS: [&str; 5] = [
    "optimal-vs-reinforcement",
    "human-vs-optimal",
    "human-vs-human",
    "optimal-vs-value",
    "value-vs-reinforcement",
];

impl MatchConfig {
    pub fn new(rules: GameRules, first: PlayerConfig, second: PlayerConfig) -> Self {
        Self {
            rules,
            players: [first, second],
            first_move: FirstMove::CoinToss,
            seed: None,
        }
    }

    /// Set random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_first_move(mut self, first_move: FirstMove) -> Self {
        self.first_move = first_move;
        self
    }

    pub fn player(&self, seat: Seat) -> &PlayerConfig {
        &self.players[seat.index()]
    }

    pub fn has_human(&self) -> bool {
        self.players.iter().any(PlayerConfig::is_human)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rules.validate()?;
        for player in &self.players {
            player.validate()?;
        }
        Ok(())
    }

    /// Turnkey configurations
    pub fn preset(name: &str) -> Result<Self, ConfigError> {
        let slow_decay = ExplorationParams {
            decay_period_rounds: 20,
            ..ExplorationParams::default()
        };

        let config = match name {
            "optimal-vs-reinforcement" => Self::new(
                GameRules::new(12, 3, 1000)?,
                PlayerConfig::Optimal,
                PlayerConfig::reinforcement(),
            ),
            "human-vs-optimal" => Self::new(
                GameRules::new(12, 3, 5)?,
                PlayerConfig::Human,
                PlayerConfig::Optimal,
            ),
            "human-vs-human" => Self::new(
                GameRules::new(12, 3, 5)?,
                PlayerConfig::Human,
                PlayerConfig::Human,
            ),
            "optimal-vs-value" => Self::new(
                GameRules::new(12, 3, 20_000)?,
                PlayerConfig::Optimal,
                PlayerConfig::value_function(slow_decay),
            ),
            "value-vs-reinforcement" => Self::new(
                GameRules::new(12, 3, 20_000)?,
                PlayerConfig::value_function(slow_decay),
                PlayerConfig::reinforcement(),
            ),
            other => return Err(ConfigError::UnknownPreset(other.to_string())),
        };
        Ok(config)
    }

    /// Load and validate a JSON config
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: MatchConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save to JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self::new(
            GameRules::default(),
            PlayerConfig::Optimal,
            PlayerConfig::reinforcement(),
        )
    }
}
