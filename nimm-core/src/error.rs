//! Configuration errors

/// Error types for match configuration
///
/// Every configuration is checked once at construction time; nothing in the
/// match loop recovers from a bad configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("items in play must be at least {min}, got {got}")]
    TooFewItems { min: u32, got: u32 },

    #[error("max removable must be within [{min}, {max}], got {got}")]
    MaxRemovableOutOfRange { min: u32, max: u32, got: u32 },

    #[error("max removable ({max_removable}) must be below items in play ({items})")]
    MaxRemovableNotBelowItems { max_removable: u32, items: u32 },

    #[error("round count must be at least 1")]
    NoRounds,

    #[error("invalid exploration parameter `{field}`: {reason}")]
    Exploration { field: &'static str, reason: String },

    #[error("seat {seat} is human but no human input was supplied")]
    MissingHumanInput { seat: u8 },

    #[error("unknown preset: {0}")]
    UnknownPreset(String),

    #[error("unknown player kind: {0}")]
    UnknownPlayerKind(String),
}
