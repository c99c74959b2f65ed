//! NIMM Core - Game rules and fixed strategies
//!
//! This crate provides the core game logic for NIMM:
//! - Game rules and their validation
//! - Round state and turn ownership
//! - Fixed (non-learning) strategies: random, optimal, mixed
//! - Configuration error types shared by the other crates

pub mod ai;
pub mod error;
pub mod game;
pub mod rules;

// Re-exports for convenient access
pub use ai::{optimal_take, random_take, Strategy};
pub use error::ConfigError;
pub use game::{active_player, GameResult, GameState, Outcome, Seat};
pub use rules::GameRules;
