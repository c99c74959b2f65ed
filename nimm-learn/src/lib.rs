//! NIMM Learn - Online learners for the subtraction game
//!
//! This crate provides the two learning players:
//! - Urn reinforcement: ball counters per (position, move)
//! - Value function: tabular TD(0) backups under epsilon-greedy play
//!
//! Learners only record decisions during a round; their tables change once
//! per round in `finish_round`, after the outcome is known.

pub mod schedule;
pub mod urn;
pub mod value;

pub use schedule::{EpsilonSchedule, ExplorationParams};
pub use urn::{ticket_divisor, UrnChoice, UrnLearner, UrnTable};
pub use value::{ValueLearner, ValueTable};
