//! NIMM Match - Playing full matches between two seats
//!
//! This crate provides match infrastructure:
//! - Match configuration, presets and JSON config files
//! - Per-seat move selection (human, fixed strategies, learners)
//! - Scoreboard with rolling win rates
//! - Match orchestration with observer callbacks
//! - Batch training over many seeded matches
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: MatchOrchestrator::run_match (orchestration)
//! - Level 2: round phases, run_batch (phases)
//! - Level 3: MoveSelector::choose, finish_round (steps)
//! - Level 4: scoreboard, configuration

mod batch;
mod config;
mod observer;
mod orchestrator;
mod selector;
mod stats;

pub use batch::{run_batch, run_batch_with_progress, BatchSummary};
pub use config::{FirstMove, LearningMode, MatchConfig, PlayerConfig, PRESETS};
pub use observer::{EventLog, MatchObserver, MoveEvent, NoopObserver, RoundEvent};
pub use orchestrator::{MatchOrchestrator, MatchResult};
pub use selector::{CoinSide, HumanInput, LearnedTable, MoveSelector};
pub use stats::{ScoreSnapshot, Scoreboard, ROLLING_WINDOW, SUSTAINED_RATE};
