//! Single-elimination brackets.
//!
//! This module provides:
//! - Bracket shape math and round-1 seeding ([`plan_bracket`])
//! - Winner advancement, including byes ([`advance_from`])
//! - The [`BracketEngine`] service that persists brackets and records results
//!
//! ## Example
//!
//! ```no_run
//! use bracket_engine::bracket::BracketEngine;
//! use bracket_engine::db::MemoryStore;
//! use std::sync::Arc;
//!
//! # async fn example(tournament_id: uuid::Uuid) -> Result<(), Box<dyn std::error::Error>> {
//! let engine = BracketEngine::new(Arc::new(MemoryStore::new()));
//!
//! let summary = engine.generate(tournament_id).await?;
//! println!("{} rounds, {} matches", summary.total_rounds, summary.match_count);
//! # Ok(())
//! # }
//! ```

pub mod advancement;
pub mod engine;
pub mod errors;
pub mod models;
pub mod planner;

pub use advancement::{
    AdvanceStep, MissingMatch, ResultPlan, advance_from, apply_steps, missing_advancements,
};
pub use engine::BracketEngine;
pub use errors::{GenerationError, GenerationResult, ReportError, ReportResult};
pub use models::{
    BracketRecord, BracketSummary, Match, MatchId, MatchResult, MatchStatus, Slot,
};
pub use planner::{
    BracketLayout, BracketPlan, MAX_PARTICIPANTS, MIN_PARTICIPANTS, SlotRef, plan_bracket,
};
