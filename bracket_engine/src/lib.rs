//! # Bracket Engine
//!
//! Single-elimination bracket generation and winner advancement for esports
//! tournaments.
//!
//! Given the ordered list of confirmed participants, the engine builds the
//! whole match tree at once: round 1 is seeded in join order, later rounds are
//! empty placeholders that fill as winners advance. Storage is behind the
//! [`db::BracketRepository`] trait, with PostgreSQL and in-memory stores.
//!
//! ## Bracket shape
//!
//! For `N` participants there are `ceil(log2 N)` rounds and round `r` has
//! `ceil(N / 2^r)` positions:
//!
//! - **Round 1**: `floor(N / 2)` matches, paired in join order
//! - **Bye**: when `N` is odd the last participant skips round 1
//! - **Later rounds**: match `k` is fed by matches `2k-1` and `2k` of the
//!   previous round; a match with a single feeder resolves as a bye
//!
//! ## Core Modules
//!
//! - [`bracket`]: Bracket planning, advancement and the [`BracketEngine`] service
//! - [`tournament`]: Tournaments, participants and registration
//! - [`db`]: Connection pooling, repositories and migrations
//!
//! ## Example
//!
//! ```
//! use bracket_engine::bracket::{BracketLayout, plan_bracket};
//! use bracket_engine::tournament::TournamentFormat;
//! use uuid::Uuid;
//!
//! let players: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
//! let plan = plan_bracket(
//!     Uuid::new_v4(),
//!     &players,
//!     TournamentFormat::SingleElimination,
//!     chrono::Utc::now(),
//! )
//! .unwrap();
//!
//! assert_eq!(plan.record.total_rounds, 3);
//! assert_eq!(plan.bye_participant, Some(players[4]));
//! assert_eq!(BracketLayout::new(5).matches_in_round(1), 2);
//! ```

/// Bracket planning, advancement and the engine service.
pub mod bracket;
pub use bracket::{BracketEngine, GenerationError, ReportError};

/// Database pooling and stores.
pub mod db;

/// Tournament and participant management.
pub mod tournament;
pub use tournament::{TournamentError, TournamentManager};
