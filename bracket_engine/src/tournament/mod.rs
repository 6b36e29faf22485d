//! Tournament registration.
//!
//! This module provides:
//! - Tournament creation and lifecycle transitions
//! - Participant registration for users and teams
//! - Withdrawal while registration is open
//!
//! The participant counter is recomputed from participant rows in the same
//! transaction as every join or leave.
//!
//! ## Example
//!
//! ```no_run
//! use bracket_engine::db::MemoryStore;
//! use bracket_engine::tournament::{
//!     Entrant, NewTournament, TournamentManager, TournamentStatus,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = TournamentManager::new(Arc::new(MemoryStore::new()));
//!
//!     let cup = manager
//!         .create_tournament(NewTournament::single_elimination("Spring Cup", 16))
//!         .await?;
//!     manager.set_status(cup.id, TournamentStatus::RegistrationOpen).await?;
//!     manager
//!         .register_participant(cup.id, Entrant::User("alice".to_string()))
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

pub mod manager;
pub mod models;

pub use manager::{TournamentError, TournamentManager, TournamentResult};
pub use models::{
    Entrant, NewTournament, Participant, ParticipantId, RegistrationOutcome, TeamId, Tournament,
    TournamentFormat, TournamentId, TournamentStatus, UnknownVariant, UserId,
};
