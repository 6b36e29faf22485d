//! Storage error types.

use std::time::Duration;
use thiserror::Error;

use super::timeouts::TimeoutError;
use crate::bracket::MatchId;
use crate::tournament::{TournamentId, UnknownVariant};

/// Errors raised by bracket and tournament stores
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Query exceeded its deadline
    #[error("Database operation timed out after {0:?}")]
    Timeout(Duration),

    /// A bracket row already exists for the tournament
    #[error("Bracket already exists for tournament {0}")]
    BracketExists(TournamentId),

    /// A participant registered after the bracket was planned
    #[error("Participants of tournament {0} changed during generation")]
    ParticipantsChanged(TournamentId),

    /// The tournament is completed or cancelled
    #[error("Tournament {0} is already closed")]
    TournamentClosed(TournamentId),

    /// A guarded write found the match no longer in the expected state
    #[error("Match {0} changed concurrently")]
    StaleMatch(MatchId),

    /// Referenced match does not exist
    #[error("Match not found: {0}")]
    MatchMissing(MatchId),

    /// A stored column could not be mapped back to a model
    #[error("Corrupt row: {0}")]
    Decode(String),
}

impl From<TimeoutError> for StoreError {
    fn from(err: TimeoutError) -> Self {
        match err {
            TimeoutError::Timeout(duration) => StoreError::Timeout(duration),
            TimeoutError::Database(e) => StoreError::Database(e),
        }
    }
}

impl From<UnknownVariant> for StoreError {
    fn from(err: UnknownVariant) -> Self {
        StoreError::Decode(err.to_string())
    }
}

impl StoreError {
    /// Client-safe message that does not leak SQL details
    pub fn client_message(&self) -> String {
        match self {
            StoreError::Database(_) | StoreError::Decode(_) => "Internal server error".to_string(),
            StoreError::Timeout(_) => "Storage temporarily unavailable".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
