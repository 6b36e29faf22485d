//! Bracket error types.

use thiserror::Error;

use super::models::{MatchId, MatchStatus};
use crate::db::StoreError;
use crate::tournament::{ParticipantId, TournamentFormat, TournamentId, TournamentStatus};

/// Errors raised while generating a bracket
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Tournament not found: {0}")]
    TournamentNotFound(TournamentId),

    #[error("Tournament already started: status is {0}")]
    TournamentAlreadyStarted(TournamentStatus),

    #[error("Not enough players: need {needed}, have {current}")]
    InsufficientParticipants { needed: usize, current: usize },

    #[error("Too many players: at most {max}, have {current}")]
    TooManyParticipants { max: usize, current: usize },

    #[error("Participant {0} appears more than once")]
    DuplicateParticipant(ParticipantId),

    #[error("Unsupported tournament format: {0}")]
    UnsupportedFormat(TournamentFormat),

    #[error("Bracket already generated for tournament {0}")]
    BracketAlreadyExists(TournamentId),

    #[error("Participants of tournament {0} changed while generating, try again")]
    ParticipantsChanged(TournamentId),

    #[error("Bracket is missing round {round} match {match_number}")]
    InconsistentBracket { round: u32, match_number: u32 },

    #[error("Storage error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for GenerationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::BracketExists(id) => GenerationError::BracketAlreadyExists(id),
            StoreError::ParticipantsChanged(id) => GenerationError::ParticipantsChanged(id),
            other => GenerationError::Store(other),
        }
    }
}

impl GenerationError {
    /// Whether the organizer can fix the request and try again
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            GenerationError::UnsupportedFormat(_) | GenerationError::InconsistentBracket { .. }
        )
    }

    /// Client-safe error message
    pub fn client_message(&self) -> String {
        match self {
            GenerationError::Store(e) => e.client_message(),
            GenerationError::InsufficientParticipants { .. } => {
                "Not enough players to generate a bracket".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Result type for bracket generation
pub type GenerationResult<T> = Result<T, GenerationError>;

/// Errors raised while reporting results or changing match state
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Match not found: {0}")]
    MatchNotFound(MatchId),

    #[error("Match {0} is already completed")]
    MatchAlreadyCompleted(MatchId),

    #[error("Match {0} was cancelled")]
    MatchCancelled(MatchId),

    #[error("Match {0} is still waiting for an opponent")]
    MatchNotReady(MatchId),

    #[error("Participant {participant_id} is not playing in match {match_id}")]
    InvalidWinner {
        match_id: MatchId,
        participant_id: ParticipantId,
    },

    #[error("Invalid score: {0}")]
    InvalidScore(i32),

    #[error("Cannot move match from {from} to {to}")]
    InvalidTransition { from: MatchStatus, to: MatchStatus },

    #[error("No bracket for tournament {0}")]
    BracketNotFound(TournamentId),

    #[error("Tournament {0} is already completed or cancelled")]
    TournamentClosed(TournamentId),

    #[error("Bracket is missing round {round} match {match_number}")]
    InconsistentBracket { round: u32, match_number: u32 },

    #[error("Storage error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for ReportError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::MatchMissing(id) => ReportError::MatchNotFound(id),
            StoreError::TournamentClosed(id) => ReportError::TournamentClosed(id),
            other => ReportError::Store(other),
        }
    }
}

impl ReportError {
    /// Client-safe error message
    pub fn client_message(&self) -> String {
        match self {
            ReportError::Store(e) => e.client_message(),
            _ => self.to_string(),
        }
    }
}

/// Result type for match reporting
pub type ReportResult<T> = Result<T, ReportError>;
