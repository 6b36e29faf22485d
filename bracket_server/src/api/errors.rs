//! Mapping from engine errors to HTTP responses.
//!
//! Bodies always have the shape `{"error": "..."}` and carry the error's
//! client-safe message, never raw database text.

use axum::{Json, http::StatusCode};
use bracket_engine::{
    GenerationError, ReportError, TournamentError, db::StoreError,
};
use serde::{Deserialize, Serialize};

use crate::logging;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Rejection returned by every handler
pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn reject(operation: &str, status: StatusCode, message: String) -> ApiError {
    logging::log_rejected(operation, status.as_u16(), &message);
    (status, Json(ErrorResponse { error: message }))
}

fn store_status(err: &StoreError) -> StatusCode {
    match err {
        StoreError::Timeout(_) => StatusCode::SERVICE_UNAVAILABLE,
        StoreError::MatchMissing(_) => StatusCode::NOT_FOUND,
        StoreError::BracketExists(_)
        | StoreError::ParticipantsChanged(_)
        | StoreError::TournamentClosed(_)
        | StoreError::StaleMatch(_) => StatusCode::CONFLICT,
        StoreError::Database(_) | StoreError::Decode(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn generation_error(operation: &str, err: GenerationError) -> ApiError {
    let status = match &err {
        GenerationError::TournamentNotFound(_) => StatusCode::NOT_FOUND,
        GenerationError::TournamentAlreadyStarted(_)
        | GenerationError::BracketAlreadyExists(_)
        | GenerationError::ParticipantsChanged(_) => StatusCode::CONFLICT,
        GenerationError::InsufficientParticipants { .. }
        | GenerationError::TooManyParticipants { .. }
        | GenerationError::DuplicateParticipant(_)
        | GenerationError::UnsupportedFormat(_) => StatusCode::UNPROCESSABLE_ENTITY,
        GenerationError::InconsistentBracket { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        GenerationError::Store(e) => store_status(e),
    };
    reject(operation, status, err.client_message())
}

pub fn report_error(operation: &str, err: ReportError) -> ApiError {
    let status = match &err {
        ReportError::MatchNotFound(_) | ReportError::BracketNotFound(_) => StatusCode::NOT_FOUND,
        ReportError::MatchAlreadyCompleted(_)
        | ReportError::MatchCancelled(_)
        | ReportError::MatchNotReady(_)
        | ReportError::TournamentClosed(_)
        | ReportError::InvalidTransition { .. } => StatusCode::CONFLICT,
        ReportError::InvalidWinner { .. } | ReportError::InvalidScore(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ReportError::InconsistentBracket { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        ReportError::Store(e) => store_status(e),
    };
    reject(operation, status, err.client_message())
}

pub fn tournament_error(operation: &str, err: TournamentError) -> ApiError {
    let status = match &err {
        TournamentError::NotFound(_) | TournamentError::ParticipantNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        TournamentError::TournamentFull
        | TournamentError::AlreadyRegistered
        | TournamentError::RegistrationClosed(_)
        | TournamentError::BracketLocked(_)
        | TournamentError::InvalidTransition { .. } => StatusCode::CONFLICT,
        TournamentError::EmptyName | TournamentError::InvalidCapacity { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        TournamentError::Store(e) => store_status(e),
    };
    reject(operation, status, err.client_message())
}

pub fn store_error(operation: &str, err: StoreError) -> ApiError {
    reject(operation, store_status(&err), err.client_message())
}
