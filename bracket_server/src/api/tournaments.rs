//! Tournament and registration API handlers.
//!
//! # Examples
//!
//! Create a tournament and open registration:
//! ```bash
//! curl -X POST http://localhost:8080/api/v1/tournaments \
//!   -H "Content-Type: application/json" \
//!   -d '{"name": "Friday Cup", "max_participants": 8}'
//!
//! curl -X POST http://localhost:8080/api/v1/tournaments/ID/status \
//!   -H "Content-Type: application/json" \
//!   -d '{"status": "registration_open"}'
//! ```
//!
//! Register a user:
//! ```bash
//! curl -X POST http://localhost:8080/api/v1/tournaments/ID/participants \
//!   -H "Content-Type: application/json" \
//!   -d '{"kind": "user", "id": "oauth|1234"}'
//! ```

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use bracket_engine::tournament::{
    Entrant, NewTournament, Participant, ParticipantId, Tournament, TournamentFormat,
    TournamentId, TournamentStatus,
};
use serde::{Deserialize, Serialize};

use super::AppState;
use super::errors::{ApiError, tournament_error};
use crate::metrics;

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTournamentRequest {
    pub name: String,
    #[serde(default = "default_format")]
    pub format: TournamentFormat,
    pub max_participants: u32,
}

fn default_format() -> TournamentFormat {
    TournamentFormat::SingleElimination
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SetStatusRequest {
    pub status: TournamentStatus,
}

/// Create a tournament in `draft`.
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Empty name or capacity out of range
pub async fn create_tournament(
    State(state): State<AppState>,
    Json(request): Json<CreateTournamentRequest>,
) -> Result<(StatusCode, Json<Tournament>), ApiError> {
    let tournament = state
        .tournaments
        .create_tournament(NewTournament {
            name: request.name,
            format: request.format,
            max_participants: request.max_participants,
        })
        .await
        .map_err(|e| tournament_error("create_tournament", e))?;

    Ok((StatusCode::CREATED, Json(tournament)))
}

/// Get a tournament with its live participant count and champion.
pub async fn get_tournament(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<Tournament>, ApiError> {
    state
        .tournaments
        .get_tournament(tournament_id)
        .await
        .map(Json)
        .map_err(|e| tournament_error("get_tournament", e))
}

/// Move a tournament along its lifecycle.
///
/// # Errors
///
/// - `404 Not Found`: Tournament doesn't exist
/// - `409 Conflict`: Transition not allowed from the current status
pub async fn set_status(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
    Json(request): Json<SetStatusRequest>,
) -> Result<Json<Tournament>, ApiError> {
    state
        .tournaments
        .set_status(tournament_id, request.status)
        .await
        .map(Json)
        .map_err(|e| tournament_error("set_status", e))
}

/// Register a user or team.
///
/// # Request Body
///
/// ```json
/// {"kind": "team", "id": "7f1c0d8e-3a51-4c57-9d1e-2f5e8f0b6a11"}
/// ```
///
/// # Errors
///
/// - `404 Not Found`: Tournament doesn't exist
/// - `409 Conflict`: Registration closed, tournament full, or already registered
pub async fn register_participant(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
    Json(entrant): Json<Entrant>,
) -> Result<(StatusCode, Json<Participant>), ApiError> {
    let result = state
        .tournaments
        .register_participant(tournament_id, entrant)
        .await;
    metrics::registrations_total(result.is_ok());

    let participant = result.map_err(|e| tournament_error("register_participant", e))?;
    Ok((StatusCode::CREATED, Json(participant)))
}

/// Confirmed participants in join order.
pub async fn list_participants(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<Vec<Participant>>, ApiError> {
    state
        .tournaments
        .list_participants(tournament_id)
        .await
        .map(Json)
        .map_err(|e| tournament_error("list_participants", e))
}

/// Withdraw a participant while registration is open.
///
/// # Errors
///
/// - `404 Not Found`: Tournament or participant doesn't exist
/// - `409 Conflict`: Registration closed or bracket already generated
pub async fn withdraw_participant(
    State(state): State<AppState>,
    Path((tournament_id, participant_id)): Path<(TournamentId, ParticipantId)>,
) -> Result<StatusCode, ApiError> {
    state
        .tournaments
        .withdraw_participant(tournament_id, participant_id)
        .await
        .map_err(|e| tournament_error("withdraw_participant", e))?;

    Ok(StatusCode::NO_CONTENT)
}
