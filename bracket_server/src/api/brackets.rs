//! Bracket and match API handlers.
//!
//! Generation builds the whole match tree for a tournament in one call;
//! reporting a result completes the match and advances the winner in the
//! same atomic write. Neither route checks who the caller is.
//!
//! # Examples
//!
//! ```bash
//! curl -X POST http://localhost:8080/api/v1/tournaments/ID/generate-matches
//!
//! curl -X PUT http://localhost:8080/api/v1/matches/MATCH_ID/result \
//!   -H "Content-Type: application/json" \
//!   -d '{"winner_id": "PARTICIPANT_ID", "score1": 2, "score2": 1}'
//! ```

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use bracket_engine::{
    bracket::{BracketSummary, Match, MatchId},
    tournament::{ParticipantId, TournamentId, TournamentStatus},
};
use serde::{Deserialize, Serialize};

use super::AppState;
use super::errors::{ApiError, generation_error, report_error, store_error, tournament_error};
use crate::metrics;

#[derive(Debug, Serialize, Deserialize)]
pub struct ReportResultRequest {
    pub winner_id: ParticipantId,
    pub score1: i32,
    pub score2: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReportResultResponse {
    #[serde(rename = "match")]
    pub completed: Match,
    /// Set when this result decided the tournament
    pub champion_id: Option<ParticipantId>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CancelResponse {
    pub tournament_id: TournamentId,
    pub cancelled_matches: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RebuildResponse {
    pub tournament_id: TournamentId,
    pub slots_written: usize,
}

/// Generate the full bracket from the confirmed participants.
///
/// # Response
///
/// Returns `201 Created` with the bracket summary:
/// ```json
/// {
///   "tournament_id": "…",
///   "participant_count": 5,
///   "total_rounds": 3,
///   "matches_per_round": [2, 2, 1],
///   "match_count": 5,
///   "bye_participant": "…",
///   "auto_advanced": 1
/// }
/// ```
///
/// # Errors
///
/// - `404 Not Found`: Tournament doesn't exist
/// - `409 Conflict`: Bracket already generated, tournament already started, or a
///   participant registered mid-generation
/// - `422 Unprocessable Entity`: Fewer than two participants or unsupported format
pub async fn generate_matches(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<(StatusCode, Json<BracketSummary>), ApiError> {
    let summary = state
        .engine
        .generate(tournament_id)
        .await
        .map_err(|e| generation_error("generate_matches", e))?;

    metrics::brackets_generated_total(summary.participant_count, summary.auto_advanced);
    Ok((StatusCode::CREATED, Json(summary)))
}

/// Every match of the tournament ordered by round, then match number.
pub async fn list_matches(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<Vec<Match>>, ApiError> {
    state
        .tournaments
        .get_tournament(tournament_id)
        .await
        .map_err(|e| tournament_error("list_matches", e))?;

    state
        .engine
        .bracket(tournament_id)
        .await
        .map(Json)
        .map_err(|e| store_error("list_matches", e))
}

/// Record a match result and advance the winner.
///
/// # Errors
///
/// - `404 Not Found`: Match doesn't exist
/// - `409 Conflict`: Match already completed, cancelled, or still waiting for an
///   opponent, or the tournament is closed
/// - `422 Unprocessable Entity`: Winner is not in the match, or a negative score
pub async fn report_result(
    State(state): State<AppState>,
    Path(match_id): Path<MatchId>,
    Json(request): Json<ReportResultRequest>,
) -> Result<Json<ReportResultResponse>, ApiError> {
    let completed = state
        .engine
        .report_result(match_id, request.winner_id, request.score1, request.score2)
        .await
        .map_err(|e| report_error("report_result", e))?;
    metrics::results_reported_total(completed.round);

    let tournament = state
        .tournaments
        .get_tournament(completed.tournament_id)
        .await
        .map_err(|e| tournament_error("report_result", e))?;

    let champion_id = match tournament.champion_id {
        Some(champion) if tournament.status == TournamentStatus::Completed
            && completed.winner_id == Some(champion) =>
        {
            metrics::champions_total();
            Some(champion)
        }
        _ => None,
    };

    Ok(Json(ReportResultResponse {
        completed,
        champion_id,
    }))
}

/// Mark a ready match as in progress.
pub async fn start_match(
    State(state): State<AppState>,
    Path(match_id): Path<MatchId>,
) -> Result<Json<Match>, ApiError> {
    state
        .engine
        .start_match(match_id)
        .await
        .map(Json)
        .map_err(|e| report_error("start_match", e))
}

/// Cancel the tournament and every match still open in its bracket.
///
/// Both happen in one store transaction. A tournament cancelled before
/// generation has no matches to cancel.
///
/// # Errors
///
/// - `404 Not Found`: Tournament doesn't exist
/// - `409 Conflict`: Tournament already completed or cancelled
pub async fn cancel_tournament(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<CancelResponse>, ApiError> {
    let cancelled_matches = state
        .tournaments
        .cancel_tournament(tournament_id)
        .await
        .map_err(|e| tournament_error("cancel_tournament", e))?;
    metrics::matches_cancelled_total(cancelled_matches);

    Ok(Json(CancelResponse {
        tournament_id,
        cancelled_matches,
    }))
}

/// Re-derive advancement from completed matches and fill any missing slot.
pub async fn rebuild_advancement(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<RebuildResponse>, ApiError> {
    let slots_written = state
        .engine
        .rebuild_advancement(tournament_id)
        .await
        .map_err(|e| report_error("rebuild_advancement", e))?;
    metrics::advancement_repairs_total(slots_written);

    Ok(Json(RebuildResponse {
        tournament_id,
        slots_written,
    }))
}
