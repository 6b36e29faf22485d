//! Repository trait definitions for testability and dependency injection.
//!
//! The bracket engine and the tournament manager only see these traits.
//! [`PgBracketStore`](super::PgBracketStore) backs them with PostgreSQL and
//! [`MemoryStore`](super::MemoryStore) keeps everything in process.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::errors::StoreResult;
use crate::bracket::{
    BracketPlan, BracketRecord, Match, MatchId, MatchResult, ResultPlan, Slot,
};
use crate::tournament::{
    Entrant, NewTournament, Participant, ParticipantId, RegistrationOutcome, Tournament,
    TournamentId, TournamentStatus,
};

/// Trait for tournament and participant storage
#[async_trait]
pub trait TournamentRepository: Send + Sync {
    /// Create a tournament in `draft`
    async fn create_tournament(&self, tournament: &NewTournament) -> StoreResult<Tournament>;

    /// Find tournament by ID
    async fn get_tournament(&self, tournament_id: TournamentId) -> StoreResult<Option<Tournament>>;

    /// Move the tournament from `from` to `to` in one transaction.
    ///
    /// Moving to `cancelled` also cancels every open match. Returns how many
    /// matches were cancelled, or `None` if the tournament does not exist or
    /// is no longer in `from`.
    async fn set_status(
        &self,
        tournament_id: TournamentId,
        from: TournamentStatus,
        to: TournamentStatus,
    ) -> StoreResult<Option<u64>>;

    /// Register an entrant and recompute the participant count in one transaction.
    ///
    /// Fails with `StoreError::BracketExists` once a bracket was generated.
    async fn add_participant(
        &self,
        tournament_id: TournamentId,
        entrant: &Entrant,
    ) -> StoreResult<RegistrationOutcome>;

    /// Remove a participant and recompute the participant count in one transaction.
    ///
    /// Fails with `StoreError::BracketExists` once a bracket references the field.
    async fn remove_participant(
        &self,
        tournament_id: TournamentId,
        participant_id: ParticipantId,
    ) -> StoreResult<bool>;

    /// Participants in join order
    async fn list_confirmed_participants(
        &self,
        tournament_id: TournamentId,
    ) -> StoreResult<Vec<Participant>>;
}

/// Trait for bracket and match storage
#[async_trait]
pub trait BracketRepository: TournamentRepository {
    /// Bracket header, if one was generated
    async fn get_bracket(&self, tournament_id: TournamentId) -> StoreResult<Option<BracketRecord>>;

    /// Insert the bracket header and every match atomically.
    ///
    /// Fails with `StoreError::BracketExists` when the tournament already has
    /// a bracket, and with `StoreError::ParticipantsChanged` when a registered
    /// participant is missing from the plan. Nothing is written in either case.
    async fn insert_bracket(&self, plan: &BracketPlan) -> StoreResult<Vec<Match>>;

    /// Find match by ID
    async fn get_match(&self, match_id: MatchId) -> StoreResult<Option<Match>>;

    /// All matches ordered by round, then match number
    async fn list_matches(&self, tournament_id: TournamentId) -> StoreResult<Vec<Match>>;

    /// Write one slot if it is empty or already holds the same participant
    async fn update_match_slot(
        &self,
        match_id: MatchId,
        slot: Slot,
        participant_id: ParticipantId,
    ) -> StoreResult<bool>;

    /// Complete an open match, returns false if it was no longer open
    async fn update_match_result(&self, match_id: MatchId, result: &MatchResult)
    -> StoreResult<bool>;

    /// Move a scheduled match to in progress, `None` if it was not scheduled
    async fn start_match(
        &self,
        match_id: MatchId,
        started_at: DateTime<Utc>,
    ) -> StoreResult<Option<Match>>;

    /// Complete a match and apply its advancement atomically.
    ///
    /// Fails with `StoreError::StaleMatch` when any guarded write finds its row
    /// changed, and with `StoreError::TournamentClosed` when the champion would
    /// land on a completed or cancelled tournament. Nothing is written then.
    async fn apply_result(&self, plan: &ResultPlan) -> StoreResult<Match>;

    /// Record the champion and complete the tournament.
    ///
    /// Returns false if a champion is already set or the tournament is closed.
    async fn set_champion(
        &self,
        tournament_id: TournamentId,
        participant_id: ParticipantId,
    ) -> StoreResult<bool>;

    /// Cancel every open match, returns how many changed
    async fn cancel_open_matches(&self, tournament_id: TournamentId) -> StoreResult<u64>;
}
