//! Bracket engine: generation, result reporting and match lifecycle.

use chrono::Utc;
use std::sync::Arc;

use super::advancement::{AdvanceStep, MissingMatch, ResultPlan, advance_from, missing_advancements};
use super::errors::{GenerationError, GenerationResult, ReportError, ReportResult};
use super::models::{BracketSummary, Match, MatchId, MatchResult, MatchStatus};
use super::planner::{BracketLayout, plan_bracket};
use crate::db::{BracketRepository, StoreError, StoreResult, TournamentRepository};
use crate::tournament::{Participant, ParticipantId, TournamentFormat, TournamentId};

/// Attempts at applying a report when a downstream row changed underneath it
const REPORT_ATTEMPTS: usize = 3;

impl From<MissingMatch> for ReportError {
    fn from(missing: MissingMatch) -> Self {
        ReportError::InconsistentBracket {
            round: missing.round,
            match_number: missing.match_number,
        }
    }
}

/// Bracket engine
#[derive(Clone)]
pub struct BracketEngine {
    repo: Arc<dyn BracketRepository>,
}

impl BracketEngine {
    /// Create a new bracket engine
    pub fn new(repo: Arc<dyn BracketRepository>) -> Self {
        Self { repo }
    }

    /// Generate the bracket for a tournament from its confirmed participants.
    ///
    /// Participants are seeded in join order. The whole bracket is written in
    /// one atomic insert; a second call fails with
    /// `GenerationError::BracketAlreadyExists` and writes nothing.
    ///
    /// # Errors
    ///
    /// * `GenerationError::TournamentNotFound` - Unknown tournament
    /// * `GenerationError::TournamentAlreadyStarted` - Tournament is past registration
    /// * `GenerationError::InsufficientParticipants` - Fewer than two participants
    /// * `GenerationError::UnsupportedFormat` - Format other than single elimination
    /// * `GenerationError::BracketAlreadyExists` - Bracket was generated before
    pub async fn generate(&self, tournament_id: TournamentId) -> GenerationResult<BracketSummary> {
        let tournament = self
            .repo
            .get_tournament(tournament_id)
            .await?
            .ok_or(GenerationError::TournamentNotFound(tournament_id))?;

        if !tournament.status.is_pre_start() {
            log::warn!(
                "Refusing to generate bracket for tournament {} in status {}",
                tournament_id,
                tournament.status
            );
            return Err(GenerationError::TournamentAlreadyStarted(tournament.status));
        }

        let participants = self.repo.list_confirmed_participants(tournament_id).await?;
        self.generate_from(tournament_id, &participants, tournament.format)
            .await
    }

    /// Generate a bracket from an explicit participant list.
    ///
    /// Participants are sorted by join position before seeding. No tournament
    /// status check is made; the caller owns that gate.
    pub async fn generate_from(
        &self,
        tournament_id: TournamentId,
        participants: &[Participant],
        format: TournamentFormat,
    ) -> GenerationResult<BracketSummary> {
        let mut ordered: Vec<&Participant> = participants.iter().collect();
        ordered.sort_by_key(|p| p.position);
        let ids: Vec<ParticipantId> = ordered.iter().map(|p| p.id).collect();

        let plan = plan_bracket(tournament_id, &ids, format, Utc::now())?;
        self.repo.insert_bracket(&plan).await?;

        let summary = plan.summary();
        log::info!(
            "Generated bracket for tournament {}: {} participants, {} rounds, {} matches",
            tournament_id,
            summary.participant_count,
            summary.total_rounds,
            summary.match_count
        );
        if let Some(bye) = summary.bye_participant {
            log::info!("Participant {} receives a first-round bye", bye);
        }

        Ok(summary)
    }

    /// Record a match result and move the winner forward.
    ///
    /// Completion and advancement are applied in one atomic store call. The
    /// winner goes to slot one of the next match when this match has an odd
    /// number, slot two when even. Winning the final records the champion.
    ///
    /// # Errors
    ///
    /// * `ReportError::MatchNotFound` - Unknown match
    /// * `ReportError::MatchAlreadyCompleted` - Match was already decided
    /// * `ReportError::MatchCancelled` - Match was cancelled
    /// * `ReportError::MatchNotReady` - A slot is still empty
    /// * `ReportError::InvalidWinner` - Winner is not one of the two occupants
    /// * `ReportError::InvalidScore` - Negative score
    /// * `ReportError::TournamentClosed` - Tournament is completed or cancelled
    pub async fn report_result(
        &self,
        match_id: MatchId,
        winner_id: ParticipantId,
        score1: i32,
        score2: i32,
    ) -> ReportResult<Match> {
        for score in [score1, score2] {
            if score < 0 {
                return Err(ReportError::InvalidScore(score));
            }
        }

        let mut attempt = 0;
        loop {
            attempt += 1;

            let m = self.reportable_match(match_id).await?;
            if !m.has_participant(winner_id) {
                log::warn!(
                    "Rejected result for match {}: {} is not playing",
                    match_id,
                    winner_id
                );
                return Err(ReportError::InvalidWinner {
                    match_id,
                    participant_id: winner_id,
                });
            }

            let tournament = self.repo.get_tournament(m.tournament_id).await?;
            if tournament.is_some_and(|t| t.status.is_terminal()) {
                log::warn!(
                    "Rejected result for match {}: tournament {} is closed",
                    match_id,
                    m.tournament_id
                );
                return Err(ReportError::TournamentClosed(m.tournament_id));
            }

            let record = self
                .repo
                .get_bracket(m.tournament_id)
                .await?
                .ok_or(ReportError::BracketNotFound(m.tournament_id))?;
            let layout = BracketLayout::new(record.participant_count);
            let matches = self.repo.list_matches(m.tournament_id).await?;

            let plan = ResultPlan {
                tournament_id: m.tournament_id,
                match_id,
                result: MatchResult::played(winner_id, score1, score2, Utc::now()),
                advancement: advance_from(&layout, &matches, m.round, m.match_number, winner_id)?,
            };

            match self.repo.apply_result(&plan).await {
                Ok(updated) => {
                    log::info!(
                        "Match {} (round {}, match {}) won by {} {}-{}",
                        match_id,
                        updated.round,
                        updated.match_number,
                        winner_id,
                        score1,
                        score2
                    );
                    if let Some(champion) = plan.champion() {
                        log::info!(
                            "Participant {} won tournament {}",
                            champion,
                            plan.tournament_id
                        );
                    }
                    return Ok(updated);
                }
                Err(StoreError::StaleMatch(stale)) if stale == match_id => {
                    // Lost the race to another report or a cancellation
                    return Err(match self.reportable_match(match_id).await {
                        Err(e) => e,
                        Ok(_) => ReportError::MatchAlreadyCompleted(match_id),
                    });
                }
                Err(StoreError::StaleMatch(stale)) if attempt < REPORT_ATTEMPTS => {
                    log::debug!(
                        "Downstream match {} changed while reporting {}, retrying",
                        stale,
                        match_id
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Match that can still take a result, with both slots filled
    async fn reportable_match(&self, match_id: MatchId) -> ReportResult<Match> {
        let m = self
            .repo
            .get_match(match_id)
            .await?
            .ok_or(ReportError::MatchNotFound(match_id))?;

        match m.status {
            MatchStatus::Completed => Err(ReportError::MatchAlreadyCompleted(match_id)),
            MatchStatus::Cancelled => Err(ReportError::MatchCancelled(match_id)),
            _ if !m.is_ready() => Err(ReportError::MatchNotReady(match_id)),
            _ => Ok(m),
        }
    }

    /// Move a scheduled match with both occupants to in progress
    pub async fn start_match(&self, match_id: MatchId) -> ReportResult<Match> {
        let m = self
            .repo
            .get_match(match_id)
            .await?
            .ok_or(ReportError::MatchNotFound(match_id))?;

        if !m.status.can_transition_to(MatchStatus::InProgress) {
            return Err(ReportError::InvalidTransition {
                from: m.status,
                to: MatchStatus::InProgress,
            });
        }
        if !m.is_ready() {
            return Err(ReportError::MatchNotReady(match_id));
        }

        let started = self.repo.start_match(match_id, Utc::now()).await?;
        match started {
            Some(started) => {
                log::debug!("Match {} started", match_id);
                Ok(started)
            }
            // Lost a race with another start, a report or a cancellation
            None => {
                let current = self
                    .repo
                    .get_match(match_id)
                    .await?
                    .ok_or(ReportError::MatchNotFound(match_id))?;
                Err(ReportError::InvalidTransition {
                    from: current.status,
                    to: MatchStatus::InProgress,
                })
            }
        }
    }

    /// Cancel every open match of a tournament, returns how many were cancelled
    pub async fn cancel_bracket(&self, tournament_id: TournamentId) -> ReportResult<u64> {
        if self.repo.get_bracket(tournament_id).await?.is_none() {
            return Err(ReportError::BracketNotFound(tournament_id));
        }

        let cancelled = self.repo.cancel_open_matches(tournament_id).await?;
        log::info!(
            "Cancelled {} open matches in tournament {}",
            cancelled,
            tournament_id
        );
        Ok(cancelled)
    }

    /// All matches of a tournament ordered by round, then match number
    pub async fn bracket(&self, tournament_id: TournamentId) -> StoreResult<Vec<Match>> {
        self.repo.list_matches(tournament_id).await
    }

    /// Re-derive advancement from completed matches and write what is missing.
    ///
    /// Returns the number of writes made. Running it on a consistent bracket
    /// changes nothing.
    pub async fn rebuild_advancement(&self, tournament_id: TournamentId) -> ReportResult<usize> {
        let record = self
            .repo
            .get_bracket(tournament_id)
            .await?
            .ok_or(ReportError::BracketNotFound(tournament_id))?;
        let layout = BracketLayout::new(record.participant_count);

        let matches = self.repo.list_matches(tournament_id).await?;
        let steps = missing_advancements(&layout, &matches, Utc::now())?;

        let mut written = 0;
        for step in &steps {
            let applied = match step {
                AdvanceStep::FillSlot {
                    match_id,
                    slot,
                    participant_id,
                } => {
                    self.repo
                        .update_match_slot(*match_id, *slot, *participant_id)
                        .await?
                }
                AdvanceStep::CompleteBye {
                    match_id,
                    winner_id,
                } => {
                    self.repo
                        .update_match_result(*match_id, &MatchResult::bye(*winner_id, Utc::now()))
                        .await?
                }
                AdvanceStep::Champion { participant_id } => {
                    self.repo.set_champion(tournament_id, *participant_id).await?
                }
            };

            if applied {
                written += 1;
            } else {
                log::warn!(
                    "Skipped advancement step {:?} in tournament {}: row changed",
                    step,
                    tournament_id
                );
            }
        }

        if written > 0 {
            log::info!(
                "Repaired {} advancement writes in tournament {}",
                written,
                tournament_id
            );
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, TournamentRepository};
    use crate::tournament::{Entrant, NewTournament, RegistrationOutcome, TournamentStatus};

    async fn seeded(n: usize) -> (BracketEngine, Arc<MemoryStore>, TournamentId, Vec<ParticipantId>) {
        let store = Arc::new(MemoryStore::new());
        let tournament = store
            .create_tournament(&NewTournament::single_elimination("Spring Cup", 64))
            .await
            .unwrap();
        store
            .set_status(
                tournament.id,
                TournamentStatus::Draft,
                TournamentStatus::RegistrationOpen,
            )
            .await
            .unwrap();

        let mut ids = Vec::new();
        for i in 0..n {
            let outcome = store
                .add_participant(tournament.id, &Entrant::User(format!("player-{i}")))
                .await
                .unwrap();
            let RegistrationOutcome::Added(p) = outcome else {
                panic!("registration failed");
            };
            ids.push(p.id);
        }

        (BracketEngine::new(store.clone()), store, tournament.id, ids)
    }

    fn at(matches: &[Match], round: u32, match_number: u32) -> Match {
        matches
            .iter()
            .find(|m| m.round == round && m.match_number == match_number)
            .cloned()
            .unwrap()
    }

    #[tokio::test]
    async fn test_generate_requires_pre_start_status() {
        let (engine, store, id, _) = seeded(4).await;
        store
            .set_status(
                id,
                TournamentStatus::RegistrationOpen,
                TournamentStatus::InProgress,
            )
            .await
            .unwrap();

        let err = engine.generate(id).await.unwrap_err();
        assert!(matches!(
            err,
            GenerationError::TournamentAlreadyStarted(TournamentStatus::InProgress)
        ));
        assert!(engine.bracket(id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_report_rejects_negative_score() {
        let (engine, _, id, ids) = seeded(2).await;
        engine.generate(id).await.unwrap();
        let m = at(&engine.bracket(id).await.unwrap(), 1, 1);

        let err = engine.report_result(m.id, ids[0], -1, 0).await.unwrap_err();
        assert!(matches!(err, ReportError::InvalidScore(-1)));
    }

    #[tokio::test]
    async fn test_report_on_waiting_match_is_not_ready() {
        let (engine, _, id, ids) = seeded(4).await;
        engine.generate(id).await.unwrap();
        let final_match = at(&engine.bracket(id).await.unwrap(), 2, 1);

        let err = engine
            .report_result(final_match.id, ids[0], 1, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::MatchNotReady(_)));
    }

    #[tokio::test]
    async fn test_start_then_report() {
        let (engine, _, id, ids) = seeded(2).await;
        engine.generate(id).await.unwrap();
        let m = at(&engine.bracket(id).await.unwrap(), 1, 1);

        let started = engine.start_match(m.id).await.unwrap();
        assert_eq!(started.status, MatchStatus::InProgress);
        assert!(started.started_at.is_some());

        let err = engine.start_match(m.id).await.unwrap_err();
        assert!(matches!(
            err,
            ReportError::InvalidTransition {
                from: MatchStatus::InProgress,
                ..
            }
        ));

        let done = engine.report_result(m.id, ids[1], 0, 2).await.unwrap();
        assert_eq!(done.status, MatchStatus::Completed);
        assert_eq!(done.winner_id, Some(ids[1]));
    }

    #[tokio::test]
    async fn test_cancel_without_bracket() {
        let (engine, _, id, _) = seeded(2).await;
        let err = engine.cancel_bracket(id).await.unwrap_err();
        assert!(matches!(err, ReportError::BracketNotFound(got) if got == id));
    }

    #[tokio::test]
    async fn test_report_refused_on_closed_tournament() {
        let (engine, store, id, ids) = seeded(2).await;
        engine.generate(id).await.unwrap();
        let final_match = at(&engine.bracket(id).await.unwrap(), 1, 1);

        // Closed while the match is still open
        store
            .set_status(
                id,
                TournamentStatus::RegistrationOpen,
                TournamentStatus::Completed,
            )
            .await
            .unwrap();

        let err = engine
            .report_result(final_match.id, ids[0], 2, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::TournamentClosed(got) if got == id));

        let tournament = store.get_tournament(id).await.unwrap().unwrap();
        assert_eq!(tournament.champion_id, None);
        let m = at(&engine.bracket(id).await.unwrap(), 1, 1);
        assert_eq!(m.status, MatchStatus::Scheduled);
    }
}
