//! PostgreSQL store.
//!
//! Multi-row writes run in a single transaction. Result reporting uses
//! column-scoped guarded updates so two sibling reports that feed the same
//! downstream match never overwrite each other's slot.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row, Transaction};
use uuid::Uuid;

use super::errors::{StoreError, StoreResult};
use super::repository::{BracketRepository, TournamentRepository};
use super::timeouts::{
    DEFAULT_TRANSACTION_TIMEOUT, LONG_OPERATION_TIMEOUT, with_default_timeout,
    with_transaction_timeout,
};
use crate::bracket::{
    AdvanceStep, BracketPlan, BracketRecord, Match, MatchId, MatchResult, MatchStatus,
    ResultPlan, Slot,
};
use crate::tournament::{
    Entrant, NewTournament, Participant, ParticipantId, RegistrationOutcome, Tournament,
    TournamentId, TournamentStatus,
};

const TOURNAMENT_COLUMNS: &str = "id, name, format, status, max_participants, \
     current_participants, champion_id, created_at";

const PARTICIPANT_COLUMNS: &str = "id, tournament_id, user_id, team_id, position, joined_at";

const MATCH_COLUMNS: &str = "id, tournament_id, round, match_number, participant1_id, \
     participant2_id, winner_id, status, score1, score2, is_bye, started_at, completed_at, \
     created_at";

fn to_u32(value: i32, column: &str) -> StoreResult<u32> {
    u32::try_from(value).map_err(|_| StoreError::Decode(format!("{column} = {value}")))
}

fn tournament_from_row(row: &PgRow) -> StoreResult<Tournament> {
    Ok(Tournament {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        format: row.try_get::<String, _>("format")?.parse()?,
        status: row.try_get::<String, _>("status")?.parse()?,
        max_participants: to_u32(row.try_get("max_participants")?, "max_participants")?,
        current_participants: to_u32(
            row.try_get("current_participants")?,
            "current_participants",
        )?,
        champion_id: row.try_get("champion_id")?,
        created_at: row.try_get("created_at")?,
    })
}

fn participant_from_row(row: &PgRow) -> StoreResult<Participant> {
    let user_id: Option<String> = row.try_get("user_id")?;
    let team_id: Option<Uuid> = row.try_get("team_id")?;
    let id: ParticipantId = row.try_get("id")?;

    let entrant = match (user_id, team_id) {
        (Some(user), None) => Entrant::User(user),
        (None, Some(team)) => Entrant::Team(team),
        _ => {
            return Err(StoreError::Decode(format!(
                "participant {id} must reference exactly one user or team"
            )));
        }
    };

    Ok(Participant {
        id,
        tournament_id: row.try_get("tournament_id")?,
        entrant,
        position: to_u32(row.try_get("position")?, "position")?,
        joined_at: row.try_get("joined_at")?,
    })
}

fn match_from_row(row: &PgRow) -> StoreResult<Match> {
    Ok(Match {
        id: row.try_get("id")?,
        tournament_id: row.try_get("tournament_id")?,
        round: to_u32(row.try_get("round")?, "round")?,
        match_number: to_u32(row.try_get("match_number")?, "match_number")?,
        participant1_id: row.try_get("participant1_id")?,
        participant2_id: row.try_get("participant2_id")?,
        winner_id: row.try_get("winner_id")?,
        status: row.try_get::<String, _>("status")?.parse()?,
        score1: row.try_get("score1")?,
        score2: row.try_get("score2")?,
        is_bye: row.try_get("is_bye")?,
        started_at: row.try_get("started_at")?,
        completed_at: row.try_get("completed_at")?,
        created_at: row.try_get("created_at")?,
    })
}

fn bracket_from_row(row: &PgRow) -> StoreResult<BracketRecord> {
    Ok(BracketRecord {
        tournament_id: row.try_get("tournament_id")?,
        format: row.try_get::<String, _>("format")?.parse()?,
        participant_count: to_u32(row.try_get("participant_count")?, "participant_count")?,
        total_rounds: to_u32(row.try_get("total_rounds")?, "total_rounds")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Advisory lock key for a tournament
fn lock_key(tournament_id: TournamentId) -> i64 {
    let (high, low) = tournament_id.as_u64_pair();
    (high ^ low) as i64
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// PostgreSQL-backed tournament and bracket store
#[derive(Clone)]
pub struct PgBracketStore {
    pool: PgPool,
}

impl PgBracketStore {
    /// Create a new store over a connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn match_exists(&self, match_id: MatchId) -> StoreResult<bool> {
        let row = with_default_timeout(
            sqlx::query("SELECT 1 FROM matches WHERE id = $1")
                .bind(match_id)
                .fetch_optional(&self.pool),
        )
        .await?;
        Ok(row.is_some())
    }

    /// Rewrite the counter from the participant rows
    async fn recount(
        tx: &mut Transaction<'_, Postgres>,
        tournament_id: TournamentId,
    ) -> StoreResult<()> {
        sqlx::query(
            "UPDATE tournaments
             SET current_participants = (
                 SELECT COUNT(*) FROM tournament_participants WHERE tournament_id = $1
             )
             WHERE id = $1",
        )
        .bind(tournament_id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn bracket_exists(
        tx: &mut Transaction<'_, Postgres>,
        tournament_id: TournamentId,
    ) -> StoreResult<bool> {
        let row = sqlx::query("SELECT 1 FROM brackets WHERE tournament_id = $1")
            .bind(tournament_id)
            .fetch_optional(&mut **tx)
            .await?;
        Ok(row.is_some())
    }

    async fn set_status_tx(
        &self,
        tournament_id: TournamentId,
        from: TournamentStatus,
        to: TournamentStatus,
    ) -> StoreResult<Option<u64>> {
        let mut tx = self.pool.begin().await?;

        let moved =
            sqlx::query("UPDATE tournaments SET status = $3 WHERE id = $1 AND status = $2")
                .bind(tournament_id)
                .bind(from.as_str())
                .bind(to.as_str())
                .execute(&mut *tx)
                .await?
                .rows_affected();
        if moved == 0 {
            return Ok(None);
        }

        let mut cancelled = 0;
        if to == TournamentStatus::Cancelled {
            cancelled = sqlx::query(
                "UPDATE matches SET status = 'cancelled'
                 WHERE tournament_id = $1 AND status IN ('scheduled', 'in_progress')",
            )
            .bind(tournament_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }

        tx.commit().await?;
        Ok(Some(cancelled))
    }

    async fn add_participant_tx(
        &self,
        tournament_id: TournamentId,
        entrant: &Entrant,
    ) -> StoreResult<RegistrationOutcome> {
        let mut tx = self.pool.begin().await?;

        // Lock the tournament row so capacity checks serialize
        let Some(row) = sqlx::query(
            "SELECT status, max_participants FROM tournaments WHERE id = $1 FOR UPDATE",
        )
        .bind(tournament_id)
        .fetch_optional(&mut *tx)
        .await?
        else {
            return Ok(RegistrationOutcome::TournamentMissing);
        };

        let status: TournamentStatus = row.try_get::<String, _>("status")?.parse()?;
        if status != TournamentStatus::RegistrationOpen {
            return Ok(RegistrationOutcome::Closed(status));
        }
        let capacity: i32 = row.try_get("max_participants")?;

        if Self::bracket_exists(&mut tx, tournament_id).await? {
            return Err(StoreError::BracketExists(tournament_id));
        }

        let duplicate = sqlx::query(
            "SELECT 1 FROM tournament_participants
             WHERE tournament_id = $1 AND (user_id = $2 OR team_id = $3)",
        )
        .bind(tournament_id)
        .bind(entrant.user_id())
        .bind(entrant.team_id())
        .fetch_optional(&mut *tx)
        .await?;
        if duplicate.is_some() {
            return Ok(RegistrationOutcome::AlreadyRegistered);
        }

        let count: i64 = sqlx::query(
            "SELECT COUNT(*) AS count FROM tournament_participants WHERE tournament_id = $1",
        )
        .bind(tournament_id)
        .fetch_one(&mut *tx)
        .await?
        .try_get("count")?;
        if count >= i64::from(capacity) {
            return Ok(RegistrationOutcome::Full);
        }

        let inserted = sqlx::query(&format!(
            "INSERT INTO tournament_participants (id, tournament_id, user_id, team_id, position)
             VALUES ($1, $2, $3, $4, (
                 SELECT COALESCE(MAX(position), 0) + 1
                 FROM tournament_participants WHERE tournament_id = $2
             ))
             RETURNING {PARTICIPANT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(tournament_id)
        .bind(entrant.user_id())
        .bind(entrant.team_id())
        .fetch_one(&mut *tx)
        .await;

        let participant = match inserted {
            Ok(row) => participant_from_row(&row)?,
            Err(e) if is_unique_violation(&e) => {
                return Ok(RegistrationOutcome::AlreadyRegistered);
            }
            Err(e) => return Err(e.into()),
        };

        Self::recount(&mut tx, tournament_id).await?;
        tx.commit().await?;

        Ok(RegistrationOutcome::Added(participant))
    }

    async fn remove_participant_tx(
        &self,
        tournament_id: TournamentId,
        participant_id: ParticipantId,
    ) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT id FROM tournaments WHERE id = $1 FOR UPDATE")
            .bind(tournament_id)
            .fetch_optional(&mut *tx)
            .await?;

        if Self::bracket_exists(&mut tx, tournament_id).await? {
            return Err(StoreError::BracketExists(tournament_id));
        }

        let deleted = sqlx::query(
            "DELETE FROM tournament_participants WHERE tournament_id = $1 AND id = $2",
        )
        .bind(tournament_id)
        .bind(participant_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        Self::recount(&mut tx, tournament_id).await?;
        tx.commit().await?;

        Ok(deleted > 0)
    }

    async fn insert_bracket_tx(&self, plan: &BracketPlan) -> StoreResult<Vec<Match>> {
        let tournament_id = plan.record.tournament_id;
        let mut tx = self.pool.begin().await?;

        // Serialize concurrent generation for the same tournament
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(lock_key(tournament_id))
            .execute(&mut *tx)
            .await?;

        let existing = sqlx::query(
            "SELECT 1 WHERE EXISTS (SELECT 1 FROM brackets WHERE tournament_id = $1)
                OR EXISTS (SELECT 1 FROM matches WHERE tournament_id = $1)",
        )
        .bind(tournament_id)
        .fetch_optional(&mut *tx)
        .await?;
        if existing.is_some() {
            return Err(StoreError::BracketExists(tournament_id));
        }

        // Registration holds this row lock, so the participant set is fixed from here
        sqlx::query("SELECT id FROM tournaments WHERE id = $1 FOR UPDATE")
            .bind(tournament_id)
            .fetch_optional(&mut *tx)
            .await?;

        let seeded: Vec<ParticipantId> = plan.seeded_participants().into_iter().collect();
        let unseeded = sqlx::query(
            "SELECT 1 FROM tournament_participants
             WHERE tournament_id = $1 AND id <> ALL($2)
             LIMIT 1",
        )
        .bind(tournament_id)
        .bind(&seeded)
        .fetch_optional(&mut *tx)
        .await?;
        if unseeded.is_some() {
            return Err(StoreError::ParticipantsChanged(tournament_id));
        }

        let header = sqlx::query(
            "INSERT INTO brackets (tournament_id, format, participant_count, total_rounds, created_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(tournament_id)
        .bind(plan.record.format.as_str())
        .bind(plan.record.participant_count as i32)
        .bind(plan.record.total_rounds as i32)
        .bind(plan.record.created_at)
        .execute(&mut *tx)
        .await;
        match header {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                return Err(StoreError::BracketExists(tournament_id));
            }
            Err(e) => return Err(e.into()),
        }

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("INSERT INTO matches ({MATCH_COLUMNS}) "));
        builder.push_values(&plan.matches, |mut row, m| {
            row.push_bind(m.id)
                .push_bind(m.tournament_id)
                .push_bind(m.round as i32)
                .push_bind(m.match_number as i32)
                .push_bind(m.participant1_id)
                .push_bind(m.participant2_id)
                .push_bind(m.winner_id)
                .push_bind(m.status.as_str())
                .push_bind(m.score1)
                .push_bind(m.score2)
                .push_bind(m.is_bye)
                .push_bind(m.started_at)
                .push_bind(m.completed_at)
                .push_bind(m.created_at);
        });
        builder.build().execute(&mut *tx).await?;

        tx.commit().await?;
        Ok(plan.matches.clone())
    }

    async fn apply_result_tx(&self, plan: &ResultPlan) -> StoreResult<Match> {
        let mut tx = self.pool.begin().await?;

        // Tournament row before match rows, the same order cancellation takes
        if plan.champion().is_some() {
            sqlx::query("SELECT id FROM tournaments WHERE id = $1 FOR UPDATE")
                .bind(plan.tournament_id)
                .fetch_optional(&mut *tx)
                .await?;
        }

        let completed = sqlx::query(&format!(
            "UPDATE matches
             SET status = 'completed', winner_id = $2, score1 = $3, score2 = $4,
                 is_bye = $5, completed_at = $6
             WHERE id = $1 AND status IN ('scheduled', 'in_progress')
             RETURNING {MATCH_COLUMNS}"
        ))
        .bind(plan.match_id)
        .bind(plan.result.winner_id)
        .bind(plan.result.score1)
        .bind(plan.result.score2)
        .bind(plan.result.is_bye)
        .bind(plan.result.completed_at)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(completed) = completed else {
            drop(tx);
            return Err(if self.match_exists(plan.match_id).await? {
                StoreError::StaleMatch(plan.match_id)
            } else {
                StoreError::MatchMissing(plan.match_id)
            });
        };
        let completed = match_from_row(&completed)?;

        for step in &plan.advancement {
            match step {
                AdvanceStep::FillSlot {
                    match_id,
                    slot,
                    participant_id,
                } => {
                    let column = slot.column();
                    let updated = sqlx::query(&format!(
                        "UPDATE matches SET {column} = $2
                         WHERE id = $1 AND ({column} IS NULL OR {column} = $2)"
                    ))
                    .bind(*match_id)
                    .bind(*participant_id)
                    .execute(&mut *tx)
                    .await?
                    .rows_affected();
                    if updated == 0 {
                        return Err(StoreError::StaleMatch(*match_id));
                    }
                }
                AdvanceStep::CompleteBye {
                    match_id,
                    winner_id,
                } => {
                    let updated = sqlx::query(
                        "UPDATE matches
                         SET status = 'completed', winner_id = $2, is_bye = TRUE,
                             completed_at = $3
                         WHERE id = $1 AND status = 'scheduled'",
                    )
                    .bind(*match_id)
                    .bind(*winner_id)
                    .bind(plan.result.completed_at)
                    .execute(&mut *tx)
                    .await?
                    .rows_affected();
                    if updated == 0 {
                        return Err(StoreError::StaleMatch(*match_id));
                    }
                }
                AdvanceStep::Champion { participant_id } => {
                    let updated = sqlx::query(
                        "UPDATE tournaments SET champion_id = $2, status = 'completed'
                         WHERE id = $1 AND status NOT IN ('completed', 'cancelled')",
                    )
                    .bind(plan.tournament_id)
                    .bind(*participant_id)
                    .execute(&mut *tx)
                    .await?
                    .rows_affected();
                    if updated == 0 {
                        return Err(StoreError::TournamentClosed(plan.tournament_id));
                    }
                }
            }
        }

        tx.commit().await?;
        Ok(completed)
    }
}

#[async_trait]
impl TournamentRepository for PgBracketStore {
    async fn create_tournament(&self, tournament: &NewTournament) -> StoreResult<Tournament> {
        let row = with_default_timeout(
            sqlx::query(&format!(
                "INSERT INTO tournaments (id, name, format, status, max_participants)
                 VALUES ($1, $2, $3, 'draft', $4)
                 RETURNING {TOURNAMENT_COLUMNS}"
            ))
            .bind(Uuid::new_v4())
            .bind(&tournament.name)
            .bind(tournament.format.as_str())
            .bind(tournament.max_participants as i32)
            .fetch_one(&self.pool),
        )
        .await?;

        tournament_from_row(&row)
    }

    async fn get_tournament(&self, tournament_id: TournamentId) -> StoreResult<Option<Tournament>> {
        let row = with_default_timeout(
            sqlx::query(&format!(
                "SELECT {TOURNAMENT_COLUMNS} FROM tournaments WHERE id = $1"
            ))
            .bind(tournament_id)
            .fetch_optional(&self.pool),
        )
        .await?;

        row.as_ref().map(tournament_from_row).transpose()
    }

    async fn set_status(
        &self,
        tournament_id: TournamentId,
        from: TournamentStatus,
        to: TournamentStatus,
    ) -> StoreResult<Option<u64>> {
        with_transaction_timeout(
            DEFAULT_TRANSACTION_TIMEOUT,
            self.set_status_tx(tournament_id, from, to),
        )
        .await
    }

    async fn add_participant(
        &self,
        tournament_id: TournamentId,
        entrant: &Entrant,
    ) -> StoreResult<RegistrationOutcome> {
        with_transaction_timeout(
            DEFAULT_TRANSACTION_TIMEOUT,
            self.add_participant_tx(tournament_id, entrant),
        )
        .await
    }

    async fn remove_participant(
        &self,
        tournament_id: TournamentId,
        participant_id: ParticipantId,
    ) -> StoreResult<bool> {
        with_transaction_timeout(
            DEFAULT_TRANSACTION_TIMEOUT,
            self.remove_participant_tx(tournament_id, participant_id),
        )
        .await
    }

    async fn list_confirmed_participants(
        &self,
        tournament_id: TournamentId,
    ) -> StoreResult<Vec<Participant>> {
        let rows = with_default_timeout(
            sqlx::query(&format!(
                "SELECT {PARTICIPANT_COLUMNS} FROM tournament_participants
                 WHERE tournament_id = $1
                 ORDER BY position"
            ))
            .bind(tournament_id)
            .fetch_all(&self.pool),
        )
        .await?;

        rows.iter().map(participant_from_row).collect()
    }
}

#[async_trait]
impl BracketRepository for PgBracketStore {
    async fn get_bracket(&self, tournament_id: TournamentId) -> StoreResult<Option<BracketRecord>> {
        let row = with_default_timeout(
            sqlx::query(
                "SELECT tournament_id, format, participant_count, total_rounds, created_at
                 FROM brackets WHERE tournament_id = $1",
            )
            .bind(tournament_id)
            .fetch_optional(&self.pool),
        )
        .await?;

        row.as_ref().map(bracket_from_row).transpose()
    }

    async fn insert_bracket(&self, plan: &BracketPlan) -> StoreResult<Vec<Match>> {
        with_transaction_timeout(LONG_OPERATION_TIMEOUT, self.insert_bracket_tx(plan)).await
    }

    async fn get_match(&self, match_id: MatchId) -> StoreResult<Option<Match>> {
        let row = with_default_timeout(
            sqlx::query(&format!("SELECT {MATCH_COLUMNS} FROM matches WHERE id = $1"))
                .bind(match_id)
                .fetch_optional(&self.pool),
        )
        .await?;

        row.as_ref().map(match_from_row).transpose()
    }

    async fn list_matches(&self, tournament_id: TournamentId) -> StoreResult<Vec<Match>> {
        let rows = with_default_timeout(
            sqlx::query(&format!(
                "SELECT {MATCH_COLUMNS} FROM matches
                 WHERE tournament_id = $1
                 ORDER BY round, match_number"
            ))
            .bind(tournament_id)
            .fetch_all(&self.pool),
        )
        .await?;

        rows.iter().map(match_from_row).collect()
    }

    async fn update_match_slot(
        &self,
        match_id: MatchId,
        slot: Slot,
        participant_id: ParticipantId,
    ) -> StoreResult<bool> {
        let column = slot.column();
        let result = with_default_timeout(
            sqlx::query(&format!(
                "UPDATE matches SET {column} = $2
                 WHERE id = $1 AND ({column} IS NULL OR {column} = $2)"
            ))
            .bind(match_id)
            .bind(participant_id)
            .execute(&self.pool),
        )
        .await?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }
        if !self.match_exists(match_id).await? {
            return Err(StoreError::MatchMissing(match_id));
        }
        Ok(false)
    }

    async fn update_match_result(
        &self,
        match_id: MatchId,
        result: &MatchResult,
    ) -> StoreResult<bool> {
        let updated = with_default_timeout(
            sqlx::query(
                "UPDATE matches
                 SET status = 'completed', winner_id = $2, score1 = $3, score2 = $4,
                     is_bye = $5, completed_at = $6
                 WHERE id = $1 AND status IN ('scheduled', 'in_progress')",
            )
            .bind(match_id)
            .bind(result.winner_id)
            .bind(result.score1)
            .bind(result.score2)
            .bind(result.is_bye)
            .bind(result.completed_at)
            .execute(&self.pool),
        )
        .await?;

        if updated.rows_affected() > 0 {
            return Ok(true);
        }
        if !self.match_exists(match_id).await? {
            return Err(StoreError::MatchMissing(match_id));
        }
        Ok(false)
    }

    async fn start_match(
        &self,
        match_id: MatchId,
        started_at: DateTime<Utc>,
    ) -> StoreResult<Option<Match>> {
        let row = with_default_timeout(
            sqlx::query(&format!(
                "UPDATE matches SET status = 'in_progress', started_at = $2
                 WHERE id = $1 AND status = 'scheduled'
                 RETURNING {MATCH_COLUMNS}"
            ))
            .bind(match_id)
            .bind(started_at)
            .fetch_optional(&self.pool),
        )
        .await?;

        match row {
            Some(row) => Ok(Some(match_from_row(&row)?)),
            None if self.match_exists(match_id).await? => Ok(None),
            None => Err(StoreError::MatchMissing(match_id)),
        }
    }

    async fn apply_result(&self, plan: &ResultPlan) -> StoreResult<Match> {
        with_transaction_timeout(DEFAULT_TRANSACTION_TIMEOUT, self.apply_result_tx(plan)).await
    }

    async fn set_champion(
        &self,
        tournament_id: TournamentId,
        participant_id: ParticipantId,
    ) -> StoreResult<bool> {
        let result = with_default_timeout(
            sqlx::query(
                "UPDATE tournaments SET champion_id = $2, status = $3
                 WHERE id = $1 AND champion_id IS NULL
                   AND status NOT IN ('completed', 'cancelled')",
            )
            .bind(tournament_id)
            .bind(participant_id)
            .bind(TournamentStatus::Completed.as_str())
            .execute(&self.pool),
        )
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn cancel_open_matches(&self, tournament_id: TournamentId) -> StoreResult<u64> {
        let result = with_default_timeout(
            sqlx::query(
                "UPDATE matches SET status = $2
                 WHERE tournament_id = $1 AND status IN ('scheduled', 'in_progress')",
            )
            .bind(tournament_id)
            .bind(MatchStatus::Cancelled.as_str())
            .execute(&self.pool),
        )
        .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_key_is_stable() {
        let id = Uuid::new_v4();
        assert_eq!(lock_key(id), lock_key(id));
        assert_ne!(lock_key(id), lock_key(Uuid::new_v4()));
    }

    #[test]
    fn test_negative_integers_are_rejected() {
        assert_eq!(to_u32(3, "round").unwrap(), 3);
        let err = to_u32(-1, "round").unwrap_err();
        assert!(matches!(err, StoreError::Decode(msg) if msg == "round = -1"));
    }

    #[test]
    fn test_slot_columns_match_schema() {
        assert!(MATCH_COLUMNS.contains(Slot::One.column()));
        assert!(MATCH_COLUMNS.contains(Slot::Two.column()));
    }
}
