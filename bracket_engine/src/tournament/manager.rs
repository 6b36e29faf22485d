//! Tournament manager for creating tournaments and registering participants.

use super::models::{
    Entrant, NewTournament, Participant, ParticipantId, RegistrationOutcome, Tournament,
    TournamentId, TournamentStatus,
};
use crate::bracket::MAX_PARTICIPANTS;
use crate::db::{StoreError, TournamentRepository};
use std::sync::Arc;
use thiserror::Error;

/// Attempts at a status change when the status moves underneath it
const TRANSITION_ATTEMPTS: usize = 3;

/// Tournament errors
#[derive(Debug, Error)]
pub enum TournamentError {
    #[error("Tournament not found: {0}")]
    NotFound(TournamentId),

    #[error("Tournament is full")]
    TournamentFull,

    #[error("Participant already registered")]
    AlreadyRegistered,

    #[error("Registration is not open: status is {0}")]
    RegistrationClosed(TournamentStatus),

    #[error("Participant not found: {0}")]
    ParticipantNotFound(ParticipantId),

    #[error("Bracket already generated for tournament {0}")]
    BracketLocked(TournamentId),

    #[error("Cannot move tournament from {from} to {to}")]
    InvalidTransition {
        from: TournamentStatus,
        to: TournamentStatus,
    },

    #[error("Tournament name must not be empty")]
    EmptyName,

    #[error("Capacity must be between 2 and {max}, got {requested}")]
    InvalidCapacity { requested: u32, max: u32 },

    #[error("Storage error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for TournamentError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::BracketExists(id) => TournamentError::BracketLocked(id),
            other => TournamentError::Store(other),
        }
    }
}

impl TournamentError {
    /// Client-safe error message
    pub fn client_message(&self) -> String {
        match self {
            TournamentError::Store(e) => e.client_message(),
            _ => self.to_string(),
        }
    }
}

pub type TournamentResult<T> = Result<T, TournamentError>;

/// Tournament manager
#[derive(Clone)]
pub struct TournamentManager {
    repo: Arc<dyn TournamentRepository>,
}

impl TournamentManager {
    /// Create a new tournament manager
    pub fn new(repo: Arc<dyn TournamentRepository>) -> Self {
        Self { repo }
    }

    /// Create a new tournament in `draft`
    pub async fn create_tournament(&self, tournament: NewTournament) -> TournamentResult<Tournament> {
        if tournament.name.trim().is_empty() {
            return Err(TournamentError::EmptyName);
        }

        let max = MAX_PARTICIPANTS as u32;
        if !(2..=max).contains(&tournament.max_participants) {
            return Err(TournamentError::InvalidCapacity {
                requested: tournament.max_participants,
                max,
            });
        }

        let created = self.repo.create_tournament(&tournament).await?;
        log::info!(
            "Created {} tournament {} ({}) for up to {} participants",
            created.format,
            created.id,
            created.name,
            created.max_participants
        );
        Ok(created)
    }

    /// Get tournament by ID
    pub async fn get_tournament(&self, tournament_id: TournamentId) -> TournamentResult<Tournament> {
        self.repo
            .get_tournament(tournament_id)
            .await?
            .ok_or(TournamentError::NotFound(tournament_id))
    }

    /// Move a tournament along its lifecycle.
    ///
    /// Moving to `cancelled` also cancels every open match of its bracket.
    pub async fn set_status(
        &self,
        tournament_id: TournamentId,
        status: TournamentStatus,
    ) -> TournamentResult<Tournament> {
        let (tournament, _) = self.transition(tournament_id, status).await?;
        Ok(tournament)
    }

    /// Cancel a tournament and its open matches, returns how many matches were cancelled
    pub async fn cancel_tournament(&self, tournament_id: TournamentId) -> TournamentResult<u64> {
        let (_, cancelled) = self
            .transition(tournament_id, TournamentStatus::Cancelled)
            .await?;
        Ok(cancelled)
    }

    async fn transition(
        &self,
        tournament_id: TournamentId,
        status: TournamentStatus,
    ) -> TournamentResult<(Tournament, u64)> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let mut tournament = self.get_tournament(tournament_id).await?;

            if !tournament.status.can_transition_to(status) {
                return Err(TournamentError::InvalidTransition {
                    from: tournament.status,
                    to: status,
                });
            }

            let changed = self
                .repo
                .set_status(tournament_id, tournament.status, status)
                .await?;
            let Some(cancelled) = changed else {
                if attempt < TRANSITION_ATTEMPTS {
                    log::debug!(
                        "Tournament {} changed status while moving to {}, retrying",
                        tournament_id,
                        status
                    );
                    continue;
                }
                let current = self.get_tournament(tournament_id).await?;
                return Err(TournamentError::InvalidTransition {
                    from: current.status,
                    to: status,
                });
            };

            log::info!(
                "Tournament {} moved from {} to {}",
                tournament_id,
                tournament.status,
                status
            );
            if cancelled > 0 {
                log::info!(
                    "Cancelled {} open matches in tournament {}",
                    cancelled,
                    tournament_id
                );
            }
            tournament.status = status;
            return Ok((tournament, cancelled));
        }
    }

    /// Register a user or team
    pub async fn register_participant(
        &self,
        tournament_id: TournamentId,
        entrant: Entrant,
    ) -> TournamentResult<Participant> {
        match self.repo.add_participant(tournament_id, &entrant).await? {
            RegistrationOutcome::Added(participant) => {
                log::info!(
                    "Registered participant {} in tournament {} at position {}",
                    participant.id,
                    tournament_id,
                    participant.position
                );
                Ok(participant)
            }
            RegistrationOutcome::AlreadyRegistered => Err(TournamentError::AlreadyRegistered),
            RegistrationOutcome::Full => Err(TournamentError::TournamentFull),
            RegistrationOutcome::Closed(status) => Err(TournamentError::RegistrationClosed(status)),
            RegistrationOutcome::TournamentMissing => Err(TournamentError::NotFound(tournament_id)),
        }
    }

    /// Withdraw a participant while registration is open
    pub async fn withdraw_participant(
        &self,
        tournament_id: TournamentId,
        participant_id: ParticipantId,
    ) -> TournamentResult<()> {
        let tournament = self.get_tournament(tournament_id).await?;

        if tournament.status != TournamentStatus::RegistrationOpen {
            return Err(TournamentError::RegistrationClosed(tournament.status));
        }

        if !self
            .repo
            .remove_participant(tournament_id, participant_id)
            .await?
        {
            return Err(TournamentError::ParticipantNotFound(participant_id));
        }

        log::info!(
            "Participant {} withdrew from tournament {}",
            participant_id,
            tournament_id
        );
        Ok(())
    }

    /// Confirmed participants in join order
    pub async fn list_participants(
        &self,
        tournament_id: TournamentId,
    ) -> TournamentResult<Vec<Participant>> {
        self.get_tournament(tournament_id).await?;
        Ok(self.repo.list_confirmed_participants(tournament_id).await?)
    }
}
