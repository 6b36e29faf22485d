//! In-process store with the same atomicity guarantees as the PostgreSQL one.
//!
//! Every operation holds a single mutex for its whole duration and validates
//! all guarded writes before applying any of them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::errors::{StoreError, StoreResult};
use super::repository::{BracketRepository, TournamentRepository};
use crate::bracket::{
    AdvanceStep, BracketPlan, BracketRecord, Match, MatchId, MatchResult, MatchStatus,
    ResultPlan, Slot,
};
use crate::tournament::{
    Entrant, NewTournament, Participant, ParticipantId, RegistrationOutcome, Tournament,
    TournamentId, TournamentStatus,
};

#[derive(Default)]
struct State {
    tournaments: HashMap<TournamentId, Tournament>,
    participants: HashMap<TournamentId, Vec<Participant>>,
    brackets: HashMap<TournamentId, BracketRecord>,
    matches: HashMap<MatchId, Match>,
}

impl State {
    fn recount(&mut self, tournament_id: TournamentId) {
        let count = self
            .participants
            .get(&tournament_id)
            .map_or(0, |list| list.len() as u32);
        if let Some(tournament) = self.tournaments.get_mut(&tournament_id) {
            tournament.current_participants = count;
        }
    }

    fn slot_accepts(m: &Match, slot: Slot, participant_id: ParticipantId) -> bool {
        m.occupant(slot).is_none() || m.occupant(slot) == Some(participant_id)
    }

    fn cancel_open_matches(&mut self, tournament_id: TournamentId) -> u64 {
        let mut cancelled = 0;
        for m in self.matches.values_mut() {
            if m.tournament_id == tournament_id && m.status.is_open() {
                m.status = MatchStatus::Cancelled;
                cancelled += 1;
            }
        }
        cancelled
    }

    fn is_closed(&self, tournament_id: TournamentId) -> bool {
        self.tournaments
            .get(&tournament_id)
            .is_some_and(|t| t.status.is_terminal())
    }
}

/// Store backed by process memory
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl TournamentRepository for MemoryStore {
    async fn create_tournament(&self, tournament: &NewTournament) -> StoreResult<Tournament> {
        let created = Tournament {
            id: Uuid::new_v4(),
            name: tournament.name.clone(),
            format: tournament.format,
            status: TournamentStatus::Draft,
            max_participants: tournament.max_participants,
            current_participants: 0,
            champion_id: None,
            created_at: Utc::now(),
        };

        self.lock().tournaments.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_tournament(&self, tournament_id: TournamentId) -> StoreResult<Option<Tournament>> {
        Ok(self.lock().tournaments.get(&tournament_id).cloned())
    }

    async fn set_status(
        &self,
        tournament_id: TournamentId,
        from: TournamentStatus,
        to: TournamentStatus,
    ) -> StoreResult<Option<u64>> {
        let mut state = self.lock();
        match state.tournaments.get_mut(&tournament_id) {
            Some(tournament) if tournament.status == from => tournament.status = to,
            _ => return Ok(None),
        }

        if to == TournamentStatus::Cancelled {
            return Ok(Some(state.cancel_open_matches(tournament_id)));
        }
        Ok(Some(0))
    }

    async fn add_participant(
        &self,
        tournament_id: TournamentId,
        entrant: &Entrant,
    ) -> StoreResult<RegistrationOutcome> {
        let mut state = self.lock();

        let Some(tournament) = state.tournaments.get(&tournament_id) else {
            return Ok(RegistrationOutcome::TournamentMissing);
        };
        if tournament.status != TournamentStatus::RegistrationOpen {
            return Ok(RegistrationOutcome::Closed(tournament.status));
        }
        let capacity = tournament.max_participants as usize;
        if state.brackets.contains_key(&tournament_id) {
            return Err(StoreError::BracketExists(tournament_id));
        }

        let list = state.participants.entry(tournament_id).or_default();
        if list.iter().any(|p| &p.entrant == entrant) {
            return Ok(RegistrationOutcome::AlreadyRegistered);
        }
        if list.len() >= capacity {
            return Ok(RegistrationOutcome::Full);
        }

        let participant = Participant {
            id: Uuid::new_v4(),
            tournament_id,
            entrant: entrant.clone(),
            position: list.iter().map(|p| p.position).max().unwrap_or(0) + 1,
            joined_at: Utc::now(),
        };
        list.push(participant.clone());
        state.recount(tournament_id);

        Ok(RegistrationOutcome::Added(participant))
    }

    async fn remove_participant(
        &self,
        tournament_id: TournamentId,
        participant_id: ParticipantId,
    ) -> StoreResult<bool> {
        let mut state = self.lock();

        if state.brackets.contains_key(&tournament_id) {
            return Err(StoreError::BracketExists(tournament_id));
        }

        let removed = match state.participants.get_mut(&tournament_id) {
            Some(list) => {
                let before = list.len();
                list.retain(|p| p.id != participant_id);
                list.len() != before
            }
            None => false,
        };
        state.recount(tournament_id);

        Ok(removed)
    }

    async fn list_confirmed_participants(
        &self,
        tournament_id: TournamentId,
    ) -> StoreResult<Vec<Participant>> {
        let mut list = self
            .lock()
            .participants
            .get(&tournament_id)
            .cloned()
            .unwrap_or_default();
        list.sort_by_key(|p| p.position);
        Ok(list)
    }
}

#[async_trait]
impl BracketRepository for MemoryStore {
    async fn get_bracket(&self, tournament_id: TournamentId) -> StoreResult<Option<BracketRecord>> {
        Ok(self.lock().brackets.get(&tournament_id).cloned())
    }

    async fn insert_bracket(&self, plan: &BracketPlan) -> StoreResult<Vec<Match>> {
        let mut state = self.lock();
        let tournament_id = plan.record.tournament_id;

        if state.brackets.contains_key(&tournament_id)
            || state.matches.values().any(|m| m.tournament_id == tournament_id)
        {
            return Err(StoreError::BracketExists(tournament_id));
        }

        let seeded = plan.seeded_participants();
        let unseeded = state
            .participants
            .get(&tournament_id)
            .is_some_and(|list| list.iter().any(|p| !seeded.contains(&p.id)));
        if unseeded {
            return Err(StoreError::ParticipantsChanged(tournament_id));
        }

        state.brackets.insert(tournament_id, plan.record.clone());
        for m in &plan.matches {
            state.matches.insert(m.id, m.clone());
        }

        Ok(plan.matches.clone())
    }

    async fn get_match(&self, match_id: MatchId) -> StoreResult<Option<Match>> {
        Ok(self.lock().matches.get(&match_id).cloned())
    }

    async fn list_matches(&self, tournament_id: TournamentId) -> StoreResult<Vec<Match>> {
        let mut list: Vec<Match> = self
            .lock()
            .matches
            .values()
            .filter(|m| m.tournament_id == tournament_id)
            .cloned()
            .collect();
        list.sort_by_key(|m| (m.round, m.match_number));
        Ok(list)
    }

    async fn update_match_slot(
        &self,
        match_id: MatchId,
        slot: Slot,
        participant_id: ParticipantId,
    ) -> StoreResult<bool> {
        let mut state = self.lock();
        let m = state
            .matches
            .get_mut(&match_id)
            .ok_or(StoreError::MatchMissing(match_id))?;

        if !State::slot_accepts(m, slot, participant_id) {
            return Ok(false);
        }
        m.set_occupant(slot, Some(participant_id));
        Ok(true)
    }

    async fn update_match_result(
        &self,
        match_id: MatchId,
        result: &MatchResult,
    ) -> StoreResult<bool> {
        let mut state = self.lock();
        let m = state
            .matches
            .get_mut(&match_id)
            .ok_or(StoreError::MatchMissing(match_id))?;

        if !m.status.is_open() {
            return Ok(false);
        }
        m.complete(result);
        Ok(true)
    }

    async fn start_match(
        &self,
        match_id: MatchId,
        started_at: DateTime<Utc>,
    ) -> StoreResult<Option<Match>> {
        let mut state = self.lock();
        let m = state
            .matches
            .get_mut(&match_id)
            .ok_or(StoreError::MatchMissing(match_id))?;

        if m.status != MatchStatus::Scheduled {
            return Ok(None);
        }
        m.status = MatchStatus::InProgress;
        m.started_at = Some(started_at);
        Ok(Some(m.clone()))
    }

    async fn apply_result(&self, plan: &ResultPlan) -> StoreResult<Match> {
        let mut state = self.lock();

        // Validate every guarded write first so a failure leaves nothing behind
        match state.matches.get(&plan.match_id) {
            Some(m) if m.status.is_open() => {}
            Some(_) => return Err(StoreError::StaleMatch(plan.match_id)),
            None => return Err(StoreError::MatchMissing(plan.match_id)),
        }
        for step in &plan.advancement {
            match step {
                AdvanceStep::FillSlot {
                    match_id,
                    slot,
                    participant_id,
                } => {
                    let m = state
                        .matches
                        .get(match_id)
                        .ok_or(StoreError::MatchMissing(*match_id))?;
                    if !State::slot_accepts(m, *slot, *participant_id) {
                        return Err(StoreError::StaleMatch(*match_id));
                    }
                }
                AdvanceStep::CompleteBye { match_id, .. } => {
                    let m = state
                        .matches
                        .get(match_id)
                        .ok_or(StoreError::MatchMissing(*match_id))?;
                    if m.status != MatchStatus::Scheduled {
                        return Err(StoreError::StaleMatch(*match_id));
                    }
                }
                AdvanceStep::Champion { .. } => {
                    if state.is_closed(plan.tournament_id) {
                        return Err(StoreError::TournamentClosed(plan.tournament_id));
                    }
                }
            }
        }

        for step in &plan.advancement {
            match step {
                AdvanceStep::FillSlot {
                    match_id,
                    slot,
                    participant_id,
                } => {
                    if let Some(m) = state.matches.get_mut(match_id) {
                        m.set_occupant(*slot, Some(*participant_id));
                    }
                }
                AdvanceStep::CompleteBye {
                    match_id,
                    winner_id,
                } => {
                    if let Some(m) = state.matches.get_mut(match_id) {
                        m.complete(&MatchResult::bye(*winner_id, plan.result.completed_at));
                    }
                }
                AdvanceStep::Champion { participant_id } => {
                    if let Some(tournament) = state.tournaments.get_mut(&plan.tournament_id) {
                        tournament.champion_id = Some(*participant_id);
                        tournament.status = TournamentStatus::Completed;
                    }
                }
            }
        }

        let completed = state
            .matches
            .get_mut(&plan.match_id)
            .ok_or(StoreError::MatchMissing(plan.match_id))?;
        completed.complete(&plan.result);
        Ok(completed.clone())
    }

    async fn set_champion(
        &self,
        tournament_id: TournamentId,
        participant_id: ParticipantId,
    ) -> StoreResult<bool> {
        match self.lock().tournaments.get_mut(&tournament_id) {
            Some(tournament)
                if tournament.champion_id.is_none() && !tournament.status.is_terminal() =>
            {
                tournament.champion_id = Some(participant_id);
                tournament.status = TournamentStatus::Completed;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn cancel_open_matches(&self, tournament_id: TournamentId) -> StoreResult<u64> {
        Ok(self.lock().cancel_open_matches(tournament_id))
    }
}
