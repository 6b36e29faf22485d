//! Match and bracket data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::tournament::{ParticipantId, TournamentFormat, TournamentId, UnknownVariant};

/// Match ID type
pub type MatchId = Uuid;

/// Match state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::InProgress => "in_progress",
            MatchStatus::Completed => "completed",
            MatchStatus::Cancelled => "cancelled",
        }
    }

    /// Scheduled or in progress
    pub fn is_open(&self) -> bool {
        matches!(self, MatchStatus::Scheduled | MatchStatus::InProgress)
    }

    /// `scheduled -> in_progress -> completed`, plus cancellation of any open match.
    pub fn can_transition_to(&self, next: MatchStatus) -> bool {
        match (self, next) {
            (MatchStatus::Scheduled, MatchStatus::InProgress) => true,
            (from, MatchStatus::Completed | MatchStatus::Cancelled) => from.is_open(),
            _ => false,
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(MatchStatus::Scheduled),
            "in_progress" => Ok(MatchStatus::InProgress),
            "completed" => Ok(MatchStatus::Completed),
            "cancelled" => Ok(MatchStatus::Cancelled),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// One of the two occupant positions of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    One,
    Two,
}

impl Slot {
    /// Slot that the winner of bracket position `position` (1-indexed) lands in
    /// on the next round. Odd positions feed slot one, even positions slot two.
    pub fn for_position(position: u32) -> Slot {
        if position % 2 == 1 { Slot::One } else { Slot::Two }
    }

    /// Storage column backing this slot
    pub fn column(&self) -> &'static str {
        match self {
            Slot::One => "participant1_id",
            Slot::Two => "participant2_id",
        }
    }
}

/// A single match in a tournament bracket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    /// 1-indexed, round 1 is played first
    pub round: u32,
    /// 1-indexed, left to right within the round
    pub match_number: u32,
    pub participant1_id: Option<ParticipantId>,
    pub participant2_id: Option<ParticipantId>,
    pub winner_id: Option<ParticipantId>,
    pub status: MatchStatus,
    pub score1: Option<i32>,
    pub score2: Option<i32>,
    /// Completed without being played
    pub is_bye: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Match {
    /// Empty scheduled match at the given bracket position
    pub fn placeholder(
        tournament_id: TournamentId,
        round: u32,
        match_number: u32,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            round,
            match_number,
            participant1_id: None,
            participant2_id: None,
            winner_id: None,
            status: MatchStatus::Scheduled,
            score1: None,
            score2: None,
            is_bye: false,
            started_at: None,
            completed_at: None,
            created_at,
        }
    }

    pub fn occupant(&self, slot: Slot) -> Option<ParticipantId> {
        match slot {
            Slot::One => self.participant1_id,
            Slot::Two => self.participant2_id,
        }
    }

    pub fn set_occupant(&mut self, slot: Slot, participant_id: Option<ParticipantId>) {
        match slot {
            Slot::One => self.participant1_id = participant_id,
            Slot::Two => self.participant2_id = participant_id,
        }
    }

    pub fn has_participant(&self, participant_id: ParticipantId) -> bool {
        self.participant1_id == Some(participant_id) || self.participant2_id == Some(participant_id)
    }

    /// Both slots are occupied
    pub fn is_ready(&self) -> bool {
        self.participant1_id.is_some() && self.participant2_id.is_some()
    }

    /// Applies a completion in memory
    pub fn complete(&mut self, result: &MatchResult) {
        self.status = MatchStatus::Completed;
        self.winner_id = Some(result.winner_id);
        self.score1 = result.score1;
        self.score2 = result.score2;
        self.is_bye = result.is_bye;
        self.completed_at = Some(result.completed_at);
    }
}

/// Values written when a match completes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub winner_id: ParticipantId,
    pub score1: Option<i32>,
    pub score2: Option<i32>,
    pub is_bye: bool,
    pub completed_at: DateTime<Utc>,
}

impl MatchResult {
    pub fn played(
        winner_id: ParticipantId,
        score1: i32,
        score2: i32,
        completed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            winner_id,
            score1: Some(score1),
            score2: Some(score2),
            is_bye: false,
            completed_at,
        }
    }

    pub fn bye(winner_id: ParticipantId, completed_at: DateTime<Utc>) -> Self {
        Self {
            winner_id,
            score1: None,
            score2: None,
            is_bye: true,
            completed_at,
        }
    }
}

/// Stored header of a generated bracket. One per tournament.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketRecord {
    pub tournament_id: TournamentId,
    pub format: TournamentFormat,
    /// Entrant count the shape was computed from
    pub participant_count: u32,
    pub total_rounds: u32,
    pub created_at: DateTime<Utc>,
}

/// What generation produced, returned to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketSummary {
    pub tournament_id: TournamentId,
    pub participant_count: u32,
    pub total_rounds: u32,
    /// Match rows per round, index 0 = round 1
    pub matches_per_round: Vec<u32>,
    pub match_count: usize,
    /// Participant that skipped round 1, if the field was odd
    pub bye_participant: Option<ParticipantId>,
    /// Later-round bye matches already resolved at creation
    pub auto_advanced: usize,
}
