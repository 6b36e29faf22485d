//! Tournament and participant data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Tournament ID type
pub type TournamentId = Uuid;

/// Participant ID type (a tournament registration, not a user)
pub type ParticipantId = Uuid;

/// Team ID type
pub type TeamId = Uuid;

/// User ID type (OAuth subject)
pub type UserId = String;

/// Tournament format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentFormat {
    SingleElimination,
    DoubleElimination,
    RoundRobin,
    Swiss,
}

impl TournamentFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            TournamentFormat::SingleElimination => "single_elimination",
            TournamentFormat::DoubleElimination => "double_elimination",
            TournamentFormat::RoundRobin => "round_robin",
            TournamentFormat::Swiss => "swiss",
        }
    }
}

impl fmt::Display for TournamentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TournamentFormat {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single_elimination" => Ok(TournamentFormat::SingleElimination),
            "double_elimination" => Ok(TournamentFormat::DoubleElimination),
            "round_robin" => Ok(TournamentFormat::RoundRobin),
            "swiss" => Ok(TournamentFormat::Swiss),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// Tournament lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    /// Created, not yet visible for sign-ups
    Draft,
    /// Accepting registrations
    RegistrationOpen,
    /// Registrations frozen, bracket not started
    RegistrationClosed,
    /// Matches are being played
    InProgress,
    /// A champion has been decided
    Completed,
    /// Tournament cancelled
    Cancelled,
}

impl TournamentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TournamentStatus::Draft => "draft",
            TournamentStatus::RegistrationOpen => "registration_open",
            TournamentStatus::RegistrationClosed => "registration_closed",
            TournamentStatus::InProgress => "in_progress",
            TournamentStatus::Completed => "completed",
            TournamentStatus::Cancelled => "cancelled",
        }
    }

    /// Whether play has not started yet. Brackets can only be generated here.
    pub fn is_pre_start(&self) -> bool {
        matches!(
            self,
            TournamentStatus::Draft
                | TournamentStatus::RegistrationOpen
                | TournamentStatus::RegistrationClosed
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TournamentStatus::Completed | TournamentStatus::Cancelled)
    }

    /// Allowed lifecycle moves. Any non-terminal state may be cancelled.
    pub fn can_transition_to(&self, next: TournamentStatus) -> bool {
        use TournamentStatus::*;

        match (self, next) {
            (from, Cancelled) => !from.is_terminal(),
            (Draft, RegistrationOpen)
            | (RegistrationOpen, RegistrationClosed)
            | (RegistrationClosed, RegistrationOpen)
            | (RegistrationClosed, InProgress)
            | (InProgress, Completed) => true,
            _ => false,
        }
    }
}

impl fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TournamentStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(TournamentStatus::Draft),
            "registration_open" => Ok(TournamentStatus::RegistrationOpen),
            "registration_closed" => Ok(TournamentStatus::RegistrationClosed),
            "in_progress" => Ok(TournamentStatus::InProgress),
            "completed" => Ok(TournamentStatus::Completed),
            "cancelled" => Ok(TournamentStatus::Cancelled),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// Returned when a stored enum column holds an unexpected value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown variant: {0}")]
pub struct UnknownVariant(pub String);

/// Who is entered into a tournament: a single player or a team.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Entrant {
    User(UserId),
    Team(TeamId),
}

impl Entrant {
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Entrant::User(id) => Some(id),
            Entrant::Team(_) => None,
        }
    }

    pub fn team_id(&self) -> Option<TeamId> {
        match self {
            Entrant::User(_) => None,
            Entrant::Team(id) => Some(*id),
        }
    }
}

/// Confirmed tournament participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub tournament_id: TournamentId,
    pub entrant: Entrant,
    /// Join order (1-indexed). Seeding follows this order.
    pub position: u32,
    pub joined_at: DateTime<Utc>,
}

/// Tournament record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub format: TournamentFormat,
    pub status: TournamentStatus,
    pub max_participants: u32,
    /// Recomputed from participant rows on every join/leave
    pub current_participants: u32,
    pub champion_id: Option<ParticipantId>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTournament {
    pub name: String,
    pub format: TournamentFormat,
    pub max_participants: u32,
}

impl NewTournament {
    /// Single-elimination tournament with the given capacity
    pub fn single_elimination(name: impl Into<String>, max_participants: u32) -> Self {
        Self {
            name: name.into(),
            format: TournamentFormat::SingleElimination,
            max_participants,
        }
    }
}

/// Outcome of a registration attempt, decided inside the store's transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Added(Participant),
    AlreadyRegistered,
    Full,
    Closed(TournamentStatus),
    TournamentMissing,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_round_trips_through_str() {
        for format in [
            TournamentFormat::SingleElimination,
            TournamentFormat::DoubleElimination,
            TournamentFormat::RoundRobin,
            TournamentFormat::Swiss,
        ] {
            assert_eq!(format.as_str().parse::<TournamentFormat>(), Ok(format));
        }
        assert!("ladder".parse::<TournamentFormat>().is_err());
    }

    #[test]
    fn test_pre_start_statuses() {
        assert!(TournamentStatus::Draft.is_pre_start());
        assert!(TournamentStatus::RegistrationOpen.is_pre_start());
        assert!(TournamentStatus::RegistrationClosed.is_pre_start());
        assert!(!TournamentStatus::InProgress.is_pre_start());
        assert!(!TournamentStatus::Completed.is_pre_start());
        assert!(!TournamentStatus::Cancelled.is_pre_start());
    }

    #[test]
    fn test_status_transitions() {
        use TournamentStatus::*;

        assert!(Draft.can_transition_to(RegistrationOpen));
        assert!(RegistrationOpen.can_transition_to(RegistrationClosed));
        assert!(RegistrationClosed.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Completed));
        assert!(InProgress.can_transition_to(Cancelled));

        assert!(!Draft.can_transition_to(InProgress));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(RegistrationOpen));
    }

    #[test]
    fn test_entrant_serializes_as_tagged_union() {
        let user = Entrant::User("oauth|42".to_string());
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["kind"], "user");
        assert_eq!(json["id"], "oauth|42");

        assert_eq!(user.user_id(), Some("oauth|42"));
        assert_eq!(user.team_id(), None);
    }
}
