//! Winner propagation through a bracket.
//!
//! Advancement is computed against a snapshot of the bracket and expressed as
//! a list of row-scoped steps, so a store can apply a whole report in one
//! transaction without rewriting rows it does not own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::{Match, MatchId, MatchResult, MatchStatus, Slot};
use super::planner::BracketLayout;
use crate::tournament::{ParticipantId, TournamentId};

/// A single write caused by a winner moving forward
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdvanceStep {
    /// Put a participant into one slot of a later match
    FillSlot {
        match_id: MatchId,
        slot: Slot,
        participant_id: ParticipantId,
    },
    /// Resolve a single-feeder match in favour of its only occupant
    CompleteBye {
        match_id: MatchId,
        winner_id: ParticipantId,
    },
    /// The final was decided
    Champion { participant_id: ParticipantId },
}

/// Everything one result report writes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultPlan {
    pub tournament_id: TournamentId,
    pub match_id: MatchId,
    pub result: MatchResult,
    pub advancement: Vec<AdvanceStep>,
}

impl ResultPlan {
    pub fn champion(&self) -> Option<ParticipantId> {
        self.advancement.iter().find_map(|step| match step {
            AdvanceStep::Champion { participant_id } => Some(*participant_id),
            _ => None,
        })
    }
}

/// A position the layout expects has no row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingMatch {
    pub round: u32,
    pub match_number: u32,
}

fn find_match(matches: &[Match], round: u32, match_number: u32) -> Result<&Match, MissingMatch> {
    matches
        .iter()
        .find(|m| m.round == round && m.match_number == match_number)
        .ok_or(MissingMatch {
            round,
            match_number,
        })
}

/// Steps that carry `winner` forward from a bracket position.
///
/// Follows bye matches until the winner reaches a match that still needs a
/// second opponent, or records a champion when the position is the final.
pub fn advance_from(
    layout: &BracketLayout,
    matches: &[Match],
    round: u32,
    match_number: u32,
    winner: ParticipantId,
) -> Result<Vec<AdvanceStep>, MissingMatch> {
    let mut steps = Vec::new();
    let (mut round, mut match_number) = (round, match_number);

    loop {
        let Some(target) = layout.next_slot(round, match_number) else {
            steps.push(AdvanceStep::Champion {
                participant_id: winner,
            });
            break;
        };

        let next = find_match(matches, target.round, target.match_number)?;
        steps.push(AdvanceStep::FillSlot {
            match_id: next.id,
            slot: target.slot,
            participant_id: winner,
        });

        if !layout.is_bye_match(target.round, target.match_number) {
            break;
        }

        log::debug!(
            "Participant {} advances through bye match {} (round {})",
            winner,
            next.id,
            target.round
        );
        steps.push(AdvanceStep::CompleteBye {
            match_id: next.id,
            winner_id: winner,
        });
        round = target.round;
        match_number = target.match_number;
    }

    Ok(steps)
}

/// Apply steps to an in-memory bracket. Champion steps do not touch matches.
pub fn apply_steps(matches: &mut [Match], steps: &[AdvanceStep], now: DateTime<Utc>) {
    for step in steps {
        match step {
            AdvanceStep::FillSlot {
                match_id,
                slot,
                participant_id,
            } => {
                if let Some(m) = matches.iter_mut().find(|m| m.id == *match_id) {
                    m.set_occupant(*slot, Some(*participant_id));
                }
            }
            AdvanceStep::CompleteBye {
                match_id,
                winner_id,
            } => {
                if let Some(m) = matches.iter_mut().find(|m| m.id == *match_id) {
                    m.complete(&MatchResult::bye(*winner_id, now));
                }
            }
            AdvanceStep::Champion { .. } => {}
        }
    }
}

/// Steps a bracket is missing given its completed matches.
///
/// Used to repair a bracket whose advancement writes were lost. Slots already
/// holding a participant are never overwritten.
pub fn missing_advancements(
    layout: &BracketLayout,
    matches: &[Match],
    now: DateTime<Utc>,
) -> Result<Vec<AdvanceStep>, MissingMatch> {
    let mut working = matches.to_vec();
    working.sort_by_key(|m| (m.round, m.match_number));

    let mut steps = Vec::new();

    for index in 0..working.len() {
        let (round, match_number) = (working[index].round, working[index].match_number);

        if layout.is_bye_match(round, match_number)
            && working[index].status == MatchStatus::Scheduled
        {
            if let Some(occupant) = working[index].participant1_id {
                working[index].complete(&MatchResult::bye(occupant, now));
                steps.push(AdvanceStep::CompleteBye {
                    match_id: working[index].id,
                    winner_id: occupant,
                });
            }
        }

        if working[index].status != MatchStatus::Completed {
            continue;
        }
        let Some(winner) = working[index].winner_id else {
            continue;
        };

        let Some(target) = layout.next_slot(round, match_number) else {
            steps.push(AdvanceStep::Champion {
                participant_id: winner,
            });
            continue;
        };

        let target_index = working
            .iter()
            .position(|m| m.round == target.round && m.match_number == target.match_number)
            .ok_or(MissingMatch {
                round: target.round,
                match_number: target.match_number,
            })?;

        let next = &mut working[target_index];
        if next.occupant(target.slot).is_none() {
            next.set_occupant(target.slot, Some(winner));
            steps.push(AdvanceStep::FillSlot {
                match_id: next.id,
                slot: target.slot,
                participant_id: winner,
            });
        }
    }

    Ok(steps)
}
