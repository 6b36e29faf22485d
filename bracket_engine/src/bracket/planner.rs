//! Single-elimination bracket shape and round-1 seeding.
//!
//! Positions are derived, not stored: match `k` of round `r` is fed by bracket
//! positions `2k-1` (slot one) and `2k` (slot two) of round `r-1`. Round 0 is
//! the ordered participant list itself. Round `r` has `ceil(N / 2^r)` positions;
//! a position in round 1 without a partner is the bye and gets no match row.

use chrono::{DateTime, Utc};
use std::collections::HashSet;

use super::advancement::{AdvanceStep, MissingMatch, advance_from, apply_steps};
use super::errors::{GenerationError, GenerationResult};
use super::models::{BracketRecord, BracketSummary, Match, Slot};
use crate::tournament::{ParticipantId, TournamentFormat, TournamentId};

/// Fewest entrants a bracket can be built for
pub const MIN_PARTICIPANTS: usize = 2;

/// Upper bound on entrants, keeps a bracket insert within one statement
pub const MAX_PARTICIPANTS: usize = 4096;

/// A slot at a concrete bracket position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotRef {
    pub round: u32,
    pub match_number: u32,
    pub slot: Slot,
}

/// Shape of a single-elimination bracket for a given field size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BracketLayout {
    participant_count: u32,
}

impl BracketLayout {
    pub fn new(participant_count: u32) -> Self {
        Self { participant_count }
    }

    pub fn participant_count(&self) -> u32 {
        self.participant_count
    }

    /// `ceil(log2(N))`
    pub fn total_rounds(&self) -> u32 {
        match self.participant_count {
            0 | 1 => 0,
            n => u32::BITS - (n - 1).leading_zeros(),
        }
    }

    /// Bracket positions in a round, `ceil(N / 2^round)`. Round 0 is the field.
    pub fn positions_in_round(&self, round: u32) -> u32 {
        if round == 0 {
            return self.participant_count;
        }
        if round > self.total_rounds() {
            return 0;
        }
        u64::from(self.participant_count).div_ceil(1u64 << round) as u32
    }

    /// Stored match rows in a round. Round 1 has no row for the bye.
    pub fn matches_in_round(&self, round: u32) -> u32 {
        if round == 1 {
            self.participant_count / 2
        } else {
            self.positions_in_round(round)
        }
    }

    pub fn match_count(&self) -> u32 {
        (1..=self.total_rounds())
            .map(|round| self.matches_in_round(round))
            .sum()
    }

    /// Round-1 position of the unpaired participant when N is odd
    pub fn bye_position(&self) -> Option<u32> {
        (self.participant_count > 1 && self.participant_count % 2 == 1)
            .then(|| self.participant_count.div_ceil(2))
    }

    /// Whether a previous-round position exists to fill this slot
    pub fn has_feeder(&self, round: u32, match_number: u32, slot: Slot) -> bool {
        if round == 0 || match_number == 0 {
            return false;
        }
        let position = match slot {
            Slot::One => 2 * match_number - 1,
            Slot::Two => 2 * match_number,
        };
        position <= self.positions_in_round(round - 1)
    }

    /// A later-round match with a single feeder. Its occupant advances unplayed.
    pub fn is_bye_match(&self, round: u32, match_number: u32) -> bool {
        round > 1
            && self.has_feeder(round, match_number, Slot::One)
            && !self.has_feeder(round, match_number, Slot::Two)
    }

    /// Where the winner of a position goes, `None` for the final
    pub fn next_slot(&self, round: u32, match_number: u32) -> Option<SlotRef> {
        if round >= self.total_rounds() {
            return None;
        }
        Some(SlotRef {
            round: round + 1,
            match_number: match_number.div_ceil(2),
            slot: Slot::for_position(match_number),
        })
    }

    pub fn is_final(&self, round: u32) -> bool {
        round == self.total_rounds()
    }
}

/// Complete set of rows for a new bracket, ready for one atomic insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketPlan {
    pub record: BracketRecord,
    /// Ordered by (round, match_number)
    pub matches: Vec<Match>,
    pub bye_participant: Option<ParticipantId>,
    /// Bye matches resolved while planning
    pub auto_advanced: usize,
}

impl BracketPlan {
    pub fn layout(&self) -> BracketLayout {
        BracketLayout::new(self.record.participant_count)
    }

    /// Every participant seeded into round 1, the bye included
    pub fn seeded_participants(&self) -> HashSet<ParticipantId> {
        self.matches
            .iter()
            .filter(|m| m.round == 1)
            .flat_map(|m| [m.participant1_id, m.participant2_id])
            .flatten()
            .chain(self.bye_participant)
            .collect()
    }

    pub fn summary(&self) -> BracketSummary {
        let layout = self.layout();

        BracketSummary {
            tournament_id: self.record.tournament_id,
            participant_count: self.record.participant_count,
            total_rounds: self.record.total_rounds,
            matches_per_round: (1..=layout.total_rounds())
                .map(|round| layout.matches_in_round(round))
                .collect(),
            match_count: self.matches.len(),
            bye_participant: self.bye_participant,
            auto_advanced: self.auto_advanced,
        }
    }
}

/// Build the full bracket for an ordered participant list.
///
/// Round 1 pairs participants in input order. An odd last participant skips
/// round 1 and is written straight into its round-2 slot; bye matches that
/// become decided that way are completed immediately.
///
/// # Errors
///
/// * `GenerationError::UnsupportedFormat` - anything but single elimination
/// * `GenerationError::InsufficientParticipants` - fewer than two entrants
/// * `GenerationError::DuplicateParticipant` - an id appears twice
pub fn plan_bracket(
    tournament_id: TournamentId,
    participants: &[ParticipantId],
    format: TournamentFormat,
    now: DateTime<Utc>,
) -> GenerationResult<BracketPlan> {
    if format != TournamentFormat::SingleElimination {
        return Err(GenerationError::UnsupportedFormat(format));
    }

    if participants.len() < MIN_PARTICIPANTS {
        return Err(GenerationError::InsufficientParticipants {
            needed: MIN_PARTICIPANTS,
            current: participants.len(),
        });
    }

    if participants.len() > MAX_PARTICIPANTS {
        return Err(GenerationError::TooManyParticipants {
            max: MAX_PARTICIPANTS,
            current: participants.len(),
        });
    }

    let mut seen = HashSet::with_capacity(participants.len());
    for id in participants {
        if !seen.insert(*id) {
            return Err(GenerationError::DuplicateParticipant(*id));
        }
    }

    let layout = BracketLayout::new(participants.len() as u32);
    let mut matches = Vec::with_capacity(layout.match_count() as usize);

    for (index, pair) in participants.chunks_exact(2).enumerate() {
        let mut m = Match::placeholder(tournament_id, 1, index as u32 + 1, now);
        m.participant1_id = Some(pair[0]);
        m.participant2_id = Some(pair[1]);
        matches.push(m);
    }

    for round in 2..=layout.total_rounds() {
        for match_number in 1..=layout.positions_in_round(round) {
            matches.push(Match::placeholder(tournament_id, round, match_number, now));
        }
    }

    let mut bye_participant = None;
    let mut auto_advanced = 0;

    if let (Some(position), Some(&participant_id)) = (layout.bye_position(), participants.last()) {
        let steps = advance_from(&layout, &matches, 1, position, participant_id)?;
        auto_advanced = steps
            .iter()
            .filter(|step| matches!(step, AdvanceStep::CompleteBye { .. }))
            .count();
        apply_steps(&mut matches, &steps, now);
        bye_participant = Some(participant_id);
    }

    Ok(BracketPlan {
        record: BracketRecord {
            tournament_id,
            format,
            participant_count: layout.participant_count(),
            total_rounds: layout.total_rounds(),
            created_at: now,
        },
        matches,
        bye_participant,
        auto_advanced,
    })
}

impl From<MissingMatch> for GenerationError {
    fn from(missing: MissingMatch) -> Self {
        GenerationError::InconsistentBracket {
            round: missing.round,
            match_number: missing.match_number,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::MatchStatus;
    use uuid::Uuid;

    fn ids(n: usize) -> Vec<ParticipantId> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    fn find(plan: &BracketPlan, round: u32, match_number: u32) -> &Match {
        plan.matches
            .iter()
            .find(|m| m.round == round && m.match_number == match_number)
            .unwrap()
    }

    #[test]
    fn test_total_rounds() {
        let expected = [(2, 1), (3, 2), (4, 2), (5, 3), (8, 3), (9, 4), (16, 4), (17, 5)];
        for (n, rounds) in expected {
            assert_eq!(BracketLayout::new(n).total_rounds(), rounds, "N = {n}");
        }
    }

    #[test]
    fn test_positions_per_round() {
        let layout = BracketLayout::new(5);
        assert_eq!(layout.positions_in_round(0), 5);
        assert_eq!(layout.positions_in_round(1), 3);
        assert_eq!(layout.positions_in_round(2), 2);
        assert_eq!(layout.positions_in_round(3), 1);
        assert_eq!(layout.positions_in_round(4), 0);

        assert_eq!(layout.matches_in_round(1), 2);
        assert_eq!(layout.match_count(), 5);
    }

    #[test]
    fn test_bye_position() {
        assert_eq!(BracketLayout::new(4).bye_position(), None);
        assert_eq!(BracketLayout::new(3).bye_position(), Some(2));
        assert_eq!(BracketLayout::new(5).bye_position(), Some(3));
        assert_eq!(BracketLayout::new(7).bye_position(), Some(4));
    }

    #[test]
    fn test_bye_matches() {
        // 6 entrants: round 2 has positions fed by 3 round-1 matches
        let layout = BracketLayout::new(6);
        assert!(!layout.is_bye_match(2, 1));
        assert!(layout.is_bye_match(2, 2));
        assert!(!layout.is_bye_match(3, 1));

        // 8 entrants is a full tree
        let layout = BracketLayout::new(8);
        for round in 2..=3 {
            for k in 1..=layout.positions_in_round(round) {
                assert!(!layout.is_bye_match(round, k));
            }
        }
    }

    #[test]
    fn test_next_slot() {
        let layout = BracketLayout::new(8);
        assert_eq!(
            layout.next_slot(1, 3),
            Some(SlotRef {
                round: 2,
                match_number: 2,
                slot: Slot::One
            })
        );
        assert_eq!(
            layout.next_slot(2, 2),
            Some(SlotRef {
                round: 3,
                match_number: 1,
                slot: Slot::Two
            })
        );
        assert_eq!(layout.next_slot(3, 1), None);
    }

    #[test]
    fn test_plan_pairs_in_input_order() {
        let players = ids(4);
        let plan = plan_bracket(
            Uuid::new_v4(),
            &players,
            TournamentFormat::SingleElimination,
            Utc::now(),
        )
        .unwrap();

        assert_eq!(plan.matches.len(), 3);
        let first = find(&plan, 1, 1);
        assert_eq!(first.participant1_id, Some(players[0]));
        assert_eq!(first.participant2_id, Some(players[1]));
        let second = find(&plan, 1, 2);
        assert_eq!(second.participant1_id, Some(players[2]));
        assert_eq!(second.participant2_id, Some(players[3]));

        let final_match = find(&plan, 2, 1);
        assert_eq!(final_match.participant1_id, None);
        assert_eq!(final_match.participant2_id, None);
        assert_eq!(plan.bye_participant, None);
        assert!(plan.matches.iter().all(|m| m.status == MatchStatus::Scheduled));
    }

    #[test]
    fn test_plan_five_players() {
        let players = ids(5);
        let plan = plan_bracket(
            Uuid::new_v4(),
            &players,
            TournamentFormat::SingleElimination,
            Utc::now(),
        )
        .unwrap();

        assert_eq!(plan.record.total_rounds, 3);
        assert_eq!(plan.summary().matches_per_round, vec![2, 2, 1]);
        assert_eq!(plan.bye_participant, Some(players[4]));

        // E skips round 1 and lands in round 2 match 2, which has no second feeder
        let bye_match = find(&plan, 2, 2);
        assert_eq!(bye_match.participant1_id, Some(players[4]));
        assert_eq!(bye_match.status, MatchStatus::Completed);
        assert!(bye_match.is_bye);
        assert_eq!(bye_match.winner_id, Some(players[4]));

        let final_match = find(&plan, 3, 1);
        assert_eq!(final_match.participant1_id, None);
        assert_eq!(final_match.participant2_id, Some(players[4]));
        assert_eq!(plan.auto_advanced, 1);
        assert_eq!(
            plan.seeded_participants(),
            players.iter().copied().collect::<HashSet<_>>()
        );
    }

    #[test]
    fn test_plan_seven_players_bye_meets_real_opponent() {
        let players = ids(7);
        let plan = plan_bracket(
            Uuid::new_v4(),
            &players,
            TournamentFormat::SingleElimination,
            Utc::now(),
        )
        .unwrap();

        let target = find(&plan, 2, 2);
        assert_eq!(target.participant1_id, None);
        assert_eq!(target.participant2_id, Some(players[6]));
        assert_eq!(target.status, MatchStatus::Scheduled);
        assert_eq!(plan.auto_advanced, 0);
    }

    #[test]
    fn test_plan_three_players() {
        let players = ids(3);
        let plan = plan_bracket(
            Uuid::new_v4(),
            &players,
            TournamentFormat::SingleElimination,
            Utc::now(),
        )
        .unwrap();

        assert_eq!(plan.matches.len(), 2);
        let final_match = find(&plan, 2, 1);
        assert_eq!(final_match.participant2_id, Some(players[2]));
        assert_eq!(final_match.status, MatchStatus::Scheduled);
    }

    #[test]
    fn test_plan_rejects_small_fields() {
        let err = plan_bracket(
            Uuid::new_v4(),
            &ids(1),
            TournamentFormat::SingleElimination,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            GenerationError::InsufficientParticipants {
                needed: 2,
                current: 1
            }
        ));

        let err = plan_bracket(
            Uuid::new_v4(),
            &[],
            TournamentFormat::SingleElimination,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            GenerationError::InsufficientParticipants { current: 0, .. }
        ));
    }

    #[test]
    fn test_plan_rejects_duplicates() {
        let mut players = ids(3);
        players.push(players[1]);

        let err = plan_bracket(
            Uuid::new_v4(),
            &players,
            TournamentFormat::SingleElimination,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, GenerationError::DuplicateParticipant(id) if id == players[1]));
    }

    #[test]
    fn test_plan_rejects_other_formats() {
        for format in [
            TournamentFormat::DoubleElimination,
            TournamentFormat::RoundRobin,
            TournamentFormat::Swiss,
        ] {
            let err = plan_bracket(Uuid::new_v4(), &ids(4), format, Utc::now()).unwrap_err();
            assert!(matches!(err, GenerationError::UnsupportedFormat(f) if f == format));
        }
    }
}
