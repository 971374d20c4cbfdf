use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use validator::Validate;

use crate::{
    models::round::{InterviewRound, NewRoundRequest, RoundStatus},
    tracker::error::TrackerError,
};

/// Where a candidate's pipeline stands as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressOutcome {
    NotStarted,
    InProgress,
    Completed,
    Rejected,
}

impl ProgressOutcome {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProgressOutcome::Completed | ProgressOutcome::Rejected)
    }
}

/// Ordered interview rounds for one candidate.
///
/// Rounds are kept sorted by `order`, and every constructor checks the
/// progression invariants, so a value of this type is always well formed:
/// orders are `1..=n`, at most one round is current, everything before the
/// active (or failed) round has passed and everything after it is pending.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateInterviewProgress {
    candidate_id: i32,
    rounds: Vec<InterviewRound>,
}

/// Persistable form of a progression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub candidate_id: i32,
    pub rounds: Vec<InterviewRound>,
}

impl CandidateInterviewProgress {
    /// Builds a fresh progression: the lowest order round becomes current,
    /// everything else pending. Orders are renumbered to `1..=n` following
    /// the order of the input.
    pub fn start(candidate_id: i32, rounds: Vec<InterviewRound>) -> Result<Self, TrackerError> {
        if rounds.is_empty() {
            return Err(TrackerError::validation(
                "rounds",
                "a progression needs at least one round",
            ));
        }

        let mut rounds = rounds;
        rounds.sort_by_key(|round| round.order);
        for (index, round) in rounds.iter_mut().enumerate() {
            round.order = index as i32 + 1;
            round.status = if index == 0 {
                RoundStatus::Current
            } else {
                RoundStatus::Pending
            };
        }

        Self::from_rounds(candidate_id, rounds)
    }

    /// Builds a progression from operator supplied rounds, assigning ids and
    /// orders by position.
    pub fn from_requests(
        candidate_id: i32,
        requests: Vec<NewRoundRequest>,
    ) -> Result<Self, TrackerError> {
        let mut rounds = Vec::with_capacity(requests.len());
        for (index, request) in requests.into_iter().enumerate() {
            request.validate()?;
            if request.name.trim().is_empty() {
                return Err(TrackerError::validation("name", "round name must not be blank"));
            }
            if request.interviewer.trim().is_empty() {
                return Err(TrackerError::validation(
                    "interviewer",
                    "interviewer must not be blank",
                ));
            }

            let position = index as i32 + 1;
            let mut round = InterviewRound::new(
                position,
                position,
                request.name.trim(),
                request.interviewer.trim(),
            );
            round.date = request.date;
            round.score = request.score;
            round.weight = request.weight;
            rounds.push(round);
        }

        Self::start(candidate_id, rounds)
    }

    /// Accepts an arbitrary round list (for example a stored snapshot) if it
    /// satisfies every progression invariant.
    pub fn from_rounds(
        candidate_id: i32,
        rounds: Vec<InterviewRound>,
    ) -> Result<Self, TrackerError> {
        if rounds.is_empty() {
            return Err(TrackerError::validation(
                "rounds",
                "a progression needs at least one round",
            ));
        }

        let mut rounds = rounds;
        rounds.sort_by_key(|round| round.order);

        let mut ids = HashSet::new();
        for (index, round) in rounds.iter().enumerate() {
            if !ids.insert(round.id) {
                return Err(TrackerError::validation(
                    "rounds",
                    format!("round id {} appears more than once", round.id),
                ));
            }
            if round.order != index as i32 + 1 {
                return Err(TrackerError::validation(
                    "order",
                    format!(
                        "round orders must be contiguous from 1, found {} at position {}",
                        round.order,
                        index + 1
                    ),
                ));
            }
        }

        check_status_sequence(&rounds)?;

        Ok(Self {
            candidate_id,
            rounds,
        })
    }

    pub fn from_snapshot(snapshot: ProgressSnapshot) -> Result<Self, TrackerError> {
        Self::from_rounds(snapshot.candidate_id, snapshot.rounds)
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            candidate_id: self.candidate_id,
            rounds: self.rounds.clone(),
        }
    }

    pub fn candidate_id(&self) -> i32 {
        self.candidate_id
    }

    pub fn rounds(&self) -> &[InterviewRound] {
        &self.rounds
    }

    pub fn statuses(&self) -> Vec<RoundStatus> {
        self.rounds.iter().map(|round| round.status).collect()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.rounds
            .iter()
            .position(|round| round.status == RoundStatus::Current)
    }

    pub fn current_round(&self) -> Option<&InterviewRound> {
        self.current_index().map(|index| &self.rounds[index])
    }

    pub fn outcome(&self) -> ProgressOutcome {
        if self.current_index().is_some() {
            ProgressOutcome::InProgress
        } else if self.rounds.iter().any(|r| r.status == RoundStatus::Failed) {
            ProgressOutcome::Rejected
        } else if !self.rounds.is_empty()
            && self.rounds.iter().all(|r| r.status == RoundStatus::Passed)
        {
            ProgressOutcome::Completed
        } else {
            ProgressOutcome::NotStarted
        }
    }

    /// Only the transition functions mutate rounds, and they re-check the
    /// invariants before handing the value back.
    pub(crate) fn rounds_mut(&mut self) -> &mut [InterviewRound] {
        &mut self.rounds
    }
}

fn check_status_sequence(rounds: &[InterviewRound]) -> Result<(), TrackerError> {
    let anchors: Vec<usize> = rounds
        .iter()
        .enumerate()
        .filter(|(_, r)| matches!(r.status, RoundStatus::Current | RoundStatus::Failed))
        .map(|(index, _)| index)
        .collect();

    match anchors.as_slice() {
        [] => {
            // Without an active round the pipeline is either untouched or
            // finished, never a mix of the two.
            let any_pending = rounds.iter().any(|r| r.status == RoundStatus::Pending);
            let any_passed = rounds.iter().any(|r| r.status == RoundStatus::Passed);
            if any_pending && any_passed {
                return Err(TrackerError::validation(
                    "status",
                    "passed and pending rounds need a current round between them",
                ));
            }
            Ok(())
        }
        [anchor] => {
            let before_ok = rounds[..*anchor]
                .iter()
                .all(|r| r.status == RoundStatus::Passed);
            let after_ok = rounds[anchor + 1..]
                .iter()
                .all(|r| r.status == RoundStatus::Pending);
            if before_ok && after_ok {
                Ok(())
            } else {
                Err(TrackerError::validation(
                    "status",
                    format!(
                        "rounds before the {} round must be passed and rounds after it pending",
                        rounds[*anchor].status
                    ),
                ))
            }
        }
        _ => Err(TrackerError::validation(
            "status",
            "at most one round may be current or failed",
        )),
    }
}
