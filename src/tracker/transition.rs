//! Pure transition function for a candidate's round progression.
//!
//! `apply(&progress, decision)` returns the next progression plus the
//! events the change produced. The input is never modified, so a refused
//! decision leaves the caller's value exactly as it was.

use serde::{Deserialize, Serialize};

use crate::{
    models::{
        progress::{CandidateInterviewProgress, ProgressOutcome},
        round::RoundStatus,
    },
    tracker::{
        error::{InvalidState, TrackerError},
        event::ProgressEvent,
    },
};

/// Operator decisions that move a progression forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Promote the first round of an untouched progression.
    Start,
    /// Pass the current round.
    Advance,
    /// Fail the current round.
    Reject,
}

/// Result of a successful transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub progress: CandidateInterviewProgress,
    pub events: Vec<ProgressEvent>,
}

pub fn apply(
    progress: &CandidateInterviewProgress,
    decision: Decision,
) -> Result<Transition, TrackerError> {
    match decision {
        Decision::Start => start(progress),
        Decision::Advance => advance(progress),
        Decision::Reject => reject(progress),
    }
}

pub fn start(progress: &CandidateInterviewProgress) -> Result<Transition, TrackerError> {
    if progress.outcome() != ProgressOutcome::NotStarted {
        return Err(InvalidState::AlreadyStarted.into());
    }

    let mut next = progress.clone();
    if let Some(first) = next.rounds_mut().first_mut() {
        first.status = RoundStatus::Current;
    }

    Ok(Transition {
        progress: recheck(next)?,
        events: Vec::new(),
    })
}

pub fn advance(progress: &CandidateInterviewProgress) -> Result<Transition, TrackerError> {
    let index = current_index(progress)?;
    let candidate_id = progress.candidate_id();

    let mut next = progress.clone();
    let rounds = next.rounds_mut();
    let round_count = rounds.len();
    rounds[index].status = RoundStatus::Passed;

    let mut events = vec![ProgressEvent::RoundPassed {
        candidate_id,
        round_id: rounds[index].id,
        round_name: rounds[index].name.clone(),
        order: rounds[index].order,
    }];

    match rounds.get_mut(index + 1) {
        Some(following) => following.status = RoundStatus::Current,
        None => events.push(ProgressEvent::ProgressCompleted {
            candidate_id,
            round_count,
        }),
    }

    Ok(Transition {
        progress: recheck(next)?,
        events,
    })
}

pub fn reject(progress: &CandidateInterviewProgress) -> Result<Transition, TrackerError> {
    let index = current_index(progress)?;

    let mut next = progress.clone();
    let rounds = next.rounds_mut();
    rounds[index].status = RoundStatus::Failed;

    let event = ProgressEvent::RoundFailed {
        candidate_id: progress.candidate_id(),
        round_id: rounds[index].id,
        round_name: rounds[index].name.clone(),
        order: rounds[index].order,
    };

    Ok(Transition {
        progress: recheck(next)?,
        events: vec![event],
    })
}

fn current_index(progress: &CandidateInterviewProgress) -> Result<usize, TrackerError> {
    progress.current_index().ok_or_else(|| {
        let outcome = progress.outcome();
        if outcome.is_terminal() {
            InvalidState::Finished(outcome).into()
        } else {
            InvalidState::NoCurrentRound.into()
        }
    })
}

fn recheck(
    progress: CandidateInterviewProgress,
) -> Result<CandidateInterviewProgress, TrackerError> {
    let candidate_id = progress.candidate_id();
    CandidateInterviewProgress::from_rounds(candidate_id, progress.rounds().to_vec())
}

impl CandidateInterviewProgress {
    /// Passes the current round in place.
    pub fn advance(&mut self) -> Result<Vec<ProgressEvent>, TrackerError> {
        self.decide(Decision::Advance)
    }

    /// Fails the current round in place.
    pub fn reject(&mut self) -> Result<Vec<ProgressEvent>, TrackerError> {
        self.decide(Decision::Reject)
    }

    pub fn decide(&mut self, decision: Decision) -> Result<Vec<ProgressEvent>, TrackerError> {
        let Transition { progress, events } = apply(self, decision)?;
        *self = progress;
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::round::InterviewRound;
    use RoundStatus::*;

    fn progress(statuses: &[RoundStatus]) -> CandidateInterviewProgress {
        let rounds = statuses
            .iter()
            .enumerate()
            .map(|(index, status)| {
                let position = index as i32 + 1;
                InterviewRound::new(position, position, format!("Round {position}"), "Priya")
                    .with_status(*status)
            })
            .collect();
        CandidateInterviewProgress::from_rounds(42, rounds).unwrap()
    }

    fn named(rounds: &[(&str, RoundStatus)]) -> CandidateInterviewProgress {
        let rounds = rounds
            .iter()
            .enumerate()
            .map(|(index, (name, status))| {
                let position = index as i32 + 1;
                InterviewRound::new(position, position, *name, "Morgan").with_status(*status)
            })
            .collect();
        CandidateInterviewProgress::from_rounds(7, rounds).unwrap()
    }

    fn current_count(progress: &CandidateInterviewProgress) -> usize {
        progress.statuses().iter().filter(|s| **s == Current).count()
    }

    #[test]
    fn advance_moves_current_pointer_forward() {
        let mut p = progress(&[Passed, Current, Pending, Pending]);

        let events = p.advance().unwrap();

        assert_eq!(p.statuses(), vec![Passed, Passed, Current, Pending]);
        assert_eq!(
            events,
            vec![ProgressEvent::RoundPassed {
                candidate_id: 42,
                round_id: 2,
                round_name: "Round 2".to_string(),
                order: 2,
            }]
        );
    }

    #[test]
    fn reject_halts_progression() {
        let mut p = progress(&[Passed, Current, Pending]);

        let events = p.reject().unwrap();

        assert_eq!(p.statuses(), vec![Passed, Failed, Pending]);
        assert_eq!(p.current_round(), None);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], ProgressEvent::RoundFailed { round_id: 2, .. }));

        let err = p.advance().unwrap_err();
        assert_eq!(
            err,
            TrackerError::InvalidState(InvalidState::Finished(ProgressOutcome::Rejected))
        );
        assert_eq!(p.statuses(), vec![Passed, Failed, Pending]);
    }

    #[test]
    fn advancing_last_round_completes() {
        let mut p = progress(&[Passed, Passed, Current]);

        let events = p.advance().unwrap();

        assert_eq!(p.statuses(), vec![Passed, Passed, Passed]);
        assert_eq!(p.current_round(), None);
        assert_eq!(p.outcome(), ProgressOutcome::Completed);
        assert_eq!(
            events.last(),
            Some(&ProgressEvent::ProgressCompleted {
                candidate_id: 42,
                round_count: 3
            })
        );
        assert!(matches!(
            p.reject(),
            Err(TrackerError::InvalidState(InvalidState::Finished(
                ProgressOutcome::Completed
            )))
        ));
    }

    #[test]
    fn decisions_without_current_round_are_refused() {
        let untouched = progress(&[Pending, Pending]);

        for decision in [Decision::Advance, Decision::Reject] {
            assert_eq!(
                apply(&untouched, decision).unwrap_err(),
                TrackerError::InvalidState(InvalidState::NoCurrentRound)
            );
        }
    }

    #[test]
    fn start_promotes_first_round_once() {
        let mut p = progress(&[Pending, Pending, Pending]);

        assert!(p.decide(Decision::Start).unwrap().is_empty());
        assert_eq!(p.statuses(), vec![Current, Pending, Pending]);

        assert_eq!(
            p.decide(Decision::Start).unwrap_err(),
            TrackerError::InvalidState(InvalidState::AlreadyStarted)
        );
    }

    #[test]
    fn apply_leaves_input_untouched() {
        let original = progress(&[Current, Pending]);
        let transition = apply(&original, Decision::Advance).unwrap();

        assert_eq!(original.statuses(), vec![Current, Pending]);
        assert_eq!(transition.progress.statuses(), vec![Passed, Current]);
    }

    #[test]
    fn at_most_one_round_current_through_full_walk() {
        let mut p = progress(&[Current, Pending, Pending, Pending, Pending]);
        while p.current_round().is_some() {
            assert_eq!(current_count(&p), 1);
            let orders: Vec<i32> = p.rounds().iter().map(|r| r.order).collect();
            assert_eq!(orders, vec![1, 2, 3, 4, 5]);
            p.advance().unwrap();
        }
        assert_eq!(current_count(&p), 0);
        assert_eq!(p.outcome(), ProgressOutcome::Completed);
    }

    #[test]
    fn jane_doe_pipeline() {
        let mut p = named(&[
            ("Pre-screening", Passed),
            ("HR", Current),
            ("Technical", Pending),
        ]);

        p.advance().unwrap();
        assert_eq!(p.rounds()[1].status, Passed);
        assert_eq!(p.rounds()[2].status, Current);
        assert_eq!(p.current_round().map(|r| r.name.as_str()), Some("Technical"));

        p.reject().unwrap();
        assert_eq!(p.rounds()[2].status, Failed);
        assert_eq!(p.current_round(), None);

        assert!(matches!(p.advance(), Err(TrackerError::InvalidState(_))));
        assert!(matches!(p.reject(), Err(TrackerError::InvalidState(_))));
        assert_eq!(p.statuses(), vec![Passed, Passed, Failed]);
    }
}
