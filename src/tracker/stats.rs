//! Status counts and completion figures for progressions.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{
    progress::{CandidateInterviewProgress, ProgressOutcome},
    round::RoundStatus,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressStats {
    pub total: usize,
    pub pending: usize,
    pub current: usize,
    pub passed: usize,
    pub failed: usize,
    /// Share of rounds passed, 0 to 100.
    pub completion_percent: f64,
    pub outcome: ProgressOutcome,
}

impl ProgressStats {
    pub fn of(progress: &CandidateInterviewProgress) -> Self {
        let mut stats = Self {
            total: progress.rounds().len(),
            pending: 0,
            current: 0,
            passed: 0,
            failed: 0,
            completion_percent: 0.0,
            outcome: progress.outcome(),
        };

        for round in progress.rounds() {
            match round.status {
                RoundStatus::Pending => stats.pending += 1,
                RoundStatus::Current => stats.current += 1,
                RoundStatus::Passed => stats.passed += 1,
                RoundStatus::Failed => stats.failed += 1,
            }
        }

        if stats.total > 0 {
            stats.completion_percent = round_two(stats.passed as f64 * 100.0 / stats.total as f64);
        }

        stats
    }
}

/// Outcome breakdown across many candidates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineSummary {
    pub candidates: usize,
    pub outcomes: BTreeMap<String, usize>,
    pub rounds_by_status: BTreeMap<String, usize>,
    pub average_completion_percent: f64,
}

impl PipelineSummary {
    pub fn of<'a, I>(progressions: I) -> Self
    where
        I: IntoIterator<Item = &'a CandidateInterviewProgress>,
    {
        let mut outcomes: BTreeMap<String, usize> = [
            ProgressOutcome::NotStarted,
            ProgressOutcome::InProgress,
            ProgressOutcome::Completed,
            ProgressOutcome::Rejected,
        ]
        .iter()
        .map(|outcome| (outcome_key(*outcome).to_string(), 0))
        .collect();

        let mut rounds_by_status: BTreeMap<String, usize> = [
            RoundStatus::Pending,
            RoundStatus::Current,
            RoundStatus::Passed,
            RoundStatus::Failed,
        ]
        .iter()
        .map(|status| (status.as_str().to_string(), 0))
        .collect();

        let mut candidates = 0;
        let mut completion_total = 0.0;

        for progress in progressions {
            let stats = ProgressStats::of(progress);
            candidates += 1;
            completion_total += stats.completion_percent;
            *outcomes.entry(outcome_key(stats.outcome).to_string()).or_insert(0) += 1;
            for round in progress.rounds() {
                *rounds_by_status
                    .entry(round.status.as_str().to_string())
                    .or_insert(0) += 1;
            }
        }

        let average_completion_percent = if candidates > 0 {
            round_two(completion_total / candidates as f64)
        } else {
            0.0
        };

        Self {
            candidates,
            outcomes,
            rounds_by_status,
            average_completion_percent,
        }
    }
}

fn outcome_key(outcome: ProgressOutcome) -> &'static str {
    match outcome {
        ProgressOutcome::NotStarted => "not_started",
        ProgressOutcome::InProgress => "in_progress",
        ProgressOutcome::Completed => "completed",
        ProgressOutcome::Rejected => "rejected",
    }
}

fn round_two(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::round::InterviewRound;
    use RoundStatus::*;

    fn progress(candidate_id: i32, statuses: &[RoundStatus]) -> CandidateInterviewProgress {
        let rounds = statuses
            .iter()
            .enumerate()
            .map(|(index, status)| {
                let position = index as i32 + 1;
                InterviewRound::new(position, position, "Panel", "Lee").with_status(*status)
            })
            .collect();
        CandidateInterviewProgress::from_rounds(candidate_id, rounds).unwrap()
    }

    #[test]
    fn counts_rounds_by_status() {
        let stats = ProgressStats::of(&progress(1, &[Passed, Current, Pending]));

        assert_eq!(stats.total, 3);
        assert_eq!((stats.passed, stats.current, stats.pending, stats.failed), (1, 1, 1, 0));
        assert_eq!(stats.completion_percent, 33.33);
        assert_eq!(stats.outcome, ProgressOutcome::InProgress);
    }

    #[test]
    fn completed_pipeline_is_fully_complete() {
        let stats = ProgressStats::of(&progress(1, &[Passed, Passed]));
        assert_eq!(stats.completion_percent, 100.0);
        assert_eq!(stats.outcome, ProgressOutcome::Completed);
    }

    #[test]
    fn summary_aggregates_outcomes() {
        let all = vec![
            progress(1, &[Passed, Passed]),
            progress(2, &[Passed, Failed]),
            progress(3, &[Current, Pending]),
            progress(4, &[Passed, Current]),
        ];

        let summary = PipelineSummary::of(&all);

        assert_eq!(summary.candidates, 4);
        assert_eq!(summary.outcomes["completed"], 1);
        assert_eq!(summary.outcomes["rejected"], 1);
        assert_eq!(summary.outcomes["in_progress"], 2);
        assert_eq!(summary.outcomes["not_started"], 0);
        assert_eq!(summary.rounds_by_status["passed"], 4);
        assert_eq!(summary.rounds_by_status["failed"], 1);
        assert_eq!(summary.average_completion_percent, 50.0);
    }

    #[test]
    fn empty_summary_has_zero_average() {
        let summary = PipelineSummary::of(std::iter::empty());
        assert_eq!(summary.candidates, 0);
        assert_eq!(summary.average_completion_percent, 0.0);
    }
}
