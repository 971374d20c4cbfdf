//! Domain events emitted by round transitions.
//!
//! Events are plain data. The tracker service hands them to the
//! notification sender and the activity log; the transition functions
//! never perform I/O themselves.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// The current round was passed.
    RoundPassed {
        candidate_id: i32,
        round_id: i32,
        round_name: String,
        order: i32,
    },
    /// The current round was failed; the pipeline halts here.
    RoundFailed {
        candidate_id: i32,
        round_id: i32,
        round_name: String,
        order: i32,
    },
    /// The last round was passed.
    ProgressCompleted { candidate_id: i32, round_count: usize },
}

impl ProgressEvent {
    pub fn candidate_id(&self) -> i32 {
        match self {
            ProgressEvent::RoundPassed { candidate_id, .. }
            | ProgressEvent::RoundFailed { candidate_id, .. }
            | ProgressEvent::ProgressCompleted { candidate_id, .. } => *candidate_id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ProgressEvent::RoundPassed { .. } => "round_passed",
            ProgressEvent::RoundFailed { .. } => "round_failed",
            ProgressEvent::ProgressCompleted { .. } => "progress_completed",
        }
    }

    /// Only pass and fail decisions are mailed to candidates.
    pub fn notifies_candidate(&self) -> bool {
        !matches!(self, ProgressEvent::ProgressCompleted { .. })
    }
}
