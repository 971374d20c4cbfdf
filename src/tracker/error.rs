//! Error types for round tracking and template editing.

use thiserror::Error;

use crate::models::progress::ProgressOutcome;

/// Why a transition was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidState {
    /// Nothing is awaiting a decision and the pipeline has not started.
    #[error("no round is current")]
    NoCurrentRound,
    /// The pipeline already reached a terminal outcome.
    #[error("progression already finished ({0:?})")]
    Finished(ProgressOutcome),
    /// Starting was requested but a round is already active or decided.
    #[error("progression already started")]
    AlreadyStarted,
    /// A progression is already stored for this candidate.
    #[error("candidate {0} already has a progression")]
    ProgressExists(i32),
}

/// Errors produced by the tracker and the config editor.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackerError {
    /// Malformed input.
    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },
    /// Transition not allowed from the current state.
    #[error("invalid state: {0}")]
    InvalidState(#[from] InvalidState),
    /// Referenced entity does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },
}

impl TrackerError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: i32) -> Self {
        Self::NotFound { entity, id }
    }
}

impl From<validator::ValidationErrors> for TrackerError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by_key(|(field, _)| *field);

        match fields.first() {
            Some((field, field_errors)) => {
                let message = field_errors
                    .iter()
                    .find_map(|error| error.message.as_ref().map(|msg| msg.to_string()))
                    .unwrap_or_else(|| format!("invalid value for field '{}'", field));
                Self::validation(*field, message)
            }
            None => Self::validation("request", "validation failed"),
        }
    }
}
