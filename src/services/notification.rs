use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::{
    models::candidate::Candidate,
    repository::CandidateDirectory,
    tracker::event::ProgressEvent,
    utils::logger::{metadata, LOGGER},
};

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("delivery failed: {0}")]
    Delivery(String),
    #[error("candidate {0} has no email address")]
    MissingAddress(i32),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoticeMetadata {
    pub candidate_name: String,
    pub position: Option<String>,
}

/// One message for the email collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateNotice {
    pub event: ProgressEvent,
    pub candidate_email: String,
    pub metadata: NoticeMetadata,
}

/// Outbound channel to candidates. Sends are fire-and-forget from the
/// tracker's point of view.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, notice: &CandidateNotice) -> Result<(), NotificationError>;
}

/// Writes notices to the log instead of delivering them.
pub struct LoggingNotifier;

#[async_trait]
impl NotificationSender for LoggingNotifier {
    async fn send(&self, notice: &CandidateNotice) -> Result<(), NotificationError> {
        tracing::info!(
            "Notification: {} for {} <{}>",
            notice.event.name(),
            notice.metadata.candidate_name,
            notice.candidate_email
        );
        Ok(())
    }
}

#[derive(Clone)]
pub struct NotificationService {
    sender: Arc<dyn NotificationSender>,
    candidates: Arc<dyn CandidateDirectory>,
}

impl NotificationService {
    pub fn new(
        sender: Arc<dyn NotificationSender>,
        candidates: Arc<dyn CandidateDirectory>,
    ) -> Self {
        Self { sender, candidates }
    }

    /// Sends a notice for every event that concerns the candidate. Failures
    /// are logged and counted out; the return value is the number sent.
    pub async fn dispatch(&self, events: &[ProgressEvent]) -> usize {
        let mut sent = 0;

        for event in events.iter().filter(|event| event.notifies_candidate()) {
            let candidate_id = event.candidate_id();
            let candidate = match self.candidates.get(candidate_id).await {
                Ok(Some(candidate)) => candidate,
                Ok(None) => {
                    self.log_failure(event, &format!("candidate {} not found", candidate_id));
                    continue;
                }
                Err(e) => {
                    self.log_failure(event, &e.to_string());
                    continue;
                }
            };

            let result = match notice_for(event, &candidate) {
                Ok(notice) => self.sender.send(&notice).await,
                Err(e) => Err(e),
            };

            match result {
                Ok(()) => sent += 1,
                Err(e) => self.log_failure(event, &e.to_string()),
            }
        }

        sent
    }

    fn log_failure(&self, event: &ProgressEvent, error: &str) {
        LOGGER.log_error(
            error,
            metadata([
                ("error_type", serde_json::Value::String("notification".to_string())),
                ("event", serde_json::Value::String(event.name().to_string())),
                ("candidate_id", serde_json::Value::from(event.candidate_id())),
            ]),
        );
    }
}

fn notice_for(
    event: &ProgressEvent,
    candidate: &Candidate,
) -> Result<CandidateNotice, NotificationError> {
    if candidate.email.trim().is_empty() {
        return Err(NotificationError::MissingAddress(candidate.id));
    }

    Ok(CandidateNotice {
        event: event.clone(),
        candidate_email: candidate.email.clone(),
        metadata: NoticeMetadata {
            candidate_name: candidate.name.clone(),
            position: candidate.position.clone(),
        },
    })
}
