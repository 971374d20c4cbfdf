use std::sync::Arc;
use std::time::Instant;

use crate::{
    models::activity::{ActivityAction, ActivityEntry},
    repository::{ActivityRepository, RepositoryError},
    utils::logger::{metadata, LOGGER},
};

pub const DEFAULT_ACTIVITY_LIMIT: usize = 50;
pub const MAX_ACTIVITY_LIMIT: usize = 500;

#[derive(Clone)]
pub struct ActivityService {
    repository: Arc<dyn ActivityRepository>,
}

impl ActivityService {
    pub fn new(repository: Arc<dyn ActivityRepository>) -> Self {
        Self { repository }
    }

    /// Records an entry. A storage failure is logged and reported as
    /// `false`; it never undoes the action being recorded.
    pub async fn record(&self, candidate_id: Option<i32>, action: ActivityAction) -> bool {
        let entry = ActivityEntry::new(candidate_id, action);

        LOGGER.log_business_event(
            entry.action.name(),
            candidate_id,
            metadata([("activity_id", serde_json::Value::String(entry.id.to_string()))]),
        );

        match self.repository.record(&entry).await {
            Ok(()) => true,
            Err(e) => {
                LOGGER.log_error(
                    &e.to_string(),
                    metadata([
                        ("error_type", serde_json::Value::String("activity_write".to_string())),
                        ("action", serde_json::Value::String(entry.action.name().to_string())),
                    ]),
                );
                false
            }
        }
    }

    pub async fn recent(
        &self,
        candidate_id: Option<i32>,
        limit: Option<usize>,
    ) -> Result<Vec<ActivityEntry>, RepositoryError> {
        let start_time = Instant::now();
        let limit = limit
            .unwrap_or(DEFAULT_ACTIVITY_LIMIT)
            .clamp(1, MAX_ACTIVITY_LIMIT);

        let entries = self.repository.recent(candidate_id, limit).await?;

        LOGGER.log_business_event(
            "activity_request_completed",
            candidate_id,
            metadata([
                ("entries", serde_json::Value::from(entries.len())),
                (
                    "duration_ms",
                    serde_json::Value::from(start_time.elapsed().as_millis() as u64),
                ),
            ]),
        );

        Ok(entries)
    }
}
