use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::round_config::{MoveDirection, RoundConfigField};

/// Typed payload for every action the activity log records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "details", rename_all = "snake_case")]
pub enum ActivityAction {
    ProgressStarted { round_count: usize, from_templates: bool },
    SnapshotReplaced { round_count: usize },
    RoundStarted { round_id: i32, round_name: String },
    RoundPassed { round_id: i32, round_name: String },
    RoundFailed { round_id: i32, round_name: String },
    ProgressCompleted { round_count: usize },
    ConfigAdded { config_id: i32, name: String },
    ConfigUpdated { config_id: i32, field: RoundConfigField },
    ConfigDeleted { config_id: i32, name: String },
    ConfigMoved { config_id: i32, direction: MoveDirection },
    ConfigsRenumbered { config_count: usize },
}

impl ActivityAction {
    pub fn name(&self) -> &'static str {
        match self {
            ActivityAction::ProgressStarted { .. } => "progress_started",
            ActivityAction::SnapshotReplaced { .. } => "snapshot_replaced",
            ActivityAction::RoundStarted { .. } => "round_started",
            ActivityAction::RoundPassed { .. } => "round_passed",
            ActivityAction::RoundFailed { .. } => "round_failed",
            ActivityAction::ProgressCompleted { .. } => "progress_completed",
            ActivityAction::ConfigAdded { .. } => "config_added",
            ActivityAction::ConfigUpdated { .. } => "config_updated",
            ActivityAction::ConfigDeleted { .. } => "config_deleted",
            ActivityAction::ConfigMoved { .. } => "config_moved",
            ActivityAction::ConfigsRenumbered { .. } => "configs_renumbered",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub candidate_id: Option<i32>,
    #[serde(flatten)]
    pub action: ActivityAction,
}

impl ActivityEntry {
    pub fn new(candidate_id: Option<i32>, action: ActivityAction) -> Self {
        Self {
            id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            candidate_id,
            action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_serialize_with_tagged_details() {
        let entry = ActivityEntry::new(
            Some(3),
            ActivityAction::RoundPassed {
                round_id: 2,
                round_name: "HR".to_string(),
            },
        );

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["action"], "round_passed");
        assert_eq!(json["details"]["round_name"], "HR");
        assert_eq!(json["candidate_id"], 3);

        let action = serde_json::json!({
            "action": json["action"].clone(),
            "details": json["details"].clone(),
        });
        let back: ActivityAction = serde_json::from_value(action).unwrap();
        assert_eq!(back, entry.action);
    }
}
