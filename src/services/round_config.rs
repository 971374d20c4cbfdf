use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::{
    models::{
        activity::ActivityAction,
        round::InterviewRound,
        round_config::{
            CreateRoundConfigRequest, InterviewRoundConfig, MoveDirection, RoundConfigField,
        },
    },
    repository::{RepositoryError, RoundConfigRepository},
    services::{activity::ActivityService, ServiceError},
    tracker::config_editor::{EditorOptions, RoundConfigEditor},
    utils::logger::{metadata, LOGGER},
};

#[derive(Debug, Clone, Serialize)]
pub struct RoundConfigList {
    pub configs: Vec<InterviewRoundConfig>,
    pub has_gaps: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoundConfigChange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<InterviewRoundConfig>,
    /// Set by moves; false when the entry was already at the edge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moved: Option<bool>,
    #[serde(flatten)]
    pub list: RoundConfigList,
    pub persisted: bool,
}

/// The round template editor behind a lock, saved after every edit.
pub struct RoundConfigService {
    editor: Mutex<RoundConfigEditor>,
    repository: Arc<dyn RoundConfigRepository>,
    activity: ActivityService,
}

impl RoundConfigService {
    pub async fn load(
        repository: Arc<dyn RoundConfigRepository>,
        options: EditorOptions,
        activity: ActivityService,
    ) -> Result<Self, RepositoryError> {
        let configs = repository.load().await?;
        tracing::info!("Loaded {} round templates", configs.len());

        Ok(Self {
            editor: Mutex::new(RoundConfigEditor::new(configs, options)),
            repository,
            activity,
        })
    }

    pub async fn list(&self) -> RoundConfigList {
        let editor = self.editor.lock().await;
        list_of(&editor)
    }

    /// Pending rounds built from the current templates.
    pub async fn instantiate(&self, include_optional: bool) -> Vec<InterviewRound> {
        self.editor.lock().await.instantiate(include_optional)
    }

    pub async fn add(
        &self,
        request: CreateRoundConfigRequest,
    ) -> Result<RoundConfigChange, ServiceError> {
        let mut editor = self.editor.lock().await;
        let config = editor.add_round(request)?;
        let change = self.commit(&editor, Some(config.clone()), None).await;
        drop(editor);

        self.activity
            .record(
                None,
                ActivityAction::ConfigAdded {
                    config_id: config.id,
                    name: config.name,
                },
            )
            .await;

        Ok(change)
    }

    /// Applies a single field edit. `value` arrives as JSON from the form
    /// and is reduced to its text before coercion.
    pub async fn update_field(
        &self,
        id: i32,
        field: RoundConfigField,
        value: &serde_json::Value,
    ) -> Result<RoundConfigChange, ServiceError> {
        let text = form_text(value);

        let mut editor = self.editor.lock().await;
        let config = editor.update_field(id, field, &text)?;
        let change = self.commit(&editor, Some(config), None).await;
        drop(editor);

        self.activity
            .record(None, ActivityAction::ConfigUpdated { config_id: id, field })
            .await;

        Ok(change)
    }

    pub async fn delete(&self, id: i32) -> Result<RoundConfigChange, ServiceError> {
        let mut editor = self.editor.lock().await;
        let removed = editor.delete_round(id)?;
        let change = self.commit(&editor, None, None).await;
        drop(editor);

        self.activity
            .record(
                None,
                ActivityAction::ConfigDeleted {
                    config_id: removed.id,
                    name: removed.name,
                },
            )
            .await;

        Ok(change)
    }

    pub async fn move_round(
        &self,
        id: i32,
        direction: MoveDirection,
    ) -> Result<RoundConfigChange, ServiceError> {
        let mut editor = self.editor.lock().await;
        let moved = editor.move_round(id, direction)?;
        if !moved {
            return Ok(RoundConfigChange {
                config: Some(editor.get(id)?.clone()),
                moved: Some(false),
                list: list_of(&editor),
                persisted: true,
            });
        }

        let config = editor.get(id)?.clone();
        let change = self.commit(&editor, Some(config), Some(true)).await;
        drop(editor);

        self.activity
            .record(None, ActivityAction::ConfigMoved { config_id: id, direction })
            .await;

        Ok(change)
    }

    pub async fn renumber(&self) -> RoundConfigChange {
        let mut editor = self.editor.lock().await;
        editor.renumber();
        let change = self.commit(&editor, None, None).await;
        drop(editor);

        self.activity
            .record(
                None,
                ActivityAction::ConfigsRenumbered {
                    config_count: change.list.configs.len(),
                },
            )
            .await;

        change
    }

    async fn commit(
        &self,
        editor: &RoundConfigEditor,
        config: Option<InterviewRoundConfig>,
        moved: Option<bool>,
    ) -> RoundConfigChange {
        let persisted = match self.repository.save_all(editor.entries()).await {
            Ok(()) => true,
            Err(e) => {
                LOGGER.log_error(
                    &e.to_string(),
                    metadata([(
                        "error_type",
                        serde_json::Value::String("round_config_write".to_string()),
                    )]),
                );
                false
            }
        };

        RoundConfigChange {
            config,
            moved,
            list: list_of(editor),
            persisted,
        }
    }
}

fn list_of(editor: &RoundConfigEditor) -> RoundConfigList {
    RoundConfigList {
        configs: editor.entries().to_vec(),
        has_gaps: editor.has_gaps(),
    }
}

fn form_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::round_config::DurationInput,
        repository::{InMemoryActivityRepository, InMemoryRoundConfigRepository},
        tracker::error::TrackerError,
    };
    use async_trait::async_trait;
    use serde_json::json;

    struct ReadOnlyRoundConfigRepository;

    #[async_trait]
    impl RoundConfigRepository for ReadOnlyRoundConfigRepository {
        async fn load(&self) -> Result<Vec<InterviewRoundConfig>, RepositoryError> {
            Ok(Vec::new())
        }

        async fn save_all(&self, _configs: &[InterviewRoundConfig]) -> Result<(), RepositoryError> {
            Err(RepositoryError::Unavailable("read-only replica".to_string()))
        }
    }

    fn template(id: i32, order: i32, name: &str, is_required: bool) -> InterviewRoundConfig {
        InterviewRoundConfig {
            id,
            name: name.to_string(),
            description: String::new(),
            duration: 45,
            interviewer: "Lee".to_string(),
            is_required,
            order,
        }
    }

    fn request(name: &str) -> CreateRoundConfigRequest {
        CreateRoundConfigRequest {
            name: name.to_string(),
            description: String::new(),
            duration: Some(DurationInput::Text("60".to_string())),
            interviewer: "Kim".to_string(),
            is_required: true,
        }
    }

    async fn service(
        configs: Vec<InterviewRoundConfig>,
    ) -> (RoundConfigService, Arc<InMemoryRoundConfigRepository>) {
        let repository = Arc::new(InMemoryRoundConfigRepository::with_configs(configs));
        let activity = ActivityService::new(Arc::new(InMemoryActivityRepository::new()));
        let service =
            RoundConfigService::load(repository.clone(), EditorOptions::default(), activity)
                .await
                .unwrap();
        (service, repository)
    }

    #[tokio::test]
    async fn edits_are_saved() {
        let (service, repository) = service(vec![template(1, 1, "Screening", true)]).await;

        let added = service.add(request("System design")).await.unwrap();
        assert!(added.persisted);
        assert_eq!(added.config.as_ref().map(|c| c.duration), Some(60));

        service
            .update_field(2, RoundConfigField::IsRequired, &json!(false))
            .await
            .unwrap();

        let stored = repository.load().await.unwrap();
        assert_eq!(stored.len(), 2);
        assert!(!stored[1].is_required);
    }

    #[tokio::test]
    async fn delete_leaves_a_gap_until_renumbered() {
        let (service, _) = service(vec![
            template(1, 1, "Screening", true),
            template(2, 2, "Panel", true),
            template(3, 3, "Offer call", false),
        ])
        .await;

        let deleted = service.delete(2).await.unwrap();
        assert!(deleted.list.has_gaps);

        let renumbered = service.renumber().await;
        assert!(!renumbered.list.has_gaps);
        let orders: Vec<i32> = renumbered.list.configs.iter().map(|c| c.order).collect();
        assert_eq!(orders, vec![1, 2]);
    }

    #[tokio::test]
    async fn moves_report_edges() {
        let (service, _) = service(vec![
            template(1, 1, "Screening", true),
            template(2, 2, "Panel", true),
        ])
        .await;

        let top = service.move_round(1, MoveDirection::Up).await.unwrap();
        assert_eq!(top.moved, Some(false));

        let down = service.move_round(1, MoveDirection::Down).await.unwrap();
        assert_eq!(down.moved, Some(true));
        let names: Vec<&str> = down.list.configs.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Panel", "Screening"]);
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let (service, _) = service(Vec::new()).await;
        let err = service.delete(9).await.unwrap_err();
        assert!(matches!(err, ServiceError::Tracker(TrackerError::NotFound { .. })));
    }

    #[tokio::test]
    async fn instantiate_skips_optional_templates() {
        let (service, _) = service(vec![
            template(1, 1, "Screening", true),
            template(2, 3, "Trial day", false),
        ])
        .await;

        assert_eq!(service.instantiate(false).await.len(), 1);
        let all = service.instantiate(true).await;
        let orders: Vec<i32> = all.iter().map(|r| r.order).collect();
        assert_eq!(orders, vec![1, 2]);
    }

    #[tokio::test]
    async fn failed_saves_keep_the_edit() {
        let activity = ActivityService::new(Arc::new(InMemoryActivityRepository::new()));
        let service = RoundConfigService::load(
            Arc::new(ReadOnlyRoundConfigRepository),
            EditorOptions::default(),
            activity,
        )
        .await
        .unwrap();

        let added = service.add(request("Screening")).await.unwrap();
        assert!(!added.persisted);
        assert_eq!(service.list().await.configs.len(), 1);
    }

    #[test]
    fn form_values_become_text() {
        assert_eq!(form_text(&json!("45")), "45");
        assert_eq!(form_text(&json!(45)), "45");
        assert_eq!(form_text(&json!(true)), "true");
        assert_eq!(form_text(&json!(null)), "");
    }
}
