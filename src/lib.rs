//! Interview round progression tracker: candidate pipelines, their layout,
//! statistics and the round template editor, served over HTTP.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod services;
pub mod tracker;
pub mod utils;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::from_fn,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::Settings,
    handlers::{activity, progress, round_configs},
    middleware::request_log::request_log,
    services::{
        activity::ActivityService, progress::ProgressService, round_config::RoundConfigService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub progress: Arc<ProgressService>,
    pub round_configs: Arc<RoundConfigService>,
    pub activity: ActivityService,
}

pub fn app(state: AppState, settings: &Settings) -> anyhow::Result<Router> {
    let methods = [Method::GET, Method::POST, Method::PUT, Method::DELETE];
    let cors = if settings.cors_allowed_origin == "*" {
        CorsLayer::new()
            .allow_origin(HeaderValue::from_static("*"))
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE])
    } else {
        CorsLayer::new()
            .allow_origin(settings.cors_allowed_origin.parse::<HeaderValue>()?)
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE])
    };

    let router = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/progress", get(progress::list_progress))
        .route("/progress/summary", get(progress::get_summary))
        .route(
            "/candidates/:id/progress",
            get(progress::get_progress)
                .post(progress::create_progress)
                .put(progress::replace_progress),
        )
        .route("/candidates/:id/progress/start", post(progress::start_round))
        .route("/candidates/:id/progress/advance", post(progress::advance_round))
        .route("/candidates/:id/progress/reject", post(progress::reject_round))
        .route("/candidates/:id/activity", get(activity::get_candidate_activity))
        .route("/layout/:count", get(progress::get_layout))
        .route(
            "/round-configs",
            get(round_configs::list_round_configs).post(round_configs::create_round_config),
        )
        .route("/round-configs/renumber", post(round_configs::renumber))
        .route(
            "/round-configs/:id",
            put(round_configs::update_round_config).delete(round_configs::delete_round_config),
        )
        .route("/round-configs/:id/move-up", post(round_configs::move_up))
        .route("/round-configs/:id/move-down", post(round_configs::move_down))
        .route("/activity", get(activity::get_activity))
        .layer(from_fn(request_log))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(settings.max_request_body_kb * 1024))
        .with_state(state);

    Ok(router)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{candidate::Candidate, round_config::InterviewRoundConfig},
        repository::{
            InMemoryActivityRepository, InMemoryCandidateDirectory, InMemoryProgressRepository,
            InMemoryRoundConfigRepository,
        },
        services::notification::{tests::RecordingNotifier, NotificationService},
        tracker::{config_editor::EditorOptions, layout::LayoutPolicy},
    };
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn template(id: i32, name: &str, is_required: bool) -> InterviewRoundConfig {
        InterviewRoundConfig {
            id,
            name: name.to_string(),
            description: String::new(),
            duration: 30,
            interviewer: "Robin".to_string(),
            is_required,
            order: id,
        }
    }

    async fn test_app() -> Router {
        let directory = Arc::new(InMemoryCandidateDirectory::with_candidates([Candidate {
            id: 1,
            name: "Jane Doe".to_string(),
            email: "jane.doe@example.com".to_string(),
            position: None,
        }]));
        let activity = ActivityService::new(Arc::new(InMemoryActivityRepository::new()));
        let round_configs = RoundConfigService::load(
            Arc::new(InMemoryRoundConfigRepository::with_configs(vec![
                template(1, "Pre-screening", true),
                template(2, "HR", true),
                template(3, "Take-home", false),
                template(4, "Technical", true),
            ])),
            EditorOptions::default(),
            activity.clone(),
        )
        .await
        .unwrap();
        let progress = ProgressService::new(
            Arc::new(InMemoryProgressRepository::new()),
            directory.clone(),
            NotificationService::new(Arc::new(RecordingNotifier::default()), directory),
            activity.clone(),
            LayoutPolicy::default(),
        );

        let state = AppState {
            progress: Arc::new(progress),
            round_configs: Arc::new(round_configs),
            activity,
        };
        let settings = Settings {
            database_url: "postgres://unused".to_string(),
            ..Settings::default()
        };
        app(state, &settings).unwrap()
    }

    async fn call(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(match body {
                Some(body) => Body::from(body.to_string()),
                None => Body::empty(),
            })
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn statuses(value: &Value) -> Vec<&str> {
        value["rounds"]
            .as_array()
            .unwrap()
            .iter()
            .map(|round| round["status"].as_str().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn health_check() {
        let app = test_app().await;
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn progression_lifecycle_over_http() {
        let app = test_app().await;

        let (status, created) = call(
            &app,
            "POST",
            "/candidates/1/progress",
            Some(json!({ "include_optional": false })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(statuses(&created), vec!["current", "pending", "pending"]);
        assert_eq!(created["layout"]["shape"], "triangle");

        let (status, _) = call(&app, "POST", "/candidates/1/progress", Some(json!({}))).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, advanced) = call(&app, "POST", "/candidates/1/progress/advance", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(statuses(&advanced), vec!["passed", "current", "pending"]);
        assert_eq!(advanced["notifications_sent"], 1);

        let (_, rejected) = call(&app, "POST", "/candidates/1/progress/reject", None).await;
        assert_eq!(statuses(&rejected), vec!["passed", "failed", "pending"]);
        assert_eq!(rejected["stats"]["outcome"], "rejected");

        let (status, error) = call(&app, "POST", "/candidates/1/progress/advance", None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(error["error"], "CONFLICT");

        let (_, log) = call(&app, "GET", "/candidates/1/activity", None).await;
        assert_eq!(log[0]["action"], "round_failed");
        assert_eq!(log.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn explicit_rounds_are_validated() {
        let app = test_app().await;

        let (status, error) = call(
            &app,
            "POST",
            "/candidates/1/progress",
            Some(json!({ "rounds": [{ "name": "HR", "interviewer": "" }] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(error["details"]["interviewer"].is_array());

        let (status, _) = call(
            &app,
            "POST",
            "/candidates/42/progress",
            Some(json!({ "rounds": [{ "name": "HR", "interviewer": "Sam" }] })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn snapshot_replace_rejects_two_current_rounds() {
        let app = test_app().await;
        let round = |id: i32, status: &str| {
            json!({ "id": id, "name": format!("Round {}", id), "order": id,
                    "status": status, "interviewer": "Sam" })
        };

        let (status, _) = call(
            &app,
            "PUT",
            "/candidates/1/progress",
            Some(json!({ "rounds": [round(1, "current"), round(2, "current")] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, replaced) = call(
            &app,
            "PUT",
            "/candidates/1/progress",
            Some(json!({ "rounds": [round(1, "pending"), round(2, "pending")] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(replaced["current_round_id"], Value::Null);

        let (_, started) = call(&app, "POST", "/candidates/1/progress/start", None).await;
        assert_eq!(statuses(&started), vec!["current", "pending"]);

        let (_, log) = call(&app, "GET", "/candidates/1/activity", None).await;
        assert_eq!(log[0]["action"], "round_started");
        assert_eq!(log[0]["details"]["round_id"], 1);
    }

    #[tokio::test]
    async fn empty_snapshot_is_a_validation_error() {
        let app = test_app().await;

        let (status, body) = call(
            &app,
            "PUT",
            "/candidates/1/progress",
            Some(json!({ "rounds": [] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["details"]["rounds"].is_array());

        let (status, _) = call(&app, "GET", "/candidates/1/progress", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_progress_is_not_found() {
        let app = test_app().await;
        let (status, body) = call(&app, "GET", "/candidates/7/progress", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn layout_endpoint() {
        let app = test_app().await;

        let (_, pyramid) = call(&app, "GET", "/layout/7", None).await;
        assert_eq!(pyramid["shape"], "pyramid");
        assert_eq!(pyramid["cells"].as_array().unwrap().len(), 7);

        let (status, _) = call(&app, "GET", "/layout/100000", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn round_config_editing_over_http() {
        let app = test_app().await;

        let (status, created) = call(
            &app,
            "POST",
            "/round-configs",
            Some(json!({ "name": "Culture fit", "interviewer": "Ana", "duration": "abc" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(created["details"]["duration"].is_array());

        let (status, created) = call(
            &app,
            "POST",
            "/round-configs",
            Some(json!({ "name": "Culture fit", "interviewer": "Ana", "duration": 20 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["config"]["id"], 5);
        assert_eq!(created["config"]["order"], 5);

        let (_, updated) = call(
            &app,
            "PUT",
            "/round-configs/5",
            Some(json!({ "field": "duration", "value": "soon" })),
        )
        .await;
        assert_eq!(updated["config"]["duration"], 30);

        let (_, moved) = call(&app, "POST", "/round-configs/1/move-down", None).await;
        assert_eq!(moved["moved"], true);
        assert_eq!(moved["configs"][0]["name"], "HR");

        let (_, deleted) = call(&app, "DELETE", "/round-configs/3", None).await;
        assert_eq!(deleted["has_gaps"], true);

        let (_, renumbered) = call(&app, "POST", "/round-configs/renumber", None).await;
        assert_eq!(renumbered["has_gaps"], false);

        let (status, _) = call(&app, "DELETE", "/round-configs/99", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, log) = call(&app, "GET", "/activity?limit=2", None).await;
        let actions: Vec<&str> = log
            .as_array()
            .unwrap()
            .iter()
            .map(|entry| entry["action"].as_str().unwrap())
            .collect();
        assert_eq!(actions, vec!["configs_renumbered", "config_deleted"]);
    }
}
