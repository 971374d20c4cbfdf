use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use interview_tracker_backend::{
    app,
    config::Settings,
    repository::{
        PgActivityRepository, PgCandidateDirectory, PgProgressRepository, PgRoundConfigRepository,
    },
    services::{
        activity::ActivityService,
        notification::{LoggingNotifier, NotificationService},
        progress::ProgressService,
        round_config::RoundConfigService,
    },
    tracker::{config_editor::EditorOptions, layout::LayoutPolicy},
    utils::database::create_pool,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "interview_tracker_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env()?;

    let db = create_pool(&settings.database_url, settings.database_max_connections).await?;

    sqlx::migrate!("./migrations").run(&db).await?;

    let candidates = Arc::new(PgCandidateDirectory::new(db.clone()));
    let activity = ActivityService::new(Arc::new(PgActivityRepository::new(db.clone())));

    let round_configs = RoundConfigService::load(
        Arc::new(PgRoundConfigRepository::new(db.clone())),
        EditorOptions {
            default_duration: settings.default_round_duration,
            renumber_on_delete: settings.renumber_config_on_delete,
        },
        activity.clone(),
    )
    .await?;

    let progress = ProgressService::new(
        Arc::new(PgProgressRepository::new(db)),
        candidates.clone(),
        NotificationService::new(Arc::new(LoggingNotifier), candidates),
        activity.clone(),
        LayoutPolicy::new(settings.layout_triangle_max),
    );

    let state = AppState {
        progress: Arc::new(progress),
        round_configs: Arc::new(round_configs),
        activity,
    };

    let router = app(state, &settings)?;

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("Server running on http://{}", settings.bind_addr);

    axum::serve(listener, router).await?;

    Ok(())
}
