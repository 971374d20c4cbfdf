use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;

use crate::{
    models::round::{InterviewRound, NewRoundRequest},
    services::progress::{ProgressUpdate, ProgressView, RoundSource},
    tracker::{layout::RoundLayout, stats::PipelineSummary, transition::Decision},
    utils::errors::AppError,
    AppState,
};

/// Upper bound for `/layout/:count`.
const MAX_LAYOUT_ROUNDS: usize = 1000;

#[derive(Debug, Deserialize)]
pub struct StartProgressRequest {
    /// Explicit rounds. When absent the round templates are used.
    pub rounds: Option<Vec<NewRoundRequest>>,
    #[serde(default = "include_optional_default")]
    pub include_optional: bool,
}

fn include_optional_default() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct ReplaceProgressRequest {
    pub rounds: Vec<InterviewRound>,
}

pub async fn list_progress(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProgressView>>, AppError> {
    Ok(Json(state.progress.list().await?))
}

pub async fn get_summary(State(state): State<AppState>) -> Result<Json<PipelineSummary>, AppError> {
    Ok(Json(state.progress.summary().await?))
}

pub async fn get_progress(
    State(state): State<AppState>,
    Path(candidate_id): Path<i32>,
) -> Result<Json<ProgressView>, AppError> {
    Ok(Json(state.progress.get(candidate_id).await?))
}

pub async fn create_progress(
    State(state): State<AppState>,
    Path(candidate_id): Path<i32>,
    Json(payload): Json<StartProgressRequest>,
) -> Result<(StatusCode, Json<ProgressUpdate>), AppError> {
    let source = match payload.rounds {
        Some(rounds) => RoundSource::Explicit(rounds),
        None => RoundSource::Templates(
            state
                .round_configs
                .instantiate(payload.include_optional)
                .await,
        ),
    };

    let update = state.progress.start(candidate_id, source).await?;
    Ok((StatusCode::CREATED, Json(update)))
}

pub async fn replace_progress(
    State(state): State<AppState>,
    Path(candidate_id): Path<i32>,
    Json(payload): Json<ReplaceProgressRequest>,
) -> Result<Json<ProgressUpdate>, AppError> {
    Ok(Json(state.progress.replace(candidate_id, payload.rounds).await?))
}

pub async fn start_round(
    State(state): State<AppState>,
    Path(candidate_id): Path<i32>,
) -> Result<Json<ProgressUpdate>, AppError> {
    decide(&state, candidate_id, Decision::Start).await
}

pub async fn advance_round(
    State(state): State<AppState>,
    Path(candidate_id): Path<i32>,
) -> Result<Json<ProgressUpdate>, AppError> {
    decide(&state, candidate_id, Decision::Advance).await
}

pub async fn reject_round(
    State(state): State<AppState>,
    Path(candidate_id): Path<i32>,
) -> Result<Json<ProgressUpdate>, AppError> {
    decide(&state, candidate_id, Decision::Reject).await
}

async fn decide(
    state: &AppState,
    candidate_id: i32,
    decision: Decision,
) -> Result<Json<ProgressUpdate>, AppError> {
    Ok(Json(state.progress.decide(candidate_id, decision).await?))
}

pub async fn get_layout(
    State(state): State<AppState>,
    Path(count): Path<usize>,
) -> Result<Json<RoundLayout>, AppError> {
    if count > MAX_LAYOUT_ROUNDS {
        return Err(AppError::BadRequest(format!(
            "layout is limited to {} rounds",
            MAX_LAYOUT_ROUNDS
        )));
    }
    Ok(Json(state.progress.layout(count)))
}
