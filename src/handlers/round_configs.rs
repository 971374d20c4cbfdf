use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};

use crate::{
    models::round_config::{CreateRoundConfigRequest, MoveDirection, UpdateRoundConfigRequest},
    services::round_config::{RoundConfigChange, RoundConfigList},
    utils::errors::AppError,
    AppState,
};

pub async fn list_round_configs(State(state): State<AppState>) -> Json<RoundConfigList> {
    Json(state.round_configs.list().await)
}

pub async fn create_round_config(
    State(state): State<AppState>,
    Json(payload): Json<CreateRoundConfigRequest>,
) -> Result<(StatusCode, Json<RoundConfigChange>), AppError> {
    let change = state.round_configs.add(payload).await?;
    Ok((StatusCode::CREATED, Json(change)))
}

pub async fn update_round_config(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateRoundConfigRequest>,
) -> Result<Json<RoundConfigChange>, AppError> {
    let change = state
        .round_configs
        .update_field(id, payload.field, &payload.value)
        .await?;
    Ok(Json(change))
}

pub async fn delete_round_config(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<RoundConfigChange>, AppError> {
    Ok(Json(state.round_configs.delete(id).await?))
}

pub async fn move_up(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<RoundConfigChange>, AppError> {
    Ok(Json(state.round_configs.move_round(id, MoveDirection::Up).await?))
}

pub async fn move_down(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<RoundConfigChange>, AppError> {
    Ok(Json(state.round_configs.move_round(id, MoveDirection::Down).await?))
}

pub async fn renumber(State(state): State<AppState>) -> Json<RoundConfigChange> {
    Json(state.round_configs.renumber().await)
}
