use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;

use crate::{models::activity::ActivityEntry, utils::errors::AppError, AppState};

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<usize>,
    pub candidate_id: Option<i32>,
}

pub async fn get_activity(
    State(state): State<AppState>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<Vec<ActivityEntry>>, AppError> {
    Ok(Json(state.activity.recent(query.candidate_id, query.limit).await?))
}

pub async fn get_candidate_activity(
    State(state): State<AppState>,
    Path(candidate_id): Path<i32>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<Vec<ActivityEntry>>, AppError> {
    Ok(Json(state.activity.recent(Some(candidate_id), query.limit).await?))
}
