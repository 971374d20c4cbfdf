use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

use crate::{
    repository::RepositoryError,
    services::ServiceError,
    tracker::error::TrackerError,
    utils::logger::{metadata, LOGGER},
};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub details: Option<HashMap<String, Vec<String>>>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug)]
pub enum AppError {
    ValidationError(HashMap<String, Vec<String>>),
    NotFound(String),
    Conflict(String),
    BadRequest(String),
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message, details) = match &self {
            AppError::ValidationError(errors) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "Validation failed".to_string(),
                Some(errors.clone()),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone(), None),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone(), None)
            }
            AppError::InternalServerError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
                msg.clone(),
                None,
            ),
        };

        let error_response = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
            timestamp: Utc::now(),
        };

        (status, Json(error_response)).into_response()
    }
}

impl From<TrackerError> for AppError {
    fn from(error: TrackerError) -> Self {
        match error {
            TrackerError::Validation { field, message } => {
                AppError::ValidationError(HashMap::from([(field, vec![message])]))
            }
            TrackerError::InvalidState(reason) => AppError::Conflict(reason.to_string()),
            not_found @ TrackerError::NotFound { .. } => AppError::NotFound(not_found.to_string()),
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(error: RepositoryError) -> Self {
        LOGGER.log_error(
            &error.to_string(),
            metadata([("error_type", serde_json::Value::String("repository".to_string()))]),
        );
        AppError::InternalServerError("Storage error occurred".to_string())
    }
}

impl From<ServiceError> for AppError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::Tracker(error) => error.into(),
            ServiceError::Repository(error) => error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::error::InvalidState;

    #[test]
    fn tracker_errors_map_to_statuses() {
        let cases = [
            (
                TrackerError::validation("name", "name must not be blank"),
                StatusCode::BAD_REQUEST,
            ),
            (
                TrackerError::InvalidState(InvalidState::NoCurrentRound),
                StatusCode::CONFLICT,
            ),
            (
                TrackerError::not_found("round config", 4),
                StatusCode::NOT_FOUND,
            ),
        ];

        for (error, status) in cases {
            let response = AppError::from(error).into_response();
            assert_eq!(response.status(), status);
        }
    }

    #[test]
    fn repository_errors_hide_details() {
        let error = RepositoryError::Unavailable("disk on fire".to_string());
        let response = AppError::from(error).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
