pub mod activity;
pub mod notification;
pub mod progress;
pub mod round_config;

use thiserror::Error;

use crate::{repository::RepositoryError, tracker::error::TrackerError};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Tracker(#[from] TrackerError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
