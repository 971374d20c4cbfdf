//! Storage collaborators for the tracker.
//!
//! Each trait covers one contract the core consumes: candidate lookup,
//! progression snapshots, round templates and the activity log. Postgres
//! backs them in production; the in-memory versions back tests.

mod memory;
mod postgres;

pub use memory::{
    InMemoryActivityRepository, InMemoryCandidateDirectory, InMemoryProgressRepository,
    InMemoryRoundConfigRepository,
};
pub use postgres::{
    PgActivityRepository, PgCandidateDirectory, PgProgressRepository, PgRoundConfigRepository,
};

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    activity::ActivityEntry, candidate::Candidate, progress::ProgressSnapshot,
    round_config::InterviewRoundConfig,
};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    /// Stored data could not be turned back into domain values.
    #[error("corrupt record: {0}")]
    Corrupt(String),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Candidate lookup, owned by the external CRUD layer.
#[async_trait]
pub trait CandidateDirectory: Send + Sync {
    async fn get(&self, id: i32) -> Result<Option<Candidate>, RepositoryError>;
}

/// Round-state snapshots per candidate.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Returns None when the candidate has no stored rounds.
    async fn get(&self, candidate_id: i32) -> Result<Option<ProgressSnapshot>, RepositoryError>;

    /// Replaces the stored rounds for the snapshot's candidate.
    async fn put(&self, snapshot: &ProgressSnapshot) -> Result<(), RepositoryError>;

    /// Every stored snapshot, ordered by candidate id.
    async fn list(&self) -> Result<Vec<ProgressSnapshot>, RepositoryError>;
}

/// Round templates. The editor works on the whole set, so it is loaded and
/// saved as one unit.
#[async_trait]
pub trait RoundConfigRepository: Send + Sync {
    async fn load(&self) -> Result<Vec<InterviewRoundConfig>, RepositoryError>;

    async fn save_all(&self, configs: &[InterviewRoundConfig]) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait ActivityRepository: Send + Sync {
    async fn record(&self, entry: &ActivityEntry) -> Result<(), RepositoryError>;

    /// Newest first, optionally restricted to one candidate.
    async fn recent(
        &self,
        candidate_id: Option<i32>,
        limit: usize,
    ) -> Result<Vec<ActivityEntry>, RepositoryError>;
}
