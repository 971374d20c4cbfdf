//! In-memory repositories. State lives in `RwLock`-guarded collections and
//! is lost on restart.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{
    ActivityRepository, CandidateDirectory, ProgressRepository, RepositoryError,
    RoundConfigRepository,
};
use crate::models::{
    activity::ActivityEntry, candidate::Candidate, progress::ProgressSnapshot,
    round_config::InterviewRoundConfig,
};

#[derive(Default)]
pub struct InMemoryCandidateDirectory {
    candidates: RwLock<HashMap<i32, Candidate>>,
}

impl InMemoryCandidateDirectory {
    pub fn with_candidates(candidates: impl IntoIterator<Item = Candidate>) -> Self {
        Self {
            candidates: RwLock::new(candidates.into_iter().map(|c| (c.id, c)).collect()),
        }
    }
}

#[async_trait]
impl CandidateDirectory for InMemoryCandidateDirectory {
    async fn get(&self, id: i32) -> Result<Option<Candidate>, RepositoryError> {
        Ok(self.candidates.read().await.get(&id).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryProgressRepository {
    snapshots: RwLock<BTreeMap<i32, ProgressSnapshot>>,
}

impl InMemoryProgressRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgressRepository for InMemoryProgressRepository {
    async fn get(&self, candidate_id: i32) -> Result<Option<ProgressSnapshot>, RepositoryError> {
        Ok(self.snapshots.read().await.get(&candidate_id).cloned())
    }

    async fn put(&self, snapshot: &ProgressSnapshot) -> Result<(), RepositoryError> {
        self.snapshots
            .write()
            .await
            .insert(snapshot.candidate_id, snapshot.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ProgressSnapshot>, RepositoryError> {
        Ok(self.snapshots.read().await.values().cloned().collect())
    }
}

#[derive(Default)]
pub struct InMemoryRoundConfigRepository {
    configs: RwLock<Vec<InterviewRoundConfig>>,
}

impl InMemoryRoundConfigRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_configs(configs: Vec<InterviewRoundConfig>) -> Self {
        Self {
            configs: RwLock::new(configs),
        }
    }
}

#[async_trait]
impl RoundConfigRepository for InMemoryRoundConfigRepository {
    async fn load(&self) -> Result<Vec<InterviewRoundConfig>, RepositoryError> {
        Ok(self.configs.read().await.clone())
    }

    async fn save_all(&self, configs: &[InterviewRoundConfig]) -> Result<(), RepositoryError> {
        *self.configs.write().await = configs.to_vec();
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryActivityRepository {
    entries: RwLock<Vec<ActivityEntry>>,
}

impl InMemoryActivityRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ActivityRepository for InMemoryActivityRepository {
    async fn record(&self, entry: &ActivityEntry) -> Result<(), RepositoryError> {
        self.entries.write().await.push(entry.clone());
        Ok(())
    }

    async fn recent(
        &self,
        candidate_id: Option<i32>,
        limit: usize,
    ) -> Result<Vec<ActivityEntry>, RepositoryError> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .rev()
            .filter(|entry| candidate_id.is_none() || entry.candidate_id == candidate_id)
            .take(limit)
            .cloned()
            .collect())
    }
}
