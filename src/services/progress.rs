use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::{
    models::{
        activity::ActivityAction,
        progress::CandidateInterviewProgress,
        round::{InterviewRound, NewRoundRequest},
    },
    repository::{CandidateDirectory, ProgressRepository, RepositoryError},
    services::{activity::ActivityService, notification::NotificationService, ServiceError},
    tracker::{
        error::{InvalidState, TrackerError},
        event::ProgressEvent,
        layout::{LayoutPolicy, RoundLayout},
        stats::{PipelineSummary, ProgressStats},
        transition::{self, Decision, Transition},
    },
    utils::logger::{metadata, LOGGER},
};

/// Where the rounds of a new progression come from.
pub enum RoundSource {
    Explicit(Vec<NewRoundRequest>),
    Templates(Vec<InterviewRound>),
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressView {
    #[serde(flatten)]
    pub progress: CandidateInterviewProgress,
    pub current_round_id: Option<i32>,
    pub stats: ProgressStats,
    pub layout: RoundLayout,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressUpdate {
    #[serde(flatten)]
    pub view: ProgressView,
    pub events: Vec<ProgressEvent>,
    /// False when the snapshot write failed; the change still stands.
    pub persisted: bool,
    pub notifications_sent: usize,
}

/// Owns the live progressions and wires transitions to storage,
/// notifications and the activity log.
///
/// Loaded progressions are the source of truth. Snapshot writes,
/// notifications and activity records are best effort: their failures are
/// logged and never roll a transition back. All mutations run under one
/// lock, so decisions for a candidate are applied strictly in sequence.
///
/// A progression read from storage stays in memory for the life of the
/// process and is never re-read, so the working set grows with the number
/// of candidates touched. Run a single instance per database.
pub struct ProgressService {
    progressions: Mutex<HashMap<i32, CandidateInterviewProgress>>,
    repository: Arc<dyn ProgressRepository>,
    candidates: Arc<dyn CandidateDirectory>,
    notifications: NotificationService,
    activity: ActivityService,
    layout: LayoutPolicy,
}

impl ProgressService {
    pub fn new(
        repository: Arc<dyn ProgressRepository>,
        candidates: Arc<dyn CandidateDirectory>,
        notifications: NotificationService,
        activity: ActivityService,
        layout: LayoutPolicy,
    ) -> Self {
        Self {
            progressions: Mutex::new(HashMap::new()),
            repository,
            candidates,
            notifications,
            activity,
            layout,
        }
    }

    pub fn layout(&self, round_count: usize) -> RoundLayout {
        self.layout.layout(round_count)
    }

    pub fn view(&self, progress: &CandidateInterviewProgress) -> ProgressView {
        ProgressView {
            progress: progress.clone(),
            current_round_id: progress.current_round().map(|round| round.id),
            stats: ProgressStats::of(progress),
            layout: self.layout.layout(progress.rounds().len()),
        }
    }

    pub async fn get(&self, candidate_id: i32) -> Result<ProgressView, ServiceError> {
        let mut progressions = self.progressions.lock().await;
        let progress = self.load(&mut progressions, candidate_id).await?;
        Ok(self.view(progress))
    }

    /// Stored progressions merged with the live ones, by candidate id.
    pub async fn list(&self) -> Result<Vec<ProgressView>, ServiceError> {
        let progressions = self.progressions.lock().await;
        let snapshots = self.repository.list().await?;

        let mut merged: BTreeMap<i32, CandidateInterviewProgress> = BTreeMap::new();
        for snapshot in snapshots {
            let candidate_id = snapshot.candidate_id;
            if progressions.contains_key(&candidate_id) {
                continue;
            }
            match CandidateInterviewProgress::from_snapshot(snapshot) {
                Ok(progress) => {
                    merged.insert(candidate_id, progress);
                }
                Err(e) => LOGGER.log_error(
                    &e.to_string(),
                    metadata([
                        ("error_type", serde_json::Value::String("corrupt_snapshot".to_string())),
                        ("candidate_id", serde_json::Value::from(candidate_id)),
                    ]),
                ),
            }
        }
        for (candidate_id, progress) in progressions.iter() {
            merged.insert(*candidate_id, progress.clone());
        }

        Ok(merged.values().map(|progress| self.view(progress)).collect())
    }

    pub async fn summary(&self) -> Result<PipelineSummary, ServiceError> {
        let views = self.list().await?;
        Ok(PipelineSummary::of(views.iter().map(|view| &view.progress)))
    }

    pub async fn start(
        &self,
        candidate_id: i32,
        source: RoundSource,
    ) -> Result<ProgressUpdate, ServiceError> {
        self.require_candidate(candidate_id).await?;

        let mut progressions = self.progressions.lock().await;
        if progressions.contains_key(&candidate_id)
            || self.repository.get(candidate_id).await?.is_some()
        {
            return Err(TrackerError::from(InvalidState::ProgressExists(candidate_id)).into());
        }

        let (progress, from_templates) = match source {
            RoundSource::Explicit(requests) => (
                CandidateInterviewProgress::from_requests(candidate_id, requests)?,
                false,
            ),
            RoundSource::Templates(rounds) => {
                if rounds.is_empty() {
                    return Err(TrackerError::validation(
                        "rounds",
                        "no round templates are configured",
                    )
                    .into());
                }
                (CandidateInterviewProgress::start(candidate_id, rounds)?, true)
            }
        };

        progressions.insert(candidate_id, progress.clone());
        let persisted = self.persist(&progress).await;
        drop(progressions);

        self.activity
            .record(
                Some(candidate_id),
                ActivityAction::ProgressStarted {
                    round_count: progress.rounds().len(),
                    from_templates,
                },
            )
            .await;

        Ok(self.update(&progress, Vec::new(), persisted, 0))
    }

    /// Replaces a candidate's rounds with a validated snapshot.
    pub async fn replace(
        &self,
        candidate_id: i32,
        rounds: Vec<InterviewRound>,
    ) -> Result<ProgressUpdate, ServiceError> {
        self.require_candidate(candidate_id).await?;
        let progress = CandidateInterviewProgress::from_rounds(candidate_id, rounds)?;

        let mut progressions = self.progressions.lock().await;
        progressions.insert(candidate_id, progress.clone());
        let persisted = self.persist(&progress).await;
        drop(progressions);

        self.activity
            .record(
                Some(candidate_id),
                ActivityAction::SnapshotReplaced {
                    round_count: progress.rounds().len(),
                },
            )
            .await;

        Ok(self.update(&progress, Vec::new(), persisted, 0))
    }

    pub async fn decide(
        &self,
        candidate_id: i32,
        decision: Decision,
    ) -> Result<ProgressUpdate, ServiceError> {
        let mut progressions = self.progressions.lock().await;
        let progress = self.load(&mut progressions, candidate_id).await?;

        let Transition {
            progress: next,
            events,
        } = transition::apply(progress, decision)?;
        *progress = next.clone();

        let persisted = self.persist(&next).await;
        drop(progressions);

        LOGGER.log_business_event(
            "progress_decision_applied",
            Some(candidate_id),
            metadata([
                ("decision", serde_json::to_value(decision).unwrap_or_default()),
                ("events", serde_json::Value::from(events.len())),
                ("persisted", serde_json::Value::Bool(persisted)),
            ]),
        );

        if decision == Decision::Start {
            if let Some(round) = next.current_round() {
                self.activity
                    .record(
                        Some(candidate_id),
                        ActivityAction::RoundStarted {
                            round_id: round.id,
                            round_name: round.name.clone(),
                        },
                    )
                    .await;
            }
        }
        for event in &events {
            self.activity
                .record(Some(candidate_id), activity_for(event))
                .await;
        }
        let notifications_sent = self.notifications.dispatch(&events).await;

        Ok(self.update(&next, events, persisted, notifications_sent))
    }

    async fn load<'a>(
        &self,
        progressions: &'a mut HashMap<i32, CandidateInterviewProgress>,
        candidate_id: i32,
    ) -> Result<&'a mut CandidateInterviewProgress, ServiceError> {
        if !progressions.contains_key(&candidate_id) {
            let snapshot = self
                .repository
                .get(candidate_id)
                .await?
                .ok_or_else(|| TrackerError::not_found("progression", candidate_id))?;
            let progress = CandidateInterviewProgress::from_snapshot(snapshot)
                .map_err(|e| RepositoryError::Corrupt(e.to_string()))?;
            progressions.insert(candidate_id, progress);
        }

        progressions
            .get_mut(&candidate_id)
            .ok_or_else(|| TrackerError::not_found("progression", candidate_id).into())
    }

    async fn require_candidate(&self, candidate_id: i32) -> Result<(), ServiceError> {
        match self.candidates.get(candidate_id).await? {
            Some(_) => Ok(()),
            None => Err(TrackerError::not_found("candidate", candidate_id).into()),
        }
    }

    async fn persist(&self, progress: &CandidateInterviewProgress) -> bool {
        match self.repository.put(&progress.snapshot()).await {
            Ok(()) => true,
            Err(e) => {
                LOGGER.log_error(
                    &e.to_string(),
                    metadata([
                        ("error_type", serde_json::Value::String("snapshot_write".to_string())),
                        ("candidate_id", serde_json::Value::from(progress.candidate_id())),
                    ]),
                );
                false
            }
        }
    }

    fn update(
        &self,
        progress: &CandidateInterviewProgress,
        events: Vec<ProgressEvent>,
        persisted: bool,
        notifications_sent: usize,
    ) -> ProgressUpdate {
        ProgressUpdate {
            view: self.view(progress),
            events,
            persisted,
            notifications_sent,
        }
    }
}

fn activity_for(event: &ProgressEvent) -> ActivityAction {
    match event {
        ProgressEvent::RoundPassed {
            round_id,
            round_name,
            ..
        } => ActivityAction::RoundPassed {
            round_id: *round_id,
            round_name: round_name.clone(),
        },
        ProgressEvent::RoundFailed {
            round_id,
            round_name,
            ..
        } => ActivityAction::RoundFailed {
            round_id: *round_id,
            round_name: round_name.clone(),
        },
        ProgressEvent::ProgressCompleted { round_count, .. } => ActivityAction::ProgressCompleted {
            round_count: *round_count,
        },
    }
}
