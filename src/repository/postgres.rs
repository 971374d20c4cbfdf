use std::time::Instant;

use async_trait::async_trait;
use sqlx::{postgres::PgRow, types::Json, PgPool, Row};

use super::{
    ActivityRepository, CandidateDirectory, ProgressRepository, RepositoryError,
    RoundConfigRepository,
};
use crate::{
    models::{
        activity::{ActivityAction, ActivityEntry},
        candidate::Candidate,
        progress::ProgressSnapshot,
        round::InterviewRound,
        round_config::InterviewRoundConfig,
    },
    utils::logger::LOGGER,
};

pub struct PgCandidateDirectory {
    pool: PgPool,
}

impl PgCandidateDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CandidateDirectory for PgCandidateDirectory {
    async fn get(&self, id: i32) -> Result<Option<Candidate>, RepositoryError> {
        let query = "SELECT id, name, email, position FROM candidates WHERE id = $1";
        let start_time = Instant::now();

        let candidate = sqlx::query_as::<_, Candidate>(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        LOGGER.log_database_query(
            query,
            start_time.elapsed().as_millis(),
            Some(candidate.iter().count()),
        );
        Ok(candidate)
    }
}

pub struct PgProgressRepository {
    pool: PgPool,
}

impl PgProgressRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const ROUND_COLUMNS: &str =
    "candidate_id, id, name, round_order, status, interviewer, scheduled_date, score, weight";

fn round_from_row(row: &PgRow) -> Result<(i32, InterviewRound), sqlx::Error> {
    Ok((
        row.try_get("candidate_id")?,
        InterviewRound {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            order: row.try_get("round_order")?,
            status: row.try_get("status")?,
            interviewer: row.try_get("interviewer")?,
            date: row.try_get("scheduled_date")?,
            score: row.try_get("score")?,
            weight: row.try_get("weight")?,
        },
    ))
}

#[async_trait]
impl ProgressRepository for PgProgressRepository {
    async fn get(&self, candidate_id: i32) -> Result<Option<ProgressSnapshot>, RepositoryError> {
        let query = format!(
            "SELECT {} FROM interview_rounds WHERE candidate_id = $1 ORDER BY round_order",
            ROUND_COLUMNS
        );
        let start_time = Instant::now();

        let rows = sqlx::query(&query)
            .bind(candidate_id)
            .fetch_all(&self.pool)
            .await?;

        LOGGER.log_database_query(&query, start_time.elapsed().as_millis(), Some(rows.len()));

        if rows.is_empty() {
            return Ok(None);
        }

        let rounds = rows
            .iter()
            .map(|row| round_from_row(row).map(|(_, round)| round))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(ProgressSnapshot {
            candidate_id,
            rounds,
        }))
    }

    async fn put(&self, snapshot: &ProgressSnapshot) -> Result<(), RepositoryError> {
        let start_time = Instant::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM interview_rounds WHERE candidate_id = $1")
            .bind(snapshot.candidate_id)
            .execute(&mut *tx)
            .await?;

        let insert = r#"
            INSERT INTO interview_rounds
                (candidate_id, id, name, round_order, status, interviewer,
                 scheduled_date, score, weight)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#;
        for round in &snapshot.rounds {
            sqlx::query(insert)
                .bind(snapshot.candidate_id)
                .bind(round.id)
                .bind(&round.name)
                .bind(round.order)
                .bind(round.status)
                .bind(&round.interviewer)
                .bind(round.date)
                .bind(round.score)
                .bind(round.weight)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        LOGGER.log_database_query(
            insert,
            start_time.elapsed().as_millis(),
            Some(snapshot.rounds.len()),
        );
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ProgressSnapshot>, RepositoryError> {
        let query = format!(
            "SELECT {} FROM interview_rounds ORDER BY candidate_id, round_order",
            ROUND_COLUMNS
        );
        let start_time = Instant::now();

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;

        LOGGER.log_database_query(&query, start_time.elapsed().as_millis(), Some(rows.len()));

        let mut snapshots: Vec<ProgressSnapshot> = Vec::new();
        for row in &rows {
            let (candidate_id, round) = round_from_row(row)?;
            match snapshots.last_mut() {
                Some(last) if last.candidate_id == candidate_id => last.rounds.push(round),
                _ => snapshots.push(ProgressSnapshot {
                    candidate_id,
                    rounds: vec![round],
                }),
            }
        }

        Ok(snapshots)
    }
}

pub struct PgRoundConfigRepository {
    pool: PgPool,
}

impl PgRoundConfigRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoundConfigRepository for PgRoundConfigRepository {
    async fn load(&self) -> Result<Vec<InterviewRoundConfig>, RepositoryError> {
        let query = r#"
            SELECT id, name, description, duration, interviewer, is_required, round_order
            FROM interview_round_configs
            ORDER BY round_order, id
        "#;
        let start_time = Instant::now();

        let configs = sqlx::query_as::<_, InterviewRoundConfig>(query)
            .fetch_all(&self.pool)
            .await?;

        LOGGER.log_database_query(query, start_time.elapsed().as_millis(), Some(configs.len()));
        Ok(configs)
    }

    async fn save_all(&self, configs: &[InterviewRoundConfig]) -> Result<(), RepositoryError> {
        let start_time = Instant::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM interview_round_configs")
            .execute(&mut *tx)
            .await?;

        let insert = r#"
            INSERT INTO interview_round_configs
                (id, name, description, duration, interviewer, is_required, round_order)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#;
        for config in configs {
            sqlx::query(insert)
                .bind(config.id)
                .bind(&config.name)
                .bind(&config.description)
                .bind(config.duration)
                .bind(&config.interviewer)
                .bind(config.is_required)
                .bind(config.order)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        LOGGER.log_database_query(insert, start_time.elapsed().as_millis(), Some(configs.len()));
        Ok(())
    }
}

pub struct PgActivityRepository {
    pool: PgPool,
}

impl PgActivityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivityRepository for PgActivityRepository {
    async fn record(&self, entry: &ActivityEntry) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO activity_log (id, occurred_at, candidate_id, action, payload)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(entry.id)
        .bind(entry.occurred_at)
        .bind(entry.candidate_id)
        .bind(entry.action.name())
        .bind(Json(&entry.action))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn recent(
        &self,
        candidate_id: Option<i32>,
        limit: usize,
    ) -> Result<Vec<ActivityEntry>, RepositoryError> {
        let query = r#"
            SELECT id, occurred_at, candidate_id, payload
            FROM activity_log
            WHERE $1::int IS NULL OR candidate_id = $1
            ORDER BY occurred_at DESC
            LIMIT $2
        "#;
        let start_time = Instant::now();

        let rows = sqlx::query(query)
            .bind(candidate_id)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;

        LOGGER.log_database_query(query, start_time.elapsed().as_millis(), Some(rows.len()));

        rows.iter()
            .map(|row| -> Result<ActivityEntry, RepositoryError> {
                let Json(action): Json<ActivityAction> = row
                    .try_get("payload")
                    .map_err(|e| RepositoryError::Corrupt(e.to_string()))?;
                Ok(ActivityEntry {
                    id: row.try_get("id")?,
                    occurred_at: row.try_get("occurred_at")?,
                    candidate_id: row.try_get("candidate_id")?,
                    action,
                })
            })
            .collect()
    }
}
