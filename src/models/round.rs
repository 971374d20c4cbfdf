use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "round_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RoundStatus {
    Pending,
    Current,
    Passed,
    Failed,
}

impl RoundStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoundStatus::Pending => "pending",
            RoundStatus::Current => "current",
            RoundStatus::Passed => "passed",
            RoundStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for RoundStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stage of a candidate's interview pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct InterviewRound {
    pub id: i32,
    pub name: String,
    #[sqlx(rename = "round_order")]
    pub order: i32,
    pub status: RoundStatus,
    pub interviewer: String,
    #[serde(default)]
    #[sqlx(rename = "scheduled_date")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub weight: Option<f64>,
}

impl InterviewRound {
    pub fn new(
        id: i32,
        order: i32,
        name: impl Into<String>,
        interviewer: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            order,
            status: RoundStatus::Pending,
            interviewer: interviewer.into(),
            date: None,
            score: None,
            weight: None,
        }
    }

    pub fn with_status(mut self, status: RoundStatus) -> Self {
        self.status = status;
        self
    }
}

/// A round supplied by the operator when starting a progression by hand.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewRoundRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub interviewer: String,
    pub date: Option<NaiveDate>,
    pub score: Option<f64>,
    pub weight: Option<f64>,
}
