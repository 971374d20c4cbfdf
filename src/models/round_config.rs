use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Administrator defined template for one round of future pipelines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct InterviewRoundConfig {
    pub id: i32,
    pub name: String,
    pub description: String,
    /// Minutes.
    pub duration: i32,
    pub interviewer: String,
    pub is_required: bool,
    #[sqlx(rename = "round_order")]
    pub order: i32,
}

/// Duration as submitted by the editor form: either a number or raw text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DurationInput {
    Minutes(i32),
    Text(String),
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRoundConfigRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub duration: Option<DurationInput>,
    #[validate(length(min = 1))]
    pub interviewer: String,
    #[serde(default = "default_required")]
    pub is_required: bool,
}

fn default_required() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundConfigField {
    Name,
    Description,
    Duration,
    Interviewer,
    IsRequired,
}

impl RoundConfigField {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoundConfigField::Name => "name",
            RoundConfigField::Description => "description",
            RoundConfigField::Duration => "duration",
            RoundConfigField::Interviewer => "interviewer",
            RoundConfigField::IsRequired => "is_required",
        }
    }
}

/// Single-field edit, mirroring how the editor form submits changes.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRoundConfigRequest {
    pub field: RoundConfigField,
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveDirection {
    Up,
    Down,
}
