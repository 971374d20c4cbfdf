use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Candidate record as exposed by the candidate lookup collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Candidate {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub position: Option<String>,
}
