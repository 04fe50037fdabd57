#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle of a saved proposal. This service only ever writes `Draft`;
/// later transitions belong to the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalStatus {
    Draft,
    Submitted,
    Hired,
    Rejected,
}

impl ProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalStatus::Draft => "Draft",
            ProposalStatus::Submitted => "Submitted",
            ProposalStatus::Hired => "Hired",
            ProposalStatus::Rejected => "Rejected",
        }
    }
}

/// A row of the `proposals` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProposalRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub job_title: String,
    pub platform: String,
    /// The full GenerationResult, stored opaque.
    pub generated_proposal: Value,
    pub win_probability: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Insert payload; id and created_at are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewProposal {
    pub user_id: Uuid,
    pub job_title: String,
    pub platform: String,
    pub generated_proposal: Value,
    pub win_probability: i32,
    pub status: ProposalStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_labels_match_stored_values() {
        assert_eq!(ProposalStatus::Draft.as_str(), "Draft");
        assert_eq!(
            serde_json::to_value(ProposalStatus::Hired).unwrap(),
            serde_json::json!("Hired")
        );
    }
}
