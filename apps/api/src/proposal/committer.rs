//! Result Committer: saves an accepted generation as a Draft proposal and
//! only then bumps the identity's usage counter.
//!
//! Runs after the result is already in hand. Failure here never discards the
//! result; the pipeline reports it as a separate persist outcome.

use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::models::proposal::{NewProposal, ProposalRecord, ProposalStatus};
use crate::proposal::models::{GenerationRequest, GenerationResult};
use crate::proposal::store::{RecordStore, StoreError, UsageStore};

#[derive(Debug, Error)]
pub enum PersistError {
    /// Nothing was written; the counter is unchanged.
    #[error("Failed to save proposal: {0}")]
    Insert(StoreError),

    /// The record was written but the counter was not incremented.
    #[error("Proposal {proposal_id} saved but usage counter not updated: {source}")]
    UsageSync {
        proposal_id: Uuid,
        source: StoreError,
    },

    #[error("Failed to serialize proposal: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub async fn commit(
    records: &dyn RecordStore,
    usage: &dyn UsageStore,
    identity: Uuid,
    req: &GenerationRequest,
    result: &GenerationResult,
) -> Result<ProposalRecord, PersistError> {
    let proposal = NewProposal {
        user_id: identity,
        job_title: req.job_title.trim().to_string(),
        platform: req.platform.as_str().to_string(),
        generated_proposal: serde_json::to_value(result)?,
        win_probability: i32::from(result.win_probability),
        status: ProposalStatus::Draft,
    };

    let record = records.insert(&proposal).await.map_err(|e| {
        warn!("Proposal for user {identity} generated but not saved: {e}");
        PersistError::Insert(e)
    })?;

    usage.increment_usage(identity).await.map_err(|e| {
        error!(
            "Proposal {} saved but usage increment failed for user {identity}: {e}",
            record.id
        );
        PersistError::UsageSync {
            proposal_id: record.id,
            source: e,
        }
    })?;

    info!(
        "Committed proposal {} (win_probability={}) for user {identity}",
        record.id, record.win_probability
    );
    Ok(record)
}
