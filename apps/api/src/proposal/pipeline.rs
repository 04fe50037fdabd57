//! Proposal generation pipeline.
//!
//! Flow: quota gate → compile directives → invoke backend → commit record →
//!       re-read usage.
//!
//! The generation result and the persist outcome are reported separately: a
//! failed save never hides a result the user has already paid a call for.

use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::proposal::ProposalRecord;
use crate::proposal::committer::{commit, PersistError};
use crate::proposal::compiler::compile;
use crate::proposal::invoker::{invoke, GenError, GenerationBackend, SamplingParams};
use crate::proposal::models::{GenerationRequest, GenerationResult};
use crate::proposal::quota::{check_and_reserve, QuotaDecision, QuotaError};
use crate::proposal::store::{RecordStore, UsageStore};

/// Failures that abort the pipeline before any result exists.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("You have reached the maximum limit of {ceiling} proposals ({used} used).")]
    QuotaExceeded { used: u32, ceiling: u32 },

    #[error(transparent)]
    QuotaUnavailable(#[from] QuotaError),

    #[error(transparent)]
    Generation(#[from] GenError),
}

/// Result of a pipeline run that reached the backend successfully.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub result: GenerationResult,
    pub persist: Result<ProposalRecord, PersistError>,
    /// Usage re-read after the commit attempt; `None` if the read failed.
    pub usage: Option<QuotaDecision>,
}

impl PipelineOutcome {
    /// Id of the stored record, if one was written. A `UsageSync` failure
    /// still leaves the record in history.
    pub fn proposal_id(&self) -> Option<Uuid> {
        match &self.persist {
            Ok(record) => Some(record.id),
            Err(PersistError::UsageSync { proposal_id, .. }) => Some(*proposal_id),
            Err(_) => None,
        }
    }

    pub fn saved(&self) -> bool {
        self.proposal_id().is_some()
    }

    /// True when the record was written but the usage counter was not bumped.
    pub fn usage_out_of_sync(&self) -> bool {
        matches!(self.persist, Err(PersistError::UsageSync { .. }))
    }
}

pub async fn run_pipeline(
    usage: &dyn UsageStore,
    records: &dyn RecordStore,
    backend: &dyn GenerationBackend,
    identity: Uuid,
    request: &GenerationRequest,
) -> Result<PipelineOutcome, PipelineError> {
    // Step 1: Quota gate (fails closed on read errors)
    let gate = check_and_reserve(usage, identity).await?;
    if !gate.allowed {
        return Err(PipelineError::QuotaExceeded {
            used: gate.used,
            ceiling: gate.ceiling,
        });
    }

    // Step 2: Compile directives
    let directives = compile(request);

    // Step 3: Generate and validate
    info!(
        "Generating {} proposal for user {identity}",
        request.platform.as_str()
    );
    let result = invoke(backend, &directives, &SamplingParams::default()).await?;

    // Step 4: Commit. Failure is downgraded to a warning on the outcome.
    let persist = commit(records, usage, identity, request, &result).await;

    // Step 5: Re-sync usage for the caller
    let usage = match usage.read_usage(identity).await {
        Ok(used) => Some(QuotaDecision::from_usage(used)),
        Err(e) => {
            warn!("Post-commit usage read failed for user {identity}: {e}");
            None
        }
    };

    Ok(PipelineOutcome {
        result,
        persist,
        usage,
    })
}
