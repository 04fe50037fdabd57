//! Quota Gate: advisory pre-generation check of the per-identity counter.
//!
//! The gate never writes. The counter is incremented by the committer after a
//! successful save, so this is an optimistic check, not a lock.

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::proposal::store::{StoreError, UsageStore};

/// Maximum accepted generations per identity.
pub const QUOTA_CEILING: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuotaDecision {
    pub allowed: bool,
    pub used: u32,
    pub ceiling: u32,
}

impl QuotaDecision {
    pub fn from_usage(used: u32) -> Self {
        Self {
            allowed: used < QUOTA_CEILING,
            used,
            ceiling: QUOTA_CEILING,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.ceiling.saturating_sub(self.used)
    }

    pub fn is_limit_reached(&self) -> bool {
        !self.allowed
    }
}

/// The counter could not be read. Callers must treat this as a denial.
#[derive(Debug, Error)]
#[error("Usage counter unavailable: {0}")]
pub struct QuotaError(#[from] pub StoreError);

pub async fn check_and_reserve(
    store: &dyn UsageStore,
    identity: Uuid,
) -> Result<QuotaDecision, QuotaError> {
    let used = store.read_usage(identity).await.map_err(|e| {
        error!("Quota check failed closed for user {identity}: {e}");
        QuotaError(e)
    })?;

    let decision = QuotaDecision::from_usage(used);
    info!(
        "Quota check for user {identity}: {}/{} used, allowed={}",
        decision.used, decision.ceiling, decision.allowed
    );
    Ok(decision)
}

/// Dashboard view of an identity's usage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSummary {
    pub used: u32,
    pub ceiling: u32,
    pub remaining: u32,
    pub is_limit_reached: bool,
}

impl From<QuotaDecision> for UsageSummary {
    fn from(decision: QuotaDecision) -> Self {
        Self {
            used: decision.used,
            ceiling: decision.ceiling,
            remaining: decision.remaining(),
            is_limit_reached: decision.is_limit_reached(),
        }
    }
}

pub async fn usage_summary(
    store: &dyn UsageStore,
    identity: Uuid,
) -> Result<UsageSummary, QuotaError> {
    let used = store.read_usage(identity).await?;
    Ok(QuotaDecision::from_usage(used).into())
}
