//! Store seams owned outside the pipeline: the per-identity usage counter
//! and the durable proposal record store.
//!
//! `PgStore` implements both over PostgreSQL. Tests use the in-memory
//! stores in `proposal::testing`.

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::models::proposal::{NewProposal, ProposalRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("No usage counter for identity {0}")]
    UnknownIdentity(Uuid),
}

/// Read/increment access to the per-identity usage counter.
///
/// There is no compare-and-increment: callers read, decide, and increment
/// later, so concurrent pipelines for one identity can overshoot the ceiling.
#[async_trait]
pub trait UsageStore: Send + Sync {
    async fn read_usage(&self, identity: Uuid) -> Result<u32, StoreError>;
    async fn increment_usage(&self, identity: Uuid) -> Result<(), StoreError>;
}

/// Append-only proposal persistence.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert(&self, proposal: &NewProposal) -> Result<ProposalRecord, StoreError>;
}

/// PostgreSQL-backed usage and record store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UsageStore for PgStore {
    async fn read_usage(&self, identity: Uuid) -> Result<u32, StoreError> {
        let count: Option<i32> =
            sqlx::query_scalar("SELECT proposal_count FROM users WHERE id = $1")
                .bind(identity)
                .fetch_optional(&self.pool)
                .await?;

        count
            .map(|c| c.max(0) as u32)
            .ok_or(StoreError::UnknownIdentity(identity))
    }

    async fn increment_usage(&self, identity: Uuid) -> Result<(), StoreError> {
        let result =
            sqlx::query("UPDATE users SET proposal_count = proposal_count + 1 WHERE id = $1")
                .bind(identity)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::UnknownIdentity(identity));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn insert(&self, proposal: &NewProposal) -> Result<ProposalRecord, StoreError> {
        let record = sqlx::query_as::<_, ProposalRecord>(
            r#"
            INSERT INTO proposals
                (id, user_id, job_title, platform, generated_proposal, win_probability, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(proposal.user_id)
        .bind(&proposal.job_title)
        .bind(&proposal.platform)
        .bind(&proposal.generated_proposal)
        .bind(proposal.win_probability)
        .bind(proposal.status.as_str())
        .fetch_one(&self.pool)
        .await?;

        info!(
            "Inserted proposal {} for user {}",
            record.id, record.user_id
        );
        Ok(record)
    }
}
