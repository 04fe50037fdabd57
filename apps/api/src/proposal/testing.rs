//! In-memory stores, a scripted backend, and fixtures for pipeline tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::proposal::{NewProposal, ProposalRecord};
use crate::proposal::compiler::Directives;
use crate::proposal::invoker::{BackendError, GenerationBackend, SamplingParams};
use crate::proposal::models::{
    ExperienceLevel, GenerationRequest, GenerationResult, Platform, ProposalLength, Tone,
};
use crate::proposal::store::{RecordStore, StoreError, UsageStore};

// ────────────────────────────────────────────────────────────────────────────
// Fixtures
// ────────────────────────────────────────────────────────────────────────────

pub fn sample_request() -> GenerationRequest {
    GenerationRequest {
        platform: Platform::Upwork,
        job_title: "Rust backend developer".to_string(),
        job_description: "Build an Axum API for our invoicing product.".to_string(),
        client_name: Some("Dana".to_string()),
        budget: None,
        deadline: Some("3 weeks".to_string()),
        portfolio_links: None,
        custom_instructions: None,
        skills: "Rust, Axum, PostgreSQL".to_string(),
        experience_level: ExperienceLevel::Expert,
        tone: Tone::Professional,
        length: ProposalLength::Medium,
    }
}

/// A reply that satisfies the full output contract.
pub fn valid_reply(win_probability: u8) -> Value {
    json!({
        "hook": "Your invoicing API deserves sub-10ms responses.",
        "introduction": "Hi Dana, I build Rust backends for fintech teams.",
        "problemUnderstanding": "You need a reliable invoicing API.",
        "solution": "An Axum service with PostgreSQL and typed errors.",
        "skillsMapping": "Rust, Axum and PostgreSQL daily for 5 years.",
        "portfolioSection": "See my billing engine case study.",
        "timeline": "Three weeks, delivered in weekly milestones.",
        "budgetSection": "Happy to scope to your budget.",
        "callToAction": "Can we schedule a 15 minute call this week?",
        "psLine": "P.S. I sketched your schema already.",
        "subjectLines": ["Subject 1", "Subject 2", "Subject 3"],
        "followUpMessages": ["Follow up 1", "Follow up 2"],
        "linkedinDm": "Hi Dana, saw your invoicing API post.",
        "fiverrBid": "Rust API expert, 3 week delivery.",
        "winProbability": win_probability,
        "winProbabilityReasoning": "Strong skills match, clear scope."
    })
}

pub fn sample_result(win_probability: u8) -> GenerationResult {
    serde_json::from_value(valid_reply(win_probability)).expect("fixture matches contract")
}

fn unavailable() -> StoreError {
    StoreError::Database(sqlx::Error::PoolTimedOut)
}

// ────────────────────────────────────────────────────────────────────────────
// InMemoryUsageStore
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryUsageStore {
    counters: Mutex<HashMap<Uuid, u32>>,
    unavailable: AtomicBool,
    increment_fails: AtomicBool,
    increments: AtomicUsize,
}

impl InMemoryUsageStore {
    pub fn with_usage(identity: Uuid, used: u32) -> Self {
        let store = Self::default();
        store.counters.lock().unwrap().insert(identity, used);
        store
    }

    pub fn usage(&self, identity: Uuid) -> Option<u32> {
        self.counters.lock().unwrap().get(&identity).copied()
    }

    pub fn increments(&self) -> usize {
        self.increments.load(Ordering::SeqCst)
    }

    /// Makes every read and increment fail.
    pub fn set_unavailable(&self, value: bool) {
        self.unavailable.store(value, Ordering::SeqCst);
    }

    /// Makes increments fail while reads keep working.
    pub fn set_increment_fails(&self, value: bool) {
        self.increment_fails.store(value, Ordering::SeqCst);
    }
}

#[async_trait]
impl UsageStore for InMemoryUsageStore {
    async fn read_usage(&self, identity: Uuid) -> Result<u32, StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.usage(identity)
            .ok_or(StoreError::UnknownIdentity(identity))
    }

    async fn increment_usage(&self, identity: Uuid) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) || self.increment_fails.load(Ordering::SeqCst)
        {
            return Err(unavailable());
        }
        let mut counters = self.counters.lock().unwrap();
        let counter = counters
            .get_mut(&identity)
            .ok_or(StoreError::UnknownIdentity(identity))?;
        *counter += 1;
        self.increments.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// InMemoryRecordStore
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryRecordStore {
    records: Mutex<Vec<ProposalRecord>>,
    unavailable: AtomicBool,
}

impl InMemoryRecordStore {
    pub fn set_unavailable(&self, value: bool) {
        self.unavailable.store(value, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn ids(&self) -> Vec<Uuid> {
        self.records.lock().unwrap().iter().map(|r| r.id).collect()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn insert(&self, proposal: &NewProposal) -> Result<ProposalRecord, StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let record = ProposalRecord {
            id: Uuid::new_v4(),
            user_id: proposal.user_id,
            job_title: proposal.job_title.clone(),
            platform: proposal.platform.clone(),
            generated_proposal: proposal.generated_proposal.clone(),
            win_probability: proposal.win_probability,
            status: proposal.status.as_str().to_string(),
            created_at: Utc::now(),
        };
        self.records.lock().unwrap().push(record.clone());
        Ok(record)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// ScriptedBackend
// ────────────────────────────────────────────────────────────────────────────

/// Returns the same scripted outcome on every call and records what it saw.
pub struct ScriptedBackend {
    outcome: Result<Option<String>, BackendError>,
    calls: AtomicUsize,
    last_params: Mutex<Option<SamplingParams>>,
}

impl ScriptedBackend {
    pub fn new(outcome: Result<Option<String>, BackendError>) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
            last_params: Mutex::new(None),
        }
    }

    pub fn replying(content: impl Into<String>) -> Self {
        Self::new(Ok(Some(content.into())))
    }

    pub fn failing(err: BackendError) -> Self {
        Self::new(Err(err))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_params(&self) -> Option<SamplingParams> {
        self.last_params.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn complete(
        &self,
        _directives: &Directives,
        params: &SamplingParams,
    ) -> Result<Option<String>, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_params.lock().unwrap() = Some(params.clone());
        // Yield so concurrent pipelines interleave at the network call.
        tokio::task::yield_now().await;
        self.outcome.clone()
    }
}
