use std::sync::Arc;

use crate::proposal::invoker::GenerationBackend;
use crate::proposal::store::{RecordStore, UsageStore};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Per-identity usage counter. Default: PgStore.
    pub usage: Arc<dyn UsageStore>,
    /// Proposal persistence. Default: PgStore.
    pub records: Arc<dyn RecordStore>,
    /// Generation backend. Default: LlmClient.
    pub backend: Arc<dyn GenerationBackend>,
}
