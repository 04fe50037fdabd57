//! Axum route handlers for the Proposal API.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::proposal::models::{GenerationRequest, GenerationResult};
use crate::proposal::pipeline::run_pipeline;
use crate::proposal::quota::{usage_summary, UsageSummary};
use crate::state::AppState;

/// Surfaced when the result was generated but could not be saved.
pub const NOT_SAVED_WARNING: &str = "Proposal generated but failed to save to history.";

/// Surfaced when the result was saved but the usage counter was not updated.
pub const USAGE_SYNC_WARNING: &str =
    "Proposal saved to history, but your usage count could not be updated.";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateProposalBody {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub request: GenerationRequest,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateProposalResponse {
    pub result: GenerationResult,
    pub saved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposal_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageSummary>,
}

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/proposals/generate
///
/// Quota gate → compile → generate → save. Returns the proposal even when
/// saving fails, with `saved: false` and a warning.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(body): Json<GenerateProposalBody>,
) -> Result<Json<GenerateProposalResponse>, AppError> {
    body.request.validate().map_err(|errors| {
        AppError::Validation(
            errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; "),
        )
    })?;

    let outcome = run_pipeline(
        state.usage.as_ref(),
        state.records.as_ref(),
        state.backend.as_ref(),
        body.user_id,
        &body.request,
    )
    .await?;

    let proposal_id = outcome.proposal_id();
    let warning = if proposal_id.is_none() {
        Some(NOT_SAVED_WARNING)
    } else if outcome.usage_out_of_sync() {
        Some(USAGE_SYNC_WARNING)
    } else {
        None
    };

    Ok(Json(GenerateProposalResponse {
        result: outcome.result,
        saved: proposal_id.is_some(),
        proposal_id,
        warning: warning.map(str::to_string),
        usage: outcome.usage.map(UsageSummary::from),
    }))
}

/// GET /api/v1/usage?user_id=...
pub async fn handle_get_usage(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<UsageSummary>, AppError> {
    let summary = usage_summary(state.usage.as_ref(), params.user_id).await?;
    Ok(Json(summary))
}
