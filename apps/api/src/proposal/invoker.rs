//! Generation Invoker: one backend call, then a strict contract check on
//! the reply.
//!
//! The model is an untrusted producer. A `GenerationResult` exists only if
//! every field in `REPLY_SCHEMA` is present with the declared type; anything
//! less is a `ContractViolation`, never a partial result.

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::proposal::compiler::Directives;
use crate::proposal::models::{
    FieldKind, GenerationResult, ReplyField, MAX_WIN_PROBABILITY, REPLY_SCHEMA,
};

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 3000;

/// Sampling settings passed through to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingParams {
    pub temperature: f32,
    pub max_output_tokens: u32,
    /// Ask the backend for a bare JSON object reply.
    pub json_object: bool,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            json_object: true,
        }
    }
}

/// Failure reported by a backend implementation.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// The call did not complete: network, timeout, or remote 5xx.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The provider answered but refused the request.
    #[error("backend rejected the request: {message}")]
    Rejected { status: Option<u16>, message: String },
}

/// Chat-style completion endpoint. Carried in `AppState` as
/// `Arc<dyn GenerationBackend>`; `LlmClient` is the production backend.
///
/// Returns the raw content of the reply, `None` if it carried none.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn complete(
        &self,
        directives: &Directives,
        params: &SamplingParams,
    ) -> Result<Option<String>, BackendError>;
}

/// Terminal failure of a generation attempt. None are retried here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenError {
    #[error("Generation request did not complete: {0}")]
    Transport(String),

    #[error("Generation backend returned an empty reply")]
    EmptyReply,

    #[error("Generation reply violated the output contract: {}", .problems.join("; "))]
    ContractViolation { problems: Vec<String> },

    #[error("{0}")]
    Upstream(String),
}

impl GenError {
    fn violation(problem: impl Into<String>) -> Self {
        GenError::ContractViolation {
            problems: vec![problem.into()],
        }
    }
}

/// Performs the remote call and validates the reply.
pub async fn invoke(
    backend: &dyn GenerationBackend,
    directives: &Directives,
    params: &SamplingParams,
) -> Result<GenerationResult, GenError> {
    let content = backend
        .complete(directives, params)
        .await
        .map_err(|e| match e {
            BackendError::Transport(msg) => {
                warn!("Generation transport failure: {msg}");
                GenError::Transport(msg)
            }
            BackendError::Rejected { status, message } => {
                warn!("Generation backend rejected request (status {status:?}): {message}");
                GenError::Upstream(message)
            }
        })?;

    let content = content
        .filter(|c| !c.trim().is_empty())
        .ok_or(GenError::EmptyReply)?;

    let result = parse_reply(&content).inspect_err(|e| warn!("{e}"))?;
    info!(
        "Generation reply accepted: win_probability={}",
        result.win_probability
    );
    Ok(result)
}

/// Validates raw model output against `REPLY_SCHEMA` and builds the result.
/// Every problem is collected so the error names all offending fields.
pub fn parse_reply(content: &str) -> Result<GenerationResult, GenError> {
    let value: Value = serde_json::from_str(content.trim())
        .map_err(|e| GenError::violation(format!("reply is not valid JSON: {e}")))?;

    let object = value.as_object().ok_or_else(|| {
        GenError::violation(format!(
            "reply must be a JSON object, got {}",
            json_type(&value)
        ))
    })?;

    let problems: Vec<String> = REPLY_SCHEMA
        .iter()
        .filter_map(|field| check_field(object, field))
        .collect();

    if !problems.is_empty() {
        return Err(GenError::ContractViolation { problems });
    }

    // Unknown extra keys are ignored; every required key has been checked.
    serde_json::from_value(value)
        .map_err(|e| GenError::violation(format!("reply does not match result shape: {e}")))
}

fn check_field(object: &Map<String, Value>, field: &ReplyField) -> Option<String> {
    let name = field.name;
    let Some(value) = object.get(name) else {
        return Some(format!("missing field `{name}`"));
    };

    match field.kind {
        FieldKind::Text if value.is_string() => None,
        FieldKind::Text => Some(format!(
            "field `{name}` must be a string, got {}",
            json_type(value)
        )),
        FieldKind::TextList(expected) => match value.as_array() {
            None => Some(format!(
                "field `{name}` must be an array, got {}",
                json_type(value)
            )),
            Some(items) if items.len() != expected => Some(format!(
                "field `{name}` must hold exactly {expected} strings, got {}",
                items.len()
            )),
            Some(items) => items
                .iter()
                .position(|item| !item.is_string())
                .map(|i| format!("field `{name}[{i}]` must be a string")),
        },
        FieldKind::Score => match value.as_u64() {
            Some(score) if score <= MAX_WIN_PROBABILITY => None,
            Some(score) => Some(format!(
                "field `{name}` must be between 0 and {MAX_WIN_PROBABILITY}, got {score}"
            )),
            None => Some(format!(
                "field `{name}` must be an integer from 0 to {MAX_WIN_PROBABILITY}, got {value}"
            )),
        },
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
