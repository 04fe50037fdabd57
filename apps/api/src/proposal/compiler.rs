//! Request Compiler: turns a `GenerationRequest` into the system/user
//! directive pair sent to the generation backend.
//!
//! Pure and deterministic: same request, same directives. No validation here;
//! the HTTP layer runs `GenerationRequest::validate` first.

use serde::Serialize;

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::proposal::models::{supplied, FieldKind, GenerationRequest, REPLY_SCHEMA};
use crate::proposal::prompts::{
    NONE, NONE_PROVIDED, NOT_SPECIFIED, PROPOSAL_PERSONA, PROPOSAL_PROMPT_TEMPLATE,
};

/// The instruction pair for one generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Directives {
    pub system: String,
    pub user: String,
}

pub fn compile(req: &GenerationRequest) -> Directives {
    let system = format!("{PROPOSAL_PERSONA}\n\n{JSON_ONLY_SYSTEM}");

    let reply_structure = render_reply_structure();
    let reply_types = render_reply_types();

    let user = fill_template(
        PROPOSAL_PROMPT_TEMPLATE,
        &[
            ("platform", req.platform.as_str()),
            ("job_title", req.job_title.trim()),
            ("job_description", req.job_description.trim()),
            (
                "client_name",
                supplied(&req.client_name).unwrap_or(NOT_SPECIFIED),
            ),
            ("budget", supplied(&req.budget).unwrap_or(NOT_SPECIFIED)),
            ("deadline", supplied(&req.deadline).unwrap_or(NOT_SPECIFIED)),
            ("skills", req.skills.trim()),
            ("experience_level", req.experience_level.as_str()),
            ("tone", req.tone.as_str()),
            ("length", req.length.as_str()),
            (
                "portfolio_links",
                supplied(&req.portfolio_links).unwrap_or(NONE_PROVIDED),
            ),
            (
                "custom_instructions",
                supplied(&req.custom_instructions).unwrap_or(NONE),
            ),
            ("reply_structure", reply_structure.as_str()),
            ("reply_types", reply_types.as_str()),
        ],
    );

    Directives { system, user }
}

/// Renders the example JSON object the model must reproduce, in schema order.
fn render_reply_structure() -> String {
    let lines: Vec<String> = REPLY_SCHEMA
        .iter()
        .map(|field| {
            let value = match field.kind {
                FieldKind::Text => format!("\"{}\"", field.hint),
                FieldKind::TextList(n) => {
                    let items: Vec<String> = (1..=n)
                        .map(|i| format!("\"{} {}\"", field.hint, i))
                        .collect();
                    format!("[{}]", items.join(", "))
                }
                FieldKind::Score => field.hint.to_string(),
            };
            format!("  \"{}\": {}", field.name, value)
        })
        .collect();

    format!("{{\n{}\n}}", lines.join(",\n"))
}

fn render_reply_types() -> String {
    REPLY_SCHEMA
        .iter()
        .map(|field| format!("- {}: {}", field.name, field.kind.describe()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Substitutes `{key}` placeholders in a single left-to-right pass.
/// Substituted values are never rescanned, so user text containing braces
/// (or another placeholder name) is inserted verbatim.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + 1024);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let replacement = after.find('}').and_then(|close| {
            let key = &after[..close];
            values
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v, close))
        });

        match replacement {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
