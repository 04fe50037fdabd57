//! Request and result value types for proposal generation, plus the reply
//! schema shared by the compiler and the invoker.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum length of a job description, in characters, after trimming.
pub const MIN_JOB_DESCRIPTION_CHARS: usize = 10;

// ────────────────────────────────────────────────────────────────────────────
// Request enums
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Upwork,
    Fiverr,
    Freelancer,
    Linkedin,
    Email,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Upwork => "upwork",
            Platform::Fiverr => "fiverr",
            Platform::Freelancer => "freelancer",
            Platform::Linkedin => "linkedin",
            Platform::Email => "email",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Beginner,
    Intermediate,
    Expert,
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Beginner => "beginner",
            ExperienceLevel::Intermediate => "intermediate",
            ExperienceLevel::Expert => "expert",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Professional,
    Friendly,
    Bold,
    Formal,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Professional => "professional",
            Tone::Friendly => "friendly",
            Tone::Bold => "bold",
            Tone::Formal => "formal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalLength {
    Short,
    Medium,
    Long,
}

impl ProposalLength {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalLength::Short => "short",
            ProposalLength::Medium => "medium",
            ProposalLength::Long => "long",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// GenerationRequest
// ────────────────────────────────────────────────────────────────────────────

/// The job-posting facts a user submits. Never mutated after deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub platform: Platform,
    pub job_title: String,
    pub job_description: String,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub budget: Option<String>,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub portfolio_links: Option<String>,
    #[serde(default)]
    pub custom_instructions: Option<String>,
    pub skills: String,
    pub experience_level: ExperienceLevel,
    pub tone: Tone,
    pub length: ProposalLength,
}

/// A single constraint a `GenerationRequest` failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("jobTitle is required")]
    MissingJobTitle,

    #[error("jobDescription must be at least {} characters", MIN_JOB_DESCRIPTION_CHARS)]
    JobDescriptionTooShort,

    #[error("skills must list at least one skill")]
    MissingSkills,
}

impl GenerationRequest {
    /// Checks the string constraints serde cannot express.
    /// Returns every violation rather than stopping at the first.
    pub fn validate(&self) -> Result<(), Vec<RequestError>> {
        let mut errors = Vec::new();

        if self.job_title.trim().is_empty() {
            errors.push(RequestError::MissingJobTitle);
        }
        if self.job_description.trim().chars().count() < MIN_JOB_DESCRIPTION_CHARS {
            errors.push(RequestError::JobDescriptionTooShort);
        }
        if self.skills.trim().is_empty() {
            errors.push(RequestError::MissingSkills);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Returns the trimmed value of an optional form field, or `None` when the
/// field is absent or blank. Forms submit empty strings for untouched inputs.
pub fn supplied(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

// ────────────────────────────────────────────────────────────────────────────
// GenerationResult
// ────────────────────────────────────────────────────────────────────────────

/// A fully validated model reply. Only `invoker::parse_reply` builds one from
/// model output, and only once every field in `REPLY_SCHEMA` checks out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub hook: String,
    pub introduction: String,
    pub problem_understanding: String,
    pub solution: String,
    pub skills_mapping: String,
    pub portfolio_section: String,
    pub timeline: String,
    pub budget_section: String,
    pub call_to_action: String,
    pub ps_line: String,
    pub subject_lines: [String; 3],
    pub follow_up_messages: [String; 2],
    pub linkedin_dm: String,
    pub fiverr_bid: String,
    /// 0..=100
    pub win_probability: u8,
    pub win_probability_reasoning: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Reply schema
// ────────────────────────────────────────────────────────────────────────────

pub const MAX_WIN_PROBABILITY: u64 = 100;

/// JSON type required of one reply field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Array of exactly `n` strings.
    TextList(usize),
    /// Integer in 0..=MAX_WIN_PROBABILITY.
    Score,
}

impl FieldKind {
    pub fn describe(&self) -> String {
        match self {
            FieldKind::Text => "string".to_string(),
            FieldKind::TextList(n) => format!("array of exactly {n} strings"),
            FieldKind::Score => format!("integer from 0 to {MAX_WIN_PROBABILITY}"),
        }
    }
}

/// One required field of the model reply.
#[derive(Debug, Clone, Copy)]
pub struct ReplyField {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Example value shown to the model. For `TextList` the hint is
    /// expanded per element.
    pub hint: &'static str,
}

const fn text(name: &'static str, hint: &'static str) -> ReplyField {
    ReplyField {
        name,
        kind: FieldKind::Text,
        hint,
    }
}

/// Every field `GenerationResult` requires, in render order.
/// Field names must match the serde names on `GenerationResult`.
pub const REPLY_SCHEMA: &[ReplyField] = &[
    text("hook", "Attention grabbing opening line"),
    text("introduction", "Personalized intro"),
    text(
        "problemUnderstanding",
        "Demonstrate you understand their specific pain point",
    ),
    text("solution", "How you will solve it"),
    text("skillsMapping", "Why your skills match their needs"),
    text("portfolioSection", "How to present the portfolio links"),
    text("timeline", "Estimated timeline based on job desc"),
    text("budgetSection", "Comment on budget if applicable"),
    text("callToAction", "Strong closing"),
    text("psLine", "A 'P.S.' value add"),
    ReplyField {
        name: "subjectLines",
        kind: FieldKind::TextList(3),
        hint: "Option",
    },
    ReplyField {
        name: "followUpMessages",
        kind: FieldKind::TextList(2),
        hint: "Follow up",
    },
    text("linkedinDm", "Short version for LinkedIn DM"),
    text("fiverrBid", "Short version for Fiverr"),
    ReplyField {
        name: "winProbability",
        kind: FieldKind::Score,
        hint: "85",
    },
    text("winProbabilityReasoning", "Brief explanation of the score"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request_json() -> serde_json::Value {
        json!({
            "platform": "upwork",
            "jobTitle": "Rust backend developer",
            "jobDescription": "Build an Axum API for our invoicing product.",
            "skills": "Rust, Axum, PostgreSQL",
            "experienceLevel": "expert",
            "tone": "professional",
            "length": "medium"
        })
    }

    #[test]
    fn test_request_deserializes_with_optional_fields_absent() {
        let req: GenerationRequest = serde_json::from_value(request_json()).unwrap();
        assert_eq!(req.platform, Platform::Upwork);
        assert!(req.client_name.is_none());
        assert!(req.custom_instructions.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_request_rejects_unknown_platform() {
        let mut value = request_json();
        value["platform"] = json!("craigslist");
        let result: Result<GenerationRequest, _> = serde_json::from_value(value);
        assert!(result.is_err());
    }

    #[test]
    fn test_request_rejects_unknown_tone() {
        let mut value = request_json();
        value["tone"] = json!("sarcastic");
        let result: Result<GenerationRequest, _> = serde_json::from_value(value);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_collects_every_violation() {
        let mut value = request_json();
        value["jobTitle"] = json!("   ");
        value["jobDescription"] = json!("too short");
        value["skills"] = json!("");
        let req: GenerationRequest = serde_json::from_value(value).unwrap();

        let errors = req.validate().unwrap_err();
        assert_eq!(
            errors,
            vec![
                RequestError::MissingJobTitle,
                RequestError::JobDescriptionTooShort,
                RequestError::MissingSkills,
            ]
        );
    }

    #[test]
    fn test_description_of_exactly_ten_chars_passes() {
        let mut value = request_json();
        value["jobDescription"] = json!("0123456789");
        let req: GenerationRequest = serde_json::from_value(value).unwrap();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_supplied_treats_blank_as_absent() {
        assert_eq!(supplied(&None), None);
        assert_eq!(supplied(&Some("   ".to_string())), None);
        assert_eq!(supplied(&Some(" Acme ".to_string())), Some("Acme"));
    }

    #[test]
    fn test_reply_schema_matches_result_serialization() {
        let result = GenerationResult {
            hook: "h".into(),
            introduction: "i".into(),
            problem_understanding: "p".into(),
            solution: "s".into(),
            skills_mapping: "m".into(),
            portfolio_section: "ps".into(),
            timeline: "t".into(),
            budget_section: "b".into(),
            call_to_action: "c".into(),
            ps_line: "pl".into(),
            subject_lines: ["a".into(), "b".into(), "c".into()],
            follow_up_messages: ["x".into(), "y".into()],
            linkedin_dm: "l".into(),
            fiverr_bid: "f".into(),
            win_probability: 70,
            win_probability_reasoning: "r".into(),
        };
        let value = serde_json::to_value(&result).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object.len(), REPLY_SCHEMA.len());
        for field in REPLY_SCHEMA {
            assert!(
                object.contains_key(field.name),
                "GenerationResult has no serde field named {}",
                field.name
            );
        }
    }

    #[test]
    fn test_text_field_count() {
        let text_fields = REPLY_SCHEMA
            .iter()
            .filter(|f| f.kind == FieldKind::Text)
            .count();
        // ten narrative sections + linkedinDm + fiverrBid + reasoning
        assert_eq!(text_fields, 13);
    }
}
