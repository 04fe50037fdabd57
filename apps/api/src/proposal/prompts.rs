// Prompt constants for proposal generation.
// Reuses the JSON-only fragment from llm_client::prompts.

/// Persona and goals for the proposal writer. The JSON-only contract is
/// appended by the compiler.
pub const PROPOSAL_PERSONA: &str = "You are PitchForge AI, an expert freelance copywriter who \
specializes in writing high-converting proposals for platforms like Upwork, Fiverr, Freelancer, \
and LinkedIn.

Your goal is to write a proposal that:
1. Grabs attention immediately (great hook).
2. Proves you read the job description (mirroring language).
3. Focuses on the client's problem, not just your skills.
4. Proposes a clear solution and next step.";

/// Placeholder for absent client name, budget and deadline.
pub const NOT_SPECIFIED: &str = "Not specified";
/// Placeholder for absent portfolio links.
pub const NONE_PROVIDED: &str = "None provided";
/// Placeholder for absent custom instructions.
pub const NONE: &str = "None";

/// User directive template.
/// Replace: {platform}, {job_title}, {job_description}, {client_name}, {budget},
///          {deadline}, {skills}, {experience_level}, {tone}, {length},
///          {portfolio_links}, {custom_instructions}, {reply_structure}, {reply_types}
pub const PROPOSAL_PROMPT_TEMPLATE: &str = r#"Generate a freelance proposal based on these details:

- Platform: {platform}
- Job Title: {job_title}
- Job Description: "{job_description}"
- Client Name: {client_name}
- Budget: {budget}
- Deadline: {deadline}
- My Skills: {skills}
- Experience Level: {experience_level}
- Tone: {tone}
- Length: {length}
- Portfolio Links: {portfolio_links}
- Custom Instructions: {custom_instructions}

REQUIRED JSON STRUCTURE:
{reply_structure}

FIELD TYPES (every field is required, no field may be null):
{reply_types}"#;
