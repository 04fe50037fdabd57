// Cross-cutting prompt fragments shared by every feature that calls the model.
// Feature-specific prompts live in a prompts.rs alongside the feature.

/// Directive fragment that enforces a bare JSON object reply.
/// Paired with the backend's JSON-object response mode.
pub const JSON_ONLY_SYSTEM: &str = "You must output your response in valid JSON format ONLY. \
    Return a single JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include any conversational text before or after the JSON object.";
