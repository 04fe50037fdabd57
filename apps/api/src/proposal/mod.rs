// Proposal generation: quota gate, directive compiler, generation invoker,
// result committer, and the pipeline that runs them in order.
// All model calls go through the GenerationBackend seam; LlmClient is the
// production backend.

pub mod committer;
pub mod compiler;
pub mod handlers;
pub mod invoker;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod quota;
pub mod store;
#[cfg(test)]
pub mod testing;
