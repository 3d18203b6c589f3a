pub mod context;
pub mod extract;
pub mod flow;

use thiserror::Error;

/// Terminal failure of an inference phase: the underlying call failed
/// or returned output that does not conform to its schema. Never
/// retried and never repaired locally.
#[derive(Debug, Error)]
#[error(
    "Could not analyze the syllabus. The AI service may be down or the document format is not supported."
)]
pub struct InferenceFailure(pub anyhow::Error);
