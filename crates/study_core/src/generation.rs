use crate::{ArtifactId, Domain, PendingInput};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub domain: Domain,
    pub input: PendingInput,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    /// Generated Markdown.
    pub content: String,
    /// Present iff the server persisted the output.
    pub artifact_id: Option<ArtifactId>,
}
