use crate::{ArtifactId, Domain, GenerationRequest, RequestId};

/// IO requested by the workflow. The host executes each effect and answers
/// with the matching completion message carrying the same `request_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Generate {
        request_id: RequestId,
        request: GenerationRequest,
    },
    RecordVocabulary {
        request_id: RequestId,
        word: String,
        known: bool,
    },
    ListHistory {
        request_id: RequestId,
        domain: Domain,
    },
    FetchArtifact {
        request_id: RequestId,
        id: ArtifactId,
    },
    SaveArtifact {
        request_id: RequestId,
        id: ArtifactId,
        content: String,
    },
    DeleteArtifact {
        request_id: RequestId,
        id: ArtifactId,
    },
    DownloadArtifact {
        request_id: RequestId,
        id: ArtifactId,
    },
}

impl Effect {
    pub fn request_id(&self) -> RequestId {
        match self {
            Effect::Generate { request_id, .. }
            | Effect::RecordVocabulary { request_id, .. }
            | Effect::ListHistory { request_id, .. }
            | Effect::FetchArtifact { request_id, .. }
            | Effect::SaveArtifact { request_id, .. }
            | Effect::DeleteArtifact { request_id, .. }
            | Effect::DownloadArtifact { request_id, .. } => *request_id,
        }
    }
}
