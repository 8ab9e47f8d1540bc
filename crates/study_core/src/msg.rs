use crate::{ArtifactId, ArtifactSummary, ClientError, GenerationResult, RawFile, RequestId};

/// What the host reports after writing a downloaded artifact somewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadReceipt {
    pub filename: String,
    pub byte_len: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User typed or pasted text.
    TextEntered(String),
    /// User picked a file.
    FileChosen(RawFile),
    /// User pressed the generate trigger.
    GenerateClicked,
    /// User pressed clear.
    ClearClicked,
    /// User judged a vocabulary word.
    VocabularyChoice { word: String, known: bool },
    GenerationFinished {
        request_id: RequestId,
        result: Result<GenerationResult, ClientError>,
    },
    VocabularyRecorded {
        request_id: RequestId,
        result: Result<(), ClientError>,
    },
    /// History panel opened (or refreshed while open).
    HistoryOpened,
    HistoryClosed,
    HistoryListed {
        request_id: RequestId,
        result: Result<Vec<ArtifactSummary>, ClientError>,
    },
    ArtifactSelected(ArtifactId),
    ArtifactLoaded {
        request_id: RequestId,
        id: ArtifactId,
        result: Result<String, ClientError>,
    },
    EditStarted,
    EditChanged(String),
    EditCancelled,
    SaveClicked,
    ArtifactSaved {
        request_id: RequestId,
        result: Result<(), ClientError>,
    },
    DeleteClicked(ArtifactId),
    ArtifactRemoved {
        request_id: RequestId,
        result: Result<(), ClientError>,
    },
    DownloadClicked(ArtifactId),
    ArtifactDownloaded {
        request_id: RequestId,
        result: Result<DownloadReceipt, ClientError>,
    },
    /// The view owning this workflow went away.
    Unmounted,
    /// Fallback for placeholder wiring.
    NoOp,
}
