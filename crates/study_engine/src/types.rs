use std::fmt;

use bytes::Bytes;
use study_core::{ArtifactId, ArtifactSummary, ClientError, GenerationResult};

/// Correlates an engine command with the event it produces.
pub type Ticket = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Generated {
        ticket: Ticket,
        result: Result<GenerationResult, ApiError>,
    },
    VocabularyRecorded {
        ticket: Ticket,
        result: Result<(), ApiError>,
    },
    HistoryListed {
        ticket: Ticket,
        result: Result<Vec<ArtifactSummary>, ApiError>,
    },
    ArtifactFetched {
        ticket: Ticket,
        id: ArtifactId,
        result: Result<String, ApiError>,
    },
    ArtifactSaved {
        ticket: Ticket,
        id: ArtifactId,
        result: Result<(), ApiError>,
    },
    ArtifactDeleted {
        ticket: Ticket,
        id: ArtifactId,
        result: Result<(), ApiError>,
    },
    ArtifactDownloaded {
        ticket: Ticket,
        id: ArtifactId,
        result: Result<DownloadedFile, ApiError>,
    },
}

impl EngineEvent {
    pub fn ticket(&self) -> Ticket {
        match self {
            EngineEvent::Generated { ticket, .. }
            | EngineEvent::VocabularyRecorded { ticket, .. }
            | EngineEvent::HistoryListed { ticket, .. }
            | EngineEvent::ArtifactFetched { ticket, .. }
            | EngineEvent::ArtifactSaved { ticket, .. }
            | EngineEvent::ArtifactDeleted { ticket, .. }
            | EngineEvent::ArtifactDownloaded { ticket, .. } => *ticket,
        }
    }
}

/// Raw download body, handed through without caching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    /// Filename from `Content-Disposition`, when the server sent one.
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ApiError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// Rejected locally before any request was sent.
    Validation,
    UnsupportedFormat,
    InvalidUrl,
    HttpStatus(u16),
    Unauthorized,
    Timeout,
    Network,
    Decode,
    TooLarge { max_bytes: u64, actual: Option<u64> },
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Validation => write!(f, "validation error"),
            FailureKind::UnsupportedFormat => write!(f, "unsupported format"),
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Unauthorized => write!(f, "unauthorized"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "undecodable response"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
        }
    }
}

impl From<ApiError> for ClientError {
    fn from(err: ApiError) -> Self {
        match err.kind {
            FailureKind::Validation => ClientError::Validation,
            FailureKind::UnsupportedFormat => ClientError::UnsupportedFormat {
                filename: err.message,
            },
            FailureKind::HttpStatus(status) => ClientError::Server(status),
            FailureKind::Unauthorized => ClientError::Unauthorized,
            FailureKind::InvalidUrl | FailureKind::Timeout | FailureKind::Network => {
                ClientError::Network(err.message)
            }
            FailureKind::Decode | FailureKind::TooLarge { .. } => {
                ClientError::InvalidResponse(err.to_string())
            }
        }
    }
}
