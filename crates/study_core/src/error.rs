/// User-facing failure taxonomy. Every variant surfaces as a transient notice;
/// none of them leaves the workflow or its history cache half-updated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    #[error("input is empty")]
    Validation,
    #[error("unsupported file format: {filename}")]
    UnsupportedFormat { filename: String },
    #[error("a generation request is already in flight")]
    ConcurrentRequest,
    #[error("network error: {0}")]
    Network(String),
    #[error("server responded with status {0}")]
    Server(u16),
    #[error("session expired, please log in again")]
    Unauthorized,
    #[error("unexpected response: {0}")]
    InvalidResponse(String),
    #[error("{0:?} is not part of the current vocabulary")]
    UnknownWord(String),
    #[error("cannot change input while a generation is in flight")]
    Busy,
    #[error("could not write download: {0}")]
    Storage(String),
}
