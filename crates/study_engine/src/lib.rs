//! Study engine: REST client and effect execution for the study workflow.
mod api;
mod engine;
mod filename;
mod generation;
mod history;
mod notes;
mod persist;
mod settings;
mod types;

pub use api::{ApiClient, UnauthorizedHook};
pub use engine::{EngineCommand, EngineHandle};
pub use filename::download_filename;
pub use generation::{ApiGenerationClient, GenerationClient};
pub use history::{ApiHistoryStore, HistoryStore};
pub use notes::{NoteDetail, NoteSummary, ProgressReport, RecentNote, UploadReceipt};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use settings::{EngineSettings, DEFAULT_BASE_URL};
pub use types::{ApiError, DownloadedFile, EngineEvent, FailureKind, Ticket};
