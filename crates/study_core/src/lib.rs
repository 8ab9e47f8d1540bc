//! Study client core: pure per-domain workflow state machine, input
//! classification, vocabulary extraction and the history cache.
mod decode;
mod domain;
mod effect;
mod error;
mod generation;
mod history;
mod input;
mod msg;
mod state;
mod update;
mod view_model;
pub mod vocabulary;

pub use domain::{Domain, DocumentRoute, DomainProfile, UnknownDomain};
pub use effect::Effect;
pub use error::ClientError;
pub use generation::{GenerationRequest, GenerationResult};
pub use history::{Artifact, ArtifactId, ArtifactSummary, HistoryCache, PanelState};
pub use input::{classify, InputMode, PendingInput, RawFile, RawInput};
pub use msg::{DownloadReceipt, Msg};
pub use state::{Notice, Phase, RequestId, WorkflowState};
pub use update::{update, update_with};
pub use view_model::{HistoryPanelView, SelectedArtifactView, WorkflowView};
pub use vocabulary::{VocabularyItem, VocabularyStatus, WordSource};
