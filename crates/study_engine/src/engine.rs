use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use study_core::{ArtifactId, Domain, GenerationRequest};
use study_logging::{study_debug, study_error, study_info, study_warn};

use crate::{
    ApiClient, ApiError, ApiGenerationClient, ApiHistoryStore, EngineEvent, FailureKind,
    GenerationClient, HistoryStore, Ticket,
};

/// Work the host asks the engine to perform. Every command produces exactly
/// one [`EngineEvent`] carrying the same ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    Generate {
        ticket: Ticket,
        request: GenerationRequest,
    },
    RecordVocabulary {
        ticket: Ticket,
        word: String,
        known: bool,
    },
    ListHistory {
        ticket: Ticket,
        domain: Domain,
    },
    FetchArtifact {
        ticket: Ticket,
        id: ArtifactId,
    },
    SaveArtifact {
        ticket: Ticket,
        id: ArtifactId,
        content: String,
    },
    DeleteArtifact {
        ticket: Ticket,
        id: ArtifactId,
    },
    DownloadArtifact {
        ticket: Ticket,
        id: ArtifactId,
    },
}

pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(
        generation: Arc<dyn GenerationClient>,
        history: Arc<dyn HistoryStore>,
    ) -> Result<Self, ApiError> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<EngineCommand>();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Runtime::new()
            .map_err(|err| ApiError::new(FailureKind::Network, format!("tokio runtime: {err}")))?;

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let generation = generation.clone();
                let history = history.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    let event =
                        handle_command(generation.as_ref(), history.as_ref(), command).await;
                    if event_tx.send(event).is_err() {
                        study_debug!("event receiver gone; dropping completion");
                    }
                });
            }
            study_info!("engine command channel closed");
        });

        Ok(Self { cmd_tx, event_rx })
    }

    /// Engine backed by the REST API.
    pub fn connect(api: Arc<ApiClient>) -> Result<Self, ApiError> {
        Self::new(
            Arc::new(ApiGenerationClient::new(api.clone())),
            Arc::new(ApiHistoryStore::new(api)),
        )
    }

    pub fn submit(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            study_error!("engine thread is gone; command dropped");
        }
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn handle_command(
    generation: &dyn GenerationClient,
    history: &dyn HistoryStore,
    command: EngineCommand,
) -> EngineEvent {
    match command {
        EngineCommand::Generate { ticket, request } => {
            study_info!("[{ticket}] generating for {}", request.domain);
            let result = generation.generate(&request).await;
            log_outcome(ticket, "generate", &result);
            EngineEvent::Generated { ticket, result }
        }
        EngineCommand::RecordVocabulary {
            ticket,
            word,
            known,
        } => {
            let result = generation.record_vocabulary(&word, known).await;
            log_outcome(ticket, "record vocabulary", &result);
            EngineEvent::VocabularyRecorded { ticket, result }
        }
        EngineCommand::ListHistory { ticket, domain } => {
            let result = history.list(domain).await;
            if let Ok(entries) = &result {
                study_debug!("[{ticket}] {} history entries for {domain}", entries.len());
            }
            log_outcome(ticket, "list history", &result);
            EngineEvent::HistoryListed { ticket, result }
        }
        EngineCommand::FetchArtifact { ticket, id } => {
            let result = history.get(id).await;
            log_outcome(ticket, "fetch artifact", &result);
            EngineEvent::ArtifactFetched { ticket, id, result }
        }
        EngineCommand::SaveArtifact {
            ticket,
            id,
            content,
        } => {
            let result = history.update(id, &content).await;
            log_outcome(ticket, "save artifact", &result);
            EngineEvent::ArtifactSaved { ticket, id, result }
        }
        EngineCommand::DeleteArtifact { ticket, id } => {
            let result = history.remove(id).await;
            log_outcome(ticket, "delete artifact", &result);
            EngineEvent::ArtifactDeleted { ticket, id, result }
        }
        EngineCommand::DownloadArtifact { ticket, id } => {
            let result = history.download(id).await;
            if let Ok(file) = &result {
                study_debug!("[{ticket}] downloaded {} bytes for {id}", file.bytes.len());
            }
            log_outcome(ticket, "download artifact", &result);
            EngineEvent::ArtifactDownloaded { ticket, id, result }
        }
    }
}

fn log_outcome<T>(ticket: Ticket, what: &str, result: &Result<T, ApiError>) {
    if let Err(err) = result {
        study_warn!("[{ticket}] {what} failed: {err}");
    }
}
