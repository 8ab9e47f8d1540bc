use std::path::PathBuf;
use std::time::Duration;

use study_core::{ArtifactId, ClientError, DownloadReceipt, Effect, Msg};
use study_engine::{
    download_filename, AtomicFileWriter, DownloadedFile, EngineCommand, EngineEvent, EngineHandle,
};
use study_logging::{study_debug, study_info, study_warn};

/// Hands core effects to the engine and turns engine events back into
/// messages. Downloads are written to disk here, never cached.
pub struct EffectRunner {
    engine: EngineHandle,
    downloads: AtomicFileWriter,
    in_flight: usize,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, download_dir: PathBuf) -> Self {
        Self {
            engine,
            downloads: AtomicFileWriter::new(download_dir),
            in_flight: 0,
        }
    }

    pub fn enqueue(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            study_debug!("effect #{}", effect.request_id());
            self.engine.submit(command_for(effect));
            self.in_flight += 1;
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Wait for the next completion. `None` on timeout.
    pub fn next_msg(&mut self, timeout: Duration) -> Option<Msg> {
        let event = self.engine.recv_timeout(timeout)?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(self.translate(event))
    }

    fn translate(&self, event: EngineEvent) -> Msg {
        match event {
            EngineEvent::Generated { ticket, result } => Msg::GenerationFinished {
                request_id: ticket,
                result: result.map_err(ClientError::from),
            },
            EngineEvent::VocabularyRecorded { ticket, result } => Msg::VocabularyRecorded {
                request_id: ticket,
                result: result.map_err(ClientError::from),
            },
            EngineEvent::HistoryListed { ticket, result } => Msg::HistoryListed {
                request_id: ticket,
                result: result.map_err(ClientError::from),
            },
            EngineEvent::ArtifactFetched { ticket, id, result } => Msg::ArtifactLoaded {
                request_id: ticket,
                id,
                result: result.map_err(ClientError::from),
            },
            EngineEvent::ArtifactSaved { ticket, result, .. } => Msg::ArtifactSaved {
                request_id: ticket,
                result: result.map_err(ClientError::from),
            },
            EngineEvent::ArtifactDeleted { ticket, result, .. } => Msg::ArtifactRemoved {
                request_id: ticket,
                result: result.map_err(ClientError::from),
            },
            EngineEvent::ArtifactDownloaded { ticket, id, result } => {
                let result = match result {
                    Ok(file) => self.store_download(&file, id),
                    Err(err) => Err(ClientError::from(err)),
                };
                Msg::ArtifactDownloaded {
                    request_id: ticket,
                    result,
                }
            }
        }
    }

    fn store_download(
        &self,
        file: &DownloadedFile,
        id: ArtifactId,
    ) -> Result<DownloadReceipt, ClientError> {
        let filename = download_filename(file, id);
        match self.downloads.write(&filename, &file.bytes) {
            Ok(path) => {
                study_info!("wrote {} bytes to {:?}", file.bytes.len(), path);
                Ok(DownloadReceipt {
                    filename,
                    byte_len: file.bytes.len() as u64,
                })
            }
            Err(err) => {
                study_warn!("could not write {filename}: {err}");
                Err(ClientError::Storage(err.to_string()))
            }
        }
    }
}

pub(crate) fn command_for(effect: Effect) -> EngineCommand {
    match effect {
        Effect::Generate {
            request_id,
            request,
        } => EngineCommand::Generate {
            ticket: request_id,
            request,
        },
        Effect::RecordVocabulary {
            request_id,
            word,
            known,
        } => EngineCommand::RecordVocabulary {
            ticket: request_id,
            word,
            known,
        },
        Effect::ListHistory { request_id, domain } => EngineCommand::ListHistory {
            ticket: request_id,
            domain,
        },
        Effect::FetchArtifact { request_id, id } => EngineCommand::FetchArtifact {
            ticket: request_id,
            id,
        },
        Effect::SaveArtifact {
            request_id,
            id,
            content,
        } => EngineCommand::SaveArtifact {
            ticket: request_id,
            id,
            content,
        },
        Effect::DeleteArtifact { request_id, id } => EngineCommand::DeleteArtifact {
            ticket: request_id,
            id,
        },
        Effect::DownloadArtifact { request_id, id } => EngineCommand::DownloadArtifact {
            ticket: request_id,
            id,
        },
    }
}
