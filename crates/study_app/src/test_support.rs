//! In-process stand-ins for the HTTP services, shared by the unit tests.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use study_core::{
    ArtifactId, ArtifactSummary, Domain, GenerationRequest, GenerationResult, PendingInput,
};
use study_engine::{ApiError, DownloadedFile, EngineHandle, GenerationClient, HistoryStore};

use crate::effects::EffectRunner;
use crate::session::Session;

pub(crate) struct FakeGeneration;

#[async_trait::async_trait]
impl GenerationClient for FakeGeneration {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult, ApiError> {
        match &request.input {
            PendingInput::Text(text) => Ok(GenerationResult {
                content: format!("Material about {text} studied diligently"),
                artifact_id: Some(ArtifactId(7)),
            }),
            _ => Ok(GenerationResult {
                content: String::new(),
                artifact_id: None,
            }),
        }
    }

    async fn record_vocabulary(&self, _word: &str, _known: bool) -> Result<(), ApiError> {
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeHistory {
    pub(crate) saved: Mutex<Vec<(ArtifactId, String)>>,
}

#[async_trait::async_trait]
impl HistoryStore for FakeHistory {
    async fn list(&self, _domain: Domain) -> Result<Vec<ArtifactSummary>, ApiError> {
        Ok(vec![ArtifactSummary {
            id: ArtifactId(7),
            filename: "english_0601.md".into(),
            created_at: "2024-06-01T12:00:00".into(),
        }])
    }

    async fn get(&self, _id: ArtifactId) -> Result<String, ApiError> {
        Ok("# Stored".into())
    }

    async fn update(&self, id: ArtifactId, content: &str) -> Result<(), ApiError> {
        self.saved.lock().unwrap().push((id, content.to_string()));
        Ok(())
    }

    async fn remove(&self, _id: ArtifactId) -> Result<(), ApiError> {
        Ok(())
    }

    async fn download(&self, _id: ArtifactId) -> Result<DownloadedFile, ApiError> {
        Ok(DownloadedFile {
            filename: Some("english_0601.md".into()),
            content_type: None,
            bytes: Bytes::from_static(b"# Stored"),
        })
    }
}

pub(crate) fn fake_session(history: Arc<FakeHistory>, download_dir: &Path) -> Session {
    let engine = EngineHandle::new(Arc::new(FakeGeneration), history).unwrap();
    Session::new(
        Domain::English,
        EffectRunner::new(engine, download_dir.to_path_buf()),
        Duration::from_secs(5),
    )
}
