use std::sync::Arc;

use serde::{Deserialize, Serialize};
use study_core::{ArtifactId, ArtifactSummary, Domain};

use crate::{ApiClient, ApiError, DownloadedFile};

/// Remote store of persisted generation outputs, partitioned by domain.
#[async_trait::async_trait]
pub trait HistoryStore: Send + Sync {
    /// Summaries in server order.
    async fn list(&self, domain: Domain) -> Result<Vec<ArtifactSummary>, ApiError>;

    async fn get(&self, id: ArtifactId) -> Result<String, ApiError>;

    async fn update(&self, id: ArtifactId, content: &str) -> Result<(), ApiError>;

    async fn remove(&self, id: ArtifactId) -> Result<(), ApiError>;

    async fn download(&self, id: ArtifactId) -> Result<DownloadedFile, ApiError>;
}

pub struct ApiHistoryStore {
    api: Arc<ApiClient>,
}

impl ApiHistoryStore {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }
}

#[derive(Deserialize)]
struct SummaryWire {
    id: u64,
    #[serde(default)]
    filename: String,
    #[serde(default)]
    created_at: String,
}

#[derive(Deserialize)]
struct ContentWire {
    content: String,
}

#[derive(Serialize)]
struct ContentBody<'a> {
    content: &'a str,
}

#[async_trait::async_trait]
impl HistoryStore for ApiHistoryStore {
    async fn list(&self, domain: Domain) -> Result<Vec<ArtifactSummary>, ApiError> {
        let entries: Vec<SummaryWire> = self
            .api
            .get_json_with_query("/history", &[("type", domain.as_str())])
            .await?;
        Ok(entries
            .into_iter()
            .map(|entry| ArtifactSummary {
                id: ArtifactId(entry.id),
                filename: entry.filename,
                created_at: entry.created_at,
            })
            .collect())
    }

    async fn get(&self, id: ArtifactId) -> Result<String, ApiError> {
        let body: ContentWire = self.api.get_json(&format!("/history/{id}")).await?;
        Ok(body.content)
    }

    async fn update(&self, id: ArtifactId, content: &str) -> Result<(), ApiError> {
        self.api
            .put_ack(&format!("/history/{id}"), &ContentBody { content })
            .await
    }

    async fn remove(&self, id: ArtifactId) -> Result<(), ApiError> {
        self.api.delete_ack(&format!("/history/{id}")).await
    }

    async fn download(&self, id: ArtifactId) -> Result<DownloadedFile, ApiError> {
        self.api.get_bytes(&format!("/history/{id}/download")).await
    }
}
