use std::sync::Arc;

use reqwest::multipart::Form;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use study_core::{
    ArtifactId, DocumentRoute, Domain, DomainProfile, GenerationRequest, GenerationResult,
    PendingInput,
};
use study_logging::{study_debug, study_info};

use crate::notes::file_part;
use crate::{ApiClient, ApiError, FailureKind};

/// Turns a classified input into generated Markdown. One attempt per call.
#[async_trait::async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult, ApiError>;

    async fn record_vocabulary(&self, word: &str, known: bool) -> Result<(), ApiError>;
}

pub struct ApiGenerationClient {
    api: Arc<ApiClient>,
}

#[derive(Serialize)]
struct VocabularyBody<'a> {
    word: &'a str,
    known: bool,
}

impl ApiGenerationClient {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Run a note already in the library through notes generation. Image
    /// notes are flagged so the server treats their content as OCR output.
    pub async fn enhance_note(&self, note_id: u64) -> Result<GenerationResult, ApiError> {
        let note = self.api.note(note_id).await?;
        if note.content.trim().is_empty() {
            return Err(ApiError::new(
                FailureKind::Validation,
                format!("note {note_id} has no content"),
            ));
        }
        self.generate_from_text(Domain::Notes.profile(), &note.content, note.is_image())
            .await
    }

    async fn generate_from_text(
        &self,
        profile: &DomainProfile,
        text: &str,
        is_image: bool,
    ) -> Result<GenerationResult, ApiError> {
        let mut body = Map::new();
        body.insert(profile.text_field.to_string(), Value::String(text.to_string()));
        body.insert("is_image".to_string(), Value::Bool(is_image));
        study_debug!(
            "POST {} ({} chars, is_image={is_image})",
            profile.text_endpoint,
            text.len()
        );
        let response: Value = self.api.post_json(profile.text_endpoint, &body).await?;
        parse_generation(profile, response)
    }

    async fn generate_from_document(
        &self,
        profile: &DomainProfile,
        bytes: &[u8],
        filename: &str,
        mime_type: &str,
    ) -> Result<GenerationResult, ApiError> {
        match profile.document_route {
            DocumentRoute::Direct { endpoint } => {
                let form = Form::new().part("file", file_part(bytes.to_vec(), filename, mime_type)?);
                let response: Value = self.api.post_multipart(endpoint, form).await?;
                parse_generation(profile, response)
            }
            DocumentRoute::NoteUpload => {
                let receipt = self.api.upload_note(bytes.to_vec(), filename, mime_type).await?;
                study_info!("uploaded {filename} as note {}", receipt.note_id);
                let note = self.api.note(receipt.note_id).await?;
                if note.content.trim().is_empty() {
                    return Err(ApiError::new(
                        FailureKind::Decode,
                        format!("note {} has no extracted text", note.id),
                    ));
                }
                self.generate_from_text(profile, &note.content, receipt.is_image)
                    .await
            }
            DocumentRoute::Unsupported => Err(ApiError::new(
                FailureKind::UnsupportedFormat,
                filename.to_string(),
            )),
        }
    }
}

#[async_trait::async_trait]
impl GenerationClient for ApiGenerationClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult, ApiError> {
        if request.input.is_blank() {
            return Err(ApiError::new(FailureKind::Validation, "input is empty"));
        }
        let profile = request.domain.profile();
        match &request.input {
            PendingInput::Text(text) => self.generate_from_text(profile, text, false).await,
            PendingInput::InlineImage { data_uri, .. } => {
                self.generate_from_text(profile, data_uri, true).await
            }
            PendingInput::DocumentUpload {
                bytes,
                filename,
                mime_type,
            } => {
                self.generate_from_document(profile, bytes, filename, mime_type)
                    .await
            }
        }
    }

    async fn record_vocabulary(&self, word: &str, known: bool) -> Result<(), ApiError> {
        self.api
            .post_ack("/vocabulary", &VocabularyBody { word, known })
            .await
    }
}

#[derive(Deserialize)]
struct SaveId {
    #[serde(default)]
    save_id: Option<u64>,
}

fn parse_generation(profile: &DomainProfile, response: Value) -> Result<GenerationResult, ApiError> {
    let content = response
        .get(profile.result_field)
        .and_then(Value::as_str)
        .ok_or_else(|| {
            ApiError::new(
                FailureKind::Decode,
                format!("missing `{}` in response", profile.result_field),
            )
        })?
        .to_string();
    let saved: SaveId = serde_json::from_value(response)
        .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))?;
    Ok(GenerationResult {
        content,
        artifact_id: saved.save_id.map(ArtifactId),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use study_core::Domain;

    #[test]
    fn parses_result_field_and_save_id() {
        let result = parse_generation(
            Domain::Problem.profile(),
            json!({"analysis": "## Steps", "save_id": 4}),
        )
        .unwrap();
        assert_eq!(result.content, "## Steps");
        assert_eq!(result.artifact_id, Some(ArtifactId(4)));
    }

    #[test]
    fn missing_result_field_is_decode_failure() {
        let err = parse_generation(
            Domain::Notes.profile(),
            json!({"study_material": "wrong domain"}),
        )
        .unwrap_err();
        assert_eq!(err.kind, FailureKind::Decode);
    }

    #[test]
    fn unsaved_result_has_no_id() {
        let result = parse_generation(
            Domain::English.profile(),
            json!({"study_material": "text", "save_id": null}),
        )
        .unwrap();
        assert_eq!(result.artifact_id, None);
    }
}
