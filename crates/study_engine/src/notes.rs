use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use study_logging::study_debug;

use crate::{ApiClient, ApiError};

/// Response of the generic `/upload` endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadReceipt {
    pub note_id: u64,
    #[serde(default)]
    pub is_image: bool,
    #[serde(default)]
    pub file_type: String,
}

/// File types the server stores as images; their extracted content is OCR text.
const IMAGE_FILE_TYPES: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp"];

/// One row of the note library.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NoteSummary {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub file_type: Option<String>,
}

/// A stored note, including the text the server extracted from its file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NoteDetail {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl NoteDetail {
    pub fn is_image(&self) -> bool {
        self.file_type.as_deref().is_some_and(|file_type| {
            IMAGE_FILE_TYPES
                .iter()
                .any(|image| image.eq_ignore_ascii_case(file_type))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecentNote {
    pub title: String,
    #[serde(default)]
    pub category: Option<String>,
    pub access_count: u64,
    pub last_accessed: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProgressReport {
    pub total_notes: u64,
    pub total_access: u64,
    pub average_mastery: f64,
    #[serde(default)]
    pub recent_notes: Vec<RecentNote>,
}

pub(crate) fn file_part(bytes: Vec<u8>, filename: &str, mime_type: &str) -> Result<Part, ApiError> {
    let len = bytes.len();
    let part = Part::bytes(bytes).file_name(filename.to_string());
    let part = part.mime_str(mime_type).map_err(|err| {
        ApiError::new(crate::FailureKind::UnsupportedFormat, format!("{filename}: {err}"))
    })?;
    study_debug!("prepared upload part {filename} ({len} bytes, {mime_type})");
    Ok(part)
}

impl ApiClient {
    /// Store a document as a note; the server extracts its text.
    pub async fn upload_note(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        mime_type: &str,
    ) -> Result<UploadReceipt, ApiError> {
        let form = Form::new()
            .part("file", file_part(bytes, filename, mime_type)?)
            .text("title", filename.to_string())
            .text("category", self.settings().upload_category.clone());
        self.post_multipart("/upload", form).await
    }

    pub async fn notes(&self) -> Result<Vec<NoteSummary>, ApiError> {
        self.get_json("/notes").await
    }

    pub async fn note(&self, note_id: u64) -> Result<NoteDetail, ApiError> {
        self.get_json(&format!("/notes/{note_id}")).await
    }

    pub async fn progress(&self) -> Result<ProgressReport, ApiError> {
        self.get_json("/progress").await
    }
}
