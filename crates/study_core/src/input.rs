use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::decode::decode_text;
use crate::{ClientError, DomainProfile};

/// A file picked by the user, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFile {
    pub filename: String,
    /// MIME type reported by the picker; guessed from the extension when absent.
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl RawFile {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            mime_type: None,
            bytes,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawInput {
    /// Text typed or pasted by the user.
    Text(String),
    File(RawFile),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Text,
    InlineImage,
    DocumentUpload,
}

/// Classified, ready-to-send input. Never mutated in place: a new input
/// replaces the old one wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingInput {
    Text(String),
    InlineImage {
        data_uri: String,
        filename: String,
    },
    DocumentUpload {
        bytes: Vec<u8>,
        filename: String,
        mime_type: String,
    },
}

impl PendingInput {
    pub fn mode(&self) -> InputMode {
        match self {
            PendingInput::Text(_) => InputMode::Text,
            PendingInput::InlineImage { .. } => InputMode::InlineImage,
            PendingInput::DocumentUpload { .. } => InputMode::DocumentUpload,
        }
    }

    pub fn filename(&self) -> Option<&str> {
        match self {
            PendingInput::Text(_) => None,
            PendingInput::InlineImage { filename, .. }
            | PendingInput::DocumentUpload { filename, .. } => Some(filename),
        }
    }

    /// Whitespace-only text or an empty file; such input never reaches the network.
    pub fn is_blank(&self) -> bool {
        match self {
            PendingInput::Text(text) => text.trim().is_empty(),
            PendingInput::InlineImage { data_uri, .. } => data_uri
                .split_once(',')
                .map_or(true, |(_, payload)| payload.trim().is_empty()),
            PendingInput::DocumentUpload { bytes, .. } => bytes.is_empty(),
        }
    }
}

/// Classify raw input for a domain. Pure: reads only the given bytes.
pub fn classify(profile: &DomainProfile, raw: RawInput) -> Result<PendingInput, ClientError> {
    match raw {
        RawInput::Text(text) => Ok(PendingInput::Text(text)),
        RawInput::File(file) => classify_file(profile, file),
    }
}

fn classify_file(profile: &DomainProfile, file: RawFile) -> Result<PendingInput, ClientError> {
    let extension = extension_of(&file.filename);
    let mime_type = file
        .mime_type
        .clone()
        .filter(|mime| !mime.trim().is_empty())
        .unwrap_or_else(|| {
            mime_guess::from_path(&file.filename)
                .first_or_octet_stream()
                .to_string()
        });
    let unsupported = || ClientError::UnsupportedFormat {
        filename: file.filename.clone(),
    };

    if mime_type.starts_with("image/") {
        if !is_listed(profile.image_extensions, extension.as_deref()) {
            return Err(unsupported());
        }
        let data_uri = format!("data:{mime_type};base64,{}", STANDARD.encode(&file.bytes));
        return Ok(PendingInput::InlineImage {
            data_uri,
            filename: file.filename,
        });
    }

    if !is_listed(profile.document_extensions, extension.as_deref()) {
        return Err(unsupported());
    }

    if extension.as_deref() == Some("txt") || mime_type == "text/plain" {
        if let Some(text) = decode_text(&file.bytes) {
            return Ok(PendingInput::Text(text));
        }
    }

    Ok(PendingInput::DocumentUpload {
        bytes: file.bytes,
        filename: file.filename,
        mime_type,
    })
}

fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

fn is_listed(allowed: &[&str], extension: Option<&str>) -> bool {
    extension.is_some_and(|ext| allowed.contains(&ext))
}
