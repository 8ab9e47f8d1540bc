use std::fmt;
use std::str::FromStr;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp"];
const TEXT_DOCUMENT_EXTENSIONS: &[&str] = &["txt", "doc", "docx"];
const NOTE_DOCUMENT_EXTENSIONS: &[&str] = &["txt", "doc", "docx", "pdf", "ppt", "pptx"];

/// One of the three independent generation domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Domain {
    Notes,
    English,
    Problem,
}

impl Domain {
    pub const ALL: [Domain; 3] = [Domain::Notes, Domain::English, Domain::Problem];

    /// Discriminator used by the history endpoints.
    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Notes => "notes",
            Domain::English => "english",
            Domain::Problem => "problem",
        }
    }

    pub fn profile(self) -> &'static DomainProfile {
        match self {
            Domain::Notes => &NOTES,
            Domain::English => &ENGLISH,
            Domain::Problem => &PROBLEM,
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown domain {0:?} (expected notes, english or problem)")]
pub struct UnknownDomain(pub String);

impl FromStr for Domain {
    type Err = UnknownDomain;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "notes" | "note" => Ok(Domain::Notes),
            "english" => Ok(Domain::English),
            "problem" | "problems" => Ok(Domain::Problem),
            other => Err(UnknownDomain(other.to_string())),
        }
    }
}

/// How a domain turns an uploaded document into generated content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentRoute {
    /// Multipart upload straight to a generation endpoint.
    Direct { endpoint: &'static str },
    /// Generic `/upload`, then read the extracted note and enhance it.
    NoteUpload,
    /// The domain does not take documents.
    Unsupported,
}

/// Per-domain wiring: accepted inputs, endpoints and JSON field names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainProfile {
    pub domain: Domain,
    pub text_endpoint: &'static str,
    /// Request field carrying the text or data-URI.
    pub text_field: &'static str,
    /// Response field carrying the generated Markdown.
    pub result_field: &'static str,
    pub document_route: DocumentRoute,
    pub image_extensions: &'static [&'static str],
    pub document_extensions: &'static [&'static str],
    pub extracts_vocabulary: bool,
}

impl DomainProfile {
    pub fn accepts_documents(&self) -> bool {
        !self.document_extensions.is_empty()
    }

    /// Comma separated list suitable for a file picker filter, e.g. `.jpg,.png`.
    pub fn accept_filter(&self) -> String {
        self.document_extensions
            .iter()
            .chain(self.image_extensions.iter())
            .map(|ext| format!(".{ext}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

static NOTES: DomainProfile = DomainProfile {
    domain: Domain::Notes,
    text_endpoint: "/enhance-notes",
    text_field: "content",
    result_field: "enhanced_content",
    document_route: DocumentRoute::NoteUpload,
    image_extensions: IMAGE_EXTENSIONS,
    document_extensions: NOTE_DOCUMENT_EXTENSIONS,
    extracts_vocabulary: false,
};

static ENGLISH: DomainProfile = DomainProfile {
    domain: Domain::English,
    text_endpoint: "/english-study",
    text_field: "text",
    result_field: "study_material",
    document_route: DocumentRoute::Direct {
        endpoint: "/english-study-upload",
    },
    image_extensions: IMAGE_EXTENSIONS,
    document_extensions: TEXT_DOCUMENT_EXTENSIONS,
    extracts_vocabulary: true,
};

static PROBLEM: DomainProfile = DomainProfile {
    domain: Domain::Problem,
    text_endpoint: "/analyze-problems",
    text_field: "problems",
    result_field: "analysis",
    document_route: DocumentRoute::Unsupported,
    image_extensions: IMAGE_EXTENSIONS,
    document_extensions: &[],
    extracts_vocabulary: false,
};
