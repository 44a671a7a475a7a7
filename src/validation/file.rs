//! Resume upload checks.
//!
//! # Responsibilities
//! - Accept only base64 content that decodes to at most 5 MiB
//! - Restrict declared MIME types to PDF, DOC and DOCX
//! - Sanitize the client-supplied filename
//! - Verify the decoded magic bytes; the signature is authoritative
//!
//! # Design Decisions
//! - Checks run in order and the first failure rejects the whole file
//! - A declared type that disagrees with the detected one is rejected
//! - An undeclared type takes the detected format, PDF for `%PDF` payloads
//! - DOCX is matched on the full ZIP local-file header `PK\x03\x04`

use std::sync::LazyLock;

use base64::Engine;
use regex::Regex;
use serde_json::Value;

use crate::validation::fields::FieldErrors;

/// Largest accepted decoded file.
pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Longest sanitized filename.
pub const MAX_FILENAME_LEN: usize = 255;

/// JSON key of the upload on the application form.
pub const RESUME_FIELD: &str = "resume";

static BASE64_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9+/]+={0,2}$").expect("base64 regex compiles"));

const PDF_MAGIC: [u8; 4] = *b"%PDF";
const OLE_MAGIC: [u8; 4] = [0xD0, 0xCF, 0x11, 0xE0];
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// Document formats accepted as a resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    /// Legacy Word (OLE compound file).
    Doc,
    /// Office Open XML (ZIP container).
    Docx,
}

impl DocumentKind {
    pub fn mime(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Doc => "application/msword",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Doc => "doc",
            Self::Docx => "docx",
        }
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        [Self::Pdf, Self::Doc, Self::Docx]
            .into_iter()
            .find(|kind| kind.mime().eq_ignore_ascii_case(mime.trim()))
    }

    /// Identify a document from its first bytes.
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        let head = bytes.get(..4)?;
        if head == PDF_MAGIC {
            Some(Self::Pdf)
        } else if head == OLE_MAGIC {
            Some(Self::Doc)
        } else if head == ZIP_MAGIC {
            Some(Self::Docx)
        } else {
            None
        }
    }
}

/// Why a resume was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FileCheckError {
    #[error("Resume file content is required")]
    MissingContent,

    #[error("Resume file content must be base64 encoded")]
    InvalidEncoding,

    #[error("Resume file must be 5MB or smaller")]
    TooLarge,

    #[error("Resume must be a PDF, DOC, or DOCX file")]
    UnsupportedType,

    #[error("Resume filename is required")]
    MissingFilename,

    #[error("File content does not match declared file type")]
    SignatureMismatch,
}

impl FileCheckError {
    /// Error map keyed by the resume field.
    pub fn to_field_errors(&self) -> FieldErrors {
        FieldErrors::from([(RESUME_FIELD.to_string(), self.to_string())])
    }
}

/// A resume that passed every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedFile {
    /// Decoded bytes.
    pub content: Vec<u8>,
    pub filename: String,
    pub kind: DocumentKind,
    pub size: usize,
}

impl ValidatedFile {
    pub fn mime(&self) -> &'static str {
        self.kind.mime()
    }
}

/// Check an uploaded resume object `{ content, filename, type? }`.
pub fn check_resume(upload: &Value) -> Result<ValidatedFile, FileCheckError> {
    // 1. Content present and a string
    let content = match upload.get("content") {
        Some(Value::String(s)) if !s.is_empty() => s.as_str(),
        _ => return Err(FileCheckError::MissingContent),
    };

    // 2. Base64 grammar
    if !BASE64_REGEX.is_match(content) {
        return Err(FileCheckError::InvalidEncoding);
    }

    // 3. Size estimate before decoding anything
    if estimated_decoded_len(content.len()) > MAX_FILE_SIZE {
        return Err(FileCheckError::TooLarge);
    }

    // 4. Declared type against the allow-list
    let declared = match upload.get("type") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => {
            Some(DocumentKind::from_mime(s).ok_or(FileCheckError::UnsupportedType)?)
        }
        Some(_) => return Err(FileCheckError::UnsupportedType),
    };

    // 5. Filename
    let raw_filename = match upload.get("filename") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.as_str(),
        _ => return Err(FileCheckError::MissingFilename),
    };

    // 6. Magic bytes
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(content)
        .map_err(|_| FileCheckError::InvalidEncoding)?;
    if bytes.len() > MAX_FILE_SIZE {
        return Err(FileCheckError::TooLarge);
    }

    let detected = match (DocumentKind::detect(&bytes), declared) {
        (Some(found), Some(claimed)) if found != claimed => {
            return Err(FileCheckError::SignatureMismatch)
        }
        (Some(found), _) => found,
        (None, Some(_)) => return Err(FileCheckError::SignatureMismatch),
        (None, None) => return Err(FileCheckError::UnsupportedType),
    };

    Ok(ValidatedFile {
        filename: sanitize_filename(raw_filename, detected),
        size: bytes.len(),
        kind: detected,
        content: bytes,
    })
}

/// `ceil(len * 3 / 4)`: an upper bound on the decoded size.
pub fn estimated_decoded_len(encoded_len: usize) -> usize {
    (encoded_len * 3).div_ceil(4)
}

/// Keep only the last path component and `[A-Za-z0-9._-]` characters.
pub fn sanitize_filename(raw: &str, kind: DocumentKind) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or("");
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    let truncated: String = cleaned.chars().take(MAX_FILENAME_LEN).collect();

    if truncated.is_empty() {
        format!("resume.{}", kind.extension())
    } else {
        truncated
    }
}
