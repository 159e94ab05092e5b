//! Local document text extraction.
//!
//! Uploaded files are modeled as a closed sum type over the supported
//! kinds, each with a single `extract_text` operation — dispatch happens
//! on the variant, not on MIME strings.

use std::path::Path;

use tracing::debug;

use sourcebrief_shared::{Result, SourceBriefError};

/// A document to extract text from. Anything that is not a PDF or a Word
/// document is treated as plain text.
#[derive(Debug, Clone)]
pub enum Document {
    Pdf(Vec<u8>),
    WordDocument(Vec<u8>),
    PlainText(Vec<u8>),
}

/// Discriminant of [`Document`], for display and dispatch decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    WordDocument,
    PlainText,
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Pdf => "pdf",
            Self::WordDocument => "docx",
            Self::PlainText => "text",
        };
        write!(f, "{name}")
    }
}

impl Document {
    /// Read a file and classify it by extension (`pdf`, `docx`, else text).
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| SourceBriefError::io(path, e))?;
        let kind = kind_for_path(path);
        debug!(path = %path.display(), %kind, len = bytes.len(), "loaded document");
        Ok(Self::from_bytes(kind, bytes))
    }

    /// Wrap already-read bytes as the given kind.
    pub fn from_bytes(kind: DocumentKind, bytes: Vec<u8>) -> Self {
        match kind {
            DocumentKind::Pdf => Self::Pdf(bytes),
            DocumentKind::WordDocument => Self::WordDocument(bytes),
            DocumentKind::PlainText => Self::PlainText(bytes),
        }
    }

    pub fn kind(&self) -> DocumentKind {
        match self {
            Self::Pdf(_) => DocumentKind::Pdf,
            Self::WordDocument(_) => DocumentKind::WordDocument,
            Self::PlainText(_) => DocumentKind::PlainText,
        }
    }

    /// Extract the document's full text content.
    pub fn extract_text(&self) -> Result<String> {
        match self {
            Self::Pdf(bytes) => pdf_text(bytes),
            Self::WordDocument(bytes) => docx_text(bytes),
            Self::PlainText(bytes) => Ok(String::from_utf8_lossy(bytes).into_owned()),
        }
    }
}

/// Classify a path by its extension.
fn kind_for_path(path: &Path) -> DocumentKind {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("pdf") => DocumentKind::Pdf,
        Some("docx") => DocumentKind::WordDocument,
        _ => DocumentKind::PlainText,
    }
}

fn pdf_text(bytes: &[u8]) -> Result<String> {
    pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| SourceBriefError::Document(format!("pdf extraction failed: {e}")))
}

fn docx_text(bytes: &[u8]) -> Result<String> {
    use docx_rs::{DocumentChild, ParagraphChild, RunChild, read_docx};

    let docx = read_docx(bytes)
        .map_err(|e| SourceBriefError::Document(format!("docx read failed: {e:?}")))?;

    let mut text = String::new();
    for child in docx.document.children {
        if let DocumentChild::Paragraph(paragraph) = child {
            for pc in paragraph.children {
                if let ParagraphChild::Run(run) = pc {
                    for rc in run.children {
                        if let RunChild::Text(t) = rc {
                            text.push_str(&t.text);
                        }
                    }
                }
            }
            text.push('\n');
        }
    }

    Ok(text)
}
