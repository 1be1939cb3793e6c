//! Plain-text extraction from uploaded contract files.
//!
//! Plain text is always available. PDF extraction needs the `pdf` feature
//! (lopdf); DOCX extraction needs the `docx` feature (zip + quick-xml).

use std::path::Path;

use thiserror::Error;
use tracing::debug;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MIME_TEXT: &str = "text/plain";

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Unsupported file type: {0}")]
    Unsupported(String),
    #[error("Failed to parse {format}: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },
}

/// Contract file formats accepted for analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    PlainText,
}

impl DocumentKind {
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            MIME_PDF => Some(Self::Pdf),
            MIME_DOCX => Some(Self::Docx),
            MIME_TEXT => Some(Self::PlainText),
            _ => None,
        }
    }

    /// Guess the kind from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "txt" => Some(Self::PlainText),
            _ => None,
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            Self::Pdf => MIME_PDF,
            Self::Docx => MIME_DOCX,
            Self::PlainText => MIME_TEXT,
        }
    }
}

/// Extract the text of a document given its bytes and MIME type.
pub fn extract_text(bytes: &[u8], mime: &str) -> Result<String, ExtractError> {
    let kind =
        DocumentKind::from_mime(mime).ok_or_else(|| ExtractError::Unsupported(mime.to_string()))?;
    debug!(mime, len = bytes.len(), "extracting document text");
    match kind {
        DocumentKind::PlainText => Ok(String::from_utf8_lossy(bytes).into_owned()),
        DocumentKind::Pdf => extract_pdf(bytes),
        DocumentKind::Docx => extract_docx(bytes),
    }
}

#[cfg(feature = "pdf")]
fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    let parse_err = |e: lopdf::Error| ExtractError::Parse {
        format: "PDF",
        message: e.to_string(),
    };
    let doc = lopdf::Document::load_mem(bytes).map_err(parse_err)?;
    let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
    doc.extract_text(&pages).map_err(parse_err)
}

#[cfg(not(feature = "pdf"))]
fn extract_pdf(_bytes: &[u8]) -> Result<String, ExtractError> {
    Err(ExtractError::Unsupported(MIME_PDF.to_string()))
}

/// Paragraph text of `word/document.xml`, one line per `w:p`.
#[cfg(feature = "docx")]
fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    use std::io::{Cursor, Read};

    use quick_xml::Reader;
    use quick_xml::events::Event;

    let parse_err = |message: String| ExtractError::Parse {
        format: "DOCX",
        message,
    };

    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| parse_err(e.to_string()))?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| parse_err(e.to_string()))?
        .read_to_string(&mut xml)
        .map_err(|e| parse_err(e.to_string()))?;

    let mut reader = Reader::from_str(&xml);
    let mut text = String::new();
    let mut in_run_text = false;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:t" => in_run_text = true,
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_run_text = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:tab" => text.push('\t'),
                b"w:br" | b"w:p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_run_text => {
                let chunk = t.unescape().map_err(|e| parse_err(e.to_string()))?;
                text.push_str(&chunk);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(parse_err(e.to_string())),
        }
    }
    Ok(text)
}

#[cfg(not(feature = "docx"))]
fn extract_docx(_bytes: &[u8]) -> Result<String, ExtractError> {
    Err(ExtractError::Unsupported(MIME_DOCX.to_string()))
}
