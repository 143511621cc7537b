//! Plain-text extraction for course outlines and checklists
//!
//! The matcher only consumes text. This crate turns a file on disk into that
//! text: `.txt` and `.md` files are read as UTF-8, PDFs go through
//! `pdf-extract` and DOCX files are unzipped and their `word/document.xml`
//! walked with `quick-xml`. Anything else is rejected with a typed error.
//!
//! ```no_run
//! # fn example() -> Result<(), shared_text::ExtractError> {
//! let text = shared_text::extract_text("outline.pdf")?;
//! println!("{} characters", text.chars().count());
//! # Ok(())
//! # }
//! ```

use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;
use tracing::debug;

/// Text extraction errors
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("PDF text extraction failed: {0}")]
    Pdf(String),

    #[error("DOCX text extraction failed: {0}")]
    Docx(String),

    #[error("No text could be extracted from {0}")]
    Empty(String),
}

/// Document formats this crate can read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    PlainText,
    Pdf,
    Docx,
}

impl Format {
    /// Format by file extension, case-insensitively
    pub fn from_path(path: &Path) -> Result<Self, ExtractError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "txt" | "md" | "text" => Ok(Self::PlainText),
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            "" => Err(ExtractError::UnsupportedFormat(format!(
                "{} has no file extension",
                path.display()
            ))),
            other => Err(ExtractError::UnsupportedFormat(format!(".{other}"))),
        }
    }
}

/// Extract the text of a document
///
/// # Errors
///
/// - `UnsupportedFormat` for extensions other than txt, md, pdf and docx
/// - `Io` when the file cannot be read
/// - `Pdf` or `Docx` when the document cannot be parsed
/// - `Empty` when the document holds no text
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String, ExtractError> {
    let path = path.as_ref();
    let format = Format::from_path(path)?;
    let bytes = fs::read(path).map_err(|source| ExtractError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let text = match format {
        Format::PlainText => String::from_utf8_lossy(&bytes).into_owned(),
        Format::Pdf => extract_pdf_text(&bytes)?,
        Format::Docx => extract_docx_text(&bytes)?,
    };
    debug!(path = %path.display(), ?format, chars = text.len(), "extracted text");

    if text.trim().is_empty() {
        return Err(ExtractError::Empty(path.display().to_string()));
    }
    Ok(normalize_line_endings(&text))
}

/// Text of an in-memory PDF
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, ExtractError> {
    if bytes.len() < 4 || &bytes[..4] != b"%PDF" {
        return Err(ExtractError::Pdf("missing %PDF header".to_string()));
    }
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))
}

/// Text of an in-memory DOCX: one line per paragraph, table cells separated
/// by tabs and one line per table row
pub fn extract_docx_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| ExtractError::Docx(e.to_string()))?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| ExtractError::Docx(format!("word/document.xml: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| ExtractError::Docx(e.to_string()))?;
    document_xml_text(&xml)
}

fn document_xml_text(xml: &str) -> Result<String, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_run_text = false;
    let mut table_depth = 0usize;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| ExtractError::Docx(format!("at byte {}: {e}", reader.buffer_position())))?;
        match event {
            Event::Start(e) => match e.local_name().as_ref() {
                b"t" => in_run_text = true,
                b"tbl" => table_depth += 1,
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"tab" => text.push('\t'),
                b"br" | b"cr" => text.push('\n'),
                _ => {}
            },
            Event::Text(e) if in_run_text => {
                let unescaped = e.unescape().map_err(|e| ExtractError::Docx(e.to_string()))?;
                text.push_str(&unescaped);
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_run_text = false,
                b"p" if table_depth == 0 => text.push('\n'),
                b"p" => text.push(' '),
                b"tc" => text.push('\t'),
                b"tr" => text.push('\n'),
                b"tbl" => table_depth = table_depth.saturating_sub(1),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(text)
}

/// CRLF and CR become LF; form feeds between PDF pages become blank lines
fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace(['\r', '\x0C'], "\n")
}
