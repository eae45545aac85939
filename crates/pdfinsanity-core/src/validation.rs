//! PDF validation and info extraction

use crate::error::PdfInsanityError;
use lopdf::{Dictionary, Document};
use serde::Serialize;

/// Information gathered while loading a PDF
#[derive(Debug, Clone, Serialize, Default, PartialEq)]
pub struct PdfInfo {
    /// Number of pages in the document
    pub page_count: u32,
    /// PDF version string (e.g., "1.7")
    pub version: String,
    pub encrypted: bool,
    pub size_bytes: usize,
    /// Document title from metadata (if available)
    pub title: Option<String>,
    /// Document author from metadata (if available)
    pub author: Option<String>,
}

/// Cheap header check, run before a full parse
pub fn quick_validate(bytes: &[u8]) -> Result<(), PdfInsanityError> {
    if bytes.len() < 8 {
        return Err(PdfInsanityError::ParseError(
            "File too small to be a valid PDF".to_string(),
        ));
    }
    if !bytes.starts_with(b"%PDF-") {
        return Err(PdfInsanityError::ParseError(
            "Not a valid PDF file (missing %PDF- header)".to_string(),
        ));
    }
    Ok(())
}

/// Validate a PDF file and extract basic info
pub fn validate_pdf(bytes: &[u8]) -> Result<PdfInfo, PdfInsanityError> {
    quick_validate(bytes)?;

    let document =
        Document::load_mem(bytes).map_err(|e| PdfInsanityError::ParseError(e.to_string()))?;

    let page_count = document.get_pages().len() as u32;
    if page_count == 0 {
        return Err(PdfInsanityError::ParseError("PDF has no pages".to_string()));
    }

    let (title, author) = extract_metadata(&document);

    Ok(PdfInfo {
        page_count,
        version: extract_version(bytes),
        encrypted: document.is_encrypted(),
        size_bytes: bytes.len(),
        title,
        author,
    })
}

/// Header format: %PDF-1.7
fn extract_version(bytes: &[u8]) -> String {
    bytes
        .get(5..8)
        .and_then(|version| std::str::from_utf8(version).ok())
        .map(|version| version.trim().to_string())
        .unwrap_or_else(|| "1.4".to_string())
}

fn extract_metadata(document: &Document) -> (Option<String>, Option<String>) {
    let info = document
        .trailer
        .get(b"Info")
        .and_then(|info| info.as_reference())
        .and_then(|id| document.get_dictionary(id));

    match info {
        Ok(info) => (text_entry(info, b"Title"), text_entry(info, b"Author")),
        Err(_) => (None, None),
    }
}

fn text_entry(dict: &Dictionary, key: &[u8]) -> Option<String> {
    let bytes = dict.get(key).and_then(|value| value.as_str()).ok()?;
    let decoded = String::from_utf8_lossy(bytes);
    if decoded.is_empty() {
        None
    } else {
        Some(decoded.into_owned())
    }
}
