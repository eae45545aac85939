//! File ingestion
//!
//! Files arrive from a picker or a drop as `(name, mime type, bytes)`. PDFs are
//! taken as they are; PNG and JPEG images are converted to single-page PDFs.
//! Anything else is refused per file without aborting the batch.

use crate::error::PdfInsanityError;
use crate::list::ItemId;
use crate::raster::ImageFormat;
use serde::Serialize;

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";
const JPEG_MAGIC: &[u8] = b"\xFF\xD8\xFF";
const PDF_MAGIC: &[u8] = b"%PDF-";

/// A file handed over by the UI
#[derive(Debug, Clone, PartialEq)]
pub struct IncomingFile {
    pub name: String,
    /// MIME type reported by the browser, if any
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl IncomingFile {
    pub fn new(name: impl Into<String>, mime_type: Option<&str>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type
                .map(str::trim)
                .filter(|mime| !mime.is_empty())
                .map(str::to_string),
            bytes,
        }
    }
}

/// What an incoming file turned out to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InputKind {
    Pdf,
    Image(ImageFormat),
}

/// Classify by MIME type, then by extension, then by magic bytes
pub fn detect(file: &IncomingFile) -> Result<InputKind, PdfInsanityError> {
    file.mime_type
        .as_deref()
        .and_then(from_mime)
        .or_else(|| from_extension(&file.name))
        .or_else(|| from_magic(&file.bytes))
        .ok_or_else(|| PdfInsanityError::UnsupportedInputType {
            filename: file.name.clone(),
            detail: match &file.mime_type {
                Some(mime) => format!("{} is not a PDF, PNG or JPEG", mime),
                None => "not a PDF, PNG or JPEG".to_string(),
            },
        })
}

fn from_mime(mime: &str) -> Option<InputKind> {
    match mime.to_ascii_lowercase().as_str() {
        "application/pdf" | "application/x-pdf" => Some(InputKind::Pdf),
        "image/png" => Some(InputKind::Image(ImageFormat::Png)),
        "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(InputKind::Image(ImageFormat::Jpeg)),
        _ => None,
    }
}

fn from_extension(name: &str) -> Option<InputKind> {
    let (_, extension) = name.rsplit_once('.')?;
    match extension.to_ascii_lowercase().as_str() {
        "pdf" => Some(InputKind::Pdf),
        "png" => Some(InputKind::Image(ImageFormat::Png)),
        "jpg" | "jpeg" => Some(InputKind::Image(ImageFormat::Jpeg)),
        _ => None,
    }
}

fn from_magic(bytes: &[u8]) -> Option<InputKind> {
    if bytes.starts_with(PDF_MAGIC) {
        Some(InputKind::Pdf)
    } else if bytes.starts_with(PNG_MAGIC) {
        Some(InputKind::Image(ImageFormat::Png))
    } else if bytes.starts_with(JPEG_MAGIC) {
        Some(InputKind::Image(ImageFormat::Jpeg))
    } else {
        None
    }
}

/// A file that could not be imported
#[derive(Debug, Clone, PartialEq)]
pub struct ImportFailure {
    pub filename: String,
    pub error: PdfInsanityError,
}

/// Result of importing one batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    /// Ids of the documents created, in batch order
    pub imported: Vec<ItemId>,
    pub failures: Vec<ImportFailure>,
}

impl ImportReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}
