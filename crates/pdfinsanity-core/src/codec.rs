//! PDF codec boundary
//!
//! The document collection never looks inside PDF bytes; everything that
//! reads or writes PDF structure goes through [`PdfCodec`].

use crate::compose::compose_document;
use crate::config::{Config, PageSize};
use crate::error::PdfInsanityError;
use crate::merge::merge_documents;
use crate::raster::{image_to_pdf, ImageFormat};
use crate::validation::{validate_pdf, PdfInfo};

pub trait PdfCodec {
    /// Parse and validate a PDF, reporting its page count and metadata
    fn load(&self, bytes: &[u8]) -> Result<PdfInfo, PdfInsanityError>;

    /// Build a PDF from the pages of `bytes` at `indices` (0-based, in order, repeats allowed)
    fn compose(&self, bytes: &[u8], indices: &[u32]) -> Result<Vec<u8>, PdfInsanityError>;

    /// Concatenate whole documents in the given order
    fn merge(&self, documents: &[&[u8]]) -> Result<Vec<u8>, PdfInsanityError>;

    /// Wrap a raster image into a single-page PDF
    fn embed_image(&self, bytes: &[u8], format: ImageFormat) -> Result<Vec<u8>, PdfInsanityError>;
}

/// [`PdfCodec`] backed by lopdf
#[derive(Debug, Clone)]
pub struct LopdfCodec {
    page_size: PageSize,
    compress: bool,
}

impl Default for LopdfCodec {
    fn default() -> Self {
        Self::new(PageSize::default(), true)
    }
}

impl LopdfCodec {
    pub fn new(page_size: PageSize, compress: bool) -> Self {
        Self {
            page_size,
            compress,
        }
    }

    /// Codec honoring the page size and compression settings of `config`
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.image_page_size, config.compress)
    }
}

impl PdfCodec for LopdfCodec {
    fn load(&self, bytes: &[u8]) -> Result<PdfInfo, PdfInsanityError> {
        validate_pdf(bytes)
    }

    fn compose(&self, bytes: &[u8], indices: &[u32]) -> Result<Vec<u8>, PdfInsanityError> {
        compose_document(bytes, indices, self.compress)
    }

    fn merge(&self, documents: &[&[u8]]) -> Result<Vec<u8>, PdfInsanityError> {
        merge_documents(documents, self.compress)
    }

    fn embed_image(&self, bytes: &[u8], format: ImageFormat) -> Result<Vec<u8>, PdfInsanityError> {
        image_to_pdf(bytes, format, self.page_size, self.compress)
    }
}
