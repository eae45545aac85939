//! Workspace configuration

use crate::error::PdfInsanityError;
use serde::{Deserialize, Serialize};

/// Page size used when an image is converted into a single-page PDF
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    Letter,
}

impl PageSize {
    /// Width and height in points
    pub fn dimensions(self) -> (f32, f32) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::Letter => (612.0, 792.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub image_page_size: PageSize,
    /// Name given to a merge result when the user leaves the name empty
    pub merged_name: String,
    /// Compress streams of generated documents
    pub compress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            image_page_size: PageSize::A4,
            merged_name: "MergedDocuments.pdf".to_string(),
            compress: true,
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self, PdfInsanityError> {
        serde_json::from_str(json).map_err(|e| PdfInsanityError::ConfigError(e.to_string()))
    }
}
