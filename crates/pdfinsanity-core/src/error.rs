use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PdfInsanityError {
    #[error("Unsupported input type for {filename}: {detail}")]
    UnsupportedInputType { filename: String, detail: String },

    #[error("Target not found: {0}")]
    TargetNotFound(String),

    #[error("Failed to parse PDF: {0}")]
    ParseError(String),

    #[error("Invalid page index: {0}")]
    InvalidPageIndex(String),

    #[error("PDF operation failed: {0}")]
    OperationError(String),

    #[error("Image decoding failed: {0}")]
    ImageError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl PdfInsanityError {
    /// True for failures raised while reading or writing PDF bytes.
    pub fn is_codec_failure(&self) -> bool {
        matches!(
            self,
            PdfInsanityError::ParseError(_)
                | PdfInsanityError::InvalidPageIndex(_)
                | PdfInsanityError::OperationError(_)
                | PdfInsanityError::ImageError(_)
        )
    }
}
