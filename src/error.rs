//! Error handling for the resume scanner

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResumeScannerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF extraction error: {0}")]
    PdfExtraction(String),

    #[error("PDF is encrypted: {0}")]
    EncryptedPdf(String),

    #[error("No text could be extracted: {0}")]
    EmptyDocument(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed API response: {0}")]
    MalformedResponse(String),

    #[error("The model returned no message content")]
    EmptyCompletion,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No history entry for date: {0}")]
    HistoryEntryNotFound(String),

    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),
}

pub type Result<T> = std::result::Result<T, ResumeScannerError>;

/// Convert anyhow errors to our custom error type
impl From<anyhow::Error> for ResumeScannerError {
    fn from(err: anyhow::Error) -> Self {
        ResumeScannerError::AnalysisFailed(err.to_string())
    }
}

impl ResumeScannerError {
    /// Transport and upstream status failures, as opposed to local problems.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            ResumeScannerError::Http(_) | ResumeScannerError::Api { .. }
        )
    }
}
