use paperfront_core::PaperfrontError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReadPaperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error from {0}: {1}")]
    ApiError(String, String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<ReadPaperError> for PaperfrontError {
    fn from(e: ReadPaperError) -> Self {
        match e {
            ReadPaperError::InvalidHeader(_) | ReadPaperError::InvalidUrl(_) => {
                PaperfrontError::ConfigError(e.to_string())
            }
            other => PaperfrontError::Catalog(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReadPaperError>;
