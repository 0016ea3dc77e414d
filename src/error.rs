//! Error handling for the ATS analyzer

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Invalid file type: {0}")]
    InvalidFileType(String),

    #[error("File too large: {size} bytes exceeds the {limit} byte limit")]
    FileTooLarge { size: usize, limit: usize },

    #[error("Corrupt document: {0}")]
    CorruptDocument(String),

    #[error("Document contains no extractable text")]
    EmptyDocument,

    #[error("Skill taxonomy unavailable: {0}")]
    TaxonomyUnavailable(String),

    #[error("Analysis timed out after {0:?}")]
    Timeout(Duration),

    #[error("analysis cancelled")]
    Cancelled,

    #[error("Internal failure: {0}")]
    InternalFailure(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;

/// The closed set of failure kinds a caller of `submit` can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidFileType,
    FileTooLarge,
    CorruptDocument,
    EmptyDocument,
    TaxonomyUnavailable,
    Timeout,
    InternalFailure,
}

impl AnalyzerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalyzerError::InvalidFileType(_) => ErrorKind::InvalidFileType,
            AnalyzerError::FileTooLarge { .. } => ErrorKind::FileTooLarge,
            AnalyzerError::CorruptDocument(_) => ErrorKind::CorruptDocument,
            AnalyzerError::EmptyDocument => ErrorKind::EmptyDocument,
            AnalyzerError::TaxonomyUnavailable(_) => ErrorKind::TaxonomyUnavailable,
            AnalyzerError::Timeout(_) => ErrorKind::Timeout,
            AnalyzerError::Cancelled
            | AnalyzerError::InternalFailure(_)
            | AnalyzerError::Io(_)
            | AnalyzerError::Configuration(_)
            | AnalyzerError::Serialization(_)
            | AnalyzerError::InvalidInput(_)
            | AnalyzerError::OutputFormatting(_) => ErrorKind::InternalFailure,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::InvalidFileType => "InvalidFileType",
            ErrorKind::FileTooLarge => "FileTooLarge",
            ErrorKind::CorruptDocument => "CorruptDocument",
            ErrorKind::EmptyDocument => "EmptyDocument",
            ErrorKind::TaxonomyUnavailable => "TaxonomyUnavailable",
            ErrorKind::Timeout => "Timeout",
            ErrorKind::InternalFailure => "InternalFailure",
        };
        write!(f, "{}", name)
    }
}

/// A broken ZIP container means the DOCX itself is damaged
impl From<zip::result::ZipError> for AnalyzerError {
    fn from(err: zip::result::ZipError) -> Self {
        AnalyzerError::CorruptDocument(format!("DOCX container: {}", err))
    }
}

impl From<toml::de::Error> for AnalyzerError {
    fn from(err: toml::de::Error) -> Self {
        AnalyzerError::Configuration(format!("Failed to parse TOML: {}", err))
    }
}

impl From<toml::ser::Error> for AnalyzerError {
    fn from(err: toml::ser::Error) -> Self {
        AnalyzerError::Configuration(format!("Failed to serialize TOML: {}", err))
    }
}

impl From<tokio::task::JoinError> for AnalyzerError {
    fn from(err: tokio::task::JoinError) -> Self {
        AnalyzerError::InternalFailure(format!("analysis worker stopped unexpectedly: {}", err))
    }
}
