//! Document format detection

use crate::error::{AnalyzerError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const PDF_MAGIC: &[u8] = b"%PDF-";
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// The only formats the analyzer accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    pub fn from_extension(ext: &str) -> Result<Self> {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "docx" => Ok(DocumentFormat::Docx),
            other => Err(AnalyzerError::InvalidFileType(format!(
                "'.{}' is not supported, please upload a PDF or DOCX file",
                other
            ))),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| {
                AnalyzerError::InvalidFileType(format!("File has no extension: {}", path.display()))
            })?;

        Self::from_extension(extension)
    }

    /// Upload widgets report a MIME type rather than an extension
    pub fn from_mime(mime: &str) -> Result<Self> {
        match mime.trim().to_lowercase().as_str() {
            PDF_MIME => Ok(DocumentFormat::Pdf),
            DOCX_MIME => Ok(DocumentFormat::Docx),
            other => Err(AnalyzerError::InvalidFileType(format!(
                "MIME type '{}' is not supported, please upload a PDF or DOCX file",
                other
            ))),
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => PDF_MIME,
            DocumentFormat::Docx => DOCX_MIME,
        }
    }

    /// Whether the leading bytes look like this format's container
    pub fn matches_magic(&self, bytes: &[u8]) -> bool {
        match self {
            DocumentFormat::Pdf => {
                // Some generators emit a few junk bytes before the header.
                let window = &bytes[..bytes.len().min(1024)];
                window.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC)
            }
            DocumentFormat::Docx => bytes.starts_with(ZIP_MAGIC),
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentFormat::Pdf => write!(f, "PDF"),
            DocumentFormat::Docx => write!(f, "DOCX"),
        }
    }
}
