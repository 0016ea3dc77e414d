//! Submitted documents and their fail-fast validation

use crate::error::{AnalyzerError, Result};
use crate::input::file_detector::DocumentFormat;
use std::path::Path;
use tokio::fs;

/// Raw bytes of an uploaded resume plus its declared format
#[derive(Debug, Clone)]
pub struct SourceDocument {
    bytes: Vec<u8>,
    format: DocumentFormat,
    name: Option<String>,
}

impl SourceDocument {
    pub fn new(bytes: Vec<u8>, format: DocumentFormat) -> Self {
        Self {
            bytes,
            format,
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Read a document from disk, declaring its format from the extension.
    ///
    /// The extension and the on-disk size are checked before the file is
    /// read, so unsupported or oversized uploads cost nothing.
    pub async fn from_path(path: &Path, max_bytes: usize) -> Result<Self> {
        let format = DocumentFormat::from_path(path)?;

        if !path.exists() {
            return Err(AnalyzerError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let size = fs::metadata(path).await?.len();
        if size > max_bytes as u64 {
            return Err(AnalyzerError::FileTooLarge {
                size: usize::try_from(size).unwrap_or(usize::MAX),
                limit: max_bytes,
            });
        }

        let bytes = fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self::new(bytes, format).with_name(name))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Size gate applied before any parsing work
    pub fn validate(&self, max_bytes: usize) -> Result<()> {
        if self.size() > max_bytes {
            return Err(AnalyzerError::FileTooLarge {
                size: self.size(),
                limit: max_bytes,
            });
        }
        Ok(())
    }
}
