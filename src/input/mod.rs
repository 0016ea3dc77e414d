//! Input handling
//! Format detection, upload validation and text extraction

pub mod file_detector;
pub mod source;
pub mod text_extractor;

pub use file_detector::DocumentFormat;
pub use source::SourceDocument;
