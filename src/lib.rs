//! ATS resume analyzer library

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod processing;

pub use config::Config;
pub use error::{AnalyzerError, ErrorKind, Result};
pub use input::{DocumentFormat, SourceDocument};
pub use output::report::AnalysisReport;
pub use processing::analyzer::{AnalysisEngine, CancelHandle, ProgressObserver, ProgressStage};
