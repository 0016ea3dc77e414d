//! CLI interface for the ATS analyzer

use crate::config::OutputFormat;
use crate::processing::analyzer::{PipelineState, ProgressObserver, ProgressStage};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "ats-analyzer")]
#[command(about = "Resume ATS compatibility analyzer")]
#[command(long_about = "Score a PDF or DOCX resume for applicant tracking system compatibility, match its skills against a job description and suggest improvements")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a resume, optionally against a job description
    Analyze {
        /// Path to resume file (PDF, DOCX)
        #[arg(short, long)]
        resume: PathBuf,

        /// Path to job description file (TXT, MD)
        #[arg(short, long, conflicts_with = "job_text")]
        job: Option<PathBuf>,

        /// Job description text given inline
        #[arg(long)]
        job_text: Option<String>,

        /// Output format: console, json, markdown, html, pdf
        #[arg(short, long)]
        output: Option<String>,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// Include skills and report metadata in the output
        #[arg(short, long)]
        detailed: bool,
    },

    /// List the skills the analyzer recognizes
    Taxonomy {
        /// Only show one category: technical, soft, certification
        #[arg(long)]
        category: Option<String>,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

impl Commands {
    /// `config reset` runs on defaults so it can repair a broken file
    pub fn loads_config(&self) -> bool {
        !matches!(
            self,
            Commands::Config {
                action: Some(ConfigAction::Reset)
            }
        )
    }
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file location
    Path,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        "html" => Ok(OutputFormat::Html),
        "pdf" => Ok(OutputFormat::Pdf),
        _ => Err(format!("Invalid output format: {}. Supported: console, json, markdown, html, pdf", format)),
    }
}

/// Validate file extension
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}

/// Terminal spinner driven by pipeline progress
pub struct SpinnerObserver {
    bar: ProgressBar,
}

impl SpinnerObserver {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg}")
                .expect("Invalid spinner template"),
        );
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_message("Uploading resume...");
        Self { bar }
    }

    /// Spinner that draws nothing, for piped output and tests
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn message(&self) -> String {
        self.bar.message()
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for SpinnerObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for SpinnerObserver {
    fn on_stage(&self, stage: ProgressStage) {
        let message = match stage {
            ProgressStage::Parsing => "Parsing resume...",
            ProgressStage::Analyzing => "Analyzing skills and formatting...",
            ProgressStage::Generating => "Generating report...",
        };
        self.bar.set_message(message);
    }

    fn on_transition(&self, _from: PipelineState, to: PipelineState) {
        if let PipelineState::Failed(kind) = to {
            self.bar.abandon_with_message(format!("Analysis failed ({})", kind));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_parse_output_format() {
        assert_eq!(parse_output_format("MD"), Ok(OutputFormat::Markdown));
        assert_eq!(parse_output_format("pdf"), Ok(OutputFormat::Pdf));
        assert!(parse_output_format("docx").is_err());
    }

    #[test]
    fn test_validate_file_extension() {
        assert!(validate_file_extension(Path::new("job.TXT"), &["txt", "md"]).is_ok());
        assert!(validate_file_extension(Path::new("job.pdf"), &["txt", "md"]).is_err());
        assert!(validate_file_extension(Path::new("job"), &["txt"]).is_err());
    }

    #[test]
    fn test_config_reset_skips_loading() {
        let reset = Cli::try_parse_from(["ats-analyzer", "config", "reset"]).unwrap();
        assert!(!reset.command.loads_config());

        let show = Cli::try_parse_from(["ats-analyzer", "config"]).unwrap();
        assert!(show.command.loads_config());

        let analyze = Cli::try_parse_from(["ats-analyzer", "analyze", "--resume", "cv.pdf"]).unwrap();
        assert!(analyze.command.loads_config());
    }

    #[test]
    fn test_spinner_follows_stages() {
        let spinner = SpinnerObserver::hidden();
        spinner.on_stage(ProgressStage::Analyzing);
        assert_eq!(spinner.message(), "Analyzing skills and formatting...");

        spinner.on_transition(PipelineState::Parsing, PipelineState::Failed(ErrorKind::CorruptDocument));
        assert_eq!(spinner.message(), "Analysis failed (CorruptDocument)");
    }

    #[test]
    fn test_analyze_arguments() {
        let cli = Cli::try_parse_from([
            "ats-analyzer",
            "analyze",
            "--resume",
            "cv.pdf",
            "--job-text",
            "Rust and Kubernetes",
            "--output",
            "json",
        ])
        .unwrap();

        match cli.command {
            Commands::Analyze { resume, job, job_text, output, .. } => {
                assert_eq!(resume, PathBuf::from("cv.pdf"));
                assert!(job.is_none());
                assert_eq!(job_text.as_deref(), Some("Rust and Kubernetes"));
                assert_eq!(output.as_deref(), Some("json"));
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_job_and_job_text_conflict() {
        let result = Cli::try_parse_from([
            "ats-analyzer",
            "analyze",
            "--resume",
            "cv.pdf",
            "--job",
            "job.txt",
            "--job-text",
            "Rust",
        ]);
        assert!(result.is_err());
    }
}
