//! ats-analyzer: resume ATS compatibility analysis from the command line

use ats_analyzer::cli::{self, Cli, Commands, ConfigAction, SpinnerObserver};
use ats_analyzer::config::OutputFormat;
use ats_analyzer::output::formatter::{save_report_to_file, suggest_filename, ReportGenerator};
use ats_analyzer::processing::taxonomy::{SkillCategory, SkillTaxonomy};
use ats_analyzer::{AnalysisEngine, AnalyzerError, CancelHandle, Config, Result, SourceDocument};
use clap::Parser;
use colored::Colorize;
use log::{error, info};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = if cli.command.loads_config() {
        match load_config(cli.config.as_deref()) {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load configuration: {}", e);
                process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    if let Err(e) = run_command(cli.command, config, config_path).await {
        error!("Command failed [{}]: {}", e.kind(), e);
        process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

async fn run_command(command: Commands, config: Config, config_path: PathBuf) -> Result<()> {
    match command {
        Commands::Analyze {
            resume,
            job,
            job_text,
            output,
            save,
            detailed,
        } => {
            let format = match output {
                Some(output) => cli::parse_output_format(&output).map_err(AnalyzerError::InvalidInput)?,
                None => config.output.format,
            };

            let job_description = match (job, job_text) {
                (Some(path), _) => {
                    cli::validate_file_extension(&path, &["txt", "md"])
                        .map_err(|e| AnalyzerError::InvalidInput(format!("Job description file: {}", e)))?;
                    Some(tokio::fs::read_to_string(&path).await?)
                }
                (None, text) => text,
            };

            info!("Analyzing {}", resume.display());
            let document = SourceDocument::from_path(&resume, config.limits.max_document_bytes).await?;
            let detailed = detailed || config.output.detailed;
            let generator = ReportGenerator::with_options(config.output.color_output, detailed);
            let engine = AnalysisEngine::new(config)?;

            let cancel = CancelHandle::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    on_interrupt.cancel();
                }
            });

            let spinner = Arc::new(SpinnerObserver::new());
            let result = engine
                .submit_with(document, job_description.as_deref(), spinner.clone(), cancel)
                .await;
            spinner.finish();
            let report = result?;

            let target = match (save, format) {
                (Some(path), _) => Some(path),
                (None, OutputFormat::Pdf) => Some(PathBuf::from(suggest_filename(
                    &format,
                    &resume.to_string_lossy(),
                    true,
                ))),
                (None, _) => None,
            };

            match target {
                Some(path) => {
                    let bytes = generator.generate_report(&report, &format)?;
                    save_report_to_file(&bytes, &path)?;
                    println!("✅ Report saved to {}", path.display());
                }
                None => println!("{}", generator.generate_text(&report, &format)?),
            }
        }

        Commands::Taxonomy { category } => {
            let filter = category.map(|c| c.parse::<SkillCategory>()).transpose()?;
            let taxonomy = SkillTaxonomy::from_config(&config.taxonomy)?;

            println!(
                "{} (version {}, {} skills)",
                "Skill taxonomy".bold(),
                taxonomy.version(),
                taxonomy.len()
            );

            for group in [SkillCategory::Technical, SkillCategory::Soft, SkillCategory::Certification] {
                if filter.is_some_and(|f| f != group) {
                    continue;
                }
                println!("\n{}", group.to_string().to_uppercase().blue().bold());
                for entry in taxonomy.by_category(group) {
                    if entry.aliases.is_empty() {
                        println!("  • {}", entry.name);
                    } else {
                        println!("  • {} ({})", entry.name, entry.aliases.join(", ").dimmed());
                    }
                }
            }
        }

        Commands::Config { action } => match action.unwrap_or(ConfigAction::Show) {
            ConfigAction::Show => {
                println!("{}", "Configuration".bold());
                println!("File: {}\n", config_path.display());
                println!("{}", toml::to_string_pretty(&config)?);
            }
            ConfigAction::Reset => {
                Config::default().save_to(&config_path)?;
                println!("✅ Configuration reset to defaults at {}", config_path.display());
            }
            ConfigAction::Path => println!("{}", config_path.display()),
        },
    }

    Ok(())
}
