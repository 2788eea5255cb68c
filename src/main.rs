//! resume-lens: AI-powered resume compatibility analysis

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use resume_lens::cli::{self, Cli, Commands, ConfigAction, RoleInput};
use resume_lens::config::{Config, Credentials};
use resume_lens::input::{DocumentTextExtractor, InputManager};
use resume_lens::llm::{PromptBuilder, SchemaDescriptor};
use resume_lens::output::formatter::save_report_to_file;
use resume_lens::output::{AnalysisReport, ReportGenerator};
use resume_lens::pipeline::AnalysisOrchestrator;
use resume_lens::ResumeLensError;
use std::process;
use std::time::Duration;

const RESUME_EXTENSIONS: [&str; 4] = ["pdf", "txt", "md", "markdown"];

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    if let Ok(path) = dotenvy::dotenv() {
        info!("Loaded environment from {}", path.display());
    }

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config).await {
        error!("Command failed: {:#}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Analyze {
            input,
            output,
            save,
            detailed,
        } => {
            let format = match output {
                Some(format) => cli::parse_output_format(&format).map_err(ResumeLensError::InvalidInput)?,
                None => config.output.format,
            };

            let (document, description) = load_inputs(&input).await?;

            Credentials::install(Credentials::from_env(&config.inference.api_key_env));
            let orchestrator = AnalysisOrchestrator::from_config(&config, Credentials::global())?;

            let spinner = ProgressBar::new_spinner();
            spinner.set_style(ProgressStyle::default_spinner());
            spinner.enable_steady_tick(Duration::from_millis(100));

            let mut updates = orchestrator.subscribe();
            let ticker = spinner.clone();
            let progress = tokio::spawn(async move {
                while updates.changed().await.is_ok() {
                    let label = updates.borrow_and_update().state.label();
                    ticker.set_message(label.to_string());
                }
            });

            let outcome = orchestrator
                .submit_analysis(Some(document), &input.title, &description)
                .await;
            progress.abort();
            spinner.finish_and_clear();

            let outcome = match outcome {
                Ok(outcome) => outcome,
                Err(e) => {
                    if let Some(kind) = e.kind() {
                        eprintln!("{} [{}] {}", "Analysis failed".red().bold(), kind, e);
                    }
                    return Err(e.into());
                }
            };

            let report = AnalysisReport::new(&outcome, &input.resume, &input.title, orchestrator.model());
            let generator = ReportGenerator::with_options(
                config.output.color_output && save.is_none(),
                detailed || config.output.detailed,
                true,
                true,
            );
            let rendered = generator.generate_report(&report, format)?;
            println!("{}", rendered);

            if let Some(path) = save {
                save_report_to_file(&rendered, &path)
                    .with_context(|| format!("Failed to save report to {}", path.display()))?;
                info!("Report saved to {}", path.display());
            }
        }

        Commands::Prompt { input } => {
            let (document, description) = load_inputs(&input).await?;

            let extractor = if config.extraction.headless {
                DocumentTextExtractor::headless()
            } else {
                DocumentTextExtractor::new()
            };
            let extracted = extractor.extract(document).await?;

            let prompt = PromptBuilder::new().build_from_parts(extracted.joined(), &input.title, &description)?;
            println!("{}", prompt.prompt_text);
        }

        Commands::Schema => {
            println!("{}", SchemaDescriptor::analysis_result().to_pretty_json());
        }

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                println!("Current Configuration\n");
                println!("Endpoint: {}", config.inference.endpoint);
                println!("Model: {}", config.inference.model);
                println!("API key variable: {}", config.inference.api_key_env);
                println!("Timeout: {}s", config.inference.timeout_secs);
                println!("Headless extraction: {}", config.extraction.headless);
                println!("Output format: {:?}", config.output.format);
                let key_state = if Credentials::from_env(&config.inference.api_key_env).is_present() {
                    "set"
                } else {
                    "missing"
                };
                println!("API key: {}", key_state);
            }

            Some(ConfigAction::Path) => {
                println!("{}", Config::config_path().display());
            }

            Some(ConfigAction::Reset) => {
                Config::default().save()?;
                println!("Configuration reset to defaults at {}", Config::config_path().display());
            }
        },
    }

    Ok(())
}

async fn load_inputs(input: &RoleInput) -> Result<(resume_lens::input::Document, String)> {
    if input.media_type.is_none() {
        cli::validate_file_extension(&input.resume, &RESUME_EXTENSIONS)
            .map_err(|e| ResumeLensError::InvalidInput(format!("Resume file: {}", e)))?;
    }

    let mut input_manager = InputManager::new();
    let document = match &input.media_type {
        Some(mime) => input_manager.load_document_as(&input.resume, mime).await,
        None => input_manager.load_document(&input.resume).await,
    }
    .with_context(|| format!("Failed to load resume {}", input.resume.display()))?;

    let description = match &input.description_file {
        Some(path) => input_manager
            .load_text(path)
            .await
            .with_context(|| format!("Failed to read role description {}", path.display()))?,
        None => input.description.clone(),
    };

    Ok((document, description))
}
