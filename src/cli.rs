//! CLI interface for resume-lens

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "resume-lens")]
#[command(about = "AI-powered resume compatibility analysis")]
#[command(long_about = "Score a resume against a target role using a structured-output Gemini model: missing keywords, weak bullet rewrites, ATS friendliness and detected skills")]
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
    /// Analyze a resume against a target role
    Analyze {
        #[command(flatten)]
        input: RoleInput,

        /// Output format: console, json, markdown
        #[arg(short, long)]
        output: Option<String>,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// Show full bullet text and run details
        #[arg(short, long)]
        detailed: bool,
    },

    /// Render the prompt that would be sent, without calling the model
    Prompt {
        #[command(flatten)]
        input: RoleInput,
    },

    /// Print the output schema requested from the model
    Schema,

    /// Show or reset configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(clap::Args)]
pub struct RoleInput {
    /// Path to resume file (PDF, TXT, MD)
    #[arg(short, long)]
    pub resume: PathBuf,

    /// Target role title
    #[arg(short, long, default_value = "")]
    pub title: String,

    /// Target role description
    #[arg(long, default_value = "", conflicts_with = "description_file")]
    pub description: String,

    /// Read the role description from a file
    #[arg(long)]
    pub description_file: Option<PathBuf>,

    /// Declared mime type of the resume (application/pdf, text/plain, text/markdown)
    #[arg(long)]
    pub media_type: Option<String>,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Print the default configuration file location
    Path,

    /// Reset configuration to defaults
    Reset,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<crate::config::OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(crate::config::OutputFormat::Console),
        "json" => Ok(crate::config::OutputFormat::Json),
        "markdown" | "md" => Ok(crate::config::OutputFormat::Markdown),
        _ => Err(format!("Invalid output format: {}. Supported: console, json, markdown", format)),
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
