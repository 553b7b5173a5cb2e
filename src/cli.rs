//! CLI interface for the resume scanner

use crate::config::{OutputFormat, ScanMode};
use crate::llm::rewrite::Tone;
use crate::processing::scan_result::JobLevel;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "resume-scanner")]
#[command(about = "ATS-style resume scanner powered by an LLM")]
#[command(long_about = "Extract text from a PDF resume, score it against a target role with an LLM, and keep a history of scans you can revisit and discuss")]
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
    /// Scan a resume against a target role
    Scan {
        /// Path to the resume PDF
        #[arg(short, long)]
        resume: PathBuf,

        /// Target job role, e.g. "Frontend Developer"
        #[arg(long)]
        role: String,

        /// Experience level: internship, entry, mid, senior
        #[arg(short, long, value_parser = parse_job_level)]
        level: JobLevel,

        /// Optional job description file (TXT, MD)
        #[arg(short, long)]
        job_description: Option<PathBuf>,

        /// Scoring mode: analysis or keywords (overrides config)
        #[arg(short, long, value_parser = parse_scan_mode)]
        mode: Option<ScanMode>,

        /// Output format: console, json, markdown
        #[arg(short, long, value_parser = parse_output_format)]
        output: Option<OutputFormat>,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// Include the extracted resume text in the report
        #[arg(long)]
        show_text: bool,

        /// Do not record this scan in the history
        #[arg(long)]
        no_history: bool,
    },

    /// Print the text reconstructed from a PDF
    Extract {
        /// Path to the PDF
        file: PathBuf,

        /// Save the text to a file instead of printing it
        #[arg(short, long)]
        save: Option<PathBuf>,
    },

    /// Browse and manage past scans
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Ask follow-up questions about a scan
    Chat {
        /// Date key of the scan to discuss (defaults to the most recent)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Rewrite a weak resume bullet into an impact statement
    Forge {
        /// Target job role
        #[arg(long)]
        role: String,

        /// The bullet point to rewrite
        bullet: String,
    },

    /// Rewrite text so it reads naturally
    Humanize {
        /// Tone: formal, informal, interview, explanatory
        #[arg(short, long, default_value = "formal", value_parser = parse_tone)]
        tone: Tone,

        /// File holding the text to rewrite
        file: PathBuf,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List stored scans, most recent first
    List {
        #[arg(short, long, value_parser = parse_output_format)]
        output: Option<OutputFormat>,
    },

    /// Show one stored scan
    Show {
        /// Date key, e.g. 2024-05-01T12:30:00.123Z
        date: String,

        #[arg(short, long, value_parser = parse_output_format)]
        output: Option<OutputFormat>,

        /// Include the extracted resume text
        #[arg(long)]
        show_text: bool,
    },

    /// Delete one stored scan
    Delete {
        /// Date key of the scan
        date: String,
    },

    /// Delete every stored scan
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
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
        _ => Err(format!("Invalid output format: {}. Supported: console, json, markdown", format)),
    }
}

pub fn parse_scan_mode(mode: &str) -> Result<ScanMode, String> {
    match mode.to_lowercase().as_str() {
        "analysis" => Ok(ScanMode::Analysis),
        "keywords" | "keyword" => Ok(ScanMode::Keywords),
        _ => Err(format!("Invalid scan mode: {}. Supported: analysis, keywords", mode)),
    }
}

pub fn parse_job_level(level: &str) -> Result<JobLevel, String> {
    level.parse()
}

pub fn parse_tone(tone: &str) -> Result<Tone, String> {
    tone.parse()
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
