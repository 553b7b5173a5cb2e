//! Resume scanner: ATS-style resume scoring from the command line

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use dialoguer::{Confirm, Input};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use resume_scanner::cli::{self, Cli, Commands, ConfigAction, HistoryAction};
use resume_scanner::config::{Config, OutputFormat};
use resume_scanner::history::HistoryStore;
use resume_scanner::input::InputManager;
use resume_scanner::llm::rewrite::{self, Tone};
use resume_scanner::llm::HttpChatClient;
use resume_scanner::output::{save_report_to_file, suggest_filename, ReportGenerator};
use resume_scanner::processing::scan_result::{format_date_key, parse_date_key, JobLevel, ScanRequest};
use resume_scanner::processing::Scanner;
use resume_scanner::session::ScanSession;
use resume_scanner::ResumeScannerError;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration from {}: {}", config_path.display(), e);
            process::exit(1);
        }
    };

    if !config.output.color_output {
        colored::control::set_override(false);
    }

    if let Err(e) = run_command(cli.command, config, &config_path).await {
        error!("{:#}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, config: Config, config_path: &Path) -> Result<()> {
    match command {
        Commands::Scan {
            resume,
            role,
            level,
            job_description,
            mode,
            output,
            save,
            show_text,
            no_history,
        } => {
            let mut config = config;
            if let Some(mode) = mode {
                config.analysis.mode = mode;
            }
            let format = output.unwrap_or(config.output.format);
            let options = ScanOptions {
                format,
                save,
                show_text,
                no_history,
            };
            run_scan(config, resume, role, level, job_description, options).await
        }

        Commands::Extract { file, save } => {
            let input = InputManager::new(config.layout);
            let text = input
                .extract_text(&file)
                .await
                .with_context(|| format!("Failed to extract text from {}", file.display()))?;
            info!("Extracted {} characters", text.chars().count());
            emit(&text, save.as_deref())
        }

        Commands::History { action } => run_history(action, &config),

        Commands::Chat { date } => run_chat(config, date).await,

        Commands::Forge { role, bullet } => {
            let client = HttpChatClient::from_config(&config)?;
            let spinner = spinner("Forging bullet point...");
            let forged = rewrite::forge_bullet(&client, &role, &bullet).await;
            spinner.finish_and_clear();
            println!("{}", forged.context("Failed to rewrite bullet point")?);
            Ok(())
        }

        Commands::Humanize { tone, file } => run_humanize(&config, tone, &file).await,

        Commands::Config { action } => {
            match action {
                Some(ConfigAction::Show) | None => {
                    println!("⚙️  Current Configuration ({})\n", config_path.display());
                    let rendered = toml::to_string_pretty(&config).context("Failed to render configuration")?;
                    println!("{}", rendered);
                    let key_status = if config.api_key().is_some() {
                        "set".green()
                    } else {
                        "not set (requests go out without authorization)".yellow()
                    };
                    println!("API key ({}): {}", config.api.api_key_env, key_status);
                }

                Some(ConfigAction::Reset) => {
                    Config::default().save_to(config_path)?;
                    println!("✅ Configuration reset to defaults at {}", config_path.display());
                }

                Some(ConfigAction::Path) => println!("{}", config_path.display()),
            }
            Ok(())
        }
    }
}

struct ScanOptions {
    format: OutputFormat,
    save: Option<PathBuf>,
    show_text: bool,
    no_history: bool,
}

async fn run_scan(
    config: Config,
    resume: PathBuf,
    role: String,
    level: JobLevel,
    job_description: Option<PathBuf>,
    options: ScanOptions,
) -> Result<()> {
    cli::validate_file_extension(&resume, &["pdf"])
        .map_err(|e| ResumeScannerError::InvalidInput(format!("Resume file: {}", e)))?;

    let job_description = match job_description {
        Some(path) => {
            cli::validate_file_extension(&path, &["txt", "md"])
                .map_err(|e| ResumeScannerError::InvalidInput(format!("Job description file: {}", e)))?;
            let text = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read job description {}", path.display()))?;
            Some(text)
        }
        None => None,
    };

    info!(
        "Scanning {} for {} ({}) in {:?} mode",
        resume.display(),
        role,
        level.label(),
        config.analysis.mode
    );

    let client = HttpChatClient::from_config(&config)?;
    let scanner = Scanner::new(&config, client);
    let mut session = ScanSession::new(scanner, HistoryStore::open(&config.history));
    if options.no_history {
        session = session.without_history_recording();
    }

    // A directory target gets a generated report name
    let save = options.save.map(|path| {
        if path.is_dir() {
            let resume_name = resume.file_name().unwrap_or_default().to_string_lossy();
            path.join(suggest_filename(options.format, &resume_name, true))
        } else {
            path
        }
    });

    let request = ScanRequest::new(resume, role, level).with_job_description(job_description);
    let spinner = spinner("Analyzing resume...");
    let result = session.perform_scan(&request).await;
    spinner.finish_and_clear();
    let result = result.context("Scan failed")?;

    print_or_save(&config, result, options.format, options.show_text, save.as_deref())
}

fn run_history(action: HistoryAction, config: &Config) -> Result<()> {
    let mut store = HistoryStore::open(&config.history);
    let generator = ReportGenerator::with_options(config.output.color_output, false);

    match action {
        HistoryAction::List { output } => {
            let format = output.unwrap_or(config.output.format);
            print!("{}", generator.generate_history(store.entries(), format)?);
        }

        HistoryAction::Show { date, output, show_text } => {
            let date = parse_date(&date)?;
            let result = store
                .get(&date)
                .ok_or_else(|| ResumeScannerError::HistoryEntryNotFound(format_date_key(&date)))?;
            let format = output.unwrap_or(config.output.format);
            print_or_save(config, result, format, show_text, None)?;
        }

        HistoryAction::Delete { date } => {
            let date = parse_date(&date)?;
            let removed = store.delete(&date)?;
            println!("🗑️  Deleted scan {} ({})", removed.date_key(), removed.job_role);
        }

        HistoryAction::Clear { yes } => {
            if store.is_empty() {
                println!("History is already empty.");
                return Ok(());
            }
            let confirmed = yes
                || Confirm::new()
                    .with_prompt("Are you sure you want to clear all history? This cannot be undone.")
                    .default(false)
                    .interact()
                    .context("Failed to read confirmation")?;
            if confirmed {
                let count = store.len();
                store.clear()?;
                println!("✅ Cleared {} scans", count);
            } else {
                println!("Nothing deleted.");
            }
        }
    }
    Ok(())
}

async fn run_chat(config: Config, date: Option<String>) -> Result<()> {
    let client = HttpChatClient::from_config(&config)?;
    let history = HistoryStore::open(&config.history);
    let date = match date {
        Some(key) => parse_date(&key)?,
        None => match history.entries().first() {
            Some(latest) => latest.date,
            None => bail!("No scans in history. Run `resume-scanner scan` first."),
        },
    };

    let mut session = ScanSession::new(Scanner::new(&config, client), history);
    let current = session.load_from_history(&date)?;
    println!(
        "💬 Coaching on your {} resume for {} (score {}). Empty line or 'exit' to quit.\n",
        current.job_level,
        current.job_role.bold(),
        current.rounded_score()
    );

    loop {
        let message: String = Input::new()
            .with_prompt("You")
            .allow_empty(true)
            .interact_text()
            .context("Failed to read chat input")?;

        let trimmed = message.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
            break;
        }

        let spinner = spinner("Thinking...");
        let reply = session.send_chat_message(trimmed).await;
        spinner.finish_and_clear();

        match reply {
            Ok(reply) => println!("\n{} {}\n", "Coach:".cyan().bold(), reply),
            Err(e) => {
                warn!("Chat request failed: {}", e);
                println!("\n{} Sorry, I'm having trouble connecting right now.\n", "Coach:".red().bold());
            }
        }
    }
    Ok(())
}

async fn run_humanize(config: &Config, tone: Tone, file: &Path) -> Result<()> {
    let text = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let client = HttpChatClient::from_config(config)?;

    let spinner = spinner("Rewriting...");
    let rewritten = rewrite::humanize(&client, &text, tone).await;
    spinner.finish_and_clear();
    println!("{}", rewritten.context("Failed to humanize text")?);
    Ok(())
}

fn print_or_save(
    config: &Config,
    result: &resume_scanner::processing::ScanResult,
    format: OutputFormat,
    show_text: bool,
    save: Option<&Path>,
) -> Result<()> {
    match save {
        Some(path) => {
            let plain = ReportGenerator::with_options(false, show_text);
            save_report_to_file(&plain.generate_report(result, format)?, path)?;
            println!("💾 Report saved to {}", path.display());
        }
        None => {
            let generator = ReportGenerator::with_options(config.output.color_output, show_text);
            print!("{}", generator.generate_report(result, format)?);
        }
    }
    Ok(())
}

fn emit(content: &str, save: Option<&Path>) -> Result<()> {
    match save {
        Some(path) => {
            save_report_to_file(content, path)?;
            println!("💾 Saved to {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}

fn parse_date(key: &str) -> Result<chrono::DateTime<chrono::Utc>> {
    parse_date_key(key).ok_or_else(|| {
        ResumeScannerError::InvalidInput(format!("Invalid date key: {} (expected e.g. 2024-05-01T12:30:00.123Z)", key)).into()
    })
}

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
