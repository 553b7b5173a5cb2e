//! Configuration management for the resume scanner

use crate::error::{Result, ResumeScannerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub analysis: AnalysisConfig,
    pub layout: LayoutConfig,
    pub history: HistoryConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub endpoint: String,
    pub model: String,
    /// Environment variable holding the bearer token. The key itself is never stored.
    pub api_key_env: String,
    pub site_url: Option<String>,
    pub site_name: Option<String>,
    /// 0 disables the timeout.
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub mode: ScanMode,
    pub max_resume_chars: usize,
    pub temperature: f32,
    pub max_tokens: u32,
    pub json_mode: bool,
    pub iterations: usize,
    pub fallback_keywords: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub line_tolerance: f64,
    pub word_gap: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    pub path: PathBuf,
    pub max_entries: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// One analysis call, the model scores the resume directly.
    Analysis,
    /// Repeated keyword generation, scored locally and averaged.
    Keywords,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

pub const SAMPLE_KEYWORDS: [&str; 12] = [
    "react", "javascript", "typescript", "css", "html", "api",
    "responsive", "frontend", "web", "development", "git", "ui",
];

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            line_tolerance: 6.0,
            word_gap: 10.0,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("resume-scanner");

        Self {
            api: ApiConfig {
                endpoint: "https://api.groq.com/openai/v1/chat/completions".to_string(),
                model: "llama-3.3-70b-versatile".to_string(),
                api_key_env: "GROQ_API_KEY".to_string(),
                site_url: None,
                site_name: None,
                request_timeout_secs: 120,
            },
            analysis: AnalysisConfig {
                mode: ScanMode::Analysis,
                max_resume_chars: 12_000,
                temperature: 0.2,
                max_tokens: 1024,
                json_mode: true,
                iterations: 3,
                fallback_keywords: SAMPLE_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            },
            layout: LayoutConfig::default(),
            history: HistoryConfig {
                path: data_dir.join("history.json"),
                max_entries: 50,
            },
            output: OutputConfig {
                format: OutputFormat::Console,
                color_output: true,
            },
        }
    }
}

impl Config {
    /// Load from an explicit path, writing defaults there if the file is missing
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| ResumeScannerError::Configuration(format!("Failed to parse config: {}", e)))?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ResumeScannerError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("resume-scanner")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        if self.api.endpoint.trim().is_empty() {
            return Err(ResumeScannerError::Configuration("api.endpoint must not be empty".to_string()));
        }
        if self.analysis.iterations == 0 {
            return Err(ResumeScannerError::Configuration("analysis.iterations must be at least 1".to_string()));
        }
        if self.analysis.max_resume_chars == 0 {
            return Err(ResumeScannerError::Configuration("analysis.max_resume_chars must be positive".to_string()));
        }
        if self.history.max_entries == 0 {
            return Err(ResumeScannerError::Configuration("history.max_entries must be positive".to_string()));
        }
        if !(self.layout.line_tolerance >= 0.0 && self.layout.word_gap >= 0.0) {
            return Err(ResumeScannerError::Configuration("layout tolerances must be non-negative".to_string()));
        }
        Ok(())
    }

    /// Read the API key from the configured environment variable, if set
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}
