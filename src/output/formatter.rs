//! Output formatters for scan results and history listings

use crate::config::OutputFormat;
use crate::error::{Result, ResumeScannerError};
use crate::processing::scan_result::ScanResult;
use colored::{Color, Colorize};
use serde::Serialize;
use std::path::Path;

/// Trait for rendering scan results
pub trait OutputFormatter {
    fn format_result(&self, result: &ScanResult) -> Result<String>;
    fn format_history(&self, entries: &[ScanResult]) -> Result<String>;
}

/// Terminal output with optional colors
pub struct ConsoleFormatter {
    use_colors: bool,
    show_resume_text: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter {
    include_resume_text: bool,
}

/// Picks the formatter for a requested output format
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
}

/// Verdict band for a 0-100 score
fn score_band(score: u32) -> (&'static str, Color) {
    match score {
        80..=100 => ("STRONG MATCH", Color::Green),
        60..=79 => ("GOOD", Color::Yellow),
        40..=59 => ("NEEDS WORK", Color::BrightYellow),
        _ => ("WEAK MATCH", Color::Red),
    }
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, show_resume_text: bool) -> Self {
        Self {
            use_colors,
            show_resume_text,
        }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str) -> String {
        if self.use_colors {
            format!("\n{} {}\n", "█".blue().bold(), title.blue().bold())
        } else {
            format!("\n# {}\n", title)
        }
    }

    fn format_score_badge(&self, score: u32) -> String {
        let (badge, color) = score_band(score);
        if self.use_colors {
            format!("[{}]", badge.color(color).bold())
        } else {
            format!("[{}]", badge)
        }
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_result(&self, result: &ScanResult) -> Result<String> {
        let mut output = String::new();
        let score = result.rounded_score();

        output.push_str(&self.format_header("ATS SCAN RESULT"));
        output.push_str(&format!(
            "Role: {} ({})\nScanned: {}\n\n",
            result.job_role,
            result.job_level,
            result.date_key()
        ));
        output.push_str(&format!("Score: {}/100 {}\n", score, self.format_score_badge(score)));

        if !result.summary.is_empty() {
            output.push_str(&format!("\n{} {}\n", self.colorize("Summary:", Color::Cyan), result.summary));
        }

        output.push_str(&self.format_header("Missing Keywords"));
        if result.missing_keywords.is_empty() {
            output.push_str(&format!("  {}\n", self.colorize("None, every expected keyword was found.", Color::Green)));
        } else {
            for keyword in &result.missing_keywords {
                output.push_str(&format!("  • {}\n", self.colorize(keyword, Color::Yellow)));
            }
        }

        if self.show_resume_text {
            output.push_str(&self.format_header("Extracted Resume Text"));
            output.push_str(&result.resume_text);
            if !result.resume_text.ends_with('\n') {
                output.push('\n');
            }
        }

        Ok(output)
    }

    fn format_history(&self, entries: &[ScanResult]) -> Result<String> {
        if entries.is_empty() {
            return Ok("No scans in history.\n".to_string());
        }

        let mut output = self.format_header(&format!("Scan History ({})", entries.len()));
        for entry in entries {
            let score = entry.rounded_score();
            let (_, color) = score_band(score);
            output.push_str(&format!(
                "  {}  {:>3}  {} · {}\n",
                entry.date_key(),
                self.colorize(&score.to_string(), color),
                entry.job_role,
                entry.job_level
            ));
        }
        Ok(output)
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn to_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(value)?)
        } else {
            Ok(serde_json::to_string(value)?)
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_result(&self, result: &ScanResult) -> Result<String> {
        self.to_json(result)
    }

    fn format_history(&self, entries: &[ScanResult]) -> Result<String> {
        self.to_json(entries)
    }
}

impl MarkdownFormatter {
    pub fn new(include_resume_text: bool) -> Self {
        Self { include_resume_text }
    }

    fn markdown_score_badge(score: u32) -> &'static str {
        match score {
            80..=100 => "🟢 Strong match",
            60..=79 => "🟡 Good",
            40..=59 => "🟠 Needs work",
            _ => "🔴 Weak match",
        }
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_result(&self, result: &ScanResult) -> Result<String> {
        let mut output = String::new();
        let score = result.rounded_score();

        output.push_str("# ATS Scan Report\n\n");
        output.push_str(&format!(
            "**Role:** {} | **Level:** {} | **Scanned:** {}\n\n",
            result.job_role,
            result.job_level,
            result.date_key()
        ));
        output.push_str(&format!("## Score: {}/100 {}\n\n", score, Self::markdown_score_badge(score)));

        if !result.summary.is_empty() {
            output.push_str(&format!("{}\n\n", result.summary));
        }

        output.push_str("## Missing Keywords\n\n");
        if result.missing_keywords.is_empty() {
            output.push_str("_None_\n");
        } else {
            for keyword in &result.missing_keywords {
                output.push_str(&format!("- `{}`\n", keyword));
            }
        }

        if self.include_resume_text {
            output.push_str("\n## Extracted Resume Text\n\n```text\n");
            output.push_str(&result.resume_text);
            if !result.resume_text.ends_with('\n') {
                output.push('\n');
            }
            output.push_str("```\n");
        }

        Ok(output)
    }

    fn format_history(&self, entries: &[ScanResult]) -> Result<String> {
        let mut output = String::from("# Scan History\n\n| Date | Score | Role | Level |\n|------|-------|------|-------|\n");
        for entry in entries {
            output.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                entry.date_key(),
                entry.rounded_score(),
                entry.job_role.replace('|', "\\|"),
                entry.job_level
            ));
        }
        Ok(output)
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::with_options(true, false)
    }

    pub fn with_options(use_colors: bool, include_resume_text: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, include_resume_text),
            json_formatter: JsonFormatter::new(true),
            markdown_formatter: MarkdownFormatter::new(include_resume_text),
        }
    }

    fn formatter(&self, format: OutputFormat) -> &dyn OutputFormatter {
        match format {
            OutputFormat::Console => &self.console_formatter,
            OutputFormat::Json => &self.json_formatter,
            OutputFormat::Markdown => &self.markdown_formatter,
        }
    }

    pub fn generate_report(&self, result: &ScanResult, format: OutputFormat) -> Result<String> {
        self.formatter(format).format_result(result)
    }

    pub fn generate_history(&self, entries: &[ScanResult], format: OutputFormat) -> Result<String> {
        self.formatter(format).format_history(entries)
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(file_path, content)
        .map_err(|e| ResumeScannerError::OutputFormatting(format!("Failed to write {}: {}", file_path.display(), e)))
}

pub fn suggest_filename(format: OutputFormat, resume_name: &str, timestamp: bool) -> String {
    let base_name = Path::new(resume_name)
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();

    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    match format {
        OutputFormat::Console => format!("{}_scan{}.txt", base_name, timestamp_suffix),
        OutputFormat::Json => format!("{}_scan{}.json", base_name, timestamp_suffix),
        OutputFormat::Markdown => format!("{}_scan{}.md", base_name, timestamp_suffix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::scan_result::parse_date_key;
    use tempfile::TempDir;

    fn sample() -> ScanResult {
        ScanResult {
            score: 67.6,
            missing_keywords: vec!["Docker".to_string(), "CI/CD".to_string()],
            resume_text: "Jane Doe\nBackend Engineer".to_string(),
            job_role: "Backend Engineer".to_string(),
            job_level: "Mid Level".to_string(),
            date: parse_date_key("2024-02-03T04:05:06.789Z").unwrap(),
            summary: "Strong Python, light on containers.".to_string(),
        }
    }

    #[test]
    fn test_console_plain() {
        let output = ConsoleFormatter::new(false, false).format_result(&sample()).unwrap();
        assert!(output.contains("Score: 68/100 [GOOD]"));
        assert!(output.contains("  • Docker\n"));
        assert!(output.contains("Strong Python"));
        assert!(!output.contains("Jane Doe"));
    }

    #[test]
    fn test_console_with_resume_text() {
        let output = ConsoleFormatter::new(false, true).format_result(&sample()).unwrap();
        assert!(output.ends_with("Jane Doe\nBackend Engineer\n"));
    }

    #[test]
    fn test_json_output_is_camel_case() {
        let output = JsonFormatter::new(false).format_result(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["missingKeywords"][1], "CI/CD");
        assert_eq!(value["date"], "2024-02-03T04:05:06.789Z");
    }

    #[test]
    fn test_markdown_output() {
        let output = MarkdownFormatter::new(false).format_result(&sample()).unwrap();
        assert!(output.starts_with("# ATS Scan Report"));
        assert!(output.contains("## Score: 68/100 🟡 Good"));
        assert!(output.contains("- `CI/CD`"));
    }

    #[test]
    fn test_history_listing() {
        let generator = ReportGenerator::with_options(false, false);
        let listing = generator.generate_history(&[sample()], OutputFormat::Console).unwrap();
        assert!(listing.contains("2024-02-03T04:05:06.789Z"));
        assert!(listing.contains("Backend Engineer · Mid Level"));

        let empty = generator.generate_history(&[], OutputFormat::Console).unwrap();
        assert_eq!(empty, "No scans in history.\n");

        let table = generator.generate_history(&[sample()], OutputFormat::Markdown).unwrap();
        assert!(table.contains("| 2024-02-03T04:05:06.789Z | 68 | Backend Engineer | Mid Level |"));
    }

    #[test]
    fn test_save_and_suggest_filename() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reports").join(suggest_filename(OutputFormat::Json, "cv/jane.pdf", false));
        save_report_to_file("{}", &path).unwrap();
        assert_eq!(path.file_name().unwrap(), "jane_scan.json");
        assert_eq!(std::fs::read_to_string(path).unwrap(), "{}");
    }
}
