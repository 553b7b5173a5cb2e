//! Scan inputs and results

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobLevel {
    Internship,
    Entry,
    Mid,
    Senior,
}

impl JobLevel {
    pub const ALL: [JobLevel; 4] = [JobLevel::Internship, JobLevel::Entry, JobLevel::Mid, JobLevel::Senior];

    pub fn id(&self) -> &'static str {
        match self {
            JobLevel::Internship => "internship",
            JobLevel::Entry => "entry",
            JobLevel::Mid => "mid",
            JobLevel::Senior => "senior",
        }
    }

    /// Display label, also the value stored in results and sent to the model
    pub fn label(&self) -> &'static str {
        match self {
            JobLevel::Internship => "Internship",
            JobLevel::Entry => "Entry Level",
            JobLevel::Mid => "Mid Level",
            JobLevel::Senior => "Senior Level",
        }
    }
}

impl std::str::FromStr for JobLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        JobLevel::ALL
            .into_iter()
            .find(|level| level.id() == wanted || level.label().to_lowercase() == wanted)
            .ok_or_else(|| format!("Invalid job level: {}. Valid options: internship, entry, mid, senior", s))
    }
}

/// Everything needed to run one scan
#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub resume: PathBuf,
    pub job_role: String,
    pub job_level: String,
    pub job_description: Option<String>,
}

impl ScanRequest {
    pub fn new(resume: impl Into<PathBuf>, job_role: impl Into<String>, job_level: JobLevel) -> Self {
        Self {
            resume: resume.into(),
            job_role: job_role.into(),
            job_level: job_level.label().to_string(),
            job_description: None,
        }
    }

    pub fn with_job_description(mut self, description: Option<String>) -> Self {
        self.job_description = description.filter(|d| !d.trim().is_empty());
        self
    }
}

/// Outcome of one scan. `date` doubles as the history key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub score: f64,
    pub missing_keywords: Vec<String>,
    pub resume_text: String,
    pub job_role: String,
    pub job_level: String,
    #[serde(with = "iso_millis")]
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub summary: String,
}

impl ScanResult {
    pub fn date_key(&self) -> String {
        format_date_key(&self.date)
    }

    pub fn rounded_score(&self) -> u32 {
        self.score.clamp(0.0, 100.0).round() as u32
    }
}

/// Current time truncated to whole milliseconds, so it survives a round trip
pub fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    now.with_nanosecond(now.nanosecond() / 1_000_000 * 1_000_000)
        .unwrap_or(now)
}

pub fn format_date_key(date: &DateTime<Utc>) -> String {
    iso_millis::format(date)
}

/// Parse a history key such as `2024-05-01T12:30:00.123Z`
pub fn parse_date_key(key: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(key.trim())
        .ok()
        .map(|date| date.with_timezone(&Utc))
}

mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(date: &DateTime<Utc>) -> String {
        date.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_date_key(&text).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", text)))
    }
}
