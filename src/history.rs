//! Persistent scan history, most recent first

use crate::config::HistoryConfig;
use crate::error::{Result, ResumeScannerError};
use crate::processing::scan_result::{format_date_key, ScanResult};
use chrono::{DateTime, Duration, Utc};
use log::{debug, warn};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// JSON array of scan results on disk, keyed by `date`
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    max_entries: usize,
    entries: Vec<ScanResult>,
}

impl HistoryStore {
    pub fn open(config: &HistoryConfig) -> Self {
        Self::load(&config.path, config.max_entries)
    }

    /// Read the history file. Anything unreadable is logged and treated as empty.
    pub fn load(path: &Path, max_entries: usize) -> Self {
        let mut entries = read_entries(path);
        entries.truncate(max_entries);
        debug!("Loaded {} history entries from {}", entries.len(), path.display());
        Self {
            path: path.to_path_buf(),
            max_entries,
            entries,
        }
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(writer, &self.entries)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[ScanResult] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, date: &DateTime<Utc>) -> Option<&ScanResult> {
        self.entries.iter().find(|entry| entry.date == *date)
    }

    /// Prepend a result and persist. A date that is already taken is moved
    /// forward one millisecond at a time until it is unique. Returns the
    /// result as stored.
    pub fn record(&mut self, mut result: ScanResult) -> Result<ScanResult> {
        while self.get(&result.date).is_some() {
            result.date += Duration::milliseconds(1);
        }
        self.entries.insert(0, result.clone());
        self.entries.truncate(self.max_entries);
        self.save()?;
        Ok(result)
    }

    /// Remove exactly the entry with this date, keeping the others in order
    pub fn delete(&mut self, date: &DateTime<Utc>) -> Result<ScanResult> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.date == *date)
            .ok_or_else(|| ResumeScannerError::HistoryEntryNotFound(format_date_key(date)))?;
        let removed = self.entries.remove(index);
        self.save()?;
        Ok(removed)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

fn read_entries(path: &Path) -> Vec<ScanResult> {
    if !path.exists() {
        return Vec::new();
    }

    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            warn!("Failed to open history {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    match serde_json::from_reader(BufReader::new(file)) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Failed to load history {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::scan_result::parse_date_key;
    use tempfile::TempDir;

    fn result(date: &str, score: f64) -> ScanResult {
        ScanResult {
            score,
            missing_keywords: vec!["Kafka".to_string()],
            resume_text: "text".to_string(),
            job_role: "Engineer".to_string(),
            job_level: "Mid Level".to_string(),
            date: parse_date_key(date).unwrap(),
            summary: String::new(),
        }
    }

    fn store(dir: &TempDir, max_entries: usize) -> HistoryStore {
        HistoryStore::load(&dir.path().join("history.json"), max_entries)
    }

    #[test]
    fn test_round_trip_through_disk() {
        let dir = TempDir::new().unwrap();
        let mut history = store(&dir, 50);
        history.record(result("2024-01-01T00:00:00.000Z", 10.0)).unwrap();
        history.record(result("2024-01-02T00:00:00.000Z", 20.0)).unwrap();

        let reloaded = store(&dir, 50);
        assert_eq!(reloaded.entries(), history.entries());
        assert_eq!(reloaded.entries()[0].score, 20.0);
    }

    #[test]
    fn test_capped_at_max_entries() {
        let dir = TempDir::new().unwrap();
        let mut history = store(&dir, 50);
        let base = parse_date_key("2024-01-01T00:00:00.000Z").unwrap();
        for i in 0..55 {
            let mut entry = result("2024-01-01T00:00:00.000Z", i as f64);
            entry.date = base + Duration::seconds(i);
            history.record(entry).unwrap();
        }
        assert_eq!(history.len(), 50);
        assert_eq!(history.entries()[0].score, 54.0);
        assert_eq!(history.entries()[49].score, 5.0);
    }

    #[test]
    fn test_delete_removes_one_and_keeps_order() {
        let dir = TempDir::new().unwrap();
        let mut history = store(&dir, 50);
        for (day, score) in [("01", 1.0), ("02", 2.0), ("03", 3.0)] {
            history.record(result(&format!("2024-03-{}T08:00:00.000Z", day), score)).unwrap();
        }

        let target = parse_date_key("2024-03-02T08:00:00.000Z").unwrap();
        assert_eq!(history.delete(&target).unwrap().score, 2.0);
        let scores: Vec<f64> = history.entries().iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![3.0, 1.0]);
        assert_eq!(store(&dir, 50).len(), 2);

        assert!(matches!(
            history.delete(&target),
            Err(ResumeScannerError::HistoryEntryNotFound(_))
        ));
    }

    #[test]
    fn test_colliding_dates_are_bumped() {
        let dir = TempDir::new().unwrap();
        let mut history = store(&dir, 50);
        let first = history.record(result("2024-06-01T10:00:00.000Z", 1.0)).unwrap();
        let second = history.record(result("2024-06-01T10:00:00.000Z", 2.0)).unwrap();
        let third = history.record(result("2024-06-01T10:00:00.000Z", 3.0)).unwrap();

        assert_eq!(first.date_key(), "2024-06-01T10:00:00.000Z");
        assert_eq!(second.date_key(), "2024-06-01T10:00:00.001Z");
        assert_eq!(third.date_key(), "2024-06-01T10:00:00.002Z");
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_corrupt_file_is_treated_as_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "{ not json").unwrap();

        let mut history = HistoryStore::load(&path, 50);
        assert!(history.is_empty());
        history.record(result("2024-01-01T00:00:00.000Z", 5.0)).unwrap();
        assert_eq!(HistoryStore::load(&path, 50).len(), 1);
    }

    #[test]
    fn test_clear_removes_file() {
        let dir = TempDir::new().unwrap();
        let mut history = store(&dir, 50);
        history.record(result("2024-01-01T00:00:00.000Z", 5.0)).unwrap();
        history.clear().unwrap();
        assert!(history.is_empty());
        assert!(!history.path().exists());
    }
}
