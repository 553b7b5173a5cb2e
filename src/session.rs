//! Interactive session state: the current scan, its chat, and the history

use crate::error::{Result, ResumeScannerError};
use crate::history::HistoryStore;
use crate::llm::chat::ChatThread;
use crate::llm::client::{ChatClient, ChatMessage};
use crate::processing::scan_result::{format_date_key, ScanRequest, ScanResult};
use crate::processing::scanner::Scanner;
use chrono::{DateTime, Utc};
use log::info;

pub struct ScanSession<C: ChatClient> {
    scanner: Scanner<C>,
    history: HistoryStore,
    current: Option<ScanResult>,
    chat: Option<ChatThread>,
    record_history: bool,
}

impl<C: ChatClient> ScanSession<C> {
    pub fn new(scanner: Scanner<C>, history: HistoryStore) -> Self {
        Self {
            scanner,
            history,
            current: None,
            chat: None,
            record_history: true,
        }
    }

    /// Keep scans out of the persisted history
    pub fn without_history_recording(mut self) -> Self {
        self.record_history = false;
        self
    }

    pub fn scanner(&self) -> &Scanner<C> {
        &self.scanner
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn current(&self) -> Option<&ScanResult> {
        self.current.as_ref()
    }

    pub fn chat_transcript(&self) -> &[ChatMessage] {
        self.chat.as_ref().map(ChatThread::messages).unwrap_or(&[])
    }

    /// Validate, scan, record, and make the result current. A failed scan
    /// leaves the current result and its chat in place.
    pub async fn perform_scan(&mut self, request: &ScanRequest) -> Result<&ScanResult> {
        validate_request(request)?;

        let result = self.scanner.scan(request).await?;
        let result = if self.record_history {
            self.history.record(result)?
        } else {
            result
        };

        info!("Scan {} scored {:.1}", result.date_key(), result.score);
        Ok(self.make_current(result))
    }

    pub fn load_from_history(&mut self, date: &DateTime<Utc>) -> Result<&ScanResult> {
        let result = self
            .history
            .get(date)
            .cloned()
            .ok_or_else(|| not_found(date))?;
        Ok(self.make_current(result))
    }

    /// Delete one stored scan; if it is the current one the session is reset
    pub fn delete_scan(&mut self, date: &DateTime<Utc>) -> Result<()> {
        self.history.delete(date)?;
        if self.current.as_ref().is_some_and(|current| current.date == *date) {
            self.reset();
        }
        Ok(())
    }

    pub fn clear_history(&mut self) -> Result<()> {
        self.history.clear()
    }

    pub fn reset(&mut self) {
        self.current = None;
        self.chat = None;
    }

    /// Ask the coach about the current scan
    pub async fn send_chat_message(&mut self, message: &str) -> Result<String> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ResumeScannerError::InvalidInput("chat message is empty".to_string()));
        }
        let chat = self
            .chat
            .as_mut()
            .ok_or_else(|| ResumeScannerError::InvalidInput("no scan is loaded to chat about".to_string()))?;
        chat.send(self.scanner.client(), message).await
    }

    fn make_current(&mut self, result: ScanResult) -> &ScanResult {
        self.chat = Some(ChatThread::for_resume(&result.job_role, &result.resume_text));
        self.current.insert(result)
    }
}

fn not_found(date: &DateTime<Utc>) -> ResumeScannerError {
    ResumeScannerError::HistoryEntryNotFound(format_date_key(date))
}

fn validate_request(request: &ScanRequest) -> Result<()> {
    if request.resume.as_os_str().is_empty()
        || request.job_role.trim().is_empty()
        || request.job_level.trim().is_empty()
    {
        return Err(ResumeScannerError::InvalidInput(
            "Please fill in the required fields (File, Role, Level)".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::llm::analyzer::tests::ScriptedClient;
    use crate::processing::scan_result::{parse_date_key, JobLevel};
    use tempfile::TempDir;

    const REPLY: &str = r#"{"score": 70, "missingKeywords": ["Terraform"], "summary": "Close."}"#;

    fn session(dir: &TempDir, replies: &[&str]) -> ScanSession<ScriptedClient> {
        let scanner = Scanner::new(&Config::default(), ScriptedClient::replying(replies));
        let history = HistoryStore::load(&dir.path().join("history.json"), 50);
        ScanSession::new(scanner, history)
    }

    async fn scan_text(session: &mut ScanSession<ScriptedClient>) -> ScanResult {
        let request = ScanRequest::new("cv.pdf", "Cloud Engineer", JobLevel::Senior);
        let result = session
            .scanner
            .scan_text("AWS Kubernetes Python".to_string(), &request)
            .await
            .unwrap();
        let stored = session.history.record(result).unwrap();
        session.make_current(stored).clone()
    }

    #[tokio::test]
    async fn test_missing_fields_rejected() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir, &[]);
        let request = ScanRequest::new("cv.pdf", "  ", JobLevel::Mid);
        assert!(matches!(
            session.perform_scan(&request).await,
            Err(ResumeScannerError::InvalidInput(_))
        ));
        assert_eq!(session.scanner().client().request_count(), 0);
    }

    #[tokio::test]
    async fn test_chat_requires_a_current_scan() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir, &["hello"]);
        assert!(session.send_chat_message("hi").await.is_err());
    }

    #[tokio::test]
    async fn test_chat_follows_current_scan() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir, &[REPLY, "Mention Terraform modules."]);
        scan_text(&mut session).await;

        let reply = session.send_chat_message("What should I add?").await.unwrap();
        assert_eq!(reply, "Mention Terraform modules.");
        assert_eq!(session.chat_transcript().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_scan_keeps_current_chat() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir, &[REPLY, "Tip one.", "Tip two."]);
        let first = scan_text(&mut session).await;
        session.send_chat_message("Any tips?").await.unwrap();

        let missing = dir.path().join("missing.pdf");
        let request = ScanRequest::new(&missing, "Cloud Engineer", JobLevel::Senior);
        assert!(session.perform_scan(&request).await.is_err());

        assert_eq!(session.current().map(|current| current.date), Some(first.date));
        assert_eq!(session.chat_transcript().len(), 2);
        assert_eq!(session.send_chat_message("More?").await.unwrap(), "Tip two.");
    }

    #[tokio::test]
    async fn test_delete_current_resets_session() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir, &[REPLY]);
        let result = scan_text(&mut session).await;

        session.delete_scan(&result.date).unwrap();
        assert!(session.current().is_none());
        assert!(session.chat_transcript().is_empty());
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn test_load_from_history() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir, &[REPLY]);
        let result = scan_text(&mut session).await;
        session.reset();

        let loaded = session.load_from_history(&result.date).unwrap();
        assert_eq!(loaded.missing_keywords, vec!["Terraform"]);

        let unknown = parse_date_key("1999-01-01T00:00:00.000Z").unwrap();
        assert!(matches!(
            session.load_from_history(&unknown),
            Err(ResumeScannerError::HistoryEntryNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_clear_history_keeps_current() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir, &[REPLY]);
        scan_text(&mut session).await;

        session.clear_history().unwrap();
        assert!(session.history().is_empty());
        assert!(session.current().is_some());
    }
}
