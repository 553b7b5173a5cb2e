//! Builds analysis and keyword requests and interprets their replies

use crate::config::AnalysisConfig;
use crate::error::{Result, ResumeScannerError};
use crate::llm::client::{ChatClient, ChatMessage, ChatRequest};
use crate::llm::prompts::{self, PromptParams};
use crate::llm::response_parser::{ParsedReply, ResponseParser};
use crate::processing::text_processor::truncate_chars;
use log::{debug, info};
use serde_json::Value;
use std::time::Instant;

/// Stateless requester: no cache, no retry. Every call goes to the model.
pub struct LlmAnalyzer {
    settings: AnalysisConfig,
    parser: ResponseParser,
}

impl LlmAnalyzer {
    pub fn new(settings: AnalysisConfig) -> Self {
        Self {
            settings,
            parser: ResponseParser::new(),
        }
    }

    pub fn settings(&self) -> &AnalysisConfig {
        &self.settings
    }

    /// Full-analysis request with the resume cut to the configured size
    pub fn analysis_request(&self, params: &PromptParams) -> ChatRequest {
        let resume = truncate_chars(&params.resume_content, self.settings.max_resume_chars);
        if resume.len() < params.resume_content.len() {
            debug!(
                "Resume truncated to {} characters for analysis",
                self.settings.max_resume_chars
            );
        }

        let bounded = PromptParams {
            resume_content: resume.to_string(),
            ..params.clone()
        };

        ChatRequest::new(
            vec![
                ChatMessage::system(prompts::ANALYSIS_SYSTEM_PROMPT),
                ChatMessage::user(prompts::render_analysis(&bounded)),
            ],
            self.settings.temperature,
        )
        .with_max_tokens(self.settings.max_tokens)
        .with_json_mode(self.settings.json_mode)
    }

    pub fn keyword_request(&self, params: &PromptParams) -> ChatRequest {
        ChatRequest::new(
            vec![ChatMessage::user(prompts::render_keywords(params))],
            prompts::KEYWORD_TEMPERATURE,
        )
        .with_max_tokens(prompts::KEYWORD_MAX_TOKENS)
        .with_json_mode(self.settings.json_mode)
    }

    /// One analysis call. Transport and API failures are returned; a
    /// malformed reply is absorbed by the parser.
    pub async fn analyze<C: ChatClient>(&self, client: &C, params: &PromptParams) -> Result<ParsedReply> {
        let start = Instant::now();
        let reply = match client.complete(&self.analysis_request(params)).await {
            Err(ResumeScannerError::EmptyCompletion) => String::new(),
            other => other?,
        };
        let parsed = self.parser.parse_analysis(&reply);
        info!(
            "Analysis reply parsed via {:?} in {}ms (score {:.0})",
            parsed.path,
            start.elapsed().as_millis(),
            parsed.reply.score
        );
        Ok(parsed)
    }

    /// One keyword-generation call, returning the recovered JSON value
    pub async fn generate_keywords<C: ChatClient>(&self, client: &C, params: &PromptParams) -> Result<Value> {
        let reply = client.complete(&self.keyword_request(params)).await?;
        match self.parser.extract_json(&reply) {
            Some((value, path)) => {
                debug!("Keyword reply parsed via {:?}", path);
                Ok(value)
            }
            None => Err(ResumeScannerError::AnalysisFailed(
                "keyword reply contained no JSON object".to_string(),
            )),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::Config;
    use crate::llm::client::Role;
    use crate::llm::response_parser::ParsePath;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned replies in order and records every request
    #[derive(Default)]
    pub(crate) struct ScriptedClient {
        replies: Mutex<VecDeque<Result<String>>>,
        pub(crate) requests: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedClient {
        pub(crate) fn new(replies: Vec<Result<String>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn replying(replies: &[&str]) -> Self {
            Self::new(replies.iter().map(|reply| Ok(reply.to_string())).collect())
        }

        pub(crate) fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    impl ChatClient for ScriptedClient {
        async fn complete(&self, request: &ChatRequest) -> Result<String> {
            self.requests.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ResumeScannerError::AnalysisFailed("script exhausted".to_string())))
        }
    }

    fn params(resume: &str) -> PromptParams {
        PromptParams {
            resume_content: resume.to_string(),
            job_role: "Data Engineer".to_string(),
            job_level: "Mid Level".to_string(),
            job_description: None,
        }
    }

    #[test]
    fn test_analysis_request_truncates_resume() {
        let mut settings = Config::default().analysis;
        settings.max_resume_chars = 10;
        let analyzer = LlmAnalyzer::new(settings);

        let request = analyzer.analysis_request(&params("0123456789ABCDEFGHIJ"));
        assert_eq!(request.messages[0].role, Role::System);
        let user = &request.messages[1].content;
        assert!(user.contains("<RESUME>\n0123456789\n</RESUME>"));
        assert!(user.contains("Not provided"));
        assert_eq!(request.max_tokens, Some(1024));
        assert!(request.json_mode);
    }

    #[test]
    fn test_keyword_request_settings() {
        let analyzer = LlmAnalyzer::new(Config::default().analysis);
        let request = analyzer.keyword_request(&params("irrelevant"));
        assert_eq!(request.temperature, prompts::KEYWORD_TEMPERATURE);
        assert_eq!(request.messages.len(), 1);
        assert!(request.messages[0].content.contains("Mid Level in Data Engineer"));
    }

    #[tokio::test]
    async fn test_analyze_repairs_truncated_reply() {
        let client = ScriptedClient::replying(&[r#"{"score": 82, "missingKeywords": ["SQL"], "summary": "ok""#]);
        let analyzer = LlmAnalyzer::new(Config::default().analysis);

        let parsed = analyzer.analyze(&client, &params("python spark")).await.unwrap();
        assert_eq!(parsed.reply.score, 82.0);
        assert_eq!(parsed.path, ParsePath::HeuristicRepair);
        assert_eq!(client.request_count(), 1);
    }

    #[tokio::test]
    async fn test_analyze_propagates_api_errors() {
        let client = ScriptedClient::new(vec![Err(ResumeScannerError::Api {
            status: 429,
            message: "rate limited".to_string(),
        })]);
        let analyzer = LlmAnalyzer::new(Config::default().analysis);

        let result = analyzer.analyze(&client, &params("python")).await;
        assert!(matches!(result, Err(ResumeScannerError::Api { status: 429, .. })));
    }

    #[tokio::test]
    async fn test_analyze_empty_completion_uses_fallback() {
        let client = ScriptedClient::new(vec![Err(ResumeScannerError::EmptyCompletion)]);
        let analyzer = LlmAnalyzer::new(Config::default().analysis);

        let parsed = analyzer.analyze(&client, &params("python")).await.unwrap();
        assert_eq!(parsed.path, ParsePath::Fallback);
        assert_eq!(parsed.reply.score, 50.0);
    }

    #[tokio::test]
    async fn test_generate_keywords_requires_json() {
        let client = ScriptedClient::replying(&["Skills: Rust, Go", "{\"Skills\": [\"Rust\"]}"]);
        let analyzer = LlmAnalyzer::new(Config::default().analysis);

        assert!(analyzer.generate_keywords(&client, &params("x")).await.is_err());
        let value = analyzer.generate_keywords(&client, &params("x")).await.unwrap();
        assert_eq!(value["Skills"][0], "Rust");
    }
}
