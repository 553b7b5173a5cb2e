//! Chat-completion client for OpenAI-compatible endpoints

use crate::config::Config;
use crate::error::{Result, ResumeScannerError};
use log::{debug, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// One completion call, independent of the deployment's model and endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub json_mode: bool,
}

impl ChatRequest {
    pub fn new(messages: Vec<ChatMessage>, temperature: f32) -> Self {
        Self {
            messages,
            temperature,
            max_tokens: None,
            json_mode: false,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_json_mode(mut self, json_mode: bool) -> Self {
        self.json_mode = json_mode;
        self
    }
}

/// Anything that can turn a chat request into the assistant's reply text
pub trait ChatClient {
    fn complete(&self, request: &ChatRequest) -> impl std::future::Future<Output = Result<String>> + Send;
}

#[derive(Debug, Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct CompletionEnvelope {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// HTTP client for `{choices:[{message:{content}}]}` style chat-completion APIs.
/// No retries: a failed call is reported to the caller as-is.
#[derive(Clone)]
pub struct HttpChatClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    site_url: Option<String>,
    site_name: Option<String>,
}

impl HttpChatClient {
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut builder = Client::builder();
        if config.api.request_timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.api.request_timeout_secs));
        }
        let client = builder
            .build()
            .map_err(|e| ResumeScannerError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        let api_key = config.api_key();
        if api_key.is_none() {
            warn!(
                "{} is not set; sending requests without authorization (proxy mode)",
                config.api.api_key_env
            );
        }

        Ok(Self {
            client,
            endpoint: config.api.endpoint.clone(),
            model: config.api.model.clone(),
            api_key,
            site_url: config.api.site_url.clone(),
            site_name: config.api.site_name.clone(),
        })
    }

    fn body<'a>(&'a self, request: &'a ChatRequest) -> CompletionBody<'a> {
        CompletionBody {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: request.json_mode.then_some(ResponseFormat { kind: "json_object" }),
        }
    }
}

impl ChatClient for HttpChatClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        let mut builder = self.client.post(&self.endpoint).json(&self.body(request));
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        if let Some(site_url) = &self.site_url {
            builder = builder.header("HTTP-Referer", site_url);
        }
        if let Some(site_name) = &self.site_name {
            builder = builder.header("X-Title", site_name);
        }

        debug!("POST {} ({} messages)", self.endpoint, request.messages.len());
        let response = builder.send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ResumeScannerError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        parse_envelope(&body)
    }
}

/// Strictly typed read of the completion envelope. A well-formed choice
/// without content is `EmptyCompletion`, anything else off-shape is malformed.
pub fn parse_envelope(body: &str) -> Result<String> {
    let envelope: CompletionEnvelope = serde_json::from_str(body)
        .map_err(|e| ResumeScannerError::MalformedResponse(format!("unexpected response shape: {}", e)))?;

    let choice = envelope
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ResumeScannerError::MalformedResponse("response contained no choices".to_string()))?;

    choice
        .message
        .content
        .filter(|content| !content.trim().is_empty())
        .ok_or(ResumeScannerError::EmptyCompletion)
}
