//! Bullet forging and tone-controlled humanizing

use crate::error::{Result, ResumeScannerError};
use crate::llm::client::{ChatClient, ChatMessage, ChatRequest};
use crate::llm::prompts::{self, FORGE_MAX_TOKENS, FORGE_TEMPERATURE, HUMANIZE_MAX_TOKENS, HUMANIZE_TEMPERATURE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    Formal,
    Informal,
    Interview,
    Explanatory,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Formal => "formal",
            Tone::Informal => "informal",
            Tone::Interview => "interview",
            Tone::Explanatory => "explanatory",
        }
    }

    fn guide(&self) -> &'static str {
        match self {
            Tone::Formal => "Professional and precise, but not robotic. Plain words, no jargon for its own sake.",
            Tone::Informal => "Relaxed and conversational, like talking to a colleague. Contractions are fine.",
            Tone::Interview => "Spoken answer to an interviewer: first person, confident, concrete examples.",
            Tone::Explanatory => "Patient and clear, as if walking a newcomer through it step by step.",
        }
    }
}

impl std::str::FromStr for Tone {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "formal" => Ok(Tone::Formal),
            "informal" => Ok(Tone::Informal),
            "interview" => Ok(Tone::Interview),
            "explanatory" => Ok(Tone::Explanatory),
            _ => Err(format!(
                "Invalid tone: {}. Valid options: formal, informal, interview, explanatory",
                s
            )),
        }
    }
}

/// Allowed output length for an input of `words` words: floor(0.85n)..=ceil(1.05n)
pub fn word_budget(words: usize) -> (usize, usize) {
    (words * 85 / 100, (words * 105).div_ceil(100))
}

pub fn forge_request(job_role: &str, bullet: &str) -> ChatRequest {
    ChatRequest::new(
        vec![
            ChatMessage::system(prompts::FORGE_SYSTEM_PROMPT),
            ChatMessage::user(prompts::render_forge(job_role, bullet.trim())),
        ],
        FORGE_TEMPERATURE,
    )
    .with_max_tokens(FORGE_MAX_TOKENS)
}

pub fn humanize_request(text: &str, tone: Tone) -> ChatRequest {
    let words = text.split_whitespace().count();
    let (min, max) = word_budget(words);
    ChatRequest::new(
        vec![
            ChatMessage::system(prompts::render_humanize_system(words, min, max, tone.as_str(), tone.guide())),
            ChatMessage::user(text.trim()),
        ],
        HUMANIZE_TEMPERATURE,
    )
    .with_max_tokens(HUMANIZE_MAX_TOKENS)
}

/// Rewrite a weak bullet point into an impact statement
pub async fn forge_bullet<C: ChatClient>(client: &C, job_role: &str, bullet: &str) -> Result<String> {
    if bullet.trim().is_empty() {
        return Err(ResumeScannerError::InvalidInput("bullet point is empty".to_string()));
    }
    let reply = client.complete(&forge_request(job_role, bullet)).await?;
    Ok(reply.trim().trim_matches('"').trim().to_string())
}

pub async fn humanize<C: ChatClient>(client: &C, text: &str, tone: Tone) -> Result<String> {
    if text.trim().is_empty() {
        return Err(ResumeScannerError::InvalidInput("text to humanize is empty".to_string()));
    }
    let reply = client.complete(&humanize_request(text, tone)).await?;
    Ok(reply.trim().to_string())
}
