//! Follow-up coaching conversation about one scanned resume

use crate::error::{Result, ResumeScannerError};
use crate::llm::client::{ChatClient, ChatMessage, ChatRequest, Role};
use crate::llm::prompts::{self, CHAT_RESUME_CONTEXT_CHARS, CHAT_TEMPERATURE};
use crate::processing::text_processor::truncate_chars;
use log::debug;

pub const EMPTY_REPLY: &str = "I couldn't generate a response.";

/// Transcript of user and assistant turns; the system prompt is rebuilt
/// from the scan for every request and never stored in the transcript.
#[derive(Debug, Clone)]
pub struct ChatThread {
    system_prompt: String,
    messages: Vec<ChatMessage>,
}

impl ChatThread {
    pub fn for_resume(job_role: &str, resume_text: &str) -> Self {
        let excerpt = truncate_chars(resume_text, CHAT_RESUME_CONTEXT_CHARS);
        Self {
            system_prompt: prompts::render_chat_system(job_role, excerpt),
            messages: Vec::new(),
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn request_for(&self, user_message: &str) -> ChatRequest {
        let mut messages = Vec::with_capacity(self.messages.len() + 2);
        messages.push(ChatMessage::system(self.system_prompt.clone()));
        messages.extend(self.messages.iter().cloned());
        messages.push(ChatMessage::user(user_message));
        ChatRequest::new(messages, CHAT_TEMPERATURE)
    }

    /// Send one user turn. The transcript only grows when the call succeeds.
    pub async fn send<C: ChatClient>(&mut self, client: &C, user_message: &str) -> Result<String> {
        let request = self.request_for(user_message);
        debug!("Sending chat turn with {} prior messages", self.messages.len());

        let reply = match client.complete(&request).await {
            Ok(reply) if !reply.trim().is_empty() => reply.trim().to_string(),
            Ok(_) | Err(ResumeScannerError::EmptyCompletion) => EMPTY_REPLY.to_string(),
            Err(e) => return Err(e),
        };

        self.messages.push(ChatMessage::user(user_message));
        self.messages.push(ChatMessage::assistant(reply.clone()));
        Ok(reply)
    }

    pub fn turns(&self) -> usize {
        self.messages.iter().filter(|m| m.role == Role::User).count()
    }
}
