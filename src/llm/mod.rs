//! LLM integration module

pub mod analyzer;
pub mod chat;
pub mod client;
pub mod prompts;
pub mod response_parser;
pub mod rewrite;

pub use analyzer::LlmAnalyzer;
pub use client::{ChatClient, ChatMessage, ChatRequest, HttpChatClient, Role};
pub use response_parser::{AnalysisReply, ParsePath, ResponseParser};
