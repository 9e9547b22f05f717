//! Hosted LLM integration
//!
//! Chat-completion providers are tried in order through a [`FallbackChain`];
//! free-text answers are parsed into structured data and every operation
//! degrades to deterministic templates when no provider answers usefully.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub mod chain;
pub mod client;
pub mod parser;
pub mod prompts;
pub mod service;
pub mod templates;

pub use chain::FallbackChain;
pub use client::OpenAiCompatibleClient;
pub use parser::{BloomQuestion, GeneratedQuestion, PerformanceAnalysis};
pub use service::{LlmService, MistakeRecord, WrongAnswer};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM request failed: {0}")]
    RequestFailed(String),

    #[error("LLM returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("No LLM providers configured")]
    NoProviders,
}

/// One system + user prompt exchange
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Overrides the client's default timeout
    pub timeout: Option<Duration>,
}

impl ChatRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            max_tokens: 1000,
            temperature: 0.7,
            timeout: None,
        }
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Some(Duration::from_secs(secs));
        self
    }
}

/// A chat-completion backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Label used in logs
    fn name(&self) -> String;

    /// Assistant message content for the request
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError>;
}

/// First `max` characters of `text` (char-boundary safe)
pub(crate) fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_chat_request_builder() {
        let req = ChatRequest::new("sys", "user")
            .max_tokens(500)
            .temperature(0.3)
            .timeout_secs(15);
        assert_eq!(req.max_tokens, 500);
        assert_eq!(req.timeout, Some(Duration::from_secs(15)));
    }
}
