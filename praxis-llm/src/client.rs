//! LLM client abstraction and test doubles.
//!
//! Concrete provider drivers live outside the core; everything here speaks
//! [`LlmClient`]. The mock clients are first-class citizens: `test`-mode
//! processes and the test suites run entirely against them.

use crate::tools::ToolCallback;
use anyhow::{bail, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Token accounting for a single completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
        }
    }

    pub fn total_tokens(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }

    /// Rough whitespace-token estimate, good enough for mocks and tests.
    pub fn estimate(prompt: &str, completion: &str) -> Self {
        Self {
            prompt_tokens: prompt.split_whitespace().count() as u64,
            completion_tokens: completion.split_whitespace().count() as u64,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub usage: TokenUsage,
}

impl Completion {
    pub fn new(text: impl Into<String>, usage: TokenUsage) -> Self {
        Self {
            text: text.into(),
            usage,
        }
    }
}

/// Trait for LLM clients (mocks, provider drivers, resilience wrappers).
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<Completion>;

    /// Completion with tool callbacks available to the model. Clients that
    /// cannot call tools ignore them.
    async fn complete_with_tools(
        &self,
        prompt: &str,
        _tools: &[ToolCallback],
    ) -> Result<Completion> {
        self.complete(prompt).await
    }

    fn provider(&self) -> &str {
        "unknown"
    }
}

pub(crate) const LOREM_TEXT: &str =
    "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod \
     tempor incididunt ut labore et dolore magna aliqua.";

/// Deterministic dummy client. Backs `test`-mode processes.
pub struct LoremLlm;

#[async_trait]
impl LlmClient for LoremLlm {
    async fn complete(&self, prompt: &str) -> Result<Completion> {
        Ok(Completion::new(
            LOREM_TEXT,
            TokenUsage::estimate(prompt, LOREM_TEXT),
        ))
    }

    fn provider(&self) -> &str {
        "lorem"
    }
}

/// Client replaying a queue of canned outcomes, in order.
#[derive(Default)]
pub struct ScriptedLlm {
    script: Mutex<VecDeque<Result<String, String>>>,
}

impl ScriptedLlm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_text(&self, text: impl Into<String>) {
        self.script.lock().push_back(Ok(text.into()));
    }

    pub fn push_error(&self, reason: impl Into<String>) {
        self.script.lock().push_back(Err(reason.into()));
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().len()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, prompt: &str) -> Result<Completion> {
        let next = self.script.lock().pop_front();
        match next {
            Some(Ok(text)) => {
                let usage = TokenUsage::estimate(prompt, &text);
                Ok(Completion::new(text, usage))
            }
            Some(Err(reason)) => bail!("scripted failure: {reason}"),
            None => bail!("scripted client exhausted"),
        }
    }

    fn provider(&self) -> &str {
        "scripted"
    }
}

/// Client that always fails; exercises fallback and retry paths.
pub struct AlwaysErrLlm;

#[async_trait]
impl LlmClient for AlwaysErrLlm {
    async fn complete(&self, _prompt: &str) -> Result<Completion> {
        bail!("simulated provider failure")
    }

    fn provider(&self) -> &str {
        "always-err"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lorem_is_deterministic() {
        let client = LoremLlm;
        let first = client.complete("hi").await.unwrap();
        let second = client.complete("hi").await.unwrap();
        assert_eq!(first.text, second.text);
        assert!(first.usage.completion_tokens > 0);
    }

    #[tokio::test]
    async fn scripted_replays_in_order_then_exhausts() {
        let client = ScriptedLlm::new();
        client.push_text("one");
        client.push_error("boom");
        client.push_text("two");

        assert_eq!(client.complete("p").await.unwrap().text, "one");
        assert!(client.complete("p").await.is_err());
        assert_eq!(client.complete("p").await.unwrap().text, "two");
        assert!(client.complete("p").await.is_err());
        assert_eq!(client.remaining(), 0);
    }

    #[test]
    fn usage_estimate_counts_whitespace_tokens() {
        let usage = TokenUsage::estimate("two words", "three more words");
        assert_eq!(usage.prompt_tokens, 2);
        assert_eq!(usage.completion_tokens, 3);
        assert_eq!(usage.total_tokens(), 5);
    }
}
