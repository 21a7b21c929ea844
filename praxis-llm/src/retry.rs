//! Retry with exponential backoff for transient provider failures.

use crate::client::{Completion, LlmClient};
use crate::tools::ToolCallback;
use anyhow::{Context, Result};
use async_trait::async_trait;
use praxis_core::LlmError;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub backoff_multiplier: f64,
    pub max_backoff_ms: u64,
    /// Random ±25% on each backoff to spread thundering herds.
    pub jitter: bool,
}

impl RetryConfig {
    pub fn production() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 50,
            backoff_multiplier: 2.0,
            max_backoff_ms: 500,
            jitter: true,
        }
    }

    pub fn aggressive() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff_ms: 25,
            backoff_multiplier: 1.5,
            max_backoff_ms: 300,
            jitter: true,
        }
    }

    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff_ms: 0,
            backoff_multiplier: 1.0,
            max_backoff_ms: 0,
            jitter: false,
        }
    }

    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let base = self.initial_backoff_ms as f64 * self.backoff_multiplier.powi(attempt as i32);
        let capped = base.min(self.max_backoff_ms as f64) as u64;
        let with_jitter = if self.jitter && capped > 0 {
            let range = (capped / 4).max(1);
            capped - range + rand::random::<u64>() % (range * 2)
        } else {
            capped
        };
        Duration::from_millis(with_jitter)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::production()
    }
}

/// Client wrapper retrying transient failures up to `max_attempts`.
pub struct RetryingLlm<C> {
    inner: C,
    config: RetryConfig,
}

impl<C> RetryingLlm<C> {
    pub fn new(inner: C, config: RetryConfig) -> Self {
        Self { inner, config }
    }
}

#[async_trait]
impl<C: LlmClient> LlmClient for RetryingLlm<C> {
    async fn complete(&self, prompt: &str) -> Result<Completion> {
        self.complete_with_tools(prompt, &[]).await
    }

    async fn complete_with_tools(
        &self,
        prompt: &str,
        tools: &[ToolCallback],
    ) -> Result<Completion> {
        let attempts = self.config.max_attempts.max(1);
        let mut last_error = None;
        for attempt in 0..attempts {
            match self.inner.complete_with_tools(prompt, tools).await {
                Ok(completion) => return Ok(completion),
                Err(error) => {
                    tracing::warn!(
                        provider = self.inner.provider(),
                        attempt = attempt + 1,
                        %error,
                        "model call failed"
                    );
                    last_error = Some(error);
                    if attempt + 1 < attempts {
                        tokio::time::sleep(self.config.backoff_for_attempt(attempt)).await;
                    }
                }
            }
        }
        // max_attempts >= 1 guarantees last_error is set here.
        Err(last_error
            .unwrap_or_else(|| anyhow::anyhow!("no attempts made"))
            .context(LlmError::RetryBudgetExhausted { attempts }))
    }

    fn provider(&self) -> &str {
        self.inner.provider()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{AlwaysErrLlm, ScriptedLlm};

    #[test]
    fn backoff_grows_and_caps() {
        let config = RetryConfig {
            jitter: false,
            ..RetryConfig::production()
        };
        assert_eq!(config.backoff_for_attempt(0), Duration::from_millis(50));
        assert_eq!(config.backoff_for_attempt(1), Duration::from_millis(100));
        assert_eq!(config.backoff_for_attempt(2), Duration::from_millis(200));
        // Capped at max_backoff_ms.
        assert_eq!(config.backoff_for_attempt(10), Duration::from_millis(500));
    }

    #[tokio::test]
    async fn recovers_from_transient_failures() {
        let inner = ScriptedLlm::new();
        inner.push_error("blip");
        inner.push_text("recovered");

        let client = RetryingLlm::new(
            inner,
            RetryConfig {
                max_attempts: 3,
                initial_backoff_ms: 1,
                backoff_multiplier: 1.0,
                max_backoff_ms: 1,
                jitter: false,
            },
        );
        let completion = client.complete("p").await.unwrap();
        assert_eq!(completion.text, "recovered");
    }

    #[tokio::test]
    async fn exhausted_budget_carries_a_typed_error() {
        let client = RetryingLlm::new(
            AlwaysErrLlm,
            RetryConfig {
                max_attempts: 2,
                initial_backoff_ms: 1,
                backoff_multiplier: 1.0,
                max_backoff_ms: 1,
                jitter: false,
            },
        );
        let error = client.complete("p").await.unwrap_err();
        let chain: Vec<String> = error.chain().map(|e| e.to_string()).collect();
        assert!(chain
            .iter()
            .any(|msg| msg.contains("retry budget exhausted after 2 attempt(s)")));
        assert!(chain.iter().any(|msg| msg.contains("simulated provider failure")));
    }
}
