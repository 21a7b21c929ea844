//! Invocation records and pricing.

use crate::client::TokenUsage;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One model call, as recorded on the owning process.
#[derive(Debug, Clone, Serialize)]
pub struct LlmInvocation {
    pub llm_id: String,
    pub usage: TokenUsage,
    pub agent_name: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip)]
    pub running_time: Duration,
}

impl LlmInvocation {
    /// Dollar cost under `pricing`; zero when pricing is unknown.
    pub fn cost(&self, pricing: Option<&PricingModel>) -> f64 {
        pricing.map(|p| p.cost_of(&self.usage)).unwrap_or(0.0)
    }
}

/// Per-million-token rates for one model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingModel {
    pub usd_per_million_prompt_tokens: f64,
    pub usd_per_million_completion_tokens: f64,
}

impl PricingModel {
    pub fn new(prompt: f64, completion: f64) -> Self {
        Self {
            usd_per_million_prompt_tokens: prompt,
            usd_per_million_completion_tokens: completion,
        }
    }

    pub fn cost_of(&self, usage: &TokenUsage) -> f64 {
        usage.prompt_tokens as f64 * self.usd_per_million_prompt_tokens / 1_000_000.0
            + usage.completion_tokens as f64 * self.usd_per_million_completion_tokens / 1_000_000.0
    }
}

/// Sink the facade reports invocations to; the process runtime implements
/// this over its own invocation list.
pub trait InvocationRecorder: Send + Sync {
    fn record(&self, invocation: LlmInvocation);
}

/// Buffer recorder for tests and standalone facade use.
#[derive(Default)]
pub struct CollectingRecorder {
    invocations: Mutex<Vec<LlmInvocation>>,
}

impl CollectingRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invocations(&self) -> Vec<LlmInvocation> {
        self.invocations.lock().clone()
    }
}

impl InvocationRecorder for CollectingRecorder {
    fn record(&self, invocation: LlmInvocation) {
        self.invocations.lock().push(invocation);
    }
}
