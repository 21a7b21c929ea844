//! The LLM operations facade.
//!
//! Everything a running process needs from a model goes through
//! [`LlmOperations`]: tool resolution and decoration, request/response
//! events, timing, per-call timeout, invocation recording, and typed object
//! extraction. In stub mode (`ProcessOptions.test`) no provider is touched;
//! the lorem path emits the same events and returns schema-valid defaults.

use crate::client::{Completion, LlmClient, LoremLlm, TokenUsage, LOREM_TEXT};
use crate::invocation::{InvocationRecorder, LlmInvocation, PricingModel};
use crate::tools::{
    decorate, resolve_tool_callbacks, OutputTransformer, ToolCallback, ToolDecoration, ToolGroup,
    ToolInvocationStats,
};
use chrono::Utc;
use praxis_core::{AgentEvent, EventBus, LlmError};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct LlmOptions {
    /// Per-call timeout.
    pub timeout: Duration,
    pub show_prompts: bool,
    pub show_responses: bool,
}

impl Default for LlmOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            show_prompts: false,
            show_responses: false,
        }
    }
}

/// One conversational exchange: an id for correlating events plus any
/// interaction-scoped tools.
#[derive(Debug, Clone, Default)]
pub struct Interaction {
    pub id: String,
    pub tools: Vec<ToolCallback>,
}

impl Interaction {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tools: Vec::new(),
        }
    }

    pub fn with_tool(mut self, tool: ToolCallback) -> Self {
        self.tools.push(tool);
        self
    }
}

/// Caller identity and scope for one facade call.
#[derive(Clone, Default)]
pub struct LlmCallContext {
    pub process_id: String,
    pub agent_name: Option<String>,
    pub action: Option<String>,
    /// Agent-level and action-level tool groups, in precedence order.
    pub tool_groups: Vec<ToolGroup>,
    pub output_transformer: Option<Arc<OutputTransformer>>,
}

impl LlmCallContext {
    pub fn new(process_id: impl Into<String>) -> Self {
        Self {
            process_id: process_id.into(),
            ..Self::default()
        }
    }

    pub fn with_agent(mut self, name: impl Into<String>) -> Self {
        self.agent_name = Some(name.into());
        self
    }

    pub fn with_action(mut self, name: impl Into<String>) -> Self {
        self.action = Some(name.into());
        self
    }

    pub fn with_tool_group(mut self, group: ToolGroup) -> Self {
        self.tool_groups.push(group);
        self
    }

    pub fn with_output_transformer(mut self, transformer: Arc<OutputTransformer>) -> Self {
        self.output_transformer = Some(transformer);
        self
    }
}

/// Typed-extraction outcome where failure is a value, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectCreation<T> {
    Created(T),
    Failed { reason: String },
}

impl<T> ObjectCreation<T> {
    pub fn is_created(&self) -> bool {
        matches!(self, ObjectCreation::Created(_))
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            ObjectCreation::Created(value) => Some(value),
            ObjectCreation::Failed { .. } => None,
        }
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            ObjectCreation::Created(_) => None,
            ObjectCreation::Failed { reason } => Some(reason),
        }
    }
}

pub struct LlmOperations {
    client: Arc<dyn LlmClient>,
    events: Arc<EventBus>,
    pricing: Option<PricingModel>,
    options: LlmOptions,
    stats: Arc<ToolInvocationStats>,
    stub: bool,
}

impl LlmOperations {
    pub fn new(client: Arc<dyn LlmClient>, events: Arc<EventBus>) -> Self {
        Self {
            client,
            events,
            pricing: None,
            options: LlmOptions::default(),
            stats: Arc::new(ToolInvocationStats::new()),
            stub: false,
        }
    }

    /// Deterministic facade for `test`-mode processes: lorem text out,
    /// default objects from typed extraction, no provider involved.
    pub fn stub(events: Arc<EventBus>) -> Self {
        Self {
            stub: true,
            ..Self::new(Arc::new(LoremLlm), events)
        }
    }

    pub fn with_pricing(mut self, pricing: PricingModel) -> Self {
        self.pricing = Some(pricing);
        self
    }

    pub fn with_options(mut self, options: LlmOptions) -> Self {
        self.options = options;
        self
    }

    pub fn is_stub(&self) -> bool {
        self.stub
    }

    pub fn pricing(&self) -> Option<&PricingModel> {
        self.pricing.as_ref()
    }

    pub fn tool_stats(&self) -> Arc<ToolInvocationStats> {
        self.stats.clone()
    }

    /// The full tool set for a call: interaction tools first, then the
    /// context's groups, deduplicated by name and decorated for statistics,
    /// attribution, events and output transformation.
    pub fn resolve_decorated_tools(
        &self,
        interaction: &Interaction,
        ctx: &LlmCallContext,
    ) -> Vec<ToolCallback> {
        let mut sets: Vec<&[ToolCallback]> = vec![interaction.tools.as_slice()];
        sets.extend(ctx.tool_groups.iter().map(|g| g.tools.as_slice()));
        let resolved = resolve_tool_callbacks(sets);

        let decoration = ToolDecoration {
            process_id: ctx.process_id.clone(),
            events: self.events.clone(),
            stats: self.stats.clone(),
            output_transformer: ctx.output_transformer.clone(),
        };
        resolved
            .iter()
            .map(|tool| decorate(tool, &decoration))
            .collect()
    }

    /// Plain text generation.
    pub async fn generate(
        &self,
        prompt: &str,
        interaction: &Interaction,
        ctx: &LlmCallContext,
        recorder: Option<&dyn InvocationRecorder>,
    ) -> Result<String, LlmError> {
        let tools = self.resolve_decorated_tools(interaction, ctx);
        let provider = self.client.provider().to_string();

        self.events.emit(
            Some(&ctx.process_id),
            AgentEvent::LlmRequest {
                provider: provider.clone(),
                interaction: interaction.id.clone(),
                prompt: prompt.to_string(),
            },
        );
        if self.options.show_prompts {
            tracing::info!(provider = %provider, interaction = %interaction.id, prompt, "llm prompt");
        }

        let started = Instant::now();
        let completion = if self.stub {
            Completion::new(LOREM_TEXT, TokenUsage::estimate(prompt, LOREM_TEXT))
        } else {
            self.call_client(prompt, &tools, &provider).await?
        };
        let duration = started.elapsed();

        self.events.emit(
            Some(&ctx.process_id),
            AgentEvent::LlmResponse {
                provider: provider.clone(),
                interaction: interaction.id.clone(),
                response: completion.text.clone(),
                duration_ms: duration.as_millis() as u64,
            },
        );
        tracing::debug!(
            provider = %provider,
            interaction = %interaction.id,
            duration_ms = duration.as_millis() as u64,
            tokens = completion.usage.total_tokens(),
            "llm response"
        );
        if self.options.show_responses {
            tracing::info!(response = %completion.text, "llm response body");
        }

        if let Some(recorder) = recorder {
            recorder.record(LlmInvocation {
                llm_id: provider,
                usage: completion.usage,
                agent_name: ctx.agent_name.clone(),
                timestamp: Utc::now(),
                running_time: duration,
            });
        }

        Ok(completion.text)
    }

    async fn call_client(
        &self,
        prompt: &str,
        tools: &[ToolCallback],
        provider: &str,
    ) -> Result<Completion, LlmError> {
        let timeout_millis = self.options.timeout.as_millis() as u64;
        match tokio::time::timeout(
            self.options.timeout,
            self.client.complete_with_tools(prompt, tools),
        )
        .await
        {
            Err(_) => Err(LlmError::Timeout {
                millis: timeout_millis,
            }),
            Ok(Err(error)) => Err(match error.downcast::<LlmError>() {
                Ok(llm_error) => llm_error,
                Err(other) => LlmError::ProviderUnavailable {
                    provider: provider.to_string(),
                    attempts: 1,
                    reason: other.to_string(),
                },
            }),
            Ok(Ok(completion)) => Ok(completion),
        }
    }

    /// Extract a typed object from model output. Parse problems surface as
    /// [`LlmError::ParseFailure`].
    pub async fn create_object<T>(
        &self,
        prompt: &str,
        interaction: &Interaction,
        ctx: &LlmCallContext,
        recorder: Option<&dyn InvocationRecorder>,
    ) -> Result<T, LlmError>
    where
        T: DeserializeOwned + Default,
    {
        if self.stub {
            let _ = self.generate(prompt, interaction, ctx, recorder).await?;
            return Ok(T::default());
        }

        let full_prompt =
            format!("{prompt}\n\nRespond with a single JSON document and nothing else.");
        let text = self
            .generate(&full_prompt, interaction, ctx, recorder)
            .await?;
        let json = extract_json(&text);
        serde_json::from_str(json).map_err(|error| LlmError::ParseFailure {
            target: std::any::type_name::<T>().to_string(),
            reason: error.to_string(),
        })
    }

    /// Like [`create_object`](Self::create_object) but failure comes back as
    /// a value.
    pub async fn create_object_if_possible<T>(
        &self,
        prompt: &str,
        interaction: &Interaction,
        ctx: &LlmCallContext,
        recorder: Option<&dyn InvocationRecorder>,
    ) -> ObjectCreation<T>
    where
        T: DeserializeOwned + Default,
    {
        match self.create_object(prompt, interaction, ctx, recorder).await {
            Ok(value) => ObjectCreation::Created(value),
            Err(error) => ObjectCreation::Failed {
                reason: error.to_string(),
            },
        }
    }
}

/// Slice model output down to its JSON document: strips fences and any
/// surrounding prose by locating the outermost bracket pair.
fn extract_json(text: &str) -> &str {
    let start = text.find(|c| c == '{' || c == '[');
    let end = text.rfind(|c| c == '}' || c == ']');
    match (start, end) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text.trim(),
    }
}
