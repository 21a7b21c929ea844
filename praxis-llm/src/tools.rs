//! Tool callbacks: named functions the model may invoke during generation.
//!
//! Tools are gathered from three scopes (interaction, agent, action),
//! deduplicated by name, and decorated before every model call so that
//! invocations are counted, attributed to the requesting process, surfaced
//! as events, and optionally transformed.

use anyhow::Result;
use dashmap::DashMap;
use praxis_core::{AgentEvent, EventBus};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

type ToolHandler = dyn Fn(Value) -> Result<Value> + Send + Sync;

/// Hook applied to successful tool output before it reaches the model.
pub type OutputTransformer = dyn Fn(Value) -> Value + Send + Sync;

#[derive(Clone)]
pub struct ToolCallback {
    pub name: String,
    pub description: String,
    handler: Arc<ToolHandler>,
}

impl ToolCallback {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        handler: impl Fn(Value) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            handler: Arc::new(handler),
        }
    }

    pub fn invoke(&self, args: Value) -> Result<Value> {
        (self.handler)(args)
    }
}

impl fmt::Debug for ToolCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolCallback")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Named bundle of tools an agent or action can grant to model calls.
#[derive(Debug, Clone, Default)]
pub struct ToolGroup {
    pub name: String,
    pub tools: Vec<ToolCallback>,
}

impl ToolGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tools: Vec::new(),
        }
    }

    pub fn with_tool(mut self, tool: ToolCallback) -> Self {
        self.tools.push(tool);
        self
    }
}

/// Union of tool sets in precedence order, deduplicated by tool name; the
/// first occurrence wins.
pub fn resolve_tool_callbacks<'a>(
    sets: impl IntoIterator<Item = &'a [ToolCallback]>,
) -> Vec<ToolCallback> {
    let mut seen = std::collections::HashSet::new();
    let mut resolved = Vec::new();
    for set in sets {
        for tool in set {
            if seen.insert(tool.name.clone()) {
                resolved.push(tool.clone());
            }
        }
    }
    resolved
}

/// Concurrent per-tool invocation counters.
#[derive(Debug, Default)]
pub struct ToolInvocationStats {
    counts: DashMap<String, u64>,
}

impl ToolInvocationStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, tool: &str) {
        *self.counts.entry(tool.to_string()).or_insert(0) += 1;
    }

    pub fn count(&self, tool: &str) -> u64 {
        self.counts.get(tool).map(|c| *c).unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|entry| *entry.value()).sum()
    }
}

/// Context applied to every tool before it reaches the model.
#[derive(Clone)]
pub struct ToolDecoration {
    pub process_id: String,
    pub events: Arc<EventBus>,
    pub stats: Arc<ToolInvocationStats>,
    pub output_transformer: Option<Arc<OutputTransformer>>,
}

/// Wrap a tool so each invocation is counted, attributed, emitted as a
/// [`AgentEvent::ToolInvocation`], and its output passed through the
/// transformer hook.
pub fn decorate(tool: &ToolCallback, decoration: &ToolDecoration) -> ToolCallback {
    let inner = tool.clone();
    let decoration = decoration.clone();
    let name = tool.name.clone();
    ToolCallback::new(
        tool.name.clone(),
        tool.description.clone(),
        move |args| {
            let result = inner.invoke(args);
            decoration.stats.record(&name);
            decoration.events.emit(
                Some(&decoration.process_id),
                AgentEvent::ToolInvocation {
                    tool: name.clone(),
                    succeeded: result.is_ok(),
                },
            );
            match (&decoration.output_transformer, result) {
                (Some(transformer), Ok(value)) => Ok(transformer(value)),
                (_, result) => result,
            }
        },
    )
}
