//! Platform events.
//!
//! Every state transition of interest is emitted through an [`EventBus`]
//! carrying a monotonic sequence number, a UTC timestamp and the owning
//! process id. The bus is constructed at platform init and injected
//! explicitly; there is no ambient global.

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AgentEvent {
    AgentDeployed {
        agent: String,
    },
    ProcessCreated {
        agent: String,
    },
    PlanFormulated {
        goal: String,
        actions: Vec<String>,
        net_value: f64,
    },
    GoalAchieved {
        goal: String,
    },
    LlmRequest {
        provider: String,
        interaction: String,
        prompt: String,
    },
    LlmResponse {
        provider: String,
        interaction: String,
        response: String,
        duration_ms: u64,
    },
    ToolInvocation {
        tool: String,
        succeeded: bool,
    },
    ProcessKilled,
    RagRequestReceived {
        query: String,
        top_k: usize,
    },
    RagResponseReturned {
        service: String,
        result_count: usize,
    },
    EnhancementStarting {
        enhancer: String,
    },
    EnhancementCompleted {
        enhancer: String,
        duration_ms: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventEnvelope {
    pub seq: u64,
    pub timestamp: DateTime<Utc>,
    pub process_id: Option<String>,
    pub event: AgentEvent,
}

pub trait EventListener: Send + Sync {
    fn on_event(&self, event: &EventEnvelope);
}

/// Composite listener registry, safe under concurrent `emit`.
#[derive(Default)]
pub struct EventBus {
    seq: AtomicU64,
    listeners: RwLock<Vec<Arc<dyn EventListener>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: Arc<dyn EventListener>) {
        self.listeners.write().push(listener);
    }

    /// Emit to every listener. Returns the delivered envelope.
    pub fn emit(&self, process_id: Option<&str>, event: AgentEvent) -> EventEnvelope {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        let envelope = EventEnvelope {
            seq,
            timestamp: Utc::now(),
            process_id: process_id.map(str::to_string),
            event,
        };
        let listeners: Vec<_> = self.listeners.read().iter().cloned().collect();
        for listener in listeners {
            listener.on_event(&envelope);
        }
        envelope
    }
}

/// Buffers every envelope; the workhorse of the test suites.
#[derive(Default)]
pub struct CollectingListener {
    events: Mutex<Vec<EventEnvelope>>,
}

impl CollectingListener {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<EventEnvelope> {
        self.events.lock().clone()
    }

    pub fn count_matching(&self, predicate: impl Fn(&AgentEvent) -> bool) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| predicate(&e.event))
            .count()
    }
}

impl EventListener for CollectingListener {
    fn on_event(&self, event: &EventEnvelope) {
        self.events.lock().push(event.clone());
    }
}

/// Routes envelopes to the `tracing` subscriber at debug level.
#[derive(Default)]
pub struct TracingListener;

impl EventListener for TracingListener {
    fn on_event(&self, event: &EventEnvelope) {
        tracing::debug!(
            seq = event.seq,
            process_id = event.process_id.as_deref().unwrap_or("-"),
            event = ?event.event,
            "agent event"
        );
    }
}
