//! Execution context handed to action handlers.
//!
//! Handlers never see the process struct; they get a [`ProcessContext`]
//! with serialized blackboard access, the LLM facade scoped to their
//! action's tool grants, and the cancellation flag `kill()` flips.

use crate::history::ActionExecution;
use anyhow::Result;
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use praxis_core::{Blackboard, DomainObject, DomainTypes, EventBus, LlmError};
use praxis_llm::{
    Interaction, InvocationRecorder, LlmCallContext, LlmInvocation, LlmOperations, ObjectCreation,
    ToolGroup,
};
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// What an action reports back to the process loop. Failures are `Err`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Succeeded,
    /// Suspend until external input arrives via `on_user_response`.
    Waiting,
    /// Suspend until the scheduler allows progress again.
    Paused,
}

#[async_trait]
pub trait ActionHandler: Send + Sync {
    async fn execute(&self, ctx: &ProcessContext) -> Result<ActionOutcome>;
}

/// Adapter for synchronous closures, which most deterministic actions are.
pub struct FnHandler<F> {
    f: F,
}

impl<F> FnHandler<F>
where
    F: Fn(&ProcessContext) -> Result<ActionOutcome> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }

    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F> ActionHandler for FnHandler<F>
where
    F: Fn(&ProcessContext) -> Result<ActionOutcome> + Send + Sync,
{
    async fn execute(&self, ctx: &ProcessContext) -> Result<ActionOutcome> {
        (self.f)(ctx)
    }
}

pub(crate) struct SharedRecorder(pub Arc<Mutex<Vec<LlmInvocation>>>);

impl InvocationRecorder for SharedRecorder {
    fn record(&self, invocation: LlmInvocation) {
        self.0.lock().push(invocation);
    }
}

pub struct ProcessContext {
    pub(crate) process_id: String,
    pub(crate) agent_name: String,
    pub(crate) action_name: Option<String>,
    pub(crate) blackboard: Arc<RwLock<Blackboard>>,
    pub(crate) domain_types: DomainTypes,
    pub(crate) llm: Arc<LlmOperations>,
    pub(crate) events: Arc<EventBus>,
    pub(crate) cancelled: Arc<AtomicBool>,
    pub(crate) tool_groups: Vec<ToolGroup>,
    pub(crate) recorder: Arc<SharedRecorder>,
}

impl ProcessContext {
    pub fn process_id(&self) -> &str {
        &self.process_id
    }

    pub fn agent_name(&self) -> &str {
        &self.agent_name
    }

    pub fn action_name(&self) -> Option<&str> {
        self.action_name.as_deref()
    }

    /// True once `kill()` has been called; long-running handlers should
    /// check this at their I/O boundaries.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn bind(&self, key: impl Into<String>, object: DomainObject) {
        self.blackboard.write().bind(key, object);
    }

    pub fn add_object(&self, object: DomainObject) {
        self.blackboard.write().add_object(object);
    }

    pub fn get(&self, key: &str) -> Option<Arc<DomainObject>> {
        self.blackboard.read().get(key)
    }

    pub fn get_value(&self, variable: &str, type_name: &str) -> Option<Arc<DomainObject>> {
        self.blackboard
            .read()
            .get_value(variable, type_name, &self.domain_types)
    }

    pub fn last_of_type(&self, type_name: &str) -> Option<Arc<DomainObject>> {
        self.blackboard.read().last_of_type(type_name, &self.domain_types)
    }

    pub fn set_condition(&self, key: impl Into<String>, value: bool) {
        self.blackboard.write().set_condition(key, value);
    }

    pub fn blackboard_snapshot(&self) -> Blackboard {
        self.blackboard.read().clone()
    }

    fn llm_call_context(&self) -> LlmCallContext {
        let mut ctx = LlmCallContext::new(self.process_id.clone()).with_agent(&self.agent_name);
        if let Some(action) = &self.action_name {
            ctx = ctx.with_action(action.clone());
        }
        ctx.tool_groups = self.tool_groups.clone();
        ctx
    }

    /// Text generation through the process's LLM facade, attributed to this
    /// process and recorded on it.
    pub async fn generate(
        &self,
        prompt: &str,
        interaction: &Interaction,
    ) -> Result<String, LlmError> {
        self.llm
            .generate(
                prompt,
                interaction,
                &self.llm_call_context(),
                Some(self.recorder.as_ref() as &dyn InvocationRecorder),
            )
            .await
    }

    /// Text generation under a fresh interaction id.
    pub async fn generate_text(&self, prompt: &str) -> Result<String, LlmError> {
        self.generate(prompt, &Interaction::new(uuid::Uuid::new_v4().to_string()))
            .await
    }

    pub async fn create_object<T>(
        &self,
        prompt: &str,
        interaction: &Interaction,
    ) -> Result<T, LlmError>
    where
        T: DeserializeOwned + Default,
    {
        self.llm
            .create_object(
                prompt,
                interaction,
                &self.llm_call_context(),
                Some(self.recorder.as_ref() as &dyn InvocationRecorder),
            )
            .await
    }

    pub async fn create_object_if_possible<T>(
        &self,
        prompt: &str,
        interaction: &Interaction,
    ) -> ObjectCreation<T>
    where
        T: DeserializeOwned + Default,
    {
        self.llm
            .create_object_if_possible(
                prompt,
                interaction,
                &self.llm_call_context(),
                Some(self.recorder.as_ref() as &dyn InvocationRecorder),
            )
            .await
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }
}

/// Read-only view handed to named condition evaluators.
pub struct ConditionContext<'a> {
    pub blackboard: &'a Blackboard,
    pub history: &'a [ActionExecution],
    pub domain_types: &'a DomainTypes,
}

pub trait ConditionEvaluator: Send + Sync {
    fn evaluate(&self, ctx: &ConditionContext<'_>) -> praxis_core::ConditionDetermination;
}

impl<F> ConditionEvaluator for F
where
    F: Fn(&ConditionContext<'_>) -> praxis_core::ConditionDetermination + Send + Sync,
{
    fn evaluate(&self, ctx: &ConditionContext<'_>) -> praxis_core::ConditionDetermination {
        self(ctx)
    }
}
