/*!
# Praxis LLM

Model operations for the Praxis platform. The core never talks to a
provider directly: actions go through the [`LlmOperations`] facade, which
resolves and decorates tool callbacks, emits request/response events,
enforces the per-call timeout, and records invocations on the owning
process. Provider drivers implement [`LlmClient`]; the shipped
implementations are test doubles (`LoremLlm`, `ScriptedLlm`,
`AlwaysErrLlm`) plus the [`RetryingLlm`] resilience wrapper.
*/

pub mod client;
pub mod facade;
pub mod invocation;
pub mod retry;
pub mod tools;

pub use client::{AlwaysErrLlm, Completion, LlmClient, LoremLlm, ScriptedLlm, TokenUsage};
pub use facade::{Interaction, LlmCallContext, LlmOperations, LlmOptions, ObjectCreation};
pub use invocation::{CollectingRecorder, InvocationRecorder, LlmInvocation, PricingModel};
pub use retry::{RetryConfig, RetryingLlm};
pub use tools::{
    decorate, resolve_tool_callbacks, OutputTransformer, ToolCallback, ToolDecoration, ToolGroup,
    ToolInvocationStats,
};
