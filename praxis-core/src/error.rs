//! Typed error taxonomy shared across the workspace.
//!
//! Planning problems surface as process status transitions, never as
//! panics; LLM and RAG failures carry enough context for postmortems.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanningError {
    #[error("no plan found to goal `{goal}`")]
    NoPlanFound { goal: String },
    #[error("duplicate action name `{name}` in planning system")]
    DuplicateActionName { name: String },
    #[error("goal change from `{from}` to `{to}` is disallowed for this process")]
    GoalChangeDisallowed { from: String, to: String },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecutionError {
    #[error("action `{action}` failed: {reason}")]
    ActionFailed { action: String, reason: String },
    #[error("execution timed out after {millis} ms")]
    Timeout { millis: u64 },
    #[error("execution cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LlmError {
    #[error("provider `{provider}` unavailable after {attempts} attempt(s): {reason}")]
    ProviderUnavailable {
        provider: String,
        attempts: u32,
        reason: String,
    },
    #[error("could not parse model output into `{target}`: {reason}")]
    ParseFailure { target: String, reason: String },
    #[error("retry budget exhausted after {attempts} attempt(s)")]
    RetryBudgetExhausted { attempts: u32 },
    #[error("model call timed out after {millis} ms")]
    Timeout { millis: u64 },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RagError {
    #[error("upstream service `{service}` unavailable: {reason}")]
    UpstreamUnavailable { service: String, reason: String },
    #[error("enhancer `{enhancer}` failed: {reason}")]
    EnhancerFailed { enhancer: String, reason: String },
}

/// Structural problems detected before an agent may be deployed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationCode {
    EmptyAgent,
    MissingGoals,
    NoActionsToGoals,
    MissingPrecondition,
    NoPathToGoal,
    InvalidActionSignature,
    DuplicateActionName,
}

impl std::fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            ValidationCode::EmptyAgent => "EMPTY_AGENT",
            ValidationCode::MissingGoals => "MISSING_GOALS",
            ValidationCode::NoActionsToGoals => "NO_ACTIONS_TO_GOALS",
            ValidationCode::MissingPrecondition => "MISSING_PRECONDITION",
            ValidationCode::NoPathToGoal => "NO_PATH_TO_GOAL",
            ValidationCode::InvalidActionSignature => "INVALID_ACTION_SIGNATURE",
            ValidationCode::DuplicateActionName => "DUPLICATE_ACTION_NAME",
        };
        f.write_str(text)
    }
}
