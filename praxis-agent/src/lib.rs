/*!
# Praxis Agent

The process runtime of the Praxis platform. An [`Agent`] bundles action
descriptors (planner data) with handlers (code), named conditions, goals,
domain types and tool groups. An [`AgentProcess`] runs one agent against a
blackboard in a plan→act→replan loop: world state is re-derived after every
action, the GOAP planner picks the next plan, and the process status machine
tracks RUNNING through COMPLETED / FAILED / STUCK / WAITING / PAUSED /
TERMINATED.

```rust
use praxis_agent::{
    ActionOutcome, Agent, AgentPlatform, FnHandler, ProcessOptions, ProcessStatus,
};
use praxis_core::{Action, DomainObject, Goal};
use praxis_llm::LoremLlm;
use std::sync::Arc;

# #[tokio::main(flavor = "current_thread")]
# async fn main() -> anyhow::Result<()> {
let platform = AgentPlatform::new(Arc::new(LoremLlm));
let agent = Agent::new("greeter", "binds a greeting")
    .with_action(
        Action::new("greet").with_effect("greeted", true),
        FnHandler::arc(|ctx| {
            ctx.bind("greeting", DomainObject::new("Greeting", "hello".into()));
            ctx.set_condition("greeted", true);
            Ok(ActionOutcome::Succeeded)
        }),
    )
    .with_goal(Goal::new("greet_user").with_precondition("greeted", true));

platform.deploy(agent).map_err(|report| anyhow::anyhow!(report.to_string()))?;
let process = platform.create_agent_process("greeter", ProcessOptions::test(), vec![])?;
assert_eq!(process.run().await, ProcessStatus::Completed);
# Ok(())
# }
```
*/

pub mod agent;
pub mod context;
pub mod determiner;
pub mod history;
pub mod names;
pub mod options;
pub mod platform;
pub mod process;
pub mod repository;
pub mod scheduler;
pub mod validation;

pub use agent::{Agent, AgentAction, AgentManifest, ConditionDef};
pub use context::{
    ActionHandler, ActionOutcome, ConditionContext, ConditionEvaluator, FnHandler, ProcessContext,
};
pub use determiner::{BlackboardWorldStateDeterminer, HAS_RUN_PREFIX};
pub use history::{stats_by_action, ActionExecution, ActionStats, ExecutionStatus};
pub use options::{ProcessOptions, Verbosity};
pub use platform::AgentPlatform;
pub use process::{AgentProcess, ProcessStatus, USER_RESPONSE_BINDING};
pub use repository::{InMemoryProcessRepository, ProcessRepository};
pub use scheduler::{
    MaxConcurrentScheduler, ProcessScheduler, ProntoScheduler, SchedulingDecision,
};
pub use validation::{validate_agent, Severity, ValidationIssue, ValidationReport};
