/*!
# Praxis Core

Shared data model for the Praxis agentic execution platform:

- **Three-valued logic**: condition knowledge is `True`, `False` or
  `Unknown`, and `Unknown` never satisfies a strict requirement.
- **World states, actions, goals, plans**: the vocabulary the GOAP planner
  searches over.
- **Blackboard**: the ordered typed-object store an agent's actions share.
- **Events and errors**: the platform-wide event envelope and the typed
  error taxonomy.
- **`parallel_map`**: the bounded-concurrency primitive.

Higher layers live in `praxis-goap` (planning), `praxis-llm` (model
operations), `praxis-rag` (response enhancement) and `praxis-agent`
(process runtime).
*/

pub mod action;
pub mod asyncer;
pub mod blackboard;
pub mod domain;
pub mod error;
pub mod events;
pub mod goal;
pub mod logic;
pub mod plan;
pub mod system;
pub mod world;

pub use action::Action;
pub use asyncer::parallel_map;
pub use blackboard::{Blackboard, DomainObject, ALL_BINDING, DEFAULT_BINDING};
pub use domain::{DomainType, DomainTypes, TypeShape, LIST_TYPE};
pub use error::{ExecutionError, LlmError, PlanningError, RagError, ValidationCode};
pub use events::{AgentEvent, CollectingListener, EventBus, EventEnvelope, EventListener, TracingListener};
pub use goal::Goal;
pub use logic::ConditionDetermination;
pub use plan::Plan;
pub use system::PlanningSystem;
pub use world::{ConditionMap, WorldState};
