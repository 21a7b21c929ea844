//! The agent process: plan, act, replan.
//!
//! A process owns a blackboard and drives one agent against it. Each tick
//! re-derives world state, asks the planner for the best plan, and executes
//! at most one action. Terminal statuses are sticky; `kill()` is advisory
//! and observed by in-flight actions through the cancellation flag.

use crate::agent::Agent;
use crate::context::{ActionOutcome, ProcessContext, SharedRecorder};
use crate::determiner::BlackboardWorldStateDeterminer;
use crate::history::{stats_by_action, ActionExecution, ActionStats, ExecutionStatus};
use crate::names;
use crate::options::ProcessOptions;
use crate::scheduler::{ProcessScheduler, SchedulingDecision};
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use praxis_core::{
    AgentEvent, Blackboard, DomainObject, EventBus, EventEnvelope, ExecutionError, PlanningError,
};
use praxis_goap::AStarPlanner;
use praxis_llm::{LlmInvocation, LlmOperations};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Binding under which user responses land on the blackboard.
pub const USER_RESPONSE_BINDING: &str = "userResponse";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessStatus {
    Running,
    Completed,
    Failed,
    Stuck,
    Waiting,
    Paused,
    Terminated,
}

impl ProcessStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ProcessStatus::Completed | ProcessStatus::Failed | ProcessStatus::Terminated
        )
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ProcessStatus::Running => "RUNNING",
            ProcessStatus::Completed => "COMPLETED",
            ProcessStatus::Failed => "FAILED",
            ProcessStatus::Stuck => "STUCK",
            ProcessStatus::Waiting => "WAITING",
            ProcessStatus::Paused => "PAUSED",
            ProcessStatus::Terminated => "TERMINATED",
        };
        f.write_str(text)
    }
}

struct ProcessInner {
    status: ProcessStatus,
    history: Vec<ActionExecution>,
    current_goal: Option<String>,
    failure_info: Option<String>,
    updated_at: DateTime<Utc>,
}

pub struct AgentProcess {
    id: String,
    parent_id: Option<String>,
    agent: Arc<Agent>,
    options: ProcessOptions,
    planner: AStarPlanner,
    events: Arc<EventBus>,
    scheduler: Arc<dyn ProcessScheduler>,
    llm: Arc<LlmOperations>,
    blackboard: Arc<RwLock<Blackboard>>,
    invocations: Arc<Mutex<Vec<LlmInvocation>>>,
    cancelled: Arc<AtomicBool>,
    inner: RwLock<ProcessInner>,
    created_at: DateTime<Utc>,
}

impl AgentProcess {
    pub fn new(
        id: impl Into<String>,
        agent: Arc<Agent>,
        options: ProcessOptions,
        events: Arc<EventBus>,
        scheduler: Arc<dyn ProcessScheduler>,
        llm: Arc<LlmOperations>,
    ) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            agent,
            options,
            planner: AStarPlanner::new(),
            events,
            scheduler,
            llm,
            blackboard: Arc::new(RwLock::new(Blackboard::new())),
            invocations: Arc::new(Mutex::new(Vec::new())),
            cancelled: Arc::new(AtomicBool::new(false)),
            inner: RwLock::new(ProcessInner {
                status: ProcessStatus::Running,
                history: Vec::new(),
                current_goal: None,
                failure_info: None,
                updated_at: Utc::now(),
            }),
            created_at: Utc::now(),
        }
    }

    pub fn with_blackboard(self, blackboard: Blackboard) -> Self {
        *self.blackboard.write() = blackboard;
        self
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    pub fn agent(&self) -> &Arc<Agent> {
        &self.agent
    }

    pub fn options(&self) -> &ProcessOptions {
        &self.options
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn status(&self) -> ProcessStatus {
        self.inner.read().status
    }

    pub fn current_goal(&self) -> Option<String> {
        self.inner.read().current_goal.clone()
    }

    pub fn failure_info(&self) -> Option<String> {
        self.inner.read().failure_info.clone()
    }

    pub fn history(&self) -> Vec<ActionExecution> {
        self.inner.read().history.clone()
    }

    pub fn llm_invocations(&self) -> Vec<LlmInvocation> {
        self.invocations.lock().clone()
    }

    pub fn action_stats(&self) -> HashMap<String, ActionStats> {
        stats_by_action(&self.inner.read().history)
    }

    pub fn blackboard_snapshot(&self) -> Blackboard {
        self.blackboard.read().clone()
    }

    /// Seed a binding before the first tick.
    pub fn bind(&self, key: impl Into<String>, object: DomainObject) {
        self.blackboard.write().bind(key, object);
    }

    /// Drive ticks until the process can no longer advance by itself:
    /// terminal, WAITING for input, PAUSED by the scheduler, or STUCK.
    pub async fn run(&self) -> ProcessStatus {
        loop {
            match self.tick().await {
                ProcessStatus::Running => continue,
                done => return done,
            }
        }
    }

    /// Advance one step: plan, maybe execute one action, set the new status.
    pub async fn tick(&self) -> ProcessStatus {
        // Status gate.
        {
            let mut inner = self.inner.write();
            match inner.status {
                ProcessStatus::Completed | ProcessStatus::Failed | ProcessStatus::Terminated => {
                    return inner.status
                }
                ProcessStatus::Waiting => return ProcessStatus::Waiting,
                ProcessStatus::Paused | ProcessStatus::Running | ProcessStatus::Stuck => {
                    if self.scheduler.admit(&self.id) == SchedulingDecision::Pause {
                        if inner.status != ProcessStatus::Paused {
                            inner.status = ProcessStatus::Paused;
                            tracing::info!(process = %self.id, "paused by scheduler");
                        }
                        return ProcessStatus::Paused;
                    }
                    inner.status = ProcessStatus::Running;
                }
            }
        }

        // Observe and plan.
        let blackboard = self.blackboard.read().clone();
        let history = self.inner.read().history.clone();
        let determiner = BlackboardWorldStateDeterminer::new(&self.agent, &blackboard, &history);
        let system = self.agent.planning_system();

        let plan = match self
            .planner
            .best_value_plan_to_any_goal(&system, &determiner)
        {
            Err(error) => return self.fail(error.to_string()),
            Ok(None) => {
                let mut inner = self.inner.write();
                if inner.status.is_terminal() {
                    return inner.status;
                }
                inner.status = ProcessStatus::Stuck;
                inner.failure_info = Some(
                    PlanningError::NoPlanFound {
                        goal: inner
                            .current_goal
                            .clone()
                            .unwrap_or_else(|| "any".to_string()),
                    }
                    .to_string(),
                );
                inner.updated_at = Utc::now();
                tracing::info!(process = %self.id, "no plan to any goal, process is stuck");
                return ProcessStatus::Stuck;
            }
            Ok(Some(plan)) => plan,
        };

        // Goal continuity.
        {
            let mut inner = self.inner.write();
            if inner.status.is_terminal() {
                return inner.status;
            }
            if let Some(current) = &inner.current_goal {
                if *current != plan.goal.name && !self.options.allow_goal_change {
                    let error = PlanningError::GoalChangeDisallowed {
                        from: current.clone(),
                        to: plan.goal.name.clone(),
                    };
                    drop(inner);
                    return self.fail(error.to_string());
                }
            }
            inner.current_goal = Some(plan.goal.name.clone());
            // A fresh plan clears any stale stuck diagnostics.
            inner.failure_info = None;
        }

        if plan.is_complete() {
            {
                let mut inner = self.inner.write();
                if inner.status.is_terminal() {
                    return inner.status;
                }
                inner.status = ProcessStatus::Completed;
                inner.updated_at = Utc::now();
            }
            self.scheduler.release(&self.id);
            self.events.emit(
                Some(&self.id),
                AgentEvent::GoalAchieved {
                    goal: plan.goal.name.clone(),
                },
            );
            tracing::info!(process = %self.id, goal = %plan.goal.name, "goal achieved");
            return ProcessStatus::Completed;
        }

        self.events.emit(
            Some(&self.id),
            AgentEvent::PlanFormulated {
                goal: plan.goal.name.clone(),
                actions: plan
                    .action_names()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
                net_value: plan.net_value(),
            },
        );
        if self.options.verbosity.debug {
            tracing::debug!(process = %self.id, plan = %plan, "plan formulated");
        }

        // Execute the first action of the plan.
        let action = plan.actions[0].clone();
        let Some(agent_action) = self.agent.action(&action.name) else {
            return self.fail(format!("agent has no action named `{}`", action.name));
        };
        let handler = agent_action.handler();
        let ctx = ProcessContext {
            process_id: self.id.clone(),
            agent_name: self.agent.name.clone(),
            action_name: Some(action.name.clone()),
            blackboard: self.blackboard.clone(),
            domain_types: self.agent.domain_types.clone(),
            llm: self.llm.clone(),
            events: self.events.clone(),
            cancelled: self.cancelled.clone(),
            tool_groups: self.agent.tool_groups_for(&action),
            recorder: Arc::new(SharedRecorder(self.invocations.clone())),
        };

        let started_at = Utc::now();
        let timer = Instant::now();
        let outcome = handler.execute(&ctx).await;
        let duration = timer.elapsed();

        // Record, then transition.
        let (execution_status, next_status, failure) = match outcome {
            Ok(ActionOutcome::Succeeded) => {
                (ExecutionStatus::Succeeded, ProcessStatus::Running, None)
            }
            Ok(ActionOutcome::Waiting) => (ExecutionStatus::Waiting, ProcessStatus::Waiting, None),
            Ok(ActionOutcome::Paused) => (ExecutionStatus::Paused, ProcessStatus::Paused, None),
            Err(error) => {
                let reason = ExecutionError::ActionFailed {
                    action: action.name.clone(),
                    reason: error.to_string(),
                }
                .to_string();
                let next = if self.options.continue_on_action_failure {
                    ProcessStatus::Running
                } else {
                    ProcessStatus::Failed
                };
                (ExecutionStatus::Failed, next, Some(reason))
            }
        };

        let mut inner = self.inner.write();
        inner.history.push(ActionExecution {
            action: action.name.clone(),
            started_at,
            duration,
            status: execution_status,
            failure: failure.clone(),
        });
        if inner.status.is_terminal() {
            // Killed while the action was in flight; the record stands, the
            // terminal status wins.
            return inner.status;
        }
        if next_status == ProcessStatus::Failed {
            inner.failure_info = failure;
        }
        inner.status = next_status;
        inner.updated_at = Utc::now();
        drop(inner);

        if next_status.is_terminal() {
            self.scheduler.release(&self.id);
        }
        tracing::debug!(
            process = %self.id,
            action = %action.name,
            status = %next_status,
            duration_ms = duration.as_millis() as u64,
            "action executed"
        );
        next_status
    }

    /// Transition to TERMINATED. Returns the kill event iff this call fired
    /// the transition.
    pub fn kill(&self) -> Option<EventEnvelope> {
        {
            let mut inner = self.inner.write();
            if inner.status.is_terminal() {
                return None;
            }
            inner.status = ProcessStatus::Terminated;
            inner.failure_info.get_or_insert_with(|| "killed".to_string());
            inner.updated_at = Utc::now();
        }
        self.cancelled.store(true, Ordering::SeqCst);
        self.scheduler.release(&self.id);
        tracing::info!(process = %self.id, "process killed");
        Some(self.events.emit(Some(&self.id), AgentEvent::ProcessKilled))
    }

    /// Resume a WAITING process with external input; the response is bound
    /// on the blackboard under [`USER_RESPONSE_BINDING`].
    pub fn on_user_response(&self, response: impl Into<String>) -> bool {
        {
            let mut inner = self.inner.write();
            if inner.status != ProcessStatus::Waiting {
                return false;
            }
            inner.status = ProcessStatus::Running;
            inner.updated_at = Utc::now();
        }
        self.blackboard.write().bind(
            USER_RESPONSE_BINDING,
            DomainObject::new("UserResponse", serde_json::Value::String(response.into())),
        );
        tracing::info!(process = %self.id, "user response received, resuming");
        true
    }

    /// Spawn a child process over this blackboard's contents. Writes to
    /// either side stay invisible to the other.
    pub fn create_child(&self, agent: Arc<Agent>) -> Arc<AgentProcess> {
        let child_id = format!("{} >> {}", self.agent.name, names::friendly_name());
        let blackboard = self.blackboard.read().spawn();
        Arc::new(
            AgentProcess::new(
                child_id,
                agent,
                self.options.clone(),
                self.events.clone(),
                self.scheduler.clone(),
                self.llm.clone(),
            )
            .with_blackboard(blackboard)
            .with_parent(self.id.clone()),
        )
    }

    fn fail(&self, reason: String) -> ProcessStatus {
        {
            let mut inner = self.inner.write();
            if inner.status.is_terminal() {
                return inner.status;
            }
            inner.status = ProcessStatus::Failed;
            inner.failure_info = Some(reason.clone());
            inner.updated_at = Utc::now();
        }
        self.scheduler.release(&self.id);
        tracing::info!(process = %self.id, %reason, "process failed");
        ProcessStatus::Failed
    }
}
