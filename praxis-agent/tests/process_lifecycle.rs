//! End-to-end process lifecycle scenarios.

use async_trait::async_trait;
use praxis_agent::{
    ActionHandler, ActionOutcome, Agent, AgentPlatform, ExecutionStatus, FnHandler,
    InMemoryProcessRepository, ProcessContext, ProcessOptions, ProcessStatus,
};
use praxis_core::{Action, AgentEvent, CollectingListener, DomainObject, EventBus, Goal};
use praxis_llm::LoremLlm;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn platform_with_listener() -> (AgentPlatform, Arc<CollectingListener>) {
    let events = Arc::new(EventBus::new());
    let listener = CollectingListener::new();
    events.subscribe(listener.clone());
    let platform = AgentPlatform::new(Arc::new(LoremLlm)).with_events(events);
    (platform, listener)
}

/// One action whose handler flips the condition its effect promises.
fn achiever_agent() -> Agent {
    Agent::new("achiever", "sets done and stops")
        .with_action(
            Action::new("work").with_effect("done", true),
            FnHandler::arc(|ctx: &ProcessContext| {
                ctx.set_condition("done", true);
                Ok(ActionOutcome::Succeeded)
            }),
        )
        .with_goal(Goal::new("finished").with_precondition("done", true).with_value(1.0))
}

#[tokio::test]
async fn plan_act_replan_reaches_the_goal() {
    let (platform, listener) = platform_with_listener();
    platform.deploy(achiever_agent()).unwrap();

    let process = platform
        .create_agent_process("achiever", ProcessOptions::test(), vec![])
        .unwrap();
    assert_eq!(process.run().await, ProcessStatus::Completed);

    let history = process.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].action, "work");
    assert_eq!(history[0].status, ExecutionStatus::Succeeded);
    assert_eq!(process.current_goal().as_deref(), Some("finished"));

    let kinds: Vec<&'static str> = listener
        .events()
        .iter()
        .filter_map(|e| match &e.event {
            AgentEvent::ProcessCreated { .. } => Some("created"),
            AgentEvent::PlanFormulated { .. } => Some("planned"),
            AgentEvent::GoalAchieved { .. } => Some("achieved"),
            _ => None,
        })
        .collect();
    assert_eq!(kinds, vec!["created", "planned", "achieved"]);
}

#[tokio::test]
async fn satisfied_goal_completes_in_one_tick_with_empty_history() {
    let (platform, listener) = platform_with_listener();
    let agent = Agent::new("granted", "")
        .with_action(
            Action::new("noop").with_effect("intent:UserIntent", true),
            FnHandler::arc(|_| Ok(ActionOutcome::Succeeded)),
        )
        .with_goal(Goal::new("served").with_precondition("intent:UserIntent", true));
    platform.deploy(agent).unwrap();

    let process = platform
        .create_agent_process(
            "granted",
            ProcessOptions::test(),
            vec![(
                "intent".to_string(),
                DomainObject::new("UserIntent", json!({"ask": "hello"})),
            )],
        )
        .unwrap();

    assert_eq!(process.tick().await, ProcessStatus::Completed);
    assert!(process.history().is_empty());
    assert_eq!(
        listener.count_matching(|e| matches!(e, AgentEvent::GoalAchieved { .. })),
        1
    );
}

#[tokio::test]
async fn no_plan_means_stuck_until_the_world_changes() {
    let (platform, _) = platform_with_listener();
    let agent = Agent::new("blocked", "")
        .with_action(
            Action::new("finish")
                .with_precondition("input:Document", true)
                .with_effect("published", true),
            FnHandler::arc(|ctx: &ProcessContext| {
                ctx.set_condition("published", true);
                Ok(ActionOutcome::Succeeded)
            }),
        )
        .with_goal(Goal::new("published_goal").with_precondition("published", true));
    platform.deploy(agent).unwrap();

    let process = platform
        .create_agent_process("blocked", ProcessOptions::test(), vec![])
        .unwrap();
    assert_eq!(process.tick().await, ProcessStatus::Stuck);
    assert!(process.failure_info().is_some());

    // The missing document arrives; the next tick plans again.
    process.bind("input", DomainObject::new("Document", json!({"body": "text"})));
    assert_eq!(process.run().await, ProcessStatus::Completed);
}

fn two_goal_agent() -> Agent {
    // `grand` is the only reachable goal at first. Its action flips the
    // condition the modest goal wants, so the next tick prefers `modest`.
    Agent::new("fickle", "")
        .with_action(
            Action::new("overreach").with_cost(15.0).with_effect("grand_done", true),
            FnHandler::arc(|ctx: &ProcessContext| {
                ctx.set_condition("modest_done", true);
                Ok(ActionOutcome::Succeeded)
            }),
        )
        .with_goal(Goal::new("grand").with_precondition("grand_done", true).with_value(10.0))
        .with_goal(Goal::new("modest").with_precondition("modest_done", true).with_value(1.0))
}

#[tokio::test]
async fn goal_change_fails_the_process_when_disallowed() {
    let (platform, _) = platform_with_listener();
    platform.deploy(two_goal_agent()).unwrap();

    let process = platform
        .create_agent_process(
            "fickle",
            ProcessOptions::test().disallow_goal_change(),
            vec![],
        )
        .unwrap();

    assert_eq!(process.tick().await, ProcessStatus::Running);
    assert_eq!(process.current_goal().as_deref(), Some("grand"));

    assert_eq!(process.tick().await, ProcessStatus::Failed);
    let failure = process.failure_info().unwrap();
    assert!(failure.contains("goal change"), "failure was: {failure}");
}

#[tokio::test]
async fn goal_change_proceeds_when_allowed() {
    let (platform, _) = platform_with_listener();
    platform.deploy(two_goal_agent()).unwrap();

    let process = platform
        .create_agent_process("fickle", ProcessOptions::test(), vec![])
        .unwrap();
    assert_eq!(process.run().await, ProcessStatus::Completed);
    assert_eq!(process.current_goal().as_deref(), Some("modest"));
}

#[tokio::test]
async fn waiting_processes_resume_on_user_response() {
    let (platform, _) = platform_with_listener();
    let agent = Agent::new("asker", "")
        .with_action(
            Action::new("ask_user").with_effect("userResponse:UserResponse", true),
            FnHandler::arc(|_| Ok(ActionOutcome::Waiting)),
        )
        .with_goal(Goal::new("answered").with_precondition("userResponse:UserResponse", true));
    platform.deploy(agent).unwrap();

    let process = platform
        .create_agent_process("asker", ProcessOptions::test(), vec![])
        .unwrap();

    assert_eq!(process.run().await, ProcessStatus::Waiting);
    assert_eq!(process.history()[0].status, ExecutionStatus::Waiting);

    assert!(process.on_user_response("forty-two"));
    assert!(!process.on_user_response("again"), "only WAITING accepts input");

    assert_eq!(process.run().await, ProcessStatus::Completed);
    let snapshot = process.blackboard_snapshot();
    assert_eq!(
        snapshot.get("userResponse").unwrap().value,
        json!("forty-two")
    );
}

struct CancellableHandler;

#[async_trait]
impl ActionHandler for CancellableHandler {
    async fn execute(&self, ctx: &ProcessContext) -> anyhow::Result<ActionOutcome> {
        for _ in 0..500 {
            if ctx.is_cancelled() {
                anyhow::bail!("observed cancellation");
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        Ok(ActionOutcome::Succeeded)
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn kill_terminates_a_running_process_exactly_once() {
    let (platform, listener) = platform_with_listener();
    let agent = Agent::new("long_runner", "")
        .with_action(
            Action::new("grind").with_effect("ground", true),
            Arc::new(CancellableHandler),
        )
        .with_goal(Goal::new("ground_goal").with_precondition("ground", true));
    platform.deploy(agent).unwrap();

    let process = platform
        .create_agent_process("long_runner", ProcessOptions::test(), vec![])
        .unwrap();

    let runner = {
        let process = process.clone();
        tokio::spawn(async move { process.run().await })
    };
    tokio::time::sleep(Duration::from_millis(40)).await;

    let kill_event = process.kill();
    assert!(kill_event.is_some(), "first kill fires the transition");
    assert!(process.kill().is_none(), "second kill is a no-op");

    assert_eq!(runner.await.unwrap(), ProcessStatus::Terminated);
    assert_eq!(process.status(), ProcessStatus::Terminated);
    assert_eq!(
        listener.count_matching(|e| matches!(e, AgentEvent::ProcessKilled)),
        1
    );

    // The interrupted action may have been recorded before termination won.
    let history = process.history();
    assert!(history.len() <= 1);
    if let Some(record) = history.first() {
        assert!(matches!(
            record.status,
            ExecutionStatus::Failed | ExecutionStatus::Waiting
        ));
    }

    // Terminal status is sticky.
    assert_eq!(process.tick().await, ProcessStatus::Terminated);
}

#[tokio::test]
async fn terminal_statuses_are_sticky() {
    let (platform, _) = platform_with_listener();
    platform.deploy(achiever_agent()).unwrap();
    let process = platform
        .create_agent_process("achiever", ProcessOptions::test(), vec![])
        .unwrap();

    assert_eq!(process.run().await, ProcessStatus::Completed);
    let history_len = process.history().len();

    assert_eq!(process.tick().await, ProcessStatus::Completed);
    assert_eq!(process.history().len(), history_len);
    assert!(process.kill().is_none());
    assert_eq!(process.status(), ProcessStatus::Completed);
}

#[tokio::test]
async fn repository_window_evicts_oldest_terminal_entries_only() {
    let repository = Arc::new(InMemoryProcessRepository::new(2));
    let events = Arc::new(EventBus::new());
    let platform = AgentPlatform::new(Arc::new(LoremLlm))
        .with_events(events)
        .with_repository(repository.clone());
    platform.deploy(achiever_agent()).unwrap();

    let finished = platform
        .create_agent_process("achiever", ProcessOptions::test(), vec![])
        .unwrap();
    assert_eq!(finished.run().await, ProcessStatus::Completed);

    // Two live processes fill and then overflow the window.
    let live_a = platform
        .create_agent_process("achiever", ProcessOptions::test(), vec![])
        .unwrap();
    let live_b = platform
        .create_agent_process("achiever", ProcessOptions::test(), vec![])
        .unwrap();

    assert!(
        platform.find_process(finished.id()).is_none(),
        "oldest terminal process is evicted"
    );
    assert!(platform.find_process(live_a.id()).is_some());
    assert!(platform.find_process(live_b.id()).is_some());

    // A third live process overflows the window, but nothing is evictable.
    let live_c = platform
        .create_agent_process("achiever", ProcessOptions::test(), vec![])
        .unwrap();
    assert_eq!(repository.len(), 3);
    for process in [&live_a, &live_b, &live_c] {
        assert!(platform.find_process(process.id()).is_some());
    }
}

#[tokio::test]
async fn child_processes_spawn_the_blackboard() {
    let (platform, _) = platform_with_listener();
    platform.deploy(achiever_agent()).unwrap();

    let parent = platform
        .create_agent_process(
            "achiever",
            ProcessOptions::test(),
            vec![("x".to_string(), DomainObject::new("Number", json!(1)))],
        )
        .unwrap();

    let child_agent = platform.agent("achiever").unwrap();
    let child = platform.create_child_process(&parent, child_agent);

    assert!(child.id().starts_with("achiever >> "));
    assert_eq!(child.parent_id(), Some(parent.id()));
    assert_eq!(child.blackboard_snapshot().get("x").unwrap().value, json!(1));

    // Writes stay on their own side.
    child.bind("x", DomainObject::new("Number", json!(2)));
    assert_eq!(parent.blackboard_snapshot().get("x").unwrap().value, json!(1));
    assert_eq!(child.blackboard_snapshot().get("x").unwrap().value, json!(2));
}

#[tokio::test]
async fn llm_backed_actions_record_invocations() {
    let (platform, listener) = platform_with_listener();
    let agent = Agent::new("writer", "")
        .with_action(
            Action::new("draft").with_effect("drafted", true),
            Arc::new(DraftHandler),
        )
        .with_goal(Goal::new("drafted_goal").with_precondition("drafted", true));
    platform.deploy(agent).unwrap();

    let process = platform
        .create_agent_process("writer", ProcessOptions::test(), vec![])
        .unwrap();
    assert_eq!(process.run().await, ProcessStatus::Completed);

    let invocations = process.llm_invocations();
    assert_eq!(invocations.len(), 1);
    assert_eq!(invocations[0].agent_name.as_deref(), Some("writer"));
    assert_eq!(
        listener.count_matching(|e| matches!(e, AgentEvent::LlmRequest { .. })),
        1
    );
    assert_eq!(
        listener.count_matching(|e| matches!(e, AgentEvent::LlmResponse { .. })),
        1
    );
}

struct DraftHandler;

#[async_trait]
impl ActionHandler for DraftHandler {
    async fn execute(&self, ctx: &ProcessContext) -> anyhow::Result<ActionOutcome> {
        let text = ctx.generate_text("draft a paragraph").await?;
        ctx.bind("draft", DomainObject::new("Draft", json!(text)));
        ctx.set_condition("drafted", true);
        Ok(ActionOutcome::Succeeded)
    }
}
