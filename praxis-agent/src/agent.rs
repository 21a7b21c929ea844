//! Agent definitions.
//!
//! An agent is data plus code: planner-visible action descriptors and goals
//! (data), and the handlers and condition evaluators that run them (code).
//! The data half round-trips through a YAML manifest for late-bound
//! deployment; handlers and evaluators are then bound by name.

use crate::context::{ActionHandler, ActionOutcome, ConditionEvaluator, ProcessContext};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use praxis_core::{Action, ConditionMap, DomainType, DomainTypes, Goal, PlanningSystem};
use praxis_llm::ToolGroup;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// A named condition with its evaluator. Expensive conditions are reported
/// `Unknown` by bulk determination and only evaluated on demand.
pub struct ConditionDef {
    pub name: String,
    pub expensive: bool,
    evaluator: Arc<dyn ConditionEvaluator>,
}

impl ConditionDef {
    pub fn new(name: impl Into<String>, evaluator: Arc<dyn ConditionEvaluator>) -> Self {
        Self {
            name: name.into(),
            expensive: false,
            evaluator,
        }
    }

    pub fn expensive(name: impl Into<String>, evaluator: Arc<dyn ConditionEvaluator>) -> Self {
        Self {
            expensive: true,
            ..Self::new(name, evaluator)
        }
    }

    pub fn evaluator(&self) -> &dyn ConditionEvaluator {
        self.evaluator.as_ref()
    }
}

/// Planner descriptor plus the handler that actually runs.
pub struct AgentAction {
    pub descriptor: Action,
    handler: Arc<dyn ActionHandler>,
}

impl AgentAction {
    pub fn handler(&self) -> Arc<dyn ActionHandler> {
        self.handler.clone()
    }
}

/// Placeholder handler for manifest-loaded actions awaiting binding.
struct UnboundHandler;

#[async_trait]
impl ActionHandler for UnboundHandler {
    async fn execute(&self, ctx: &ProcessContext) -> Result<ActionOutcome> {
        bail!(
            "no handler bound for action `{}`",
            ctx.action_name().unwrap_or("?")
        )
    }
}

pub struct Agent {
    pub name: String,
    pub description: String,
    actions: Vec<AgentAction>,
    conditions: HashMap<String, ConditionDef>,
    pub goals: Vec<Goal>,
    pub domain_types: DomainTypes,
    tool_groups: HashMap<String, ToolGroup>,
    agent_tool_grants: Vec<String>,
}

impl Agent {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            actions: Vec::new(),
            conditions: HashMap::new(),
            goals: Vec::new(),
            domain_types: DomainTypes::new(),
            tool_groups: HashMap::new(),
            agent_tool_grants: Vec::new(),
        }
    }

    pub fn with_action(mut self, descriptor: Action, handler: Arc<dyn ActionHandler>) -> Self {
        self.actions.push(AgentAction {
            descriptor,
            handler,
        });
        self
    }

    pub fn with_goal(mut self, goal: Goal) -> Self {
        self.goals.push(goal);
        self
    }

    pub fn with_condition(mut self, condition: ConditionDef) -> Self {
        self.conditions.insert(condition.name.clone(), condition);
        self
    }

    pub fn with_domain_types(mut self, domain_types: DomainTypes) -> Self {
        self.domain_types = domain_types;
        self
    }

    /// Make a tool group available for granting.
    pub fn register_tool_group(mut self, group: ToolGroup) -> Self {
        self.tool_groups.insert(group.name.clone(), group);
        self
    }

    /// Grant a registered tool group to every model call this agent makes.
    pub fn grant_tool_group(mut self, name: impl Into<String>) -> Self {
        self.agent_tool_grants.push(name.into());
        self
    }

    pub fn planning_system(&self) -> PlanningSystem {
        PlanningSystem::new(
            self.actions.iter().map(|a| a.descriptor.clone()).collect(),
            self.goals.clone(),
        )
    }

    pub fn action(&self, name: &str) -> Option<&AgentAction> {
        self.actions.iter().find(|a| a.descriptor.name == name)
    }

    pub fn actions(&self) -> &[AgentAction] {
        &self.actions
    }

    pub fn condition(&self, name: &str) -> Option<&ConditionDef> {
        self.conditions.get(name)
    }

    pub fn conditions(&self) -> impl Iterator<Item = &ConditionDef> {
        self.conditions.values()
    }

    /// Agent-level grants followed by the action's own grants, resolved
    /// against the registered groups. Unknown group names are ignored.
    pub fn tool_groups_for(&self, action: &Action) -> Vec<ToolGroup> {
        self.agent_tool_grants
            .iter()
            .chain(action.tool_groups.iter())
            .filter_map(|name| self.tool_groups.get(name).cloned())
            .collect()
    }

    /// Bind a handler to a manifest-loaded action.
    pub fn bind_handler(
        &mut self,
        action_name: &str,
        handler: Arc<dyn ActionHandler>,
    ) -> Result<()> {
        let action = self
            .actions
            .iter_mut()
            .find(|a| a.descriptor.name == action_name)
            .with_context(|| format!("agent `{}` has no action `{action_name}`", self.name))?;
        action.handler = handler;
        Ok(())
    }

    /// Bind an evaluator to a manifest-declared condition name.
    pub fn bind_condition(
        &mut self,
        name: impl Into<String>,
        expensive: bool,
        evaluator: Arc<dyn ConditionEvaluator>,
    ) {
        let name = name.into();
        self.conditions.insert(
            name.clone(),
            ConditionDef {
                name,
                expensive,
                evaluator,
            },
        );
    }

    /// Load the data half of an agent from its YAML manifest. Handlers and
    /// condition evaluators are bound afterwards by name.
    pub fn from_manifest(yaml: &str) -> Result<Agent> {
        let manifest: AgentManifest =
            serde_yaml::from_str(yaml).context("malformed agent manifest")?;
        Ok(manifest.into_agent())
    }
}

fn lift(map: BTreeMap<String, bool>) -> ConditionMap {
    map.into_iter().map(|(k, v)| (k, v.into())).collect()
}

#[derive(Debug, Deserialize)]
pub struct AgentManifest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub actions: Vec<ActionManifest>,
    #[serde(default)]
    pub goals: Vec<GoalManifest>,
    /// Named conditions whose evaluators bind after loading.
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub domain_types: Vec<DomainType>,
    /// Agent-level tool-group grants.
    #[serde(default)]
    pub tool_groups: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ActionManifest {
    pub name: String,
    #[serde(default)]
    pub preconditions: BTreeMap<String, bool>,
    #[serde(default)]
    pub effects: BTreeMap<String, bool>,
    #[serde(default = "default_cost")]
    pub cost: f64,
    #[serde(default)]
    pub value: f64,
    #[serde(default = "default_can_rerun")]
    pub can_rerun: bool,
    #[serde(default)]
    pub tool_groups: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct GoalManifest {
    pub name: String,
    #[serde(default)]
    pub preconditions: BTreeMap<String, bool>,
    #[serde(default)]
    pub value: f64,
}

fn default_cost() -> f64 {
    1.0
}

fn default_can_rerun() -> bool {
    true
}

impl AgentManifest {
    fn into_agent(self) -> Agent {
        let mut agent = Agent::new(self.name, self.description);
        for entry in self.actions {
            let mut descriptor = Action::new(entry.name)
                .with_cost(entry.cost)
                .with_value(entry.value)
                .with_can_rerun(entry.can_rerun);
            descriptor.preconditions = lift(entry.preconditions);
            descriptor.effects = lift(entry.effects);
            descriptor.tool_groups = entry.tool_groups;
            agent = agent.with_action(descriptor, Arc::new(UnboundHandler));
        }
        for entry in self.goals {
            let mut goal = Goal::new(entry.name).with_value(entry.value);
            goal.preconditions = lift(entry.preconditions);
            agent = agent.with_goal(goal);
        }
        let mut domain_types = DomainTypes::new();
        for domain_type in self.domain_types {
            domain_types.register(domain_type);
        }
        agent.domain_types = domain_types;
        agent.agent_tool_grants = self.tool_groups;
        agent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::FnHandler;
    use praxis_core::ConditionDetermination;

    const MANIFEST: &str = r#"
name: researcher
description: finds and merges reports
actions:
  - name: ingest
    preconditions:
      userInput: true
    effects:
      ingested: true
    cost: 0.5
  - name: research
    preconditions:
      ingested: true
    effects:
      reportReady: true
    cost: 2.0
    tool_groups: [web]
goals:
  - name: reported
    preconditions:
      reportReady: true
    value: 5.0
conditions:
  - sourcesFresh
domain_types:
  - name: Report
    supertypes: [Document]
    shape: Simple
tool_groups: [math]
"#;

    #[test]
    fn manifest_round_trips_into_an_agent() {
        let agent = Agent::from_manifest(MANIFEST).unwrap();
        assert_eq!(agent.name, "researcher");
        assert_eq!(agent.actions().len(), 2);
        assert_eq!(agent.goals.len(), 1);

        let system = agent.planning_system();
        let ingest = system.action_by_name("ingest").unwrap();
        assert_eq!(
            ingest.preconditions.get("userInput"),
            Some(&ConditionDetermination::True)
        );
        assert_eq!(ingest.cost, 0.5);
        assert!(agent.domain_types.satisfies("Report", "Document"));
    }

    #[tokio::test]
    async fn manifest_actions_require_bound_handlers() {
        let mut agent = Agent::from_manifest(MANIFEST).unwrap();
        agent
            .bind_handler(
                "ingest",
                FnHandler::arc(|_ctx| Ok(ActionOutcome::Succeeded)),
            )
            .unwrap();
        assert!(agent.bind_handler("missing", FnHandler::arc(|_| Ok(ActionOutcome::Succeeded))).is_err());
    }

    #[test]
    fn tool_groups_resolve_agent_then_action_grants() {
        let agent = Agent::new("a", "")
            .register_tool_group(ToolGroup::new("math"))
            .register_tool_group(ToolGroup::new("web"))
            .grant_tool_group("math");

        let action = Action::new("act").with_tool_group("web");
        let groups = agent.tool_groups_for(&action);
        let names: Vec<_> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["math", "web"]);
    }
}
