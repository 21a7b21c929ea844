//! Deriving world state from a blackboard.
//!
//! Condition names are evaluated in a fixed rule order: binding conditions,
//! execution markers, named agent conditions, explicit overrides, and
//! finally `Unknown`.

use crate::agent::Agent;
use crate::context::ConditionContext;
use crate::history::{ActionExecution, ExecutionStatus};
use praxis_core::{Blackboard, ConditionDetermination, WorldState, ALL_BINDING};
use praxis_goap::WorldStateDeterminer;
use std::collections::BTreeSet;

/// Prefix marking "this action has run successfully" conditions.
pub const HAS_RUN_PREFIX: &str = "hasRun_";

pub struct BlackboardWorldStateDeterminer<'a> {
    agent: &'a Agent,
    blackboard: &'a Blackboard,
    history: &'a [ActionExecution],
    known_conditions: BTreeSet<String>,
}

impl<'a> BlackboardWorldStateDeterminer<'a> {
    pub fn new(
        agent: &'a Agent,
        blackboard: &'a Blackboard,
        history: &'a [ActionExecution],
    ) -> Self {
        let mut known_conditions = agent.planning_system().known_conditions();
        known_conditions.extend(agent.conditions().map(|c| c.name.clone()));
        Self {
            agent,
            blackboard,
            history,
            known_conditions,
        }
    }

    fn evaluate(&self, name: &str, include_expensive: bool) -> ConditionDetermination {
        // Rule 1: binding conditions of the form "variable:Type".
        if let Some((variable, type_name)) = name.split_once(':') {
            if variable == ALL_BINDING {
                // TODO: decide whether an empty blackboard should really
                // satisfy the synthetic "all" variable.
                return ConditionDetermination::True;
            }
            return self
                .blackboard
                .get_value(variable, type_name, &self.agent.domain_types)
                .is_some()
                .into();
        }

        // Rule 2: execution markers.
        if let Some(action_name) = name.strip_prefix(HAS_RUN_PREFIX) {
            return self
                .history
                .iter()
                .any(|e| e.action == action_name && e.status == ExecutionStatus::Succeeded)
                .into();
        }

        // Rule 3: named agent conditions.
        if let Some(condition) = self.agent.condition(name) {
            if condition.expensive && !include_expensive {
                return ConditionDetermination::Unknown;
            }
            let ctx = ConditionContext {
                blackboard: self.blackboard,
                history: self.history,
                domain_types: &self.agent.domain_types,
            };
            return condition.evaluator().evaluate(&ctx);
        }

        // Rule 4: explicit overrides.
        if let Some(value) = self.blackboard.condition_override(name) {
            return value.into();
        }

        // Rule 5.
        ConditionDetermination::Unknown
    }
}

impl WorldStateDeterminer for BlackboardWorldStateDeterminer<'_> {
    fn determine(&self) -> WorldState {
        let mut state = WorldState::new();
        for name in &self.known_conditions {
            state.set(name, self.evaluate(name, false));
        }
        state
    }

    fn determine_condition(&self, name: &str) -> ConditionDetermination {
        self.evaluate(name, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::ConditionDef;
    use crate::context::{ActionOutcome, FnHandler};
    use chrono::Utc;
    use praxis_core::ConditionDetermination::*;
    use praxis_core::{Action, DomainObject, DomainType, DomainTypes, Goal};
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn execution(action: &str, status: ExecutionStatus) -> ActionExecution {
        ActionExecution {
            action: action.into(),
            started_at: Utc::now(),
            duration: Duration::from_millis(1),
            status,
            failure: None,
        }
    }

    fn test_agent() -> Agent {
        Agent::new("tester", "")
            .with_domain_types(DomainTypes::new().with(DomainType::simple("Report")))
            .with_action(
                Action::new("work").with_effect("done", true),
                FnHandler::arc(|_| Ok(ActionOutcome::Succeeded)),
            )
            .with_goal(Goal::new("g").with_precondition("done", true))
            .with_condition(ConditionDef::new(
                "ready",
                Arc::new(|_: &ConditionContext<'_>| True),
            ))
            .with_condition(ConditionDef::expensive(
                "slow_check",
                Arc::new(|_: &ConditionContext<'_>| False),
            ))
    }

    #[test]
    fn binding_conditions_check_the_blackboard() {
        let agent = test_agent();
        let mut blackboard = Blackboard::new();
        let determiner = BlackboardWorldStateDeterminer::new(&agent, &blackboard, &[]);
        assert_eq!(determiner.determine_condition("report:Report"), False);
        assert_eq!(determiner.determine_condition("all:Report"), True);

        blackboard.bind("report", DomainObject::new("Report", json!({"ok": true})));
        let determiner = BlackboardWorldStateDeterminer::new(&agent, &blackboard, &[]);
        assert_eq!(determiner.determine_condition("report:Report"), True);
    }

    #[test]
    fn has_run_markers_require_a_successful_execution() {
        let agent = test_agent();
        let blackboard = Blackboard::new();

        let failed = [execution("work", ExecutionStatus::Failed)];
        let determiner = BlackboardWorldStateDeterminer::new(&agent, &blackboard, &failed);
        assert_eq!(determiner.determine_condition("hasRun_work"), False);

        let mixed = [
            execution("work", ExecutionStatus::Failed),
            execution("work", ExecutionStatus::Succeeded),
        ];
        let determiner = BlackboardWorldStateDeterminer::new(&agent, &blackboard, &mixed);
        assert_eq!(determiner.determine_condition("hasRun_work"), True);
    }

    #[test]
    fn named_conditions_run_their_evaluator() {
        let agent = test_agent();
        let blackboard = Blackboard::new();
        let determiner = BlackboardWorldStateDeterminer::new(&agent, &blackboard, &[]);
        assert_eq!(determiner.determine_condition("ready"), True);
    }

    #[test]
    fn expensive_conditions_hide_from_bulk_determination() {
        let agent = test_agent();
        let blackboard = Blackboard::new();
        let determiner = BlackboardWorldStateDeterminer::new(&agent, &blackboard, &[]);

        let bulk = determiner.determine();
        assert_eq!(bulk.get("slow_check"), Unknown);
        assert_eq!(determiner.determine_condition("slow_check"), False);
    }

    #[test]
    fn explicit_overrides_and_unknown_fallthrough() {
        let agent = test_agent();
        let mut blackboard = Blackboard::new();
        blackboard.set_condition("flag", true);
        let determiner = BlackboardWorldStateDeterminer::new(&agent, &blackboard, &[]);

        assert_eq!(determiner.determine_condition("flag"), True);
        assert_eq!(determiner.determine_condition("never_mentioned"), Unknown);
    }

    #[test]
    fn named_conditions_take_precedence_over_overrides() {
        let agent = test_agent();
        let mut blackboard = Blackboard::new();
        // The evaluator says TRUE even though an override says false.
        blackboard.set_condition("ready", false);
        let determiner = BlackboardWorldStateDeterminer::new(&agent, &blackboard, &[]);
        assert_eq!(determiner.determine_condition("ready"), True);
    }

    #[test]
    fn bulk_determination_covers_known_conditions() {
        let agent = test_agent();
        let blackboard = Blackboard::new();
        let history = [execution("work", ExecutionStatus::Succeeded)];
        let determiner = BlackboardWorldStateDeterminer::new(&agent, &blackboard, &history);

        let state = determiner.determine();
        // `done` was never set: Unknown, therefore absent.
        assert_eq!(state.get("done"), Unknown);
        assert_eq!(state.get("ready"), True);
    }
}
