//! Planner-visible actions: preconditions, effects, cost and value.

use crate::logic::ConditionDetermination;
use crate::world::{ConditionMap, WorldState};
use serde::{Deserialize, Serialize};

/// A named step the planner can schedule. Applicability is strict: every
/// precondition must match exactly, `Unknown` never qualifies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    #[serde(default)]
    pub preconditions: ConditionMap,
    #[serde(default)]
    pub effects: ConditionMap,
    #[serde(default = "default_cost")]
    pub cost: f64,
    #[serde(default)]
    pub value: f64,
    /// Whether the planner may schedule this action more than once in a plan.
    #[serde(default = "default_can_rerun")]
    pub can_rerun: bool,
    /// Names of tool groups exposed to LLM calls made while this action runs.
    #[serde(default)]
    pub tool_groups: Vec<String>,
}

fn default_cost() -> f64 {
    1.0
}

fn default_can_rerun() -> bool {
    true
}

impl Action {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            preconditions: ConditionMap::new(),
            effects: ConditionMap::new(),
            cost: default_cost(),
            value: 0.0,
            can_rerun: default_can_rerun(),
            tool_groups: Vec::new(),
        }
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = value;
        self
    }

    pub fn with_precondition(
        mut self,
        key: impl Into<String>,
        value: impl Into<ConditionDetermination>,
    ) -> Self {
        self.preconditions.insert(key.into(), value.into());
        self
    }

    pub fn with_effect(
        mut self,
        key: impl Into<String>,
        value: impl Into<ConditionDetermination>,
    ) -> Self {
        self.effects.insert(key.into(), value.into());
        self
    }

    pub fn with_tool_group(mut self, group: impl Into<String>) -> Self {
        self.tool_groups.push(group.into());
        self
    }

    pub fn with_can_rerun(mut self, can_rerun: bool) -> Self {
        self.can_rerun = can_rerun;
        self
    }

    /// Check whether every precondition strictly holds in `state`.
    pub fn is_applicable(&self, state: &WorldState) -> bool {
        state.satisfies_all(&self.preconditions)
    }

    /// Apply this action's effects, returning the successor state.
    pub fn apply(&self, state: &WorldState) -> WorldState {
        state.apply(&self.effects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::ConditionDetermination::*;

    #[test]
    fn applicability_is_strict() {
        let action = Action::new("open_door").with_precondition("has_key", true);

        let empty = WorldState::new();
        assert!(!action.is_applicable(&empty));

        let with_key = WorldState::from_facts(&[("has_key", true)]);
        assert!(action.is_applicable(&with_key));

        let without_key = WorldState::from_facts(&[("has_key", false)]);
        assert!(!action.is_applicable(&without_key));
    }

    #[test]
    fn apply_overwrites_only_effect_keys() {
        let action = Action::new("trade")
            .with_precondition("has_goods", true)
            .with_effect("has_goods", false)
            .with_effect("has_coin", true);

        let state = WorldState::from_facts(&[("has_goods", true), ("at_market", true)]);
        let next = action.apply(&state);

        assert_eq!(next.get("has_goods"), False);
        assert_eq!(next.get("has_coin"), True);
        assert_eq!(next.get("at_market"), True);
    }

    #[test]
    fn defaults_match_builder() {
        let action = Action::new("noop");
        assert_eq!(action.cost, 1.0);
        assert_eq!(action.value, 0.0);
        assert!(action.can_rerun);
        assert!(action.tool_groups.is_empty());
    }
}
