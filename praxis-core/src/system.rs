//! Planning systems: the action and goal sets a planner operates on.

use crate::action::Action;
use crate::goal::Goal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanningSystem {
    pub actions: Vec<Action>,
    pub goals: Vec<Goal>,
}

impl PlanningSystem {
    pub fn new(actions: Vec<Action>, goals: Vec<Goal>) -> Self {
        Self { actions, goals }
    }

    /// Every condition name mentioned by any action or goal.
    pub fn known_conditions(&self) -> BTreeSet<String> {
        let mut conditions = BTreeSet::new();
        for action in &self.actions {
            conditions.extend(action.preconditions.keys().cloned());
            conditions.extend(action.effects.keys().cloned());
        }
        for goal in &self.goals {
            conditions.extend(goal.preconditions.keys().cloned());
        }
        conditions
    }

    /// First duplicated action name, if any. Action names must be unique for
    /// the process runtime to resolve handlers.
    pub fn duplicate_action_name(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.actions
            .iter()
            .find(|a| !seen.insert(a.name.as_str()))
            .map(|a| a.name.as_str())
    }

    pub fn action_by_name(&self, name: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.name == name)
    }

    pub fn goal_by_name(&self, name: &str) -> Option<&Goal> {
        self.goals.iter().find(|g| g.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_conditions_union() {
        let system = PlanningSystem::new(
            vec![Action::new("a")
                .with_precondition("p", true)
                .with_effect("e", true)],
            vec![Goal::new("g").with_precondition("q", false)],
        );
        let known = system.known_conditions();
        assert_eq!(
            known.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["e", "p", "q"]
        );
    }

    #[test]
    fn detects_duplicate_action_names() {
        let system = PlanningSystem::new(vec![Action::new("a"), Action::new("a")], vec![]);
        assert_eq!(system.duplicate_action_name(), Some("a"));

        let ok = PlanningSystem::new(vec![Action::new("a"), Action::new("b")], vec![]);
        assert_eq!(ok.duplicate_action_name(), None);
    }
}
