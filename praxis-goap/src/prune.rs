//! Relevance pruning.
//!
//! Restricts an action set to those whose effects contribute, directly or
//! transitively, to a goal's preconditions. Keeps irrelevant actions from
//! inflating the A* frontier.

use praxis_core::{Action, Goal, PlanningSystem};
use std::collections::BTreeSet;

/// Actions whose effects touch the transitive closure of the goals'
/// precondition keys.
pub fn relevant_actions(actions: &[Action], goals: &[Goal]) -> Vec<Action> {
    let mut relevant: BTreeSet<String> = goals
        .iter()
        .flat_map(|g| g.preconditions.keys().cloned())
        .collect();

    loop {
        let mut changed = false;
        for action in actions {
            if action.effects.keys().any(|k| relevant.contains(k)) {
                for key in action.preconditions.keys() {
                    changed |= relevant.insert(key.clone());
                }
            }
        }
        if !changed {
            break;
        }
    }

    actions
        .iter()
        .filter(|a| a.effects.keys().any(|k| relevant.contains(k)))
        .cloned()
        .collect()
}

/// Prune a whole system against all of its goals.
pub fn prune_system(system: &PlanningSystem) -> PlanningSystem {
    PlanningSystem::new(
        relevant_actions(&system.actions, &system.goals),
        system.goals.clone(),
    )
}
