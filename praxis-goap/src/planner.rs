//! A* GOAP planner.
//!
//! Searches world states, not action graphs: the closed set is keyed on
//! state identity, which also breaks cycles through re-runnable actions.
//! `Unknown` conditions are resolved lazily through the determiner and the
//! resolution is cached for the remainder of the planning call.

use crate::determiner::WorldStateDeterminer;
use crate::node::PlanNode;
use crate::prune::{prune_system, relevant_actions};
use praxis_core::{
    Action, ConditionDetermination, ConditionMap, Goal, Plan, PlanningError, PlanningSystem,
    WorldState,
};
use std::cell::RefCell;
use std::collections::{BTreeSet, BinaryHeap, HashMap};
use std::rc::Rc;

/// Memoized on-demand condition resolution, scoped to one planning call.
struct ConditionResolver<'a> {
    determiner: &'a dyn WorldStateDeterminer,
    cache: RefCell<HashMap<String, ConditionDetermination>>,
}

impl<'a> ConditionResolver<'a> {
    fn new(determiner: &'a dyn WorldStateDeterminer) -> Self {
        Self {
            determiner,
            cache: RefCell::new(HashMap::new()),
        }
    }

    fn resolve(&self, name: &str) -> ConditionDetermination {
        if let Some(value) = self.cache.borrow().get(name) {
            return *value;
        }
        let value = self.determiner.determine_condition(name);
        self.cache.borrow_mut().insert(name.to_string(), value);
        value
    }

    /// Strict match of one requirement, resolving only when the state value
    /// is `Unknown` and resolution could decide the outcome.
    fn meets(&self, state: &WorldState, key: &str, required: ConditionDetermination) -> bool {
        let current = state.get(key);
        if current == required {
            return true;
        }
        if current == ConditionDetermination::Unknown {
            return self.resolve(key) == required;
        }
        false
    }

    fn satisfies_all(&self, state: &WorldState, required: &ConditionMap) -> bool {
        required.iter().all(|(key, value)| self.meets(state, key, *value))
    }

    fn unsatisfied_count(&self, state: &WorldState, required: &ConditionMap) -> usize {
        required
            .iter()
            .filter(|(key, value)| !self.meets(state, key, **value))
            .count()
    }
}

/// GOAP planner over a [`PlanningSystem`].
pub struct AStarPlanner {
    max_iterations: usize,
}

impl Default for AStarPlanner {
    fn default() -> Self {
        Self::new()
    }
}

impl AStarPlanner {
    pub fn new() -> Self {
        Self {
            max_iterations: 10_000,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Shortest-cost action sequence from the determined state to `goal`.
    /// `Ok(None)` when the goal is unreachable; planning never panics.
    pub fn plan_to_goal(
        &self,
        system: &PlanningSystem,
        determiner: &dyn WorldStateDeterminer,
        goal: &Goal,
    ) -> Result<Option<Plan>, PlanningError> {
        self.check_well_formed(system)?;
        let resolver = ConditionResolver::new(determiner);
        let initial = determiner.determine();
        let relevant = relevant_actions(&system.actions, std::slice::from_ref(goal));
        Ok(self
            .search(&relevant, initial, goal, &resolver)
            .map(|actions| Plan::new(actions, goal.clone())))
    }

    /// One plan per reachable goal, ranked by net value descending, ties by
    /// lower cost, then goal name.
    pub fn plans_to_goals(
        &self,
        system: &PlanningSystem,
        determiner: &dyn WorldStateDeterminer,
    ) -> Result<Vec<Plan>, PlanningError> {
        self.check_well_formed(system)?;
        let resolver = ConditionResolver::new(determiner);
        let initial = determiner.determine();

        let mut plans = Vec::new();
        for goal in &system.goals {
            let relevant = relevant_actions(&system.actions, std::slice::from_ref(goal));
            if let Some(actions) = self.search(&relevant, initial.clone(), goal, &resolver) {
                plans.push(Plan::new(actions, goal.clone()));
            }
        }
        plans.sort_by(Plan::preference_order);
        tracing::debug!(goals = system.goals.len(), reachable = plans.len(), "ranked plans");
        Ok(plans)
    }

    /// Highest net-value plan to any goal, or `None` when every goal is
    /// unreachable.
    pub fn best_value_plan_to_any_goal(
        &self,
        system: &PlanningSystem,
        determiner: &dyn WorldStateDeterminer,
    ) -> Result<Option<Plan>, PlanningError> {
        Ok(self.plans_to_goals(system, determiner)?.into_iter().next())
    }

    /// Restrict the system to actions relevant to any of its goals.
    pub fn prune(&self, system: &PlanningSystem) -> PlanningSystem {
        prune_system(system)
    }

    fn check_well_formed(&self, system: &PlanningSystem) -> Result<(), PlanningError> {
        if let Some(name) = system.duplicate_action_name() {
            return Err(PlanningError::DuplicateActionName {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn search(
        &self,
        actions: &[Action],
        initial: WorldState,
        goal: &Goal,
        resolver: &ConditionResolver<'_>,
    ) -> Option<Vec<Action>> {
        let mut open = BinaryHeap::new();
        let mut closed: BTreeSet<WorldState> = BTreeSet::new();
        let mut seq: u64 = 0;

        let start_h = resolver.unsatisfied_count(&initial, &goal.preconditions) as f64;
        open.push(Rc::new(PlanNode {
            state: initial,
            parent: None,
            action: None,
            g_cost: 0.0,
            h_cost: start_h,
            seq,
        }));

        let mut iterations = 0usize;
        while let Some(current) = open.pop() {
            iterations += 1;
            if iterations > self.max_iterations {
                tracing::debug!(goal = %goal.name, iterations, "search abandoned at iteration cap");
                return None;
            }

            if resolver.satisfies_all(&current.state, &goal.preconditions) {
                return Some(current.into_path());
            }

            if !closed.insert(current.state.clone()) {
                continue;
            }

            for action in actions {
                if !resolver.satisfies_all(&current.state, &action.preconditions) {
                    continue;
                }
                if !action.can_rerun && current.path_contains(&action.name) {
                    continue;
                }
                let next_state = action.apply(&current.state);
                if closed.contains(&next_state) {
                    continue;
                }
                seq += 1;
                let h_cost =
                    resolver.unsatisfied_count(&next_state, &goal.preconditions) as f64;
                open.push(Rc::new(PlanNode {
                    state: next_state,
                    parent: Some(current.clone()),
                    action: Some(action.clone()),
                    g_cost: current.g_cost + action.cost,
                    h_cost,
                    seq,
                }));
            }
        }

        None
    }
}
