//! A* search nodes over world states.

use praxis_core::{Action, WorldState};
use std::cmp::Ordering;
use std::rc::Rc;

#[derive(Debug, Clone)]
pub(crate) struct PlanNode {
    pub state: WorldState,
    pub parent: Option<Rc<PlanNode>>,
    pub action: Option<Action>,
    pub g_cost: f64,
    pub h_cost: f64,
    /// Heap insertion order, the final tie-break so searches are total-ordered.
    pub seq: u64,
}

impl PlanNode {
    pub fn f_cost(&self) -> f64 {
        self.g_cost + self.h_cost
    }

    fn action_name(&self) -> Option<&str> {
        self.action.as_ref().map(|a| a.name.as_str())
    }

    /// Whether `name` occurs anywhere on the path from the root to this node.
    pub fn path_contains(&self, name: &str) -> bool {
        let mut node = Some(self);
        while let Some(current) = node {
            if current.action_name() == Some(name) {
                return true;
            }
            node = current.parent.as_deref();
        }
        false
    }

    /// Reconstruct the action sequence from the root.
    pub fn into_path(self: Rc<Self>) -> Vec<Action> {
        let mut path = Vec::new();
        let mut node = Some(self);
        while let Some(current) = node {
            if let Some(action) = &current.action {
                path.push(action.clone());
            }
            node = current.parent.clone();
        }
        path.reverse();
        path
    }
}

impl PartialEq for PlanNode {
    fn eq(&self, other: &Self) -> bool {
        self.state == other.state
    }
}

impl Eq for PlanNode {}

impl PartialOrd for PlanNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PlanNode {
    // BinaryHeap is a max-heap: "greater" pops first. Pop order is lowest f,
    // then lowest g, then latest action name, then earliest insertion.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f_cost()
            .partial_cmp(&self.f_cost())
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                other
                    .g_cost
                    .partial_cmp(&self.g_cost)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| self.action_name().cmp(&other.action_name()))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}
