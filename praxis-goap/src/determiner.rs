//! World-state determination.
//!
//! The planner never inspects a blackboard directly; it asks a
//! [`WorldStateDeterminer`] for the bulk state and, lazily, for individual
//! conditions that are still `Unknown` when their value would decide
//! applicability.

use parking_lot::Mutex;
use praxis_core::{ConditionDetermination, WorldState};
use std::collections::HashMap;

pub trait WorldStateDeterminer {
    /// The cheaply-knowable state. Expensive conditions may be reported
    /// `Unknown` here and only evaluated by [`determine_condition`].
    ///
    /// [`determine_condition`]: WorldStateDeterminer::determine_condition
    fn determine(&self) -> WorldState;

    /// Resolve a single condition on demand.
    fn determine_condition(&self, name: &str) -> ConditionDetermination;
}

/// Determiner over a fixed state with optional on-demand resolutions.
#[derive(Debug, Clone, Default)]
pub struct FixedWorldStateDeterminer {
    state: WorldState,
    resolutions: HashMap<String, ConditionDetermination>,
}

impl FixedWorldStateDeterminer {
    pub fn new(state: WorldState) -> Self {
        Self {
            state,
            resolutions: HashMap::new(),
        }
    }

    /// Value returned when the planner asks for `name` on demand.
    pub fn with_resolution(
        mut self,
        name: impl Into<String>,
        value: impl Into<ConditionDetermination>,
    ) -> Self {
        self.resolutions.insert(name.into(), value.into());
        self
    }
}

impl WorldStateDeterminer for FixedWorldStateDeterminer {
    fn determine(&self) -> WorldState {
        self.state.clone()
    }

    fn determine_condition(&self, name: &str) -> ConditionDetermination {
        self.resolutions
            .get(name)
            .copied()
            .unwrap_or_else(|| self.state.get(name))
    }
}

/// Wrapper counting on-demand queries per condition name.
pub struct RecordingDeterminer<D> {
    inner: D,
    queries: Mutex<HashMap<String, usize>>,
}

impl<D: WorldStateDeterminer> RecordingDeterminer<D> {
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            queries: Mutex::new(HashMap::new()),
        }
    }

    pub fn query_count(&self, name: &str) -> usize {
        self.queries.lock().get(name).copied().unwrap_or(0)
    }

    pub fn total_queries(&self) -> usize {
        self.queries.lock().values().sum()
    }
}

impl<D: WorldStateDeterminer> WorldStateDeterminer for RecordingDeterminer<D> {
    fn determine(&self) -> WorldState {
        self.inner.determine()
    }

    fn determine_condition(&self, name: &str) -> ConditionDetermination {
        *self.queries.lock().entry(name.to_string()).or_insert(0) += 1;
        self.inner.determine_condition(name)
    }
}
