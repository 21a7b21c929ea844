//! Goals: target condition sets with a value used for plan ranking.

use crate::logic::ConditionDetermination;
use crate::world::{ConditionMap, WorldState};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub name: String,
    #[serde(default)]
    pub preconditions: ConditionMap,
    #[serde(default)]
    pub value: f64,
}

impl Goal {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            preconditions: ConditionMap::new(),
            value: 0.0,
        }
    }

    pub fn with_precondition(
        mut self,
        key: impl Into<String>,
        value: impl Into<ConditionDetermination>,
    ) -> Self {
        self.preconditions.insert(key.into(), value.into());
        self
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = value;
        self
    }

    /// A state achieves the goal iff every precondition strictly matches.
    pub fn is_achieved(&self, state: &WorldState) -> bool {
        state.satisfies_all(&self.preconditions)
    }
}
