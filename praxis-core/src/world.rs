//! Immutable world states over named conditions.
//!
//! A world state maps condition names to three-valued determinations. States
//! are deterministic map types so they can key the planner's closed set.

use crate::logic::ConditionDetermination;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Requirement or effect map: condition name to determination.
pub type ConditionMap = BTreeMap<String, ConditionDetermination>;

/// Snapshot of condition knowledge. Missing keys read as `Unknown`; writing
/// `Unknown` removes the key so "missing" and "explicitly unknown" are one
/// canonical form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorldState {
    facts: ConditionMap,
}

impl WorldState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_facts(facts: &[(&str, bool)]) -> Self {
        let mut state = Self::new();
        for (key, value) in facts {
            state.set(key, *value);
        }
        state
    }

    pub fn set(&mut self, key: &str, value: impl Into<ConditionDetermination>) {
        match value.into() {
            ConditionDetermination::Unknown => {
                self.facts.remove(key);
            }
            known => {
                self.facts.insert(key.to_string(), known);
            }
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<ConditionDetermination>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> ConditionDetermination {
        self.facts
            .get(key)
            .copied()
            .unwrap_or(ConditionDetermination::Unknown)
    }

    /// Strict satisfaction of every required entry.
    pub fn satisfies_all(&self, required: &ConditionMap) -> bool {
        required.iter().all(|(key, value)| self.get(key) == *value)
    }

    /// Apply effects, producing a new state. The receiver is untouched.
    pub fn apply(&self, effects: &ConditionMap) -> WorldState {
        let mut next = self.clone();
        for (key, value) in effects {
            next.set(key, *value);
        }
        next
    }

    /// Count of required entries this state does not satisfy. Used as the
    /// planner's distance heuristic.
    pub fn unsatisfied_count(&self, required: &ConditionMap) -> usize {
        required
            .iter()
            .filter(|(key, value)| self.get(key) != **value)
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ConditionDetermination)> {
        self.facts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

impl fmt::Display for WorldState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.facts.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{key}={value}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::ConditionDetermination::*;

    #[test]
    fn missing_keys_read_unknown() {
        let state = WorldState::new();
        assert_eq!(state.get("anything"), Unknown);
    }

    #[test]
    fn setting_unknown_removes_the_key() {
        let mut state = WorldState::from_facts(&[("lit", true)]);
        assert_eq!(state.len(), 1);
        state.set("lit", Unknown);
        assert!(state.is_empty());
        // Canonical form: explicitly-unknown equals never-set.
        assert_eq!(state, WorldState::new());
    }

    #[test]
    fn apply_produces_a_new_state() {
        let state = WorldState::from_facts(&[("has_key", true)]);
        let mut effects = ConditionMap::new();
        effects.insert("door_open".into(), True);
        effects.insert("has_key".into(), False);

        let next = state.apply(&effects);
        assert_eq!(next.get("door_open"), True);
        assert_eq!(next.get("has_key"), False);
        assert_eq!(state.get("door_open"), Unknown);
        assert_eq!(state.get("has_key"), True);
    }

    #[test]
    fn strict_satisfaction() {
        let state = WorldState::from_facts(&[("a", true)]);
        let mut required = ConditionMap::new();
        required.insert("a".into(), True);
        assert!(state.satisfies_all(&required));

        required.insert("b".into(), False);
        // `b` is Unknown in the state, which never satisfies FALSE.
        assert!(!state.satisfies_all(&required));
        assert_eq!(state.unsatisfied_count(&required), 1);
    }
}
