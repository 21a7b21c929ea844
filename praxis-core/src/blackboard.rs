//! Blackboard: the ordered, append-only typed object store a running agent
//! works against.
//!
//! Objects are never removed and never mutated in place; `spawn` hands a
//! child process an independent copy. A type-name index is maintained on
//! every insert so `last_of_type` does not scan the whole store.

use crate::domain::{DomainTypes, LIST_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Variable name that binds to the most recent object of a requested type.
pub const DEFAULT_BINDING: &str = "it";

/// Synthetic variable treated as always bound.
pub const ALL_BINDING: &str = "all";

/// A typed value on the blackboard: a simple type name plus a JSON payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainObject {
    pub type_name: String,
    pub value: Value,
}

impl DomainObject {
    pub fn new(type_name: impl Into<String>, value: Value) -> Self {
        Self {
            type_name: type_name.into(),
            value,
        }
    }

    /// Serialize a typed value into a blackboard object.
    pub fn of<T: Serialize>(type_name: impl Into<String>, value: &T) -> serde_json::Result<Self> {
        Ok(Self::new(type_name, serde_json::to_value(value)?))
    }

    pub fn is_list(&self) -> bool {
        self.value.is_array()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Blackboard {
    objects: Vec<Arc<DomainObject>>,
    bindings: HashMap<String, Arc<DomainObject>>,
    conditions: HashMap<String, bool>,
    type_index: HashMap<String, Vec<usize>>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `key` to `object` and append it to the ordered store.
    pub fn bind(&mut self, key: impl Into<String>, object: DomainObject) {
        let object = Arc::new(object);
        self.append(object.clone());
        self.bindings.insert(key.into(), object);
    }

    /// Append without binding a name.
    pub fn add_object(&mut self, object: DomainObject) {
        self.append(Arc::new(object));
    }

    fn append(&mut self, object: Arc<DomainObject>) {
        let index = self.objects.len();
        self.type_index
            .entry(object.type_name.clone())
            .or_default()
            .push(index);
        self.objects.push(object);
    }

    pub fn get(&self, key: &str) -> Option<Arc<DomainObject>> {
        self.bindings.get(key).cloned()
    }

    pub fn objects(&self) -> &[Arc<DomainObject>] {
        &self.objects
    }

    /// Explicit condition override; absent keys read as `false`.
    pub fn get_condition(&self, key: &str) -> bool {
        self.conditions.get(key).copied().unwrap_or(false)
    }

    /// Distinguishes "set to false" from "never set".
    pub fn condition_override(&self, key: &str) -> Option<bool> {
        self.conditions.get(key).copied()
    }

    pub fn set_condition(&mut self, key: impl Into<String>, value: bool) {
        self.conditions.insert(key.into(), value);
    }

    /// Independent child copy: future writes to either side are invisible to
    /// the other. Object payloads are shared, which is safe because the
    /// blackboard never mutates them.
    pub fn spawn(&self) -> Blackboard {
        self.clone()
    }

    /// Most recently added object whose type satisfies `requested`.
    pub fn last_of_type(
        &self,
        requested: &str,
        domain_types: &DomainTypes,
    ) -> Option<Arc<DomainObject>> {
        if requested == LIST_TYPE {
            return self.objects.iter().rev().find(|o| o.is_list()).cloned();
        }
        let best = self
            .type_index
            .iter()
            .filter(|(type_name, _)| domain_types.satisfies(type_name, requested))
            .filter_map(|(_, indices)| indices.last().copied())
            .max()?;
        Some(self.objects[best].clone())
    }

    /// Type-aware lookup used by binding conditions and action input
    /// resolution:
    ///
    /// 1. a satisfying value bound under `variable`;
    /// 2. an aggregation constructed from the last instance of each
    ///    constituent type (all must be present);
    /// 3. for the default binding, the last object satisfying the type.
    pub fn get_value(
        &self,
        variable: &str,
        type_name: &str,
        domain_types: &DomainTypes,
    ) -> Option<Arc<DomainObject>> {
        if let Some(bound) = self.bindings.get(variable) {
            let satisfied = if type_name == LIST_TYPE {
                bound.is_list()
            } else {
                domain_types.satisfies(&bound.type_name, type_name)
            };
            if satisfied {
                return Some(bound.clone());
            }
        }

        if let Some(constituents) = domain_types.aggregation_constituents(type_name) {
            let mut fields = serde_json::Map::new();
            for constituent in constituents {
                let part = self.last_of_type(constituent, domain_types)?;
                fields.insert(field_name(constituent), part.value.clone());
            }
            return Some(Arc::new(DomainObject::new(
                type_name,
                Value::Object(fields),
            )));
        }

        if variable == DEFAULT_BINDING {
            return self.last_of_type(type_name, domain_types);
        }

        None
    }

    /// Read-only view of the named bindings, for expression evaluation.
    pub fn expression_model(&self) -> HashMap<String, Value> {
        self.bindings
            .iter()
            .map(|(k, v)| (k.clone(), v.value.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

fn field_name(type_name: &str) -> String {
    let mut chars = type_name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
