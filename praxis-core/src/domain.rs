//! Domain type registry.
//!
//! Blackboard objects carry a simple type name; this registry describes how
//! those names relate (supertypes) and which types are aggregations built
//! from constituent instances. No reflection: everything is data.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Requested type name whose satisfaction check is "the value is a list".
pub const LIST_TYPE: &str = "List";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeShape {
    Simple,
    /// Constructed on demand from the last instance of each constituent type.
    Aggregation { constituents: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainType {
    pub name: String,
    #[serde(default)]
    pub supertypes: Vec<String>,
    #[serde(default = "TypeShape::simple")]
    pub shape: TypeShape,
}

impl TypeShape {
    fn simple() -> Self {
        TypeShape::Simple
    }
}

impl DomainType {
    pub fn simple(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            supertypes: Vec::new(),
            shape: TypeShape::Simple,
        }
    }

    pub fn aggregation(name: impl Into<String>, constituents: Vec<String>) -> Self {
        Self {
            name: name.into(),
            supertypes: Vec::new(),
            shape: TypeShape::Aggregation { constituents },
        }
    }

    pub fn with_supertype(mut self, supertype: impl Into<String>) -> Self {
        self.supertypes.push(supertype.into());
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DomainTypes {
    types: HashMap<String, DomainType>,
}

impl DomainTypes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, domain_type: DomainType) {
        self.types.insert(domain_type.name.clone(), domain_type);
    }

    pub fn with(mut self, domain_type: DomainType) -> Self {
        self.register(domain_type);
        self
    }

    pub fn get(&self, name: &str) -> Option<&DomainType> {
        self.types.get(name)
    }

    /// Whether an object of type `actual` can stand in for `requested`:
    /// exact name match or `requested` anywhere in `actual`'s supertype
    /// chain. Unregistered types match by name only.
    pub fn satisfies(&self, actual: &str, requested: &str) -> bool {
        if actual == requested {
            return true;
        }
        let mut visited = HashSet::new();
        let mut frontier = vec![actual];
        while let Some(name) = frontier.pop() {
            if !visited.insert(name.to_string()) {
                continue;
            }
            if let Some(domain_type) = self.types.get(name) {
                for supertype in &domain_type.supertypes {
                    if supertype == requested {
                        return true;
                    }
                    frontier.push(supertype);
                }
            }
        }
        false
    }

    pub fn aggregation_constituents(&self, name: &str) -> Option<&[String]> {
        match self.types.get(name).map(|t| &t.shape) {
            Some(TypeShape::Aggregation { constituents }) => Some(constituents.as_slice()),
            _ => None,
        }
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }
}
