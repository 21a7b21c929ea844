//! Three-valued condition logic.
//!
//! Knowledge about a condition is `True`, `False`, or `Unknown`. The strict
//! satisfaction rule is the load-bearing part: `Unknown` never satisfies a
//! required `True` or `False`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What the platform currently knows about a named condition.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConditionDetermination {
    True,
    False,
    #[default]
    Unknown,
}

impl ConditionDetermination {
    /// Three-valued conjunction: `False` dominates, `Unknown` is contagious.
    pub fn and(self, other: Self) -> Self {
        use ConditionDetermination::*;
        match (self, other) {
            (False, _) | (_, False) => False,
            (True, True) => True,
            _ => Unknown,
        }
    }

    /// Strict satisfaction: exact equality, no lifting.
    pub fn satisfies(self, required: Self) -> bool {
        self == required
    }

    pub fn is_known(self) -> bool {
        !matches!(self, ConditionDetermination::Unknown)
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            ConditionDetermination::True => Some(true),
            ConditionDetermination::False => Some(false),
            ConditionDetermination::Unknown => None,
        }
    }
}

impl From<bool> for ConditionDetermination {
    fn from(value: bool) -> Self {
        if value {
            ConditionDetermination::True
        } else {
            ConditionDetermination::False
        }
    }
}

impl fmt::Display for ConditionDetermination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionDetermination::True => write!(f, "TRUE"),
            ConditionDetermination::False => write!(f, "FALSE"),
            ConditionDetermination::Unknown => write!(f, "UNKNOWN"),
        }
    }
}
