//! Variables shared by the nodes that reference them

use super::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle of a variable in its tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VariableId(pub(crate) u32);

impl VariableId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableKind {
    /// Global of the module
    Module,
    Local,
    /// Unqualified access in a class body: local if assigned there,
    /// otherwise the module global
    MaybeLocal,
    /// Compiler-introduced holder, e.g. for multi-name imports
    Temp,
}

/// A storage location a name resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub(crate) name: String,
    pub(crate) owner: NodeId,
    pub(crate) kind: VariableKind,
    pub(crate) read_only: bool,
    pub(crate) usage_count: usize,
}

impl Variable {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scope node the variable belongs to
    pub fn owner(&self) -> NodeId {
        self.owner
    }

    pub fn kind(&self) -> VariableKind {
        self.kind
    }

    /// Statically known to never be rebound. `false` until proven.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Number of attached references, as of the last recount
    pub fn usage_count(&self) -> usize {
        self.usage_count
    }
}
