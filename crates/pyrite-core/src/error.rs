//! Error types for Pyrite Core
//!
//! Every variant here is a node-model invariant violation. User-code errors
//! never show up as `CoreError`; they are lowered into the tree instead.

use crate::ast::{NodeId, NodeKind, VariableId};
use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("node {node} has no parent, use the root replacement entry point")]
    DetachedReplacement { node: NodeId },

    #[error("node {node} is already attached to a tree")]
    AlreadyAttached { node: NodeId },

    #[error("node {node} is still attached and cannot be finalized")]
    StillAttached { node: NodeId },

    #[error("node {node} was finalized and must not be used")]
    StaleNode { node: NodeId },

    #[error("{kind:?} expects {expected}, got {actual} for slot '{slot}'")]
    SchemaMismatch {
        kind: NodeKind,
        slot: &'static str,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("{kind:?} expects {expected} slots, got {actual}")]
    SlotCount {
        kind: NodeKind,
        expected: usize,
        actual: usize,
    },

    #[error("node {child} claims parent {parent}, which does not hold it")]
    CorruptedParent { parent: NodeId, child: NodeId },

    #[error("node {node} is reachable through more than one parent")]
    MultipleParents { node: NodeId },

    #[error("{kind:?} has no slot '{slot}'")]
    UnknownSlot { kind: NodeKind, slot: String },

    #[error("unknown variable {variable}")]
    UnknownVariable { variable: VariableId },

    #[error("tree has no root")]
    MissingRoot,

    #[error("invalid payload for {kind:?}: {message}")]
    InvalidPayload { kind: NodeKind, message: String },
}

pub type Result<T> = std::result::Result<T, CoreError>;
