//! Node model for Pyrite
//!
//! This module contains the mutable tree the optimizer works on:
//! - Node kinds with their slot schema and capabilities
//! - Nodes and kind-specific payloads
//! - Variables shared between referencing nodes
//! - The arena owning both, with the replacement protocol

pub mod kind;
pub mod make;
pub mod node;
pub mod tree;
pub mod variable;

pub use kind::{Arity, Capabilities, NodeKind, SlotSpec};
pub use node::{
    HardImportSpec, ImportSpec, Node, NodeId, Payload, RaisedException, SlotValue, UnaryOperator,
};
pub use tree::Tree;
pub use variable::{Variable, VariableId, VariableKind};
