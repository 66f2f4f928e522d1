//! Pyrite Core - Node model and value types for the Pyrite optimizer
//!
//! This crate provides the data the optimization passes work on:
//! - The node arena with its replacement protocol
//! - Variables and their read-only indicators
//! - Constant values with language-level rendering
//! - Module names and lookup results
//! - Error types

pub mod ast;
pub mod error;
pub mod module_name;
pub mod source;
pub mod types;

// Re-export commonly used types
pub use ast::{Capabilities, NodeId, NodeKind, Payload, Tree, VariableId};
pub use error::{CoreError, Result};
pub use module_name::{ModuleFinding, ModuleName};
pub use source::SourceRef;
pub use types::{Constant, ExceptionKind, PythonVersion};
