//! Type system for Pyrite
//!
//! This module contains the compile-time view of runtime values:
//! - Constant values and their language-level rendering
//! - Builtin names and the builtin exception hierarchy
//! - Language version selection

pub mod builtins;
pub mod value;
pub mod version;

pub use builtins::{is_builtin_exception_name, is_builtin_name, ExceptionKind};
pub use value::Constant;
pub use version::PythonVersion;
