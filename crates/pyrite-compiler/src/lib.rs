//! Pyrite Compiler - optimization passes over the Pyrite node tree
//!
//! This crate lowers import statements into primitive nodes and rewrites a
//! module tree until no pass changes it any more:
//! - Builtin call specialization and exception name replacement
//! - Constant folding of builtin operations
//! - Static module imports and hard imports
//! - A fixed-point driver reporting every change it made

pub mod compiler;
pub mod error;
pub mod hard_imports;
pub mod module_resolver;
pub mod optimizer;
pub mod reformulation;
pub mod trace;

// Re-export main types
pub use compiler::{Compiler, CompilerOptions};
pub use error::{CompileError, Result, SyntaxError};

// Re-export module resolution types
pub use module_resolver::{ModuleLocator, StandardLocator, StaticLocator};

// Re-export optimizer types
pub use optimizer::{
    ChangeLog, ChangeSignal, ChangeTags, FixedPointDriver, OptimizationReport, OptimizationVisitor,
};

// Re-export reformulation types
pub use reformulation::{ImportAlias, ImportStatement, ImportedNames, ModuleReformulation};
pub use trace::TraceCollection;
