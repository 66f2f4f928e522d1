//! Optimization module
//!
//! This module provides the visitors that rewrite a module tree and the
//! driver that runs them until the tree is stable.

pub mod builtin_spec;
pub mod compute;
pub mod dispatch;
pub mod driver;
pub mod precompute;
pub mod replace_builtins;
pub mod replace_exceptions;
pub mod replacements;
pub mod signal;
pub mod simulate;
pub mod variables;
pub mod visitor;

// Re-export for convenience
pub use builtin_spec::{BoundArguments, BuiltinParameterSpec};
pub use compute::{compute_expression, ComputeResult};
pub use dispatch::Dispatcher;
pub use driver::{DriverState, FixedPointDriver, OptimizationReport};
pub use precompute::ConstantFoldingVisitor;
pub use replace_builtins::BuiltinReplacementVisitor;
pub use replace_exceptions::ExceptionNameVisitor;
pub use signal::{ChangeLog, ChangeSignal, ChangeTags};
pub use variables::annotate_read_only;
pub use visitor::{OptimizationVisitor, VisitContext};
