//! Builtin exception names and quick names
//!
//! A read-only reference to a builtin exception name is the exception type
//! itself. `None`, `True` and `False` are names in Python 2 but never
//! rebound in practice; read-only references become constants.

use super::dispatch::Dispatcher;
use super::signal::ChangeTags;
use super::visitor::{OptimizationVisitor, VisitContext};
use crate::error::Result;
use pyrite_core::{Constant, ExceptionKind, NodeId};

pub struct ExceptionNameVisitor {
    quick_names: Dispatcher<&'static str, Constant>,
}

impl ExceptionNameVisitor {
    pub fn new() -> Self {
        let quick_names = Dispatcher::new()
            .with_handler("None", Constant::None)
            .with_handler("True", Constant::Bool(true))
            .with_handler("False", Constant::Bool(false));

        Self { quick_names }
    }
}

impl Default for ExceptionNameVisitor {
    fn default() -> Self {
        Self::new()
    }
}

impl OptimizationVisitor for ExceptionNameVisitor {
    fn name(&self) -> &'static str {
        "exception name replacement"
    }

    fn on_enter_node(&self, cx: &mut VisitContext<'_>, node: NodeId) -> Result<NodeId> {
        let Some(variable) = cx.read_only_variable(node) else {
            return Ok(node);
        };
        let name = cx.tree.variable(variable)?.name().to_string();
        let source_ref = cx.tree.source_ref(node)?.clone();

        let (replacement, tags, message) = if let Some(value) = self.quick_names.lookup(name.as_str()) {
            (
                cx.tree.make_constant(value.clone(), source_ref.clone())?,
                ChangeTags::NEW_CONSTANT,
                format!("Replaced read-only module variable '{}' with constant value.", name),
            )
        } else if let Some(kind) = ExceptionKind::from_name(&name, cx.version()) {
            (
                cx.tree.make_exception_ref(kind, source_ref.clone())?,
                ChangeTags::NEW_RAISE | ChangeTags::NEW_VARIABLE,
                format!(
                    "Replaced access to read only module variable with exception '{}'.",
                    name
                ),
            )
        } else {
            return Ok(node);
        };

        cx.replace_node(node, replacement)?;
        cx.signal_change(tags, &source_ref, message);
        cx.reconsider_variable(variable, &source_ref)?;
        Ok(replacement)
    }
}
