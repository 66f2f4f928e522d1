//! Visitor protocol shared by the optimization passes

use crate::compiler::CompilerOptions;
use crate::error::Result;
use crate::module_resolver::ModuleLocator;
use crate::optimizer::signal::{ChangeLog, ChangeTags};
use crate::trace::TraceCollection;
use pyrite_core::ast::VariableKind;
use pyrite_core::{NodeId, NodeKind, PythonVersion, SourceRef, Tree, VariableId};

/// Everything a visitor may look at or change while one unit is walked
pub struct VisitContext<'a> {
    pub tree: &'a mut Tree,
    pub trace: &'a mut TraceCollection,
    pub changes: &'a mut ChangeLog,
    pub options: &'a CompilerOptions,
    pub locator: &'a dyn ModuleLocator,
}

impl VisitContext<'_> {
    pub fn version(&self) -> PythonVersion {
        self.options.python_version
    }

    pub fn signal_change(&mut self, tags: ChangeTags, source_ref: &SourceRef, message: impl Into<String>) {
        self.changes.signal_change(tags, source_ref, message);
    }

    /// Put `new` where `old` is and tear `old` down.
    pub fn replace_node(&mut self, old: NodeId, new: NodeId) -> Result<()> {
        self.tree.replace_with(old, new)?;
        self.tree.finalize(old)?;
        Ok(())
    }

    /// Recount the usage of a variable that lost a reference. Function
    /// locals report it as a change of their own.
    pub fn reconsider_variable(&mut self, variable: VariableId, source_ref: &SourceRef) -> Result<()> {
        self.tree.reconsider_variable(variable)?;
        let owner = self.tree.variable(variable)?.owner();
        if self.tree.kind(owner)? == NodeKind::FunctionBody {
            let name = self.tree.variable(variable)?.name().to_string();
            self.signal_change(
                ChangeTags::VAR_USAGE,
                source_ref,
                format!("Reduced scope of variable '{}'.", name),
            );
        }
        Ok(())
    }

    /// Variable referenced by `node` if it is a read-only global or a
    /// read-only maybe-local
    pub fn read_only_variable(&self, node: NodeId) -> Option<VariableId> {
        if self.tree.get(node)?.kind() != NodeKind::VariableRef {
            return None;
        }
        let id = self.tree.variable_of(node)?;
        let variable = self.tree.variable(id).ok()?;

        let eligible = matches!(variable.kind(), VariableKind::Module | VariableKind::MaybeLocal);
        (eligible && variable.is_read_only()).then_some(id)
    }
}

/// A pass that inspects every node in pre-order
pub trait OptimizationVisitor {
    fn name(&self) -> &'static str;

    /// Inspect `node` and possibly replace it. Returns the node that now
    /// occupies its position.
    fn on_enter_node(&self, cx: &mut VisitContext<'_>, node: NodeId) -> Result<NodeId>;
}
