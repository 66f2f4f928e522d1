//! Read-only analysis of variables
//!
//! A module variable is read-only when nothing in the whole tree assigns or
//! deletes it and no module-level star import could rebind it. A maybe-local
//! variable is read-only when its scope never binds the name and the module
//! variable of the same name is read-only.

use crate::error::Result;
use pyrite_core::ast::VariableKind;
use pyrite_core::{NodeId, NodeKind, Tree, VariableId};
use std::collections::HashSet;
use tracing::trace;

/// Recompute the read-only indicator of every variable. Returns the number
/// of read-only variables.
pub fn annotate_read_only(tree: &mut Tree) -> Result<usize> {
    let Some(root) = tree.root() else {
        return Ok(0);
    };

    let mut written: HashSet<VariableId> = HashSet::new();
    let mut module_star_import = false;
    for node in tree.walk(root)? {
        match tree.kind(node)? {
            NodeKind::StatementAssignmentVariable | NodeKind::StatementReleaseVariable => {
                if let Some(variable) = tree.variable_of(node) {
                    written.insert(variable);
                }
            }
            NodeKind::StatementImportStar => {
                if tree.provider_of(node)? == Some(root) {
                    module_star_import = true;
                }
            }
            _ => {}
        }
    }

    // (owner, name) pairs bound somewhere
    let bound_names: HashSet<(NodeId, String)> = written
        .iter()
        .filter_map(|id| tree.variable(*id).ok())
        .map(|variable| (variable.owner(), variable.name().to_string()))
        .collect();

    let module_read_only = |tree: &Tree, name: &str| -> bool {
        match tree.find_variable(root, name) {
            Some(module_variable) => !written.contains(&module_variable) && !module_star_import,
            None => !module_star_import,
        }
    };

    let mut decisions = Vec::new();
    for (id, variable) in tree.variables() {
        let read_only = match variable.kind() {
            VariableKind::Module => !written.contains(&id) && !module_star_import,
            VariableKind::MaybeLocal => {
                !bound_names.contains(&(variable.owner(), variable.name().to_string()))
                    && module_read_only(tree, variable.name())
            }
            VariableKind::Local | VariableKind::Temp => false,
        };
        decisions.push((id, read_only));
    }

    let mut count = 0;
    for (id, read_only) in decisions {
        tree.set_read_only(id, read_only)?;
        if read_only {
            count += 1;
        }
    }
    trace!(read_only = count, "annotated variables");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pyrite_core::{Constant, SourceRef};

    fn sref() -> SourceRef {
        SourceRef::new("m.py", 1, 0)
    }

    #[test]
    fn test_assigned_module_variable_is_not_read_only() {
        let mut tree = Tree::new();
        let module = tree.make_scope(NodeKind::Module, "m", sref()).unwrap();
        let len = tree.declare_variable(module, "len", VariableKind::Module).unwrap();
        let chr = tree.declare_variable(module, "chr", VariableKind::Module).unwrap();

        let value = tree.make_constant(Constant::Int(1), sref()).unwrap();
        let assign = tree.make_assignment(len, value, sref()).unwrap();
        let body = tree.make_statements(vec![assign], sref()).unwrap();
        tree.set_body(module, body).unwrap();
        tree.set_root(module).unwrap();

        assert_eq!(annotate_read_only(&mut tree).unwrap(), 1);
        assert!(!tree.variable(len).unwrap().is_read_only());
        assert!(tree.variable(chr).unwrap().is_read_only());
    }

    #[test]
    fn test_maybe_local_follows_class_binding() {
        let mut tree = Tree::new();
        let module = tree.make_scope(NodeKind::Module, "m", sref()).unwrap();
        let class = tree.make_scope(NodeKind::ClassBody, "C", sref()).unwrap();
        let maybe = tree.declare_variable(class, "len", VariableKind::MaybeLocal).unwrap();
        let other = tree.declare_variable(class, "chr", VariableKind::MaybeLocal).unwrap();
        let local = tree.declare_variable(class, "len", VariableKind::Local).unwrap();

        let value = tree.make_constant(Constant::Int(1), sref()).unwrap();
        let assign = tree.make_assignment(local, value, sref()).unwrap();
        let class_body = tree.make_statements(vec![assign], sref()).unwrap();
        tree.set_body(class, class_body).unwrap();
        let statement = tree.make_expression_statement(class, sref()).unwrap();
        let body = tree.make_statements(vec![statement], sref()).unwrap();
        tree.set_body(module, body).unwrap();
        tree.set_root(module).unwrap();

        annotate_read_only(&mut tree).unwrap();
        assert!(!tree.variable(maybe).unwrap().is_read_only());
        assert!(tree.variable(other).unwrap().is_read_only());
    }
}
