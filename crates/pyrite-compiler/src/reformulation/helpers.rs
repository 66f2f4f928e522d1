//! Small tree-building helpers shared by the reformulations

use crate::error::Result;
use pyrite_core::ast::VariableKind;
use pyrite_core::{NodeId, NodeKind, Payload, SourceRef, Tree, VariableId};

/// Private name mangling: `__x` inside class `C` is `_C__x`.
///
/// Dunder names and names in classes made only of underscores stay as is.
pub fn mangle_name(name: &str, class_name: &str) -> String {
    if !name.starts_with("__") || name.ends_with("__") || name.contains('.') {
        return name.to_string();
    }

    let class_name = class_name.trim_start_matches('_');
    if class_name.is_empty() {
        return name.to_string();
    }
    format!("_{}{}", class_name, name)
}

/// Variable an assignment to `name` in `provider` binds, declared on first
/// use. Module level names are module variables, anything else is local.
pub fn binding_variable(tree: &mut Tree, provider: NodeId, name: &str) -> Result<VariableId> {
    let (name, kind) = match tree.kind(provider)? {
        NodeKind::Module => (name.to_string(), VariableKind::Module),
        NodeKind::ClassBody => {
            let class_name = match tree.payload(provider)? {
                Payload::Scope { name: class_name } => class_name.clone(),
                _ => String::new(),
            };
            (mangle_name(name, &class_name), VariableKind::Local)
        }
        _ => (name.to_string(), VariableKind::Local),
    };

    let existing = tree
        .variables()
        .find(|(_, variable)| {
            variable.owner() == provider && variable.name() == name && variable.kind() == kind
        })
        .map(|(id, _)| id);
    match existing {
        Some(id) => Ok(id),
        None => Ok(tree.declare_variable(provider, name, kind)?),
    }
}

/// A single statement stays as is, several become a sequence
pub fn make_statements_or_statement(
    tree: &mut Tree,
    mut statements: Vec<NodeId>,
    source_ref: SourceRef,
) -> Result<NodeId> {
    if statements.len() == 1 {
        if let Some(statement) = statements.pop() {
            return Ok(statement);
        }
    }
    Ok(tree.make_statements(statements, source_ref)?)
}
