//! Building blocks for replacement subtrees

use super::builtin_spec::{BoundArguments, BuiltinParameterSpec};
use super::signal::ChangeTags;
use crate::error::Result;
use pyrite_core::ast::{RaisedException, UnaryOperator};
use pyrite_core::{Constant, NodeId, NodeKind, Payload, SourceRef, Tree, VariableId};

/// A call to a builtin through a read-only name, as written in the source
#[derive(Debug, Clone)]
pub struct CallSite {
    pub call: NodeId,
    pub variable: VariableId,
    pub name: String,
    pub positional: Vec<NodeId>,
    /// Keyword name and value node
    pub keywords: Vec<(String, NodeId)>,
    pub source_ref: SourceRef,
}

impl CallSite {
    /// Read the arguments of `call`. `None` if the call uses star
    /// arguments or a keyword that is not a plain name.
    pub fn read(tree: &Tree, call: NodeId, variable: VariableId, name: &str) -> Result<Option<CallSite>> {
        if tree.child(call, "list_star_arg")?.is_some() || tree.child(call, "dict_star_arg")?.is_some() {
            return Ok(None);
        }

        let mut keywords = Vec::new();
        for pair in tree.children_in(call, "pairs")? {
            let key = tree.child(*pair, "key")?;
            let value = tree.child(*pair, "value")?;
            match (key.and_then(|key| tree.constant(key)), value) {
                (Some(Constant::Str(keyword)), Some(value)) => keywords.push((keyword.clone(), value)),
                _ => return Ok(None),
            }
        }

        Ok(Some(CallSite {
            call,
            variable,
            name: name.to_string(),
            positional: tree.children_in(call, "positional_args")?.to_vec(),
            keywords,
            source_ref: tree.source_ref(call)?.clone(),
        }))
    }

    /// Every argument in evaluation order
    pub fn arguments(&self) -> Vec<NodeId> {
        self.positional
            .iter()
            .copied()
            .chain(self.keywords.iter().map(|(_, value)| *value))
            .collect()
    }

    pub fn bind(&self, spec: &BuiltinParameterSpec) -> std::result::Result<BoundArguments<NodeId>, String> {
        spec.bind(self.positional.clone(), self.keywords.clone())
    }
}

/// Detach an argument so it can move into the replacement
pub fn take(tree: &mut Tree, argument: Option<NodeId>) -> Result<Option<NodeId>> {
    match argument {
        Some(node) => Ok(Some(tree.detach(node)?)),
        None => Ok(None),
    }
}

/// Detach the bound argument at `index`
pub fn take_bound(tree: &mut Tree, bound: &mut BoundArguments<NodeId>, index: usize) -> Result<Option<NodeId>> {
    take(tree, bound.take(index))
}

/// An expression raising `raised` after evaluating those `arguments` that
/// may have an effect, in their original order. The others are discarded.
pub fn raise_with_side_effects(
    tree: &mut Tree,
    raised: RaisedException,
    arguments: Vec<NodeId>,
    source_ref: SourceRef,
) -> Result<NodeId> {
    let mut kept = Vec::new();
    for argument in arguments {
        tree.detach(argument)?;
        if tree.may_have_side_effects(argument)? || tree.may_raise(argument)? {
            kept.push(argument);
        } else {
            tree.finalize(argument)?;
        }
    }

    let raise = tree.make_raise(raised, source_ref.clone())?;
    if kept.is_empty() {
        Ok(raise)
    } else {
        Ok(tree.make_side_effects(kept, raise, source_ref)?)
    }
}

/// The `TypeError` a call raises, keeping the argument effects
pub fn type_error_call(tree: &mut Tree, site: &CallSite, message: String) -> Result<NodeId> {
    raise_with_side_effects(
        tree,
        RaisedException::new(pyrite_core::ExceptionKind::TypeError, message),
        site.arguments(),
        site.source_ref.clone(),
    )
}

/// Change tags describing a replacement by its resulting kind
pub fn classify_replacement(tree: &Tree, replacement: NodeId) -> Result<ChangeTags> {
    let tags = match tree.kind(replacement)? {
        NodeKind::BuiltinImport => ChangeTags::NEW_BUILTIN | ChangeTags::NEW_IMPORT,
        NodeKind::RaiseException => ChangeTags::NEW_RAISE | ChangeTags::NEW_VARIABLE,
        NodeKind::SideEffects => {
            let expression = tree.child(replacement, "expression")?;
            match expression.map(|node| tree.kind(node)).transpose()? {
                Some(NodeKind::RaiseException) => ChangeTags::NEW_RAISE | ChangeTags::NEW_VARIABLE,
                _ => ChangeTags::NEW_EXPRESSION,
            }
        }
        NodeKind::OperationUnary => match tree.payload(replacement)? {
            Payload::Unary(UnaryOperator::Repr) => ChangeTags::NEW_EXPRESSION,
            _ => ChangeTags::NEW_BUILTIN,
        },
        NodeKind::ConstantRef => ChangeTags::NEW_CONSTANT,
        _ => ChangeTags::NEW_BUILTIN,
    };
    Ok(tags)
}
