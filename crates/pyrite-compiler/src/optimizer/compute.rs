//! Compute entry points of node kinds
//!
//! Runs after a node's children were visited. A node reports what control
//! flow may do when it is evaluated and may offer a replacement for itself.

use super::builtin_spec::{self, BoundArguments, BuiltinParameterSpec};
use super::signal::ChangeTags;
use super::simulate::Fault;
use super::visitor::VisitContext;
use crate::error::Result;
use crate::hard_imports::{self, is_hard_module};
use pyrite_core::ast::{HardImportSpec, Payload};
use pyrite_core::{Capabilities, Constant, ExceptionKind, ModuleFinding, ModuleName, NodeId, NodeKind, Tree};

/// Outcome of computing a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputeResult {
    /// The node to use from now on, detached if it differs from the input
    pub node: NodeId,
    /// `None` when nothing changed
    pub tags: Option<ChangeTags>,
    pub description: Option<String>,
}

impl ComputeResult {
    pub fn unchanged(node: NodeId) -> Self {
        Self {
            node,
            tags: None,
            description: None,
        }
    }

    pub fn changed(node: NodeId, tags: ChangeTags, description: impl Into<String>) -> Self {
        Self {
            node,
            tags: Some(tags),
            description: Some(description.into()),
        }
    }

    pub fn is_changed(&self) -> bool {
        self.tags.is_some()
    }
}

pub fn compute_expression(cx: &mut VisitContext<'_>, node: NodeId) -> Result<ComputeResult> {
    let kind = cx.tree.kind(node)?;
    let source_ref = cx.tree.source_ref(node)?.clone();

    match kind {
        NodeKind::RaiseException => {
            if let Payload::Raise(raised) = cx.tree.payload(node)? {
                let exception = raised.kind;
                cx.trace.on_exception_raise_exit(exception, &source_ref);
            }
            cx.trace.on_abortive();
            Ok(ComputeResult::unchanged(node))
        }
        NodeKind::SideEffects => compute_side_effects(cx.tree, node),
        NodeKind::BuiltinVars => {
            cx.trace
                .on_exception_raise_exit(ExceptionKind::BaseException, &source_ref);
            Ok(ComputeResult::unchanged(node))
        }
        NodeKind::BuiltinRange => {
            let result = fold_builtin(cx, node, &builtin_spec::RANGE)?;
            if !result.is_changed() {
                cx.trace
                    .on_exception_raise_exit(ExceptionKind::BaseException, &source_ref);
            }
            Ok(result)
        }
        NodeKind::ImportModule => compute_import_module(cx, node),
        NodeKind::ImportName => compute_import_name(cx, node),
        NodeKind::ImportModuleNameHardMaybeExists => {
            cx.trace
                .on_exception_raise_exit(ExceptionKind::AttributeError, &source_ref);
            Ok(ComputeResult::unchanged(node))
        }
        _ => {
            if cx.tree.capabilities(node)?.contains(Capabilities::MAY_RAISE) {
                cx.trace
                    .on_exception_raise_exit(ExceptionKind::BaseException, &source_ref);
            }
            Ok(ComputeResult::unchanged(node))
        }
    }
}

/// Drop side effects that have none; without any left only the expression
/// remains.
fn compute_side_effects(tree: &mut Tree, node: NodeId) -> Result<ComputeResult> {
    let mut dropped = Vec::new();
    for side_effect in tree.children_in(node, "side_effects")?.to_vec() {
        if !tree.may_have_side_effects(side_effect)? && !tree.may_raise(side_effect)? {
            dropped.push(side_effect);
        }
    }
    if dropped.is_empty() {
        return Ok(ComputeResult::unchanged(node));
    }

    for side_effect in &dropped {
        tree.detach(*side_effect)?;
        tree.finalize(*side_effect)?;
    }

    if tree.children_in(node, "side_effects")?.is_empty() {
        if let Some(expression) = tree.detach_slot(node, "expression")? {
            return Ok(ComputeResult::changed(
                expression,
                ChangeTags::NEW_EXPRESSION,
                "Side effects removed, only the expression remains.",
            ));
        }
    }
    Ok(ComputeResult::changed(
        node,
        ChangeTags::NEW_EXPRESSION,
        format!("Removed {} side effect free expressions.", dropped.len()),
    ))
}

/// Operands of a builtin operation bound to its parameters, `None` unless
/// every operand is a constant.
pub fn constant_arguments(tree: &Tree, node: NodeId) -> Result<Option<BoundArguments<Constant>>> {
    let kind = tree.kind(node)?;

    if kind == NodeKind::BuiltinDict {
        let pos_arg = match tree.child(node, "pos_arg")? {
            Some(argument) => match tree.constant(argument) {
                Some(value) => Some(value.clone()),
                None => return Ok(None),
            },
            None => None,
        };

        let mut arguments = BoundArguments::from_values(vec![pos_arg]);
        for pair in tree.children_in(node, "pairs")? {
            let key = tree.child(*pair, "key")?.and_then(|key| tree.constant(key));
            let value = tree.child(*pair, "value")?.and_then(|value| tree.constant(value));
            match (key, value) {
                (Some(Constant::Str(key)), Some(value)) => {
                    arguments.star_dict.push((key.clone(), value.clone()))
                }
                _ => return Ok(None),
            }
        }
        return Ok(Some(arguments));
    }

    let mut values = Vec::with_capacity(kind.slots().len());
    for slot in kind.slots() {
        match tree.child(node, slot.name)? {
            Some(operand) => match tree.constant(operand) {
                Some(value) => values.push(Some(value.clone())),
                None => return Ok(None),
            },
            None => values.push(None),
        }
    }
    Ok(Some(BoundArguments::from_values(values)))
}

/// Replace a builtin operation over constants with its result, or with the
/// exception it raises.
pub fn fold_builtin(
    cx: &mut VisitContext<'_>,
    node: NodeId,
    spec: &BuiltinParameterSpec,
) -> Result<ComputeResult> {
    let Some(simulate) = spec.simulate else {
        return Ok(ComputeResult::unchanged(node));
    };
    let Some(arguments) = constant_arguments(cx.tree, node)? else {
        return Ok(ComputeResult::unchanged(node));
    };
    let source_ref = cx.tree.source_ref(node)?.clone();

    match simulate(&arguments, cx.version()) {
        Ok(value) => {
            let constant = cx.tree.make_constant(value, source_ref)?;
            Ok(ComputeResult::changed(
                constant,
                ChangeTags::NEW_CONSTANT,
                format!("Built-in call to '{}' pre-computed.", spec.name()),
            ))
        }
        Err(Fault::Raise(raised)) => {
            let description = format!(
                "Built-in call to '{}' pre-computed to raise {}.",
                spec.name(),
                raised.kind.name()
            );
            cx.trace.on_exception_raise_exit(raised.kind, &source_ref);
            let raise = cx.tree.make_raise(raised, source_ref)?;
            Ok(ComputeResult::changed(raise, ChangeTags::NEW_RAISE, description))
        }
        Err(Fault::Decline) => Ok(ComputeResult::unchanged(node)),
    }
}

/// Package relative imports of the module being compiled resolve against
fn parent_package(tree: &Tree) -> Option<ModuleName> {
    let root = tree.root()?;
    match tree.payload(root).ok()? {
        Payload::Scope { name } => ModuleName::new(name.as_str()).package_name(),
        _ => None,
    }
}

fn compute_import_module(cx: &mut VisitContext<'_>, node: NodeId) -> Result<ComputeResult> {
    let source_ref = cx.tree.source_ref(node)?.clone();
    let Payload::Import(spec) = cx.tree.payload(node)?.clone() else {
        return Ok(ComputeResult::unchanged(node));
    };

    let package = parent_package(cx.tree);
    let (resolved, finding) = cx.locator.locate(&spec.module_name, package.as_ref(), spec.level);

    if finding == ModuleFinding::NotFound {
        cx.trace
            .on_exception_raise_exit(ExceptionKind::ImportError, &source_ref);
        return Ok(ComputeResult::unchanged(node));
    }

    if resolved == spec.module_name && is_hard_module(&resolved) {
        let hard = hard_imports::make_import_hard(cx.tree, cx.locator, &resolved, source_ref)?;
        return Ok(ComputeResult::changed(
            hard,
            ChangeTags::NEW_IMPORT,
            format!("Import of hard module '{}' made static.", resolved),
        ));
    }

    if finding == ModuleFinding::BuiltIn {
        let narrowed = Capabilities::EXPRESSION | Capabilities::IMPORT;
        if cx.tree.capabilities(node)? != narrowed {
            cx.tree.set_capability_override(node, narrowed)?;
        }
        return Ok(ComputeResult::unchanged(node));
    }

    // Executing the module may raise anything.
    cx.trace
        .on_exception_raise_exit(ExceptionKind::BaseException, &source_ref);
    Ok(ComputeResult::unchanged(node))
}

fn compute_import_name(cx: &mut VisitContext<'_>, node: NodeId) -> Result<ComputeResult> {
    let source_ref = cx.tree.source_ref(node)?.clone();
    let Payload::ImportName { name, .. } = cx.tree.payload(node)?.clone() else {
        return Ok(ComputeResult::unchanged(node));
    };

    let module = cx.tree.child(node, "module")?;
    let hard_module = match module.map(|module| cx.tree.payload(module)).transpose()? {
        Some(Payload::HardImport(HardImportSpec {
            module_name,
            import_name: None,
            ..
        })) => Some(module_name.clone()),
        _ => None,
    };
    let Some(module_name) = hard_module else {
        cx.trace
            .on_exception_raise_exit(ExceptionKind::ImportError, &source_ref);
        return Ok(ComputeResult::unchanged(node));
    };

    let version = cx.version();
    let replacement =
        hard_imports::make_import_name_hard(cx.tree, cx.locator, &module_name, &name, version, source_ref.clone())?;
    if cx.tree.kind(replacement)? == NodeKind::ImportModuleNameHardMaybeExists {
        cx.trace
            .on_exception_raise_exit(ExceptionKind::AttributeError, &source_ref);
    }
    Ok(ComputeResult::changed(
        replacement,
        ChangeTags::NEW_IMPORT,
        format!("Import of '{}' from hard module '{}' made static.", name, module_name),
    ))
}
