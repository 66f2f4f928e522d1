//! Constant folding of builtin operations
//!
//! Runs on nodes that already are a specific builtin operation. When every
//! operand is a constant the builtin is computed at compile time.

use super::builtin_spec;
use super::compute::{compute_expression, fold_builtin, ComputeResult};
use super::dispatch::Dispatcher;
use super::signal::ChangeTags;
use super::visitor::{OptimizationVisitor, VisitContext};
use crate::error::Result;
use pyrite_core::ast::{ImportSpec, Payload};
use pyrite_core::types::is_builtin_name;
use pyrite_core::{Constant, ModuleName, NodeId, NodeKind};

type FoldHandler = fn(&mut VisitContext<'_>, NodeId, &'static str) -> Result<ComputeResult>;

pub struct ConstantFoldingVisitor {
    dispatcher: Dispatcher<&'static str, FoldHandler>,
}

impl ConstantFoldingVisitor {
    pub fn new() -> Self {
        let mut dispatcher = Dispatcher::new()
            .with_handler("type1", fold_type1 as FoldHandler)
            .with_handler("range", fold_range)
            .with_handler("import", fold_import);
        for key in [
            "chr", "ord", "bin", "oct", "hex", "len", "tuple", "list", "dict", "float", "str", "bool",
            "int", "long",
        ] {
            dispatcher.register(key, fold_simulated);
        }

        Self { dispatcher }
    }
}

impl Default for ConstantFoldingVisitor {
    fn default() -> Self {
        Self::new()
    }
}

impl OptimizationVisitor for ConstantFoldingVisitor {
    fn name(&self) -> &'static str {
        "constant folding"
    }

    fn on_enter_node(&self, cx: &mut VisitContext<'_>, node: NodeId) -> Result<NodeId> {
        let Some(key) = cx.tree.kind(node)?.builtin_key() else {
            return Ok(node);
        };
        let Some(handler) = self.dispatcher.lookup(key) else {
            return Ok(node);
        };

        let result = handler(cx, node, key)?;
        let Some(tags) = result.tags else {
            return Ok(node);
        };

        let source_ref = cx.tree.source_ref(node)?.clone();
        if result.node != node {
            cx.replace_node(node, result.node)?;
        }
        cx.signal_change(tags, &source_ref, result.description.unwrap_or_default());
        Ok(result.node)
    }
}

fn fold_simulated(cx: &mut VisitContext<'_>, node: NodeId, key: &'static str) -> Result<ComputeResult> {
    match builtin_spec::for_key(key) {
        Some(spec) => fold_builtin(cx, node, spec),
        None => Ok(ComputeResult::unchanged(node)),
    }
}

fn fold_range(cx: &mut VisitContext<'_>, node: NodeId, _key: &'static str) -> Result<ComputeResult> {
    compute_expression(cx, node)
}

/// `type(x)` of a constant is a reference to the builtin type.
fn fold_type1(cx: &mut VisitContext<'_>, node: NodeId, _key: &'static str) -> Result<ComputeResult> {
    let Some(value) = cx.tree.child(node, "value")?.and_then(|value| cx.tree.constant(value)) else {
        return Ok(ComputeResult::unchanged(node));
    };
    if *value == Constant::None {
        return Ok(ComputeResult::unchanged(node));
    }

    let version = cx.version();
    let type_name = value.type_name(version);
    if !is_builtin_name(type_name, version) {
        return Ok(ComputeResult::unchanged(node));
    }

    let source_ref = cx.tree.source_ref(node)?.clone();
    let reference = cx.tree.make_builtin_ref(type_name, source_ref)?;
    Ok(ComputeResult::changed(
        reference,
        ChangeTags::NEW_BUILTIN,
        format!("Replaced predictable type lookup with builtin type '{}'.", type_name),
    ))
}

/// `__import__` with constant arguments is a static module import.
fn fold_import(cx: &mut VisitContext<'_>, node: NodeId, _key: &'static str) -> Result<ComputeResult> {
    for slot in ["globals", "locals"] {
        if let Some(argument) = cx.tree.child(node, slot)? {
            if cx.tree.may_have_side_effects(argument)? {
                return Ok(ComputeResult::unchanged(node));
            }
        }
    }

    let constant = |slot: &str| -> Result<Option<Option<Constant>>> {
        Ok(match cx.tree.child(node, slot)? {
            Some(argument) => cx.tree.constant(argument).cloned().map(Some),
            None => Some(None),
        })
    };
    let (Some(Some(Constant::Str(name))), Some(fromlist), Some(level)) =
        (constant("name")?, constant("fromlist")?, constant("level")?)
    else {
        return Ok(ComputeResult::unchanged(node));
    };

    let import_list = match fromlist {
        None | Some(Constant::None) => Vec::new(),
        Some(Constant::Tuple(items)) | Some(Constant::List(items)) => {
            let mut names = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Constant::Str(name) => names.push(name),
                    _ => return Ok(ComputeResult::unchanged(node)),
                }
            }
            names
        }
        Some(_) => return Ok(ComputeResult::unchanged(node)),
    };
    let level = match level {
        None => cx.version().default_import_level(),
        Some(value) => match value.as_int() {
            Some(level) => level,
            None => return Ok(ComputeResult::unchanged(node)),
        },
    };

    let source_ref = cx.tree.source_ref(node)?.clone();
    let import = cx.tree.new_node(
        NodeKind::ImportModule,
        source_ref,
        Payload::Import(ImportSpec {
            module_name: ModuleName::new(name.as_str()),
            import_list,
            level,
        }),
        vec![],
    )?;
    Ok(ComputeResult::changed(
        import,
        ChangeTags::NEW_IMPORT,
        format!("Replaced __import__ call with module import of '{}'.", name),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_simulated_key_has_a_spec() {
        let visitor = ConstantFoldingVisitor::new();
        for key in ["chr", "len", "dict", "long", "range", "type1", "import"] {
            assert!(visitor.dispatcher.contains(key), "{}", key);
        }
        for key in ["chr", "ord", "bin", "oct", "hex", "len", "tuple", "list", "dict", "float"] {
            assert!(builtin_spec::for_key(key).and_then(|spec| spec.simulate).is_some());
        }
        assert!(!visitor.dispatcher.contains("iter1"));
    }
}
