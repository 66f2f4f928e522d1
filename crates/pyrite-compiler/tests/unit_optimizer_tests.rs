//! Unit tests for the optimization passes
//!
//! Each test builds a small module tree the way the reformulation would,
//! runs the compiler over it and inspects the resulting nodes.

use anyhow::{anyhow, Result};
use pyrite_compiler::{ChangeTags, Compiler, CompilerOptions, OptimizationReport};
use pyrite_core::ast::{RaisedException, VariableKind};
use pyrite_core::{Constant, ExceptionKind, NodeId, NodeKind, Payload, PythonVersion, SourceRef, Tree, VariableId};

fn sref(line: u32) -> SourceRef {
    SourceRef::new("mod.py", line, 0)
}

fn global(tree: &mut Tree, module: NodeId, name: &str) -> Result<VariableId> {
    match tree.find_variable(module, name) {
        Some(variable) => Ok(variable),
        None => Ok(tree.declare_variable(module, name, VariableKind::Module)?),
    }
}

fn constant(tree: &mut Tree, value: Constant) -> Result<NodeId> {
    Ok(tree.make_constant(value, sref(1))?)
}

/// `name(*args)` through the module variable `name`
fn call(tree: &mut Tree, module: NodeId, name: &str, args: Vec<NodeId>) -> Result<NodeId> {
    let variable = global(tree, module, name)?;
    let called = tree.make_variable_ref(variable, sref(1))?;
    Ok(tree.make_call(called, args, vec![], sref(1))?)
}

/// A module assigning each expression to its own variable, one per line.
/// Returns the module and the assignment statements.
fn module_assigning(
    tree: &mut Tree,
    build: impl FnOnce(&mut Tree, NodeId) -> Result<Vec<NodeId>>,
) -> Result<(NodeId, Vec<NodeId>)> {
    let module = tree.make_scope(NodeKind::Module, "mod", sref(1))?;
    let expressions = build(tree, module)?;

    let mut statements = Vec::with_capacity(expressions.len());
    for (index, expression) in expressions.into_iter().enumerate() {
        let target = global(tree, module, &format!("r{}", index))?;
        statements.push(tree.make_assignment(target, expression, sref(index as u32 + 1))?);
    }
    let body = tree.make_statements(statements.clone(), sref(1))?;
    tree.set_body(module, body)?;
    tree.set_root(module)?;
    Ok((module, statements))
}

fn optimize(tree: &mut Tree, options: CompilerOptions) -> Result<OptimizationReport> {
    Ok(Compiler::with_options(options).optimize_module(tree)?)
}

fn source_of(tree: &Tree, assignment: NodeId) -> Result<NodeId> {
    tree.child(assignment, "source")?
        .ok_or_else(|| anyhow!("assignment without source"))
}

fn folded(tree: &Tree, assignment: NodeId) -> Result<Option<Constant>> {
    Ok(tree.constant(source_of(tree, assignment)?).cloned())
}

// =============================================================================
// Constant Folding Tests
// =============================================================================

#[test]
fn test_fold_len_of_tuple() -> Result<()> {
    let mut tree = Tree::new();
    let (_, statements) = module_assigning(&mut tree, |tree, module| {
        let tuple = constant(
            tree,
            Constant::Tuple(vec![Constant::Int(1), Constant::Int(2), Constant::Int(3)]),
        )?;
        Ok(vec![call(tree, module, "len", vec![tuple])?])
    })?;

    let report = optimize(&mut tree, CompilerOptions::default())?;

    assert_eq!(folded(&tree, statements[0])?, Some(Constant::Int(3)));
    assert!(report.changes.tags().contains(ChangeTags::NEW_CONSTANT));
    Ok(())
}

#[test]
fn test_fold_chr_and_int_with_base() -> Result<()> {
    let mut tree = Tree::new();
    let (_, statements) = module_assigning(&mut tree, |tree, module| {
        let code = constant(tree, Constant::Int(65))?;
        let text = constant(tree, Constant::str("10"))?;
        let base = constant(tree, Constant::Int(2))?;
        Ok(vec![
            call(tree, module, "chr", vec![code])?,
            call(tree, module, "int", vec![text, base])?,
        ])
    })?;

    optimize(&mut tree, CompilerOptions::default())?;

    assert_eq!(folded(&tree, statements[0])?, Some(Constant::str("A")));
    assert_eq!(folded(&tree, statements[1])?, Some(Constant::Int(2)));
    Ok(())
}

#[test]
fn test_fold_type_of_constant() -> Result<()> {
    let mut tree = Tree::new();
    let (_, statements) = module_assigning(&mut tree, |tree, module| {
        let value = constant(tree, Constant::Int(1))?;
        Ok(vec![call(tree, module, "type", vec![value])?])
    })?;

    optimize(&mut tree, CompilerOptions::default())?;

    let source = source_of(&tree, statements[0])?;
    assert_eq!(tree.kind(source)?, NodeKind::BuiltinRef);
    assert_eq!(tree.payload(source)?, &Payload::Name("int".to_string()));
    Ok(())
}

#[test]
fn test_dict_arity_error_folds_to_raise() -> Result<()> {
    let mut tree = Tree::new();
    let (_, statements) = module_assigning(&mut tree, |tree, module| {
        let one = constant(tree, Constant::Int(1))?;
        let two = constant(tree, Constant::Int(2))?;
        Ok(vec![call(tree, module, "dict", vec![one, two])?])
    })?;

    let report = optimize(&mut tree, CompilerOptions::default())?;

    let source = source_of(&tree, statements[0])?;
    assert_eq!(tree.kind(source)?, NodeKind::RaiseException);
    assert!(tree.always_raises(source)?);
    assert_eq!(
        tree.payload(source)?,
        &Payload::Raise(RaisedException::new(
            ExceptionKind::TypeError,
            "dict expected at most 1 arguments, got 2"
        ))
    );
    assert!(report.changes.tags().contains(ChangeTags::NEW_RAISE));
    Ok(())
}

#[test]
fn test_folding_disabled_keeps_builtin_node() -> Result<()> {
    let mut tree = Tree::new();
    let (_, statements) = module_assigning(&mut tree, |tree, module| {
        let text = constant(tree, Constant::str("abc"))?;
        Ok(vec![call(tree, module, "len", vec![text])?])
    })?;

    optimize(&mut tree, CompilerOptions::new().with_constant_folding(false))?;

    let source = source_of(&tree, statements[0])?;
    assert_eq!(tree.kind(source)?, NodeKind::BuiltinLen);
    Ok(())
}

// =============================================================================
// Builtin Replacement Tests
// =============================================================================

#[test]
fn test_shadowed_builtin_is_not_folded() -> Result<()> {
    let mut tree = Tree::new();
    let module = tree.make_scope(NodeKind::Module, "mod", sref(1))?;
    let len = global(&mut tree, module, "len")?;
    let result = global(&mut tree, module, "result")?;

    // def len(x): ...
    let function = tree.make_scope(NodeKind::FunctionBody, "len", sref(1))?;
    let define = tree.make_assignment(len, function, sref(1))?;

    let tuple = constant(&mut tree, Constant::Tuple(vec![Constant::Int(1)]))?;
    let called = tree.make_variable_ref(len, sref(2))?;
    let use_len = tree.make_call(called, vec![tuple], vec![], sref(2))?;
    let assign = tree.make_assignment(result, use_len, sref(2))?;

    let body = tree.make_statements(vec![define, assign], sref(1))?;
    tree.set_body(module, body)?;
    tree.set_root(module)?;

    let report = optimize(&mut tree, CompilerOptions::default())?;

    assert_eq!(source_of(&tree, assign)?, use_len);
    assert_eq!(tree.kind(use_len)?, NodeKind::FunctionCall);
    assert!(report.changes.is_empty());
    assert_eq!(report.passes, 1);
    Ok(())
}

#[test]
fn test_critical_replacement_runs_when_optional_is_disabled() -> Result<()> {
    let mut tree = Tree::new();
    let (_, statements) = module_assigning(&mut tree, |tree, module| {
        let code = constant(tree, Constant::Int(65))?;
        Ok(vec![
            call(tree, module, "globals", vec![])?,
            call(tree, module, "locals", vec![])?,
            call(tree, module, "chr", vec![code])?,
        ])
    })?;

    optimize(&mut tree, CompilerOptions::new().with_builtin_replacement(false))?;

    assert_eq!(tree.kind(source_of(&tree, statements[0])?)?, NodeKind::BuiltinGlobals);
    // Module level locals are the globals
    assert_eq!(tree.kind(source_of(&tree, statements[1])?)?, NodeKind::BuiltinGlobals);
    assert_eq!(tree.kind(source_of(&tree, statements[2])?)?, NodeKind::FunctionCall);
    Ok(())
}

#[test]
fn test_vars_by_argument_count() -> Result<()> {
    let mut tree = Tree::new();
    let (_, statements) = module_assigning(&mut tree, |tree, module| {
        let object = call(tree, module, "make", vec![])?;
        let one = constant(tree, Constant::Int(1))?;
        let two = constant(tree, Constant::Int(2))?;
        Ok(vec![
            call(tree, module, "vars", vec![])?,
            call(tree, module, "vars", vec![object])?,
            call(tree, module, "vars", vec![one, two])?,
        ])
    })?;

    optimize(&mut tree, CompilerOptions::default())?;

    assert_eq!(tree.kind(source_of(&tree, statements[0])?)?, NodeKind::BuiltinGlobals);
    assert_eq!(tree.kind(source_of(&tree, statements[1])?)?, NodeKind::BuiltinVars);

    let error = source_of(&tree, statements[2])?;
    assert_eq!(
        tree.payload(error)?,
        &Payload::Raise(RaisedException::new(
            ExceptionKind::TypeError,
            "vars expected at most 1 arguments, got 2"
        ))
    );
    Ok(())
}

#[test]
fn test_arity_error_keeps_argument_side_effects() -> Result<()> {
    let mut tree = Tree::new();
    let mut effect = None;
    let (_, statements) = module_assigning(&mut tree, |tree, module| {
        let object = call(tree, module, "make", vec![])?;
        effect = Some(object);
        let two = constant(tree, Constant::Int(2))?;
        Ok(vec![call(tree, module, "vars", vec![object, two])?])
    })?;
    let effect = effect.ok_or_else(|| anyhow!("argument not built"))?;

    optimize(&mut tree, CompilerOptions::default())?;

    let source = source_of(&tree, statements[0])?;
    assert_eq!(tree.kind(source)?, NodeKind::SideEffects);
    assert_eq!(tree.children_in(source, "side_effects")?, &[effect]);

    let raise = tree
        .child(source, "expression")?
        .ok_or_else(|| anyhow!("side effects without expression"))?;
    assert_eq!(tree.kind(raise)?, NodeKind::RaiseException);
    Ok(())
}

#[test]
fn test_exception_constructor_keeps_argument_order() -> Result<()> {
    let mut tree = Tree::new();
    let mut arguments = Vec::new();
    let (_, statements) = module_assigning(&mut tree, |tree, module| {
        let first = call(tree, module, "first", vec![])?;
        let second = call(tree, module, "second", vec![])?;
        arguments = vec![first, second];
        Ok(vec![call(tree, module, "ValueError", vec![first, second])?])
    })?;

    optimize(&mut tree, CompilerOptions::default())?;

    let source = source_of(&tree, statements[0])?;
    assert_eq!(tree.kind(source)?, NodeKind::BuiltinMakeException);
    assert_eq!(tree.payload(source)?, &Payload::Exception(ExceptionKind::ValueError));
    assert_eq!(tree.children_in(source, "args")?, arguments.as_slice());
    Ok(())
}

// =============================================================================
// Name Replacement Tests
// =============================================================================

#[test]
fn test_exception_name_becomes_exception_ref() -> Result<()> {
    let mut tree = Tree::new();
    let (_, statements) = module_assigning(&mut tree, |tree, module| {
        let variable = global(tree, module, "ValueError")?;
        Ok(vec![tree.make_variable_ref(variable, sref(1))?])
    })?;

    let report = optimize(&mut tree, CompilerOptions::default())?;

    let source = source_of(&tree, statements[0])?;
    assert_eq!(tree.kind(source)?, NodeKind::BuiltinExceptionRef);
    assert_eq!(tree.payload(source)?, &Payload::Exception(ExceptionKind::ValueError));
    assert!(report
        .why_optimized()
        .contains("Replaced access to read only module variable with exception 'ValueError'."));
    Ok(())
}

#[test]
fn test_quick_names_become_constants() -> Result<()> {
    let mut tree = Tree::new();
    let (_, statements) = module_assigning(&mut tree, |tree, module| {
        let variable = global(tree, module, "True")?;
        Ok(vec![tree.make_variable_ref(variable, sref(1))?])
    })?;

    optimize(
        &mut tree,
        CompilerOptions::new().with_python_version(PythonVersion::Python2),
    )?;

    assert_eq!(folded(&tree, statements[0])?, Some(Constant::Bool(true)));
    Ok(())
}

// =============================================================================
// Tree Integrity Tests
// =============================================================================

#[test]
fn test_replaced_call_is_finalized() -> Result<()> {
    let mut tree = Tree::new();
    let mut original = None;
    let (_, statements) = module_assigning(&mut tree, |tree, module| {
        let text = constant(tree, Constant::str("abc"))?;
        let len = call(tree, module, "len", vec![text])?;
        original = Some(len);
        Ok(vec![len])
    })?;
    let original = original.ok_or_else(|| anyhow!("call not built"))?;

    optimize(&mut tree, CompilerOptions::default())?;

    let source = source_of(&tree, statements[0])?;
    assert_eq!(tree.parent(source)?, Some(statements[0]));
    assert!(!tree.is_live(original));
    tree.validate()?;
    Ok(())
}

#[test]
fn test_statements_after_raise_are_skipped() -> Result<()> {
    let mut tree = Tree::new();
    let (_, statements) = module_assigning(&mut tree, |tree, module| {
        let one = constant(tree, Constant::Int(1))?;
        let two = constant(tree, Constant::Int(2))?;
        let code = constant(tree, Constant::Int(65))?;
        Ok(vec![
            call(tree, module, "dict", vec![one, two])?,
            call(tree, module, "chr", vec![code])?,
        ])
    })?;

    optimize(&mut tree, CompilerOptions::default())?;

    assert_eq!(tree.kind(source_of(&tree, statements[0])?)?, NodeKind::RaiseException);
    assert_eq!(tree.kind(source_of(&tree, statements[1])?)?, NodeKind::FunctionCall);
    Ok(())
}

// =============================================================================
// Folding Edge Case Tests
// =============================================================================

/// `name(**{keyword: value, ...})` through the module variable `name`
fn call_keywords(
    tree: &mut Tree,
    module: NodeId,
    name: &str,
    keywords: Vec<(&str, NodeId)>,
) -> Result<NodeId> {
    let variable = global(tree, module, name)?;
    let called = tree.make_variable_ref(variable, sref(1))?;
    let mut pairs = Vec::with_capacity(keywords.len());
    for (keyword, value) in keywords {
        let key = constant(tree, Constant::str(keyword))?;
        pairs.push(tree.make_key_value(key, value, sref(1))?);
    }
    Ok(tree.make_call(called, vec![], pairs, sref(1))?)
}

#[test]
fn test_range_with_extreme_bounds() -> Result<()> {
    let mut tree = Tree::new();
    let (_, statements) = module_assigning(&mut tree, |tree, module| {
        let start = constant(tree, Constant::Int(-9_000_000_000_000_000_000))?;
        let stop = constant(tree, Constant::Int(9_000_000_000_000_000_000))?;
        let step = constant(tree, Constant::Int(6_000_000_000_000_000_000))?;
        Ok(vec![call(tree, module, "range", vec![start, stop, step])?])
    })?;

    optimize(
        &mut tree,
        CompilerOptions::new().with_python_version(PythonVersion::Python2),
    )?;

    assert_eq!(
        folded(&tree, statements[0])?,
        Some(Constant::List(vec![
            Constant::Int(-9_000_000_000_000_000_000),
            Constant::Int(-3_000_000_000_000_000_000),
            Constant::Int(3_000_000_000_000_000_000),
        ]))
    );
    Ok(())
}

#[test]
fn test_non_ascii_digits_are_not_folded() -> Result<()> {
    let mut tree = Tree::new();
    let (_, statements) = module_assigning(&mut tree, |tree, module| {
        let arabic_twelve = constant(tree, Constant::str("\u{661}\u{662}"))?;
        let arabic_one_and_half = constant(tree, Constant::str("\u{661}.\u{665}"))?;
        Ok(vec![
            call(tree, module, "int", vec![arabic_twelve])?,
            call(tree, module, "float", vec![arabic_one_and_half])?,
        ])
    })?;

    optimize(&mut tree, CompilerOptions::default())?;

    assert_eq!(tree.kind(source_of(&tree, statements[0])?)?, NodeKind::BuiltinInt);
    assert_eq!(tree.kind(source_of(&tree, statements[1])?)?, NodeKind::BuiltinFloat);
    Ok(())
}

#[test]
fn test_keyword_arguments_keep_evaluation_order() -> Result<()> {
    let mut tree = Tree::new();
    let mut in_order = Vec::new();
    let (_, statements) = module_assigning(&mut tree, |tree, module| {
        // int(base=f(), x=g())
        let base = call(tree, module, "f", vec![])?;
        let x = call(tree, module, "g", vec![])?;
        let reversed = call_keywords(tree, module, "int", vec![("base", base), ("x", x)])?;

        // int(x=g(), base=f())
        let x = call(tree, module, "g", vec![])?;
        let base = call(tree, module, "f", vec![])?;
        in_order = vec![x, base];
        let ordered = call_keywords(tree, module, "int", vec![("x", x), ("base", base)])?;
        Ok(vec![reversed, ordered])
    })?;

    optimize(
        &mut tree,
        CompilerOptions::new().with_python_version(PythonVersion::Python2),
    )?;

    assert_eq!(tree.kind(source_of(&tree, statements[0])?)?, NodeKind::FunctionCall);

    let ordered = source_of(&tree, statements[1])?;
    assert_eq!(tree.kind(ordered)?, NodeKind::BuiltinInt);
    assert_eq!(tree.child(ordered, "value")?, Some(in_order[0]));
    assert_eq!(tree.child(ordered, "base")?, Some(in_order[1]));
    Ok(())
}

#[test]
fn test_builtin_shadowed_by_local_is_not_folded() -> Result<()> {
    let mut tree = Tree::new();
    let module = tree.make_scope(NodeKind::Module, "mod", sref(1))?;
    let global_len = global(&mut tree, module, "len")?;
    let f = global(&mut tree, module, "f")?;
    let result = global(&mut tree, module, "result")?;

    // def f():
    //     len = helper
    //     y = len((1,))
    let function = tree.make_scope(NodeKind::FunctionBody, "f", sref(1))?;
    let local_len = tree.declare_variable(function, "len", VariableKind::Local)?;
    let y = tree.declare_variable(function, "y", VariableKind::Local)?;
    let helper = global(&mut tree, module, "helper")?;
    let helper_ref = tree.make_variable_ref(helper, sref(2))?;
    let bind_len = tree.make_assignment(local_len, helper_ref, sref(2))?;
    let tuple = constant(&mut tree, Constant::Tuple(vec![Constant::Int(1)]))?;
    let called = tree.make_variable_ref(local_len, sref(3))?;
    let local_call = tree.make_call(called, vec![tuple], vec![], sref(3))?;
    let assign_y = tree.make_assignment(y, local_call, sref(3))?;
    let function_body = tree.make_statements(vec![bind_len, assign_y], sref(2))?;
    tree.set_body(function, function_body)?;
    let define = tree.make_assignment(f, function, sref(1))?;

    // result = len((1, 2)) at module level still folds
    let pair = constant(
        &mut tree,
        Constant::Tuple(vec![Constant::Int(1), Constant::Int(2)]),
    )?;
    let called = tree.make_variable_ref(global_len, sref(4))?;
    let module_call = tree.make_call(called, vec![pair], vec![], sref(4))?;
    let assign_result = tree.make_assignment(result, module_call, sref(4))?;

    let body = tree.make_statements(vec![define, assign_result], sref(1))?;
    tree.set_body(module, body)?;
    tree.set_root(module)?;

    optimize(&mut tree, CompilerOptions::default())?;

    assert_eq!(source_of(&tree, assign_y)?, local_call);
    assert_eq!(tree.kind(local_call)?, NodeKind::FunctionCall);
    assert_eq!(folded(&tree, assign_result)?, Some(Constant::Int(2)));
    Ok(())
}
