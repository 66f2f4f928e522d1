//! Builtin call replacement
//!
//! Calls through a read-only name that refers to a builtin are replaced with
//! the node kind for that specific builtin. Calls that are statically wrong
//! become a raise of the `TypeError` the call would produce, still
//! evaluating the arguments.
//!
//! The critical visitor handles builtins whose semantics depend on the
//! calling frame (`globals`, `locals`, `eval`, `exec`, `execfile`); it always
//! runs. The optional visitor handles everything else.

use super::builtin_spec::{self, BoundArguments, BuiltinParameterSpec};
use super::dispatch::Dispatcher;
use super::replacements::{classify_replacement, take, take_bound, type_error_call, CallSite};
use super::signal::ChangeTags;
use super::visitor::{OptimizationVisitor, VisitContext};
use crate::error::Result;
use pyrite_core::ast::{Payload, SlotValue, UnaryOperator};
use pyrite_core::types::{is_builtin_exception_name, is_builtin_name};
use pyrite_core::{Constant, ExceptionKind, NodeId, NodeKind, VariableId};

/// Builds the replacement for a call, `None` to keep the call
pub type BuiltinHandler = fn(&mut VisitContext<'_>, &CallSite) -> Result<Option<NodeId>>;

pub struct BuiltinReplacementVisitor {
    name: &'static str,
    dispatcher: Dispatcher<&'static str, BuiltinHandler>,
    handles_exec_statements: bool,
}

impl BuiltinReplacementVisitor {
    /// Frame-dependent builtins
    pub fn critical() -> Self {
        let dispatcher = Dispatcher::new()
            .with_handler("globals", globals as BuiltinHandler)
            .with_handler("locals", locals)
            .with_handler("eval", eval)
            .with_handler("exec", exec)
            .with_handler("execfile", execfile);

        Self {
            name: "critical builtin replacement",
            dispatcher,
            handles_exec_statements: true,
        }
    }

    pub fn optional() -> Self {
        let dispatcher = Dispatcher::new()
            .with_handler("dir", dir as BuiltinHandler)
            .with_handler("vars", vars)
            .with_handler("__import__", import)
            .with_handler("chr", chr)
            .with_handler("ord", ord)
            .with_handler("bin", bin)
            .with_handler("oct", oct)
            .with_handler("hex", hex)
            .with_handler("type", type_)
            .with_handler("iter", iter)
            .with_handler("next", next)
            .with_handler("range", range)
            .with_handler("tuple", tuple)
            .with_handler("list", list)
            .with_handler("dict", dict)
            .with_handler("float", float)
            .with_handler("str", str)
            .with_handler("bool", bool)
            .with_handler("int", int)
            .with_handler("long", long)
            .with_handler("repr", repr)
            .with_handler("len", len)
            .with_fallback(make_exception);

        Self {
            name: "builtin replacement",
            dispatcher,
            handles_exec_statements: false,
        }
    }

    /// Name of the builtin called by `node`, with the variable it is
    /// called through
    pub fn get_key(cx: &VisitContext<'_>, node: NodeId) -> Option<(VariableId, String)> {
        let call = cx.tree.get(node)?;
        if call.kind() != NodeKind::FunctionCall {
            return None;
        }
        let called = cx.tree.child(node, "called").ok()??;
        let variable = cx.read_only_variable(called)?;
        let name = cx.tree.variable(variable).ok()?.name();

        let version = cx.version();
        (is_builtin_name(name, version) || is_builtin_exception_name(name, version))
            .then(|| (variable, name.to_string()))
    }

    /// `execfile(...)` as a statement of a class body executes in the
    /// class namespace.
    fn replace_exec_statement(&self, cx: &mut VisitContext<'_>, node: NodeId) -> Result<Option<NodeId>> {
        if !self.handles_exec_statements || cx.tree.kind(node)? != NodeKind::StatementExpressionOnly {
            return Ok(None);
        }
        let Some(expression) = cx.tree.child(node, "expression")? else {
            return Ok(None);
        };
        let Some((variable, name)) = Self::get_key(cx, expression) else {
            return Ok(None);
        };
        if name != "execfile" || cx.version().is_python3() {
            return Ok(None);
        }
        let in_class = match cx.tree.provider_of(node)? {
            Some(provider) => cx.tree.kind(provider)? == NodeKind::ClassBody,
            None => false,
        };
        if !in_class {
            return Ok(None);
        }
        let Some(site) = CallSite::read(cx.tree, expression, variable, &name)? else {
            return Ok(None);
        };

        // Wrong calls are left to the expression form, which raises.
        let Ok(mut args) = site.bind(&builtin_spec::EXECFILE) else {
            return Ok(None);
        };
        if !builtin_spec::EXECFILE.keywords_in_order(&site.keywords) {
            return Ok(None);
        }
        let source_code = open_and_read(cx, &site, &mut args)?;
        let globals = take_bound(cx.tree, &mut args, 1)?;
        let locals = take_bound(cx.tree, &mut args, 2)?;
        let statement = cx.tree.new_node(
            NodeKind::StatementExec,
            site.source_ref.clone(),
            Payload::None,
            vec![source_code.into(), globals.into(), locals.into()],
        )?;

        cx.replace_node(node, statement)?;
        cx.signal_change(
            ChangeTags::NEW_BUILTIN,
            &site.source_ref,
            "Replaced call to built-in 'execfile' in class body with exec statement.",
        );
        cx.reconsider_variable(variable, &site.source_ref)?;
        Ok(Some(statement))
    }
}

impl OptimizationVisitor for BuiltinReplacementVisitor {
    fn name(&self) -> &'static str {
        self.name
    }

    fn on_enter_node(&self, cx: &mut VisitContext<'_>, node: NodeId) -> Result<NodeId> {
        if let Some(statement) = self.replace_exec_statement(cx, node)? {
            return Ok(statement);
        }

        let Some((variable, name)) = Self::get_key(cx, node) else {
            return Ok(node);
        };
        let Some(handler) = self.dispatcher.lookup(name.as_str()) else {
            return Ok(node);
        };
        let Some(site) = CallSite::read(cx.tree, node, variable, &name)? else {
            return Ok(node);
        };
        let Some(replacement) = handler(cx, &site)? else {
            return Ok(node);
        };

        let tags = classify_replacement(cx.tree, replacement)?;
        let description = if tags.contains(ChangeTags::NEW_RAISE) {
            "exception raise".to_string()
        } else {
            format!("{:?}", cx.tree.kind(replacement)?)
        };
        cx.replace_node(node, replacement)?;
        cx.signal_change(
            tags,
            &site.source_ref,
            format!("Replaced call to built-in '{}' with {}.", name, description),
        );
        cx.reconsider_variable(variable, &site.source_ref)?;
        Ok(replacement)
    }
}

// ----------------------------------------------------------------------
// Binding
// ----------------------------------------------------------------------

enum Binding {
    Bound(BoundArguments<NodeId>),
    /// The call is statically wrong; this raises instead
    Raised(NodeId),
    /// Keywords evaluate in an order the parameter slots cannot keep
    Kept,
}

fn bind(cx: &mut VisitContext<'_>, site: &CallSite, spec: &BuiltinParameterSpec) -> Result<Binding> {
    match site.bind(spec) {
        Ok(_) if !spec.keywords_in_order(&site.keywords) => Ok(Binding::Kept),
        Ok(args) => Ok(Binding::Bound(args)),
        Err(message) => Ok(Binding::Raised(type_error_call(cx.tree, site, message)?)),
    }
}

/// Bind and move every parameter into the slot of the same position
fn specialize(
    cx: &mut VisitContext<'_>,
    site: &CallSite,
    spec: &BuiltinParameterSpec,
    kind: NodeKind,
) -> Result<Option<NodeId>> {
    let mut args = match bind(cx, site, spec)? {
        Binding::Bound(args) => args,
        Binding::Raised(raise) => return Ok(Some(raise)),
        Binding::Kept => return Ok(None),
    };

    let mut slots = Vec::with_capacity(args.values.len());
    for index in 0..args.values.len() {
        slots.push(SlotValue::from(take_bound(cx.tree, &mut args, index)?));
    }
    Ok(Some(cx.tree.make_builtin(kind, slots, site.source_ref.clone())?))
}

fn is_module_level(cx: &VisitContext<'_>, site: &CallSite) -> Result<bool> {
    match cx.tree.provider_of(site.call)? {
        Some(provider) => Ok(cx.tree.kind(provider)? == NodeKind::Module),
        None => Ok(true),
    }
}

/// `locals()` at module level is `globals()`
fn locals_or_globals(cx: &mut VisitContext<'_>, site: &CallSite) -> Result<NodeId> {
    let kind = if is_module_level(cx, site)? {
        NodeKind::BuiltinGlobals
    } else {
        NodeKind::BuiltinLocals
    };
    Ok(cx.tree.make_builtin(kind, vec![], site.source_ref.clone())?)
}

// ----------------------------------------------------------------------
// Critical builtins
// ----------------------------------------------------------------------

fn globals(cx: &mut VisitContext<'_>, site: &CallSite) -> Result<Option<NodeId>> {
    specialize(cx, site, &builtin_spec::GLOBALS, NodeKind::BuiltinGlobals)
}

fn locals(cx: &mut VisitContext<'_>, site: &CallSite) -> Result<Option<NodeId>> {
    match bind(cx, site, &builtin_spec::LOCALS)? {
        Binding::Raised(raise) => Ok(Some(raise)),
        Binding::Kept => Ok(None),
        Binding::Bound(_) => Ok(Some(locals_or_globals(cx, site)?)),
    }
}

fn eval(cx: &mut VisitContext<'_>, site: &CallSite) -> Result<Option<NodeId>> {
    specialize(cx, site, &builtin_spec::EVAL, NodeKind::BuiltinEval)
}

fn exec(cx: &mut VisitContext<'_>, site: &CallSite) -> Result<Option<NodeId>> {
    if !cx.version().is_python3() {
        return Ok(None);
    }
    specialize(cx, site, &builtin_spec::EXEC, NodeKind::BuiltinExec)
}

/// `open(filename, "rU").read()`
fn open_and_read(
    cx: &mut VisitContext<'_>,
    site: &CallSite,
    args: &mut BoundArguments<NodeId>,
) -> Result<NodeId> {
    let source_ref = site.source_ref.clone();
    let filename = take_bound(cx.tree, args, 0)?;
    let mode = cx.tree.make_constant(Constant::str("rU"), source_ref.clone())?;
    let open = cx.tree.make_builtin(
        NodeKind::BuiltinOpen,
        vec![filename.into(), mode.into(), SlotValue::One(None)],
        source_ref.clone(),
    )?;
    let read = cx.tree.make_attribute_lookup(open, "read", source_ref.clone())?;
    Ok(cx.tree.make_call(read, vec![], vec![], source_ref)?)
}

fn execfile(cx: &mut VisitContext<'_>, site: &CallSite) -> Result<Option<NodeId>> {
    if cx.version().is_python3() {
        return Ok(None);
    }
    let mut args = match bind(cx, site, &builtin_spec::EXECFILE)? {
        Binding::Bound(args) => args,
        Binding::Raised(raise) => return Ok(Some(raise)),
        Binding::Kept => return Ok(None),
    };

    let source_code = open_and_read(cx, site, &mut args)?;
    let globals = take_bound(cx.tree, &mut args, 1)?;
    let locals = take_bound(cx.tree, &mut args, 2)?;
    Ok(Some(cx.tree.make_builtin(
        NodeKind::BuiltinExecfile,
        vec![source_code.into(), globals.into(), locals.into()],
        site.source_ref.clone(),
    )?))
}

// ----------------------------------------------------------------------
// Optional builtins
// ----------------------------------------------------------------------

fn dir(cx: &mut VisitContext<'_>, site: &CallSite) -> Result<Option<NodeId>> {
    match bind(cx, site, &builtin_spec::DIR)? {
        Binding::Raised(raise) => Ok(Some(raise)),
        Binding::Kept => Ok(None),
        Binding::Bound(args) if args.given() == 0 => Ok(Some(cx.tree.make_builtin(
            NodeKind::BuiltinDir0,
            vec![],
            site.source_ref.clone(),
        )?)),
        Binding::Bound(_) => Ok(None),
    }
}

fn vars(cx: &mut VisitContext<'_>, site: &CallSite) -> Result<Option<NodeId>> {
    match bind(cx, site, &builtin_spec::VARS)? {
        Binding::Raised(raise) => Ok(Some(raise)),
        Binding::Kept => Ok(None),
        Binding::Bound(args) if args.given() == 0 => Ok(Some(locals_or_globals(cx, site)?)),
        Binding::Bound(mut args) => {
            let source = take_bound(cx.tree, &mut args, 0)?;
            Ok(Some(cx.tree.make_builtin(
                NodeKind::BuiltinVars,
                vec![source.into()],
                site.source_ref.clone(),
            )?))
        }
    }
}

fn import(cx: &mut VisitContext<'_>, site: &CallSite) -> Result<Option<NodeId>> {
    specialize(cx, site, &builtin_spec::IMPORT, NodeKind::BuiltinImport)
}

fn chr(cx: &mut VisitContext<'_>, site: &CallSite) -> Result<Option<NodeId>> {
    specialize(cx, site, &builtin_spec::CHR, NodeKind::BuiltinChr)
}

fn ord(cx: &mut VisitContext<'_>, site: &CallSite) -> Result<Option<NodeId>> {
    specialize(cx, site, &builtin_spec::ORD, NodeKind::BuiltinOrd)
}

fn bin(cx: &mut VisitContext<'_>, site: &CallSite) -> Result<Option<NodeId>> {
    specialize(cx, site, &builtin_spec::BIN, NodeKind::BuiltinBin)
}

fn oct(cx: &mut VisitContext<'_>, site: &CallSite) -> Result<Option<NodeId>> {
    specialize(cx, site, &builtin_spec::OCT, NodeKind::BuiltinOct)
}

fn hex(cx: &mut VisitContext<'_>, site: &CallSite) -> Result<Option<NodeId>> {
    specialize(cx, site, &builtin_spec::HEX, NodeKind::BuiltinHex)
}

/// Only the one and three argument forms of `type` are distinct builtins.
fn type_(cx: &mut VisitContext<'_>, site: &CallSite) -> Result<Option<NodeId>> {
    if !site.keywords.is_empty() {
        return Ok(None);
    }

    let kind = match site.positional.len() {
        1 => NodeKind::BuiltinType1,
        3 => NodeKind::BuiltinType3,
        _ => return Ok(None),
    };
    let mut slots = Vec::with_capacity(site.positional.len());
    for argument in &site.positional {
        slots.push(SlotValue::from(take(cx.tree, Some(*argument))?));
    }
    Ok(Some(cx.tree.make_builtin(kind, slots, site.source_ref.clone())?))
}

/// Pick the one or two argument kind after binding
fn one_or_two(
    cx: &mut VisitContext<'_>,
    site: &CallSite,
    spec: &BuiltinParameterSpec,
    one: NodeKind,
    two: NodeKind,
) -> Result<Option<NodeId>> {
    let mut args = match bind(cx, site, spec)? {
        Binding::Bound(args) => args,
        Binding::Raised(raise) => return Ok(Some(raise)),
        Binding::Kept => return Ok(None),
    };

    let first = take_bound(cx.tree, &mut args, 0)?;
    let node = match take_bound(cx.tree, &mut args, 1)? {
        None => cx.tree.make_builtin(one, vec![first.into()], site.source_ref.clone())?,
        Some(second) => {
            cx.tree
                .make_builtin(two, vec![first.into(), second.into()], site.source_ref.clone())?
        }
    };
    Ok(Some(node))
}

fn iter(cx: &mut VisitContext<'_>, site: &CallSite) -> Result<Option<NodeId>> {
    one_or_two(cx, site, &builtin_spec::ITER, NodeKind::BuiltinIter1, NodeKind::BuiltinIter2)
}

fn next(cx: &mut VisitContext<'_>, site: &CallSite) -> Result<Option<NodeId>> {
    one_or_two(cx, site, &builtin_spec::NEXT, NodeKind::BuiltinNext1, NodeKind::BuiltinNext2)
}

fn range(cx: &mut VisitContext<'_>, site: &CallSite) -> Result<Option<NodeId>> {
    specialize(cx, site, &builtin_spec::RANGE, NodeKind::BuiltinRange)
}

fn tuple(cx: &mut VisitContext<'_>, site: &CallSite) -> Result<Option<NodeId>> {
    specialize(cx, site, &builtin_spec::TUPLE, NodeKind::BuiltinTuple)
}

fn list(cx: &mut VisitContext<'_>, site: &CallSite) -> Result<Option<NodeId>> {
    specialize(cx, site, &builtin_spec::LIST, NodeKind::BuiltinList)
}

/// At most one positional argument; keywords become entries.
fn dict(cx: &mut VisitContext<'_>, site: &CallSite) -> Result<Option<NodeId>> {
    let mut args = match bind(cx, site, &builtin_spec::DICT)? {
        Binding::Bound(args) => args,
        Binding::Raised(raise) => return Ok(Some(raise)),
        Binding::Kept => return Ok(None),
    };

    let pos_arg = take_bound(cx.tree, &mut args, 0)?;
    let mut pairs = Vec::with_capacity(args.star_dict.len());
    for (keyword, value) in std::mem::take(&mut args.star_dict) {
        let source_ref = cx.tree.source_ref(value)?.clone();
        let value = cx.tree.detach(value)?;
        let key = cx.tree.make_constant(Constant::str(keyword), source_ref.clone())?;
        pairs.push(cx.tree.make_key_value(key, value, source_ref)?);
    }

    Ok(Some(cx.tree.make_builtin(
        NodeKind::BuiltinDict,
        vec![pos_arg.into(), pairs.into()],
        site.source_ref.clone(),
    )?))
}

fn float(cx: &mut VisitContext<'_>, site: &CallSite) -> Result<Option<NodeId>> {
    specialize(cx, site, &builtin_spec::FLOAT, NodeKind::BuiltinFloat)
}

fn str(cx: &mut VisitContext<'_>, site: &CallSite) -> Result<Option<NodeId>> {
    specialize(cx, site, &builtin_spec::STR, NodeKind::BuiltinStr)
}

fn bool(cx: &mut VisitContext<'_>, site: &CallSite) -> Result<Option<NodeId>> {
    specialize(cx, site, &builtin_spec::BOOL, NodeKind::BuiltinBool)
}

fn int(cx: &mut VisitContext<'_>, site: &CallSite) -> Result<Option<NodeId>> {
    specialize(cx, site, &builtin_spec::INT, NodeKind::BuiltinInt)
}

fn long(cx: &mut VisitContext<'_>, site: &CallSite) -> Result<Option<NodeId>> {
    if cx.version().is_python3() {
        return Ok(None);
    }
    specialize(cx, site, &builtin_spec::LONG, NodeKind::BuiltinLong)
}

fn repr(cx: &mut VisitContext<'_>, site: &CallSite) -> Result<Option<NodeId>> {
    let mut args = match bind(cx, site, &builtin_spec::REPR)? {
        Binding::Bound(args) => args,
        Binding::Raised(raise) => return Ok(Some(raise)),
        Binding::Kept => return Ok(None),
    };

    let operand = take_bound(cx.tree, &mut args, 0)?;
    Ok(Some(cx.tree.new_node(
        NodeKind::OperationUnary,
        site.source_ref.clone(),
        Payload::Unary(UnaryOperator::Repr),
        vec![operand.into()],
    )?))
}

fn len(cx: &mut VisitContext<'_>, site: &CallSite) -> Result<Option<NodeId>> {
    specialize(cx, site, &builtin_spec::LEN, NodeKind::BuiltinLen)
}

/// Builtin exception names create the exception from the arguments in the
/// order given.
fn make_exception(cx: &mut VisitContext<'_>, site: &CallSite) -> Result<Option<NodeId>> {
    let Some(kind) = ExceptionKind::from_name(&site.name, cx.version()) else {
        return Ok(None);
    };

    let spec = builtin_spec::exception_spec(kind.name());
    let mut args = match bind(cx, site, &spec)? {
        Binding::Bound(args) => args,
        Binding::Raised(raise) => return Ok(Some(raise)),
        Binding::Kept => return Ok(None),
    };

    let mut arguments = Vec::with_capacity(args.star_list.len());
    for argument in std::mem::take(&mut args.star_list) {
        arguments.push(cx.tree.detach(argument)?);
    }
    Ok(Some(cx.tree.new_node(
        NodeKind::BuiltinMakeException,
        site.source_ref.clone(),
        Payload::Exception(kind),
        vec![arguments.into()],
    )?))
}
