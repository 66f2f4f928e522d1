//! Fixed-point driver
//!
//! Runs every registered visitor over every compilation unit until a whole
//! pass produces no change signal. Each unit (the module body and every
//! function body) is walked with its own trace collection.

use super::compute::compute_expression;
use super::precompute::ConstantFoldingVisitor;
use super::replace_builtins::BuiltinReplacementVisitor;
use super::replace_exceptions::ExceptionNameVisitor;
use super::signal::ChangeLog;
use super::variables::annotate_read_only;
use super::visitor::{OptimizationVisitor, VisitContext};
use crate::compiler::CompilerOptions;
use crate::error::{CompileError, Result};
use crate::module_resolver::ModuleLocator;
use crate::trace::TraceCollection;
use pyrite_core::ast::Payload;
use pyrite_core::{NodeId, NodeKind, Tree};
use serde::Serialize;
use tracing::{debug, info};

/// Driver state; `Stable` is terminal for the tree it ran on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Active,
    Stable,
}

/// What a run of the driver did
#[derive(Debug, Clone, Default, Serialize)]
pub struct OptimizationReport {
    /// Passes run, including the final one without changes
    pub passes: usize,
    pub changes: ChangeLog,
}

impl OptimizationReport {
    /// Human readable listing of all changes, sorted by source location
    pub fn why_optimized(&self) -> String {
        self.changes.render_by_location()
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CompileError::internal(format!("cannot render report: {}", e)))
    }
}

pub struct FixedPointDriver {
    visitors: Vec<Box<dyn OptimizationVisitor>>,
    state: DriverState,
}

impl FixedPointDriver {
    /// Driver with the visitors the options enable. Critical builtin
    /// replacement always runs.
    pub fn new(options: &CompilerOptions) -> Self {
        let mut visitors: Vec<Box<dyn OptimizationVisitor>> =
            vec![Box::new(BuiltinReplacementVisitor::critical())];
        if options.enable_builtin_replacement {
            visitors.push(Box::new(BuiltinReplacementVisitor::optional()));
        }
        if options.enable_exception_name_replacement {
            visitors.push(Box::new(ExceptionNameVisitor::new()));
        }
        if options.enable_constant_folding {
            visitors.push(Box::new(ConstantFoldingVisitor::new()));
        }

        Self {
            visitors,
            state: DriverState::Active,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Names of the registered visitors in the order they run
    pub fn visitor_names(&self) -> Vec<&'static str> {
        self.visitors.iter().map(|visitor| visitor.name()).collect()
    }

    /// Optimize `tree` until it is stable
    pub fn run(
        &mut self,
        tree: &mut Tree,
        options: &CompilerOptions,
        locator: &dyn ModuleLocator,
    ) -> Result<OptimizationReport> {
        self.state = DriverState::Active;
        let mut report = OptimizationReport::default();

        while self.state == DriverState::Active {
            if report.passes >= options.max_passes {
                return Err(CompileError::internal(format!(
                    "optimization did not reach a fixed point after {} passes",
                    options.max_passes
                )));
            }

            let before = report.changes.len();
            self.run_pass(tree, options, locator, &mut report.changes)?;
            report.passes += 1;

            let pass_changes = report.changes.len() - before;
            debug!(pass = report.passes, changes = pass_changes, "optimization pass finished");
            if pass_changes == 0 {
                self.state = DriverState::Stable;
            }
        }

        tree.validate()?;
        info!(
            passes = report.passes,
            changes = report.changes.len(),
            "tree is stable"
        );
        Ok(report)
    }

    /// One pass over every unit of the tree
    pub fn run_pass(
        &self,
        tree: &mut Tree,
        options: &CompilerOptions,
        locator: &dyn ModuleLocator,
        changes: &mut ChangeLog,
    ) -> Result<()> {
        annotate_read_only(tree)?;

        for unit in collect_units(tree)? {
            if !tree.is_reachable(unit) {
                continue;
            }
            let name = match tree.payload(unit)? {
                Payload::Scope { name } => name.clone(),
                _ => String::new(),
            };
            debug!(unit = %name, "optimizing unit");

            let mut trace = TraceCollection::new(unit, name, options.python_version);
            let mut cx = VisitContext {
                tree: &mut *tree,
                trace: &mut trace,
                changes: &mut *changes,
                options,
                locator,
            };
            self.visit(&mut cx, unit, unit)?;
        }
        Ok(())
    }

    /// Visitors on the way down, compute on the way up. Returns the node
    /// now at the position of `node`.
    fn visit(&self, cx: &mut VisitContext<'_>, node: NodeId, unit: NodeId) -> Result<NodeId> {
        let mut current = node;
        if current != unit {
            for visitor in &self.visitors {
                current = visitor.on_enter_node(cx, current)?;
            }
        }

        let kind = cx.tree.kind(current)?;
        if kind == NodeKind::FunctionBody && current != unit {
            // Optimized as a unit of its own
            return Ok(current);
        }

        let children = cx.tree.children(current)?;
        for (index, child) in children.iter().enumerate() {
            if kind == NodeKind::StatementsSequence && cx.trace.is_abortive() {
                debug!(
                    unit = cx.trace.name(),
                    skipped = children.len() - index,
                    "statements after an abortive statement are unreachable"
                );
                break;
            }
            let owned = cx.tree.get(*child).and_then(|child| child.parent()) == Some(current);
            if owned {
                self.visit(cx, *child, unit)?;
            }
        }

        if current == unit {
            return Ok(current);
        }

        let result = compute_expression(cx, current)?;
        if let Some(tags) = result.tags {
            let source_ref = cx.tree.source_ref(current)?.clone();
            if result.node != current {
                cx.replace_node(current, result.node)?;
            }
            cx.signal_change(tags, &source_ref, result.description.unwrap_or_default());
            current = result.node;
        }
        Ok(current)
    }
}

/// The module body and every function body, in tree order
fn collect_units(tree: &Tree) -> Result<Vec<NodeId>> {
    let Some(root) = tree.root() else {
        return Err(CompileError::Tree(pyrite_core::CoreError::MissingRoot));
    };

    let mut units = vec![root];
    for node in tree.walk(root)? {
        if node != root && tree.kind(node)? == NodeKind::FunctionBody {
            units.push(node);
        }
    }
    Ok(units)
}
