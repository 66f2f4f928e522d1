//! Trace collection
//!
//! Dataflow facts gathered while one compilation unit (a module body or a
//! function body) is walked. Every unit gets its own collection; nothing in
//! here is shared between units.

use pyrite_core::{ExceptionKind, NodeId, PythonVersion, SourceRef};

/// A point where control flow may leave through an exception
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionExit {
    pub kind: ExceptionKind,
    pub source_ref: SourceRef,
}

/// Per-unit dataflow context
#[derive(Debug, Clone)]
pub struct TraceCollection {
    unit: NodeId,
    name: String,
    version: PythonVersion,
    exception_exits: Vec<ExceptionExit>,
    abortive: bool,
}

impl TraceCollection {
    pub fn new(unit: NodeId, name: impl Into<String>, version: PythonVersion) -> Self {
        Self {
            unit,
            name: name.into(),
            version,
            exception_exits: Vec::new(),
            abortive: false,
        }
    }

    /// Scope node of the unit being traced
    pub fn unit(&self) -> NodeId {
        self.unit
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Control flow may leave from here through `kind`
    pub fn on_exception_raise_exit(&mut self, kind: ExceptionKind, source_ref: &SourceRef) {
        self.exception_exits.push(ExceptionExit {
            kind,
            source_ref: source_ref.clone(),
        });
    }

    pub fn exception_exits(&self) -> &[ExceptionExit] {
        &self.exception_exits
    }

    /// Whether some recorded exit would be caught by `except kind:`
    pub fn may_exit_via(&self, kind: ExceptionKind) -> bool {
        self.exception_exits.iter().any(|exit| {
            exit.kind.is_subclass_of(kind, self.version)
                || kind.is_subclass_of(exit.kind, self.version)
        })
    }

    /// Control flow never continues past the current point
    pub fn on_abortive(&mut self) {
        self.abortive = true;
    }

    pub fn is_abortive(&self) -> bool {
        self.abortive
    }
}
