//! Nodes and their kind-specific payloads

use super::kind::{Capabilities, NodeKind};
use super::variable::VariableId;
use crate::module_name::{ModuleFinding, ModuleName};
use crate::source::SourceRef;
use crate::types::{Constant, ExceptionKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle of a node in its tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Content of one child slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotValue {
    One(Option<NodeId>),
    Many(Vec<NodeId>),
}

impl SlotValue {
    pub fn ids(&self) -> &[NodeId] {
        match self {
            SlotValue::One(child) => child.as_slice(),
            SlotValue::Many(children) => children,
        }
    }

    pub(crate) fn describe(&self) -> &'static str {
        match self {
            SlotValue::One(Some(_)) => "a node",
            SlotValue::One(None) => "nothing",
            SlotValue::Many(_) => "a sequence",
        }
    }
}

impl From<NodeId> for SlotValue {
    fn from(id: NodeId) -> Self {
        SlotValue::One(Some(id))
    }
}

impl From<Option<NodeId>> for SlotValue {
    fn from(id: Option<NodeId>) -> Self {
        SlotValue::One(id)
    }
}

impl From<Vec<NodeId>> for SlotValue {
    fn from(ids: Vec<NodeId>) -> Self {
        SlotValue::Many(ids)
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOperator {
    /// `repr(x)` and backticks
    Repr,
    Not,
    Minus,
    Plus,
    Invert,
}

/// An exception known to be raised, with its message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaisedException {
    pub kind: ExceptionKind,
    pub message: String,
}

impl RaisedException {
    pub fn new(kind: ExceptionKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for RaisedException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.name(), self.message)
    }
}

/// Static module import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    pub module_name: ModuleName,
    /// `fromlist`, empty for plain imports
    pub import_list: Vec<String>,
    pub level: i64,
}

/// Import of a module known to exist, optionally of a name inside it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HardImportSpec {
    pub module_name: ModuleName,
    pub import_name: Option<String>,
    pub finding: ModuleFinding,
}

/// Kind-specific node data
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    None,
    Constant(Constant),
    Variable(VariableId),
    /// Builtin or attribute name
    Name(String),
    Exception(ExceptionKind),
    Unary(UnaryOperator),
    Scope { name: String },
    Raise(RaisedException),
    Import(ImportSpec),
    HardImport(HardImportSpec),
    ImportName { name: String, level: i64 },
}

impl Payload {
    fn tag(&self) -> &'static str {
        match self {
            Payload::None => "none",
            Payload::Constant(_) => "constant",
            Payload::Variable(_) => "variable",
            Payload::Name(_) => "name",
            Payload::Exception(_) => "exception",
            Payload::Unary(_) => "unary",
            Payload::Scope { .. } => "scope",
            Payload::Raise(_) => "raise",
            Payload::Import(_) => "import",
            Payload::HardImport(_) => "hard_import",
            Payload::ImportName { .. } => "import_name",
        }
    }

    /// Payload tag a kind requires
    pub(crate) fn expected_tag(kind: NodeKind) -> &'static str {
        use NodeKind::*;

        match kind {
            Module | FunctionBody | ClassBody => "scope",
            StatementAssignmentVariable | StatementReleaseVariable | VariableRef => "variable",
            ConstantRef => "constant",
            AttributeLookup | BuiltinRef => "name",
            BuiltinExceptionRef | BuiltinMakeException => "exception",
            OperationUnary => "unary",
            RaiseException => "raise",
            ImportModule => "import",
            ImportModuleHard | ImportModuleNameHardExists | ImportModuleNameHardMaybeExists => {
                "hard_import"
            }
            ImportName => "import_name",
            _ => "none",
        }
    }

    pub(crate) fn fits(&self, kind: NodeKind) -> bool {
        self.tag() == Self::expected_tag(kind)
    }
}

/// A node of the tree
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) slots: Vec<SlotValue>,
    pub(crate) source_ref: SourceRef,
    pub(crate) payload: Payload,
    pub(crate) capability_override: Option<Capabilities>,
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn source_ref(&self) -> &SourceRef {
        &self.source_ref
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn slots(&self) -> &[SlotValue] {
        &self.slots
    }

    /// Capabilities of this instance, honoring an override
    pub fn capabilities(&self) -> Capabilities {
        self.capability_override
            .unwrap_or_else(|| self.kind.capabilities())
    }

    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.slots.iter().flat_map(|slot| slot.ids().iter().copied())
    }
}
