//! Node kinds, their slot schema and their static capabilities

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// What a node is and what evaluating it may do.
    ///
    /// `MAY_RAISE` and `SIDE_EFFECTS` describe the node itself only; the
    /// tree combines them with the node's children.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u16 {
        const EXPRESSION = 1 << 0;
        const STATEMENT = 1 << 1;
        const BUILTIN = 1 << 2;
        const CONSTANT = 1 << 3;
        const MAY_RAISE = 1 << 4;
        const SIDE_EFFECTS = 1 << 5;
        const ALWAYS_RAISES = 1 << 6;
        const SCOPE = 1 << 7;
        const IMPORT = 1 << 8;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Required,
    Optional,
    Sequence,
}

/// One named child slot of a kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotSpec {
    pub name: &'static str,
    pub arity: Arity,
}

macro_rules! req {
    ($name:literal) => {
        SlotSpec {
            name: $name,
            arity: Arity::Required,
        }
    };
}

macro_rules! opt {
    ($name:literal) => {
        SlotSpec {
            name: $name,
            arity: Arity::Optional,
        }
    };
}

macro_rules! seq {
    ($name:literal) => {
        SlotSpec {
            name: $name,
            arity: Arity::Sequence,
        }
    };
}

/// The closed set of node kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeKind {
    // Scopes
    Module,
    FunctionBody,
    ClassBody,

    // Statements
    StatementsSequence,
    StatementExpressionOnly,
    StatementAssignmentVariable,
    StatementReleaseVariable,
    StatementExec,
    StatementImportStar,

    // Generic expressions
    ConstantRef,
    VariableRef,
    FunctionCall,
    KeyValuePair,
    AttributeLookup,
    OperationUnary,
    SideEffects,
    RaiseException,

    // Builtin references and reflection
    BuiltinRef,
    BuiltinExceptionRef,
    BuiltinMakeException,
    BuiltinGlobals,
    BuiltinLocals,
    BuiltinDir0,
    BuiltinVars,
    BuiltinEval,
    BuiltinExec,
    BuiltinExecfile,
    BuiltinOpen,

    // Imports
    BuiltinImport,
    ImportModule,
    ImportModuleHard,
    ImportModuleNameHardExists,
    ImportModuleNameHardMaybeExists,
    ImportName,

    // Builtin operations
    BuiltinChr,
    BuiltinOrd,
    BuiltinBin,
    BuiltinOct,
    BuiltinHex,
    BuiltinLen,
    BuiltinType1,
    BuiltinType3,
    BuiltinIter1,
    BuiltinIter2,
    BuiltinNext1,
    BuiltinNext2,
    BuiltinRange,
    BuiltinTuple,
    BuiltinList,
    BuiltinDict,
    BuiltinFloat,
    BuiltinStr,
    BuiltinBool,
    BuiltinInt,
    BuiltinLong,
}

const OPERATION: Capabilities = Capabilities::EXPRESSION
    .union(Capabilities::BUILTIN)
    .union(Capabilities::MAY_RAISE)
    .union(Capabilities::SIDE_EFFECTS);

impl NodeKind {
    /// Child slots in evaluation order
    pub fn slots(self) -> &'static [SlotSpec] {
        use NodeKind::*;

        match self {
            Module | FunctionBody | ClassBody => &[opt!("body")],
            StatementsSequence => &[seq!("statements")],
            StatementExpressionOnly => &[req!("expression")],
            StatementAssignmentVariable => &[req!("source")],
            StatementReleaseVariable => &[],
            StatementExec | BuiltinEval | BuiltinExec | BuiltinExecfile => {
                &[req!("source_code"), opt!("globals"), opt!("locals")]
            }
            StatementImportStar => &[req!("module")],
            ConstantRef | VariableRef | RaiseException => &[],
            FunctionCall => &[
                req!("called"),
                seq!("positional_args"),
                seq!("pairs"),
                opt!("list_star_arg"),
                opt!("dict_star_arg"),
            ],
            KeyValuePair => &[req!("key"), req!("value")],
            AttributeLookup => &[req!("expression")],
            OperationUnary => &[req!("operand")],
            SideEffects => &[seq!("side_effects"), req!("expression")],
            BuiltinRef | BuiltinExceptionRef => &[],
            BuiltinMakeException => &[seq!("args")],
            BuiltinGlobals | BuiltinLocals | BuiltinDir0 => &[],
            BuiltinVars => &[req!("source")],
            BuiltinOpen => &[req!("filename"), opt!("mode"), opt!("buffering")],
            BuiltinImport => &[
                req!("name"),
                opt!("globals"),
                opt!("locals"),
                opt!("fromlist"),
                opt!("level"),
            ],
            ImportModule
            | ImportModuleHard
            | ImportModuleNameHardExists
            | ImportModuleNameHardMaybeExists => &[],
            ImportName => &[req!("module")],
            BuiltinChr | BuiltinOrd | BuiltinBin | BuiltinOct | BuiltinHex | BuiltinLen
            | BuiltinType1 | BuiltinIter1 | BuiltinNext1 => &[req!("value")],
            BuiltinType3 => &[req!("type_name"), req!("bases"), req!("type_dict")],
            BuiltinIter2 => &[req!("callable"), req!("sentinel")],
            BuiltinNext2 => &[req!("iterator"), req!("default")],
            BuiltinRange => &[req!("low"), opt!("high"), opt!("step")],
            BuiltinTuple | BuiltinList | BuiltinFloat | BuiltinStr | BuiltinBool => {
                &[opt!("value")]
            }
            BuiltinDict => &[opt!("pos_arg"), seq!("pairs")],
            BuiltinInt | BuiltinLong => &[opt!("value"), opt!("base")],
        }
    }

    /// Index of the slot called `name`
    pub fn slot_index(self, name: &str) -> Option<usize> {
        self.slots().iter().position(|slot| slot.name == name)
    }

    /// Static capabilities. Kinds that do not know better are conservative:
    /// they may raise and may have side effects.
    pub fn capabilities(self) -> Capabilities {
        use Capabilities as C;
        use NodeKind::*;

        match self {
            Module => C::SCOPE,
            FunctionBody => C::SCOPE | C::EXPRESSION,
            ClassBody => C::SCOPE | C::EXPRESSION | C::MAY_RAISE | C::SIDE_EFFECTS,
            StatementsSequence | StatementExpressionOnly | StatementAssignmentVariable
            | StatementReleaseVariable => C::STATEMENT,
            StatementExec => C::STATEMENT | C::MAY_RAISE | C::SIDE_EFFECTS,
            StatementImportStar => C::STATEMENT | C::IMPORT | C::MAY_RAISE | C::SIDE_EFFECTS,
            ConstantRef => C::EXPRESSION | C::CONSTANT,
            VariableRef => C::EXPRESSION | C::MAY_RAISE,
            FunctionCall | AttributeLookup | OperationUnary => {
                C::EXPRESSION | C::MAY_RAISE | C::SIDE_EFFECTS
            }
            KeyValuePair | SideEffects => C::EXPRESSION,
            RaiseException => C::EXPRESSION | C::MAY_RAISE | C::ALWAYS_RAISES,
            BuiltinRef | BuiltinExceptionRef | BuiltinMakeException | BuiltinGlobals
            | BuiltinLocals | BuiltinDir0 | BuiltinType1 => C::EXPRESSION | C::BUILTIN,
            BuiltinVars => C::EXPRESSION | C::BUILTIN | C::MAY_RAISE,
            BuiltinImport => OPERATION | C::IMPORT,
            ImportModule | ImportName => C::EXPRESSION | C::IMPORT | C::MAY_RAISE | C::SIDE_EFFECTS,
            ImportModuleHard | ImportModuleNameHardExists => C::EXPRESSION | C::IMPORT,
            ImportModuleNameHardMaybeExists => C::EXPRESSION | C::IMPORT | C::MAY_RAISE,
            BuiltinEval | BuiltinExec | BuiltinExecfile | BuiltinOpen | BuiltinChr
            | BuiltinOrd | BuiltinBin | BuiltinOct | BuiltinHex | BuiltinLen | BuiltinType3
            | BuiltinIter1 | BuiltinIter2 | BuiltinNext1 | BuiltinNext2 | BuiltinRange
            | BuiltinTuple | BuiltinList | BuiltinDict | BuiltinFloat | BuiltinStr
            | BuiltinBool | BuiltinInt | BuiltinLong => OPERATION,
        }
    }

    pub fn is_scope(self) -> bool {
        self.capabilities().contains(Capabilities::SCOPE)
    }

    pub fn is_expression(self) -> bool {
        self.capabilities().contains(Capabilities::EXPRESSION)
    }

    pub fn is_statement(self) -> bool {
        self.capabilities().contains(Capabilities::STATEMENT)
    }

    /// Whether this is a specific builtin operation rather than a generic
    /// call or reference.
    pub fn is_builtin_operation(self) -> bool {
        self.builtin_key().is_some()
    }

    /// Dispatch key of builtin operations for the folding visitor
    pub fn builtin_key(self) -> Option<&'static str> {
        use NodeKind::*;

        let key = match self {
            BuiltinChr => "chr",
            BuiltinOrd => "ord",
            BuiltinBin => "bin",
            BuiltinOct => "oct",
            BuiltinHex => "hex",
            BuiltinLen => "len",
            BuiltinType1 => "type1",
            BuiltinType3 => "type3",
            BuiltinIter1 => "iter1",
            BuiltinIter2 => "iter2",
            BuiltinNext1 => "next1",
            BuiltinNext2 => "next2",
            BuiltinRange => "range",
            BuiltinTuple => "tuple",
            BuiltinList => "list",
            BuiltinDict => "dict",
            BuiltinFloat => "float",
            BuiltinStr => "str",
            BuiltinBool => "bool",
            BuiltinInt => "int",
            BuiltinLong => "long",
            BuiltinImport => "import",
            BuiltinVars => "vars",
            BuiltinDir0 => "dir0",
            BuiltinGlobals => "globals",
            BuiltinLocals => "locals",
            BuiltinEval => "eval",
            BuiltinExec => "exec",
            BuiltinExecfile => "execfile",
            BuiltinOpen => "open",
            _ => return None,
        };
        Some(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_slot_lookup() {
        assert_eq!(NodeKind::FunctionCall.slot_index("called"), Some(0));
        assert_eq!(NodeKind::FunctionCall.slot_index("pairs"), Some(2));
        assert_eq!(NodeKind::FunctionCall.slot_index("nope"), None);
        assert!(NodeKind::ConstantRef.slots().is_empty());
    }

    #[test]
    fn test_conservative_defaults() {
        let caps = NodeKind::BuiltinLen.capabilities();
        assert!(caps.contains(Capabilities::MAY_RAISE));
        assert!(caps.contains(Capabilities::SIDE_EFFECTS));

        let caps = NodeKind::ConstantRef.capabilities();
        assert!(!caps.contains(Capabilities::MAY_RAISE));
        assert!(caps.contains(Capabilities::CONSTANT));

        assert!(NodeKind::ConstantRef.is_expression());
        assert!(!NodeKind::ConstantRef.is_statement());
        assert!(NodeKind::StatementReleaseVariable.is_statement());
    }

    #[test]
    fn test_builtin_keys() {
        assert_eq!(NodeKind::BuiltinType1.builtin_key(), Some("type1"));
        assert_eq!(NodeKind::BuiltinImport.builtin_key(), Some("import"));
        assert_eq!(NodeKind::FunctionCall.builtin_key(), None);
        assert!(NodeKind::BuiltinRange.is_builtin_operation());
    }
}
