//! Builtin name and builtin exception tables

use super::version::PythonVersion;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Availability {
    Both,
    Python2,
    Python3,
}

impl Availability {
    fn includes(self, version: PythonVersion) -> bool {
        match self {
            Availability::Both => true,
            Availability::Python2 => !version.is_python3(),
            Availability::Python3 => version.is_python3(),
        }
    }
}

macro_rules! builtin_exceptions {
    ($($name:ident : $parent:ident [$availability:ident]),* $(,)?) => {
        /// A builtin exception type, named as the language names it.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum ExceptionKind {
            $($name),*
        }

        impl ExceptionKind {
            pub const ALL: &'static [ExceptionKind] = &[$(ExceptionKind::$name),*];

            pub fn name(self) -> &'static str {
                match self {
                    $(ExceptionKind::$name => stringify!($name)),*
                }
            }

            fn base(self) -> ExceptionKind {
                match self {
                    $(ExceptionKind::$name => ExceptionKind::$parent),*
                }
            }

            fn availability(self) -> Availability {
                match self {
                    $(ExceptionKind::$name => Availability::$availability),*
                }
            }
        }
    };
}

builtin_exceptions! {
    BaseException: BaseException [Both],
    SystemExit: BaseException [Both],
    KeyboardInterrupt: BaseException [Both],
    GeneratorExit: BaseException [Both],
    Exception: BaseException [Both],
    StopIteration: Exception [Both],
    StopAsyncIteration: Exception [Python3],
    StandardError: Exception [Python2],
    ArithmeticError: Exception [Both],
    FloatingPointError: ArithmeticError [Both],
    OverflowError: ArithmeticError [Both],
    ZeroDivisionError: ArithmeticError [Both],
    AssertionError: Exception [Both],
    AttributeError: Exception [Both],
    BufferError: Exception [Both],
    EOFError: Exception [Both],
    ImportError: Exception [Both],
    ModuleNotFoundError: ImportError [Python3],
    LookupError: Exception [Both],
    IndexError: LookupError [Both],
    KeyError: LookupError [Both],
    MemoryError: Exception [Both],
    NameError: Exception [Both],
    UnboundLocalError: NameError [Both],
    OSError: Exception [Both],
    EnvironmentError: OSError [Both],
    IOError: OSError [Both],
    BlockingIOError: OSError [Python3],
    ChildProcessError: OSError [Python3],
    ConnectionError: OSError [Python3],
    BrokenPipeError: ConnectionError [Python3],
    FileExistsError: OSError [Python3],
    FileNotFoundError: OSError [Python3],
    InterruptedError: OSError [Python3],
    IsADirectoryError: OSError [Python3],
    NotADirectoryError: OSError [Python3],
    PermissionError: OSError [Python3],
    ProcessLookupError: OSError [Python3],
    TimeoutError: OSError [Python3],
    ReferenceError: Exception [Both],
    RuntimeError: Exception [Both],
    NotImplementedError: RuntimeError [Both],
    RecursionError: RuntimeError [Python3],
    SyntaxError: Exception [Both],
    IndentationError: SyntaxError [Both],
    TabError: IndentationError [Both],
    SystemError: Exception [Both],
    TypeError: Exception [Both],
    ValueError: Exception [Both],
    UnicodeError: ValueError [Both],
    UnicodeDecodeError: UnicodeError [Both],
    UnicodeEncodeError: UnicodeError [Both],
    UnicodeTranslateError: UnicodeError [Both],
    Warning: Exception [Both],
    DeprecationWarning: Warning [Both],
    PendingDeprecationWarning: Warning [Both],
    RuntimeWarning: Warning [Both],
    SyntaxWarning: Warning [Both],
    UserWarning: Warning [Both],
    FutureWarning: Warning [Both],
    ImportWarning: Warning [Both],
    UnicodeWarning: Warning [Both],
    BytesWarning: Warning [Both],
    ResourceWarning: Warning [Python3],
}

impl ExceptionKind {
    /// Look up a builtin exception by name for the given version.
    pub fn from_name(name: &str, version: PythonVersion) -> Option<ExceptionKind> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == name && kind.exists_in(version))
    }

    pub fn exists_in(self, version: PythonVersion) -> bool {
        self.availability().includes(version)
    }

    /// Direct base class in `version`, `None` for `BaseException`.
    pub fn parent(self, version: PythonVersion) -> Option<ExceptionKind> {
        use ExceptionKind::*;

        match self {
            BaseException => None,
            IOError | OSError if !version.is_python3() => Some(EnvironmentError),
            ArithmeticError | AssertionError | AttributeError | BufferError | EnvironmentError
            | EOFError | ImportError | LookupError | MemoryError | NameError | ReferenceError
            | RuntimeError | SyntaxError | SystemError | TypeError | ValueError
                if !version.is_python3() =>
            {
                Some(StandardError)
            }
            other => Some(other.base()),
        }
    }

    /// Whether an `except other:` clause would catch this exception.
    pub fn is_subclass_of(self, other: ExceptionKind, version: PythonVersion) -> bool {
        let mut current = Some(self);
        while let Some(kind) = current {
            if kind == other {
                return true;
            }
            current = kind.parent(version);
        }
        false
    }

    /// All exception names that are builtins in the given version.
    pub fn names(version: PythonVersion) -> impl Iterator<Item = &'static str> {
        Self::ALL
            .iter()
            .filter(move |kind| kind.exists_in(version))
            .map(|kind| kind.name())
    }
}

const COMMON_BUILTINS: &[&str] = &[
    "abs", "all", "any", "bin", "bool", "bytearray", "bytes", "callable", "chr",
    "classmethod", "compile", "complex", "delattr", "dict", "dir", "divmod",
    "enumerate", "eval", "filter", "float", "format", "frozenset", "getattr",
    "globals", "hasattr", "hash", "help", "hex", "id", "input", "int",
    "isinstance", "issubclass", "iter", "len", "list", "locals", "map", "max",
    "memoryview", "min", "next", "object", "oct", "open", "ord", "pow", "print",
    "property", "range", "repr", "reversed", "round", "set", "setattr", "slice",
    "sorted", "staticmethod", "str", "sum", "super", "tuple", "type", "vars",
    "zip", "__import__", "None", "True", "False", "Ellipsis", "NotImplemented",
    "__debug__",
];

const PYTHON2_BUILTINS: &[&str] = &[
    "apply", "basestring", "buffer", "cmp", "coerce", "execfile", "file",
    "intern", "long", "raw_input", "reduce", "reload", "unichr", "unicode",
    "xrange",
];

const PYTHON3_BUILTINS: &[&str] = &["ascii", "breakpoint", "exec", "__build_class__"];

/// Whether `name` is provided by the builtins module of `version`.
pub fn is_builtin_name(name: &str, version: PythonVersion) -> bool {
    let specific = if version.is_python3() {
        PYTHON3_BUILTINS
    } else {
        PYTHON2_BUILTINS
    };

    COMMON_BUILTINS.contains(&name)
        || specific.contains(&name)
        || ExceptionKind::from_name(name, version).is_some()
}

/// Whether `name` is a builtin exception in `version`.
pub fn is_builtin_exception_name(name: &str, version: PythonVersion) -> bool {
    ExceptionKind::from_name(name, version).is_some()
}
