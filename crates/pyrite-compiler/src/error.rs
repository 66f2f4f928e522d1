//! Compiler error types
//!
//! Only two families use this channel: syntax errors found while lowering
//! the source, and internal errors of the compiler itself. Errors the
//! compiled program will raise are placed in the tree instead.

use pyrite_core::CoreError;
use std::fmt;
use thiserror::Error;

/// Compiler error
#[derive(Error, Debug)]
pub enum CompileError {
    /// Malformed source, reported to the user
    #[error("{0}")]
    Syntax(SyntaxError),

    /// An optimizer invariant does not hold
    #[error("Internal error: {0}")]
    Internal(String),

    /// The tree itself is corrupted
    #[error("Internal error: {0}")]
    Tree(#[from] CoreError),

    /// Options could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CompileError {
    pub fn internal(message: impl Into<String>) -> Self {
        CompileError::Internal(message.into())
    }

    /// Whether this is a bug in the compiler rather than in its input
    pub fn is_internal(&self) -> bool {
        matches!(self, CompileError::Internal(_) | CompileError::Tree(_))
    }

    /// Text shown to the user
    pub fn report(&self) -> String {
        match self {
            CompileError::Syntax(error) => error.to_string(),
            CompileError::Config(message) => format!("Error: {}", message),
            internal => format!(
                "Pyrite: {}\n\
                 This is a bug in the compiler, not in your program.\n\
                 Please report it together with the source that triggered it.",
                internal
            ),
        }
    }
}

impl From<SyntaxError> for CompileError {
    fn from(error: SyntaxError) -> Self {
        CompileError::Syntax(error)
    }
}

/// A syntax error with the location and line it was found on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub reason: String,
    pub file: Option<String>,
    pub line: Option<u32>,
    /// 1-based
    pub column: Option<u32>,
    pub source_line: Option<String>,
}

impl SyntaxError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            file: None,
            line: None,
            column: None,
            source_line: None,
        }
    }

    pub fn at(mut self, file: impl Into<String>, line: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }

    pub fn with_column(mut self, column: u32) -> Self {
        self.column = Some(column);
        self
    }

    pub fn with_source_line(mut self, source_line: impl Into<String>) -> Self {
        self.source_line = Some(source_line.into());
        self
    }
}

impl fmt::Display for SyntaxError {
    /// Rendered the way the interpreter prints syntax errors:
    ///
    /// ```text
    ///   File "mod.py", line 3
    ///     from os import *
    ///     ^
    /// SyntaxError: import * only allowed at module level
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => writeln!(f, "  File \"{}\", line {}", file, line)?,
            (Some(file), None) => writeln!(f, "  File \"{}\"", file)?,
            _ => {}
        }

        if let Some(source_line) = &self.source_line {
            let stripped = source_line.trim_start();
            let indent = source_line.len() - stripped.len();
            writeln!(f, "    {}", stripped.trim_end())?;

            if let Some(column) = self.column {
                let offset = (column as usize).saturating_sub(1).saturating_sub(indent);
                writeln!(f, "    {}^", " ".repeat(offset))?;
            }
        }

        write!(f, "SyntaxError: {}", self.reason)
    }
}

/// Result type for compiler operations
pub type Result<T> = std::result::Result<T, CompileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_rendering() {
        let error = SyntaxError::new("import * only allowed at module level")
            .at("mod.py", 3)
            .with_column(5)
            .with_source_line("    from os import *");

        assert_eq!(
            error.to_string(),
            "  File \"mod.py\", line 3\n    from os import *\n    ^\nSyntaxError: import * only allowed at module level"
        );
    }

    #[test]
    fn test_syntax_error_without_location() {
        let error = SyntaxError::new("not a chance");
        assert_eq!(error.to_string(), "SyntaxError: not a chance");
    }

    #[test]
    fn test_internal_errors_are_distinguished() {
        let internal = CompileError::internal("dispatch state");
        assert!(internal.is_internal());
        assert!(internal.report().contains("Please report"));

        let syntax = CompileError::from(SyntaxError::new("bad"));
        assert!(!syntax.is_internal());
        assert!(!syntax.report().contains("Please report"));

        let tree = CompileError::from(CoreError::MissingRoot);
        assert!(tree.is_internal());
    }
}
