//! Source references carried by every node

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A position in a source file.
///
/// `line` is 1-based, `column` is the 0-based offset the parser reports.
/// The file name is shared between all references of one module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceRef {
    file: Arc<str>,
    line: u32,
    column: u32,
}

impl SourceRef {
    pub fn new(file: impl Into<Arc<str>>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    /// A reference for nodes the compiler invents without a real location.
    pub fn internal() -> Self {
        Self::new("<internal>", 0, 0)
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> u32 {
        self.column
    }

    /// Same file and line, different column.
    pub fn at_column(&self, column: u32) -> Self {
        Self {
            file: Arc::clone(&self.file),
            line: self.line,
            column,
        }
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}
