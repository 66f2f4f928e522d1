//! Reformulation of import statements
//!
//! Lowers `import` and `from ... import` into the node shapes the optimizer
//! works on. State that spans the statements of one module, such as the
//! enabled future features, lives in a [`ModuleReformulation`] created for
//! that module alone.

pub mod future;
pub mod helpers;
pub mod imports;

pub use future::{FutureFeature, FutureFlags};
pub use helpers::mangle_name;
pub use imports::{ImportAlias, ImportStatement, ImportedNames};

use crate::error::{CompileError, SyntaxError};
use pyrite_core::{ModuleName, PythonVersion, SourceRef};

/// Per-module reformulation state
#[derive(Debug, Clone)]
pub struct ModuleReformulation {
    module_name: ModuleName,
    file: String,
    source_lines: Vec<String>,
    version: PythonVersion,
    future_flags: FutureFlags,
    /// A statement other than a future import was lowered
    statements_seen: bool,
    temp_count: usize,
}

impl ModuleReformulation {
    pub fn new(
        module_name: ModuleName,
        file: impl Into<String>,
        source: &str,
        version: PythonVersion,
    ) -> Self {
        Self {
            module_name,
            file: file.into(),
            source_lines: source.lines().map(str::to_string).collect(),
            version,
            future_flags: FutureFlags::empty(),
            statements_seen: false,
            temp_count: 0,
        }
    }

    pub fn module_name(&self) -> &ModuleName {
        &self.module_name
    }

    pub fn version(&self) -> PythonVersion {
        self.version
    }

    pub fn future_flags(&self) -> FutureFlags {
        self.future_flags
    }

    /// Record a statement that is not an import. The module docstring does
    /// not count.
    pub fn note_statement(&mut self) {
        self.statements_seen = true;
    }

    /// Text of a 1-based source line
    pub fn source_line(&self, line: u32) -> Option<&str> {
        let index = usize::try_from(line).ok()?.checked_sub(1)?;
        self.source_lines.get(index).map(String::as_str)
    }

    /// Syntax error at `source_ref` with the offending line attached
    pub fn syntax_error(&self, reason: impl Into<String>, source_ref: &SourceRef) -> CompileError {
        let mut error = SyntaxError::new(reason)
            .at(self.file.clone(), source_ref.line())
            .with_column(source_ref.column() + 1);
        if let Some(line) = self.source_line(source_ref.line()) {
            error = error.with_source_line(line);
        }
        CompileError::Syntax(error)
    }

    fn next_temp_name(&mut self, prefix: &str) -> String {
        self.temp_count += 1;
        format!("tmp_{}_{}", prefix, self.temp_count)
    }
}
