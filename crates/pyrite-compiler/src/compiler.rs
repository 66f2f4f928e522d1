//! Main compiler
//!
//! Options and the entry points that lower imports of a module and optimize
//! its tree.

use crate::error::{CompileError, Result};
use crate::module_resolver::{ModuleLocator, StandardLocator};
use crate::optimizer::{FixedPointDriver, OptimizationReport};
use crate::reformulation::ModuleReformulation;
use pyrite_core::{ModuleName, PythonVersion, Tree};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Compiler options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerOptions {
    /// Language version of the compiled source
    pub python_version: PythonVersion,
    /// Enable specialization of calls to optional builtins
    pub enable_builtin_replacement: bool,
    /// Enable replacement of builtin exception names and quick names
    pub enable_exception_name_replacement: bool,
    /// Enable constant folding optimization
    pub enable_constant_folding: bool,
    /// Passes after which a still changing tree is a compiler bug
    pub max_passes: usize,
    /// Directories searched for modules
    pub search_paths: Vec<PathBuf>,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            python_version: PythonVersion::Python3,
            enable_builtin_replacement: true,
            enable_exception_name_replacement: true,
            enable_constant_folding: true,
            max_passes: 64,
            search_paths: Vec::new(),
        }
    }
}

impl CompilerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_python_version(mut self, version: PythonVersion) -> Self {
        self.python_version = version;
        self
    }

    pub fn with_builtin_replacement(mut self, enabled: bool) -> Self {
        self.enable_builtin_replacement = enabled;
        self
    }

    pub fn with_exception_name_replacement(mut self, enabled: bool) -> Self {
        self.enable_exception_name_replacement = enabled;
        self
    }

    pub fn with_constant_folding(mut self, enabled: bool) -> Self {
        self.enable_constant_folding = enabled;
        self
    }

    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    pub fn with_search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.search_paths.push(path.into());
        self
    }

    /// Parse options from YAML; missing keys keep their defaults
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| CompileError::Config(format!("invalid compiler options: {}", e)))
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CompileError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&content)
    }
}

/// The Pyrite compiler
pub struct Compiler {
    /// Compiler options
    options: CompilerOptions,
    /// Module locator shared by every unit
    locator: Box<dyn ModuleLocator>,
}

impl Compiler {
    /// Create a new compiler instance with default options
    pub fn new() -> Self {
        Self::with_options(CompilerOptions::default())
    }

    /// Create a new compiler instance with custom options
    pub fn with_options(options: CompilerOptions) -> Self {
        let locator = StandardLocator::new(options.python_version)
            .with_search_paths(options.search_paths.iter().cloned());

        Self {
            options,
            locator: Box::new(locator),
        }
    }

    /// Use `locator` instead of the standard one
    pub fn with_locator(mut self, locator: impl ModuleLocator + 'static) -> Self {
        self.locator = Box::new(locator);
        self
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    pub fn locator(&self) -> &dyn ModuleLocator {
        self.locator.as_ref()
    }

    /// Import lowering state for one module
    pub fn reformulation(
        &self,
        module_name: ModuleName,
        file: impl Into<String>,
        source: &str,
    ) -> ModuleReformulation {
        ModuleReformulation::new(module_name, file, source, self.options.python_version)
    }

    /// Optimize a module tree until it is stable
    pub fn optimize_module(&self, tree: &mut Tree) -> Result<OptimizationReport> {
        let mut driver = FixedPointDriver::new(&self.options);
        debug!(visitors = ?driver.visitor_names(), "optimizing module");
        driver.run(tree, &self.options, self.locator.as_ref())
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pyrite_core::ast::VariableKind;
    use pyrite_core::{Constant, NodeKind, SourceRef};

    fn sref() -> SourceRef {
        SourceRef::new("m.py", 1, 0)
    }

    #[test]
    fn test_options_default() {
        let options = CompilerOptions::default();
        assert_eq!(options.python_version, PythonVersion::Python3);
        assert!(options.enable_builtin_replacement);
        assert!(options.enable_exception_name_replacement);
        assert!(options.enable_constant_folding);
        assert_eq!(options.max_passes, 64);
        assert!(options.search_paths.is_empty());
    }

    #[test]
    fn test_options_from_yaml() {
        let options = CompilerOptions::from_yaml_str(
            "python_version: python2\nenable_constant_folding: false\nsearch_paths:\n  - lib\n",
        )
        .unwrap();

        assert_eq!(options.python_version, PythonVersion::Python2);
        assert!(!options.enable_constant_folding);
        assert!(options.enable_builtin_replacement);
        assert_eq!(options.search_paths, vec![PathBuf::from("lib")]);
    }

    #[test]
    fn test_options_from_invalid_yaml() {
        let result = CompilerOptions::from_yaml_str("python_version: python4\n");
        assert!(matches!(result, Err(CompileError::Config(_))));

        let result = CompilerOptions::from_yaml_file("/nonexistent/pyrite.yaml");
        assert!(matches!(result, Err(CompileError::Config(_))));
    }

    #[test]
    fn test_compiler_with_options() {
        let options = CompilerOptions::new()
            .with_python_version(PythonVersion::Python2)
            .with_exception_name_replacement(false)
            .with_max_passes(8)
            .with_search_path("lib");
        let compiler = Compiler::with_options(options);

        assert_eq!(compiler.options().python_version, PythonVersion::Python2);
        assert!(!compiler.options().enable_exception_name_replacement);
        assert_eq!(compiler.options().max_passes, 8);
        assert_eq!(compiler.options().search_paths, vec![PathBuf::from("lib")]);
    }

    #[test]
    fn test_compiler_optimize_module() {
        let compiler = Compiler::new();

        let mut tree = Tree::new();
        let module = tree.make_scope(NodeKind::Module, "m", sref()).unwrap();
        let chr = tree.declare_variable(module, "chr", VariableKind::Module).unwrap();
        let x = tree.declare_variable(module, "x", VariableKind::Module).unwrap();

        let called = tree.make_variable_ref(chr, sref()).unwrap();
        let argument = tree.make_constant(Constant::Int(65), sref()).unwrap();
        let call = tree.make_call(called, vec![argument], vec![], sref()).unwrap();
        let assign = tree.make_assignment(x, call, sref()).unwrap();
        let body = tree.make_statements(vec![assign], sref()).unwrap();
        tree.set_body(module, body).unwrap();
        tree.set_root(module).unwrap();

        let report = compiler.optimize_module(&mut tree).unwrap();
        assert_eq!(report.passes, 2);

        let source = tree.child(assign, "source").unwrap().unwrap();
        assert_eq!(tree.constant(source), Some(&Constant::Str("A".to_string())));
    }
}
