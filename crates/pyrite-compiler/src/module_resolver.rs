//! Module resolver
//!
//! Answers "where does this import come from" for the optimizer. The
//! standard locator looks at a table of modules compiled into the
//! interpreter and then at the configured search paths on disk.

use pyrite_core::{ModuleFinding, ModuleName, PythonVersion};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Locates modules for imports
pub trait ModuleLocator: Send + Sync {
    /// Resolve `name` imported with `level` from inside `parent_package`.
    ///
    /// Level 0 is absolute, positive levels are explicit relative imports,
    /// `-1` tries the parent package first and then the top level.
    fn locate(
        &self,
        name: &ModuleName,
        parent_package: Option<&ModuleName>,
        level: i64,
    ) -> (ModuleName, ModuleFinding);
}

/// Shared name resolution; `probe` answers for absolute names.
fn resolve(
    name: &ModuleName,
    parent_package: Option<&ModuleName>,
    level: i64,
    probe: impl Fn(&ModuleName) -> ModuleFinding,
) -> (ModuleName, ModuleFinding) {
    if level < 0 {
        if let Some(package) = parent_package {
            let relative = package.child(name.as_str());
            let finding = probe(&relative);
            if finding.is_found() {
                return (relative, finding);
            }
        }
        let finding = probe(name);
        return (name.clone(), finding);
    }

    match ModuleName::relative_to(parent_package, level as usize, name.as_str()) {
        Some(full_name) if !full_name.is_empty() => {
            let finding = probe(&full_name);
            (full_name, finding)
        }
        _ => (name.clone(), ModuleFinding::NotFound),
    }
}

const PYTHON3_BUILTIN_MODULES: &[&str] = &[
    "builtins",
    "sys",
    "_imp",
    "_io",
    "_thread",
    "_warnings",
    "_weakref",
    "_codecs",
    "_signal",
    "_sre",
    "_stat",
    "_string",
    "atexit",
    "errno",
    "gc",
    "itertools",
    "marshal",
    "posix",
    "pwd",
    "time",
];

const PYTHON2_BUILTIN_MODULES: &[&str] = &[
    "__builtin__",
    "sys",
    "imp",
    "_codecs",
    "_sre",
    "_warnings",
    "_weakref",
    "errno",
    "exceptions",
    "gc",
    "marshal",
    "posix",
    "pwd",
    "signal",
    "thread",
    "zipimport",
];

/// Locator over the interpreter's built-in modules and directories on disk
#[derive(Debug, Clone)]
pub struct StandardLocator {
    version: PythonVersion,
    builtin_modules: HashSet<String>,
    search_paths: Vec<PathBuf>,
}

impl StandardLocator {
    pub fn new(version: PythonVersion) -> Self {
        let table = if version.is_python3() {
            PYTHON3_BUILTIN_MODULES
        } else {
            PYTHON2_BUILTIN_MODULES
        };

        Self {
            version,
            // `__future__` has a file, but its content is fixed by the compiler.
            builtin_modules: table
                .iter()
                .chain(&["__future__"])
                .map(|name| name.to_string())
                .collect(),
            search_paths: Vec::new(),
        }
    }

    pub fn with_search_paths(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.search_paths.extend(paths);
        self
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    pub fn is_builtin_module(&self, name: &ModuleName) -> bool {
        self.builtin_modules.contains(name.as_str())
    }

    fn find(&self, name: &ModuleName) -> ModuleFinding {
        if self.is_builtin_module(name) {
            return ModuleFinding::BuiltIn;
        }

        let mut namespace = None;
        for base in &self.search_paths {
            match self.find_in(base, name) {
                ModuleFinding::Namespace(path) => {
                    namespace.get_or_insert(path);
                }
                ModuleFinding::NotFound => {}
                found => return found,
            }
        }

        // A namespace package only counts if no regular module exists anywhere.
        match namespace {
            Some(path) => ModuleFinding::Namespace(path),
            None => ModuleFinding::NotFound,
        }
    }

    fn find_in(&self, base: &Path, name: &ModuleName) -> ModuleFinding {
        let mut directory = base.to_path_buf();
        let components: Vec<&str> = name.components().collect();
        let Some((last, packages)) = components.split_last() else {
            return ModuleFinding::NotFound;
        };

        for package in packages {
            directory.push(package);
            let init = directory.join("__init__.py");
            if !init.is_file() && !(self.version.is_python3() && directory.is_dir()) {
                return ModuleFinding::NotFound;
            }
        }

        let package_dir = directory.join(last);
        let init = package_dir.join("__init__.py");
        if init.is_file() {
            return ModuleFinding::Found(init);
        }

        let module_file = directory.join(format!("{}.py", last));
        if module_file.is_file() {
            return ModuleFinding::Found(module_file);
        }

        if self.version.is_python3() && package_dir.is_dir() {
            return ModuleFinding::Namespace(package_dir);
        }

        ModuleFinding::NotFound
    }
}

impl ModuleLocator for StandardLocator {
    fn locate(
        &self,
        name: &ModuleName,
        parent_package: Option<&ModuleName>,
        level: i64,
    ) -> (ModuleName, ModuleFinding) {
        resolve(name, parent_package, level, |full_name| self.find(full_name))
    }
}

/// In-memory locator with a fixed set of modules
#[derive(Debug, Clone, Default)]
pub struct StaticLocator {
    modules: HashMap<ModuleName, ModuleFinding>,
}

impl StaticLocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_module(mut self, name: &str, finding: ModuleFinding) -> Self {
        self.modules.insert(ModuleName::new(name), finding);
        self
    }
}

impl ModuleLocator for StaticLocator {
    fn locate(
        &self,
        name: &ModuleName,
        parent_package: Option<&ModuleName>,
        level: i64,
    ) -> (ModuleName, ModuleFinding) {
        resolve(name, parent_package, level, |full_name| {
            self.modules
                .get(full_name)
                .cloned()
                .unwrap_or(ModuleFinding::NotFound)
        })
    }
}
