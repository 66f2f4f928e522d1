//! Dotted module names and module lookup results

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A dotted module name such as `os.path`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleName(String);

impl ModuleName {
    pub fn new(name: impl Into<String>) -> Self {
        ModuleName(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.split('.').filter(|part| !part.is_empty())
    }

    /// First component, `os` for `os.path`
    pub fn top_level(&self) -> &str {
        self.0.split('.').next().unwrap_or("")
    }

    /// Containing package, `None` for top level modules
    pub fn package_name(&self) -> Option<ModuleName> {
        self.0
            .rsplit_once('.')
            .map(|(package, _)| ModuleName::new(package))
    }

    pub fn child(&self, name: &str) -> ModuleName {
        if self.is_empty() {
            ModuleName::new(name)
        } else if name.is_empty() {
            self.clone()
        } else {
            ModuleName::new(format!("{}.{}", self.0, name))
        }
    }

    /// Whether this names `other` or a module inside it
    pub fn is_below_or_same(&self, other: &ModuleName) -> bool {
        self.0 == other.0
            || (self.0.starts_with(&other.0) && self.0[other.0.len()..].starts_with('.'))
    }

    /// Resolve a relative import of `level` dots against `package`.
    ///
    /// Level 1 is the package itself; each further level goes one package
    /// up. Returns `None` when the import reaches beyond the top level.
    pub fn relative_to(package: Option<&ModuleName>, level: usize, name: &str) -> Option<ModuleName> {
        if level == 0 {
            return Some(ModuleName::new(name));
        }

        let mut base = package?.clone();
        for _ in 1..level {
            base = base.package_name()?;
        }
        Some(base.child(name))
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModuleName {
    fn from(name: &str) -> Self {
        ModuleName::new(name)
    }
}

/// Outcome of locating a module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum ModuleFinding {
    /// Compiled into the interpreter, no backing file
    BuiltIn,
    /// Module file or package `__init__` file
    Found(PathBuf),
    /// Namespace package directory
    Namespace(PathBuf),
    NotFound,
}

impl ModuleFinding {
    pub fn is_found(&self) -> bool {
        !matches!(self, ModuleFinding::NotFound)
    }

    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            ModuleFinding::Found(path) | ModuleFinding::Namespace(path) => Some(path),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_name() {
        assert_eq!(
            ModuleName::new("os.path").package_name(),
            Some(ModuleName::new("os"))
        );
        assert_eq!(ModuleName::new("os").package_name(), None);
        assert_eq!(ModuleName::new("a.b.c").top_level(), "a");
    }

    #[test]
    fn test_relative_resolution() {
        let package = ModuleName::new("pkg.sub");

        assert_eq!(
            ModuleName::relative_to(Some(&package), 1, "mod"),
            Some(ModuleName::new("pkg.sub.mod"))
        );
        assert_eq!(
            ModuleName::relative_to(Some(&package), 2, "mod"),
            Some(ModuleName::new("pkg.mod"))
        );
        assert_eq!(
            ModuleName::relative_to(Some(&package), 1, ""),
            Some(package.clone())
        );
        assert_eq!(ModuleName::relative_to(Some(&package), 3, "mod"), None);
        assert_eq!(ModuleName::relative_to(None, 1, "mod"), None);
    }

    #[test]
    fn test_is_below_or_same() {
        let os = ModuleName::new("os");
        assert!(ModuleName::new("os.path").is_below_or_same(&os));
        assert!(os.is_below_or_same(&os));
        assert!(!ModuleName::new("osx").is_below_or_same(&os));
    }
}
