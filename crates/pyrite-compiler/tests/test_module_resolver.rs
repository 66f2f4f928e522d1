//! Tests for module location on disk
//!
//! Each test lays out a throw-away search path and resolves names in it.

use anyhow::Result;
use pyrite_compiler::{Compiler, CompilerOptions, ModuleLocator, StandardLocator};
use pyrite_core::{ModuleFinding, ModuleName, PythonVersion};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(base: &Path, relative: &str) -> Result<()> {
    let path = base.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, "")?;
    Ok(())
}

/// ```text
/// pkg/__init__.py
/// pkg/util.py
/// pkg/sub/__init__.py
/// helper.py
/// nspkg/mod.py          (no __init__.py)
/// ```
fn search_path() -> Result<TempDir> {
    let dir = TempDir::new()?;
    write(dir.path(), "pkg/__init__.py")?;
    write(dir.path(), "pkg/util.py")?;
    write(dir.path(), "pkg/sub/__init__.py")?;
    write(dir.path(), "helper.py")?;
    write(dir.path(), "nspkg/mod.py")?;
    Ok(dir)
}

fn locate(locator: &StandardLocator, name: &str, package: Option<&str>, level: i64) -> (ModuleName, ModuleFinding) {
    let package = package.map(ModuleName::new);
    locator.locate(&ModuleName::new(name), package.as_ref(), level)
}

// =============================================================================
// Absolute Import Tests
// =============================================================================

#[test]
fn test_module_file_and_package() -> Result<()> {
    let dir = search_path()?;
    let locator = StandardLocator::new(PythonVersion::Python3).with_search_paths(vec![dir.path().to_path_buf()]);

    let (_, finding) = locate(&locator, "helper", None, 0);
    assert_eq!(finding, ModuleFinding::Found(dir.path().join("helper.py")));

    let (_, finding) = locate(&locator, "pkg", None, 0);
    assert_eq!(finding, ModuleFinding::Found(dir.path().join("pkg/__init__.py")));

    let (_, finding) = locate(&locator, "pkg.sub", None, 0);
    assert_eq!(finding, ModuleFinding::Found(dir.path().join("pkg/sub/__init__.py")));

    let (_, finding) = locate(&locator, "missing", None, 0);
    assert_eq!(finding, ModuleFinding::NotFound);
    Ok(())
}

#[test]
fn test_namespace_package_needs_python3() -> Result<()> {
    let dir = search_path()?;

    let python3 = StandardLocator::new(PythonVersion::Python3).with_search_paths(vec![dir.path().to_path_buf()]);
    let (_, finding) = locate(&python3, "nspkg", None, 0);
    assert_eq!(finding, ModuleFinding::Namespace(dir.path().join("nspkg")));
    let (_, finding) = locate(&python3, "nspkg.mod", None, 0);
    assert_eq!(finding, ModuleFinding::Found(dir.path().join("nspkg/mod.py")));

    let python2 = StandardLocator::new(PythonVersion::Python2).with_search_paths(vec![dir.path().to_path_buf()]);
    let (_, finding) = locate(&python2, "nspkg", None, 0);
    assert_eq!(finding, ModuleFinding::NotFound);
    let (_, finding) = locate(&python2, "nspkg.mod", None, 0);
    assert_eq!(finding, ModuleFinding::NotFound);
    Ok(())
}

#[test]
fn test_regular_module_wins_over_namespace() -> Result<()> {
    let namespace_dir = TempDir::new()?;
    write(namespace_dir.path(), "shared/data.txt")?;
    let module_dir = TempDir::new()?;
    write(module_dir.path(), "shared.py")?;

    let locator = StandardLocator::new(PythonVersion::Python3).with_search_paths(vec![
        namespace_dir.path().to_path_buf(),
        module_dir.path().to_path_buf(),
    ]);

    let (_, finding) = locate(&locator, "shared", None, 0);
    assert_eq!(finding, ModuleFinding::Found(module_dir.path().join("shared.py")));
    Ok(())
}

// =============================================================================
// Relative Import Tests
// =============================================================================

#[test]
fn test_relative_levels() -> Result<()> {
    let dir = search_path()?;
    let locator = StandardLocator::new(PythonVersion::Python3).with_search_paths(vec![dir.path().to_path_buf()]);

    let (name, finding) = locate(&locator, "util", Some("pkg"), 1);
    assert_eq!(name.as_str(), "pkg.util");
    assert!(finding.is_found());

    let (name, finding) = locate(&locator, "util", Some("pkg.sub"), 2);
    assert_eq!(name.as_str(), "pkg.util");
    assert!(finding.is_found());

    // Beyond the top level package
    let (_, finding) = locate(&locator, "util", Some("pkg"), 3);
    assert_eq!(finding, ModuleFinding::NotFound);
    Ok(())
}

#[test]
fn test_python2_implicit_relative_import() -> Result<()> {
    let dir = search_path()?;
    let locator = StandardLocator::new(PythonVersion::Python2).with_search_paths(vec![dir.path().to_path_buf()]);

    // Sibling module first
    let (name, finding) = locate(&locator, "util", Some("pkg"), -1);
    assert_eq!(name.as_str(), "pkg.util");
    assert!(finding.is_found());

    // Then the top level
    let (name, finding) = locate(&locator, "helper", Some("pkg"), -1);
    assert_eq!(name.as_str(), "helper");
    assert!(finding.is_found());

    // Built-in modules never touch the disk
    let (name, finding) = locate(&locator, "sys", Some("pkg"), -1);
    assert_eq!(name.as_str(), "sys");
    assert_eq!(finding, ModuleFinding::BuiltIn);
    Ok(())
}

// =============================================================================
// Configuration Tests
// =============================================================================

#[test]
fn test_compiler_locator_uses_configured_search_paths() -> Result<()> {
    let dir = search_path()?;
    let config = dir.path().join("pyrite.yaml");
    fs::write(
        &config,
        format!("python_version: python3\nsearch_paths:\n  - {}\n", dir.path().display()),
    )?;

    let options = CompilerOptions::from_yaml_file(&config)?;
    let compiler = Compiler::with_options(options);

    let (_, finding) = compiler.locator().locate(&ModuleName::new("pkg.util"), None, 0);
    assert_eq!(finding, ModuleFinding::Found(dir.path().join("pkg/util.py")));
    Ok(())
}
