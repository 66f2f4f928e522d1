//! Hard imports
//!
//! Imports of modules the compiler knows to exist, and of names inside them.
//! They never fail, so evaluating them raises nothing.

use crate::error::{CompileError, Result};
use crate::module_resolver::ModuleLocator;
use pyrite_core::ast::HardImportSpec;
use pyrite_core::{ModuleFinding, ModuleName, NodeId, NodeKind, Payload, PythonVersion, SourceRef, Tree};

/// Modules whose import is treated as hard
const HARD_MODULES: &[&str] = &[
    "__future__",
    "sys",
    "os",
    "types",
    "functools",
    "importlib",
    "site",
    "ctypes",
];

const FUTURE_NAMES: &[&str] = &[
    "nested_scopes",
    "generators",
    "division",
    "absolute_import",
    "with_statement",
    "print_function",
    "unicode_literals",
    "barry_as_FLUFL",
    "generator_stop",
    "annotations",
];

const SYS_NAMES: &[&str] = &[
    "argv",
    "byteorder",
    "exc_info",
    "executable",
    "exit",
    "flags",
    "getrecursionlimit",
    "maxsize",
    "modules",
    "path",
    "platform",
    "prefix",
    "stderr",
    "stdin",
    "stdout",
    "version",
    "version_info",
];

const OS_NAMES: &[&str] = &[
    "environ", "getcwd", "listdir", "name", "path", "sep", "stat", "unlink",
];

pub fn is_hard_module(name: &ModuleName) -> bool {
    HARD_MODULES.contains(&name.as_str())
}

/// Whether `name` is known to exist in the hard module `module`
pub fn is_known_name(module: &ModuleName, name: &str, version: PythonVersion) -> bool {
    match module.as_str() {
        "__future__" => FUTURE_NAMES.contains(&name) || name == "all_feature_names",
        "sys" => SYS_NAMES.contains(&name) || (!version.is_python3() && name == "maxint"),
        "os" => OS_NAMES.contains(&name),
        _ => false,
    }
}

fn locate_hard(locator: &dyn ModuleLocator, module_name: &ModuleName) -> Result<ModuleFinding> {
    let (_, finding) = locator.locate(module_name, None, 0);
    if !finding.is_found() {
        return Err(CompileError::internal(format!(
            "hard import of '{}' cannot be located",
            module_name
        )));
    }
    Ok(finding)
}

/// Build an `ImportModuleHard` node. The module has to be locatable.
pub fn make_import_hard(
    tree: &mut Tree,
    locator: &dyn ModuleLocator,
    module_name: &ModuleName,
    source_ref: SourceRef,
) -> Result<NodeId> {
    let finding = locate_hard(locator, module_name)?;
    let node = tree.new_node(
        NodeKind::ImportModuleHard,
        source_ref,
        Payload::HardImport(HardImportSpec {
            module_name: module_name.clone(),
            import_name: None,
            finding,
        }),
        vec![],
    )?;
    Ok(node)
}

/// Build a node for `module.name` of a hard module, `Exists` when the name
/// is known, `MaybeExists` otherwise.
pub fn make_import_name_hard(
    tree: &mut Tree,
    locator: &dyn ModuleLocator,
    module_name: &ModuleName,
    name: &str,
    version: PythonVersion,
    source_ref: SourceRef,
) -> Result<NodeId> {
    let finding = locate_hard(locator, module_name)?;
    let kind = if is_known_name(module_name, name, version) {
        NodeKind::ImportModuleNameHardExists
    } else {
        NodeKind::ImportModuleNameHardMaybeExists
    };

    let node = tree.new_node(
        kind,
        source_ref,
        Payload::HardImport(HardImportSpec {
            module_name: module_name.clone(),
            import_name: Some(name.to_string()),
            finding,
        }),
        vec![],
    )?;
    Ok(node)
}
