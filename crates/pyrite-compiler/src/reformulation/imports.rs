//! Import statements
//!
//! - `import a.b` binds `a` to the imported top level package.
//! - `import a.b as c` binds `c` to attribute `b` of that package.
//! - `from m import x` binds `x` to an `ImportName` of the imported module;
//!   several names share one temporary that is released afterwards.
//! - `from m import *` becomes a star import statement.
//! - `from __future__ import f` enables the feature for the module and
//!   binds `f` to the hard import of the feature.

use super::future::{FutureFeature, FutureFlags};
use super::helpers::{binding_variable, make_statements_or_statement};
use super::ModuleReformulation;
use crate::error::Result;
use crate::hard_imports::make_import_name_hard;
use crate::module_resolver::ModuleLocator;
use pyrite_core::ast::{ImportSpec, VariableKind};
use pyrite_core::{ModuleName, NodeId, NodeKind, Payload, SourceRef, Tree};
use tracing::trace;

/// `name as asname`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportAlias {
    pub name: String,
    pub asname: Option<String>,
}

impl ImportAlias {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            asname: None,
        }
    }

    pub fn with_asname(mut self, asname: impl Into<String>) -> Self {
        self.asname = Some(asname.into());
        self
    }

    /// Name the alias binds
    fn target(&self) -> &str {
        self.asname.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportedNames {
    Names(Vec<ImportAlias>),
    Star,
}

/// An import statement as the parser delivers it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportStatement {
    /// `import a.b, c as d`
    Import(Vec<ImportAlias>),
    /// `from .module import names`; `module` is empty for `from . import x`
    ImportFrom {
        module: String,
        names: ImportedNames,
        level: usize,
    },
}

impl ModuleReformulation {
    /// Lower `statement` found in scope `provider`. Returns the statement
    /// node, a sequence when several bindings result.
    pub fn reformulate_import(
        &mut self,
        tree: &mut Tree,
        locator: &dyn ModuleLocator,
        provider: NodeId,
        statement: &ImportStatement,
        source_ref: SourceRef,
    ) -> Result<NodeId> {
        match statement {
            ImportStatement::ImportFrom {
                module,
                names,
                level: 0,
            } if module == "__future__" => self.import_future(tree, locator, provider, names, source_ref),
            ImportStatement::ImportFrom {
                module,
                names,
                level,
            } => {
                self.note_statement();
                self.import_from(tree, provider, module, names, *level, source_ref)
            }
            ImportStatement::Import(aliases) => {
                self.note_statement();
                self.import_modules(tree, provider, aliases, source_ref)
            }
        }
    }

    /// Level of imports without leading dots
    fn default_level(&self) -> i64 {
        if self.future_flags().absolute_import(self.version()) {
            0
        } else {
            -1
        }
    }

    fn import_modules(
        &mut self,
        tree: &mut Tree,
        provider: NodeId,
        aliases: &[ImportAlias],
        source_ref: SourceRef,
    ) -> Result<NodeId> {
        let level = self.default_level();
        let mut statements = Vec::with_capacity(aliases.len());

        for alias in aliases {
            let module_name = ModuleName::new(alias.name.as_str());
            let import = make_import_module(tree, &module_name, Vec::new(), level, source_ref.clone())?;

            let (target, value) = match &alias.asname {
                None => (module_name.top_level().to_string(), import),
                Some(asname) => {
                    let mut value = import;
                    for component in module_name.components().skip(1) {
                        value = tree.make_attribute_lookup(value, component, source_ref.clone())?;
                    }
                    (asname.clone(), value)
                }
            };

            let variable = binding_variable(tree, provider, &target)?;
            statements.push(tree.make_assignment(variable, value, source_ref.clone())?);
        }

        make_statements_or_statement(tree, statements, source_ref)
    }

    fn import_from(
        &mut self,
        tree: &mut Tree,
        provider: NodeId,
        module: &str,
        names: &ImportedNames,
        level: usize,
        source_ref: SourceRef,
    ) -> Result<NodeId> {
        let level = match level {
            0 => self.default_level(),
            level => level as i64,
        };
        let module_name = ModuleName::new(module);

        let aliases = match names {
            ImportedNames::Star => {
                if self.version().is_python3() && tree.kind(provider)? != NodeKind::Module {
                    return Err(self.syntax_error("import * only allowed at module level", &source_ref));
                }
                let import =
                    make_import_module(tree, &module_name, vec!["*".to_string()], level, source_ref.clone())?;
                return Ok(tree.new_node(
                    NodeKind::StatementImportStar,
                    source_ref,
                    Payload::None,
                    vec![import.into()],
                )?);
            }
            ImportedNames::Names(aliases) => aliases,
        };

        let import_list = aliases.iter().map(|alias| alias.name.clone()).collect();
        let import = make_import_module(tree, &module_name, import_list, level, source_ref.clone())?;

        if let [alias] = aliases.as_slice() {
            let value = make_import_name(tree, import, &alias.name, level, source_ref.clone())?;
            let variable = binding_variable(tree, provider, alias.target())?;
            return Ok(tree.make_assignment(variable, value, source_ref)?);
        }

        let temp_name = self.next_temp_name("import_from");
        let temp = tree.declare_variable(provider, temp_name, VariableKind::Temp)?;
        trace!(module = %module_name, names = aliases.len(), "import from via temporary");

        let mut statements = vec![tree.make_assignment(temp, import, source_ref.clone())?];
        for alias in aliases {
            let module_ref = tree.make_variable_ref(temp, source_ref.clone())?;
            let value = make_import_name(tree, module_ref, &alias.name, level, source_ref.clone())?;
            let variable = binding_variable(tree, provider, alias.target())?;
            statements.push(tree.make_assignment(variable, value, source_ref.clone())?);
        }
        statements.push(tree.make_release(temp, source_ref.clone())?);

        make_statements_or_statement(tree, statements, source_ref)
    }

    fn import_future(
        &mut self,
        tree: &mut Tree,
        locator: &dyn ModuleLocator,
        provider: NodeId,
        names: &ImportedNames,
        source_ref: SourceRef,
    ) -> Result<NodeId> {
        if self.statements_seen || tree.kind(provider)? != NodeKind::Module {
            return Err(self.syntax_error(
                "from __future__ imports must occur at the beginning of the file",
                &source_ref,
            ));
        }
        let ImportedNames::Names(aliases) = names else {
            return Err(self.syntax_error("future feature * is not defined", &source_ref));
        };

        for alias in aliases {
            match FutureFlags::lookup(&alias.name) {
                FutureFeature::Known(flag) => self.future_flags |= flag,
                FutureFeature::NotAChance => return Err(self.syntax_error("not a chance", &source_ref)),
                FutureFeature::Unknown => {
                    return Err(self.syntax_error(
                        format!("future feature {} is not defined", alias.name),
                        &source_ref,
                    ))
                }
            }
        }

        let future = ModuleName::new("__future__");
        let mut statements = Vec::with_capacity(aliases.len());
        for alias in aliases {
            let value = make_import_name_hard(
                tree,
                locator,
                &future,
                &alias.name,
                self.version(),
                source_ref.clone(),
            )?;
            let variable = binding_variable(tree, provider, alias.target())?;
            statements.push(tree.make_assignment(variable, value, source_ref.clone())?);
        }

        make_statements_or_statement(tree, statements, source_ref)
    }
}

fn make_import_module(
    tree: &mut Tree,
    module_name: &ModuleName,
    import_list: Vec<String>,
    level: i64,
    source_ref: SourceRef,
) -> Result<NodeId> {
    Ok(tree.new_node(
        NodeKind::ImportModule,
        source_ref,
        Payload::Import(ImportSpec {
            module_name: module_name.clone(),
            import_list,
            level,
        }),
        vec![],
    )?)
}

fn make_import_name(
    tree: &mut Tree,
    module: NodeId,
    name: &str,
    level: i64,
    source_ref: SourceRef,
) -> Result<NodeId> {
    Ok(tree.new_node(
        NodeKind::ImportName,
        source_ref,
        Payload::ImportName {
            name: name.to_string(),
            level,
        },
        vec![module.into()],
    )?)
}
