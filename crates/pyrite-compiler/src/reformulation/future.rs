//! `__future__` features

use bitflags::bitflags;
use pyrite_core::PythonVersion;

bitflags! {
    /// Future features enabled for one module
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FutureFlags: u16 {
        const NESTED_SCOPES = 1 << 0;
        const GENERATORS = 1 << 1;
        const DIVISION = 1 << 2;
        const ABSOLUTE_IMPORT = 1 << 3;
        const WITH_STATEMENT = 1 << 4;
        const PRINT_FUNCTION = 1 << 5;
        const UNICODE_LITERALS = 1 << 6;
        const BARRY_AS_FLUFL = 1 << 7;
        const GENERATOR_STOP = 1 << 8;
        const ANNOTATIONS = 1 << 9;
    }
}

/// Outcome of looking up a feature name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FutureFeature {
    Known(FutureFlags),
    /// `braces`
    NotAChance,
    Unknown,
}

impl FutureFlags {
    pub fn lookup(name: &str) -> FutureFeature {
        let flag = match name {
            "nested_scopes" => FutureFlags::NESTED_SCOPES,
            "generators" => FutureFlags::GENERATORS,
            "division" => FutureFlags::DIVISION,
            "absolute_import" => FutureFlags::ABSOLUTE_IMPORT,
            "with_statement" => FutureFlags::WITH_STATEMENT,
            "print_function" => FutureFlags::PRINT_FUNCTION,
            "unicode_literals" => FutureFlags::UNICODE_LITERALS,
            "barry_as_FLUFL" => FutureFlags::BARRY_AS_FLUFL,
            "generator_stop" => FutureFlags::GENERATOR_STOP,
            "annotations" => FutureFlags::ANNOTATIONS,
            "braces" => return FutureFeature::NotAChance,
            _ => return FutureFeature::Unknown,
        };
        FutureFeature::Known(flag)
    }

    /// Whether imports without dots are absolute
    pub fn absolute_import(self, version: PythonVersion) -> bool {
        version.is_python3() || self.contains(FutureFlags::ABSOLUTE_IMPORT)
    }
}
