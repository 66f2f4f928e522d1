//! Language version selection

use serde::{Deserialize, Serialize};

/// The language version a module is compiled for.
///
/// It decides which names are builtins, which exceptions exist and a few
/// formatting details of the folded results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PythonVersion {
    Python2,
    #[default]
    Python3,
}

impl PythonVersion {
    pub fn is_python3(self) -> bool {
        matches!(self, PythonVersion::Python3)
    }

    /// Import level used when the source gives none.
    pub fn default_import_level(self) -> i64 {
        match self {
            PythonVersion::Python2 => -1,
            PythonVersion::Python3 => 0,
        }
    }
}
