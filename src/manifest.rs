//! Package identity from `package.json`.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// The `name` and `version` of the package being published.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PackageIdentity {
    pub name: String,
    pub version: String,
}

impl fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

impl PackageIdentity {
    /// Read `name` and `version` from a manifest file. Other fields are ignored.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::ReadManifest {
            path: path.to_path_buf(),
            source: e,
        })?;

        serde_json::from_str(&content).map_err(|e| Error::ParseManifest {
            path: path.to_path_buf(),
            source: e,
        })
    }
}
