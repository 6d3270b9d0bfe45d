//! Path resolution for the files a publish run touches.
//!
//! Everything is resolved against an explicit [`WorkDir`] instead of the
//! process's current directory, so each component receives the directory
//! it operates on.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Default name of the registry config file.
pub const CONFIG_FILE: &str = "config.yml";

/// Name of the package manifest.
pub const MANIFEST_FILE: &str = "package.json";

/// Name of the project-level npm auth file.
pub const AUTH_FILE: &str = ".npmrc";

/// The directory a publish run operates in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkDir {
    root: PathBuf,
}

impl WorkDir {
    /// Use the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        WorkDir { root: root.into() }
    }

    /// Use the process's current directory.
    pub fn current() -> std::io::Result<Self> {
        std::env::current_dir().map(Self::new)
    }

    /// The directory itself.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a path relative to the working directory.
    ///
    /// Absolute paths are returned unchanged.
    pub fn join(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    /// Path to `package.json`.
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    /// Path to the project `.npmrc`.
    pub fn auth_path(&self) -> PathBuf {
        self.root.join(AUTH_FILE)
    }
}

/// Locate an executable on `PATH`.
///
/// A value containing a path separator is checked directly.
pub fn find_tool(tool: &str) -> Result<PathBuf> {
    which::which(tool).map_err(|source| Error::ToolNotFound {
        tool: tool.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workdir_paths() {
        let dir = WorkDir::new("/home/user/project");
        assert_eq!(
            dir.manifest_path(),
            PathBuf::from("/home/user/project/package.json")
        );
        assert_eq!(
            dir.auth_path(),
            PathBuf::from("/home/user/project/.npmrc")
        );
        assert_eq!(
            dir.join(CONFIG_FILE),
            PathBuf::from("/home/user/project/config.yml")
        );
    }

    #[test]
    fn test_join_keeps_absolute_paths() {
        let dir = WorkDir::new("/home/user/project");
        assert_eq!(
            dir.join("/etc/verdaccio.yml"),
            PathBuf::from("/etc/verdaccio.yml")
        );
    }

    #[test]
    fn test_current_workdir() {
        let dir = WorkDir::current().unwrap();
        assert_eq!(dir.root(), std::env::current_dir().unwrap());
    }

    #[test]
    fn test_find_tool_missing() {
        let err = find_tool("no-such-publish-tool-7e1b").unwrap_err();
        assert!(matches!(err, Error::ToolNotFound { ref tool, .. } if tool == "no-such-publish-tool-7e1b"));
    }

    #[cfg(unix)]
    #[test]
    fn test_find_tool_by_path() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempfile::tempdir().unwrap();
        let script = temp_dir.path().join("fake-npm");
        std::fs::write(&script, "#!/bin/sh\nexit 0\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let found = find_tool(script.to_str().unwrap()).unwrap();
        assert_eq!(found.file_name(), script.file_name());
    }
}
