//! Registry configuration loading.
//!
//! The config file is a small YAML document next to `package.json`:
//!
//! ```yaml
//! verdaccio_url: http://localhost:4873
//! username: admin
//! password: secret
//! email: admin@example.com
//! ```

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Registry URL and login credentials.
///
/// Absent keys load as empty strings; nothing is validated here.
#[derive(Clone, Default, Deserialize, PartialEq, Eq)]
pub struct RegistryConfig {
    #[serde(rename = "verdaccio_url", default)]
    pub registry_url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub email: String,
}

impl fmt::Debug for RegistryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryConfig")
            .field("registry_url", &self.registry_url)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("email", &self.email)
            .finish()
    }
}

impl RegistryConfig {
    /// Load the config from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::ReadConfig {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content, path)
    }

    /// Parse YAML content; `path` is only used for error reporting.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ParseConfig {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let content = r#"
verdaccio_url: http://localhost:4873
username: admin
password: s3cret
email: admin@example.com
"#;
        let config = RegistryConfig::parse(content, Path::new("config.yml")).unwrap();
        assert_eq!(config.registry_url, "http://localhost:4873");
        assert_eq!(config.username, "admin");
        assert_eq!(config.password, "s3cret");
        assert_eq!(config.email, "admin@example.com");
    }

    #[test]
    fn test_missing_fields_pass_through_empty() {
        let content = "verdaccio_url: http://localhost:4873\n";
        let config = RegistryConfig::parse(content, Path::new("config.yml")).unwrap();
        assert_eq!(config.registry_url, "http://localhost:4873");
        assert_eq!(config.username, "");
        assert_eq!(config.password, "");
        assert_eq!(config.email, "");
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let content = "verdaccio_url: http://r\nusername: u\nextra: 1\n";
        let config = RegistryConfig::parse(content, Path::new("config.yml")).unwrap();
        assert_eq!(config.username, "u");
    }

    #[test]
    fn test_wrong_shape_is_parse_error() {
        let err = RegistryConfig::parse("- a\n- b\n", Path::new("config.yml")).unwrap_err();
        assert!(matches!(err, Error::ParseConfig { .. }));

        let err = RegistryConfig::parse("username: [1, 2", Path::new("config.yml")).unwrap_err();
        assert!(matches!(err, Error::ParseConfig { .. }));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.yml");
        let err = RegistryConfig::load(&path).unwrap_err();
        match err {
            Error::ReadConfig { path: p, .. } => assert_eq!(p, path),
            other => panic!("expected ReadConfig, got {other:?}"),
        }
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = RegistryConfig {
            registry_url: "http://localhost:4873".to_string(),
            username: "admin".to_string(),
            password: "super-secret-password".to_string(),
            email: String::new(),
        };
        let debug_output = format!("{:?}", config);
        assert!(!debug_output.contains("super-secret-password"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(debug_output.contains("admin"));
    }
}
