//! Error types for verdaccio-publish.

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Errors that can abort a publish run.
#[derive(Error, Debug)]
pub enum Error {
    /// Config file missing or unreadable.
    #[error("failed to read config file {path}: {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not a mapping of the expected keys.
    #[error("failed to parse config file {path}: {source}")]
    ParseConfig {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The publish tool could not be located.
    #[error("{tool} not found in PATH")]
    ToolNotFound {
        tool: String,
        #[source]
        source: which::Error,
    },

    /// Reading, removing or writing the auth file failed.
    #[error("failed to {action} auth file {path}: {source}")]
    CredentialIo {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A value for the auth file contains a line break.
    #[error("value for '{key}' contains a line break and cannot be written to the auth file")]
    InvalidAuthValue { key: String },

    /// Failed to open package.json.
    #[error("failed to open package manifest {path}: {source}")]
    ReadManifest {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// package.json is not valid or lacks `name`/`version`.
    #[error("failed to parse package manifest {path}: {source}")]
    ParseManifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Invalid registry URL.
    #[error("invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// Transport-level failure talking to the registry.
    #[error("failed to fetch package versions from {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The registry answered with a non-success status.
    #[error("failed to fetch package versions from {url}: status code {status}")]
    RegistryStatus { url: String, status: u16 },

    /// The registry body is not the expected JSON document.
    #[error("failed to parse JSON response from {url}: {source}")]
    ParseResponse {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// The version is already present on the registry.
    #[error(
        "version {version} already exists in the registry, please modify the version number and try again"
    )]
    DuplicateVersion { version: String },

    /// The publish tool could not be started.
    #[error("failed to run {tool}: {source}")]
    SpawnPublish {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// The publish tool ran and reported failure.
    #[error("{tool} publish failed: {status}")]
    PublishFailed { tool: String, status: ExitStatus },

    /// The default browser could not be launched.
    #[error("failed to open {url} in a browser: {source}")]
    BrowserOpen {
        url: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// HTTP status code carried by a registry failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::RegistryStatus { status, .. } => Some(*status),
            Error::Network { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether this error came from talking to the registry.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Error::Network { .. }
                | Error::RegistryStatus { .. }
                | Error::HttpClient(_)
                | Error::InvalidUrl { .. }
        )
    }

    /// A short suggestion printed under the error message.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Error::ReadConfig { .. } => {
                Some("create config.yml with verdaccio_url, username, password and email")
            }
            Error::ToolNotFound { .. } => Some("install Node.js and npm, or pass --tool"),
            Error::DuplicateVersion { .. } => Some("bump \"version\" in package.json"),
            Error::RegistryStatus { status: 404, .. } => Some(
                "the package has never been published; rerun with --missing-package unpublished",
            ),
            Error::RegistryStatus { status: 401 | 403, .. } => {
                Some("check username and password in config.yml")
            }
            _ => None,
        }
    }
}

/// Result type alias for verdaccio-publish operations.
pub type Result<T> = std::result::Result<T, Error>;
