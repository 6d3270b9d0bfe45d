//! The publish run, step by step.
//!
//! Steps run strictly in order and the first failure ends the run. Nothing
//! is rolled back: if the version check fails after login, the rewritten
//! `.npmrc` stays on disk, which is harmless because login is idempotent.

use crate::auth::{CredentialMode, CredentialStore};
use crate::browser;
use crate::config::RegistryConfig;
use crate::error::Result;
use crate::manifest::PackageIdentity;
use crate::paths::{WorkDir, CONFIG_FILE};
use crate::publish::{PublishTool, DEFAULT_TOOL};
use crate::registry::{MissingPackagePolicy, VersionGuard, DEFAULT_TIMEOUT};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// Knobs for a publish run.
#[derive(Debug, Clone)]
pub struct PublishOptions {
    /// Config file, relative to the working directory unless absolute.
    pub config_file: PathBuf,
    /// Merge into or replace the existing `.npmrc`.
    pub credential_mode: CredentialMode,
    /// How to read a 404 from the registry.
    pub missing_package: MissingPackagePolicy,
    /// Timeout for the version check request.
    pub timeout: Duration,
    /// Publish tool name or path.
    pub tool: String,
    /// Open the registry in a browser afterwards.
    pub open_browser: bool,
}

impl Default for PublishOptions {
    fn default() -> Self {
        PublishOptions {
            config_file: PathBuf::from(CONFIG_FILE),
            credential_mode: CredentialMode::default(),
            missing_package: MissingPackagePolicy::default(),
            timeout: DEFAULT_TIMEOUT,
            tool: DEFAULT_TOOL.to_string(),
            open_browser: true,
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub registry: String,
    pub package: PackageIdentity,
    pub browser_opened: bool,
}

/// Runs config -> tool lookup -> login -> manifest -> version guard -> publish -> browser.
pub struct Publisher {
    workdir: WorkDir,
    options: PublishOptions,
    opener: fn(&str) -> Result<()>,
}

impl Publisher {
    pub fn new(workdir: WorkDir, options: PublishOptions) -> Self {
        Publisher {
            workdir,
            options,
            opener: browser::open_url,
        }
    }

    /// Replace the browser launcher.
    pub fn with_opener(mut self, opener: fn(&str) -> Result<()>) -> Self {
        self.opener = opener;
        self
    }

    pub fn workdir(&self) -> &WorkDir {
        &self.workdir
    }

    pub fn options(&self) -> &PublishOptions {
        &self.options
    }

    /// Execute one publish attempt.
    pub async fn run(&self) -> Result<Published> {
        let config_path = self.workdir.join(&self.options.config_file);
        let config = RegistryConfig::load(&config_path)?;
        info!(config = %config_path.display(), registry = %config.registry_url, "loaded config");

        let tool = PublishTool::locate(&self.options.tool)?;

        let store = CredentialStore::new(self.workdir.auth_path(), self.options.credential_mode);
        let record = store.persist(&config)?;
        info!(
            path = %store.path().display(),
            mode = ?store.mode(),
            keys = record.len(),
            "wrote registry credentials"
        );

        let package = PackageIdentity::load(&self.workdir.manifest_path())?;
        info!(%package, "read package manifest");

        let guard = VersionGuard::new(self.options.timeout, self.options.missing_package)?;
        guard
            .ensure_not_published(&config.registry_url, &package.name, &package.version)
            .await?;

        tool.publish(&self.workdir, &config.registry_url).await?;

        println!("Package published to {}", config.registry_url);

        let browser_opened = if self.options.open_browser {
            match (self.opener)(&config.registry_url) {
                Ok(()) => true,
                Err(e) => {
                    warn!("{e}");
                    false
                }
            }
        } else {
            false
        };

        Ok(Published {
            registry: config.registry_url,
            package,
            browser_opened,
        })
    }
}
