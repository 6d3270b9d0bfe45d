//! Publish an npm package to a private registry such as Verdaccio.
//!
//! A run reads `config.yml` from the project directory, logs in by writing
//! the project `.npmrc`, refuses to continue if the version in
//! `package.json` is already on the registry, runs `npm publish`, and
//! finally opens the registry UI.
//!
//! # Quick Start
//!
//! ```no_run
//! use verdaccio_publish::{Publisher, PublishOptions, WorkDir};
//!
//! # async fn demo() -> verdaccio_publish::Result<()> {
//! let publisher = Publisher::new(WorkDir::current().unwrap(), PublishOptions::default());
//! let published = publisher.run().await?;
//! println!("published {}", published.package);
//! # Ok(())
//! # }
//! ```
//!
//! # Files
//!
//! | File | Role |
//! |------|------|
//! | `config.yml` | `verdaccio_url`, `username`, `password`, `email` |
//! | `package.json` | `name` and `version` of the package |
//! | `.npmrc` | written with `_auth`, `registry`, `email`, `always-auth` |
//!
//! # Credential modes
//!
//! By default an existing `.npmrc` is merged: unrelated keys such as
//! scoped registries or other hosts' tokens survive, and only the login
//! keys are overwritten. [`CredentialMode::Replace`] deletes the file and
//! writes the login keys alone.

pub mod auth;
pub mod browser;
pub mod cli;
mod config;
mod error;
mod manifest;
pub mod orchestrator;
mod parser;
mod paths;
pub mod publish;
pub mod registry;

// Re-export main types
pub use auth::{auth_token, decode_auth, AuthRecord, CredentialMode, CredentialStore};
pub use config::RegistryConfig;
pub use error::{Error, Result};
pub use manifest::PackageIdentity;
pub use orchestrator::{PublishOptions, Published, Publisher};
pub use parser::{parse_auth_file, write_auth_file};
pub use paths::{find_tool, WorkDir, AUTH_FILE, CONFIG_FILE, MANIFEST_FILE};
pub use registry::{MissingPackagePolicy, RegistryPackageInfo, VersionGuard};
