//! Registry queries and the duplicate-version guard.
//!
//! Before paying for an `npm publish`, the packument for the package is
//! fetched and its `versions` map is checked for the version about to be
//! published. This is a point-in-time check; the registry still has the
//! final say when the publish lands.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Default timeout for registry requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How a 404 for the package itself is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum MissingPackagePolicy {
    /// Treat 404 like any other failed request.
    #[default]
    Error,
    /// Treat 404 as a package with no published versions.
    Unpublished,
}

/// Per-version entry in a packument. Only `version` is read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VersionMetadata {
    #[serde(default)]
    pub version: Option<String>,
}

/// The part of a registry packument the guard needs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistryPackageInfo {
    #[serde(default)]
    pub versions: BTreeMap<String, VersionMetadata>,
}

impl RegistryPackageInfo {
    /// Whether `version` appears as a key or as an entry's `version` field.
    pub fn has_version(&self, version: &str) -> bool {
        self.versions
            .iter()
            .any(|(key, meta)| key == version || meta.version.as_deref() == Some(version))
    }
}

/// Parse a registry URL, ensuring it has a trailing slash.
pub fn parse_registry_url(url: &str) -> Result<Url> {
    let normalized = if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    };
    Url::parse(&normalized).map_err(|e| Error::InvalidUrl {
        url: url.to_string(),
        message: e.to_string(),
    })
}

/// URL of a package's packument on a registry.
///
/// The name is a single path segment, so a scoped name's `/` is encoded
/// (`@scope/pkg` -> `@scope%2Fpkg`).
pub fn package_url(registry: &str, package: &str) -> Result<Url> {
    let mut url = parse_registry_url(registry)?;
    url.path_segments_mut()
        .map_err(|()| Error::InvalidUrl {
            url: registry.to_string(),
            message: "URL cannot be a base".to_string(),
        })?
        .pop_if_empty()
        .push(package);
    Ok(url)
}

/// Checks a registry for already-published versions.
#[derive(Debug, Clone)]
pub struct VersionGuard {
    client: reqwest::Client,
    missing_package: MissingPackagePolicy,
}

impl VersionGuard {
    /// Create a guard whose requests time out after `timeout`.
    pub fn new(timeout: Duration, missing_package: MissingPackagePolicy) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(Error::HttpClient)?;
        Ok(VersionGuard {
            client,
            missing_package,
        })
    }

    /// Fetch the published versions of `package`.
    ///
    /// Under [`MissingPackagePolicy::Unpublished`] a 404 yields an empty
    /// packument.
    pub async fn fetch(&self, registry: &str, package: &str) -> Result<RegistryPackageInfo> {
        let url = package_url(registry, package)?;
        debug!(%url, "fetching packument");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::Network {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND
            && self.missing_package == MissingPackagePolicy::Unpublished
        {
            info!(package, "package not found on registry, treating as unpublished");
            return Ok(RegistryPackageInfo::default());
        }
        if !status.is_success() {
            return Err(Error::RegistryStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| Error::Network {
            url: url.to_string(),
            source: e,
        })?;

        serde_json::from_str(&body).map_err(|e| Error::ParseResponse {
            url: url.to_string(),
            source: e,
        })
    }

    /// Fail with [`Error::DuplicateVersion`] if `version` is already on the registry.
    pub async fn ensure_not_published(
        &self,
        registry: &str,
        package: &str,
        version: &str,
    ) -> Result<()> {
        let info = self.fetch(registry, package).await?;
        debug!(
            package,
            published = info.versions.len(),
            "checking for duplicate version"
        );

        if info.has_version(version) {
            return Err(Error::DuplicateVersion {
                version: version.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_registry_url() {
        let url = parse_registry_url("http://localhost:4873").unwrap();
        assert_eq!(url.as_str(), "http://localhost:4873/");

        let url = parse_registry_url("http://localhost:4873/").unwrap();
        assert_eq!(url.as_str(), "http://localhost:4873/");

        assert!(matches!(
            parse_registry_url(""),
            Err(Error::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_package_url() {
        let url = package_url("http://localhost:4873", "pkg").unwrap();
        assert_eq!(url.as_str(), "http://localhost:4873/pkg");

        let url = package_url("https://npm.acme.dev/verdaccio/", "left-pad").unwrap();
        assert_eq!(url.as_str(), "https://npm.acme.dev/verdaccio/left-pad");
    }

    #[test]
    fn test_package_url_scoped() {
        let url = package_url("http://localhost:4873/", "@acme/widgets").unwrap();
        assert_eq!(url.as_str(), "http://localhost:4873/@acme%2Fwidgets");
    }

    #[test]
    fn test_package_url_cannot_be_base() {
        let err = package_url("mailto:admin@example.com", "pkg").unwrap_err();
        assert!(matches!(err, Error::InvalidUrl { .. }));
    }

    #[test]
    fn test_has_version_exact_match_only() {
        let info: RegistryPackageInfo =
            serde_json::from_str(r#"{"versions":{"1.0.0":{"version":"1.0.0"}}}"#).unwrap();
        assert!(info.has_version("1.0.0"));
        assert!(!info.has_version("1.0.1"));
        assert!(!info.has_version("v1.0.0"));
        assert!(!info.has_version("1.0"));
    }

    #[test]
    fn test_packument_without_versions() {
        let info: RegistryPackageInfo =
            serde_json::from_str(r#"{"name":"pkg","dist-tags":{}}"#).unwrap();
        assert!(info.versions.is_empty());
        assert!(!info.has_version("1.0.0"));
    }
}
