//! Registry login via the project `.npmrc`.
//!
//! "Logging in" means writing the credentials npm reads on `npm publish`:
//! a legacy `_auth` value (base64 of `username:password`) plus the
//! registry URL, with `always-auth` forced on.

use crate::config::RegistryConfig;
use crate::error::{Error, Result};
use crate::parser::{parse_auth_file, parse_bool, write_auth_file};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Keys whose values are never printed.
const SECRET_KEYS: &[&str] = &["_auth", "password", "_password", "_authToken"];

/// How an existing auth file is treated when credentials are persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum CredentialMode {
    /// Keep unrelated keys and overwrite only the ones this tool owns.
    #[default]
    Merge,
    /// Delete the file and write `registry`, `_auth`, `email` and `always-auth` only.
    Replace,
}

/// Compute the `_auth` value for a username and password.
///
/// # Examples
///
/// ```
/// use verdaccio_publish::auth_token;
///
/// assert_eq!(auth_token("user", "password"), "dXNlcjpwYXNzd29yZA==");
/// ```
pub fn auth_token(username: &str, password: &str) -> String {
    BASE64.encode(format!("{}:{}", username, password))
}

/// Decode an `_auth` value back into `(username, password)`.
///
/// Splits on the first `:`, so passwords may contain colons.
pub fn decode_auth(auth: &str) -> Option<(String, String)> {
    let decoded = String::from_utf8(BASE64.decode(auth).ok()?).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

/// The contents of an auth file.
///
/// Keys are kept sorted so the written file is stable across runs.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthRecord {
    entries: BTreeMap<String, String>,
}

impl fmt::Debug for AuthRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (key, value) in &self.entries {
            if SECRET_KEYS.iter().any(|s| key == s || key.ends_with(&format!(":{s}"))) {
                map.entry(key, &"[REDACTED]");
            } else {
                map.entry(key, value);
            }
        }
        map.finish()
    }
}

impl fmt::Display for AuthRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&write_auth_file(&self.entries))
    }
}

impl AuthRecord {
    /// Parse auth file content.
    pub fn parse(content: &str) -> Self {
        AuthRecord {
            entries: parse_auth_file(content),
        }
    }

    /// Load an auth file. A missing file is an empty record.
    ///
    /// Invalid UTF-8 is replaced rather than rejected.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read(path) {
            // Undecodable bytes become U+FFFD on their own line only.
            Ok(bytes) => Ok(Self::parse(&String::from_utf8_lossy(&bytes))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(Error::CredentialIo {
                action: "read",
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }

    /// The records this tool writes for a registry login.
    ///
    /// Merge mode owns six keys; replace mode writes only four.
    pub fn for_login(config: &RegistryConfig, mode: CredentialMode) -> Self {
        let mut record = AuthRecord::default();
        record.apply_login(config, mode);
        record
    }

    /// Overwrite the keys this tool owns, leaving all others alone.
    pub fn apply_login(&mut self, config: &RegistryConfig, mode: CredentialMode) {
        self.set("_auth", auth_token(&config.username, &config.password));
        self.set("email", &config.email);
        self.set("always-auth", "true");
        self.set("registry", &config.registry_url);
        if mode == CredentialMode::Merge {
            self.set("username", &config.username);
            self.set("password", &config.password);
        }
    }

    /// Get a value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|s| s.as_str())
    }

    /// Set a value, returning the previous one.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the record has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    /// Value of `always-auth`, if set to a boolean.
    pub fn always_auth(&self) -> Option<bool> {
        self.get("always-auth").and_then(parse_bool)
    }

    /// Fail if any value would span more than one line when written.
    fn check_line_breaks(&self) -> Result<()> {
        match self
            .entries
            .iter()
            .find(|(_, value)| value.contains(['\n', '\r']))
        {
            Some((key, _)) => Err(Error::InvalidAuthValue { key: key.clone() }),
            None => Ok(()),
        }
    }

    /// Username and password decoded from `_auth`.
    pub fn login(&self) -> Option<(String, String)> {
        self.get("_auth").and_then(decode_auth)
    }
}

/// Persists login credentials to an auth file.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
    mode: CredentialMode,
}

impl CredentialStore {
    /// Store credentials at `path` using `mode`.
    pub fn new(path: impl Into<PathBuf>, mode: CredentialMode) -> Self {
        CredentialStore {
            path: path.into(),
            mode,
        }
    }

    /// Path of the auth file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Mode used when persisting.
    pub fn mode(&self) -> CredentialMode {
        self.mode
    }

    /// Write the login for `config`, returning what was written.
    ///
    /// Running this twice with the same config yields the same file. A
    /// config value containing a line break is rejected before the file is
    /// touched, since it would inject extra `key=value` lines.
    pub fn persist(&self, config: &RegistryConfig) -> Result<AuthRecord> {
        let record = match self.mode {
            CredentialMode::Merge => {
                let mut record = AuthRecord::load(&self.path)?;
                debug!(
                    path = %self.path.display(),
                    existing = record.len(),
                    "merging credentials into auth file"
                );
                record.apply_login(config, self.mode);
                record
            }
            CredentialMode::Replace => AuthRecord::for_login(config, self.mode),
        };
        record.check_line_breaks()?;

        if self.mode == CredentialMode::Replace {
            self.remove_existing()?;
            debug!(path = %self.path.display(), "replacing auth file");
        }

        self.write(&record)?;
        Ok(record)
    }

    fn remove_existing(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error("remove", e)),
        }
    }

    fn write(&self, record: &AuthRecord) -> Result<()> {
        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options
            .open(&self.path)
            .map_err(|e| self.io_error("write", e))?;

        // `mode` only applies on creation; tighten a pre-existing file too.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))
                .map_err(|e| self.io_error("write", e))?;
        }

        file.write_all(record.to_string().as_bytes())
            .map_err(|e| self.io_error("write", e))
    }

    fn io_error(&self, action: &'static str, source: std::io::Error) -> Error {
        Error::CredentialIo {
            action,
            path: self.path.clone(),
            source,
        }
    }
}
