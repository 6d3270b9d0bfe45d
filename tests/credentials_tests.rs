//! Credential persistence tests.
//!
//! Covers writing the project `.npmrc` in both merge and replace mode.

use std::fs;
use tempfile::TempDir;
use verdaccio_publish::{
    auth_token, decode_auth, parse_auth_file, AuthRecord, CredentialMode, CredentialStore, Error,
    RegistryConfig,
};

fn config(username: &str, password: &str) -> RegistryConfig {
    RegistryConfig {
        registry_url: "http://localhost:4873".to_string(),
        username: username.to_string(),
        password: password.to_string(),
        email: "dev@example.com".to_string(),
    }
}

/// Persist into a fresh temp dir, optionally seeding an existing `.npmrc`.
fn persist(existing: Option<&str>, mode: CredentialMode, cfg: &RegistryConfig) -> (TempDir, String) {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join(".npmrc");
    if let Some(content) = existing {
        fs::write(&path, content).unwrap();
    }

    CredentialStore::new(&path, mode).persist(cfg).unwrap();

    let written = fs::read_to_string(&path).unwrap();
    (temp, written)
}

// =============================================================================
// _auth invariant
// =============================================================================

#[test]
fn test_auth_matches_base64_of_credentials() {
    let cases = [
        ("user", "password"),
        ("admin", "p@ss:word!"),
        ("a", "b"),
        ("", ""),
        ("ünïcode", "密码"),
    ];

    for (username, password) in cases {
        for mode in [CredentialMode::Merge, CredentialMode::Replace] {
            let cfg = config(username, password);
            let (_temp, written) = persist(None, mode, &cfg);
            let entries = parse_auth_file(&written);

            assert_eq!(
                entries.get("_auth"),
                Some(&auth_token(username, password)),
                "mode {mode:?}, user {username:?}"
            );
            assert_eq!(
                entries.get("registry"),
                Some(&"http://localhost:4873".to_string())
            );
            assert_eq!(
                decode_auth(&entries["_auth"]),
                Some((username.to_string(), password.to_string()))
            );
        }
    }
}

// =============================================================================
// Merge mode
// =============================================================================

#[test]
fn test_merge_preserves_unrelated_keys() {
    let (_temp, written) = persist(
        Some("foo=bar\n@acme:registry=https://npm.acme.dev/\n//npm.acme.dev/:_authToken=tok\n"),
        CredentialMode::Merge,
        &config("user", "password"),
    );
    let entries = parse_auth_file(&written);

    assert_eq!(entries.get("foo"), Some(&"bar".to_string()));
    assert_eq!(
        entries.get("@acme:registry"),
        Some(&"https://npm.acme.dev/".to_string())
    );
    assert_eq!(
        entries.get("//npm.acme.dev/:_authToken"),
        Some(&"tok".to_string())
    );
}

#[test]
fn test_merge_overwrites_owned_keys() {
    let (_temp, written) = persist(
        Some("registry=https://registry.npmjs.org/\nusername=old\nalways-auth=false\n_auth=b2xkOm9sZA==\n"),
        CredentialMode::Merge,
        &config("user", "password"),
    );
    let record = AuthRecord::parse(&written);

    assert_eq!(record.get("registry"), Some("http://localhost:4873"));
    assert_eq!(record.get("username"), Some("user"));
    assert_eq!(record.get("password"), Some("password"));
    assert_eq!(record.get("email"), Some("dev@example.com"));
    assert_eq!(record.always_auth(), Some(true));
    assert_eq!(record.get("_auth"), Some("dXNlcjpwYXNzd29yZA=="));
}

#[test]
fn test_merge_without_existing_file() {
    let (_temp, written) = persist(None, CredentialMode::Merge, &config("user", "password"));
    assert_eq!(
        written,
        "_auth=dXNlcjpwYXNzd29yZA==\n\
         always-auth=true\n\
         email=dev@example.com\n\
         password=password\n\
         registry=http://localhost:4873\n\
         username=user\n"
    );
}

#[test]
fn test_merge_output_is_sorted() {
    let (_temp, written) = persist(
        Some("zeta=1\nalpha=2\n"),
        CredentialMode::Merge,
        &config("user", "password"),
    );
    let keys: Vec<&str> = written
        .lines()
        .map(|l| l.split_once('=').unwrap().0)
        .collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
}

// =============================================================================
// Replace mode
// =============================================================================

#[test]
fn test_replace_writes_only_owned_keys() {
    let (_temp, written) = persist(
        Some("foo=bar\nusername=old\npassword=old\n"),
        CredentialMode::Replace,
        &config("user", "password"),
    );
    let record = AuthRecord::parse(&written);
    let keys: Vec<&str> = record.keys().collect();

    assert_eq!(keys, ["_auth", "always-auth", "email", "registry"]);
    assert_eq!(record.get("foo"), None);
}

#[test]
fn test_replace_without_existing_file() {
    let (_temp, written) = persist(None, CredentialMode::Replace, &config("user", "password"));
    assert_eq!(AuthRecord::parse(&written).len(), 4);
}

#[test]
fn test_persist_into_missing_directory_fails() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("missing").join(".npmrc");

    let err = CredentialStore::new(&path, CredentialMode::Merge)
        .persist(&config("user", "password"))
        .unwrap_err();
    match err {
        Error::CredentialIo { action, path: p, .. } => {
            assert_eq!(action, "write");
            assert_eq!(p, path);
        }
        other => panic!("expected CredentialIo, got {other:?}"),
    }
}
