//! Credential resolution.
//!
//! The API key is looked up from three sources in a fixed order: a value
//! supplied by the caller, the on-disk config record, and finally the
//! process environment. A session cannot exist without one.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Environment variable consulted as the last credential source.
pub const CREDENTIAL_ENV_VAR: &str = "OPENAI_API_KEY";

/// Name of the config record file, colocated with the executable.
pub const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error(
        "OpenAI API key required. Add it to {CONFIG_FILE_NAME}, \
         set {CREDENTIAL_ENV_VAR}, or pass a key explicitly."
    )]
    NoCredential,
}

/// The on-disk key-value record. One recognized key today.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,
}

impl ConfigRecord {
    /// Reads the record from `path`. A missing or malformed file yields an
    /// empty record; resolution then falls through to the environment.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(record) => record,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Could not parse config record");
                    Self::default()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not read config record");
                Self::default()
            }
        }
    }

    /// Writes the record to `path` as pretty-printed JSON.
    pub fn store(&self, path: &Path) -> io::Result<()> {
        let contents = serde_json::to_vec_pretty(self)?;
        fs::write(path, contents)
    }

    /// The recorded key, if present and non-empty after trimming.
    pub fn key(&self) -> Option<&str> {
        self.openai_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    /// Default record location: next to the running executable, falling back
    /// to the working directory when the executable path is unknown.
    pub fn default_path() -> PathBuf {
        env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(CONFIG_FILE_NAME)))
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
    }
}

/// Resolves the active credential: explicit value first, then the config
/// record, then the `env_var` environment variable. Whitespace-only values
/// are treated as absent at every level.
pub fn resolve(
    explicit: Option<&str>,
    record: &ConfigRecord,
    env_var: &str,
) -> Result<String, CredentialError> {
    if let Some(key) = explicit.map(str::trim).filter(|k| !k.is_empty()) {
        return Ok(key.to_string());
    }
    if let Some(key) = record.key() {
        return Ok(key.to_string());
    }
    if let Some(key) = env::var(env_var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|k| !k.is_empty())
    {
        return Ok(key);
    }
    Err(CredentialError::NoCredential)
}

/// Renders a key for display without revealing it: `sk-proj...wxyz`.
/// Keys too short to mask meaningfully are fully redacted.
pub fn masked(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 11 {
        return "***".to_string();
    }
    let head: String = chars[..7].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const TEST_ENV_VAR: &str = "CURIO_TEST_API_KEY";

    fn record_with(key: &str) -> ConfigRecord {
        ConfigRecord {
            openai_api_key: Some(key.to_string()),
        }
    }

    #[test]
    #[serial]
    fn test_explicit_key_wins() {
        unsafe { env::set_var(TEST_ENV_VAR, "env-key") };
        let resolved = resolve(Some("explicit-key"), &record_with("record-key"), TEST_ENV_VAR);
        unsafe { env::remove_var(TEST_ENV_VAR) };
        assert_eq!(resolved.unwrap(), "explicit-key");
    }

    #[test]
    #[serial]
    fn test_record_beats_environment() {
        unsafe { env::set_var(TEST_ENV_VAR, "env-key") };
        let resolved = resolve(None, &record_with("record-key"), TEST_ENV_VAR);
        unsafe { env::remove_var(TEST_ENV_VAR) };
        assert_eq!(resolved.unwrap(), "record-key");
    }

    #[test]
    #[serial]
    fn test_record_only_source_succeeds() {
        unsafe { env::remove_var(TEST_ENV_VAR) };
        let resolved = resolve(None, &record_with("record-key"), TEST_ENV_VAR);
        assert_eq!(resolved.unwrap(), "record-key");
    }

    #[test]
    #[serial]
    fn test_environment_is_last_resort() {
        unsafe { env::set_var(TEST_ENV_VAR, "env-key") };
        let resolved = resolve(None, &ConfigRecord::default(), TEST_ENV_VAR);
        unsafe { env::remove_var(TEST_ENV_VAR) };
        assert_eq!(resolved.unwrap(), "env-key");
    }

    #[test]
    #[serial]
    fn test_no_source_fails() {
        unsafe { env::remove_var(TEST_ENV_VAR) };
        let err = resolve(None, &ConfigRecord::default(), TEST_ENV_VAR).unwrap_err();
        assert!(matches!(err, CredentialError::NoCredential));
    }

    #[test]
    #[serial]
    fn test_blank_values_are_absent() {
        unsafe { env::set_var(TEST_ENV_VAR, "   ") };
        let err = resolve(Some("  "), &record_with(" "), TEST_ENV_VAR).unwrap_err();
        unsafe { env::remove_var(TEST_ENV_VAR) };
        assert!(matches!(err, CredentialError::NoCredential));
    }

    #[test]
    fn test_record_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        let record = record_with("sk-test-1234");
        record.store(&path).unwrap();

        let loaded = ConfigRecord::load(&path);
        assert_eq!(loaded.key(), Some("sk-test-1234"));
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let record = ConfigRecord::load(&dir.path().join("nope.json"));
        assert!(record.key().is_none());
    }

    #[test]
    fn test_load_malformed_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "{not json").unwrap();
        let record = ConfigRecord::load(&path);
        assert!(record.key().is_none());
    }

    #[test]
    fn test_masked_key() {
        assert_eq!(masked("sk-proj-abcdefwxyz"), "sk-proj...wxyz");
        assert_eq!(masked("short"), "***");
        assert_eq!(masked(""), "***");
    }
}
