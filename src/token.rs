//! Access token sources.
//!
//! The client never looks a token up on its own: a [`TokenProvider`] is handed
//! to it at construction and asked for the current token on every connect.

use crate::types::{ACCESS_TOKEN_KEY, NotifyError, Result, env_vars};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Yields the bearer token used to open channel connections.
///
/// `None` (or an empty string) means the user is not signed in and no
/// connection is attempted.
pub trait TokenProvider: Send + Sync {
    fn access_token(&self) -> Option<String>;
}

/// A fixed token, typically obtained from a login response
#[derive(Debug, Clone, Default)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    pub fn none() -> Self {
        Self(None)
    }
}

impl TokenProvider for StaticToken {
    fn access_token(&self) -> Option<String> {
        self.0.clone()
    }
}

/// In-process key/value store with local-storage semantics
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.into(), value.into());
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(key)
    }

    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.clear();
    }

    /// Stores the token under the `access_token` key
    pub fn set_access_token(&self, token: impl Into<String>) {
        self.set(ACCESS_TOKEN_KEY, token);
    }
}

impl TokenProvider for MemoryTokenStore {
    fn access_token(&self) -> Option<String> {
        self.get(ACCESS_TOKEN_KEY)
    }
}

/// Token persisted as a JSON object on disk: `{"access_token": "..."}`
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the token. A missing file or missing key is `Ok(None)`.
    pub fn load(&self) -> Result<Option<String>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let value: Value = serde_json::from_str(&raw)?;
        let Value::Object(entries) = value else {
            return Err(NotifyError::Token(format!(
                "{} does not contain a JSON object",
                self.path.display()
            )));
        };

        Ok(entries
            .get(ACCESS_TOKEN_KEY)
            .and_then(Value::as_str)
            .map(str::to_owned))
    }

    /// Persists the token, keeping any other keys already in the file
    pub fn save(&self, token: &str) -> Result<()> {
        let mut entries = self.read_entries()?;
        entries.insert(ACCESS_TOKEN_KEY.to_string(), Value::String(token.to_string()));
        self.write_entries(entries)
    }

    /// Removes the token (sign-out)
    pub fn clear(&self) -> Result<()> {
        let mut entries = self.read_entries()?;
        if entries.remove(ACCESS_TOKEN_KEY).is_some() {
            self.write_entries(entries)?;
        }
        Ok(())
    }

    fn read_entries(&self) -> Result<Map<String, Value>> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => match serde_json::from_str::<Value>(&raw)? {
                Value::Object(entries) => Ok(entries),
                _ => Ok(Map::new()),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_entries(&self, entries: Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(&Value::Object(entries))?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl TokenProvider for FileTokenStore {
    fn access_token(&self) -> Option<String> {
        match self.load() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("Ignoring unreadable token store {}: {}", self.path.display(), e);
                None
            }
        }
    }
}

/// Token read from an environment variable on every connect
#[derive(Debug, Clone)]
pub struct EnvToken {
    var: String,
}

impl EnvToken {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvToken {
    fn default() -> Self {
        Self::new(env_vars::ACCESS_TOKEN)
    }
}

impl TokenProvider for EnvToken {
    fn access_token(&self) -> Option<String> {
        std::env::var(&self.var).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_token() {
        assert_eq!(StaticToken::new("T").access_token(), Some("T".to_string()));
        assert_eq!(StaticToken::none().access_token(), None);
    }

    #[test]
    fn test_memory_store_local_storage_semantics() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.access_token(), None);

        store.set_access_token("abc");
        store.set("role", "librarian");
        assert_eq!(store.access_token(), Some("abc".to_string()));

        assert_eq!(store.remove(ACCESS_TOKEN_KEY), Some("abc".to_string()));
        assert_eq!(store.access_token(), None);
        assert_eq!(store.get("role"), Some("librarian".to_string()));

        store.clear();
        assert_eq!(store.get("role"), None);
    }

    #[test]
    fn test_file_store_missing_file_is_no_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("absent.json"));
        assert_eq!(store.load().unwrap(), None);
        assert_eq!(store.access_token(), None);
    }

    #[test]
    fn test_file_store_save_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{"role": "system_admin"}"#).unwrap();

        let store = FileTokenStore::new(&path);
        store.save("jwt-token").unwrap();
        assert_eq!(store.access_token(), Some("jwt-token".to_string()));

        let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["role"], "system_admin");

        store.clear().unwrap();
        assert_eq!(store.access_token(), None);
        let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["role"], "system_admin");
    }

    #[test]
    fn test_file_store_malformed_is_no_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileTokenStore::new(&path);
        assert!(store.load().is_err());
        assert_eq!(store.access_token(), None);

        std::fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(store.load(), Err(NotifyError::Token(_))));
    }

    #[test]
    fn test_env_token_missing_var() {
        let provider = EnvToken::new("BOOKRIDER_NOTIFY_TEST_UNSET_TOKEN_VAR");
        assert_eq!(provider.access_token(), None);
    }
}
