//! Durable key-value slot for the session token. Only the session manager
//! writes it; the entry is keyed by [`TOKEN_KEY`] and its absence means the
//! user is logged out.

use secrecy::{ExposeSecret, SecretString};
use std::{
    collections::BTreeMap,
    fmt, fs, io,
    path::{Path, PathBuf},
    sync::{PoisonError, RwLock},
};
use thiserror::Error;

pub const TOKEN_KEY: &str = "token";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("session store at {path} is corrupted: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Opaque session credential. Compared by value, never printed.
#[derive(Clone)]
pub struct SessionToken(SecretString);

impl SessionToken {
    #[must_use]
    pub fn new(token: &str) -> Self {
        Self(SecretString::from(token.to_string()))
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.expose().trim().is_empty()
    }
}

impl PartialEq for SessionToken {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl Eq for SessionToken {}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

pub trait TokenStore: Send + Sync {
    /// # Errors
    /// Returns an error if the underlying storage cannot be read.
    fn load(&self) -> Result<Option<SessionToken>, StoreError>;

    /// # Errors
    /// Returns an error if the token cannot be persisted.
    fn save(&self, token: &SessionToken) -> Result<(), StoreError>;

    /// # Errors
    /// Returns an error if the entry cannot be removed.
    fn clear(&self) -> Result<(), StoreError>;
}

/// In-process store, used by tests and short-lived sessions.
#[derive(Default)]
pub struct MemoryStore {
    token: RwLock<Option<SessionToken>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_token(token: &str) -> Self {
        Self {
            token: RwLock::new(Some(SessionToken::new(token))),
        }
    }
}

impl TokenStore for MemoryStore {
    fn load(&self) -> Result<Option<SessionToken>, StoreError> {
        Ok(self
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, token: &SessionToken) -> Result<(), StoreError> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// JSON object on disk, e.g. `{"token": "..."}`. Other keys in the file are
/// preserved. Writes go through a temporary file and a rename.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data dir>/signon/session.json`, falling back to the working directory.
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(env!("CARGO_PKG_NAME"))
            .join("session.json")
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => return Err(self.io_error(err)),
        };

        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&raw).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| self.io_error(err))?;
        }

        let payload = serde_json::to_vec_pretty(entries).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, payload).map_err(|err| self.io_error(err))?;
        fs::rename(&tmp, &self.path).map_err(|err| self.io_error(err))
    }
}

impl TokenStore for FileStore {
    fn load(&self) -> Result<Option<SessionToken>, StoreError> {
        Ok(self
            .read_entries()?
            .get(TOKEN_KEY)
            .filter(|value| !value.trim().is_empty())
            .map(|value| SessionToken::new(value)))
    }

    fn save(&self, token: &SessionToken) -> Result<(), StoreError> {
        let mut entries = self.read_entries().unwrap_or_default();
        entries.insert(TOKEN_KEY.to_string(), token.expose().to_string());
        self.write_entries(&entries)
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut entries = self.read_entries().unwrap_or_default();
        if entries.remove(TOKEN_KEY).is_none() && !self.path.exists() {
            return Ok(());
        }
        self.write_entries(&entries)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn session_token_is_redacted_and_compared_by_value() {
        let token = SessionToken::new("abc123");
        assert_eq!(format!("{token:?}"), "SessionToken(***)");
        assert_eq!(token, SessionToken::new("abc123"));
        assert_ne!(token, SessionToken::new("other"));
        assert!(SessionToken::new("  ").is_empty());
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryStore::new();
        assert!(store.load().unwrap().is_none());

        store.save(&SessionToken::new("tok1")).unwrap();
        assert_eq!(store.load().unwrap(), Some(SessionToken::new("tok1")));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn file_store_persists_under_token_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");
        let store = FileStore::new(&path);

        assert!(store.load().unwrap().is_none());
        store.save(&SessionToken::new("tok1")).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw[TOKEN_KEY], "tok1");

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.load().unwrap(), Some(SessionToken::new("tok1")));
    }

    #[test]
    fn file_store_clear_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, r#"{"theme":"dark","token":"tok1"}"#).unwrap();

        let store = FileStore::new(&path);
        store.clear().unwrap();

        assert!(store.load().unwrap().is_none());
        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["theme"], "dark");
    }

    #[test]
    fn file_store_clear_without_file_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = FileStore::new(&path);

        store.clear().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn file_store_reports_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();

        let store = FileStore::new(&path);
        assert!(matches!(store.load(), Err(StoreError::Json { .. })));

        // A fresh save replaces the corrupted contents.
        store.save(&SessionToken::new("tok2")).unwrap();
        assert_eq!(store.load().unwrap(), Some(SessionToken::new("tok2")));
    }
}
