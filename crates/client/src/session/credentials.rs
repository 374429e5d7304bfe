//! Durable credential storage.
//!
//! The store holds the current access credential in memory behind an
//! `RwLock` and mirrors it to a JSON slot on disk so a session survives
//! process restarts. Only login writes the slot; logout and 401-triggered
//! invalidation remove it. There is one writer (the session's control
//! flow), so no further coordination is needed.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Errors that can occur when persisting a credential.
#[derive(Debug, Error)]
pub enum CredentialStoreError {
    /// Reading or writing the durable slot failed.
    #[error("credential slot I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing the credential for storage failed.
    #[error("credential serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// On-disk representation of the credential slot.
#[derive(Serialize, Deserialize)]
struct StoredCredential {
    access_token: String,
    saved_at: DateTime<Utc>,
}

/// Holder of the current access credential.
///
/// Cheaply cloneable; clones share the same slot. `get` always returns the
/// value as of the latest `set`/`clear`, which is what lets the dispatcher
/// observe credential changes without being rebuilt.
#[derive(Clone)]
pub struct CredentialStore {
    inner: Arc<CredentialStoreInner>,
}

struct CredentialStoreInner {
    path: PathBuf,
    current: RwLock<Option<SecretString>>,
}

impl CredentialStore {
    /// Open the store, loading any previously persisted credential.
    ///
    /// A missing slot means no credential; a malformed or unreadable slot is
    /// logged and likewise treated as no credential, matching the decoder's
    /// tolerance for malformed tokens.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = load_slot(&path);

        Self {
            inner: Arc::new(CredentialStoreInner {
                path,
                current: RwLock::new(current),
            }),
        }
    }

    /// The current credential, if any.
    #[must_use]
    pub fn get(&self) -> Option<SecretString> {
        self.inner
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// True when a credential is present.
    #[must_use]
    pub fn is_present(&self) -> bool {
        self.get().is_some()
    }

    /// Store a credential, replacing any prior value.
    ///
    /// The durable slot is written before the in-memory value so a failed
    /// write leaves the session unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be written.
    pub fn set(&self, credential: SecretString) -> Result<(), CredentialStoreError> {
        let stored = StoredCredential {
            access_token: credential.expose_secret().to_owned(),
            saved_at: Utc::now(),
        };

        if let Some(parent) = self.inner.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.inner.path, serde_json::to_vec(&stored)?)?;
        restrict_permissions(&self.inner.path)?;

        *self
            .inner
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(credential);

        Ok(())
    }

    /// Remove the credential; idempotent.
    ///
    /// The in-memory value is cleared first so the session reads as
    /// unauthenticated even if removing the durable slot fails (which is
    /// logged, not surfaced - this runs inside the 401 invalidation hook).
    pub fn clear(&self) {
        *self
            .inner
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;

        if let Err(e) = fs::remove_file(&self.inner.path)
            && e.kind() != ErrorKind::NotFound
        {
            warn!(
                path = %self.inner.path.display(),
                error = %e,
                "failed to remove credential slot"
            );
        }
    }
}

fn load_slot(path: &Path) -> Option<SecretString> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read credential slot");
            return None;
        }
    };

    match serde_json::from_str::<StoredCredential>(&raw) {
        Ok(stored) => Some(SecretString::from(stored.access_token)),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring malformed credential slot");
            None
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot_path(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join("credentials.json")
    }

    #[test]
    fn test_absent_until_set() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::open(slot_path(&dir));
        assert!(store.get().is_none());
        assert!(!store.is_present());
    }

    #[test]
    fn test_set_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::open(slot_path(&dir));

        store.set(SecretString::from("token-1")).unwrap();
        assert_eq!(store.get().unwrap().expose_secret(), "token-1");

        // Replaces the prior value
        store.set(SecretString::from("token-2")).unwrap();
        assert_eq!(store.get().unwrap().expose_secret(), "token-2");
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = slot_path(&dir);

        CredentialStore::open(&path)
            .set(SecretString::from("persisted"))
            .unwrap();

        let reopened = CredentialStore::open(&path);
        assert_eq!(reopened.get().unwrap().expose_secret(), "persisted");
    }

    #[test]
    fn test_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::open(slot_path(&dir));

        store.set(SecretString::from("token")).unwrap();
        store.clear();
        assert!(store.get().is_none());

        // Clearing again (and clearing when never set) must not fail
        store.clear();
        assert!(store.get().is_none());
    }

    #[test]
    fn test_clones_share_the_slot() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::open(slot_path(&dir));
        let clone = store.clone();

        store.set(SecretString::from("shared")).unwrap();
        assert_eq!(clone.get().unwrap().expose_secret(), "shared");

        clone.clear();
        assert!(store.get().is_none());
    }

    #[test]
    fn test_malformed_slot_is_treated_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = slot_path(&dir);
        fs::write(&path, "not json at all").unwrap();

        let store = CredentialStore::open(&path);
        assert!(store.get().is_none());
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/credentials.json");

        let store = CredentialStore::open(&path);
        store.set(SecretString::from("token")).unwrap();
        assert!(path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_slot_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = slot_path(&dir);
        let store = CredentialStore::open(&path);
        store.set(SecretString::from("token")).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
