//! File-backed [`SessionStore`].
//!
//! One token per user, kept in `session.toml` inside the config directory.
//! The file is read once when the store is opened; afterwards reads come
//! from memory and every mutation is written through.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use biasbuster_core::SessionStore;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
}

/// Session token persisted across process restarts.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    token: RwLock<Option<String>>,
}

impl FileSessionStore {
    /// Open the store at the default location (`<config dir>/session.toml`).
    pub fn open_default() -> biasbuster_paths::Result<Self> {
        Ok(Self::open(biasbuster_paths::session_file()?))
    }

    /// Open the store at `path`, reading any token already saved there.
    ///
    /// A missing or unreadable file yields a logged-out store.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let token = read_token(&path);
        debug!(path = %path.display(), logged_in = token.is_some(), "session store opened");
        Self {
            path,
            token: RwLock::new(token),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn replace(&self, token: Option<String>) {
        if let Err(e) = write_token(&self.path, token.as_deref()) {
            warn!(path = %self.path.display(), "failed to persist session token: {e}");
        }
        match self.token.write() {
            Ok(mut guard) => *guard = token,
            Err(poisoned) => *poisoned.into_inner() = token,
        }
    }
}

impl SessionStore for FileSessionStore {
    fn token(&self) -> Option<String> {
        match self.token.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn set_token(&self, token: String) {
        self.replace(Some(token));
    }

    fn clear(&self) {
        self.replace(None);
    }
}

fn read_token(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<SessionFile>(&content) {
        Ok(file) => file.token.filter(|t| !t.is_empty()),
        Err(e) => {
            warn!(path = %path.display(), "ignoring unreadable session file: {e}");
            None
        }
    }
}

fn write_token(path: &Path, token: Option<&str>) -> std::io::Result<()> {
    let Some(token) = token else {
        return match std::fs::remove_file(path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        };
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let body = SessionFile {
        token: Some(token.to_string()),
    };
    let content = toml::to_string(&body).map_err(std::io::Error::other)?;
    std::fs::write(path, content)?;
    restrict_permissions(path)
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.toml");

        let store = FileSessionStore::open(&path);
        assert!(!store.is_authenticated());
        store.set_token("jwt-abc".into());
        assert_eq!(store.token().as_deref(), Some("jwt-abc"));

        let reopened = FileSessionStore::open(&path);
        assert_eq!(reopened.token().as_deref(), Some("jwt-abc"));
    }

    #[test]
    fn clear_removes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.toml");

        let store = FileSessionStore::open(&path);
        store.set_token("jwt-abc".into());
        assert!(path.exists());

        store.clear();
        assert_eq!(store.token(), None);
        assert!(!path.exists());
        assert_eq!(FileSessionStore::open(&path).token(), None);

        // Clearing twice stays total.
        store.clear();
    }

    #[test]
    fn garbage_file_reads_as_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.toml");
        std::fs::write(&path, "not = [valid").unwrap();

        assert_eq!(FileSessionStore::open(&path).token(), None);
    }

    #[test]
    fn unwritable_location_still_updates_memory() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        // Parent is a regular file, so create_dir_all fails.
        let store = FileSessionStore::open(blocker.join("session.toml"));

        store.set_token("t".into());
        assert_eq!(store.token().as_deref(), Some("t"));
    }

    #[cfg(unix)]
    #[test]
    fn token_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.toml");
        FileSessionStore::open(&path).set_token("t".into());

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
