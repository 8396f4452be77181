//! Filesystem storage for the file-backed gateway.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind as IoErrorKind, Write};
use std::path::{Component, Path, PathBuf};

use chrono::Utc;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use marquee_core::error::{Error, InvalidInputError, ProtocolError, UploadError};
use marquee_core::{Movie, MovieId, Result};

fn corrupt(err: serde_json::Error) -> Error {
    Error::InvalidInput(InvalidInputError::Other {
        message: err.to_string(),
    })
}

/// An account stored in the local gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalUser {
    pub id: String,
    pub email: String,
    pub created_at: String,
    /// Password hash (bcrypt).
    pub password_hash: String,
}

/// A sign-in held by an opaque token. The token is the file name.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredSession {
    user_id: String,
    created_at: String,
}

/// Directory layout and raw reads/writes.
#[derive(Debug, Clone)]
pub(crate) struct FileStore {
    root: PathBuf,
}

/// Exclusive hold on `catalog.lock`, released on drop.
pub(crate) struct CatalogLock {
    file: File,
}

impl Drop for CatalogLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!(error = %e, "Failed to release catalog lock");
        }
    }
}

impl FileStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn users_dir(&self) -> PathBuf {
        self.root.join("auth").join("users")
    }

    fn sessions_dir(&self) -> PathBuf {
        self.root.join("auth").join("sessions")
    }

    fn movies_dir(&self) -> PathBuf {
        self.root.join("catalog").join("movies")
    }

    fn lock_path(&self) -> PathBuf {
        self.root.join("catalog.lock")
    }

    fn user_path(&self, id: &str) -> Result<PathBuf> {
        Ok(self.users_dir().join(format!("{}.json", file_name(id)?)))
    }

    fn session_path(&self, token: &str) -> Result<PathBuf> {
        let token = Uuid::parse_str(token).map_err(|_| InvalidInputError::Other {
            message: "malformed session token".to_string(),
        })?;
        Ok(self.sessions_dir().join(format!("{}.json", token.simple())))
    }

    fn movie_path(&self, id: &MovieId) -> Result<PathBuf> {
        Ok(self.movies_dir().join(format!("{}.json", file_name(id.as_str())?)))
    }

    /// Path of a stored object. Keys may contain `/` but never leave the bucket.
    pub fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf> {
        let mut path = self.root.join("storage").join(checked_segment(bucket)?);
        let relative = Path::new(key);
        if key.is_empty()
            || !relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(InvalidInputError::Other {
                message: format!("invalid object key '{}'", key),
            }
            .into());
        }
        path.push(relative);
        Ok(path)
    }

    /// Take the catalog lock, blocking until it is free.
    pub fn lock_catalog(&self) -> Result<CatalogLock> {
        fs::create_dir_all(&self.root)?;
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())?;
        file.lock_exclusive()?;
        Ok(CatalogLock { file })
    }

    // ========================================================================
    // Users
    // ========================================================================

    #[instrument(skip(self, password_hash))]
    pub fn create_user(&self, email: &str, password_hash: &str) -> Result<LocalUser> {
        if self.find_user_by_email(email)?.is_some() {
            return Err(ProtocolError::new(
                422,
                Some("user_already_exists".to_string()),
                Some(format!("User {} already registered", email)),
            )
            .into());
        }

        let user = LocalUser {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            created_at: Utc::now().to_rfc3339(),
            password_hash: password_hash.to_string(),
        };
        let content = serde_json::to_string_pretty(&user).map_err(corrupt)?;
        write_atomic(&self.user_path(&user.id)?, content.as_bytes())?;

        debug!(id = %user.id, "Created local user");
        Ok(user)
    }

    pub fn get_user(&self, id: &str) -> Result<Option<LocalUser>> {
        let path = self.user_path(id)?;
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&content).map_err(corrupt)?))
    }

    pub fn list_users(&self) -> Result<Vec<LocalUser>> {
        read_json_dir(&self.users_dir())
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<LocalUser>> {
        Ok(self
            .list_users()?
            .into_iter()
            .find(|u| u.email.eq_ignore_ascii_case(email)))
    }

    // ========================================================================
    // Sessions
    // ========================================================================

    /// Issue a new session token for a user.
    pub fn create_session(&self, user_id: &str) -> Result<String> {
        let token = Uuid::new_v4().simple().to_string();
        let session = StoredSession {
            user_id: user_id.to_string(),
            created_at: Utc::now().to_rfc3339(),
        };
        let content = serde_json::to_string_pretty(&session).map_err(corrupt)?;
        write_atomic(&self.session_path(&token)?, content.as_bytes())?;
        Ok(token)
    }

    /// The user a token was issued to, if the token is still live.
    pub fn session_user(&self, token: &str) -> Result<Option<String>> {
        let path = self.session_path(token)?;
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        let session: StoredSession = serde_json::from_str(&content).map_err(corrupt)?;
        Ok(Some(session.user_id))
    }

    /// Revoke a token. Returns false when it was not live.
    pub fn remove_session(&self, token: &str) -> Result<bool> {
        match fs::remove_file(self.session_path(token)?) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    // ========================================================================
    // Catalog rows
    // ========================================================================

    /// All rows, newest first.
    pub fn list_movies(&self) -> Result<Vec<Movie>> {
        let mut movies: Vec<Movie> = read_json_dir(&self.movies_dir())?;
        movies.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.as_str().cmp(a.id.as_str()))
        });
        Ok(movies)
    }

    pub fn read_movie(&self, id: &MovieId) -> Result<Option<Movie>> {
        let path = self.movie_path(id)?;
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&content).map_err(corrupt)?))
    }

    pub fn write_movie(&self, movie: &Movie) -> Result<()> {
        let content = serde_json::to_string_pretty(movie).map_err(corrupt)?;
        write_atomic(&self.movie_path(&movie.id)?, content.as_bytes())
    }

    /// Remove a row. Returns false when there was none.
    pub fn remove_movie(&self, id: &MovieId) -> Result<bool> {
        match fs::remove_file(self.movie_path(id)?) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    // ========================================================================
    // Objects
    // ========================================================================

    /// Store an object, refusing to overwrite an existing one.
    pub fn put_object(&self, bucket: &str, key: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.object_path(bucket, key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == IoErrorKind::AlreadyExists => {
                return Err(UploadError::Conflict {
                    key: key.to_string(),
                }
                .into());
            }
            Err(e) => return Err(e.into()),
        };
        file.write_all(bytes)?;
        file.sync_data()?;

        debug!(path = %path.display(), len = bytes.len(), "Stored object");
        Ok(path)
    }
}

fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content)?;
    fs::rename(&temp_path, path)?;
    Ok(())
}

fn read_json_dir<T: serde::de::DeserializeOwned>(dir: &Path) -> Result<Vec<T>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut items = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_none_or(|ext| ext != "json") {
            continue;
        }
        let content = fs::read_to_string(&path)?;
        match serde_json::from_str(&content) {
            Ok(item) => items.push(item),
            Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable file"),
        }
    }
    Ok(items)
}

/// Identifiers used verbatim as file names. Separators and dots are refused
/// so that distinct identifiers never share a file.
fn file_name(id: &str) -> Result<&str> {
    if id.is_empty() || id.contains(['/', '\\', ':', '.']) {
        return Err(InvalidInputError::Other {
            message: format!("identifier '{}' cannot be stored", id),
        }
        .into());
    }
    Ok(id)
}

fn checked_segment(segment: &str) -> Result<&str> {
    if segment.is_empty() || segment.contains(['/', '\\']) || segment == "." || segment == ".." {
        return Err(InvalidInputError::Other {
            message: format!("invalid bucket name '{}'", segment),
        }
        .into());
    }
    Ok(segment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn object_keys_stay_inside_bucket() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());

        assert!(store.object_path("movie-videos", "a/b.mp4").is_ok());
        assert!(store.object_path("movie-videos", "../escape.mp4").is_err());
        assert!(store.object_path("movie-videos", "/abs.mp4").is_err());
        assert!(store.object_path("..", "x.mp4").is_err());
    }

    #[test]
    fn put_object_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());

        store.put_object("movie-videos", "clip.mp4", b"one").unwrap();
        let err = store
            .put_object("movie-videos", "clip.mp4", b"two")
            .unwrap_err();

        assert!(matches!(err, Error::Upload(UploadError::Conflict { .. })));
        let stored = fs::read(store.object_path("movie-videos", "clip.mp4").unwrap()).unwrap();
        assert_eq!(stored, b"one");
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());

        store.create_user("admin@example.com", "hash").unwrap();
        assert!(store.create_user("ADMIN@example.com", "hash").is_err());
        assert_eq!(store.list_users().unwrap().len(), 1);
    }

    #[test]
    fn ids_with_separators_or_dots_are_refused() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        let dotted: MovieId = "a.b".parse().unwrap();
        let underscored: MovieId = "a_b".parse().unwrap();

        assert!(store.read_movie(&dotted).is_err());
        assert!(store.remove_movie(&dotted).is_err());
        assert!(store.read_movie(&underscored).unwrap().is_none());
        assert!(store.get_user("../escape").is_err());
    }

    #[test]
    fn sessions_are_opaque_and_revocable() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        let user = store.create_user("admin@example.com", "secret-hash").unwrap();

        let token = store.create_session(&user.id).unwrap();
        assert!(!token.contains("secret-hash"));
        assert_eq!(store.session_user(&token).unwrap(), Some(user.id.clone()));

        assert!(store.remove_session(&token).unwrap());
        assert_eq!(store.session_user(&token).unwrap(), None);
        assert!(store.session_user("../../auth/users/x").is_err());
    }

    #[test]
    fn missing_row_removal_reports_false() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        let id: MovieId = "nope".parse().unwrap();
        assert!(!store.remove_movie(&id).unwrap());
    }
}
