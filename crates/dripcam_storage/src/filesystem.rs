//! Filesystem-backed media store.
//!
//! Files live under a single media root:
//! - `webcam/<uuid>.jpg` for captures
//! - `generated/generated_<uuid>.png` for provider output
//!
//! Records hold only the relative path, so the root can move.

use async_trait::async_trait;
use dripcam_error::{MediaError, MediaErrorKind};
use dripcam_interface::{MediaKind, MediaStore};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, instrument};

/// Media store writing into a directory tree.
#[derive(Debug, Clone)]
pub struct FileMediaStore {
    root: PathBuf,
}

impl FileMediaStore {
    /// Create a store rooted at `root`. Directories are created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The media root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a relative media path.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, MediaError> {
        let path = Path::new(relative);
        let escapes = relative.is_empty()
            || path
                .components()
                .any(|c| !matches!(c, Component::Normal(_)));
        if escapes {
            return Err(MediaError::new(MediaErrorKind::InvalidPath(
                relative.to_string(),
            )));
        }
        Ok(self.root.join(path))
    }

    fn file_name(kind: MediaKind) -> String {
        let id = uuid::Uuid::new_v4();
        match kind {
            MediaKind::Capture => format!("{}/{}.jpg", kind, id),
            MediaKind::Generated => format!("{}/generated_{}.png", kind, id),
        }
    }
}

#[async_trait]
impl MediaStore for FileMediaStore {
    #[instrument(skip(self, bytes), fields(kind = %kind, size = bytes.len()))]
    async fn store(&self, kind: MediaKind, bytes: &[u8]) -> Result<String, MediaError> {
        let relative = Self::file_name(kind);
        let absolute = self.resolve(&relative)?;

        if let Some(parent) = absolute.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| MediaError::new(MediaErrorKind::Io(e.to_string())))?;
        }
        tokio::fs::write(&absolute, bytes)
            .await
            .map_err(|e| MediaError::new(MediaErrorKind::Io(e.to_string())))?;

        debug!(path = %relative, "Stored media file");
        Ok(relative)
    }

    #[instrument(skip(self))]
    async fn load(&self, path: &str) -> Result<Vec<u8>, MediaError> {
        let absolute = self.resolve(path)?;
        tokio::fs::read(&absolute).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MediaError::new(MediaErrorKind::NotFound(path.to_string()))
            } else {
                MediaError::new(MediaErrorKind::Io(e.to_string()))
            }
        })
    }

    #[instrument(skip(self))]
    async fn remove(&self, path: &str) -> Result<(), MediaError> {
        let absolute = self.resolve(path)?;
        tokio::fs::remove_file(&absolute).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MediaError::new(MediaErrorKind::NotFound(path.to_string()))
            } else {
                MediaError::new(MediaErrorKind::Io(e.to_string()))
            }
        })?;
        debug!(path, "Removed media file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_and_load_capture() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileMediaStore::new(dir.path());

        let path = store.store(MediaKind::Capture, b"jpeg bytes").await.unwrap();
        assert!(path.starts_with("webcam/"));
        assert!(path.ends_with(".jpg"));

        let bytes = store.load(&path).await.unwrap();
        assert_eq!(bytes, b"jpeg bytes");
    }

    #[tokio::test]
    async fn test_generated_naming() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileMediaStore::new(dir.path());

        let path = store.store(MediaKind::Generated, b"png").await.unwrap();
        assert!(path.starts_with("generated/generated_"));
        assert!(path.ends_with(".png"));
        assert!(dir.path().join(&path).exists());
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileMediaStore::new(dir.path());

        let err = store.load("webcam/missing.jpg").await.unwrap_err();
        assert!(matches!(err.kind, MediaErrorKind::NotFound(_)));
    }

    #[tokio::test]
    async fn test_remove_deletes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileMediaStore::new(dir.path());

        let path = store.store(MediaKind::Generated, b"png").await.unwrap();
        store.remove(&path).await.unwrap();
        assert!(!dir.path().join(&path).exists());

        let err = store.remove(&path).await.unwrap_err();
        assert!(matches!(err.kind, MediaErrorKind::NotFound(_)));
    }

    #[test]
    fn test_resolve_rejects_escaping_paths() {
        let store = FileMediaStore::new("/tmp/media");
        assert!(store.resolve("../etc/passwd").is_err());
        assert!(store.resolve("/etc/passwd").is_err());
        assert!(store.resolve("").is_err());
        assert!(store.resolve("webcam/a.jpg").is_ok());
    }
}
