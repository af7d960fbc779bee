//! Local-disk file store rooted at the upload directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use postpilot_core::ports::{FileStore, FileStoreError};

use super::sanitize::secure_filename;

pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    /// Open the store, creating the directory if needed.
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, FileStoreError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        tracing::info!(path = %root.display(), "Upload directory ready");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Only names that are already in sanitized form can address a file.
    fn path_for(&self, name: &str) -> Result<PathBuf, FileStoreError> {
        match secure_filename(name) {
            Some(clean) if clean == name => Ok(self.root.join(clean)),
            _ => Err(FileStoreError::InvalidName(name.to_string())),
        }
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn save(&self, name: &str, bytes: &[u8]) -> Result<String, FileStoreError> {
        let clean =
            secure_filename(name).ok_or_else(|| FileStoreError::InvalidName(name.to_string()))?;
        tokio::fs::write(self.root.join(&clean), bytes).await?;

        tracing::debug!(name = %clean, size = bytes.len(), "File stored");
        Ok(clean)
    }

    async fn delete(&self, name: &str) -> Result<bool, FileStoreError> {
        let path = self.path_for(name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, name: &str) -> Result<bool, FileStoreError> {
        let path = self.path_for(name)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }

    async fn read(&self, name: &str) -> Result<Vec<u8>, FileStoreError> {
        let path = self.path_for(name)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(FileStoreError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> (tempfile::TempDir, LocalFileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path().join("uploads")).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn save_sanitizes_and_round_trips() {
        let (_dir, store) = store().await;

        let name = store.save("my photo.png", b"png-bytes").await.unwrap();

        assert_eq!(name, "my_photo.png");
        assert!(store.exists(&name).await.unwrap());
        assert_eq!(store.read(&name).await.unwrap(), b"png-bytes");
    }

    #[tokio::test]
    async fn save_overwrites_same_name() {
        let (_dir, store) = store().await;
        store.save("a.png", b"one").await.unwrap();
        store.save("a.png", b"two").await.unwrap();

        assert_eq!(store.read("a.png").await.unwrap(), b"two");
    }

    #[tokio::test]
    async fn delete_reports_missing_files() {
        let (_dir, store) = store().await;
        store.save("a.png", b"x").await.unwrap();

        assert!(store.delete("a.png").await.unwrap());
        assert!(!store.delete("a.png").await.unwrap());
        assert!(matches!(
            store.read("a.png").await,
            Err(FileStoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn rejects_names_that_escape_the_root() {
        let (dir, store) = store().await;
        tokio::fs::write(dir.path().join("secret.txt"), b"s").await.unwrap();

        assert!(matches!(
            store.read("../secret.txt").await,
            Err(FileStoreError::InvalidName(_))
        ));
        assert!(matches!(
            store.exists("../secret.txt").await,
            Err(FileStoreError::InvalidName(_))
        ));
        assert!(matches!(
            store.save("..", b"x").await,
            Err(FileStoreError::InvalidName(_))
        ));
    }
}
