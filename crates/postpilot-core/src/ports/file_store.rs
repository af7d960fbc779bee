use async_trait::async_trait;

/// Storage for uploaded images, addressed by sanitized file name.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Store bytes under a sanitized version of `name`. Returns the stored name.
    async fn save(&self, name: &str, bytes: &[u8]) -> Result<String, FileStoreError>;

    /// Remove a file. Returns `false` if it did not exist.
    async fn delete(&self, name: &str) -> Result<bool, FileStoreError>;

    async fn exists(&self, name: &str) -> Result<bool, FileStoreError>;

    async fn read(&self, name: &str) -> Result<Vec<u8>, FileStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum FileStoreError {
    #[error("Invalid file name: {0:?}")]
    InvalidName(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
