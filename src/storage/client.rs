use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use crate::error::AppError;

/// Trait for upload storage operations.
///
/// Handlers only see this trait; the local-disk store backs it at runtime.
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Store content under the given key, replacing any previous object.
    async fn put_object(&self, key: &str, content: Vec<u8>) -> Result<(), AppError>;

    /// Retrieve content by key. Returns `None` if the object doesn't exist.
    async fn get_object(&self, key: &str) -> Result<Option<Vec<u8>>, AppError>;
}

/// Local-disk implementation of StorageClient.
///
/// Keys are relative paths below `root`; the same directory is served
/// read-only under `/uploads`.
pub struct LocalDiskStorage {
    root: PathBuf,
}

impl LocalDiskStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a key below the root, rejecting anything that could escape it.
    fn resolve(&self, key: &str) -> Result<PathBuf, AppError> {
        let relative = Path::new(key);
        let is_plain = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !is_plain {
            return Err(AppError::Storage(format!("Invalid storage key '{}'", key)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl StorageClient for LocalDiskStorage {
    async fn put_object(&self, key: &str, content: Vec<u8>) -> Result<(), AppError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AppError::Storage(format!("Failed to create '{}': {}", parent.display(), e))
            })?;
        }

        tokio::fs::write(&path, content)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to put object '{}': {}", key, e)))?;

        tracing::debug!("Stored upload at {}", path.display());
        Ok(())
    }

    async fn get_object(&self, key: &str) -> Result<Option<Vec<u8>>, AppError> {
        let path = self.resolve(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Storage(format!(
                "Failed to get object '{}': {}",
                key, e
            ))),
        }
    }
}
