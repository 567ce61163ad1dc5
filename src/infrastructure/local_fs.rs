use crate::domain::ports::FileStore;
use crate::error::{PrintQError, Result};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

/// Object storage on a local directory. Keys map to relative paths below the
/// root and the returned reference is the absolute file path.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if key.is_empty() || escapes {
            return Err(PrintQError::FileStorageFailed {
                key: key.to_string(),
                source: "key must be a relative path without traversal".into(),
            });
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn put(&self, key: &str, _content_type: Option<&str>, bytes: Vec<u8>) -> Result<String> {
        let path = self.resolve(key)?;
        let storage_error = |e: std::io::Error| PrintQError::FileStorageFailed {
            key: key.to_string(),
            source: Box::new(e),
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(storage_error)?;
        }
        tokio::fs::write(&path, bytes).await.map_err(storage_error)?;

        tracing::debug!(key, path = %path.display(), "stored upload");
        Ok(path.display().to_string())
    }
}
