//! Attachment storage on the local filesystem

use async_trait::async_trait;
use drainwatch_core::error::{DrainError, Result};
use drainwatch_core::ports::{FileStore, Upload};
use std::path::{Component, Path, PathBuf};
use uuid::Uuid;

/// Stores uploads under a root directory with generated file names
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
    public_base: String,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self { root: root.into(), public_base: public_base.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a stored path below the root, refusing anything that escapes it
    fn resolve(&self, relative: &str) -> Result<PathBuf> {
        let path = Path::new(relative);
        let escapes = path
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if relative.is_empty() || escapes {
            return Err(DrainError::FileStore(format!("invalid stored path '{}'", relative)));
        }
        Ok(self.root.join(path))
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn save(&self, folder: &str, upload: &Upload) -> Result<String> {
        let extension = upload.normalized_extension();
        if extension.is_empty() || !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(DrainError::FileStore(format!(
                "invalid file extension '{}'",
                upload.extension
            )));
        }

        let relative = format!("{}/{}.{}", folder.trim_matches('/'), Uuid::new_v4(), extension);
        let target = self.resolve(&relative)?;

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                DrainError::FileStore(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
        tokio::fs::write(&target, &upload.bytes).await.map_err(|e| {
            DrainError::FileStore(format!("Failed to write {}: {}", target.display(), e))
        })?;

        tracing::debug!(path = %relative, size_kb = upload.size_kb(), "Stored attachment");
        Ok(relative)
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let target = self.resolve(path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DrainError::FileStore(format!(
                "Failed to delete {}: {}",
                target.display(),
                e
            ))),
        }
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.public_base.trim_end_matches('/'), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_and_delete() {
        let dir = TempDir::new().unwrap();
        let store = LocalFileStore::new(dir.path(), "http://localhost:3000/storage/");

        let path = store.save("reports", &Upload::new(vec![1, 2, 3], ".PNG")).await.unwrap();
        assert!(path.starts_with("reports/"));
        assert!(path.ends_with(".png"));
        assert_eq!(std::fs::read(dir.path().join(&path)).unwrap(), vec![1, 2, 3]);
        assert_eq!(
            store.public_url(&path),
            format!("http://localhost:3000/storage/{}", path)
        );

        store.delete(&path).await.unwrap();
        assert!(!dir.path().join(&path).exists());

        // deleting again is fine
        store.delete(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_paths_outside_root() {
        let dir = TempDir::new().unwrap();
        let store = LocalFileStore::new(dir.path(), "/storage");

        assert!(store.delete("../secret.png").await.is_err());
        assert!(store.delete("/etc/passwd").await.is_err());
        assert!(store.save("reports", &Upload::new(vec![1], "../png")).await.is_err());
    }
}
