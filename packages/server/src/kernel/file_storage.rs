use std::path::{Component, Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use tracing::debug;

use super::BaseFileStorage;

/// Image blobs on a local (or mounted) directory, addressed by key
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Keys are flat generated names; anything that walks the tree is refused
    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let is_plain = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));

        if key.is_empty() || !is_plain {
            return Err(anyhow!("Invalid storage key: {}", key));
        }

        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BaseFileStorage for LocalFileStorage {
    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        debug!(path = %path.display(), "Deleting stored image");

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to delete {}", path.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_traversal() {
        let storage = LocalFileStorage::new("/srv/images");
        assert!(storage.path_for("../etc/passwd").is_err());
        assert!(storage.path_for("/etc/passwd").is_err());
        assert!(storage.path_for("").is_err());
        assert_eq!(
            storage.path_for("a1b2.jpg").unwrap(),
            PathBuf::from("/srv/images/a1b2.jpg")
        );
    }

    #[tokio::test]
    async fn test_delete_missing_file_is_ok() {
        let dir = std::env::temp_dir().join(format!("estate-storage-{}", uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let storage = LocalFileStorage::new(&dir);

        tokio::fs::write(dir.join("photo.jpg"), b"jpeg").await.unwrap();
        storage.delete("photo.jpg").await.unwrap();
        assert!(!dir.join("photo.jpg").exists());

        // second delete is a no-op
        storage.delete("photo.jpg").await.unwrap();

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
