use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::{self, AsyncRead, AsyncWriteExt};
use tracing::info;

use crate::errors::ServiceError;

use super::FileStore;

/// Stores files under a fixed local root; clients address them through
/// a virtual-root prefix instead of the physical location.
#[derive(Clone, Debug)]
pub struct LocalFileStore {
    root: PathBuf,
    virtual_root: String,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>, virtual_root: impl Into<String>) -> Self {
        let mut virtual_root = virtual_root.into();
        while virtual_root.ends_with('/') && virtual_root.len() > 1 {
            virtual_root.pop();
        }
        Self { root: root.into(), virtual_root }
    }

    pub fn from_config(cfg: &configs::StorageConfig) -> Self {
        Self::new(cfg.root.as_str(), cfg.virtual_root.as_str())
    }

    fn storage_path(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }

    fn virtual_path(&self, path: &str) -> String {
        format!("{}/{}", self.virtual_root, path)
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn get_virtual_path(&self, path: &str) -> Option<String> {
        let storage_path = self.storage_path(path);
        if !fs::try_exists(&storage_path).await.unwrap_or(false) {
            return None;
        }
        Some(self.virtual_path(path))
    }

    async fn delete(&self, path: &str) -> Result<(), ServiceError> {
        let storage_path = self.storage_path(path);
        info!(path = %storage_path.display(), "file delete");
        fs::remove_file(&storage_path).await?;
        Ok(())
    }

    async fn exists(&self, path: &str) -> bool {
        let storage_path = self.storage_path(path);
        info!(path = %storage_path.display(), "file exists");
        fs::try_exists(&storage_path).await.unwrap_or(false)
    }

    async fn write(&self, path: &str, body: &mut (dyn AsyncRead + Send + Unpin)) -> Result<String, ServiceError> {
        let storage_path = self.storage_path(path);
        if let Some(parent) = storage_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        // create_new: a concurrent writer to the same path loses with
        // AlreadyExists instead of clobbering the file.
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&storage_path)
            .await?;
        io::copy(body, &mut file).await?;
        file.flush().await?;
        let virtual_path = self.virtual_path(path);
        info!(path = %storage_path.display(), %virtual_path, "file write");
        Ok(virtual_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind;

    fn temp_store() -> (LocalFileStore, PathBuf) {
        let root = std::env::temp_dir().join(format!("blog_storage_{}", uuid::Uuid::new_v4()));
        (LocalFileStore::new(&root, "/storage"), root)
    }

    #[tokio::test]
    async fn write_creates_dirs_and_never_overwrites() -> Result<(), anyhow::Error> {
        let (store, root) = temp_store();

        let virtual_path = store.write("a/b.txt", &mut &b"hello"[..]).await?;
        assert_eq!(virtual_path, "/storage/a/b.txt");
        assert!(store.exists("a/b.txt").await);
        assert_eq!(store.get_virtual_path("a/b.txt").await.as_deref(), Some("/storage/a/b.txt"));
        assert_eq!(std::fs::read(root.join("a/b.txt"))?, b"hello");

        let err = store.write("a/b.txt", &mut &b"other"[..]).await.unwrap_err();
        match err {
            ServiceError::Io(e) => assert_eq!(e.kind(), ErrorKind::AlreadyExists),
            other => panic!("expected io error, got {other:?}"),
        }
        // First write is intact.
        assert_eq!(std::fs::read(root.join("a/b.txt"))?, b"hello");

        let _ = std::fs::remove_dir_all(&root);
        Ok(())
    }

    #[tokio::test]
    async fn delete_missing_file_is_not_found() -> Result<(), anyhow::Error> {
        let (store, root) = temp_store();

        let err = store.delete("never/written.txt").await.unwrap_err();
        match err {
            ServiceError::Io(e) => assert_eq!(e.kind(), ErrorKind::NotFound),
            other => panic!("expected io error, got {other:?}"),
        }

        let _ = std::fs::remove_dir_all(&root);
        Ok(())
    }

    #[tokio::test]
    async fn delete_removes_written_file() -> Result<(), anyhow::Error> {
        let (store, root) = temp_store();

        store.write("img/logo.png", &mut &[1u8, 2, 3][..]).await?;
        assert!(store.exists("img/logo.png").await);
        store.delete("img/logo.png").await?;
        assert!(!store.exists("img/logo.png").await);
        assert_eq!(store.get_virtual_path("img/logo.png").await, None);

        let _ = std::fs::remove_dir_all(&root);
        Ok(())
    }

    #[tokio::test]
    async fn missing_file_has_no_virtual_path() {
        let (store, root) = temp_store();
        assert_eq!(store.get_virtual_path("nope.txt").await, None);
        assert!(!store.exists("nope.txt").await);
        let _ = std::fs::remove_dir_all(&root);
    }
}
