pub mod local;

use async_trait::async_trait;
use tokio::io::AsyncRead;

use crate::errors::ServiceError;

pub use local::LocalFileStore;

/// Trait abstraction for file storage providers.
/// Implementations can be local-disk, object-store, or remote.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Public-facing path for `path`, `None` when no backing file exists.
    async fn get_virtual_path(&self, path: &str) -> Option<String>;
    /// Remove the backing file. Deleting a path that was never written
    /// fails with the filesystem's not-found error.
    async fn delete(&self, path: &str) -> Result<(), ServiceError>;
    async fn exists(&self, path: &str) -> bool;
    /// Stream `body` into a new file and return its public path. Fails
    /// when the path is already taken; existing files are never
    /// overwritten.
    async fn write(&self, path: &str, body: &mut (dyn AsyncRead + Send + Unpin)) -> Result<String, ServiceError>;
}
