use crate::models::Link;
use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("slug already exists")]
    Conflict,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Link persistence seam. Slug policy and durability live behind this trait;
/// the telemetry pipeline only ever sees the resulting `Link`.
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Initialize the storage (create tables, etc.)
    async fn init(&self) -> Result<()>;

    /// Create a new link under the given slug
    async fn create(&self, slug: &str, target_url: &str) -> StorageResult<Link>;

    /// Get a link by slug
    async fn get(&self, slug: &str) -> Result<Option<Link>>;

    /// Increment the click counter
    async fn increment_clicks(&self, slug: &str) -> Result<()>;
}
