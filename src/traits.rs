use crate::harvest::traits::{SourceError, TreeSource};
use async_trait::async_trait;

#[async_trait]
pub trait SourceProvider: Send + Sync {
    /// Tree produced by this provider. Moved onto a blocking worker for traversal.
    type Source: TreeSource + Send + 'static;

    /// Returns the provider ID used in logs (e.g., "snapshot").
    fn source_id(&self) -> &str;

    /// Acquires the model tree. Connection failures are reported as
    /// [`SourceError::Unavailable`].
    async fn open(&self) -> Result<Self::Source, SourceError>;
}
