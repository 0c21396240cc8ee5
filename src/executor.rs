use crate::harvest::pipeline::{HarvestPipeline, HarvestResult};
use crate::harvest::traits::{HarvestError, TemplateFormat};
use crate::traits::SourceProvider;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, instrument};

/// Runs harvests with a bound on how many may be in flight at once.
///
/// The source is acquired on the runtime; traversal, rendering and dropping
/// the source all happen on a single blocking worker thread.
pub struct HarvesterExecutor {
    semaphore: Arc<Semaphore>,
}

impl HarvesterExecutor {
    pub fn new(concurrency_limit: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(concurrency_limit)),
        }
    }

    #[instrument(skip(self, provider, pipeline))]
    pub async fn execute<P, F>(
        &self,
        provider: Arc<P>,
        pipeline: HarvestPipeline<F>,
        package: String,
    ) -> Result<HarvestResult, HarvestError>
    where
        P: SourceProvider + 'static,
        F: TemplateFormat + 'static,
    {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| HarvestError::Unexpected(format!("Semaphore error: {}", e)))?;

        info!("Opening tree source: {}", provider.source_id());
        let source = provider.open().await.map_err(|e| {
            error!(error = %e, "Could not open tree source");
            HarvestError::from(e)
        })?;

        let result = tokio::task::spawn_blocking(move || pipeline.execute(&source, &package))
            .await
            .map_err(|e| HarvestError::Unexpected(format!("Task join error: {}", e)))?;

        match &result {
            Ok(harvest) => info!(
                package = %harvest.package,
                entries = harvest.stats.unique_entries,
                "Finished harvest"
            ),
            Err(e) => error!(error = %e, detail = ?e, "Harvest failed"),
        }
        result
    }
}
