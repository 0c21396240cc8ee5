pub mod executor;
pub mod harvest;
pub mod model;
pub mod snapshot;
pub mod traits;

// Re-export common types for convenience
pub use executor::*;
pub use harvest::{run, HarvestError, HarvestPipeline, HarvestResult, SourceError};
pub use model::*;
pub use snapshot::*;
pub use traits::*;
