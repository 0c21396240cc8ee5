//! Harvest module - translatable text extraction and template output.
//!
//! This module provides the core of the harvester:
//! - **Traits**: [`TreeSource`], [`TreeEntity`] for model tree access, [`TemplateFormat`] for output
//! - **Extraction**: depth-first traversal via [`traverse`]
//! - **Pipeline**: lookup, deduplication and file output via [`pipeline::HarvestPipeline`]
//! - **Formats**: gettext POT rendering via [`formats::PotFormat`]

pub mod extract;
pub mod formats;
pub mod pipeline;
pub mod traits;

// Re-export commonly used types
pub use traits::{
    HarvestError, SourceError, TemplateFormat, TreeEntity, TreeSource, GENERAL_ANNOTATIONS,
    TYPE_ANNOTATIONS,
};

pub use extract::{
    escape_literal_quotes, escape_quotes, extract_annotations, is_translatable,
    strip_string_delimiters, traverse, Harvest,
};

pub use formats::{PotFormat, POT_HEADER};

pub use pipeline::{dedupe, run, HarvestPipeline, HarvestResult, HarvestStats};
