//! Core traits and types for the harvest system.
//!
//! This module defines the seams between the harvest core and its collaborators:
//! - Read-only model tree access via [`TreeSource`] and [`TreeEntity`]
//! - Output rendering via [`TemplateFormat`]
//! - The annotation key sets harvested per entity
//! - Standardized error handling

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use thiserror::Error;

use crate::model::{EntityKind, TranslationEntry};

// ============================================================================
// Annotation Keys
// ============================================================================

/// Annotations describing a type definition. Harvested only on containers,
/// under the container's own scope.
pub const TYPE_ANNOTATIONS: &[&str] = &[
    "Documentation.info",
    "Documentation.revisions",
    "obsolete",
    "missingInnerMessage",
    "unassignedMessage",
];

/// Dialog annotations. Harvested on every translatable entity, under the
/// scope currently in effect.
pub const GENERAL_ANNOTATIONS: &[&str] = &[
    "Dialog.tab",
    "Dialog.group",
    "Dialog.loadSelector.filter",
    "Dialog.loadSelector.caption",
    "Dialog.saveSelector.filter",
    "Dialog.saveSelector.caption",
];

// ============================================================================
// Tree Source Traits
// ============================================================================

/// Read-only view of one entity in a model tree.
///
/// Every accessor is fallible: a live source may lose its connection or
/// report a failure for any individual read.
pub trait TreeEntity: Sized {
    fn kind(&self) -> Result<EntityKind, SourceError>;

    /// Entity name; used as the scope label when the entity is a container.
    fn ident(&self) -> Result<String, SourceError>;

    /// Description string. Empty means "no comment".
    fn comment(&self) -> Result<String, SourceError>;

    /// `true` for entities supplied by the platform rather than authored content.
    fn is_built_in(&self) -> Result<bool, SourceError>;

    /// Ordered children. Empty for non-container entities.
    fn children(&self) -> Result<Vec<Self>, SourceError>;

    /// Raw value of the annotation `key`, or `None` when absent.
    fn annotation(&self, key: &str) -> Result<Option<String>, SourceError>;
}

/// A model tree that can be searched by package name.
///
/// How the tree was acquired (launching an application, attaching to a
/// running one, loading a file) is invisible behind this trait.
pub trait TreeSource {
    type Entity<'a>: TreeEntity
    where
        Self: 'a;

    /// Looks up a package by (possibly dotted) name.
    ///
    /// Returns `Ok(None)` when the source is healthy but has no such package.
    fn lookup(&self, name: &str) -> Result<Option<Self::Entity<'_>>, SourceError>;
}

// ============================================================================
// Format Trait
// ============================================================================

/// Output format for harvested entries.
pub trait TemplateFormat: Send + Sync {
    /// Returns the unique identifier for this format, e.g. `"pot"`.
    fn name(&self) -> &str;

    /// File extension (without the dot) of the written template.
    fn extension(&self) -> &str;

    /// Renders the entries in their set order.
    ///
    /// `created` is stamped into the header when the format emits one.
    fn render(&self, entries: &BTreeSet<TranslationEntry>, created: DateTime<Utc>) -> String;
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised by a tree source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Connection to the source failed or was lost
    #[error("source unavailable: {0}")]
    Unavailable(String),

    /// Structured failure signal from the source
    #[error("source reported failure: {0}")]
    Protocol(String),

    /// Source returned data that could not be interpreted
    #[error("malformed source data: {0}")]
    Malformed(String),
}

impl SourceError {
    /// Structured failures only abort the subtree they occur in.
    pub fn is_structured(&self) -> bool {
        matches!(self, SourceError::Protocol(_))
    }
}

/// Errors that end a harvest run. No output file is written for any of them.
#[derive(Error, Debug)]
pub enum HarvestError {
    /// Requested root package does not exist in the source
    #[error("Package {0} not found.")]
    PackageNotFound(String),

    /// Tree source could not be reached
    #[error("Tree source unavailable: {0}")]
    SourceUnavailable(String),

    /// Tree source signaled a structured failure outside any recoverable subtree
    #[error("Tree source error: {0}")]
    SourceProtocol(String),

    /// Anything else; carries the full diagnostic
    #[error("Unexpected failure: {0}")]
    Unexpected(String),

    /// Output file could not be written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<SourceError> for HarvestError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Unavailable(msg) => HarvestError::SourceUnavailable(msg),
            SourceError::Protocol(msg) => HarvestError::SourceProtocol(msg),
            SourceError::Malformed(msg) => HarvestError::Unexpected(msg),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
