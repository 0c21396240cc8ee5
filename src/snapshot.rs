//! Model tree snapshots stored as JSON.
//!
//! A snapshot is a serialized dump of the package tree:
//!
//! ```json
//! {
//!   "packages": [
//!     { "kind": "container", "ident": "Lib", "comment": "My library", "children": [] }
//!   ]
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::harvest::traits::{SourceError, TreeEntity, TreeSource};
use crate::model::{EntityKind, ModelNode};
use crate::traits::SourceProvider;

/// In-memory model tree loaded from a snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotSource {
    #[serde(default)]
    pub packages: Vec<ModelNode>,
}

impl SnapshotSource {
    pub fn new(packages: Vec<ModelNode>) -> Self {
        Self { packages }
    }

    pub fn from_json(content: &[u8]) -> Result<Self, SourceError> {
        serde_json::from_slice(content).map_err(|e| SourceError::Malformed(e.to_string()))
    }

    fn find(&self, name: &str) -> Option<&ModelNode> {
        let mut parts = name.split('.');
        let first = parts.next()?;
        let mut node = self
            .packages
            .iter()
            .find(|p| p.kind.is_container() && p.ident == first)?;
        for part in parts {
            node = node.find_container(part)?;
        }
        Some(node)
    }
}

impl TreeSource for SnapshotSource {
    type Entity<'a> = &'a ModelNode
    where
        Self: 'a;

    fn lookup(&self, name: &str) -> Result<Option<Self::Entity<'_>>, SourceError> {
        Ok(self.find(name))
    }
}

fn check(node: &ModelNode) -> Result<(), SourceError> {
    match &node.fault {
        Some(fault) => Err(SourceError::Protocol(format!("{}: {}", node.ident, fault))),
        None => Ok(()),
    }
}

impl<'a> TreeEntity for &'a ModelNode {
    fn kind(&self) -> Result<EntityKind, SourceError> {
        check(self)?;
        Ok(self.kind)
    }

    fn ident(&self) -> Result<String, SourceError> {
        check(self)?;
        Ok(self.ident.clone())
    }

    fn comment(&self) -> Result<String, SourceError> {
        check(self)?;
        Ok(self.comment.clone())
    }

    fn is_built_in(&self) -> Result<bool, SourceError> {
        check(self)?;
        Ok(self.built_in)
    }

    fn children(&self) -> Result<Vec<Self>, SourceError> {
        let node: &'a ModelNode = *self;
        check(node)?;
        Ok(node.children.iter().collect())
    }

    fn annotation(&self, key: &str) -> Result<Option<String>, SourceError> {
        check(self)?;
        Ok(self.annotations.get(key).cloned())
    }
}

/// Opens a [`SnapshotSource`] from a JSON file.
#[derive(Debug, Clone)]
pub struct SnapshotProvider {
    path: PathBuf,
}

impl SnapshotProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SourceProvider for SnapshotProvider {
    type Source = SnapshotSource;

    fn source_id(&self) -> &str {
        "snapshot"
    }

    async fn open(&self) -> Result<SnapshotSource, SourceError> {
        let content = tokio::fs::read(&self.path).await.map_err(|e| {
            SourceError::Unavailable(format!("{}: {}", self.path.display(), e))
        })?;
        let source = SnapshotSource::from_json(&content)?;
        info!(
            path = %self.path.display(),
            packages = source.packages.len(),
            "Snapshot loaded"
        );
        Ok(source)
    }
}
