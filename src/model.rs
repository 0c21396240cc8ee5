use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A harvested `(scope, text)` pair.
///
/// Field order matters: the derived `Ord` sorts by scope first, then text,
/// which is the emission order of the POT serializer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TranslationEntry {
    pub scope: String,
    pub text: String,
}

impl TranslationEntry {
    pub fn new(scope: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            text: text.into(),
        }
    }
}

/// Kind of a model tree entity. Only `Container` recurses and opens a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Type definition (package, model, block, record, ...)
    Container,
    Component,
    Parameter,
    Variable,
    Other,
}

impl EntityKind {
    pub fn is_container(self) -> bool {
        matches!(self, EntityKind::Container)
    }
}

/// Serialized model tree node, as stored in a snapshot file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelNode {
    pub kind: EntityKind,
    pub ident: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub built_in: bool,
    #[serde(default)]
    pub children: Vec<ModelNode>,
    /// Raw annotation values keyed by annotation path (e.g. `Dialog.tab`),
    /// Modelica string delimiters included.
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
    /// Failure reported by the source whenever this node is read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fault: Option<String>,
}

impl ModelNode {
    pub fn new(kind: EntityKind, ident: impl Into<String>) -> Self {
        Self {
            kind,
            ident: ident.into(),
            comment: String::new(),
            built_in: false,
            children: Vec::new(),
            annotations: BTreeMap::new(),
            fault: None,
        }
    }

    pub fn container(ident: impl Into<String>) -> Self {
        Self::new(EntityKind::Container, ident)
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: ModelNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn built_in(mut self) -> Self {
        self.built_in = true;
        self
    }

    /// Finds a direct container child by identifier.
    pub fn find_container(&self, ident: &str) -> Option<&ModelNode> {
        self.children
            .iter()
            .find(|c| c.kind.is_container() && c.ident == ident)
    }
}
