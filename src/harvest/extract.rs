//! Depth-first extraction of translatable text from a model tree.
//!
//! Each visited entity contributes its comment and a set of annotation values,
//! tagged with the scope of the nearest enclosing container. Results are
//! returned per call and merged by the parent, so no accumulator is shared
//! across the recursion.

use tracing::{debug, warn};

use crate::harvest::traits::{SourceError, TreeEntity, GENERAL_ANNOTATIONS, TYPE_ANNOTATIONS};
use crate::model::{EntityKind, TranslationEntry};

/// Entries and counters produced by traversing one subtree.
#[derive(Debug, Default, Clone)]
pub struct Harvest {
    /// Raw entries in traversal order; may contain duplicates
    pub entries: Vec<TranslationEntry>,

    /// Number of entities visited, including the subtree root
    pub entities_visited: usize,

    /// Child subtrees abandoned after a structured source failure
    pub skipped_subtrees: usize,
}

impl Harvest {
    fn absorb(&mut self, other: Harvest) {
        self.entries.extend(other.entries);
        self.entities_visited += other.entities_visited;
        self.skipped_subtrees += other.skipped_subtrees;
    }
}

/// Built-in type definitions carry no description of their own; everything
/// else, including built-in leaves, is eligible.
pub fn is_translatable(kind: EntityKind, built_in: bool) -> bool {
    !(kind.is_container() && built_in)
}

fn entity_is_translatable<E: TreeEntity>(
    entity: &E,
    kind: EntityKind,
) -> Result<bool, SourceError> {
    // Built-in status is only consulted for containers.
    if kind.is_container() {
        Ok(is_translatable(kind, entity.is_built_in()?))
    } else {
        Ok(true)
    }
}

/// Removes one pair of Modelica string delimiters, if present.
///
/// A lone `"` counts as both delimiters and strips to the empty string.
pub fn strip_string_delimiters(value: &str) -> &str {
    if value == "\"" {
        ""
    } else if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Escapes quotes in a Modelica literal body that are not already escaped.
///
/// Existing escape pairs (`\"`, `\\`, ...) pass through unchanged. A
/// trailing lone backslash is doubled so it cannot swallow the closing quote.
pub fn escape_literal_quotes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(next) => {
                    out.push('\\');
                    out.push(next);
                }
                None => out.push_str("\\\\"),
            },
            '"' => out.push_str("\\\""),
            _ => out.push(c),
        }
    }
    out
}

/// Escapes embedded double quotes for use inside a gettext string.
pub fn escape_quotes(text: &str) -> String {
    text.replace('"', "\\\"")
}

/// Collects the non-empty values of `keys` on `entity`, in key order.
pub fn extract_annotations<E: TreeEntity>(
    entity: &E,
    scope: &str,
    keys: &[&str],
) -> Result<Vec<TranslationEntry>, SourceError> {
    let mut entries = Vec::new();
    for key in keys {
        let Some(raw) = entity.annotation(key)? else {
            continue;
        };
        let value = strip_string_delimiters(&raw);
        if !value.is_empty() {
            entries.push(TranslationEntry::new(scope, escape_literal_quotes(value)));
        }
    }
    Ok(entries)
}

/// Traverses `entity` and its descendants, starting in `scope`.
///
/// Order per entity: own comment (in the inherited scope), type annotations
/// (containers only, in their own scope), dialog annotations (current scope),
/// then children.
///
/// # Errors
///
/// A structured source failure inside a child subtree is logged and that
/// child's contribution dropped; siblings continue. Any other failure, or a
/// failure on `entity` itself, is returned to the caller.
pub fn traverse<E: TreeEntity>(entity: &E, scope: &str) -> Result<Harvest, SourceError> {
    let mut harvest = Harvest {
        entities_visited: 1,
        ..Harvest::default()
    };

    let kind = entity.kind()?;
    let ident = entity.ident()?;
    let translatable = entity_is_translatable(entity, kind)?;

    if translatable {
        debug!(ident = %ident, "visiting entity");
        let comment = entity.comment()?;
        if !comment.is_empty() {
            harvest
                .entries
                .push(TranslationEntry::new(scope, escape_quotes(&comment)));
        }
    }

    let scope = if kind.is_container() {
        harvest
            .entries
            .extend(extract_annotations(entity, &ident, TYPE_ANNOTATIONS)?);
        ident.as_str()
    } else {
        scope
    };

    if translatable {
        harvest
            .entries
            .extend(extract_annotations(entity, scope, GENERAL_ANNOTATIONS)?);
    }

    if kind.is_container() {
        for child in entity.children()? {
            match traverse_child(&child, scope) {
                Ok(sub) => harvest.absorb(sub),
                Err(err) if err.is_structured() => {
                    warn!(scope = %scope, error = %err, "Skipping subtree after source failure");
                    harvest.skipped_subtrees += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    Ok(harvest)
}

fn traverse_child<E: TreeEntity>(child: &E, scope: &str) -> Result<Harvest, SourceError> {
    if child.kind()?.is_container() {
        traverse(child, &child.ident()?)
    } else {
        traverse(child, scope)
    }
}

// ============================================================================
// Tests
// ============================================================================
