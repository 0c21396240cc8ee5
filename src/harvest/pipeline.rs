//! Harvest pipeline.
//!
//! This module provides the [`HarvestPipeline`] coordinator that runs one
//! harvest from start to finish on the calling thread:
//! Lookup → Traversal → Deduplication → Rendering → File output.
//!
//! A run either writes the complete template or fails without touching the
//! output file.

use chrono::Utc;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;
use tracing::info;

use crate::harvest::extract::traverse;
use crate::harvest::formats::PotFormat;
use crate::harvest::traits::{HarvestError, TemplateFormat, TreeSource};
use crate::model::TranslationEntry;

// ============================================================================
// Pipeline Types
// ============================================================================

/// Complete harvest result with output location and statistics.
#[derive(Debug)]
pub struct HarvestResult {
    /// Package the template was generated for
    pub package: String,

    /// Written template file
    pub output_path: PathBuf,

    /// Processing statistics
    pub stats: HarvestStats,
}

/// Statistics about the harvest operation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HarvestStats {
    /// Entities visited during traversal
    pub entities_visited: usize,

    /// Entries collected before deduplication
    pub entries_collected: usize,

    /// Entries left after deduplication (= message blocks written)
    pub unique_entries: usize,

    /// Subtrees abandoned after a structured source failure
    pub skipped_subtrees: usize,

    /// Total time spent on the run (milliseconds)
    pub duration_ms: u64,
}

/// Collapses entries into a set keyed by the whole `(scope, text)` pair.
///
/// The set iterates in `(scope, text)` order, so output built from it is
/// reproducible.
pub fn dedupe<I>(entries: I) -> BTreeSet<TranslationEntry>
where
    I: IntoIterator<Item = TranslationEntry>,
{
    entries.into_iter().collect()
}

// ============================================================================
// Pipeline Executor
// ============================================================================

/// Harvest pipeline producing one template file per package.
///
/// # Example
///
/// ```ignore
/// use pot_harvester::harvest::HarvestPipeline;
///
/// let pipeline = HarvestPipeline::new()
///     .with_header(false)
///     .with_output_dir("locale");
///
/// let result = pipeline.execute(&source, "Modelica.Blocks")?;
/// println!("Wrote {}", result.output_path.display());
/// ```
#[derive(Debug, Clone)]
pub struct HarvestPipeline<F = PotFormat>
where
    F: TemplateFormat,
{
    /// Output format
    format: F,

    /// Directory receiving `<package>.<ext>` (default: current directory)
    output_dir: PathBuf,
}

impl Default for HarvestPipeline<PotFormat> {
    fn default() -> Self {
        Self::new()
    }
}

impl HarvestPipeline<PotFormat> {
    /// Creates a POT pipeline with header enabled, writing to the current directory.
    pub fn new() -> Self {
        Self {
            format: PotFormat::default(),
            output_dir: PathBuf::from("."),
        }
    }

    /// Enables or disables the gettext header block.
    pub fn with_header(mut self, emit_header: bool) -> Self {
        self.format = PotFormat::new(emit_header);
        self
    }
}

impl<F> HarvestPipeline<F>
where
    F: TemplateFormat,
{
    /// Replaces the output format.
    pub fn with_format<G: TemplateFormat>(self, format: G) -> HarvestPipeline<G> {
        HarvestPipeline {
            format,
            output_dir: self.output_dir,
        }
    }

    /// Sets the directory the template is written to.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn format(&self) -> &F {
        &self.format
    }

    /// Path of the template written for `package`.
    pub fn output_path(&self, package: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", package, self.format.extension()))
    }

    /// Looks up `package`, traverses it and returns the unique entries.
    ///
    /// # Errors
    ///
    /// - [`HarvestError::PackageNotFound`] if the source has no such package
    /// - [`HarvestError::SourceUnavailable`] / [`HarvestError::SourceProtocol`]
    ///   for failures of the source outside a recoverable subtree
    /// - [`HarvestError::Unexpected`] for malformed source data
    pub fn collect<S: TreeSource>(
        &self,
        source: &S,
        package: &str,
    ) -> Result<(BTreeSet<TranslationEntry>, HarvestStats), HarvestError> {
        let root = source
            .lookup(package)?
            .ok_or_else(|| HarvestError::PackageNotFound(package.to_string()))?;

        let harvest = traverse(&root, package)?;
        let entries_collected = harvest.entries.len();
        let entries = dedupe(harvest.entries);
        let stats = HarvestStats {
            entities_visited: harvest.entities_visited,
            entries_collected,
            unique_entries: entries.len(),
            skipped_subtrees: harvest.skipped_subtrees,
            duration_ms: 0,
        };
        Ok((entries, stats))
    }

    /// Executes the complete harvest for `package` and writes the template.
    ///
    /// Nothing is written unless collection succeeds.
    pub fn execute<S: TreeSource>(
        &self,
        source: &S,
        package: &str,
    ) -> Result<HarvestResult, HarvestError> {
        let start = Instant::now();
        info!(package = %package, format = self.format.name(), "Starting harvest");

        let (entries, mut stats) = self.collect(source, package)?;
        info!(
            entities = stats.entities_visited,
            collected = stats.entries_collected,
            unique = stats.unique_entries,
            skipped = stats.skipped_subtrees,
            "Traversal completed"
        );

        let content = self.format.render(&entries, Utc::now());
        let output_path = self.output_path(package);
        write_template(&output_path, &content)?;

        stats.duration_ms = elapsed_ms(start.elapsed());
        info!(
            path = %output_path.display(),
            duration_ms = stats.duration_ms,
            "Template written"
        );

        Ok(HarvestResult {
            package: package.to_string(),
            output_path,
            stats,
        })
    }
}

/// Writes `content` to a temporary sibling of `path` and renames it into
/// place, so readers only ever see a complete template.
fn write_template(path: &Path, content: &str) -> Result<(), HarvestError> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut staged = NamedTempFile::new_in(parent)?;
    staged.write_all(content.as_bytes())?;
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|e| HarvestError::Io(e.error))?;
    Ok(())
}

fn elapsed_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// Harvests `package` into `<package>.pot` in the current directory.
pub fn run<S: TreeSource>(
    source: &S,
    package: &str,
    emit_header: bool,
) -> Result<HarvestResult, HarvestError> {
    HarvestPipeline::new()
        .with_header(emit_header)
        .execute(source, package)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntityKind, ModelNode};
    use crate::snapshot::SnapshotSource;
    use chrono::{DateTime, Utc};

    fn source(root: ModelNode) -> SnapshotSource {
        SnapshotSource::new(vec![root])
    }

    #[test]
    fn test_dedupe_is_idempotent() {
        let raw = vec![
            TranslationEntry::new("A", "x"),
            TranslationEntry::new("A", "x"),
            TranslationEntry::new("B", "x"),
        ];
        let once = dedupe(raw);
        let twice = dedupe(once.clone());
        assert_eq!(once.len(), 2);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_same_text_same_scope_collapses() {
        let tree = source(
            ModelNode::container("P")
                .with_child(ModelNode::new(EntityKind::Parameter, "a").with_comment("Gain"))
                .with_child(ModelNode::new(EntityKind::Parameter, "b").with_comment("Gain")),
        );
        let (entries, stats) = HarvestPipeline::new().collect(&tree, "P").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(stats.entries_collected, 2);
        assert_eq!(stats.unique_entries, 1);
    }

    #[test]
    fn test_same_text_different_scope_survives() {
        let tree = source(
            ModelNode::container("P")
                .with_child(ModelNode::container("A").with_comment("Gain"))
                .with_child(ModelNode::container("B").with_comment("Gain")),
        );
        let (entries, _) = HarvestPipeline::new().collect(&tree, "P").unwrap();
        let scopes: Vec<_> = entries.iter().map(|e| e.scope.as_str()).collect();
        assert_eq!(scopes, vec!["A", "B"]);
    }

    #[test]
    fn test_package_not_found_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = HarvestPipeline::new().with_output_dir(dir.path());
        let tree = source(ModelNode::container("P"));

        let err = pipeline.execute(&tree, "Missing").unwrap_err();
        assert!(matches!(err, HarvestError::PackageNotFound(ref name) if name == "Missing"));
        assert!(!pipeline.output_path("Missing").exists());
    }

    #[test]
    fn test_root_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = HarvestPipeline::new().with_output_dir(dir.path());
        let mut root = ModelNode::container("P").with_comment("Hello");
        root.fault = Some("E_FAIL".to_string());

        let err = pipeline.execute(&source(root), "P").unwrap_err();
        assert!(matches!(err, HarvestError::SourceProtocol(_)));
        assert!(!pipeline.output_path("P").exists());
    }

    #[test]
    fn test_execute_writes_single_block() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = HarvestPipeline::new()
            .with_header(false)
            .with_output_dir(dir.path());
        let tree = source(ModelNode::container("P").with_comment("Hello"));

        let result = pipeline.execute(&tree, "P").unwrap();
        assert_eq!(result.output_path, dir.path().join("P.pot"));
        assert_eq!(result.stats.unique_entries, 1);

        let written = std::fs::read_to_string(&result.output_path).unwrap();
        assert_eq!(written, "msgctxt \"P\"\nmsgid \"Hello\"\nmsgstr \"\"\n");
    }

    #[test]
    fn test_execute_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = HarvestPipeline::new().with_output_dir(dir.path());
        let tree = source(ModelNode::container("P").with_comment("Hello"));

        let result = pipeline.execute(&tree, "P").unwrap();
        let written = std::fs::read_to_string(&result.output_path).unwrap();
        assert!(written.starts_with("# SOME DESCRIPTIVE TITLE."));
        assert!(written.contains("POT-Creation-Date: "));
        assert_eq!(written.matches("msgctxt").count(), 1);
    }

    #[test]
    fn test_output_is_reproducible() {
        let tree = source(
            ModelNode::container("Lib")
                .with_comment("Library")
                .with_annotation("Documentation.info", "\"<html>Docs</html>\"")
                .with_child(
                    ModelNode::container("Motor")
                        .with_comment("Motor")
                        .with_child(
                            ModelNode::new(EntityKind::Parameter, "J")
                                .with_comment("Inertia")
                                .with_annotation("Dialog.group", "\"Mechanics\""),
                        ),
                )
                .with_child(ModelNode::container("Pump").with_comment("Pump")),
        );
        let pipeline = HarvestPipeline::new().with_header(false);
        let created: DateTime<Utc> = Utc::now();

        let (first, _) = pipeline.collect(&tree, "Lib").unwrap();
        let (second, _) = pipeline.collect(&tree, "Lib").unwrap();
        assert_eq!(
            pipeline.format().render(&first, created),
            pipeline.format().render(&second, created)
        );
        let scopes: Vec<_> = first.iter().map(|e| (e.scope.as_str(), e.text.as_str())).collect();
        assert_eq!(
            scopes,
            vec![
                ("Lib", "<html>Docs</html>"),
                ("Lib", "Library"),
                ("Motor", "Inertia"),
                ("Motor", "Mechanics"),
                ("Motor", "Motor"),
                ("Pump", "Pump"),
            ]
        );
    }

    #[test]
    fn test_execute_replaces_existing_template_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("P.pot"), "stale content that is longer than the new one")
            .unwrap();
        let pipeline = HarvestPipeline::new()
            .with_header(false)
            .with_output_dir(dir.path());
        let tree = source(ModelNode::container("P").with_comment("Hello"));

        pipeline.execute(&tree, "P").unwrap();

        let written = std::fs::read_to_string(dir.path().join("P.pot")).unwrap();
        assert_eq!(written, "msgctxt \"P\"\nmsgid \"Hello\"\nmsgstr \"\"\n");
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("P.pot")]);
    }

    #[test]
    fn test_unwritable_output_dir_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();
        let pipeline = HarvestPipeline::new().with_output_dir(&blocker);
        let tree = source(ModelNode::container("P").with_comment("Hello"));

        let err = pipeline.execute(&tree, "P").unwrap_err();
        assert!(matches!(err, HarvestError::Io(_)));
        assert!(!blocker.join("P.pot").exists());
    }

    #[test]
    fn test_elapsed_ms_saturates() {
        assert_eq!(elapsed_ms(Duration::from_millis(1500)), 1500);
        assert_eq!(elapsed_ms(Duration::MAX), u64::MAX);
    }

    #[test]
    fn test_dotted_package_scope() {
        let tree = source(
            ModelNode::container("Lib").with_child(
                ModelNode::container("Sub")
                    .with_child(ModelNode::new(EntityKind::Parameter, "k").with_comment("Gain")),
            ),
        );
        let (entries, _) = HarvestPipeline::new().collect(&tree, "Lib.Sub").unwrap();
        assert_eq!(
            entries.into_iter().collect::<Vec<_>>(),
            vec![TranslationEntry::new("Sub", "Gain")]
        );
    }
}
