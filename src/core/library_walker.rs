//! Library walker
//!
//! Traverses a source tree, and for every audio file reads its tag,
//! resolves metadata, copies it into the audiobooks tree and fuses the tag
//! at the destination. Failures are contained per file: recoverable errors
//! put the file on the skipped list and the walk moves on.

use crate::core::catalog::CatalogIndex;
use crate::core::error::{ErrorContext, ReconcileError, Result, SkipReason};
use crate::core::matcher::{MatchResolver, MatchStrategy};
use crate::core::path_planner::PathPlanner;
use crate::core::tag_fusion::{self, ResolvedMetadata};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Where a file's book metadata comes from
#[derive(Clone, Copy)]
pub enum MetadataSource<'a> {
    /// Match the file path against the catalog
    Catalog(&'a CatalogIndex),
    /// Trust the title/artist/album already in the file's tag
    EmbeddedTags,
}

/// A file copied into the audiobooks tree
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedFile {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub author: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<MatchStrategy>,
}

/// A file left untouched
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: SkipReason,
}

/// Outcome of one traversal
#[derive(Debug, Default, Serialize)]
pub struct RunReport {
    pub processed: Vec<ProcessedFile>,
    pub skipped: Vec<SkippedFile>,
    pub authors: BTreeSet<String>,
}

impl RunReport {
    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn author_count(&self) -> usize {
        self.authors.len()
    }

    fn record_processed(&mut self, file: ProcessedFile) {
        self.authors.insert(file.author.clone());
        self.processed.push(file);
    }

    fn record_skipped(&mut self, path: PathBuf, reason: SkipReason) {
        self.skipped.push(SkippedFile { path, reason });
    }
}

enum FileOutcome {
    Processed(ProcessedFile),
    Unmatched,
}

/// Drives the match → plan → copy → fuse pipeline over a source tree
pub struct LibraryWalker<'a> {
    planner: PathPlanner,
    source: MetadataSource<'a>,
    extension: String,
}

impl<'a> LibraryWalker<'a> {
    pub fn new(
        planner: PathPlanner,
        source: MetadataSource<'a>,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            planner,
            source,
            extension: extension.into(),
        }
    }

    /// Organize every matching file under `source_root`
    pub fn run(&self, source_root: &Path) -> Result<RunReport> {
        if !source_root.is_dir() {
            return Err(ReconcileError::InvalidPath(format!(
                "source directory {} does not exist",
                source_root.display()
            )));
        }

        let mut report = RunReport::default();
        let files = self.collect_files(source_root, &mut report);
        let total = files.len();
        info!(
            root = ?source_root,
            files = total,
            extension = %self.extension,
            "Scanning source tree"
        );

        for (index, path) in files.into_iter().enumerate() {
            info!("Processing file {}/{}: {}", index + 1, total, path.display());

            match self.process_file(&path) {
                Ok(FileOutcome::Processed(file)) => {
                    info!(destination = ?file.destination, "Processed");
                    report.record_processed(file);
                }
                Ok(FileOutcome::Unmatched) => {
                    let reason = SkipReason::new("NoMatch", "no catalog record matches");
                    report.record_skipped(path, reason);
                }
                Err(e) if e.is_recoverable() => {
                    warn!(path = ?path, error = %e, "Skipping file");
                    let reason = SkipReason::from_error(&e);
                    report.record_skipped(path, reason);
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            processed = report.processed_count(),
            skipped = report.skipped_count(),
            authors = report.author_count(),
            "Walk complete"
        );
        Ok(report)
    }

    fn collect_files(&self, root: &Path, report: &mut RunReport) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| root.to_path_buf());
                    warn!(path = ?path, error = %e, "Cannot read directory entry");
                    report.record_skipped(path, SkipReason::new("Io", e.to_string()));
                    continue;
                }
            };

            if entry.file_type().is_file() && self.has_audio_extension(entry.path()) {
                files.push(entry.into_path());
            }
        }

        files
    }

    fn has_audio_extension(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(&self.extension))
            .unwrap_or(false)
    }

    fn process_file(&self, path: &Path) -> Result<FileOutcome> {
        let existing = tag_fusion::read_tag(path)?;

        let (metadata, strategy) = match self.source {
            MetadataSource::Catalog(catalog) => match MatchResolver::new(catalog).resolve(path) {
                Some(hit) => (ResolvedMetadata::from_record(hit.record), Some(hit.strategy)),
                None => return Ok(FileOutcome::Unmatched),
            },
            MetadataSource::EmbeddedTags => {
                (ResolvedMetadata::from_tag(existing.as_ref()), None)
            }
        };

        debug!(
            path = ?path,
            title = %metadata.title,
            author = %metadata.author,
            "Resolved metadata"
        );

        let destination = self
            .planner
            .place(path, &metadata.author, &metadata.book_folder)
            .with_context(|| format!("Failed to copy {}", path.display()))?;

        tag_fusion::fuse_file(&destination, existing.as_ref(), &metadata)?;

        Ok(FileOutcome::Processed(ProcessedFile {
            source: path.to_path_buf(),
            destination,
            author: metadata.author,
            title: metadata.title,
            strategy,
        }))
    }
}
