//! Music tree pruning
//!
//! Removes artist folders from the music tree when the folder name matches a
//! catalog author, in two phases: a dry run that only reports candidates,
//! and a destructive pass that re-scans and deletes them. Each phase returns
//! its own report.

use crate::core::catalog::AuthorVariantSet;
use crate::core::error::{ErrorContext, ReconcileError, Result, SkipReason};
use crate::core::normalizer::strip_punctuation;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A music folder proposed for deletion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PruneCandidate {
    pub name: String,
    pub path: PathBuf,
}

/// A candidate that could not be removed
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFolder {
    pub path: PathBuf,
    pub reason: SkipReason,
}

/// Outcome of one prune phase
#[derive(Debug, Default, Serialize)]
pub struct PruneReport {
    pub dry_run: bool,
    /// Folders removed, or that would be removed in a dry run
    pub removed: Vec<PathBuf>,
    pub skipped: Vec<SkippedFolder>,
}

impl PruneReport {
    fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    pub fn removed_count(&self) -> usize {
        self.removed.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Spelling variants of a folder name checked against the author set
pub fn folder_variants(folder_name: &str) -> [String; 5] {
    let clean = folder_name.trim();
    let lower = clean.to_lowercase();
    [
        clean.to_string(),
        lower.clone(),
        clean.replace('.', ""),
        clean.replace(',', ""),
        strip_punctuation(&lower),
    ]
}

/// Deletes music folders named after catalog authors
pub struct PruneEngine<'a> {
    authors: &'a AuthorVariantSet,
    protected: Option<PathBuf>,
}

impl<'a> PruneEngine<'a> {
    pub fn new(authors: &'a AuthorVariantSet) -> Self {
        Self {
            authors,
            protected: None,
        }
    }

    /// Never delete this directory, even if its name matches an author
    pub fn protect(mut self, path: impl Into<PathBuf>) -> Self {
        self.protected = Some(path.into());
        self
    }

    /// Whether a folder name matches any author variant
    pub fn matches(&self, folder_name: &str) -> bool {
        folder_variants(folder_name)
            .iter()
            .any(|variant| self.authors.contains(variant))
    }

    /// List the immediate subdirectories of `music_root` that match an author
    pub fn scan(&self, music_root: &Path) -> Result<Vec<PruneCandidate>> {
        let entries = fs::read_dir(music_root).with_path(music_root)?;

        let mut candidates = Vec::new();
        for entry in entries {
            let entry = entry.with_path(music_root)?;
            if !entry.file_type().with_path(&entry.path())?.is_dir() {
                continue;
            }

            let path = entry.path();
            if self.protected.as_deref() == Some(path.as_path()) {
                debug!(path = ?path, "Skipping protected directory");
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            if self.matches(&name) {
                candidates.push(PruneCandidate { name, path });
            }
        }

        candidates.sort_by(|a, b| a.name.cmp(&b.name));
        info!(root = ?music_root, candidates = candidates.len(), "Music tree scanned");
        Ok(candidates)
    }

    /// Report what would be removed without touching the filesystem
    pub fn dry_run(&self, music_root: &Path) -> Result<PruneReport> {
        let mut report = PruneReport::new(true);
        for candidate in self.scan(music_root)? {
            info!(path = ?candidate.path, "Would remove");
            report.removed.push(candidate.path);
        }
        Ok(report)
    }

    /// Re-scan and delete every matching folder
    ///
    /// A folder that cannot be deleted is recorded as skipped; the rest are
    /// still processed.
    pub fn execute(&self, music_root: &Path) -> Result<PruneReport> {
        let mut report = PruneReport::new(false);

        for candidate in self.scan(music_root)? {
            info!(path = ?candidate.path, "Removing");
            match fs::remove_dir_all(&candidate.path).with_path(&candidate.path) {
                Ok(()) => report.removed.push(candidate.path),
                Err(e) => {
                    warn!(path = ?candidate.path, error = %e, "Failed to remove folder");
                    report.skipped.push(SkippedFolder {
                        reason: SkipReason::from_error(&e),
                        path: candidate.path,
                    });
                }
            }
        }

        Ok(report)
    }
}

/// Reject a music root that contains the audiobooks tree itself
pub fn check_disjoint(music_root: &Path, audiobooks_root: &Path) -> Result<()> {
    if audiobooks_root == music_root || music_root.starts_with(audiobooks_root) {
        return Err(ReconcileError::InvalidPath(format!(
            "music root {} overlaps audiobooks root {}",
            music_root.display(),
            audiobooks_root.display()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::{CatalogIndex, CatalogRecord};
    use tempfile::TempDir;

    fn authors(names: &[&str]) -> AuthorVariantSet {
        let mut index = CatalogIndex::default();
        for (i, name) in names.iter().enumerate() {
            index.insert(CatalogRecord {
                title: format!("Book {}", i),
                authors: name.to_string(),
                narrators: String::new(),
                series: String::new(),
                series_order: String::new(),
            });
        }
        index.author_variants().clone()
    }

    fn music_tree(folders: &[&str]) -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        for folder in folders {
            let dir = temp_dir.path().join(folder).join("Album");
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("track.mp3"), b"audio").unwrap();
        }
        temp_dir
    }

    #[test]
    fn test_folder_variants() {
        let variants = folder_variants("  J.R.R. Tolkien ");
        assert_eq!(variants[0], "J.R.R. Tolkien");
        assert_eq!(variants[1], "j.r.r. tolkien");
        assert_eq!(variants[2], "JRR Tolkien");
        assert_eq!(variants[3], "J.R.R. Tolkien");
        assert_eq!(variants[4], "jrr tolkien");
    }

    #[test]
    fn test_matches_variants() {
        let set = authors(&["Jane Doe", "J.R.R. Tolkien", "Doe, John"]);
        let engine = PruneEngine::new(&set);

        assert!(engine.matches("Jane Doe"));
        assert!(engine.matches("jane doe"));
        assert!(engine.matches("JRR Tolkien"));
        assert!(engine.matches("j.r.r. tolkien"));
        assert!(engine.matches("Doe"));
        assert!(!engine.matches("Jane Doeson"));
        assert!(!engine.matches("JANE DOE SR"));
    }

    #[test]
    fn test_dry_run_deletes_nothing_and_is_repeatable() {
        let tree = music_tree(&["Jane Doe", "jane doe", "Jane Doeson", "Queen"]);
        fs::write(tree.path().join("Jane Doe.txt"), b"not a dir").unwrap();
        let set = authors(&["Jane Doe"]);
        let engine = PruneEngine::new(&set);

        let first = engine.dry_run(tree.path()).unwrap();
        let second = engine.dry_run(tree.path()).unwrap();

        assert!(first.dry_run);
        assert_eq!(first.removed, second.removed);
        assert_eq!(
            first.removed,
            vec![tree.path().join("Jane Doe"), tree.path().join("jane doe")]
        );
        assert!(tree.path().join("Jane Doe").exists());
        assert!(tree.path().join("jane doe").exists());
    }

    #[test]
    fn test_execute_removes_matches_only() {
        let tree = music_tree(&["Jane Doe", "jane doe", "Jane Doeson", "Queen"]);
        let set = authors(&["Jane Doe"]);
        let engine = PruneEngine::new(&set);

        let report = engine.execute(tree.path()).unwrap();

        assert!(!report.dry_run);
        assert_eq!(report.removed_count(), 2);
        assert_eq!(report.skipped_count(), 0);
        assert!(!tree.path().join("Jane Doe").exists());
        assert!(!tree.path().join("jane doe").exists());
        assert!(tree.path().join("Jane Doeson").exists());
        assert!(tree.path().join("Queen").exists());

        // Nothing left to do on a second pass
        assert_eq!(engine.execute(tree.path()).unwrap().removed_count(), 0);
    }

    #[test]
    fn test_protected_directory_is_kept() {
        let tree = music_tree(&["Audiobooks", "Jane Doe"]);
        let set = authors(&["Audiobooks", "Jane Doe"]);
        let engine = PruneEngine::new(&set).protect(tree.path().join("Audiobooks"));

        let report = engine.execute(tree.path()).unwrap();
        assert_eq!(report.removed, vec![tree.path().join("Jane Doe")]);
        assert!(tree.path().join("Audiobooks").exists());
    }

    #[test]
    fn test_scan_missing_root_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let set = authors(&["Jane Doe"]);
        let err = PruneEngine::new(&set)
            .scan(&temp_dir.path().join("absent"))
            .unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_check_disjoint() {
        let media = Path::new("/media");
        assert!(check_disjoint(&media.join("Music"), &media.join("Audiobooks")).is_ok());
        assert!(check_disjoint(&media.join("Audiobooks"), &media.join("Audiobooks")).is_err());
        let nested = media.join("Audiobooks/Music");
        assert!(check_disjoint(&nested, &media.join("Audiobooks")).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_deletion_failure_is_contained() {
        use std::os::unix::fs::PermissionsExt;

        let tree = music_tree(&["Jane Doe", "John Roe"]);
        let set = authors(&["Jane Doe", "John Roe"]);
        let locked = tree.path().join("Jane Doe");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

        // Root ignores permission bits, so only assert when the lock holds
        let marker = locked.join("marker");
        let lock_effective = fs::write(&marker, b"x").is_err();
        let _ = fs::remove_file(&marker);

        let report = PruneEngine::new(&set).execute(tree.path()).unwrap();

        assert!(!tree.path().join("John Roe").exists());
        if lock_effective {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            assert_eq!(report.skipped_count(), 1);
            assert_eq!(report.skipped[0].path, locked);
            assert_eq!(report.removed, vec![tree.path().join("John Roe")]);
        } else {
            assert_eq!(report.skipped_count(), 0);
            assert!(!locked.exists());
        }
    }
}
