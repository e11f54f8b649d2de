//! Catalog matching for loose audio files
//!
//! Resolution is a first-hit heuristic over the catalog in index order. It
//! does not score candidates, so when several titles are substrings of the
//! same file name the earliest record wins.

use crate::core::catalog::{CatalogIndex, CatalogRecord};
use crate::core::normalizer::normalize;
use std::path::Path;
use tracing::debug;

/// Which condition selected a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum MatchStrategy {
    /// Title in the file name and author in the parent folder name
    TitleAndAuthor,
    /// Title in the file name, author ignored
    TitleOnly,
    /// Author in the parent folder name, then title in the file name
    AuthorThenTitle,
}

/// A resolved catalog record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogMatch<'a> {
    pub record: &'a CatalogRecord,
    pub strategy: MatchStrategy,
}

/// Resolves file paths to catalog records
pub struct MatchResolver<'a> {
    catalog: &'a CatalogIndex,
}

impl<'a> MatchResolver<'a> {
    pub fn new(catalog: &'a CatalogIndex) -> Self {
        Self { catalog }
    }

    /// Find the first catalog record that satisfies one of the match conditions
    pub fn resolve(&self, path: &Path) -> Option<CatalogMatch<'a>> {
        let clean_filename = normalize(&file_name_of(path));
        let clean_parent = normalize(&path.parent().map(file_name_of).unwrap_or_default());

        let catalog: &'a CatalogIndex = self.catalog;
        for record in catalog.records() {
            let clean_title = normalize(&record.title);
            if clean_title.is_empty() {
                continue;
            }
            let clean_author = normalize(&record.authors);

            let title_hit = clean_filename.contains(&clean_title);
            let author_hit = clean_parent.contains(&clean_author);

            let strategy = if title_hit && author_hit {
                Some(MatchStrategy::TitleAndAuthor)
            } else if title_hit {
                Some(MatchStrategy::TitleOnly)
            } else if author_hit && title_hit {
                Some(MatchStrategy::AuthorThenTitle)
            } else {
                None
            };

            if let Some(strategy) = strategy {
                debug!(
                    path = ?path,
                    title = %record.title,
                    strategy = ?strategy,
                    "Matched catalog record"
                );
                return Some(CatalogMatch { record, strategy });
            }
        }

        debug!(path = ?path, "No catalog match");
        None
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, authors: &str) -> CatalogRecord {
        CatalogRecord {
            title: title.to_string(),
            authors: authors.to_string(),
            narrators: String::new(),
            series: String::new(),
            series_order: String::new(),
        }
    }

    fn catalog(records: &[(&str, &str)]) -> CatalogIndex {
        let mut index = CatalogIndex::default();
        for (title, authors) in records {
            index.insert(record(title, authors));
        }
        index
    }

    #[test]
    fn test_title_and_author_match() {
        let index = catalog(&[("The Hobbit", "J.R.R. Tolkien")]);
        let resolver = MatchResolver::new(&index);

        let hit = resolver
            .resolve(Path::new("/music/J.R.R. Tolkien/01 - The Hobbit.mp3"))
            .unwrap();
        assert_eq!(hit.record.title, "The Hobbit");
        assert_eq!(hit.strategy, MatchStrategy::TitleAndAuthor);
    }

    #[test]
    fn test_title_only_match() {
        let index = catalog(&[("The Hobbit", "J.R.R. Tolkien")]);
        let resolver = MatchResolver::new(&index);

        let hit = resolver
            .resolve(Path::new("/music/Unknown Artist/The Hobbit Part 2.mp3"))
            .unwrap();
        assert_eq!(hit.strategy, MatchStrategy::TitleOnly);
    }

    #[test]
    fn test_author_alone_does_not_match() {
        let index = catalog(&[("The Hobbit", "J.R.R. Tolkien")]);
        let resolver = MatchResolver::new(&index);

        assert!(resolver
            .resolve(Path::new("/music/J.R.R. Tolkien/Silmarillion.mp3"))
            .is_none());
    }

    #[test]
    fn test_match_ignores_case_and_punctuation() {
        let index = catalog(&[("Harry Potter & the Sorcerer's Stone", "J.K. Rowling")]);
        let resolver = MatchResolver::new(&index);

        let hit = resolver
            .resolve(Path::new("/m/jk rowling/HARRY POTTER  the Sorcerers Stone (1).MP3"))
            .unwrap();
        assert_eq!(hit.strategy, MatchStrategy::TitleAndAuthor);
    }

    #[test]
    fn test_empty_title_never_matches() {
        let index = catalog(&[("", "Jane Doe"), ("...", "Jane Doe")]);
        let resolver = MatchResolver::new(&index);

        assert!(resolver.resolve(Path::new("/m/Jane Doe/anything.mp3")).is_none());
    }

    #[test]
    fn test_first_hit_depends_on_catalog_order() {
        // Known limitation: no scoring, so the shorter title listed first wins
        // even though the longer one is a better fit.
        let index = catalog(&[("Dune", "Frank Herbert"), ("Dune Messiah", "Frank Herbert")]);
        let resolver = MatchResolver::new(&index);

        let hit = resolver
            .resolve(Path::new("/m/Frank Herbert/Dune Messiah 01.mp3"))
            .unwrap();
        assert_eq!(hit.record.title, "Dune");

        let reversed = catalog(&[("Dune Messiah", "Frank Herbert"), ("Dune", "Frank Herbert")]);
        let hit = MatchResolver::new(&reversed)
            .resolve(Path::new("/m/Frank Herbert/Dune Messiah 01.mp3"))
            .unwrap();
        assert_eq!(hit.record.title, "Dune Messiah");
    }

    #[test]
    fn test_title_only_on_earlier_record_beats_full_match_later() {
        let index = catalog(&[("Foundation", "Someone Else"), ("Foundation", "Isaac Asimov")]);
        // Same normalized title: the later row replaced the earlier one
        let resolver = MatchResolver::new(&index);
        let hit = resolver
            .resolve(Path::new("/m/Isaac Asimov/Foundation.mp3"))
            .unwrap();
        assert_eq!(hit.record.authors, "Isaac Asimov");

        let index = catalog(&[("Found", "Someone Else"), ("Foundation", "Isaac Asimov")]);
        let hit = MatchResolver::new(&index)
            .resolve(Path::new("/m/Isaac Asimov/Foundation.mp3"))
            .unwrap();
        assert_eq!(hit.record.title, "Found");
        assert_eq!(hit.strategy, MatchStrategy::TitleOnly);
    }

    #[test]
    fn test_every_returned_record_satisfies_a_condition() {
        let index = catalog(&[
            ("The Hobbit", "J.R.R. Tolkien"),
            ("Dune", "Frank Herbert"),
            ("Emma", "Jane Austen"),
        ]);
        let resolver = MatchResolver::new(&index);

        let paths = [
            "/m/Jane Austen/Persuasion.mp3",
            "/m/x/Emma 03.mp3",
            "/m/Frank Herbert/track.mp3",
            "/m/Tolkien/the-hobbit.mp3",
            "/m/a/b.mp3",
        ];

        for p in paths {
            let path = Path::new(p);
            if let Some(hit) = resolver.resolve(path) {
                let file = normalize(&file_name_of(path));
                let parent = normalize(&file_name_of(path.parent().unwrap()));
                let title = normalize(&hit.record.title);
                let author = normalize(&hit.record.authors);
                let holds = (file.contains(&title) && parent.contains(&author))
                    || file.contains(&title);
                assert!(holds, "{p} matched {:?} without a condition holding", hit.record);
            }
        }

        assert!(resolver.resolve(Path::new("/m/Jane Austen/Persuasion.mp3")).is_none());
        assert!(resolver.resolve(Path::new("/m/Frank Herbert/track.mp3")).is_none());
        assert!(resolver.resolve(Path::new("/m/x/Emma 03.mp3")).is_some());
    }
}
