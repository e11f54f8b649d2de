//! Catalog index
//!
//! Loads the exported library catalog (CSV with `Title`, `Authors`,
//! `Narrators`, `Series Names` and `Series Order` columns) into a lookup
//! keyed by normalized title, plus the set of author name variants used by
//! the prune engine.

use crate::core::error::{ReconcileError, Result};
use crate::core::normalizer::normalize;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

pub const COLUMN_TITLE: &str = "Title";
pub const COLUMN_AUTHORS: &str = "Authors";
pub const COLUMN_NARRATORS: &str = "Narrators";
pub const COLUMN_SERIES: &str = "Series Names";
pub const COLUMN_SERIES_ORDER: &str = "Series Order";

/// One row of the catalog, exactly as exported
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CatalogRecord {
    pub title: String,
    pub authors: String,
    pub narrators: String,
    pub series: String,
    pub series_order: String,
}

/// Author names and their spelling variants
pub type AuthorVariantSet = HashSet<String>;

/// Normalized-title index over the catalog
#[derive(Debug, Default)]
pub struct CatalogIndex {
    keys: HashMap<String, usize>,
    entries: Vec<(String, CatalogRecord)>,
    author_variants: AuthorVariantSet,
}

struct ColumnIndices {
    title: usize,
    authors: usize,
    narrators: usize,
    series: usize,
    series_order: usize,
}

impl CatalogIndex {
    /// Load the catalog from a CSV file
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            ReconcileError::CatalogLoad(format!("cannot open {}: {}", path.display(), e))
        })?;
        let index = Self::from_reader(file)?;
        info!(
            path = ?path,
            books = index.len(),
            author_variants = index.author_variants.len(),
            "Catalog loaded"
        );
        Ok(index)
    }

    /// Load the catalog from any CSV source
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| ReconcileError::CatalogLoad(format!("cannot read header: {}", e)))?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_string())
            .collect();

        let idx = |name: &str| -> Result<usize> {
            headers.iter().position(|h| h == name).ok_or_else(|| {
                ReconcileError::CatalogLoad(format!("missing required column '{}'", name))
            })
        };

        let columns = ColumnIndices {
            title: idx(COLUMN_TITLE)?,
            authors: idx(COLUMN_AUTHORS)?,
            narrators: idx(COLUMN_NARRATORS)?,
            series: idx(COLUMN_SERIES)?,
            series_order: idx(COLUMN_SERIES_ORDER)?,
        };

        let mut index = CatalogIndex::default();

        for (row, record) in reader.records().enumerate() {
            // Header is line 1
            let line = row + 2;
            let record = record.map_err(|e| {
                ReconcileError::CatalogLoad(format!("cannot read row {}: {}", line, e))
            })?;

            let field = |i: usize, name: &str| -> Result<String> {
                record.get(i).map(str::to_string).ok_or_else(|| {
                    ReconcileError::CatalogLoad(format!("row {} has no '{}' field", line, name))
                })
            };

            let entry = CatalogRecord {
                title: field(columns.title, COLUMN_TITLE)?,
                authors: field(columns.authors, COLUMN_AUTHORS)?,
                narrators: field(columns.narrators, COLUMN_NARRATORS)?,
                series: field(columns.series, COLUMN_SERIES)?,
                series_order: field(columns.series_order, COLUMN_SERIES_ORDER)?,
            };

            index.insert(entry);
        }

        Ok(index)
    }

    /// Add a record, replacing any earlier record with the same normalized title
    pub fn insert(&mut self, record: CatalogRecord) {
        self.add_author_variants(&record.authors);

        let key = normalize(&record.title);
        match self.keys.get(&key) {
            Some(&slot) => {
                debug!(key = %key, title = %record.title, "Catalog title overrides earlier row");
                self.entries[slot].1 = record;
            }
            None => {
                self.keys.insert(key.clone(), self.entries.len());
                self.entries.push((key, record));
            }
        }
    }

    fn add_author_variants(&mut self, authors: &str) {
        for name in authors.split(',') {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            self.author_variants.insert(name.to_string());
            self.author_variants.insert(name.to_lowercase());
            self.author_variants.insert(name.replace('.', ""));
            self.author_variants.insert(name.replace(',', ""));
        }
    }

    /// Look up a record by its normalized title
    pub fn get(&self, normalized_title: &str) -> Option<&CatalogRecord> {
        self.keys
            .get(normalized_title)
            .map(|&slot| &self.entries[slot].1)
    }

    /// Records in index order (first insertion order of each key)
    pub fn records(&self) -> impl Iterator<Item = &CatalogRecord> {
        self.entries.iter().map(|(_, record)| record)
    }

    pub fn author_variants(&self) -> &AuthorVariantSet {
        &self.author_variants
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
