//! audioshelf
//!
//! Reconciles an audiobook catalog export with a music library: matches
//! audio files to catalog records, copies them into an author/title tree
//! with fused ID3 tags, and prunes music folders named after catalog
//! authors.

pub mod core;

// Re-export commonly used types
pub use crate::core::{
    CatalogIndex, Config, LibraryWalker, MetadataSource, PathPlanner, PruneEngine, ReconcileError,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
