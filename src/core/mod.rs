//! Core reconciliation logic
//!
//! This module provides:
//! - Text normalization for title and author comparison
//! - Catalog loading and title lookup
//! - Path-to-catalog matching
//! - ID3 tag fusion that keeps chapter frames
//! - Destination planning and copying
//! - Library traversal and pruning of the music tree
//! - Configuration, logging, error handling and confirmation prompts

pub mod config;
pub mod logging;
pub mod error;
pub mod normalizer;
pub mod catalog;
pub mod matcher;
pub mod tag_fusion;
pub mod path_planner;
pub mod library_walker;
pub mod prune;
pub mod prompt;

pub use config::Config;
pub use logging::Logger;
pub use error::{ReconcileError, Result, ErrorContext, SkipReason};
pub use catalog::{AuthorVariantSet, CatalogIndex, CatalogRecord};
pub use matcher::{CatalogMatch, MatchResolver, MatchStrategy};
pub use tag_fusion::ResolvedMetadata;
pub use path_planner::PathPlanner;
pub use library_walker::{LibraryWalker, MetadataSource, RunReport};
pub use prune::{PruneEngine, PruneReport};
pub use prompt::{AssumeYes, Confirmation, Prompter, StdinPrompter};
