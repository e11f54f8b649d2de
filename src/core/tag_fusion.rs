//! ID3 tag fusion
//!
//! Rewrites an audiobook's tag from resolved metadata. The rewrite is a full
//! replacement: chapter (`CHAP`) and table-of-contents (`CTOC`) frames are
//! carried over verbatim, every other existing frame is dropped.

use crate::core::catalog::CatalogRecord;
use crate::core::error::{ReconcileError, Result};
use id3::{Tag, TagLike, Version};
use std::path::Path;
use tracing::{debug, warn};

pub const CHAPTER_PREFIX: &str = "CHAP";
pub const TOC_PREFIX: &str = "CTOC";

pub const AUDIOBOOK_GENRE: &str = "Audiobook";
pub const AUDIOBOOK_MEDIA_TYPE: &str = "Audiobook";

pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

const FRAME_MEDIA_TYPE: &str = "TMED";
const FRAME_COMPILATION: &str = "TCMP";
const FRAME_COMPOSER: &str = "TCOM";

/// Metadata to be written into a file's tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMetadata {
    pub title: String,
    pub author: String,
    pub album: String,
    pub narrator: Option<String>,
    /// Name of the book directory under the author directory
    pub book_folder: String,
}

impl ResolvedMetadata {
    /// Metadata from a matched catalog record
    ///
    /// The album is `"{series} - {title}"` for books that belong to a series,
    /// otherwise the title.
    pub fn from_record(record: &CatalogRecord) -> Self {
        let album = if record.series.is_empty() {
            record.title.clone()
        } else {
            format!("{} - {}", record.series, record.title)
        };

        Self {
            title: record.title.clone(),
            author: record.authors.clone(),
            album,
            narrator: non_empty(&record.narrators),
            book_folder: record.title.clone(),
        }
    }

    /// Metadata from the file's own tag, with defaults for missing frames
    ///
    /// A missing album falls back to the title in the written tag, but the
    /// book is filed under `Unknown Album`.
    pub fn from_tag(tag: Option<&Tag>) -> Self {
        let title = tag
            .and_then(|t| t.title())
            .unwrap_or(UNKNOWN_TITLE)
            .to_string();
        let author = tag
            .and_then(|t| t.artist())
            .unwrap_or(UNKNOWN_ARTIST)
            .to_string();
        let tagged_album = tag.and_then(|t| t.album());

        Self {
            album: tagged_album.map(str::to_string).unwrap_or_else(|| title.clone()),
            book_folder: tagged_album.unwrap_or(UNKNOWN_ALBUM).to_string(),
            title,
            author,
            narrator: None,
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Whether a frame carries chapter data that must survive a rewrite
pub fn is_chapter_frame(id: &str) -> bool {
    id.starts_with(CHAPTER_PREFIX) || id.starts_with(TOC_PREFIX)
}

/// Build the replacement tag for a file
pub fn fuse(existing: Option<&Tag>, metadata: &ResolvedMetadata) -> Tag {
    let mut tag = Tag::new();

    if let Some(existing) = existing {
        for frame in existing.frames().filter(|f| is_chapter_frame(f.id())) {
            tag.add_frame(frame.clone());
        }
    }

    tag.set_title(metadata.title.as_str());
    tag.set_artist(metadata.author.as_str());
    tag.set_album(metadata.album.as_str());
    tag.set_genre(AUDIOBOOK_GENRE);
    tag.set_text(FRAME_MEDIA_TYPE, AUDIOBOOK_MEDIA_TYPE);
    tag.set_text(FRAME_COMPILATION, "1");

    if let Some(narrator) = &metadata.narrator {
        tag.set_album_artist(narrator.as_str());
        tag.set_text(FRAME_COMPOSER, narrator.as_str());
    }

    tag
}

/// Read the ID3 tag of a file
///
/// A file without a tag, or with a tag that cannot be decoded, yields
/// `Ok(None)`. Only failing to access the file is an error.
pub fn read_tag(path: &Path) -> Result<Option<Tag>> {
    match Tag::read_from_path(path) {
        Ok(tag) => Ok(Some(tag)),
        Err(e) => match e.kind {
            id3::ErrorKind::NoTag => {
                debug!(path = ?path, "File has no ID3 tag");
                Ok(None)
            }
            id3::ErrorKind::Io(_) => Err(ReconcileError::Tag(e)),
            _ => {
                warn!(path = ?path, error = %e, "Unreadable ID3 tag, starting from an empty tag");
                Ok(None)
            }
        },
    }
}

/// Replace the file's tag with `tag`
pub fn write_tag(path: &Path, tag: &Tag) -> Result<()> {
    tag.write_to_path(path, Version::Id3v24)?;
    Ok(())
}

/// Fuse `existing` with `metadata` and write the result to `path`
pub fn fuse_file(path: &Path, existing: Option<&Tag>, metadata: &ResolvedMetadata) -> Result<Tag> {
    let tag = fuse(existing, metadata);
    write_tag(path, &tag)?;
    debug!(
        path = ?path,
        preserved = tag.frames().filter(|f| is_chapter_frame(f.id())).count(),
        "Tag fused"
    );
    Ok(tag)
}
