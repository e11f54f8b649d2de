//! Destination planning for organized audiobooks
//!
//! Files land at `<audiobooks root>/<author>/<title>/<file name>`. Author and
//! title are used exactly as given, never normalized. Existing files are never
//! overwritten; a numeric `_N` suffix is added before the extension instead.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Plans destinations under an audiobooks root and copies files there
#[derive(Debug, Clone)]
pub struct PathPlanner {
    root: PathBuf,
}

impl PathPlanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory a book's files belong in
    pub fn book_dir(&self, author: &str, title: &str) -> PathBuf {
        self.root.join(author).join(title)
    }

    /// Create the book directory and pick an unused file name inside it
    pub fn plan(&self, author: &str, title: &str, original_filename: &Path) -> io::Result<PathBuf> {
        let book_dir = self.book_dir(author, title);
        fs::create_dir_all(&book_dir)?;
        Ok(unique_destination(&book_dir, original_filename))
    }

    /// Copy `source` into the planned location, returning the destination
    ///
    /// The source file is left in place.
    pub fn place(&self, source: &Path, author: &str, title: &str) -> io::Result<PathBuf> {
        let file_name = source.file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} has no file name", source.display()),
            )
        })?;

        let destination = self.plan(author, title, Path::new(file_name))?;
        copy_preserving(source, &destination)?;
        debug!(source = ?source, destination = ?destination, "Copied audiobook file");
        Ok(destination)
    }
}

/// First free name for `file_name` in `dir`: the name itself, then `stem_1.ext`, `stem_2.ext`, ...
pub fn unique_destination(dir: &Path, file_name: &Path) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let stem = file_name
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_default();
    let extension = file_name.extension();

    let mut counter: u64 = 1;
    loop {
        let mut name = OsString::from(&stem);
        name.push(format!("_{}", counter));
        if let Some(ext) = extension {
            name.push(".");
            name.push(ext);
        }

        let candidate = dir.join(&name);
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Copy file contents and permissions, then carry over the modification time
fn copy_preserving(source: &Path, destination: &Path) -> io::Result<()> {
    fs::copy(source, destination)?;

    let modified = fs::metadata(source)?.modified();
    if let Ok(modified) = modified {
        let file = fs::OpenOptions::new().write(true).open(destination)?;
        file.set_modified(modified)?;
    }

    Ok(())
}
