use std::fs;
use std::path::{Path, PathBuf};

use audioshelf::core::catalog::CatalogIndex;
use audioshelf::core::library_walker::{LibraryWalker, MetadataSource};
use audioshelf::core::matcher::MatchStrategy;
use audioshelf::core::path_planner::PathPlanner;
use audioshelf::core::prune::{check_disjoint, PruneEngine};
use id3::{Tag, TagLike};
use tempfile::TempDir;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_catalog() -> CatalogIndex {
    CatalogIndex::load(&fixtures_dir().join("library.csv")).unwrap()
}

fn write_file(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, b"audio").unwrap();
}

/// media/{Music,Audiobooks} laid out the way the organizer expects
struct MediaTree {
    _dir: TempDir,
    music: PathBuf,
    audiobooks: PathBuf,
}

fn media_tree() -> MediaTree {
    let dir = TempDir::new().unwrap();
    let music = dir.path().join("Music");
    let audiobooks = dir.path().join("Audiobooks");
    fs::create_dir_all(&music).unwrap();
    MediaTree {
        _dir: dir,
        music,
        audiobooks,
    }
}

#[test]
fn organize_copies_and_tags_catalog_matches() {
    let tree = media_tree();
    let catalog = load_catalog();
    assert_eq!(catalog.len(), 3);

    write_file(&tree.music.join("J.R.R. Tolkien/The Hobbit/01 - The Hobbit.mp3"));
    write_file(&tree.music.join("Unknown/Leviathan Wakes.mp3"));
    write_file(&tree.music.join("Queen/A Night at the Opera/Bohemian Rhapsody.mp3"));

    let walker = LibraryWalker::new(
        PathPlanner::new(&tree.audiobooks),
        MetadataSource::Catalog(&catalog),
        "mp3",
    );
    let report = walker.run(&tree.music).unwrap();

    assert_eq!(report.processed_count(), 2);
    assert_eq!(report.skipped_count(), 1);
    assert!(report.skipped[0].path.ends_with("Bohemian Rhapsody.mp3"));

    let authors: Vec<&str> = report.authors.iter().map(String::as_str).collect();
    assert_eq!(authors, vec!["J.R.R. Tolkien", "James S. A. Corey"]);

    let hobbit = tree
        .audiobooks
        .join("J.R.R. Tolkien/The Hobbit/01 - The Hobbit.mp3");
    let tag = Tag::read_from_path(&hobbit).unwrap();
    assert_eq!(tag.title(), Some("The Hobbit"));
    assert_eq!(tag.artist(), Some("J.R.R. Tolkien"));
    assert_eq!(tag.album(), Some("The Hobbit"));
    assert_eq!(tag.genre(), Some("Audiobook"));

    // Title-only match still files the book under the catalog author
    let leviathan = report
        .processed
        .iter()
        .find(|p| p.title == "Leviathan Wakes")
        .unwrap();
    assert_eq!(leviathan.strategy, Some(MatchStrategy::TitleOnly));
    let tag = Tag::read_from_path(&leviathan.destination).unwrap();
    assert_eq!(tag.album(), Some("The Expanse - Leviathan Wakes"));
    assert_eq!(tag.album_artist(), Some("Jefferson Mays"));

    // Sources are copied, never moved
    assert!(tree
        .music
        .join("J.R.R. Tolkien/The Hobbit/01 - The Hobbit.mp3")
        .exists());
}

#[test]
fn organize_twice_keeps_both_copies() {
    let tree = media_tree();
    let catalog = load_catalog();
    write_file(&tree.music.join("J.R.R. Tolkien/01 - The Hobbit.mp3"));

    let walker = LibraryWalker::new(
        PathPlanner::new(&tree.audiobooks),
        MetadataSource::Catalog(&catalog),
        "mp3",
    );
    walker.run(&tree.music).unwrap();
    walker.run(&tree.music).unwrap();

    let book_dir = tree.audiobooks.join("J.R.R. Tolkien/The Hobbit");
    assert!(book_dir.join("01 - The Hobbit.mp3").exists());
    assert!(book_dir.join("01 - The Hobbit_1.mp3").exists());
}

#[test]
fn prune_after_organize_keeps_audiobooks() {
    let tree = media_tree();
    let catalog = load_catalog();
    write_file(&tree.music.join("Jane Doe/Persuasion/Persuasion.mp3"));
    write_file(&tree.music.join("jane doe/Persuasion.mp3"));
    write_file(&tree.music.join("Jane Doeson/Other/Song.mp3"));

    let walker = LibraryWalker::new(
        PathPlanner::new(&tree.audiobooks),
        MetadataSource::Catalog(&catalog),
        "mp3",
    );
    let organized = walker.run(&tree.music).unwrap();
    assert_eq!(organized.processed_count(), 2);

    check_disjoint(&tree.music, &tree.audiobooks).unwrap();
    let engine = PruneEngine::new(catalog.author_variants()).protect(&tree.audiobooks);

    let preview = engine.dry_run(&tree.music).unwrap();
    assert_eq!(preview.removed_count(), 2);
    assert!(tree.music.join("Jane Doe").exists());

    let report = engine.execute(&tree.music).unwrap();
    assert_eq!(
        report.removed,
        vec![tree.music.join("Jane Doe"), tree.music.join("jane doe")]
    );
    assert!(tree.music.join("Jane Doeson").exists());
    assert!(tree
        .audiobooks
        .join("Jane Doe/Persuasion/Persuasion.mp3")
        .exists());
}
