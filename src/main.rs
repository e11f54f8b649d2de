//! audioshelf command-line entry point
//!
//! Moves audiobooks out of a music library into an author/title tree and
//! cleans the leftovers out of the music folder.

use audioshelf::core::catalog::CatalogIndex;
use audioshelf::core::config::{CliArgs, Command, Config, OrganizeArgs, PruneArgs, RetagArgs};
use audioshelf::core::library_walker::{LibraryWalker, MetadataSource, RunReport};
use audioshelf::core::path_planner::PathPlanner;
use audioshelf::core::prompt::{AssumeYes, Prompter, StdinPrompter};
use audioshelf::core::prune::{check_disjoint, PruneEngine, PruneReport};
use audioshelf::core::Logger;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use tracing::info;

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    // Load configuration (CLI args, env vars, config file)
    let config = match Config::load(&cli_args) {
        Ok(cfg) => cfg,
        Err(e) => {
            // Print error to stderr since logging isn't initialized yet
            eprintln!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let _logger = match Logger::init(&config.logging) {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return Err(e);
        }
    };

    info!(version = audioshelf::VERSION, "Starting audioshelf");
    info!(
        media_root = ?config.library.media_root,
        catalog = ?config.catalog.path,
        "Library configuration"
    );

    match &cli_args.command {
        Command::Organize(args) => organize(&config, args),
        Command::Retag(args) => retag(&config, args),
        Command::Prune(args) => prune(&config, args),
    }
}

/// Copy catalog-matched files from the music tree into the audiobooks tree
fn organize(config: &Config, args: &OrganizeArgs) -> Result<()> {
    let catalog = load_catalog(&config.catalog.path)?;
    if !args.json {
        println!("Loaded {} audiobooks from catalog", catalog.len());
    }
    let source_root = args
        .source
        .clone()
        .unwrap_or_else(|| config.library.music_root());

    run_walker(
        config,
        MetadataSource::Catalog(&catalog),
        &source_root,
        args.yes,
        args.json,
    )
}

/// Copy files using the tags they already carry
fn retag(config: &Config, args: &RetagArgs) -> Result<()> {
    let source_root = args
        .source
        .clone()
        .unwrap_or_else(|| config.library.source_root.clone());

    run_walker(
        config,
        MetadataSource::EmbeddedTags,
        &source_root,
        args.yes,
        args.json,
    )
}

fn run_walker(
    config: &Config,
    source: MetadataSource<'_>,
    source_root: &Path,
    assume_yes: bool,
    json: bool,
) -> Result<()> {
    let audiobooks_root = config.library.audiobooks_root();

    if !json {
        println!("Source folder: {}", source_root.display());
        println!("Audiobooks will be organized in: {}", audiobooks_root.display());
    }

    if !confirm(assume_yes, "Proceed with processing?")? {
        eprintln!("Operation cancelled.");
        return Ok(());
    }

    let walker = LibraryWalker::new(
        PathPlanner::new(audiobooks_root.clone()),
        source,
        config.library.audio_extension.clone(),
    );
    let report = walker
        .run(source_root)
        .with_context(|| format!("Failed to organize {}", source_root.display()))?;

    info!(
        processed = report.processed_count(),
        skipped = report.skipped_count(),
        authors = report.author_count(),
        "Run finished"
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_run_summary(&report, &audiobooks_root);
    }
    Ok(())
}

/// Remove music folders named after catalog authors, after a dry run
fn prune(config: &Config, _args: &PruneArgs) -> Result<()> {
    let music_root = config.library.music_root();
    let audiobooks_root = config.library.audiobooks_root();

    println!("Media path: {}", config.library.media_root.display());
    println!("Music path: {}", music_root.display());
    println!("Audiobooks path: {} (will be preserved)", audiobooks_root.display());

    if !music_root.is_dir() {
        anyhow::bail!("Music path does not exist: {}", music_root.display());
    }
    check_disjoint(&music_root, &audiobooks_root)?;

    let catalog = load_catalog(&config.catalog.path)?;
    println!(
        "Loaded {} audiobooks ({} author name variants) from {}",
        catalog.len(),
        catalog.author_variants().len(),
        config.catalog.path.display()
    );

    let engine = PruneEngine::new(catalog.author_variants()).protect(audiobooks_root);

    println!("\nScanning music library...");
    if engine.scan(&music_root)?.is_empty() {
        println!("No matching folders found to remove.");
        return Ok(());
    }

    println!("\nPerforming dry run...");
    let preview = engine.dry_run(&music_root)?;
    print_prune_summary(&preview);

    if !confirm(false, "\nWould you like to proceed with actual removal?")? {
        println!("\nOperation cancelled.");
        return Ok(());
    }

    println!("\nPerforming actual removal...");
    let report = engine.execute(&music_root)?;
    info!(
        removed = report.removed_count(),
        skipped = report.skipped_count(),
        "Prune finished"
    );
    print_prune_summary(&report);
    println!("\nCleaning complete!");

    Ok(())
}

fn load_catalog(path: &Path) -> Result<CatalogIndex> {
    CatalogIndex::load(path).with_context(|| format!("Cannot load catalog {}", path.display()))
}

fn confirm(assume_yes: bool, question: &str) -> Result<bool> {
    let answer = if assume_yes {
        AssumeYes.confirm(question)?
    } else {
        StdinPrompter::stdin().confirm(question)?
    };
    Ok(answer.is_accepted())
}

fn print_run_summary(report: &RunReport, audiobooks_root: &Path) {
    println!("\nProcessing Summary:");
    println!("Total files processed: {}", report.processed_count());
    println!("Total files skipped: {}", report.skipped_count());
    println!("Total authors processed: {}", report.author_count());

    if !report.authors.is_empty() {
        println!("\nProcessed authors:");
        for author in &report.authors {
            println!("- {}", author);
        }
    }

    if !report.skipped.is_empty() {
        println!("\nSkipped files:");
        for skipped in &report.skipped {
            println!("- {} {}", skipped.path.display(), skipped.reason);
        }
    }

    println!("\nNext steps:");
    println!("For Apple Books:");
    println!("1. Open Books app");
    println!("2. File > Add to Library");
    println!("3. Navigate to: {}", audiobooks_root.display());
    println!("4. Select the audiobook files to import");

    println!("\nFor iPod Classic:");
    println!("1. Use iTunes 12.7 or earlier");
    println!("2. File > Add to Library");
    println!("3. Navigate to: {}", audiobooks_root.display());
    println!("4. Connect iPod Classic and open its Audiobooks tab");
    println!("5. Select books to sync");
}

fn print_prune_summary(report: &PruneReport) {
    println!("\nOperation Summary:");
    if report.dry_run {
        println!("DRY RUN - No files were actually removed");
    }
    println!("Total folders marked for removal: {}", report.removed_count());
    println!("Total folders skipped: {}", report.skipped_count());

    if !report.removed.is_empty() {
        println!("\nFolders marked for removal:");
        for folder in &report.removed {
            println!("- {}", display_name(folder));
        }
    }

    if !report.skipped.is_empty() {
        println!("\nFolders skipped due to errors:");
        for skipped in &report.skipped {
            println!("- {} {}", display_name(&skipped.path), skipped.reason);
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
