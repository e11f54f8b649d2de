//! Configuration management

use clap::{Args, Parser, Subcommand};
use config::{Config as ConfigBuilder, ConfigError as BuilderError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid library configuration: {0}")]
    InvalidLibrary(String),

    #[error("Invalid catalog configuration: {0}")]
    InvalidCatalog(String),

    #[error("Invalid logging configuration: {0}")]
    InvalidLogging(String),

    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),
}

impl From<BuilderError> for ConfigError {
    fn from(err: BuilderError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// Sub-directory of the media root holding organized audiobooks
pub const AUDIOBOOKS_DIR: &str = "Audiobooks";
/// Sub-directory of the media root holding the music library
pub const MUSIC_DIR: &str = "Music";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub library: LibraryConfig,
    pub catalog: CatalogConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration with precedence:
    /// CLI args > Environment variables > Config file > Defaults
    pub fn load(cli_args: &CliArgs) -> Result<Self, ConfigError> {
        let mut builder = with_defaults(ConfigBuilder::builder())?;

        if let Some(config_path) = &cli_args.config {
            if !config_path.exists() {
                return Err(ConfigError::FileNotFound(
                    config_path.display().to_string()
                ));
            }
            builder = builder.add_source(File::from(config_path.as_path()));
        }

        // Environment variables are prefixed with AUDIOSHELF_ and use __ for nesting
        // Example: AUDIOSHELF_LIBRARY__MEDIA_ROOT=/Volumes/Media
        builder = builder.add_source(
            Environment::with_prefix("AUDIOSHELF")
                .separator("__")
                .try_parsing(true)
        );

        if let Some(media_root) = &cli_args.media_root {
            builder = builder.set_override("library.media_root", media_root.display().to_string())?;
        }
        if let Some(log_level) = &cli_args.log_level {
            builder = builder.set_override("logging.level", log_level.clone())?;
        }
        match &cli_args.command {
            Command::Organize(args) => {
                if let Some(catalog) = &args.catalog {
                    builder = builder.set_override("catalog.path", catalog.display().to_string())?;
                }
            }
            Command::Prune(args) => {
                if let Some(catalog) = &args.catalog {
                    builder = builder.set_override("catalog.path", catalog.display().to_string())?;
                }
            }
            Command::Retag(_) => {}
        }

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file path on top of the defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let config: Config = with_defaults(ConfigBuilder::builder())?
            .add_source(File::from(path))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.library.validate()?;
        self.catalog.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

fn with_defaults(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    let media_root = home.join("Music").join("Music").join("Media.localized");
    let source_root = home.join("Libation");

    Ok(builder
        .set_default("library.media_root", media_root.display().to_string())?
        .set_default("library.source_root", source_root.display().to_string())?
        .set_default("library.audio_extension", "mp3")?
        .set_default("catalog.path", "liberation-library.csv")?
        .set_default("logging.level", "info")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "stderr")?
        .set_default("logging.max_file_size", 10485760)? // 10 MB
        .set_default("logging.max_backups", 5)?)
}

/// Command-line arguments
#[derive(Debug, Parser)]
#[command(name = "audioshelf")]
#[command(about = "Organize audiobooks out of a music library", long_about = None)]
#[command(version)]
pub struct CliArgs {
    /// Path to configuration file (TOML format)
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Media root containing the Music and Audiobooks folders
    #[arg(short, long, value_name = "DIR", global = true)]
    pub media_root: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Match files against the catalog, copy them into the audiobooks tree and retag them
    Organize(OrganizeArgs),
    /// Copy files into the audiobooks tree using the tags they already carry
    Retag(RetagArgs),
    /// Delete music folders named after catalog authors
    Prune(PruneArgs),
}

#[derive(Debug, Args)]
pub struct OrganizeArgs {
    /// Catalog CSV exported from the audiobook library
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// Directory to scan (defaults to the music folder of the media root)
    #[arg(short, long, value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct RetagArgs {
    /// Directory to scan (defaults to library.source_root)
    #[arg(short, long, value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct PruneArgs {
    /// Catalog CSV exported from the audiobook library
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LibraryConfig {
    pub media_root: PathBuf,
    pub source_root: PathBuf,
    pub audio_extension: String,
}

impl LibraryConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.media_root.as_os_str().is_empty() {
            return Err(ConfigError::InvalidLibrary("media_root cannot be empty".to_string()));
        }

        if self.source_root.as_os_str().is_empty() {
            return Err(ConfigError::InvalidLibrary("source_root cannot be empty".to_string()));
        }

        if self.audio_extension.is_empty() || self.audio_extension.contains('.') {
            return Err(ConfigError::InvalidLibrary(
                "audio_extension must be a bare extension such as 'mp3'".to_string()
            ));
        }

        Ok(())
    }

    pub fn audiobooks_root(&self) -> PathBuf {
        self.media_root.join(AUDIOBOOKS_DIR)
    }

    pub fn music_root(&self) -> PathBuf {
        self.media_root.join(MUSIC_DIR)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    pub path: PathBuf,
}

impl CatalogConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidCatalog("path cannot be empty".to_string()));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub output: String,
    pub log_file: Option<PathBuf>,
    pub max_file_size: usize, // bytes
    pub max_backups: usize,
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_levels = ["debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.level.as_str()) {
            return Err(ConfigError::InvalidLogging(
                format!("level must be one of: {:?}", valid_levels)
            ));
        }

        let valid_formats = ["json", "text"];
        if !valid_formats.contains(&self.format.as_str()) {
            return Err(ConfigError::InvalidLogging(
                format!("format must be one of: {:?}", valid_formats)
            ));
        }

        let valid_outputs = ["stderr", "stdout", "file"];
        if !valid_outputs.contains(&self.output.as_str()) {
            return Err(ConfigError::InvalidLogging(
                format!("output must be one of: {:?}", valid_outputs)
            ));
        }

        if self.output == "file" && self.log_file.is_none() {
            return Err(ConfigError::InvalidLogging(
                "log_file must be specified when output is 'file'".to_string()
            ));
        }

        if self.max_file_size == 0 {
            return Err(ConfigError::InvalidLogging(
                "max_file_size must be greater than 0".to_string(),
            ));
        }

        if self.max_backups == 0 {
            return Err(ConfigError::InvalidLogging(
                "max_backups must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
