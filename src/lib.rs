//! Photo Renamer - chronological, checksum-qualified names for photos and videos
//!
//! This library renames media files inside a directory tree to
//! `YYYYMMDD_HHMMSS_CRC32C.ext` with support for:
//! - EXIF `DateTimeOriginal` for images, FFprobe `creation_time` for videos
//! - Filesystem time fallback
//! - Interactive per-directory date correction against an expected year
//! - RAW sidecars following their renamed JPEG
//! - Dry runs that log exactly what a live run would do

pub mod cli;
pub mod config;
pub mod correction;
pub mod error;
pub mod hash;
pub mod logging;
pub mod media;
pub mod rename;
pub mod sort;
pub mod time;
pub mod walk;

#[cfg(test)]
mod testing;

pub use cli::Cli;
pub use config::{Config, ConfigError, ExtensionTable};
pub use correction::{ConsolePrompter, DirectoryCorrectionState, LinePrompter, Prompter};
pub use error::{Error, Result};
pub use media::{MediaClass, MediaFile, Timestamp};
pub use rename::{NameIndex, RenameOrchestrator, RenameStats};
pub use time::{MetadataService, SystemMetadata};
pub use walk::rename_tree;
