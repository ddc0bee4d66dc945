//! Error types for the photo renamer

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for photo renamer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the photo renamer
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read EXIF data from {path}: {message}")]
    ExifRead { path: PathBuf, message: String },

    #[error("Failed to write EXIF data to {path}: {message}")]
    ExifWrite { path: PathBuf, message: String },

    #[error("Failed to extract video metadata from {path}: {message}")]
    VideoMetadata { path: PathBuf, message: String },

    #[error("File hash computation failed for {path}: {message}")]
    HashComputation { path: PathBuf, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("FFprobe not found. Please install FFmpeg and ensure ffprobe is in PATH")]
    FfprobeNotFound,

    #[error("ExifTool not found. Please install exiftool and ensure it is in PATH")]
    ExifToolNotFound,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Directory traversal error: {0}")]
    WalkDir(#[from] walkdir::Error),
}
