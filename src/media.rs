//! Media files under consideration in one directory pass

use crate::config::ExtensionTable;
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

/// Canonical timestamp: calendar date and time of day, second precision, no timezone
pub type Timestamp = NaiveDateTime;

/// Classification of a file by its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaClass {
    /// Photo files, renamed in the first pass
    Image,
    /// Video files, renamed in the first pass
    Video,
    /// RAW siblings, paired with their primary in the second pass
    Raw,
    /// Anything else, left alone
    Unknown,
}

impl MediaClass {
    /// Image or video
    pub fn is_primary(&self) -> bool {
        matches!(self, MediaClass::Image | MediaClass::Video)
    }
}

/// One file considered for renaming
#[derive(Debug, Clone)]
pub struct MediaFile {
    /// Full path of the file before renaming
    pub path: PathBuf,
    /// File name without extension
    pub stem: String,
    /// Extension as found on disk, without the dot
    pub extension: String,
    pub class: MediaClass,
    /// Set by the resolver
    pub timestamp: Option<Timestamp>,
    /// Set by the hash namer
    pub hash: Option<String>,
}

impl MediaFile {
    /// Build a media file from a path, classifying it with `table`
    ///
    /// Returns `None` when the file name is not valid UTF-8.
    pub fn from_path(path: &Path, table: &ExtensionTable) -> Option<Self> {
        let stem = path.file_stem()?.to_str()?.to_string();
        let extension = match path.extension() {
            Some(ext) => ext.to_str()?.to_string(),
            None => String::new(),
        };
        let class = table.classify(&extension);

        Some(Self {
            path: path.to_path_buf(),
            stem,
            extension,
            class,
            timestamp: None,
            hash: None,
        })
    }

    /// File name including extension
    pub fn file_name(&self) -> String {
        if self.extension.is_empty() {
            self.stem.clone()
        } else {
            format!("{}.{}", self.stem, self.extension)
        }
    }
}
