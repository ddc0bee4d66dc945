//! Configuration types for the photo renamer

use crate::media::MediaClass;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Extension classification table
///
/// Extensions are stored lower-case without the leading dot. Lookups are
/// case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensionTable {
    /// Image extensions (EXIF `DateTimeOriginal` is read)
    pub image: Vec<String>,

    /// Video extensions (container `CreateDate` is read)
    pub video: Vec<String>,

    /// RAW extensions, paired with their primary image in the second pass
    pub raw: Vec<String>,
}

impl Default for ExtensionTable {
    fn default() -> Self {
        Self {
            image: vec!["jpg".into(), "jpeg".into(), "png".into()],
            video: vec!["mts".into(), "mpg".into(), "mov".into(), "mp4".into()],
            raw: vec!["nef".into(), "raw".into()],
        }
    }
}

impl ExtensionTable {
    /// Classify an extension (with or without leading dot)
    pub fn classify(&self, ext: &str) -> MediaClass {
        let ext_lower = ext.trim_start_matches('.').to_lowercase();
        if self.image.iter().any(|e| e == &ext_lower) {
            MediaClass::Image
        } else if self.video.iter().any(|e| e == &ext_lower) {
            MediaClass::Video
        } else if self.raw.iter().any(|e| e == &ext_lower) {
            MediaClass::Raw
        } else {
            MediaClass::Unknown
        }
    }

    /// Check if an extension has any classification rule
    pub fn is_known(&self, ext: &str) -> bool {
        self.classify(ext) != MediaClass::Unknown
    }
}

/// Configuration for one run of the renamer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root directory to process
    pub dir: Option<PathBuf>,

    /// Descend into subdirectories
    pub recursive: bool,

    /// Suppress every filesystem and metadata mutation
    pub dry_run: bool,

    /// Explicit log file location
    pub log_file: Option<PathBuf>,

    /// Expected capture year; enables correction negotiation
    pub year: Option<i32>,

    /// Directory base names whose files are not renamed
    pub exclude: Vec<String>,

    /// Verbose output
    pub verbose: bool,

    /// Extension classification table
    pub extensions: ExtensionTable,
}

impl Config {
    /// Default log file name placed in the root directory
    pub const DEFAULT_LOG_NAME: &'static str = "rename_photos.log";

    /// Resolve the log file for this run
    ///
    /// Dry runs never write a log file. Otherwise the explicit location wins,
    /// falling back to `<dir>/rename_photos.log`.
    pub fn log_path(&self) -> Option<PathBuf> {
        if self.dry_run {
            return None;
        }
        self.log_file
            .clone()
            .or_else(|| self.dir.as_ref().map(|d| d.join(Self::DEFAULT_LOG_NAME)))
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(config)
    }
}

/// Errors that can occur when loading configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read configuration file
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse configuration file
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError { path, source } => {
                write!(f, "Failed to read config file '{}': {}", path.display(), source)
            }
            ConfigError::ParseError { path, source } => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_classify_is_case_insensitive() {
        let table = ExtensionTable::default();
        assert_eq!(table.classify("JPG"), MediaClass::Image);
        assert_eq!(table.classify(".jpeg"), MediaClass::Image);
        assert_eq!(table.classify("MOV"), MediaClass::Video);
        assert_eq!(table.classify("nef"), MediaClass::Raw);
        assert_eq!(table.classify("txt"), MediaClass::Unknown);
        assert!(!table.is_known("log"));
    }

    #[test]
    fn test_log_path() {
        let mut config = Config {
            dir: Some(PathBuf::from("/photos")),
            ..Config::default()
        };
        assert_eq!(
            config.log_path(),
            Some(PathBuf::from("/photos/rename_photos.log"))
        );

        config.log_file = Some(PathBuf::from("/tmp/run.log"));
        assert_eq!(config.log_path(), Some(PathBuf::from("/tmp/run.log")));

        config.dry_run = true;
        assert_eq!(config.log_path(), None);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
dir = "/photos"
year = 2023
exclude = ["@eaDir"]

[extensions]
image = ["jpg", "heic"]
raw = ["nef", "arw"]
"#
        )
        .unwrap();
        file.flush().unwrap();

        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(config.dir, Some(PathBuf::from("/photos")));
        assert_eq!(config.year, Some(2023));
        assert_eq!(config.exclude, vec!["@eaDir".to_string()]);
        assert_eq!(config.extensions.classify("heic"), MediaClass::Image);
        assert_eq!(config.extensions.classify("arw"), MediaClass::Raw);
        // Sections left out keep their defaults
        assert_eq!(config.extensions.classify("mp4"), MediaClass::Video);
        assert!(!config.recursive);
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = Config::load_from_file("/nonexistent/renamer.toml").unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }
}
