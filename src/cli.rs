//! CLI argument parsing with clap

use crate::config::Config;
use clap::Parser;
use std::path::PathBuf;

/// Photo Renamer - rename photos and videos by capture time and checksum
///
/// Files are renamed to `YYYYMMDD_HHMMSS_CRC32C.ext`. RAW files keep the
/// base name of the image they belong to. With `--year`, files dated in a
/// different year trigger an interactive date correction per directory.
#[derive(Parser, Debug)]
#[command(name = "photo-renamer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (TOML format)
    ///
    /// CLI arguments override config file settings.
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// Target directory for file renaming
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Rename photos recursively
    #[arg(short, long)]
    pub recursive: bool,

    /// Output potential changes without performing them
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Log file location (default: <dir>/rename_photos.log)
    #[arg(short, long)]
    pub log: Option<PathBuf>,

    /// Expected capture year for all files
    #[arg(short, long)]
    pub year: Option<i32>,

    /// Directory names to skip
    #[arg(short, long, num_args = 1..)]
    pub exclude: Vec<String>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Merge CLI arguments with config from file
    /// CLI arguments take precedence over config file settings
    pub fn merge_with_config(&self, mut config: Config) -> Config {
        if let Some(ref dir) = self.dir {
            config.dir = Some(dir.clone());
        }
        if self.recursive {
            config.recursive = true;
        }
        if self.dry_run {
            config.dry_run = true;
        }
        if let Some(ref log) = self.log {
            config.log_file = Some(log.clone());
        }
        if let Some(year) = self.year {
            config.year = Some(year);
        }
        if !self.exclude.is_empty() {
            config.exclude = self.exclude.clone();
        }
        if self.verbose {
            config.verbose = true;
        }

        config
    }

    /// Convert CLI arguments to Config (when no config file is used)
    pub fn to_config(&self) -> Config {
        self.merge_with_config(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MediaClass;

    #[test]
    fn test_parse_full_command_line() {
        let cli = Cli::try_parse_from([
            "photo-renamer",
            "--dir",
            "/photos",
            "--recursive",
            "--dry-run",
            "--year",
            "2023",
            "--exclude",
            "@eaDir",
            ".thumbnails",
        ])
        .unwrap();

        let config = cli.to_config();
        assert_eq!(config.dir, Some(PathBuf::from("/photos")));
        assert!(config.recursive);
        assert!(config.dry_run);
        assert_eq!(config.year, Some(2023));
        assert_eq!(config.exclude, vec!["@eaDir", ".thumbnails"]);
        assert_eq!(config.log_path(), None);
    }

    #[test]
    fn test_short_flags() {
        let cli =
            Cli::try_parse_from(["photo-renamer", "-d", "/p", "-r", "-l", "/tmp/x.log", "-y", "2020"])
                .unwrap();
        assert_eq!(cli.dir, Some(PathBuf::from("/p")));
        assert!(cli.recursive);
        assert_eq!(cli.log, Some(PathBuf::from("/tmp/x.log")));
        assert_eq!(cli.year, Some(2020));
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_cli_overrides_config_file() {
        let file_config = Config {
            dir: Some(PathBuf::from("/from/file")),
            year: Some(2019),
            exclude: vec!["@eaDir".into()],
            ..Config::default()
        };
        let cli = Cli::try_parse_from(["photo-renamer", "-y", "2021"]).unwrap();

        let config = cli.merge_with_config(file_config);
        assert_eq!(config.dir, Some(PathBuf::from("/from/file")));
        assert_eq!(config.year, Some(2021));
        assert_eq!(config.exclude, vec!["@eaDir"]);
        assert_eq!(config.extensions.classify("jpeg"), MediaClass::Image);
    }

    #[test]
    fn test_rejects_non_numeric_year() {
        assert!(Cli::try_parse_from(["photo-renamer", "-d", "/p", "-y", "last"]).is_err());
    }
}
