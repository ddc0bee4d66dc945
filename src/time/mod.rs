//! Timestamp resolution
//!
//! The timestamp of a file is taken from, in order:
//! 1. EXIF `DateTimeOriginal` (images) or container `CreateDate` (videos)
//! 2. The earlier of the file's creation and modification times
//! 3. The Unix epoch, when nothing above parses

pub mod exif;
pub mod video;

use crate::error::Result;
use crate::media::{MediaClass, MediaFile, Timestamp};
use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Access to embedded capture dates
pub trait MetadataService {
    /// Raw date string embedded in the file, if any
    ///
    /// Failures of any kind are reported as `None`.
    fn read_datetime(&self, path: &Path, class: MediaClass) -> Option<String>;

    /// Persist a corrected capture date into the file
    fn write_datetime(&self, path: &Path, timestamp: Timestamp) -> Result<()>;
}

/// Metadata service backed by kamadak-exif, FFprobe and ExifTool
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemMetadata;

impl MetadataService for SystemMetadata {
    fn read_datetime(&self, path: &Path, class: MediaClass) -> Option<String> {
        let result = match class {
            MediaClass::Image => exif::read_date_time_original(path),
            MediaClass::Video => video::read_create_date(path),
            MediaClass::Raw | MediaClass::Unknown => return None,
        };
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(?path, error = %e, "No embedded date");
                None
            }
        }
    }

    fn write_datetime(&self, path: &Path, timestamp: Timestamp) -> Result<()> {
        exif::write_date_time_original(path, timestamp)
    }
}

/// Resolve the timestamp of a file
///
/// Never fails: unreadable metadata falls back to filesystem times, and an
/// unparseable result falls back to 1970-01-01 00:00:00.
pub fn resolve(file: &MediaFile, metadata: &dyn MetadataService) -> Timestamp {
    let raw = match metadata.read_datetime(&file.path, file.class) {
        Some(value) => Some(value),
        None => filesystem_datetime(&file.path),
    };

    match raw.as_deref().and_then(parse_datetime) {
        Some(timestamp) => timestamp,
        None => {
            warn!(
                path = ?file.path,
                raw = ?raw,
                "Could not parse a date for file, using the epoch"
            );
            epoch()
        }
    }
}

/// 1970-01-01 00:00:00
pub fn epoch() -> Timestamp {
    // chrono's default NaiveDateTime is the Unix epoch
    NaiveDateTime::default()
}

/// Earlier of creation and modification time, as an EXIF-style UTC string
fn filesystem_datetime(path: &Path) -> Option<String> {
    let metadata = fs::metadata(path).ok()?;
    let earliest = match (metadata.created().ok(), metadata.modified().ok()) {
        (Some(created), Some(modified)) => created.min(modified),
        (Some(created), None) => created,
        (None, Some(modified)) => modified,
        (None, None) => return None,
    };

    let datetime: DateTime<Utc> = earliest.into();
    debug!(?path, %datetime, "Using file system time");
    Some(datetime.format(exif::EXIF_DATETIME_FORMAT).to_string())
}

/// Parse a metadata date string
///
/// Accepts the EXIF form `YYYY:MM:DD HH:MM:SS` and the usual alternatives,
/// including RFC 3339 as written by FFprobe. Sub-seconds are dropped and
/// offsets ignored.
pub fn parse_datetime(s: &str) -> Option<Timestamp> {
    let s = s.trim().trim_matches('"').trim_end_matches('\0');

    let formats = [
        "%Y:%m:%d %H:%M:%S",
        "%Y:%m:%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y/%m/%d %H:%M:%S",
    ];

    for format in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(truncate_subsec(dt));
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(truncate_subsec(dt.naive_local()));
    }

    None
}

fn truncate_subsec(dt: NaiveDateTime) -> NaiveDateTime {
    dt.with_nanosecond(0).unwrap_or(dt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtensionTable;
    use crate::testing::FakeMetadata;
    use chrono::{Datelike, NaiveDate};
    use filetime::FileTime;
    use std::fs::File;
    use tempfile::tempdir;

    fn ts(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> Timestamp {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_parse_datetime() {
        assert_eq!(
            parse_datetime("2024:01:15 14:30:00"),
            Some(ts(2024, 1, 15, 14, 30, 0))
        );
        assert_eq!(
            parse_datetime("\"2024:01:15 14:30:00\""),
            Some(ts(2024, 1, 15, 14, 30, 0))
        );
        assert_eq!(
            parse_datetime("2024:01:15 14:30:00.25"),
            Some(ts(2024, 1, 15, 14, 30, 0))
        );
        assert_eq!(
            parse_datetime("2024-01-15T14:30:00.000000Z"),
            Some(ts(2024, 1, 15, 14, 30, 0))
        );
        assert_eq!(
            parse_datetime("2024-01-15T14:30:00+08:00"),
            Some(ts(2024, 1, 15, 14, 30, 0))
        );
        assert!(parse_datetime("invalid").is_none());
        assert!(parse_datetime("0000:00:00 00:00:00").is_none());
    }

    #[test]
    fn test_resolve_prefers_embedded_date() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("photo1.jpg");
        File::create(&path).unwrap();

        let metadata = FakeMetadata::new().with_date("photo1.jpg", "2024:01:02 10:00:00");
        let file = MediaFile::from_path(&path, &ExtensionTable::default()).unwrap();

        assert_eq!(resolve(&file, &metadata), ts(2024, 1, 2, 10, 0, 0));
    }

    #[test]
    fn test_resolve_falls_back_to_file_time() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clip.mov");
        File::create(&path).unwrap();
        let mtime = ts(2001, 5, 6, 7, 8, 9).and_utc().timestamp();
        filetime::set_file_mtime(&path, FileTime::from_unix_time(mtime, 500)).unwrap();

        let file = MediaFile::from_path(&path, &ExtensionTable::default()).unwrap();
        assert_eq!(resolve(&file, &FakeMetadata::new()), ts(2001, 5, 6, 7, 8, 9));
    }

    #[test]
    fn test_resolve_unparseable_is_epoch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("photo2.jpg");
        File::create(&path).unwrap();

        let metadata = FakeMetadata::new().with_date("photo2.jpg", "    :  :     :  :  ");
        let file = MediaFile::from_path(&path, &ExtensionTable::default()).unwrap();

        let resolved = resolve(&file, &metadata);
        assert_eq!(resolved, epoch());
        assert_eq!(resolved.year(), 1970);
    }

    #[test]
    fn test_resolve_missing_file_is_epoch() {
        let file = MediaFile::from_path(
            Path::new("/nonexistent/gone.jpg"),
            &ExtensionTable::default(),
        )
        .unwrap();
        assert_eq!(resolve(&file, &FakeMetadata::new()), epoch());
    }

    #[test]
    fn test_system_metadata_ignores_raw() {
        assert!(
            SystemMetadata
                .read_datetime(Path::new("/nonexistent/a.nef"), MediaClass::Raw)
                .is_none()
        );
    }
}
