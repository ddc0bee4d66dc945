//! EXIF `DateTimeOriginal` for images

use crate::error::{Error, Result};
use crate::media::Timestamp;
use exif::{In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::process::Command;
use std::sync::OnceLock;
use tracing::{debug, trace};

/// EXIF date format, also used when writing
pub const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Cached ExifTool availability check
static EXIFTOOL_AVAILABLE: OnceLock<bool> = OnceLock::new();

fn is_exiftool_available() -> bool {
    *EXIFTOOL_AVAILABLE.get_or_init(|| Command::new("exiftool").arg("-ver").output().is_ok())
}

/// Read the raw `DateTimeOriginal` string of an image
pub fn read_date_time_original(path: &Path) -> Result<String> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let exif = Reader::new()
        .read_from_container(&mut reader)
        .map_err(|e| Error::ExifRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let field = exif
        .get_field(Tag::DateTimeOriginal, In::PRIMARY)
        .ok_or_else(|| Error::ExifRead {
            path: path.to_path_buf(),
            message: "No DateTimeOriginal tag in EXIF data".to_string(),
        })?;

    let value = match field.value {
        Value::Ascii(ref parts) if !parts.is_empty() => {
            String::from_utf8_lossy(&parts[0]).trim_end_matches('\0').to_string()
        }
        _ => field.display_value().to_string(),
    };

    trace!(?path, %value, "Found EXIF DateTimeOriginal");
    Ok(value)
}

/// Persist a new `DateTimeOriginal` into an image with ExifTool
pub fn write_date_time_original(path: &Path, timestamp: Timestamp) -> Result<()> {
    if !is_exiftool_available() {
        return Err(Error::ExifToolNotFound);
    }

    let output = Command::new("exiftool")
        .arg("-overwrite_original")
        .arg(format!(
            "-DateTimeOriginal={}",
            timestamp.format(EXIF_DATETIME_FORMAT)
        ))
        .arg(path)
        .output()
        .map_err(|e| Error::ExifWrite {
            path: path.to_path_buf(),
            message: format!("Failed to execute exiftool: {}", e),
        })?;

    if !output.status.success() {
        return Err(Error::ExifWrite {
            path: path.to_path_buf(),
            message: format!(
                "ExifTool failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        });
    }

    debug!(?path, %timestamp, "Wrote EXIF DateTimeOriginal");
    Ok(())
}
