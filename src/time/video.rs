//! Video `CreateDate` via FFprobe

use crate::error::{Error, Result};
use serde_json::Value;
use std::path::Path;
use std::process::Command;
use std::sync::OnceLock;
use tracing::{debug, trace};

/// Metadata keys carrying the container creation date, in priority order
const CREATION_DATE_KEYS: &[&str] = &["creation_time", "com.apple.quicktime.creationdate"];

/// Cached FFprobe availability check
static FFPROBE_AVAILABLE: OnceLock<bool> = OnceLock::new();

fn is_ffprobe_available() -> bool {
    *FFPROBE_AVAILABLE.get_or_init(|| Command::new("ffprobe").arg("-version").output().is_ok())
}

/// Read the raw creation date string of a video container
pub fn read_create_date(path: &Path) -> Result<String> {
    if !is_ffprobe_available() {
        return Err(Error::FfprobeNotFound);
    }

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .output()
        .map_err(|e| Error::VideoMetadata {
            path: path.to_path_buf(),
            message: format!("Failed to execute ffprobe: {}", e),
        })?;

    if !output.status.success() {
        return Err(Error::VideoMetadata {
            path: path.to_path_buf(),
            message: format!(
                "FFprobe failed: {}",
                String::from_utf8_lossy(&output.stderr)
            ),
        });
    }

    let json_str = String::from_utf8_lossy(&output.stdout);
    trace!(?path, "FFprobe output: {}", json_str);

    let json: Value = serde_json::from_str(&json_str)?;

    let value = find_creation_time(&json).ok_or_else(|| Error::VideoMetadata {
        path: path.to_path_buf(),
        message: "No creation time found in video metadata".to_string(),
    })?;

    debug!(?path, %value, "Found video creation time");
    Ok(value)
}

/// Look up the creation time in format tags first, then in stream tags
fn find_creation_time(json: &Value) -> Option<String> {
    if let Some(value) = json
        .get("format")
        .and_then(|format| format.get("tags"))
        .and_then(find_in_tags)
    {
        return Some(value);
    }

    json.get("streams")
        .and_then(|s| s.as_array())?
        .iter()
        .filter_map(|stream| stream.get("tags"))
        .find_map(find_in_tags)
}

fn find_in_tags(tags: &Value) -> Option<String> {
    for key in CREATION_DATE_KEYS {
        for tag_key in [key.to_string(), key.to_uppercase()] {
            if let Some(value) = tags.get(&tag_key).and_then(|v| v.as_str())
                && !value.trim().is_empty()
            {
                return Some(value.trim().to_string());
            }
        }
    }
    None
}
