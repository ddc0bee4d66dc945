//! CRC-32C checksums and canonical file names
//!
//! New names have the form `YYYYMMDD_HHMMSS_HASH.ext`, where `HASH` is the
//! CRC-32C (Castagnoli) of the full file content as eight upper-case hex digits.

use crate::config::ExtensionTable;
use crate::error::{Error, Result};
use chrono::{NaiveDate, NaiveTime};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{trace, warn};

/// Read buffer size for checksumming (256KB)
const BUFFER_SIZE: usize = 256 * 1024;

/// Compute the CRC-32C checksum of a file as an 8-digit upper-case hex string
pub fn checksum(path: &Path) -> Result<String> {
    let file = File::open(path)?;
    let mut reader = BufReader::with_capacity(BUFFER_SIZE, file);
    let mut buffer = vec![0u8; BUFFER_SIZE];
    let mut crc = 0u32;

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| Error::HashComputation {
                path: path.to_path_buf(),
                message: format!("Failed to read file: {}", e),
            })?;
        if bytes_read == 0 {
            break;
        }
        crc = crc32c::crc32c_append(crc, &buffer[..bytes_read]);
    }

    let hash = format!("{:08X}", crc);
    trace!(?path, %hash, "Computed file checksum");
    Ok(hash)
}

/// Canonical form of an extension: lower-case, `jpeg` folded into `jpg`
///
/// Extensions without a classification rule pass through lower-cased, with a
/// warning.
pub fn canonical_extension(ext: &str, table: &ExtensionTable) -> String {
    let ext_lower = ext.trim_start_matches('.').to_lowercase();
    if !table.is_known(&ext_lower) {
        warn!("Couldn't find rule for extension '{}'.", ext);
    }
    match ext_lower.as_str() {
        "jpeg" => "jpg".to_string(),
        _ => ext_lower,
    }
}

/// Format the canonical file name for a date, time, checksum and extension
pub fn format_name(
    date: NaiveDate,
    time: NaiveTime,
    hash: &str,
    ext: &str,
    table: &ExtensionTable,
) -> String {
    let ext = canonical_extension(ext, table);
    let base = format!("{}_{}_{}", date.format("%Y%m%d"), time.format("%H%M%S"), hash);
    if ext.is_empty() {
        base
    } else {
        format!("{}.{}", base, ext)
    }
}
