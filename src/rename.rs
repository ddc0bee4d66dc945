//! Two-pass rename of one directory
//!
//! Pass one renames images and videos in chronological order, settling each
//! timestamp with the operator where needed. Pass two gives every RAW file the
//! new base name of the primary it shared an original base name with.
//!
//! Dry runs go through exactly the same decisions and log lines and build the
//! same name index, but never touch the filesystem.

use crate::config::Config;
use crate::correction::{DirectoryCorrectionState, Prompter, StickyCorrection};
use crate::error::Result;
use crate::hash::{canonical_extension, checksum, format_name};
use crate::media::{MediaClass, MediaFile, Timestamp};
use crate::sort;
use crate::time::{MetadataService, resolve};
use filetime::FileTime;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{Level, debug, info, span, warn};
use walkdir::WalkDir;

/// Original base name of each renamed primary, mapped to its new path
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NameIndex {
    entries: HashMap<String, PathBuf>,
}

impl NameIndex {
    /// Record a rename; entries are write-once
    ///
    /// Returns `false` if the base name was already recorded.
    pub fn insert(&mut self, stem: String, path: PathBuf) -> bool {
        if self.entries.contains_key(&stem) {
            return false;
        }
        self.entries.insert(stem, path);
        true
    }

    pub fn get(&self, stem: &str) -> Option<&Path> {
        self.entries.get(stem).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Counters accumulated over a run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RenameStats {
    pub directories: usize,
    pub renamed: usize,
    pub unchanged: usize,
    pub corrected: usize,
    pub skipped: usize,
}

impl RenameStats {
    pub fn summary(&self) -> String {
        format!(
            "Directories: {}, Renamed: {}, Already named: {}, Corrected: {}, Skipped: {}",
            self.directories, self.renamed, self.unchanged, self.corrected, self.skipped
        )
    }
}

/// Drives the rename of one directory at a time
pub struct RenameOrchestrator<'a> {
    config: &'a Config,
    metadata: &'a dyn MetadataService,
    prompter: &'a mut dyn Prompter,
    stats: RenameStats,
}

impl<'a> RenameOrchestrator<'a> {
    pub fn new(
        config: &'a Config,
        metadata: &'a dyn MetadataService,
        prompter: &'a mut dyn Prompter,
    ) -> Self {
        Self {
            config,
            metadata,
            prompter,
            stats: RenameStats::default(),
        }
    }

    pub fn stats(&self) -> &RenameStats {
        &self.stats
    }

    /// Rename the immediate files of `dir`
    ///
    /// Correction state lives for this call only.
    pub fn process_directory(&mut self, dir: &Path) -> Result<NameIndex> {
        let _span = span!(Level::DEBUG, "directory", dir = %dir.display()).entered();
        info!("Renaming images in '{}'", dir.display());

        let (primaries, raws) = self.collect_files(dir)?;
        debug!(
            primaries = primaries.len(),
            raws = raws.len(),
            "Collected files"
        );

        let mut state = DirectoryCorrectionState::new(self.config.year);
        let mut index = NameIndex::default();
        let mut claimed = HashSet::new();

        for file in sort::order(primaries) {
            self.rename_primary(file, &mut state, &mut index, &mut claimed);
        }
        if state.override_consumed() {
            info!(
                "Dates corrected in '{}' (carried over: {})",
                dir.display(),
                match state.sticky() {
                    Some(StickyCorrection::Offset(_)) => "offset",
                    Some(StickyCorrection::MonthDay(_)) => "date",
                    None => "nothing",
                }
            );
        }

        for raw in raws {
            self.rename_raw(raw, &index, &mut claimed);
        }

        self.stats.directories += 1;
        Ok(index)
    }

    /// Primary files with resolved timestamps, and RAW files in name order
    fn collect_files(&self, dir: &Path) -> Result<(Vec<MediaFile>, Vec<MediaFile>)> {
        let mut primaries = Vec::new();
        let mut raws = Vec::new();

        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "Failed to read directory entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let Some(mut file) = MediaFile::from_path(entry.path(), &self.config.extensions)
            else {
                warn!("Skipped file with non UTF-8 name: {}", entry.path().display());
                continue;
            };

            match file.class {
                MediaClass::Image | MediaClass::Video => {
                    file.timestamp = Some(resolve(&file, self.metadata));
                    primaries.push(file);
                }
                MediaClass::Raw => raws.push(file),
                MediaClass::Unknown => {
                    debug!(path = ?file.path, "Ignoring unclassified file");
                }
            }
        }

        Ok((primaries, raws))
    }

    fn rename_primary(
        &mut self,
        mut file: MediaFile,
        state: &mut DirectoryCorrectionState,
        index: &mut NameIndex,
        claimed: &mut HashSet<PathBuf>,
    ) {
        if !file.path.is_file() {
            warn!("File doesn't exist: '{}'", file.path.display());
            self.stats.skipped += 1;
            return;
        }

        let original = file
            .timestamp
            .unwrap_or_else(|| resolve(&file, self.metadata));
        let negotiated = state.negotiate(&file.path, original, &mut *self.prompter);

        if negotiated.is_changed() {
            self.persist_timestamp(&file, negotiated.timestamp);
            self.stats.corrected += 1;
        }

        let hash = match checksum(&file.path) {
            Ok(hash) => file.hash.insert(hash).as_str(),
            Err(e) => {
                warn!("Skipped file '{}': {}", file.path.display(), e);
                self.stats.skipped += 1;
                return;
            }
        };
        debug!("File hash: {}", hash);

        let timestamp = negotiated.timestamp;
        let new_name = format_name(
            timestamp.date(),
            timestamp.time(),
            hash,
            &file.extension,
            &self.config.extensions,
        );
        let new_path = file.path.with_file_name(&new_name);

        if self.move_file(&file.path, &new_path, claimed)
            && !index.insert(file.stem.clone(), new_path)
        {
            warn!(
                "Base name '{}' already renamed in this directory, RAW files pair with the first",
                file.stem
            );
        }
    }

    fn rename_raw(&mut self, raw: MediaFile, index: &NameIndex, claimed: &mut HashSet<PathBuf>) {
        let Some(primary) = index.get(&raw.stem) else {
            warn!(
                "Skipped file: {}, Corresponding image file not found",
                raw.file_name()
            );
            self.stats.skipped += 1;
            return;
        };

        if !raw.path.is_file() {
            warn!("File doesn't exist: '{}'", raw.path.display());
            self.stats.skipped += 1;
            return;
        }

        let ext = canonical_extension(&raw.extension, &self.config.extensions);
        let new_path = primary.with_extension(ext);
        self.move_file(&raw.path, &new_path, claimed);
    }

    /// Write the corrected timestamp into the file: EXIF for images, mtime otherwise
    fn persist_timestamp(&mut self, file: &MediaFile, timestamp: Timestamp) {
        let kind = if file.class == MediaClass::Image {
            "exif-time"
        } else {
            "mtime"
        };

        if !self.config.dry_run {
            let result = if file.class == MediaClass::Image {
                self.metadata.write_datetime(&file.path, timestamp)
            } else {
                let mtime = FileTime::from_unix_time(timestamp.and_utc().timestamp(), 0);
                filetime::set_file_mtime(&file.path, mtime).map_err(Into::into)
            };
            if let Err(e) = result {
                warn!(
                    "Failed to set new {} ({}) for file '{}': {}",
                    kind,
                    timestamp,
                    file.path.display(),
                    e
                );
                return;
            }
        }

        info!(
            "Set new {} ({}) for file: {}",
            kind,
            timestamp,
            file.path.display()
        );
    }

    /// Rename `from` to `to` unless this is a dry run
    ///
    /// Returns whether the file ends up (or would end up) at `to`.
    fn move_file(&mut self, from: &Path, to: &Path, claimed: &mut HashSet<PathBuf>) -> bool {
        let new_name = to
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if from == to {
            info!("File already named: '{}'", from.display());
            self.stats.unchanged += 1;
            claimed.insert(to.to_path_buf());
            return true;
        }

        if claimed.contains(to) || (to.exists() && !is_same_file(from, to)) {
            warn!(
                "Skipped file: '{}', target '{}' already exists",
                from.display(),
                new_name
            );
            self.stats.skipped += 1;
            return false;
        }

        if !self.config.dry_run
            && let Err(e) = fs::rename(from, to)
        {
            if e.kind() == ErrorKind::NotFound {
                warn!("File doesn't exist: '{}'", from.display());
            } else {
                warn!("Failed to rename '{}': {}", from.display(), e);
            }
            self.stats.skipped += 1;
            return false;
        }

        info!("Renamed file: '{}' > '{}'", from.display(), new_name);
        self.stats.renamed += 1;
        claimed.insert(to.to_path_buf());
        true
    }
}

/// Whether both paths name one file, as happens on case-insensitive filesystems
fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::metadata(a), fs::metadata(b)) {
        #[cfg(unix)]
        (Ok(a), Ok(b)) => {
            use std::os::unix::fs::MetadataExt;
            a.ino() == b.ino() && a.dev() == b.dev()
        }
        #[cfg(not(unix))]
        (Ok(_), Ok(_)) => match (fs::canonicalize(a), fs::canonicalize(b)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        },
        _ => false,
    }
}
