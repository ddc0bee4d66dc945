//! Directory traversal
//!
//! Each directory is an independent rename pass. Excluded directories (matched
//! by base name) are not renamed, but their children still are when walking
//! recursively.

use crate::config::Config;
use crate::correction::Prompter;
use crate::error::{Error, Result};
use crate::rename::{RenameOrchestrator, RenameStats};
use crate::time::MetadataService;
use std::path::{Path, PathBuf};
use tracing::{Level, error, info, span, warn};
use walkdir::WalkDir;

/// Visit every qualifying directory under `root`
///
/// Without `recursive` only `root` is visited, whatever its name. A failing
/// visit is logged and the walk continues. Returns the number of directories
/// visited.
pub fn walk<F>(root: &Path, recursive: bool, excluded: &[String], mut visit: F) -> usize
where
    F: FnMut(&Path) -> Result<()>,
{
    let mut visited = 0;

    for dir in directories(root, recursive) {
        if recursive && is_excluded(&dir, excluded) {
            info!("Skipping excluded directory '{}'", dir.display());
            continue;
        }

        visited += 1;
        if let Err(e) = visit(&dir) {
            error!("Failed to process directory '{}': {}", dir.display(), e);
        }
    }

    visited
}

/// Rename the whole tree described by `config`
pub fn rename_tree(
    config: &Config,
    metadata: &dyn MetadataService,
    prompter: &mut dyn Prompter,
) -> Result<RenameStats> {
    let root = config
        .dir
        .as_deref()
        .ok_or_else(|| Error::Config("No directory given".into()))?;
    if !root.is_dir() {
        return Err(Error::Config(format!(
            "'{}' is not a directory",
            root.display()
        )));
    }

    let _span = span!(Level::DEBUG, "rename_tree").entered();
    let mut orchestrator = RenameOrchestrator::new(config, metadata, prompter);

    walk(root, config.recursive, &config.exclude, |dir| {
        orchestrator.process_directory(dir).map(|_| ())
    });

    let stats = orchestrator.stats().clone();
    info!("{}", stats.summary());
    Ok(stats)
}

/// Root first, then descendants in file-name order
///
/// Collected up front so renames never disturb the traversal.
fn directories(root: &Path, recursive: bool) -> Vec<PathBuf> {
    if !recursive {
        return vec![root.to_path_buf()];
    }

    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "Failed to read directory entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_dir())
        .map(|entry| entry.into_path())
        .collect()
}

fn is_excluded(dir: &Path, excluded: &[String]) -> bool {
    dir.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| excluded.iter().any(|e| e == name))
}
