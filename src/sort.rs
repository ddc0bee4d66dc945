//! Chronological ordering of a directory's files
//!
//! Files sharing a timestamp get a sort key pushed forward by whole seconds
//! until it is unique. The key only orders the batch; it is never written back
//! to the file.

use crate::media::{MediaFile, Timestamp};
use crate::time::epoch;
use chrono::TimeDelta;
use std::collections::HashSet;

/// Order files ascending by resolved timestamp
pub fn order(files: Vec<MediaFile>) -> Vec<MediaFile> {
    with_sort_keys(files).into_iter().map(|(_, file)| file).collect()
}

/// Order files and return each with its unique sort key
///
/// Ties are broken by path, so the result is the same on every run.
pub fn with_sort_keys(mut files: Vec<MediaFile>) -> Vec<(Timestamp, MediaFile)> {
    files.sort_by(|a, b| {
        resolved(a)
            .cmp(&resolved(b))
            .then_with(|| a.path.cmp(&b.path))
    });

    let mut used = HashSet::with_capacity(files.len());
    let mut keyed = Vec::with_capacity(files.len());
    for file in files {
        let mut key = resolved(&file);
        while !used.insert(key) {
            key += TimeDelta::seconds(1);
        }
        keyed.push((key, file));
    }

    // A perturbed key may overtake a later file's own timestamp
    keyed.sort_by_key(|(key, _)| *key);
    keyed
}

fn resolved(file: &MediaFile) -> Timestamp {
    file.timestamp.unwrap_or_else(epoch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtensionTable;
    use chrono::NaiveDate;
    use std::path::Path;

    fn file(name: &str, h: u32, m: u32, s: u32) -> MediaFile {
        let mut f = MediaFile::from_path(Path::new(name), &ExtensionTable::default()).unwrap();
        f.timestamp = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(h, m, s);
        f
    }

    fn names(files: &[MediaFile]) -> Vec<&str> {
        files.iter().map(|f| f.stem.as_str()).collect()
    }

    #[test]
    fn test_distinct_timestamps_strictly_increasing() {
        let ordered = order(vec![
            file("c.jpg", 12, 0, 0),
            file("a.jpg", 8, 30, 0),
            file("b.jpg", 9, 0, 0),
        ]);
        assert_eq!(names(&ordered), vec!["a", "b", "c"]);
        assert!(
            ordered
                .windows(2)
                .all(|w| w[0].timestamp < w[1].timestamp)
        );
    }

    #[test]
    fn test_ties_are_perturbed_deterministically() {
        let input = vec![
            file("z.jpg", 10, 0, 0),
            file("m.jpg", 10, 0, 1),
            file("a.jpg", 10, 0, 0),
        ];

        let keyed = with_sort_keys(input.clone());
        let stems: Vec<&str> = keyed.iter().map(|(_, f)| f.stem.as_str()).collect();
        assert_eq!(stems, vec!["a", "z", "m"]);

        let keys: Vec<String> = keyed
            .iter()
            .map(|(k, _)| k.format("%H:%M:%S").to_string())
            .collect();
        assert_eq!(keys, vec!["10:00:00", "10:00:01", "10:00:02"]);

        // Same answer regardless of input order
        let mut reversed = input;
        reversed.reverse();
        assert_eq!(names(&order(reversed)), vec!["a", "z", "m"]);
    }

    #[test]
    fn test_sort_key_not_written_back() {
        let ordered = order(vec![file("b.jpg", 10, 0, 0), file("a.jpg", 10, 0, 0)]);
        assert_eq!(ordered[0].timestamp, ordered[1].timestamp);
    }

    #[test]
    fn test_unresolved_sorts_first() {
        let mut unresolved = file("x.jpg", 0, 0, 0);
        unresolved.timestamp = None;
        let ordered = order(vec![file("a.jpg", 1, 0, 0), unresolved]);
        assert_eq!(names(&ordered), vec!["x", "a"]);
    }
}
