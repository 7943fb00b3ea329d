//! Directory listing of screenshot files.

use crate::models::{ShotFile, ShotListing, ShotPaths};
use std::path::Path;

/// Screenshots are always PNGs. Matching is case-sensitive.
pub const SHOT_EXTENSION: &str = ".png";

/// Lists the screenshot filenames directly inside `dir`, in the order the
/// filesystem returns them.
///
/// Only names are inspected: the listing does not recurse and does not stat
/// entries. A directory that can't be read (most commonly because it doesn't
/// exist yet) yields an empty listing rather than an error, matching the
/// behaviour of a fresh project with no baseline.
pub fn list_shots(dir: impl AsRef<Path>) -> Vec<ShotFile> {
    let dir = dir.as_ref();
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path = %dir.display(), "Shot directory does not exist; treating as empty");
            return Vec::new();
        },
        Err(err) => {
            tracing::warn!(path = %dir.display(), error = %err, "Could not list shot directory; treating as empty");
            return Vec::new();
        },
    };
    let mut shots = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(path = %dir.display(), error = %err, "Skipping unreadable directory entry");
                continue;
            },
        };
        let Ok(name) = entry.file_name().into_string() else {
            tracing::debug!(path = %entry.path().display(), "Skipping non-UTF-8 filename");
            continue;
        };
        if name.ends_with(SHOT_EXTENSION) {
            shots.push(ShotFile::new(name, dir));
        }
    }
    tracing::trace!(path = %dir.display(), count = shots.len(), "Listed shot directory");
    shots
}

impl ShotListing {
    /// Lists all three working directories. The difference listing is
    /// whatever the pixel-diff step left in the difference directory.
    pub fn from_paths(paths: &ShotPaths) -> Self {
        Self {
            baseline: list_shots(&paths.baseline),
            current: list_shots(&paths.current),
            difference: list_shots(&paths.difference),
        }
    }
}
