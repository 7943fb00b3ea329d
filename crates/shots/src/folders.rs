//! Working directory housekeeping.
//!
//! None of this is safe against concurrent runs sharing the same working
//! directories; there is no locking.

use crate::collect::list_shots;
use crate::error::{ErrorKind, Result};
use crate::models::ShotPaths;
use crate::path::normalize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::instrument;

pub const IGNORE_FILE: &str = ".gitignore";
/// Only baselines are meant to be committed.
pub const IGNORE_CONTENTS: &str = "current\ndifference\n";

/// Location of the ignore file: beside the baseline directory.
pub fn ignore_file_path(paths: &ShotPaths) -> Result<PathBuf> {
    normalize(paths.baseline.join("..").join(IGNORE_FILE))
}

/// Creates the baseline, current and difference directories (recursively,
/// if missing) and writes a default ignore file beside the baseline
/// directory the first time it is missing. An existing ignore file is never
/// overwritten.
///
/// Idempotent, but check-then-create rather than exclusive.
#[instrument(skip_all)]
pub fn ensure_shot_folders(paths: &ShotPaths) -> Result<()> {
    for dir in paths.iter() {
        if !dir.exists() {
            tracing::debug!(path = %dir.display(), "Creating shot directory");
            fs::create_dir_all(dir).map_err(ErrorKind::Io)?;
        }
    }
    let ignore_file = ignore_file_path(paths)?;
    if !ignore_file.exists() {
        tracing::info!(path = %ignore_file.display(), "Writing default ignore file");
        fs::write(&ignore_file, IGNORE_CONTENTS).map_err(ErrorKind::Io)?;
    }
    Ok(())
}

/// Deletes every file directly inside `dir`, returning how many were removed.
/// Subdirectories are left alone.
pub fn remove_files_in_folder(dir: impl AsRef<Path>) -> Result<usize> {
    let dir = dir.as_ref();
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(ErrorKind::Io)? {
        let entry = entry.map_err(ErrorKind::Io)?;
        if entry.file_type().map_err(ErrorKind::Io)?.is_file() {
            files.push(entry.path());
        }
    }
    tracing::info!(path = %dir.display(), count = files.len(), "Removing files from folder");
    for file in &files {
        fs::remove_file(file).map_err(ErrorKind::Io)?;
    }
    Ok(files.len())
}

/// Update mode: replaces the baseline screenshots with the current ones.
///
/// Baseline PNGs without a current counterpart are removed, so the baseline
/// directory ends up mirroring the current run exactly. Returns the number of
/// screenshots promoted.
#[instrument(skip_all)]
pub fn promote_current(paths: &ShotPaths) -> Result<usize> {
    fs::create_dir_all(&paths.baseline).map_err(ErrorKind::Io)?;
    for stale in list_shots(&paths.baseline) {
        fs::remove_file(stale.file_path()).map_err(ErrorKind::Io)?;
    }
    let current = list_shots(&paths.current);
    for shot in &current {
        fs::copy(shot.file_path(), paths.baseline.join(&shot.name)).map_err(ErrorKind::Io)?;
    }
    tracing::info!(count = current.len(), path = %paths.baseline.display(), "Promoted current shots to baseline");
    Ok(current.len())
}
