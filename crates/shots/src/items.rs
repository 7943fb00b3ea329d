//! Shot items for custom (pre-captured) screenshots.
//!
//! When screenshots are produced outside of this tool, every PNG in the
//! custom directory becomes a [`ShotItem`] for the pixel-diff step to compare.

use crate::collect::list_shots;
use crate::models::ShotPaths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How a screenshot was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShotMode {
    Storybook,
    Ladle,
    Page,
    Custom,
}

/// Everything the pixel-diff step needs to know about one screenshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShotItem {
    pub id: String,
    pub shot_name: String,
    pub shot_mode: ShotMode,
    pub file_path_baseline: PathBuf,
    pub file_path_current: PathBuf,
    pub file_path_difference: PathBuf,
    pub url: String,
    pub threshold: f64,
}

/// Strips the final extension from a filename. Names without a dot become
/// empty, same as a stem made of every segment but the last.
///
/// ```
/// use shotdiff_shots::items::file_name_without_extension;
///
/// assert_eq!(file_name_without_extension("button.hover.png"), "button.hover");
/// assert_eq!(file_name_without_extension("noext"), "");
/// ```
pub fn file_name_without_extension(file_name: &str) -> &str {
    file_name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or_default()
}

/// Reads the PNGs in `dir` (the custom current-shots directory) into
/// [`ShotItem`]s whose baseline and difference paths point into the run's
/// working directories.
pub fn read_shot_items(dir: impl AsRef<Path>, paths: &ShotPaths, threshold: f64) -> Vec<ShotItem> {
    let dir = dir.as_ref();
    list_shots(dir)
        .into_iter()
        .map(|shot| {
            let name = file_name_without_extension(&shot.name).to_string();
            ShotItem {
                id: name.clone(),
                shot_name: name.clone(),
                shot_mode: ShotMode::Custom,
                file_path_baseline: paths.baseline.join(&shot.name),
                file_path_current: dir.join(&shot.name),
                file_path_difference: paths.difference.join(&shot.name),
                url: name,
                threshold,
            }
        })
        .collect()
}
