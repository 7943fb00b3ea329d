//! Screenshot source sections of the configuration.
//!
//! Capturing is done elsewhere; here they only matter for deciding which
//! shot modes are active and where custom shots live.

use serde::{Deserialize, Serialize};
use shotdiff_shots::items::ShotMode;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// A URL-driven shot source (Storybook, Ladle).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlShots {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub path: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageShots {
    pub base_url: String,
    #[serde(default)]
    pub pages: Vec<Page>,
}

/// Screenshots captured by something else and dropped into a directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomShots {
    pub current_shots_path: PathBuf,
}

/// The set of active shot-capture modes. Ordered, so two configurations
/// enabling the same modes always report them identically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShotModes(BTreeSet<ShotMode>);
impl ShotModes {
    pub fn contains(&self, mode: ShotMode) -> bool {
        self.0.contains(&mode)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Names as reported in telemetry.
    pub fn names(&self) -> Vec<&'static str> {
        self.0
            .iter()
            .map(|mode| match mode {
                ShotMode::Storybook => "storybook",
                ShotMode::Ladle => "ladle",
                ShotMode::Page => "pages",
                ShotMode::Custom => "custom",
            })
            .collect()
    }
}
impl FromIterator<ShotMode> for ShotModes {
    fn from_iter<I: IntoIterator<Item = ShotMode>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
