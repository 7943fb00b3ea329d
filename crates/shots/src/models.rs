//! Shot models.
//!
//! Point-in-time value objects produced from a directory snapshot. Nothing
//! here is mutated after construction; the manifests built from them are
//! handed straight to the report layer.

use serde::{Deserialize, Serialize};
use std::ops::Deref;
use std::path::PathBuf;

/// A screenshot's bare filename and the directory it was found in.
///
/// Names are compared by exact, case-sensitive string equality. No
/// normalization is performed on them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotFile {
    pub name: String,
    pub path: PathBuf,
}
impl ShotFile {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Full path of the file on disk (directory joined with the name).
    pub fn file_path(&self) -> PathBuf {
        self.path.join(&self.name)
    }

    /// Attach the directory holding the "current" variant of this shot.
    pub fn with_path_current(self, path_current: Option<PathBuf>) -> ExtendedShotFile {
        ExtendedShotFile { file: self, path_current }
    }
}

/// A [`ShotFile`] that additionally records where its "current" variant
/// lives. Only used for difference entries: custom shot paths mean the
/// current screenshot may not be in the default current-shots directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedShotFile {
    #[serde(flatten)]
    file: ShotFile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_current: Option<PathBuf>,
}
impl ExtendedShotFile {
    // Explicit version of self.deref()
    pub fn file(&self) -> &ShotFile {
        &self.file
    }

    /// Directory of the current variant, falling back to the entry's own path.
    pub fn current_dir(&self) -> &PathBuf {
        self.path_current.as_ref().unwrap_or(&self.file.path)
    }
}
impl Deref for ExtendedShotFile {
    type Target = ShotFile;
    fn deref(&self) -> &ShotFile {
        &self.file
    }
}
impl From<ShotFile> for ExtendedShotFile {
    fn from(file: ShotFile) -> Self {
        Self { file, path_current: None }
    }
}

/// Classification category of a screenshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComparisonType {
    Addition,
    Deletion,
    Difference,
}
impl ComparisonType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonType::Addition => "ADDITION",
            ComparisonType::Deletion => "DELETION",
            ComparisonType::Difference => "DIFFERENCE",
        }
    }
}

/// The three directory listings a classification works from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShotListing {
    pub baseline: Vec<ShotFile>,
    pub current: Vec<ShotFile>,
    /// Pre-filtered by the external pixel-diff step; never computed here.
    pub difference: Vec<ShotFile>,
}

/// Every screenshot of a run, classified into exactly one outcome.
///
/// All three lists are sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub difference: Vec<ExtendedShotFile>,
    pub deletion: Vec<ShotFile>,
    pub addition: Vec<ShotFile>,
}
impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.difference.is_empty() && self.deletion.is_empty() && self.addition.is_empty()
    }

    /// Number of upload descriptors a manifest built from this set contains.
    pub fn upload_count(&self) -> usize {
        self.addition.len() + self.deletion.len() + 3 * self.difference.len()
    }
}

/// The three working directories of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShotPaths {
    pub baseline: PathBuf,
    pub current: PathBuf,
    pub difference: PathBuf,
}
impl ShotPaths {
    pub fn new(baseline: impl Into<PathBuf>, current: impl Into<PathBuf>, difference: impl Into<PathBuf>) -> Self {
        Self {
            baseline: baseline.into(),
            current: current.into(),
            difference: difference.into(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        [&self.baseline, &self.current, &self.difference].into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_current_dir_fallback() {
        let file = ShotFile::new("a.png", "shots/difference");
        let plain: ExtendedShotFile = file.clone().into();
        assert_eq!(plain.current_dir(), Path::new("shots/difference"));
        let custom = file.with_path_current(Some(PathBuf::from("custom/current")));
        assert_eq!(custom.current_dir(), Path::new("custom/current"));
        assert_eq!(custom.name, "a.png");
    }

    #[test]
    fn test_extended_serializes_flat() {
        let file = ShotFile::new("a.png", "d").with_path_current(Some(PathBuf::from("c")));
        let json = serde_json::to_string(&file).unwrap();
        assert_eq!(json, r#"{"name":"a.png","path":"d","pathCurrent":"c"}"#);
        let plain: ExtendedShotFile = ShotFile::new("a.png", "d").into();
        assert_eq!(serde_json::to_string(&plain).unwrap(), r#"{"name":"a.png","path":"d"}"#);
    }

    #[test]
    fn test_comparison_type_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&ComparisonType::Difference).unwrap(), r#""DIFFERENCE""#);
        assert_eq!(ComparisonType::Addition.as_str(), "ADDITION");
    }

    #[test]
    fn test_upload_count() {
        let changes = ChangeSet {
            difference: vec![ShotFile::new("b.png", "d").into()],
            deletion: vec![ShotFile::new("a.png", "b")],
            addition: vec![ShotFile::new("c.png", "c"), ShotFile::new("e.png", "c")],
        };
        assert_eq!(changes.upload_count(), 2 + 1 + 3);
        assert!(!changes.is_empty());
        assert!(ChangeSet::default().is_empty());
    }
}
