//! Comparison and upload manifests.
//!
//! Turns a classified [`ChangeSet`] into the two ordered artifact lists a run
//! hands to the report layer:
//!
//! | category | comparison URLs | uploads |
//! |---|---|---|
//! | addition | after | current shot as `after` |
//! | deletion | before | baseline shot as `before` |
//! | difference | before, after, difference | baseline as `before`, current as `after`, diff image as `difference` |
//!
//! Both lists are ordered by category (additions, deletions, differences)
//! and then by the name order the classifier established.

use crate::error::Result;
use crate::extend::{Variant, extend_file_name};
use crate::models::{ChangeSet, ComparisonType, ShotPaths};
use crate::path::normalize;
use crate::upload::{Destination, UploadDescriptor, UploadItemFactory};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::instrument;

/// A report-facing description of one classified screenshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonEntry {
    #[serde(rename = "type")]
    pub kind: ComparisonType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difference_image_url: Option<String>,
    /// Baseline location of the shot.
    pub path: PathBuf,
    pub name: String,
}

/// The artifacts of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub comparisons: Vec<ComparisonEntry>,
    pub uploads: Vec<UploadDescriptor>,
}
impl From<Manifest> for (Vec<ComparisonEntry>, Vec<UploadDescriptor>) {
    fn from(manifest: Manifest) -> Self {
        (manifest.comparisons, manifest.uploads)
    }
}

/// Builds a [`Manifest`] from a [`ChangeSet`].
pub struct ComparisonManifestBuilder<'a> {
    paths: &'a ShotPaths,
    uploads: UploadItemFactory<'a>,
}
impl<'a> ComparisonManifestBuilder<'a> {
    pub fn new(paths: &'a ShotPaths, destination: &'a Destination) -> Self {
        Self {
            paths,
            uploads: UploadItemFactory::new(destination),
        }
    }

    /// Builds both manifests. Image URLs are `<base_url>/<variant filename>`;
    /// they are web links, so the separator is always `/`.
    ///
    /// Names must be free of NUL bytes. Names from [`list_shots`](crate::list_shots)
    /// always are, since no filesystem allows them.
    ///
    /// # Errors
    /// - [`GenerateOnly`](crate::error::ErrorKind::GenerateOnly) if the
    ///   change set has any entry while the destination is generate-only.
    /// - [`InvalidPath`](crate::error::ErrorKind::InvalidPath) if a name
    ///   contains a NUL byte.
    #[instrument(skip_all, fields(
        additions = changes.addition.len(),
        deletions = changes.deletion.len(),
        differences = changes.difference.len()
    ))]
    pub fn build(&self, changes: &ChangeSet, base_url: &str) -> Result<Manifest> {
        let url = |file_name: &str| format!("{}/{file_name}", base_url.trim_end_matches('/'));
        let mut comparisons = Vec::with_capacity(changes.addition.len() + changes.deletion.len() + changes.difference.len());
        let mut uploads = Vec::with_capacity(changes.upload_count());

        for file in &changes.addition {
            let kind = ComparisonType::Addition;
            let after = extend_file_name(&file.name, Variant::After);
            comparisons.push(ComparisonEntry {
                kind,
                before_image_url: None,
                after_image_url: Some(url(&after)),
                difference_image_url: None,
                path: self.baseline_path(&file.name)?,
                name: file.name.clone(),
            });
            uploads.push(self.uploads.create(&after, &file.path, &file.name, kind)?);
        }

        for file in &changes.deletion {
            let kind = ComparisonType::Deletion;
            let before = extend_file_name(&file.name, Variant::Before);
            comparisons.push(ComparisonEntry {
                kind,
                before_image_url: Some(url(&before)),
                after_image_url: None,
                difference_image_url: None,
                path: self.baseline_path(&file.name)?,
                name: file.name.clone(),
            });
            uploads.push(self.uploads.create(&before, &self.paths.baseline, &file.name, kind)?);
        }

        for file in &changes.difference {
            let kind = ComparisonType::Difference;
            let before = extend_file_name(&file.name, Variant::Before);
            let after = extend_file_name(&file.name, Variant::After);
            let difference = extend_file_name(&file.name, Variant::Difference);
            comparisons.push(ComparisonEntry {
                kind,
                before_image_url: Some(url(&before)),
                after_image_url: Some(url(&after)),
                difference_image_url: Some(url(&difference)),
                path: self.baseline_path(&file.name)?,
                name: file.name.clone(),
            });
            uploads.push(self.uploads.create(&before, &self.paths.baseline, &file.name, kind)?);
            // Current shots may live in a custom directory.
            uploads.push(self.uploads.create(&after, file.current_dir(), &file.name, kind)?);
            uploads.push(self.uploads.create(&difference, &self.paths.difference, &file.name, kind)?);
        }

        tracing::debug!(comparisons = comparisons.len(), uploads = uploads.len(), "Built manifests");
        Ok(Manifest { comparisons, uploads })
    }

    fn baseline_path(&self, file_name: &str) -> Result<PathBuf> {
        normalize(self.paths.baseline.join(file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::ShotFile;
    use std::path::Path;

    fn paths() -> ShotPaths {
        ShotPaths::new("shots/baseline", "shots/current", "shots/difference")
    }

    fn scenario() -> ChangeSet {
        ChangeSet {
            difference: vec![
                ShotFile::new("b.png", "shots/difference").with_path_current(Some(PathBuf::from("shots/current"))),
            ],
            deletion: vec![ShotFile::new("a.png", "shots/baseline")],
            addition: vec![ShotFile::new("c.png", "shots/current")],
        }
    }

    #[test]
    fn test_scenario() {
        let paths = paths();
        let destination = Destination::remote("proj", "build");
        let manifest = ComparisonManifestBuilder::new(&paths, &destination)
            .build(&scenario(), "https://cdn.example/proj/build")
            .unwrap();

        assert_eq!(manifest.comparisons.len(), 3);
        assert_eq!(manifest.uploads.len(), 5);

        let kinds: Vec<_> = manifest.comparisons.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![ComparisonType::Addition, ComparisonType::Deletion, ComparisonType::Difference]);

        let addition = &manifest.comparisons[0];
        assert_eq!(addition.after_image_url.as_deref(), Some("https://cdn.example/proj/build/c.after.png"));
        assert_eq!(addition.before_image_url, None);
        assert_eq!(addition.difference_image_url, None);
        assert_eq!(addition.path, Path::new("shots/baseline/c.png"));

        let deletion = &manifest.comparisons[1];
        assert_eq!(deletion.before_image_url.as_deref(), Some("https://cdn.example/proj/build/a.before.png"));
        assert_eq!(deletion.after_image_url, None);

        let difference = &manifest.comparisons[2];
        assert_eq!(difference.before_image_url.as_deref(), Some("https://cdn.example/proj/build/b.before.png"));
        assert_eq!(difference.after_image_url.as_deref(), Some("https://cdn.example/proj/build/b.after.png"));
        assert_eq!(
            difference.difference_image_url.as_deref(),
            Some("https://cdn.example/proj/build/b.difference.png")
        );

        let uploads: Vec<(&str, &Path)> =
            manifest.uploads.iter().map(|u| (u.upload_path.as_str(), u.file_path.as_path())).collect();
        assert_eq!(
            uploads,
            vec![
                ("proj/build/c.after.png", Path::new("shots/current/c.png")),
                ("proj/build/a.before.png", Path::new("shots/baseline/a.png")),
                ("proj/build/b.before.png", Path::new("shots/baseline/b.png")),
                ("proj/build/b.after.png", Path::new("shots/current/b.png")),
                ("proj/build/b.difference.png", Path::new("shots/difference/b.png")),
            ]
        );
        assert!(manifest.uploads[2..].iter().all(|u| u.meta_data.kind == ComparisonType::Difference));
    }

    #[test]
    fn test_custom_current_path() {
        let paths = paths();
        let destination = Destination::remote("p", "b");
        let changes = ChangeSet {
            difference: vec![
                ShotFile::new("x.png", "shots/difference").with_path_current(Some(PathBuf::from("custom/shots"))),
                ShotFile::new("y.png", "shots/difference").into(),
            ],
            ..ChangeSet::default()
        };
        let manifest = ComparisonManifestBuilder::new(&paths, &destination).build(&changes, "base").unwrap();
        assert_eq!(manifest.uploads[1].file_path, Path::new("custom/shots/x.png"));
        // No match in the current listing: falls back to the entry's own path.
        assert_eq!(manifest.uploads[4].file_path, Path::new("shots/difference/y.png"));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let paths = paths();
        let destination = Destination::remote("p", "b");
        let changes = ChangeSet {
            addition: vec![ShotFile::new("c.png", "shots/current")],
            ..ChangeSet::default()
        };
        let manifest = ComparisonManifestBuilder::new(&paths, &destination).build(&changes, "https://x/").unwrap();
        assert_eq!(manifest.comparisons[0].after_image_url.as_deref(), Some("https://x/c.after.png"));
    }

    #[test]
    fn test_upload_count_invariant() {
        let paths = paths();
        let destination = Destination::remote("p", "b");
        let changes = ChangeSet {
            difference: (0..4).map(|i| ShotFile::new(format!("d{i}.png"), "shots/difference").into()).collect(),
            deletion: (0..2).map(|i| ShotFile::new(format!("r{i}.png"), "shots/baseline")).collect(),
            addition: (0..3).map(|i| ShotFile::new(format!("a{i}.png"), "shots/current")).collect(),
        };
        let manifest = ComparisonManifestBuilder::new(&paths, &destination).build(&changes, "base").unwrap();
        assert_eq!(manifest.uploads.len(), 3 + 2 + 3 * 4);
        assert_eq!(manifest.uploads.len(), changes.upload_count());
        assert_eq!(manifest.comparisons.len(), 3 + 2 + 4);
    }

    #[test]
    fn test_generate_only() {
        let paths = paths();
        let destination = Destination::GenerateOnly;
        let builder = ComparisonManifestBuilder::new(&paths, &destination);
        let err = builder.build(&scenario(), "base").unwrap_err();
        assert!(matches!(&*err, ErrorKind::GenerateOnly));
        // Nothing to upload, nothing to refuse.
        assert_eq!(builder.build(&ChangeSet::default(), "base").unwrap(), Manifest::default());
    }

    #[test]
    fn test_nul_in_name_is_rejected() {
        let paths = paths();
        let destination = Destination::remote("p", "b");
        let changes = ChangeSet {
            addition: vec![ShotFile::new("bad\0name.png", "shots/current")],
            ..ChangeSet::default()
        };
        let err = ComparisonManifestBuilder::new(&paths, &destination).build(&changes, "u").unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPath(_)));
    }

    #[test]
    fn test_serialized_entry() {
        let paths = paths();
        let destination = Destination::remote("p", "b");
        let changes = ChangeSet {
            deletion: vec![ShotFile::new("a.png", "shots/baseline")],
            ..ChangeSet::default()
        };
        let manifest = ComparisonManifestBuilder::new(&paths, &destination).build(&changes, "u").unwrap();
        let (comparisons, _): (Vec<ComparisonEntry>, Vec<UploadDescriptor>) = manifest.into();
        assert_eq!(
            serde_json::to_value(&comparisons[0]).unwrap(),
            serde_json::json!({
                "type": "DELETION",
                "beforeImageUrl": "u/a.before.png",
                "path": "shots/baseline/a.png",
                "name": "a.png",
            })
        );
    }
}
