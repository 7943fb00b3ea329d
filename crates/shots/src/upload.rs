//! Upload descriptors.
//!
//! An [`UploadDescriptor`] tells the transport layer which local file to put
//! where in remote storage, and with which object metadata. Building one
//! presupposes a remote destination, so the [`UploadItemFactory`] refuses to
//! work in generate-only mode.

use crate::error::{ErrorKind, Result};
use crate::models::ComparisonType;
use crate::path::normalize;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONTENT_TYPE: &str = "image/png";
pub const PUBLIC_READ: &str = "public-read";

/// Where a run's artifacts are headed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Baselines are generated locally; nothing is compared or uploaded.
    GenerateOnly,
    /// Artifacts are uploaded under `<project_id>/<build_id>/`.
    Remote { project_id: String, build_id: String },
}
impl Destination {
    pub fn remote(project_id: impl Into<String>, build_id: impl Into<String>) -> Self {
        Self::Remote {
            project_id: project_id.into(),
            build_id: build_id.into(),
        }
    }

    pub fn is_generate_only(&self) -> bool {
        matches!(self, Self::GenerateOnly)
    }
}

/// Object metadata attached to an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadMetadata {
    #[serde(rename = "content-type")]
    pub content_type: String,
    #[serde(rename = "x-amz-acl")]
    pub acl: String,
    #[serde(rename = "type")]
    pub kind: ComparisonType,
    /// Echo of the local source path.
    pub original: PathBuf,
}

/// One file to transfer to remote storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadDescriptor {
    /// `<project_id>/<build_id>/<variant filename>`, unique across runs and
    /// projects.
    pub upload_path: String,
    /// Local source path.
    pub file_path: PathBuf,
    pub meta_data: UploadMetadata,
}

/// Builds [`UploadDescriptor`]s for a configured [`Destination`].
#[derive(Debug, Clone, Copy)]
pub struct UploadItemFactory<'a> {
    destination: &'a Destination,
}
impl<'a> UploadItemFactory<'a> {
    pub fn new(destination: &'a Destination) -> Self {
        Self { destination }
    }

    /// Describes the upload of `dir/file_name` as `upload_file_name`.
    ///
    /// # Errors
    /// - [`ErrorKind::GenerateOnly`] when the destination is
    ///   [`Destination::GenerateOnly`]. Callers must not recover from this;
    ///   it means the run was wired up wrong.
    /// - [`ErrorKind::InvalidPath`] when the local path contains a null byte.
    pub fn create(
        &self,
        upload_file_name: &str,
        dir: &Path,
        file_name: &str,
        kind: ComparisonType,
    ) -> Result<UploadDescriptor> {
        let Destination::Remote { project_id, build_id } = self.destination else {
            exn::bail!(ErrorKind::GenerateOnly);
        };
        let file_path = normalize(dir.join(file_name))?;
        Ok(UploadDescriptor {
            upload_path: upload_key(project_id, build_id, upload_file_name),
            file_path: file_path.clone(),
            meta_data: UploadMetadata {
                content_type: CONTENT_TYPE.to_string(),
                acl: PUBLIC_READ.to_string(),
                kind,
                original: file_path,
            },
        })
    }
}

/// Remote keys are always `/`-separated, regardless of platform.
fn upload_key(project_id: &str, build_id: &str, file_name: &str) -> String {
    [project_id, build_id, file_name]
        .iter()
        .map(|segment| segment.trim_matches('/'))
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}
