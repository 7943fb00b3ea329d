//! Screenshot change classification and artifact manifests.
//!
//! Given the baseline, current and difference screenshot directories of a
//! visual-regression run, this crate:
//!
//! 1. lists the screenshots in each directory ([`list_shots`]),
//! 2. classifies every screenshot as an addition, deletion or difference
//!    ([`classify`]), and
//! 3. builds the report-facing comparison manifest and the transport-facing
//!    upload manifest ([`ComparisonManifestBuilder`]).
//!
//! Capturing screenshots, computing pixel differences and performing the
//! uploads all happen elsewhere. Everything here is a pure function of its
//! inputs except the directory listing and [`folders`] housekeeping.
//!
//! # Example
//!
//! ```
//! use shotdiff_shots::{ComparisonManifestBuilder, Destination, ShotFile, ShotListing, ShotPaths, classify};
//!
//! let paths = ShotPaths::new("baseline", "current", "difference");
//! let listing = ShotListing {
//!     baseline: vec![ShotFile::new("a.png", "baseline"), ShotFile::new("b.png", "baseline")],
//!     current: vec![ShotFile::new("b.png", "current"), ShotFile::new("c.png", "current")],
//!     difference: vec![ShotFile::new("b.png", "difference")],
//! };
//! let changes = classify(&listing);
//! let destination = Destination::remote("project", "build");
//! let manifest = ComparisonManifestBuilder::new(&paths, &destination)
//!     .build(&changes, "https://example.com/project/build")
//!     .unwrap();
//! assert_eq!(manifest.comparisons.len(), 3);
//! assert_eq!(manifest.uploads.len(), 5);
//! ```

mod classify;
mod collect;
pub mod error;
mod extend;
pub mod folders;
pub mod items;
mod manifest;
mod models;
mod path;
mod upload;

pub use crate::classify::classify;
pub use crate::collect::{SHOT_EXTENSION, list_shots};
pub use crate::extend::{Variant, extend_file_name};
pub use crate::manifest::{ComparisonEntry, ComparisonManifestBuilder, Manifest};
pub use crate::models::{ChangeSet, ComparisonType, ExtendedShotFile, ShotFile, ShotListing, ShotPaths};
pub use crate::path::normalize as normalize_path;
pub use crate::upload::{Destination, UploadDescriptor, UploadItemFactory, UploadMetadata};
