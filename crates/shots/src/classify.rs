//! Change classification.
//!
//! Partitions a run's screenshots into additions, deletions and differences
//! from three directory listings. The result only depends on the listings'
//! contents, never on the order the filesystem enumerated them in.

use crate::models::{ChangeSet, ExtendedShotFile, ShotFile, ShotListing};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use tracing::instrument;

/// Classifies every screenshot of a run.
///
/// - **deletion**: baseline names absent from the current listing.
/// - **addition**: current names absent from the baseline listing.
/// - **difference**: the externally supplied difference listing, each entry
///   enriched with the directory of the current shot with the same name
///   (`None` when there is no such shot).
///
/// Each list is sorted by name (byte-wise).
///
/// # Preconditions
/// The difference listing is expected to be disjoint from the derived
/// additions and deletions: a changed shot exists in both baseline and
/// current. This is not enforced. A name that breaks the contract is kept in
/// every category it qualifies for, and a warning is logged.
#[instrument(skip_all, fields(
    baseline = listing.baseline.len(),
    current = listing.current.len(),
    difference = listing.difference.len()
))]
pub fn classify(listing: &ShotListing) -> ChangeSet {
    let baseline: HashSet<&str> = listing.baseline.iter().map(|f| f.name.as_str()).collect();
    let mut current: HashMap<&str, &PathBuf> = HashMap::with_capacity(listing.current.len());
    for file in &listing.current {
        // First match wins, same as a linear search of the listing.
        current.entry(file.name.as_str()).or_insert(&file.path);
    }

    let mut deletion: Vec<ShotFile> =
        listing.baseline.iter().filter(|file| !current.contains_key(file.name.as_str())).cloned().collect();
    let mut addition: Vec<ShotFile> =
        listing.current.iter().filter(|file| !baseline.contains(file.name.as_str())).cloned().collect();
    let mut difference: Vec<ExtendedShotFile> = listing
        .difference
        .iter()
        .map(|file| {
            let path_current = current.get(file.name.as_str()).map(|path| (*path).clone());
            file.clone().with_path_current(path_current)
        })
        .collect();

    deletion.sort_by(|a, b| a.name.cmp(&b.name));
    addition.sort_by(|a, b| a.name.cmp(&b.name));
    difference.sort_by(|a, b| a.name.cmp(&b.name));

    let changes = ChangeSet {
        difference,
        deletion,
        addition,
    };
    warn_on_overlap(&changes);
    tracing::debug!(
        additions = changes.addition.len(),
        deletions = changes.deletion.len(),
        differences = changes.difference.len(),
        "Classified shots"
    );
    changes
}

fn warn_on_overlap(changes: &ChangeSet) {
    let derived: HashSet<&str> =
        changes.addition.iter().chain(changes.deletion.iter()).map(|f| f.name.as_str()).collect();
    for file in changes.difference.iter().filter(|f| derived.contains(f.name.as_str())) {
        tracing::warn!(name = %file.name, "Shot is marked as different but is missing from baseline or current");
    }
}
