//! Lexical path normalization.
//!
//! Shot directories come from configuration and are frequently relative
//! (`.shotdiff/baseline/`), so paths are resolved purely lexically: nothing
//! here touches the filesystem or follows symlinks.

use crate::error::{ErrorKind, Result};
use std::path::{Component, Path, PathBuf};

/// Normalizes a path by collapsing `.` segments, duplicate and trailing
/// separators, and resolving `..` against preceding segments.
///
/// Unlike a storage-root check, leading `..` segments on a relative path are
/// preserved (`a/../../b` becomes `../b`), and `..` directly beneath the root
/// is dropped. A path that normalizes to nothing becomes `.`.
///
/// > **Note:** Null bytes are explicitly rejected; they pass through
/// >           `Path::components()` on Unix but truncate C-based syscalls.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use shotdiff_shots::normalize_path;
///
/// assert_eq!(normalize_path("shots/baseline/../.gitignore").unwrap(), Path::new("shots/.gitignore"));
/// assert_eq!(normalize_path("baseline/../../.gitignore").unwrap(), Path::new("../.gitignore"));
/// assert_eq!(normalize_path("./").unwrap(), Path::new("."));
/// assert!(normalize_path("a\0b").is_err());
/// ```
pub fn normalize(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let mut prefix = PathBuf::new();
    let mut components: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(s) => {
                if s.as_encoded_bytes().contains(&0) {
                    exn::bail!(ErrorKind::InvalidPath(path.to_path_buf()));
                }
                components.push(component);
            },
            Component::CurDir => {},
            Component::Prefix(_) | Component::RootDir => prefix.push(component),
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                },
                // Can't go above the root.
                _ if prefix.has_root() => {},
                _ => components.push(component),
            },
        }
    }
    let mut normalized = prefix;
    normalized.extend(components);
    Ok(match normalized.as_os_str().is_empty() {
        true => PathBuf::from("."),
        false => normalized,
    })
}
