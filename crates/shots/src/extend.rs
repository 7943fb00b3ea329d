//! Variant filenames.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// One of the three rendered roles of a screenshot in a difference report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// The baseline screenshot.
    Before,
    /// The current screenshot.
    After,
    /// The visual delta image.
    Difference,
}
impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Before => "before",
            Variant::After => "after",
            Variant::Difference => "difference",
        }
    }
}
impl Display for Variant {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Derives the filename of a variant by inserting the variant tag as the
/// second-to-last dot-segment.
///
/// Empty segments are dropped first, so leading, trailing and doubled dots
/// disappear. Downstream tooling looks for the tag in that exact position.
///
/// | segments | result |
/// |---|---|
/// | none | `<tag>` |
/// | one | `<tag>.<name>` |
/// | two or more | `<stem>.<tag>.<ext>` |
///
/// # Examples
///
/// ```
/// use shotdiff_shots::{Variant, extend_file_name};
///
/// assert_eq!(extend_file_name("photo.png", Variant::After), "photo.after.png");
/// assert_eq!(extend_file_name("noext", Variant::Before), "before.noext");
/// assert_eq!(extend_file_name("", Variant::Difference), "difference");
/// ```
pub fn extend_file_name(file_name: &str, variant: Variant) -> String {
    let mut parts: Vec<&str> = file_name.split('.').filter(|part| !part.is_empty()).collect();
    match parts.len() {
        0 => variant.to_string(),
        1 => format!("{variant}.{}", parts[0]),
        _ => {
            let extension = parts.pop().unwrap_or_default();
            format!("{}.{variant}.{extension}", parts.join("."))
        },
    }
}
