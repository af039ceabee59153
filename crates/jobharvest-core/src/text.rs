//! Text preparation shared by the classifiers and the exclusion filter.

use crate::models::NOT_AVAILABLE;

/// Lower-case a description for pattern scans.
///
/// Returns `None` for absent, blank or sentinel (`"N/A"`) input, which the
/// classifiers map straight to their own `N/A` label.
pub fn normalize(text: Option<&str>) -> Option<String> {
    let text = text?.trim();
    if text.is_empty() || text == NOT_AVAILABLE {
        return None;
    }
    Some(text.to_lowercase())
}

/// Case-insensitive substring test.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
