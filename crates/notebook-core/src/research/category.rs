//! Category assignment: producer label -> notebook key.

/// Notebook used when the producer gives no usable category.
pub const FALLBACK_CATEGORY: &str = "general";

/// Normalizes a producer-supplied category into a notebook key.
///
/// Trims, lowercases and joins inner whitespace runs with `-`. Absent or blank
/// labels map to [`FALLBACK_CATEGORY`].
pub fn assign_category(label: Option<&str>) -> String {
    let words: Vec<String> = label
        .unwrap_or("")
        .split_whitespace()
        .map(str::to_lowercase)
        .collect();
    if words.is_empty() {
        FALLBACK_CATEGORY.to_string()
    } else {
        words.join("-")
    }
}
