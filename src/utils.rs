/// Utility helpers for UTrippin Imagery

/// Create a simple slug from a string suitable for URLs and element ids.
/// Lowercases the string, converts groups of non-alphanumeric chars to single hyphens,
/// and trims leading/trailing hyphens.
pub fn slugify<S: AsRef<str>>(s: S) -> String {
    let s = s.as_ref().to_lowercase();
    let mut out = String::with_capacity(s.len());
    let mut prev_dash = false;

    for ch in s.chars() {
        if ch.is_alphanumeric() {
            out.push(ch);
            prev_dash = false;
        } else if !prev_dash {
            out.push('-');
            prev_dash = true;
        }
    }

    out.trim_matches('-').to_string()
}

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn compact_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalized destination used for cache keys: lowercase, whitespace runs
/// replaced by a single underscore.
pub fn normalize_destination(destination: &str) -> String {
    destination
        .split_whitespace()
        .map(|segment| segment.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Lowercased, whitespace-compacted text for substring matching.
pub fn normalize_for_match(value: &str) -> String {
    compact_whitespace(value).to_lowercase()
}
