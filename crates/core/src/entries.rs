//! Normalization of raw listing names into display identities.

use std::cmp::Ordering;

/// Strip a leading `[type] ` marker (e.g. `[file] song.pdf`).
///
/// Names that start with `[` but have no `] ` separator are returned as-is.
pub fn strip_type_indicator(entry: &str) -> &str {
    if !entry.starts_with('[') {
        return entry;
    }
    match entry.split_once("] ") {
        Some((_, rest)) => rest,
        None => entry,
    }
}

/// Remove `suffix` from the end of `entry` (literal, case-sensitive).
pub fn strip_suffix<'a>(entry: &'a str, suffix: Option<&str>) -> &'a str {
    match suffix.filter(|s| !s.is_empty()) {
        Some(suffix) => entry.strip_suffix(suffix).unwrap_or(entry),
        None => entry,
    }
}

/// True when `entry` contains any non-empty exclusion substring.
pub fn contains_any_substring(entry: &str, exclusions: &[String]) -> bool {
    exclusions
        .iter()
        .filter(|needle| !needle.is_empty())
        .any(|needle| entry.contains(needle.as_str()))
}

/// Case-insensitive ordering used for every rendered list and summary.
pub fn cmp_identity(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Turn raw instrument listing names into sorted display identities.
///
/// Per entry: strip the type marker, strip `suffix`, then drop it if it
/// contains an exclusion. Survivors are sorted case-insensitively (stable).
pub fn process(raw_names: &[String], suffix: Option<&str>, exclusions: &[String]) -> Vec<String> {
    let mut processed: Vec<String> = raw_names
        .iter()
        .map(|raw| strip_suffix(strip_type_indicator(raw), suffix))
        .filter(|display| !contains_any_substring(display, exclusions))
        .map(str::to_string)
        .collect();
    processed.sort_by(|a, b| cmp_identity(a, b));
    processed
}

/// Library names only get the configured suffix removed; listing order is kept.
///
/// Names that strip to the same identity stay as separate rows. They share one
/// entry in the selected set, so toggling either row marks both.
pub fn process_library(raw_names: &[String], suffix: Option<&str>) -> Vec<String> {
    raw_names
        .iter()
        .map(|raw| strip_suffix(raw, suffix).to_string())
        .collect()
}
