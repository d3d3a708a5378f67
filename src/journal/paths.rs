//! Repository data layout
//!
//! All journal data lives under `data/` in the remote repository:
//!
//! ```text
//! data/experiments.json             shared experiment list
//! data/<slug>/index.json            per-experiment entry manifest
//! data/<slug>/2026-08-26.json       one document per entry
//! data/<slug>/2026-08-26-2.json     same-day collision suffix
//! data/<slug>/photos/2026-08-26-1.jpg
//! ```

use chrono::NaiveDate;

use super::types::EntryIndex;

/// Path of the shared experiment list document
pub const EXPERIMENTS_FILE: &str = "data/experiments.json";

/// Path of an experiment's entry index
pub fn index_path(slug: &str) -> String {
    format!("data/{}/index.json", slug)
}

/// Full repository path of an entry document
pub fn entry_path(slug: &str, filename: &str) -> String {
    format!("data/{}/{}", slug, filename)
}

/// Full repository path of a photo, given its entry-relative path
pub fn photo_path(slug: &str, relative: &str) -> String {
    format!("data/{}/{}", slug, relative)
}

/// Entry filename for a date and collision ordinal (1 = no suffix)
pub fn entry_filename(date: NaiveDate, ordinal: u32) -> String {
    if ordinal <= 1 {
        format!("{}.json", date.format("%Y-%m-%d"))
    } else {
        format!("{}-{}.json", date.format("%Y-%m-%d"), ordinal)
    }
}

/// Compute the next free entry filename for a date against the index.
///
/// The index must have been read at the current head; the scan walks the
/// ordinals until it finds one the index does not claim.
pub fn next_entry_filename(index: &EntryIndex, date: NaiveDate) -> String {
    let mut ordinal = 1;
    loop {
        let candidate = entry_filename(date, ordinal);
        if !index.contains(&candidate) {
            return candidate;
        }
        ordinal += 1;
    }
}

/// Entry filename without its `.json` extension (used to name photos)
pub fn entry_stem(filename: &str) -> &str {
    filename.strip_suffix(".json").unwrap_or(filename)
}

/// The date baked into an entry filename, if it parses
pub fn parse_entry_date(filename: &str) -> Option<NaiveDate> {
    let stem = entry_stem(filename);
    // get() rather than a byte slice: a filename with a multi-byte
    // character around position 10 must come back None, not panic.
    let date_part = stem.get(..10).unwrap_or(stem);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Sort key for listing entries: date, then collision ordinal, then the
/// raw filename for anything that does not parse as a dated entry.
/// Lexicographic order alone puts `2026-08-26-2.json` before
/// `2026-08-26.json`, because `-` sorts below `.`.
pub fn entry_sort_key(filename: &str) -> (Option<NaiveDate>, u32, String) {
    let stem = entry_stem(filename);
    let date = parse_entry_date(filename);
    let ordinal = if date.is_some() {
        stem.get(11..)
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(1)
    } else {
        1
    };
    (date, ordinal, filename.to_string())
}

/// Check that a slug is safe to use as a path segment: non-empty,
/// lowercase ASCII letters, digits, and hyphens, not starting or ending
/// with a hyphen.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
