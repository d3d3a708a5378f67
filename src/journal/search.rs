//! Search-as-filter over fetched entries
//!
//! The browsing view's search box: a case-insensitive substring match over
//! notes and the entry date. No index, no ranking; entries are few enough
//! that a linear scan over the already fetched list is the whole feature.

use super::types::Entry;

/// Filter entries whose notes or filename match the query.
///
/// An empty query matches everything.
pub fn filter_entries<'a>(
    entries: &'a [(String, Entry)],
    query: &str,
) -> Vec<&'a (String, Entry)> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return entries.iter().collect();
    }

    entries
        .iter()
        .filter(|(filename, entry)| {
            filename.to_lowercase().contains(&needle)
                || entry.notes.to_lowercase().contains(&needle)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entry(date: &str, notes: &str) -> (String, Entry) {
        let d: NaiveDate = date.parse().unwrap();
        (
            format!("{}.json", date),
            Entry::new(d).notes(notes),
        )
    }

    #[test]
    fn test_matches_notes_case_insensitively() {
        let entries = vec![
            entry("2026-08-25", "Topped up nutrients, EC drifting"),
            entry("2026-08-26", "pruned lower leaves"),
        ];

        let hits = filter_entries(&entries, "NUTRIENTS");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, "2026-08-25.json");
    }

    #[test]
    fn test_matches_filename_date() {
        let entries = vec![
            entry("2026-07-30", "first roots"),
            entry("2026-08-26", "flowering"),
        ];

        let hits = filter_entries(&entries, "2026-08");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, "2026-08-26.json");
    }

    #[test]
    fn test_empty_query_matches_all() {
        let entries = vec![entry("2026-08-25", "a"), entry("2026-08-26", "b")];
        assert_eq!(filter_entries(&entries, "  ").len(), 2);
    }

    #[test]
    fn test_no_matches() {
        let entries = vec![entry("2026-08-25", "healthy")];
        assert!(filter_entries(&entries, "aphids").is_empty());
    }
}
