//! Core data types for the grow journal
//!
//! These structs mirror the JSON documents stored in the repository:
//! - `ExperimentList`: the single shared `experiments.json`
//! - `Entry`: one document per journal entry, named by date
//! - `EntryIndex`: the per-experiment manifest of entry filenames

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Lifecycle status of an experiment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExperimentStatus {
    /// Currently growing
    Active,
    /// Harvested or otherwise finished
    Completed,
    /// On hold (e.g. system maintenance)
    Paused,
    /// Ended early without a harvest
    Abandoned,
}

impl ExperimentStatus {
    /// Get all statuses for iteration
    pub fn all() -> &'static [ExperimentStatus] {
        &[
            ExperimentStatus::Active,
            ExperimentStatus::Completed,
            ExperimentStatus::Paused,
            ExperimentStatus::Abandoned,
        ]
    }
}

impl std::fmt::Display for ExperimentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExperimentStatus::Active => write!(f, "active"),
            ExperimentStatus::Completed => write!(f, "completed"),
            ExperimentStatus::Paused => write!(f, "paused"),
            ExperimentStatus::Abandoned => write!(f, "abandoned"),
        }
    }
}

impl std::str::FromStr for ExperimentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(ExperimentStatus::Active),
            "completed" => Ok(ExperimentStatus::Completed),
            "paused" => Ok(ExperimentStatus::Paused),
            "abandoned" => Ok(ExperimentStatus::Abandoned),
            other => Err(format!("unknown status: {}", other)),
        }
    }
}

/// One hydroponics experiment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Experiment {
    /// URL- and path-safe identifier (also the data directory name)
    pub slug: String,
    /// Display name
    pub name: String,
    /// Free-text description
    #[serde(default)]
    pub description: String,
    /// Date the experiment was started
    pub started: NaiveDate,
    pub status: ExperimentStatus,
}

/// The shared metadata document listing all experiments.
///
/// Mutated only by appending; entries never move between experiments.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExperimentList {
    #[serde(default)]
    pub experiments: Vec<Experiment>,
}

impl ExperimentList {
    pub fn find(&self, slug: &str) -> Option<&Experiment> {
        self.experiments.iter().find(|e| e.slug == slug)
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.find(slug).is_some()
    }
}

/// Water measurements taken with an entry
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Measurements {
    /// Acidity (unitless)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ph: Option<f64>,
    /// Electrical conductivity in mS/cm
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ec: Option<f64>,
    /// Water temperature in degrees Celsius
    #[serde(skip_serializing_if = "Option::is_none")]
    pub water_temp: Option<f64>,
}

impl Measurements {
    pub fn is_empty(&self) -> bool {
        self.ph.is_none() && self.ec.is_none() && self.water_temp.is_none()
    }
}

/// One journal entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entry {
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveTime>,
    /// Free-text observations
    #[serde(default)]
    pub notes: String,
    /// Photo paths relative to the experiment directory
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub photos: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measurements: Option<Measurements>,
}

impl Entry {
    /// Create an entry for the given date with empty notes
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            time: None,
            notes: String::new(),
            photos: Vec::new(),
            measurements: None,
        }
    }

    /// Builder method: set the time of day
    pub fn time(mut self, time: NaiveTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Builder method: set the notes text
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Builder method: attach measurements (dropped again when all-empty)
    pub fn measurements(mut self, m: Measurements) -> Self {
        self.measurements = if m.is_empty() { None } else { Some(m) };
        self
    }
}

/// Per-experiment manifest of entry filenames.
///
/// The system's sole integrity invariant: every filename listed here must
/// correspond to an existing entry document and vice versa. Submissions
/// therefore always write the entry and the updated index in one commit.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EntryIndex {
    #[serde(default)]
    pub entries: Vec<String>,
}

impl EntryIndex {
    pub fn contains(&self, filename: &str) -> bool {
        self.entries.iter().any(|e| e == filename)
    }

    /// Merge a freshly claimed filename into the index: dedup and sort.
    ///
    /// The caller re-reads the index at the current head right before
    /// committing, so a same-day submission that already landed keeps its
    /// line (read-modify-write, not overwrite).
    pub fn merged_with(&self, filename: &str) -> EntryIndex {
        let mut entries = self.entries.clone();
        if !self.contains(filename) {
            entries.push(filename.to_string());
        }
        entries.sort();
        entries.dedup();
        EntryIndex { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_status_roundtrip() {
        for status in ExperimentStatus::all() {
            let parsed: ExperimentStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, *status);
        }
        assert!("harvesting".parse::<ExperimentStatus>().is_err());
    }

    #[test]
    fn test_entry_json_omits_absent_fields() {
        let entry = Entry::new(date("2026-08-26")).notes("roots look healthy");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["date"], "2026-08-26");
        assert_eq!(json["notes"], "roots look healthy");
        assert!(json.get("time").is_none());
        assert!(json.get("photos").is_none());
        assert!(json.get("measurements").is_none());
    }

    #[test]
    fn test_entry_with_measurements() {
        let entry = Entry::new(date("2026-08-26")).measurements(Measurements {
            ph: Some(5.9),
            ec: Some(1.4),
            water_temp: None,
        });
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["measurements"]["ph"], 5.9);
        assert!(json["measurements"].get("water_temp").is_none());
    }

    #[test]
    fn test_all_empty_measurements_dropped() {
        let entry = Entry::new(date("2026-08-26")).measurements(Measurements::default());
        assert!(entry.measurements.is_none());
    }

    #[test]
    fn test_entry_parses_minimal_document() {
        // Documents written by older clients carry only date and notes
        let entry: Entry =
            serde_json::from_str(r#"{ "date": "2026-01-02", "notes": "topped up" }"#).unwrap();
        assert_eq!(entry.date, date("2026-01-02"));
        assert!(entry.photos.is_empty());
    }

    #[test]
    fn test_index_merge_dedups_and_sorts() {
        let index = EntryIndex {
            entries: vec!["2026-08-25.json".into(), "2026-08-26.json".into()],
        };

        let merged = index.merged_with("2026-08-26-2.json");
        assert_eq!(
            merged.entries,
            vec![
                "2026-08-25.json",
                "2026-08-26-2.json",
                "2026-08-26.json"
            ]
        );

        // Re-merging an existing filename changes nothing
        let again = merged.merged_with("2026-08-26.json");
        assert_eq!(again, merged);
    }

    #[test]
    fn test_experiment_list_lookup() {
        let list = ExperimentList {
            experiments: vec![Experiment {
                slug: "basil-dwc".into(),
                name: "Basil (DWC)".into(),
                description: String::new(),
                started: date("2026-07-01"),
                status: ExperimentStatus::Active,
            }],
        };
        assert!(list.contains("basil-dwc"));
        assert!(!list.contains("lettuce"));
    }
}
