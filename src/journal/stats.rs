//! Measurement series and terminal charts
//!
//! The browsing view's chart, expressed CLI-natively: extract one
//! measurement across an experiment's entries, summarize it, and render a
//! horizontal bar per entry.

use chrono::NaiveDate;

use super::types::Entry;

/// Which measurement to chart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Ph,
    Ec,
    WaterTemp,
}

impl Metric {
    pub fn unit(&self) -> &'static str {
        match self {
            Metric::Ph => "",
            Metric::Ec => "mS/cm",
            Metric::WaterTemp => "°C",
        }
    }

    fn extract(&self, entry: &Entry) -> Option<f64> {
        let m = entry.measurements.as_ref()?;
        match self {
            Metric::Ph => m.ph,
            Metric::Ec => m.ec,
            Metric::WaterTemp => m.water_temp,
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Metric::Ph => write!(f, "ph"),
            Metric::Ec => write!(f, "ec"),
            Metric::WaterTemp => write!(f, "water-temp"),
        }
    }
}

impl std::str::FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ph" => Ok(Metric::Ph),
            "ec" => Ok(Metric::Ec),
            "water-temp" | "water_temp" | "temp" => Ok(Metric::WaterTemp),
            other => Err(format!(
                "unknown metric: {} (expected ph, ec, or water-temp)",
                other
            )),
        }
    }
}

/// Extract one measurement across entries, in entry order.
///
/// Entries without the measurement are skipped, not zeroed.
pub fn series(entries: &[(String, Entry)], metric: Metric) -> Vec<(NaiveDate, f64)> {
    entries
        .iter()
        .filter_map(|(_, entry)| metric.extract(entry).map(|v| (entry.date, v)))
        .collect()
}

/// Summary statistics over a measurement series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub latest: f64,
}

/// Summarize a series; None when it is empty
pub fn summarize(series: &[(NaiveDate, f64)]) -> Option<Summary> {
    let (_, latest) = *series.last()?;
    let values: Vec<f64> = series.iter().map(|(_, v)| *v).collect();
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let mean = values.iter().sum::<f64>() / values.len() as f64;

    Some(Summary {
        count: values.len(),
        min,
        max,
        mean,
        latest,
    })
}

/// Render a series as one horizontal bar per reading.
///
/// Bars are scaled between the series minimum and maximum so small drifts
/// (a pH creeping from 5.8 to 6.4) stay visible.
pub fn render_chart(series: &[(NaiveDate, f64)], width: usize) -> String {
    let Some(summary) = summarize(series) else {
        return "(no readings)\n".to_string();
    };

    let width = width.max(1);
    let span = summary.max - summary.min;
    let mut out = String::new();
    for (date, value) in series {
        let filled = if span.abs() < f64::EPSILON {
            width
        } else {
            // At least one cell so the minimum is still a visible bar
            (((value - summary.min) / span * (width - 1) as f64).round() as usize) + 1
        };
        out.push_str(&format!(
            "{}  {:>7.2}  {}\n",
            date.format("%Y-%m-%d"),
            value,
            "█".repeat(filled)
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::types::Measurements;

    fn entry(date: &str, ph: Option<f64>) -> (String, Entry) {
        let d: NaiveDate = date.parse().unwrap();
        (
            format!("{}.json", date),
            Entry::new(d).measurements(Measurements {
                ph,
                ec: None,
                water_temp: None,
            }),
        )
    }

    #[test]
    fn test_series_skips_missing_measurements() {
        let entries = vec![
            entry("2026-08-24", Some(5.8)),
            entry("2026-08-25", None),
            entry("2026-08-26", Some(6.1)),
        ];
        let s = series(&entries, Metric::Ph);
        assert_eq!(s.len(), 2);
        assert_eq!(s[0].1, 5.8);
        assert_eq!(s[1].1, 6.1);
    }

    #[test]
    fn test_summary() {
        let s = vec![
            ("2026-08-24".parse().unwrap(), 5.8),
            ("2026-08-25".parse().unwrap(), 6.0),
            ("2026-08-26".parse().unwrap(), 6.4),
        ];
        let summary = summarize(&s).unwrap();
        assert_eq!(summary.count, 3);
        assert_eq!(summary.min, 5.8);
        assert_eq!(summary.max, 6.4);
        assert!((summary.mean - 6.0667).abs() < 0.001);
        assert_eq!(summary.latest, 6.4);
    }

    #[test]
    fn test_empty_series_summary() {
        assert!(summarize(&[]).is_none());
        assert_eq!(render_chart(&[], 40), "(no readings)\n");
    }

    #[test]
    fn test_chart_scales_between_min_and_max() {
        let s = vec![
            ("2026-08-24".parse().unwrap(), 5.0),
            ("2026-08-26".parse().unwrap(), 7.0),
        ];
        let chart = render_chart(&s, 10);
        let lines: Vec<&str> = chart.lines().collect();
        assert_eq!(lines.len(), 2);
        // Minimum gets one cell, maximum the full width
        assert_eq!(lines[0].matches('█').count(), 1);
        assert_eq!(lines[1].matches('█').count(), 10);
    }

    #[test]
    fn test_chart_flat_series() {
        let s = vec![
            ("2026-08-24".parse().unwrap(), 6.0),
            ("2026-08-25".parse().unwrap(), 6.0),
        ];
        let chart = render_chart(&s, 8);
        for line in chart.lines() {
            assert_eq!(line.matches('█').count(), 8);
        }
    }

    #[test]
    fn test_metric_parsing() {
        assert_eq!("ph".parse::<Metric>().unwrap(), Metric::Ph);
        assert_eq!("EC".parse::<Metric>().unwrap(), Metric::Ec);
        assert_eq!("water-temp".parse::<Metric>().unwrap(), Metric::WaterTemp);
        assert_eq!("temp".parse::<Metric>().unwrap(), Metric::WaterTemp);
        assert!("humidity".parse::<Metric>().is_err());
    }
}
