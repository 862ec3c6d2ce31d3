use chrono::NaiveDate;
use serde::Serialize;

use super::model::{Event, NormalizedRecordSet};

// ---------------------------------------------------------------------------
// Summary statistics
// ---------------------------------------------------------------------------

/// Row count and observed ranges, shown in the side panel and used as filter defaults.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub rows: usize,
    /// `None` when no magnitude column matched or every value was missing.
    pub magnitude_range: Option<(f64, f64)>,
    /// UTC calendar dates; `None` when no time column matched or nothing parsed.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

impl Summary {
    pub fn of(dataset: &NormalizedRecordSet) -> Self {
        let magnitude_range = dataset
            .events
            .iter()
            .filter_map(|e| e.magnitude)
            .fold(None, |acc: Option<(f64, f64)>, m| match acc {
                None => Some((m, m)),
                Some((lo, hi)) => Some((lo.min(m), hi.max(m))),
            });
        let date_range = dataset
            .events
            .iter()
            .filter_map(event_date)
            .fold(None, |acc: Option<(NaiveDate, NaiveDate)>, d| match acc {
                None => Some((d, d)),
                Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
            });
        Self {
            rows: dataset.len(),
            magnitude_range,
            date_range,
        }
    }

    /// Side panel lines, magnitudes to two decimals.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!("Rows loaded: {}", self.rows)];
        if let Some((lo, hi)) = self.magnitude_range {
            lines.push(format!("Magnitude range: {lo:.2} – {hi:.2}"));
        }
        if let Some((start, end)) = self.date_range {
            lines.push(format!("Date range: {start} – {end}"));
        }
        lines
    }

    /// Criteria that let every row through.
    pub fn full_range(&self) -> FilterCriteria {
        FilterCriteria {
            magnitude: self.magnitude_range,
            dates: self.date_range,
        }
    }
}

fn event_date(event: &Event) -> Option<NaiveDate> {
    event.time.map(|t| t.date_naive())
}

// ---------------------------------------------------------------------------
// Filter criteria
// ---------------------------------------------------------------------------

/// Inclusive bounds chosen by the user. A `None` range imposes no constraint.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FilterCriteria {
    pub magnitude: Option<(f64, f64)>,
    pub dates: Option<(NaiveDate, NaiveDate)>,
}

impl FilterCriteria {
    /// An event passes when it satisfies every active range.
    /// A missing value never satisfies an active range.
    pub fn matches(&self, event: &Event) -> bool {
        let magnitude_ok = match self.magnitude {
            None => true,
            Some((lo, hi)) => event.magnitude.is_some_and(|m| lo <= m && m <= hi),
        };
        let date_ok = match self.dates {
            None => true,
            Some((start, end)) => event_date(event).is_some_and(|d| start <= d && d <= end),
        };
        magnitude_ok && date_ok
    }

    /// Pull the bounds back into the observed ranges and put them in order.
    /// Ranges the summary doesn't have are switched off.
    pub fn clamped_to(&self, summary: &Summary) -> Self {
        let magnitude = summary.magnitude_range.and_then(|(min, max)| {
            let (lo, hi) = self.magnitude?;
            let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
            Some((lo.clamp(min, max), hi.clamp(min, max)))
        });
        let dates = summary.date_range.and_then(|(min, max)| {
            let (start, end) = self.dates?;
            let (start, end) = if start <= end { (start, end) } else { (end, start) };
            Some((start.clamp(min, max), end.clamp(min, max)))
        });
        Self { magnitude, dates }
    }
}

// ---------------------------------------------------------------------------
// Filtered view
// ---------------------------------------------------------------------------

/// Return indices of events that pass `criteria`.
pub fn filtered_indices(dataset: &NormalizedRecordSet, criteria: &FilterCriteria) -> Vec<usize> {
    dataset
        .events
        .iter()
        .enumerate()
        .filter(|(_, ev)| criteria.matches(ev))
        .map(|(i, _)| i)
        .collect()
}

/// Subset of a dataset; empty is a valid state ("no events to show").
#[derive(Debug, Clone)]
pub struct FilteredRecordSet<'a> {
    pub dataset: &'a NormalizedRecordSet,
    pub indices: Vec<usize>,
}

impl<'a> FilteredRecordSet<'a> {
    pub fn apply(dataset: &'a NormalizedRecordSet, criteria: &FilterCriteria) -> Self {
        Self {
            dataset,
            indices: filtered_indices(dataset, criteria),
        }
    }

    /// Every event of the dataset.
    #[cfg(test)]
    pub fn all(dataset: &'a NormalizedRecordSet) -> Self {
        Self {
            dataset,
            indices: (0..dataset.len()).collect(),
        }
    }

    /// Narrow this subset further.
    #[cfg(test)]
    pub fn refine(&self, criteria: &FilterCriteria) -> Self {
        Self {
            dataset: self.dataset,
            indices: self
                .indices
                .iter()
                .copied()
                .filter(|&i| criteria.matches(&self.dataset.events[i]))
                .collect(),
        }
    }

    pub fn events(&self) -> impl Iterator<Item = &'a Event> + '_ {
        self.indices.iter().map(|&i| &self.dataset.events[i])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{RawRecordSet, RawValue};
    use crate::data::normalize::normalize;

    fn dataset(rows: &[(f64, &str)]) -> NormalizedRecordSet {
        let mut raw = RawRecordSet::new(vec!["lat".into(), "lon".into(), "mag".into(), "time".into()]);
        for (i, (mag, time)) in rows.iter().enumerate() {
            raw.push_row(vec![
                RawValue::Float(i as f64),
                RawValue::Float(0.0),
                RawValue::Float(*mag),
                RawValue::String(time.to_string()),
            ]);
        }
        normalize(&raw).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn magnitudes(view: &FilteredRecordSet) -> Vec<f64> {
        view.events().filter_map(|e| e.magnitude).collect()
    }

    #[test]
    fn magnitude_range_keeps_inclusive_middle() {
        let ds = dataset(&[
            (3.0, "2024-01-01T00:00:00Z"),
            (7.0, "2024-01-02T00:00:00Z"),
            (9.5, "2024-01-03T00:00:00Z"),
        ]);
        let criteria = FilterCriteria {
            magnitude: Some((6.0, 9.0)),
            dates: None,
        };
        let view = FilteredRecordSet::apply(&ds, &criteria);
        assert_eq!(magnitudes(&view), vec![7.0]);
    }

    #[test]
    fn observed_bounds_keep_everything() {
        let ds = dataset(&[
            (2.5, "2024-01-01T00:00:00Z"),
            (4.0, "2024-01-15T23:59:59Z"),
            (6.1, "2024-01-31T12:00:00Z"),
        ]);
        let summary = Summary::of(&ds);
        assert_eq!(summary.magnitude_range, Some((2.5, 6.1)));
        assert_eq!(summary.date_range, Some((date(2024, 1, 1), date(2024, 1, 31))));
        let view = FilteredRecordSet::apply(&ds, &summary.full_range());
        assert_eq!(view.len(), ds.len());
    }

    #[test]
    fn date_filter_uses_utc_calendar_day_inclusive() {
        let ds = dataset(&[
            (1.0, "2024-02-01T23:59:59Z"),
            (1.0, "2024-02-02T00:00:00Z"),
            (1.0, "2024-02-03T01:00:00+02:00"),
            (1.0, "2024-02-04T00:00:00Z"),
        ]);
        let criteria = FilterCriteria {
            magnitude: None,
            dates: Some((date(2024, 2, 2), date(2024, 2, 2))),
        };
        // The third event is 2024-02-02 23:00 UTC.
        assert_eq!(FilteredRecordSet::apply(&ds, &criteria).indices, vec![1, 2]);
    }

    #[test]
    fn filters_intersect() {
        let ds = dataset(&[
            (5.0, "2024-01-01T00:00:00Z"),
            (5.0, "2024-01-10T00:00:00Z"),
            (2.0, "2024-01-10T00:00:00Z"),
        ]);
        let criteria = FilterCriteria {
            magnitude: Some((4.0, 6.0)),
            dates: Some((date(2024, 1, 5), date(2024, 1, 20))),
        };
        assert_eq!(filtered_indices(&ds, &criteria), vec![1]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let ds = dataset(&[
            (1.0, "2024-01-01T00:00:00Z"),
            (4.5, "2024-01-05T00:00:00Z"),
            (5.5, "2024-01-09T00:00:00Z"),
            (8.0, "2024-01-12T00:00:00Z"),
        ]);
        let criteria = FilterCriteria {
            magnitude: Some((4.0, 7.0)),
            dates: Some((date(2024, 1, 2), date(2024, 1, 31))),
        };
        let once = FilteredRecordSet::apply(&ds, &criteria);
        let twice = once.refine(&criteria);
        assert_eq!(once.indices, twice.indices);
        assert_eq!(once.indices, vec![1, 2]);
    }

    #[test]
    fn empty_result_is_not_an_error() {
        let ds = dataset(&[(3.0, "2024-01-01T00:00:00Z")]);
        let criteria = FilterCriteria {
            magnitude: Some((8.0, 9.0)),
            dates: None,
        };
        let view = FilteredRecordSet::apply(&ds, &criteria);
        assert!(view.is_empty());
    }

    #[test]
    fn missing_fields_make_filters_no_ops() {
        let mut raw = RawRecordSet::new(vec!["lat".into(), "lon".into(), "mag".into()]);
        raw.push_row(vec![RawValue::Float(1.0), RawValue::Float(1.0), RawValue::String("n/a".into())]);
        raw.push_row(vec![RawValue::Float(2.0), RawValue::Float(2.0), RawValue::String("?".into())]);
        let ds = normalize(&raw).unwrap();

        let summary = Summary::of(&ds);
        assert_eq!(summary.magnitude_range, None);
        assert_eq!(summary.date_range, None);
        assert_eq!(summary.full_range(), FilterCriteria::default());
        assert_eq!(FilteredRecordSet::apply(&ds, &summary.full_range()).len(), 2);
        assert_eq!(summary.lines(), vec!["Rows loaded: 2".to_string()]);
    }

    #[test]
    fn rows_missing_a_value_fail_active_range() {
        let mut raw = RawRecordSet::new(vec!["lat".into(), "lon".into(), "mag".into()]);
        raw.push_row(vec![RawValue::Float(1.0), RawValue::Float(1.0), RawValue::Float(4.0)]);
        raw.push_row(vec![RawValue::Float(2.0), RawValue::Float(2.0), RawValue::Null]);
        let ds = normalize(&raw).unwrap();
        let view = FilteredRecordSet::apply(&ds, &Summary::of(&ds).full_range());
        assert_eq!(view.indices, vec![0]);
    }

    #[test]
    fn summary_lines_format() {
        let ds = dataset(&[(2.0, "2024-01-01T00:00:00Z"), (6.456, "2024-01-31T00:00:00Z")]);
        assert_eq!(
            Summary::of(&ds).lines(),
            vec![
                "Rows loaded: 2".to_string(),
                "Magnitude range: 2.00 – 6.46".to_string(),
                "Date range: 2024-01-01 – 2024-01-31".to_string(),
            ]
        );
    }

    #[test]
    fn clamping_orders_and_bounds() {
        let summary = Summary {
            rows: 3,
            magnitude_range: Some((1.0, 5.0)),
            date_range: None,
        };
        let wild = FilterCriteria {
            magnitude: Some((9.0, -2.0)),
            dates: Some((date(2024, 1, 1), date(2024, 1, 2))),
        };
        assert_eq!(
            wild.clamped_to(&summary),
            FilterCriteria {
                magnitude: Some((1.0, 5.0)),
                dates: None,
            }
        );
    }
}
