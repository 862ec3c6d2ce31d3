use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use thiserror::Error;

use super::columns::ResolvedColumns;
use super::model::{
    Event, NormalizedRecordSet, OutputColumn, RawRecordSet, RawValue, CANONICAL_NAMES,
};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Fatal outcomes of normalization. Shown to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// Required fields could not be resolved from the column names.
    #[error("{0}")]
    Schema(String),
    /// No row survived validation.
    #[error("{0}")]
    EmptyResult(String),
}

impl NormalizeError {
    fn missing_coordinates() -> Self {
        NormalizeError::Schema("missing latitude/longitude".into())
    }
}

/// Display format for `Event::time_str`.
pub const TIME_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

// ---------------------------------------------------------------------------
// Normalizer / validator
// ---------------------------------------------------------------------------

/// Map a raw table onto the canonical event schema.
///
/// Coordinates are required and range-checked; magnitude, time and place are
/// optional. Cells that fail to coerce become missing rather than errors.
pub fn normalize(raw: &RawRecordSet) -> Result<NormalizedRecordSet, NormalizeError> {
    let resolved = ResolvedColumns::resolve(&raw.columns);
    let (Some(lat_idx), Some(lon_idx)) = (resolved.latitude, resolved.longitude) else {
        return Err(NormalizeError::missing_coordinates());
    };

    let (extra_sources, extra_columns, layout) = build_layout(&raw.columns, &resolved);

    let mut parsed = Vec::with_capacity(raw.len());
    for row in &raw.rows {
        let (Some(latitude), Some(longitude)) = (row[lat_idx].to_number(), row[lon_idx].to_number())
        else {
            continue;
        };
        parsed.push((latitude, longitude, row));
    }
    if parsed.is_empty() {
        return Err(NormalizeError::EmptyResult(
            "no valid rows after parsing coordinates".into(),
        ));
    }
    let unparsed = raw.len() - parsed.len();

    let before_range = parsed.len();
    parsed.retain(|&(lat, lon, _)| (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon));
    if parsed.is_empty() {
        return Err(NormalizeError::EmptyResult(
            "no rows after range filtering".into(),
        ));
    }
    let out_of_range = before_range - parsed.len();

    if unparsed > 0 || out_of_range > 0 {
        log::warn!(
            "Dropped {unparsed} rows with unparseable coordinates and {out_of_range} out-of-range rows"
        );
    }

    let events = parsed
        .into_iter()
        .map(|(latitude, longitude, row)| {
            let time = resolved.time.and_then(|i| parse_time(&row[i]));
            Event {
                latitude,
                longitude,
                magnitude: resolved.magnitude.and_then(|i| row[i].to_number()),
                time,
                time_str: time
                    .map(|t| t.format(TIME_DISPLAY_FORMAT).to_string())
                    .unwrap_or_default(),
                place: resolved
                    .place
                    .map(|i| row[i].to_string())
                    .unwrap_or_default(),
                extra: extra_sources.iter().map(|&i| row[i].clone()).collect(),
            }
        })
        .collect();

    Ok(NormalizedRecordSet {
        events,
        has_magnitude: resolved.magnitude.is_some(),
        has_time: resolved.time.is_some(),
        extra_columns,
        layout,
    })
}

/// Source order with canonical renames, then `time_str`, then `place` if absent.
fn build_layout(
    columns: &[String],
    resolved: &ResolvedColumns,
) -> (Vec<usize>, Vec<String>, Vec<OutputColumn>) {
    let mut extra_sources = Vec::new();
    let mut extra_columns = Vec::new();
    let mut layout = Vec::with_capacity(columns.len() + 2);

    for (idx, name) in columns.iter().enumerate() {
        let canonical = if Some(idx) == resolved.latitude {
            Some(OutputColumn::Latitude)
        } else if Some(idx) == resolved.longitude {
            Some(OutputColumn::Longitude)
        } else if Some(idx) == resolved.magnitude {
            Some(OutputColumn::Magnitude)
        } else if Some(idx) == resolved.time {
            Some(OutputColumn::Time)
        } else if Some(idx) == resolved.place {
            Some(OutputColumn::Place)
        } else {
            None
        };

        match canonical {
            Some(col) => layout.push(col),
            None if CANONICAL_NAMES.contains(&name.as_str()) => {
                log::debug!("Dropping column '{name}' shadowed by a canonical field");
            }
            None => {
                layout.push(OutputColumn::Extra(extra_columns.len()));
                extra_sources.push(idx);
                extra_columns.push(name.clone());
            }
        }
    }

    layout.push(OutputColumn::TimeStr);
    if resolved.place.is_none() {
        layout.push(OutputColumn::Place);
    }
    (extra_sources, extra_columns, layout)
}

// ---------------------------------------------------------------------------
// Time parsing
// ---------------------------------------------------------------------------

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Parse a cell into a UTC timestamp; anything unrecognised is missing.
///
/// Offsets are converted to UTC, naive values are taken as UTC already.
pub fn parse_time(value: &RawValue) -> Option<DateTime<Utc>> {
    let RawValue::String(s) = value else {
        return None;
    };
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // "2024-01-01 00:00:00+00:00" as written by spreadsheet/dataframe exports
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(naive) = s
        .strip_suffix(" UTC")
        .or_else(|| s.strip_suffix('Z'))
        .or(Some(s))
        .and_then(|s| {
            NAIVE_DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        })
    {
        return Some(naive.and_utc());
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
