use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};

// ---------------------------------------------------------------------------
// RawValue – a single cell of an uninspected table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell as it came out of the source file or feed.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::String(s) => write!(f, "{s}"),
            RawValue::Integer(i) => write!(f, "{i}"),
            RawValue::Float(v) => write!(f, "{}", format_float(*v)),
            RawValue::Bool(true) => write!(f, "True"),
            RawValue::Bool(false) => write!(f, "False"),
            RawValue::Null => Ok(()),
        }
    }
}

impl RawValue {
    /// Guess the type of a text cell (CSV has no column types).
    pub fn guess(s: &str) -> Self {
        if s.is_empty() {
            return RawValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return RawValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return RawValue::Float(f);
        }
        match s {
            "true" | "True" | "TRUE" => RawValue::Bool(true),
            "false" | "False" | "FALSE" => RawValue::Bool(false),
            _ => RawValue::String(s.to_string()),
        }
    }

    /// Numeric coercion where anything unparseable is missing.
    pub fn to_number(&self) -> Option<f64> {
        let v = match self {
            RawValue::Float(v) => *v,
            RawValue::Integer(i) => *i as f64,
            RawValue::String(s) => s.trim().parse::<f64>().ok()?,
            RawValue::Bool(_) | RawValue::Null => return None,
        };
        (!v.is_nan()).then_some(v)
    }
}

/// Shortest round-trip text for a float, keeping a trailing `.0` on whole numbers.
pub fn format_float(v: f64) -> String {
    format!("{v:?}")
}

// ---------------------------------------------------------------------------
// RawRecordSet – the table before any schema is known
// ---------------------------------------------------------------------------

/// Rows of cells aligned with `columns`. No invariants beyond row width.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecordSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<RawValue>>,
}

impl RawRecordSet {
    /// Exact duplicate names are renamed `name.1`, `name.2`, ...
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns: dedup_column_names(columns),
            rows: Vec::new(),
        }
    }

    /// Append a row, padding short rows with nulls and cutting long ones.
    pub fn push_row(&mut self, mut row: Vec<RawValue>) {
        row.resize(self.columns.len(), RawValue::Null);
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The first occurrence keeps its name. Later ones get the next free
/// `.N` suffix, so `a, a, a.1` becomes `a, a.1, a.1.1`.
fn dedup_column_names(columns: Vec<String>) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    columns
        .into_iter()
        .map(|mut name| {
            let mut seen = counts.get(&name).copied().unwrap_or(0);
            while seen > 0 {
                counts.insert(name.clone(), seen + 1);
                name = format!("{name}.{seen}");
                seen = counts.get(&name).copied().unwrap_or(0);
            }
            counts.insert(name.clone(), 1);
            name
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Event – one validated row
// ---------------------------------------------------------------------------

/// A single earthquake event with coordinates guaranteed in range.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub latitude: f64,
    pub longitude: f64,
    pub magnitude: Option<f64>,
    pub time: Option<DateTime<Utc>>,
    /// `YYYY-MM-DD HH:MM:SS UTC`, empty when `time` is missing.
    pub time_str: String,
    /// Empty when the source had no place column or the cell was blank.
    pub place: String,
    /// Pass-through cells, aligned with `NormalizedRecordSet::extra_columns`.
    pub extra: Vec<RawValue>,
}

// ---------------------------------------------------------------------------
// Output layout
// ---------------------------------------------------------------------------

/// One column of the table view / CSV export, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputColumn {
    Latitude,
    Longitude,
    Magnitude,
    Time,
    Place,
    TimeStr,
    /// Index into `NormalizedRecordSet::extra_columns`.
    Extra(usize),
}

impl OutputColumn {
    pub fn canonical_name(self) -> Option<&'static str> {
        match self {
            OutputColumn::Latitude => Some("latitude"),
            OutputColumn::Longitude => Some("longitude"),
            OutputColumn::Magnitude => Some("magnitude"),
            OutputColumn::Time => Some("time"),
            OutputColumn::Place => Some("place"),
            OutputColumn::TimeStr => Some("time_str"),
            OutputColumn::Extra(_) => None,
        }
    }
}

/// Names that pass-through columns may not shadow.
pub const CANONICAL_NAMES: [&str; 6] = [
    "latitude",
    "longitude",
    "magnitude",
    "time",
    "place",
    "time_str",
];

// ---------------------------------------------------------------------------
// NormalizedRecordSet – the validated dataset
// ---------------------------------------------------------------------------

/// Validated events plus the column layout used for display and export.
///
/// Only [`crate::data::normalize::normalize`] builds one, and never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecordSet {
    pub events: Vec<Event>,
    /// A source column was resolved to `magnitude`.
    pub has_magnitude: bool,
    /// A source column was resolved to `time`.
    pub has_time: bool,
    pub extra_columns: Vec<String>,
    pub layout: Vec<OutputColumn>,
}

impl NormalizedRecordSet {
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Header names in layout order.
    pub fn column_names(&self) -> Vec<String> {
        self.layout
            .iter()
            .map(|col| match col {
                OutputColumn::Extra(i) => self.extra_columns[*i].clone(),
                other => other.canonical_name().unwrap_or_default().to_string(),
            })
            .collect()
    }

    /// Text for one cell of the table / export.
    pub fn cell_text(&self, event: &Event, column: OutputColumn) -> String {
        match column {
            OutputColumn::Latitude => format_float(event.latitude),
            OutputColumn::Longitude => format_float(event.longitude),
            OutputColumn::Magnitude => event.magnitude.map(format_float).unwrap_or_default(),
            OutputColumn::Time => event
                .time
                .map(|t| t.format("%Y-%m-%d %H:%M:%S%.f+00:00").to_string())
                .unwrap_or_default(),
            OutputColumn::Place => event.place.clone(),
            OutputColumn::TimeStr => event.time_str.clone(),
            OutputColumn::Extra(i) => event.extra.get(i).map(|v| v.to_string()).unwrap_or_default(),
        }
    }
}
