use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{
    Array, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array, LargeStringArray,
    StringArray,
};
use arrow::datatypes::DataType;
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{RawRecordSet, RawValue};
use crate::config::FeedConfig;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a raw event table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row plus one event per line (also the fallback)
/// * `.json`    – `[{ "latitude": .., "longitude": .., ... }, ...]`
/// * `.parquet` – one event per row, scalar columns
pub fn load_file(path: &Path) -> Result<RawRecordSet> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => load_parquet(path).context("Error reading Parquet"),
        "json" => load_json(path).context("Error reading JSON"),
        _ => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("Error reading CSV: opening {}", path.display()))?;
            read_csv(file).context("Error reading CSV")
        }
    }
}

/// Download the feed and parse it as CSV. No retries.
pub fn fetch_feed(config: &FeedConfig) -> Result<RawRecordSet> {
    fetch_feed_inner(config).context("Error fetching USGS feed")
}

fn fetch_feed_inner(config: &FeedConfig) -> Result<RawRecordSet> {
    let client = reqwest::blocking::Client::builder()
        .timeout(config.timeout)
        .build()
        .context("building HTTP client")?;

    let t0 = std::time::Instant::now();
    let text = client
        .get(&config.url)
        .send()
        .with_context(|| format!("GET {}", config.url))?
        .error_for_status()?
        .text()
        .context("reading response body")?;
    log::info!(
        "Fetched {} bytes from {} in {:.2}s",
        text.len(),
        config.url,
        t0.elapsed().as_secs_f64()
    );

    let raw = read_csv(text.as_bytes())?;
    if raw.is_empty() {
        log::warn!("Feed at {} has a header but no events", config.url);
    }
    Ok(raw)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Header row gives column names; every cell is typed on its own.
/// Ragged rows are padded with nulls. Repeated header names get `.1`, `.2`, ...
pub fn read_csv<R: Read>(source: R) -> Result<RawRecordSet> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(source);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut raw = RawRecordSet::new(headers);
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        raw.push_row(record.iter().map(RawValue::guess).collect());
    }
    Ok(raw)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON (`df.to_json(orient='records')`). Columns are the
/// union of keys in order of first appearance.
fn load_json(path: &Path) -> Result<RawRecordSet> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json(&text)
}

fn parse_json(text: &str) -> Result<RawRecordSet> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut columns: Vec<String> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !positions.contains_key(key) {
                positions.insert(key.clone(), columns.len());
                columns.push(key.clone());
            }
        }
    }

    let mut raw = RawRecordSet::new(columns);
    for rec in records {
        let mut row = vec![RawValue::Null; raw.columns.len()];
        if let Some(obj) = rec.as_object() {
            for (key, val) in obj {
                row[positions[key]] = json_to_raw(val);
            }
        }
        raw.push_row(row);
    }
    Ok(raw)
}

fn json_to_raw(val: &JsonValue) -> RawValue {
    match val {
        JsonValue::String(s) => RawValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                RawValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                RawValue::Float(f)
            } else {
                RawValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => RawValue::Bool(*b),
        JsonValue::Null => RawValue::Null,
        other => RawValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Scalar columns only. Numbers and bools keep their type, everything else
/// (timestamps included) is rendered to text and left to the normalizer.
fn load_parquet(path: &Path) -> Result<RawRecordSet> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut raw = RawRecordSet::new(columns);
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let values = batch
                .columns()
                .iter()
                .map(|col| extract_value(col, row))
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("Row {row}"))?;
            raw.push_row(values);
        }
    }
    Ok(raw)
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_value(col: &Arc<dyn Array>, row: usize) -> Result<RawValue> {
    if col.is_null(row) {
        return Ok(RawValue::Null);
    }
    let any = col.as_any();
    let value = match col.data_type() {
        DataType::Utf8 => any
            .downcast_ref::<StringArray>()
            .map(|a| RawValue::String(a.value(row).to_string())),
        DataType::LargeUtf8 => any
            .downcast_ref::<LargeStringArray>()
            .map(|a| RawValue::String(a.value(row).to_string())),
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .map(|a| RawValue::Integer(a.value(row) as i64)),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .map(|a| RawValue::Integer(a.value(row))),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map(|a| RawValue::Float(a.value(row) as f64)),
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map(|a| RawValue::Float(a.value(row))),
        DataType::Boolean => any
            .downcast_ref::<BooleanArray>()
            .map(|a| RawValue::Bool(a.value(row))),
        _ => None,
    };
    match value {
        Some(v) => Ok(v),
        None => Ok(RawValue::String(
            array_value_to_string(col.as_ref(), row).context("formatting Arrow value")?,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn column(raw: &RawRecordSet, name: &str) -> usize {
        raw.columns.iter().position(|c| c == name).unwrap()
    }

    const USGS_SNIPPET: &str = "\
time,latitude,longitude,depth,mag,magType,place
2024-05-01T10:15:30.120Z,38.8,-122.8,2.1,1.2,md,\"10km NW of The Geysers, CA\"
2024-05-02T03:00:00.000Z,61.2,-150.1,35.0,,ml,Southern Alaska
";

    #[test]
    fn csv_cells_are_typed_individually() {
        let raw = read_csv(USGS_SNIPPET.as_bytes()).unwrap();
        assert_eq!(
            raw.columns,
            vec!["time", "latitude", "longitude", "depth", "mag", "magType", "place"]
        );
        assert_eq!(raw.len(), 2);
        assert_eq!(raw.rows[0][1], RawValue::Float(38.8));
        assert_eq!(raw.rows[0][6], RawValue::String("10km NW of The Geysers, CA".into()));
        assert_eq!(raw.rows[1][4], RawValue::Null);
    }

    #[test]
    fn ragged_csv_rows_are_padded() {
        let raw = read_csv("lat,lon,place\n1,2\n3,4,Somewhere\n".as_bytes()).unwrap();
        assert_eq!(raw.rows[0], vec![RawValue::Integer(1), RawValue::Integer(2), RawValue::Null]);
        assert_eq!(raw.rows[1][2], RawValue::String("Somewhere".into()));
    }

    #[test]
    fn repeated_csv_headers_are_numbered() {
        let raw = read_csv("lat,lat,lon\n1,2,3\n".as_bytes()).unwrap();
        assert_eq!(raw.columns, vec!["lat", "lat.1", "lon"]);

        let ds = crate::data::normalize::normalize(&raw).unwrap();
        assert_eq!(ds.events[0].latitude, 1.0);
        assert_eq!(ds.extra_columns, vec!["lat.1"]);
        assert_eq!(ds.column_names(), vec!["latitude", "lat.1", "longitude", "time_str", "place"]);
    }

    #[test]
    fn unknown_extension_reads_as_csv() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        file.write_all(USGS_SNIPPET.as_bytes()).unwrap();
        let raw = load_file(file.path()).unwrap();
        assert_eq!(raw.len(), 2);
    }

    #[test]
    fn missing_file_reports_csv_error() {
        let err = load_file(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(format!("{err:#}").starts_with("Error reading CSV"));
    }

    #[test]
    fn json_records_union_keys() {
        let raw = parse_json(
            r#"[{"lat": 1.5, "lon": 2, "place": "A"},
                {"lat": "3", "lon": 4, "mag": 5.1}]"#,
        )
        .unwrap();
        assert_eq!(raw.len(), 2);
        let mag = column(&raw, "mag");
        let place = column(&raw, "place");
        assert_eq!(raw.rows[0][mag], RawValue::Null);
        assert_eq!(raw.rows[1][mag], RawValue::Float(5.1));
        assert_eq!(raw.rows[1][place], RawValue::Null);
        assert_eq!(raw.rows[0][column(&raw, "lon")], RawValue::Integer(2));
    }

    #[test]
    fn json_must_be_array_of_objects() {
        assert!(parse_json(r#"{"lat": 1}"#).is_err());
        assert!(parse_json(r#"[1, 2]"#).is_err());
    }

    #[test]
    fn parquet_scalar_columns() {
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![
            Field::new("latitude", DataType::Float64, false),
            Field::new("longitude", DataType::Float64, false),
            Field::new("place", DataType::Utf8, true),
            Field::new("id", DataType::Int64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Float64Array::from(vec![10.0, -5.5])),
                Arc::new(Float64Array::from(vec![20.0, 100.25])),
                Arc::new(StringArray::from(vec![Some("X"), None])),
                Arc::new(Int64Array::from(vec![1, 2])),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let raw = load_file(file.path()).unwrap();
        assert_eq!(raw.columns, vec!["latitude", "longitude", "place", "id"]);
        assert_eq!(raw.rows[1][0], RawValue::Float(-5.5));
        assert_eq!(raw.rows[0][2], RawValue::String("X".into()));
        assert_eq!(raw.rows[1][2], RawValue::Null);
        assert_eq!(raw.rows[1][3], RawValue::Integer(2));
    }
}
