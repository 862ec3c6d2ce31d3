use std::sync::Arc;

use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, TimeZone, Utc};
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    /// Gutenberg–Richter: magnitudes above `min` are exponential with slope `b`.
    fn magnitude(&mut self, min: f64, b: f64) -> f64 {
        let u = self.next_f64().max(1e-15);
        min - u.log10() / b
    }
}

/// Seismically active regions: (name, latitude, longitude, spread in degrees).
const REGIONS: &[(&str, f64, f64, f64)] = &[
    ("Southern Alaska", 61.0, -150.0, 3.0),
    ("Northern California", 38.8, -122.8, 0.8),
    ("Puerto Rico region", 18.0, -66.8, 0.6),
    ("Honshu, Japan", 37.5, 141.5, 2.0),
    ("Central Chile", -33.0, -71.5, 2.5),
    ("Sumatra, Indonesia", -1.0, 99.0, 3.0),
    ("Tonga", -20.0, -174.5, 2.0),
    ("Central Turkey", 38.5, 37.0, 1.5),
];

struct Row {
    time: String,
    latitude: String,
    longitude: String,
    depth: f64,
    mag: f64,
    place: String,
}

fn main() {
    let mut rng = SimpleRng::new(42);
    let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
    let month_secs = 30 * 24 * 3600;

    let mut rows: Vec<Row> = Vec::new();
    for i in 0..600 {
        let (region, lat0, lon0, spread) = REGIONS[i % REGIONS.len()];
        let lat = (rng.gauss(lat0, spread)).clamp(-89.9, 89.9);
        let mut lon = rng.gauss(lon0, spread);
        if lon < -180.0 {
            lon += 360.0;
        }
        let offset = (rng.next_f64() * month_secs as f64) as i64;
        let time = start + Duration::seconds(offset) + Duration::milliseconds(i as i64 % 1000);
        let km = (rng.next_f64() * 80.0).round();

        rows.push(Row {
            time: time.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            latitude: format!("{lat:.4}"),
            longitude: format!("{lon:.4}"),
            depth: (rng.next_f64() * 150.0 * 100.0).round() / 100.0,
            mag: (rng.magnitude(0.5, 1.0) * 10.0).round() / 10.0,
            place: format!("{km} km from {region}"),
        });
    }

    // A few rows the dashboard must reject.
    rows.push(Row {
        time: "2024-05-15T12:00:00.000Z".into(),
        latitude: "95.0".into(),
        longitude: "10.0".into(),
        depth: 5.0,
        mag: 3.1,
        place: "out of range latitude".into(),
    });
    rows.push(Row {
        time: "not a time".into(),
        latitude: "12.0".into(),
        longitude: "east".into(),
        depth: 5.0,
        mag: 2.2,
        place: "non-numeric longitude".into(),
    });

    // CSV in the USGS feed layout
    let csv_path = "sample_quakes.csv";
    let mut wtr = csv::Writer::from_path(csv_path).expect("Failed to create CSV file");
    wtr.write_record(["time", "latitude", "longitude", "depth", "mag", "place"])
        .expect("Failed to write header");
    for r in &rows {
        wtr.write_record([
            r.time.clone(),
            r.latitude.clone(),
            r.longitude.clone(),
            r.depth.to_string(),
            r.mag.to_string(),
            r.place.clone(),
        ])
        .expect("Failed to write row");
    }
    wtr.flush().expect("Failed to flush CSV");

    // Same rows as Parquet, coordinates kept as text so the bad rows survive
    let schema = Arc::new(Schema::new(vec![
        Field::new("time", DataType::Utf8, false),
        Field::new("latitude", DataType::Utf8, false),
        Field::new("longitude", DataType::Utf8, false),
        Field::new("depth", DataType::Float64, false),
        Field::new("mag", DataType::Float64, false),
        Field::new("place", DataType::Utf8, false),
    ]));

    let text_column = |f: fn(&Row) -> &str| {
        StringArray::from(rows.iter().map(f).collect::<Vec<_>>())
    };
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(text_column(|r| r.time.as_str())),
            Arc::new(text_column(|r| r.latitude.as_str())),
            Arc::new(text_column(|r| r.longitude.as_str())),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.depth).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.mag).collect::<Vec<_>>())),
            Arc::new(text_column(|r| r.place.as_str())),
        ],
    )
    .expect("Failed to create RecordBatch");

    let parquet_path = "sample_quakes.parquet";
    let file = std::fs::File::create(parquet_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    println!(
        "Wrote {} events to {csv_path} and {parquet_path}",
        rows.len()
    );
}
