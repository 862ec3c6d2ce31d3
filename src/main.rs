mod app;
mod color;
mod config;
mod data;
mod presentation;
mod state;
mod ui;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::Parser;
use eframe::egui;

use app::QuakeMapApp;
use config::{FeedConfig, MapStyle, USGS_MONTH_FEED};
use data::export;
use data::filter::{FilterCriteria, FilteredRecordSet, Summary};
use state::{AppState, DataSource};

#[derive(Parser, Debug)]
#[command(name = "quake-map")]
#[command(about = "World map of earthquake events from a CSV file or the USGS monthly feed")]
struct Args {
    /// CSV (or JSON / Parquet) file with one event per row
    #[arg(short, long, conflicts_with = "fetch")]
    input: Option<PathBuf>,

    /// Load the USGS feed on startup
    #[arg(long)]
    fetch: bool,

    #[arg(long, default_value = USGS_MONTH_FEED)]
    feed_url: String,

    /// Give up on the feed after this many seconds
    #[arg(long, default_value_t = 12)]
    timeout_secs: u64,

    /// Write the filtered events to this CSV file instead of opening the window
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Lower magnitude bound (inclusive)
    #[arg(long)]
    min_mag: Option<f64>,

    /// Upper magnitude bound (inclusive)
    #[arg(long)]
    max_mag: Option<f64>,

    /// First UTC date to keep, YYYY-MM-DD
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last UTC date to keep, YYYY-MM-DD
    #[arg(long)]
    end: Option<NaiveDate>,
}

impl Args {
    fn feed_config(&self) -> FeedConfig {
        FeedConfig {
            url: self.feed_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    /// Observed ranges with any bounds given on the command line swapped in.
    fn criteria(&self, summary: &Summary) -> FilterCriteria {
        let full = summary.full_range();
        FilterCriteria {
            magnitude: full
                .magnitude
                .map(|(lo, hi)| (self.min_mag.unwrap_or(lo), self.max_mag.unwrap_or(hi))),
            dates: full
                .dates
                .map(|(start, end)| (self.start.unwrap_or(start), self.end.unwrap_or(end))),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    match &args.export {
        Some(path) => run_headless(&args, path),
        None => run_gui(&args),
    }
}

fn run_headless(args: &Args, export_path: &Path) -> Result<()> {
    let dataset = match (&args.input, args.fetch) {
        (Some(path), _) => state::load_path(path)?,
        (None, true) => state::load_feed(&args.feed_config())?,
        (None, false) => bail!("--export needs a data source: --input <file> or --fetch"),
    };

    let summary = Summary::of(&dataset);
    for line in summary.lines() {
        log::info!("{line}");
    }
    println!("{}", serde_json::to_string_pretty(&summary)?);

    let view = FilteredRecordSet::apply(&dataset, &args.criteria(&summary));
    log::info!("Showing {} events after filtering", view.len());
    if view.is_empty() {
        log::warn!("No events to show after applying filters.");
    }
    export::save_csv(&view, export_path)
}

fn run_gui(args: &Args) -> Result<()> {
    let mut state = AppState::new(args.feed_config(), MapStyle::default());
    if let Some(path) = &args.input {
        state.load_path(path);
    } else if args.fetch {
        state.source = DataSource::Feed;
        state.fetch();
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([640.0, 420.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Earthquake Map – last month",
        options,
        Box::new(|_cc| Ok(Box::new(QuakeMapApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_bounds_override_observed_ranges() {
        let args = Args::parse_from([
            "quake-map",
            "--input",
            "events.csv",
            "--export",
            "out.csv",
            "--min-mag",
            "4.5",
            "--start",
            "2024-01-10",
        ]);
        assert_eq!(args.timeout_secs, 12);
        assert_eq!(args.feed_url, USGS_MONTH_FEED);

        let summary = Summary {
            rows: 10,
            magnitude_range: Some((1.0, 7.0)),
            date_range: Some((
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            )),
        };
        let criteria = args.criteria(&summary);
        assert_eq!(criteria.magnitude, Some((4.5, 7.0)));
        assert_eq!(
            criteria.dates,
            Some((
                NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            ))
        );
    }

    #[test]
    fn bounds_ignored_for_missing_fields() {
        let args = Args::parse_from(["quake-map", "--fetch", "--max-mag", "3"]);
        let summary = Summary {
            rows: 1,
            magnitude_range: None,
            date_range: None,
        };
        assert_eq!(args.criteria(&summary), FilterCriteria::default());
    }

    #[test]
    fn input_and_fetch_conflict() {
        assert!(Args::try_parse_from(["quake-map", "--input", "a.csv", "--fetch"]).is_err());
    }

    #[test]
    fn headless_export_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("events.csv");
        let output = dir.path().join("out.csv");
        std::fs::write(
            &input,
            "time,latitude,longitude,mag,place\n\
             2024-01-01T00:00:00Z,10,20,3.0,A\n\
             2024-01-02T00:00:00Z,11,21,7.0,B\n\
             2024-01-03T00:00:00Z,12,22,9.5,C\n\
             2024-01-04T00:00:00Z,91,22,8.0,D\n",
        )
        .unwrap();
        let args = Args::parse_from([
            "quake-map",
            "--input",
            input.to_str().unwrap(),
            "--export",
            output.to_str().unwrap(),
            "--min-mag",
            "6",
            "--max-mag",
            "9",
        ]);
        run_headless(&args, &output).unwrap();
        let text = std::fs::read_to_string(&output).unwrap();
        assert_eq!(
            text,
            "time,latitude,longitude,magnitude,place,time_str\n\
             2024-01-02 00:00:00+00:00,11.0,21.0,7.0,B,2024-01-02 00:00:00 UTC\n"
        );
    }

    #[test]
    fn headless_without_source_fails() {
        let args = Args::parse_from(["quake-map", "--export", "out.csv"]);
        assert!(run_headless(&args, Path::new("out.csv")).is_err());
    }
}
