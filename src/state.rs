use std::path::Path;

use anyhow::Result;

use crate::config::{FeedConfig, MapStyle};
use crate::data::filter::{filtered_indices, FilterCriteria, FilteredRecordSet, Summary};
use crate::data::model::NormalizedRecordSet;
use crate::data::{loader, normalize};

// ---------------------------------------------------------------------------
// Data source selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Upload,
    Feed,
}

impl DataSource {
    pub fn label(self) -> &'static str {
        match self {
            DataSource::Upload => "Upload CSV",
            DataSource::Feed => "Fetch USGS (last month)",
        }
    }
}

/// Load a file and normalize it.
pub fn load_path(path: &Path) -> Result<NormalizedRecordSet> {
    let raw = loader::load_file(path)?;
    Ok(normalize::normalize(&raw)?)
}

/// Fetch the feed and normalize it.
pub fn load_feed(config: &FeedConfig) -> Result<NormalizedRecordSet> {
    let raw = loader::fetch_feed(config)?;
    Ok(normalize::normalize(&raw)?)
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full session state, independent of rendering.
pub struct AppState {
    pub source: DataSource,
    pub feed: FeedConfig,
    pub style: MapStyle,

    /// Validated dataset (None until a load succeeds).
    pub dataset: Option<NormalizedRecordSet>,

    /// Observed ranges of `dataset`.
    pub summary: Option<Summary>,

    /// Current filter selection.
    pub criteria: FilterCriteria,

    /// Indices of events passing `criteria` (cached).
    pub visible_indices: Vec<usize>,

    /// Error message shown in the UI.
    pub status_message: Option<String>,

    /// Bumped whenever the visible set is replaced; the map re-centres on change.
    pub view_generation: u64,
}

impl AppState {
    pub fn new(feed: FeedConfig, style: MapStyle) -> Self {
        Self {
            source: DataSource::Upload,
            feed,
            style,
            dataset: None,
            summary: None,
            criteria: FilterCriteria::default(),
            visible_indices: Vec::new(),
            status_message: None,
            view_generation: 0,
        }
    }

    /// Ingest a newly validated dataset with filters at the observed ranges.
    /// Rows missing a filtered field stay hidden, as they would after any
    /// other filter change.
    pub fn set_dataset(&mut self, dataset: NormalizedRecordSet) {
        debug_assert!(!dataset.is_empty());
        let summary = Summary::of(&dataset);
        self.criteria = summary.full_range();
        self.visible_indices = filtered_indices(&dataset, &self.criteria);
        self.summary = Some(summary);
        self.dataset = Some(dataset);
        self.status_message = None;
        self.view_generation += 1;
    }

    /// Record a failed load. Nothing from a previous load stays on screen.
    pub fn set_error(&mut self, message: String) {
        self.dataset = None;
        self.summary = None;
        self.criteria = FilterCriteria::default();
        self.visible_indices.clear();
        self.status_message = Some(message);
        self.view_generation += 1;
    }

    /// Apply the outcome of a load attempt.
    pub fn apply_load(&mut self, result: Result<NormalizedRecordSet>) {
        match result {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} events (magnitude: {}, time: {}, extra columns: {:?})",
                    dataset.len(),
                    dataset.has_magnitude,
                    dataset.has_time,
                    dataset.extra_columns
                );
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load data: {e:#}");
                self.set_error(format!("{e:#}"));
            }
        }
    }

    pub fn load_path(&mut self, path: &Path) {
        self.apply_load(load_path(path));
    }

    pub fn fetch(&mut self) {
        let feed = self.feed.clone();
        self.apply_load(load_feed(&feed));
    }

    /// Replace the criteria (kept inside the observed ranges) and refilter.
    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        let Some(summary) = &self.summary else {
            return;
        };
        let criteria = criteria.clamped_to(summary);
        if criteria != self.criteria {
            self.criteria = criteria;
            self.refilter();
        }
    }

    /// Recompute `visible_indices` after a filter change.
    pub fn refilter(&mut self) {
        if let Some(ds) = &self.dataset {
            self.visible_indices = filtered_indices(ds, &self.criteria);
            self.view_generation += 1;
            log::debug!(
                "Filter {:?} keeps {}/{} events",
                self.criteria,
                self.visible_indices.len(),
                ds.len()
            );
        }
    }

    /// The currently visible subset.
    pub fn filtered(&self) -> Option<FilteredRecordSet<'_>> {
        self.dataset.as_ref().map(|dataset| FilteredRecordSet {
            dataset,
            indices: self.visible_indices.clone(),
        })
    }
}
