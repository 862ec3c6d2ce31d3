use std::time::Duration;

use eframe::egui::Color32;

/// Monthly summary of all events from the USGS.
pub const USGS_MONTH_FEED: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_month.csv";

/// Default file name offered when saving the filtered table.
pub const EXPORT_FILE_NAME: &str = "earthquakes_filtered.csv";

// ---------------------------------------------------------------------------
// Feed
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct FeedConfig {
    pub url: String,
    pub timeout: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: USGS_MONTH_FEED.to_string(),
            timeout: Duration::from_secs(12),
        }
    }
}

// ---------------------------------------------------------------------------
// Map styling
// ---------------------------------------------------------------------------

/// Look of the map view and its markers.
#[derive(Debug, Clone, PartialEq)]
pub struct MapStyle {
    /// Initial zoom; the view spans `360 / 2^zoom` degrees of longitude.
    pub zoom: f64,
    /// Pixels of marker radius per unit of magnitude.
    pub radius_per_magnitude: f64,
    pub min_radius_px: f32,
    pub max_radius_px: f32,
    /// Used when the data has no magnitude column.
    pub fixed_radius_px: f32,
    /// Marker alpha when sized by magnitude.
    pub magnitude_alpha: u8,
    /// Marker colour when the data has no magnitude column.
    pub fixed_color: Color32,
}

impl Default for MapStyle {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            radius_per_magnitude: 3.0,
            min_radius_px: 2.0,
            max_radius_px: 200.0,
            fixed_radius_px: 4.0,
            magnitude_alpha: 160,
            fixed_color: Color32::from_rgba_unmultiplied(0, 110, 255, 140),
        }
    }
}
