//! Map view model: everything the map widget needs, computed without egui.

use std::collections::BTreeMap;

use eframe::egui::Color32;

use crate::color::MagnitudeRamp;
use crate::config::MapStyle;
use crate::data::filter::FilteredRecordSet;
use crate::data::model::{format_float, Event};

/// Initial camera of the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: f64,
}

impl MapView {
    /// Centred on the mean position of the events. `None` for an empty view.
    pub fn centered_on(view: &FilteredRecordSet, zoom: f64) -> Option<Self> {
        if view.is_empty() {
            return None;
        }
        let n = view.len() as f64;
        let (lat_sum, lon_sum) = view
            .events()
            .fold((0.0, 0.0), |(la, lo), e| (la + e.latitude, lo + e.longitude));
        Some(Self {
            center_lat: lat_sum / n,
            center_lon: lon_sum / n,
            zoom,
        })
    }

    /// Visible (longitude, latitude) span in degrees.
    pub fn span(&self) -> (f64, f64) {
        let scale = 2f64.powf(self.zoom);
        (360.0 / scale, 180.0 / scale)
    }

    /// `[min_lon, max_lon]`, `[min_lat, max_lat]`.
    pub fn bounds(&self) -> ([f64; 2], [f64; 2]) {
        let (w, h) = self.span();
        (
            [self.center_lon - w / 2.0, self.center_lon + w / 2.0],
            [self.center_lat - h / 2.0, self.center_lat + h / 2.0],
        )
    }
}

/// Pixel radius of a marker.
///
/// Sized linearly by magnitude and clamped when the data has magnitudes;
/// missing or negative magnitudes fall to the minimum. Fixed otherwise.
pub fn marker_radius(style: &MapStyle, has_magnitude: bool, magnitude: Option<f64>) -> f32 {
    if !has_magnitude {
        return style.fixed_radius_px;
    }
    let r = magnitude
        .filter(|m| m.is_finite())
        .map_or(0.0, |m| (m * style.radius_per_magnitude) as f32);
    r.clamp(style.min_radius_px, style.max_radius_px)
}

/// Hover text for one event.
pub fn tooltip_text(event: &Event) -> String {
    let magnitude = event.magnitude.map(format_float).unwrap_or_default();
    format!(
        "Place: {}\nMag: {}\nTime: {}",
        event.place, magnitude, event.time_str
    )
}

/// Markers sharing a radius and colour, drawn as one series.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerGroup {
    pub radius: f32,
    pub color: Color32,
    /// `[longitude, latitude]`
    pub points: Vec<[f64; 2]>,
}

/// Bucket events by radius (quarter-pixel steps) and colour, smallest first
/// so large quakes draw on top.
pub fn marker_groups(view: &FilteredRecordSet, style: &MapStyle) -> Vec<MarkerGroup> {
    let dataset = view.dataset;
    let ramp = magnitude_ramp(view, style);

    let mut buckets: BTreeMap<(i64, [u8; 4]), MarkerGroup> = BTreeMap::new();
    for event in view.events() {
        let radius = marker_radius(style, dataset.has_magnitude, event.magnitude);
        let color = ramp.map_or(style.fixed_color, |r| r.color_for(event.magnitude));
        let key = (radius * 4.0).round() as i64;
        let group = buckets
            .entry((key, color.to_array()))
            .or_insert_with(|| MarkerGroup {
                radius: key as f32 / 4.0,
                color,
                points: Vec::new(),
            });
        group.points.push([event.longitude, event.latitude]);
    }
    buckets.into_values().collect()
}

fn magnitude_ramp(view: &FilteredRecordSet, style: &MapStyle) -> Option<MagnitudeRamp> {
    if !view.dataset.has_magnitude {
        return None;
    }
    let range = view
        .events()
        .filter_map(|e| e.magnitude)
        .fold(None, |acc: Option<(f64, f64)>, m| match acc {
            None => Some((m, m)),
            Some((lo, hi)) => Some((lo.min(m), hi.max(m))),
        })
        .unwrap_or((0.0, 0.0));
    Some(MagnitudeRamp::new(range, style.magnitude_alpha))
}

/// Event nearest to a map coordinate (plain degree distance).
pub fn nearest_event<'a>(view: &FilteredRecordSet<'a>, lon: f64, lat: f64) -> Option<&'a Event> {
    view.events().min_by(|a, b| {
        let da = (a.longitude - lon).powi(2) + (a.latitude - lat).powi(2);
        let db = (b.longitude - lon).powi(2) + (b.latitude - lat).powi(2);
        da.total_cmp(&db)
    })
}
