use eframe::egui::{Color32, Id, RichText, Ui, Vec2b};
use egui_plot::{Line, Plot, PlotBounds, PlotPoints, Points};

use crate::presentation::{marker_groups, nearest_event, tooltip_text, MapView};
use crate::state::AppState;

/// Series name shared by all marker groups; hover text is only shown for it.
const EVENTS_SERIES: &str = "Events";

// ---------------------------------------------------------------------------
// Event map (central panel)
// ---------------------------------------------------------------------------

/// Render the event map with the given height.
pub fn event_map(ui: &mut Ui, state: &AppState, height: f32) {
    let Some(view) = state.filtered() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Upload a CSV or fetch the USGS feed to load events");
        });
        return;
    };

    ui.label(RichText::new(format!("Showing {} events after filtering", view.len())).italics());

    let Some(camera) = MapView::centered_on(&view, state.style.zoom) else {
        ui.label(RichText::new("No events to show after applying filters.").color(Color32::YELLOW));
        return;
    };
    let (x_bounds, y_bounds) = camera.bounds();
    let groups = marker_groups(&view, &state.style);

    // Re-centre only when the visible set changed.
    let generation_id = Id::new("event_map_generation");
    let shown: Option<u64> = ui.ctx().data(|d| d.get_temp(generation_id));
    let recenter = shown != Some(state.view_generation);
    if recenter {
        ui.ctx()
            .data_mut(|d| d.insert_temp(generation_id, state.view_generation));
    }

    Plot::new("event_map")
        .height(height)
        .data_aspect(1.0)
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .auto_bounds(Vec2b::FALSE)
        .allow_double_click_reset(false)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .label_formatter(|name, point| {
            if name != EVENTS_SERIES {
                return String::new();
            }
            nearest_event(&view, point.x, point.y)
                .map(tooltip_text)
                .unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            if recenter {
                plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                    [x_bounds[0], y_bounds[0]],
                    [x_bounds[1], y_bounds[1]],
                ));
            }

            let frame: PlotPoints = [
                [-180.0, -90.0],
                [180.0, -90.0],
                [180.0, 90.0],
                [-180.0, 90.0],
                [-180.0, -90.0],
            ]
            .into_iter()
            .collect();
            plot_ui.line(Line::new(frame).color(Color32::DARK_GRAY).width(1.0));

            let equator: PlotPoints = [[-180.0, 0.0], [180.0, 0.0]].into_iter().collect();
            plot_ui.line(Line::new(equator).color(Color32::from_gray(60)).width(0.5));

            for group in groups {
                let points: PlotPoints = group.points.into_iter().collect();
                plot_ui.points(
                    Points::new(points)
                        .name(EVENTS_SERIES)
                        .radius(group.radius)
                        .color(group.color)
                        .filled(true),
                );
            }
        });
}
