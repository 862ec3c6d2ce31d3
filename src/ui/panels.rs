use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::config::EXPORT_FILE_NAME;
use crate::data::export;
use crate::data::filter::FilterCriteria;
use crate::state::{AppState, DataSource};

// ---------------------------------------------------------------------------
// Left side panel – data source, summary, filters
// ---------------------------------------------------------------------------

/// Render the left panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            data_source(ui, state);
            ui.separator();

            let Some(summary) = state.summary.clone() else {
                ui.label("No data loaded.");
                return;
            };

            ui.heading("Summary");
            for line in summary.lines() {
                ui.label(line);
            }
            ui.separator();

            ui.heading("Filters");
            let mut criteria = state.criteria;
            magnitude_filter(ui, &mut criteria, summary.magnitude_range);
            date_filter(ui, &mut criteria);
            if ui.small_button("Reset").clicked() {
                criteria = summary.full_range();
            }
            state.set_criteria(criteria);

            ui.separator();
            if ui.button("Download filtered CSV").clicked() {
                save_export_dialog(state);
            }
        });
}

fn data_source(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Data source");
    ui.label("Choose how to load data:");
    for source in [DataSource::Upload, DataSource::Feed] {
        ui.radio_value(&mut state.source, source, source.label());
    }
    ui.add_space(4.0);

    match state.source {
        DataSource::Upload => {
            if ui.button("Upload CSV file…").clicked() {
                open_file_dialog(state);
            }
        }
        DataSource::Feed => {
            ui.label("Press the button to fetch the latest monthly feed from USGS.");
            if ui.button("Fetch USGS now").clicked() {
                state.fetch();
            }
        }
    }
}

/// Two sliders over the observed magnitudes; hidden when there are none.
fn magnitude_filter(ui: &mut Ui, criteria: &mut FilterCriteria, observed: Option<(f64, f64)>) {
    let (Some((min, max)), Some((lo, hi))) = (observed, criteria.magnitude.as_mut()) else {
        return;
    };
    ui.strong("Magnitude");
    ui.add(egui::Slider::new(lo, min..=max).text("min"));
    ui.add(egui::Slider::new(hi, min..=max).text("max"));
}

fn date_filter(ui: &mut Ui, criteria: &mut FilterCriteria) {
    let Some((start, end)) = criteria.dates.as_mut() else {
        return;
    };
    ui.strong("Date range");
    ui.horizontal(|ui: &mut Ui| {
        ui.label("from");
        ui.add(DatePickerButton::new(start).id_salt("date_start"));
    });
    ui.horizontal(|ui: &mut Ui| {
        ui.label("to");
        ui.add(DatePickerButton::new(end).id_salt("date_end"));
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Fetch USGS feed").clicked() {
                state.source = DataSource::Feed;
                state.fetch();
                ui.close_menu();
            }
            let can_export = state.dataset.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export filtered CSV…"))
                .clicked()
            {
                save_export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} events loaded, {} visible",
                ds.len(),
                state.visible_indices.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open earthquake data")
        .add_filter("CSV", &["csv"])
        .add_filter("Other supported files", &["json", "parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.source = DataSource::Upload;
        state.load_path(&path);
    }
}

pub fn save_export_dialog(state: &mut AppState) {
    let Some(view) = state.filtered() else {
        return;
    };
    let Some(path) = rfd::FileDialog::new()
        .set_title("Download filtered CSV")
        .set_file_name(EXPORT_FILE_NAME)
        .add_filter("CSV", &["csv"])
        .save_file()
    else {
        return;
    };

    if let Err(e) = export::save_csv(&view, &path) {
        log::error!("Export failed: {e:#}");
        state.status_message = Some(format!("Export failed: {e:#}"));
    }
}
