use eframe::egui;

use crate::state::AppState;
use crate::ui::{map, panels, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct QuakeMapApp {
    pub state: AppState,
}

impl QuakeMapApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for QuakeMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: source, summary, filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: map above, table below ----
        egui::CentralPanel::default().show(ctx, |ui| {
            let map_height = (ui.available_height() * 0.65).max(200.0);
            map::event_map(ui, &self.state, map_height);

            if let Some(view) = self.state.filtered() {
                egui::CollapsingHeader::new("Show data table")
                    .default_open(false)
                    .show(ui, |ui| {
                        table::event_table(ui, &view);
                    });
            }
        });
    }
}
