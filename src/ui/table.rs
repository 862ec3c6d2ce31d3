use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::data::filter::FilteredRecordSet;

/// Striped listing of the visible events, one column per export column.
pub fn event_table(ui: &mut Ui, view: &FilteredRecordSet) {
    let dataset = view.dataset;
    let names = dataset.column_names();

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .min_scrolled_height(0.0)
        .columns(Column::auto().at_least(60.0).clip(true), names.len())
        .header(20.0, |mut header| {
            for name in &names {
                header.col(|ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, view.len(), |mut row| {
                let event = &dataset.events[view.indices[row.index()]];
                for &col in &dataset.layout {
                    row.col(|ui| {
                        ui.label(dataset.cell_text(event, col));
                    });
                }
            });
        });
}
