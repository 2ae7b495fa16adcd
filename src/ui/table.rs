use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;

/// The mesh as a table: D2 axis across the top, D1 axis down the left.
pub fn matrix_table(ui: &mut Ui, state: &AppState) {
    let Some((header, body)) = state.mesh.split_first() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No matrix yet.");
        });
        return;
    };

    let n_value_cols = header.len().saturating_sub(1);
    let row_height = ui.text_style_height(&egui::TextStyle::Monospace) + 4.0;

    egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(false)
            .column(Column::exact(80.0))
            .columns(Column::exact(72.0), n_value_cols)
            .header(row_height, |mut row| {
                for cell in header {
                    row.col(|ui: &mut Ui| {
                        ui.monospace(cell);
                    });
                }
            })
            .body(|table| {
                table.rows(row_height, body.len(), |mut row| {
                    let line = &body[row.index()];
                    for (i, cell) in line.iter().enumerate() {
                        row.col(|ui: &mut Ui| {
                            if i == 0 {
                                ui.strong(cell);
                            } else {
                                ui.monospace(cell);
                            }
                        });
                    }
                });
            });
    });
}
