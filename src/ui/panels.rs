use eframe::egui::{self, Color32, RichText, Ui};

use crate::color::{Colormap, HeatScale};
use crate::data::axes::sample_spacing;
use crate::data::params::load_params;
use crate::state::{AppState, ParameterInputs, View};
use crate::worker::Worker;

// ---------------------------------------------------------------------------
// Left side panel – processing parameters
// ---------------------------------------------------------------------------

/// Render the left parameter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState, worker: &Worker) {
    ui.heading("Data");
    ui.separator();
    match (&state.raw, &state.source_path) {
        (Some(raw), Some(path)) => {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            ui.label(RichText::new(name).strong());
            ui.label(format!("{} samples", raw.len()));
            if let Ok(delta) = sample_spacing(raw.time()) {
                ui.label(format!("{:.4} Hz acquisition", 1.0 / (60.0 * delta)));
            }
        }
        _ => {
            ui.label("No data loaded.");
        }
    }

    ui.add_space(8.0);
    ui.heading("Processing");
    ui.separator();

    let inputs = &mut state.inputs;
    egui::Grid::new("parameters")
        .num_columns(2)
        .spacing([8.0, 6.0])
        .show(ui, |ui: &mut Ui| {
            ui.label("Sampling time [min]");
            ui.add(egui::TextEdit::singleline(&mut inputs.sampling_time).desired_width(80.0));
            ui.end_row();

            ui.label("Shift [s]");
            ui.add(egui::TextEdit::singleline(&mut inputs.shift).desired_width(80.0));
            ui.end_row();

            ui.label("Correction factor");
            ui.add(egui::TextEdit::singleline(&mut inputs.correction_factor).desired_width(80.0));
            ui.end_row();

            ui.checkbox(&mut inputs.blank_enabled, "Blank [min]")
                .on_hover_text(
                    "Use the 2D chromatogram at this 1D time as a blank and \
                     subtract it from every other 2D chromatogram.",
                );
            ui.add_enabled(
                inputs.blank_enabled,
                egui::TextEdit::singleline(&mut inputs.blank_time).desired_width(80.0),
            );
            ui.end_row();
        });

    ui.add_space(6.0);
    ui.horizontal(|ui: &mut Ui| {
        let can_run = state.raw.is_some() && !state.busy();
        if ui.add_enabled(can_run, egui::Button::new("Process")).clicked() {
            request_processing(ui.ctx(), state, worker);
        }
        if state.busy() {
            ui.spinner();
        }
    });

    let Some(chrom) = &state.result else {
        return;
    };

    ui.add_space(8.0);
    ui.heading("Result");
    ui.separator();
    let (rows, cols) = chrom.matrix.shape();
    ui.label(format!("{rows} D1 cycles × {cols} D2 points"));
    if let Some(t) = chrom.blank_row_time {
        ui.label(format!("Blank subtracted at {t:.4} min"));
    }

    ui.add_space(6.0);
    ui.strong("Colour map");
    let style = &mut state.heat_style;
    let mut restyled = false;
    egui::ComboBox::from_id_salt("colormap")
        .selected_text(style.colormap.label())
        .show_ui(ui, |ui: &mut Ui| {
            for map in Colormap::ALL {
                restyled |= ui
                    .selectable_value(&mut style.colormap, map, map.label())
                    .changed();
            }
        });
    ui.horizontal(|ui: &mut Ui| {
        ui.label("below");
        restyled |= ui.color_edit_button_srgba(&mut style.under).changed();
        ui.label("above");
        restyled |= ui.color_edit_button_srgba(&mut style.over).changed();
    });
    if restyled {
        state.heat_dirty = true;
    }

    ui.add_space(6.0);
    ui.strong("Colour limits");
    let data_range = chrom.matrix.finite_range();
    if let Some(scale) = &mut state.heat_scale {
        let speed = ((scale.hi - scale.lo).abs() / 200.0).max(1e-6);
        let mut changed = false;
        ui.horizontal(|ui: &mut Ui| {
            ui.label("min");
            changed |= ui.add(egui::DragValue::new(&mut scale.lo).speed(speed)).changed();
            ui.label("max");
            changed |= ui.add(egui::DragValue::new(&mut scale.hi).speed(speed)).changed();
        });
        if ui.small_button("Reset").clicked() {
            if let Some((lo, hi)) = data_range {
                *scale = HeatScale::new(lo, hi);
                changed = true;
            }
        }
        if changed {
            state.heat_dirty = true;
        }
    } else {
        ui.label("No finite values.");
    }
}

fn request_processing(ctx: &egui::Context, state: &mut AppState, worker: &Worker) {
    let Some(raw) = state.raw.clone() else {
        log::error!("No data loaded.");
        state.status_message = Some("No data loaded.".into());
        return;
    };
    match state.inputs.parse() {
        Ok(params) => {
            log::debug!("Processing with {params:?}");
            state.processing = true;
            state.status_message = None;
            let ctx = ctx.clone();
            worker.spawn_process(raw, params, move || ctx.request_repaint());
        }
        Err(e) => {
            log::error!("{e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState, worker: &Worker) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui
                .add_enabled(!state.busy(), egui::Button::new("Open…"))
                .clicked()
            {
                open_file_dialog(ui.ctx(), state, worker);
                ui.close_menu();
            }
            if ui.button("Load parameters…").clicked() {
                open_params_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.checkbox(&mut state.has_headers, "Ignore first line");

        ui.separator();

        if let Some(raw) = &state.raw {
            ui.label(format!("{} raw samples loaded", raw.len()));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

/// Tabs selecting the central view.
pub fn view_tabs(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        for view in View::ALL {
            ui.selectable_value(&mut state.view, view, view.label());
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(ctx: &egui::Context, state: &mut AppState, worker: &Worker) {
    let file = rfd::FileDialog::new()
        .set_title("Open 2D-LC raw data")
        .add_filter("Supported files", &["parquet", "pq", "json", "csv", "tsv", "txt"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .add_filter("Tab-separated", &["tsv", "txt"])
        .pick_file();

    if let Some(path) = file {
        log::info!("Loading data from {}...", path.display());
        state.loading = true;
        let ctx = ctx.clone();
        worker.spawn_load(path, state.has_headers, move || ctx.request_repaint());
    }
}

fn open_params_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Load processing parameters")
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        match load_params(&path) {
            Ok(params) => {
                log::info!("Loaded parameters {params:?}");
                state.inputs = ParameterInputs::from_params(&params);
                state.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to load parameters: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
