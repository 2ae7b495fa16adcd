use eframe::egui::{self, Color32, Ui};
use egui_plot::{Line, Plot, PlotImage, PlotPoint, VLine};

use crate::color::generate_palette;
use crate::data::model::Chromatogram2D;
use crate::state::AppState;

/// The current result, or a hint in the panel when there is none.
fn result_or_hint<'a>(ui: &mut Ui, state: &'a AppState) -> Option<&'a Chromatogram2D> {
    if state.result.is_none() {
        let hint = if state.raw.is_some() {
            "Set the sampling time and press Process"
        } else {
            "Open a file to get started  (File → Open…)"
        };
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading(hint);
        });
    }
    state.result.as_ref()
}

/// Points with a missing intensity are left out of the line.
fn finite_points<'a>(x: impl IntoIterator<Item = &'a f64>, y: &[f64]) -> Vec<[f64; 2]> {
    x.into_iter()
        .zip(y)
        .filter(|(_, yi)| yi.is_finite())
        .map(|(&xi, &yi)| [xi, yi])
        .collect()
}

// ---------------------------------------------------------------------------
// 2D contour (heat map)
// ---------------------------------------------------------------------------

/// Heat map of the matrix: D2 on x, D1 on y.
pub fn contour_plot(ui: &mut Ui, state: &AppState, texture: Option<&egui::TextureHandle>) {
    let Some(chrom) = result_or_hint(ui, state) else {
        return;
    };
    let Some(texture) = texture else {
        ui.label("The matrix holds no finite values.");
        return;
    };

    let (n_rows, n_cols) = chrom.matrix.shape();
    let d2_end = chrom.ax_d2.last().copied().unwrap_or_default();
    let d1_end = chrom.ax_d1.last().copied().unwrap_or_default();
    // Each pixel is centred on its axis value.
    let d2_step = chrom.ax_d2[1] - chrom.ax_d2[0];
    let d1_step = if n_rows > 1 {
        chrom.ax_d1[1] - chrom.ax_d1[0]
    } else {
        1.0
    };
    let size = egui::vec2(
        (d2_step * n_cols as f64) as f32,
        (d1_step * n_rows as f64) as f32,
    );
    let image = PlotImage::new(
        texture.id(),
        PlotPoint::new(d2_end / 2.0, d1_end / 2.0),
        size,
    );

    Plot::new("contour_plot")
        .x_axis_label("D2 retention time [s]")
        .y_axis_label("D1 retention time [min]")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.image(image);
        });
}

// ---------------------------------------------------------------------------
// Overlay of every D2 chromatogram
// ---------------------------------------------------------------------------

pub fn overlay_plot(ui: &mut Ui, state: &AppState) {
    let Some(chrom) = result_or_hint(ui, state) else {
        return;
    };
    let palette = generate_palette(chrom.matrix.n_rows());

    Plot::new("overlay_plot")
        .x_axis_label("D2 retention time [s]")
        .y_axis_label("Intensity")
        .allow_boxed_zoom(true)
        .show(ui, |plot_ui| {
            for ((row, &d1), &color) in chrom.matrix.rows().zip(&chrom.ax_d1).zip(&palette) {
                let line = Line::new(finite_points(&chrom.ax_d2, row))
                    .name(format!("{d1:.3} min"))
                    .color(color)
                    .width(1.0);
                plot_ui.line(line);
            }
        });
}

// ---------------------------------------------------------------------------
// Raw view: acquisition trace with the cycle boundaries
// ---------------------------------------------------------------------------

/// Raw intensity against acquisition time, with a marker where each D1 row
/// begins.
pub fn raw_plot(ui: &mut Ui, state: &AppState) {
    let Some(chrom) = result_or_hint(ui, state) else {
        return;
    };
    let Some(raw) = &state.raw else {
        return;
    };

    let points = finite_points(raw.time(), raw.intensity());
    let starts = chrom.cycle_start_times(raw.time());

    Plot::new("raw_plot")
        .legend(egui_plot::Legend::default())
        .x_axis_label("Time [min]")
        .y_axis_label("Intensity")
        .allow_boxed_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(points)
                    .name("raw trace")
                    .color(Color32::LIGHT_BLUE)
                    .width(1.2),
            );
            for t in starts {
                plot_ui.vline(VLine::new(t).color(Color32::from_gray(110)).width(0.5));
            }
        });
}

// ---------------------------------------------------------------------------
// Projections: matrix summed along each dimension
// ---------------------------------------------------------------------------

pub fn projections_plot(ui: &mut Ui, state: &AppState) {
    let Some(chrom) = result_or_hint(ui, state) else {
        return;
    };
    let projections = chrom.projections();
    let half = (ui.available_height() - ui.spacing().item_spacing.y) / 2.0;

    Plot::new("projection_d2")
        .height(half)
        .x_axis_label("D2 retention time [s]")
        .y_axis_label("Σ intensity")
        .allow_boxed_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(finite_points(&chrom.ax_d2, &projections.d2))
                    .name("D2 projection")
                    .color(Color32::LIGHT_BLUE),
            );
        });

    Plot::new("projection_d1")
        .height(half)
        .x_axis_label("D1 retention time [min]")
        .y_axis_label("Σ intensity")
        .allow_boxed_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(finite_points(&chrom.ax_d1, &projections.d1))
                    .name("D1 projection")
                    .color(Color32::LIGHT_RED),
            );
        });
}
