use eframe::egui;

use crate::state::{AppState, View};
use crate::ui::{panels, plot, table};
use crate::worker::Worker;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct Lc2dApp {
    pub state: AppState,
    pub worker: Worker,
    /// Heat-map texture, re-uploaded whenever `state.heat_dirty` is set.
    heat_texture: Option<egui::TextureHandle>,
}

impl Lc2dApp {
    fn refresh_heat_texture(&mut self, ctx: &egui::Context) {
        if !self.state.heat_dirty {
            return;
        }
        self.state.heat_dirty = false;
        self.heat_texture = match (&self.state.result, &self.state.heat_scale) {
            (Some(chrom), Some(scale)) => Some(ctx.load_texture(
                "contour",
                self.state.heat_style.render(scale, &chrom.matrix),
                egui::TextureOptions::NEAREST,
            )),
            _ => None,
        };
    }
}

impl eframe::App for Lc2dApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        for msg in self.worker.poll() {
            self.state.apply(msg);
        }
        self.refresh_heat_texture(ctx);

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state, &self.worker);
        });

        // ---- Left side panel: processing parameters ----
        egui::SidePanel::left("parameter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state, &self.worker);
            });

        // ---- Central panel: output views ----
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::view_tabs(ui, &mut self.state);
            ui.separator();
            match self.state.view {
                View::Contour => plot::contour_plot(ui, &self.state, self.heat_texture.as_ref()),
                View::Overlay => plot::overlay_plot(ui, &self.state),
                View::Raw => plot::raw_plot(ui, &self.state),
                View::Projections => plot::projections_plot(ui, &self.state),
                View::Matrix => table::matrix_table(ui, &self.state),
            }
        });
    }
}
