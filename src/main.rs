mod app;
mod color;
mod data;
mod state;
mod ui;
mod worker;

use app::Lc2dApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "LC×LC – 2D Chromatogram Viewer",
        options,
        Box::new(|_cc| Ok(Box::new(Lc2dApp::default()))),
    )
}
