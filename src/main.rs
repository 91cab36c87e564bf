use eframe::egui;
use tracing::info;

mod app;
mod config;
mod core;
mod logging;
mod state;
mod ui;

use app::ImageSorterApp;
use state::Settings;

fn main() -> Result<(), eframe::Error> {
    if let Err(e) = logging::setup_logging() {
        eprintln!("Failed to set up logging: {}", e);
    }

    let settings = Settings::load();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([settings.window_width, settings.window_height])
            .with_min_inner_size([640.0, 480.0])
            .with_title("Image Sorter"),
        ..Default::default()
    };

    info!("Launching application window");
    eframe::run_native(
        "Image Sorter",
        options,
        Box::new(|cc| {
            let mut fonts = egui::FontDefinitions::default();
            egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
            cc.egui_ctx.set_fonts(fonts);

            Ok(Box::new(ImageSorterApp::new(settings)))
        }),
    )
}
