use crate::app::ImageSorterApp;
use eframe::egui;
use egui_phosphor::regular as Icon;

/// Render the top panel with folder selection, settings and progress
pub fn render_top_panel(app: &mut ImageSorterApp, ctx: &egui::Context) {
    egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.heading(format!("{} Image Sorter", Icon::SQUARES_FOUR));

            ui.add_space(20.0);

            let busy = app.jobs.is_running();
            if ui
                .add_enabled(
                    !busy,
                    egui::Button::new(format!("{} Open Folder", Icon::FOLDER_OPEN)),
                )
                .clicked()
            {
                if let Some(path) = rfd::FileDialog::new().pick_folder() {
                    app.open_folder(path);
                }
            }

            if ui
                .add_enabled(
                    !busy && app.ui.settings_draft.is_none(),
                    egui::Button::new(format!("{} Settings", Icon::GEAR)),
                )
                .clicked()
            {
                app.ui.settings_draft = Some(app.settings.clone());
            }

            ui.add_space(20.0);

            if let Some(folder) = app.session.folder() {
                ui.label(
                    egui::RichText::new(folder.display().to_string())
                        .small()
                        .color(egui::Color32::from_rgb(180, 180, 180)),
                );
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let total = app.session.total_images();
                if total == 0 {
                    return;
                }
                let processed = app.session.total_processed().min(total);
                ui.add(
                    egui::ProgressBar::new(processed as f32 / total as f32)
                        .desired_width(200.0)
                        .text(format!("{} / {}", processed, total)),
                );
                ui.label("Sorted:");
            });
        });
    });
}
