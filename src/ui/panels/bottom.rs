use crate::app::ImageSorterApp;
use eframe::egui;
use egui_phosphor::regular as Icon;

/// Render the bottom panel with commit/undo controls and the label legend
pub fn render_bottom_panel(app: &mut ImageSorterApp, ctx: &egui::Context) {
    let mut should_classify = false;
    let mut should_undo = false;

    egui::TopBottomPanel::bottom("bottom_panel").show(ctx, |ui| {
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.add_space(10.0);

            let busy = app.jobs.is_running();
            let selected = app.session.assigned_count();

            let commit_btn = ui.add_enabled(
                !busy && selected > 0,
                egui::Button::new(
                    egui::RichText::new(format!(
                        "{} Sort {} image{} (Enter)",
                        Icon::CHECK,
                        selected,
                        if selected == 1 { "" } else { "s" }
                    ))
                    .color(egui::Color32::WHITE),
                )
                .fill(egui::Color32::from_rgb(70, 130, 220)),
            );
            if commit_btn.clicked() {
                should_classify = true;
            }

            if ui
                .add_enabled(
                    !busy && app.session.can_undo(),
                    egui::Button::new(format!("{} Undo (Ctrl+Z)", Icon::ARROW_COUNTER_CLOCKWISE)),
                )
                .clicked()
            {
                should_undo = true;
            }

            if busy {
                ui.add_space(10.0);
                ui.spinner();
                ui.label("Moving files...");
            }

            ui.add_space(20.0);
            ui.separator();

            if app.labels.is_empty() {
                ui.label(
                    egui::RichText::new("No labels defined; add some in Settings")
                        .color(egui::Color32::from_rgb(220, 160, 60)),
                );
            } else {
                for label in app.labels.iter() {
                    let (rect, _) =
                        ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
                    ui.painter()
                        .rect_filled(rect, 2.0, app.config.label_color(&label.color));
                    ui.label(label.name.as_str());
                    ui.add_space(8.0);
                }
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(
                    egui::RichText::new(format!(
                        "{} remaining after this page | left click: next label, right click: previous, middle click: clear",
                        app.session.remaining_count()
                    ))
                    .small()
                    .color(egui::Color32::from_rgb(160, 160, 160)),
                );
            });
        });
        ui.add_space(8.0);
    });

    // Handle actions outside of the borrow
    if should_classify {
        app.classify();
    }
    if should_undo {
        app.undo();
    }
}
