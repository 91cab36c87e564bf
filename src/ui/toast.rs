use crate::app::ImageSorterApp;
use crate::state::Tone;
use eframe::egui;
use egui_phosphor::regular as Icon;

/// Render the current notification in the bottom-left corner until it expires
pub fn render_toast_notification(app: &mut ImageSorterApp, ctx: &egui::Context) {
    let Some(notification) = &app.ui.notification else {
        return;
    };
    if notification.is_expired() {
        app.ui.notification = None;
        return;
    }

    let (icon, accent) = match notification.tone {
        Tone::Info => (Icon::INFO, egui::Color32::from_rgb(100, 149, 237)),
        Tone::Success => (Icon::CHECK_CIRCLE, egui::Color32::from_rgb(80, 200, 120)),
        Tone::Error => (Icon::WARNING, egui::Color32::from_rgb(220, 80, 80)),
    };
    let message = notification.message.clone();
    let mut dismissed = false;

    egui::Window::new("notification_toast")
        .title_bar(false)
        .resizable(false)
        .collapsible(false)
        .fixed_pos(egui::pos2(20.0, ctx.screen_rect().height() - 130.0))
        .show(ctx, |ui| {
            ui.set_min_width(280.0);

            let frame = egui::Frame::none()
                .fill(egui::Color32::from_rgb(45, 45, 48))
                .stroke(egui::Stroke::new(1.0, accent))
                .rounding(6.0)
                .inner_margin(12.0);

            frame.show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(icon).size(20.0).color(accent));
                    ui.label(egui::RichText::new(message).color(egui::Color32::WHITE));
                    if ui.small_button(Icon::X).clicked() {
                        dismissed = true;
                    }
                });
            });
        });

    if dismissed {
        app.ui.notification = None;
    } else {
        // Keep repainting so the toast disappears on time
        ctx.request_repaint_after(std::time::Duration::from_millis(250));
    }
}
