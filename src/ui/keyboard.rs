use crate::app::ImageSorterApp;
use eframe::egui;
use tracing::debug;

/// Handle keyboard shortcuts: Enter sorts the page, Ctrl+Z undoes the last sort
pub fn handle_keyboard_shortcuts(app: &mut ImageSorterApp, ctx: &egui::Context) {
    // Typing into a text field (settings window) must not trigger shortcuts
    if ctx.wants_keyboard_input() || app.ui.settings_draft.is_some() {
        return;
    }

    if ctx.input(|i| i.key_pressed(egui::Key::Enter)) {
        debug!("[KEYBOARD] Enter pressed");
        app.classify();
    }
    if ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::Z)) {
        debug!("[KEYBOARD] Ctrl+Z pressed");
        app.undo();
    }
}
