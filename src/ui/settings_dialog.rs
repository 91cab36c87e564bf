use crate::app::ImageSorterApp;
use crate::config::{AppConfig, GRID_MAX, GRID_MIN, THUMBNAIL_MAX, THUMBNAIL_MIN};
use crate::core::operations::file_ops::validate_label;
use crate::core::LabelId;
use crate::state::{Settings, Tone};
use eframe::egui;
use egui_phosphor::regular as Icon;
use std::collections::HashSet;
use tracing::info;

/// Edits queued while the label list is being drawn
enum LabelEdit {
    Remove(LabelId),
    Shift(LabelId, isize),
}

/// Check the edited labels before they are applied. Names become folder
/// names, so they must be valid single path components and unique.
pub fn validate_draft(draft: &Settings) -> Result<(), String> {
    let mut seen = HashSet::new();
    for label in &draft.labels {
        let name = label.name.trim();
        validate_label(name).map_err(|e| e.to_string())?;
        if !seen.insert(name.to_lowercase()) {
            return Err(format!("Duplicate label name: {}", name));
        }
    }
    Ok(())
}

fn hex_to_rgb(config: &AppConfig, hex: &str) -> [u8; 3] {
    let color = config.label_color(hex);
    [color.r(), color.g(), color.b()]
}

fn rgb_to_hex(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

/// Render the settings window while a draft is open
pub fn render_settings_window(app: &mut ImageSorterApp, ctx: &egui::Context) {
    let Some(mut draft) = app.ui.settings_draft.take() else {
        return;
    };

    let busy = app.jobs.is_running();
    let mut open = true;
    let mut should_save = false;
    let mut should_cancel = false;
    let mut edit: Option<LabelEdit> = None;

    egui::Window::new(format!("{} Settings", Icon::GEAR))
        .open(&mut open)
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.heading("Folder");
            ui.horizontal(|ui| {
                let folder = draft
                    .target_folder
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(none)".to_string());
                ui.label(folder);
                if ui.button(format!("{} Browse", Icon::FOLDER_OPEN)).clicked() {
                    if let Some(path) = rfd::FileDialog::new().pick_folder() {
                        draft.target_folder = Some(path);
                    }
                }
            });

            ui.separator();
            ui.heading("Grid");
            egui::Grid::new("settings_grid")
                .num_columns(2)
                .spacing([20.0, 6.0])
                .show(ui, |ui| {
                    ui.label("Columns:");
                    ui.add(egui::Slider::new(&mut draft.grid_cols, GRID_MIN..=GRID_MAX));
                    ui.end_row();

                    ui.label("Rows:");
                    ui.add(egui::Slider::new(&mut draft.grid_rows, GRID_MIN..=GRID_MAX));
                    ui.end_row();

                    ui.label("Thumbnail size:");
                    ui.add(
                        egui::Slider::new(&mut draft.thumbnail_size, THUMBNAIL_MIN..=THUMBNAIL_MAX)
                            .suffix(" px"),
                    );
                    ui.end_row();
                });

            ui.separator();
            ui.heading("Labels");
            let count = draft.labels.len();
            for (index, label) in draft.labels.iter_mut().enumerate() {
                ui.horizontal(|ui| {
                    let mut rgb = hex_to_rgb(&app.config, &label.color);
                    if ui.color_edit_button_srgb(&mut rgb).changed() {
                        label.color = rgb_to_hex(rgb);
                    }
                    ui.add(egui::TextEdit::singleline(&mut label.name).desired_width(160.0));

                    if ui
                        .add_enabled(index > 0, egui::Button::new(Icon::ARROW_UP))
                        .clicked()
                    {
                        edit = Some(LabelEdit::Shift(label.id.clone(), -1));
                    }
                    if ui
                        .add_enabled(index + 1 < count, egui::Button::new(Icon::ARROW_DOWN))
                        .clicked()
                    {
                        edit = Some(LabelEdit::Shift(label.id.clone(), 1));
                    }
                    if ui.button(Icon::TRASH).on_hover_text("Remove label").clicked() {
                        edit = Some(LabelEdit::Remove(label.id.clone()));
                    }
                });
            }

            ui.horizontal(|ui| {
                ui.add(
                    egui::TextEdit::singleline(&mut app.ui.new_label_name)
                        .hint_text("New label")
                        .desired_width(160.0),
                );
                let name = app.ui.new_label_name.trim().to_string();
                if ui
                    .add_enabled(!name.is_empty(), egui::Button::new(format!("{} Add", Icon::PLUS)))
                    .clicked()
                {
                    let mut labels = draft.label_set();
                    labels.push(name, AppConfig::palette_color(labels.len()));
                    draft.set_labels(&labels);
                    app.ui.new_label_name.clear();
                }
            });

            ui.separator();
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(
                        !busy,
                        egui::Button::new(format!("{} Save", Icon::FLOPPY_DISK)),
                    )
                    .on_disabled_hover_text("Wait for the current file operation to finish")
                    .clicked()
                {
                    should_save = true;
                }
                if ui.button("Cancel").clicked() {
                    should_cancel = true;
                }
            });
        });

    if let Some(edit) = edit {
        let mut labels = draft.label_set();
        match edit {
            LabelEdit::Remove(id) => {
                labels.remove(&id);
            }
            LabelEdit::Shift(id, offset) => {
                labels.shift(&id, offset);
            }
        }
        draft.set_labels(&labels);
    }

    if !open || should_cancel {
        app.ui.new_label_name.clear();
        return;
    }

    if should_save {
        for label in &mut draft.labels {
            label.name = label.name.trim().to_string();
        }
        let labels = draft.label_set();
        draft.set_labels(&labels);

        match validate_draft(&draft) {
            Ok(()) => {
                info!("Applying settings");
                app.ui.new_label_name.clear();
                // A failed folder change has already posted its own error
                if app.apply_settings(draft) {
                    app.ui.notify("Settings saved", Tone::Success);
                }
                return;
            }
            Err(message) => app.ui.notify(message, Tone::Error),
        }
    }

    app.ui.settings_draft = Some(draft);
}
