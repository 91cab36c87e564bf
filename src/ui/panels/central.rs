use crate::app::ImageSorterApp;
use crate::core::{Direction, LabelState};
use eframe::egui;
use egui_phosphor::regular as Icon;

const CELL_PADDING: f32 = 6.0;
const CELL_ROUNDING: f32 = 4.0;

/// Render the thumbnail grid of the current page
pub fn render_central_panel(app: &mut ImageSorterApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        if app.session.folder().is_none() {
            render_placeholder(ui, Icon::FOLDER_OPEN, "Open a folder to start sorting");
            return;
        }
        if app.session.page().is_empty() {
            render_placeholder(ui, Icon::CHECK_CIRCLE, "No images left to sort");
            return;
        }

        let size = app.settings.thumbnail_size;
        if app.thumbnails.load_missing(ctx, app.session.page(), size) {
            ctx.request_repaint();
        }

        let mut clicked: Option<(String, Direction)> = None;
        let mut cleared: Option<String> = None;
        let cell = egui::vec2(size as f32, size as f32) + egui::vec2(CELL_PADDING, CELL_PADDING) * 2.0;

        egui::ScrollArea::both().show(ui, |ui| {
            egui::Grid::new("thumbnail_grid")
                .spacing([8.0, 8.0])
                .show(ui, |ui| {
                    for (i, image) in app.session.page().iter().enumerate() {
                        let (rect, response) = ui.allocate_exact_size(cell, egui::Sense::click());
                        let state = app.session.state(&image.path).cloned().unwrap_or_default();
                        let label = match &state {
                            LabelState::Assigned(id) => app.labels.get(id),
                            LabelState::Unclassified => None,
                        };
                        let border = label
                            .map(|label| app.config.label_color(&label.color))
                            .unwrap_or(app.config.unclassified_color);

                        let painter = ui.painter_at(rect);
                        painter.rect_filled(rect, CELL_ROUNDING, egui::Color32::from_gray(30));

                        let inner = rect.shrink(CELL_PADDING);
                        if let Some(texture) = app.thumbnails.get(&image.path) {
                            let tex_size = texture.size_vec2();
                            let scale = (inner.width() / tex_size.x).min(inner.height() / tex_size.y);
                            let image_rect =
                                egui::Rect::from_center_size(inner.center(), tex_size * scale);
                            painter.image(
                                texture.id(),
                                image_rect,
                                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                                egui::Color32::WHITE,
                            );
                        } else if app.thumbnails.is_failed(&image.path) {
                            painter.text(
                                inner.center(),
                                egui::Align2::CENTER_CENTER,
                                Icon::IMAGE_BROKEN,
                                egui::FontId::proportional(28.0),
                                egui::Color32::from_gray(140),
                            );
                        } else {
                            painter.text(
                                inner.center(),
                                egui::Align2::CENTER_CENTER,
                                Icon::HOURGLASS,
                                egui::FontId::proportional(20.0),
                                egui::Color32::from_gray(110),
                            );
                        }

                        if let Some(label) = label {
                            let badge = painter.layout_no_wrap(
                                label.name.clone(),
                                egui::FontId::proportional(12.0),
                                egui::Color32::WHITE,
                            );
                            let badge_rect = egui::Rect::from_min_size(
                                inner.min,
                                badge.size() + egui::vec2(8.0, 4.0),
                            );
                            painter.rect_filled(badge_rect, 2.0, border);
                            painter.galley(badge_rect.min + egui::vec2(4.0, 2.0), badge, egui::Color32::WHITE);
                        }

                        let stroke_width = if response.hovered() {
                            app.config.cell_border_width + 1.0
                        } else {
                            app.config.cell_border_width
                        };
                        painter.rect_stroke(
                            rect.shrink(stroke_width / 2.0),
                            CELL_ROUNDING,
                            egui::Stroke::new(stroke_width, border),
                        );

                        let response = response.on_hover_text(image.filename.as_str());
                        if response.clicked() {
                            clicked = Some((image.path.clone(), Direction::Forward));
                        } else if response.secondary_clicked() {
                            clicked = Some((image.path.clone(), Direction::Backward));
                        } else if response.middle_clicked() {
                            cleared = Some(image.path.clone());
                        }

                        if (i + 1) % app.settings.grid_cols.max(1) == 0 {
                            ui.end_row();
                        }
                    }
                });
        });

        if let Some((path, direction)) = clicked {
            app.handle_image_click(&path, direction);
        }
        if let Some(path) = cleared {
            app.clear_label(&path);
        }
    });
}

fn render_placeholder(ui: &mut egui::Ui, icon: &str, message: &str) {
    ui.centered_and_justified(|ui| {
        ui.label(
            egui::RichText::new(format!("{} {}", icon, message))
                .size(20.0)
                .color(egui::Color32::from_gray(150)),
        );
    });
}
