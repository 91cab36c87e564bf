use eframe::egui::Color32;

/// Colors offered to new labels, cycled in order
pub const LABEL_PALETTE: [&str; 8] = [
    "#ef4444", // Red
    "#10b981", // Green
    "#3b82f6", // Blue
    "#f59e0b", // Amber
    "#8b5cf6", // Purple
    "#ec4899", // Pink
    "#06b6d4", // Cyan
    "#84cc16", // Lime
];

pub const DEFAULT_LABELS: [&str; 3] = ["text", "figure", "photo"];

pub const GRID_MIN: usize = 1;
pub const GRID_MAX: usize = 20;
pub const DEFAULT_GRID: usize = 10;

pub const THUMBNAIL_MIN: u32 = 50;
pub const THUMBNAIL_MAX: u32 = 300;
pub const DEFAULT_THUMBNAIL: u32 = 160;

/// Application configuration containing all hardcoded values
#[derive(Clone)]
pub struct AppConfig {
    pub window_width: f32,
    pub window_height: f32,
    pub unclassified_color: Color32,
    pub cell_border_width: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window_width: 1400.0,
            window_height: 900.0,
            unclassified_color: Color32::from_gray(70),
            cell_border_width: 4.0,
        }
    }
}

impl AppConfig {
    /// Parse a label color, falling back to gray for malformed values
    pub fn label_color(&self, hex: &str) -> Color32 {
        Color32::from_hex(hex).unwrap_or(Color32::GRAY)
    }

    /// Palette entry for the label at `index`
    pub fn palette_color(index: usize) -> &'static str {
        LABEL_PALETTE[index % LABEL_PALETTE.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_color_parses_hex() {
        let config = AppConfig::default();
        assert_eq!(config.label_color("#ef4444"), Color32::from_rgb(0xef, 0x44, 0x44));
        assert_eq!(config.label_color("not a color"), Color32::GRAY);
    }

    #[test]
    fn test_palette_wraps() {
        assert_eq!(AppConfig::palette_color(0), "#ef4444");
        assert_eq!(AppConfig::palette_color(LABEL_PALETTE.len()), "#ef4444");
    }
}
