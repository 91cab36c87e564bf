use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{
    AppConfig, DEFAULT_GRID, DEFAULT_LABELS, DEFAULT_THUMBNAIL, GRID_MAX, GRID_MIN, LABEL_PALETTE,
    THUMBNAIL_MAX, THUMBNAIL_MIN,
};
use crate::core::{GridSize, Label, LabelSet};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Could not determine the config directory")]
    NoConfigDir,

    #[error("Failed to access settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize settings: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persistent user settings that are saved between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Folder whose images are sorted; label folders are created inside it
    pub target_folder: Option<PathBuf>,

    /// Label names in cycle order, kept in sync with `labels`
    #[serde(default, alias = "classLabels")]
    pub label_names: Vec<String>,

    /// Labels with stable ids and colors
    #[serde(default)]
    pub labels: Vec<Label>,

    pub grid_cols: usize,
    pub grid_rows: usize,

    /// Edge length of a grid thumbnail in pixels
    #[serde(alias = "thumbnailWidth")]
    pub thumbnail_size: u32,

    pub window_width: f32,
    pub window_height: f32,
}

impl Default for Settings {
    fn default() -> Self {
        let labels = LabelSet::from_names(&DEFAULT_LABELS, &LABEL_PALETTE);
        let config = AppConfig::default();
        Self {
            target_folder: None,
            label_names: labels.names(),
            labels: labels.as_slice().to_vec(),
            grid_cols: DEFAULT_GRID,
            grid_rows: DEFAULT_GRID,
            thumbnail_size: DEFAULT_THUMBNAIL,
            window_width: config.window_width,
            window_height: config.window_height,
        }
    }
}

impl Settings {
    /// Path to `settings.json` in the platform config directory
    pub fn get_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "image-sorter")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Load settings from the default location, or defaults on any problem
    pub fn load() -> Self {
        match Self::get_config_path() {
            Some(path) => Self::load_from(&path),
            None => {
                warn!("Could not determine config directory. Using defaults.");
                Self::default()
            }
        }
    }

    /// Load settings from `path`. Missing, unreadable or malformed files yield
    /// defaults; out-of-range values are clamped.
    pub fn load_from(path: &Path) -> Self {
        info!("Loading settings from: {:?}", path);

        let settings = match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<Settings>(&contents) {
                Ok(settings) => {
                    info!("Successfully loaded settings");
                    settings
                }
                Err(e) => {
                    warn!("Failed to parse settings file: {}. Using defaults.", e);
                    Self::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No settings file found. Using defaults.");
                Self::default()
            }
            Err(e) => {
                warn!("Failed to read settings file: {}. Using defaults.", e);
                Self::default()
            }
        };

        settings.normalized()
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        info!("Settings saved to: {:?}", path);
        Ok(())
    }

    /// Repair values a hand-edited or legacy file may carry
    pub fn normalized(mut self) -> Self {
        self.grid_cols = self.grid_cols.clamp(GRID_MIN, GRID_MAX);
        self.grid_rows = self.grid_rows.clamp(GRID_MIN, GRID_MAX);
        self.thumbnail_size = self.thumbnail_size.clamp(THUMBNAIL_MIN, THUMBNAIL_MAX);

        let mut labels = if !self.labels.is_empty() {
            LabelSet::new(std::mem::take(&mut self.labels))
        } else if !self.label_names.is_empty() {
            LabelSet::from_names(self.label_names.as_slice(), &LABEL_PALETTE)
        } else {
            LabelSet::from_names(&DEFAULT_LABELS, &LABEL_PALETTE)
        };
        labels.dedup_ids();
        self.set_labels(&labels);
        self
    }

    pub fn grid(&self) -> GridSize {
        GridSize::new(self.grid_cols, self.grid_rows)
    }

    pub fn label_set(&self) -> LabelSet {
        LabelSet::new(self.labels.clone())
    }

    pub fn set_labels(&mut self, labels: &LabelSet) {
        self.labels = labels.as_slice().to_vec();
        self.label_names = labels.names();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LabelId;
    use tempfile::TempDir;

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert!(settings.target_folder.is_none());
        assert_eq!(settings.grid(), GridSize::new(10, 10));
        assert_eq!(settings.thumbnail_size, 160);
        assert_eq!(settings.label_names, vec!["text", "figure", "photo"]);
        assert_eq!(settings.labels[1].id, LabelId::legacy(1));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut settings = Settings {
            target_folder: Some(PathBuf::from("/photos/inbox")),
            grid_cols: 4,
            grid_rows: 3,
            ..Settings::default()
        };
        let mut labels = settings.label_set();
        labels.push("chart", "#3b82f6");
        settings.set_labels(&labels);

        settings.save_to(&path).unwrap();
        let loaded = Settings::load_from(&path);

        assert_eq!(loaded, settings);
        assert_eq!(loaded.label_names.len(), 4);
    }

    #[test]
    fn test_legacy_label_names_are_migrated() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{"targetFolder":"/data","classLabels":["cat","dog"],"gridCols":5,"gridRows":2}"#,
        )
        .unwrap();

        let loaded = Settings::load_from(&path);
        assert_eq!(loaded.target_folder, Some(PathBuf::from("/data")));
        assert_eq!(loaded.label_names, vec!["cat", "dog"]);
        assert_eq!(loaded.labels[0].id, LabelId::legacy(0));
        assert_eq!(loaded.labels[1].color, LABEL_PALETTE[1]);
        assert_eq!(loaded.grid(), GridSize::new(5, 2));
        assert_eq!(loaded.thumbnail_size, DEFAULT_THUMBNAIL);
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        assert_eq!(Settings::load_from(&path), Settings::default());
        assert_eq!(
            Settings::load_from(&dir.path().join("absent.json")),
            Settings::default()
        );
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"gridCols":0,"gridRows":99,"thumbnailSize":10}"#).unwrap();

        let loaded = Settings::load_from(&path);
        assert_eq!(loaded.grid(), GridSize::new(GRID_MIN, GRID_MAX));
        assert_eq!(loaded.thumbnail_size, THUMBNAIL_MIN);
        assert_eq!(loaded.label_names, vec!["text", "figure", "photo"]);
    }
}
