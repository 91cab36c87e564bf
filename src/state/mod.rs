mod app_state;
mod settings;

pub use app_state::{JobMessage, JobState, Notification, Tone, UIState};
pub use settings::{Settings, SettingsError};
