pub mod keyboard;
pub mod panels;
pub mod settings_dialog;
pub mod thumbnails;
pub mod toast;

// Re-export commonly used functions
pub use panels::{render_bottom_panel, render_central_panel, render_top_panel};

pub use keyboard::handle_keyboard_shortcuts;
pub use settings_dialog::render_settings_window;
pub use toast::render_toast_notification;
