use directories::ProjectDirs;
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use super::formatter::BracketedFormatter;

const DEFAULT_FILTER: &str = "info,winit=warn,wgpu=warn,egui=warn,eframe=warn";

/// Folder that receives the log files
fn log_dir() -> PathBuf {
    ProjectDirs::from("", "", "image-sorter")
        .map(|dirs| dirs.data_local_dir().join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("image-sorter-logs"))
}

/// Install the global subscriber: stdout plus a timestamped log file.
/// `RUST_LOG` overrides the default filter.
pub fn setup_logging() -> io::Result<PathBuf> {
    let log_dir = log_dir();
    fs::create_dir_all(&log_dir)?;

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let log_path = log_dir.join(format!("image_sorter_{}.log", timestamp));

    let file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&log_path)?;

    let file_layer = fmt::layer()
        .event_format(BracketedFormatter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false);

    let stdout_layer = fmt::layer()
        .event_format(BracketedFormatter)
        .with_writer(io::stdout);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    info!("Starting Image Sorter");
    info!("Log file created at: {:?}", log_path);

    Ok(log_path)
}
