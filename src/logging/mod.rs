//! Logging for the image sorter
//!
//! - Bracketed event format with local timestamps
//! - Dual output (stdout + timestamped log file)

mod formatter;
mod setup;

pub use setup::setup_logging;
