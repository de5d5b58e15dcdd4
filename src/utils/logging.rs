use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing::Level;

use crate::error::{ProcessingError, Result};

/// Install the global fmt subscriber.
///
/// Warnings and errors only by default; `verbose` lowers the level to debug.
/// With a log file the output is appended there without ANSI colours.
pub fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false);

    let installed = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    installed.map_err(|e| ProcessingError::Config(format!("Failed to initialise logging: {}", e)))
}
