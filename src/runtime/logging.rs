use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::LogSettings;

/// Route `tracing` output to the configured file. With no file configured
/// no subscriber is installed and all events are no-ops, keeping the
/// terminal clean.
pub fn init(log: &LogSettings) {
    let Some(path) = &log.file else {
        return;
    };

    let file = match OpenOptions::new().create(true).append(true).open(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("rondo: could not open log file {}: {e}", path.display());
            return;
        }
    };

    let filter = EnvFilter::try_new(&log.filter).unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}
