//! Log output setup.
//!
//! The backdrop owns the terminal, so while it runs logs go to a file in the
//! data directory. Other commands log to stderr.

use std::fs::{self, File};
use std::sync::Mutex;

use tracing::Level;

const LOG_FILE: &str = "folio.log";

fn level(verbose: u8) -> Level {
    match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Log to stderr.
pub fn init_stderr(verbose: u8) {
    tracing_subscriber::fmt()
        .with_max_level(level(verbose))
        .with_writer(std::io::stderr)
        .init();
}

/// Log to `folio.log` in the data directory. Logging stays off if the file
/// cannot be opened.
pub fn init_file(verbose: u8) {
    let Some(dir) = folio_config::data_dir() else {
        return;
    };
    if fs::create_dir_all(&dir).is_err() {
        return;
    }
    let path = dir.join(LOG_FILE);
    let Ok(file) = File::options().create(true).append(true).open(&path) else {
        return;
    };

    tracing_subscriber::fmt()
        .with_max_level(level(verbose))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    tracing::debug!(path = %path.display(), "logging to file");
}
