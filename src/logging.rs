use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing::Level;

/// Send tracing output to an append-only file. The terminal belongs to the TUI.
pub fn init(path: &Path, verbose: bool) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let level = if verbose { Level::DEBUG } else { Level::INFO };
    // a subscriber may already be installed (tests); keep that one
    let _ = tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(level)
        .try_init();

    Ok(())
}
