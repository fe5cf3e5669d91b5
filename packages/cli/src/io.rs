//! JSON file helpers for the CLI.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write as _};
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Reads and deserializes a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, Box<dyn std::error::Error>> {
    let file = File::open(path).map_err(|e| format!("Failed to open {}: {e}", path.display()))?;
    let value = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| format!("Failed to parse {}: {e}", path.display()))?;
    Ok(value)
}

/// Writes `value` as pretty JSON to `path`, or to stdout when `path` is
/// `None`.
pub fn write_json<T: Serialize>(
    value: &T,
    path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = path {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        log::info!("Wrote {}", path.display());
    } else {
        let stdout = std::io::stdout();
        let mut lock = stdout.lock();
        serde_json::to_writer_pretty(&mut lock, value)?;
        lock.write_all(b"\n")?;
    }

    Ok(())
}
