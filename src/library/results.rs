//! Persistence of a whole scan as a single JSON document.

use super::ImageRecord;
use crate::config::Config;
use crate::errors::{Error, Result};
use crate::progress::ProgressSink;

use log::{error, info};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Where the results of a scan go inside the vault directory.
pub fn default_destination(vault_dir: &Path, config: &Config) -> PathBuf {
    vault_dir.join(&config.results_file)
}

/// Write all records to `destination` as an indented JSON array.
///
/// # Errors
///
/// Fails if the file cannot be created or written. The records are left
/// untouched, so writing can be retried with another destination.
pub fn persist(
    results: &[ImageRecord],
    destination: &Path,
    report: &dyn ProgressSink,
) -> Result<()> {
    match write_json(results, destination) {
        Ok(()) => {
            info!(
                "Scan results saved to {} ({} photos)",
                destination.to_string_lossy(),
                results.len()
            );
            report.report(&format!(
                "Scan results saved to {}",
                destination.to_string_lossy()
            ));
            Ok(())
        }
        Err(source) => {
            error!(
                "Failed to write scan results to {}: {}",
                destination.to_string_lossy(),
                source
            );
            report.report(&format!(
                "Error: Failed to write scan results to {}: {}",
                destination.to_string_lossy(),
                source
            ));
            Err(Error::Persist {
                path: destination.to_path_buf(),
                source,
            })
        }
    }
}

fn write_json(results: &[ImageRecord], destination: &Path) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(destination)?);
    serde_json::to_writer_pretty(&mut writer, results)?;
    writer.write_all(b"\n")?;
    writer.flush()
}

/// Read back the records written by [`persist`].
pub fn load(path: &Path) -> Result<Vec<ImageRecord>> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}
