//! General CLI functions.
use vault_scanner::{Config, ProgressSink};

use anyhow::bail;
use log::{debug, info};
use std::io;
use std::path::Path;

pub mod scan;

pub fn progress_style() -> indicatif::ProgressStyle {
    indicatif::ProgressStyle::default_bar()
        .progress_chars("=> ")
        .template("{msg} [{wide_bar}] {pos}/{len} ({eta})")
}

/// Shows the progress of a scan as a terminal progress bar.
///
/// Status messages are printed above the bar, either all of them or only errors.
pub struct BarSink {
    progress_bar: indicatif::ProgressBar,
    verbose: bool,
}

impl BarSink {
    pub fn new(verbose: bool) -> Self {
        let progress_bar = indicatif::ProgressBar::new_spinner();
        progress_bar.set_message("Collecting files");
        Self {
            progress_bar,
            verbose,
        }
    }
}

impl ProgressSink for BarSink {
    fn report(&self, message: &str) {
        if self.verbose || message.starts_with("Error") {
            self.progress_bar.println(message);
        } else {
            self.progress_bar.tick();
        }
    }

    fn begin(&self, total: usize) {
        self.progress_bar.set_style(progress_style());
        self.progress_bar.set_length(total as u64);
        self.progress_bar.set_position(0);
        self.progress_bar.set_message("Scanning");
    }

    fn advance(&self) {
        self.progress_bar.inc(1);
    }

    fn finish(&self) {
        self.progress_bar.finish_and_clear();
    }
}

/// Show the configuration, or write the default one.
/// If overwrite is true, an existing configuration is renamed before writing the defaults.
pub fn config(path: &Path, init: bool, overwrite: bool) -> anyhow::Result<()> {
    if init {
        if path.exists() {
            if overwrite {
                backup_file(path)?;
            } else {
                bail!(
                    "Configuration {} already exists",
                    path.to_string_lossy()
                );
            }
        }
        Config::default().save(path)?;
        info!("Configuration initialized");
        return Ok(());
    }

    let exists = path.is_file();
    println!(
        "Config: {} ({})",
        path.to_string_lossy(),
        if exists { "FOUND" } else { "NOT FOUND" },
    );
    let config = if exists {
        Config::load(path)?
    } else {
        Config::default()
    };
    println!("{}", serde_json::to_string_pretty(&config)?);

    Ok(())
}

/// Create a backup of a file by renaming it, appending `<NUM>.bak` to the name
/// with `<NUM>` being the smallest number such that the resulting file name doesn't exist.
fn backup_file(file_path: &Path) -> io::Result<()> {
    let file_name = file_path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Not a file"))?;
    for bak_num in 0..10 {
        let mut name = file_name.to_os_string();
        name.push(format!(".{}.bak", bak_num));
        let bak_file = file_path.with_file_name(&name);

        if bak_file.exists() {
            debug!("Backup {} already exists", bak_file.to_string_lossy());
        } else {
            info!("Moving {} to {}", file_path.to_string_lossy(), bak_file.to_string_lossy());
            return std::fs::rename(file_path, &bak_file);
        }
    }
    Err(io::Error::new(io::ErrorKind::Other, "Too many backups"))
}
