//! Persistent scanner settings, stored as JSON.

use crate::errors::{Error, Result};
use crate::library::date::DEFAULT_DATE_TAGS;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "config.json";
pub const DEFAULT_RESULTS_FILE: &str = "scan_results.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory that is scanned when none is given on the command line.
    pub scan_dir: Option<PathBuf>,
    /// Directory the scan results are written to.
    pub vault_dir: Option<PathBuf>,
    /// Number of files read in parallel. 0 uses one thread per CPU.
    pub max_threads: usize,
    /// File extensions that are considered photos, compared case-insensitively.
    pub image_extensions: Vec<String>,
    /// Tags holding the capture date, in order of preference.
    pub date_tags: Vec<String>,
    /// Name of the results file inside the vault directory.
    pub results_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scan_dir: None,
            vault_dir: None,
            max_threads: 4,
            image_extensions: vec!["jpg".to_owned(), "jpeg".to_owned(), "png".to_owned()],
            date_tags: DEFAULT_DATE_TAGS.iter().map(|&tag| tag.to_owned()).collect(),
            results_file: DEFAULT_RESULTS_FILE.to_owned(),
        }
    }
}

impl Config {
    /// Location of the configuration file in the user's config directory.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "vault-scanner")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        serde_json::from_reader(BufReader::new(file)).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the configuration, or store and return the defaults if there is
    /// no usable configuration at `path`.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(err) => {
                match err {
                    Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                        info!("No configuration at {}, creating it", path.to_string_lossy())
                    }
                    _ => warn!("Replacing unusable configuration: {}", err),
                }
                let config = Self::default();
                config.save(path)?;
                Ok(config)
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    /// Number of worker threads to scan with.
    pub fn worker_threads(&self) -> usize {
        if self.max_threads == 0 {
            num_cpus::get()
        } else {
            self.max_threads
        }
    }
}
