use crate::config::Config;
use crate::errors::{Error, Result};
use crate::progress::ProgressSink;

use log::{debug, error, info};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

pub mod date;
pub mod geo;
pub mod photo;
pub mod results;

pub use photo::{ImageRecord, SkipReason};

/// Records of all photos that could be read, in traversal order.
pub type ScanResultSet = Vec<ImageRecord>;

/// Path to a photo file, providing fast access to both the relative path
/// to some root directory and to the absolute path.
/// Currently only supports paths that can be encoded as UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoPath {
    pub full_path: PathBuf,
    pub relative_path: String,
}

impl PhotoPath {
    /// Create a new photo path.
    ///
    /// # Errors
    ///
    /// Returns an error when the absolute photo path is not a subdirectory of the root directory,
    /// or when the path is not representable as UTF-8.
    pub fn new(root_dir: &Path, absolute_path: &Path) -> std::result::Result<Self, SkipReason> {
        let relative_path = absolute_path
            .strip_prefix(root_dir)
            .map_err(|_| SkipReason::OutsideRoot(absolute_path.to_path_buf()))?;
        let relative_str = relative_path
            .to_str()
            .ok_or_else(|| SkipReason::NonUtf8Path(absolute_path.to_path_buf()))?;
        Ok(Self {
            full_path: absolute_path.to_path_buf(),
            relative_path: relative_str.to_owned(),
        })
    }
}

/// Return an iterator for enumerating all files and directories under the given root path.
///
/// Symbolic links are reported as entries of their own and never followed.
pub fn scan_library(path: &Path) -> impl Iterator<Item = walkdir::Result<walkdir::DirEntry>> {
    walkdir::WalkDir::new(path)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
}

/// Walks a directory tree and builds an [`ImageRecord`] for every photo in it.
#[derive(Debug, Clone)]
pub struct Scanner {
    /// Lower case file extensions without the leading dot.
    extensions: Vec<String>,
    date_tags: Vec<String>,
    threads: usize,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl Scanner {
    pub fn from_config(config: &Config) -> Self {
        Self {
            extensions: config
                .image_extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            date_tags: config.date_tags.clone(),
            threads: config.worker_threads(),
        }
    }

    /// Override the number of worker threads, at least one is always used.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Check whether the file extension is one of the configured image extensions, ignoring case.
    pub fn is_candidate(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| {
                let ext = ext.to_lowercase();
                self.extensions.iter().any(|allowed| *allowed == ext)
            })
    }

    /// Scan the directory tree below `root` and read all photos in it.
    ///
    /// Files that cannot be read are reported and left out of the result, they
    /// never abort the scan.
    ///
    /// # Errors
    ///
    /// Fails if `root` is not an existing directory, or if the worker pool cannot be started.
    pub fn scan(&self, root: &Path, report: &dyn ProgressSink) -> Result<ScanResultSet> {
        info!("Starting scan of {}", root.to_string_lossy());

        if !root.exists() {
            report.report(&format!(
                "Error: Scan directory does not exist: {}",
                root.to_string_lossy()
            ));
            return Err(Error::InvalidRoot(root.to_path_buf()));
        }
        if !root.is_dir() {
            report.report(&format!(
                "Error: Scan path is not a directory: {}",
                root.to_string_lossy()
            ));
            return Err(Error::InvalidRoot(root.to_path_buf()));
        }
        let root = std::fs::canonicalize(root)?;

        // STEP 1 - Collect files

        let candidates = self.collect(&root, report);
        info!("Collected {} photos", candidates.len());

        // STEP 2 - Read files

        report.report(&format!("Starting scan with {} threads", self.threads));
        report.begin(candidates.len());

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .build()?;
        // collecting an indexed parallel iterator keeps the traversal order
        let outcomes: Vec<std::result::Result<ImageRecord, SkipReason>> = pool.install(|| {
            candidates
                .par_iter()
                .map(|path| {
                    debug!("Processing photo {}", path.full_path.to_string_lossy());
                    let outcome = ImageRecord::load(path, &self.date_tags, report);
                    if outcome.is_ok() {
                        report.report(&format!("Processed image: {}", path.relative_path));
                    }
                    report.advance();
                    outcome
                })
                .collect()
        });

        let mut results = ScanResultSet::with_capacity(outcomes.len());
        let mut failed = 0;
        for outcome in outcomes {
            match outcome {
                Ok(record) => results.push(record),
                Err(reason) => {
                    failed += 1;
                    error!("Skipping photo: {}", reason);
                    report.report(&format!("Error: {}", reason));
                }
            }
        }
        report.finish();

        let summary = format!(
            "Scanning done ({} total, {} added, {} failed)",
            candidates.len(),
            results.len(),
            failed
        );
        info!("{}", summary);
        report.report(&summary);

        Ok(results)
    }

    /// Enumerate all photo files below `root` in traversal order.
    ///
    /// Symbolic links are skipped without being followed. Unreadable directories
    /// are reported and skipped.
    pub fn collect(&self, root: &Path, report: &dyn ProgressSink) -> Vec<PhotoPath> {
        let mut photos = Vec::new();

        for result in scan_library(root) {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    error!("Error scanning library: {}", err);
                    report.report(&format!("Error: {}", err));
                    continue;
                }
            };

            if entry.path_is_symlink() {
                debug!("Skipping symbolic link {}", entry.path().to_string_lossy());
                report.report(&format!(
                    "Skipping symbolic link: {}",
                    entry.path().to_string_lossy()
                ));
            } else if entry.file_type().is_dir() {
                if entry.depth() > 0 {
                    report.report(&format!(
                        "Entering directory: {}",
                        entry.path().to_string_lossy()
                    ));
                }
            } else if entry.file_type().is_file() && self.is_candidate(entry.path()) {
                match PhotoPath::new(root, entry.path()) {
                    Ok(path) => {
                        report.report(&format!("Found image: {}", path.relative_path));
                        photos.push(path);
                    }
                    Err(reason) => {
                        error!("Skipping photo: {}", reason);
                        report.report(&format!("Error: {}", reason));
                    }
                }
            } else {
                debug!("Skipping non-image {}", entry.path().to_string_lossy());
            }
        }

        photos
    }
}
