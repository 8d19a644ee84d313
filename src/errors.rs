use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Scan root doesn't exist or is not a directory
    #[error("Invalid scan root {}", .0.to_string_lossy())]
    InvalidRoot(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// The scan results could not be written. The in-memory results are still intact.
    #[error("Could not write scan results to {}: {source}", .path.to_string_lossy())]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid configuration in {}: {source}", .path.to_string_lossy())]
    Config {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Could not start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, Error>;
