//! Scans photo folders and extracts normalized metadata records from the images in them.
//!
//! The entry point is [`library::Scanner`], which walks a directory tree, decodes the
//! EXIF data of every photo (see [`formats`]) and turns it into an [`ImageRecord`].
//! The collected records are written with [`library::results::persist`].

pub mod config;
pub mod errors;
pub mod formats;
pub mod library;
pub mod progress;

pub use config::Config;
pub use errors::{Error, Result};
pub use library::{ImageRecord, PhotoPath, ScanResultSet, Scanner, SkipReason};
pub use progress::ProgressSink;
