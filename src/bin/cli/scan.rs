//! CLI functions for scanning and listing photos.

use crate::cli::BarSink;
use vault_scanner::library::results;
use vault_scanner::{Config, Error, ImageRecord, ProgressSink, Scanner};

use anyhow::{format_err, Context};
use log::{error, info, warn};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Scan a directory tree and write the metadata of all photos to the vault.
pub fn scan(
    config: &Config,
    root: Option<PathBuf>,
    vault: Option<PathBuf>,
    threads: Option<usize>,
    verbose: bool,
) -> anyhow::Result<()> {
    let root = root
        .or_else(|| config.scan_dir.clone())
        .ok_or_else(|| format_err!("No scan directory given and none configured"))?;
    let vault = vault
        .or_else(|| config.vault_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));

    let mut scanner = Scanner::from_config(config);
    if let Some(threads) = threads {
        scanner = scanner.with_threads(threads);
    }

    let sink = BarSink::new(verbose);
    let photos = scanner.scan(&root, &sink)?;

    let written = store_results(&photos, &vault, Path::new("."), config, &sink)?;
    info!(
        "{} photos written to {}",
        photos.len(),
        written.to_string_lossy()
    );
    Ok(())
}

/// Write the scan results into the vault, or into `fallback_dir` if the vault
/// cannot be created or written to. Returns the file that was written.
fn store_results(
    photos: &[ImageRecord],
    vault: &Path,
    fallback_dir: &Path,
    config: &Config,
    report: &dyn ProgressSink,
) -> anyhow::Result<PathBuf> {
    let destination = results::default_destination(vault, config);
    let fallback = results::default_destination(fallback_dir, config);

    let outcome = match std::fs::create_dir_all(vault) {
        Ok(()) => results::persist(photos, &destination, report),
        Err(err) => {
            let message = format!(
                "Error: Could not create vault {}: {}",
                vault.to_string_lossy(),
                err
            );
            error!("{}", message);
            report.report(&message);
            Err(Error::Persist {
                path: destination.clone(),
                source: err,
            })
        }
    };

    match outcome {
        Ok(()) => Ok(destination),
        Err(Error::Persist { .. }) if destination != fallback => {
            warn!("Retrying in {}", fallback.to_string_lossy());
            results::persist(photos, &fallback, report)?;
            Ok(fallback)
        }
        Err(err) => Err(err.into()),
    }
}

/// List the photos of the last scan.
pub fn list(config: &Config, vault: Option<PathBuf>) -> anyhow::Result<()> {
    let vault = vault
        .or_else(|| config.vault_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    let source = results::default_destination(&vault, config);
    let photos = results::load(&source)
        .with_context(|| format!("Could not read scan results {}", source.to_string_lossy()))?;

    println!("total {}", photos.len());
    println!("Relative path\tTaken\tCamera\tGPS");
    for photo in photos.iter() {
        println!(
            "{}\t{}\t{}\t{}",
            photo.relative_path,
            photo
                .date_taken
                .map_or(Cow::Borrowed("-"), |ts| Cow::Owned(ts.to_string())),
            if photo.camera_model.is_empty() {
                "-"
            } else {
                photo.camera_model.as_str()
            },
            photo.gps_data.as_deref().unwrap_or("-"),
        );
    }

    Ok(())
}
