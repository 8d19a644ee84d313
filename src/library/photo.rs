//! Functionality for reading a single photo file into an [`ImageRecord`].

use super::date::{fallback_created_at, resolve_date};
use super::geo::resolve_coordinates;
use super::PhotoPath;
use crate::formats::{self, TagMap};
use crate::progress::ProgressSink;

use chrono::NaiveDateTime;
use log::debug;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Normalized metadata of one photo.
///
/// Every field is always present in the serialized form: missing timestamps and
/// coordinates are `null`, missing camera attributes are empty strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub original_path: String,
    pub relative_path: String,
    pub date_taken: Option<NaiveDateTime>,
    pub file_creation_date: Option<NaiveDateTime>,
    pub camera_model: String,
    pub shooting_mode: String,
    pub image_quality: String,
    pub metering_mode: String,
    pub af_mode: String,
    pub exposure_compensation: String,
    pub white_balance: String,
    pub picture_style: String,
    pub shutter_speed: String,
    pub aperture: String,
    pub focal_length: String,
    pub iso: String,
    pub gps_data: Option<String>,
    /// Reserved for labels assigned by image classification; always empty for now.
    pub ai_labels: Vec<String>,
}

/// Why a file was left out of the scan results.
#[derive(Debug, Error)]
pub enum SkipReason {
    #[error("Could not read {}: {source}", .path.to_string_lossy())]
    Io { path: PathBuf, source: io::Error },
    #[error("Path {} is not valid UTF-8", .0.to_string_lossy())]
    NonUtf8Path(PathBuf),
    #[error("Path {} is outside of the scan root", .0.to_string_lossy())]
    OutsideRoot(PathBuf),
}

impl ImageRecord {
    /// Read the photo at `path` and normalize its metadata.
    ///
    /// Missing or malformed metadata only leaves the affected fields empty.
    /// Only failing to read the file at all, or a path that cannot be represented
    /// as a string, causes the photo to be skipped.
    pub fn load<S: AsRef<str>>(
        path: &PhotoPath,
        date_tags: &[S],
        report: &dyn ProgressSink,
    ) -> Result<Self, SkipReason> {
        let tags = formats::decode_file(&path.full_path, report).map_err(|source| SkipReason::Io {
            path: path.full_path.clone(),
            source,
        })?;
        Self::from_tags(path, &tags, date_tags)
    }

    /// Assemble the record from already decoded tags.
    pub fn from_tags<S: AsRef<str>>(
        path: &PhotoPath,
        tags: &TagMap,
        date_tags: &[S],
    ) -> Result<Self, SkipReason> {
        let original_path = path
            .full_path
            .to_str()
            .ok_or_else(|| SkipReason::NonUtf8Path(path.full_path.clone()))?
            .to_owned();

        // both are always attempted, the record keeps them apart
        let date_taken = resolve_date(tags, date_tags);
        let file_creation_date = fallback_created_at(&path.full_path);
        if date_taken.is_none() {
            debug!(
                "No EXIF capture date for {}, file time is {:?}",
                path.relative_path, file_creation_date
            );
        }

        let gps_data = resolve_coordinates(tags).map(|coordinates| coordinates.to_string());

        Ok(Self {
            original_path,
            relative_path: path.relative_path.clone(),
            date_taken,
            file_creation_date,
            camera_model: tags.attribute(attributes::CAMERA_MODEL),
            shooting_mode: tags.attribute(attributes::SHOOTING_MODE),
            image_quality: tags.attribute(attributes::IMAGE_QUALITY),
            metering_mode: tags.attribute(attributes::METERING_MODE),
            af_mode: tags.attribute(attributes::AF_MODE),
            exposure_compensation: tags.attribute(attributes::EXPOSURE_COMPENSATION),
            white_balance: tags.attribute(attributes::WHITE_BALANCE),
            picture_style: tags.attribute(attributes::PICTURE_STYLE),
            shutter_speed: tags.attribute(attributes::SHUTTER_SPEED),
            aperture: tags.attribute(attributes::APERTURE),
            focal_length: tags.attribute(attributes::FOCAL_LENGTH),
            iso: tags.attribute(attributes::ISO),
            gps_data,
            ai_labels: Vec::new(),
        })
    }

    pub fn path(&self) -> &Path {
        Path::new(&self.original_path)
    }
}

/// Names of the tags the camera attributes of a record are read from.
pub mod attributes {
    pub const CAMERA_MODEL: &str = "Model";
    pub const SHOOTING_MODE: &str = "ExposureProgram";
    pub const IMAGE_QUALITY: &str = "Compression";
    pub const METERING_MODE: &str = "MeteringMode";
    /// Vendor specific, only present when a maker note decoder provides it.
    pub const AF_MODE: &str = "FocusMode";
    pub const EXPOSURE_COMPENSATION: &str = "ExposureBiasValue";
    pub const WHITE_BALANCE: &str = "WhiteBalance";
    /// Vendor specific, see `AF_MODE`.
    pub const PICTURE_STYLE: &str = "PictureStyle";
    pub const SHUTTER_SPEED: &str = "ExposureTime";
    pub const APERTURE: &str = "FNumber";
    pub const FOCAL_LENGTH: &str = "FocalLength";
    pub const ISO: &str = "PhotographicSensitivity";
}
