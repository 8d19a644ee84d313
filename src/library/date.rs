//! Capture date of a photo, from its EXIF tags or from the file system.

use crate::formats::TagMap;

use chrono::NaiveDateTime;
use log::warn;
use std::path::Path;

/// Textual timestamp format used by EXIF date tags.
pub const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Date tags tried in order: original capture time first, then modification time.
pub const DEFAULT_DATE_TAGS: &[&str] = &["DateTimeOriginal", "DateTime"];

/// Return the first of the `candidates` tags that holds a valid EXIF timestamp.
///
/// Malformed values are logged and skipped. `None` means that the file system
/// timestamp has to be relied upon instead.
pub fn resolve_date<S: AsRef<str>>(tags: &TagMap, candidates: &[S]) -> Option<NaiveDateTime> {
    candidates.iter().find_map(|candidate| {
        let name = candidate.as_ref();
        let value = tags.get(name)?.to_string();
        match parse_exif_datetime(&value) {
            Some(datetime) => Some(datetime),
            None => {
                warn!("Ignoring malformed date in {}: {:?}", name, value);
                None
            }
        }
    })
}

pub fn parse_exif_datetime(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, EXIF_DATETIME_FORMAT).ok()
}

/// Time the file was created according to the file system, or its last
/// modification time where creation times are not recorded.
pub fn fallback_created_at(filename: &Path) -> Option<NaiveDateTime> {
    let timestamp = filename
        .metadata()
        .and_then(|meta| meta.created().or_else(|_| meta.modified()));
    match timestamp {
        Ok(time) => Some(chrono::DateTime::<chrono::Local>::from(time).naive_local()),
        Err(err) => {
            warn!(
                "Could not read file time of {}: {}",
                filename.to_string_lossy(),
                err
            );
            None
        }
    }
}
