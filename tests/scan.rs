use exif::experimental::Writer;
use exif::{Field, In, Rational, Tag, Value};
use std::io::Cursor;
use std::path::Path;

use vault_scanner::library::results;
use vault_scanner::progress::CollectingSink;
use vault_scanner::{Config, Error, Scanner};

fn ascii(tag: Tag, text: &str) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value: Value::Ascii(vec![text.as_bytes().to_vec()]),
    }
}

fn rationals(tag: Tag, parts: &[(u32, u32)]) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value: Value::Rational(
            parts
                .iter()
                .map(|&(num, denom)| Rational { num, denom })
                .collect(),
        ),
    }
}

/// A JPEG consisting of nothing but an APP1 segment with the given EXIF fields.
fn jpeg_with_exif(fields: &[Field]) -> Vec<u8> {
    let mut writer = Writer::new();
    for field in fields {
        writer.push_field(field);
    }
    let mut tiff = Cursor::new(Vec::new());
    writer.write(&mut tiff, false).unwrap();
    let tiff = tiff.into_inner();

    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1];
    let segment_len = (2 + 6 + tiff.len()) as u16;
    jpeg.extend_from_slice(&segment_len.to_be_bytes());
    jpeg.extend_from_slice(b"Exif\0\0");
    jpeg.extend_from_slice(&tiff);
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    jpeg
}

fn full_metadata_jpeg() -> Vec<u8> {
    jpeg_with_exif(&[
        ascii(Tag::Model, "Nikon D850"),
        ascii(Tag::DateTimeOriginal, "2023:05:15 14:30:00"),
        ascii(Tag::DateTime, "2023:05:16 09:00:00"),
        rationals(Tag::FNumber, &[(28, 10)]),
        rationals(Tag::ExposureTime, &[(0, 0)]),
        Field {
            tag: Tag::PhotographicSensitivity,
            ifd_num: In::PRIMARY,
            value: Value::Short(vec![400]),
        },
        ascii(Tag::GPSLatitudeRef, "S"),
        rationals(Tag::GPSLatitude, &[(40, 1), (26, 1), (46, 1)]),
        ascii(Tag::GPSLongitudeRef, "W"),
        rationals(Tag::GPSLongitude, &[(122, 1), (25, 1), (1200, 100)]),
    ])
}

/// PNG signature followed by an empty IEND chunk.
const BARE_PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\0IEND\xaeB`\x82";

fn has_errors(sink: &CollectingSink) -> bool {
    sink.messages().iter().any(|m| m.starts_with("Error"))
}

#[cfg(unix)]
#[test]
fn mixed_directory() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::write(root.join("a.jpg"), full_metadata_jpeg()).unwrap();
    std::fs::write(root.join("b.png"), BARE_PNG).unwrap();
    std::fs::write(root.join("notes.txt"), "not a photo").unwrap();
    std::os::unix::fs::symlink(root.join("missing.jpg"), root.join("broken.jpg")).unwrap();

    let sink = CollectingSink::new();
    let records = Scanner::default().scan(root, &sink).unwrap();

    let relative: Vec<_> = records.iter().map(|r| r.relative_path.as_str()).collect();
    assert_eq!(relative, vec!["a.jpg", "b.png"]);
    assert!(!has_errors(&sink), "{:?}", sink.messages());
    assert!(sink.contains("Skipping symbolic link"));
    assert!(!sink.contains("notes.txt"));
    assert_eq!(sink.processed(), 2);

    let photo = &records[0];
    assert!(Path::new(&photo.original_path).is_absolute());
    assert_eq!(photo.camera_model, "Nikon D850");
    assert_eq!(photo.aperture, "2.8");
    assert_eq!(photo.iso, "400");
    assert_eq!(photo.shutter_speed, "0/0");
    assert_eq!(photo.white_balance, "");
    assert_eq!(photo.gps_data.as_deref(), Some("-40.446111,-122.420000"));
    assert_eq!(
        photo.date_taken.map(|d| d.to_string()).as_deref(),
        Some("2023-05-15 14:30:00")
    );
    assert!(photo.file_creation_date.is_some());

    let png = &records[1];
    assert_eq!(png.date_taken, None);
    assert!(png.file_creation_date.is_some());
    assert_eq!(png.gps_data, None);
    assert_eq!(png.camera_model, "");
}

#[cfg(unix)]
#[test]
fn links_to_directories_are_not_followed() {
    let dir = tempfile::tempdir().unwrap();
    let city = dir.path().join("Laos").join("Luang_Prabang");
    std::fs::create_dir_all(&city).unwrap();
    std::fs::write(city.join("image1.jpg"), full_metadata_jpeg()).unwrap();
    std::os::unix::fs::symlink("..", city.join("parent_link")).unwrap();

    let sink = CollectingSink::new();
    let records = Scanner::default().scan(dir.path(), &sink).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].relative_path, "Laos/Luang_Prabang/image1.jpg");
    assert!(records.iter().all(|r| !r.relative_path.contains("parent_link")));
    assert!(!has_errors(&sink));
}

#[test]
fn parallel_scan_keeps_traversal_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut expected = Vec::new();
    for folder in &["2021", "2022", "2023"] {
        std::fs::create_dir(dir.path().join(folder)).unwrap();
        for i in 0..8 {
            let name = format!("img{:02}.JPG", i);
            std::fs::write(dir.path().join(folder).join(&name), full_metadata_jpeg()).unwrap();
            expected.push(format!("{}/{}", folder, name));
        }
    }

    let config = Config {
        max_threads: 4,
        ..Config::default()
    };
    let sink = CollectingSink::new();
    let records = Scanner::from_config(&config).scan(dir.path(), &sink).unwrap();

    let relative: Vec<_> = records.iter().map(|r| r.relative_path.clone()).collect();
    assert_eq!(relative, expected);
    assert_eq!(sink.processed(), expected.len());
}

#[test]
fn scan_results_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let photos = dir.path().join("photos");
    let vault = dir.path().join("vault");
    std::fs::create_dir_all(&photos).unwrap();
    std::fs::create_dir_all(&vault).unwrap();
    std::fs::write(photos.join("a.jpg"), full_metadata_jpeg()).unwrap();
    std::fs::write(photos.join("b.jpeg"), BARE_PNG).unwrap();

    let config = Config::default();
    let sink = CollectingSink::new();
    let records = Scanner::from_config(&config).scan(&photos, &sink).unwrap();
    assert_eq!(records.len(), 2);

    let destination = results::default_destination(&vault, &config);
    results::persist(&records, &destination, &sink).unwrap();
    assert_eq!(results::load(&destination).unwrap(), records);

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&destination).unwrap()).unwrap();
    assert!(json[1]["date_taken"].is_null());
    assert_eq!(json[1]["camera_model"], "");
    assert_eq!(json[0]["date_taken"], "2023-05-15T14:30:00");
}

#[test]
fn invalid_root_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("file.jpg");
    std::fs::write(&file, BARE_PNG).unwrap();

    let sink = CollectingSink::new();
    match Scanner::default().scan(&dir.path().join("nope"), &sink) {
        Err(Error::InvalidRoot(_)) => {}
        other => panic!("expected invalid root, got {:?}", other),
    }
    assert!(sink.contains("does not exist"));

    match Scanner::default().scan(&file, &sink) {
        Err(Error::InvalidRoot(_)) => {}
        other => panic!("expected invalid root, got {:?}", other),
    }
    assert!(sink.contains("not a directory"));
}

#[test]
fn empty_directory_gives_empty_result() {
    let dir = tempfile::tempdir().unwrap();
    let sink = CollectingSink::new();
    let records = Scanner::default().scan(dir.path(), &sink).unwrap();
    assert!(records.is_empty());
    assert!(sink.contains("0 total"));
}
