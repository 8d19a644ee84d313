//! Tag decoding on top of the EXIF reader.

use super::{
    DmsComponent, GeoSubStructure, GeoValue, TagMap, TagValue, GPS_LATITUDE, GPS_LATITUDE_REF,
    GPS_LONGITUDE, GPS_LONGITUDE_REF,
};
use crate::progress::ProgressSink;

use exif::{In, Value};
use log::{debug, warn};
use std::collections::BTreeMap;
use std::io::{self, BufRead, Seek};
use std::path::Path;

/// Open a file and decode its embedded metadata.
///
/// # Errors
///
/// Only fails if the file itself cannot be opened. A missing or broken metadata
/// block results in an empty [`TagMap`].
pub fn decode_file(filename: &Path, report: &dyn ProgressSink) -> io::Result<TagMap> {
    let file = std::fs::File::open(filename)?;
    Ok(decode(
        &mut std::io::BufReader::new(file),
        filename,
        report,
    ))
}

/// Decode the metadata block contained in `reader`.
///
/// `filename` is only used for reporting.
pub fn decode<R: BufRead + Seek>(
    reader: &mut R,
    filename: &Path,
    report: &dyn ProgressSink,
) -> TagMap {
    match exif::Reader::new().read_from_container(reader) {
        Ok(exif) => {
            let tags = decode_fields(exif.fields());
            debug!("Read {} tags from {}", tags.len(), filename.to_string_lossy());
            tags
        }
        Err(exif::Error::NotFound(_)) => {
            debug!("No EXIF data in {}", filename.to_string_lossy());
            report.report(&format!("No EXIF data found in {}", filename.to_string_lossy()));
            TagMap::new()
        }
        Err(exif_err) => {
            warn!(
                "Could not read EXIF from {}: {}",
                filename.to_string_lossy(),
                exif_err
            );
            report.report(&format!(
                "Could not read EXIF from {}: {}",
                filename.to_string_lossy(),
                exif_err
            ));
            TagMap::new()
        }
    }
}

/// Build a tag map from the fields of the primary image.
///
/// Fields belonging to the thumbnail are ignored so that they cannot shadow
/// the values of the actual photo.
pub fn decode_fields<'a, I>(fields: I) -> TagMap
where
    I: IntoIterator<Item = &'a exif::Field>,
{
    let mut tags = TagMap::new();
    let mut gps = BTreeMap::new();

    for field in fields.into_iter().filter(|f| f.ifd_num == In::PRIMARY) {
        let name = field.tag.to_string();
        if is_coordinate_field(&name) {
            gps.insert(name.clone(), geo_value(&field.value));
        }
        let value = decode_value(&field.value)
            .unwrap_or_else(|| TagValue::String(field.display_value().to_string()));
        tags.insert(name, value);
    }

    if !gps.is_empty() {
        tags.set_gps(GeoSubStructure::Named(gps));
    }
    tags
}

fn is_coordinate_field(name: &str) -> bool {
    name == GPS_LATITUDE
        || name == GPS_LATITUDE_REF
        || name == GPS_LONGITUDE
        || name == GPS_LONGITUDE_REF
}

/// Convert a raw EXIF value into a scalar.
///
/// Returns `None` for values that have no scalar representation, such as
/// multi-valued fields, which callers render as text instead.
pub fn decode_value(value: &Value) -> Option<TagValue> {
    match value {
        Value::Ascii(ref strings) if strings.len() == 1 => {
            Some(TagValue::String(ascii_to_string(&strings[0])))
        }
        Value::Byte(ref v) => single(v).map(|&n| TagValue::Integer(i64::from(n))),
        Value::Short(ref v) => single(v).map(|&n| TagValue::Integer(i64::from(n))),
        Value::Long(ref v) => single(v).map(|&n| TagValue::Integer(i64::from(n))),
        Value::SByte(ref v) => single(v).map(|&n| TagValue::Integer(i64::from(n))),
        Value::SShort(ref v) => single(v).map(|&n| TagValue::Integer(i64::from(n))),
        Value::SLong(ref v) => single(v).map(|&n| TagValue::Integer(i64::from(n))),
        Value::Rational(ref v) => {
            single(v).map(|r| rational_value(i64::from(r.num), i64::from(r.denom)))
        }
        Value::SRational(ref v) => {
            single(v).map(|r| rational_value(i64::from(r.num), i64::from(r.denom)))
        }
        Value::Float(ref v) => single(v).map(|&x| float_value(f64::from(x))),
        Value::Double(ref v) => single(v).map(|&x| float_value(x)),
        _ => None,
    }
}

fn single<T>(values: &[T]) -> Option<&T> {
    match values {
        [value] => Some(value),
        _ => None,
    }
}

fn ascii_to_string(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches('\0')
        .to_owned()
}

/// Reduce a fraction to a float, keeping the raw fraction as text if it is undefined.
fn rational_value(num: i64, denom: i64) -> TagValue {
    if denom == 0 {
        TagValue::String(format!("{}/{}", num, denom))
    } else {
        float_value(num as f64 / denom as f64)
    }
}

/// JSON has no representation for NaN or infinity.
fn float_value(x: f64) -> TagValue {
    if x.is_finite() {
        TagValue::Float(x)
    } else {
        TagValue::String(x.to_string())
    }
}

fn geo_value(value: &Value) -> GeoValue {
    match value {
        Value::Ascii(ref strings) => GeoValue::Text(
            strings
                .first()
                .map(|s| ascii_to_string(s))
                .unwrap_or_default(),
        ),
        Value::Rational(ref v) => GeoValue::Components(
            v.iter()
                .map(|r| DmsComponent::Rational {
                    num: i64::from(r.num),
                    denom: i64::from(r.denom),
                })
                .collect(),
        ),
        Value::SRational(ref v) => GeoValue::Components(
            v.iter()
                .map(|r| DmsComponent::Rational {
                    num: i64::from(r.num),
                    denom: i64::from(r.denom),
                })
                .collect(),
        ),
        Value::Float(ref v) => {
            GeoValue::Components(v.iter().map(|&x| DmsComponent::Number(f64::from(x))).collect())
        }
        Value::Double(ref v) => {
            GeoValue::Components(v.iter().map(|&x| DmsComponent::Number(x)).collect())
        }
        other => GeoValue::Text(format!("{:?}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::CollectingSink;
    use exif::{Field, Rational, SRational, Tag};
    use std::io::Cursor;

    fn field(tag: Tag, value: Value) -> Field {
        Field {
            tag,
            ifd_num: In::PRIMARY,
            value,
        }
    }

    #[test]
    fn scalars_are_classified() {
        assert_eq!(
            decode_value(&Value::Ascii(vec![b"Nikon D850".to_vec()])),
            Some(TagValue::String("Nikon D850".to_owned()))
        );
        assert_eq!(
            decode_value(&Value::Short(vec![2])),
            Some(TagValue::Integer(2))
        );
        assert_eq!(
            decode_value(&Value::SLong(vec![-7])),
            Some(TagValue::Integer(-7))
        );
        assert_eq!(
            decode_value(&Value::Rational(vec![Rational { num: 28, denom: 10 }])),
            Some(TagValue::Float(2.8))
        );
        assert_eq!(
            decode_value(&Value::SRational(vec![SRational { num: -2, denom: 3 }])),
            Some(TagValue::Float(-2.0 / 3.0))
        );
        assert_eq!(decode_value(&Value::Short(vec![1, 2, 3])), None);
    }

    #[test]
    fn zero_over_zero_falls_back_to_text() {
        assert_eq!(
            decode_value(&Value::Rational(vec![Rational { num: 0, denom: 0 }])),
            Some(TagValue::String("0/0".to_owned()))
        );
        assert_eq!(
            decode_value(&Value::SRational(vec![SRational { num: 1, denom: 0 }])),
            Some(TagValue::String("1/0".to_owned()))
        );
    }

    #[test]
    fn non_finite_floats_become_text() {
        assert_eq!(
            decode_value(&Value::Double(vec![f64::NAN])),
            Some(TagValue::String("NaN".to_owned()))
        );
    }

    #[test]
    fn fields_are_collected_with_gps() {
        let fields = vec![
            field(Tag::Model, Value::Ascii(vec![b"Canon EOS 5D".to_vec()])),
            field(
                Tag::ExposureTime,
                Value::Rational(vec![Rational { num: 0, denom: 0 }]),
            ),
            field(Tag::GPSLatitudeRef, Value::Ascii(vec![b"S".to_vec()])),
            field(
                Tag::GPSLatitude,
                Value::Rational(vec![
                    Rational { num: 40, denom: 1 },
                    Rational { num: 26, denom: 1 },
                    Rational { num: 46, denom: 1 },
                ]),
            ),
            Field {
                tag: Tag::Model,
                ifd_num: In::THUMBNAIL,
                value: Value::Ascii(vec![b"thumbnail".to_vec()]),
            },
        ];

        let tags = decode_fields(&fields);
        assert_eq!(tags.attribute("Model"), "Canon EOS 5D");
        assert_eq!(tags.attribute("ExposureTime"), "0/0");
        assert_eq!(tags.attribute("GPSLatitudeRef"), "S");
        assert_eq!(tags.len(), 4);

        match tags.gps() {
            Some(GeoSubStructure::Named(gps)) => {
                assert_eq!(gps.get(GPS_LATITUDE_REF), Some(&GeoValue::text("S")));
                assert_eq!(
                    gps.get(GPS_LATITUDE),
                    Some(&GeoValue::rationals(&[(40, 1), (26, 1), (46, 1)]))
                );
                assert_eq!(gps.len(), 2);
            }
            other => panic!("unexpected gps structure {:?}", other),
        }
    }

    #[test]
    fn missing_metadata_yields_empty_map() {
        let sink = CollectingSink::new();
        let mut png = Vec::from(&b"\x89PNG\r\n\x1a\n"[..]);
        png.extend_from_slice(&[0u8; 64]);

        let tags = decode(&mut Cursor::new(png), Path::new("empty.png"), &sink);
        assert!(tags.is_empty());
        assert_eq!(sink.messages().len(), 1);
        assert!(sink.contains("empty.png"));
    }

    #[test]
    fn garbage_yields_empty_map() {
        let sink = CollectingSink::new();
        let tags = decode(&mut Cursor::new(vec![0u8; 50]), Path::new("junk.jpg"), &sink);
        assert!(tags.is_empty());
    }
}
