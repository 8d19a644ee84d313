//! Decoded metadata of a single image file.
//!
//! A [`TagMap`] holds every tag of one file as a JSON-safe scalar, keyed by the
//! tag's symbolic name. GPS coordinates are kept apart as a [`GeoSubStructure`],
//! since they are the only values that need structure beyond a scalar.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

pub mod tags;

pub use self::tags::{decode, decode_file};

/// Names of the four GPS fields a coordinate is made of.
pub const GPS_LATITUDE: &str = "GPSLatitude";
pub const GPS_LATITUDE_REF: &str = "GPSLatitudeRef";
pub const GPS_LONGITUDE: &str = "GPSLongitude";
pub const GPS_LONGITUDE_REF: &str = "GPSLongitudeRef";

/// Value of a single decoded tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TagValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TagValue::Null => Ok(()),
            TagValue::Boolean(b) => write!(f, "{}", b),
            TagValue::Integer(i) => write!(f, "{}", i),
            TagValue::Float(x) => write!(f, "{}", x),
            TagValue::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for TagValue {
    fn from(s: &str) -> Self {
        TagValue::String(s.to_owned())
    }
}

impl From<String> for TagValue {
    fn from(s: String) -> Self {
        TagValue::String(s)
    }
}

impl From<i64> for TagValue {
    fn from(i: i64) -> Self {
        TagValue::Integer(i)
    }
}

impl From<f64> for TagValue {
    fn from(x: f64) -> Self {
        TagValue::Float(x)
    }
}

/// One degree, minute or second component of a GPS coordinate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DmsComponent {
    /// Not yet reduced `num / denom` fraction.
    Rational { num: i64, denom: i64 },
    Number(f64),
    /// Anything that is not numeric at all.
    Text(String),
}

/// A single field of the GPS sub-structure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GeoValue {
    Text(String),
    Components(Vec<DmsComponent>),
}

impl GeoValue {
    /// Build a degree/minute/second triple from `(num, denom)` pairs.
    pub fn rationals(parts: &[(i64, i64)]) -> Self {
        GeoValue::Components(
            parts
                .iter()
                .map(|&(num, denom)| DmsComponent::Rational { num, denom })
                .collect(),
        )
    }

    pub fn numbers(parts: &[f64]) -> Self {
        GeoValue::Components(parts.iter().copied().map(DmsComponent::Number).collect())
    }

    pub fn text<S: Into<String>>(s: S) -> Self {
        GeoValue::Text(s.into())
    }
}

/// GPS data as found in a file, either as the four values in positional order
/// (latitude, latitude ref, longitude, longitude ref) or keyed by field name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GeoSubStructure {
    Positional(Vec<GeoValue>),
    Named(BTreeMap<String, GeoValue>),
}

/// All tags decoded from the metadata block of one file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TagMap {
    tags: BTreeMap<String, TagValue>,
    gps: Option<GeoSubStructure>,
}

impl TagMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<K: Into<String>, V: Into<TagValue>>(&mut self, name: K, value: V) {
        self.tags.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&TagValue> {
        self.tags.get(name)
    }

    /// Render the tag as text, or return an empty string if it is absent.
    pub fn attribute(&self, name: &str) -> String {
        self.get(name).map(ToString::to_string).unwrap_or_default()
    }

    pub fn gps(&self) -> Option<&GeoSubStructure> {
        self.gps.as_ref()
    }

    pub fn set_gps(&mut self, gps: GeoSubStructure) {
        self.gps = Some(gps);
    }

    /// Number of scalar tags, not counting the GPS sub-structure.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.gps.is_none()
    }
}
