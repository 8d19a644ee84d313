//! Conversion of EXIF GPS data into signed decimal degrees.

use crate::formats::{
    DmsComponent, GeoSubStructure, GeoValue, TagMap, GPS_LATITUDE, GPS_LATITUDE_REF,
    GPS_LONGITUDE, GPS_LONGITUDE_REF,
};

use log::warn;
use std::fmt;
use thiserror::Error;

/// Hemisphere references that flip the sign of an axis. Matched exactly.
const SOUTH: &str = "S";
const WEST: &str = "W";

/// A position in decimal degrees. Southern latitudes and western longitudes are negative.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Formats as `lat,lon` with six decimal places each.
impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.latitude, self.longitude)
    }
}

#[derive(Debug, Error, PartialEq)]
enum CoordinateError {
    #[error("incomplete GPS data ({0} of 4 fields present)")]
    Incomplete(usize),
    #[error("{0} is not a degree/minute/second triple")]
    NotATriple(&'static str),
    #[error("{field} has {len} components instead of 3")]
    WrongArity { field: &'static str, len: usize },
    #[error("{field} has non-numeric component {value:?}")]
    NonNumeric { field: &'static str, value: String },
    #[error("{field} has component {num}/{denom} with zero denominator")]
    ZeroDenominator {
        field: &'static str,
        num: i64,
        denom: i64,
    },
    #[error("{0} is not a finite number")]
    NotFinite(&'static str),
}

/// The four values a coordinate is made of, borrowed from the GPS sub-structure.
struct GpsFields<'a> {
    latitude: &'a GeoValue,
    latitude_ref: &'a GeoValue,
    longitude: &'a GeoValue,
    longitude_ref: &'a GeoValue,
}

impl<'a> GpsFields<'a> {
    fn extract(gps: &'a GeoSubStructure) -> Result<Self, CoordinateError> {
        match gps {
            GeoSubStructure::Positional(values) => match values.as_slice() {
                [latitude, latitude_ref, longitude, longitude_ref, ..] => Ok(Self {
                    latitude,
                    latitude_ref,
                    longitude,
                    longitude_ref,
                }),
                _ => Err(CoordinateError::Incomplete(values.len())),
            },
            GeoSubStructure::Named(map) => {
                let fields = (
                    map.get(GPS_LATITUDE),
                    map.get(GPS_LATITUDE_REF),
                    map.get(GPS_LONGITUDE),
                    map.get(GPS_LONGITUDE_REF),
                );
                match fields {
                    (Some(latitude), Some(latitude_ref), Some(longitude), Some(longitude_ref)) => {
                        Ok(Self {
                            latitude,
                            latitude_ref,
                            longitude,
                            longitude_ref,
                        })
                    }
                    (a, b, c, d) => {
                        let present = [a.is_some(), b.is_some(), c.is_some(), d.is_some()]
                            .iter()
                            .filter(|&&p| p)
                            .count();
                        Err(CoordinateError::Incomplete(present))
                    }
                }
            }
        }
    }
}

/// Resolve the GPS position stored in the tags, if any.
///
/// Missing, incomplete or malformed GPS data never fails the caller: it is
/// logged and results in `None`.
pub fn resolve_coordinates(tags: &TagMap) -> Option<Coordinates> {
    let gps = tags.gps()?;
    match coordinates_from(gps) {
        Ok(coordinates) => Some(coordinates),
        Err(err) => {
            warn!("Ignoring GPS data: {}", err);
            None
        }
    }
}

fn coordinates_from(gps: &GeoSubStructure) -> Result<Coordinates, CoordinateError> {
    let fields = GpsFields::extract(gps)?;

    let latitude = dms_to_decimal(GPS_LATITUDE, fields.latitude)?;
    let longitude = dms_to_decimal(GPS_LONGITUDE, fields.longitude)?;

    Ok(Coordinates {
        latitude: latitude * hemisphere_sign(fields.latitude_ref, SOUTH),
        longitude: longitude * hemisphere_sign(fields.longitude_ref, WEST),
    })
}

fn hemisphere_sign(reference: &GeoValue, negative: &str) -> f64 {
    match reference {
        GeoValue::Text(hemisphere) if hemisphere == negative => -1.0,
        _ => 1.0,
    }
}

/// `degrees + minutes / 60 + seconds / 3600`
fn dms_to_decimal(field: &'static str, value: &GeoValue) -> Result<f64, CoordinateError> {
    let components = match value {
        GeoValue::Components(components) => components,
        GeoValue::Text(_) => return Err(CoordinateError::NotATriple(field)),
    };
    let (degrees, minutes, seconds) = match components.as_slice() {
        [d, m, s] => (
            component_value(field, d)?,
            component_value(field, m)?,
            component_value(field, s)?,
        ),
        _ => {
            return Err(CoordinateError::WrongArity {
                field,
                len: components.len(),
            })
        }
    };

    let decimal = degrees + minutes / 60.0 + seconds / 3600.0;
    if decimal.is_finite() {
        Ok(decimal)
    } else {
        Err(CoordinateError::NotFinite(field))
    }
}

fn component_value(field: &'static str, component: &DmsComponent) -> Result<f64, CoordinateError> {
    match *component {
        DmsComponent::Rational { num, denom } if denom == 0 => {
            Err(CoordinateError::ZeroDenominator { field, num, denom })
        }
        DmsComponent::Rational { num, denom } => Ok(num as f64 / denom as f64),
        DmsComponent::Number(x) => Ok(x),
        DmsComponent::Text(ref text) => Err(CoordinateError::NonNumeric {
            field,
            value: text.clone(),
        }),
    }
}
