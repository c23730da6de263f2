//! Latitude/longitude pairs and their wire representation.

use std::fmt;

use geo::{Coord, Point, Rect};
use serde_json::{Map, Value};

use crate::error::{ArgumentError, value_kind};

/// A WGS84 position in decimal degrees.
///
/// Conversions from [`geo`] types follow the `x = longitude`, `y = latitude`
/// convention.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use waymark_core::LatLng;
///
/// let sydney = LatLng::from(Coord { x: 151.2069902, y: -33.8674869 });
/// assert_eq!(sydney.to_string(), "-33.867487,151.206990");
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl LatLng {
    /// Construct a position from latitude and longitude.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Normalise a loosely shaped JSON value into a position.
    ///
    /// Accepts a two-element numeric array or an object keyed by
    /// `lat`/`latitude` and `lng`/`longitude`. The short key wins when both
    /// spellings are present.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::InvalidLatLng`] for any other shape.
    pub fn from_value(value: &Value) -> Result<Self, ArgumentError> {
        let invalid = || ArgumentError::InvalidLatLng {
            found: value_kind(value),
        };
        match value {
            Value::Array(items) => match items.as_slice() {
                [lat_value, lng_value] => lat_value
                    .as_f64()
                    .zip(lng_value.as_f64())
                    .map(|(lat, lng)| Self::new(lat, lng))
                    .ok_or_else(invalid),
                _ => Err(invalid()),
            },
            Value::Object(map) => first_number(map, &["lat", "latitude"])
                .zip(first_number(map, &["lng", "longitude"]))
                .map(|(lat, lng)| Self::new(lat, lng))
                .ok_or_else(invalid),
            _ => Err(invalid()),
        }
    }
}

fn first_number(map: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .find_map(|key| map.get(*key).filter(|value| !value.is_null()))
        .and_then(Value::as_f64)
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lng)
    }
}

impl From<(f64, f64)> for LatLng {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self::new(lat, lng)
    }
}

impl From<[f64; 2]> for LatLng {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self::new(lat, lng)
    }
}

impl From<Coord<f64>> for LatLng {
    fn from(coord: Coord<f64>) -> Self {
        Self::new(coord.y, coord.x)
    }
}

impl From<Point<f64>> for LatLng {
    fn from(point: Point<f64>) -> Self {
        Self::from(point.0)
    }
}

impl From<LatLng> for Coord<f64> {
    fn from(value: LatLng) -> Self {
        Self {
            x: value.lng,
            y: value.lat,
        }
    }
}

impl TryFrom<&Value> for LatLng {
    type Error = ArgumentError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

/// A rectangular viewport given by its south-west and north-east corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// South-west corner.
    pub southwest: LatLng,
    /// North-east corner.
    pub northeast: LatLng,
}

impl Bounds {
    /// Construct bounds from two corners.
    #[must_use]
    pub const fn new(southwest: LatLng, northeast: LatLng) -> Self {
        Self {
            southwest,
            northeast,
        }
    }

    /// Normalise a JSON object with `southwest` and `northeast` entries.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::InvalidBounds`] when `value` is not an object
    /// or lacks a corner, and [`ArgumentError::InvalidLatLng`] when a corner
    /// is malformed.
    pub fn from_value(value: &Value) -> Result<Self, ArgumentError> {
        let Value::Object(map) = value else {
            return Err(ArgumentError::InvalidBounds {
                found: value_kind(value),
            });
        };
        let corner = |key: &str| {
            map.get(key)
                .ok_or(ArgumentError::InvalidBounds {
                    found: "a mapping without both corners",
                })
                .and_then(LatLng::from_value)
        };
        Ok(Self::new(corner("southwest")?, corner("northeast")?))
    }
}

impl From<Rect<f64>> for Bounds {
    fn from(rect: Rect<f64>) -> Self {
        Self::new(rect.min().into(), rect.max().into())
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.southwest, self.northeast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!({"lat": 1, "lng": 2}))]
    #[case(json!({"latitude": 1, "longitude": 2}))]
    #[case(json!({"lat": 1, "longitude": 2}))]
    #[case(json!([1, 2]))]
    #[case(json!([1.0, 2.0]))]
    fn accepts_supported_shapes(#[case] value: Value) {
        let point = LatLng::from_value(&value).expect("shape should be accepted");
        assert_eq!(point.to_string(), "1.000000,2.000000");
    }

    #[rstest]
    #[case(json!(1), "number")]
    #[case(json!("x"), "string")]
    #[case(json!([1]), "array")]
    #[case(json!([1, 2, 3]), "array")]
    #[case(json!(["1", "2"]), "array")]
    #[case(json!({"lat": 1}), "object")]
    fn rejects_other_shapes(#[case] value: Value, #[case] found: &'static str) {
        let err = LatLng::from_value(&value).expect_err("shape should be rejected");
        assert_eq!(err, ArgumentError::InvalidLatLng { found });
    }

    #[rstest]
    fn short_key_takes_priority() {
        let value = json!({"lat": 1, "latitude": 9, "lng": 2, "longitude": 9});
        let point = LatLng::from_value(&value).expect("valid mapping");
        assert_eq!(point, LatLng::new(1.0, 2.0));
    }

    #[rstest]
    fn geo_coordinates_map_x_to_longitude() {
        let point = LatLng::from(Coord { x: 151.2, y: -33.8 });
        assert_eq!(point, LatLng::new(-33.8, 151.2));
        let back: Coord<f64> = point.into();
        assert_eq!(back, Coord { x: 151.2, y: -33.8 });
    }

    #[rstest]
    fn formats_six_decimal_places() {
        let point = LatLng::new(-33.8674869, 151.2069902);
        assert_eq!(point.to_string(), "-33.867487,151.206990");
    }

    #[rstest]
    fn bounds_render_southwest_first() {
        let value = json!({
            "northeast": {"lat": -33.4245981, "lng": 151.3426361},
            "southwest": {"lat": -34.1692489, "lng": 150.502229},
        });
        let bounds = Bounds::from_value(&value).expect("valid bounds");
        assert_eq!(
            bounds.to_string(),
            "-34.169249,150.502229|-33.424598,151.342636"
        );
    }

    #[rstest]
    fn bounds_require_both_corners() {
        let value = json!({"southwest": [1, 2]});
        let err = Bounds::from_value(&value).expect_err("missing corner");
        assert!(matches!(err, ArgumentError::InvalidBounds { .. }));
    }

    #[rstest]
    fn bounds_from_rect_use_min_as_southwest() {
        let rect = Rect::new(Coord { x: 150.5, y: -34.1 }, Coord { x: 151.3, y: -33.4 });
        let bounds = Bounds::from(rect);
        assert_eq!(bounds.southwest, LatLng::new(-34.1, 150.5));
        assert_eq!(bounds.northeast, LatLng::new(-33.4, 151.3));
    }
}
