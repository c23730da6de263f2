//! Converters from caller-friendly shapes to the service's wire strings.
//!
//! Typed helpers accept [`LatLng`], [`Waypoint`] and friends. The `*_value`
//! variants accept loosely shaped [`serde_json::Value`] input and reject
//! anything they cannot interpret with an [`ArgumentError`].

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, NaiveDateTime, TimeZone};
use serde_json::Value;

use crate::error::{ArgumentError, value_kind};
use crate::{Bounds, LatLng};

/// Render a position as `"lat,lng"` with six decimal places.
#[must_use]
pub fn latlng(point: impl Into<LatLng>) -> String {
    point.into().to_string()
}

/// Render a loosely shaped position as `"lat,lng"`.
///
/// # Errors
///
/// Returns [`ArgumentError::InvalidLatLng`] unless `value` is a numeric pair
/// or a lat/lng mapping.
pub fn latlng_value(value: &Value) -> Result<String, ArgumentError> {
    LatLng::from_value(value).map(|point| point.to_string())
}

/// A single value or a list of values.
///
/// Several parameters accept either form; [`OneOrMany::into_vec`] is the
/// list coercion applied to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OneOrMany<T> {
    /// A single scalar.
    One(T),
    /// A list, passed through unchanged.
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// Coerce into a list, wrapping a scalar into a one-element list.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

impl<T> From<Vec<T>> for OneOrMany<T> {
    fn from(values: Vec<T>) -> Self {
        Self::Many(values)
    }
}

impl From<&str> for OneOrMany<String> {
    fn from(value: &str) -> Self {
        Self::One(value.to_owned())
    }
}

impl From<String> for OneOrMany<String> {
    fn from(value: String) -> Self {
        Self::One(value)
    }
}

impl From<Vec<&str>> for OneOrMany<String> {
    fn from(values: Vec<&str>) -> Self {
        Self::Many(values.into_iter().map(str::to_owned).collect())
    }
}

impl<const N: usize> From<[&str; N]> for OneOrMany<String> {
    fn from(values: [&str; N]) -> Self {
        Self::Many(values.into_iter().map(str::to_owned).collect())
    }
}

/// Coerce `value` into a list.
#[must_use]
pub fn as_list<T>(value: impl Into<OneOrMany<T>>) -> Vec<T> {
    value.into().into_vec()
}

/// Coerce a JSON value into a list: arrays pass through, scalars are wrapped.
#[must_use]
pub fn as_list_value(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        other => vec![other],
    }
}

/// Join the list form of `value` with `sep`.
#[must_use]
pub fn join_list<T: fmt::Display>(sep: &str, value: impl Into<OneOrMany<T>>) -> String {
    join(sep, as_list(value))
}

fn join<I>(sep: &str, items: I) -> String
where
    I: IntoIterator,
    I::Item: fmt::Display,
{
    items
        .into_iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(sep)
}

/// Values that can be expressed as whole seconds since the Unix epoch.
pub trait EpochSeconds {
    /// Seconds since 1970-01-01T00:00:00Z, truncated towards zero.
    fn epoch_seconds(&self) -> i64;
}

impl EpochSeconds for i64 {
    fn epoch_seconds(&self) -> i64 {
        *self
    }
}

impl EpochSeconds for u32 {
    fn epoch_seconds(&self) -> i64 {
        i64::from(*self)
    }
}

impl<Tz: TimeZone> EpochSeconds for DateTime<Tz> {
    fn epoch_seconds(&self) -> i64 {
        self.timestamp()
    }
}

/// Naive date-times are taken to be UTC.
impl EpochSeconds for NaiveDateTime {
    fn epoch_seconds(&self) -> i64 {
        self.and_utc().timestamp()
    }
}

impl EpochSeconds for SystemTime {
    fn epoch_seconds(&self) -> i64 {
        match self.duration_since(UNIX_EPOCH) {
            Ok(after) => i64::try_from(after.as_secs()).unwrap_or(i64::MAX),
            Err(before) => i64::try_from(before.duration().as_secs()).map_or(i64::MIN, |secs| -secs),
        }
    }
}

/// Render a point in time as a decimal string of epoch seconds.
#[must_use]
pub fn time<T: EpochSeconds + ?Sized>(value: &T) -> String {
    value.epoch_seconds().to_string()
}

/// Render a component filter as `key:value` pairs joined by `|`, sorted by
/// key.
#[must_use]
pub fn components<I, K, V>(entries: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: fmt::Display,
{
    let mut pairs: Vec<(K, V)> = entries.into_iter().collect();
    pairs.sort_by(|(left, _), (right, _)| left.as_ref().cmp(right.as_ref()));
    join(
        "|",
        pairs
            .iter()
            .map(|(key, value)| format!("{}:{value}", key.as_ref())),
    )
}

/// Render a JSON object as a component filter.
///
/// String values are rendered without quotes.
///
/// # Errors
///
/// Returns [`ArgumentError::InvalidComponents`] when `value` is not an
/// object.
pub fn components_value(value: &Value) -> Result<String, ArgumentError> {
    let Value::Object(map) = value else {
        return Err(ArgumentError::InvalidComponents {
            found: value_kind(value),
        });
    };
    Ok(components(map.iter().map(|(key, entry)| (key, scalar(entry)))))
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Render bounds as `"sw_lat,sw_lng|ne_lat,ne_lng"`.
#[must_use]
pub fn bounds(value: &Bounds) -> String {
    value.to_string()
}

/// Render a loosely shaped bounds object.
///
/// # Errors
///
/// Propagates the errors of [`Bounds::from_value`].
pub fn bounds_value(value: &Value) -> Result<String, ArgumentError> {
    Bounds::from_value(value).map(|parsed| parsed.to_string())
}

/// A location given by name or by coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Waypoint {
    /// Free-text place name or an already formatted `"lat,lng"`.
    Place(String),
    /// Coordinate pair.
    Location(LatLng),
}

impl fmt::Display for Waypoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Place(name) => f.write_str(name),
            Self::Location(point) => fmt::Display::fmt(point, f),
        }
    }
}

impl From<&str> for Waypoint {
    fn from(value: &str) -> Self {
        Self::Place(value.to_owned())
    }
}

impl From<String> for Waypoint {
    fn from(value: String) -> Self {
        Self::Place(value)
    }
}

impl From<LatLng> for Waypoint {
    fn from(value: LatLng) -> Self {
        Self::Location(value)
    }
}

impl From<(f64, f64)> for Waypoint {
    fn from(value: (f64, f64)) -> Self {
        Self::Location(value.into())
    }
}

impl From<[f64; 2]> for Waypoint {
    fn from(value: [f64; 2]) -> Self {
        Self::Location(value.into())
    }
}

impl From<geo::Coord<f64>> for Waypoint {
    fn from(value: geo::Coord<f64>) -> Self {
        Self::Location(value.into())
    }
}

/// Render a single waypoint.
#[must_use]
pub fn waypoint(value: impl Into<Waypoint>) -> String {
    value.into().to_string()
}

/// Render a list of waypoints joined by `|`.
#[must_use]
pub fn waypoints<I>(values: I) -> String
where
    I: IntoIterator,
    I::Item: Into<Waypoint>,
{
    join("|", values.into_iter().map(Into::<Waypoint>::into))
}

/// Render a loosely shaped waypoint: strings pass through, anything else
/// must be a position.
///
/// # Errors
///
/// Returns [`ArgumentError::InvalidLatLng`] for values that are neither.
pub fn waypoint_value(value: &Value) -> Result<String, ArgumentError> {
    match value {
        Value::String(place) => Ok(place.clone()),
        other => latlng_value(other),
    }
}

/// Render a loosely shaped path.
///
/// A bare two-element numeric array is read as one point, never as two
/// single-number waypoints. Any other array is a list of waypoints; scalars
/// are wrapped into a one-element list.
///
/// # Errors
///
/// Returns the first waypoint conversion error.
pub fn waypoints_value(value: &Value) -> Result<String, ArgumentError> {
    let items = match value {
        Value::Array(items) if is_bare_pair(items) => vec![value.clone()],
        other => as_list_value(other.clone()),
    };
    let rendered = items
        .iter()
        .map(waypoint_value)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rendered.join("|"))
}

fn is_bare_pair(items: &[Value]) -> bool {
    matches!(items, [first, second] if first.is_number() && second.is_number())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use rstest::rstest;
    use serde_json::json;
    use std::collections::{BTreeMap, HashMap};
    use std::time::Duration;

    #[rstest]
    fn latlng_accepts_typed_pairs() {
        assert_eq!(latlng((1.0, 2.0)), "1.000000,2.000000");
        assert_eq!(latlng([-33.8674869, 151.2069902]), "-33.867487,151.206990");
    }

    #[rstest]
    #[case(json!({"lat": 1, "lng": 2}))]
    #[case(json!({"latitude": 1, "longitude": 2}))]
    #[case(json!([1, 2]))]
    fn latlng_value_normalises_shapes(#[case] value: Value) {
        assert_eq!(latlng_value(&value), Ok("1.000000,2.000000".to_owned()));
    }

    #[rstest]
    #[case(json!(1))]
    #[case(json!("x"))]
    fn latlng_value_rejects_scalars(#[case] value: Value) {
        assert!(matches!(
            latlng_value(&value),
            Err(ArgumentError::InvalidLatLng { .. })
        ));
    }

    #[rstest]
    fn as_list_wraps_scalars() {
        let single: Vec<String> = as_list("a");
        assert_eq!(single, vec!["a".to_owned()]);
        let many: Vec<String> = as_list(vec!["a", "b"]);
        assert_eq!(many, vec!["a".to_owned(), "b".to_owned()]);
        assert_eq!(as_list_value(json!(1)), vec![json!(1)]);
        assert_eq!(as_list_value(json!([1, 2])), vec![json!(1), json!(2)]);
    }

    #[rstest]
    fn join_list_handles_one_or_many() {
        assert_eq!(join_list::<String>("|", "bus"), "bus");
        assert_eq!(join_list::<String>("|", ["bus", "rail"]), "bus|rail");
        assert_eq!(join_list::<i32>("|", vec![1, 2, 3]), "1|2|3");
    }

    #[rstest]
    fn time_accepts_integers_and_date_times() {
        assert_eq!(time(&1_409_810_596_i64), "1409810596");
        let instant = Utc.timestamp_opt(1_409_810_596, 0).single().expect("valid timestamp");
        assert_eq!(time(&instant), "1409810596");
        let naive = NaiveDate::from_ymd_opt(1970, 1, 1)
            .and_then(|date| date.and_hms_opt(0, 1, 0))
            .expect("valid date-time");
        assert_eq!(time(&naive), "60");
    }

    #[rstest]
    fn time_truncates_system_time() {
        let instant = UNIX_EPOCH + Duration::from_millis(1_500);
        assert_eq!(time(&instant), "1");
        let before = UNIX_EPOCH - Duration::from_secs(30);
        assert_eq!(time(&before), "-30");
    }

    #[rstest]
    fn components_are_sorted_by_key() {
        let mut filter = HashMap::new();
        filter.insert("postal_code", "94043");
        filter.insert("country", "US");
        assert_eq!(components(filter), "country:US|postal_code:94043");
    }

    #[rstest]
    fn components_value_requires_a_mapping() {
        let rendered = components_value(&json!({"country": "US", "administrative_area": "TX"}));
        assert_eq!(rendered, Ok("administrative_area:TX|country:US".to_owned()));
        assert_eq!(
            components_value(&json!(["country", "US"])),
            Err(ArgumentError::InvalidComponents { found: "array" })
        );
    }

    #[rstest]
    fn bounds_render_from_typed_and_loose_input() {
        let typed = Bounds::new(LatLng::new(-34.1692489, 150.502229), LatLng::new(-33.4245981, 151.3426361));
        let expected = "-34.169249,150.502229|-33.424598,151.342636";
        assert_eq!(bounds(&typed), expected);
        let loose = json!({
            "southwest": [-34.1692489, 150.502229],
            "northeast": {"latitude": -33.4245981, "longitude": 151.3426361},
        });
        assert_eq!(bounds_value(&loose), Ok(expected.to_owned()));
    }

    #[rstest]
    fn waypoint_passes_place_names_through() {
        assert_eq!(waypoint("Sydney Town Hall"), "Sydney Town Hall");
        assert_eq!(waypoint((1.0, 2.0)), "1.000000,2.000000");
    }

    #[rstest]
    fn waypoints_join_mixed_entries() {
        let path = vec![
            Waypoint::from("Bobcaygeon ON"),
            Waypoint::from((41.43206, -81.38992)),
        ];
        assert_eq!(waypoints(path), "Bobcaygeon ON|41.432060,-81.389920");
    }

    #[rstest]
    fn waypoints_value_reads_bare_pair_as_one_point() {
        assert_eq!(
            waypoints_value(&json!([1, 2])),
            Ok("1.000000,2.000000".to_owned())
        );
    }

    #[rstest]
    fn waypoints_value_reads_lists_and_scalars() {
        let path = json!([[1, 2], {"lat": 3, "lng": 4}, "Sydney"]);
        assert_eq!(
            waypoints_value(&path),
            Ok("1.000000,2.000000|3.000000,4.000000|Sydney".to_owned())
        );
        assert_eq!(waypoints_value(&json!("Sydney")), Ok("Sydney".to_owned()));
    }

    #[rstest]
    fn waypoints_value_rejects_bad_entries() {
        let path = json!([[1, 2], 3]);
        assert!(matches!(
            waypoints_value(&path),
            Err(ArgumentError::InvalidLatLng { found: "number" })
        ));
    }

    #[rstest]
    fn components_accept_ordered_maps() {
        let filter: BTreeMap<String, u32> = BTreeMap::from([("b".to_owned(), 2), ("a".to_owned(), 1)]);
        assert_eq!(components(filter), "a:1|b:2");
    }
}
