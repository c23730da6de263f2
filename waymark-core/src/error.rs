//! Errors raised while turning caller input into request parameters.

use serde_json::Value;
use thiserror::Error;

/// A request could not be built from the supplied arguments.
///
/// These are raised before any network I/O and are never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ArgumentError {
    /// The value was neither a `[lat, lng]` pair nor a lat/lng mapping.
    #[error("expected a lat/lng mapping or pair, but got {found}")]
    InvalidLatLng {
        /// JSON kind of the rejected value.
        found: &'static str,
    },
    /// Components must be supplied as a mapping.
    #[error("expected a mapping for components, but got {found}")]
    InvalidComponents {
        /// JSON kind of the rejected value.
        found: &'static str,
    },
    /// Bounds must be a mapping with `southwest` and `northeast` entries.
    #[error("expected a bounds mapping with southwest and northeast, but got {found}")]
    InvalidBounds {
        /// Description of what was found instead.
        found: &'static str,
    },
    /// The travel mode is not one the service understands.
    #[error("invalid travel mode: {value}")]
    InvalidTravelMode {
        /// Rejected input.
        value: String,
    },
    /// The route restriction is not one the service understands.
    #[error("invalid route restriction: {value}")]
    InvalidAvoid {
        /// Rejected input.
        value: String,
    },
    /// Departure and arrival times are mutually exclusive.
    #[error("should not specify both departure_time and arrival_time")]
    ConflictingTimes,
    /// Geocoding needs an address, components, or both.
    #[error("must specify an address and/or components to geocode")]
    MissingGeocodeTarget,
    /// No usable credential is configured for this request.
    #[error("must provide API key; this endpoint does not accept enterprise credentials")]
    MissingCredentials,
}

/// Name the JSON kind of `value` for error messages.
#[must_use]
pub const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
