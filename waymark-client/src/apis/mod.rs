//! Typed request builders for the individual web-service endpoints.
//!
//! Each builder validates its input, renders it into [`Params`] with the
//! converters in [`waymark_core::convert`], and hands the request to
//! [`Client::get`]. Validation failures surface as [`MapsError::Argument`]
//! before any request is sent.
//!
//! [`Client::get`]: crate::Client::get
//! [`MapsError::Argument`]: crate::MapsError::Argument
//! [`Params`]: crate::Params

mod directions;
mod distance_matrix;
mod elevation;
mod geocoding;
mod roads;
mod time_zone;

pub use directions::DirectionsOptions;
pub use distance_matrix::DistanceMatrixOptions;
pub use elevation::ElevationPath;
pub use geocoding::{GeocodeRequest, ReverseGeocodeOptions};
pub use roads::ROADS_BASE_URL;
pub use time_zone::TimeZoneOptions;

use serde_json::Value;
use waymark_core::{ArgumentError, Avoid, TravelMode, convert};

/// Parameters collected by a builder before sorting.
type Pairs = Vec<(&'static str, String)>;

/// Extract `field` from a decoded body, or `null` when it is absent.
fn take_field(mut body: Value, field: &str) -> Value {
    body.get_mut(field).map(Value::take).unwrap_or_default()
}

fn push_opt(pairs: &mut Pairs, key: &'static str, value: Option<&String>) {
    if let Some(present) = value {
        pairs.push((key, present.clone()));
    }
}

fn push_list(pairs: &mut Pairs, key: &'static str, values: &[String]) {
    if !values.is_empty() {
        pairs.push((key, values.join("|")));
    }
}

/// Options shared by the directions and distance matrix endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct TripOptions {
    mode: Option<TravelMode>,
    avoid: Vec<Avoid>,
    language: Option<String>,
    units: Option<String>,
    departure_time: Option<i64>,
    arrival_time: Option<i64>,
    transit_mode: Vec<String>,
    transit_routing_preference: Option<String>,
}

impl TripOptions {
    fn push_into(&self, pairs: &mut Pairs) -> Result<(), ArgumentError> {
        if self.departure_time.is_some() && self.arrival_time.is_some() {
            return Err(ArgumentError::ConflictingTimes);
        }
        if let Some(mode) = self.mode {
            pairs.push(("mode", mode.to_string()));
        }
        if !self.avoid.is_empty() {
            pairs.push(("avoid", convert::join_list("|", self.avoid.clone())));
        }
        push_opt(pairs, "language", self.language.as_ref());
        push_opt(pairs, "units", self.units.as_ref());
        if let Some(departure) = self.departure_time {
            pairs.push(("departure_time", convert::time(&departure)));
        }
        if let Some(arrival) = self.arrival_time {
            pairs.push(("arrival_time", convert::time(&arrival)));
        }
        push_list(pairs, "transit_mode", &self.transit_mode);
        push_opt(
            pairs,
            "transit_routing_preference",
            self.transit_routing_preference.as_ref(),
        );
        Ok(())
    }
}

/// Builder methods for the [`TripOptions`] embedded in an options struct.
macro_rules! trip_builders {
    ($options:ty) => {
        impl $options {
            /// Set the travel mode.
            #[must_use]
            pub const fn with_mode(mut self, mode: waymark_core::TravelMode) -> Self {
                self.trip.mode = Some(mode);
                self
            }

            /// Add a feature the route should avoid.
            #[must_use]
            pub fn with_avoid(mut self, avoid: waymark_core::Avoid) -> Self {
                self.trip.avoid.push(avoid);
                self
            }

            /// Set the result language.
            #[must_use]
            pub fn with_language(mut self, language: impl Into<String>) -> Self {
                self.trip.language = Some(language.into());
                self
            }

            /// Set the unit system, `metric` or `imperial`.
            #[must_use]
            pub fn with_units(mut self, units: impl Into<String>) -> Self {
                self.trip.units = Some(units.into());
                self
            }

            /// Depart at the given time.
            #[must_use]
            pub fn with_departure_time<T>(mut self, time: &T) -> Self
            where
                T: waymark_core::EpochSeconds + ?Sized,
            {
                self.trip.departure_time = Some(time.epoch_seconds());
                self
            }

            /// Arrive by the given time. Conflicts with a departure time.
            #[must_use]
            pub fn with_arrival_time<T>(mut self, time: &T) -> Self
            where
                T: waymark_core::EpochSeconds + ?Sized,
            {
                self.trip.arrival_time = Some(time.epoch_seconds());
                self
            }

            /// Add a preferred transit mode such as `bus` or `rail`.
            #[must_use]
            pub fn with_transit_mode(mut self, transit_mode: impl Into<String>) -> Self {
                self.trip.transit_mode.push(transit_mode.into());
                self
            }

            /// Set the transit routing preference, such as `less_walking`.
            #[must_use]
            pub fn with_transit_routing_preference(
                mut self,
                preference: impl Into<String>,
            ) -> Self {
                self.trip.transit_routing_preference = Some(preference.into());
                self
            }
        }
    };
}
pub(crate) use trip_builders;
