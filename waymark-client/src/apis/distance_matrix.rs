//! Travel distance and time between sets of origins and destinations.
//!
//! Shares its mode, restriction and timing options with directions.

use serde_json::Value;
use waymark_core::{Waypoint, convert};

use super::{Pairs, TripOptions, trip_builders};
use crate::{Client, MapsError, Params, RequestOptions};

/// Optional parameters for [`Client::distance_matrix`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistanceMatrixOptions {
    trip: TripOptions,
}

trip_builders!(DistanceMatrixOptions);

impl DistanceMatrixOptions {
    /// Options with every parameter left to the service default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Client {
    /// Travel distance and time for every origin/destination pair.
    ///
    /// Returns the whole response body, which carries the resolved
    /// addresses alongside the `rows` matrix.
    ///
    /// # Errors
    ///
    /// Returns [`MapsError::Argument`] when both a departure and an arrival
    /// time are set, or any error from [`Client::get`].
    pub fn distance_matrix<O, D>(
        &self,
        origins: O,
        destinations: D,
        options: &DistanceMatrixOptions,
    ) -> Result<Value, MapsError>
    where
        O: IntoIterator,
        O::Item: Into<Waypoint>,
        D: IntoIterator,
        D::Item: Into<Waypoint>,
    {
        let mut pairs: Pairs = vec![
            ("origins", convert::waypoints(origins)),
            ("destinations", convert::waypoints(destinations)),
        ];
        options.trip.push_into(&mut pairs)?;
        self.get(
            "/maps/api/distancematrix/json",
            &Params::sorted(pairs),
            &RequestOptions::default(),
        )
    }
}
