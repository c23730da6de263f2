//! Route planning between an origin and a destination.

use serde_json::Value;
use waymark_core::{Waypoint, convert};

use super::{Pairs, TripOptions, push_opt, take_field, trip_builders};
use crate::{Client, MapsError, Params, RequestOptions};

/// Optional parameters for [`Client::directions`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectionsOptions {
    trip: TripOptions,
    waypoints: Vec<Waypoint>,
    optimize_waypoints: bool,
    alternatives: bool,
    region: Option<String>,
}

trip_builders!(DirectionsOptions);

impl DirectionsOptions {
    /// Options with every parameter left to the service default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Route through intermediate waypoints, in order.
    #[must_use]
    pub fn with_waypoints<I>(mut self, waypoints: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Waypoint>,
    {
        self.waypoints.extend(waypoints.into_iter().map(Into::into));
        self
    }

    /// Let the service reorder the waypoints for a shorter route.
    #[must_use]
    pub const fn with_optimized_waypoints(mut self) -> Self {
        self.optimize_waypoints = true;
        self
    }

    /// Ask for alternative routes.
    #[must_use]
    pub const fn with_alternatives(mut self) -> Self {
        self.alternatives = true;
        self
    }

    /// Bias results towards a region (ccTLD code).
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    fn push_into(&self, pairs: &mut Pairs) -> Result<(), MapsError> {
        self.trip.push_into(pairs)?;
        if !self.waypoints.is_empty() {
            let mut rendered: Vec<String> = Vec::with_capacity(self.waypoints.len() + 1);
            if self.optimize_waypoints {
                rendered.push("optimize:true".to_owned());
            }
            rendered.extend(self.waypoints.iter().map(ToString::to_string));
            pairs.push(("waypoints", rendered.join("|")));
        }
        if self.alternatives {
            pairs.push(("alternatives", "true".to_owned()));
        }
        push_opt(pairs, "region", self.region.as_ref());
        Ok(())
    }
}

impl Client {
    /// Directions between two places, returning the `routes` array.
    ///
    /// # Errors
    ///
    /// Returns [`MapsError::Argument`] when both a departure and an arrival
    /// time are set, or any error from [`Client::get`].
    pub fn directions(
        &self,
        origin: impl Into<Waypoint>,
        destination: impl Into<Waypoint>,
        options: &DirectionsOptions,
    ) -> Result<Value, MapsError> {
        let mut pairs: Pairs = vec![
            ("origin", convert::waypoint(origin)),
            ("destination", convert::waypoint(destination)),
        ];
        options.push_into(&mut pairs)?;
        let body = self.get(
            "/maps/api/directions/json",
            &Params::sorted(pairs),
            &RequestOptions::default(),
        )?;
        Ok(take_field(body, "routes"))
    }
}
