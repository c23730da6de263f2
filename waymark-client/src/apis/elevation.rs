//! Elevation sampling at points or along a path.

use serde_json::Value;
use waymark_core::{LatLng, Waypoint, convert};

use super::take_field;
use crate::{Client, MapsError, Params, RequestOptions};

/// A path to sample elevations along.
#[derive(Debug, Clone, PartialEq)]
pub enum ElevationPath {
    /// An encoded polyline, sent as `enc:<polyline>`.
    Encoded(String),
    /// Explicit vertices.
    Points(Vec<Waypoint>),
}

impl From<&str> for ElevationPath {
    fn from(polyline: &str) -> Self {
        Self::Encoded(polyline.to_owned())
    }
}

impl From<String> for ElevationPath {
    fn from(polyline: String) -> Self {
        Self::Encoded(polyline)
    }
}

impl From<Vec<Waypoint>> for ElevationPath {
    fn from(points: Vec<Waypoint>) -> Self {
        Self::Points(points)
    }
}

impl From<Vec<LatLng>> for ElevationPath {
    fn from(points: Vec<LatLng>) -> Self {
        Self::Points(points.into_iter().map(Waypoint::from).collect())
    }
}

impl From<&[LatLng]> for ElevationPath {
    fn from(points: &[LatLng]) -> Self {
        Self::Points(points.iter().copied().map(Waypoint::from).collect())
    }
}

impl ElevationPath {
    fn render(&self) -> String {
        match self {
            Self::Encoded(polyline) => format!("enc:{polyline}"),
            Self::Points(points) => convert::waypoints(points.iter().cloned()),
        }
    }
}

impl Client {
    /// Elevation at each location, returning the `results` array.
    ///
    /// # Errors
    ///
    /// Returns any error from [`Client::get`].
    pub fn elevation<I>(&self, locations: I) -> Result<Value, MapsError>
    where
        I: IntoIterator,
        I::Item: Into<Waypoint>,
    {
        let params = Params::sorted([("locations", convert::waypoints(locations))]);
        let body = self.get("/maps/api/elevation/json", &params, &RequestOptions::default())?;
        Ok(take_field(body, "results"))
    }

    /// Elevation at `samples` equidistant points along `path`, returning the
    /// `results` array.
    ///
    /// # Errors
    ///
    /// Returns any error from [`Client::get`].
    pub fn elevation_along_path(
        &self,
        path: impl Into<ElevationPath>,
        samples: u32,
    ) -> Result<Value, MapsError> {
        let params = Params::sorted([
            ("path", path.into().render()),
            ("samples", samples.to_string()),
        ]);
        let body = self.get("/maps/api/elevation/json", &params, &RequestOptions::default())?;
        Ok(take_field(body, "results"))
    }
}
