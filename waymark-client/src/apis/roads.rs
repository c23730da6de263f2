//! Road-segment endpoints.
//!
//! These live on their own host, refuse enterprise signing, and report
//! failures through HTTP status codes with a nested `error` object, so
//! every request uses [`RoadsDecoder`].

use serde_json::Value;
use waymark_core::{LatLng, OneOrMany, convert};

use super::take_field;
use crate::response::RoadsDecoder;
use crate::{Client, MapsError, Params, RequestOptions};

/// Base URL of the roads endpoints.
pub const ROADS_BASE_URL: &str = "https://roads.googleapis.com";

fn roads_options() -> RequestOptions {
    RequestOptions::default()
        .with_base_url(ROADS_BASE_URL)
        .with_accepts_client_id(false)
        .with_decoder(RoadsDecoder)
}

fn render_path<I>(points: I) -> String
where
    I: IntoIterator,
    I::Item: Into<LatLng>,
{
    convert::waypoints(points.into_iter().map(Into::<LatLng>::into))
}

impl Client {
    /// Snap a GPS trace to the most likely roads travelled, returning the
    /// `snappedPoints` array.
    ///
    /// With `interpolate`, extra points are added so the result follows
    /// the road geometry.
    ///
    /// # Errors
    ///
    /// Returns [`MapsError::Argument`] when no API key is configured, or any
    /// error from [`Client::get`].
    pub fn snap_to_roads<I>(&self, path: I, interpolate: bool) -> Result<Value, MapsError>
    where
        I: IntoIterator,
        I::Item: Into<LatLng>,
    {
        let mut pairs = vec![("path", render_path(path))];
        if interpolate {
            pairs.push(("interpolate", "true".to_owned()));
        }
        let body = self.get("/v1/snapToRoads", &Params::sorted(pairs), &roads_options())?;
        Ok(take_field(body, "snappedPoints"))
    }

    /// Posted speed limits for road segments, returning the `speedLimits`
    /// array.
    ///
    /// # Errors
    ///
    /// Returns [`MapsError::Argument`] when no API key is configured, or any
    /// error from [`Client::get`].
    pub fn speed_limits(&self, place_ids: impl Into<OneOrMany<String>>) -> Result<Value, MapsError> {
        let params = Params::ordered(
            convert::as_list(place_ids)
                .into_iter()
                .map(|place_id| ("placeId", place_id)),
        );
        let body = self.get("/v1/speedLimits", &params, &roads_options())?;
        Ok(take_field(body, "speedLimits"))
    }

    /// Speed limits along a path, returning the whole body with both the
    /// `snappedPoints` and `speedLimits` arrays.
    ///
    /// # Errors
    ///
    /// Returns [`MapsError::Argument`] when no API key is configured, or any
    /// error from [`Client::get`].
    pub fn snapped_speed_limits<I>(&self, path: I) -> Result<Value, MapsError>
    where
        I: IntoIterator,
        I::Item: Into<LatLng>,
    {
        let params = Params::sorted([("path", render_path(path))]);
        self.get("/v1/speedLimits", &params, &roads_options())
    }

    /// The nearest road segment for each point, returning the
    /// `snappedPoints` array.
    ///
    /// # Errors
    ///
    /// Returns [`MapsError::Argument`] when no API key is configured, or any
    /// error from [`Client::get`].
    pub fn nearest_roads<I>(&self, points: I) -> Result<Value, MapsError>
    where
        I: IntoIterator,
        I::Item: Into<LatLng>,
    {
        let params = Params::sorted([("points", render_path(points))]);
        let body = self.get("/v1/nearestRoads", &params, &roads_options())?;
        Ok(take_field(body, "snappedPoints"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apis::test_helpers::{client_returning, only_url};
    use crate::test_support::StubTransport;
    use crate::transport::RawResponse;
    use crate::ClientConfig;
    use rstest::rstest;
    use serde_json::json;
    use std::sync::Arc;
    use waymark_core::ArgumentError;

    const SNAPPED: &str = r#"{"snappedPoints":[{"placeId":"ChIJ"}]}"#;

    #[rstest]
    fn snaps_paths_on_the_roads_host() {
        let (client, stub) = client_returning(SNAPPED);
        let points = client
            .snap_to_roads([(-33.86, 151.20), (-33.87, 151.21)], true)
            .expect("snapped");
        assert_eq!(points, json!([{"placeId": "ChIJ"}]));
        assert_eq!(
            only_url(&stub),
            "https://roads.googleapis.com/v1/snapToRoads?interpolate=true\
             &path=-33.860000%2C151.200000%7C-33.870000%2C151.210000&key=AIzaTest"
        );
    }

    #[rstest]
    fn speed_limits_repeat_place_ids_in_order() {
        let (client, stub) = client_returning(r#"{"speedLimits":[{"speedLimit":60}]}"#);
        let limits = client
            .speed_limits(vec!["ChIJb", "ChIJa"])
            .expect("limits");
        assert_eq!(limits, json!([{"speedLimit": 60}]));
        assert_eq!(
            only_url(&stub),
            "https://roads.googleapis.com/v1/speedLimits?placeId=ChIJb&placeId=ChIJa&key=AIzaTest"
        );
    }

    #[rstest]
    fn snapped_speed_limits_return_the_whole_body() {
        let body = r#"{"snappedPoints":[],"speedLimits":[]}"#;
        let (client, _stub) = client_returning(body);
        let result = client
            .snapped_speed_limits([(1.0, 2.0)])
            .expect("limits");
        assert_eq!(result, json!({"snappedPoints": [], "speedLimits": []}));
    }

    #[rstest]
    fn nearest_roads_use_points_parameter() {
        let (client, stub) = client_returning(SNAPPED);
        client.nearest_roads([(1.0, 2.0)]).expect("snapped");
        assert_eq!(
            only_url(&stub),
            "https://roads.googleapis.com/v1/nearestRoads?points=1.000000%2C2.000000&key=AIzaTest"
        );
    }

    #[rstest]
    fn enterprise_credentials_are_refused_before_io() {
        let stub = Arc::new(StubTransport::always(RawResponse::new(200, SNAPPED)));
        let client = Client::with_transport(
            ClientConfig::new().with_client_id("foo", "a2V5"),
            Arc::clone(&stub),
        )
        .expect("valid config");
        let result = client.nearest_roads([(1.0, 2.0)]);
        assert_eq!(
            result,
            Err(MapsError::Argument(ArgumentError::MissingCredentials))
        );
        assert_eq!(stub.calls(), 0);
    }

    #[rstest]
    fn invalid_key_errors_are_request_denied() {
        let body = json!({"error": {
            "code": 400,
            "status": "INVALID_ARGUMENT",
            "message": "The provided API key is invalid."
        }});
        let stub = Arc::new(StubTransport::always(RawResponse::new(400, body.to_string())));
        let client = Client::with_transport(ClientConfig::new().with_key("bad"), Arc::clone(&stub))
            .expect("valid config");
        let result = client.snap_to_roads([(1.0, 2.0)], false);
        assert!(matches!(result, Err(MapsError::RequestDenied { .. })));
        assert_eq!(stub.calls(), 1);
    }
}
