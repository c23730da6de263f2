//! Facade crate for the Waymark geospatial web-service client.
//!
//! This crate re-exports the I/O-free building blocks from `waymark-core`
//! and, behind the default `client` feature, the request orchestration
//! layer from `waymark-client`.

#![forbid(unsafe_code)]

pub use waymark_core::{
    ArgumentError, Avoid, Bounds, EpochSeconds, LatLng, OneOrMany, PolylineError, TravelMode,
    Waypoint, convert, polyline,
};

#[cfg(feature = "client")]
pub use waymark_client::{
    Client, ClientConfig, ConfigError, DirectionsOptions, DistanceMatrixOptions, ElevationPath,
    GeocodeRequest, MapsError, Params, RawResponse, RequestOptions, ReverseGeocodeOptions,
    TimeZoneOptions, Transport, TransportError, apis,
};
