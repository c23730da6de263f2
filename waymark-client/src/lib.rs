//! Authenticated, throttled, retrying client for geospatial web services.
//!
//! [`Client::get`] is the single request primitive: it authenticates the
//! URL (API key or HMAC-signed enterprise client id), waits for a
//! rate-limit ticket, issues the HTTP call through a [`Transport`], decodes
//! the body and retries server and quota errors within a wall-clock budget.
//! The typed endpoint builders in [`apis`] are thin layers over it.

#![forbid(unsafe_code)]

pub mod apis;
mod client;
mod error;
pub mod rate_limit;
pub mod response;
pub mod signing;
#[doc(hidden)]
pub mod test_support;
pub mod transport;

pub use apis::{
    DirectionsOptions, DistanceMatrixOptions, ElevationPath, GeocodeRequest, ROADS_BASE_URL,
    ReverseGeocodeOptions, TimeZoneOptions,
};
pub use client::{Client, ClientConfig, DEFAULT_BASE_URL, DEFAULT_USER_AGENT, RequestOptions};
pub use error::{ConfigError, MapsError};
pub use rate_limit::RateLimiter;
pub use response::{DefaultDecoder, ResponseDecoder, RoadsDecoder};
pub use signing::{Credentials, Params, SigningError};
pub use transport::{RawResponse, ReqwestTransport, Transport, TransportBuildError, TransportError};
