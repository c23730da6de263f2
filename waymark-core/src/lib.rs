//! Core building blocks for the Waymark geospatial web-service client.
//!
//! Everything here is free of I/O: coordinate types, the encoded polyline
//! codec, converters that render caller input into wire strings, and the
//! validation of enumerated request values. Constructors and converters
//! return `Result` to surface invalid input before any request is issued.

#![forbid(unsafe_code)]

pub mod convert;
mod error;
mod latlng;
pub mod polyline;
pub mod validate;

pub use convert::{EpochSeconds, OneOrMany, Waypoint};
pub use error::{ArgumentError, value_kind};
pub use latlng::{Bounds, LatLng};
pub use polyline::PolylineError;
pub use validate::{Avoid, TravelMode};
