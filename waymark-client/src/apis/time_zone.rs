//! Time zone lookup for a position.

use std::time::SystemTime;

use serde_json::Value;
use waymark_core::{EpochSeconds, LatLng, convert};

use super::{Pairs, push_opt};
use crate::{Client, MapsError, Params, RequestOptions};

/// Optional parameters for [`Client::timezone`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeZoneOptions {
    timestamp: Option<i64>,
    language: Option<String>,
}

impl TimeZoneOptions {
    /// Options using the current time.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve daylight saving for this instant instead of now.
    #[must_use]
    pub fn with_timestamp<T: EpochSeconds + ?Sized>(mut self, timestamp: &T) -> Self {
        self.timestamp = Some(timestamp.epoch_seconds());
        self
    }

    /// Set the result language.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

impl Client {
    /// Time zone and UTC offsets for a location, returning the whole body.
    ///
    /// # Errors
    ///
    /// Returns any error from [`Client::get`].
    pub fn timezone(
        &self,
        location: impl Into<LatLng>,
        options: &TimeZoneOptions,
    ) -> Result<Value, MapsError> {
        let timestamp = options
            .timestamp
            .unwrap_or_else(|| SystemTime::now().epoch_seconds());
        let mut pairs: Pairs = vec![
            ("location", convert::latlng(location)),
            ("timestamp", convert::time(&timestamp)),
        ];
        push_opt(&mut pairs, "language", options.language.as_ref());
        self.get(
            "/maps/api/timezone/json",
            &Params::sorted(pairs),
            &RequestOptions::default(),
        )
    }
}
