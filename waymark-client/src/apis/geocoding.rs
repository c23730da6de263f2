//! Forward and reverse geocoding.
//!
//! A forward query needs an address, a component filter, or both; an empty
//! query is rejected before any request is sent.

use std::collections::BTreeMap;

use serde_json::Value;
use waymark_core::{ArgumentError, Bounds, LatLng, convert};

use super::{Pairs, push_list, push_opt, take_field};
use crate::{Client, MapsError, Params, RequestOptions};

const GEOCODE_PATH: &str = "/maps/api/geocode/json";

/// A forward geocoding query.
///
/// At least an address or one component filter is required.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeocodeRequest {
    address: Option<String>,
    components: BTreeMap<String, String>,
    bounds: Option<Bounds>,
    region: Option<String>,
    language: Option<String>,
}

impl GeocodeRequest {
    /// Geocode a free-text address.
    #[must_use]
    pub fn address(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            ..Self::default()
        }
    }

    /// Geocode using component filters alone.
    #[must_use]
    pub fn components<I, K, V>(components: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::default().with_components(components)
    }

    /// Add component filters such as `country` or `postal_code`.
    #[must_use]
    pub fn with_components<I, K, V>(mut self, components: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.components.extend(
            components
                .into_iter()
                .map(|(key, value)| (key.into(), value.into())),
        );
        self
    }

    /// Prefer results inside a viewport.
    #[must_use]
    pub const fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Bias results towards a region (ccTLD code).
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set the result language.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    fn to_pairs(&self) -> Result<Pairs, ArgumentError> {
        if self.address.is_none() && self.components.is_empty() {
            return Err(ArgumentError::MissingGeocodeTarget);
        }
        let mut pairs = Pairs::new();
        push_opt(&mut pairs, "address", self.address.as_ref());
        if !self.components.is_empty() {
            pairs.push(("components", convert::components(&self.components)));
        }
        if let Some(bounds) = &self.bounds {
            pairs.push(("bounds", convert::bounds(bounds)));
        }
        push_opt(&mut pairs, "region", self.region.as_ref());
        push_opt(&mut pairs, "language", self.language.as_ref());
        Ok(pairs)
    }
}

/// Optional parameters for [`Client::reverse_geocode`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReverseGeocodeOptions {
    result_type: Vec<String>,
    location_type: Vec<String>,
    language: Option<String>,
}

impl ReverseGeocodeOptions {
    /// Options with every parameter left to the service default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict results to an address type such as `street_address`.
    #[must_use]
    pub fn with_result_type(mut self, result_type: impl Into<String>) -> Self {
        self.result_type.push(result_type.into());
        self
    }

    /// Restrict results to a location type such as `ROOFTOP`.
    #[must_use]
    pub fn with_location_type(mut self, location_type: impl Into<String>) -> Self {
        self.location_type.push(location_type.into());
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
    /// Resolve an address or component filter to places, returning the
    /// `results` array.
    ///
    /// # Errors
    ///
    /// Returns [`MapsError::Argument`] when neither an address nor a
    /// component filter is given, or any error from [`Client::get`].
    pub fn geocode(&self, request: &GeocodeRequest) -> Result<Value, MapsError> {
        let params = Params::sorted(request.to_pairs()?);
        let body = self.get(GEOCODE_PATH, &params, &RequestOptions::default())?;
        Ok(take_field(body, "results"))
    }

    /// Resolve a position to addresses, returning the `results` array.
    ///
    /// # Errors
    ///
    /// Returns any error from [`Client::get`].
    pub fn reverse_geocode(
        &self,
        latlng: impl Into<LatLng>,
        options: &ReverseGeocodeOptions,
    ) -> Result<Value, MapsError> {
        let mut pairs: Pairs = vec![("latlng", convert::latlng(latlng))];
        push_list(&mut pairs, "result_type", &options.result_type);
        push_list(&mut pairs, "location_type", &options.location_type);
        push_opt(&mut pairs, "language", options.language.as_ref());
        let body = self.get(GEOCODE_PATH, &Params::sorted(pairs), &RequestOptions::default())?;
        Ok(take_field(body, "results"))
    }
}
