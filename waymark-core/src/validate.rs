//! Enumerated request values the remote service does not validate itself.
//!
//! The service silently ignores unknown travel modes and restrictions, so
//! these are checked locally before a request is built.

use std::fmt;
use std::str::FromStr;

use crate::ArgumentError;

/// Mode of transport used when computing directions or distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TravelMode {
    /// Road network driving directions.
    Driving,
    /// Pedestrian paths and sidewalks.
    Walking,
    /// Cycle paths and preferred streets.
    Bicycling,
    /// Public transit routes.
    Transit,
}

impl TravelMode {
    /// Wire representation of the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Driving => "driving",
            Self::Walking => "walking",
            Self::Bicycling => "bicycling",
            Self::Transit => "transit",
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TravelMode {
    type Err = ArgumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "driving" => Ok(Self::Driving),
            "walking" => Ok(Self::Walking),
            "bicycling" => Ok(Self::Bicycling),
            "transit" => Ok(Self::Transit),
            other => Err(ArgumentError::InvalidTravelMode {
                value: other.to_owned(),
            }),
        }
    }
}

/// Feature a computed route should avoid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Avoid {
    /// Toll roads and bridges.
    Tolls,
    /// Highways.
    Highways,
    /// Ferries.
    Ferries,
}

impl Avoid {
    /// Wire representation of the restriction.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tolls => "tolls",
            Self::Highways => "highways",
            Self::Ferries => "ferries",
        }
    }
}

impl fmt::Display for Avoid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Avoid {
    type Err = ArgumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tolls" => Ok(Self::Tolls),
            "highways" => Ok(Self::Highways),
            "ferries" => Ok(Self::Ferries),
            other => Err(ArgumentError::InvalidAvoid {
                value: other.to_owned(),
            }),
        }
    }
}
