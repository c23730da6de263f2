//! Error taxonomy for requests issued through [`Client`](crate::Client).

use thiserror::Error;
use waymark_core::ArgumentError;

use crate::signing::SigningError;
use crate::transport::{RawResponse, TransportBuildError, TransportError};

/// A request failed to build, to send, or was rejected by the service.
///
/// Variants raised from an HTTP exchange keep the triggering response for
/// inspection via [`MapsError::response`]. Only [`MapsError::Server`] and
/// [`MapsError::RateLimit`] are retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum MapsError {
    /// The request could not be built from the supplied arguments.
    #[error(transparent)]
    Argument(#[from] ArgumentError),
    /// The request could not be signed.
    #[error(transparent)]
    Signing(#[from] SigningError),
    /// The service answered with a redirect.
    #[error("{message}")]
    Redirect {
        /// Human-readable description.
        message: String,
        /// Response that triggered the error.
        response: Option<Box<RawResponse>>,
    },
    /// HTTP 4xx, including 401.
    #[error("{message}")]
    Client {
        /// Human-readable description.
        message: String,
        /// Response that triggered the error.
        response: Option<Box<RawResponse>>,
    },
    /// HTTP 5xx.
    #[error("{message}")]
    Server {
        /// Human-readable description.
        message: String,
        /// Response that triggered the error.
        response: Option<Box<RawResponse>>,
    },
    /// The body reported that the query quota is exhausted.
    #[error("{message}")]
    RateLimit {
        /// Message reported by the service.
        message: String,
        /// Response that triggered the error.
        response: Option<Box<RawResponse>>,
    },
    /// The credentials were refused.
    #[error("{message}")]
    RequestDenied {
        /// Message reported by the service.
        message: String,
        /// Response that triggered the error.
        response: Option<Box<RawResponse>>,
    },
    /// The service considered the request malformed.
    #[error("{message}")]
    InvalidRequest {
        /// Message reported by the service.
        message: String,
        /// Response that triggered the error.
        response: Option<Box<RawResponse>>,
    },
    /// Any other unsuccessful or undecodable response.
    #[error("{message}")]
    Api {
        /// Message reported by the service, or a description of the fault.
        message: String,
        /// Response that triggered the error.
        response: Option<Box<RawResponse>>,
    },
    /// An HTTP status outside every known class.
    #[error("{message}")]
    Unknown {
        /// Human-readable description.
        message: String,
        /// Response that triggered the error.
        response: Option<Box<RawResponse>>,
    },
    /// No HTTP response was received.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Constructor shorthand used by the response decoders.
macro_rules! response_error {
    ($variant:ident, $message:expr, $response:expr) => {
        $crate::MapsError::$variant {
            message: ::std::string::String::from($message),
            response: ::std::option::Option::Some(::std::boxed::Box::new(
                ::std::clone::Clone::clone($response),
            )),
        }
    };
}
pub(crate) use response_error;

impl MapsError {
    /// Whether the orchestrator retries this failure.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(self, Self::Server { .. } | Self::RateLimit { .. })
    }

    /// The response that triggered the error, if any.
    #[must_use]
    pub fn response(&self) -> Option<&RawResponse> {
        match self {
            Self::Redirect { response, .. }
            | Self::Client { response, .. }
            | Self::Server { response, .. }
            | Self::RateLimit { response, .. }
            | Self::RequestDenied { response, .. }
            | Self::InvalidRequest { response, .. }
            | Self::Api { response, .. }
            | Self::Unknown { response, .. } => response.as_deref(),
            Self::Argument(_) | Self::Signing(_) | Self::Transport(_) => None,
        }
    }
}

/// A [`ClientConfig`](crate::ClientConfig) cannot produce a working client.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `queries_per_second` must be positive when set.
    #[error("queries_per_second must be greater than zero")]
    ZeroQueriesPerSecond,
    /// The client secret is not valid base64url.
    #[error("invalid client secret: {0}")]
    InvalidClientSecret(#[from] SigningError),
    /// The HTTP transport could not be built.
    #[error(transparent)]
    Transport(#[from] TransportBuildError),
}
