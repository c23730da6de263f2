//! Blocking HTTP GET seam used by [`Client`](crate::Client).
//!
//! The [`Transport`] trait keeps the orchestrator synchronous and lets tests
//! substitute a scripted implementation. [`ReqwestTransport`] is the
//! production implementation.
//!
//! # Runtime behaviour
//!
//! [`ReqwestTransport`] bridges reqwest's async client to the blocking
//! [`Transport::get`] call. Outside any Tokio runtime it uses its own
//! current-thread runtime. Inside a multi-threaded runtime it borrows that
//! runtime's handle through [`tokio::task::block_in_place`]. Inside a
//! `current_thread` runtime it falls back to its own runtime, which may
//! deadlock if the caller's runtime is driving IO this request needs.

use std::sync::Arc;

use reqwest::redirect::Policy;
use serde_json::Value;
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};

use crate::ClientConfig;

/// Status, headers, and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers in arrival order. Names are lowercase.
    pub headers: Vec<(String, String)>,
    /// Response body decoded as UTF-8 (lossily).
    pub body: String,
}

impl RawResponse {
    /// Build a response with no headers.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Whether the status lies in `200..=299`.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.status, 200..=299)
    }

    /// First header value with the given (case-insensitive) name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Parse the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns the parser error when the body is not valid JSON.
    pub fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// The request never produced an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The connect or read deadline passed.
    #[error("request to {url} timed out")]
    Timeout {
        /// URL of the request, with credentials redacted.
        url: String,
    },
    /// Connection, TLS, or body read failure.
    #[error("request to {url} failed: {message}")]
    Network {
        /// URL of the request, with credentials redacted.
        url: String,
        /// Description of the underlying failure.
        message: String,
    },
}

/// Blocking HTTP GET.
pub trait Transport: Send + Sync {
    /// Issue a GET for `url` and return whatever the server sent back.
    ///
    /// Redirects must not be followed; 3xx responses are returned as-is.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no response was received.
    fn get(&self, url: &str) -> Result<RawResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn get(&self, url: &str) -> Result<RawResponse, TransportError> {
        (**self).get(url)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn get(&self, url: &str) -> Result<RawResponse, TransportError> {
        (**self).get(url)
    }
}

/// Failure to construct a [`ReqwestTransport`].
#[derive(Debug, Error)]
pub enum TransportBuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// [`Transport`] backed by a reqwest client with redirects disabled.
pub struct ReqwestTransport {
    client: reqwest::Client,
    runtime: Runtime,
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("client", &self.client)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish()
    }
}

impl ReqwestTransport {
    /// Build a transport using the user agent and timeouts in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, TransportBuildError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(Policy::none());
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(timeout) = config.read_timeout {
            builder = builder.read_timeout(timeout);
        }
        let client = builder.build().map_err(TransportBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(TransportBuildError::Runtime)?;
        Ok(Self { client, runtime })
    }

    async fn fetch(&self, url: &str) -> Result<RawResponse, TransportError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| convert_reqwest_error(&err, url))?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_owned(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .text()
            .await
            .map_err(|err| convert_reqwest_error(&err, url))?;
        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

impl Transport for ReqwestTransport {
    fn get(&self, url: &str) -> Result<RawResponse, TransportError> {
        let future = self.fetch(url);
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }
}

fn convert_reqwest_error(error: &reqwest::Error, url: &str) -> TransportError {
    let redacted = crate::signing::redact(url);
    if error.is_timeout() {
        return TransportError::Timeout { url: redacted };
    }
    TransportError::Network {
        url: redacted,
        message: error.to_string(),
    }
}
