//! Test utilities for code built on [`Client`](crate::Client).
//!
//! [`StubTransport`] replays scripted responses without touching the
//! network and records every URL it was asked for.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use crate::transport::{RawResponse, Transport, TransportError};

type Outcome = Result<RawResponse, TransportError>;

/// Deterministic [`Transport`] double.
///
/// Scripted outcomes are returned in order. Once the script is exhausted the
/// fallback outcome is returned for every further call.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use waymark_client::test_support::StubTransport;
/// use waymark_client::{Client, ClientConfig, Params, RawResponse, RequestOptions};
///
/// let stub = Arc::new(StubTransport::scripted([
///     RawResponse::new(500, ""),
///     RawResponse::new(200, r#"{"status":"OK"}"#),
/// ]));
/// let config = ClientConfig::new()
///     .with_key("AIzaTest")
///     .with_retry_base_delay(std::time::Duration::from_millis(1));
/// let client = Client::with_transport(config, Arc::clone(&stub))?;
///
/// client.get("/maps/api/geocode/json", &Params::new(), &RequestOptions::default())?;
/// assert_eq!(stub.calls(), 2);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct StubTransport {
    script: Mutex<VecDeque<Outcome>>,
    fallback: Outcome,
    requests: Mutex<Vec<String>>,
}

impl StubTransport {
    /// Return `response` for every call.
    #[must_use]
    pub fn always(response: RawResponse) -> Self {
        Self::new(VecDeque::new(), Ok(response))
    }

    /// Fail every call with `error`.
    #[must_use]
    pub fn failing(error: TransportError) -> Self {
        Self::new(VecDeque::new(), Err(error))
    }

    /// Return `responses` in order, then a network error.
    #[must_use]
    pub fn scripted(responses: impl IntoIterator<Item = RawResponse>) -> Self {
        Self::new(
            responses.into_iter().map(Ok).collect(),
            Err(TransportError::Network {
                url: String::new(),
                message: "stub script exhausted".to_owned(),
            }),
        )
    }

    const fn new(script: VecDeque<Outcome>, fallback: Outcome) -> Self {
        Self {
            script: Mutex::new(script),
            fallback,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Number of calls received so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// URLs requested so far, oldest first.
    #[must_use]
    pub fn requested_urls(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Transport for StubTransport {
    fn get(&self, url: &str) -> Result<RawResponse, TransportError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_owned());
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}
