//! Request orchestration: authentication, throttling, retries, decoding.
//!
//! [`Client::get`] drives one logical request through its lifecycle:
//!
//! 1. Build and authenticate the URL. Missing credentials fail here,
//!    before any I/O.
//! 2. Take a rate-limit ticket, issue the HTTP call, return the ticket.
//! 3. Decode the response. Server errors and quota errors are retried with
//!    jittered exponential backoff until the retry budget, measured from the
//!    first attempt, would be exceeded. Every other outcome is final.
//!
//! # Example
//!
//! ```no_run
//! use waymark_client::{Client, ClientConfig, Params, RequestOptions};
//!
//! let client = Client::new(ClientConfig::new().with_key("AIza..."))?;
//! let params = Params::sorted([("address", "1600 Amphitheatre Parkway")]);
//! let body = client.get("/maps/api/geocode/json", &params, &RequestOptions::default())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, warn};
use rand::Rng;
use serde_json::Value;

use crate::error::{ConfigError, MapsError};
use crate::rate_limit::RateLimiter;
use crate::response::{DefaultDecoder, ResponseDecoder};
use crate::signing::{Credentials, Params, redact};
use crate::transport::{ReqwestTransport, Transport};

/// Base URL for every endpoint except the roads family.
pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com";

/// Default `User-Agent` header.
pub const DEFAULT_USER_AGENT: &str = concat!("waymark/", env!("CARGO_PKG_VERSION"));

const DEFAULT_RETRY_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_millis(500);
const BACKOFF_MULTIPLIER: f64 = 1.5;
/// Keeps the backoff finite however many retries fit in the budget.
const MAX_BACKOFF_EXPONENT: u32 = 30;

const ENV_API_KEY: &str = "WAYMARK_API_KEY";
const ENV_CLIENT_ID: &str = "WAYMARK_CLIENT_ID";
const ENV_CLIENT_SECRET: &str = "WAYMARK_CLIENT_SECRET";

/// Configuration for [`Client`].
#[derive(Clone)]
pub struct ClientConfig {
    /// API key appended as `key=`.
    pub key: Option<String>,
    /// Enterprise client id, used together with `client_secret`.
    pub client_id: Option<String>,
    /// Base64url enterprise signing secret.
    pub client_secret: Option<String>,
    /// Wall-clock budget for retries, measured from the first attempt.
    pub retry_timeout: Duration,
    /// Delay before the first retry; later retries grow by 1.5x.
    pub retry_base_delay: Duration,
    /// Maximum request starts per second, shared by all callers.
    pub queries_per_second: Option<u32>,
    /// Scheme and host requests are sent to.
    pub base_url: String,
    /// `User-Agent` header value.
    pub user_agent: String,
    /// TCP connect timeout passed to the HTTP transport.
    pub connect_timeout: Option<Duration>,
    /// Read timeout passed to the HTTP transport.
    pub read_timeout: Option<Duration>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted = |value: &Option<String>| value.as_ref().map(|_| "REDACTED");
        f.debug_struct("ClientConfig")
            .field("key", &redacted(&self.key))
            .field("client_id", &self.client_id)
            .field("client_secret", &redacted(&self.client_secret))
            .field("retry_timeout", &self.retry_timeout)
            .field("retry_base_delay", &self.retry_base_delay)
            .field("queries_per_second", &self.queries_per_second)
            .field("base_url", &self.base_url)
            .field("user_agent", &self.user_agent)
            .field("connect_timeout", &self.connect_timeout)
            .field("read_timeout", &self.read_timeout)
            .finish()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            key: None,
            client_id: None,
            client_secret: None,
            retry_timeout: DEFAULT_RETRY_TIMEOUT,
            retry_base_delay: DEFAULT_RETRY_BASE_DELAY,
            queries_per_second: None,
            base_url: DEFAULT_BASE_URL.to_owned(),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            connect_timeout: None,
            read_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Configuration with defaults and no credentials.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults plus any credentials found in `WAYMARK_API_KEY`,
    /// `WAYMARK_CLIENT_ID`, and `WAYMARK_CLIENT_SECRET`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            key: lookup(ENV_API_KEY),
            client_id: lookup(ENV_CLIENT_ID),
            client_secret: lookup(ENV_CLIENT_SECRET),
            ..Self::default()
        }
    }

    /// Set the API key.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Set enterprise credentials.
    #[must_use]
    pub fn with_client_id(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.client_id = Some(client_id.into());
        self.client_secret = Some(client_secret.into());
        self
    }

    /// Set the retry budget.
    #[must_use]
    pub const fn with_retry_timeout(mut self, timeout: Duration) -> Self {
        self.retry_timeout = timeout;
        self
    }

    /// Set the delay before the first retry.
    #[must_use]
    pub const fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    /// Cap request starts per second.
    #[must_use]
    pub const fn with_queries_per_second(mut self, queries_per_second: u32) -> Self {
        self.queries_per_second = Some(queries_per_second);
        self
    }

    /// Send requests to a different scheme and host.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the TCP connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the read timeout.
    #[must_use]
    pub const fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }
}

/// Per-request options supplied by endpoint builders.
#[derive(Clone)]
pub struct RequestOptions {
    /// Overrides the client's base URL.
    pub base_url: Option<String>,
    /// Whether the endpoint accepts enterprise signing.
    pub accepts_client_id: bool,
    /// Turns the raw response into a body or an error.
    pub decoder: Arc<dyn ResponseDecoder>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            base_url: None,
            accepts_client_id: true,
            decoder: Arc::new(DefaultDecoder),
        }
    }
}

impl fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestOptions")
            .field("base_url", &self.base_url)
            .field("accepts_client_id", &self.accepts_client_id)
            .field("decoder", &"<dyn ResponseDecoder>")
            .finish()
    }
}

impl RequestOptions {
    /// Send this request to a different scheme and host.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Declare whether the endpoint accepts enterprise signing.
    #[must_use]
    pub const fn with_accepts_client_id(mut self, accepts: bool) -> Self {
        self.accepts_client_id = accepts;
        self
    }

    /// Use a custom response decoder.
    #[must_use]
    pub fn with_decoder(mut self, decoder: impl ResponseDecoder + 'static) -> Self {
        self.decoder = Arc::new(decoder);
        self
    }
}

/// Authenticated, throttled, retrying client for the web services.
///
/// A client is `Send + Sync`; share one instance across threads so they
/// contend on the same rate limit.
pub struct Client {
    credentials: Credentials,
    base_url: String,
    retry_timeout: Duration,
    retry_base_delay: Duration,
    limiter: RateLimiter,
    transport: Box<dyn Transport>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("credentials", &self.credentials)
            .field("base_url", &self.base_url)
            .field("retry_timeout", &self.retry_timeout)
            .field("limiter", &self.limiter)
            .field("transport", &"<dyn Transport>")
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Build a client sending requests over HTTPS with reqwest.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the configuration is invalid or the HTTP
    /// transport cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        let transport = ReqwestTransport::new(&config)?;
        Self::with_transport(config, transport)
    }

    /// Build a client sending requests through `transport`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `queries_per_second` is zero or the
    /// client secret is not base64url.
    pub fn with_transport(
        config: ClientConfig,
        transport: impl Transport + 'static,
    ) -> Result<Self, ConfigError> {
        let limiter = match config.queries_per_second {
            None => RateLimiter::unlimited(),
            Some(qps) => usize::try_from(qps)
                .ok()
                .and_then(NonZeroUsize::new)
                .map(RateLimiter::per_second)
                .ok_or(ConfigError::ZeroQueriesPerSecond)?,
        };
        let credentials = Credentials::new(
            config.key,
            config.client_id,
            config.client_secret.as_deref(),
        )?;
        if credentials.is_empty() {
            warn!("no API key or enterprise credentials configured; requests will be rejected");
        }
        Ok(Self {
            credentials,
            base_url: config.base_url,
            retry_timeout: config.retry_timeout,
            retry_base_delay: config.retry_base_delay,
            limiter,
            transport: Box::new(transport),
        })
    }

    /// Issue an authenticated GET for `path` and decode the response.
    ///
    /// # Errors
    ///
    /// Returns [`MapsError::Argument`] without any I/O when no usable
    /// credential is configured. Otherwise returns the decoded error of the
    /// final attempt: the first terminal error, or the last retriable error
    /// once the retry budget would be exceeded.
    pub fn get(
        &self,
        path: &str,
        params: &Params,
        options: &RequestOptions,
    ) -> Result<Value, MapsError> {
        let auth_url =
            self.credentials
                .generate_auth_url(path, params, options.accepts_client_id)?;
        let base_url = options.base_url.as_deref().unwrap_or(&self.base_url);
        let url = format!("{}{auth_url}", base_url.trim_end_matches('/'));

        let started = Instant::now();
        let mut retries = 0_u32;
        loop {
            let error = match self.attempt(&url, options.decoder.as_ref()) {
                Ok(body) => return Ok(body),
                Err(error) if error.is_retriable() => error,
                Err(error) => return Err(error),
            };
            retries = retries.saturating_add(1);
            let delay = self.backoff(retries);
            if started.elapsed().saturating_add(delay) > self.retry_timeout {
                warn!(
                    "giving up on {} after {retries} attempt(s): {error}",
                    redact(&url)
                );
                return Err(error);
            }
            warn!("retrying {} in {delay:?}: {error}", redact(&url));
            std::thread::sleep(delay);
        }
    }

    fn attempt(&self, url: &str, decoder: &dyn ResponseDecoder) -> Result<Value, MapsError> {
        debug!("GET {}", redact(url));
        let response = {
            let _ticket = self.limiter.acquire();
            self.transport.get(url)?
        };
        if let Some(location) = response.header("location") {
            debug!("HTTP {} with location {location}", response.status);
        }
        decoder.decode(&response)
    }

    /// Delay before retry number `retry` (1-based).
    #[expect(
        clippy::float_arithmetic,
        reason = "jittered exponential backoff is computed in floating point"
    )]
    fn backoff(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(MAX_BACKOFF_EXPONENT);
        let jitter: f64 = rand::thread_rng().gen_range(0.5..1.5);
        let seconds =
            self.retry_base_delay.as_secs_f64() * BACKOFF_MULTIPLIER.powf(f64::from(exponent)) * jitter;
        Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
    }
}
