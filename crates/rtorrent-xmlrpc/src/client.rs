//! HTTP transport for XML-RPC calls.

use std::{env, fmt, time::Duration};

use reqwest::{StatusCode, header::CONTENT_TYPE};
use tracing::{debug, instrument, trace};
use url::Url;

use crate::{
    decode::decode_response,
    encode::encode_call,
    error::{Error, Result},
    value::Value,
};

/// Default endpoint of a local rTorrent SCGI-over-HTTP bridge.
pub const DEFAULT_ADDR: &str = "http://localhost:8000/RPC2";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for [`Client`].
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// Endpoint URL the requests are POSTed to.
    pub addr: String,
    /// Accept any TLS certificate. Only meant for self-signed test setups.
    pub tls_skip_verify: bool,
    /// HTTP Basic user; credentials are sent only when user and password are both set.
    pub basic_user: Option<String>,
    /// HTTP Basic password.
    pub basic_pass: Option<String>,
    /// Timeout for one full request/response exchange.
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            tls_skip_verify: false,
            basic_user: None,
            basic_pass: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Config {
    /// Creates a configuration for the given endpoint with default settings.
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            ..Default::default()
        }
    }

    /// Reads the configuration from the environment.
    ///
    /// `RTORRENT_ADDR`, `RTORRENT_TLS_SKIP_VERIFY` (`1` or `true`),
    /// `RTORRENT_BASIC_USER` and `RTORRENT_BASIC_PASS`. Unset variables keep
    /// their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            addr: env::var("RTORRENT_ADDR").unwrap_or(defaults.addr),
            tls_skip_verify: env::var("RTORRENT_TLS_SKIP_VERIFY")
                .map(|v| matches!(v.as_str(), "1" | "true"))
                .unwrap_or(defaults.tls_skip_verify),
            basic_user: env::var("RTORRENT_BASIC_USER").ok(),
            basic_pass: env::var("RTORRENT_BASIC_PASS").ok(),
            timeout: defaults.timeout,
        }
    }

    fn credentials(&self) -> Option<(&str, &str)> {
        match (self.basic_user.as_deref(), self.basic_pass.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => Some((user, pass)),
            _ => None,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print credentials.
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("tls_skip_verify", &self.tls_skip_verify)
            .field("basic_user", &self.basic_user)
            .field("basic_pass", &self.basic_pass.as_ref().map(|_| "<set>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// An XML-RPC client bound to one endpoint.
///
/// Each [`Client::call`] performs exactly one encode, HTTP exchange and decode.
/// Nothing is retried. The client is cheap to clone and safe to share between
/// tasks.
#[derive(Clone)]
pub struct Client {
    addr: Url,
    credentials: Option<(String, String)>,
    http: reqwest::Client,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("addr", &self.addr.as_str())
            .field("basic_auth", &self.credentials.is_some())
            .finish()
    }
}

impl Client {
    /// Creates a client from the given configuration.
    pub fn new(config: Config) -> Result<Self> {
        let addr = Url::parse(&config.addr)
            .map_err(|e| Error::InvalidUrl(format!("{}: {e}", config.addr)))?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.tls_skip_verify)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;
        let credentials = config
            .credentials()
            .map(|(user, pass)| (user.to_owned(), pass.to_owned()));

        debug!("Created XML-RPC client for {}", addr);
        Ok(Self {
            addr,
            credentials,
            http,
        })
    }

    /// Creates a client that sends its requests through `http`.
    ///
    /// Proxies, certificate roots, timeouts and pooling are whatever `http` was
    /// built with. No credentials are attached.
    pub fn with_http_client(addr: &str, http: reqwest::Client) -> Result<Self> {
        let addr = Url::parse(addr).map_err(|e| Error::InvalidUrl(format!("{addr}: {e}")))?;

        debug!("Created XML-RPC client for {} with a caller-supplied HTTP client", addr);
        Ok(Self {
            addr,
            credentials: None,
            http,
        })
    }

    /// The endpoint this client talks to.
    pub fn addr(&self) -> &Url {
        &self.addr
    }

    /// Calls `method` with `args` and returns the single result value.
    ///
    /// A fault document is returned as [`Error::RemoteFault`].
    #[instrument(skip(self, args), fields(addr = %self.addr))]
    pub async fn call(&self, method: &str, args: &[Value]) -> Result<Value> {
        let body = encode_call(method, args);
        trace!("Request body: {}", String::from_utf8_lossy(&body));

        let mut request = self
            .http
            .post(self.addr.clone())
            .header(CONTENT_TYPE, "text/xml")
            .body(body);
        if let Some((user, pass)) = &self.credentials {
            request = request.basic_auth(user, Some(pass));
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;
        match response.status() {
            StatusCode::UNAUTHORIZED => return Err(Error::Unauthorized),
            status if !status.is_success() => return Err(Error::Http(status.as_u16())),
            _ => {}
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;
        trace!("Response body: {}", String::from_utf8_lossy(&bytes));

        let value = decode_response(&bytes)?.into_result()?;
        debug!("{method} returned {}", value.kind());
        Ok(value)
    }
}
