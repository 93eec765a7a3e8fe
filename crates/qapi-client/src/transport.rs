//! The HTTP collaborator: send bytes, get status, body and headers back.

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, info, instrument};

use crate::config::{ApiEndpoint, ClientConfig};
use crate::error::{Error, ErrorKind, Result};

/// A single POST to the QAPI server.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// Path relative to the endpoint base URL.
    pub path: String,
    /// Raw request body.
    pub body: Vec<u8>,
    /// Request headers, sent in order.
    pub headers: Vec<(String, String)>,
    /// Connect timeout; the transport's configured value when `None`.
    pub connect_timeout: Option<Duration>,
    /// Total call timeout; the transport's configured value when `None`.
    pub timeout: Option<Duration>,
}

impl TransportRequest {
    /// Create a request for `path` with the given body.
    pub fn new(path: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            body,
            headers: Vec::new(),
            connect_timeout: None,
            timeout: None,
        }
    }

    /// Add a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the connect timeout for this call.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the total timeout for this call.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Look up a header value (case-insensitive).
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// What came back from the server, whatever the status.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: Bytes,
    /// Response headers, names lowercased.
    pub headers: Vec<(String, String)>,
}

impl TransportResponse {
    /// Create a response.
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
            headers: Vec::new(),
        }
    }

    /// Returns true for HTTP 200.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Returns true for any 5xx status.
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Look up a header value (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Sends requests to the QAPI server.
///
/// Implementations must not interpret the status code: non-2xx responses are
/// returned as `Ok`, and `Err` is reserved for failures where no response was
/// received (connect failure, timeout, broken connection).
pub trait Transport: Send + Sync {
    /// POST `request` and return the server's response.
    fn post(
        &self,
        request: TransportRequest,
    ) -> impl Future<Output = Result<TransportResponse>> + Send;
}

/// `reqwest`-backed transport bound to one [`ApiEndpoint`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    inner: reqwest::Client,
    endpoint: ApiEndpoint,
    config: ClientConfig,
}

impl HttpTransport {
    /// Create a transport for `endpoint`.
    pub fn new(endpoint: ApiEndpoint, config: ClientConfig) -> Result<Self> {
        // Fail early on a server string that cannot form a URL
        endpoint.base_url()?;
        let inner = build_client(&config, config.connect_timeout)?;
        Ok(Self {
            inner,
            endpoint,
            config,
        })
    }

    /// Create a transport with default configuration.
    pub fn with_defaults(endpoint: ApiEndpoint) -> Result<Self> {
        Self::new(endpoint, ClientConfig::default())
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the endpoint.
    pub fn endpoint(&self) -> &ApiEndpoint {
        &self.endpoint
    }

    fn client_for(&self, connect_timeout: Option<Duration>) -> Result<reqwest::Client> {
        match connect_timeout {
            Some(timeout) if timeout != self.config.connect_timeout => {
                debug!(
                    connect_timeout_ms = timeout.as_millis() as u64,
                    "Building client for per-call connect timeout"
                );
                build_client(&self.config, timeout)
            }
            _ => Ok(self.inner.clone()),
        }
    }
}

impl Transport for HttpTransport {
    #[instrument(skip(self, request), fields(path = %request.path, body_len = request.body.len()))]
    async fn post(&self, request: TransportRequest) -> Result<TransportResponse> {
        let url = self.endpoint.url_for(&request.path)?;
        let client = self.client_for(request.connect_timeout)?;

        let mut req = client
            .post(url)
            .timeout(request.timeout.unwrap_or(self.config.timeout));
        for (name, value) in &request.headers {
            req = req.header(name.as_str(), value.as_str());
        }

        if self.config.enable_tracing {
            debug!(server = %self.endpoint.server(), "Sending request");
        }

        let response = req.body(request.body).send().await?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await?;

        if self.config.enable_tracing {
            if (200..300).contains(&status) {
                debug!(status, content_length = body.len(), "Response received");
            } else {
                info!(status, content_length = body.len(), "Non-success response");
            }
        }

        Ok(TransportResponse {
            status,
            body,
            headers,
        })
    }
}

fn build_client(config: &ClientConfig, connect_timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.timeout)
        .connect_timeout(connect_timeout)
        .pool_idle_timeout(config.pool_idle_timeout)
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .user_agent(&config.user_agent)
        .build()
        .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))
}
