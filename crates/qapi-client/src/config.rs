//! Client configuration.

use std::time::Duration;

use url::Url;

use crate::error::{Error, ErrorKind, Result};

/// Configuration for the HTTP transport.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Total call timeout.
    pub timeout: Duration,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Pool idle timeout.
    pub pool_idle_timeout: Duration,
    /// Maximum idle connections per host.
    pub pool_max_idle_per_host: usize,
    /// User-Agent header value.
    pub user_agent: String,
    /// Whether to enable request/response tracing.
    pub enable_tracing: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(crate::DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(crate::DEFAULT_CONNECT_TIMEOUT_SECS),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 10,
            user_agent: crate::USER_AGENT.to_string(),
            enable_tracing: true,
        }
    }
}

impl ClientConfig {
    /// Create a new client config builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

/// Builder for ClientConfig.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set total call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set pool idle timeout.
    pub fn with_pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.pool_idle_timeout = timeout;
        self
    }

    /// Set maximum idle connections per host.
    pub fn with_pool_max_idle(mut self, max: usize) -> Self {
        self.config.pool_max_idle_per_host = max;
        self
    }

    /// Set custom User-Agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Enable or disable request/response tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.config.enable_tracing = enabled;
        self
    }

    /// Build the client configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

/// Location of a QAPI server and the credentials sent with every call.
///
/// The credentials travel as `ident` and `secret` query parameters, so the
/// secret is redacted from `Debug` output.
#[derive(Clone)]
pub struct ApiEndpoint {
    server: String,
    port: u16,
    ident: String,
    secret: String,
}

impl std::fmt::Debug for ApiEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiEndpoint")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("ident", &self.ident)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl ApiEndpoint {
    /// Create a new endpoint.
    ///
    /// `server` may be given with or without a scheme; `https` is assumed when
    /// it does not start with `http`.
    pub fn new(
        server: impl Into<String>,
        port: u16,
        ident: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            server: server.into(),
            port,
            ident: ident.into(),
            secret: secret.into(),
        }
    }

    /// Load the endpoint from environment variables.
    ///
    /// Reads `MPLUS_API_SERVER`, `MPLUS_API_PORT`, `MPLUS_API_IDENT` and
    /// `MPLUS_API_SECRET`.
    pub fn from_env() -> Result<Self> {
        let server = require_env("MPLUS_API_SERVER")?;
        let port = require_env("MPLUS_API_PORT")?
            .trim()
            .parse::<u16>()
            .map_err(|e| {
                Error::with_source(
                    ErrorKind::Config(format!("MPLUS_API_PORT is not a valid port: {}", e)),
                    e,
                )
            })?;
        let ident = require_env("MPLUS_API_IDENT")?;
        let secret = require_env("MPLUS_API_SECRET")?;

        Ok(Self::new(server, port, ident, secret))
    }

    /// The server as configured.
    pub fn server(&self) -> &str {
        &self.server
    }

    /// The port number.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// The API ident (username).
    pub fn ident(&self) -> &str {
        &self.ident
    }

    pub(crate) fn secret(&self) -> &str {
        &self.secret
    }

    /// Base URL of the server, `scheme://host:port`, without credentials.
    pub fn base_url(&self) -> Result<Url> {
        let server = self.server.trim_end_matches('/');
        let with_scheme = if server.to_ascii_lowercase().starts_with("http") {
            server.to_string()
        } else {
            format!("https://{}", server)
        };
        let mut url = Url::parse(&with_scheme)?;
        url.set_port(Some(self.port))
            .map_err(|_| Error::new(ErrorKind::InvalidUrl(format!("cannot set port on {}", with_scheme))))?;
        Ok(url)
    }

    /// Full URL for `path` with the credential query parameters attached.
    pub fn url_for(&self, path: &str) -> Result<Url> {
        let mut url = self.base_url()?.join(path)?;
        url.query_pairs_mut()
            .append_pair("ident", &self.ident)
            .append_pair("secret", &self.secret);
        Ok(url)
    }
}

fn require_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(Error::new(ErrorKind::EnvVar(name.to_string()))),
    }
}
