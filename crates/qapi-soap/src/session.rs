//! SOAP session: one call is encode, send, locate, normalize.

use std::borrow::Cow;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use mplus_qapi_client::{
    ApiEndpoint, ClientConfig, HttpTransport, Transport, TransportRequest, TransportResponse,
};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::encoder::{Encoder, DEFAULT_METHOD_NS};
use crate::error::{Error, ErrorKind, Result};
use crate::fault::extract_fault;
use crate::list_table::ListIdentifierTable;
use crate::normalizer::normalize;
use crate::xml;

/// Prefix of generated request ids.
pub const DEFAULT_REQUEST_ID_PREFIX: &str = "mpac_";

/// Settings for a [`SoapSession`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Namespace of method elements (`xmlns:ns1`).
    pub namespace: String,
    /// Prefix of generated `X-Request-Id` values.
    pub request_id_prefix: String,
    /// Strip the literal `ns:` prefix from responses before parsing.
    pub strip_response_namespace: bool,
    /// Field names treated as lists when normalizing responses.
    pub list_table: ListIdentifierTable,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Total call timeout.
    pub timeout: Duration,
    /// User-Agent header value.
    pub user_agent: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_METHOD_NS.to_string(),
            request_id_prefix: DEFAULT_REQUEST_ID_PREFIX.to_string(),
            strip_response_namespace: true,
            list_table: ListIdentifierTable::mplus_default(),
            connect_timeout: Duration::from_secs(mplus_qapi_client::DEFAULT_CONNECT_TIMEOUT_SECS),
            timeout: Duration::from_secs(mplus_qapi_client::DEFAULT_TIMEOUT_SECS),
            user_agent: mplus_qapi_client::USER_AGENT.to_string(),
        }
    }
}

impl SessionConfig {
    /// Create a new session config builder.
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }

    /// Transport settings matching this session's timeouts and user agent.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::builder()
            .with_connect_timeout(self.connect_timeout)
            .with_timeout(self.timeout)
            .with_user_agent(self.user_agent.clone())
            .build()
    }
}

/// Builder for [`SessionConfig`].
#[derive(Debug, Default)]
pub struct SessionConfigBuilder {
    config: SessionConfig,
}

impl SessionConfigBuilder {
    /// Set the method namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config.namespace = namespace.into();
        self
    }

    /// Set the prefix of generated request ids.
    pub fn with_request_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.request_id_prefix = prefix.into();
        self
    }

    /// Enable or disable `ns:` prefix stripping on responses.
    pub fn with_strip_response_namespace(mut self, enabled: bool) -> Self {
        self.config.strip_response_namespace = enabled;
        self
    }

    /// Set the list identifier table.
    pub fn with_list_table(mut self, table: ListIdentifierTable) -> Self {
        self.config.list_table = table;
        self
    }

    /// Set connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set total call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the User-Agent header value.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Build the config.
    pub fn build(self) -> SessionConfig {
        self.config
    }
}

/// Everything about one completed call.
#[derive(Debug, Clone)]
pub struct CallRecord {
    /// The normalized response object.
    pub value: Value,
    /// Id sent in `X-Request-Id`.
    pub request_id: String,
    /// Request envelope as sent.
    pub request_xml: String,
    /// Raw response body.
    pub response_xml: String,
    pub started_at: DateTime<Utc>,
    /// Time from encoding to the normalized value.
    pub duration: Duration,
}

impl CallRecord {
    /// Call duration in seconds, rounded to one decimal.
    pub fn duration_secs(&self) -> f64 {
        (self.duration.as_secs_f64() * 10.0).round() / 10.0
    }

    /// Take the normalized response value.
    pub fn into_value(self) -> Value {
        self.value
    }
}

/// A session against one QAPI server.
///
/// Holds no per-call state: every [`execute`](Self::execute) returns its own
/// [`CallRecord`], so one session can serve concurrent calls.
///
/// # Example
///
/// ```rust,no_run
/// use mplus_qapi_client::ApiEndpoint;
/// use mplus_qapi_soap::{SessionConfig, SoapSession};
///
/// # async fn example() -> mplus_qapi_soap::Result<()> {
/// let endpoint = ApiEndpoint::new("api.mpluskassa.nl", 44305, "ident", "secret");
/// let session = SoapSession::new(endpoint, SessionConfig::default())?;
///
/// let record = session.execute("getProducts", None, None).await?;
/// println!("{} in {}s", record.value, record.duration_secs());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SoapSession<T: Transport = HttpTransport> {
    transport: T,
    encoder: Encoder,
    config: SessionConfig,
}

impl SoapSession<HttpTransport> {
    /// Create a session over HTTP.
    pub fn new(endpoint: ApiEndpoint, config: SessionConfig) -> Result<Self> {
        let transport = HttpTransport::new(endpoint, config.client_config())?;
        Ok(Self::with_transport(transport, config))
    }

    /// Create a session from `MPLUS_API_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ApiEndpoint::from_env()?, SessionConfig::default())
    }
}

impl<T: Transport> SoapSession<T> {
    /// Create a session over any transport.
    pub fn with_transport(transport: T, config: SessionConfig) -> Self {
        Self {
            transport,
            encoder: Encoder::new(config.namespace.clone()),
            config,
        }
    }

    /// Get the session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Get the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Call `method` with an optional request value.
    ///
    /// `request_id` is sent as `X-Request-Id`; one is generated when `None`.
    /// Any failure is returned as one [`Error`] carrying that request id.
    #[instrument(skip_all, fields(method = %method, request_id = tracing::field::Empty))]
    pub async fn execute(
        &self,
        method: &str,
        request: Option<&Value>,
        request_id: Option<&str>,
    ) -> Result<CallRecord> {
        let request_id = request_id
            .map(str::to_string)
            .unwrap_or_else(|| self.generate_request_id());
        tracing::Span::current().record("request_id", request_id.as_str());

        let started_at = Utc::now();
        let start = Instant::now();

        let request_xml = self
            .encoder
            .encode_to_string(method, request)
            .map_err(|e| e.with_request_id(&request_id))?;
        debug!(bytes = request_xml.len(), "Encoded request");

        let transport_request = TransportRequest::new("/", request_xml.clone().into_bytes())
            .header("User-Agent", &self.config.user_agent)
            .header("Content-Type", "text/xml; charset=utf-8")
            .header("SOAPAction", method)
            .header("X-Request-Id", &request_id)
            .connect_timeout(self.config.connect_timeout)
            .timeout(self.config.timeout);

        let response = self.transport.post(transport_request).await.map_err(|e| {
            warn!(error = %e, "Transport failed");
            Error::from(e)
                .with_request_id(&request_id)
                .with_request_xml(&request_xml)
        })?;

        if !response.is_ok() {
            return Err(status_error(&response)
                .with_request_id(&request_id)
                .with_request_xml(&request_xml));
        }

        let response_xml = response.text();
        let value = self.decode(&response_xml).map_err(|e| {
            warn!(code = e.code(), error = %e, "Could not decode response");
            e.with_request_id(&request_id)
                .with_request_xml(&request_xml)
                .with_response_xml(&response_xml)
        })?;

        let duration = start.elapsed();
        info!(
            duration_ms = duration.as_millis() as u64,
            response_bytes = response_xml.len(),
            "Call completed"
        );

        Ok(CallRecord {
            value,
            request_id,
            request_xml,
            response_xml,
            started_at,
            duration,
        })
    }

    /// Locate the response object in a 200 body and normalize it.
    fn decode(&self, response_xml: &str) -> Result<Value> {
        let object = xml::response_object_name(response_xml)
            .ok_or_else(|| Error::new(ErrorKind::ResponseShape))?;

        let document: Cow<'_, str> = if self.config.strip_response_namespace {
            Cow::Owned(xml::filter_namespace(response_xml))
        } else {
            Cow::Borrowed(response_xml)
        };

        let root = xml::parse(&document)?;
        let element = root.find(object).ok_or_else(|| {
            Error::new(ErrorKind::EmptyResponse {
                object: object.to_string(),
            })
        })?;

        Ok(normalize(element.to_value(), &self.config.list_table))
    }

    fn generate_request_id(&self) -> String {
        format!("{}{}", self.config.request_id_prefix, Uuid::new_v4().simple())
    }
}

fn status_error(response: &TransportResponse) -> Error {
    let status = response.status;
    if response.is_server_error() {
        let fault = extract_fault(&response.body);
        warn!(status, fault = ?fault, "Server returned an error");
        Error::new(ErrorKind::ServerFault {
            status,
            fault,
            message: format!("Server error: HTTP {}", status),
        })
    } else {
        warn!(status, "Unexpected HTTP status");
        Error::new(ErrorKind::HttpStatus { status })
    }
}
