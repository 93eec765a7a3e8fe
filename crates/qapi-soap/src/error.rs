//! Error types for qapi-soap.
//!
//! Every failure of a call surfaces as one [`Error`], whatever stage it came
//! from. The error carries the request id that was sent in `X-Request-Id` so
//! it can be matched against server-side logs.

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    pub kind: ErrorKind,
    /// Request id of the call that failed, if one had been assigned.
    pub request_id: Option<String>,
    /// Request envelope, if the failure happened after encoding.
    pub request_xml: Option<String>,
    /// Raw response body, if a 200 response was received.
    pub response_xml: Option<String>,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            request_id: None,
            request_xml: None,
            response_xml: None,
            source: None,
        }
    }

    /// Create a new error with the given kind and source.
    pub fn with_source(kind: ErrorKind, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self {
            source: Some(Box::new(source)),
            ..Self::new(kind)
        }
    }

    pub(crate) fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub(crate) fn with_request_xml(mut self, xml: impl Into<String>) -> Self {
        self.request_xml = Some(xml.into());
        self
    }

    pub(crate) fn with_response_xml(mut self, xml: impl Into<String>) -> Self {
        self.response_xml = Some(xml.into());
        self
    }

    /// Request id sent in `X-Request-Id` for the failed call.
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// Application error code; each kind has its own range.
    pub fn code(&self) -> u32 {
        self.kind.code()
    }

    /// The fault string extracted from a server error, if any.
    pub fn fault(&self) -> Option<&str> {
        match &self.kind {
            ErrorKind::ServerFault { fault, .. } => fault.as_deref(),
            _ => None,
        }
    }

    /// HTTP status of the response that caused this error, if any.
    pub fn status(&self) -> Option<u16> {
        match &self.kind {
            ErrorKind::HttpStatus { status } | ErrorKind::ServerFault { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    #[error("Could not find response object")]
    ResponseShape,
    #[error("Could not parse XML: {0}")]
    Parse(String),
    #[error("No valid response: element {object} not found")]
    EmptyResponse { object: String },
    #[error("Received HTTP status {status}")]
    HttpStatus { status: u16 },
    #[error("{}", fault.as_ref().map(|f| format!("fault: {}", f)).unwrap_or_else(|| message.clone()))]
    ServerFault {
        status: u16,
        fault: Option<String>,
        message: String,
    },
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Could not encode request: {0}")]
    Encode(String),
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),
}

impl ErrorKind {
    /// Application error code for this kind.
    pub fn code(&self) -> u32 {
        match self {
            ErrorKind::ResponseShape => 1000,
            ErrorKind::Parse(_) => 2000,
            ErrorKind::EmptyResponse { .. } => 3000,
            ErrorKind::HttpStatus { .. } => 4000,
            ErrorKind::ServerFault { .. } => 5000,
            ErrorKind::Transport(_) => 6000,
            ErrorKind::Encode(_) => 7000,
            ErrorKind::InvalidQuantity(_) => 8000,
        }
    }
}

impl From<mplus_qapi_client::Error> for Error {
    fn from(err: mplus_qapi_client::Error) -> Self {
        Error::with_source(ErrorKind::Transport(err.to_string()), err)
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::with_source(ErrorKind::Parse(err.to_string()), err)
    }
}
