//! # qapi-client
//!
//! HTTP transport infrastructure for the MplusKASSA QAPI SOAP endpoint.
//!
//! This crate provides the collaborator the SOAP layer sends its envelopes
//! through:
//! - Endpoint and base URL construction (`scheme://host:port?ident=..&secret=..`)
//! - Connect and total timeouts, passed straight through per call
//! - Connection pooling (delegated to `reqwest`)
//! - Request/response tracing with credentials kept out of logs and errors
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      SoapSession                            │
//! │  (qapi-soap: encode, execute, normalize)                    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Transport (trait)                        │
//! │  - post(path, body, headers, timeouts) -> status + body     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    HttpTransport                            │
//! │  - reqwest client bound to one ApiEndpoint                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use mplus_qapi_client::{ApiEndpoint, ClientConfig, HttpTransport, Transport, TransportRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mplus_qapi_client::Error> {
//!     let endpoint = ApiEndpoint::from_env()?;
//!     let transport = HttpTransport::new(endpoint, ClientConfig::default())?;
//!
//!     let response = transport
//!         .post(TransportRequest::new("/", b"<xml/>".to_vec()))
//!         .await?;
//!     println!("status {}", response.status);
//!     Ok(())
//! }
//! ```

mod config;
mod error;
pub mod security;
mod transport;

pub use config::{ApiEndpoint, ClientConfig, ClientConfigBuilder};
pub use error::{Error, ErrorKind, Result};
pub use transport::{HttpTransport, Transport, TransportRequest, TransportResponse};

/// User-Agent string for the client
pub const USER_AGENT: &str = concat!("mplus-qapi/", env!("CARGO_PKG_VERSION"));

/// Default connect timeout, in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default total call timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;
