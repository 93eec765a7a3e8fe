//! # mplus-qapi
//!
//! Client library for the MplusKASSA QAPI, a SOAP API without a usable
//! schema.
//!
//! ## Security
//!
//! - The API secret is redacted in Debug output
//! - Tracing skips request bodies and credentials
//! - Transport error messages have the `secret` query value removed
//!
//! ## Crates
//!
//! - **mplus-qapi-client** - HTTP transport: endpoint, timeouts, the `Transport` trait
//! - **mplus-qapi-soap** - Envelope encoding, response normalization, `SoapSession`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mplus_qapi::{ApiEndpoint, SessionConfig, SoapSession};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let endpoint = ApiEndpoint::new("api.mpluskassa.nl", 44305, "ident", "secret");
//!     let session = SoapSession::new(endpoint, SessionConfig::default())?;
//!
//!     let record = session.execute("getEmployees", None, None).await?;
//!     println!("{:#}", record.value);
//!     println!("took {}s", record.duration_secs());
//!
//!     Ok(())
//! }
//! ```

#[cfg(feature = "client")]
pub use mplus_qapi_client as client;
#[cfg(feature = "soap")]
pub use mplus_qapi_soap as soap;

#[cfg(feature = "client")]
pub use mplus_qapi_client::{ApiEndpoint, ClientConfig, HttpTransport, Transport};
#[cfg(feature = "soap")]
pub use mplus_qapi_soap::{
    CallRecord, Error, ErrorKind, ListIdentifierTable, ListPolicy, SessionConfig, SoapSession,
    StructuredValue,
};
