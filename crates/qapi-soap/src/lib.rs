//! # qapi-soap
//!
//! Schema-less SOAP codec and call session for the MplusKASSA QAPI.
//!
//! Requests and responses are loosely-typed [`StructuredValue`]s. The wire
//! shape of each request field is inferred from its value, and responses are
//! canonicalized with a [`ListIdentifierTable`] that decides by field name
//! which fields are lists.
//!
//! ## Pipeline
//!
//! ```text
//! request ──► Encoder ──► Transport ──► response_object_name
//!                                              │
//!             CallRecord ◄── normalize ◄── to_value ◄── parse
//! ```
//!
//! - [`Encoder`] builds the envelope in memory before anything is sent.
//! - Non-200 responses become [`ErrorKind::HttpStatus`], or
//!   [`ErrorKind::ServerFault`] for 5xx (with the `faultstring`, if any).
//! - [`normalize`] resolves empty elements, single-item lists, list wrapper
//!   elements and boolean text.
//!
//! ## Example
//!
//! ```rust,ignore
//! use mplus_qapi_soap::{SessionConfig, SoapSession};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> mplus_qapi_soap::Result<()> {
//!     let session = SoapSession::from_env()?;
//!
//!     let record = session
//!         .execute("getProducts", Some(&json!({"syncMarker": 0})), None)
//!         .await?;
//!     for product in record.value["productList"].as_array().into_iter().flatten() {
//!         println!("{}", product["articleNumber"]);
//!     }
//!     Ok(())
//! }
//! ```

mod encoder;
mod error;
mod fault;
mod helper;
mod list_table;
mod normalizer;
pub mod quantity;
mod session;
pub mod xml;

pub use encoder::{Encoder, FieldShape, DEFAULT_METHOD_NS};
pub use error::{Error, ErrorKind, Result};
pub use fault::extract_fault;
pub use helper::{decimalify_field, undecimalify_field, RequestPreparer};
pub use list_table::{ListIdentifier, ListIdentifierTable, ListPolicy};
pub use normalizer::normalize;
pub use quantity::{from_fixed_point, to_fixed_point, FixedPoint};
pub use session::{
    CallRecord, SessionConfig, SessionConfigBuilder, SoapSession, DEFAULT_REQUEST_ID_PREFIX,
};

/// A request or response value: scalar, ordered list, or ordered mapping.
pub type StructuredValue = serde_json::Value;
