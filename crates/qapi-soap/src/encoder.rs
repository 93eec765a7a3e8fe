//! Structured value → SOAP request envelope.
//!
//! The request has no schema: the wire shape of each field is inferred from
//! the shape of its value (see [`FieldShape`]).

use std::borrow::Cow;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde_json::Value;

use crate::error::{Error, ErrorKind, Result};

/// Namespaces declared on every envelope.
pub const SOAP_ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const SOAP_ENCODING_NS: &str = "http://schemas.xmlsoap.org/soap/encoding/";
pub const XML_SCHEMA_INSTANCE_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const XML_SCHEMA_NS: &str = "http://www.w3.org/2001/XMLSchema";

/// Namespace of QAPI methods.
pub const DEFAULT_METHOD_NS: &str = "urn:mplusqapi";

const METHOD_PREFIX: &str = "ns1";

/// How one field of a request mapping goes on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldShape<'a> {
    /// Empty mapping or list: nothing is written.
    Empty,
    /// One element holding the text.
    Scalar(Cow<'a, str>),
    /// One element, with the mapping's fields (or each list item's fields)
    /// written inside it.
    Nested(&'a Value),
    /// One sibling element per item, no wrapper.
    Repeated(&'a [Value]),
}

impl<'a> FieldShape<'a> {
    /// Classify a field value.
    ///
    /// A list counts as nested when its first item is a mapping.
    pub fn of(value: &'a Value) -> Self {
        match value {
            Value::Object(map) if map.is_empty() => FieldShape::Empty,
            Value::Object(_) => FieldShape::Nested(value),
            Value::Array(items) if items.is_empty() => FieldShape::Empty,
            Value::Array(items) if items[0].is_object() => FieldShape::Nested(value),
            Value::Array(items) => FieldShape::Repeated(items),
            scalar => FieldShape::Scalar(scalar_text(scalar)),
        }
    }
}

/// Canonical text of a scalar; `null` is the empty string.
fn scalar_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        Value::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
        Value::Number(n) => Cow::Owned(n.to_string()),
        _ => Cow::Borrowed(""),
    }
}

/// Builds request envelopes for one method namespace.
#[derive(Debug, Clone)]
pub struct Encoder {
    namespace: String,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new(DEFAULT_METHOD_NS)
    }
}

impl Encoder {
    /// Create an encoder for method elements in `namespace`.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    /// Get the method namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Encode a call to `method` with an optional request value.
    ///
    /// The whole document is built in memory; nothing is sent until this
    /// returns.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mplus_qapi_soap::Encoder;
    /// use serde_json::json;
    ///
    /// let xml = Encoder::default()
    ///     .encode("getProducts", Some(&json!({"articleNumbers": [1, 2]})))
    ///     .unwrap();
    /// let xml = String::from_utf8(xml).unwrap();
    /// assert!(xml.contains("<ns1:articleNumbers>1</ns1:articleNumbers>"));
    /// assert!(xml.contains("<ns1:articleNumbers>2</ns1:articleNumbers>"));
    /// ```
    pub fn encode(&self, method: &str, request: Option<&Value>) -> Result<Vec<u8>> {
        check_name(method)?;
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

        write(
            &mut writer,
            Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)),
        )?;

        let mut envelope = BytesStart::new("SOAP-ENV:Envelope");
        envelope.push_attribute(("xmlns:SOAP-ENV", SOAP_ENVELOPE_NS));
        envelope.push_attribute(("xmlns:SOAP-ENC", SOAP_ENCODING_NS));
        envelope.push_attribute(("xmlns:xsi", XML_SCHEMA_INSTANCE_NS));
        envelope.push_attribute(("xmlns:xsd", XML_SCHEMA_NS));
        envelope.push_attribute(("xmlns:ns1", self.namespace.as_str()));
        write(&mut writer, Event::Start(envelope))?;
        write(&mut writer, Event::Start(BytesStart::new("SOAP-ENV:Body")))?;

        let method_tag = qualified(method);
        write(&mut writer, Event::Start(BytesStart::new(method_tag.as_str())))?;
        if let Some(request) = request {
            write_value(&mut writer, request)?;
        }
        write(&mut writer, Event::End(BytesEnd::new(method_tag.as_str())))?;

        write(&mut writer, Event::End(BytesEnd::new("SOAP-ENV:Body")))?;
        write(&mut writer, Event::End(BytesEnd::new("SOAP-ENV:Envelope")))?;

        Ok(writer.into_inner())
    }

    /// Like [`encode`](Self::encode), returning the document as a string.
    pub fn encode_to_string(&self, method: &str, request: Option<&Value>) -> Result<String> {
        let bytes = self.encode(method, request)?;
        String::from_utf8(bytes).map_err(|e| Error::with_source(ErrorKind::Encode(e.to_string()), e))
    }
}

/// Write `value` into the currently open element.
///
/// Mappings contribute one field per key. Lists are spliced: each item is
/// written into the same element, without a wrapper. Bare scalars have no
/// field name and contribute nothing.
fn write_value(writer: &mut Writer<Vec<u8>>, value: &Value) -> Result<()> {
    match value {
        Value::Object(map) => {
            for (key, field) in map {
                write_field(writer, key, field)?;
            }
            Ok(())
        }
        Value::Array(items) => {
            for item in items {
                write_value(writer, item)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn write_field(writer: &mut Writer<Vec<u8>>, key: &str, value: &Value) -> Result<()> {
    check_name(key)?;
    let tag = qualified(key);

    match FieldShape::of(value) {
        FieldShape::Empty => Ok(()),
        FieldShape::Scalar(text) => write_text_element(writer, &tag, &text),
        FieldShape::Nested(inner) => write_nested_element(writer, &tag, inner),
        FieldShape::Repeated(items) => {
            for item in items {
                match item {
                    Value::Object(_) | Value::Array(_) => write_nested_element(writer, &tag, item)?,
                    scalar => write_text_element(writer, &tag, &scalar_text(scalar))?,
                }
            }
            Ok(())
        }
    }
}

fn write_nested_element(writer: &mut Writer<Vec<u8>>, tag: &str, value: &Value) -> Result<()> {
    write(writer, Event::Start(BytesStart::new(tag)))?;
    write_value(writer, value)?;
    write(writer, Event::End(BytesEnd::new(tag)))
}

fn write_text_element(writer: &mut Writer<Vec<u8>>, tag: &str, text: &str) -> Result<()> {
    if text.is_empty() {
        return write(writer, Event::Empty(BytesStart::new(tag)));
    }
    write(writer, Event::Start(BytesStart::new(tag)))?;
    write(writer, Event::Text(BytesText::new(text)))?;
    write(writer, Event::End(BytesEnd::new(tag)))
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::new(ErrorKind::Encode(e.to_string())))
}

fn qualified(name: &str) -> String {
    format!("{}:{}", METHOD_PREFIX, name)
}

/// Reject names that cannot be an XML element name.
fn check_name(name: &str) -> Result<()> {
    let valid_start = name
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_');
    let valid_rest = name
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'));

    if valid_start && valid_rest {
        Ok(())
    } else {
        Err(Error::new(ErrorKind::Encode(format!(
            "invalid element name {:?}",
            name
        ))))
    }
}
