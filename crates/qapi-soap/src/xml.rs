//! A minimal navigable element tree for SOAP responses.
//!
//! Only what the response side needs is kept: qualified element names, text
//! content and children. Attributes are dropped while parsing.

use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::{Map, Value};

use crate::error::{Error, ErrorKind, Result};

/// One parsed element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    /// Qualified name as written in the document (`ns:getProductsResponse`).
    pub name: String,
    /// Concatenated text and CDATA content directly inside this element.
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Create an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: String::new(),
            children: Vec::new(),
        }
    }

    /// Name without its namespace prefix.
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// First element named `name` in document order, this element included.
    ///
    /// Matches either the qualified name or the local name, so lookups work
    /// whether or not namespace prefixes were filtered out beforehand.
    pub fn find(&self, name: &str) -> Option<&XmlElement> {
        if self.name == name || self.local_name() == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }

    /// All elements named `name` in document order, this element included.
    pub fn find_all<'a>(&'a self, name: &str) -> Vec<&'a XmlElement> {
        let mut found = Vec::new();
        self.collect(name, &mut found);
        found
    }

    fn collect<'a>(&'a self, name: &str, found: &mut Vec<&'a XmlElement>) {
        if self.name == name || self.local_name() == name {
            found.push(self);
        }
        for child in &self.children {
            child.collect(name, found);
        }
    }

    /// Convert to a structured value.
    ///
    /// - Element with child elements: mapping keyed by child local name, with
    ///   repeated names collected into a list in document order. Text mixed
    ///   in between child elements is ignored.
    /// - Leaf with text: string scalar.
    /// - Leaf without text: empty mapping, the "empty object" marker that the
    ///   normalizer later resolves to `null` or `[]`.
    pub fn to_value(&self) -> Value {
        if self.children.is_empty() {
            if self.text.is_empty() {
                return Value::Object(Map::new());
            }
            return Value::String(self.text.clone());
        }

        let mut map = Map::new();
        for child in &self.children {
            let key = child.local_name();
            let value = child.to_value();
            match map.get_mut(key) {
                Some(Value::Array(items)) => items.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
                None => {
                    map.insert(key.to_string(), value);
                }
            }
        }
        Value::Object(map)
    }
}

fn local_name(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

/// Parse a document into its root element.
pub fn parse(xml: &str) -> Result<XmlElement> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = std::str::from_utf8(e.name().as_ref())
                    .map_err(|err| Error::with_source(ErrorKind::Parse(err.to_string()), err))?
                    .to_string();
                stack.push(XmlElement::new(name));
            }
            Event::Empty(e) => {
                let name = std::str::from_utf8(e.name().as_ref())
                    .map_err(|err| Error::with_source(ErrorKind::Parse(err.to_string()), err))?
                    .to_string();
                attach(&mut stack, &mut root, XmlElement::new(name))?;
            }
            Event::End(_) => {
                let element = stack.pop().ok_or_else(|| {
                    Error::new(ErrorKind::Parse("unexpected closing tag".to_string()))
                })?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(e) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&e.unescape()?);
                }
            }
            Event::CData(e) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(Error::new(ErrorKind::Parse(format!(
            "unclosed element <{}>",
            stack.last().map(|e| e.name.as_str()).unwrap_or_default()
        ))));
    }
    root.ok_or_else(|| Error::new(ErrorKind::Parse("document has no root element".to_string())))
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(Error::new(ErrorKind::Parse(
            "document has more than one root element".to_string(),
        ))),
    }
}

/// Name of the response object inside the SOAP body.
///
/// Scans the raw text rather than parsing: the first `ns:` after the first
/// `SOAP-ENV:Body`, up to the following `>`. Attributes or a self-closing
/// slash after the name are not part of it. Returns `None` when any marker is
/// missing or the name is empty.
///
/// # Example
///
/// ```rust
/// use mplus_qapi_soap::xml::response_object_name;
///
/// let xml = "<SOAP-ENV:Body><ns:getProductsResponse><product/></ns:getProductsResponse></SOAP-ENV:Body>";
/// assert_eq!(response_object_name(xml), Some("getProductsResponse"));
/// ```
pub fn response_object_name(xml: &str) -> Option<&str> {
    const BODY: &str = "SOAP-ENV:Body";
    const PREFIX: &str = "ns:";

    let body = xml.find(BODY)?;
    let start = body + xml[body..].find(PREFIX)? + PREFIX.len();
    let end = start + xml[start..].find('>')?;
    let name = xml[start..end]
        .split(|c: char| c.is_whitespace() || c == '/')
        .next()
        .unwrap_or_default();

    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Strip the literal `ns:` prefix from element tags.
///
/// After this pass, lookups by bare element name find response elements
/// regardless of how the server prefixed them.
pub fn filter_namespace(xml: &str) -> String {
    xml.replace("<ns:", "<").replace("</ns:", "</")
}
