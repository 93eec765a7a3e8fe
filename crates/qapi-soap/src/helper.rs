//! Request and response reshaping helpers.
//!
//! Everything here is a pure function over [`Value`]: inputs are consumed and
//! a reshaped value is returned.

use serde_json::{Map, Value};

use crate::error::{Error, ErrorKind, Result};
use crate::quantity::{from_fixed_point, to_fixed_point};

/// Reshapes a caller-built request into the shape the QAPI expects.
///
/// Steps run in a fixed order: key renames, then list wrapping (on the
/// renamed keys), then boolean conversion.
///
/// # Example
///
/// ```rust
/// use mplus_qapi_soap::RequestPreparer;
/// use serde_json::json;
///
/// let request = json!({"order": {"lines": [{"sku": "A"}, {"sku": "B"}], "paid": false}});
/// let prepared = RequestPreparer::new()
///     .rename_key("lines", "lineList")
///     .wrap_list("lineList", "line")
///     .convert_bools(true)
///     .prepare(request);
///
/// assert_eq!(
///     prepared,
///     json!({"order": {"lineList": [{"line": {"sku": "A"}}, {"line": {"sku": "B"}}], "paid": 0}})
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestPreparer {
    renames: Vec<(String, String)>,
    list_elements: Vec<(String, String)>,
    convert_bools: bool,
}

impl RequestPreparer {
    /// Create a preparer that changes nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rename every mapping key equal to `from`, at any depth.
    ///
    /// The first matching rename applies; renamed keys keep their position.
    pub fn rename_key(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.renames.push((from.into(), to.into()));
        self
    }

    /// Wrap each item under `list_name` in a mapping `{element_name: item}`.
    ///
    /// Applies to list and mapping values; a mapping's keys are dropped and its
    /// values become the items.
    pub fn wrap_list(mut self, list_name: impl Into<String>, element_name: impl Into<String>) -> Self {
        self.list_elements.push((list_name.into(), element_name.into()));
        self
    }

    /// Turn booleans into `1` / `0`.
    pub fn convert_bools(mut self, enabled: bool) -> Self {
        self.convert_bools = enabled;
        self
    }

    /// Apply the configured steps to `request`.
    pub fn prepare(&self, request: Value) -> Value {
        let mut value = request;
        if !self.renames.is_empty() {
            value = self.rename_keys(value);
        }
        if !self.list_elements.is_empty() {
            value = self.wrap_lists(value);
        }
        if self.convert_bools {
            value = convert_bools(value);
        }
        value
    }

    fn rename_keys(&self, value: Value) -> Value {
        match value {
            Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(key, child)| {
                        let key = self
                            .renames
                            .iter()
                            .find(|(from, _)| *from == key)
                            .map_or(key, |(_, to)| to.clone());
                        (key, self.rename_keys(child))
                    })
                    .collect(),
            ),
            Value::Array(items) => {
                Value::Array(items.into_iter().map(|item| self.rename_keys(item)).collect())
            }
            other => other,
        }
    }

    fn wrap_lists(&self, value: Value) -> Value {
        match value {
            Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(key, child)| {
                        let child = self.wrap_lists(child);
                        let element = self
                            .list_elements
                            .iter()
                            .find(|(list_name, _)| *list_name == key)
                            .map(|(_, element)| element.as_str());
                        let child = match element {
                            Some(element) => wrap_items(child, element),
                            None => child,
                        };
                        (key, child)
                    })
                    .collect(),
            ),
            Value::Array(items) => {
                Value::Array(items.into_iter().map(|item| self.wrap_lists(item)).collect())
            }
            other => other,
        }
    }
}

fn wrap_items(value: Value, element: &str) -> Value {
    let items: Vec<Value> = match value {
        Value::Array(items) => items,
        Value::Object(map) => map.into_iter().map(|(_, item)| item).collect(),
        scalar => return scalar,
    };
    Value::Array(
        items
            .into_iter()
            .map(|item| {
                let mut wrapper = Map::new();
                wrapper.insert(element.to_string(), item);
                Value::Object(wrapper)
            })
            .collect(),
    )
}

fn convert_bools(value: Value) -> Value {
    match value {
        Value::Bool(b) => Value::from(u8::from(b)),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, child)| (key, convert_bools(child)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(convert_bools).collect()),
        other => other,
    }
}

/// Replace fixed-point fields by decimal values, at any depth.
///
/// Wherever a mapping holds a scalar `source_field`, it and its
/// `decimal_places_field` (default `0` places) are removed and the decimal
/// value is stored under `target_field`, or `source_field` when `None`.
///
/// # Example
///
/// ```rust
/// use mplus_qapi_soap::decimalify_field;
/// use serde_json::json;
///
/// let value = json!({"line": {"quantity": 1250, "decimalPlaces": 2}});
/// let value = decimalify_field(value, "quantity", "decimalPlaces", None).unwrap();
/// assert_eq!(value, json!({"line": {"quantity": 12.5}}));
/// ```
pub fn decimalify_field(
    value: Value,
    source_field: &str,
    decimal_places_field: &str,
    target_field: Option<&str>,
) -> Result<Value> {
    let map = match value {
        Value::Object(map) => map,
        Value::Array(items) => {
            return items
                .into_iter()
                .map(|item| decimalify_field(item, source_field, decimal_places_field, target_field))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array);
        }
        scalar => return Ok(scalar),
    };

    let fixed = match map.get(source_field) {
        Some(field) if is_scalar(field) => {
            let places = match map.get(decimal_places_field) {
                Some(places) => decimal_places(places)?,
                None => 0,
            };
            Some((integer(field)?, places))
        }
        _ => None,
    };

    let mut result = Map::new();
    for (key, child) in map {
        if fixed.is_some() && (key == source_field || key == decimal_places_field) {
            continue;
        }
        let child = decimalify_field(child, source_field, decimal_places_field, target_field)?;
        result.insert(key, child);
    }

    if let Some((quantity, places)) = fixed {
        let target = target_field.unwrap_or(source_field);
        result.insert(target.to_string(), Value::from(from_fixed_point(quantity, places)));
    }
    Ok(Value::Object(result))
}

/// Replace decimal fields by fixed-point values, at any depth.
///
/// Wherever a mapping holds a scalar `source_field`, it is removed and the
/// integer value is stored under `target_field` (or `source_field`), with the
/// number of places under `decimal_places_field`.
///
/// # Example
///
/// ```rust
/// use mplus_qapi_soap::undecimalify_field;
/// use serde_json::json;
///
/// let value = json!({"line": {"price": "12,50"}});
/// let value = undecimalify_field(value, "price", "priceDecimalPlaces", Some("priceInt")).unwrap();
/// assert_eq!(value, json!({"line": {"priceInt": 1250, "priceDecimalPlaces": 2}}));
/// ```
pub fn undecimalify_field(
    value: Value,
    source_field: &str,
    decimal_places_field: &str,
    target_field: Option<&str>,
) -> Result<Value> {
    let map = match value {
        Value::Object(map) => map,
        Value::Array(items) => {
            return items
                .into_iter()
                .map(|item| undecimalify_field(item, source_field, decimal_places_field, target_field))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array);
        }
        scalar => return Ok(scalar),
    };

    let fixed = match map.get(source_field) {
        Some(field) if is_scalar(field) => Some(fixed_point(field)?),
        _ => None,
    };

    let mut result = Map::new();
    for (key, child) in map {
        if fixed.is_some() && key == source_field {
            continue;
        }
        let child = undecimalify_field(child, source_field, decimal_places_field, target_field)?;
        result.insert(key, child);
    }

    if let Some((quantity, places)) = fixed {
        let target = target_field.unwrap_or(source_field);
        result.insert(target.to_string(), Value::from(quantity));
        result.insert(decimal_places_field.to_string(), Value::from(places));
    }
    Ok(Value::Object(result))
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Object(_) | Value::Array(_))
}

fn invalid(value: &Value) -> Error {
    Error::new(ErrorKind::InvalidQuantity(value.to_string()))
}

/// Integer held by a number or numeric text.
fn integer(value: &Value) -> Result<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .ok_or_else(|| invalid(value)),
        Value::String(s) => s.trim().parse().map_err(|_| invalid(value)),
        _ => Err(invalid(value)),
    }
}

fn decimal_places(value: &Value) -> Result<u32> {
    let places = integer(value)?;
    u32::try_from(places).map_err(|_| invalid(value))
}

fn fixed_point(value: &Value) -> Result<(i64, u32)> {
    match value {
        Value::String(s) => to_fixed_point(s),
        Value::Number(n) => to_fixed_point(&n.to_string()),
        _ => Err(invalid(value)),
    }
}
