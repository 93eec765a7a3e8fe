//! Canonicalize decoded responses.
//!
//! A response converted straight from XML is ambiguous: empty lists and
//! `null` both arrive as an empty element, one-item lists arrive as a single
//! object, list items arrive wrapped in an extra element, and booleans arrive
//! as text. [`normalize`] resolves all of these, using the
//! [`ListIdentifierTable`] for anything the data alone cannot decide.

use serde_json::{Map, Value};

use crate::list_table::{ListIdentifierTable, ListPolicy};

/// Canonicalize a decoded response value.
///
/// Applied to each field of every mapping, recursively:
///
/// 1. An empty object becomes `[]` if the field is a list, `null` otherwise.
/// 2. A non-empty object under an `Unwrap` field is replaced by the value of
///    its first key (`productList.product` → `productList`). Under any list
///    policy, a result that is not already a list is wrapped into one.
/// 3. Lists are normalized item by item.
/// 4. `"true"` / `"false"` (any case) become `1` / `0`.
/// 5. A scalar under a list field becomes a one-item list (`[]` if empty).
///
/// # Example
///
/// ```rust
/// use mplus_qapi_soap::{normalize, ListIdentifierTable, ListPolicy};
/// use serde_json::json;
///
/// let table = ListIdentifierTable::new().with("List", ListPolicy::Unwrap);
/// let value = json!({"productList": {"product": {"id": "1"}}, "active": "TRUE"});
///
/// assert_eq!(
///     normalize(value, &table),
///     json!({"productList": [{"id": "1"}], "active": 1})
/// );
/// ```
pub fn normalize(value: Value, table: &ListIdentifierTable) -> Value {
    match value {
        Value::Object(map) => Value::Object(normalize_fields(map, table)),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| normalize(item, table))
                .collect(),
        ),
        other => other,
    }
}

fn normalize_fields(map: Map<String, Value>, table: &ListIdentifierTable) -> Map<String, Value> {
    map.into_iter()
        .map(|(key, value)| {
            let policy = table.lookup(&key);
            let value = normalize_field(value, policy, table);
            (key, value)
        })
        .collect()
}

fn normalize_field(value: Value, policy: Option<ListPolicy>, table: &ListIdentifierTable) -> Value {
    match value {
        Value::Object(inner) if inner.is_empty() => match policy {
            Some(_) => Value::Array(Vec::new()),
            None => Value::Null,
        },
        Value::Object(inner) => {
            let value = match policy {
                Some(ListPolicy::Unwrap) => unwrap_single_child(inner),
                _ => Value::Object(inner),
            };
            let value = match policy {
                Some(_) => into_list(value),
                None => value,
            };
            normalize(value, table)
        }
        Value::Array(_) => normalize(value, table),
        Value::String(text) if is_bool_text(&text) => {
            Value::from(u8::from(text.eq_ignore_ascii_case("true")))
        }
        scalar if policy.is_some() => into_list(scalar),
        scalar => scalar,
    }
}

/// The value under the first key of a wrapper object.
fn unwrap_single_child(inner: Map<String, Value>) -> Value {
    inner
        .into_iter()
        .next()
        .map(|(_, child)| child)
        .unwrap_or(Value::Null)
}

fn into_list(value: Value) -> Value {
    match value {
        Value::Array(_) => value,
        Value::Null => Value::Array(Vec::new()),
        Value::String(ref s) if s.is_empty() => Value::Array(Vec::new()),
        other => Value::Array(vec![other]),
    }
}

fn is_bool_text(text: &str) -> bool {
    text.eq_ignore_ascii_case("true") || text.eq_ignore_ascii_case("false")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table() -> ListIdentifierTable {
        ListIdentifierTable::new()
            .with("List", ListPolicy::Unwrap)
            .with("Ids", ListPolicy::Passthrough)
    }

    #[test]
    fn test_empty_object_becomes_empty_list_for_list_fields() {
        let value = json!({"fooList": {}});
        assert_eq!(normalize(value, &table()), json!({"fooList": []}));
    }

    #[test]
    fn test_empty_object_becomes_null_otherwise() {
        let value = json!({"fooList": {}});
        assert_eq!(
            normalize(value, &ListIdentifierTable::new()),
            json!({"fooList": null})
        );
    }

    #[test]
    fn test_unwrap_list() {
        let value = json!({"productList": {"product": [{"id": "1"}, {"id": "2"}]}});
        assert_eq!(
            normalize(value, &table()),
            json!({"productList": [{"id": "1"}, {"id": "2"}]})
        );
    }

    #[test]
    fn test_unwrap_single_item_becomes_list() {
        let value = json!({"productList": {"product": {"id": "1"}}});
        assert_eq!(
            normalize(value, &table()),
            json!({"productList": [{"id": "1"}]})
        );
    }

    #[test]
    fn test_unwrap_scalar_item() {
        let value = json!({"barcodeList": {"barcode": "8712345678906"}});
        assert_eq!(
            normalize(value, &table()),
            json!({"barcodeList": ["8712345678906"]})
        );
    }

    #[test]
    fn test_unwrap_empty_scalar_item() {
        let value = json!({"barcodeList": {"barcode": ""}});
        assert_eq!(normalize(value, &table()), json!({"barcodeList": []}));
    }

    #[test]
    fn test_unwrap_empty_object_item_is_kept() {
        let value = json!({"productList": {"product": {}}});
        assert_eq!(normalize(value, &table()), json!({"productList": [{}]}));
    }

    #[test]
    fn test_passthrough_object_is_wrapped_not_unwrapped() {
        let value = json!({"articleIds": {"id": ["1", "2"]}});
        assert_eq!(
            normalize(value, &table()),
            json!({"articleIds": [{"id": ["1", "2"]}]})
        );
    }

    #[test]
    fn test_bool_text() {
        let value = json!({"a": "true", "b": "FALSE", "c": "True", "d": "yes", "e": "1"});
        assert_eq!(
            normalize(value, &table()),
            json!({"a": 1, "b": 0, "c": 1, "d": "yes", "e": "1"})
        );
    }

    #[test]
    fn test_scalar_in_list_field_becomes_list() {
        let value = json!({"orderIds": "42", "emptyIds": ""});
        assert_eq!(
            normalize(value, &table()),
            json!({"orderIds": ["42"], "emptyIds": []})
        );
    }

    #[test]
    fn test_recurses_into_items() {
        let value = json!({
            "orderList": {
                "order": [
                    {"id": "1", "paid": "true", "lineList": {"line": {"sku": "A"}}},
                    {"id": "2", "paid": "false", "lineList": {}}
                ]
            }
        });
        assert_eq!(
            normalize(value, &table()),
            json!({
                "orderList": [
                    {"id": "1", "paid": 1, "lineList": [{"sku": "A"}]},
                    {"id": "2", "paid": 0, "lineList": []}
                ]
            })
        );
    }

    #[test]
    fn test_nested_non_list_objects() {
        let value = json!({"customer": {"address": {"city": "Utrecht", "extra": {}}}});
        assert_eq!(
            normalize(value, &table()),
            json!({"customer": {"address": {"city": "Utrecht", "extra": null}}})
        );
    }

    #[test]
    fn test_scalars_inside_lists_are_untouched() {
        let value = json!({"tags": ["true", "x"]});
        assert_eq!(normalize(value, &table()), json!({"tags": ["true", "x"]}));
    }

    #[test]
    fn test_preserves_key_order() {
        let value = json!({"z": "1", "a": "2", "m": "3"});
        let keys: Vec<String> = normalize(value, &table())
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_top_level_scalars_pass_through() {
        assert_eq!(normalize(json!("true"), &table()), json!("true"));
        assert_eq!(normalize(Value::Null, &table()), Value::Null);
    }
}
