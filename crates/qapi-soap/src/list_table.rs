//! Field-name heuristics for repeated elements.
//!
//! The wire format cannot tell a one-item list from a single nested object,
//! nor an empty list from `null`. A [`ListIdentifierTable`] decides by field
//! name: a field whose name contains one of the configured patterns is a list.

use serde::{Deserialize, Serialize};

/// How a list field is laid out on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListPolicy {
    /// Items are wrapped in one extra singular element
    /// (`<productList><product/>..</productList>`) that is stripped on decode.
    Unwrap,
    /// Items sit directly under the field; nothing is stripped.
    Passthrough,
}

/// One `(pattern, policy)` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListIdentifier {
    pub pattern: String,
    pub policy: ListPolicy,
}

/// Ordered list of field-name patterns; first substring match wins.
///
/// Loaded once and read-only afterwards. Deserializes from a JSON array:
///
/// ```json
/// [{ "pattern": "List", "policy": "unwrap" }, { "pattern": "Ids", "policy": "passthrough" }]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListIdentifierTable {
    entries: Vec<ListIdentifier>,
}

impl ListIdentifierTable {
    /// An empty table: no field is treated as a list.
    pub fn new() -> Self {
        Self::default()
    }

    /// The table for the MplusKASSA QAPI.
    pub fn mplus_default() -> Self {
        use ListPolicy::{Passthrough, Unwrap};

        [
            ("List", Unwrap),
            ("Ids", Passthrough),
            ("branches", Unwrap),
            ("licensedBranches", Unwrap),
            ("workplaces", Unwrap),
            ("Numbers", Passthrough),
            ("subGroups", Passthrough),
            ("serviceIpAddresses", Passthrough),
            ("subTables", Unwrap),
            ("articleBarcodes", Unwrap),
            ("articleStocks", Passthrough),
            ("articleStockHistory", Passthrough),
            ("values", Passthrough),
            ("availableValues", Passthrough),
            ("entries", Passthrough),
        ]
        .into_iter()
        .fold(Self::new(), |table, (pattern, policy)| table.with(pattern, policy))
    }

    /// Append an entry. Entries added later lose ties to earlier ones.
    pub fn with(mut self, pattern: impl Into<String>, policy: ListPolicy) -> Self {
        self.push(pattern, policy);
        self
    }

    /// Append an entry in place.
    pub fn push(&mut self, pattern: impl Into<String>, policy: ListPolicy) {
        self.entries.push(ListIdentifier {
            pattern: pattern.into(),
            policy,
        });
    }

    /// Policy for `field`, or `None` when the field is not a list.
    pub fn lookup(&self, field: &str) -> Option<ListPolicy> {
        self.entries
            .iter()
            .find(|entry| field.contains(entry.pattern.as_str()))
            .map(|entry| entry.policy)
    }

    /// Returns true if `field` matches any entry.
    pub fn is_list(&self, field: &str) -> bool {
        self.lookup(field).is_some()
    }

    /// Get the entries in match order.
    pub fn entries(&self) -> &[ListIdentifier] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<P: Into<String>> FromIterator<(P, ListPolicy)> for ListIdentifierTable {
    fn from_iter<I: IntoIterator<Item = (P, ListPolicy)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |table, (pattern, policy)| table.with(pattern, policy))
    }
}
