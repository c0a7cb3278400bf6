//! Catalog items
//!
//! An [`Item`] is immutable once fetched. Identity is the `id` field; two
//! items with the same id are the same item as far as selection and focus
//! tracking are concerned.

use serde::{Deserialize, Serialize};

/// Stable identity of a catalog item
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A single catalog entry
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub origin: String,
    pub roast: String,
    /// Non-negative; checked by the repository client
    pub price: f64,
    /// Free text, may contain right-to-left script
    pub description: String,
}

impl Item {
    /// Price formatted for display, e.g. `$18.50`
    pub fn price_label(&self) -> String {
        format!("${:.2}", self.price)
    }

    /// Secondary list line, e.g. `$18.50 | Colombia & Ethiopia`
    pub fn summary(&self) -> String {
        format!("{} | {}", self.price_label(), self.origin)
    }

    /// Case-insensitive substring match on the name
    pub fn matches(&self, filter: &str) -> bool {
        filter.is_empty() || self.name.to_lowercase().contains(&filter.to_lowercase())
    }
}
