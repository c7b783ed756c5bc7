//! Board items as returned by monday.com, and the flat rows built from them

use crate::error::SkipReason;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Key under which the item id is stored in a [`Row`]
pub const ITEM_ID: &str = "item_id";
/// Key under which the item name is stored in a [`Row`]
pub const ITEM_NAME: &str = "item_name";

/// One cell of a board item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnValue {
    pub id: String,
    pub text: Option<String>,
}

/// A board item with its column values in board order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: Option<String>,
    pub name: Option<String>,
    pub column_values: Vec<ColumnValue>,
}

impl Item {
    /// Read an item out of a raw API value
    ///
    /// The API shape is trusted loosely: an absent `column_values` key means
    /// no columns, and column entries that are not objects or have no `id`
    /// are ignored. A `column_values` that is present but not an array,
    /// `null` included, rejects the item.
    pub fn from_value(value: &Value) -> Result<Self, SkipReason> {
        let object = value
            .as_object()
            .ok_or_else(|| SkipReason::NotAMapping(value.to_string()))?;

        let column_values = match object.get("column_values") {
            None => Vec::new(),
            Some(Value::Array(columns)) => columns.iter().filter_map(column_value).collect(),
            Some(other) => return Err(SkipReason::ColumnValuesNotASequence(other.to_string())),
        };

        Ok(Self {
            id: object.get("id").and_then(text),
            name: object.get("name").and_then(text),
            column_values,
        })
    }
}

fn column_value(value: &Value) -> Option<ColumnValue> {
    let column = value.as_object()?;
    Some(ColumnValue {
        id: column.get("id").and_then(text)?,
        text: column.get("text").and_then(text),
    })
}

/// Scalar JSON as text; null and containers have no text
fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Flat view of one item: `item_id`, `item_name`, and one entry per column id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Row(BTreeMap<String, Option<String>>);

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any previous value under the same key
    pub fn insert(&mut self, key: impl Into<String>, value: Option<String>) {
        self.0.insert(key.into(), value);
    }

    /// Text stored under `key`; absent and null both read as `None`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.as_deref())
    }

}

impl From<Item> for Row {
    /// Columns are merged after the id and name, and later columns win over
    /// earlier ones with the same id.
    fn from(item: Item) -> Self {
        let mut row = Row::new();
        row.insert(ITEM_ID, item.id);
        row.insert(ITEM_NAME, item.name);
        for column in item.column_values {
            row.insert(column.id, column.text);
        }
        row
    }
}

impl<K: Into<String>> FromIterator<(K, Option<String>)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, Option<String>)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (key, value) in iter {
            row.insert(key, value);
        }
        row
    }
}
