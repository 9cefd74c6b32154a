//! Form field value objects

use super::schema::FieldKind;
use serde::{Deserialize, Serialize};

/// Value held by a single field
///
/// Serializes untagged: text as a JSON string, selections as a JSON array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    /// Selected options in the order they were picked, without duplicates
    Multi(Vec<String>),
}

impl FieldValue {
    /// Default value for a field of the given kind
    pub fn default_for(kind: &FieldKind) -> Self {
        if kind.is_multi() {
            FieldValue::Multi(Vec::new())
        } else {
            FieldValue::Text(String::new())
        }
    }

    /// Whether this value has the shape a field kind expects
    pub fn matches_kind(&self, kind: &FieldKind) -> bool {
        matches!(
            (self, kind.is_multi()),
            (FieldValue::Text(_), false) | (FieldValue::Multi(_), true)
        )
    }

    /// Empty string (ignoring whitespace) or empty selection
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::Multi(items) => items.is_empty(),
        }
    }

    /// Get the text value (returns empty string for selections)
    pub fn as_text(&self) -> &str {
        match self {
            FieldValue::Text(s) => s,
            FieldValue::Multi(_) => "",
        }
    }

    /// Get the selected options (returns empty slice for text)
    pub fn as_selection(&self) -> &[String] {
        match self {
            FieldValue::Multi(items) => items,
            FieldValue::Text(_) => &[],
        }
    }

    pub fn contains(&self, option: &str) -> bool {
        self.as_selection().iter().any(|o| o == option)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(value: Vec<&str>) -> Self {
        FieldValue::Multi(value.into_iter().map(str::to_string).collect())
    }
}
