//! Field values.
//!
//! Collectors emit [`RawValue`]s; the aggregator stores [`IndexValue`]s.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single indexable value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Integer(i64),
    Decimal(f64),
    Text(String),
}

impl Scalar {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_empty_text(&self) -> bool {
        matches!(self, Self::Text(text) if text.is_empty())
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{}", value),
            Self::Decimal(value) => write!(f, "{}", value),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Decimal(value)
    }
}

/// A stored field value: one scalar or an ordered list of unique scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexValue {
    Single(Scalar),
    Multiple(Vec<Scalar>),
}

impl IndexValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Single(Scalar::Text(value.into()))
    }

    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Scalar>,
    {
        Self::Multiple(values.into_iter().map(Into::into).collect())
    }

    /// Empty text and empty lists are never stored.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(scalar) => scalar.is_empty_text(),
            Self::Multiple(values) => values.is_empty(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Single(scalar) => scalar.as_text(),
            Self::Multiple(_) => None,
        }
    }

    pub fn into_scalars(self) -> Vec<Scalar> {
        match self {
            Self::Single(scalar) => vec![scalar],
            Self::Multiple(values) => values,
        }
    }

    /// Apply `f` to every scalar, keeping the shape.
    pub fn map_scalars(self, mut f: impl FnMut(Scalar) -> Scalar) -> Self {
        match self {
            Self::Single(scalar) => Self::Single(f(scalar)),
            Self::Multiple(values) => Self::Multiple(values.into_iter().map(f).collect()),
        }
    }

    /// Space-separated text of all scalars.
    pub fn joined_text(&self) -> String {
        match self {
            Self::Single(scalar) => scalar.to_string(),
            Self::Multiple(values) => values
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

macro_rules! impl_from_scalar_source {
    ($($source:ty),*) => {
        $(
            impl From<$source> for IndexValue {
                fn from(value: $source) -> Self {
                    Self::Single(value.into())
                }
            }

            impl From<$source> for RawValue {
                fn from(value: $source) -> Self {
                    Self::Value(value.into())
                }
            }
        )*
    };
}

impl_from_scalar_source!(&str, String, i64, f64, Scalar);

/// A value whose field name (and all-text target) contains placeholders.
///
/// `placeholders` maps a token such as `LOCALIZATION_ID` to the literal
/// that replaces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceholderValue {
    pub value: IndexValue,
    pub placeholders: BTreeMap<String, String>,
}

impl PlaceholderValue {
    pub fn new(value: impl Into<IndexValue>) -> Self {
        Self {
            value: value.into(),
            placeholders: BTreeMap::new(),
        }
    }

    pub fn with_placeholder(mut self, token: impl Into<String>, value: impl ToString) -> Self {
        self.placeholders.insert(token.into(), value.to_string());
        self
    }
}

/// A value as emitted by a field collector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    #[default]
    Null,
    Placeholder(PlaceholderValue),
    Value(IndexValue),
}

impl From<IndexValue> for RawValue {
    fn from(value: IndexValue) -> Self {
        Self::Value(value)
    }
}

impl From<PlaceholderValue> for RawValue {
    fn from(value: PlaceholderValue) -> Self {
        Self::Placeholder(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_value_from_json() {
        let null: RawValue = serde_json::from_str("null").unwrap();
        assert_eq!(null, RawValue::Null);

        let text: RawValue = serde_json::from_str(r#""Red Shirt""#).unwrap();
        assert_eq!(text, RawValue::Value(IndexValue::text("Red Shirt")));

        let list: RawValue = serde_json::from_str("[1, 2]").unwrap();
        assert_eq!(list, RawValue::Value(IndexValue::list([1_i64, 2])));

        let placeholder: RawValue = serde_json::from_str(
            r#"{ "value": "Rot", "placeholders": { "LOCALIZATION_ID": "2" } }"#,
        )
        .unwrap();
        assert_eq!(
            placeholder,
            RawValue::Placeholder(
                PlaceholderValue::new("Rot").with_placeholder("LOCALIZATION_ID", 2)
            )
        );
    }

    #[test]
    fn test_index_value_emptiness() {
        assert!(IndexValue::text("").is_empty());
        assert!(IndexValue::Multiple(vec![]).is_empty());
        assert!(!IndexValue::from(0_i64).is_empty());
        assert!(!IndexValue::list([""]).is_empty());
    }

    #[test]
    fn test_joined_text() {
        let value = IndexValue::Multiple(vec![
            Scalar::from("red"),
            Scalar::from(42_i64),
            Scalar::from(1.5),
        ]);
        assert_eq!(value.joined_text(), "red 42 1.5");
    }
}
