//! Raw data collected by field collectors for a batch of entities.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::value::RawValue;

/// Identifier of an indexed entity.
pub type EntityId = u64;

/// Raw field values keyed by entity id.
pub type EntitiesData = BTreeMap<EntityId, RawEntityFields>;

/// One emitted value together with its all-text flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFieldEntry {
    #[serde(default)]
    pub value: RawValue,
    #[serde(default)]
    pub all_text: bool,
}

impl RawFieldEntry {
    pub fn new(value: impl Into<RawValue>, all_text: bool) -> Self {
        Self {
            value: value.into(),
            all_text,
        }
    }
}

/// All entries emitted for one field name of one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct RawField {
    pub name: String,
    pub entries: Vec<RawFieldEntry>,
}

/// Fields of one entity in the order collectors first emitted them.
///
/// Order matters: text values of the same target are concatenated in
/// this order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawEntityFields {
    fields: Vec<RawField>,
}

impl RawEntityFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry to `name`, creating the field on first use.
    pub fn push(&mut self, name: &str, entry: RawFieldEntry) {
        match self.fields.iter_mut().find(|field| field.name == name) {
            Some(field) => field.entries.push(entry),
            None => self.fields.push(RawField {
                name: name.to_string(),
                entries: vec![entry],
            }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&RawField> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn remove(&mut self, name: &str) -> Option<RawField> {
        let position = self.fields.iter().position(|field| field.name == name)?;
        Some(self.fields.remove(position))
    }

    pub fn iter(&self) -> impl Iterator<Item = &RawField> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl IntoIterator for RawEntityFields {
    type Item = RawField;
    type IntoIter = std::vec::IntoIter<RawField>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl Serialize for RawEntityFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for field in &self.fields {
            map.serialize_entry(&field.name, &field.entries)?;
        }
        map.end()
    }
}

/// A field is either a list of entries or a single bare entry.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<RawFieldEntry>),
    One(RawFieldEntry),
}

struct RawEntityFieldsVisitor;

impl<'de> Visitor<'de> for RawEntityFieldsVisitor {
    type Value = RawEntityFields;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of field names to raw field entries")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut fields = RawEntityFields::new();
        while let Some((name, entries)) = access.next_entry::<String, OneOrMany>()? {
            let entries = match entries {
                OneOrMany::Many(entries) => entries,
                OneOrMany::One(entry) => vec![entry],
            };
            for entry in entries {
                fields.push(&name, entry);
            }
        }
        Ok(fields)
    }
}

impl<'de> Deserialize<'de> for RawEntityFields {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RawEntityFieldsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{IndexValue, PlaceholderValue};

    #[test]
    fn test_push_groups_entries_by_name() {
        let mut fields = RawEntityFields::new();
        fields.push("name", RawFieldEntry::new("Red", true));
        fields.push("sku", RawFieldEntry::new("RS-1", false));
        fields.push("name", RawFieldEntry::new("Shirt", true));

        assert_eq!(fields.len(), 2);
        assert_eq!(fields.get("name").unwrap().entries.len(), 2);

        let names: Vec<&str> = fields.iter().map(|field| field.name.as_str()).collect();
        assert_eq!(names, vec!["name", "sku"]);
    }

    #[test]
    fn test_deserialize_keeps_document_order() {
        let data: EntitiesData = serde_json::from_str(
            r#"{
                "7": {
                    "sku": { "value": "RS-1", "all_text": true },
                    "name_LOCALIZATION_ID": [
                        {
                            "value": { "value": "Rot", "placeholders": { "LOCALIZATION_ID": "2" } },
                            "all_text": true
                        }
                    ],
                    "brand": [{ "value": null }]
                }
            }"#,
        )
        .unwrap();

        let fields = &data[&7];
        let names: Vec<&str> = fields.iter().map(|field| field.name.as_str()).collect();
        assert_eq!(names, vec!["sku", "name_LOCALIZATION_ID", "brand"]);

        let localized = &fields.get("name_LOCALIZATION_ID").unwrap().entries[0];
        assert_eq!(
            localized.value,
            RawValue::Placeholder(
                PlaceholderValue::new("Rot").with_placeholder("LOCALIZATION_ID", 2)
            )
        );
        assert_eq!(fields.get("brand").unwrap().entries[0].value, RawValue::Null);
        assert!(!fields.get("brand").unwrap().entries[0].all_text);
    }

    #[test]
    fn test_serialize_as_map() {
        let mut fields = RawEntityFields::new();
        fields.push("sku", RawFieldEntry::new(IndexValue::text("RS-1"), false));

        let json = serde_json::to_value(&fields).unwrap();
        assert_eq!(json, serde_json::json!({ "sku": [{ "value": "RS-1", "all_text": false }] }));
    }
}
