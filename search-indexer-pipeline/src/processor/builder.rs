//! Accumulation of field values for one entity.

use search_indexer_shared::{EntityIndexData, FieldType, IndexValue, Scalar, ALL_TEXT_FIELD};

use crate::html::HtmlTagHelper;

/// Collects the typed field values of one entity.
///
/// Values written to the same field are merged: two text scalars of a text
/// field are joined with a space, anything else becomes a list of unique
/// scalars in first-seen order.
#[derive(Debug)]
pub struct EntityIndexBuilder<'a> {
    data: EntityIndexData,
    html: &'a HtmlTagHelper,
}

impl<'a> EntityIndexBuilder<'a> {
    pub fn new(html: &'a HtmlTagHelper) -> Self {
        Self {
            data: EntityIndexData::new(),
            html,
        }
    }

    pub fn get(&self, field_type: FieldType, name: &str) -> Option<&IndexValue> {
        self.data.get(&field_type)?.get(name)
    }

    /// Store `value` under `name`, merging with what is already there.
    /// Empty values are ignored.
    pub fn set(&mut self, field_type: FieldType, name: &str, value: IndexValue) {
        let value = self.clear_value(field_type, name, value);
        if value.is_empty() {
            return;
        }

        let fields = self.data.entry(field_type).or_default();
        let value = match fields.remove(name) {
            Some(existing) => merge_values(existing, value, field_type),
            None => value,
        };
        fields.insert(name.to_string(), value);
    }

    /// Replace a value without merging.
    pub(crate) fn replace(&mut self, field_type: FieldType, name: &str, value: IndexValue) {
        self.data.entry(field_type).or_default().insert(name.to_string(), value);
    }

    pub(crate) fn remove(&mut self, field_type: FieldType, name: &str) -> Option<IndexValue> {
        let fields = self.data.get_mut(&field_type)?;
        let value = fields.remove(name);
        if fields.is_empty() {
            self.data.remove(&field_type);
        }
        value
    }

    pub(crate) fn names(&self, field_type: FieldType) -> Vec<String> {
        self.data
            .get(&field_type)
            .map(|fields| fields.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.data.values().all(|fields| fields.is_empty())
    }

    pub fn into_data(self) -> EntityIndexData {
        self.data
    }

    /// All-text values lose their markup and overlong words; literal
    /// fields are kept as emitted.
    fn clear_value(&self, field_type: FieldType, name: &str, value: IndexValue) -> IndexValue {
        if field_type != FieldType::Text || !name.starts_with(ALL_TEXT_FIELD) {
            return value;
        }

        value.map_scalars(|scalar| {
            let text = self.html.strip_tags(&scalar.to_string());
            Scalar::Text(self.html.strip_long_words(&text))
        })
    }
}

/// Merge a new value into an existing one.
pub fn merge_values(existing: IndexValue, value: IndexValue, field_type: FieldType) -> IndexValue {
    match (existing, value) {
        (IndexValue::Single(Scalar::Text(existing)), IndexValue::Single(Scalar::Text(value)))
            if field_type == FieldType::Text =>
        {
            IndexValue::Single(Scalar::Text(format!("{} {}", existing, value)))
        }
        (existing, value) => {
            let mut merged: Vec<Scalar> = Vec::new();
            for scalar in existing.into_scalars().into_iter().chain(value.into_scalars()) {
                if !merged.contains(&scalar) {
                    merged.push(scalar);
                }
            }
            IndexValue::Multiple(merged)
        }
    }
}
