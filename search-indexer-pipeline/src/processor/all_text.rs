//! Post-processing of the all-text aggregates of one entity.

use search_indexer_shared::{FieldType, IndexValue, ALL_TEXT_FIELD};

use super::builder::EntityIndexBuilder;

/// Cross-merge the plain all-text aggregate with the localized ones.
///
/// `localized_names` are the aggregate names written while collecting, in
/// the order they were first written; `all_text` itself is skipped. The
/// plain value is captured before merging. Then, for each localized name,
/// its current value is appended to the plain aggregate and the captured
/// plain value is appended to it. Afterwards the plain aggregate holds the
/// text of every localization and each localized aggregate also holds the
/// text that was not localized.
pub fn merge_localized_all_text(
    builder: &mut EntityIndexBuilder<'_>,
    all_text: &str,
    localized_names: &[String],
) {
    let plain = builder.get(FieldType::Text, all_text).cloned();

    for name in localized_names.iter().filter(|name| name.as_str() != all_text) {
        if let Some(localized) = builder.get(FieldType::Text, name).cloned() {
            builder.set(FieldType::Text, all_text, localized);
        }
        if let Some(plain) = &plain {
            builder.set(FieldType::Text, name, plain.clone());
        }
    }
}

/// Deduplicate the words of every text field whose name starts with `all_text`.
///
/// Lists are flattened first; the first occurrence of a word wins.
pub fn squash_all_text_fields(builder: &mut EntityIndexBuilder<'_>) {
    for name in builder.names(FieldType::Text) {
        if !name.starts_with(ALL_TEXT_FIELD) {
            continue;
        }
        let Some(value) = builder.remove(FieldType::Text, &name) else {
            continue;
        };

        let squashed = squash_words(&value.joined_text());
        if !squashed.is_empty() {
            builder.replace(FieldType::Text, &name, IndexValue::text(squashed));
        }
    }
}

pub(crate) fn squash_words(text: &str) -> String {
    let mut words: Vec<&str> = Vec::new();
    for word in text.split_whitespace() {
        if !words.contains(&word) {
            words.push(word);
        }
    }
    words.join(" ")
}
