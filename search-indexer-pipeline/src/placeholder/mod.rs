//! Placeholder tokens in field and index names.
//!
//! A name such as `all_text_LOCALIZATION_ID` is a template: each registered
//! token it contains is replaced by a concrete value at indexing time.

mod matcher;

pub use matcher::{FieldNameMatcher, PlaceholderNameMatcher};

use std::collections::BTreeMap;
use std::sync::Arc;

use search_indexer_shared::{IndexContext, WEBSITE_ID_TOKEN};

pub const LOCALIZATION_ID_TOKEN: &str = "LOCALIZATION_ID";
pub const CURRENCY_TOKEN: &str = "CURRENCY";
pub const UNIT_TOKEN: &str = "UNIT";
pub const CPL_ID_TOKEN: &str = "CPL_ID";

/// A single substitutable token.
pub trait Placeholder: Send + Sync {
    fn token(&self) -> &str;

    /// Value used when the caller supplies none.
    fn default_value(&self, context: &IndexContext) -> Option<String>;

    fn replace(&self, template: &str, value: &str) -> String {
        template.replace(self.token(), value)
    }
}

/// Token whose default value comes from the indexing context.
///
/// `WEBSITE_ID` reads the current website; other tokens read the context
/// value stored under their own name.
#[derive(Debug, Clone)]
pub struct ContextPlaceholder {
    token: String,
}

impl ContextPlaceholder {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

impl Placeholder for ContextPlaceholder {
    fn token(&self) -> &str {
        &self.token
    }

    fn default_value(&self, context: &IndexContext) -> Option<String> {
        if self.token == WEBSITE_ID_TOKEN {
            return context.current_website_id().map(|id| id.to_string());
        }

        match context.get(&self.token)? {
            serde_json::Value::String(value) => Some(value.clone()),
            serde_json::Value::Number(value) => Some(value.to_string()),
            _ => None,
        }
    }
}

/// Turns a name template into a literal name.
pub trait PlaceholderResolver: Send + Sync {
    /// Replace tokens found in `values`; unknown tokens are left as they are.
    fn replace(&self, template: &str, values: &BTreeMap<String, String>) -> String;

    /// Replace every token with its default value for `context`.
    fn replace_default(&self, template: &str, context: &IndexContext) -> String;
}

/// The set of registered placeholders.
#[derive(Clone, Default)]
pub struct PlaceholderRegistry {
    placeholders: Vec<Arc<dyn Placeholder>>,
}

impl PlaceholderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in tokens.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for token in [
            LOCALIZATION_ID_TOKEN,
            WEBSITE_ID_TOKEN,
            CURRENCY_TOKEN,
            UNIT_TOKEN,
            CPL_ID_TOKEN,
        ] {
            registry.register(Arc::new(ContextPlaceholder::new(token)));
        }
        registry
    }

    /// Register a placeholder, replacing one with the same token.
    pub fn register(&mut self, placeholder: Arc<dyn Placeholder>) -> &mut Self {
        self.placeholders.retain(|existing| existing.token() != placeholder.token());
        self.placeholders.push(placeholder);
        self
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.placeholders.iter().map(|placeholder| placeholder.token())
    }
}

impl PlaceholderResolver for PlaceholderRegistry {
    fn replace(&self, template: &str, values: &BTreeMap<String, String>) -> String {
        self.placeholders.iter().fold(template.to_string(), |name, placeholder| {
            match values.get(placeholder.token()) {
                Some(value) => placeholder.replace(&name, value),
                None => name,
            }
        })
    }

    fn replace_default(&self, template: &str, context: &IndexContext) -> String {
        self.placeholders.iter().fold(template.to_string(), |name, placeholder| {
            match placeholder.default_value(context) {
                Some(value) => placeholder.replace(&name, &value),
                None => name,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_replace_registered_tokens() {
        let registry = PlaceholderRegistry::with_defaults();

        assert_eq!(
            registry.replace("all_text_LOCALIZATION_ID", &values(&[("LOCALIZATION_ID", "2")])),
            "all_text_2"
        );
        assert_eq!(
            registry.replace(
                "price_CPL_ID_CURRENCY",
                &values(&[("CPL_ID", "5"), ("CURRENCY", "EUR")])
            ),
            "price_5_EUR"
        );
    }

    #[test]
    fn test_unknown_tokens_are_kept() {
        let registry = PlaceholderRegistry::with_defaults();
        assert_eq!(
            registry.replace("name_CUSTOMER_ID", &values(&[("CUSTOMER_ID", "9")])),
            "name_CUSTOMER_ID"
        );
        assert_eq!(
            registry.replace("name_LOCALIZATION_ID", &BTreeMap::new()),
            "name_LOCALIZATION_ID"
        );
    }

    #[test]
    fn test_replace_default_from_context() {
        let registry = PlaceholderRegistry::with_defaults();
        let mut context = IndexContext::new();
        context.set_current_website(3);
        context.set(CURRENCY_TOKEN, "USD");

        assert_eq!(
            registry.replace_default("product_WEBSITE_ID_CURRENCY", &context),
            "product_3_USD"
        );
        assert_eq!(registry.replace_default("product_UNIT", &context), "product_UNIT");
    }

    #[test]
    fn test_register_replaces_same_token() {
        struct Fixed;
        impl Placeholder for Fixed {
            fn token(&self) -> &str {
                UNIT_TOKEN
            }
            fn default_value(&self, _context: &IndexContext) -> Option<String> {
                Some("item".to_string())
            }
        }

        let mut registry = PlaceholderRegistry::with_defaults();
        registry.register(Arc::new(Fixed));

        assert_eq!(registry.tokens().filter(|token| *token == UNIT_TOKEN).count(), 1);
        assert_eq!(registry.replace_default("qty_UNIT", &IndexContext::new()), "qty_item");
    }
}
