//! Index data provider implementation.
//!
//! Triggers the indexing events and turns the raw values collected by
//! listeners into typed, placeholder-expanded field maps.

use std::collections::BTreeMap;
use std::sync::Arc;

use search_indexer_shared::{
    EntitiesData, EntityConfig, EntityId, FieldType, IndexContext, IndexedDocument, RawValue,
    ALL_TEXT_FIELD, ALL_TEXT_L10N_FIELD,
};
use tracing::{debug, instrument};

use super::all_text::{merge_localized_all_text, squash_all_text_fields};
use super::builder::EntityIndexBuilder;
use super::field_config::FieldConfigCache;
use crate::alias::EntityAliasResolver;
use crate::errors::PipelineError;
use crate::events::{
    scoped, CollectContextEvent, EventDispatcher, IndexEntityEvent, RestrictIndexEntityEvent,
    SearchEvent, COLLECT_CONTEXT, INDEX_ENTITY, RESTRICT_INDEX_ENTITY,
};
use crate::html::HtmlTagHelper;
use crate::placeholder::{FieldNameMatcher, PlaceholderResolver};

/// Collects and prepares the data of entities to index.
///
/// Holds a memo of field configuration lookups, so preparing data takes
/// `&mut self`; use one provider per indexing worker.
pub struct IndexDataProvider {
    dispatcher: Arc<dyn EventDispatcher>,
    alias_resolver: Arc<dyn EntityAliasResolver>,
    placeholders: Arc<dyn PlaceholderResolver>,
    html: HtmlTagHelper,
    field_configs: FieldConfigCache,
}

impl IndexDataProvider {
    pub fn new(
        dispatcher: Arc<dyn EventDispatcher>,
        alias_resolver: Arc<dyn EntityAliasResolver>,
        placeholders: Arc<dyn PlaceholderResolver>,
        matcher: Arc<dyn FieldNameMatcher>,
    ) -> Self {
        Self {
            dispatcher,
            alias_resolver,
            placeholders,
            html: HtmlTagHelper::default(),
            field_configs: FieldConfigCache::new(matcher),
        }
    }

    pub fn with_html_helper(mut self, html: HtmlTagHelper) -> Self {
        self.html = html;
        self
    }

    pub fn placeholders(&self) -> &Arc<dyn PlaceholderResolver> {
        &self.placeholders
    }

    /// Make `website_id` the current website and let listeners enrich the context.
    #[instrument(skip(self, context))]
    pub fn collect_context_for_website(
        &self,
        website_id: u64,
        mut context: IndexContext,
    ) -> Result<IndexContext, PipelineError> {
        context.set_current_website(website_id);

        let mut event = CollectContextEvent::new(context);
        self.dispatcher
            .dispatch(COLLECT_CONTEXT, &mut SearchEvent::CollectContext(&mut event))?;

        Ok(event.into_context())
    }

    /// Collect field values of `entity_ids` from listeners and prepare them.
    #[instrument(
        skip(self, entity_ids, context, entity_config),
        fields(entity_count = entity_ids.len())
    )]
    pub fn get_entities_data(
        &mut self,
        entity_class: &str,
        entity_ids: &[EntityId],
        context: &IndexContext,
        entity_config: &EntityConfig,
    ) -> Result<IndexedDocument, PipelineError> {
        let alias = self.alias_resolver.get_alias(entity_class)?;

        let mut event = IndexEntityEvent::new(entity_class, entity_ids.to_vec(), context.clone());
        self.dispatcher
            .dispatch(INDEX_ENTITY, &mut SearchEvent::IndexEntity(&mut event))?;
        self.dispatcher
            .dispatch(&scoped(INDEX_ENTITY, &alias), &mut SearchEvent::IndexEntity(&mut event))?;

        self.prepare_index_data(event.entities_data(), entity_config)
    }

    /// Let listeners restrict which of `candidates` may be indexed.
    #[instrument(skip(self, candidates, context), fields(candidate_count = candidates.len()))]
    pub fn get_restricted_entities(
        &self,
        entity_class: &str,
        candidates: &[EntityId],
        context: &IndexContext,
    ) -> Result<Vec<EntityId>, PipelineError> {
        let alias = self.alias_resolver.get_alias(entity_class)?;

        let mut event = RestrictIndexEntityEvent::new(entity_class, context.clone());
        self.dispatcher
            .dispatch(RESTRICT_INDEX_ENTITY, &mut SearchEvent::RestrictIndexEntity(&mut event))?;
        self.dispatcher.dispatch(
            &scoped(RESTRICT_INDEX_ENTITY, &alias),
            &mut SearchEvent::RestrictIndexEntity(&mut event),
        )?;

        let allowed = event.restriction().apply(candidates);
        debug!(allowed = allowed.len(), "Restricted entities");
        Ok(allowed)
    }

    /// Turn raw collected values into typed field maps.
    ///
    /// Field types come from `entity_config`; flagged text values are also
    /// written to an all-text aggregate (the localized one when the value
    /// carries placeholders). Entities without any stored value are left
    /// out of the result.
    #[instrument(skip_all, fields(entity_count = data.len(), alias = %entity_config.alias))]
    pub fn prepare_index_data(
        &mut self,
        data: &EntitiesData,
        entity_config: &EntityConfig,
    ) -> Result<IndexedDocument, PipelineError> {
        let mut lookup = self.field_configs.for_config(entity_config);
        let all_text = lookup.name(ALL_TEXT_FIELD, ALL_TEXT_FIELD);
        let all_text_l10n = lookup.name(ALL_TEXT_L10N_FIELD, ALL_TEXT_L10N_FIELD);

        let mut document = IndexedDocument::new();
        let no_placeholders = BTreeMap::new();

        for (entity_id, fields) in data {
            let mut builder = EntityIndexBuilder::new(&self.html);
            let mut all_text_names: Vec<String> = Vec::new();

            for field in fields.iter() {
                let field_type = lookup.field_type(&field.name)?;
                let collect_all_text =
                    field_type == FieldType::Text && lookup.all_text(&field.name) == Some(true);

                for entry in &field.entries {
                    let (value, placeholders, all_text_target) = match &entry.value {
                        RawValue::Null => (None, &no_placeholders, &all_text),
                        RawValue::Value(value) => (Some(value), &no_placeholders, &all_text),
                        RawValue::Placeholder(placeholder) => {
                            (Some(&placeholder.value), &placeholder.placeholders, &all_text_l10n)
                        }
                    };

                    if field_type == FieldType::Text && (entry.all_text || collect_all_text) {
                        let target = self.placeholders.replace(all_text_target, placeholders);
                        if let Some(value) = value {
                            builder.set(FieldType::Text, &target, value.clone());
                        }
                        if !all_text_names.contains(&target) {
                            all_text_names.push(target);
                        }
                    }

                    if !field.name.starts_with(all_text.as_str()) {
                        if let Some(value) = value {
                            let name = self.placeholders.replace(&field.name, placeholders);
                            builder.set(field_type, &name, value.clone());
                        }
                    }
                }
            }

            merge_localized_all_text(&mut builder, &all_text, &all_text_names);
            squash_all_text_fields(&mut builder);

            if builder.is_empty() {
                debug!(entity_id = %entity_id, "No index data for entity");
                continue;
            }
            document.insert_entity(*entity_id, builder.into_data());
        }

        debug!(prepared = document.len(), "Prepared index data");
        Ok(document)
    }
}
