use search_indexer_shared::IndexContext;

/// Lets listeners enrich the context of one website's indexing run.
#[derive(Debug, Clone)]
pub struct CollectContextEvent {
    context: IndexContext,
}

impl CollectContextEvent {
    pub fn new(context: IndexContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &IndexContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut IndexContext {
        &mut self.context
    }

    pub fn into_context(self) -> IndexContext {
        self.context
    }
}
