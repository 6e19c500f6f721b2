//! Execution of REPL commands against the schema store

use tracing::{debug, info};

use super::command::{HELP, ReplCommand};
use super::shared_state::SharedState;
use crate::config::SuggestionConfig;
use crate::error::{Result, SamplingError};
use crate::parser::parse;
use crate::ranking::FuzzyMatcher;
use crate::schema::{CacheKey, CacheLookup, SchemaStore};
use crate::suggest::get_suggestions_with;

/// Interactive session: the current selection plus everything needed to
/// answer commands about it
#[derive(Clone)]
pub struct ReplSession {
    state: SharedState,
    store: SchemaStore,
    matcher: FuzzyMatcher,
    suggestions: SuggestionConfig,
}

impl ReplSession {
    /// Create a new session
    ///
    /// # Arguments
    /// * `state` - Shared prompt state
    /// * `store` - Schema cache backed by the connection's data source
    /// * `matcher` - Fuzzy matcher used by `collections <query>`
    /// * `suggestions` - Suggestion limits
    pub fn new(
        state: SharedState,
        store: SchemaStore,
        matcher: FuzzyMatcher,
        suggestions: SuggestionConfig,
    ) -> Self {
        Self {
            state,
            store,
            matcher,
            suggestions,
        }
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub fn store(&self) -> &SchemaStore {
        &self.store
    }

    pub fn suggestion_config(&self) -> &SuggestionConfig {
        &self.suggestions
    }

    fn selected(&self) -> Result<CacheKey> {
        self.state
            .cache_key()
            .ok_or_else(|| SamplingError::NoCollection.into())
    }

    /// Execute a command and return the text to print
    ///
    /// `Exit` is handled by the caller and yields an empty string here.
    pub async fn execute(&self, command: ReplCommand) -> Result<String> {
        debug!("Executing {:?}", command);
        match command {
            ReplCommand::Use(collection) => Ok(self.use_collection(collection)),
            ReplCommand::Collections(query) => self.collections(query.as_deref()).await,
            ReplCommand::Schema => self.schema().await,
            ReplCommand::Refresh => self.refresh().await,
            ReplCommand::Help => Ok(HELP.to_string()),
            ReplCommand::Exit => Ok(String::new()),
            ReplCommand::Query(text) => self.query(&text),
        }
    }

    /// Select a collection and start sampling it in the background
    fn use_collection(&self, collection: String) -> String {
        self.state.set_collection(Some(collection));
        match self.state.cache_key() {
            Some(key) => {
                self.store.schema_for(&key);
                info!("Switched to {}", key.namespace);
                format!("switched to collection {}", key.namespace)
            }
            None => String::new(),
        }
    }

    async fn collections(&self, query: Option<&str>) -> Result<String> {
        let database = self.state.get_database();
        let names = self
            .store
            .sampler()
            .source()
            .collection_names(&database)
            .await?;
        let formatter = self.state.formatter();

        match query {
            Some(query) => formatter.format_matches(&self.matcher.search(&names, query)),
            None if names.is_empty() => Ok(format!("(no collections in {database})")),
            None => Ok(names.join("\n")),
        }
    }

    /// Show the cached schema, sampling first when there is no fresh one
    async fn schema(&self) -> Result<String> {
        let key = self.selected()?;
        let schema = match self.store.status(&key) {
            CacheLookup::Fresh(schema) => schema,
            _ => self.store.refresh(&key).await?,
        };
        self.state.formatter().format_schema(&schema)
    }

    async fn refresh(&self) -> Result<String> {
        let key = self.selected()?;
        let schema = self.store.refresh(&key).await?;
        Ok(format!(
            "sampled {} documents from {}, {} fields",
            schema.sampled,
            key.namespace,
            schema.paths().len()
        ))
    }

    /// Suggestions at the end of `text`
    fn query(&self, text: &str) -> Result<String> {
        let key = self.selected()?;
        let Some(schema) = self.store.schema_for(&key) else {
            return Ok(format!(
                "schema for {} is loading, try again in a moment",
                key.namespace
            ));
        };

        let tree = parse(text, Some(text.len()));
        let suggestions = get_suggestions_with(&tree, Some(&schema), &self.suggestions);
        self.state.formatter().format_suggestions(&suggestions)
    }
}
