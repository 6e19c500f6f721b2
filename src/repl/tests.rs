use std::sync::Arc;

use mongodb::bson::doc;
use reedline::Completer;

use super::*;
use crate::config::{OutputFormat, SuggestionConfig};
use crate::ranking::FuzzyMatcher;
use crate::schema::sampler::tests::MemorySource;
use crate::schema::{Namespace, SchemaSampler, SchemaStore};

fn session_with(source: MemorySource) -> ReplSession {
    let state = SharedState::new("mongodb://localhost", "shop");
    state.set_format(OutputFormat::Plain);
    state.set_color_enabled(false);
    let store = SchemaStore::with_defaults(SchemaSampler::new(Arc::new(source), 100));
    ReplSession::new(
        state,
        store,
        FuzzyMatcher::default(),
        SuggestionConfig::default(),
    )
}

fn session() -> ReplSession {
    let mut source = MemorySource::with(
        Namespace::new("shop", "orders"),
        vec![
            doc! { "status": "open", "total": 10 },
            doc! { "status": "closed", "total": 25 },
        ],
    );
    source
        .collections
        .insert(Namespace::new("shop", "users"), vec![doc! { "name": "ann" }]);
    session_with(source)
}

async fn run(session: &ReplSession, line: &str) -> String {
    let command = ReplCommand::parse(line).unwrap().unwrap();
    session.execute(command).await.unwrap()
}

#[test]
fn test_shared_state_creation() {
    let state = SharedState::new("mongodb://localhost", "test");
    assert_eq!(state.get_database(), "test");
    assert_eq!(state.get_collection(), None);
    assert!(state.cache_key().is_none());
    assert!(!state.is_connected());
}

#[test]
fn test_shared_state_database_change_clears_collection() {
    let state = SharedState::new("mongodb://localhost", "test");
    state.set_collection(Some("users".to_string()));
    assert_eq!(state.namespace(), Some(Namespace::new("test", "users")));

    state.set_database("newdb");
    assert_eq!(state.get_database(), "newdb");
    assert_eq!(state.get_collection(), None);
}

#[tokio::test]
async fn test_commands_require_collection() {
    let session = session();
    let command = ReplCommand::parse("schema").unwrap().unwrap();
    assert!(session.execute(command).await.is_err());
    let command = ReplCommand::parse("{sta").unwrap().unwrap();
    assert!(session.execute(command).await.is_err());
}

#[tokio::test]
async fn test_collections_listing_and_fuzzy_filter() {
    let session = session();
    assert_eq!(run(&session, "collections").await, "orders\nusers");
    assert_eq!(run(&session, "collections users").await, "users");
}

#[tokio::test]
async fn test_use_and_schema() {
    let session = session();
    assert_eq!(run(&session, "use orders").await, "switched to collection shop.orders");
    assert_eq!(run(&session, "schema").await, "status: string\ntotal: double");
}

#[tokio::test]
async fn test_refresh_reports_sample() {
    let session = session();
    run(&session, "use orders").await;
    assert_eq!(
        run(&session, "refresh").await,
        "sampled 2 documents from shop.orders, 2 fields"
    );
}

#[tokio::test]
async fn test_query_lists_suggestions_once_loaded() {
    let session = session();
    session.state().set_collection(Some("orders".to_string()));
    run(&session, "refresh").await;

    assert_eq!(run(&session, "{sta").await, "status");
    assert_eq!(run(&session, "{total: ").await, "10\n25\n(double)");
}

#[tokio::test]
async fn test_query_while_loading() {
    let session = session();
    session.state().set_collection(Some("orders".to_string()));
    let output = run(&session, "{sta").await;
    assert!(output.contains("loading"), "{output}");
}

#[tokio::test]
async fn test_completer_uses_cached_schema() {
    let session = session();
    session.state().set_collection(Some("orders".to_string()));
    let mut completer = QueryCompleter::new(session.clone());
    assert!(completer.complete("{sta", 4).is_empty());

    run(&session, "refresh").await;
    let suggestions = completer.complete("{sta}", 4);
    assert_eq!(suggestions.len(), 1);
    let suggestion = &suggestions[0];
    assert_eq!(suggestion.value, "tus: ");
    assert_eq!((suggestion.span.start, suggestion.span.end), (4, 4));
    assert_eq!(suggestion.description.as_deref(), Some("field"));
}

#[tokio::test]
async fn test_completer_ignores_commands() {
    let session = session();
    session.state().set_collection(Some("orders".to_string()));
    run(&session, "refresh").await;
    let mut completer = QueryCompleter::new(session);
    assert!(completer.complete("use ord", 7).is_empty());
}
