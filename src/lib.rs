//! Schema-aware autocomplete for MongoDB query filters
//!
//! This library parses partially typed filter expressions, infers collection
//! schemas from sampled documents and suggests field paths, query operators
//! and values for the position of the cursor.
//!
//! # Modules
//!
//! - `parser`: Tolerant parser for incomplete filter text
//! - `schema`: Schema inference, sampling and the per-collection cache
//! - `ranking`: Trigram TF-IDF search and fuzzy matching
//! - `suggest`: Context-aware suggestion engine
//! - `replace`: Applying an accepted suggestion to the text
//! - `connection`: MongoDB connection management
//! - `config`: Configuration management
//! - `error`: Error types and handling
//! - `formatter`: Output formatting and display
//! - `cli`: Command-line interface and argument parsing
//! - `repl`: Interactive prompt with Tab completion
//!
//! # Example
//!
//! ```
//! use mongo_autocomplete::{complete, infer_schema};
//! use mongodb::bson::doc;
//!
//! let schema = infer_schema(&[doc! { "name": "ann", "age": 30 }]);
//! let text = "{na";
//! let suggestions = complete(text, text.len(), Some(&schema));
//! assert_eq!(suggestions.items[0].text, "name");
//!
//! let accepted = suggestions.apply(text, 0).unwrap();
//! assert_eq!(accepted.text, "{name: ");
//! ```

pub mod cli;
pub mod config;
pub mod connection;
pub mod error;
pub mod formatter;
pub mod parser;
pub mod ranking;
pub mod replace;
pub mod repl;
pub mod schema;
pub mod suggest;

// Re-export commonly used types
pub use config::Config;
pub use connection::ConnectionManager;
pub use error::{AutocompleteError, Result};
pub use formatter::Formatter;
pub use parser::{ParseNode, parse};
pub use ranking::{FuzzyMatcher, NGramIndex};
pub use replace::{Replacement, replace};
pub use schema::{Schema, SchemaSampler, SchemaStore, infer_schema};
pub use suggest::{Suggestion, SuggestionEngine, SuggestionKind, Suggestions, complete, get_suggestions};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
