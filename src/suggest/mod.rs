//! Context-aware suggestions for partially typed query filters
//!
//! The engine walks the parse tree from the root along the focused path and
//! decides what the cursor is editing:
//!
//! - a key of a find-query object: field paths from the schema
//! - a key of an operator object (`{$gt: ...}`): query operators
//! - a value: enumerated values and type placeholders from the schema
//!
//! Every result carries the node it applies to, so the caller can hand it to
//! [`crate::replace::replace`] to rewrite the text.
//!
//! # Example
//!
//! ```
//! use mongo_autocomplete::schema::infer_schema;
//! use mongo_autocomplete::suggest::complete;
//! use mongodb::bson::doc;
//!
//! let schema = infer_schema(&[doc! { "age": 30 }]);
//! let text = "{age: {$g";
//! let suggestions = complete(text, text.len(), Some(&schema));
//! let texts: Vec<&str> = suggestions.items.iter().map(|s| s.text.as_str()).collect();
//! assert_eq!(texts, vec!["$gt", "$gte"]);
//! ```

mod candidates;
mod context;


use std::fmt;

use serde::Serialize;

use crate::config::SuggestionConfig;
use crate::parser::{ParseNode, parse};
use crate::replace::{Replacement, replace};
use crate::schema::Schema;

/// What a suggestion completes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SuggestionKind {
    /// Field path replacing the key being typed
    Field,
    /// Query operator replacing the key being typed
    Operator,
    /// Value or type placeholder
    Value,
    /// Field or operator inserted as a new property after the last one
    NewProperty,
}

impl fmt::Display for SuggestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SuggestionKind::Field => "field",
            SuggestionKind::Operator => "operator",
            SuggestionKind::Value => "value",
            SuggestionKind::NewProperty => "new property",
        };
        f.write_str(name)
    }
}

/// A single completion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub text: String,
    pub kind: SuggestionKind,
}

impl Suggestion {
    pub fn new(text: impl Into<String>, kind: SuggestionKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }
}

/// Suggestions plus the parse node they apply to
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Suggestions {
    pub items: Vec<Suggestion>,
    /// Node the suggestions replace or insert into; `None` when empty
    pub context: Option<ParseNode>,
}

impl Suggestions {
    pub(crate) fn of(texts: Vec<String>, kind: SuggestionKind, context: &ParseNode) -> Self {
        if texts.is_empty() {
            return Self::default();
        }
        Self {
            items: texts.into_iter().map(|t| Suggestion::new(t, kind)).collect(),
            context: Some(context.clone()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Apply the suggestion at `index` to `text`
    ///
    /// # Returns
    /// * `Option<Replacement>` - The rewritten text and cursor, `None` when
    ///   `index` is out of range
    pub fn apply(&self, text: &str, index: usize) -> Option<Replacement> {
        let item = self.items.get(index)?;
        let context = self.context.as_ref()?;
        Some(replace(text, &item.text, item.kind, context))
    }
}

/// Suggestion engine bound to one schema
pub struct SuggestionEngine<'a> {
    schema: &'a Schema,
    config: SuggestionConfig,
}

impl<'a> SuggestionEngine<'a> {
    pub fn new(schema: &'a Schema, config: SuggestionConfig) -> Self {
        Self { schema, config }
    }

    /// Suggestions for the cursor position recorded in `tree`
    ///
    /// The root must be an object; anything else yields no suggestions.
    pub fn suggest(&self, tree: &ParseNode) -> Suggestions {
        if tree.as_object().is_none() {
            return Suggestions::default();
        }
        self.find_context(tree, "")
    }
}

/// Suggestions for a parsed query with the default configuration
///
/// Returns nothing while no schema is available.
pub fn get_suggestions(tree: &ParseNode, schema: Option<&Schema>) -> Suggestions {
    get_suggestions_with(tree, schema, &SuggestionConfig::default())
}

/// Suggestions for a parsed query with an explicit configuration
pub fn get_suggestions_with(
    tree: &ParseNode,
    schema: Option<&Schema>,
    config: &SuggestionConfig,
) -> Suggestions {
    match schema {
        Some(schema) => SuggestionEngine::new(schema, config.clone()).suggest(tree),
        None => Suggestions::default(),
    }
}

/// Parse `text` and suggest completions at `cursor`
pub fn complete(text: &str, cursor: usize, schema: Option<&Schema>) -> Suggestions {
    get_suggestions(&parse(text, Some(cursor)), schema)
}
