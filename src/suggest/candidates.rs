//! Candidate lists for fields, operators and values

use std::cmp::Ordering;

use tracing::trace;

use super::SuggestionEngine;
use crate::parser::ParseNode;
use crate::ranking::{Candidate, NGramIndex};
use crate::schema::BsonType;

/// Operators offered for every field
pub const BASE_OPERATORS: [&str; 10] = [
    "$eq", "$ne", "$gt", "$gte", "$lt", "$lte", "$in", "$nin", "$not", "$type",
];

/// Logical combinators offered at the top level of a query
pub const COMBINATORS: [&str; 3] = ["$or", "$and", "$nor"];

/// Operators whose operand is compared against the field value
pub const COMPARISON_OPERATORS: [&str; 6] = ["$eq", "$ne", "$gt", "$gte", "$lt", "$lte"];

/// Operators whose operand is an array of field values
pub const ARRAY_OPERATORS: [&str; 3] = ["$in", "$nin", "$all"];

/// Join a dotted path prefix and a name, either of which may be empty
pub(super) fn join_path(prefix: &str, name: &str) -> String {
    match (prefix.is_empty(), name.is_empty()) {
        (true, _) => name.to_string(),
        (_, true) => prefix.to_string(),
        _ => format!("{prefix}.{name}"),
    }
}

/// Escape `value` for use inside `quote`
fn quote_string(value: &str, quote: char) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for ch in value.chars() {
        if ch == '\\' || ch == quote {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push(quote);
    out
}

impl SuggestionEngine<'_> {
    /// Field paths matching `search`, relative to `prefix`
    ///
    /// # Arguments
    /// * `prefix` - Dotted path of the enclosing field, empty at the top level
    /// * `search` - Typed part of the key, possibly dotted
    pub(super) fn field_suggestions(&self, prefix: &str, search: &str) -> Vec<String> {
        let (typed_prefix, field) = match search.rfind('.') {
            Some(i) => (&search[..i], &search[i + 1..]),
            None => ("", search),
        };
        let path_prefix = join_path(prefix, typed_prefix);

        let mut candidates: Vec<Candidate> = self
            .schema
            .paths()
            .into_iter()
            .filter_map(|path| {
                let rest = if path_prefix.is_empty() {
                    path.as_str()
                } else {
                    path.strip_prefix(path_prefix.as_str())?.strip_prefix('.')?
                };
                let terms = rest.to_lowercase().split('.').map(str::to_string).collect();
                let text = if prefix.is_empty() {
                    path.clone()
                } else {
                    path.strip_prefix(prefix)?.strip_prefix('.')?.to_string()
                };
                Some(Candidate::new(text, terms))
            })
            .collect();

        if path_prefix.is_empty() {
            candidates.extend(
                COMBINATORS
                    .iter()
                    .map(|op| Candidate::new(*op, vec![op.to_string()])),
            );
        }

        let needle = field.to_lowercase();
        let mut ranked: Vec<(usize, f64, &str)> = if field.chars().count()
            <= self.config.prefix_match_max_len
        {
            candidates
                .iter()
                .filter(|c| c.terms.iter().any(|t| t.starts_with(&needle)))
                .map(|c| (c.depth(), 0.0, c.text.as_str()))
                .collect()
        } else {
            NGramIndex::build(&candidates)
                .search(&[needle.as_str()], self.config.ngram_cutoff)
                .into_iter()
                .map(|s| (s.candidate.depth(), s.score, s.candidate.text.as_str()))
                .collect()
        };

        ranked.sort_by(|a, b| {
            a.0.cmp(&b.0)
                .then_with(|| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal))
                .then_with(|| a.2.cmp(b.2))
        });
        trace!("Field search {:?} under {:?}: {} matches", field, path_prefix, ranked.len());

        ranked
            .into_iter()
            .take(self.config.limit)
            .map(|(_, _, text)| text.to_string())
            .collect()
    }

    /// Operators applicable to the field at `path`, filtered by `search`
    pub(super) fn operator_suggestions(&self, path: &str, search: &str) -> Vec<String> {
        let mut operators: Vec<&str> = BASE_OPERATORS.to_vec();
        if let Some(node) = self.schema.lookup(path) {
            if node.has(BsonType::Null) {
                operators.push("$exists");
            }
            if node.has(BsonType::Double) || node.has(BsonType::Long) {
                operators.push("$mod");
            }
            if node.has(BsonType::Array) && node.has(BsonType::Object) {
                operators.push("$elemMatch");
            }
            if node.has(BsonType::Array) {
                operators.push("$size");
                operators.push("$all");
            }
        }

        let needle = if search.starts_with('$') {
            search.to_string()
        } else {
            format!("${search}")
        };

        let mut matches: Vec<String> = operators
            .into_iter()
            .filter(|op| op.starts_with(&needle))
            .map(str::to_string)
            .collect();
        matches.sort();
        matches.dedup();
        matches.truncate(self.config.limit);
        matches
    }

    /// Enumerated values and type placeholders for the field at `path`
    ///
    /// `node` is the value being edited; the text before the cursor filters
    /// the enumerated values and decides which quote character strings use.
    pub(super) fn value_suggestions(&self, path: &str, node: &ParseNode) -> Vec<String> {
        let Some(field) = self.schema.lookup(path) else {
            return Vec::new();
        };

        let search = node.text_before_cursor().trim();
        let quote = search
            .chars()
            .next()
            .filter(|c| matches!(c, '\'' | '"'))
            .unwrap_or('\'');

        let mut values: Vec<String> = field
            .numbers
            .values()
            .iter()
            .map(|n| n.to_string())
            .chain(field.strings.values().iter().map(|s| quote_string(s, quote)))
            .filter(|value| value.starts_with(search))
            .collect();
        values.sort();
        values.dedup();
        values.truncate(self.config.limit);

        values.extend(field.placeholders());
        values
    }
}
