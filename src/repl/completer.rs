//! Completer for reedline backed by the suggestion engine
//!
//! Each Tab press parses the line, asks the engine for suggestions against
//! the cached schema of the selected collection and turns every
//! [`Replacement`] into the smallest span edit reedline can apply.

use reedline::{Completer, Span, Suggestion};

use super::command::ReplCommand;
use super::session::ReplSession;
use crate::parser::parse;
use crate::replace::Replacement;
use crate::suggest::get_suggestions_with;

/// Query filter completer for reedline
pub struct QueryCompleter {
    session: ReplSession,
}

impl QueryCompleter {
    pub fn new(session: ReplSession) -> Self {
        Self { session }
    }
}

/// Express a rewritten line as a single span edit of `line`
///
/// The span covers what differs between the two texts; the common prefix
/// stops at the new cursor and the common suffix never reaches before it, so
/// after reedline inserts the value its cursor lands on or after
/// `replacement.cursor`.
pub fn edit_span(line: &str, replacement: &Replacement) -> (Span, String) {
    let new_text = replacement.text.as_str();
    let cursor = replacement.cursor.min(new_text.len());

    let prefix = line
        .char_indices()
        .zip(new_text.chars())
        .take_while(|((_, a), b)| a == b)
        .last()
        .map_or(0, |((i, a), _)| i + a.len_utf8())
        .min(cursor);

    let max_suffix = (new_text.len() - cursor).min(line.len() - prefix);
    let suffix = line
        .chars()
        .rev()
        .zip(new_text.chars().rev())
        .take_while(|(a, b)| a == b)
        .scan(0, |total, (a, _)| {
            *total += a.len_utf8();
            Some(*total)
        })
        .take_while(|total| *total <= max_suffix)
        .last()
        .unwrap_or(0);

    let span = Span::new(prefix, line.len() - suffix);
    (span, new_text[prefix..new_text.len() - suffix].to_string())
}

impl Completer for QueryCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        if ReplCommand::is_command(line) || !line.is_char_boundary(pos.min(line.len())) {
            return Vec::new();
        }
        let Some(key) = self.session.state().cache_key() else {
            return Vec::new();
        };
        let Some(schema) = self.session.store().schema_for(&key) else {
            return Vec::new();
        };

        let tree = parse(line, Some(pos));
        let suggestions =
            get_suggestions_with(&tree, Some(&schema), self.session.suggestion_config());

        suggestions
            .items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| {
                let replacement = suggestions.apply(line, index)?;
                let (span, value) = edit_span(line, &replacement);
                Some(Suggestion {
                    value,
                    description: Some(item.kind.to_string()),
                    span,
                    append_whitespace: false,
                    ..Suggestion::default()
                })
            })
            .collect()
    }
}
