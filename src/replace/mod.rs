//! Splice an accepted suggestion back into the query text
//!
//! Keys are replaced token for token, new properties are appended after the
//! last one, and values replace the trimmed text of the value node. Type
//! placeholders such as `(objectId)` expand to a literal template with the
//! cursor placed inside it.

use tracing::error;

use crate::parser::{KeyNode, NodeKind, ParseNode};
use crate::suggest::SuggestionKind;

/// Cursor marker inside templates
const CURSOR_MARK: char = '|';

/// Rewritten text and the new cursor offset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub text: String,
    pub cursor: usize,
}

/// Literal template for a type placeholder; `|` marks the cursor
pub fn template(placeholder: &str) -> Option<&'static str> {
    let template = match placeholder {
        "(double)" => "",
        "(string)" => "'|'",
        "(object)" => "{|}",
        "(array)" => "[|]",
        "(binData)" => "BinData(0, '|')",
        "(objectId)" => "ObjectId('|')",
        "(bool)" => "true",
        "(date)" => "ISODate('|')",
        "(null)" => "null",
        "(regex)" => "/|/",
        "(timestamp)" => "Timestamp({t: |, i: 0})",
        "(long)" => "Long('|')",
        "(minKey)" => "MinKey()",
        "(maxKey)" => "MaxKey()",
        _ => return None,
    };
    Some(template)
}

/// Apply `suggestion` of `kind` to `original`
///
/// # Arguments
/// * `original` - The full query text the tree was parsed from
/// * `suggestion` - Suggestion text
/// * `kind` - What the suggestion completes
/// * `context` - Node the suggestion applies to
pub fn replace(
    original: &str,
    suggestion: &str,
    kind: SuggestionKind,
    context: &ParseNode,
) -> Replacement {
    match (&context.kind, kind) {
        (NodeKind::Key(key), SuggestionKind::Field | SuggestionKind::Operator | SuggestionKind::NewProperty) => {
            replace_key(original, suggestion, key)
        }
        (NodeKind::Object(_), SuggestionKind::Field | SuggestionKind::Operator | SuggestionKind::NewProperty) => {
            insert_property(original, suggestion, context)
        }
        _ => replace_value(original, suggestion, context),
    }
}

/// Whether `name` can be written as an unquoted key
fn is_bare_key(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// First quote character used in `text`, `'` when there is none
fn preferred_quote(text: &str) -> char {
    text.chars()
        .find(|c| matches!(c, '\'' | '"'))
        .unwrap_or('\'')
}

fn key_token(name: &str, quote: Option<char>, original: &str) -> String {
    let quote = match quote {
        Some(q) => q,
        None if is_bare_key(name) => return name.to_string(),
        None => preferred_quote(original),
    };
    let mut token = String::with_capacity(name.len() + 2);
    token.push(quote);
    for ch in name.chars() {
        if ch == '\\' || ch == quote {
            token.push('\\');
        }
        token.push(ch);
    }
    token.push(quote);
    token
}

fn replace_key(original: &str, name: &str, key: &KeyNode) -> Replacement {
    let token = key_token(name, key.quote, original);
    let start = key.token.start.min(original.len());
    let end = key.token.end.clamp(start, original.len());

    let mut text = String::with_capacity(original.len() + token.len() + 2);
    text.push_str(&original[..start]);
    text.push_str(&token);
    let cursor = text.len();
    let mut rest = &original[end..];
    if !key.has_colon {
        text.push_str(": ");
        rest = rest.trim_start_matches([' ', '\t']);
    }
    text.push_str(rest);
    Replacement { text, cursor }
}

fn insert_property(original: &str, name: &str, node: &ParseNode) -> Replacement {
    let Some(object) = node.as_object() else {
        return replace_value(original, name, node);
    };
    let body_start = object.body.start.min(original.len());
    let body_end = object.body.end.clamp(body_start, original.len());
    let content = original[body_start..body_end].trim_end();
    let mut at = body_start + content.len();

    let separator = match content.trim_start() {
        "" => "",
        c if c.ends_with(',') => {
            if original[at..body_end].starts_with(' ') {
                at += 1;
                ""
            } else {
                " "
            }
        }
        _ => ", ",
    };
    let inserted = format!("{separator}{}: ", key_token(name, None, original));

    let mut text = String::with_capacity(original.len() + inserted.len());
    text.push_str(&original[..at]);
    text.push_str(&inserted);
    let cursor = text.len();
    text.push_str(&original[at..]);
    Replacement { text, cursor }
}

/// Expand a placeholder, returning the text and the cursor offset within it
fn expand(suggestion: &str) -> (String, usize) {
    let is_placeholder = suggestion.starts_with('(') && suggestion.ends_with(')');
    let literal = if is_placeholder {
        match template(suggestion) {
            Some(template) => template,
            None => {
                debug_assert!(false, "unknown placeholder {suggestion}");
                error!("Unknown placeholder {}, inserting it verbatim", suggestion);
                return (suggestion.to_string(), suggestion.len());
            }
        }
    } else {
        return (suggestion.to_string(), suggestion.len());
    };

    match literal.find(CURSOR_MARK) {
        Some(offset) => (literal.replacen(CURSOR_MARK, "", 1), offset),
        None => (literal.to_string(), literal.len()),
    }
}

fn replace_value(original: &str, suggestion: &str, node: &ParseNode) -> Replacement {
    let lead = node.raw.len() - node.raw.trim_start().len();
    let core = node.raw.trim().len();
    let from = (node.start + lead).min(original.len());
    let to = (from + core).min(original.len());

    let (inserted, offset) = expand(suggestion);
    let mut text = String::with_capacity(original.len() + inserted.len());
    text.push_str(&original[..from]);
    text.push_str(&inserted);
    text.push_str(&original[to..]);
    Replacement {
        text,
        cursor: from + offset,
    }
}
