//! Tolerant parser for partially typed query filters
//!
//! The parser turns the text of a filter (for example `{age: {$gt: 1}, name: 'x'}`)
//! and the position of the editing cursor into a [`ParseNode`] tree. It is a
//! total function: any input, however malformed, produces a tree.
//!
//! Only a restricted literal grammar is recognized:
//!
//! - objects `{ key: value, ... }` with bare or quoted keys
//! - arrays `[ value, ... ]`
//! - anything else is kept as an opaque [`NodeKind::Source`] leaf
//!
//! Every node carries the cursor relocated into its own coordinates, so the
//! suggestion engine can follow the single path from the root to the node
//! being edited.
//!
//! # Example
//!
//! ```
//! use mongo_autocomplete::parser::{parse, NodeKind};
//!
//! let text = "{age: {$g";
//! let tree = parse(text, Some(text.len()));
//! let NodeKind::Object(object) = &tree.kind else { panic!("expected an object") };
//! assert_eq!(object.focus, Some(0));
//! ```

mod scanner;

#[cfg(test)]
mod tests;

use std::ops::Range;

use scanner::{ScanResult, is_opener, is_quote, scan_value};

/// A node of the parse tree
#[derive(Debug, Clone, PartialEq)]
pub struct ParseNode {
    /// Exact text of the node, including surrounding whitespace
    pub raw: String,
    /// Absolute byte offset of `raw` in the parsed text
    pub start: usize,
    /// Cursor offset local to `raw`, `None` when the cursor is elsewhere
    pub cursor: Option<usize>,
    /// Node shape
    pub kind: NodeKind,
}

/// Shape of a parse node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Unrecognized text kept verbatim
    Source,
    /// Object literal
    Object(ObjectNode),
    /// Array literal
    Array(ArrayNode),
    /// Property key
    Key(KeyNode),
}

/// One `key: value` pair of an object
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Key node, always of kind [`NodeKind::Key`]
    pub key: ParseNode,
    /// Value node; an empty source leaf when the key has no `:` yet
    pub value: ParseNode,
}

/// Object literal contents
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectNode {
    /// Properties in text order
    pub properties: Vec<Property>,
    /// Index of the property holding the cursor; `properties.len()` when the
    /// cursor sits in the body after the last property
    pub focus: Option<usize>,
    /// Absolute byte range between the braces
    pub body: Range<usize>,
    /// Whether the closing brace is present
    pub closed: bool,
}

/// Array literal contents
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayNode {
    /// Elements in text order
    pub elements: Vec<ParseNode>,
    /// Index of the element holding the cursor; `elements.len()` when the
    /// cursor sits in the body after the last element
    pub focus: Option<usize>,
    /// Absolute byte range between the brackets
    pub body: Range<usize>,
    /// Whether the closing bracket is present
    pub closed: bool,
}

/// Property key contents
#[derive(Debug, Clone, PartialEq)]
pub struct KeyNode {
    /// Key name with quotes removed and escapes resolved
    pub name: String,
    /// Quote character if the key was quoted
    pub quote: Option<char>,
    /// Absolute byte range of the key token, quotes included
    pub token: Range<usize>,
    /// Absolute byte range of the name characters, quotes excluded
    pub name_span: Range<usize>,
    /// Whether a `:` follows the key
    pub has_colon: bool,
}

/// Relocate a cursor into the window `start..=end`
///
/// Returns the offset relative to `start` when the cursor lies inside the
/// window (both ends inclusive), `None` otherwise. A cursor that is already
/// `None` stays `None`.
pub fn slice_cursor(cursor: Option<usize>, start: usize, end: usize) -> Option<usize> {
    match cursor {
        Some(c) if start <= c && c <= end => Some(c - start),
        _ => None,
    }
}

/// Parse a query filter with the cursor at `cursor`
///
/// A cursor past the end of `text` is treated as absent. Text that does not
/// start with a delimiter is read as the body of an object whose braces were
/// omitted, so `age: {$g` parses like `{age: {$g`.
pub fn parse(text: &str, cursor: Option<usize>) -> ParseNode {
    let cursor = cursor.filter(|c| *c <= text.len());

    let starts_with_delimiter = text.trim_start().chars().next().is_some_and(is_opener);
    if starts_with_delimiter {
        return read_value(text, 0, cursor).0;
    }

    let object = read_object_body(text, 0, 0..text.len(), cursor, false);
    ParseNode {
        raw: text.to_string(),
        start: 0,
        cursor,
        kind: NodeKind::Object(object),
    }
}

/// Read one value from the start of `source`
///
/// The value ends at the first root-level comma or at the end of `source`.
///
/// # Arguments
/// * `source` - Text window starting at the value
/// * `offset` - Absolute offset of `source`
/// * `cursor` - Cursor local to `source`
///
/// # Returns
/// * `(ParseNode, usize)` - The value and the number of bytes it spans
pub fn read_value(source: &str, offset: usize, cursor: Option<usize>) -> (ParseNode, usize) {
    let scan = scan_value(source, cursor);
    let raw = &source[..scan.end];
    let node_cursor = slice_cursor(cursor, 0, scan.end);

    let kind = promote(raw, offset, node_cursor, &scan);
    let node = ParseNode {
        raw: raw.to_string(),
        start: offset,
        cursor: node_cursor,
        kind,
    };
    (node, scan.end)
}

/// Turn a scanned span into an object or array when it is a pure literal
fn promote(raw: &str, offset: usize, cursor: Option<usize>, scan: &ScanResult) -> NodeKind {
    let Some(first) = scan.first.filter(|_| scan.seems_pure) else {
        return NodeKind::Source;
    };

    let body_start = first.open + first.ch.len_utf8();
    let body_end = first.close.unwrap_or(raw.len());
    let closed = first.close.is_some();
    let body_cursor = slice_cursor(cursor, body_start, body_end);
    let body = offset + body_start..offset + body_end;

    match first.ch {
        '{' => NodeKind::Object(read_object_body(
            &raw[body_start..body_end],
            offset + body_start,
            body,
            body_cursor,
            closed,
        )),
        '[' => NodeKind::Array(read_array_body(
            &raw[body_start..body_end],
            offset + body_start,
            body,
            body_cursor,
            closed,
        )),
        _ => NodeKind::Source,
    }
}

fn read_object_body(
    text: &str,
    offset: usize,
    body: Range<usize>,
    cursor: Option<usize>,
    closed: bool,
) -> ObjectNode {
    let mut properties = Vec::new();
    let mut focus = None;
    let mut pos = 0;

    loop {
        let rest = &text[pos..];
        if rest.trim().is_empty() {
            break;
        }

        let Some((key, consumed)) =
            read_key(rest, offset + pos, slice_cursor(cursor, pos, text.len()))
        else {
            break;
        };
        pos += consumed;

        let has_colon = matches!(&key.kind, NodeKind::Key(k) if k.has_colon);
        let value = if has_colon {
            let (value, used) =
                read_value(&text[pos..], offset + pos, slice_cursor(cursor, pos, text.len()));
            pos += used;
            value
        } else {
            empty_leaf(offset + pos)
        };

        if focus.is_none() && (key.cursor.is_some() || value.cursor.is_some()) {
            focus = Some(properties.len());
        }
        properties.push(Property { key, value });

        if text[pos..].starts_with(',') {
            pos += 1;
        } else {
            break;
        }
    }

    if focus.is_none() && cursor.is_some() {
        focus = Some(properties.len());
    }

    ObjectNode {
        properties,
        focus,
        body,
        closed,
    }
}

fn read_array_body(
    text: &str,
    offset: usize,
    body: Range<usize>,
    cursor: Option<usize>,
    closed: bool,
) -> ArrayNode {
    let mut elements = Vec::new();
    let mut focus = None;
    let mut pos = 0;

    loop {
        if text[pos..].trim().is_empty() {
            break;
        }

        let (element, used) =
            read_value(&text[pos..], offset + pos, slice_cursor(cursor, pos, text.len()));
        pos += used;

        if focus.is_none() && element.cursor.is_some() {
            focus = Some(elements.len());
        }
        elements.push(element);

        if text[pos..].starts_with(',') {
            pos += 1;
        } else {
            break;
        }
    }

    if focus.is_none() && cursor.is_some() {
        focus = Some(elements.len());
    }

    ArrayNode {
        elements,
        focus,
        body,
        closed,
    }
}

/// Read a property key from the start of `source`
///
/// Accepts bare keys (ending at `:` or `,`) and quoted keys with `\` escapes.
/// Text between a closing quote and the `:` is skipped.
///
/// # Returns
/// * `Option<(ParseNode, usize)>` - The key node and the number of bytes
///   consumed, including the `:`; `None` when there is no key text at all
pub fn read_key(source: &str, offset: usize, cursor: Option<usize>) -> Option<(ParseNode, usize)> {
    let lead = source.len() - source.trim_start().len();
    let after = &source[lead..];

    let (name, quote, token_len, name_range, terminator) = match after.chars().next() {
        Some(q) if is_quote(q) => {
            let mut name = String::new();
            let mut close = None;
            let mut chars = after.char_indices().skip(1);
            while let Some((i, ch)) = chars.next() {
                if ch == '\\' {
                    if let Some((_, escaped)) = chars.next() {
                        name.push(escaped);
                    }
                } else if ch == q {
                    close = Some(i);
                    break;
                } else {
                    name.push(ch);
                }
            }

            let name_end = close.unwrap_or(after.len());
            let token_len = close.map_or(after.len(), |i| i + q.len_utf8());
            let terminator = after[token_len..]
                .find([':', ','])
                .map(|i| token_len + i);
            (name, Some(q), token_len, q.len_utf8()..name_end, terminator)
        }
        _ => {
            let terminator = after.find([':', ',']);
            let region = &after[..terminator.unwrap_or(after.len())];
            let name = region.trim_end();
            if name.is_empty() {
                return None;
            }
            (name.to_string(), None, name.len(), 0..name.len(), terminator)
        }
    };

    let has_colon = terminator.is_some_and(|i| after[i..].starts_with(':'));
    let key_end = lead + terminator.unwrap_or(after.len());
    let consumed = if has_colon { key_end + 1 } else { key_end };

    let token_start = offset + lead;
    let node = ParseNode {
        raw: source[..key_end].to_string(),
        start: offset,
        cursor: slice_cursor(cursor, 0, key_end),
        kind: NodeKind::Key(KeyNode {
            name,
            quote,
            token: token_start..token_start + token_len,
            name_span: token_start + name_range.start..token_start + name_range.end,
            has_colon,
        }),
    };
    Some((node, consumed))
}

fn empty_leaf(start: usize) -> ParseNode {
    ParseNode {
        raw: String::new(),
        start,
        cursor: None,
        kind: NodeKind::Source,
    }
}

impl ParseNode {
    /// Create an empty source leaf at `start` holding the cursor
    ///
    /// Used to stand for the slot after the last element of a container.
    pub fn placeholder(start: usize) -> Self {
        Self {
            raw: String::new(),
            start,
            cursor: Some(0),
            kind: NodeKind::Source,
        }
    }

    /// Absolute end offset of the node
    pub fn end(&self) -> usize {
        self.start + self.raw.len()
    }

    /// Whether the cursor is inside this node
    pub fn is_focused(&self) -> bool {
        self.cursor.is_some()
    }

    /// Absolute cursor offset, if the cursor is inside this node
    pub fn absolute_cursor(&self) -> Option<usize> {
        self.cursor.map(|c| self.start + c)
    }

    /// Raw text from the start of the node up to the cursor
    pub fn text_before_cursor(&self) -> &str {
        match self.cursor {
            Some(c) => &self.raw[..floor_char_boundary(&self.raw, c)],
            None => "",
        }
    }

    /// Object contents, if this is an object
    pub fn as_object(&self) -> Option<&ObjectNode> {
        match &self.kind {
            NodeKind::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Array contents, if this is an array
    pub fn as_array(&self) -> Option<&ArrayNode> {
        match &self.kind {
            NodeKind::Array(array) => Some(array),
            _ => None,
        }
    }

    /// Key contents, if this is a key
    pub fn as_key(&self) -> Option<&KeyNode> {
        match &self.kind {
            NodeKind::Key(key) => Some(key),
            _ => None,
        }
    }

    /// Typed portion of a key name: the name characters before the cursor
    ///
    /// Returns an empty string for non-key nodes or when the cursor precedes
    /// the name.
    pub fn key_search_text(&self) -> &str {
        let (Some(key), Some(cursor)) = (self.as_key(), self.absolute_cursor()) else {
            return "";
        };
        let from = key.name_span.start;
        let to = cursor.min(key.name_span.end);
        if to <= from {
            return "";
        }
        let local_from = from - self.start;
        let local_to = floor_char_boundary(&self.raw, to - self.start);
        self.raw.get(local_from..local_to).unwrap_or("")
    }
}

impl ObjectNode {
    /// The focused property, if the cursor is on one
    pub fn focused_property(&self) -> Option<&Property> {
        self.focus.and_then(|i| self.properties.get(i))
    }

    /// Whether the cursor sits after the last property
    pub fn is_after_last(&self) -> bool {
        self.focus == Some(self.properties.len())
    }
}

impl ArrayNode {
    /// The focused element; a placeholder at `cursor` when the cursor sits
    /// after the last element
    pub fn focused_element(&self, absolute_cursor: usize) -> Option<std::borrow::Cow<'_, ParseNode>> {
        use std::borrow::Cow;

        let focus = self.focus?;
        match self.elements.get(focus) {
            Some(element) => Some(Cow::Borrowed(element)),
            None => Some(Cow::Owned(ParseNode::placeholder(absolute_cursor))),
        }
    }
}

/// Largest char boundary of `s` not above `index`
fn floor_char_boundary(s: &str, index: usize) -> usize {
    let mut index = index.min(s.len());
    while !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}
