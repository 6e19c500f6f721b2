//! Delimiter-stack scanner for a single query value
//!
//! The scanner walks one value of a query expression and reports where it
//! ends and whether it looks like a plain object or array literal. It never
//! fails: unbalanced input simply ends the scan with open delimiters left on
//! the stack.
//!
//! # Rules
//!
//! - `{ [ ( ' " \`` open a level, the matching closer pops it
//! - inside a quote, `\` escapes the next character
//! - a comma at the root level ends the value
//! - a closer found at or after the cursor that does not match the current
//!   level closes nested levels until its opener is found (or the root is
//!   reached), so `{a: ['|]` still closes the array and the object

/// Scan mode, the innermost open delimiter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Root,
    Open(char),
}

/// The first delimiter opened at the root level of the value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FirstDelimiter {
    /// The delimiter character
    pub ch: char,
    /// Byte offset of the delimiter
    pub open: usize,
    /// Byte offset of the character that closed it, if any
    pub close: Option<usize>,
}

/// Outcome of scanning one value
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ScanResult {
    /// Byte offset where the value ends (a root-level comma or end of text)
    pub end: usize,
    /// No stray content at root level outside the first delimiter
    pub seems_pure: bool,
    /// First delimiter seen at root level
    pub first: Option<FirstDelimiter>,
}

pub(crate) fn is_quote(ch: char) -> bool {
    matches!(ch, '\'' | '"' | '`')
}

pub(crate) fn is_opener(ch: char) -> bool {
    matches!(ch, '{' | '[' | '(') || is_quote(ch)
}

fn is_closer(ch: char) -> bool {
    matches!(ch, '}' | ']' | ')')
}

fn closer_of(open: char) -> char {
    match open {
        '{' => '}',
        '[' => ']',
        '(' => ')',
        quote => quote,
    }
}

struct Scanner {
    stack: Vec<char>,
    seems_pure: bool,
    first: Option<FirstDelimiter>,
    cursor: Option<usize>,
}

impl Scanner {
    fn mode(&self) -> Mode {
        self.stack.last().map_or(Mode::Root, |ch| Mode::Open(*ch))
    }

    fn is_after_cursor(&self, index: usize) -> bool {
        self.cursor.is_some_and(|c| index >= c)
    }

    fn push(&mut self, ch: char) {
        self.stack.push(ch);
    }

    fn pop(&mut self, index: usize) {
        self.stack.pop();
        self.note_root(index);
    }

    /// Close levels until the opener of `closer` has been popped
    fn recover(&mut self, closer: char, index: usize) {
        while let Some(open) = self.stack.pop() {
            if closer_of(open) == closer {
                break;
            }
        }
        self.note_root(index);
    }

    fn note_root(&mut self, index: usize) {
        if self.stack.is_empty()
            && let Some(first) = self.first.as_mut()
            && first.close.is_none()
        {
            first.close = Some(index);
        }
    }
}

/// Scan a single value starting at the beginning of `text`
///
/// # Arguments
/// * `text` - Text holding the value, possibly followed by `,` and more values
/// * `cursor` - Cursor offset local to `text`, if the cursor is inside it
pub(crate) fn scan_value(text: &str, cursor: Option<usize>) -> ScanResult {
    let mut scanner = Scanner {
        stack: Vec::new(),
        seems_pure: true,
        first: None,
        cursor,
    };

    let mut chars = text.char_indices();
    while let Some((i, ch)) = chars.next() {
        match scanner.mode() {
            Mode::Root => {
                if ch == ',' {
                    return ScanResult {
                        end: i,
                        seems_pure: scanner.seems_pure,
                        first: scanner.first,
                    };
                }
                if is_opener(ch) {
                    if scanner.first.is_none() {
                        scanner.first = Some(FirstDelimiter {
                            ch,
                            open: i,
                            close: None,
                        });
                    } else {
                        scanner.seems_pure = false;
                    }
                    scanner.push(ch);
                } else if !ch.is_whitespace() {
                    scanner.seems_pure = false;
                }
            }
            Mode::Open(quote) if is_quote(quote) => {
                if ch == '\\' {
                    chars.next();
                } else if ch == quote {
                    scanner.pop(i);
                } else if is_closer(ch) && scanner.is_after_cursor(i) {
                    scanner.recover(ch, i);
                }
            }
            Mode::Open(open) => {
                if ch == closer_of(open) {
                    scanner.pop(i);
                } else if is_opener(ch) {
                    scanner.push(ch);
                } else if is_closer(ch) && scanner.is_after_cursor(i) {
                    scanner.recover(ch, i);
                }
            }
        }
    }

    ScanResult {
        end: text.len(),
        seems_pure: scanner.seems_pure,
        first: scanner.first,
    }
}
