//! Terminal highlighting with nu-ansi-term

use nu_ansi_term::{Color, Style};

use crate::ranking::Segment;
use crate::suggest::SuggestionKind;

/// Render match segments, emphasizing the matched runs
///
/// Without colors the segments are simply concatenated.
pub fn render_segments(segments: &[Segment], use_colors: bool) -> String {
    let matched = Style::new().fg(Color::Green).bold();
    segments
        .iter()
        .map(|segment| {
            if use_colors && segment.highlighted {
                matched.paint(segment.text.as_str()).to_string()
            } else {
                segment.text.clone()
            }
        })
        .collect()
}

/// Style used for a suggestion kind label
pub fn kind_style(kind: SuggestionKind) -> Style {
    match kind {
        SuggestionKind::Field => Style::new().fg(Color::Cyan),
        SuggestionKind::Operator => Style::new().fg(Color::Yellow),
        SuggestionKind::Value => Style::new().fg(Color::Green),
        SuggestionKind::NewProperty => Style::new().fg(Color::Purple),
    }
}

/// Kind label, colored when enabled
pub fn render_kind(kind: SuggestionKind, use_colors: bool) -> String {
    if use_colors {
        kind_style(kind).paint(kind.to_string()).to_string()
    } else {
        kind.to_string()
    }
}

/// Show `text` with a cursor marker at byte offset `cursor`
pub fn render_cursor(text: &str, cursor: usize, use_colors: bool) -> String {
    let cursor = cursor.min(text.len());
    if !text.is_char_boundary(cursor) {
        return text.to_string();
    }
    let marker = if use_colors {
        Style::new().fg(Color::Red).bold().paint("|").to_string()
    } else {
        "|".to_string()
    };
    format!("{}{}{}", &text[..cursor], marker, &text[cursor..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(text: &str, highlighted: bool) -> Segment {
        Segment {
            text: text.to_string(),
            highlighted,
        }
    }

    #[test]
    fn test_plain_segments() {
        let segments = [segment("us", true), segment("ers", false)];
        assert_eq!(render_segments(&segments, false), "users");
    }

    #[test]
    fn test_colored_segments_keep_text() {
        let segments = [segment("us", true), segment("ers", false)];
        let output = render_segments(&segments, true);
        assert!(output.contains("us"));
        assert!(output.ends_with("ers"));
        assert!(output.contains('\u{1b}'));
    }

    #[test]
    fn test_cursor_marker() {
        assert_eq!(render_cursor("{age: }", 6, false), "{age: |}");
        assert_eq!(render_cursor("ab", 10, false), "ab|");
    }

    #[test]
    fn test_kind_label() {
        assert_eq!(render_kind(SuggestionKind::NewProperty, false), "new property");
    }
}
