use super::*;
use proptest::prelude::*;

fn object(node: &ParseNode) -> &ObjectNode {
    node.as_object().expect("expected an object node")
}

fn key_name(property: &Property) -> &str {
    &property.key.as_key().expect("expected a key node").name
}

/// Parse with the cursor at the `|` marker, which is removed from the text
fn parse_marked(marked: &str) -> (String, ParseNode) {
    let cursor = marked.find('|').expect("missing cursor marker");
    let text = marked.replacen('|', "", 1);
    let tree = parse(&text, Some(cursor));
    (text, tree)
}

// ============================================================================
// slice_cursor
// ============================================================================

#[test]
fn test_slice_cursor_inside_window() {
    assert_eq!(slice_cursor(Some(5), 2, 8), Some(3));
    assert_eq!(slice_cursor(Some(2), 2, 8), Some(0));
    assert_eq!(slice_cursor(Some(8), 2, 8), Some(6));
}

#[test]
fn test_slice_cursor_outside_window() {
    assert_eq!(slice_cursor(Some(1), 2, 8), None);
    assert_eq!(slice_cursor(Some(9), 2, 8), None);
    assert_eq!(slice_cursor(None, 0, 100), None);
}

// ============================================================================
// Objects
// ============================================================================

#[test]
fn test_simple_object() {
    let tree = parse("{a: 1, 'b': \"two\"}", None);
    let obj = object(&tree);

    assert_eq!(obj.properties.len(), 2);
    assert_eq!(key_name(&obj.properties[0]), "a");
    assert_eq!(obj.properties[0].value.raw, " 1");
    assert_eq!(key_name(&obj.properties[1]), "b");
    assert_eq!(obj.properties[1].value.raw, " \"two\"");
    assert!(obj.closed);
    assert_eq!(obj.focus, None);
    assert_eq!(tree.cursor, None);
}

#[test]
fn test_absolute_offsets() {
    let text = "{a: 1, b: [2, 3]}";
    let tree = parse(text, None);
    let obj = object(&tree);

    let b_value = &obj.properties[1].value;
    assert_eq!(&text[b_value.start..b_value.end()], b_value.raw);

    let array = b_value.as_array().unwrap();
    assert_eq!(array.elements.len(), 2);
    let second = &array.elements[1];
    assert_eq!(&text[second.start..second.end()], " 3");
    assert_eq!(&text[array.body.clone()], "2, 3");
    assert_eq!(&text[obj.body.clone()], "a: 1, b: [2, 3]");
}

#[test]
fn test_cursor_in_key() {
    let (_, tree) = parse_marked("{ag|}");
    let obj = object(&tree);

    assert_eq!(obj.focus, Some(0));
    let key = &obj.properties[0].key;
    assert_eq!(key.cursor, Some(2));
    assert_eq!(key.key_search_text(), "ag");
    assert!(!key.as_key().unwrap().has_colon);
    assert_eq!(obj.properties[0].value.cursor, None);
}

#[test]
fn test_cursor_in_value() {
    let (_, tree) = parse_marked("{a: 1, b: 'x|'}");
    let obj = object(&tree);

    assert_eq!(obj.focus, Some(1));
    let value = &obj.properties[1].value;
    assert_eq!(value.raw, " 'x'");
    assert_eq!(value.text_before_cursor(), " 'x");
    assert_eq!(obj.properties[0].key.cursor, None);
    assert_eq!(obj.properties[0].value.cursor, None);
}

#[test]
fn test_cursor_after_last_property() {
    let (_, tree) = parse_marked("{a: 1, |}");
    let obj = object(&tree);

    assert_eq!(obj.properties.len(), 1);
    assert!(obj.is_after_last());
    assert!(obj.focused_property().is_none());
}

#[test]
fn test_cursor_in_empty_object() {
    let (_, tree) = parse_marked("{|}");
    let obj = object(&tree);
    assert!(obj.properties.is_empty());
    assert_eq!(obj.focus, Some(0));
}

#[test]
fn test_cursor_outside_braces_has_no_focus() {
    let tree = parse("{a: 1}", Some(0));
    assert_eq!(tree.cursor, Some(0));
    assert_eq!(object(&tree).focus, None);

    let tree = parse("{a: 1}", Some(6));
    assert_eq!(object(&tree).focus, None);
}

#[test]
fn test_cursor_right_after_comma_focuses_next_key() {
    let (_, tree) = parse_marked("{a: 1,| b: 2}");
    let obj = object(&tree);
    assert_eq!(obj.focus, Some(1));
    assert_eq!(obj.properties[1].key.key_search_text(), "");
}

#[test]
fn test_quoted_key_with_escape_and_stray_text() {
    let tree = parse(r#"{"a\"b" junk: 1}"#, None);
    let obj = object(&tree);
    let key = obj.properties[0].key.as_key().unwrap();

    assert_eq!(key.name, "a\"b");
    assert_eq!(key.quote, Some('"'));
    assert!(key.has_colon);
    assert_eq!(obj.properties[0].value.raw, " 1");
}

#[test]
fn test_quoted_key_search_text_excludes_quote() {
    let (_, tree) = parse_marked("{'addr|: 1}");
    let obj = object(&tree);
    let key = &obj.properties[0].key;
    assert_eq!(key.key_search_text(), "addr");
}

#[test]
fn test_bare_key_stops_at_comma() {
    let (_, tree) = parse_marked("{a|, b: 1}");
    let obj = object(&tree);

    assert_eq!(obj.properties.len(), 2);
    assert_eq!(key_name(&obj.properties[0]), "a");
    assert_eq!(key_name(&obj.properties[1]), "b");
    assert_eq!(obj.focus, Some(0));
}

#[test]
fn test_empty_key_region_stops_reading() {
    let tree = parse("{a: 1,  : 2}", None);
    let obj = object(&tree);
    assert_eq!(obj.properties.len(), 1);
}

#[test]
fn test_read_key_empty_returns_none() {
    assert!(read_key("   ", 0, None).is_none());
    assert!(read_key("  : 1", 0, None).is_none());
    assert!(read_key("", 0, None).is_none());
}

#[test]
fn test_read_key_consumes_colon() {
    let (node, consumed) = read_key("  name : 1", 10, Some(4)).unwrap();
    let key = node.as_key().unwrap();
    assert_eq!(key.name, "name");
    assert_eq!(consumed, 8);
    assert_eq!(node.start, 10);
    assert_eq!(node.cursor, Some(4));
    assert_eq!(key.token, 12..16);
}

// ============================================================================
// Arrays and opaque values
// ============================================================================

#[test]
fn test_array_focus_on_element() {
    let (_, tree) = parse_marked("[1, 2|, 3]");
    let array = tree.as_array().unwrap();
    assert_eq!(array.elements.len(), 3);
    assert_eq!(array.focus, Some(1));
}

#[test]
fn test_array_focus_after_trailing_comma() {
    let (text, tree) = parse_marked("[1, |]");
    let array = tree.as_array().unwrap();
    assert_eq!(array.elements.len(), 1);
    assert_eq!(array.focus, Some(1));

    let placeholder = array.focused_element(4).unwrap();
    assert_eq!(placeholder.raw, "");
    assert_eq!(placeholder.start, 4);
    assert!(text.is_char_boundary(placeholder.start));
}

#[test]
fn test_impure_values_stay_source() {
    for text in ["ObjectId('abc')", "'str'", "(1)", "{a: 1} trailing", "{}[]"] {
        let tree = parse(text, None);
        if text.starts_with(['{', '(', '\'', '[']) {
            assert_eq!(tree.kind, NodeKind::Source, "{text}");
        }
    }
}

#[test]
fn test_nested_source_value() {
    let tree = parse("{_id: ObjectId('x'), n: /ab/}", None);
    let obj = object(&tree);
    assert_eq!(obj.properties.len(), 2);
    assert_eq!(obj.properties[0].value.kind, NodeKind::Source);
    assert_eq!(obj.properties[0].value.raw, " ObjectId('x')");
    assert_eq!(obj.properties[1].value.raw, " /ab/");
}

#[test]
fn test_root_reads_one_value_only() {
    let tree = parse("{a: 1}, {b: 2}", None);
    assert_eq!(tree.raw, "{a: 1}");
    assert_eq!(object(&tree).properties.len(), 1);
}

// ============================================================================
// Implicit braces and recovery
// ============================================================================

#[test]
fn test_implicit_object_at_root() {
    let text = "age: {$g";
    let tree = parse(text, Some(text.len()));
    let obj = object(&tree);

    assert!(!obj.closed);
    assert_eq!(obj.body, 0..text.len());
    assert_eq!(key_name(&obj.properties[0]), "age");

    let inner = object(&obj.properties[0].value);
    assert!(!inner.closed);
    assert_eq!(inner.focus, Some(0));
    assert_eq!(inner.properties[0].key.key_search_text(), "$g");
}

#[test]
fn test_empty_text_is_empty_object() {
    let tree = parse("", Some(0));
    let obj = object(&tree);
    assert!(obj.properties.is_empty());
    assert_eq!(obj.focus, Some(0));
}

#[test]
fn test_unmatched_quote_recovers_at_closer() {
    let text = "{a: ['x], b: 2}";
    let cursor = text.find('\'').unwrap() + 1;
    let tree = parse(text, Some(cursor));
    let obj = object(&tree);

    assert!(obj.closed);
    assert_eq!(obj.properties.len(), 2);
    assert_eq!(key_name(&obj.properties[0]), "a");
    assert_eq!(obj.properties[0].value.raw, " ['x]");
    assert_eq!(key_name(&obj.properties[1]), "b");
    assert_eq!(obj.focus, Some(0));

    let array = obj.properties[0].value.as_array().unwrap();
    assert_eq!(array.focus, Some(0));
    assert_eq!(array.elements[0].raw, "'x");
}

#[test]
fn test_unclosed_nesting() {
    let (_, tree) = parse_marked("{a: {b: [1, |");
    let obj = object(&tree);
    let inner = object(&obj.properties[0].value);
    let array = inner.properties[0].value.as_array().unwrap();
    assert!(!array.closed);
    assert_eq!(array.focus, Some(1));
}

#[test]
fn test_out_of_range_cursor_is_ignored() {
    let tree = parse("{a: 1}", Some(100));
    assert_eq!(tree.cursor, None);
    assert_eq!(object(&tree).focus, None);
}

#[test]
fn test_multibyte_text() {
    let (_, tree) = parse_marked("{名前: 'é|'}");
    let obj = object(&tree);
    assert_eq!(key_name(&obj.properties[0]), "名前");
    assert_eq!(obj.properties[0].value.text_before_cursor(), " 'é");
}

// ============================================================================
// Properties
// ============================================================================

/// Walk the tree and check the single-live-path cursor invariant
fn assert_cursor_consistent(node: &ParseNode) {
    let children: Vec<&ParseNode> = match &node.kind {
        NodeKind::Object(obj) => obj
            .properties
            .iter()
            .flat_map(|p| [&p.key, &p.value])
            .collect(),
        NodeKind::Array(array) => array.elements.iter().collect(),
        _ => Vec::new(),
    };

    let live = children.iter().filter(|c| c.cursor.is_some()).count();
    if node.cursor.is_none() {
        assert_eq!(live, 0, "cursor leaked below a node without one: {node:?}");
    } else {
        assert!(live <= 1, "more than one live child: {node:?}");
    }
    for child in children {
        assert_cursor_consistent(child);
    }
}

proptest! {
    #[test]
    fn prop_slice_cursor(c in 0usize..200, s in 0usize..100, len in 0usize..100) {
        let e = s + len;
        let expected = if s <= c && c <= e { Some(c - s) } else { None };
        prop_assert_eq!(slice_cursor(Some(c), s, e), expected);
        prop_assert_eq!(slice_cursor(None, s, e), None);
    }

    #[test]
    fn prop_parse_is_total(text in "[{}\\[\\]()'\"`\\\\:, a-z0-9$.]{0,40}", cursor in 0usize..50) {
        let tree = parse(&text, Some(cursor));
        prop_assert!(tree.end() <= text.len());
        assert_cursor_consistent(&tree);
    }

    #[test]
    fn prop_parse_without_cursor(text in "\\PC{0,30}") {
        let tree = parse(&text, None);
        prop_assert_eq!(tree.cursor, None);
        assert_cursor_consistent(&tree);
    }
}
