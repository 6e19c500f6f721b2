//! Fold sampled documents into a [`Schema`]

use mongodb::bson::{Bson, Document};

use super::kind::{BsonType, ValueKind};
use super::{Observed, Schema, SchemaNode};

/// Distinct values kept per field before giving up on enumeration
pub const MAX_ENUM_VALUES: usize = 10;
/// Strings longer than this (in characters) are never enumerated
pub const MAX_ENUM_STRING_LEN: usize = 50;

/// Infer a schema from sampled documents
///
/// Fields missing from some documents, or appearing only in later ones, are
/// flagged `null` so they are suggested as optional.
///
/// # Arguments
/// * `documents` - Sampled documents in any order
pub fn infer_schema<'a, I>(documents: I) -> Schema
where
    I: IntoIterator<Item = &'a Document>,
{
    let mut root = SchemaNode::default();
    let mut sampled = 0;
    for document in documents {
        visit_document(&mut root, document);
        sampled += 1;
    }

    Schema {
        fields: root.children,
        sampled,
    }
}

fn visit_document(node: &mut SchemaNode, document: &Document) {
    let seen_before = node.has(BsonType::Object);
    node.types.insert(BsonType::Object);

    for (name, child) in node.children.iter_mut() {
        if !document.contains_key(name) {
            child.types.insert(BsonType::Null);
        }
    }

    for (name, value) in document {
        let is_new = !node.children.contains_key(name);
        let child = node.children.entry(name.clone()).or_default();
        if is_new && seen_before {
            child.types.insert(BsonType::Null);
        }
        visit_value(child, value);
    }
}

fn visit_value(node: &mut SchemaNode, value: &Bson) {
    let kind = ValueKind::from(value);
    if let Some(ty) = kind.bson_type() {
        node.types.insert(ty);
    }

    match kind {
        ValueKind::Number(n) => record(&mut node.numbers, n),
        ValueKind::Decimal => node.numbers = Observed::Unbounded,
        ValueKind::Text(s) => {
            if s.chars().count() > MAX_ENUM_STRING_LEN {
                node.strings = Observed::Unbounded;
            } else {
                record(&mut node.strings, s.to_string());
            }
        }
        ValueKind::Object(document) => visit_document(node, document),
        ValueKind::Array(items) => {
            for item in items {
                visit_value(node, item);
            }
        }
        _ => {}
    }
}

fn record<T: PartialEq>(observed: &mut Observed<T>, value: T) {
    if let Observed::Values(values) = observed
        && !values.contains(&value)
    {
        if values.len() >= MAX_ENUM_VALUES {
            *observed = Observed::Unbounded;
        } else {
            values.push(value);
        }
    }
}
