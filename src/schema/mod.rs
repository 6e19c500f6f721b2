//! Collection schemas inferred from sampled documents
//!
//! A [`Schema`] is a tree of [`SchemaNode`]s keyed by field name. Each node
//! records which BSON types were observed for the field, the distinct number
//! and string values seen (up to a small bound), and the nested fields of
//! sub-documents. Array elements are folded into the array field's own node,
//! so `tags: ['a', 'b']` yields a `tags` node flagged both `array` and
//! `string`.

pub mod cache;
pub mod infer;
pub mod kind;
pub mod sampler;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

pub use cache::{CacheKey, CacheLookup, Clock, SchemaCache, SchemaStore, SystemClock};
pub use infer::infer_schema;
pub use kind::{BsonType, ValueKind};
pub use sampler::{DataSource, Namespace, SchemaSampler};

/// Distinct values observed for a field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Observed<T> {
    /// Every distinct value seen so far, in order of first appearance
    Values(Vec<T>),
    /// Too many or too long values to enumerate
    Unbounded,
}

impl<T> Default for Observed<T> {
    fn default() -> Self {
        Observed::Values(Vec::new())
    }
}

impl<T> Observed<T> {
    /// Enumerated values, empty once unbounded
    pub fn values(&self) -> &[T] {
        match self {
            Observed::Values(values) => values,
            Observed::Unbounded => &[],
        }
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, Observed::Unbounded)
    }
}

/// Observed shape of one field
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SchemaNode {
    /// Types seen for this field
    pub types: BTreeSet<BsonType>,
    /// Distinct numbers seen (Int32 and Double)
    #[serde(skip_serializing_if = "is_empty_values")]
    pub numbers: Observed<f64>,
    /// Distinct strings seen
    #[serde(skip_serializing_if = "is_empty_values")]
    pub strings: Observed<String>,
    /// Nested fields of sub-documents
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub children: BTreeMap<String, SchemaNode>,
}

fn is_empty_values<T>(observed: &Observed<T>) -> bool {
    matches!(observed, Observed::Values(v) if v.is_empty())
}

impl SchemaNode {
    /// Whether values of type `ty` were observed
    pub fn has(&self, ty: BsonType) -> bool {
        self.types.contains(&ty)
    }

    /// Observed type names in display order
    pub fn type_names(&self) -> Vec<&'static str> {
        self.types.iter().map(BsonType::name).collect()
    }

    /// Placeholder suggestions for every observed type, e.g. `(string)`
    pub fn placeholders(&self) -> Vec<String> {
        self.types.iter().map(BsonType::placeholder).collect()
    }
}

/// Inferred schema of a collection
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Schema {
    /// Top-level fields
    pub fields: BTreeMap<String, SchemaNode>,
    /// Number of documents the schema was inferred from
    pub sampled: usize,
}

impl Schema {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Find the node for a dotted path such as `address.city`
    pub fn lookup(&self, path: &str) -> Option<&SchemaNode> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut node = self.fields.get(first)?;
        for segment in segments {
            node = node.children.get(segment)?;
        }
        Some(node)
    }

    /// Every dotted field path, parents before their children
    pub fn paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        collect_paths(&self.fields, "", &mut paths);
        paths
    }
}

fn collect_paths(fields: &BTreeMap<String, SchemaNode>, prefix: &str, out: &mut Vec<String>) {
    for (name, node) in fields {
        let path = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}.{name}")
        };
        out.push(path.clone());
        collect_paths(&node.children, &path, out);
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for path in self.paths() {
            if let Some(node) = self.lookup(&path) {
                writeln!(f, "{path}: {}", node.type_names().join(" | "))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    fn sample_schema() -> Schema {
        infer_schema(&[
            doc! { "name": "ann", "address": { "city": "Oslo", "zip": 1234 } },
            doc! { "name": "bob", "age": 40 },
        ])
    }

    #[test]
    fn test_lookup_dotted_path() {
        let schema = sample_schema();
        assert!(schema.lookup("address.city").is_some_and(|n| n.has(BsonType::String)));
        assert!(schema.lookup("address.street").is_none());
        assert!(schema.lookup("").is_none());
    }

    #[test]
    fn test_paths_are_depth_first() {
        let schema = sample_schema();
        assert_eq!(
            schema.paths(),
            vec!["address", "address.city", "address.zip", "age", "name"]
        );
    }

    #[test]
    fn test_type_names_order() {
        let schema = sample_schema();
        let address = schema.lookup("address").unwrap();
        assert_eq!(address.type_names(), vec!["object", "null"]);
        assert_eq!(address.placeholders(), vec!["(object)", "(null)"]);
    }

    #[test]
    fn test_display_lists_paths() {
        let text = sample_schema().to_string();
        assert!(text.contains("address.city: string"));
        assert!(text.contains("age: double | null"));
    }
}
