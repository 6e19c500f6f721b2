//! Dispatch on the shape of the focused parse path

use std::borrow::Cow;

use tracing::trace;

use super::candidates::{ARRAY_OPERATORS, COMBINATORS, COMPARISON_OPERATORS, join_path};
use super::{SuggestionEngine, SuggestionKind, Suggestions};
use crate::parser::{NodeKind, ParseNode};

/// Focused element of an array node, or a placeholder after the last one
fn focused_element(node: &ParseNode) -> Option<Cow<'_, ParseNode>> {
    let array = node.as_array()?;
    array.focused_element(node.absolute_cursor()?)
}

impl SuggestionEngine<'_> {
    /// Top-level selector object, or the operand of `$elemMatch`
    ///
    /// # Arguments
    /// * `node` - Object node holding the cursor
    /// * `prefix` - Dotted path the object's keys are relative to
    pub(super) fn find_context(&self, node: &ParseNode, prefix: &str) -> Suggestions {
        let Some(object) = node.as_object() else {
            return Suggestions::default();
        };
        if object.is_after_last() {
            let fields = self.field_suggestions(prefix, "");
            return Suggestions::of(fields, SuggestionKind::NewProperty, node);
        }
        let Some(property) = object.focused_property() else {
            return Suggestions::default();
        };
        let Some(key) = property.key.as_key() else {
            return Suggestions::default();
        };

        if property.key.is_focused() {
            let search = property.key.key_search_text();
            trace!("Find context: field key {:?} under {:?}", search, prefix);
            let fields = self.field_suggestions(prefix, search);
            return Suggestions::of(fields, SuggestionKind::Field, &property.key);
        }

        let value = &property.value;
        if COMBINATORS.contains(&key.name.as_str()) {
            return match focused_element(value) {
                Some(element) if element.as_object().is_some() => {
                    self.find_context(&element, prefix)
                }
                _ => Suggestions::default(),
            };
        }

        let path = join_path(prefix, &key.name);
        match &value.kind {
            NodeKind::Object(_) => self.field_expression(value, &path),
            NodeKind::Array(_) => match focused_element(value) {
                Some(element) => self.values(&path, &element),
                None => Suggestions::default(),
            },
            NodeKind::Source => self.values(&path, value),
            NodeKind::Key(_) => Suggestions::default(),
        }
    }

    /// Operator object applied to the field at `path`
    pub(super) fn field_expression(&self, node: &ParseNode, path: &str) -> Suggestions {
        let Some(object) = node.as_object() else {
            return Suggestions::default();
        };

        let all_operators = object.properties.iter().all(|p| {
            p.key
                .as_key()
                .is_some_and(|k| k.name.starts_with('$'))
        });
        if !all_operators {
            trace!("Field expression at {:?} is a plain sub-document", path);
            return self.values(path, node);
        }

        if object.is_after_last() {
            let operators = self.operator_suggestions(path, "");
            return Suggestions::of(operators, SuggestionKind::NewProperty, node);
        }
        let Some(property) = object.focused_property() else {
            return Suggestions::default();
        };
        let Some(key) = property.key.as_key() else {
            return Suggestions::default();
        };

        if property.key.is_focused() {
            let search = property.key.key_search_text();
            trace!("Field expression at {:?}: operator key {:?}", path, search);
            let operators = self.operator_suggestions(path, search);
            return Suggestions::of(operators, SuggestionKind::Operator, &property.key);
        }

        let value = &property.value;
        let operator = key.name.as_str();
        if COMPARISON_OPERATORS.contains(&operator) {
            return self.values(path, value);
        }
        if ARRAY_OPERATORS.contains(&operator) {
            return match focused_element(value) {
                Some(element) => self.values(path, &element),
                None => Suggestions::default(),
            };
        }
        match operator {
            "$not" if value.as_object().is_some() => self.field_expression(value, path),
            "$elemMatch" if value.as_object().is_some() => self.find_context(value, path),
            "$exists" => Suggestions::of(
                vec!["true".to_string(), "false".to_string()],
                SuggestionKind::Value,
                value,
            ),
            _ => Suggestions::default(),
        }
    }

    fn values(&self, path: &str, node: &ParseNode) -> Suggestions {
        let values = self.value_suggestions(path, node);
        Suggestions::of(values, SuggestionKind::Value, node)
    }
}
