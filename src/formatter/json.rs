//! JSON output for suggestions, schemas and matches

use colored_json::prelude::*;
use serde::Serialize;

use crate::error::Result;

/// JSON formatter with pretty printing support
pub struct JsonFormatter {
    /// Enable pretty printing
    pretty: bool,

    /// Indentation width for pretty output
    indent: usize,

    /// Enable colored output
    use_colors: bool,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    ///
    /// # Arguments
    /// * `pretty` - Enable pretty printing
    /// * `use_colors` - Enable colored output
    /// * `indent` - Indentation width when pretty printing
    pub fn new(pretty: bool, use_colors: bool, indent: usize) -> Self {
        Self {
            pretty,
            indent,
            use_colors,
        }
    }

    /// Serialize `value` as JSON
    ///
    /// Only pretty output is colored; compact JSON stays plain for piping.
    pub fn render<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        if !self.pretty {
            return Ok(serde_json::to_string(value)?);
        }

        let json_str = self.to_pretty_string(value)?;
        if self.use_colors {
            Ok(json_str.to_colored_json_auto().unwrap_or(json_str))
        } else {
            Ok(json_str)
        }
    }

    fn to_pretty_string<T: Serialize + ?Sized>(
        &self,
        value: &T,
    ) -> std::result::Result<String, serde_json::Error> {
        let mut buf = Vec::new();
        let indent = " ".repeat(self.indent);
        let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        value.serialize(&mut ser)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}
