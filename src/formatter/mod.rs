//! Output formatting for suggestions, schemas and fuzzy matches
//!
//! This module renders engine results for the terminal and for scripts:
//! - Table output built with tabled
//! - JSON output (compact or pretty, colorized with colored_json)
//! - Plain output, one item per line

pub mod highlight;
pub mod json;
pub mod table;

use serde::Serialize;

use crate::config::{DisplayConfig, OutputFormat};
use crate::error::Result;
use crate::ranking::FuzzyMatch;
use crate::replace::Replacement;
use crate::schema::Schema;
use crate::suggest::Suggestions;

pub use highlight::{render_cursor, render_kind, render_segments};
pub use json::JsonFormatter;
pub use table::TableFormatter;

/// Indentation used for pretty JSON
const JSON_INDENT: usize = 2;

/// Main formatter
#[derive(Debug, Clone, Copy)]
pub struct Formatter {
    /// Output format type
    format: OutputFormat,

    /// Enable colored output
    use_colors: bool,
}

#[derive(Serialize)]
struct ReplacementView<'a> {
    text: &'a str,
    cursor: usize,
}

impl Formatter {
    /// Create a new formatter
    ///
    /// # Arguments
    /// * `format` - Output format type
    /// * `use_colors` - Enable colored output
    pub fn new(format: OutputFormat, use_colors: bool) -> Self {
        Self { format, use_colors }
    }

    /// Build a formatter from display settings
    pub fn from_config(config: &DisplayConfig) -> Self {
        Self::new(config.format, config.color_output)
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn use_colors(&self) -> bool {
        self.use_colors
    }

    fn json(&self) -> JsonFormatter {
        let pretty = matches!(self.format, OutputFormat::JsonPretty);
        JsonFormatter::new(pretty, self.use_colors, JSON_INDENT)
    }

    /// Format a suggestion list
    ///
    /// # Returns
    /// * `Result<String>` - Rendered suggestions, `(no suggestions)` when empty
    ///   in the human readable formats
    pub fn format_suggestions(&self, suggestions: &Suggestions) -> Result<String> {
        if self.format.is_json() {
            return self.json().render(&suggestions.items);
        }
        if suggestions.is_empty() {
            return Ok("(no suggestions)".to_string());
        }

        match self.format {
            OutputFormat::Table => {
                let rows = suggestions.items.iter().enumerate().map(|(i, s)| {
                    vec![
                        (i + 1).to_string(),
                        s.text.clone(),
                        render_kind(s.kind, self.use_colors),
                    ]
                });
                Ok(TableFormatter::new(self.use_colors).render(&["#", "suggestion", "kind"], rows))
            }
            _ => Ok(suggestions
                .items
                .iter()
                .map(|s| s.text.as_str())
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    /// Format rewritten text, marking the cursor with `|`
    pub fn format_replacement(&self, replacement: &Replacement) -> Result<String> {
        if self.format.is_json() {
            return self.json().render(&ReplacementView {
                text: &replacement.text,
                cursor: replacement.cursor,
            });
        }
        Ok(render_cursor(
            &replacement.text,
            replacement.cursor,
            self.use_colors,
        ))
    }

    /// Format an inferred schema
    pub fn format_schema(&self, schema: &Schema) -> Result<String> {
        if self.format.is_json() {
            return self.json().render(schema);
        }
        if schema.is_empty() {
            return Ok("(empty schema)".to_string());
        }

        match self.format {
            OutputFormat::Table => Ok(TableFormatter::new(self.use_colors).render_schema(schema)),
            _ => Ok(schema.to_string().trim_end().to_string()),
        }
    }

    /// Format fuzzy matches, highlighting matched characters
    pub fn format_matches(&self, matches: &[FuzzyMatch]) -> Result<String> {
        if self.format.is_json() {
            return self.json().render(matches);
        }
        if matches.is_empty() {
            return Ok("(no matches)".to_string());
        }

        match self.format {
            OutputFormat::Table => {
                let rows = matches.iter().map(|m| {
                    vec![
                        render_segments(&m.segments, self.use_colors),
                        format!("{:.2}", m.quality),
                    ]
                });
                Ok(TableFormatter::new(self.use_colors).render(&["match", "quality"], rows))
            }
            _ => Ok(matches
                .iter()
                .map(|m| render_segments(&m.segments, self.use_colors))
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::from_config(&DisplayConfig::default())
    }
}
