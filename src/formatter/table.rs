//! Table rendering using tabled
//!
//! Rows are built with the tabled [`Builder`] so the column set can be chosen
//! at runtime. Long cells are wrapped rather than truncated.

use tabled::{
    Table,
    builder::Builder,
    settings::{
        Alignment, Color, Modify, Style,
        object::{Columns, Rows},
        width::Width,
    },
};

use crate::schema::Schema;

/// Maximum width for a single column (characters)
const DEFAULT_MAX_COLUMN_WIDTH: usize = 40;

/// Enumerated values shown per schema field before eliding the rest
const MAX_VALUES_SHOWN: usize = 5;

/// Table formatter
pub struct TableFormatter {
    /// Maximum column width
    max_column_width: usize,

    /// Enable colored header
    use_colors: bool,
}

impl TableFormatter {
    /// Create a new table formatter
    ///
    /// # Arguments
    /// * `use_colors` - Color the header row
    pub fn new(use_colors: bool) -> Self {
        Self {
            max_column_width: DEFAULT_MAX_COLUMN_WIDTH,
            use_colors,
        }
    }

    /// Set maximum column width
    pub fn with_max_column_width(mut self, width: usize) -> Self {
        self.max_column_width = width;
        self
    }

    /// Render `rows` under `header`
    ///
    /// # Arguments
    /// * `header` - Column titles
    /// * `rows` - Cell text, one vector per row
    ///
    /// # Returns
    /// * `String` - The rendered table
    pub fn render<I>(&self, header: &[&str], rows: I) -> String
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        let mut builder = Builder::default();
        builder.push_record(header.iter().copied());
        for row in rows {
            builder.push_record(row);
        }

        let mut table = builder.build();
        self.apply_style(&mut table, header.len());
        table.to_string()
    }

    /// Render a schema as one row per field path
    pub fn render_schema(&self, schema: &Schema) -> String {
        let rows = schema.paths().into_iter().filter_map(|path| {
            let node = schema.lookup(&path)?;
            let types = node.type_names().join(" | ");
            Some(vec![path, types, sample_values(node)])
        });
        self.render(&["field", "types", "values"], rows)
    }

    fn apply_style(&self, table: &mut Table, columns: usize) {
        table.with(Style::modern());
        for i in 0..columns {
            table.with(Modify::new(Columns::new(i..=i)).with(Width::wrap(self.max_column_width)));
        }
        table.with(Modify::new(Rows::first()).with(Alignment::center()));

        if self.use_colors {
            table.modify(Rows::first(), Color::FG_CYAN | Color::BOLD);
        }
    }
}

/// Comma separated observed values, `*` once the field is unbounded
fn sample_values(node: &crate::schema::SchemaNode) -> String {
    let numbers = node.numbers.values().iter().map(f64::to_string);
    let strings = node.strings.values().iter().map(|s| format!("'{s}'"));
    let mut values: Vec<String> = numbers.chain(strings).collect();

    let elided = values.len() > MAX_VALUES_SHOWN;
    values.truncate(MAX_VALUES_SHOWN);
    if elided {
        values.push("...".to_string());
    }
    if node.numbers.is_unbounded() || node.strings.is_unbounded() {
        values.push("*".to_string());
    }
    values.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::infer_schema;
    use mongodb::bson::doc;

    #[test]
    fn test_render_contains_cells() {
        let formatter = TableFormatter::new(false);
        let output = formatter.render(
            &["text", "kind"],
            vec![vec!["$gt".to_string(), "operator".to_string()]],
        );
        assert!(output.contains("text"));
        assert!(output.contains("$gt"));
        assert!(output.contains("operator"));
    }

    #[test]
    fn test_schema_rows() {
        let schema = infer_schema(&[
            doc! { "name": "ann", "address": { "city": "Oslo" } },
            doc! { "name": "bob", "address": { "city": "Rome" } },
        ]);
        let output = TableFormatter::new(false).render_schema(&schema);
        assert!(output.contains("address.city"));
        assert!(output.contains("'Oslo', 'Rome'"));
        assert!(output.contains("object"));
    }

    #[test]
    fn test_values_are_elided() {
        let docs: Vec<_> = (0..8).map(|n| doc! { "n": n }).collect();
        let schema = infer_schema(&docs);
        let node = schema.lookup("n").unwrap();
        assert_eq!(sample_values(node), "0, 1, 2, 3, 4, ...");
    }
}
