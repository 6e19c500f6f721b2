//! Commands understood by the interactive prompt

use crate::error::{AutocompleteError, Result};

/// A parsed line of REPL input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// `use <collection>`: select the collection to complete against
    Use(String),

    /// `collections [query]`: list collections, fuzzy-filtered by `query`
    Collections(Option<String>),

    /// `schema`: show the inferred schema of the selected collection
    Schema,

    /// `refresh`: sample the selected collection again
    Refresh,

    /// `help`
    Help,

    /// `exit` or `quit`
    Exit,

    /// Anything else is a filter expression to complete
    Query(String),
}

impl ReplCommand {
    /// Parse one line of input
    ///
    /// # Returns
    /// * `Result<Option<Self>>` - `None` for a blank line, an error for a
    ///   command missing its argument
    pub fn parse(input: &str) -> Result<Option<Self>> {
        let line = input.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match (word, rest) {
            ("use", "") => {
                return Err(AutocompleteError::Generic(
                    "usage: use <collection>".to_string(),
                ));
            }
            ("use", name) => ReplCommand::Use(name.to_string()),
            ("collections", "") => ReplCommand::Collections(None),
            ("collections", query) => ReplCommand::Collections(Some(query.to_string())),
            ("schema", "") => ReplCommand::Schema,
            ("refresh", "") => ReplCommand::Refresh,
            ("help", "") => ReplCommand::Help,
            ("exit" | "quit", "") => ReplCommand::Exit,
            _ => ReplCommand::Query(line.to_string()),
        };
        Ok(Some(command))
    }

    /// Whether `line` is a command rather than a filter
    pub fn is_command(line: &str) -> bool {
        !matches!(Self::parse(line), Ok(None) | Ok(Some(ReplCommand::Query(_))))
    }
}

/// Text printed by `help`
pub const HELP: &str = "\
Commands:
  use <collection>       select the collection to complete against
  collections [query]    list collections, fuzzy matching an optional query
  schema                 show the sampled schema
  refresh                sample the collection again
  help                   show this help
  exit | quit            leave

Any other input is a query filter. Press Tab to complete it, or Enter to
list the suggestions at the end of the line.";
