use reedline::{
    ColumnarMenu, Emacs, FileBackedHistory, KeyCode, KeyModifiers, MenuBuilder, Reedline,
    ReedlineEvent, ReedlineMenu, Signal, default_emacs_keybindings,
};
use tracing::{debug, warn};

use crate::config::HistoryConfig;
use crate::error::{AutocompleteError, Result};

use super::completer::QueryCompleter;
use super::prompt::NamespacePrompt;
use super::session::ReplSession;

const COMPLETION_MENU: &str = "completion_menu";

/// REPL engine for interactive query completion
pub struct ReplEngine {
    /// Line editor with the query completer attached
    editor: Reedline,

    /// Prompt reading the shared namespace
    prompt: NamespacePrompt,

    /// Whether to continue running
    running: bool,
}

impl ReplEngine {
    /// Create a new REPL engine
    ///
    /// # Arguments
    /// * `session` - Session the completer reads the selection and schemas from
    /// * `history_config` - History configuration
    ///
    /// # Returns
    /// * `Result<Self>` - New REPL engine or error
    pub fn new(session: ReplSession, history_config: &HistoryConfig) -> Result<Self> {
        let prompt = NamespacePrompt::new(session.state().clone());
        let completer = Box::new(QueryCompleter::new(session));
        let menu = Box::new(ColumnarMenu::default().with_name(COMPLETION_MENU));

        let mut keybindings = default_emacs_keybindings();
        keybindings.add_binding(
            KeyModifiers::NONE,
            KeyCode::Tab,
            ReedlineEvent::UntilFound(vec![
                ReedlineEvent::Menu(COMPLETION_MENU.to_string()),
                ReedlineEvent::MenuNext,
            ]),
        );

        let editor = Reedline::create()
            .with_history(Self::history(history_config)?)
            .with_completer(completer)
            .with_menu(ReedlineMenu::EngineCompleter(menu))
            .with_edit_mode(Box::new(Emacs::new(keybindings)));

        Ok(Self {
            editor,
            prompt,
            running: true,
        })
    }

    /// File backed history when persistence is on, in-memory otherwise
    fn history(config: &HistoryConfig) -> Result<Box<FileBackedHistory>> {
        if config.persist {
            match FileBackedHistory::with_file(config.max_size, config.file_path.clone()) {
                Ok(history) => {
                    debug!("History file: {}", config.file_path.display());
                    return Ok(Box::new(history));
                }
                Err(e) => warn!("Cannot open history file, keeping history in memory: {}", e),
            }
        }
        FileBackedHistory::new(config.max_size)
            .map(Box::new)
            .map_err(|e| AutocompleteError::Generic(format!("History error: {}", e)))
    }

    /// Read a single line of input
    ///
    /// # Returns
    /// * `Result<Option<String>>` - Input line or None on EOF / interrupt
    pub fn read_line(&mut self) -> Result<Option<String>> {
        match self.editor.read_line(&self.prompt) {
            Ok(Signal::Success(line)) => Ok(Some(line)),
            Ok(Signal::CtrlC) | Ok(Signal::CtrlD) => {
                self.running = false;
                Ok(None)
            }
            Ok(_) => Ok(Some(String::new())),
            Err(err) => Err(AutocompleteError::Generic(format!("Read error: {}", err))),
        }
    }

    /// Check if REPL is still running
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn stop(&mut self) {
        self.running = false;
    }
}
