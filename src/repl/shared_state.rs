use std::sync::{Arc, PoisonError, RwLock};

use crate::config::{DisplayConfig, OutputFormat};
use crate::formatter::Formatter;
use crate::schema::{CacheKey, Namespace};

/// State shared between the prompt, the completer and the command session.
#[derive(Debug, Clone)]
pub struct SharedState {
    /// Sanitized connection identity, part of every schema cache key
    connection_id: String,

    /// Current database name
    current_database: Arc<RwLock<String>>,

    /// Collection queries are completed against
    current_collection: Arc<RwLock<Option<String>>>,

    /// Whether connected to server
    connected: Arc<RwLock<bool>>,

    /// Output format setting
    output_format: Arc<RwLock<OutputFormat>>,

    /// Color output setting
    color_enabled: Arc<RwLock<bool>>,
}

fn read<T: Clone>(lock: &RwLock<T>) -> T {
    lock.read().unwrap_or_else(PoisonError::into_inner).clone()
}

fn write<T>(lock: &RwLock<T>, value: T) {
    *lock.write().unwrap_or_else(PoisonError::into_inner) = value;
}

impl SharedState {
    /// Create a new shared state.
    ///
    /// * `connection_id` - Sanitized connection URI
    /// * `database` - Initial database name
    pub fn new(connection_id: impl Into<String>, database: impl Into<String>) -> Self {
        Self::with_config(connection_id, database, &DisplayConfig::default())
    }

    /// Create a new shared state with display configuration.
    pub fn with_config(
        connection_id: impl Into<String>,
        database: impl Into<String>,
        display_config: &DisplayConfig,
    ) -> Self {
        Self {
            connection_id: connection_id.into(),
            current_database: Arc::new(RwLock::new(database.into())),
            current_collection: Arc::new(RwLock::new(None)),
            connected: Arc::new(RwLock::new(false)),
            output_format: Arc::new(RwLock::new(display_config.format)),
            color_enabled: Arc::new(RwLock::new(display_config.color_output)),
        }
    }

    pub fn connection_id(&self) -> &str {
        &self.connection_id
    }

    /// Get current database name.
    pub fn get_database(&self) -> String {
        read(&self.current_database)
    }

    /// Set current database name. Clears the selected collection.
    pub fn set_database(&self, database: impl Into<String>) {
        write(&self.current_database, database.into());
        write(&self.current_collection, None);
    }

    /// Get selected collection name.
    pub fn get_collection(&self) -> Option<String> {
        read(&self.current_collection)
    }

    /// Select the collection to complete against.
    pub fn set_collection(&self, collection: Option<String>) {
        write(&self.current_collection, collection);
    }

    /// Namespace of the selected collection.
    pub fn namespace(&self) -> Option<Namespace> {
        self.get_collection()
            .map(|collection| Namespace::new(self.get_database(), collection))
    }

    /// Schema cache key of the selected collection.
    pub fn cache_key(&self) -> Option<CacheKey> {
        self.namespace()
            .map(|namespace| CacheKey::new(self.connection_id.clone(), namespace))
    }

    /// Check if connected.
    pub fn is_connected(&self) -> bool {
        read(&self.connected)
    }

    pub fn set_connected(&self, connected: bool) {
        write(&self.connected, connected);
    }

    /// Get current output format.
    pub fn get_format(&self) -> OutputFormat {
        read(&self.output_format)
    }

    /// Set output format.
    pub fn set_format(&self, format: OutputFormat) {
        write(&self.output_format, format);
    }

    /// Get current color setting.
    pub fn get_color_enabled(&self) -> bool {
        read(&self.color_enabled)
    }

    /// Set color output.
    pub fn set_color_enabled(&self, enabled: bool) {
        write(&self.color_enabled, enabled);
    }

    /// Formatter for the current display settings.
    pub fn formatter(&self) -> Formatter {
        Formatter::new(self.get_format(), self.get_color_enabled())
    }
}
