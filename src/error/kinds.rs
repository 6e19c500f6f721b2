use std::{fmt, io};

/// Crate-wide `Result` type using [`AutocompleteError`] as the error.
pub type Result<T> = std::result::Result<T, AutocompleteError>;

/// Top-level error type.
///
/// Wraps the more specific error kinds so callers can use a single error
/// type across the crate.
#[derive(Debug)]
pub enum AutocompleteError {
    /// Connection-related errors.
    Connection(ConnectionError),

    /// Configuration errors.
    Config(ConfigError),

    /// Schema sampling errors.
    Sampling(SamplingError),

    /// I/O errors.
    Io(io::Error),

    /// MongoDB driver errors.
    MongoDb(mongodb::error::Error),

    /// Generic error with a free-form message.
    Generic(String),
}

/// Connection-specific errors.
#[derive(Debug)]
pub enum ConnectionError {
    /// Failed to establish a connection.
    ConnectionFailed(String),

    /// Invalid connection URI.
    InvalidUri(String),

    /// Not currently connected to MongoDB.
    NotConnected,

    /// Ping command failed.
    PingFailed(String),
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file could not be read or written.
    FileAccess { path: String, message: String },

    /// Invalid config format.
    InvalidFormat(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },
}

/// Schema sampling errors.
#[derive(Debug)]
pub enum SamplingError {
    /// The `$sample` aggregation failed.
    QueryFailed { namespace: String, message: String },

    /// Iterating the sample cursor failed.
    CursorFailed { namespace: String, message: String },

    /// No collection has been selected.
    NoCollection,
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for AutocompleteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AutocompleteError::Connection(e) => write!(f, "Connection error: {e}"),
            AutocompleteError::Config(e) => write!(f, "Configuration error: {e}"),
            AutocompleteError::Sampling(e) => write!(f, "Sampling error: {e}"),
            AutocompleteError::Io(e) => write!(f, "I/O error: {e}"),
            AutocompleteError::MongoDb(e) => format_mongodb_error(f, e),
            AutocompleteError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionError::ConnectionFailed(msg) => write!(f, "Failed to connect: {msg}"),
            ConnectionError::InvalidUri(uri) => write!(f, "Invalid connection URI: {uri}"),
            ConnectionError::NotConnected => write!(f, "Not connected to MongoDB"),
            ConnectionError::PingFailed(msg) => write!(f, "Ping failed: {msg}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileAccess { path, message } => {
                write!(f, "Cannot access config file {path}: {message}")
            }
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
        }
    }
}

impl fmt::Display for SamplingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SamplingError::QueryFailed { namespace, message } => {
                write!(f, "$sample on {namespace} failed: {message}")
            }
            SamplingError::CursorFailed { namespace, message } => {
                write!(f, "Reading sample of {namespace} failed: {message}")
            }
            SamplingError::NoCollection => write!(f, "No collection selected"),
        }
    }
}

/// Render a driver error with its server error code when one is available.
fn format_mongodb_error(f: &mut fmt::Formatter<'_>, error: &mongodb::error::Error) -> fmt::Result {
    use mongodb::error::ErrorKind;

    match error.kind.as_ref() {
        ErrorKind::Command(command_error) => write!(
            f,
            "MongoDB error {} ({}): {}",
            command_error.code, command_error.code_name, command_error.message
        ),
        _ => write!(f, "MongoDB error: {error}"),
    }
}

impl std::error::Error for AutocompleteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AutocompleteError::Io(e) => Some(e),
            AutocompleteError::MongoDb(e) => Some(e),
            _ => None,
        }
    }
}
impl std::error::Error for ConnectionError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for SamplingError {}

/* ========================= Conversions to AutocompleteError ========================= */

impl From<io::Error> for AutocompleteError {
    fn from(err: io::Error) -> Self {
        AutocompleteError::Io(err)
    }
}

impl From<mongodb::error::Error> for AutocompleteError {
    fn from(err: mongodb::error::Error) -> Self {
        AutocompleteError::MongoDb(err)
    }
}

impl From<ConnectionError> for AutocompleteError {
    fn from(err: ConnectionError) -> Self {
        AutocompleteError::Connection(err)
    }
}

impl From<ConfigError> for AutocompleteError {
    fn from(err: ConfigError) -> Self {
        AutocompleteError::Config(err)
    }
}

impl From<SamplingError> for AutocompleteError {
    fn from(err: SamplingError) -> Self {
        AutocompleteError::Sampling(err)
    }
}

impl From<toml::de::Error> for AutocompleteError {
    fn from(err: toml::de::Error) -> Self {
        AutocompleteError::Config(ConfigError::InvalidFormat(err.to_string()))
    }
}

impl From<toml::ser::Error> for AutocompleteError {
    fn from(err: toml::ser::Error) -> Self {
        AutocompleteError::Config(ConfigError::InvalidFormat(err.to_string()))
    }
}

impl From<serde_json::Error> for AutocompleteError {
    fn from(err: serde_json::Error) -> Self {
        AutocompleteError::Generic(format!("JSON error: {err}"))
    }
}

impl From<String> for AutocompleteError {
    fn from(msg: String) -> Self {
        AutocompleteError::Generic(msg)
    }
}

impl From<&str> for AutocompleteError {
    fn from(msg: &str) -> Self {
        AutocompleteError::Generic(msg.to_owned())
    }
}
