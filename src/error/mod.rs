//! Error handling module.
//!
//! The text-processing core (parser, suggestion engine, rankers, replacer) is
//! total and never produces errors. Everything that talks to the outside world
//! (configuration files, the MongoDB driver, the terminal) reports failures
//! through [`AutocompleteError`].
//!
//! # Example
//!
//! ```rust,no_run
//! use mongo_autocomplete::error::{ConfigError, Result};
//!
//! fn check_sample_size(size: usize) -> Result<()> {
//!     if size == 0 {
//!         return Err(ConfigError::InvalidValue {
//!             field: "sampling.sample_size".to_string(),
//!             value: size.to_string(),
//!         }
//!         .into());
//!     }
//!     Ok(())
//! }
//! ```

pub mod kinds;

// Re-export commonly used types
pub use kinds::{AutocompleteError, ConfigError, ConnectionError, Result, SamplingError};
