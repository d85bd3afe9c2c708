//! # geckolink Utilities
//!
//! Logging setup shared by the geckolink binary and anything embedding the
//! client library.
//!
//! The library crates only emit `tracing` events. Installing a subscriber is
//! left to the application, and this crate is the standard way to do it.

pub mod logging;

// Re-export commonly used logging functions for convenience
pub use logging::{init_logging, LogFormat, LogLevel, LoggingConfig, LoggingError, LoggingGuard};
pub use tracing::{debug, error, info, trace, warn};
