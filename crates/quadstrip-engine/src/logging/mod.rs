//! Logging utilities.
//!
//! Logger initialization lives here so both the viewer binary and tests go
//! through the same filter resolution. Everything else logs through the `log`
//! facade only.

mod init;

pub use init::{init_logging, LoggingConfig};
