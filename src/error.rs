//! Unified error types for the quadlink firmware.
//!
//! A single `Error` enum for the failures the driver loop and startup
//! report to their caller. Boot-state write failures stay inside the order
//! service, which logs them and carries on. All variants are `Copy`.

use core::fmt;

use crate::app::ports::{ConfigError, OutputError};

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A digital output could not be driven.
    Output(OutputError),
    /// The config store could not be opened or read.
    Config(ConfigError),
    /// The byte transport reported a read or write failure.
    Transport(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Output(e) => write!(f, "output: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Transport(msg) => write!(f, "transport: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<OutputError> for Error {
    fn from(e: OutputError) -> Self {
        Self::Output(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
