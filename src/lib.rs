//! Quadlink controller library.
//!
//! Exposes the pure-logic modules (framing, order dispatch, order
//! sequencing, boot-state persistence, state indicator) for integration
//! testing and for the firmware binary. All ESP-IDF-specific code is
//! guarded by `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod boot_state;
pub mod comm;
pub mod config;
pub mod error;
pub mod protocol;
pub mod robot;
pub mod scheduler;
pub mod status;

pub mod adapters;
pub mod drivers;
pub mod pins;
