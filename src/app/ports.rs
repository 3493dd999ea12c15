//! Port traits: the hexagonal boundary between the order engine and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ OrderService (domain)
//! ```
//!
//! Driven adapters (kinematics, digital outputs, storage, clock, event
//! sinks) implement these traits. The [`OrderService`](super::service::OrderService)
//! and the [`Communication`](crate::comm::Communication) façade consume them
//! via generics, so the domain core never touches hardware directly.

use crate::config::SystemConfig;
use crate::robot::{Point, RobotMode};

// ───────────────────────────────────────────────────────────────
// Robot port (driven adapter: domain → kinematics collaborator)
// ───────────────────────────────────────────────────────────────

/// The kinematics / actuation collaborator as seen from the driver loop.
///
/// Implementations are assumed total over their documented input ranges;
/// the order engine never inspects a failure from these calls.
pub trait RobotPort {
    fn crawl_forward(&mut self);
    fn crawl_backward(&mut self);
    fn turn_left(&mut self);
    fn turn_right(&mut self);

    /// Stand up and enter [`RobotMode::Action`].
    fn active_mode(&mut self);
    /// Lie down (low-power pose).
    fn sleep_mode(&mut self);
    /// Toggle between the active and sleeping poses.
    fn switch_mode(&mut self);

    /// Translate the body by a displacement from its neutral pose.
    fn move_body(&mut self, x: f32, y: f32, z: f32);
    /// Rotate the body about the axis `(x, y, z)` by `angle` degrees.
    fn rotate_body(&mut self, x: f32, y: f32, z: f32, angle: f32);
    /// Move one leg tip by `offset` relative to its current position.
    fn leg_move_to(&mut self, leg: u8, offset: Point);

    fn calibrate_servos(&mut self);
    fn install_state(&mut self);
    fn calibrate_state(&mut self);
    fn boot_state(&mut self);
    fn calibrate_verify(&mut self);

    /// Current high-level mode.
    fn mode(&self) -> RobotMode;
    /// Supply rail voltage in volts.
    fn supply_voltage(&self) -> f32;
    /// `true` when the auto-switched power group is enabled but off.
    fn power_fault(&self) -> bool;
    /// Whether the power group switches automatically (needs a settle delay at start).
    fn power_auto_switch(&self) -> bool;
}

/// Periodic kinematics update, called only from the 20 ms context.
pub trait KinematicsTick {
    fn update(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Digital output port (set-IO opcode)
// ───────────────────────────────────────────────────────────────

/// Fixed-size table of general-purpose digital outputs.
pub trait OutputPort {
    /// Number of addressable outputs.
    fn pin_count(&self) -> usize;

    /// Drive output `index` high or low.
    fn write_pin(&mut self, index: u8, high: bool) -> Result<(), OutputError>;

    /// Drive every output low (startup state).
    fn reset_all(&mut self) -> Result<(), OutputError> {
        for index in 0..self.pin_count() {
            self.write_pin(index as u8, false)?;
        }
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock.
pub trait ClockPort {
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST validate config values before persisting.
/// Invalid ranges are rejected with [`ConfigError::ValidationFailed`],
/// not silently clamped.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`SystemConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ NVS / flash)
// ───────────────────────────────────────────────────────────────

/// Persistent key-value storage.
///
/// Keys are namespaced to prevent collisions between subsystems. Write
/// operations MUST be atomic, no partial writes on power loss.
pub trait StoragePort {
    /// Read a value. Returns the number of bytes written to `buf`.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value atomically.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Delete a key. Returns `Ok(())` even if the key didn't exist.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;

    /// Check whether a key exists without reading it.
    fn exists(&self, namespace: &str, key: &str) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Storage partition is full.
    Full,
    /// Generic I/O error.
    IoError,
}

/// Errors from [`OutputPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputError {
    /// The set-IO frame addressed an output that does not exist.
    IndexOutOfRange(u8),
    /// The GPIO driver rejected the write.
    WriteFailed,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for OutputError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::IndexOutOfRange(index) => write!(f, "output index {} out of range", index),
            Self::WriteFailed => write!(f, "GPIO write failed"),
        }
    }
}

impl std::error::Error for ConfigError {}
impl std::error::Error for StorageError {}
impl std::error::Error for OutputError {}
