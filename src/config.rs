//! System configuration parameters
//!
//! All tunable timing parameters for the command link.
//! Values can be overridden via NVS (non-volatile storage).

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Timing ---
    /// Period of the kinematics / indicator tick (milliseconds)
    pub update_interval_ms: u32,
    /// Idle time after a one-shot order before the robot is put to sleep (milliseconds)
    pub auto_sleep_overtime_ms: u32,
    /// Power-group settle delay at startup when auto-switching is enabled (milliseconds)
    pub power_settle_ms: u32,

    // --- State LED ---
    /// Ticks per blink (on for half, off for half)
    pub led_blink_cycle_ticks: u32,
    /// Blink-free cycles between bursts
    pub led_settle_cycles: u32,

    // --- Link ---
    /// Serial command link baud rate
    pub serial_baud: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Timing
            update_interval_ms: 20, // 50 Hz
            auto_sleep_overtime_ms: 10_000,
            power_settle_ms: 1000,

            // State LED
            led_blink_cycle_ticks: 20, // 400 ms per blink at 50 Hz
            led_settle_cycles: 3,

            // Link
            serial_baud: 115_200,
        }
    }
}

impl SystemConfig {
    /// Range-check every field. Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(5..=100).contains(&self.update_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "update_interval_ms must be 5–100",
            ));
        }
        if !(1000..=600_000).contains(&self.auto_sleep_overtime_ms) {
            return Err(ConfigError::ValidationFailed(
                "auto_sleep_overtime_ms must be 1000–600000",
            ));
        }
        if self.power_settle_ms > 5000 {
            return Err(ConfigError::ValidationFailed(
                "power_settle_ms must be 0–5000",
            ));
        }
        if !(2..=200).contains(&self.led_blink_cycle_ticks) {
            return Err(ConfigError::ValidationFailed(
                "led_blink_cycle_ticks must be 2–200",
            ));
        }
        if self.led_settle_cycles > 20 {
            return Err(ConfigError::ValidationFailed(
                "led_settle_cycles must be 0–20",
            ));
        }
        if !matches!(self.serial_baud, 9600 | 19_200 | 57_600 | 115_200 | 230_400) {
            return Err(ConfigError::ValidationFailed(
                "serial_baud must be a standard rate",
            ));
        }
        Ok(())
    }

    pub fn update_period(&self) -> Duration {
        Duration::from_millis(u64::from(self.update_interval_ms))
    }

    pub fn power_settle(&self) -> Duration {
        Duration::from_millis(u64::from(self.power_settle_ms))
    }
}
