//! Cross-context status cell.
//!
//! The driver loop owns the robot and all order state. The periodic
//! context only needs the robot mode and the power-fault flag for the
//! state indicator, so those two values are published here after every
//! driver-loop iteration.
//!
//! ```text
//! ┌─────────────┐  publish   ┌──────────────┐  snapshot  ┌──────────────┐
//! │ Driver loop │───────────▶│ SharedStatus │───────────▶│ 20 ms tick   │
//! │ (orders)    │            │  (atomics)   │            │ (indicator)  │
//! └─────────────┘            └──────────────┘            └──────────────┘
//! ```
//!
//! Single writer, single reader; each field is independently consistent.

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use crate::robot::RobotMode;

/// Values the periodic context reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub mode: RobotMode,
    pub power_fault: bool,
}

impl Default for StatusSnapshot {
    fn default() -> Self {
        Self {
            mode: RobotMode::Boot,
            power_fault: false,
        }
    }
}

pub struct SharedStatus {
    mode: AtomicU8,
    power_fault: AtomicBool,
}

impl SharedStatus {
    /// Starts in Boot with no fault, usable in a `static`.
    pub const fn new() -> Self {
        Self {
            mode: AtomicU8::new(RobotMode::Boot.as_u8()),
            power_fault: AtomicBool::new(false),
        }
    }

    pub fn publish(&self, mode: RobotMode, power_fault: bool) {
        self.mode.store(mode.as_u8(), Ordering::Release);
        self.power_fault.store(power_fault, Ordering::Release);
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        let mode = RobotMode::from_u8(self.mode.load(Ordering::Acquire)).unwrap_or(RobotMode::Boot);
        StatusSnapshot {
            mode,
            power_fault: self.power_fault.load(Ordering::Acquire),
        }
    }
}

impl Default for SharedStatus {
    fn default() -> Self {
        Self::new()
    }
}
