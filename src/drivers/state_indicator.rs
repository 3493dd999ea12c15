//! Blink-count state indicator.
//!
//! Encodes the robot condition as a number of blinks per burst:
//!
//! | condition        | pattern |
//! |------------------|---------|
//! | Action / Boot    | 1       |
//! | Calibrate        | 2       |
//! | Install          | 3       |
//! | power fault      | −1      |
//!
//! A negative pattern inverts the LED levels (lit between "blinks").
//! Each blink takes one cycle of `blink_cycle` ticks: on at the start,
//! off at the half. After `|pattern|` blinks the LED rests for
//! `settle_cycles` cycles, then the pattern is reselected from the latest
//! status. Mode changes mid-burst therefore never cut a burst short.

use crate::config::SystemConfig;
use crate::robot::RobotMode;
use crate::status::StatusSnapshot;

/// Blink multiplicity for a status snapshot.
pub fn pattern_for(status: StatusSnapshot) -> i8 {
    if status.power_fault {
        return -1;
    }
    match status.mode {
        RobotMode::Action | RobotMode::Boot => 1,
        RobotMode::Calibrate => 2,
        RobotMode::Install => 3,
    }
}

pub struct StateIndicator {
    counter: u32,
    pattern: i8,
    blink_cycle: u32,
    settle_cycles: u32,
}

impl StateIndicator {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            counter: 0,
            pattern: 0,
            blink_cycle: config.led_blink_cycle_ticks.max(2),
            settle_cycles: config.led_settle_cycles,
        }
    }

    /// Advance one tick. Returns the LED level to drive, if it changes now.
    pub fn tick(&mut self, status: StatusSnapshot) -> Option<bool> {
        let blinks = u32::from(self.pattern.unsigned_abs());
        let lit = self.pattern > 0;

        let mut level = None;
        if self.counter / self.blink_cycle < blinks {
            if self.counter % self.blink_cycle == 0 {
                level = Some(lit);
            } else if self.counter % self.blink_cycle == self.blink_cycle / 2 {
                level = Some(!lit);
            }
        }

        self.counter += 1;

        if self.counter / self.blink_cycle >= blinks + self.settle_cycles {
            self.counter = 0;
            self.pattern = pattern_for(status);
        }
        level
    }

    pub fn pattern(&self) -> i8 {
        self.pattern
    }
}
