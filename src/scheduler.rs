//! Periodic update context.
//!
//! Runs at the fixed update period (20 ms by default) and does only
//! short, non-blocking work: the kinematics tick and the state-indicator
//! tick. It never touches order state; the only thing it reads from the
//! driver loop is the [`SharedStatus`] cell.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  timer (every update period)                                 │
//! │        │                                                     │
//! │        ▼                                                     │
//! │  UpdateService::tick(&SharedStatus)                          │
//! │        ├──▶ KinematicsTick::update()                         │
//! │        └──▶ StateIndicator::tick(snapshot) ──▶ StatusLed     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The service is owned by whatever drives the timer (the firmware moves
//! it into the timer callback); there is no global handle.

use core::time::Duration;

use embedded_hal::digital::OutputPin;

use crate::app::ports::KinematicsTick;
use crate::config::SystemConfig;
use crate::drivers::state_indicator::StateIndicator;
use crate::drivers::status_led::StatusLed;
use crate::status::SharedStatus;

pub struct UpdateService<K: KinematicsTick, P: OutputPin> {
    kinematics: K,
    indicator: StateIndicator,
    led: StatusLed<P>,
    period: Duration,
    ticks: u64,
}

impl<K: KinematicsTick, P: OutputPin> UpdateService<K, P> {
    pub fn new(kinematics: K, led_pin: P, config: &SystemConfig) -> Self {
        let mut led = StatusLed::new(led_pin);
        led.start();
        Self {
            kinematics,
            indicator: StateIndicator::new(config),
            led,
            period: config.update_period(),
            ticks: 0,
        }
    }

    /// One periodic tick: kinematics first, then the indicator.
    pub fn tick(&mut self, status: &SharedStatus) {
        self.ticks = self.ticks.wrapping_add(1);
        self.kinematics.update();
        if let Some(level) = self.indicator.tick(status.snapshot()) {
            self.led.set(level);
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Ticks run since construction.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn kinematics(&self) -> &K {
        &self.kinematics
    }

    pub fn led(&self) -> &StatusLed<P> {
        &self.led
    }
}
