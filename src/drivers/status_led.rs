//! Single-colour state LED driver.
//!
//! Wraps any `embedded-hal` [`OutputPin`]. On ESP-IDF this is a
//! `PinDriver<Output>`; on host/test it is a [`SimPin`](crate::adapters::sim_robot::SimPin).
//! Pin errors are ignored: a stuck indicator never stops the robot.

use embedded_hal::digital::OutputPin;

pub struct StatusLed<P: OutputPin> {
    pin: P,
    is_on: bool,
}

impl<P: OutputPin> StatusLed<P> {
    pub fn new(pin: P) -> Self {
        Self { pin, is_on: false }
    }

    /// Drive the LED off and sync the tracked state with the pin.
    pub fn start(&mut self) {
        self.set(false);
    }

    pub fn set(&mut self, on: bool) {
        if on {
            self.pin.set_high().ok();
        } else {
            self.pin.set_low().ok();
        }
        self.is_on = on;
    }

    pub fn toggle(&mut self) {
        self.set(!self.is_on);
    }

    #[inline]
    pub fn is_on(&self) -> bool {
        self.is_on
    }

    pub fn free(self) -> P {
        self.pin
    }
}
