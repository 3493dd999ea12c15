//! Output drivers: general-purpose digital outputs and the state LED.

pub mod outputs;
pub mod state_indicator;
pub mod status_led;
