//! General-purpose digital outputs addressed by the set-IO order.
//!
//! A fixed table of `N` pins; index `i` in a set-IO frame drives `pins[i]`.

use embedded_hal::digital::OutputPin;

use crate::app::ports::{OutputError, OutputPort};

pub struct DigitalOutputs<P: OutputPin, const N: usize> {
    pins: [P; N],
}

impl<P: OutputPin, const N: usize> DigitalOutputs<P, N> {
    pub fn new(pins: [P; N]) -> Self {
        Self { pins }
    }

    pub fn pins(&self) -> &[P; N] {
        &self.pins
    }
}

impl<P: OutputPin, const N: usize> OutputPort for DigitalOutputs<P, N> {
    fn pin_count(&self) -> usize {
        N
    }

    fn write_pin(&mut self, index: u8, high: bool) -> Result<(), OutputError> {
        let pin = self
            .pins
            .get_mut(usize::from(index))
            .ok_or(OutputError::IndexOutOfRange(index))?;
        let result = if high { pin.set_high() } else { pin.set_low() };
        result.map_err(|_| OutputError::WriteFailed)
    }
}
