//! Byte source/sink for the command link.
//!
//! The primary link is UART serial (`adapters::uart::UartTransport`
//! on the firmware build). The framer only ever pulls single bytes and the
//! façade only ever writes whole response frames.

/// A duplex byte link carrying order frames in and response frames out.
///
/// Reads never block: an idle link yields `Ok(0)` and `available()` is
/// `false`, so the driver loop can poll it every iteration.
pub trait Transport {
    type Error: core::fmt::Debug;

    /// Copy pending inbound bytes into `buf`, returning how many.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Queue `data` for sending. A short count is a failed response.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Push queued bytes onto the wire.
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// `true` while at least one inbound byte is waiting.
    fn available(&self) -> bool;
}

/// Where an order frame came from, and therefore where its answer goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderSource {
    /// The primary serial link. Responses are written straight back.
    #[default]
    Serial,
    /// The secondary (wireless) link. Responses are handed back to the
    /// caller, which routes them through its own channel.
    Wireless,
}

/// Discards all writes and never reads. Stands in for a detached link.
pub struct NullTransport;

impl Transport for NullTransport {
    type Error = ();

    fn read(&mut self, _buf: &mut [u8]) -> Result<usize, ()> {
        Ok(0)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, ()> {
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), ()> {
        Ok(())
    }

    fn available(&self) -> bool {
        false
    }
}
