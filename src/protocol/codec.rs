//! Sentinel-delimited frame codec.
//!
//! Wire format:
//! ```text
//! ┌────────┬────────┬──────────────────┬────────┐
//! │ START  │ OPCODE │ PARAM 0..N       │ END    │
//! │ 0x80   │ < 0x80 │ < 0x80 each      │ 0x81   │
//! └────────┴────────┴──────────────────┴────────┘
//! ```
//!
//! The decoder consumes one byte at a time. A START byte always restarts
//! the frame, so a receiver that joins mid-stream resynchronises on the
//! next command. Bytes are stored in a fixed [`FRAME_CAPACITY`] buffer;
//! a run that fills the buffer without an END is discarded and the decoder
//! drops input until the next START.

use heapless::Vec;
use log::warn;

use super::orders::{ECHO, ORDER_DONE, ORDER_START, SUPPLY_VOLTAGE, TRANS_END, TRANS_START};
use super::transport::{OrderSource, Transport};

/// Maximum frame length including both sentinels.
pub const FRAME_CAPACITY: usize = 32;

/// Largest response: START, SUPPLY_VOLTAGE, two digits, END.
pub const RESPONSE_CAPACITY: usize = 5;

/// Largest centivolt value two base-128 digits can carry.
pub const MAX_CENTIVOLTS: u16 = 127 * 128 + 127;

// ═══════════════════════════════════════════════════════════════
//  Inbound frames
// ═══════════════════════════════════════════════════════════════

/// A complete `START … END` frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: Vec<u8, FRAME_CAPACITY>,
}

impl Frame {
    /// Validate a raw byte run as a frame.
    ///
    /// Returns `None` unless byte 0 is START, the last byte is END, and the
    /// run fits in [`FRAME_CAPACITY`].
    pub fn from_bytes(raw: &[u8]) -> Option<Self> {
        if raw.len() < 2 || raw.first() != Some(&TRANS_START) || raw.last() != Some(&TRANS_END) {
            return None;
        }
        let bytes = Vec::from_slice(raw).ok()?;
        Some(Self { bytes })
    }

    /// Byte 1. For the bare envelope `[START, END]` this is the END sentinel,
    /// which no handler claims.
    pub fn opcode(&self) -> u8 {
        self.bytes[1]
    }

    /// Bytes between the opcode and the END sentinel.
    pub fn params(&self) -> &[u8] {
        self.bytes.get(2..self.bytes.len() - 1).unwrap_or(&[])
    }

    /// Parameter byte `index` (0-based, after the opcode).
    pub fn param(&self, index: usize) -> Option<u8> {
        self.params().get(index).copied()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

// ═══════════════════════════════════════════════════════════════
//  Decoder
// ═══════════════════════════════════════════════════════════════

/// Outcome of pushing one byte into the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Push {
    /// Byte stored, frame still open.
    Stored,
    /// END sentinel stored; the consume step for this poll is over.
    End,
    /// Byte ignored while waiting for a START after an overflow.
    Skipped,
    /// Buffer was full; contents discarded, resynchronising.
    Overflow,
}

/// Streaming frame decoder.
pub struct FrameDecoder {
    buf: Vec<u8, FRAME_CAPACITY>,
    resyncing: bool,
    discarded: u32,
}

impl FrameDecoder {
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            resyncing: false,
            discarded: 0,
        }
    }

    /// Store one byte.
    pub fn push(&mut self, byte: u8) -> Push {
        if byte == TRANS_START {
            self.buf.clear();
            self.resyncing = false;
        } else if self.resyncing {
            return Push::Skipped;
        }

        if self.buf.push(byte).is_err() {
            warn!(
                "codec: {} bytes without END, discarding frame and resynchronising",
                self.buf.len()
            );
            self.buf.clear();
            self.resyncing = true;
            self.discarded = self.discarded.wrapping_add(1);
            return Push::Overflow;
        }

        if byte == TRANS_END { Push::End } else { Push::Stored }
    }

    /// Hand out the buffered frame if it is complete, resetting the index.
    /// An incomplete or garbled run is retained for later calls.
    pub fn take_frame(&mut self) -> Option<Frame> {
        let frame = Frame::from_bytes(&self.buf)?;
        self.buf.clear();
        Some(frame)
    }

    /// Consume bytes from `data` until an END is stored, then check for a
    /// complete frame. Returns the number of bytes consumed alongside it.
    pub fn feed(&mut self, data: &[u8]) -> (usize, Option<Frame>) {
        let mut consumed = 0;
        for &byte in data {
            consumed += 1;
            if self.push(byte) == Push::End {
                break;
            }
        }
        (consumed, self.take_frame())
    }

    /// Drain `transport` one byte at a time until an END is stored or no
    /// input is left, then check for a complete frame.
    pub fn poll<T: Transport>(&mut self, transport: &mut T) -> Result<Option<Frame>, T::Error> {
        let mut byte = [0u8; 1];
        while transport.available() {
            if transport.read(&mut byte)? == 0 {
                break;
            }
            if self.push(byte[0]) == Push::End {
                break;
            }
        }
        Ok(self.take_frame())
    }

    /// Bytes currently buffered.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Number of runs discarded on overflow since construction.
    pub fn discarded(&self) -> u32 {
        self.discarded
    }

    /// Reset decoder state (e.g. after a transport reconnect).
    pub fn reset(&mut self) {
        self.buf.clear();
        self.resyncing = false;
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Responses
// ═══════════════════════════════════════════════════════════════

/// An outbound frame, tagged with the source it answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseFrame {
    source: OrderSource,
    buf: [u8; RESPONSE_CAPACITY],
    len: usize,
}

impl ResponseFrame {
    fn envelope(source: OrderSource, payload: &[u8]) -> Self {
        let mut buf = [0u8; RESPONSE_CAPACITY];
        buf[0] = TRANS_START;
        buf[1..=payload.len()].copy_from_slice(payload);
        buf[payload.len() + 1] = TRANS_END;
        Self {
            source,
            buf,
            len: payload.len() + 2,
        }
    }

    pub fn echo(source: OrderSource) -> Self {
        Self::envelope(source, &[ECHO])
    }

    pub fn supply_voltage(source: OrderSource, volts: f32) -> Self {
        let [high, low] = encode_voltage(volts);
        Self::envelope(source, &[SUPPLY_VOLTAGE, high, low])
    }

    pub fn order_start(source: OrderSource) -> Self {
        Self::envelope(source, &[ORDER_START])
    }

    pub fn order_done(source: OrderSource) -> Self {
        Self::envelope(source, &[ORDER_DONE])
    }

    /// Bare `[START, END]`, the answer to an unrecognised opcode.
    pub fn empty(source: OrderSource) -> Self {
        Self::envelope(source, &[])
    }

    pub fn source(&self) -> OrderSource {
        self.source
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

// ═══════════════════════════════════════════════════════════════
//  Voltage digits
// ═══════════════════════════════════════════════════════════════

/// Encode volts as centivolts in two base-128 digits `[high, low]`.
///
/// Rounds to the nearest centivolt and saturates at [`MAX_CENTIVOLTS`].
pub fn encode_voltage(volts: f32) -> [u8; 2] {
    let centi = (volts * 100.0).round().clamp(0.0, f32::from(MAX_CENTIVOLTS)) as u16;
    [(centi / 128) as u8, (centi % 128) as u8]
}

/// Inverse of [`encode_voltage`].
pub fn decode_voltage(digits: [u8; 2]) -> f32 {
    let centi = u16::from(digits[0]) * 128 + u16::from(digits[1]);
    f32::from(centi) / 100.0
}
