//! Outbound application events.
//!
//! The [`OrderService`](super::service::OrderService) and the
//! [`Communication`](crate::comm::Communication) façade emit these through
//! the [`EventSink`](super::ports::EventSink) port. Adapters on the other
//! side decide what to do with them (log to serial, forward upstream, or
//! record them in a test).

use crate::protocol::transport::OrderSource;
use crate::robot::RobotMode;

/// Structured events emitted by the order engine.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The driver loop has started (carries the restored mode).
    Started(RobotMode),

    /// A frame arrived while a one-shot order was still armed.
    OrderDropped { opcode: u8, source: OrderSource },

    /// A one-shot order was armed.
    BlockedArmed(u8),

    /// A retargetable body order was armed or retargeted.
    DynamicArmed(u8),

    /// The armed one-shot order ran.
    BlockedExecuted(u8),

    /// `ORDER_DONE` was sent for the finished one-shot order.
    BlockedAcknowledged(OrderSource),

    /// No handler for this opcode (or too few parameter bytes).
    Unrecognised(u8),

    /// The idle timer expired.
    AutoSleep { slept: bool },

    /// The persisted boot mode changed.
    BootStatePersisted(RobotMode),

    /// The framer discarded an oversized run.
    FrameDiscarded { total: u32 },
}
