//! Inbound orders decoded from wire frames.
//!
//! [`Order::decode`] turns a [`Frame`] into a tagged variant the
//! [`OrderService`](super::service::OrderService) matches on. Parameter
//! bytes stay raw (biased) inside armed orders and are converted when the
//! order executes.

use crate::protocol::codec::Frame;
use crate::protocol::orders::{
    self, OrderKind, REQUEST_ACTIVE_MODE, REQUEST_BOOT_STATE, REQUEST_CALIBRATE_STATE,
    REQUEST_CALIBRATE_VERIFY, REQUEST_CRAWL_BACKWARD, REQUEST_CRAWL_FORWARD,
    REQUEST_INSTALL_STATE, REQUEST_MOVE_BODY, REQUEST_MOVE_BODY_TO, REQUEST_ROTATE_BODY,
    REQUEST_SLEEP_MODE, REQUEST_SWITCH_MODE, REQUEST_TURN_LEFT, REQUEST_TURN_RIGHT, unbias,
};
use crate::robot::{Point, RobotMode};

/// A decoded order frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Order {
    Echo,
    SupplyVoltage,
    /// Drive digital output `pin` high (`level != 0`) or low.
    ChangeIo { pin: u8, level: bool },
    MoveLeg { leg: u8, offset: Point },
    Calibrate,
    Blocked(BlockedOrder),
    Dynamic(DynamicOrder),
    /// No handler claims this opcode.
    Unrecognised(u8),
    /// Known opcode, but the frame carries fewer parameter bytes than it reads.
    Truncated(u8),
}

impl Order {
    pub fn decode(frame: &Frame) -> Self {
        let opcode = frame.opcode();
        let Some(spec) = orders::lookup(opcode) else {
            return Self::Unrecognised(opcode);
        };
        // The last byte the handler reads must be present.
        if spec.params > 0 && frame.param(spec.params - 1).is_none() {
            return Self::Truncated(opcode);
        }
        let params = frame.params();

        match spec.kind {
            OrderKind::Echo => Self::Echo,
            OrderKind::SupplyVoltage => Self::SupplyVoltage,
            OrderKind::ChangeIo => Self::ChangeIo {
                pin: params[0],
                level: params[1] != 0,
            },
            OrderKind::MoveLeg => Self::MoveLeg {
                leg: params[0],
                offset: Point::new(unbias(params[1]), unbias(params[2]), unbias(params[3])),
            },
            OrderKind::Calibrate => Self::Calibrate,
            OrderKind::Blocked => Self::Blocked(BlockedOrder::new(opcode, params)),
            OrderKind::Dynamic => Self::Dynamic(DynamicOrder::new(opcode, params)),
        }
    }
}

/// Copy up to three raw parameter bytes; missing ones stay at the bias (zero displacement).
fn raw_params(params: &[u8]) -> [u8; 3] {
    let mut raw = [orders::PARAM_BIAS as u8; 3];
    for (slot, byte) in raw.iter_mut().zip(params) {
        *slot = *byte;
    }
    raw
}

/// Rotation axis from two biased bytes; the angle is the axis length.
fn rotation(raw_x: u8, raw_y: u8) -> BodyMotion {
    let x = unbias(raw_x);
    let y = unbias(raw_y);
    BodyMotion::Rotate {
        x,
        y,
        angle: (x * x + y * y).sqrt(),
    }
}

// ───────────────────────────────────────────────────────────────
// Body motion
// ───────────────────────────────────────────────────────────────

/// A body displacement or rotation, already unbiased.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BodyMotion {
    Move(Point),
    /// Rotate about `(x, y, 0)` by `angle` degrees.
    Rotate { x: f32, y: f32, angle: f32 },
}

// ───────────────────────────────────────────────────────────────
// One-shot orders
// ───────────────────────────────────────────────────────────────

/// An armed one-shot order. At most one exists at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockedOrder {
    pub opcode: u8,
    pub params: [u8; 3],
}

/// What executing a [`BlockedOrder`] does.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BlockedAction {
    CrawlForward,
    CrawlBackward,
    TurnLeft,
    TurnRight,
    ActiveMode,
    SleepMode,
    SwitchMode,
    /// Enter a persisted mode (install, calibrate or boot pose).
    EnterState(RobotMode),
    CalibrateVerify,
    Body(BodyMotion),
    /// Reserved opcode with no executor.
    Unassigned(u8),
}

impl BlockedOrder {
    pub fn new(opcode: u8, params: &[u8]) -> Self {
        Self {
            opcode,
            params: raw_params(params),
        }
    }

    pub fn action(&self) -> BlockedAction {
        let [p0, p1, p2] = self.params;
        match self.opcode {
            REQUEST_CRAWL_FORWARD => BlockedAction::CrawlForward,
            REQUEST_CRAWL_BACKWARD => BlockedAction::CrawlBackward,
            REQUEST_TURN_LEFT => BlockedAction::TurnLeft,
            REQUEST_TURN_RIGHT => BlockedAction::TurnRight,
            REQUEST_ACTIVE_MODE => BlockedAction::ActiveMode,
            REQUEST_SLEEP_MODE => BlockedAction::SleepMode,
            REQUEST_SWITCH_MODE => BlockedAction::SwitchMode,
            REQUEST_INSTALL_STATE => BlockedAction::EnterState(RobotMode::Install),
            REQUEST_CALIBRATE_STATE => BlockedAction::EnterState(RobotMode::Calibrate),
            REQUEST_BOOT_STATE => BlockedAction::EnterState(RobotMode::Boot),
            REQUEST_CALIBRATE_VERIFY => BlockedAction::CalibrateVerify,
            REQUEST_MOVE_BODY => BlockedAction::Body(BodyMotion::Move(Point::new(
                unbias(p0),
                unbias(p1),
                unbias(p2),
            ))),
            REQUEST_ROTATE_BODY => BlockedAction::Body(rotation(p0, p1)),
            other => BlockedAction::Unassigned(other),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Retargetable orders
// ───────────────────────────────────────────────────────────────

/// An armed body order, re-applied every driver tick until a one-shot
/// order replaces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DynamicOrder {
    pub opcode: u8,
    pub params: [u8; 3],
}

impl DynamicOrder {
    pub fn new(opcode: u8, params: &[u8]) -> Self {
        Self {
            opcode,
            params: raw_params(params),
        }
    }

    pub fn motion(&self) -> BodyMotion {
        let [p0, p1, p2] = self.params;
        if self.opcode == REQUEST_MOVE_BODY_TO {
            BodyMotion::Move(Point::new(unbias(p0), unbias(p1), unbias(p2)))
        } else {
            rotation(p0, p1)
        }
    }
}
