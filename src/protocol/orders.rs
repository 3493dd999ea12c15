//! Opcode vocabulary and the opcode → handler-kind table.
//!
//! | Range    | Category                                        |
//! |----------|-------------------------------------------------|
//! | 0–63     | queries, immediate orders, responses            |
//! | 64–98    | one-shot (blocked) orders, reserved range       |
//! | 100–103  | one-shot body orders with parameters            |
//! | 110–113  | retargetable (dynamic) body orders              |
//! | 128, 129 | frame sentinels                                 |

use core::ops::RangeInclusive;

// ── Sentinels ─────────────────────────────────────────────────

pub const TRANS_START: u8 = 128;
pub const TRANS_END: u8 = 129;

// ── Queries and responses ─────────────────────────────────────

pub const REQUEST_ECHO: u8 = 0;
pub const ECHO: u8 = 1;
pub const REQUEST_SUPPLY_VOLTAGE: u8 = 10;
pub const SUPPLY_VOLTAGE: u8 = 11;
pub const REQUEST_CHANGE_IO: u8 = 20;
pub const ORDER_START: u8 = 21;
pub const ORDER_DONE: u8 = 22;

// ── Immediate orders ──────────────────────────────────────────

pub const REQUEST_MOVE_LEG: u8 = 30;
pub const REQUEST_CALIBRATE: u8 = 32;

// ── One-shot orders (reserved range) ──────────────────────────

pub const REQUEST_CRAWL_FORWARD: u8 = 64;
pub const REQUEST_CRAWL_BACKWARD: u8 = 66;
pub const REQUEST_CRAWL_LEFT: u8 = 68;
pub const REQUEST_CRAWL_RIGHT: u8 = 70;
pub const REQUEST_TURN_LEFT: u8 = 72;
pub const REQUEST_TURN_RIGHT: u8 = 74;
pub const REQUEST_ACTIVE_MODE: u8 = 76;
pub const REQUEST_SLEEP_MODE: u8 = 78;
pub const REQUEST_SWITCH_MODE: u8 = 80;
pub const REQUEST_INSTALL_STATE: u8 = 82;
pub const REQUEST_CALIBRATE_STATE: u8 = 84;
pub const REQUEST_BOOT_STATE: u8 = 86;
pub const REQUEST_CALIBRATE_VERIFY: u8 = 88;

/// Any opcode in this range arms the blocked slot, executor or not.
pub const BLOCKED_RANGE: RangeInclusive<u8> = 64..=98;

// ── One-shot body orders ──────────────────────────────────────

pub const REQUEST_MOVE_BODY: u8 = 100;
pub const REQUEST_ROTATE_BODY: u8 = 102;

// ── Retargetable body orders ──────────────────────────────────

pub const REQUEST_MOVE_BODY_TO: u8 = 110;
pub const REQUEST_ROTATE_BODY_TO: u8 = 112;

/// Offset subtracted from biased parameter bytes (`value − 64`).
pub const PARAM_BIAS: i16 = 64;

/// Converts a biased parameter byte into its signed displacement.
pub fn unbias(raw: u8) -> f32 {
    (raw as i16 - PARAM_BIAS) as f32
}

// ═══════════════════════════════════════════════════════════════
//  Dispatch table
// ═══════════════════════════════════════════════════════════════

/// How the dispatcher treats an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderKind {
    Echo,
    SupplyVoltage,
    ChangeIo,
    MoveLeg,
    Calibrate,
    /// Armed into the blocked slot, executed once by the order state machine.
    Blocked,
    /// Armed into the dynamic slot, re-applied every driver tick.
    Dynamic,
}

/// One row of the dispatch table.
#[derive(Debug, Clone, Copy)]
pub struct OrderSpec {
    pub opcode: u8,
    pub kind: OrderKind,
    /// Parameter bytes the handler reads after the opcode.
    pub params: usize,
}

impl OrderSpec {
    const fn new(opcode: u8, kind: OrderKind, params: usize) -> Self {
        Self {
            opcode,
            kind,
            params,
        }
    }
}

/// Opcodes with an explicit handler. Opcodes in [`BLOCKED_RANGE`] that are
/// not listed here still classify as parameterless blocked orders.
pub const ORDER_TABLE: [OrderSpec; 9] = [
    OrderSpec::new(REQUEST_ECHO, OrderKind::Echo, 0),
    OrderSpec::new(REQUEST_SUPPLY_VOLTAGE, OrderKind::SupplyVoltage, 0),
    OrderSpec::new(REQUEST_CHANGE_IO, OrderKind::ChangeIo, 2),
    OrderSpec::new(REQUEST_MOVE_LEG, OrderKind::MoveLeg, 4),
    OrderSpec::new(REQUEST_CALIBRATE, OrderKind::Calibrate, 0),
    OrderSpec::new(REQUEST_MOVE_BODY, OrderKind::Blocked, 3),
    OrderSpec::new(REQUEST_ROTATE_BODY, OrderKind::Blocked, 2),
    OrderSpec::new(REQUEST_MOVE_BODY_TO, OrderKind::Dynamic, 3),
    OrderSpec::new(REQUEST_ROTATE_BODY_TO, OrderKind::Dynamic, 2),
];

/// Look up how an opcode is handled. `None` means unrecognised.
pub fn lookup(opcode: u8) -> Option<OrderSpec> {
    if let Some(spec) = ORDER_TABLE.iter().find(|spec| spec.opcode == opcode) {
        return Some(*spec);
    }
    if BLOCKED_RANGE.contains(&opcode) {
        return Some(OrderSpec::new(opcode, OrderKind::Blocked, 0));
    }
    None
}
