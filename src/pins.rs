//! GPIO / peripheral pin assignments for the controller board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers. Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// General-purpose digital outputs (set-IO order, index 0–7)
// ---------------------------------------------------------------------------

/// Output table addressed by the set-IO order. Index `i` drives `OUTPUT_GPIOS[i]`.
pub const OUTPUT_GPIOS: [i32; OUTPUT_COUNT] = [20, 21, 35, 36, 37, 38, 39, 40];

pub const OUTPUT_COUNT: usize = 8;

// ---------------------------------------------------------------------------
// State LED
// ---------------------------------------------------------------------------

/// Single-colour state LED, active high.
pub const STATE_LED_GPIO: i32 = 13;

// ---------------------------------------------------------------------------
// UART command link
// ---------------------------------------------------------------------------

pub const UART_TX_GPIO: i32 = 17;
pub const UART_RX_GPIO: i32 = 18;
