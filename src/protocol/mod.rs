//! Sentinel-delimited command protocol.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     Command link                         │
//! │                                                          │
//! │  ┌───────────┐   ┌──────────┐   ┌─────────────────────┐  │
//! │  │ Transport │──▶│  Codec   │──▶│  OrderService       │  │
//! │  │ (bytes)   │   │ (framer) │   │  (dispatch)         │  │
//! │  └───────────┘   └──────────┘   └─────────────────────┘  │
//! │       ▲                                    │             │
//! │       └──────────── ResponseFrame ◀────────┘             │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Wire frame: `[START][OPCODE][PARAM...][END]`. Sentinels sit above the
//! 7-bit range so every opcode and parameter byte is below 128.

pub mod codec;
pub mod orders;
pub mod transport;
