//! Application core: order engine logic, zero I/O.
//!
//! This module holds the command-link rules for the controller: order
//! classification, the one-shot order state machine, retargetable body
//! orders and the idle auto-sleep timer. All interaction with the robot,
//! outputs and storage happens through **port traits** defined in
//! [`ports`], keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
