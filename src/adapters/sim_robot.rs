//! Simulated robot collaborator.
//!
//! Stands in for the kinematics subsystem on host builds and on boards
//! without the servo stack attached. It tracks the mode transitions the
//! real collaborator would make and logs every motion call; nothing moves.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};
use log::debug;

use crate::app::ports::{KinematicsTick, RobotPort};
use crate::robot::{Point, RobotMode};

// ───────────────────────────────────────────────────────────────
// SimRobot
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SimRobot {
    mode: RobotMode,
    awake: bool,
    voltage: f32,
    power_fault: bool,
    power_auto_switch: bool,
    body: Point,
    last_action: &'static str,
}

impl SimRobot {
    /// Boot mode, 7.4 V supply, power group always on.
    pub fn new() -> Self {
        Self {
            mode: RobotMode::Boot,
            awake: false,
            voltage: 7.4,
            power_fault: false,
            power_auto_switch: false,
            body: Point::default(),
            last_action: "",
        }
    }

    pub fn set_supply_voltage(&mut self, volts: f32) {
        self.voltage = volts;
    }

    pub fn set_power_fault(&mut self, fault: bool) {
        self.power_fault = fault;
    }

    /// Body offset from the last move-body call.
    pub fn body(&self) -> Point {
        self.body
    }

    pub fn is_awake(&self) -> bool {
        self.awake
    }

    /// Name of the last collaborator call, for diagnostics.
    pub fn last_action(&self) -> &'static str {
        self.last_action
    }

    fn record(&mut self, action: &'static str) {
        debug!("sim robot: {}", action);
        self.last_action = action;
    }
}

impl Default for SimRobot {
    fn default() -> Self {
        Self::new()
    }
}

impl RobotPort for SimRobot {
    fn crawl_forward(&mut self) {
        self.record("crawl_forward");
    }

    fn crawl_backward(&mut self) {
        self.record("crawl_backward");
    }

    fn turn_left(&mut self) {
        self.record("turn_left");
    }

    fn turn_right(&mut self) {
        self.record("turn_right");
    }

    fn active_mode(&mut self) {
        self.mode = RobotMode::Action;
        self.awake = true;
        self.record("active_mode");
    }

    fn sleep_mode(&mut self) {
        self.mode = RobotMode::Action;
        self.awake = false;
        self.record("sleep_mode");
    }

    fn switch_mode(&mut self) {
        self.mode = RobotMode::Action;
        self.awake = !self.awake;
        self.record("switch_mode");
    }

    fn move_body(&mut self, x: f32, y: f32, z: f32) {
        self.body = Point::new(x, y, z);
        self.record("move_body");
    }

    fn rotate_body(&mut self, x: f32, y: f32, z: f32, angle: f32) {
        debug!("sim robot: rotate about ({}, {}, {}) by {}", x, y, z, angle);
        self.record("rotate_body");
    }

    fn leg_move_to(&mut self, leg: u8, offset: Point) {
        debug!("sim robot: leg {} by {:?}", leg, offset);
        self.record("leg_move_to");
    }

    fn calibrate_servos(&mut self) {
        self.record("calibrate_servos");
    }

    fn install_state(&mut self) {
        self.mode = RobotMode::Install;
        self.record("install_state");
    }

    fn calibrate_state(&mut self) {
        self.mode = RobotMode::Calibrate;
        self.record("calibrate_state");
    }

    fn boot_state(&mut self) {
        self.mode = RobotMode::Boot;
        self.record("boot_state");
    }

    fn calibrate_verify(&mut self) {
        self.record("calibrate_verify");
    }

    fn mode(&self) -> RobotMode {
        self.mode
    }

    fn supply_voltage(&self) -> f32 {
        self.voltage
    }

    fn power_fault(&self) -> bool {
        self.power_fault
    }

    fn power_auto_switch(&self) -> bool {
        self.power_auto_switch
    }
}

// ───────────────────────────────────────────────────────────────
// SimKinematics
// ───────────────────────────────────────────────────────────────

/// Periodic-tick half of the simulated collaborator.
#[derive(Debug, Default)]
pub struct SimKinematics {
    updates: u64,
}

impl SimKinematics {
    pub fn updates(&self) -> u64 {
        self.updates
    }
}

impl KinematicsTick for SimKinematics {
    fn update(&mut self) {
        self.updates = self.updates.wrapping_add(1);
    }
}

// ───────────────────────────────────────────────────────────────
// SimPin
// ───────────────────────────────────────────────────────────────

/// In-memory output pin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimPin {
    high: bool,
}

impl SimPin {
    /// A pin that starts driven high.
    pub const fn high() -> Self {
        Self { high: true }
    }

    pub fn is_high(&self) -> bool {
        self.high
    }
}

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.high = true;
        Ok(())
    }
}
