//! Mock adapters for integration tests.
//!
//! Records every collaborator call, storage write and output write so
//! tests can assert on the full history without real hardware.

use std::cell::Cell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use quadlink::app::events::AppEvent;
use quadlink::app::ports::{
    ClockPort, EventSink, OutputError, OutputPort, RobotPort, StorageError, StoragePort,
};
use quadlink::protocol::transport::Transport;
use quadlink::robot::{Point, RobotMode};

// ── Robot call record ─────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum RobotCall {
    CrawlForward,
    CrawlBackward,
    TurnLeft,
    TurnRight,
    ActiveMode,
    SleepMode,
    SwitchMode,
    MoveBody(f32, f32, f32),
    RotateBody(f32, f32, f32, f32),
    LegMoveTo(u8, Point),
    CalibrateServos,
    InstallState,
    CalibrateState,
    BootState,
    CalibrateVerify,
}

// ── MockRobot ─────────────────────────────────────────────────

pub struct MockRobot {
    pub calls: Vec<RobotCall>,
    pub mode: RobotMode,
    pub voltage: f32,
    pub power_fault: bool,
    pub power_auto_switch: bool,
}

#[allow(dead_code)]
impl MockRobot {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            mode: RobotMode::Boot,
            voltage: 7.40,
            power_fault: false,
            power_auto_switch: false,
        }
    }

    pub fn in_mode(mode: RobotMode) -> Self {
        Self {
            mode,
            ..Self::new()
        }
    }

    pub fn last_call(&self) -> Option<&RobotCall> {
        self.calls.last()
    }

    pub fn count(&self, call: &RobotCall) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }
}

impl Default for MockRobot {
    fn default() -> Self {
        Self::new()
    }
}

impl RobotPort for MockRobot {
    fn crawl_forward(&mut self) {
        self.calls.push(RobotCall::CrawlForward);
    }

    fn crawl_backward(&mut self) {
        self.calls.push(RobotCall::CrawlBackward);
    }

    fn turn_left(&mut self) {
        self.calls.push(RobotCall::TurnLeft);
    }

    fn turn_right(&mut self) {
        self.calls.push(RobotCall::TurnRight);
    }

    fn active_mode(&mut self) {
        self.mode = RobotMode::Action;
        self.calls.push(RobotCall::ActiveMode);
    }

    fn sleep_mode(&mut self) {
        self.calls.push(RobotCall::SleepMode);
    }

    fn switch_mode(&mut self) {
        self.mode = RobotMode::Action;
        self.calls.push(RobotCall::SwitchMode);
    }

    fn move_body(&mut self, x: f32, y: f32, z: f32) {
        self.calls.push(RobotCall::MoveBody(x, y, z));
    }

    fn rotate_body(&mut self, x: f32, y: f32, z: f32, angle: f32) {
        self.calls.push(RobotCall::RotateBody(x, y, z, angle));
    }

    fn leg_move_to(&mut self, leg: u8, offset: Point) {
        self.calls.push(RobotCall::LegMoveTo(leg, offset));
    }

    fn calibrate_servos(&mut self) {
        self.calls.push(RobotCall::CalibrateServos);
    }

    fn install_state(&mut self) {
        self.mode = RobotMode::Install;
        self.calls.push(RobotCall::InstallState);
    }

    fn calibrate_state(&mut self) {
        self.mode = RobotMode::Calibrate;
        self.calls.push(RobotCall::CalibrateState);
    }

    fn boot_state(&mut self) {
        self.mode = RobotMode::Boot;
        self.calls.push(RobotCall::BootState);
    }

    fn calibrate_verify(&mut self) {
        self.calls.push(RobotCall::CalibrateVerify);
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

// ── MockStorage ───────────────────────────────────────────────

/// Key/value store that counts writes and can be told to fail reads.
pub struct MockStorage {
    store: HashMap<String, Vec<u8>>,
    pub writes: usize,
    pub fail_reads: bool,
}

#[allow(dead_code)]
impl MockStorage {
    pub fn new() -> Self {
        Self {
            store: HashMap::new(),
            writes: 0,
            fail_reads: false,
        }
    }

    /// Storage that already holds a boot-state byte.
    pub fn with_boot_byte(byte: u8) -> Self {
        let mut storage = Self::new();
        storage.store.insert("robot::boot_state".into(), vec![byte]);
        storage
    }

    pub fn boot_byte(&self) -> Option<u8> {
        self.store
            .get("robot::boot_state")
            .and_then(|v| v.first().copied())
    }
}

impl Default for MockStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl StoragePort for MockStorage {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        if self.fail_reads {
            return Err(StorageError::IoError);
        }
        let data = self
            .store
            .get(&format!("{}::{}", namespace, key))
            .ok_or(StorageError::NotFound)?;
        let len = data.len().min(buf.len());
        buf[..len].copy_from_slice(&data[..len]);
        Ok(len)
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        self.writes += 1;
        self.store
            .insert(format!("{}::{}", namespace, key), data.to_vec());
        Ok(())
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        self.store.remove(&format!("{}::{}", namespace, key));
        Ok(())
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.store.contains_key(&format!("{}::{}", namespace, key))
    }
}

// ── MockOutputs ───────────────────────────────────────────────

pub struct MockOutputs {
    pub levels: [Option<bool>; 8],
    pub writes: usize,
    /// Every write is rejected by the driver.
    pub fail_writes: bool,
}

impl MockOutputs {
    pub fn new() -> Self {
        Self {
            levels: [None; 8],
            writes: 0,
            fail_writes: false,
        }
    }
}

impl Default for MockOutputs {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputPort for MockOutputs {
    fn pin_count(&self) -> usize {
        self.levels.len()
    }

    fn write_pin(&mut self, index: u8, high: bool) -> Result<(), OutputError> {
        let slot = self
            .levels
            .get_mut(usize::from(index))
            .ok_or(OutputError::IndexOutOfRange(index))?;
        if self.fail_writes {
            return Err(OutputError::WriteFailed);
        }
        *slot = Some(high);
        self.writes += 1;
        Ok(())
    }
}

// ── ManualClock ───────────────────────────────────────────────

/// Shared millisecond clock the test advances by hand.
#[derive(Clone, Default)]
pub struct ManualClock(Rc<Cell<u64>>);

#[allow(dead_code)]
impl ManualClock {
    pub fn at(ms: u64) -> Self {
        Self(Rc::new(Cell::new(ms)))
    }

    pub fn set(&self, ms: u64) {
        self.0.set(ms);
    }

    pub fn advance(&self, ms: u64) {
        self.0.set(self.0.get() + ms);
    }
}

impl ClockPort for ManualClock {
    fn now_ms(&self) -> u64 {
        self.0.get()
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn contains(&self, event: &AppEvent) -> bool {
        self.events.contains(event)
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── LoopbackTransport ─────────────────────────────────────────

/// In-memory serial link: tests queue inbound bytes and inspect writes.
#[derive(Default)]
pub struct LoopbackTransport {
    rx: VecDeque<u8>,
    pub tx: Vec<u8>,
    pub fail_writes: bool,
    pub fail_reads: bool,
}

#[allow(dead_code)]
impl LoopbackTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inject(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes);
    }

    pub fn take_tx(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.tx)
    }

    pub fn pending_rx(&self) -> usize {
        self.rx.len()
    }
}

impl Transport for LoopbackTransport {
    type Error = &'static str;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.fail_reads {
            return Err("rx fault");
        }
        let mut n = 0;
        while n < buf.len() {
            match self.rx.pop_front() {
                Some(byte) => {
                    buf[n] = byte;
                    n += 1;
                }
                None => break,
            }
        }
        Ok(n)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
        if self.fail_writes {
            return Err("link down");
        }
        self.tx.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn available(&self) -> bool {
        !self.rx.is_empty()
    }
}
