//! Driver-loop façade.
//!
//! [`Communication`] owns everything the driver loop touches: the serial
//! transport and its framer, the [`OrderService`], the robot collaborator,
//! the boot-state store, the digital outputs, the clock and the event
//! sink. One call to [`Communication::run_once`] is one loop iteration:
//!
//! ```text
//!  update_serial ──▶ check_blocked_order ──▶ update_order ──▶ publish status
//!  (framer+dispatch)  (ORDER_DONE ack)       (blocked, dynamic, auto-sleep)
//! ```
//!
//! Responses to serial frames are written straight back to the transport.
//! Responses to frames from the secondary source are returned to the
//! caller, which owns that channel. A failing step never swallows such a
//! response: [`Iteration`] carries both.

use core::time::Duration;

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{ClockPort, EventSink, OutputPort, RobotPort, StoragePort};
use crate::app::service::OrderService;
use crate::boot_state::BootStateStore;
use crate::config::SystemConfig;
use crate::error::{Error, Result};
use crate::protocol::codec::{Frame, FrameDecoder, ResponseFrame};
use crate::protocol::transport::{OrderSource, Transport};
use crate::robot::RobotMode;
use crate::status::SharedStatus;

/// Outcome of one [`Communication::run_once`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Iteration {
    /// Response due to the secondary source, for the caller to route.
    pub outbound: Option<ResponseFrame>,
    /// First step failure, reported alongside `outbound`.
    pub error: Option<Error>,
}

impl Iteration {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Adapters handed to [`Communication::new`].
pub struct CommPorts<T, R, S, O, C, E> {
    pub transport: T,
    pub robot: R,
    pub storage: S,
    pub outputs: O,
    pub clock: C,
    pub sink: E,
}

pub struct Communication<'a, T, R, S, O, C, E>
where
    T: Transport,
    R: RobotPort,
    S: StoragePort,
    O: OutputPort,
    C: ClockPort,
    E: EventSink,
{
    transport: T,
    decoder: FrameDecoder,
    orders: OrderService,
    robot: R,
    boot: BootStateStore<S>,
    outputs: O,
    clock: C,
    sink: E,
    status: &'a SharedStatus,
    discards_reported: u32,
}

impl<'a, T, R, S, O, C, E> Communication<'a, T, R, S, O, C, E>
where
    T: Transport,
    R: RobotPort,
    S: StoragePort,
    O: OutputPort,
    C: ClockPort,
    E: EventSink,
{
    pub fn new(ports: CommPorts<T, R, S, O, C, E>, config: &SystemConfig, status: &'a SharedStatus) -> Self {
        Self {
            transport: ports.transport,
            decoder: FrameDecoder::new(),
            orders: OrderService::new(config),
            robot: ports.robot,
            boot: BootStateStore::new(ports.storage),
            outputs: ports.outputs,
            clock: ports.clock,
            sink: ports.sink,
            status,
            discards_reported: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Drive all outputs low, resume the persisted mode and publish status.
    ///
    /// Returns how long the caller should wait before entering the loop:
    /// the power-settle delay when the power group switches automatically,
    /// zero otherwise. The mode is restored and published even when the
    /// outputs could not be cleared; that failure is returned afterwards.
    pub fn start(&mut self, config: &SystemConfig) -> Result<Duration> {
        let cleared = self.outputs.reset_all();
        if let Err(e) = cleared {
            warn!("comm: clearing digital outputs failed: {}", e);
        }
        let mode = self.boot.restore(&mut self.robot);
        self.publish_status();
        self.sink.emit(&AppEvent::Started(mode));
        info!("comm: started in {:?}", mode);

        cleared?;
        Ok(if self.robot.power_auto_switch() {
            config.power_settle()
        } else {
            Duration::ZERO
        })
    }

    /// One driver-loop iteration.
    ///
    /// Every step runs even when an earlier one fails. A completion ack
    /// addressed to the secondary source is always handed back, next to
    /// the first error if there was one.
    pub fn run_once(&mut self) -> Iteration {
        let serial = self.update_serial().err();
        let (outbound, ack_error) = match self.check_blocked_order() {
            Ok(outbound) => (outbound, None),
            Err(e) => (None, Some(e)),
        };
        self.update_order();
        Iteration {
            outbound,
            error: serial.or(ack_error),
        }
    }

    // ── Steps ─────────────────────────────────────────────────

    /// Pull bytes through the framer and dispatch a completed frame.
    pub fn update_serial(&mut self) -> Result<()> {
        let polled = self.decoder.poll(&mut self.transport);
        self.report_discards();

        let frame = polled.map_err(|e| {
            warn!("comm: serial read failed: {:?}, dropping partial frame", e);
            self.decoder.reset();
            Error::Transport("serial read failed")
        })?;

        if let Some(frame) = frame {
            self.handle_order(&frame, OrderSource::Serial)?;
        }
        Ok(())
    }

    /// Dispatch a frame from any source.
    ///
    /// Serial responses are written to the transport and `None` is
    /// returned; responses for other sources are handed back.
    pub fn handle_order(&mut self, frame: &Frame, source: OrderSource) -> Result<Option<ResponseFrame>> {
        let response = self.orders.handle_order(
            frame,
            source,
            &mut self.robot,
            &mut self.outputs,
            &mut self.sink,
        );
        match response {
            Some(response) => self.route(response),
            None => Ok(None),
        }
    }

    /// Send the `ORDER_DONE` for a finished one-shot order, if one is due.
    pub fn check_blocked_order(&mut self) -> Result<Option<ResponseFrame>> {
        match self.orders.check_blocked_order(&mut self.sink) {
            Some(ack) => self.route(ack),
            None => Ok(None),
        }
    }

    /// Blocked order, dynamic order, auto-sleep; then publish status.
    pub fn update_order(&mut self) {
        let now = self.clock.now_ms();
        self.orders
            .update_orders(now, &mut self.robot, &mut self.boot, &mut self.sink);
        self.publish_status();
    }

    // ── Pass-throughs ─────────────────────────────────────────

    pub fn active_mode(&mut self) {
        self.robot.active_mode();
    }

    pub fn sleep_mode(&mut self) {
        self.robot.sleep_mode();
    }

    pub fn switch_mode(&mut self) {
        self.robot.switch_mode();
    }

    pub fn crawl_forward(&mut self) {
        self.robot.crawl_forward();
    }

    pub fn crawl_backward(&mut self) {
        self.robot.crawl_backward();
    }

    pub fn turn_left(&mut self) {
        self.robot.turn_left();
    }

    pub fn turn_right(&mut self) {
        self.robot.turn_right();
    }

    pub fn move_body(&mut self, x: f32, y: f32, z: f32) {
        self.robot.move_body(x, y, z);
    }

    pub fn rotate_body(&mut self, x: f32, y: f32, z: f32, angle: f32) {
        self.robot.rotate_body(x, y, z, angle);
    }

    pub fn supply_voltage(&self) -> f32 {
        self.robot.supply_voltage()
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn robot(&self) -> &R {
        &self.robot
    }

    pub fn robot_mode(&self) -> RobotMode {
        self.robot.mode()
    }

    pub fn orders(&self) -> &OrderService {
        &self.orders
    }

    pub fn boot_state(&self) -> &BootStateStore<S> {
        &self.boot
    }

    pub fn outputs(&self) -> &O {
        &self.outputs
    }

    pub fn outputs_mut(&mut self) -> &mut O {
        &mut self.outputs
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn sink(&self) -> &E {
        &self.sink
    }

    pub fn decoder(&self) -> &FrameDecoder {
        &self.decoder
    }

    // ── Internal ──────────────────────────────────────────────

    fn route(&mut self, response: ResponseFrame) -> Result<Option<ResponseFrame>> {
        match response.source() {
            OrderSource::Serial => {
                self.write_serial(&response)?;
                Ok(None)
            }
            OrderSource::Wireless => Ok(Some(response)),
        }
    }

    fn write_serial(&mut self, response: &ResponseFrame) -> Result<()> {
        let bytes = response.as_bytes();
        let written = self.transport.write(bytes).map_err(|e| {
            warn!("comm: serial write failed: {:?}", e);
            Error::Transport("serial write failed")
        })?;
        if written < bytes.len() {
            warn!("comm: short serial write ({} of {} bytes)", written, bytes.len());
            return Err(Error::Transport("short serial write"));
        }
        self.transport.flush().map_err(|e| {
            warn!("comm: serial flush failed: {:?}", e);
            Error::Transport("serial flush failed")
        })
    }

    fn report_discards(&mut self) {
        let total = self.decoder.discarded();
        if total != self.discards_reported {
            self.discards_reported = total;
            self.sink.emit(&AppEvent::FrameDiscarded { total });
        }
    }

    fn publish_status(&self) {
        self.status
            .publish(self.robot.mode(), self.robot.power_fault());
    }
}
