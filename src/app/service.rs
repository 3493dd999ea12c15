//! Order service: the hexagonal core of the command link.
//!
//! [`OrderService`] owns every piece of order state: the one-shot slot,
//! the retargetable slot, the completion [`OrderState`] and the idle
//! timestamp. It lives in the driver-loop context only; the periodic
//! context never sees it. All I/O flows through port traits injected at
//! call sites, making the service testable with mock adapters.
//!
//! ```text
//!   Frame ──▶ ┌──────────────────────────────┐ ──▶ ResponseFrame
//!             │         OrderService          │
//! RobotPort ◀─│ dispatch · blocked · dynamic  │──▶ EventSink
//!             │ auto-sleep                    │
//!             └──────────────────────────────┘
//! ```
//!
//! One-shot order lifecycle:
//!
//! ```text
//!   handle_order ──arm──▶ [slot] ──update_blocked_order──▶ ExecuteDone
//!                                                            │
//!   None ◀──────────── check_blocked_order (ORDER_DONE) ◀────┘
//! ```

use log::{debug, info, warn};

use crate::boot_state::BootStateStore;
use crate::config::SystemConfig;
use crate::protocol::codec::{Frame, ResponseFrame};
use crate::protocol::transport::OrderSource;
use crate::robot::RobotMode;

use super::commands::{BlockedAction, BlockedOrder, BodyMotion, DynamicOrder, Order};
use super::events::AppEvent;
use super::ports::{EventSink, OutputPort, RobotPort, StoragePort};

/// Completion phase of the one-shot order slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderState {
    #[default]
    None,
    ExecuteStart,
    ExecuteDone,
}

// ───────────────────────────────────────────────────────────────
// OrderService
// ───────────────────────────────────────────────────────────────

pub struct OrderService {
    /// Armed one-shot order and the source that will receive its ack.
    blocked: Option<(BlockedOrder, OrderSource)>,
    dynamic: Option<DynamicOrder>,
    order_state: OrderState,
    /// Source of the most recently accepted frame.
    order_source: OrderSource,
    /// Where the pending `ORDER_DONE` goes.
    completion_source: OrderSource,
    last_activity_ms: Option<u64>,
    auto_sleep_overtime_ms: u64,
}

impl OrderService {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            blocked: None,
            dynamic: None,
            order_state: OrderState::None,
            order_source: OrderSource::default(),
            completion_source: OrderSource::default(),
            last_activity_ms: None,
            auto_sleep_overtime_ms: u64::from(config.auto_sleep_overtime_ms),
        }
    }

    // ── Dispatch ──────────────────────────────────────────────

    /// Interpret one complete frame.
    ///
    /// Returns `None` when the frame is dropped because a one-shot order
    /// is still armed; every other frame gets exactly one response.
    pub fn handle_order(
        &mut self,
        frame: &Frame,
        source: OrderSource,
        robot: &mut impl RobotPort,
        outputs: &mut impl OutputPort,
        sink: &mut impl EventSink,
    ) -> Option<ResponseFrame> {
        if self.blocked.is_some() {
            debug!("order {} from {:?} dropped, one-shot order busy", frame.opcode(), source);
            sink.emit(&AppEvent::OrderDropped {
                opcode: frame.opcode(),
                source,
            });
            return None;
        }

        self.order_source = source;

        let response = match Order::decode(frame) {
            Order::Echo => ResponseFrame::echo(source),
            Order::SupplyVoltage => ResponseFrame::supply_voltage(source, robot.supply_voltage()),
            Order::ChangeIo { pin, level } => {
                if let Err(e) = outputs.write_pin(pin, level) {
                    warn!("set-io: {}, write skipped", e);
                }
                ResponseFrame::order_done(source)
            }
            Order::MoveLeg { leg, offset } => {
                robot.leg_move_to(leg, offset);
                ResponseFrame::order_done(source)
            }
            Order::Calibrate => {
                robot.calibrate_servos();
                ResponseFrame::order_done(source)
            }
            Order::Blocked(order) => {
                self.blocked = Some((order, source));
                // One-shot orders preempt continuous steering.
                self.dynamic = None;
                sink.emit(&AppEvent::BlockedArmed(order.opcode));
                ResponseFrame::order_start(source)
            }
            Order::Dynamic(order) => {
                self.dynamic = Some(order);
                sink.emit(&AppEvent::DynamicArmed(order.opcode));
                ResponseFrame::order_done(source)
            }
            Order::Unrecognised(opcode) => {
                warn!("order {} unrecognised, answering empty frame", opcode);
                sink.emit(&AppEvent::Unrecognised(opcode));
                ResponseFrame::empty(source)
            }
            Order::Truncated(opcode) => {
                warn!(
                    "order {} carries {} parameter bytes, too few",
                    opcode,
                    frame.params().len()
                );
                sink.emit(&AppEvent::Unrecognised(opcode));
                ResponseFrame::empty(source)
            }
        };
        Some(response)
    }

    // ── Per-iteration updates ─────────────────────────────────

    /// Execute the armed one-shot order, if any.
    pub fn update_blocked_order<S: StoragePort>(
        &mut self,
        now_ms: u64,
        robot: &mut impl RobotPort,
        boot: &mut BootStateStore<S>,
        sink: &mut impl EventSink,
    ) {
        let Some((order, source)) = self.blocked else {
            return;
        };

        self.last_activity_ms = Some(now_ms);
        self.order_state = OrderState::ExecuteStart;

        match order.action() {
            BlockedAction::CrawlForward => robot.crawl_forward(),
            BlockedAction::CrawlBackward => robot.crawl_backward(),
            BlockedAction::TurnLeft => robot.turn_left(),
            BlockedAction::TurnRight => robot.turn_right(),
            BlockedAction::ActiveMode => robot.active_mode(),
            BlockedAction::SleepMode => robot.sleep_mode(),
            BlockedAction::SwitchMode => robot.switch_mode(),
            BlockedAction::EnterState(mode) => {
                persist(boot, mode, sink);
                match mode {
                    RobotMode::Install => robot.install_state(),
                    RobotMode::Calibrate => robot.calibrate_state(),
                    _ => robot.boot_state(),
                }
            }
            BlockedAction::CalibrateVerify => robot.calibrate_verify(),
            BlockedAction::Body(motion) => {
                persist(boot, RobotMode::Boot, sink);
                apply_motion(robot, motion);
            }
            BlockedAction::Unassigned(opcode) => {
                warn!("order {} has no executor, completing without action", opcode);
            }
        }

        self.blocked = None;
        self.completion_source = source;
        self.order_state = OrderState::ExecuteDone;
        sink.emit(&AppEvent::BlockedExecuted(order.opcode));
    }

    /// Produce the single `ORDER_DONE` for a finished one-shot order.
    pub fn check_blocked_order(&mut self, sink: &mut impl EventSink) -> Option<ResponseFrame> {
        if self.order_state != OrderState::ExecuteDone {
            return None;
        }
        self.order_state = OrderState::None;
        sink.emit(&AppEvent::BlockedAcknowledged(self.completion_source));
        Some(ResponseFrame::order_done(self.completion_source))
    }

    /// Re-apply the armed retargetable order, if any.
    pub fn update_dynamic_order<S: StoragePort>(
        &mut self,
        robot: &mut impl RobotPort,
        boot: &mut BootStateStore<S>,
        sink: &mut impl EventSink,
    ) {
        let Some(order) = self.dynamic else {
            return;
        };
        // Continuous steering never counts towards the idle timeout.
        self.last_activity_ms = None;
        persist(boot, RobotMode::Boot, sink);
        apply_motion(robot, order.motion());
    }

    /// Put an idle robot to sleep once the timeout has strictly elapsed.
    pub fn update_auto_sleep(
        &mut self,
        now_ms: u64,
        robot: &mut impl RobotPort,
        sink: &mut impl EventSink,
    ) {
        let Some(last) = self.last_activity_ms else {
            return;
        };
        if now_ms.saturating_sub(last) <= self.auto_sleep_overtime_ms {
            return;
        }
        let slept = robot.mode() == RobotMode::Action;
        if slept {
            info!("auto-sleep: idle for {} ms", now_ms - last);
            robot.sleep_mode();
        }
        self.last_activity_ms = None;
        sink.emit(&AppEvent::AutoSleep { slept });
    }

    /// Blocked, then dynamic, then auto-sleep.
    pub fn update_orders<S: StoragePort>(
        &mut self,
        now_ms: u64,
        robot: &mut impl RobotPort,
        boot: &mut BootStateStore<S>,
        sink: &mut impl EventSink,
    ) {
        self.update_blocked_order(now_ms, robot, boot, sink);
        self.update_dynamic_order(robot, boot, sink);
        self.update_auto_sleep(now_ms, robot, sink);
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn order_state(&self) -> OrderState {
        self.order_state
    }

    pub fn blocked_order(&self) -> Option<BlockedOrder> {
        self.blocked.map(|(order, _)| order)
    }

    pub fn dynamic_order(&self) -> Option<DynamicOrder> {
        self.dynamic
    }

    /// Timestamp of the last one-shot execution, cleared by auto-sleep and
    /// by retargetable orders.
    pub fn last_activity(&self) -> Option<u64> {
        self.last_activity_ms
    }

    pub fn order_source(&self) -> OrderSource {
        self.order_source
    }
}

// ── Internal ──────────────────────────────────────────────────

fn apply_motion(robot: &mut impl RobotPort, motion: BodyMotion) {
    match motion {
        BodyMotion::Move(p) => robot.move_body(p.x, p.y, p.z),
        BodyMotion::Rotate { x, y, angle } => robot.rotate_body(x, y, 0.0, angle),
    }
}

fn persist<S: StoragePort>(boot: &mut BootStateStore<S>, mode: RobotMode, sink: &mut impl EventSink) {
    match boot.save(mode) {
        Ok(true) => sink.emit(&AppEvent::BootStatePersisted(mode)),
        Ok(false) => {}
        Err(e) => warn!("boot state: saving {:?} failed: {}", mode, e),
    }
}
