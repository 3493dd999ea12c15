//! Driver loop end to end: bytes in on the loopback link, bytes out.

use core::time::Duration;

use quadlink::app::events::AppEvent;
use quadlink::app::ports::OutputError;
use quadlink::comm::{CommPorts, Communication, Iteration};
use quadlink::config::SystemConfig;
use quadlink::error::Error;
use quadlink::protocol::codec::{FRAME_CAPACITY, Frame, ResponseFrame};
use quadlink::protocol::orders::*;
use quadlink::protocol::transport::OrderSource;
use quadlink::robot::RobotMode;
use quadlink::status::SharedStatus;

use crate::mock_hw::{
    LoopbackTransport, ManualClock, MockOutputs, MockRobot, MockStorage, RecordingSink, RobotCall,
};

type TestComm<'a> = Communication<
    'a,
    LoopbackTransport,
    MockRobot,
    MockStorage,
    MockOutputs,
    ManualClock,
    RecordingSink,
>;

fn comm_with(robot: MockRobot, clock: ManualClock, status: &SharedStatus) -> TestComm<'_> {
    Communication::new(
        CommPorts {
            transport: LoopbackTransport::new(),
            robot,
            storage: MockStorage::new(),
            outputs: MockOutputs::new(),
            clock,
            sink: RecordingSink::new(),
        },
        &SystemConfig::default(),
        status,
    )
}

fn started(status: &SharedStatus) -> TestComm<'_> {
    let mut comm = comm_with(MockRobot::new(), ManualClock::at(0), status);
    comm.start(&SystemConfig::default()).unwrap();
    comm
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn start_clears_outputs_and_publishes_status() {
    let status = SharedStatus::new();
    status.publish(RobotMode::Action, true);
    let mut robot = MockRobot::new();
    robot.power_fault = true;
    let mut comm = comm_with(robot, ManualClock::at(0), &status);

    assert_eq!(comm.start(&SystemConfig::default()), Ok(Duration::ZERO));
    assert_eq!(comm.outputs().levels, [Some(false); 8]);
    let snapshot = status.snapshot();
    assert_eq!(snapshot.mode, RobotMode::Boot);
    assert!(snapshot.power_fault);
}

#[test]
fn start_asks_for_settle_delay_when_power_switches_itself() {
    let status = SharedStatus::new();
    let mut robot = MockRobot::new();
    robot.power_auto_switch = true;
    let mut comm = comm_with(robot, ManualClock::at(0), &status);
    assert_eq!(comm.start(&SystemConfig::default()), Ok(Duration::from_millis(1_000)));
}

#[test]
fn start_restores_mode_even_when_outputs_fail() {
    let status = SharedStatus::new();
    status.publish(RobotMode::Action, false);
    let mut comm = comm_with(MockRobot::new(), ManualClock::at(0), &status);
    comm.outputs_mut().fail_writes = true;

    assert_eq!(
        comm.start(&SystemConfig::default()),
        Err(Error::Output(OutputError::WriteFailed))
    );
    assert_eq!(comm.robot().calls, vec![RobotCall::BootState]);
    assert_eq!(status.snapshot().mode, RobotMode::Boot);
    assert!(comm.sink().contains(&AppEvent::Started(RobotMode::Boot)));
}

// ── Serial round trips ────────────────────────────────────────

#[test]
fn serial_voltage_query() {
    let status = SharedStatus::new();
    let mut comm = started(&status);
    comm.transport_mut()
        .inject(&[TRANS_START, REQUEST_SUPPLY_VOLTAGE, TRANS_END]);

    assert_eq!(comm.run_once(), Iteration::default());
    assert_eq!(
        comm.transport_mut().take_tx(),
        vec![TRANS_START, SUPPLY_VOLTAGE, 5, 100, TRANS_END]
    );
}

#[test]
fn frame_split_across_iterations() {
    let status = SharedStatus::new();
    let mut comm = started(&status);

    comm.transport_mut().inject(&[TRANS_START, REQUEST_MOVE_LEG, 1]);
    assert!(comm.run_once().is_ok());
    assert!(comm.transport_mut().take_tx().is_empty());

    comm.transport_mut().inject(&[64, 64, 64, TRANS_END]);
    assert!(comm.run_once().is_ok());
    assert_eq!(
        comm.transport_mut().take_tx(),
        vec![TRANS_START, ORDER_DONE, TRANS_END]
    );
}

#[test]
fn one_shot_order_answers_start_then_done() {
    let status = SharedStatus::new();
    let mut comm = started(&status);
    comm.transport_mut()
        .inject(&[TRANS_START, REQUEST_TURN_LEFT, TRANS_END]);

    assert!(comm.run_once().is_ok());
    assert_eq!(
        comm.transport_mut().take_tx(),
        vec![TRANS_START, ORDER_START, TRANS_END]
    );
    assert_eq!(comm.robot().last_call(), Some(&RobotCall::TurnLeft));

    assert!(comm.run_once().is_ok());
    assert_eq!(
        comm.transport_mut().take_tx(),
        vec![TRANS_START, ORDER_DONE, TRANS_END]
    );

    assert!(comm.run_once().is_ok());
    assert!(comm.transport_mut().take_tx().is_empty());
}

#[test]
fn one_frame_per_iteration() {
    let status = SharedStatus::new();
    let mut comm = started(&status);
    comm.transport_mut().inject(&[
        TRANS_START, REQUEST_ECHO, TRANS_END, TRANS_START, REQUEST_ECHO, TRANS_END,
    ]);

    assert!(comm.run_once().is_ok());
    assert_eq!(comm.transport_mut().take_tx(), vec![TRANS_START, ECHO, TRANS_END]);
    assert_eq!(comm.transport().pending_rx(), 3);

    assert!(comm.run_once().is_ok());
    assert_eq!(comm.transport_mut().take_tx(), vec![TRANS_START, ECHO, TRANS_END]);
}

#[test]
fn active_mode_is_published_to_status() {
    let status = SharedStatus::new();
    let mut comm = started(&status);
    comm.transport_mut()
        .inject(&[TRANS_START, REQUEST_ACTIVE_MODE, TRANS_END]);
    assert!(comm.run_once().is_ok());
    assert_eq!(status.snapshot().mode, RobotMode::Action);
}

#[test]
fn idle_robot_is_put_to_sleep_by_the_loop() {
    let status = SharedStatus::new();
    let clock = ManualClock::at(0);
    let mut comm = comm_with(MockRobot::new(), clock.clone(), &status);
    comm.start(&SystemConfig::default()).unwrap();

    clock.set(500);
    comm.transport_mut()
        .inject(&[TRANS_START, REQUEST_ACTIVE_MODE, TRANS_END]);
    assert!(comm.run_once().is_ok());

    clock.set(10_500);
    assert!(comm.run_once().is_ok());
    assert_eq!(comm.robot().count(&RobotCall::SleepMode), 0);

    clock.advance(1);
    assert!(comm.run_once().is_ok());
    assert_eq!(comm.robot().count(&RobotCall::SleepMode), 1);
}

// ── Secondary source ──────────────────────────────────────────

#[test]
fn wireless_responses_are_returned_not_written() {
    let status = SharedStatus::new();
    let mut comm = started(&status);
    let frame = Frame::from_bytes(&[TRANS_START, REQUEST_ECHO, TRANS_END]).unwrap();

    let reply = comm.handle_order(&frame, OrderSource::Wireless).unwrap();
    assert_eq!(reply, Some(ResponseFrame::echo(OrderSource::Wireless)));
    assert!(comm.transport_mut().take_tx().is_empty());
}

#[test]
fn wireless_one_shot_ack_is_returned_by_the_loop() {
    let status = SharedStatus::new();
    let mut comm = started(&status);
    let frame = Frame::from_bytes(&[TRANS_START, REQUEST_CRAWL_BACKWARD, TRANS_END]).unwrap();

    let start = comm.handle_order(&frame, OrderSource::Wireless).unwrap();
    assert_eq!(start, Some(ResponseFrame::order_start(OrderSource::Wireless)));

    assert_eq!(comm.run_once(), Iteration::default());
    assert_eq!(
        comm.run_once(),
        Iteration {
            outbound: Some(ResponseFrame::order_done(OrderSource::Wireless)),
            error: None,
        }
    );
    assert!(comm.transport_mut().take_tx().is_empty());
}

#[test]
fn serial_frame_is_dropped_while_wireless_order_is_armed() {
    let status = SharedStatus::new();
    let mut comm = started(&status);
    let frame = Frame::from_bytes(&[TRANS_START, REQUEST_SWITCH_MODE, TRANS_END]).unwrap();
    comm.handle_order(&frame, OrderSource::Wireless).unwrap();

    // The serial step runs before the order update in the same iteration.
    comm.transport_mut()
        .inject(&[TRANS_START, REQUEST_ECHO, TRANS_END]);
    assert!(comm.run_once().is_ok());

    assert!(comm.transport_mut().take_tx().is_empty());
    assert!(comm.sink().contains(&AppEvent::OrderDropped {
        opcode: REQUEST_ECHO,
        source: OrderSource::Serial,
    }));
}

#[test]
fn wireless_ack_survives_serial_write_failure() {
    let status = SharedStatus::new();
    let mut comm = started(&status);
    let frame = Frame::from_bytes(&[TRANS_START, REQUEST_CRAWL_BACKWARD, TRANS_END]).unwrap();
    comm.handle_order(&frame, OrderSource::Wireless).unwrap();
    assert_eq!(comm.run_once(), Iteration::default());

    // The serial echo fails in the same iteration the ack comes due.
    comm.transport_mut().fail_writes = true;
    comm.transport_mut()
        .inject(&[TRANS_START, REQUEST_ECHO, TRANS_END]);

    let first = comm.run_once();
    assert!(matches!(first.error, Some(Error::Transport(_))));
    assert_eq!(
        first.outbound,
        Some(ResponseFrame::order_done(OrderSource::Wireless))
    );

    let later = (0..5).filter(|_| comm.run_once().outbound.is_some()).count();
    assert_eq!(later, 0);
    assert!(comm.sink().contains(&AppEvent::BlockedAcknowledged(OrderSource::Wireless)));
}

// ── Faults ────────────────────────────────────────────────────

#[test]
fn overflow_is_reported_and_link_recovers() {
    let status = SharedStatus::new();
    let mut comm = started(&status);

    let mut junk = vec![TRANS_START];
    junk.extend(std::iter::repeat_n(7u8, FRAME_CAPACITY + 4));
    comm.transport_mut().inject(&junk);
    assert!(comm.run_once().is_ok());
    assert!(comm.transport_mut().take_tx().is_empty());
    assert!(comm.sink().contains(&AppEvent::FrameDiscarded { total: 1 }));

    comm.transport_mut()
        .inject(&[TRANS_START, REQUEST_ECHO, TRANS_END]);
    assert!(comm.run_once().is_ok());
    assert_eq!(comm.transport_mut().take_tx(), vec![TRANS_START, ECHO, TRANS_END]);
    assert_eq!(comm.decoder().discarded(), 1);
}

#[test]
fn write_failure_is_returned_but_orders_still_advance() {
    let status = SharedStatus::new();
    let mut comm = started(&status);
    comm.transport_mut().fail_writes = true;
    comm.transport_mut()
        .inject(&[TRANS_START, REQUEST_CRAWL_FORWARD, TRANS_END]);

    assert!(matches!(comm.run_once().error, Some(Error::Transport(_))));
    // The order was armed before the write failed and executes this tick.
    assert_eq!(comm.robot().calls.last(), Some(&RobotCall::CrawlForward));

    comm.transport_mut().fail_writes = false;
    assert_eq!(comm.run_once(), Iteration::default());
    assert_eq!(
        comm.transport_mut().take_tx(),
        vec![TRANS_START, ORDER_DONE, TRANS_END]
    );
}

#[test]
fn read_failure_drops_the_partial_frame() {
    let status = SharedStatus::new();
    let mut comm = started(&status);
    comm.transport_mut().inject(&[TRANS_START, REQUEST_ECHO]);
    assert!(comm.run_once().is_ok());
    assert_eq!(comm.decoder().buffered(), 2);

    comm.transport_mut().fail_reads = true;
    comm.transport_mut().inject(&[TRANS_END]);
    assert!(matches!(comm.run_once().error, Some(Error::Transport(_))));
    assert_eq!(comm.decoder().buffered(), 0);

    // The END that follows the fault must not complete the old frame.
    comm.transport_mut().fail_reads = false;
    assert!(comm.run_once().is_ok());
    assert!(comm.transport_mut().take_tx().is_empty());

    comm.transport_mut()
        .inject(&[TRANS_START, REQUEST_ECHO, TRANS_END]);
    assert!(comm.run_once().is_ok());
    assert_eq!(comm.transport_mut().take_tx(), vec![TRANS_START, ECHO, TRANS_END]);
}
