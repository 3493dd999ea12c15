//! Quadlink Firmware: Main Entry Point
//!
//! Two execution contexts, one shared status cell.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  UartTransport   SimRobot      NvsAdapter    MonotonicClock    │
//! │  (Transport)     (RobotPort)   (Config+NVS)  (ClockPort)       │
//! │  DigitalOutputs  LogEventSink                                  │
//! │  (OutputPort)    (EventSink)                                   │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌──────────────────────────┐     ┌─────────────────────────┐  │
//! │  │ Communication (main task)│     │ UpdateService (timer)   │  │
//! │  │ framer · orders · sleep  │────▶│ kinematics · state LED  │  │
//! │  └──────────────────────────┘     └─────────────────────────┘  │
//! │                 SharedStatus (atomics)                          │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use core::time::Duration;

use anyhow::{Result, anyhow};
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{AnyIOPin, AnyOutputPin, Output, PinDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::uart::{UartDriver, config::Config as UartConfig};
use esp_idf_hal::units::Hertz;
use esp_idf_svc::timer::EspTaskTimerService;
use log::{debug, info, warn};

use quadlink::adapters::log_sink::LogEventSink;
use quadlink::adapters::nvs::NvsAdapter;
use quadlink::adapters::sim_robot::{SimKinematics, SimRobot};
use quadlink::adapters::time::MonotonicClock;
use quadlink::adapters::uart::UartTransport;
use quadlink::app::ports::{ConfigPort, RobotPort};
use quadlink::comm::{CommPorts, Communication};
use quadlink::config::SystemConfig;
use quadlink::error::Error;
use quadlink::drivers::outputs::DigitalOutputs;
use quadlink::pins;
use quadlink::scheduler::UpdateService;
use quadlink::status::SharedStatus;

/// Written by the main task, read by the update timer.
static STATUS: SharedStatus = SharedStatus::new();

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Quadlink v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let peripherals = Peripherals::take()?;

    // ── 2. Load config from NVS (or defaults) ─────────────────
    let nvs = NvsAdapter::new().map_err(Error::from)?;
    let config = match nvs.load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("NVS config load failed ({}), using defaults", e);
            SystemConfig::default()
        }
    };

    // ── 3. Digital outputs + state LED ────────────────────────
    let mut out_pins = heapless::Vec::<PinDriver<'static, AnyOutputPin, Output>, { pins::OUTPUT_COUNT }>::new();
    for gpio in pins::OUTPUT_GPIOS {
        // SAFETY: each GPIO in the output table is claimed exactly once, here.
        let pin = PinDriver::output(unsafe { AnyOutputPin::new(gpio) })?;
        out_pins
            .push(pin)
            .map_err(|_| anyhow!("output table overflow"))?;
    }
    let out_pins: [_; pins::OUTPUT_COUNT] = out_pins
        .into_array()
        .map_err(|_| anyhow!("output table incomplete"))?;
    let outputs = DigitalOutputs::new(out_pins);

    // SAFETY: the state LED GPIO is not part of the output table.
    let led_pin = PinDriver::output(unsafe { AnyOutputPin::new(pins::STATE_LED_GPIO) })?;

    // ── 4. Serial command link ────────────────────────────────
    let uart = UartDriver::new(
        peripherals.uart1,
        // SAFETY: UART pins are dedicated to the command link.
        unsafe { AnyIOPin::new(pins::UART_TX_GPIO) },
        unsafe { AnyIOPin::new(pins::UART_RX_GPIO) },
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &UartConfig::default().baudrate(Hertz(config.serial_baud)),
    )?;

    // ── 5. Driver-loop façade ─────────────────────────────────
    let mut comm = Communication::new(
        CommPorts {
            transport: UartTransport::new(uart),
            robot: SimRobot::new(),
            storage: nvs,
            outputs,
            clock: MonotonicClock::new(),
            sink: LogEventSink::new(),
        },
        &config,
        &STATUS,
    );

    // ── 6. Periodic update timer ──────────────────────────────
    let mut update = UpdateService::new(SimKinematics::default(), led_pin, &config);
    let period = update.period();
    let timer_service = EspTaskTimerService::new()?;
    let update_timer = timer_service.timer(move || update.tick(&STATUS))?;
    update_timer.every(period)?;
    info!("Update timer running every {:?}", period);

    let settle = match comm.start(&config) {
        Ok(settle) => settle,
        Err(e) => {
            warn!("Startup incomplete ({}), continuing", e);
            if comm.robot().power_auto_switch() {
                config.power_settle()
            } else {
                Duration::ZERO
            }
        }
    };
    if !settle.is_zero() {
        info!("Waiting {:?} for the power group to settle", settle);
        FreeRtos::delay_ms(settle.as_millis() as u32);
    }

    info!("System ready. Entering driver loop.");

    // ── 7. Driver loop ────────────────────────────────────────
    loop {
        let iteration = comm.run_once();
        if let Some(response) = iteration.outbound {
            // Secondary order source has no channel on this board yet.
            debug!("Unrouted response {:?}", response.as_bytes());
        }
        if let Some(e) = iteration.error {
            warn!("Driver loop: {}", e);
        }
        FreeRtos::delay_ms(1);
    }
}
