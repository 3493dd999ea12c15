//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing one line per application event to
//! the logger (UART / USB-CDC in production, whatever the host installs
//! otherwise).

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(mode) => info!("START | mode={:?}", mode),
            AppEvent::OrderDropped { opcode, source } => {
                debug!("ORDER | dropped op={} from {:?} (busy)", opcode, source);
            }
            AppEvent::BlockedArmed(op) => info!("ORDER | armed one-shot op={}", op),
            AppEvent::DynamicArmed(op) => debug!("ORDER | retarget op={}", op),
            AppEvent::BlockedExecuted(op) => info!("ORDER | executed op={}", op),
            AppEvent::BlockedAcknowledged(source) => debug!("ORDER | done -> {:?}", source),
            AppEvent::Unrecognised(op) => warn!("ORDER | unrecognised op={}", op),
            AppEvent::AutoSleep { slept } => info!("IDLE  | timeout, slept={}", slept),
            AppEvent::BootStatePersisted(mode) => info!("BOOT  | persisted {:?}", mode),
            AppEvent::FrameDiscarded { total } => warn!("LINK  | oversized frame discarded ({} total)", total),
        }
    }
}
