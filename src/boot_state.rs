//! Boot-state store: the single persisted mode byte.
//!
//! | byte | mode      |
//! |------|-----------|
//! | 0    | Install   |
//! | 1    | Calibrate |
//! | 2    | Boot      |
//!
//! The byte is rewritten only when it changes, so repeated saves of the
//! same mode (the retargetable body orders save Boot every tick) cost a
//! read and no flash wear.

use log::{info, warn};

use crate::app::ports::{RobotPort, StorageError, StoragePort};
use crate::robot::RobotMode;

const BOOT_NAMESPACE: &str = "robot";
const BOOT_KEY: &str = "boot_state";

/// Owns the storage backend holding the boot-state byte.
pub struct BootStateStore<S: StoragePort> {
    storage: S,
}

impl<S: StoragePort> BootStateStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Persist `mode` if it differs from the stored byte.
    ///
    /// Returns `Ok(true)` when a write happened. [`RobotMode::Action`] is
    /// never persisted and always yields `Ok(false)`.
    pub fn save(&mut self, mode: RobotMode) -> Result<bool, StorageError> {
        if !mode.is_persisted() {
            return Ok(false);
        }
        let code = mode.as_u8();
        if self.stored_byte()? == Some(code) {
            return Ok(false);
        }
        self.storage.write(BOOT_NAMESPACE, BOOT_KEY, &[code])?;
        info!("boot state: persisted {:?}", mode);
        Ok(true)
    }

    /// Read the persisted mode. A missing key or an unmapped byte is `None`.
    pub fn load(&self) -> Result<Option<RobotMode>, StorageError> {
        Ok(self
            .stored_byte()?
            .and_then(RobotMode::from_u8)
            .filter(|mode| mode.is_persisted()))
    }

    /// Put the robot into the persisted mode, falling back to Boot.
    ///
    /// Returns the mode that was entered.
    pub fn restore(&self, robot: &mut impl RobotPort) -> RobotMode {
        let mode = match self.load() {
            Ok(Some(mode)) => mode,
            Ok(None) => {
                warn!("boot state: nothing usable stored, resuming Boot");
                RobotMode::Boot
            }
            Err(e) => {
                warn!("boot state: read failed ({}), resuming Boot", e);
                RobotMode::Boot
            }
        };
        match mode {
            RobotMode::Install => robot.install_state(),
            RobotMode::Calibrate => robot.calibrate_state(),
            _ => robot.boot_state(),
        }
        mode
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_inner(self) -> S {
        self.storage
    }

    fn stored_byte(&self) -> Result<Option<u8>, StorageError> {
        let mut buf = [0u8; 1];
        match self.storage.read(BOOT_NAMESPACE, BOOT_KEY, &mut buf) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(buf[0])),
            Err(StorageError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
