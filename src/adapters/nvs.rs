//! Flash-backed key/value adapter.
//!
//! Implements both [`ConfigPort`] and [`StoragePort`]. The config blob
//! (postcard-encoded [`SystemConfig`]) sits in its own namespace; the
//! boot-state byte is written through [`StoragePort`] by
//! [`BootStateStore`](crate::boot_state::BootStateStore) under `robot`.
//!
//! On target every call opens the namespace through `EspNvs` and lets it
//! go again, so nothing stays locked between driver-loop iterations. On
//! the host the backend is an in-memory map keyed `namespace::key`.

use log::info;
#[cfg(target_os = "espidf")]
use log::warn;

use crate::app::ports::{ConfigError, ConfigPort, StorageError, StoragePort};
use crate::config::SystemConfig;

#[cfg(target_os = "espidf")]
use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs, NvsDefault};
#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::{ESP_ERR_NVS_NOT_ENOUGH_SPACE, ESP_ERR_NVS_NOT_FOUND, EspError};

#[cfg(not(target_os = "espidf"))]
use std::{cell::RefCell, collections::HashMap};

const CONFIG_NAMESPACE: &str = "quadlink";
const CONFIG_KEY: &str = "syscfg";

/// Largest config blob accepted on load.
const MAX_CONFIG_BLOB: usize = 128;

pub struct NvsAdapter {
    #[cfg(target_os = "espidf")]
    partition: EspDefaultNvsPartition,
    #[cfg(not(target_os = "espidf"))]
    store: RefCell<HashMap<String, Vec<u8>>>,
}

impl NvsAdapter {
    /// Take the default NVS partition (target) or start an empty map (host).
    ///
    /// Taking the partition initialises flash, erasing it first when the
    /// layout is stale.
    pub fn new() -> Result<Self, ConfigError> {
        #[cfg(target_os = "espidf")]
        {
            let partition = EspDefaultNvsPartition::take().map_err(|e| {
                warn!("nvs: partition unavailable ({})", e);
                ConfigError::IoError
            })?;
            info!("nvs: default partition ready");
            Ok(Self { partition })
        }

        #[cfg(not(target_os = "espidf"))]
        {
            info!("nvs: in-memory backend");
            Ok(Self {
                store: RefCell::new(HashMap::new()),
            })
        }
    }

    #[cfg(target_os = "espidf")]
    fn open(&self, namespace: &str, writable: bool) -> Result<EspNvs<NvsDefault>, StorageError> {
        EspNvs::new(self.partition.clone(), namespace, writable).map_err(storage_error)
    }

    #[cfg(not(target_os = "espidf"))]
    fn slot(namespace: &str, key: &str) -> String {
        format!("{}::{}", namespace, key)
    }
}

#[cfg(target_os = "espidf")]
fn storage_error(e: EspError) -> StorageError {
    match e.code() as u32 {
        ESP_ERR_NVS_NOT_FOUND => StorageError::NotFound,
        ESP_ERR_NVS_NOT_ENOUGH_SPACE => StorageError::Full,
        _ => StorageError::IoError,
    }
}

impl ConfigPort for NvsAdapter {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        let mut buf = [0u8; MAX_CONFIG_BLOB];
        match self.read(CONFIG_NAMESPACE, CONFIG_KEY, &mut buf) {
            Ok(len) => {
                let config: SystemConfig =
                    postcard::from_bytes(&buf[..len]).map_err(|_| ConfigError::Corrupted)?;
                config.validate()?;
                info!("nvs: loaded config ({} bytes)", len);
                Ok(config)
            }
            Err(StorageError::NotFound) => {
                info!("nvs: no stored config, using defaults");
                Ok(SystemConfig::default())
            }
            Err(_) => Err(ConfigError::IoError),
        }
    }

    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;
        let len = bytes.len();

        #[cfg(target_os = "espidf")]
        {
            let mut nvs = self
                .open(CONFIG_NAMESPACE, true)
                .map_err(|_| ConfigError::IoError)?;
            nvs.set_raw(CONFIG_KEY, &bytes).map_err(|e| {
                warn!("nvs: config write failed ({})", e);
                ConfigError::IoError
            })?;
        }

        #[cfg(not(target_os = "espidf"))]
        self.store
            .borrow_mut()
            .insert(Self::slot(CONFIG_NAMESPACE, CONFIG_KEY), bytes);

        info!("nvs: config saved ({} bytes)", len);
        Ok(())
    }
}

impl StoragePort for NvsAdapter {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        #[cfg(target_os = "espidf")]
        {
            let nvs = self.open(namespace, false)?;
            let data = nvs
                .get_raw(key, buf)
                .map_err(storage_error)?
                .ok_or(StorageError::NotFound)?;
            Ok(data.len())
        }

        #[cfg(not(target_os = "espidf"))]
        {
            let store = self.store.borrow();
            let data = store
                .get(&Self::slot(namespace, key))
                .ok_or(StorageError::NotFound)?;
            let len = data.len().min(buf.len());
            buf[..len].copy_from_slice(&data[..len]);
            Ok(len)
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        #[cfg(target_os = "espidf")]
        {
            let mut nvs = self.open(namespace, true)?;
            nvs.set_raw(key, data).map_err(storage_error)?;
            Ok(())
        }

        #[cfg(not(target_os = "espidf"))]
        {
            self.store
                .borrow_mut()
                .insert(Self::slot(namespace, key), data.to_vec());
            Ok(())
        }
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        #[cfg(target_os = "espidf")]
        {
            match self.open(namespace, true) {
                Ok(mut nvs) => nvs.remove(key).map(|_| ()).map_err(storage_error),
                // Nothing was ever written to this namespace.
                Err(StorageError::NotFound) => Ok(()),
                Err(e) => Err(e),
            }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            self.store.borrow_mut().remove(&Self::slot(namespace, key));
            Ok(())
        }
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        #[cfg(target_os = "espidf")]
        {
            self.open(namespace, false)
                .and_then(|nvs| nvs.contains(key).map_err(storage_error))
                .unwrap_or(false)
        }

        #[cfg(not(target_os = "espidf"))]
        {
            self.store
                .borrow()
                .contains_key(&Self::slot(namespace, key))
        }
    }
}
