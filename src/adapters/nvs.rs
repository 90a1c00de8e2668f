//! NVS (Non-Volatile Storage) config store.
//!
//! Implements [`ConfigPort`]: the whole [`SystemConfig`] is one `postcard`
//! blob under `smarthome/syscfg`.  Writes are validated first and committed
//! atomically by `nvs_commit()`.  Host builds keep the blob in memory.

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::SystemConfig;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
const CONFIG_NAMESPACE: &[u8] = b"smarthome\0";
#[cfg(target_os = "espidf")]
const CONFIG_KEY: &[u8] = b"syscfg\0";

const MAX_BLOB_SIZE: usize = 2000;

pub struct NvsConfigStore {
    #[cfg(not(target_os = "espidf"))]
    blob: Option<Vec<u8>>,
}

impl NvsConfigStore {
    /// Initialise NVS flash.  A full or outdated partition is erased and
    /// re-initialised.
    pub fn new() -> Result<Self, ConfigError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: called from the main task before any other NVS user.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES as i32 || ret == ESP_ERR_NVS_NEW_VERSION_FOUND as i32 {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK as i32 || unsafe { nvs_flash_init() } != ESP_OK as i32 {
                    return Err(ConfigError::IoError);
                }
            } else if ret != ESP_OK as i32 {
                return Err(ConfigError::IoError);
            }
            info!("NVS: initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NVS(sim): in-memory store");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            blob: None,
        })
    }

    /// Stored config, or defaults when missing or unreadable.
    pub fn load_or_default(&self) -> SystemConfig {
        match self.load() {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("NVS: {}, using defaults", e);
                SystemConfig::default()
            }
        }
    }

    fn decode(bytes: &[u8]) -> Result<SystemConfig, ConfigError> {
        let cfg: SystemConfig = postcard::from_bytes(bytes).map_err(|_| ConfigError::Corrupted)?;
        cfg.validate().map_err(ConfigError::ValidationFailed)?;
        Ok(cfg)
    }

    #[cfg(target_os = "espidf")]
    fn with_handle<T>(write: bool, f: impl FnOnce(nvs_handle_t) -> Result<T, i32>) -> Result<T, i32> {
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };
        let mut handle: nvs_handle_t = 0;
        // SAFETY: namespace is NUL-terminated; handle is closed below.
        let ret = unsafe { nvs_open(CONFIG_NAMESPACE.as_ptr().cast(), mode, &mut handle) };
        if ret != ESP_OK as i32 {
            return Err(ret);
        }
        let result = f(handle);
        unsafe { nvs_close(handle) };
        result
    }
}

impl ConfigPort for NvsConfigStore {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        #[cfg(not(target_os = "espidf"))]
        {
            match &self.blob {
                Some(bytes) => Self::decode(bytes),
                None => Ok(SystemConfig::default()),
            }
        }

        #[cfg(target_os = "espidf")]
        {
            let read = Self::with_handle(false, |handle| {
                let mut size: usize = 0;
                // SAFETY: a null buffer asks NVS for the blob size only.
                let ret = unsafe {
                    nvs_get_blob(handle, CONFIG_KEY.as_ptr().cast(), core::ptr::null_mut(), &mut size)
                };
                if ret != ESP_OK as i32 {
                    return Err(ret);
                }
                if size == 0 || size > MAX_BLOB_SIZE {
                    return Err(ESP_FAIL as i32);
                }
                let mut buf = vec![0u8; size];
                let ret = unsafe {
                    nvs_get_blob(handle, CONFIG_KEY.as_ptr().cast(), buf.as_mut_ptr().cast(), &mut size)
                };
                if ret != ESP_OK as i32 {
                    return Err(ret);
                }
                Ok(buf)
            });
            match read {
                Ok(bytes) => {
                    info!("NVS: loaded config ({} bytes)", bytes.len());
                    Self::decode(&bytes)
                }
                Err(e) if e == ESP_ERR_NVS_NOT_FOUND as i32 => {
                    info!("NVS: no stored config, using defaults");
                    Ok(SystemConfig::default())
                }
                Err(e) => {
                    warn!("NVS: read error {}", e);
                    Err(ConfigError::IoError)
                }
            }
        }
    }

    fn save(&mut self, config: &SystemConfig) -> Result<(), ConfigError> {
        config.validate().map_err(ConfigError::ValidationFailed)?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;
        if bytes.len() > MAX_BLOB_SIZE {
            return Err(ConfigError::ValidationFailed("config blob too large"));
        }

        #[cfg(not(target_os = "espidf"))]
        {
            info!("NVS(sim): config saved ({} bytes)", bytes.len());
            self.blob = Some(bytes);
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let written = Self::with_handle(true, |handle| {
                // SAFETY: key is NUL-terminated; bytes outlives the call.
                let ret = unsafe {
                    nvs_set_blob(handle, CONFIG_KEY.as_ptr().cast(), bytes.as_ptr().cast(), bytes.len())
                };
                if ret != ESP_OK as i32 {
                    return Err(ret);
                }
                match unsafe { nvs_commit(handle) } {
                    r if r == ESP_OK as i32 => Ok(()),
                    r => Err(r),
                }
            });
            written.map_err(|e| {
                warn!("NVS: write error {}", e);
                ConfigError::IoError
            })?;
            info!("NVS: config saved ({} bytes)", bytes.len());
            Ok(())
        }
    }
}
