//! WiFi station bring-up.
//!
//! Runs once before the scheduler starts.  Each attempt is a full
//! configure/start/connect/netif-up cycle; after `max_attempts` failures
//! bring-up is fatal.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `BlockingWifi<EspWifi>` from `esp_idf_svc::wifi`.
//! - **all other targets**: credentials are validated, then the link is up.

use log::{info, warn};

use crate::config::WifiConfig;
use crate::error::CommsError;

/// Delay between failed attempts.
pub const RETRY_DELAY_MS: u64 = 2_000;

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

/// SSID 1-32 printable bytes; password empty (open) or 8-64 bytes.
pub fn validate_credentials(cfg: &WifiConfig) -> Result<(), CommsError> {
    if cfg.ssid.is_empty() || cfg.ssid.len() > 32 || !is_printable_ascii(&cfg.ssid) {
        warn!("WiFi: SSID must be 1-32 printable ASCII bytes");
        return Err(CommsError::WifiConnectFailed);
    }
    if !cfg.password.is_empty() && !(8..=64).contains(&cfg.password.len()) {
        warn!("WiFi: password must be empty or 8-64 bytes");
        return Err(CommsError::WifiConnectFailed);
    }
    Ok(())
}

/// Call `attempt` until it succeeds or `max_attempts` calls have failed.
/// Returns the 1-based attempt that succeeded.
pub fn with_retries<E: core::fmt::Display>(
    max_attempts: u8,
    mut attempt: impl FnMut(u8) -> Result<(), E>,
    mut pause: impl FnMut(),
) -> Result<u8, CommsError> {
    for n in 1..=max_attempts {
        match attempt(n) {
            Ok(()) => return Ok(n),
            Err(e) => {
                warn!("WiFi: attempt {}/{} failed: {}", n, max_attempts, e);
                if n < max_attempts {
                    pause();
                }
            }
        }
    }
    Err(CommsError::WifiConnectFailed)
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF station
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub type WifiLink = esp_idf_svc::wifi::BlockingWifi<esp_idf_svc::wifi::EspWifi<'static>>;

#[cfg(target_os = "espidf")]
pub fn connect(
    modem: esp_idf_hal::modem::Modem,
    sysloop: esp_idf_svc::eventloop::EspSystemEventLoop,
    nvs: esp_idf_svc::nvs::EspDefaultNvsPartition,
    cfg: &WifiConfig,
) -> Result<WifiLink, CommsError> {
    use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};

    validate_credentials(cfg)?;
    let init = |e: esp_idf_svc::sys::EspError| {
        warn!("WiFi: driver init failed: {}", e);
        CommsError::WifiConnectFailed
    };
    let mut wifi = BlockingWifi::wrap(EspWifi::new(modem, sysloop.clone(), Some(nvs)).map_err(init)?, sysloop)
        .map_err(init)?;

    let client = ClientConfiguration {
        ssid: cfg.ssid.as_str().try_into().map_err(|_| CommsError::WifiConnectFailed)?,
        password: cfg.password.as_str().try_into().map_err(|_| CommsError::WifiConnectFailed)?,
        auth_method: if cfg.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        },
        ..Default::default()
    };
    wifi.set_configuration(&Configuration::Client(client)).map_err(init)?;

    info!("WiFi: connecting to '{}'", cfg.ssid);
    with_retries(
        cfg.max_attempts,
        |_| -> Result<(), esp_idf_svc::sys::EspError> {
            if !wifi.is_started()? {
                wifi.start()?;
            }
            if let Err(e) = wifi.connect().and_then(|()| wifi.wait_netif_up()) {
                let _ = wifi.disconnect();
                return Err(e);
            }
            Ok(())
        },
        || std::thread::sleep(std::time::Duration::from_millis(RETRY_DELAY_MS)),
    )?;

    match wifi.wifi().sta_netif().get_ip_info() {
        Ok(ip) => info!("WiFi: connected, IP {}", ip.ip),
        Err(e) => warn!("WiFi: connected, IP unknown: {}", e),
    }
    Ok(wifi)
}

// ───────────────────────────────────────────────────────────────
// Host stand-in
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
#[derive(Debug)]
pub struct WifiLink {
    pub ssid: String,
}

#[cfg(not(target_os = "espidf"))]
pub fn connect(cfg: &WifiConfig) -> Result<WifiLink, CommsError> {
    validate_credentials(cfg)?;
    info!("WiFi(sim): connected to '{}'", cfg.ssid);
    Ok(WifiLink {
        ssid: cfg.ssid.clone(),
    })
}
