//! Wall-clock adapter.
//!
//! [`SystemClock`] implements [`ClockPort`] from the std system time, which
//! on ESP-IDF is the newlib clock that SNTP disciplines.  Until the first
//! sync it reads near 1970, which the core treats as "not synced".
//!
//! - **`target_os = "espidf"`**: [`start_sntp`] starts the ESP-IDF SNTP
//!   client against the configured server.
//! - **all other targets**: the host clock is already correct.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::app::ports::ClockPort;

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl ClockPort for SystemClock {
    fn epoch_secs(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Start background time sync.  Failure is logged and ignored; the loop
/// runs without local time until a later boot succeeds.
#[cfg(target_os = "espidf")]
pub fn start_sntp(server: &str) -> Option<esp_idf_svc::sntp::EspSntp<'_>> {
    use esp_idf_svc::sntp::{EspSntp, SntpConf};

    let mut conf = SntpConf::default();
    conf.servers[0] = server;
    match EspSntp::new(&conf) {
        Ok(sntp) => {
            log::info!("SNTP: syncing with {}", server);
            Some(sntp)
        }
        Err(e) => {
            log::warn!("SNTP: start failed: {}", e);
            None
        }
    }
}
