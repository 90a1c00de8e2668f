//! Task watchdog (TWDT) for the scheduler thread.
//!
//! A hung device write or network call stalls every tick.  The scheduler
//! feeds the watchdog once per tick; if ticks stop for longer than the
//! timeout the chip panics and reboots.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use log::{info, warn};

pub struct Watchdog {
    subscribed: bool,
    #[cfg(not(target_os = "espidf"))]
    feeds: core::cell::Cell<u32>,
}

impl Watchdog {
    /// Reconfigure the TWDT and subscribe the calling task.
    ///
    /// Failure is logged, not fatal: the loop still runs, unguarded.
    #[cfg(target_os = "espidf")]
    pub fn subscribe(timeout_ms: u32) -> Self {
        // SAFETY: TWDT calls from the task being subscribed; no aliasing.
        unsafe {
            let cfg = esp_task_wdt_config_t {
                timeout_ms,
                idle_core_mask: 0,
                trigger_panic: true,
            };
            let ret = esp_task_wdt_reconfigure(&cfg);
            if ret != ESP_OK as i32 {
                warn!("Watchdog: reconfigure returned {} (may already be configured)", ret);
            }

            let ret = esp_task_wdt_add(core::ptr::null_mut());
            let subscribed = ret == ESP_OK as i32;
            if subscribed {
                info!("Watchdog: subscribed ({} ms, panic on trigger)", timeout_ms);
            } else {
                warn!("Watchdog: failed to subscribe ({})", ret);
            }
            Self { subscribed }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn subscribe(timeout_ms: u32) -> Self {
        info!("Watchdog(sim): {} ms timeout not enforced", timeout_ms);
        if timeout_ms == 0 {
            warn!("Watchdog(sim): zero timeout");
        }
        Self {
            subscribed: true,
            feeds: core::cell::Cell::new(0),
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    /// Call once per scheduler tick.
    pub fn feed(&self) {
        if !self.subscribed {
            return;
        }
        #[cfg(target_os = "espidf")]
        // SAFETY: resets the TWDT entry of the subscribed calling task.
        unsafe {
            esp_task_wdt_reset();
        }
        #[cfg(not(target_os = "espidf"))]
        self.feeds.set(self.feeds.get().wrapping_add(1));
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn feeds(&self) -> u32 {
        self.feeds.get()
    }
}
