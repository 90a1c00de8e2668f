//! System configuration parameters
//!
//! All tunable parameters for the smart home controller.
//! Values are loaded from NVS at boot; secrets default from the build
//! environment so a fresh board can join the network without provisioning.

use serde::{Deserialize, Serialize};

use crate::app::messages::MAX_DEVICE_ID_LEN;
use crate::scheduler::Cadence;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Device id used in every MQTT topic (`devices/{id}/...`).
    pub device_id: String,

    pub wifi: WifiConfig,
    pub mqtt: MqttConfig,
    pub backend: BackendConfig,
    pub time: TimeConfig,

    /// Scheduler tick period (milliseconds).  Hold durations count ticks.
    pub tick_interval_ms: u32,
    pub cadences: CadenceTable,
    pub holds: HoldTimes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WifiConfig {
    pub ssid: String,
    pub password: String,
    /// Connect attempts before bring-up gives up.
    pub max_attempts: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MqttConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

/// REST backend receiving sensor logs and motion events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    pub url: String,
    pub api_key: String,
    /// Row id of this controller in the backend's device table.
    pub device_row: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeConfig {
    /// Local offset from UTC in hours.
    pub utc_offset_hours: i8,
    /// First night hour (inclusive, local time).
    pub night_start_hour: u8,
    /// First day hour (exclusive end of night, local time).
    pub night_end_hour: u8,
    pub sntp_server: String,
}

/// When each handler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CadenceTable {
    pub buttons: Cadence,
    pub motion: Cadence,
    pub rfid: Cadence,
    pub gas: Cadence,
    pub steam: Cadence,
    pub environment: Cadence,
    pub lighting: Cadence,
    pub sensor_log: Cadence,
    pub memory: Cadence,
}

impl CadenceTable {
    fn all(&self) -> [(&'static str, Cadence); 9] {
        [
            ("buttons", self.buttons),
            ("motion", self.motion),
            ("rfid", self.rfid),
            ("gas", self.gas),
            ("steam", self.steam),
            ("environment", self.environment),
            ("lighting", self.lighting),
            ("sensor_log", self.sensor_log),
            ("memory", self.memory),
        ]
    }
}

impl Default for CadenceTable {
    fn default() -> Self {
        Self {
            buttons: Cadence::EveryTick,
            motion: Cadence::every(2, 0),
            rfid: Cadence::every(2, 1),
            gas: Cadence::every(10, 0),
            steam: Cadence::every(10, 5),
            environment: Cadence::every(30, 13),
            lighting: Cadence::every(60, 17),
            sensor_log: Cadence::every(1800, 0),
            memory: Cadence::every(10, 7),
        }
    }
}

/// Ticks each handler holds a shared output per grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldTimes {
    /// Gas alarm re-assertion window.  Also the RGB fade-out after clearing.
    pub gas: u32,
    pub steam: u32,
    pub motion: u32,
    /// RGB and display feedback for a card scan or access decision.
    pub rfid_feedback: u32,
    /// Door open time after access is granted.
    pub door_open: u32,
    /// Buzzer time after access is denied.
    pub denied_buzzer: u32,
    pub button_status: u32,
    pub environment_display: u32,
    pub lighting_greeting: u32,
    /// Remote "open door" / "fan on" hold before the output idles again.
    pub remote: u32,
    /// Same card ignored for this many ticks.
    pub rfid_cooldown: u32,
}

impl Default for HoldTimes {
    fn default() -> Self {
        Self {
            gas: 10,
            steam: 10,
            motion: 3,
            rfid_feedback: 3,
            door_open: 5,
            denied_buzzer: 5,
            button_status: 3,
            environment_display: 10,
            lighting_greeting: 5,
            remote: 60,
            rfid_cooldown: 5,
        }
    }
}

impl HoldTimes {
    fn all(&self) -> [u32; 11] {
        [
            self.gas,
            self.steam,
            self.motion,
            self.rfid_feedback,
            self.door_open,
            self.denied_buzzer,
            self.button_status,
            self.environment_display,
            self.lighting_greeting,
            self.remote,
            self.rfid_cooldown,
        ]
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            device_id: option_env!("SMARTHOME_DEVICE_ID")
                .unwrap_or("esp32-lab")
                .into(),
            wifi: WifiConfig {
                ssid: option_env!("SMARTHOME_WIFI_SSID").unwrap_or("CHANGE_ME").into(),
                password: option_env!("SMARTHOME_WIFI_PASS").unwrap_or("").into(),
                max_attempts: 10,
            },
            mqtt: MqttConfig {
                host: option_env!("SMARTHOME_MQTT_HOST")
                    .unwrap_or("broker.hivemq.com")
                    .into(),
                port: 1883,
                username: option_env!("SMARTHOME_MQTT_USER").unwrap_or("").into(),
                password: option_env!("SMARTHOME_MQTT_PASS").unwrap_or("").into(),
            },
            backend: BackendConfig {
                url: option_env!("SMARTHOME_BACKEND_URL").unwrap_or("").into(),
                api_key: option_env!("SMARTHOME_BACKEND_KEY").unwrap_or("").into(),
                device_row: 1,
            },
            time: TimeConfig {
                utc_offset_hours: 10,
                night_start_hour: 20,
                night_end_hour: 7,
                sntp_server: "pool.ntp.org".into(),
            },
            tick_interval_ms: 1000,
            cadences: CadenceTable::default(),
            holds: HoldTimes::default(),
        }
    }
}

impl SystemConfig {
    /// Reject values the scheduler cannot run with.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.device_id.is_empty() {
            return Err("device_id is empty");
        }
        if self.device_id.len() > MAX_DEVICE_ID_LEN {
            log::warn!(
                "config: device_id is {} bytes, inbound topics allow {}",
                self.device_id.len(),
                MAX_DEVICE_ID_LEN
            );
            return Err("device_id too long for inbound topics");
        }
        if self.tick_interval_ms == 0 {
            return Err("tick_interval_ms is zero");
        }
        if self.wifi.max_attempts == 0 {
            return Err("wifi.max_attempts is zero");
        }
        for (name, cadence) in self.cadences.all() {
            if let Cadence::Every { period, offset } = cadence {
                if period == 0 {
                    log::warn!("config: cadence '{}' has a zero period", name);
                    return Err("cadence period is zero");
                }
                if offset >= period {
                    log::warn!("config: cadence '{}' offset {} >= period {}", name, offset, period);
                    return Err("cadence offset >= period");
                }
            }
        }
        if self.holds.all().contains(&0) {
            return Err("hold time is zero");
        }
        if self.time.night_start_hour > 23 || self.time.night_end_hour > 23 {
            return Err("night hour out of range");
        }
        if !(-12..=14).contains(&self.time.utc_offset_hours) {
            return Err("utc offset out of range");
        }
        Ok(())
    }
}
