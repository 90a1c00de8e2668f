//! MQTT topic layout and the JSON message schema.
//!
//! Outbound messages borrow their strings so building one never allocates;
//! `serde_json` renders them into a `Vec<u8>` at publish time.

use serde::{Deserialize, Serialize};

use super::ports::MAX_TOPIC_LEN;

// ── Topics ────────────────────────────────────────────────────

/// Longest device id whose subscribed topics all fit an [`Inbound`](super::ports::Inbound).
/// `control/window` is the longest inbound suffix.
pub const MAX_DEVICE_ID_LEN: usize = MAX_TOPIC_LEN - "devices//control/window".len();

/// Every topic the controller publishes or subscribes to, derived from the
/// device id once at boot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topics {
    pub sensor_data: String,
    pub rfid_check: String,
    pub status_door: String,
    pub status_window: String,
    pub status_fan: String,
    pub rfid_response: String,
    pub control_door: String,
    pub control_window: String,
    pub control_fan: String,
}

impl Topics {
    pub fn for_device(device_id: &str) -> Self {
        let t = |suffix: &str| format!("devices/{device_id}/{suffix}");
        Self {
            sensor_data: t("data"),
            rfid_check: t("rfid/check"),
            status_door: t("status/door"),
            status_window: t("status/window"),
            status_fan: t("status/fan"),
            rfid_response: t("rfid/response"),
            control_door: t("control/door"),
            control_window: t("control/window"),
            control_fan: t("control/fan"),
        }
    }
}

// ── Outbound ──────────────────────────────────────────────────

/// A reading or detection on `devices/{id}/data`.
#[derive(Debug, Clone, Serialize)]
pub struct SensorData<'a> {
    pub sensor_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<&'a str>,
}

impl<'a> SensorData<'a> {
    pub fn detection(sensor_type: &'a str, detected: bool, timestamp: Option<&'a str>) -> Self {
        Self {
            sensor_type,
            detected: Some(detected),
            value: None,
            unit: None,
            timestamp,
        }
    }

    pub fn measurement(sensor_type: &'a str, value: f32, unit: &'a str, timestamp: Option<&'a str>) -> Self {
        Self {
            sensor_type,
            detected: None,
            value: Some(value),
            unit: Some(unit),
            timestamp,
        }
    }
}

/// Actuator state on `devices/{id}/status/*`.
#[derive(Debug, Clone, Serialize)]
pub struct Status<'a> {
    pub state: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<&'a str>,
}

/// Card scan forwarded for an access decision.
#[derive(Debug, Clone, Serialize)]
pub struct RfidCheck<'a> {
    pub card_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<&'a str>,
}

// ── Inbound ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    Granted,
    Denied,
}

/// Access decision on `devices/{id}/rfid/response`.
#[derive(Debug, Clone, Deserialize)]
pub struct RfidResponse {
    pub access: Access,
    #[serde(default)]
    pub card_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Open,
    Close,
    On,
    Off,
}

/// Remote command on `devices/{id}/control/*`.
#[derive(Debug, Clone, Deserialize)]
pub struct ControlCommand {
    pub action: Action,
}
