//! Per-tick context handed to every handler.
//!
//! Everything a handler may touch is borrowed here explicitly: the shared
//! outputs, the user switches, the latest readings, and the outbound ports.
//! Nothing is reached through globals.

use log::warn;
use serde::Serialize;

use super::messages::{SensorData, Status, Topics};
use super::ports::{BackendPort, ClimateReading, MessagePort};
use crate::arbiter::Outputs;
use crate::clock::{CivilTime, Timestamp};
use crate::config::HoldTimes;

/// User-facing enable flags, toggled by the buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Switches {
    pub gas_alarm_enabled: bool,
    pub motion_enabled: bool,
}

impl Default for Switches {
    fn default() -> Self {
        Self {
            gas_alarm_enabled: true,
            motion_enabled: true,
        }
    }
}

/// Latest readings shared between handlers (one writer each).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Snapshot {
    /// Written by the environment handler, read by the sensor log.
    pub climate: Option<ClimateReading>,
    pub gas_active: bool,
    pub steam_active: bool,
}

pub struct HandlerContext<'a> {
    /// Scheduler tick being run (starts at 1).
    pub tick: u32,
    /// Local time, `None` until the wall clock has synced.
    pub now: Option<CivilTime>,
    pub outputs: &'a mut Outputs,
    pub switches: &'a mut Switches,
    pub snapshot: &'a mut Snapshot,
    pub messages: &'a mut dyn MessagePort,
    pub backend: &'a mut dyn BackendPort,
    pub topics: &'a Topics,
    pub holds: &'a HoldTimes,
}

impl HandlerContext<'_> {
    pub fn timestamp(&self) -> Option<Timestamp> {
        self.now.map(|t| t.iso())
    }

    /// Serialize and publish.  Failures are logged and reported, never raised.
    pub fn publish_json<T: Serialize>(&mut self, topic: &str, msg: &T) -> bool {
        let payload = match serde_json::to_vec(msg) {
            Ok(p) => p,
            Err(_) => {
                warn!("publish: could not encode message for {}", topic);
                return false;
            }
        };
        let sent = self.messages.publish(topic, &payload);
        if !sent {
            warn!("publish: {} failed", topic);
        }
        sent
    }

    /// `{"sensor_type", "detected", "timestamp"}` on the data topic.
    pub fn publish_detection(&mut self, sensor_type: &str, detected: bool) -> bool {
        let ts = self.timestamp();
        let topics = self.topics;
        self.publish_json(
            &topics.sensor_data,
            &SensorData::detection(sensor_type, detected, ts.as_deref()),
        )
    }

    /// `{"sensor_type", "value", "unit", "timestamp"}` on the data topic.
    pub fn publish_measurement(&mut self, sensor_type: &str, value: f32, unit: &str) -> bool {
        let ts = self.timestamp();
        let topics = self.topics;
        self.publish_json(
            &topics.sensor_data,
            &SensorData::measurement(sensor_type, value, unit, ts.as_deref()),
        )
    }

    /// `{"state", "timestamp"}` on one of the status topics.
    pub fn publish_status(&mut self, topic: &str, state: &str) -> bool {
        let ts = self.timestamp();
        self.publish_json(
            topic,
            &Status {
                state,
                timestamp: ts.as_deref(),
            },
        )
    }
}
