//! Port traits: the boundary between the scheduling core and the outside
//! world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Handler / Scheduler (core)
//! ```
//!
//! Sensors, the message bus, the HTTP backend, the wall clock and the
//! config store are implemented by drivers and adapters; the handlers only
//! see these traits, so the whole loop runs on the host against mocks.
//!
//! Output devices have their own seam,
//! [`OutputDevice`](crate::arbiter::OutputDevice), owned by the arbiter.

use crate::config::SystemConfig;
use crate::drivers::button::ButtonId;
use crate::error::{CommsError, SensorError};

// ───────────────────────────────────────────────────────────────
// Sensor ports (hardware → core)
// ───────────────────────────────────────────────────────────────

/// A binary detector (gas, PIR, steam).
///
/// A read error means "no new data this tick", never "clear".
pub trait DetectorPort {
    fn detect(&mut self) -> Result<bool, SensorError>;
}

/// One temperature / humidity sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateReading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

pub trait ClimatePort {
    fn read_climate(&mut self) -> Result<ClimateReading, SensorError>;
}

/// Decimal concatenation of the card UID bytes, e.g. `"1362282077"`.
pub type CardId = heapless::String<16>;

pub trait CardReaderPort {
    /// `Ok(None)` when no card is in the field.
    fn poll_card(&mut self) -> Result<Option<CardId>, SensorError>;
}

pub trait ButtonPort {
    /// Consume a latched press.  Each physical press is reported once.
    fn take_press(&mut self, button: ButtonId) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Messaging facade (core ↔ broker)
// ───────────────────────────────────────────────────────────────

pub const MAX_TOPIC_LEN: usize = 64;
pub const MAX_INBOUND_PAYLOAD: usize = 256;

/// A message received on a subscribed topic, queued until the next tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    pub topic: heapless::String<MAX_TOPIC_LEN>,
    pub payload: heapless::Vec<u8, MAX_INBOUND_PAYLOAD>,
}

impl Inbound {
    /// `None` if either part exceeds the fixed capacity.
    pub fn new(topic: &str, payload: &[u8]) -> Option<Self> {
        let mut t = heapless::String::new();
        t.push_str(topic).ok()?;
        Some(Self {
            topic: t,
            payload: heapless::Vec::from_slice(payload).ok()?,
        })
    }
}

pub trait MessagePort {
    /// Best-effort, at most one attempt.  `false` on failure; never panics.
    fn publish(&mut self, topic: &str, payload: &[u8]) -> bool;

    /// Register interest in `topic`.
    fn subscribe(&mut self, topic: &str) -> bool;

    /// Next queued inbound message, if any.  Never blocks.
    fn poll_inbound(&mut self) -> Option<Inbound>;
}

// ───────────────────────────────────────────────────────────────
// Data-logging backend (core → REST API)
// ───────────────────────────────────────────────────────────────

pub trait BackendPort {
    /// Append one row to the sensor log table.
    fn insert_sensor_log(&mut self, kind: &str, value: f32, unit: &str) -> Result<(), CommsError>;

    /// Append one row to the motion event table.
    fn insert_motion_event(&mut self) -> Result<(), CommsError>;
}

// ───────────────────────────────────────────────────────────────
// Housekeeping
// ───────────────────────────────────────────────────────────────

/// Advisory memory reclamation.  Must return quickly.
pub trait MemoryPort {
    /// Returns free heap bytes after reclaiming.
    fn reclaim(&mut self, reason: &str) -> u32;
}

/// UTC wall clock.  Values before 2020 mean "not synced".
pub trait ClockPort {
    fn epoch_secs(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Configuration port (core ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations validate before persisting; invalid values are
/// rejected with [`ConfigError::ValidationFailed`], not clamped.
pub trait ConfigPort {
    /// Returns [`SystemConfig::default()`] if nothing is stored yet.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    fn save(&mut self, config: &SystemConfig) -> Result<(), ConfigError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    NotFound,
    ValidationFailed(&'static str),
    Corrupted,
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::ValidationFailed(why) => write!(f, "config invalid: {}", why),
            Self::Corrupted => write!(f, "config blob corrupted"),
            Self::IoError => write!(f, "config storage I/O error"),
        }
    }
}

impl From<ConfigError> for crate::error::Error {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::ValidationFailed(why) => Self::Config(why),
            ConfigError::NotFound => Self::Config("not found"),
            ConfigError::Corrupted => Self::Config("corrupted"),
            ConfigError::IoError => Self::Config("storage I/O"),
        }
    }
}
