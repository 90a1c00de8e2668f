//! 180° hobby servo on a 50 Hz LEDC channel.
//!
//! Drives the door (managed) and the window (dedicated).  Two positions
//! only; the pulse widths come from the 10-bit duty table below.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: writes LEDC duty via hw_init.
//! On host/test: hw_init records the duty in memory.

use crate::arbiter::OutputDevice;
use crate::drivers::hw_init;
use crate::error::ActuatorError;

/// ~0.5 ms pulse (2.5 % of 20 ms).
const CLOSED_DUTY: u32 = 25;
/// ~2.5 ms pulse (12.5 % of 20 ms).
const OPEN_DUTY: u32 = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServoPosition {
    /// 180°.
    Open,
    /// 0°.
    Closed,
}

impl ServoPosition {
    pub fn duty(self) -> u32 {
        match self {
            Self::Open => OPEN_DUTY,
            Self::Closed => CLOSED_DUTY,
        }
    }

    /// Status string published on the MQTT status topics.
    pub fn as_state(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

pub struct Servo {
    channel: u32,
    position: Option<ServoPosition>,
}

impl Servo {
    pub fn new(channel: u32) -> Self {
        Self {
            channel,
            position: None,
        }
    }

    pub fn door() -> Self {
        Self::new(hw_init::LEDC_CH_DOOR)
    }

    pub fn window() -> Self {
        Self::new(hw_init::LEDC_CH_WINDOW)
    }

    /// Last position written successfully, `None` before the first write.
    pub fn position(&self) -> Option<ServoPosition> {
        self.position
    }

    fn move_to(&mut self, position: ServoPosition) -> Result<(), ActuatorError> {
        if !hw_init::ledc_set(self.channel, position.duty()) {
            return Err(ActuatorError::PwmWriteFailed);
        }
        self.position = Some(position);
        Ok(())
    }
}

impl OutputDevice for Servo {
    type Payload = ServoPosition;

    fn apply(&mut self, payload: &ServoPosition) -> Result<(), ActuatorError> {
        self.move_to(*payload)
    }

    fn apply_idle(&mut self) -> Result<(), ActuatorError> {
        self.move_to(ServoPosition::Closed)
    }
}
