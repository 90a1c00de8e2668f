//! DC fan behind an L9110-style H-bridge (INA / INB both on LEDC).
//!
//! The fan only ever spins one way: INA held at 0, INB carries the speed.

use crate::arbiter::OutputDevice;
use crate::drivers::hw_init;
use crate::error::ActuatorError;
use crate::pins;

/// Fan speed in percent of full duty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanSpeed(pub u8);

impl FanSpeed {
    /// ~700/1023, fast enough to clear the room without rattling.
    pub const VENT: FanSpeed = FanSpeed(68);

    fn duty(self) -> u32 {
        u32::from(self.0.min(100)) * pins::PWM_MAX_DUTY / 100
    }
}

pub struct Fan {
    speed: Option<FanSpeed>,
}

impl Default for Fan {
    fn default() -> Self {
        Self::new()
    }
}

impl Fan {
    pub fn new() -> Self {
        Self { speed: None }
    }

    pub fn is_running(&self) -> bool {
        self.speed.is_some()
    }

    fn drive(&self, duty_b: u32) -> Result<(), ActuatorError> {
        let a = hw_init::ledc_set(hw_init::LEDC_CH_FAN_A, 0);
        let b = hw_init::ledc_set(hw_init::LEDC_CH_FAN_B, duty_b);
        if a && b {
            Ok(())
        } else {
            Err(ActuatorError::PwmWriteFailed)
        }
    }
}

impl OutputDevice for Fan {
    type Payload = FanSpeed;

    fn apply(&mut self, speed: &FanSpeed) -> Result<(), ActuatorError> {
        self.drive(speed.duty())?;
        self.speed = (speed.0 > 0).then_some(*speed);
        Ok(())
    }

    fn apply_idle(&mut self) -> Result<(), ActuatorError> {
        self.drive(0)?;
        self.speed = None;
        Ok(())
    }
}
