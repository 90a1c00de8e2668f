//! Night lamp: a plain LED on a GPIO, active high.

use crate::arbiter::OutputDevice;
use crate::drivers::hw_init;
use crate::error::ActuatorError;
use crate::pins;

pub struct Lamp {
    gpio: i32,
    on: bool,
}

impl Default for Lamp {
    fn default() -> Self {
        Self::new(pins::LAMP_GPIO)
    }
}

impl Lamp {
    pub fn new(gpio: i32) -> Self {
        Self { gpio, on: false }
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}

impl OutputDevice for Lamp {
    type Payload = bool;

    fn apply(&mut self, on: &bool) -> Result<(), ActuatorError> {
        if !hw_init::gpio_write(self.gpio, *on) {
            return Err(ActuatorError::GpioWriteFailed);
        }
        self.on = *on;
        Ok(())
    }

    fn apply_idle(&mut self) -> Result<(), ActuatorError> {
        self.apply(&false)
    }
}
